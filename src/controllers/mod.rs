//! Controllers own the business rules behind each route.
//!
//! Route handlers call them only with a validated payload and, for protected
//! routes, a resolved session. A controller answers with a complete response,
//! including its own 4xx outcomes; an `Err` means something unexpected
//! happened and becomes a generic 500 at the handler boundary.

mod notification;
mod organization;
mod project;
mod version;

use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use axum::response::{IntoResponse, Response};

use crate::context::RequestContext;
use crate::database::models::{Organization, Project};
use crate::database::{Store, StoreError};
use crate::error::ApiError;
use crate::middleware::Session;
use crate::schema::{
    AddNewGalleryImageForm, CreateOrganizationForm, DeleteGalleryImageForm, GeneralProjectSettingsForm,
    InviteMemberForm, NewProjectForm, NewVersionForm, UpdateDescriptionForm, UpdateExternalLinksForm,
    UpdateGalleryImageForm, UpdateProjectLicenseForm, UpdateProjectTagsForm,
};

#[async_trait]
pub trait ProjectController: Send + Sync {
    async fn create_project(&self, ctx: &RequestContext, session: &Session, data: NewProjectForm) -> Result<Response>;

    async fn get_project(&self, ctx: &RequestContext, slug: &str, session: Option<&Session>) -> Result<Response>;

    async fn update_general_settings(
        &self,
        ctx: &RequestContext,
        slug: &str,
        session: &Session,
        data: GeneralProjectSettingsForm,
    ) -> Result<Response>;

    async fn update_description(
        &self,
        ctx: &RequestContext,
        slug: &str,
        session: &Session,
        data: UpdateDescriptionForm,
    ) -> Result<Response>;

    async fn update_tags(
        &self,
        ctx: &RequestContext,
        slug: &str,
        session: &Session,
        data: UpdateProjectTagsForm,
    ) -> Result<Response>;

    async fn update_external_links(
        &self,
        ctx: &RequestContext,
        slug: &str,
        session: &Session,
        data: UpdateExternalLinksForm,
    ) -> Result<Response>;

    async fn update_license(
        &self,
        ctx: &RequestContext,
        slug: &str,
        session: &Session,
        data: UpdateProjectLicenseForm,
    ) -> Result<Response>;

    async fn add_gallery_image(
        &self,
        ctx: &RequestContext,
        slug: &str,
        session: &Session,
        data: AddNewGalleryImageForm,
    ) -> Result<Response>;

    async fn update_gallery_image(
        &self,
        ctx: &RequestContext,
        slug: &str,
        image_id: &str,
        session: &Session,
        data: UpdateGalleryImageForm,
    ) -> Result<Response>;

    async fn remove_gallery_image(
        &self,
        ctx: &RequestContext,
        slug: &str,
        session: &Session,
        data: DeleteGalleryImageForm,
    ) -> Result<Response>;

    async fn get_dependencies(&self, ctx: &RequestContext, slug: &str, session: Option<&Session>) -> Result<Response>;

    async fn invite_member(
        &self,
        ctx: &RequestContext,
        slug: &str,
        session: &Session,
        data: InviteMemberForm,
    ) -> Result<Response>;
}

#[async_trait]
pub trait VersionController: Send + Sync {
    async fn list_versions(&self, ctx: &RequestContext, slug: &str, session: Option<&Session>) -> Result<Response>;

    async fn create_version(
        &self,
        ctx: &RequestContext,
        slug: &str,
        session: &Session,
        data: NewVersionForm,
    ) -> Result<Response>;

    async fn get_version(
        &self,
        ctx: &RequestContext,
        slug: &str,
        version_slug: &str,
        session: Option<&Session>,
    ) -> Result<Response>;

    async fn delete_version(
        &self,
        ctx: &RequestContext,
        slug: &str,
        version_slug: &str,
        session: &Session,
    ) -> Result<Response>;
}

#[async_trait]
pub trait OrganizationController: Send + Sync {
    async fn create_organization(
        &self,
        ctx: &RequestContext,
        session: &Session,
        data: CreateOrganizationForm,
    ) -> Result<Response>;

    async fn get_organization(&self, ctx: &RequestContext, slug: &str, session: Option<&Session>) -> Result<Response>;

    async fn invite_member(
        &self,
        ctx: &RequestContext,
        slug: &str,
        session: &Session,
        data: InviteMemberForm,
    ) -> Result<Response>;
}

#[async_trait]
pub trait NotificationController: Send + Sync {
    async fn list_notifications(&self, ctx: &RequestContext, session: &Session) -> Result<Response>;

    async fn mark_read(&self, ctx: &RequestContext, ids: Vec<String>, session: &Session) -> Result<Response>;

    async fn delete_notification(&self, ctx: &RequestContext, notif_id: &str, session: &Session) -> Result<Response>;
}

/// The controller set a router dispatches to
#[derive(Clone)]
pub struct Controllers {
    pub projects: Arc<dyn ProjectController>,
    pub versions: Arc<dyn VersionController>,
    pub organizations: Arc<dyn OrganizationController>,
    pub notifications: Arc<dyn NotificationController>,
}

impl Controllers {
    pub fn from_store(store: Arc<dyn Store>) -> Self {
        let controller = Arc::new(StoreController::new(store));
        Self {
            projects: controller.clone(),
            versions: controller.clone(),
            organizations: controller.clone(),
            notifications: controller,
        }
    }
}

/// Controllers backed by a `Store`
#[derive(Clone)]
pub struct StoreController {
    store: Arc<dyn Store>,
}

impl StoreController {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    async fn load_project(&self, slug: &str) -> Result<Project, Failure> {
        self.store
            .find_project(slug)
            .await?
            .ok_or_else(|| ApiError::not_found("Project not found").into())
    }

    /// Loads a project the caller can see; hidden projects read as missing
    async fn load_visible_project(&self, slug: &str, session: Option<&Session>) -> Result<Project, Failure> {
        let project = self.load_project(slug).await?;
        if !can_view_project(&project, session) {
            return Err(ApiError::not_found("Project not found").into());
        }
        Ok(project)
    }

    async fn load_managed_project(&self, slug: &str, session: &Session) -> Result<Project, Failure> {
        let project = self.load_visible_project(slug, Some(session)).await?;
        if !can_manage_project(&project, session) {
            return Err(ApiError::forbidden("You don't have permission to manage this project").into());
        }
        Ok(project)
    }

    async fn load_organization(&self, slug: &str) -> Result<Organization, Failure> {
        self.store
            .find_organization(slug)
            .await?
            .ok_or_else(|| ApiError::not_found("Organization not found").into())
    }

    /// Removes an invite notification whose membership change did not stick
    async fn withdraw_notification(&self, ctx: &RequestContext, id: &str) {
        if let Err(error) = self.store.delete_notification(id).await {
            tracing::warn!(request_id = %ctx.request_id, notification_id = %id, "Failed to withdraw notification: {}", error);
        }
    }
}

/// Owners and site staff may change a project
pub fn can_manage_project(project: &Project, session: &Session) -> bool {
    session.role.is_staff() || project.is_owner(&session.id)
}

/// Private projects are visible to accepted members and staff only
pub fn can_view_project(project: &Project, session: Option<&Session>) -> bool {
    use crate::types::ProjectVisibility;

    if project.visibility != ProjectVisibility::Private {
        return true;
    }
    session.is_some_and(|s| s.role.is_staff() || project.is_member(&s.id))
}

pub fn can_manage_organization(organization: &Organization, session: &Session) -> bool {
    session.role.is_staff() || organization.is_owner(&session.id)
}

/// Outcome of a controller step that did not produce a success response
#[derive(Debug)]
pub(crate) enum Failure {
    Reject(ApiError),
    Unexpected(anyhow::Error),
}

impl From<ApiError> for Failure {
    fn from(error: ApiError) -> Self {
        Failure::Reject(error)
    }
}

impl From<StoreError> for Failure {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Stale(detail) => {
                tracing::debug!("Stale write: {}", detail);
                ApiError::conflict("This resource was changed by another request, please retry").into()
            }
            other => Failure::Unexpected(other.into()),
        }
    }
}

/// Maps a store conflict to a 409 with the given message
pub(crate) fn conflict_as(message: &'static str) -> impl FnOnce(StoreError) -> Failure {
    move |error| match error {
        StoreError::Conflict(detail) => {
            tracing::debug!("Store conflict: {}", detail);
            ApiError::conflict(message).into()
        }
        other => other.into(),
    }
}

/// Rejections become responses; unexpected failures stay errors
pub(crate) async fn finish<F>(step: F) -> Result<Response>
where
    F: Future<Output = Result<Response, Failure>>,
{
    match step.await {
        Ok(response) => Ok(response),
        Err(Failure::Reject(error)) => Ok(error.into_response()),
        Err(Failure::Unexpected(error)) => Err(error),
    }
}

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::auth::GlobalUserRole;
    use crate::database::MemoryStore;
    use serde_json::Value;

    pub fn controller() -> StoreController {
        StoreController::new(Arc::new(MemoryStore::new()))
    }

    pub fn session(id: &str, role: GlobalUserRole) -> Session {
        Session {
            id: id.to_string(),
            user_name: id.to_string(),
            role,
        }
    }

    pub fn ctx() -> RequestContext {
        RequestContext::new(Value::Null, None)
    }

    pub async fn body(response: Response) -> (u16, Value) {
        let status = response.status().as_u16();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }
}
