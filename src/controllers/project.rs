use std::collections::HashSet;

use anyhow::Result;
use async_trait::async_trait;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde_json::{json, Map, Value};

use super::{can_manage_project, can_view_project, conflict_as, finish, new_id, Failure, ProjectController, StoreController};
use crate::api::notification::TEAM_INVITE;
use crate::api::{ProjectListItem, ProjectView, VersionListItem};
use crate::context::RequestContext;
use crate::database::models::{GalleryItem, License, Notification, Project, TeamMember};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, Session};
use crate::schema::{
    AddNewGalleryImageForm, DeleteGalleryImageForm, GeneralProjectSettingsForm, InviteMemberForm, NewProjectForm,
    UpdateDescriptionForm, UpdateExternalLinksForm, UpdateGalleryImageForm, UpdateProjectLicenseForm,
    UpdateProjectTagsForm,
};
use crate::types::{EnvironmentSupport, MAX_GALLERY_ITEMS};

impl StoreController {
    /// Writes back a loaded project. Fails with a 409 if someone else saved it
    /// since it was loaded.
    pub(super) async fn save_project(&self, project: &mut Project) -> Result<(), Failure> {
        project.touch();
        self.store
            .update_project(project)
            .await
            .map_err(conflict_as("The url slug is already taken"))?;
        project.revision += 1;
        Ok(())
    }
}

/// Only one gallery image can be featured at a time
fn clear_featured(gallery: &mut [GalleryItem], except: &str) {
    for item in gallery.iter_mut().filter(|item| item.id != except) {
        item.featured = false;
    }
}

#[async_trait]
impl ProjectController for StoreController {
    async fn create_project(&self, ctx: &RequestContext, session: &Session, data: NewProjectForm) -> Result<Response> {
        finish(
            async {
                let now = Utc::now();
                let project = Project {
                    id: new_id(),
                    name: data.name,
                    slug: data.url,
                    summary: data.summary.unwrap_or_default(),
                    description: String::new(),
                    icon: None,
                    project_type: data.project_type,
                    visibility: data.visibility,
                    client_side: EnvironmentSupport::Unknown,
                    server_side: EnvironmentSupport::Unknown,
                    categories: vec![],
                    featured_categories: vec![],
                    license: License::default(),
                    external_links: Default::default(),
                    gallery: vec![],
                    versions: vec![],
                    members: vec![TeamMember::owner(&session.id)],
                    organisation_id: None,
                    date_created: now,
                    date_updated: now,
                    revision: 0,
                };

                self.store
                    .insert_project(&project)
                    .await
                    .map_err(conflict_as("The url slug is already taken"))?;

                tracing::info!(request_id = %ctx.request_id, project_id = %project.id, slug = %project.slug, "Project created");
                Ok(ApiResponse::success(json!({ "urlSlug": project.slug }))
                    .with_message("Project created successfully")
                    .into_response())
            },
        )
        .await
    }

    async fn get_project(&self, _ctx: &RequestContext, slug: &str, session: Option<&Session>) -> Result<Response> {
        finish(
            async {
                let project = self.load_visible_project(slug, session).await?;
                let show_pending = session.is_some_and(|s| can_manage_project(&project, s));
                Ok(ApiResponse::success(json!({ "project": ProjectView::new(&project, show_pending) })).into_response())
            },
        )
        .await
    }

    async fn update_general_settings(
        &self,
        _ctx: &RequestContext,
        slug: &str,
        session: &Session,
        data: GeneralProjectSettingsForm,
    ) -> Result<Response> {
        finish(
            async {
                let mut project = self.load_managed_project(slug, session).await?;
                project.icon = data.icon;
                project.name = data.name;
                project.slug = data.slug;
                project.visibility = data.visibility;
                project.client_side = data.client_side;
                project.server_side = data.server_side;
                project.summary = data.summary;
                self.save_project(&mut project).await?;

                Ok(ApiResponse::success(json!({ "slug": project.slug }))
                    .with_message("Project settings updated")
                    .into_response())
            },
        )
        .await
    }

    async fn update_description(
        &self,
        _ctx: &RequestContext,
        slug: &str,
        session: &Session,
        data: UpdateDescriptionForm,
    ) -> Result<Response> {
        finish(
            async {
                let mut project = self.load_managed_project(slug, session).await?;
                project.description = data.description.unwrap_or_default();
                self.save_project(&mut project).await?;
                Ok(ApiResponse::message("Project description updated").into_response())
            },
        )
        .await
    }

    async fn update_tags(
        &self,
        _ctx: &RequestContext,
        slug: &str,
        session: &Session,
        data: UpdateProjectTagsForm,
    ) -> Result<Response> {
        finish(
            async {
                let mut project = self.load_managed_project(slug, session).await?;
                project.categories = data.categories;
                project.featured_categories = data.featured_categories;
                self.save_project(&mut project).await?;
                Ok(ApiResponse::message("Project tags updated").into_response())
            },
        )
        .await
    }

    async fn update_external_links(
        &self,
        _ctx: &RequestContext,
        slug: &str,
        session: &Session,
        data: UpdateExternalLinksForm,
    ) -> Result<Response> {
        finish(
            async {
                let mut project = self.load_managed_project(slug, session).await?;
                project.external_links.issue_tracker = data.issue_tracker;
                project.external_links.source_code = data.source_code;
                project.external_links.wiki_page = data.wiki_page;
                project.external_links.discord_server = data.discord_server;
                self.save_project(&mut project).await?;
                Ok(ApiResponse::message("External links updated").into_response())
            },
        )
        .await
    }

    async fn update_license(
        &self,
        _ctx: &RequestContext,
        slug: &str,
        session: &Session,
        data: UpdateProjectLicenseForm,
    ) -> Result<Response> {
        finish(
            async {
                let mut project = self.load_managed_project(slug, session).await?;
                project.license = License {
                    id: data.id,
                    name: data.name,
                    url: data.url,
                };
                self.save_project(&mut project).await?;
                Ok(ApiResponse::message("Project license updated").into_response())
            },
        )
        .await
    }

    async fn add_gallery_image(
        &self,
        _ctx: &RequestContext,
        slug: &str,
        session: &Session,
        data: AddNewGalleryImageForm,
    ) -> Result<Response> {
        finish(
            async {
                let mut project = self.load_managed_project(slug, session).await?;
                if project.gallery.len() >= MAX_GALLERY_ITEMS {
                    return Err(ApiError::bad_request(format!(
                        "A project can have at most {} gallery images",
                        MAX_GALLERY_ITEMS
                    ))
                    .into());
                }

                let item = GalleryItem {
                    id: new_id(),
                    title: data.title,
                    description: data.description,
                    image_url: data.image,
                    order_index: data.order_index,
                    featured: data.featured,
                    date_created: Utc::now(),
                };
                let item_id = item.id.clone();
                if item.featured {
                    clear_featured(&mut project.gallery, &item_id);
                }
                project.gallery.push(item);
                project.sort_gallery();
                self.save_project(&mut project).await?;

                Ok(ApiResponse::success(json!({ "id": item_id }))
                    .with_message("Gallery image added")
                    .into_response())
            },
        )
        .await
    }

    async fn update_gallery_image(
        &self,
        _ctx: &RequestContext,
        slug: &str,
        image_id: &str,
        session: &Session,
        data: UpdateGalleryImageForm,
    ) -> Result<Response> {
        finish(
            async {
                let mut project = self.load_managed_project(slug, session).await?;
                let item = project
                    .gallery
                    .iter_mut()
                    .find(|item| item.id == image_id)
                    .ok_or_else(|| ApiError::not_found("Gallery image not found"))?;

                item.title = data.title;
                item.description = data.description;
                item.order_index = data.order_index;
                item.featured = data.featured;
                if data.featured {
                    clear_featured(&mut project.gallery, image_id);
                }
                project.sort_gallery();
                self.save_project(&mut project).await?;

                Ok(ApiResponse::message("Gallery image updated").into_response())
            },
        )
        .await
    }

    async fn remove_gallery_image(
        &self,
        _ctx: &RequestContext,
        slug: &str,
        session: &Session,
        data: DeleteGalleryImageForm,
    ) -> Result<Response> {
        finish(
            async {
                let mut project = self.load_managed_project(slug, session).await?;
                let before = project.gallery.len();
                project.gallery.retain(|item| item.id != data.id);
                if project.gallery.len() == before {
                    return Err(ApiError::not_found("Gallery image not found").into());
                }
                self.save_project(&mut project).await?;

                Ok(ApiResponse::message("Gallery image deleted").into_response())
            },
        )
        .await
    }

    async fn get_dependencies(&self, _ctx: &RequestContext, slug: &str, session: Option<&Session>) -> Result<Response> {
        finish(
            async {
                let project = self.load_visible_project(slug, session).await?;

                let mut project_ids: Vec<String> = Vec::new();
                let mut version_ids: HashSet<&str> = HashSet::new();
                for dependency in project.versions.iter().flat_map(|v| v.dependencies.iter()) {
                    if !project_ids.contains(&dependency.project_id) {
                        project_ids.push(dependency.project_id.clone());
                    }
                    if let Some(version_id) = &dependency.version_id {
                        version_ids.insert(version_id.as_str());
                    }
                }

                let dependencies: Vec<Project> = self
                    .store
                    .find_projects(&project_ids)
                    .await?
                    .into_iter()
                    .filter(|p| can_view_project(p, session))
                    .collect();

                let projects: Vec<ProjectListItem> = dependencies.iter().map(ProjectListItem::from).collect();
                let versions: Vec<VersionListItem> = dependencies
                    .iter()
                    .flat_map(|p| p.versions.iter())
                    .filter(|v| version_ids.contains(v.id.as_str()))
                    .map(VersionListItem::from)
                    .collect();

                Ok(ApiResponse::success(json!({ "projects": projects, "versions": versions })).into_response())
            },
        )
        .await
    }

    async fn invite_member(
        &self,
        ctx: &RequestContext,
        slug: &str,
        session: &Session,
        data: InviteMemberForm,
    ) -> Result<Response> {
        finish(
            async {
                let mut project = self.load_managed_project(slug, session).await?;
                if project.member(&data.user_id).is_some() {
                    return Err(ApiError::conflict("User is already a member of this project").into());
                }

                let mut body = Map::new();
                body.insert("projectId".into(), Value::String(project.id.clone()));
                body.insert("invitedBy".into(), Value::String(session.id.clone()));
                body.insert("role".into(), Value::String(data.role.clone()));
                let notification = Notification {
                    id: new_id(),
                    user_id: data.user_id.clone(),
                    kind: TEAM_INVITE.to_string(),
                    body,
                    read: false,
                    date_created: Utc::now(),
                };
                self.store.insert_notification(&notification).await?;

                project.members.push(TeamMember::invited(&data.user_id, &data.role));
                if let Err(failure) = self.save_project(&mut project).await {
                    self.withdraw_notification(ctx, &notification.id).await;
                    return Err(failure);
                }

                tracing::info!(request_id = %ctx.request_id, project_id = %project.id, "Team member invited");
                Ok(ApiResponse::message("Invite sent").into_response())
            },
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{body, controller, ctx, session};
    use super::*;
    use crate::auth::GlobalUserRole;
    use crate::database::Store;
    use crate::schema::parse_value_to_schema;
    use crate::types::ProjectVisibility;

    fn new_project(url: &str, visibility: ProjectVisibility) -> NewProjectForm {
        NewProjectForm {
            name: "Example Mod".into(),
            url: url.into(),
            visibility,
            project_type: crate::types::ProjectType::Mod,
            summary: Some("A test mod".into()),
        }
    }

    #[tokio::test]
    async fn create_then_read_project() {
        let c = controller();
        let owner = session("owner", GlobalUserRole::User);

        let (status, created) = body(c.create_project(&ctx(), &owner, new_project("example-mod", ProjectVisibility::Listed)).await.unwrap()).await;
        assert_eq!(status, 200);
        assert_eq!(created["urlSlug"], "example-mod");
        assert_eq!(created["success"], true);

        let (status, read) = body(c.get_project(&ctx(), "example-mod", None).await.unwrap()).await;
        assert_eq!(status, 200);
        assert_eq!(read["project"]["name"], "Example Mod");
        assert_eq!(read["project"]["summary"], "A test mod");
    }

    #[tokio::test]
    async fn duplicate_slug_is_a_conflict() {
        let c = controller();
        let owner = session("owner", GlobalUserRole::User);
        c.create_project(&ctx(), &owner, new_project("example-mod", ProjectVisibility::Listed)).await.unwrap();

        let response = c.create_project(&ctx(), &owner, new_project("example-mod", ProjectVisibility::Listed)).await.unwrap();
        assert_eq!(response.status().as_u16(), 409);
    }

    #[tokio::test]
    async fn private_projects_are_hidden_from_strangers() {
        let c = controller();
        let owner = session("owner", GlobalUserRole::User);
        c.create_project(&ctx(), &owner, new_project("secret", ProjectVisibility::Private)).await.unwrap();

        let stranger = session("stranger", GlobalUserRole::User);
        let moderator = session("mod", GlobalUserRole::Moderator);
        assert_eq!(c.get_project(&ctx(), "secret", None).await.unwrap().status().as_u16(), 404);
        assert_eq!(c.get_project(&ctx(), "secret", Some(&stranger)).await.unwrap().status().as_u16(), 404);
        assert_eq!(c.get_project(&ctx(), "secret", Some(&owner)).await.unwrap().status().as_u16(), 200);
        assert_eq!(c.get_project(&ctx(), "secret", Some(&moderator)).await.unwrap().status().as_u16(), 200);
    }

    #[tokio::test]
    async fn only_managers_can_update() {
        let c = controller();
        let owner = session("owner", GlobalUserRole::User);
        c.create_project(&ctx(), &owner, new_project("example-mod", ProjectVisibility::Listed)).await.unwrap();

        let form = UpdateDescriptionForm { description: Some("# Hello".into()) };
        let stranger = session("stranger", GlobalUserRole::User);
        let denied = c.update_description(&ctx(), "example-mod", &stranger, form.clone()).await.unwrap();
        assert_eq!(denied.status().as_u16(), 403);

        let ok = c.update_description(&ctx(), "example-mod", &owner, form).await.unwrap();
        assert_eq!(ok.status().as_u16(), 200);
        let project = c.store.find_project("example-mod").await.unwrap().unwrap();
        assert_eq!(project.description, "# Hello");
    }

    #[tokio::test]
    async fn gallery_keeps_a_single_featured_image() {
        let c = controller();
        let owner = session("owner", GlobalUserRole::User);
        c.create_project(&ctx(), &owner, new_project("example-mod", ProjectVisibility::Listed)).await.unwrap();

        for (title, featured) in [("First", true), ("Second", true)] {
            let form = parse_value_to_schema::<AddNewGalleryImageForm>(json!({
                "image": "https://cdn.example.com/a.png",
                "title": title,
                "featured": featured,
            }))
            .data()
            .unwrap();
            c.add_gallery_image(&ctx(), "example-mod", &owner, form).await.unwrap();
        }

        let project = c.store.find_project("example-mod").await.unwrap().unwrap();
        let featured: Vec<&str> = project.gallery.iter().filter(|g| g.featured).map(|g| g.title.as_str()).collect();
        assert_eq!(featured, vec!["Second"]);
        assert_eq!(project.gallery[0].title, "Second");

        let missing = c
            .remove_gallery_image(&ctx(), "example-mod", &owner, DeleteGalleryImageForm { id: "nope".into() })
            .await
            .unwrap();
        assert_eq!(missing.status().as_u16(), 404);
    }

    #[tokio::test]
    async fn invites_create_pending_member_and_notification() {
        let c = controller();
        let owner = session("owner", GlobalUserRole::User);
        c.create_project(&ctx(), &owner, new_project("example-mod", ProjectVisibility::Listed)).await.unwrap();

        let form = InviteMemberForm { user_id: "guest".into(), role: "Member".into() };
        let response = ProjectController::invite_member(&c, &ctx(), "example-mod", &owner, form.clone()).await.unwrap();
        assert_eq!(response.status().as_u16(), 200);

        let again = ProjectController::invite_member(&c, &ctx(), "example-mod", &owner, form).await.unwrap();
        assert_eq!(again.status().as_u16(), 409);

        let notifications = c.store.notifications_for_user("guest").await.unwrap();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].kind, TEAM_INVITE);

        // Pending members are listed for the owner only
        let (_, public) = body(c.get_project(&ctx(), "example-mod", None).await.unwrap()).await;
        let (_, managed) = body(c.get_project(&ctx(), "example-mod", Some(&owner)).await.unwrap()).await;
        assert_eq!(public["project"]["members"].as_array().unwrap().len(), 1);
        assert_eq!(managed["project"]["members"].as_array().unwrap().len(), 2);
    }
}
