use anyhow::Result;
use async_trait::async_trait;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde_json::{json, Map, Value};

use super::{can_manage_organization, conflict_as, finish, new_id, OrganizationController, StoreController};
use crate::api::notification::ORGANIZATION_INVITE;
use crate::api::OrganizationView;
use crate::context::RequestContext;
use crate::database::models::{Notification, Organization, TeamMember};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, Session};
use crate::schema::{CreateOrganizationForm, InviteMemberForm};

#[async_trait]
impl OrganizationController for StoreController {
    async fn create_organization(
        &self,
        ctx: &RequestContext,
        session: &Session,
        data: CreateOrganizationForm,
    ) -> Result<Response> {
        finish(
            async {
                let organization = Organization {
                    id: new_id(),
                    name: data.name,
                    slug: data.slug,
                    description: data.description,
                    icon: None,
                    members: vec![TeamMember::owner(&session.id)],
                    date_created: Utc::now(),
                    revision: 0,
                };
                self.store
                    .insert_organization(&organization)
                    .await
                    .map_err(conflict_as("The url slug is already taken"))?;

                tracing::info!(request_id = %ctx.request_id, org_id = %organization.id, "Organization created");
                Ok(ApiResponse::success(json!({ "slug": organization.slug }))
                    .with_message("Organization created successfully")
                    .into_response())
            },
        )
        .await
    }

    async fn get_organization(&self, _ctx: &RequestContext, slug: &str, session: Option<&Session>) -> Result<Response> {
        finish(
            async {
                let organization = self.load_organization(slug).await?;
                let show_pending = session.is_some_and(|s| can_manage_organization(&organization, s));
                Ok(
                    ApiResponse::success(json!({ "organization": OrganizationView::new(&organization, show_pending) }))
                        .into_response(),
                )
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
                let mut organization = self.load_organization(slug).await?;
                if !can_manage_organization(&organization, session) {
                    return Err(ApiError::forbidden("You don't have permission to manage this organization").into());
                }
                if organization.member(&data.user_id).is_some() {
                    return Err(ApiError::conflict("User is already a member of this organization").into());
                }

                let mut body = Map::new();
                body.insert("orgId".into(), Value::String(organization.id.clone()));
                body.insert("invitedBy".into(), Value::String(session.id.clone()));
                body.insert("role".into(), Value::String(data.role.clone()));
                let notification = Notification {
                    id: new_id(),
                    user_id: data.user_id.clone(),
                    kind: ORGANIZATION_INVITE.to_string(),
                    body,
                    read: false,
                    date_created: Utc::now(),
                };
                self.store.insert_notification(&notification).await?;

                organization.members.push(TeamMember::invited(&data.user_id, &data.role));
                if let Err(error) = self.store.update_organization(&organization).await {
                    self.withdraw_notification(ctx, &notification.id).await;
                    return Err(error.into());
                }

                tracing::info!(request_id = %ctx.request_id, org_id = %organization.id, "Organization member invited");
                Ok(ApiResponse::message("Invite sent").into_response())
            },
        )
        .await
    }
}
