use anyhow::Result;
use async_trait::async_trait;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use super::{finish, NotificationController, StoreController};
use crate::api::notification::{related_ids, render, RelatedEntities};
use crate::api::NotificationView;
use crate::context::RequestContext;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, Session};

#[async_trait]
impl NotificationController for StoreController {
    async fn list_notifications(&self, _ctx: &RequestContext, session: &Session) -> Result<Response> {
        finish(
            async {
                let notifications = self.store.notifications_for_user(&session.id).await?;
                let (project_ids, org_ids) = related_ids(&notifications);

                let related = RelatedEntities {
                    projects: self
                        .store
                        .find_projects(&project_ids)
                        .await?
                        .into_iter()
                        .map(|p| (p.id.clone(), p))
                        .collect(),
                    organizations: self
                        .store
                        .find_organizations(&org_ids)
                        .await?
                        .into_iter()
                        .map(|o| (o.id.clone(), o))
                        .collect(),
                };

                let views: Vec<NotificationView> = notifications.iter().map(|n| render(n, &related)).collect();
                Ok(ApiResponse::success(json!({ "notifications": views })).into_response())
            },
        )
        .await
    }

    async fn mark_read(&self, _ctx: &RequestContext, ids: Vec<String>, session: &Session) -> Result<Response> {
        finish(
            async {
                let owned = self.store.notifications_for_user(&session.id).await?;
                let mut updated = 0usize;

                for mut notification in owned.into_iter().filter(|n| ids.contains(&n.id)) {
                    if !notification.read {
                        notification.read = true;
                        self.store.update_notification(&notification).await?;
                    }
                    updated += 1;
                }

                if updated == 0 {
                    return Err(ApiError::not_found("Notification not found").into());
                }
                Ok(ApiResponse::message("Notifications marked as read").into_response())
            },
        )
        .await
    }

    async fn delete_notification(&self, _ctx: &RequestContext, notif_id: &str, session: &Session) -> Result<Response> {
        finish(
            async {
                let owned = self.store.notifications_for_user(&session.id).await?;
                if !owned.iter().any(|n| n.id == notif_id) {
                    return Err(ApiError::not_found("Notification not found").into());
                }

                self.store.delete_notification(notif_id).await?;
                Ok(ApiResponse::message("Notification deleted").into_response())
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
    use crate::database::models::Notification;
    use crate::database::Store;
    use chrono::Utc;

    async fn seed(c: &StoreController, id: &str, user_id: &str, kind: &str) {
        c.store
            .insert_notification(&Notification {
                id: id.into(),
                user_id: user_id.into(),
                kind: kind.into(),
                body: Default::default(),
                read: false,
                date_created: Utc::now(),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn lists_only_own_notifications_with_fallback_views() {
        let c = controller();
        seed(&c, "n1", "alice", "team_invite").await;
        seed(&c, "n2", "alice", "moderation_note").await;
        seed(&c, "n3", "bob", "team_invite").await;

        let alice = session("alice", GlobalUserRole::User);
        let (status, listed) = body(c.list_notifications(&ctx(), &alice).await.unwrap()).await;
        assert_eq!(status, 200);

        let list = listed["notifications"].as_array().unwrap();
        assert_eq!(list.len(), 2);
        let mut types: Vec<&str> = list.iter().map(|n| n["type"].as_str().unwrap()).collect();
        types.sort();
        assert_eq!(types, vec!["team_invite", "unknown"]);
    }

    #[tokio::test]
    async fn cannot_touch_someone_elses_notifications() {
        let c = controller();
        seed(&c, "n1", "alice", "team_invite").await;

        let bob = session("bob", GlobalUserRole::User);
        let read = c.mark_read(&ctx(), vec!["n1".into()], &bob).await.unwrap();
        assert_eq!(read.status().as_u16(), 404);
        let deleted = c.delete_notification(&ctx(), "n1", &bob).await.unwrap();
        assert_eq!(deleted.status().as_u16(), 404);

        let alice = session("alice", GlobalUserRole::User);
        let read = c.mark_read(&ctx(), vec!["n1".into(), "other".into()], &alice).await.unwrap();
        assert_eq!(read.status().as_u16(), 200);
        assert!(c.store.notifications_for_user("alice").await.unwrap()[0].read);

        let deleted = c.delete_notification(&ctx(), "n1", &alice).await.unwrap();
        assert_eq!(deleted.status().as_u16(), 200);
    }
}
