//! Notification rendering: one view shape per known notification type.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use super::format::{OrganizationListItem, ProjectListItem};
use crate::database::models::{Notification, Organization, Project};

pub const TEAM_INVITE: &str = "team_invite";
pub const ORGANIZATION_INVITE: &str = "organization_invite";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationType {
    TeamInvite,
    OrganizationInvite,
    Unknown(String),
}

impl NotificationType {
    pub fn parse(kind: &str) -> Self {
        match kind {
            TEAM_INVITE => NotificationType::TeamInvite,
            ORGANIZATION_INVITE => NotificationType::OrganizationInvite,
            other => NotificationType::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            NotificationType::TeamInvite => TEAM_INVITE,
            NotificationType::OrganizationInvite => ORGANIZATION_INVITE,
            NotificationType::Unknown(kind) => kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotificationView {
    #[serde(rename_all = "camelCase")]
    TeamInvite {
        id: String,
        read: bool,
        date_created: DateTime<Utc>,
        project: Option<ProjectListItem>,
        invited_by: Option<String>,
        role: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    OrganizationInvite {
        id: String,
        read: bool,
        date_created: DateTime<Utc>,
        organization: Option<OrganizationListItem>,
        invited_by: Option<String>,
        role: Option<String>,
    },
    /// Types this build does not know how to render; passed through as stored
    #[serde(rename_all = "camelCase")]
    Unknown {
        id: String,
        read: bool,
        date_created: DateTime<Utc>,
        original_type: String,
        body: Map<String, Value>,
    },
}

/// Entities referenced by a batch of notifications, keyed by id
#[derive(Debug, Default)]
pub struct RelatedEntities {
    pub projects: HashMap<String, Project>,
    pub organizations: HashMap<String, Organization>,
}

/// Project and organization ids referenced by the given notifications
pub fn related_ids(notifications: &[Notification]) -> (Vec<String>, Vec<String>) {
    let mut project_ids = Vec::new();
    let mut org_ids = Vec::new();

    for notification in notifications {
        match NotificationType::parse(&notification.kind) {
            NotificationType::TeamInvite => {
                if let Some(id) = notification.body_str("projectId") {
                    if !project_ids.iter().any(|p| p == id) {
                        project_ids.push(id.to_string());
                    }
                }
            }
            NotificationType::OrganizationInvite => {
                if let Some(id) = notification.body_str("orgId") {
                    if !org_ids.iter().any(|o| o == id) {
                        org_ids.push(id.to_string());
                    }
                }
            }
            NotificationType::Unknown(_) => {}
        }
    }

    (project_ids, org_ids)
}

pub fn render(notification: &Notification, related: &RelatedEntities) -> NotificationView {
    let id = notification.id.clone();
    let read = notification.read;
    let date_created = notification.date_created;
    let invited_by = notification.body_str("invitedBy").map(str::to_string);
    let role = notification.body_str("role").map(str::to_string);

    match NotificationType::parse(&notification.kind) {
        NotificationType::TeamInvite => NotificationView::TeamInvite {
            id,
            read,
            date_created,
            project: notification
                .body_str("projectId")
                .and_then(|pid| related.projects.get(pid))
                .map(ProjectListItem::from),
            invited_by,
            role,
        },
        NotificationType::OrganizationInvite => NotificationView::OrganizationInvite {
            id,
            read,
            date_created,
            organization: notification
                .body_str("orgId")
                .and_then(|oid| related.organizations.get(oid))
                .map(OrganizationListItem::from),
            invited_by,
            role,
        },
        NotificationType::Unknown(kind) => {
            tracing::debug!(notification_id = %id, kind = %kind, "Rendering notification of unknown type");
            NotificationView::Unknown {
                id,
                read,
                date_created,
                original_type: kind,
                body: notification.body.clone(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn notification(kind: &str, body: Value) -> Notification {
        Notification {
            id: "n1".into(),
            user_id: "u1".into(),
            kind: kind.into(),
            body: body.as_object().cloned().unwrap_or_default(),
            read: false,
            date_created: Utc::now(),
        }
    }

    #[test]
    fn parses_known_and_unknown_types() {
        assert_eq!(NotificationType::parse("team_invite"), NotificationType::TeamInvite);
        assert_eq!(
            NotificationType::parse("status_change"),
            NotificationType::Unknown("status_change".into())
        );
        assert_eq!(NotificationType::parse("status_change").as_str(), "status_change");
    }

    #[test]
    fn collects_related_ids_once() {
        let list = vec![
            notification(TEAM_INVITE, json!({ "projectId": "p1" })),
            notification(TEAM_INVITE, json!({ "projectId": "p1" })),
            notification(ORGANIZATION_INVITE, json!({ "orgId": "o1" })),
            notification("something_else", json!({ "projectId": "p2" })),
        ];
        assert_eq!(related_ids(&list), (vec!["p1".to_string()], vec!["o1".to_string()]));
    }

    #[test]
    fn unknown_types_fall_back_to_raw_body() {
        let view = render(
            &notification("status_change", json!({ "from": "draft" })),
            &RelatedEntities::default(),
        );
        let value = serde_json::to_value(view).unwrap();
        assert_eq!(value["type"], "unknown");
        assert_eq!(value["originalType"], "status_change");
        assert_eq!(value["body"]["from"], "draft");
    }

    #[test]
    fn team_invite_without_a_loaded_project_still_renders() {
        let view = render(
            &notification(TEAM_INVITE, json!({ "projectId": "gone", "invitedBy": "u2", "role": "Member" })),
            &RelatedEntities::default(),
        );
        let value = serde_json::to_value(view).unwrap();
        assert_eq!(value["type"], "team_invite");
        assert_eq!(value["project"], Value::Null);
        assert_eq!(value["invitedBy"], "u2");
    }
}
