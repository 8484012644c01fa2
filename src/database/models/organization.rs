use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::team::TeamMember;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub icon: Option<String>,
    pub members: Vec<TeamMember>,
    pub date_created: DateTime<Utc>,
    #[serde(default)]
    pub revision: i64,
}

impl Organization {
    pub fn member(&self, user_id: &str) -> Option<&TeamMember> {
        self.members.iter().find(|m| m.user_id == user_id)
    }

    pub fn is_owner(&self, user_id: &str) -> bool {
        self.member(user_id).map(|m| m.is_owner).unwrap_or(false)
    }
}
