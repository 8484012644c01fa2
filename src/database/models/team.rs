use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub user_id: String,
    pub role: String,
    pub is_owner: bool,
    pub accepted: bool,
    pub date_joined: DateTime<Utc>,
}

impl TeamMember {
    pub fn owner(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            role: "Owner".to_string(),
            is_owner: true,
            accepted: true,
            date_joined: Utc::now(),
        }
    }

    pub fn invited(user_id: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            role: role.into(),
            is_owner: false,
            accepted: false,
            date_joined: Utc::now(),
        }
    }
}
