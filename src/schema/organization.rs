use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{validate_url_slug, FormSchema};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct CreateOrganizationForm {
    #[validate(length(min = 2, max = 32, message = "Organization name must be between 2 and 32 characters"))]
    pub name: String,

    #[validate(
        length(min = 2, max = 32, message = "Organization url slug must be between 2 and 32 characters"),
        custom(function = "validate_url_slug")
    )]
    pub slug: String,

    #[serde(default)]
    #[validate(length(max = 256, message = "Description can have at most 256 characters"))]
    pub description: String,
}

impl FormSchema for CreateOrganizationForm {
    const FIELDS: &'static [&'static str] = &["name", "slug", "description"];
}

/// Invite a user to a project or organization team
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InviteMemberForm {
    #[validate(length(min = 1, max = 64, message = "A user id is required"))]
    pub user_id: String,

    #[serde(default = "default_member_role")]
    #[validate(length(min = 1, max = 32, message = "Role must be between 1 and 32 characters"))]
    pub role: String,
}

fn default_member_role() -> String {
    "Member".to_string()
}

impl FormSchema for InviteMemberForm {
    const FIELDS: &'static [&'static str] = &["user_id", "role"];
}
