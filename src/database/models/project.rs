use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::team::TeamMember;
use super::version::Version;
use crate::types::{EnvironmentSupport, ProjectType, ProjectVisibility};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct License {
    pub id: Option<String>,
    pub name: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalLinks {
    pub issue_tracker: Option<String>,
    pub source_code: Option<String>,
    pub wiki_page: Option<String>,
    pub discord_server: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryItem {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub image_url: String,
    pub order_index: i32,
    pub featured: bool,
    pub date_created: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub summary: String,
    pub description: String,
    pub icon: Option<String>,
    #[serde(rename = "type")]
    pub project_type: ProjectType,
    pub visibility: ProjectVisibility,
    pub client_side: EnvironmentSupport,
    pub server_side: EnvironmentSupport,
    pub categories: Vec<String>,
    pub featured_categories: Vec<String>,
    pub license: License,
    pub external_links: ExternalLinks,
    pub gallery: Vec<GalleryItem>,
    pub versions: Vec<Version>,
    pub members: Vec<TeamMember>,
    pub organisation_id: Option<String>,
    pub date_created: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
    /// Bumped by the store on every update; a stale copy cannot be written back
    #[serde(default)]
    pub revision: i64,
}

impl Project {
    pub fn member(&self, user_id: &str) -> Option<&TeamMember> {
        self.members.iter().find(|m| m.user_id == user_id)
    }

    /// Accepted members only; pending invites grant nothing
    pub fn is_member(&self, user_id: &str) -> bool {
        self.member(user_id).map(|m| m.accepted).unwrap_or(false)
    }

    pub fn is_owner(&self, user_id: &str) -> bool {
        self.member(user_id).map(|m| m.is_owner).unwrap_or(false)
    }

    /// Lookup by version number or id
    pub fn version(&self, slug_or_id: &str) -> Option<&Version> {
        self.versions
            .iter()
            .find(|v| v.version_number == slug_or_id || v.id == slug_or_id)
    }

    /// Gallery in display order: featured first, then by index
    pub fn sort_gallery(&mut self) {
        self.gallery
            .sort_by(|a, b| b.featured.cmp(&a.featured).then(a.order_index.cmp(&b.order_index)));
    }

    pub fn touch(&mut self) {
        self.date_updated = Utc::now();
    }
}
