//! Public wire shapes for stored entities.
//!
//! Views always carry the same field set for a given entity; what changes
//! with the viewer is the content of collections (pending members), never
//! which keys are present.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::database::models::{
    ExternalLinks, GalleryItem, License, Organization, Project, TeamMember, Version,
};
use crate::types::{EnvironmentSupport, ProjectType, ProjectVisibility, ReleaseChannel};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectView {
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
    pub members: Vec<TeamMember>,
    pub version_count: usize,
    pub organisation_id: Option<String>,
    pub date_created: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
}

impl ProjectView {
    /// `show_pending` includes members who have not accepted their invite yet
    pub fn new(project: &Project, show_pending: bool) -> Self {
        let mut gallery = project.gallery.clone();
        gallery.sort_by(|a, b| b.featured.cmp(&a.featured).then(a.order_index.cmp(&b.order_index)));

        Self {
            id: project.id.clone(),
            name: project.name.clone(),
            slug: project.slug.clone(),
            summary: project.summary.clone(),
            description: project.description.clone(),
            icon: project.icon.clone(),
            project_type: project.project_type,
            visibility: project.visibility,
            client_side: project.client_side,
            server_side: project.server_side,
            categories: project.categories.clone(),
            featured_categories: project.featured_categories.clone(),
            license: project.license.clone(),
            external_links: project.external_links.clone(),
            gallery,
            members: visible_members(&project.members, show_pending),
            version_count: project.versions.len(),
            organisation_id: project.organisation_id.clone(),
            date_created: project.date_created,
            date_updated: project.date_updated,
        }
    }
}

/// Compact project shape used in lists and dependency lookups
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectListItem {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub summary: String,
    pub icon: Option<String>,
    #[serde(rename = "type")]
    pub project_type: ProjectType,
    pub visibility: ProjectVisibility,
    pub categories: Vec<String>,
    pub date_updated: DateTime<Utc>,
}

impl From<&Project> for ProjectListItem {
    fn from(project: &Project) -> Self {
        Self {
            id: project.id.clone(),
            name: project.name.clone(),
            slug: project.slug.clone(),
            summary: project.summary.clone(),
            icon: project.icon.clone(),
            project_type: project.project_type,
            visibility: project.visibility,
            categories: project.categories.clone(),
            date_updated: project.date_updated,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionListItem {
    pub id: String,
    pub project_id: String,
    pub title: String,
    pub version_number: String,
    pub release_channel: ReleaseChannel,
    pub game_versions: Vec<String>,
    pub loaders: Vec<String>,
    pub featured: bool,
    pub date_published: DateTime<Utc>,
}

impl From<&Version> for VersionListItem {
    fn from(version: &Version) -> Self {
        Self {
            id: version.id.clone(),
            project_id: version.project_id.clone(),
            title: version.title.clone(),
            version_number: version.version_number.clone(),
            release_channel: version.release_channel,
            game_versions: version.game_versions.clone(),
            loaders: version.loaders.clone(),
            featured: version.featured,
            date_published: version.date_published,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationView {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub icon: Option<String>,
    pub members: Vec<TeamMember>,
    pub date_created: DateTime<Utc>,
}

impl OrganizationView {
    pub fn new(organization: &Organization, show_pending: bool) -> Self {
        Self {
            id: organization.id.clone(),
            name: organization.name.clone(),
            slug: organization.slug.clone(),
            description: organization.description.clone(),
            icon: organization.icon.clone(),
            members: visible_members(&organization.members, show_pending),
            date_created: organization.date_created,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationListItem {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub icon: Option<String>,
}

impl From<&Organization> for OrganizationListItem {
    fn from(organization: &Organization) -> Self {
        Self {
            id: organization.id.clone(),
            name: organization.name.clone(),
            slug: organization.slug.clone(),
            icon: organization.icon.clone(),
        }
    }
}

fn visible_members(members: &[TeamMember], show_pending: bool) -> Vec<TeamMember> {
    members
        .iter()
        .filter(|m| show_pending || m.accepted)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn project() -> Project {
        Project {
            id: "p1".into(),
            name: "Example Mod".into(),
            slug: "example-mod".into(),
            summary: "A test mod".into(),
            description: String::new(),
            icon: None,
            project_type: ProjectType::Mod,
            visibility: ProjectVisibility::Listed,
            client_side: EnvironmentSupport::Required,
            server_side: EnvironmentSupport::Optional,
            categories: vec!["magic".into()],
            featured_categories: vec![],
            license: License::default(),
            external_links: ExternalLinks::default(),
            gallery: vec![],
            versions: vec![],
            members: vec![TeamMember::owner("owner"), TeamMember::invited("guest", "Member")],
            organisation_id: None,
            date_created: Utc::now(),
            date_updated: Utc::now(),
            revision: 0,
        }
    }

    fn keys(value: &Value) -> Vec<String> {
        let mut keys: Vec<String> = value.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }

    #[test]
    fn pending_members_only_change_the_member_list() {
        let project = project();
        let public = serde_json::to_value(ProjectView::new(&project, false)).unwrap();
        let managed = serde_json::to_value(ProjectView::new(&project, true)).unwrap();

        assert_eq!(keys(&public), keys(&managed));
        assert_eq!(public["members"].as_array().unwrap().len(), 1);
        assert_eq!(managed["members"].as_array().unwrap().len(), 2);
        assert_eq!(public["type"], "mod");
        assert_eq!(public["clientSide"], "required");
    }
}
