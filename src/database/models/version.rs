use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{DependencyType, ReleaseChannel};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependency {
    pub project_id: String,
    pub version_id: Option<String>,
    pub dependency_type: DependencyType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    pub id: String,
    pub project_id: String,
    pub title: String,
    pub version_number: String,
    pub changelog: Option<String>,
    pub release_channel: ReleaseChannel,
    pub game_versions: Vec<String>,
    pub loaders: Vec<String>,
    pub featured: bool,
    pub dependencies: Vec<Dependency>,
    pub author_id: String,
    pub date_published: DateTime<Utc>,
}
