/// Shared types used across the codebase

use serde::{Deserialize, Serialize};

pub const MIN_PROJECT_NAME_LENGTH: u64 = 3;
pub const MAX_PROJECT_NAME_LENGTH: u64 = 32;
pub const MAX_PROJECT_SUMMARY_LENGTH: u64 = 320;
pub const MAX_PROJECT_DESCRIPTION_LENGTH: u64 = 65536;
pub const MAX_EXTERNAL_LINK_LENGTH: u64 = 256;
pub const MAX_FEATURED_CATEGORIES: u64 = 3;
pub const MAX_CATEGORIES: u64 = 16;
pub const MAX_GALLERY_ITEMS: usize = 32;
pub const MIN_GALLERY_TITLE_LENGTH: u64 = 2;
pub const MAX_GALLERY_TITLE_LENGTH: u64 = 32;
pub const MAX_GALLERY_DESCRIPTION_LENGTH: u64 = 256;
pub const MAX_LICENSE_NAME_LENGTH: u64 = 128;
pub const MAX_VERSION_TITLE_LENGTH: u64 = 64;
pub const MAX_VERSION_NUMBER_LENGTH: u64 = 32;
pub const MAX_VERSION_CHANGELOG_LENGTH: u64 = 65536;
pub const MAX_VERSION_DEPENDENCIES: u64 = 256;
pub const MIN_ORGANIZATION_NAME_LENGTH: u64 = 2;
pub const MAX_ORGANIZATION_NAME_LENGTH: u64 = 32;
pub const MAX_ORGANIZATION_DESCRIPTION_LENGTH: u64 = 256;
pub const MAX_MEMBER_ROLE_LENGTH: u64 = 32;

/// Slugs that collide with static route segments
pub const RESERVED_SLUGS: &[&str] = &["new", "version", "gallery", "members", "dependencies"];

pub const KNOWN_CATEGORIES: &[&str] = &[
    "adventure",
    "atmosphere",
    "audio",
    "blocks",
    "cursed",
    "decoration",
    "economy",
    "equipment",
    "food",
    "game-mechanics",
    "library",
    "magic",
    "management",
    "minigame",
    "mobs",
    "optimization",
    "realistic",
    "social",
    "storage",
    "technology",
    "transportation",
    "utility",
    "worldgen",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectType {
    Mod,
    Modpack,
    Shader,
    ResourcePack,
    Datapack,
    Plugin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectVisibility {
    Listed,
    Private,
    Unlisted,
    Archived,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentSupport {
    Required,
    Optional,
    Unsupported,
    Unknown,
}

impl Default for EnvironmentSupport {
    fn default() -> Self {
        Self::Unknown
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseChannel {
    Release,
    Beta,
    Alpha,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyType {
    Required,
    Optional,
    Incompatible,
    Embedded,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn enums_use_wire_names() {
        assert_eq!(serde_json::to_value(ProjectType::ResourcePack).unwrap(), json!("resource-pack"));
        assert_eq!(serde_json::to_value(ProjectVisibility::Listed).unwrap(), json!("listed"));
        assert_eq!(EnvironmentSupport::default(), EnvironmentSupport::Unknown);
    }
}
