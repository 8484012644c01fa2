use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::{rule_error, FormSchema};
use crate::types::{DependencyType, ReleaseChannel};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionDependencyInput {
    pub project_id: String,
    #[serde(default, deserialize_with = "super::coerce::optional_string")]
    pub version_id: Option<String>,
    pub dependency_type: DependencyType,
}

/// Version numbers end up in URLs, so they stay printable and slash-free
fn validate_version_number(number: &str) -> Result<(), ValidationError> {
    let valid = number
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | '+'));
    if !valid {
        return Err(rule_error(
            "version_number",
            "Version number can only contain letters, numbers, dots, dashes, underscores and plus signs",
        ));
    }
    Ok(())
}

fn validate_dependency_list(dependencies: &[VersionDependencyInput]) -> Result<(), ValidationError> {
    for (index, dependency) in dependencies.iter().enumerate() {
        if dependency.project_id.trim().is_empty() {
            return Err(rule_error("dependency", "Every dependency needs a project id"));
        }
        let duplicate = dependencies[..index]
            .iter()
            .any(|d| d.project_id == dependency.project_id && d.version_id == dependency.version_id);
        if duplicate {
            return Err(rule_error("dependency", "The same dependency is listed more than once"));
        }
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewVersionForm {
    #[validate(length(min = 1, max = 64, message = "Version title must be between 1 and 64 characters"))]
    pub title: String,

    #[validate(
        length(min = 1, max = 32, message = "Version number must be between 1 and 32 characters"),
        custom(function = "validate_version_number")
    )]
    pub version_number: String,

    #[serde(default, deserialize_with = "super::coerce::optional_string")]
    #[validate(length(max = 65536, message = "Changelog is too long"))]
    pub changelog: Option<String>,

    pub release_channel: ReleaseChannel,

    #[serde(deserialize_with = "super::coerce::string_list")]
    #[validate(length(min = 1, message = "Select at least one game version"))]
    pub game_versions: Vec<String>,

    #[serde(default, deserialize_with = "super::coerce::string_list")]
    pub loaders: Vec<String>,

    #[serde(default, deserialize_with = "super::coerce::boolean")]
    pub featured: bool,

    #[serde(default)]
    #[validate(
        length(max = 256, message = "A version can have at most 256 dependencies"),
        custom(function = "validate_dependency_list")
    )]
    pub dependencies: Vec<VersionDependencyInput>,
}

impl FormSchema for NewVersionForm {
    const FIELDS: &'static [&'static str] = &[
        "title",
        "version_number",
        "changelog",
        "release_channel",
        "game_versions",
        "loaders",
        "featured",
        "dependencies",
    ];
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::parse_value_to_schema;
    use serde_json::json;

    fn base() -> serde_json::Value {
        json!({
            "title": "First release",
            "versionNumber": "1.0.0",
            "releaseChannel": "release",
            "gameVersions": ["1.20.1"],
            "loaders": ["fabric"],
        })
    }

    #[test]
    fn accepts_minimal_version() {
        let data = parse_value_to_schema::<NewVersionForm>(base()).data().unwrap();
        assert_eq!(data.version_number, "1.0.0");
        assert!(data.dependencies.is_empty());
        assert!(!data.featured);
    }

    #[test]
    fn rejects_slash_in_version_number() {
        let mut input = base();
        input["versionNumber"] = json!("1.0/2");
        let validated = parse_value_to_schema::<NewVersionForm>(input);
        assert!(validated.error().unwrap().starts_with("Version number can only contain"));
    }

    #[test]
    fn rejects_duplicate_dependencies() {
        let mut input = base();
        input["dependencies"] = json!([
            { "projectId": "p1", "dependencyType": "required" },
            { "projectId": "p1", "dependencyType": "optional" },
        ]);
        let validated = parse_value_to_schema::<NewVersionForm>(input);
        assert_eq!(validated.error(), Some("The same dependency is listed more than once"));
    }

    #[test]
    fn requires_a_game_version() {
        let mut input = base();
        input["gameVersions"] = json!([]);
        let validated = parse_value_to_schema::<NewVersionForm>(input);
        assert_eq!(validated.error(), Some("Select at least one game version"));
    }
}
