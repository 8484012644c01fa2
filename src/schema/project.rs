use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::{rule_error, validate_categories, validate_url_slug, FormSchema};
use crate::types::{EnvironmentSupport, ProjectType, ProjectVisibility};

fn validate_initial_visibility(visibility: &ProjectVisibility) -> Result<(), ValidationError> {
    match visibility {
        ProjectVisibility::Archived => Err(rule_error("visibility", "A new project cannot be archived")),
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct NewProjectForm {
    #[validate(length(
        min = 3,
        max = 32,
        message = "Project name must be between 3 and 32 characters"
    ))]
    pub name: String,

    #[validate(
        length(
            min = 3,
            max = 32,
            message = "Project url slug must be between 3 and 32 characters"
        ),
        custom(function = "validate_url_slug")
    )]
    pub url: String,

    #[validate(custom(function = "validate_initial_visibility"))]
    pub visibility: ProjectVisibility,

    pub project_type: ProjectType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 320, message = "Summary can have at most 320 characters"))]
    pub summary: Option<String>,
}

impl FormSchema for NewProjectForm {
    const FIELDS: &'static [&'static str] = &["name", "url", "visibility", "project_type", "summary"];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GeneralProjectSettingsForm {
    #[serde(default, deserialize_with = "super::coerce::optional_string")]
    #[validate(url(message = "Icon must be a valid URL"))]
    pub icon: Option<String>,

    #[validate(length(
        min = 3,
        max = 32,
        message = "Project name must be between 3 and 32 characters"
    ))]
    pub name: String,

    #[validate(
        length(
            min = 3,
            max = 32,
            message = "Project url slug must be between 3 and 32 characters"
        ),
        custom(function = "validate_url_slug")
    )]
    pub slug: String,

    pub visibility: ProjectVisibility,

    #[serde(default)]
    pub client_side: EnvironmentSupport,

    #[serde(default)]
    pub server_side: EnvironmentSupport,

    #[serde(default)]
    #[validate(length(max = 320, message = "Summary can have at most 320 characters"))]
    pub summary: String,
}

impl FormSchema for GeneralProjectSettingsForm {
    const FIELDS: &'static [&'static str] = &["icon", "name", "slug", "visibility", "client_side", "server_side", "summary"];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct UpdateDescriptionForm {
    #[serde(default, deserialize_with = "super::coerce::optional_string")]
    #[validate(length(max = 65536, message = "Description is too long"))]
    pub description: Option<String>,
}

impl FormSchema for UpdateDescriptionForm {
    const FIELDS: &'static [&'static str] = &["description"];
}

fn validate_featured_subset(form: &UpdateProjectTagsForm) -> Result<(), ValidationError> {
    match form.featured_categories.iter().find(|c| !form.categories.contains(c)) {
        Some(category) => Err(rule_error(
            "featured_category",
            format!("Featured category \"{}\" must also be one of the project's categories", category),
        )),
        None => Ok(()),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_featured_subset"))]
pub struct UpdateProjectTagsForm {
    #[serde(default, deserialize_with = "super::coerce::string_list")]
    #[validate(
        length(max = 16, message = "Too many categories"),
        custom(function = "validate_categories")
    )]
    pub categories: Vec<String>,

    #[serde(default, deserialize_with = "super::coerce::string_list")]
    #[validate(length(max = 3, message = "You can feature at most 3 categories"))]
    pub featured_categories: Vec<String>,
}

impl FormSchema for UpdateProjectTagsForm {
    const FIELDS: &'static [&'static str] = &["categories", "featured_categories"];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateExternalLinksForm {
    #[serde(default, deserialize_with = "super::coerce::optional_string")]
    #[validate(
        url(message = "Issue tracker must be a valid URL"),
        length(max = 256, message = "Issue tracker URL is too long")
    )]
    pub issue_tracker: Option<String>,

    #[serde(default, deserialize_with = "super::coerce::optional_string")]
    #[validate(
        url(message = "Source code link must be a valid URL"),
        length(max = 256, message = "Source code URL is too long")
    )]
    pub source_code: Option<String>,

    #[serde(default, deserialize_with = "super::coerce::optional_string")]
    #[validate(
        url(message = "Wiki page must be a valid URL"),
        length(max = 256, message = "Wiki page URL is too long")
    )]
    pub wiki_page: Option<String>,

    #[serde(default, deserialize_with = "super::coerce::optional_string")]
    #[validate(
        url(message = "Discord invite must be a valid URL"),
        length(max = 256, message = "Discord invite URL is too long")
    )]
    pub discord_server: Option<String>,
}

impl FormSchema for UpdateExternalLinksForm {
    const FIELDS: &'static [&'static str] = &["issue_tracker", "source_code", "wiki_page", "discord_server"];
}

fn validate_license_identity(form: &UpdateProjectLicenseForm) -> Result<(), ValidationError> {
    if form.id.is_none() && form.name.is_none() {
        return Err(rule_error("license", "Either a license id or a license name is required"));
    }
    Ok(())
}

fn validate_spdx_id(id: &str) -> Result<(), ValidationError> {
    let valid = id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '+' | ' ' | '(' | ')'));
    if !valid {
        return Err(rule_error("spdx", "License id must be an SPDX identifier or expression"));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_license_identity"))]
pub struct UpdateProjectLicenseForm {
    #[serde(default, deserialize_with = "super::coerce::optional_string")]
    #[validate(
        length(max = 128, message = "License id is too long"),
        custom(function = "validate_spdx_id")
    )]
    pub id: Option<String>,

    #[serde(default, deserialize_with = "super::coerce::optional_string")]
    #[validate(length(max = 128, message = "License name is too long"))]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "super::coerce::optional_string")]
    #[validate(url(message = "License URL must be a valid URL"))]
    pub url: Option<String>,
}

impl FormSchema for UpdateProjectLicenseForm {
    const FIELDS: &'static [&'static str] = &["id", "name", "url"];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddNewGalleryImageForm {
    #[validate(url(message = "Image must be a valid URL"))]
    pub image: String,

    #[validate(length(
        min = 2,
        max = 32,
        message = "Title must be between 2 and 32 characters"
    ))]
    pub title: String,

    #[serde(default, deserialize_with = "super::coerce::optional_string")]
    #[validate(length(max = 256, message = "Description can have at most 256 characters"))]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "super::coerce::int")]
    #[validate(range(min = 0, message = "Order index cannot be negative"))]
    pub order_index: i32,

    #[serde(default, deserialize_with = "super::coerce::boolean")]
    pub featured: bool,
}

impl FormSchema for AddNewGalleryImageForm {
    const FIELDS: &'static [&'static str] = &["image", "title", "description", "order_index", "featured"];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGalleryImageForm {
    #[validate(length(
        min = 2,
        max = 32,
        message = "Title must be between 2 and 32 characters"
    ))]
    pub title: String,

    #[serde(default, deserialize_with = "super::coerce::optional_string")]
    #[validate(length(max = 256, message = "Description can have at most 256 characters"))]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "super::coerce::int")]
    #[validate(range(min = 0, message = "Order index cannot be negative"))]
    pub order_index: i32,

    #[serde(default, deserialize_with = "super::coerce::boolean")]
    pub featured: bool,
}

impl FormSchema for UpdateGalleryImageForm {
    const FIELDS: &'static [&'static str] = &["title", "description", "order_index", "featured"];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct DeleteGalleryImageForm {
    #[validate(length(min = 1, max = 64, message = "Invalid gallery image id"))]
    pub id: String,
}

impl FormSchema for DeleteGalleryImageForm {
    const FIELDS: &'static [&'static str] = &["id"];
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{parse_value_to_schema, Validated};
    use serde_json::json;

    #[test]
    fn new_project_roundtrip_keeps_exactly_the_given_fields() {
        let input = json!({
            "name": "Example Mod",
            "url": "example-mod",
            "visibility": "listed",
            "project_type": "mod",
            "summary": "A test mod",
        });

        let validated = parse_value_to_schema::<NewProjectForm>(input.clone());
        assert_eq!(validated.error(), None);

        let data = validated.data().unwrap();
        assert_eq!(serde_json::to_value(&data).unwrap(), input);
    }

    #[test]
    fn new_project_reports_first_violation_only() {
        let validated = parse_value_to_schema::<NewProjectForm>(json!({
            "name": "ab",
            "url": "Bad Slug",
            "visibility": "listed",
            "project_type": "mod",
        }));
        assert_eq!(
            validated,
            Validated::Error("Project name must be between 3 and 32 characters".to_string())
        );
    }

    #[test]
    fn new_project_rejects_unknown_enum_and_missing_fields() {
        let bad_type = parse_value_to_schema::<NewProjectForm>(json!({
            "name": "Example Mod", "url": "example-mod", "visibility": "listed", "project_type": "game"
        }));
        assert!(bad_type.error().unwrap().contains("unknown variant"));

        let missing = parse_value_to_schema::<NewProjectForm>(json!({ "name": "Example Mod" }));
        assert!(missing.error().unwrap().contains("missing field"));

        let archived = parse_value_to_schema::<NewProjectForm>(json!({
            "name": "Example Mod", "url": "example-mod", "visibility": "archived", "project_type": "mod"
        }));
        assert_eq!(archived.error(), Some("A new project cannot be archived"));
    }

    #[test]
    fn unknown_fields_are_dropped() {
        let data = parse_value_to_schema::<UpdateDescriptionForm>(json!({
            "description": "# Hello", "admin": true
        }))
        .data()
        .unwrap();
        assert_eq!(serde_json::to_value(data).unwrap(), json!({ "description": "# Hello" }));
    }

    #[test]
    fn featured_categories_must_be_a_subset() {
        let validated = parse_value_to_schema::<UpdateProjectTagsForm>(json!({
            "categories": ["magic", "storage"],
            "featuredCategories": ["food"],
        }));
        assert!(validated.error().unwrap().contains("\"food\""));

        let unknown = parse_value_to_schema::<UpdateProjectTagsForm>(json!({ "categories": ["spaceships"] }));
        assert_eq!(unknown.error(), Some("Unknown category \"spaceships\""));
    }

    #[test]
    fn empty_links_are_absent_and_bad_links_rejected() {
        let data = parse_value_to_schema::<UpdateExternalLinksForm>(json!({
            "issueTracker": "",
            "sourceCode": "https://github.com/example/mod",
        }))
        .data()
        .unwrap();
        assert_eq!(data.issue_tracker, None);
        assert_eq!(data.source_code.as_deref(), Some("https://github.com/example/mod"));

        let bad = parse_value_to_schema::<UpdateExternalLinksForm>(json!({ "wikiPage": "not a url" }));
        assert_eq!(bad.error(), Some("Wiki page must be a valid URL"));
    }

    #[test]
    fn license_needs_id_or_name() {
        let none = parse_value_to_schema::<UpdateProjectLicenseForm>(json!({ "url": "https://example.com/l" }));
        assert_eq!(none.error(), Some("Either a license id or a license name is required"));

        let spdx = parse_value_to_schema::<UpdateProjectLicenseForm>(json!({ "id": "MIT OR Apache-2.0" }));
        assert_eq!(spdx.error(), None);
    }

    #[test]
    fn gallery_form_values_are_coerced() {
        let data = parse_value_to_schema::<AddNewGalleryImageForm>(json!({
            "image": "https://cdn.example.com/shot.png",
            "title": "Shot",
            "orderIndex": "3",
            "featured": "true",
        }))
        .data()
        .unwrap();
        assert_eq!(data.order_index, 3);
        assert!(data.featured);

        let negative = parse_value_to_schema::<UpdateGalleryImageForm>(json!({ "title": "Shot", "orderIndex": -1 }));
        assert_eq!(negative.error(), Some("Order index cannot be negative"));
    }
}
