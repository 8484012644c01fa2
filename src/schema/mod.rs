//! Declarative request schemas and the uniform `Validated` result every route consumes.
//!
//! A schema is a `Deserialize + Validate` struct: serde checks shape, types and
//! enum values, then `validator` checks lengths, URLs and custom rules. Only
//! the first problem found is reported.

pub mod organization;
pub mod project;
pub mod version;

mod coerce;

use std::borrow::Cow;

use serde::de::DeserializeOwned;
use serde_json::Value;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::types::{KNOWN_CATEGORIES, RESERVED_SLUGS};

pub use organization::{CreateOrganizationForm, InviteMemberForm};
pub use project::{
    AddNewGalleryImageForm, DeleteGalleryImageForm, GeneralProjectSettingsForm, NewProjectForm, UpdateDescriptionForm,
    UpdateExternalLinksForm, UpdateGalleryImageForm, UpdateProjectLicenseForm, UpdateProjectTagsForm,
};
pub use version::{NewVersionForm, VersionDependencyInput};

/// Outcome of validating a payload: conforming data or one error message
#[derive(Debug, Clone, PartialEq)]
pub enum Validated<T> {
    Data(T),
    Error(String),
}

impl<T> Validated<T> {
    pub fn data(self) -> Option<T> {
        match self {
            Validated::Data(data) => Some(data),
            Validated::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Validated::Data(_) => None,
            Validated::Error(message) => Some(message),
        }
    }

    pub fn into_result(self) -> Result<T, String> {
        match self {
            Validated::Data(data) => Ok(data),
            Validated::Error(message) => Err(message),
        }
    }
}

pub trait FormSchema: DeserializeOwned + Validate {
    /// Struct field names in declaration order; decides which error is reported first
    const FIELDS: &'static [&'static str];
}

pub fn parse_value_to_schema<T: FormSchema>(value: Value) -> Validated<T> {
    let data: T = match serde_json::from_value(value) {
        Ok(data) => data,
        Err(e) => return Validated::Error(e.to_string()),
    };

    match data.validate() {
        Ok(()) => Validated::Data(data),
        Err(errors) => Validated::Error(first_error_message::<T>(&errors)),
    }
}

fn first_error_message<T: FormSchema>(errors: &ValidationErrors) -> String {
    let field_errors = errors.field_errors();

    T::FIELDS
        .iter()
        .copied()
        .chain(std::iter::once("__all__"))
        .find_map(|field| {
            let error = field_errors.get(field)?.first()?;
            Some(match &error.message {
                Some(message) => message.to_string(),
                None => format!("Invalid value for {}", field),
            })
        })
        .unwrap_or_else(|| "Invalid data".to_string())
}

pub(crate) fn rule_error(code: &'static str, message: impl Into<Cow<'static, str>>) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

/// Lowercase letters, digits, `-` and `_`, not starting or ending with a separator
pub fn is_url_safe_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
        && !slug.starts_with(['-', '_'])
        && !slug.ends_with(['-', '_'])
}

pub(crate) fn validate_url_slug(slug: &str) -> Result<(), ValidationError> {
    if !is_url_safe_slug(slug) {
        return Err(rule_error(
            "slug",
            "Slug can only contain lowercase letters, numbers, dashes and underscores",
        ));
    }
    if RESERVED_SLUGS.contains(&slug) {
        return Err(rule_error("reserved_slug", format!("\"{}\" is a reserved slug", slug)));
    }
    Ok(())
}

pub(crate) fn validate_categories(categories: &[String]) -> Result<(), ValidationError> {
    match categories.iter().find(|c| !KNOWN_CATEGORIES.contains(&c.as_str())) {
        Some(unknown) => Err(rule_error("category", format!("Unknown category \"{}\"", unknown))),
        None => Ok(()),
    }
}
