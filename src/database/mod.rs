pub mod memory;
pub mod models;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use models::{Notification, Organization, Project};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Errors from the persistence layer
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The stored revision moved on since the caller loaded it
    #[error("Stale write: {0}")]
    Stale(String),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Persistence for projects, organizations and notifications.
///
/// `find_*` methods match either the slug or the id, preferring the id when
/// both would match. Slugs are unique per entity kind; inserts and updates
/// that would break that return `StoreError::Conflict`.
///
/// `update_project` and `update_organization` only succeed when the stored
/// revision equals the one carried by the argument, and store it bumped by
/// one. Otherwise they return `StoreError::Stale`.
#[async_trait]
pub trait Store: Send + Sync {
    async fn health_check(&self) -> Result<(), StoreError>;

    async fn find_project(&self, slug_or_id: &str) -> Result<Option<Project>, StoreError>;
    async fn find_projects(&self, ids: &[String]) -> Result<Vec<Project>, StoreError>;
    async fn insert_project(&self, project: &Project) -> Result<(), StoreError>;
    async fn update_project(&self, project: &Project) -> Result<(), StoreError>;

    async fn find_organization(&self, slug_or_id: &str) -> Result<Option<Organization>, StoreError>;
    async fn find_organizations(&self, ids: &[String]) -> Result<Vec<Organization>, StoreError>;
    async fn insert_organization(&self, organization: &Organization) -> Result<(), StoreError>;
    async fn update_organization(&self, organization: &Organization) -> Result<(), StoreError>;

    /// Newest first
    async fn notifications_for_user(&self, user_id: &str) -> Result<Vec<Notification>, StoreError>;
    async fn insert_notification(&self, notification: &Notification) -> Result<(), StoreError>;
    async fn update_notification(&self, notification: &Notification) -> Result<(), StoreError>;
    /// Returns whether a row was removed
    async fn delete_notification(&self, id: &str) -> Result<bool, StoreError>;
}
