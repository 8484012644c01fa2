use std::time::Duration;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use sqlx::{postgres::PgPoolOptions, types::Json, PgPool};
use tracing::info;

use super::models::{Notification, Organization, Project};
use super::{Store, StoreError};
use crate::config::DatabaseConfig;

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS projects (
        id TEXT PRIMARY KEY,
        slug TEXT NOT NULL UNIQUE,
        data JSONB NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS organizations (
        id TEXT PRIMARY KEY,
        slug TEXT NOT NULL UNIQUE,
        data JSONB NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS notifications (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        date_created TIMESTAMPTZ NOT NULL,
        data JSONB NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS notifications_user_id_idx ON notifications (user_id)",
];

/// Postgres-backed store. Each entity is kept as one JSONB document, with the
/// columns needed for lookups and uniqueness pulled out alongside it.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let url = config.url.as_deref().ok_or(StoreError::InvalidDatabaseUrl)?;
        url::Url::parse(url).map_err(|_| StoreError::InvalidDatabaseUrl)?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        info!("Connected to database with {} max connections", config.max_connections);
        Ok(store)
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    async fn find_one<T: DeserializeOwned + Send + Unpin + 'static>(
        &self,
        table: &str,
        slug_or_id: &str,
    ) -> Result<Option<T>, StoreError> {
        let row: Option<(Json<T>,)> = sqlx::query_as(&find_one_sql(table))
            .bind(slug_or_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(Json(value),)| value))
    }

    async fn find_many<T: DeserializeOwned + Send + Unpin + 'static>(
        &self,
        table: &str,
        ids: &[String],
    ) -> Result<Vec<T>, StoreError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let query = format!("SELECT data FROM {table} WHERE id = ANY($1)");
        let rows: Vec<(Json<T>,)> = sqlx::query_as(&query)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|(Json(value),)| value).collect())
    }

    async fn insert_document<T: Serialize + Sync>(
        &self,
        table: &str,
        id: &str,
        slug: &str,
        value: &T,
    ) -> Result<(), StoreError> {
        let query = format!("INSERT INTO {table} (id, slug, data) VALUES ($1, $2, $3)");
        sqlx::query(&query)
            .bind(id)
            .bind(slug)
            .bind(Json(value))
            .execute(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, slug))?;
        Ok(())
    }

    /// Writes `value` only if the stored document is still at `expected`.
    /// `value` must already carry the next revision.
    async fn update_document<T: Serialize + Sync>(
        &self,
        table: &str,
        id: &str,
        slug: &str,
        expected: i64,
        value: &T,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(&update_sql(table))
            .bind(id)
            .bind(slug)
            .bind(Json(value))
            .bind(expected)
            .execute(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, slug))?;
        if result.rows_affected() > 0 {
            return Ok(());
        }

        let query = format!("SELECT EXISTS (SELECT 1 FROM {table} WHERE id = $1)");
        let (exists,): (bool,) = sqlx::query_as(&query).bind(id).fetch_one(&self.pool).await?;
        if exists {
            Err(StoreError::Stale(format!("{table} '{id}'")))
        } else {
            Err(StoreError::NotFound(format!("{table} '{id}'")))
        }
    }
}

/// A slug may look like another row's id; the id match wins
fn find_one_sql(table: &str) -> String {
    format!("SELECT data FROM {table} WHERE id = $1 OR slug = $1 ORDER BY (id = $1) DESC LIMIT 1")
}

fn update_sql(table: &str) -> String {
    format!(
        "UPDATE {table} SET slug = $2, data = $3 \
         WHERE id = $1 AND COALESCE((data->>'revision')::BIGINT, 0) = $4"
    )
}

fn map_unique_violation(error: sqlx::Error, slug: &str) -> StoreError {
    match &error {
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
            StoreError::Conflict(format!("slug '{slug}'"))
        }
        _ => StoreError::Sqlx(error),
    }
}

#[async_trait]
impl Store for PgStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn find_project(&self, slug_or_id: &str) -> Result<Option<Project>, StoreError> {
        self.find_one("projects", slug_or_id).await
    }

    async fn find_projects(&self, ids: &[String]) -> Result<Vec<Project>, StoreError> {
        self.find_many("projects", ids).await
    }

    async fn insert_project(&self, project: &Project) -> Result<(), StoreError> {
        self.insert_document("projects", &project.id, &project.slug, project).await
    }

    async fn update_project(&self, project: &Project) -> Result<(), StoreError> {
        let mut next = project.clone();
        next.revision += 1;
        self.update_document("projects", &project.id, &project.slug, project.revision, &next)
            .await
    }

    async fn find_organization(&self, slug_or_id: &str) -> Result<Option<Organization>, StoreError> {
        self.find_one("organizations", slug_or_id).await
    }

    async fn find_organizations(&self, ids: &[String]) -> Result<Vec<Organization>, StoreError> {
        self.find_many("organizations", ids).await
    }

    async fn insert_organization(&self, organization: &Organization) -> Result<(), StoreError> {
        self.insert_document("organizations", &organization.id, &organization.slug, organization)
            .await
    }

    async fn update_organization(&self, organization: &Organization) -> Result<(), StoreError> {
        let mut next = organization.clone();
        next.revision += 1;
        self.update_document(
            "organizations",
            &organization.id,
            &organization.slug,
            organization.revision,
            &next,
        )
        .await
    }

    async fn notifications_for_user(&self, user_id: &str) -> Result<Vec<Notification>, StoreError> {
        let rows: Vec<(Json<Notification>,)> = sqlx::query_as(
            "SELECT data FROM notifications WHERE user_id = $1 ORDER BY date_created DESC, id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|(Json(n),)| n).collect())
    }

    async fn insert_notification(&self, notification: &Notification) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO notifications (id, user_id, date_created, data) VALUES ($1, $2, $3, $4)")
            .bind(&notification.id)
            .bind(&notification.user_id)
            .bind(notification.date_created)
            .bind(Json(notification))
            .execute(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, &notification.id))?;
        Ok(())
    }

    async fn update_notification(&self, notification: &Notification) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE notifications SET data = $2 WHERE id = $1")
            .bind(&notification.id)
            .bind(Json(notification))
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("notification '{}'", notification.id)));
        }
        Ok(())
    }

    async fn delete_notification(&self, id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
