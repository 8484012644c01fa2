use anyhow::Result;
use async_trait::async_trait;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde_json::json;

use super::{finish, new_id, Failure, StoreController, VersionController};
use crate::api::VersionListItem;
use crate::context::RequestContext;
use crate::database::models::{Dependency, Project, Version};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, Session};
use crate::schema::{NewVersionForm, VersionDependencyInput};

impl StoreController {
    /// Resolves dependency references (slug or id) to stored project and version ids
    async fn resolve_dependencies(
        &self,
        project: &Project,
        inputs: Vec<VersionDependencyInput>,
    ) -> Result<Vec<Dependency>, Failure> {
        let mut dependencies = Vec::with_capacity(inputs.len());

        for input in inputs {
            let target = self
                .store
                .find_project(&input.project_id)
                .await?
                .ok_or_else(|| ApiError::bad_request(format!("Dependency project \"{}\" not found", input.project_id)))?;

            if target.id == project.id {
                return Err(ApiError::bad_request("A project cannot depend on itself").into());
            }

            let version_id = match input.version_id {
                Some(reference) => {
                    let version = target.version(&reference).ok_or_else(|| {
                        ApiError::bad_request(format!(
                            "Version \"{}\" of dependency \"{}\" not found",
                            reference, target.slug
                        ))
                    })?;
                    Some(version.id.clone())
                }
                None => None,
            };

            dependencies.push(Dependency {
                project_id: target.id,
                version_id,
                dependency_type: input.dependency_type,
            });
        }

        Ok(dependencies)
    }
}

#[async_trait]
impl VersionController for StoreController {
    async fn list_versions(&self, _ctx: &RequestContext, slug: &str, session: Option<&Session>) -> Result<Response> {
        finish(
            async {
                let project = self.load_visible_project(slug, session).await?;
                let mut versions: Vec<&Version> = project.versions.iter().collect();
                versions.sort_by(|a, b| b.date_published.cmp(&a.date_published));
                let versions: Vec<VersionListItem> = versions.into_iter().map(VersionListItem::from).collect();

                Ok(ApiResponse::success(json!({ "versions": versions })).into_response())
            },
        )
        .await
    }

    async fn create_version(
        &self,
        ctx: &RequestContext,
        slug: &str,
        session: &Session,
        data: NewVersionForm,
    ) -> Result<Response> {
        finish(
            async {
                let mut project = self.load_managed_project(slug, session).await?;
                if project.version(&data.version_number).is_some() {
                    return Err(ApiError::conflict("A version with this number already exists").into());
                }

                let dependencies = self.resolve_dependencies(&project, data.dependencies).await?;
                let version = Version {
                    id: new_id(),
                    project_id: project.id.clone(),
                    title: data.title,
                    version_number: data.version_number,
                    changelog: data.changelog,
                    release_channel: data.release_channel,
                    game_versions: data.game_versions,
                    loaders: data.loaders,
                    featured: data.featured,
                    dependencies,
                    author_id: session.id.clone(),
                    date_published: Utc::now(),
                };
                let payload = json!({ "id": version.id, "versionNumber": version.version_number });

                project.versions.push(version);
                self.save_project(&mut project).await?;

                tracing::info!(request_id = %ctx.request_id, project_id = %project.id, "Version created");
                Ok(ApiResponse::success(payload).with_message("Version created").into_response())
            },
        )
        .await
    }

    async fn get_version(
        &self,
        _ctx: &RequestContext,
        slug: &str,
        version_slug: &str,
        session: Option<&Session>,
    ) -> Result<Response> {
        finish(
            async {
                let project = self.load_visible_project(slug, session).await?;
                let version = project
                    .version(version_slug)
                    .ok_or_else(|| ApiError::not_found("Version not found"))?;

                Ok(ApiResponse::success(json!({ "version": version })).into_response())
            },
        )
        .await
    }

    async fn delete_version(
        &self,
        ctx: &RequestContext,
        slug: &str,
        version_slug: &str,
        session: &Session,
    ) -> Result<Response> {
        finish(
            async {
                let mut project = self.load_managed_project(slug, session).await?;
                let version_id = project
                    .version(version_slug)
                    .map(|v| v.id.clone())
                    .ok_or_else(|| ApiError::not_found("Version not found"))?;

                project.versions.retain(|v| v.id != version_id);
                self.save_project(&mut project).await?;

                tracing::info!(request_id = %ctx.request_id, version_id = %version_id, "Version deleted");
                Ok(ApiResponse::message("Version deleted").into_response())
            },
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{body, controller, ctx, session};
    use super::super::ProjectController;
    use super::*;
    use crate::auth::GlobalUserRole;
    use crate::schema::{parse_value_to_schema, NewProjectForm};
    use crate::types::{ProjectType, ProjectVisibility};

    async fn seed(c: &StoreController, owner: &Session, url: &str) {
        let form = NewProjectForm {
            name: format!("Project {url}"),
            url: url.into(),
            visibility: ProjectVisibility::Listed,
            project_type: ProjectType::Mod,
            summary: None,
        };
        c.create_project(&ctx(), owner, form).await.unwrap();
    }

    fn version_form(number: &str, dependencies: serde_json::Value) -> NewVersionForm {
        parse_value_to_schema::<NewVersionForm>(json!({
            "title": format!("Release {number}"),
            "versionNumber": number,
            "releaseChannel": "release",
            "gameVersions": ["1.20.1"],
            "loaders": ["fabric"],
            "dependencies": dependencies,
        }))
        .data()
        .unwrap()
    }

    #[tokio::test]
    async fn versions_are_listed_fetched_and_deleted() {
        let c = controller();
        let owner = session("owner", GlobalUserRole::User);
        seed(&c, &owner, "example-mod").await;

        let created = c.create_version(&ctx(), "example-mod", &owner, version_form("1.0.0", json!([]))).await.unwrap();
        assert_eq!(created.status().as_u16(), 200);

        let duplicate = c.create_version(&ctx(), "example-mod", &owner, version_form("1.0.0", json!([]))).await.unwrap();
        assert_eq!(duplicate.status().as_u16(), 409);

        let (_, listed) = body(c.list_versions(&ctx(), "example-mod", None).await.unwrap()).await;
        assert_eq!(listed["versions"][0]["versionNumber"], "1.0.0");

        let (status, fetched) = body(c.get_version(&ctx(), "example-mod", "1.0.0", None).await.unwrap()).await;
        assert_eq!(status, 200);
        assert_eq!(fetched["version"]["authorId"], "owner");

        let deleted = c.delete_version(&ctx(), "example-mod", "1.0.0", &owner).await.unwrap();
        assert_eq!(deleted.status().as_u16(), 200);
        let gone = c.get_version(&ctx(), "example-mod", "1.0.0", None).await.unwrap();
        assert_eq!(gone.status().as_u16(), 404);
    }

    #[tokio::test]
    async fn dependencies_resolve_to_ids_and_show_up_on_the_dependent() {
        let c = controller();
        let owner = session("owner", GlobalUserRole::User);
        seed(&c, &owner, "library").await;
        seed(&c, &owner, "addon").await;
        c.create_version(&ctx(), "library", &owner, version_form("2.0.0", json!([]))).await.unwrap();

        let deps = json!([{ "projectId": "library", "versionId": "2.0.0", "dependencyType": "required" }]);
        let created = c.create_version(&ctx(), "addon", &owner, version_form("0.1.0", deps)).await.unwrap();
        assert_eq!(created.status().as_u16(), 200);

        let (_, dependencies) = body(c.get_dependencies(&ctx(), "addon", None).await.unwrap()).await;
        assert_eq!(dependencies["projects"][0]["slug"], "library");
        assert_eq!(dependencies["versions"][0]["versionNumber"], "2.0.0");
    }

    #[tokio::test]
    async fn invalid_dependencies_are_rejected() {
        let c = controller();
        let owner = session("owner", GlobalUserRole::User);
        seed(&c, &owner, "addon").await;

        let itself = json!([{ "projectId": "addon", "dependencyType": "required" }]);
        let (status, error) = body(c.create_version(&ctx(), "addon", &owner, version_form("1.0.0", itself)).await.unwrap()).await;
        assert_eq!(status, 400);
        assert_eq!(error["message"], "A project cannot depend on itself");

        let missing = json!([{ "projectId": "ghost", "dependencyType": "optional" }]);
        let response = c.create_version(&ctx(), "addon", &owner, version_form("1.0.0", missing)).await.unwrap();
        assert_eq!(response.status().as_u16(), 400);
    }
}
