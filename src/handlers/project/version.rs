use axum::{extract::State, response::Response};

use crate::context::{RequestContext, RouteParams};
use crate::error::default_invalid_req_response;
use crate::handlers::{guarded, validate};
use crate::schema::NewVersionForm;
use crate::state::AppState;

/// GET /api/project/:slug/version - all versions, newest first
pub async fn list(State(state): State<AppState>, params: RouteParams, ctx: RequestContext) -> Response {
    guarded("GET /api/project/:slug/version", async move {
        let Some(slug) = params.get("slug") else {
            return Ok(default_invalid_req_response());
        };

        state.controllers.versions.list_versions(&ctx, slug, ctx.session()).await
    })
    .await
}

/// POST /api/project/:slug/version/new - publish a version
pub async fn create(State(state): State<AppState>, params: RouteParams, ctx: RequestContext) -> Response {
    guarded("POST /api/project/:slug/version/new", async move {
        let Some(slug) = params.get("slug") else {
            return Ok(default_invalid_req_response());
        };
        let Some(session) = ctx.session() else {
            return Ok(default_invalid_req_response());
        };
        let data = match validate::<NewVersionForm>(&ctx.body) {
            Ok(data) => data,
            Err(response) => return Ok(response),
        };

        state.controllers.versions.create_version(&ctx, slug, session, data).await
    })
    .await
}

/// GET /api/project/:slug/version/:versionSlug - one version by number or id
pub async fn get(State(state): State<AppState>, params: RouteParams, ctx: RequestContext) -> Response {
    guarded("GET /api/project/:slug/version/:versionSlug", async move {
        let (Some(slug), Some(version_slug)) = (params.get("slug"), params.get("versionSlug")) else {
            return Ok(default_invalid_req_response());
        };

        state
            .controllers
            .versions
            .get_version(&ctx, slug, version_slug, ctx.session())
            .await
    })
    .await
}

/// DELETE /api/project/:slug/version/:versionSlug
pub async fn delete(State(state): State<AppState>, params: RouteParams, ctx: RequestContext) -> Response {
    guarded("DELETE /api/project/:slug/version/:versionSlug", async move {
        let (Some(slug), Some(version_slug)) = (params.get("slug"), params.get("versionSlug")) else {
            return Ok(default_invalid_req_response());
        };
        let Some(session) = ctx.session() else {
            return Ok(default_invalid_req_response());
        };

        state
            .controllers
            .versions
            .delete_version(&ctx, slug, version_slug, session)
            .await
    })
    .await
}
