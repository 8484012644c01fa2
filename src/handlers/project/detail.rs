use axum::{extract::State, response::Response};

use crate::context::{RequestContext, RouteParams};
use crate::error::default_invalid_req_response;
use crate::handlers::{guarded, validate};
use crate::schema::NewProjectForm;
use crate::state::AppState;

/// POST /api/project/new - create a project owned by the caller
pub async fn create(State(state): State<AppState>, ctx: RequestContext) -> Response {
    guarded("POST /api/project/new", async move {
        let Some(session) = ctx.session() else {
            return Ok(default_invalid_req_response());
        };
        let data = match validate::<NewProjectForm>(&ctx.body) {
            Ok(data) => data,
            Err(response) => return Ok(response),
        };

        state.controllers.projects.create_project(&ctx, session, data).await
    })
    .await
}

/// GET /api/project/:slug - public project page data
pub async fn get(State(state): State<AppState>, params: RouteParams, ctx: RequestContext) -> Response {
    guarded("GET /api/project/:slug", async move {
        let Some(slug) = params.get("slug") else {
            return Ok(default_invalid_req_response());
        };

        state.controllers.projects.get_project(&ctx, slug, ctx.session()).await
    })
    .await
}

/// GET /api/project/:slug/dependencies - projects and versions the project depends on
pub async fn dependencies(State(state): State<AppState>, params: RouteParams, ctx: RequestContext) -> Response {
    guarded("GET /api/project/:slug/dependencies", async move {
        let Some(slug) = params.get("slug") else {
            return Ok(default_invalid_req_response());
        };

        state.controllers.projects.get_dependencies(&ctx, slug, ctx.session()).await
    })
    .await
}
