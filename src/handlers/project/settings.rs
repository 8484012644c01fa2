use axum::{extract::State, response::Response};

use crate::context::{RequestContext, RouteParams};
use crate::error::default_invalid_req_response;
use crate::handlers::{guarded, validate};
use crate::schema::{
    GeneralProjectSettingsForm, UpdateDescriptionForm, UpdateExternalLinksForm, UpdateProjectLicenseForm,
    UpdateProjectTagsForm,
};
use crate::state::AppState;

/// PATCH /api/project/:slug - general settings (name, slug, visibility, icon, ...)
pub async fn general(State(state): State<AppState>, params: RouteParams, ctx: RequestContext) -> Response {
    guarded("PATCH /api/project/:slug", async move {
        let Some(slug) = params.get("slug") else {
            return Ok(default_invalid_req_response());
        };
        let Some(session) = ctx.session() else {
            return Ok(default_invalid_req_response());
        };
        let data = match validate::<GeneralProjectSettingsForm>(&ctx.body) {
            Ok(data) => data,
            Err(response) => return Ok(response),
        };

        state.controllers.projects.update_general_settings(&ctx, slug, session, data).await
    })
    .await
}

/// PATCH /api/project/:slug/description
pub async fn description(State(state): State<AppState>, params: RouteParams, ctx: RequestContext) -> Response {
    guarded("PATCH /api/project/:slug/description", async move {
        let Some(slug) = params.get("slug") else {
            return Ok(default_invalid_req_response());
        };
        let Some(session) = ctx.session() else {
            return Ok(default_invalid_req_response());
        };
        let data = match validate::<UpdateDescriptionForm>(&ctx.body) {
            Ok(data) => data,
            Err(response) => return Ok(response),
        };

        state.controllers.projects.update_description(&ctx, slug, session, data).await
    })
    .await
}

/// PATCH /api/project/:slug/tags
pub async fn tags(State(state): State<AppState>, params: RouteParams, ctx: RequestContext) -> Response {
    guarded("PATCH /api/project/:slug/tags", async move {
        let Some(slug) = params.get("slug") else {
            return Ok(default_invalid_req_response());
        };
        let Some(session) = ctx.session() else {
            return Ok(default_invalid_req_response());
        };
        let data = match validate::<UpdateProjectTagsForm>(&ctx.body) {
            Ok(data) => data,
            Err(response) => return Ok(response),
        };

        state.controllers.projects.update_tags(&ctx, slug, session, data).await
    })
    .await
}

/// PATCH /api/project/:slug/external-links
pub async fn external_links(State(state): State<AppState>, params: RouteParams, ctx: RequestContext) -> Response {
    guarded("PATCH /api/project/:slug/external-links", async move {
        let Some(slug) = params.get("slug") else {
            return Ok(default_invalid_req_response());
        };
        let Some(session) = ctx.session() else {
            return Ok(default_invalid_req_response());
        };
        let data = match validate::<UpdateExternalLinksForm>(&ctx.body) {
            Ok(data) => data,
            Err(response) => return Ok(response),
        };

        state.controllers.projects.update_external_links(&ctx, slug, session, data).await
    })
    .await
}

/// PATCH /api/project/:slug/license
pub async fn license(State(state): State<AppState>, params: RouteParams, ctx: RequestContext) -> Response {
    guarded("PATCH /api/project/:slug/license", async move {
        let Some(slug) = params.get("slug") else {
            return Ok(default_invalid_req_response());
        };
        let Some(session) = ctx.session() else {
            return Ok(default_invalid_req_response());
        };
        let data = match validate::<UpdateProjectLicenseForm>(&ctx.body) {
            Ok(data) => data,
            Err(response) => return Ok(response),
        };

        state.controllers.projects.update_license(&ctx, slug, session, data).await
    })
    .await
}
