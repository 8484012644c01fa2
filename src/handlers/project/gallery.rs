use axum::{extract::State, response::Response};

use crate::context::{RequestContext, RouteParams};
use crate::error::default_invalid_req_response;
use crate::handlers::{guarded, validate};
use crate::schema::{AddNewGalleryImageForm, DeleteGalleryImageForm, UpdateGalleryImageForm};
use crate::state::AppState;

/// POST /api/project/:slug/gallery - add an image
pub async fn add(State(state): State<AppState>, params: RouteParams, ctx: RequestContext) -> Response {
    guarded("POST /api/project/:slug/gallery", async move {
        let Some(slug) = params.get("slug") else {
            return Ok(default_invalid_req_response());
        };
        let Some(session) = ctx.session() else {
            return Ok(default_invalid_req_response());
        };
        let data = match validate::<AddNewGalleryImageForm>(&ctx.body) {
            Ok(data) => data,
            Err(response) => return Ok(response),
        };

        state.controllers.projects.add_gallery_image(&ctx, slug, session, data).await
    })
    .await
}

/// PATCH /api/project/:slug/gallery/:imageId - edit an image's metadata
pub async fn update(State(state): State<AppState>, params: RouteParams, ctx: RequestContext) -> Response {
    guarded("PATCH /api/project/:slug/gallery/:imageId", async move {
        let (Some(slug), Some(image_id)) = (params.get("slug"), params.get("imageId")) else {
            return Ok(default_invalid_req_response());
        };
        let Some(session) = ctx.session() else {
            return Ok(default_invalid_req_response());
        };
        let data = match validate::<UpdateGalleryImageForm>(&ctx.body) {
            Ok(data) => data,
            Err(response) => return Ok(response),
        };

        state
            .controllers
            .projects
            .update_gallery_image(&ctx, slug, image_id, session, data)
            .await
    })
    .await
}

/// DELETE /api/project/:slug/gallery - remove the image named in the body
pub async fn remove(State(state): State<AppState>, params: RouteParams, ctx: RequestContext) -> Response {
    guarded("DELETE /api/project/:slug/gallery", async move {
        let Some(slug) = params.get("slug") else {
            return Ok(default_invalid_req_response());
        };
        let Some(session) = ctx.session() else {
            return Ok(default_invalid_req_response());
        };
        let data = match validate::<DeleteGalleryImageForm>(&ctx.body) {
            Ok(data) => data,
            Err(response) => return Ok(response),
        };

        state.controllers.projects.remove_gallery_image(&ctx, slug, session, data).await
    })
    .await
}
