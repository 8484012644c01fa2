use axum::{extract::State, response::Response};

use crate::context::{RequestContext, RouteParams};
use crate::error::default_invalid_req_response;
use crate::handlers::{guarded, validate};
use crate::schema::{CreateOrganizationForm, InviteMemberForm};
use crate::state::AppState;

/// POST /api/organization/new
pub async fn create(State(state): State<AppState>, ctx: RequestContext) -> Response {
    guarded("POST /api/organization/new", async move {
        let Some(session) = ctx.session() else {
            return Ok(default_invalid_req_response());
        };
        let data = match validate::<CreateOrganizationForm>(&ctx.body) {
            Ok(data) => data,
            Err(response) => return Ok(response),
        };

        state.controllers.organizations.create_organization(&ctx, session, data).await
    })
    .await
}

/// GET /api/organization/:slug
pub async fn get(State(state): State<AppState>, params: RouteParams, ctx: RequestContext) -> Response {
    guarded("GET /api/organization/:slug", async move {
        let Some(slug) = params.get("slug") else {
            return Ok(default_invalid_req_response());
        };

        state.controllers.organizations.get_organization(&ctx, slug, ctx.session()).await
    })
    .await
}

/// POST /api/organization/:slug/members/invite
pub async fn invite(State(state): State<AppState>, params: RouteParams, ctx: RequestContext) -> Response {
    guarded("POST /api/organization/:slug/members/invite", async move {
        let Some(slug) = params.get("slug") else {
            return Ok(default_invalid_req_response());
        };
        let Some(session) = ctx.session() else {
            return Ok(default_invalid_req_response());
        };
        let data = match validate::<InviteMemberForm>(&ctx.body) {
            Ok(data) => data,
            Err(response) => return Ok(response),
        };

        state.controllers.organizations.invite_member(&ctx, slug, session, data).await
    })
    .await
}
