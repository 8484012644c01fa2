use axum::{extract::State, response::Response};

use crate::context::{RequestContext, RouteParams};
use crate::error::default_invalid_req_response;
use crate::handlers::{guarded, validate};
use crate::schema::InviteMemberForm;
use crate::state::AppState;

/// POST /api/project/:slug/members/invite - invite a user to the project team
pub async fn invite(State(state): State<AppState>, params: RouteParams, ctx: RequestContext) -> Response {
    guarded("POST /api/project/:slug/members/invite", async move {
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

        state.controllers.projects.invite_member(&ctx, slug, session, data).await
    })
    .await
}
