use axum::{
    extract::{RawQuery, State},
    response::Response,
};

use crate::context::{RequestContext, RouteParams};
use crate::error::default_invalid_req_response;
use crate::handlers::guarded;
use crate::state::AppState;

/// GET /api/notifications - the caller's notifications, newest first
pub async fn list(State(state): State<AppState>, ctx: RequestContext) -> Response {
    guarded("GET /api/notifications", async move {
        let Some(session) = ctx.session() else {
            return Ok(default_invalid_req_response());
        };

        state.controllers.notifications.list_notifications(&ctx, session).await
    })
    .await
}

/// PATCH /api/notifications?ids=["id1","id2"] - mark several as read
pub async fn mark_many_read(State(state): State<AppState>, RawQuery(query): RawQuery, ctx: RequestContext) -> Response {
    guarded("PATCH /api/notifications", async move {
        let Some(ids) = query.as_deref().and_then(ids_from_query) else {
            return Ok(default_invalid_req_response());
        };
        let Some(session) = ctx.session() else {
            return Ok(default_invalid_req_response());
        };

        state.controllers.notifications.mark_read(&ctx, ids, session).await
    })
    .await
}

/// PATCH /api/notifications/:notifId - mark one as read
pub async fn mark_read(State(state): State<AppState>, params: RouteParams, ctx: RequestContext) -> Response {
    guarded("PATCH /api/notifications/:notifId", async move {
        let Some(notif_id) = params.get("notifId") else {
            return Ok(default_invalid_req_response());
        };
        let Some(session) = ctx.session() else {
            return Ok(default_invalid_req_response());
        };

        state
            .controllers
            .notifications
            .mark_read(&ctx, vec![notif_id.to_string()], session)
            .await
    })
    .await
}

/// DELETE /api/notifications/:notifId
pub async fn delete(State(state): State<AppState>, params: RouteParams, ctx: RequestContext) -> Response {
    guarded("DELETE /api/notifications/:notifId", async move {
        let Some(notif_id) = params.get("notifId") else {
            return Ok(default_invalid_req_response());
        };
        let Some(session) = ctx.session() else {
            return Ok(default_invalid_req_response());
        };

        state.controllers.notifications.delete_notification(&ctx, notif_id, session).await
    })
    .await
}

/// `ids` holds a JSON array of strings; an empty array counts as missing
fn ids_from_query(query: &str) -> Option<Vec<String>> {
    let raw = url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "ids")
        .map(|(_, value)| value.into_owned())?;

    serde_json::from_str::<Vec<String>>(&raw)
        .ok()
        .filter(|ids| !ids.is_empty() && ids.iter().all(|id| !id.is_empty()))
}
