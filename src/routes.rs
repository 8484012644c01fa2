use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, patch, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::SecurityConfig;
use crate::handlers::{notification, organization, project, root};
use crate::middleware::{authentication_middleware, body_parser_middleware, rate_limit_middleware};
use crate::state::AppState;

/// The complete application router.
///
/// Middleware order per request: rate limit, body parser, authentication.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.security);

    Router::new()
        // Public
        .route("/api", get(root::api_details))
        .route("/api/", get(root::api_details))
        .route("/health", get(root::health))
        .merge(project_routes())
        .merge(version_routes())
        .merge(organization_routes())
        .merge(notification_routes())
        .fallback(root::not_found)
        // Layers added last run first
        .layer(from_fn_with_state(state.clone(), authentication_middleware))
        .layer(from_fn_with_state(state.clone(), body_parser_middleware))
        .layer(from_fn_with_state(state.clone(), rate_limit_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn project_routes() -> Router<AppState> {
    Router::new()
        .route("/api/project/new", post(project::project_create))
        .route("/api/project/:slug", get(project::project_get).patch(project::project_patch))
        .route("/api/project/:slug/description", patch(project::project_description_patch))
        .route("/api/project/:slug/tags", patch(project::project_tags_patch))
        .route("/api/project/:slug/external-links", patch(project::project_external_links_patch))
        .route("/api/project/:slug/license", patch(project::project_license_patch))
        .route("/api/project/:slug/dependencies", get(project::project_dependencies))
        // Gallery
        .route(
            "/api/project/:slug/gallery",
            post(project::gallery_post).delete(project::gallery_delete),
        )
        .route("/api/project/:slug/gallery/:imageId", patch(project::gallery_patch))
        // Team
        .route("/api/project/:slug/members/invite", post(project::members_invite))
}

fn version_routes() -> Router<AppState> {
    Router::new()
        .route("/api/project/:slug/version", get(project::version_list))
        .route("/api/project/:slug/version/new", post(project::version_post))
        .route(
            "/api/project/:slug/version/:versionSlug",
            get(project::version_get).delete(project::version_delete),
        )
}

fn organization_routes() -> Router<AppState> {
    Router::new()
        .route("/api/organization/new", post(organization::create))
        .route("/api/organization/:slug", get(organization::get))
        .route("/api/organization/:slug/members/invite", post(organization::invite))
}

fn notification_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/notifications",
            get(notification::list).patch(notification::mark_many_read),
        )
        .route(
            "/api/notifications/:notifId",
            patch(notification::mark_read).delete(notification::delete),
        )
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if !security.enable_cors {
        return CorsLayer::new();
    }
    if security.cors_origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}
