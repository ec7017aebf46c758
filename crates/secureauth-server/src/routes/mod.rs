//! HTTP routes and the application router.

pub mod auth;
pub mod docs;
pub mod incoming;
pub mod ui;

use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Upper bound on in-flight sign-in requests.
const AUTH_CONCURRENCY: usize = 32;

/// Assemble every route with the shared middleware stack.
pub fn app(state: Arc<AppState>) -> Router {
    // Cross-origin callers only ever hit the JSON API.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    // Each mock sign-in holds its request open for the artificial delay.
    let auth_routes = Router::new()
        .nest("/v1/auth", auth::router())
        .layer(ConcurrencyLimitLayer::new(AUTH_CONCURRENCY));

    Router::new()
        .merge(ui::router())
        .merge(docs::router())
        .merge(incoming::router())
        .merge(auth_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .with_state(state)
}
