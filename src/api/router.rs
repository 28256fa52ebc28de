//! Route table and middleware stack.
//!
//! Four routes, wide-open CORS (the service fronts a static browser page),
//! and a body limit sized for photo uploads plus multipart overhead.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::api::endpoints;
use crate::api::types::ApiContext;

/// Build the service router.
pub fn app_router(ctx: ApiContext) -> Router {
    Router::new()
        .route("/", get(endpoints::health::check))
        .route("/analyze", post(endpoints::analyze::analyze))
        .route("/generate_report", post(endpoints::report::generate))
        .route("/predict", post(endpoints::predict::predict))
        .layer(DefaultBodyLimit::max(55 * 1024 * 1024)) // 55 MB (multipart overhead)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(ctx)
}
