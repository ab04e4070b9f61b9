use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::get,
};

use crate::handlers::{
    bio_handler, health_handler, metrics_handler, query_handler, upload_form_handler, upload_handler,
};
use crate::middleware::{count_requests, reject_rate_limited, throttle, user_agent};
use crate::state::AppState;

// Room for multipart boundaries and part headers on top of the file itself
const MULTIPART_OVERHEAD: usize = 64 * 1024;

// Body limit for the upload route; the handler enforces the exact file size
pub fn upload_body_limit(max_upload_bytes: u64) -> usize {
    usize::try_from(max_upload_bytes)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD)
}

// Builds the full router. Every request is counted, tagged and marked by the
// throttle; only the request data pages reject marked requests.
pub fn app(state: AppState) -> Router {
    let upload = get(upload_form_handler)
        .post(upload_handler)
        .layer(DefaultBodyLimit::max(upload_body_limit(state.max_upload_bytes)));

    let request_data = Router::new()
        .route("/get", get(query_handler))
        .route("/bio", get(bio_handler))
        .route("/upload", upload)
        .route_layer(middleware::from_fn(reject_rate_limited));

    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .nest("/req", request_data)
        .layer(middleware::from_fn_with_state(state.clone(), throttle))
        .layer(middleware::from_fn(user_agent))
        .layer(middleware::from_fn(count_requests))
        .with_state(state)
}
