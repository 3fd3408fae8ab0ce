//! Router and shared handler state.

mod councils;
mod health;
mod items;
mod recognize;

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use tower_http::trace::TraceLayer;

use binwise_core::RecognitionService;

#[derive(Clone)]
pub(crate) struct AppState {
    pub service: Arc<RecognitionService>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub(crate) fn new(service: RecognitionService) -> Self {
        Self {
            service: Arc::new(service),
            started_at: Utc::now(),
        }
    }
}

pub(crate) fn router(state: AppState, body_limit: usize) -> Router {
    Router::new()
        .route("/recognize", post(recognize::recognize))
        .route("/recognize/upload", post(recognize::recognize_upload))
        .route("/health", get(health::health))
        .route("/health/live", get(health::live))
        .route("/health/ready", get(health::ready))
        .route("/councils", get(councils::list))
        .route("/councils/{postcode}", get(councils::resolve))
        .route("/councils/{postcode}/rules", get(councils::rules))
        .route("/councils/{postcode}/schedule", get(councils::schedule))
        .route("/items", get(items::list))
        .route("/items/search", get(items::search))
        .route("/items/categories", get(items::categories))
        .route("/items/{id}", get(items::get_item))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
