pub mod records;

use std::sync::Arc;

use axum::{http::{StatusCode, Uri}, routing::get, Json, Router};
use tower_http::{
    cors::CorsLayer,
    trace::{TraceLayer, DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, DefaultOnFailure},
};
use tracing::Level;

use common::{metrics::encode_metrics, types::Health};
use models::{Cocktail, Recipe};
use service::record::RecordService;

use crate::errors::ApiError;
use records::RecordState;

/// Shared application state: one service per collection.
#[derive(Clone)]
pub struct ServerState {
    pub cocktails: Arc<RecordService<Cocktail>>,
    pub recipes: Arc<RecordService<Recipe>>,
    pub public_url: Option<Arc<str>>,
}

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn metrics() -> (StatusCode, String) {
    encode_metrics()
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("Not Found: {} is not a known resource", uri.path()))
}

/// Build the full application router: health, metrics and one CRUD surface per collection.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let cocktails = records::router(RecordState {
        service: Arc::clone(&state.cocktails),
        public_url: state.public_url.clone(),
    });
    let recipes = records::router(RecordState {
        service: Arc::clone(&state.recipes),
        public_url: state.public_url.clone(),
    });

    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .merge(cocktails)
        .merge(recipes)
        .fallback(not_found)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                // 5xx responses are logged at ERROR
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                )
        )
}
