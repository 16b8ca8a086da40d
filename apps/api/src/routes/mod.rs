pub mod health;
pub mod rate_limit;

use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};

use crate::document::handlers as document;
use crate::scoring::handlers as scoring;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        // CV scoring
        .route("/cv/score", post(scoring::handle_score))
        .route("/cv/score-local", post(scoring::handle_score_local))
        // Document structuring
        .route("/document/process", post(document::handle_process));

    Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        .nest("/api/v1", api)
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
        .layer(from_fn_with_state(state.clone(), rate_limit::throttle))
        .with_state(state)
}
