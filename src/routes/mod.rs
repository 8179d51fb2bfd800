pub mod health;
pub mod quiz;

use crate::middleware::{
    cors::cors_layer,
    rate_limit::{throttle_middleware, SubmitThrottle},
};
use crate::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub fn app(state: AppState) -> Router {
    let max_upload_bytes = state.config.max_upload_bytes;
    let throttle = SubmitThrottle::new(state.config.submit_rps);

    let base_routes = Router::new()
        .route("/", get(quiz::index))
        .route("/health", get(health::health));

    let submit_routes = Router::new()
        .route("/quizzes", post(quiz::submit_form))
        .route("/api/quizzes", post(quiz::generate_quiz))
        .layer(axum::middleware::from_fn_with_state(
            throttle,
            throttle_middleware,
        ));

    base_routes
        .merge(submit_routes)
        .with_state(state)
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}
