use axum::http::{header, Method};
use tower_http::cors::{Any, CorsLayer};

/// The form and the JSON endpoint only need GET and POST.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .allow_origin(Any)
}
