pub mod controllers;

pub use controllers::{ApiError, TokenController};

use crate::ServerConfig;
use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use tokenx_core::ErrorBody;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    set_header::SetResponseHeaderLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

/// Build CORS layer: GET/POST/OPTIONS with `Content-Type` from the configured
/// origins. Preflight requests are answered here with an empty body.
fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    if config.security.allowed_origins.is_empty() {
        cors.allow_origin(AllowOrigin::any())
    } else {
        let origins: Vec<HeaderValue> =
            config.security.allowed_origins.iter().filter_map(|o| o.parse().ok()).collect();
        cors.allow_origin(origins)
    }
}

/// Create the relay application.
pub fn create_app(config: ServerConfig) -> Router {
    if config.security.allowed_origins.is_empty() {
        tracing::warn!("CORS allows any origin; set TOKENX_ALLOWED_ORIGINS to restrict it");
    }
    if !config.relay.is_complete() {
        tracing::warn!(
            missing = ?config.relay.missing(),
            "relay configuration incomplete; token exchange requests will fail with 500"
        );
    }

    let token_controller = TokenController::new(&config);

    let api_router = Router::new()
        .route("/health", get(controllers::health::health_check))
        .route("/generate-demo-token", post(controllers::token::generate_demo_token))
        .route("/exchange-token", post(controllers::token::exchange_token))
        .with_state(token_controller);

    let app = Router::new().nest("/api", api_router).fallback(not_found);

    app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            // Outside the timeout so a 408 still carries CORS headers.
            .layer(build_cors_layer(&config))
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                config.security.request_timeout,
            ))
            .layer(DefaultBodyLimit::max(config.security.max_body_size))
            .layer(SetResponseHeaderLayer::if_not_present(
                header::X_CONTENT_TYPE_OPTIONS,
                HeaderValue::from_static("nosniff"),
            )),
    )
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody { error: "not_found".to_string(), error_description: None }),
    )
}
