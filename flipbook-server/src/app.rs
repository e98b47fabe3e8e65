use axum::{
    Router,
    extract::{DefaultBodyLimit, State},
    http::{HeaderName, HeaderValue, Method, StatusCode},
    response::Json,
    routing::get,
};
use flipbook_config::CorsConfig;
use serde_json::{Value, json};
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{debug, warn};

use crate::{AppState, routes};

/// Headroom above `max_upload_bytes` for multipart boundaries and text
/// fields. The file part itself is checked against the exact limit.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn create_app(state: AppState) -> Router {
    let versioned_api = routes::create_api_router();

    // Permissive in dev, allow-list in prod
    let cors_layer = if state.config().dev_mode {
        CorsLayer::permissive()
    } else {
        cors_from_config(&state.config().cors)
    };

    let body_limit = state
        .config()
        .limits
        .max_upload_bytes
        .saturating_add(MULTIPART_OVERHEAD);

    Router::new()
        .route("/ping", get(ping_handler))
        .route("/health", get(health_handler))
        .merge(versioned_api)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Entries were validated during config load; anything unparseable is
/// skipped rather than treated as fatal here.
fn cors_from_config(cors: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = cors
        .allowed_origins
        .iter()
        .filter_map(|s| HeaderValue::from_str(s).ok())
        .collect();
    // An empty list admits no cross-origin callers.
    let allow_origin = AllowOrigin::list(origins);

    let methods: Vec<Method> = cors
        .allowed_methods
        .iter()
        .filter_map(|m| Method::from_bytes(m.as_bytes()).ok())
        .collect();

    let headers: Vec<HeaderName> = cors
        .allowed_headers
        .iter()
        .filter_map(|h| HeaderName::from_bytes(h.as_bytes()).ok())
        .collect();

    let mut layer = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(AllowMethods::list(methods))
        .allow_headers(AllowHeaders::list(headers));

    if cors.allow_credentials {
        layer = layer.allow_credentials(true);
    }

    layer
}

async fn ping_handler() -> Json<Value> {
    debug!("ping endpoint called");
    Json(json!({
        "status": "ok",
        "message": "Flipbook is running",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn health_handler(
    State(state): State<AppState>,
) -> (StatusCode, Json<Value>) {
    let backend = state.transcoder.backend();
    let transcoder = state.transcoder.health().await;

    let mut health_status = json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "checks": {
            "transcoder": {
                "backend": backend,
                "status": if transcoder.healthy { "healthy" } else { "unhealthy" },
                "detail": transcoder.detail,
            }
        }
    });

    if transcoder.healthy {
        (StatusCode::OK, Json(health_status))
    } else {
        warn!(backend, "transcoder health check failed");
        health_status["status"] = json!("unhealthy");
        (StatusCode::SERVICE_UNAVAILABLE, Json(health_status))
    }
}
