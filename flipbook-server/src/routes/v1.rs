use axum::{Router, routing::post};

use crate::{
    AppState,
    handlers::{convert::convert_handler, inspect::inspect_handler},
};

pub const INSPECT: &str = "/api/v1/inspect";
pub const CONVERT: &str = "/api/v1/convert";

/// Create all v1 API routes
pub fn create_v1_router() -> Router<AppState> {
    Router::new()
        .route("/inspect", post(inspect_handler))
        .route("/convert", post(convert_handler))
}
