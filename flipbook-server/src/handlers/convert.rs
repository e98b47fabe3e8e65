use axum::{
    body::Body,
    extract::State,
    http::{HeaderValue, StatusCode, header},
    response::Response,
};
use tracing::info;

use crate::{
    analysis::analyze,
    infra::{
        app_state::AppState,
        errors::{AppError, AppResult},
    },
    intake::SourceRequest,
    transcode::TranscodeJob,
};

/// Converts the source to PNG (static) or MP4 (animated) at its intrinsic
/// size.
pub async fn convert_handler(
    State(state): State<AppState>,
    request: SourceRequest,
) -> AppResult<Response> {
    let source = request.resolve(&state).await?;
    let analysis =
        analyze(&source.bytes, source.kind, state.svg_strategy.as_ref())?;
    let scale = analysis.scale()?;

    let job = TranscodeJob {
        source: source.bytes,
        kind: analysis.kind,
        container: analysis.container,
        scale,
        stem: source.stem.clone(),
    };
    let output = state.transcoder.transcode(job).await?;

    let filename = format!("{}.{}", source.stem, output.container.extension());
    let disposition =
        HeaderValue::from_str(&format!("inline; filename=\"{filename}\""))
            .map_err(|err| AppError::internal(err.to_string()))?;

    info!(
        backend = state.transcoder.backend(),
        filename = %filename,
        bytes = output.bytes.len(),
        "conversion complete"
    );

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, output.container.content_type())
        .header(header::CONTENT_DISPOSITION, disposition)
        .body(Body::from(output.bytes))
        .map_err(|err| AppError::internal(err.to_string()))
}
