use axum::{Json, extract::State};

use crate::{
    analysis::{InspectResponse, analyze},
    infra::{app_state::AppState, errors::AppResult},
    intake::SourceRequest,
};

/// Reports what a conversion would do without running the transcoder.
pub async fn inspect_handler(
    State(state): State<AppState>,
    request: SourceRequest,
) -> AppResult<Json<InspectResponse>> {
    let source = request.resolve(&state).await?;
    let analysis =
        analyze(&source.bytes, source.kind, state.svg_strategy.as_ref())?;
    Ok(Json(InspectResponse::from(&analysis)))
}
