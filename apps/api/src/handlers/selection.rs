use axum::Json;
use axum::extract::{Extension, State};
use selecta_domain::Actor;

use crate::dto::{
    FinalScoreRequest, FinalScoreResponse, ProcessStateResponse, ScoreWeightsRequest,
    ScoreWeightsResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn process_state_handler(State(state): State<AppState>) -> Json<ProcessStateResponse> {
    let is_open = state.selection.is_process_open().await;
    let gate = state.selection.process_gate().cached().await;

    Json(ProcessStateResponse {
        is_open,
        ..ProcessStateResponse::from(gate)
    })
}

pub async fn toggle_process_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<Json<ProcessStateResponse>> {
    let is_open = state.selection.toggle_process_gate(&actor).await?;
    let gate = state.selection.process_gate().cached().await;

    Ok(Json(ProcessStateResponse {
        is_open,
        ..ProcessStateResponse::from(gate)
    }))
}

pub async fn score_weights_handler(
    State(state): State<AppState>,
    Extension(_actor): Extension<Actor>,
) -> ApiResult<Json<ScoreWeightsResponse>> {
    let weights = state.selection.current_score_weights().await?;
    Ok(Json(ScoreWeightsResponse::from(weights)))
}

pub async fn update_score_weights_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(payload): Json<ScoreWeightsRequest>,
) -> ApiResult<Json<ScoreWeightsResponse>> {
    let weights = state
        .selection
        .set_score_weights(&actor, payload.test_weight, payload.interview_weight)
        .await?;

    Ok(Json(ScoreWeightsResponse::from(weights)))
}

pub async fn final_score_handler(
    State(state): State<AppState>,
    Extension(_actor): Extension<Actor>,
    Json(payload): Json<FinalScoreRequest>,
) -> ApiResult<Json<FinalScoreResponse>> {
    let weights = state.selection.current_score_weights().await?;
    let final_score = state
        .selection
        .compute_final_score(payload.test_score, &payload.interview_scores)
        .await?;

    Ok(Json(FinalScoreResponse {
        final_score,
        weights: ScoreWeightsResponse::from(weights),
    }))
}
