use axum::Json;
use axum::extract::State;

use crate::dto::HealthResponse;
use crate::state::AppState;

pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        process_open: state.selection.process_gate().cached().await.is_open,
        mirror_loaded_at: state.mirror.loaded_at().await.map(|at| at.to_rfc3339()),
    })
}
