use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use selecta_domain::{Actor, UserId};

use crate::dto::{
    GrantInterviewerRequest, InterviewerAccessQuery, InterviewerAccessResponse,
    InterviewerStatusResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn grant_interviewer_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(payload): Json<GrantInterviewerRequest>,
) -> ApiResult<(StatusCode, Json<InterviewerAccessResponse>)> {
    let grant = state
        .selection
        .grant_interviewer(&actor, payload.user_id, payload.expires_at)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(InterviewerAccessResponse::from_grant(grant, true, false)),
    ))
}

pub async fn revoke_interviewer_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<InterviewerAccessResponse>> {
    let user_id = UserId::parse(user_id.as_str())?;
    let grant = state.selection.revoke_interviewer(&actor, user_id).await?;

    Ok(Json(InterviewerAccessResponse::from_grant(grant, false, false)))
}

pub async fn list_interviewer_access_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<InterviewerAccessQuery>,
) -> ApiResult<Json<Vec<InterviewerAccessResponse>>> {
    let entries = state
        .selection
        .list_interviewer_access(&actor, query.into())
        .await?
        .into_iter()
        .map(InterviewerAccessResponse::from)
        .collect();

    Ok(Json(entries))
}

pub async fn interviewer_status_handler(
    State(state): State<AppState>,
    Extension(_actor): Extension<Actor>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<InterviewerStatusResponse>> {
    let user_id = UserId::parse(user_id.as_str())?;
    let is_interviewer = state.selection.is_interviewer(user_id).await?;

    Ok(Json(InterviewerStatusResponse {
        user_id: user_id.to_string(),
        is_interviewer,
    }))
}
