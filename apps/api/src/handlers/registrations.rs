use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use selecta_domain::{Actor, RegistrationId};

use crate::dto::{
    RegistrationListQuery, RegistrationResponse, ScheduleInterviewRequest,
    SubmitRegistrationRequest, UpdateRegistrationStatusRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn submit_registration_handler(
    State(state): State<AppState>,
    Json(payload): Json<SubmitRegistrationRequest>,
) -> ApiResult<(StatusCode, Json<RegistrationResponse>)> {
    let registration = state
        .selection
        .submit_registration(payload.into())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegistrationResponse::from(registration)),
    ))
}

pub async fn list_registrations_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<RegistrationListQuery>,
) -> ApiResult<Json<Vec<RegistrationResponse>>> {
    let registrations = state
        .selection
        .list_registrations(&actor, query.into_query()?)
        .await?
        .into_iter()
        .map(RegistrationResponse::from)
        .collect();

    Ok(Json(registrations))
}

pub async fn get_registration_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(registration_id): Path<String>,
) -> ApiResult<Json<RegistrationResponse>> {
    let registration_id = RegistrationId::parse(registration_id.as_str())?;
    let registration = state
        .selection
        .get_registration(&actor, registration_id)
        .await?;

    Ok(Json(RegistrationResponse::from(registration)))
}

pub async fn schedule_interview_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(registration_id): Path<String>,
    Json(payload): Json<ScheduleInterviewRequest>,
) -> ApiResult<Json<RegistrationResponse>> {
    let registration_id = RegistrationId::parse(registration_id.as_str())?;
    let registration = state
        .selection
        .schedule_interview(&actor, registration_id, payload.into())
        .await?;

    Ok(Json(RegistrationResponse::from(registration)))
}

pub async fn update_registration_status_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(registration_id): Path<String>,
    Json(payload): Json<UpdateRegistrationStatusRequest>,
) -> ApiResult<Json<RegistrationResponse>> {
    let registration_id = RegistrationId::parse(registration_id.as_str())?;
    let status = payload.status()?;
    let registration = state
        .selection
        .update_registration_status(&actor, registration_id, status)
        .await?;

    Ok(Json(RegistrationResponse::from(registration)))
}
