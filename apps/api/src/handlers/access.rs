use std::str::FromStr;

use axum::Json;
use axum::extract::{Extension, Query, State};
use selecta_domain::{Action, Actor, Resource};

use crate::dto::{MemberResponse, PermissionCheckQuery, PermissionCheckResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn check_permission_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<PermissionCheckQuery>,
) -> ApiResult<Json<PermissionCheckResponse>> {
    let resource = Resource::from_str(query.resource.trim())?;
    let action = Action::from_str(query.action.trim())?;

    let allowed = state
        .selection
        .check_permission(&actor, resource, action)
        .await?;

    Ok(Json(PermissionCheckResponse {
        resource: resource.as_str().to_owned(),
        action: action.as_str().to_owned(),
        allowed,
    }))
}

pub async fn list_members_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<Json<Vec<MemberResponse>>> {
    let members = state
        .selection
        .list_members(&actor)
        .await?
        .into_iter()
        .map(MemberResponse::from)
        .collect();

    Ok(Json(members))
}
