use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderValue, Method, header};
use axum::middleware::Next;
use axum::response::Response;
use selecta_core::AppError;
use selecta_domain::UserId;

use crate::error::ApiResult;
use crate::state::AppState;

/// Header carrying the authenticated member id, set by the upstream gateway.
pub const ACTOR_HEADER: &str = "x-actor-id";

pub async fn require_actor(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let user_id = actor_id_from_headers(request.headers())?;
    let actor = state.selection.resolve_actor(user_id).await?;

    request.extensions_mut().insert(actor);
    Ok(next.run(request).await)
}

/// Rejects browser mutations that do not originate from the frontend.
///
/// Callers without `Origin` or `Referer` (service clients) pass through.
pub async fn require_same_origin_for_mutations(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    if is_state_changing_method(request.method()) {
        check_same_origin(request.headers(), &state.frontend_url)?;
    }

    Ok(next.run(request).await)
}

fn check_same_origin(headers: &HeaderMap, allowed_origin: &str) -> Result<(), AppError> {
    if headers.get("sec-fetch-site") == Some(&HeaderValue::from_static("cross-site")) {
        return Err(AppError::Forbidden("cross-site request blocked".to_owned()));
    }

    let origin = headers
        .get(header::ORIGIN)
        .and_then(|value| value.to_str().ok());
    let referer = headers
        .get(header::REFERER)
        .and_then(|value| value.to_str().ok());

    let allowed = match (origin, referer) {
        (None, None) => true,
        (Some(origin), _) => origin == allowed_origin,
        (None, Some(referer)) => referer.starts_with(allowed_origin),
    };

    if allowed {
        Ok(())
    } else {
        Err(AppError::Forbidden("origin validation failed".to_owned()))
    }
}

fn is_state_changing_method(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

fn actor_id_from_headers(headers: &HeaderMap) -> Result<UserId, AppError> {
    let value = headers
        .get(ACTOR_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

    UserId::parse(value)
        .map_err(|_| AppError::Unauthorized("actor header is not a valid member id".to_owned()))
}
