mod cors;

use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{delete, get, post, put};
use selecta_core::AppError;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{handlers, middleware};

use self::cors::build_cors_layer;

pub fn build_router(app_state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    let protected_routes = Router::new()
        .route(
            "/api/access/check",
            get(handlers::access::check_permission_handler),
        )
        .route("/api/members", get(handlers::access::list_members_handler))
        .route(
            "/api/interviewers",
            get(handlers::interviewers::list_interviewer_access_handler)
                .post(handlers::interviewers::grant_interviewer_handler),
        )
        .route(
            "/api/interviewers/{user_id}",
            delete(handlers::interviewers::revoke_interviewer_handler),
        )
        .route(
            "/api/interviewers/{user_id}/status",
            get(handlers::interviewers::interviewer_status_handler),
        )
        .route(
            "/api/registrations",
            get(handlers::registrations::list_registrations_handler),
        )
        .route(
            "/api/registrations/{registration_id}",
            get(handlers::registrations::get_registration_handler),
        )
        .route(
            "/api/registrations/{registration_id}/interview",
            put(handlers::registrations::schedule_interview_handler),
        )
        .route(
            "/api/registrations/{registration_id}/status",
            put(handlers::registrations::update_registration_status_handler),
        )
        .route(
            "/api/selection/weights",
            get(handlers::selection::score_weights_handler)
                .put(handlers::selection::update_score_weights_handler),
        )
        .route(
            "/api/selection/final-score",
            post(handlers::selection::final_score_handler),
        )
        .route(
            "/api/selection/process/toggle",
            post(handlers::selection::toggle_process_handler),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_actor,
        ));

    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route(
            "/api/selection/process",
            get(handlers::selection::process_state_handler),
        )
        .route(
            "/api/public/registrations",
            post(handlers::registrations::submit_registration_handler),
        );

    Ok(Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_same_origin_for_mutations,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(frontend_url)?)
        .with_state(app_state))
}
