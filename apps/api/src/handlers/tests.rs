use std::sync::Arc;

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::{Duration, Utc};
use selecta_application::{SelectionPorts, SelectionProcess, ServiceConfig, SystemClock};
use selecta_domain::{Actor, Member, Role, UserId};
use selecta_infrastructure::{ConsoleNotificationDispatcher, InMemorySelectionStore};

use crate::dto::{
    GrantInterviewerRequest, InterviewerAccessQuery, PermissionCheckQuery, RegistrationListQuery,
    ScheduleInterviewRequest, ScoreWeightsRequest, SubmitRegistrationRequest,
    UpdateRegistrationStatusRequest,
};
use crate::error::ApiError;
use crate::state::AppState;

use super::{access, interviewers, registrations, selection};

struct Fixture {
    state: AppState,
    store: Arc<InMemorySelectionStore>,
}

impl Fixture {
    fn new() -> Self {
        let store = Arc::new(InMemorySelectionStore::new());
        let selection = SelectionProcess::new(
            SelectionPorts {
                users: store.clone(),
                grants: store.clone(),
                registrations: store.clone(),
                settings: store.clone(),
                notifications: Arc::new(ConsoleNotificationDispatcher::new()),
                audit: store.clone(),
            },
            Arc::new(SystemClock),
            ServiceConfig::default(),
        );
        let mirror = selection.sync_mirror(store.clone());

        Self {
            state: AppState {
                selection,
                mirror,
                frontend_url: "http://localhost:3000".to_owned(),
            },
            store,
        }
    }

    async fn member(&self, name: &str, role: Role) -> Actor {
        let member = Member::new(
            UserId::new(),
            name,
            format!("{}@example.org", name.to_lowercase()),
            role,
            true,
        )
        .unwrap_or_else(|_| unreachable!());
        let actor = member.actor();
        self.store.upsert_member(member).await;
        actor
    }

    async fn open_process(&self, manager: Actor) {
        let response = selection::toggle_process_handler(
            State(self.state.clone()),
            Extension(manager),
        )
        .await
        .unwrap_or_else(|_| unreachable!());
        assert!(response.0.is_open);
    }

    async fn submit(&self, full_name: &str) -> String {
        let (status, Json(registration)) = registrations::submit_registration_handler(
            State(self.state.clone()),
            Json(SubmitRegistrationRequest {
                full_name: full_name.to_owned(),
                email: format!("{}@applicants.org", full_name.to_lowercase().replace(' ', ".")),
                motivation_letter: None,
            }),
        )
        .await
        .unwrap_or_else(|_| unreachable!());
        assert_eq!(status, StatusCode::CREATED);
        registration.id
    }
}

fn status_of(error: ApiError) -> StatusCode {
    error.into_response().status()
}

#[tokio::test]
async fn public_submission_is_rejected_while_process_is_closed() {
    let fixture = Fixture::new();

    let closed = selection::process_state_handler(State(fixture.state.clone())).await;
    assert!(!closed.0.is_open);

    let error = registrations::submit_registration_handler(
        State(fixture.state.clone()),
        Json(SubmitRegistrationRequest {
            full_name: "Early Bird".to_owned(),
            email: "early@applicants.org".to_owned(),
            motivation_letter: None,
        }),
    )
    .await
    .err()
    .unwrap_or_else(|| unreachable!());

    assert_eq!(status_of(error), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn toggling_the_process_requires_a_manager() {
    let fixture = Fixture::new();
    let member = fixture.member("Regular", Role::Member).await;

    let error = selection::toggle_process_handler(State(fixture.state.clone()), Extension(member))
        .await
        .err()
        .unwrap_or_else(|| unreachable!());
    assert_eq!(status_of(error), StatusCode::FORBIDDEN);

    let president = fixture.member("President", Role::President).await;
    fixture.open_process(president).await;

    let open = selection::process_state_handler(State(fixture.state.clone())).await;
    assert!(open.0.is_open);
    assert_eq!(open.0.updated_by, Some(president.id().to_string()));
}

#[tokio::test]
async fn granted_interviewer_schedules_and_scores_an_applicant() {
    let fixture = Fixture::new();
    let president = fixture.member("President", Role::President).await;
    let interviewer = fixture.member("Interviewer", Role::Member).await;
    fixture.open_process(president).await;
    let registration_id = fixture.submit("Ada Lovelace").await;

    let denied = registrations::list_registrations_handler(
        State(fixture.state.clone()),
        Extension(interviewer),
        Query(RegistrationListQuery::default()),
    )
    .await
    .err()
    .unwrap_or_else(|| unreachable!());
    assert_eq!(status_of(denied), StatusCode::FORBIDDEN);

    let (status, Json(grant)) = interviewers::grant_interviewer_handler(
        State(fixture.state.clone()),
        Extension(president),
        Json(GrantInterviewerRequest {
            user_id: interviewer.id(),
            expires_at: Some(Utc::now() + Duration::days(7)),
        }),
    )
    .await
    .unwrap_or_else(|_| unreachable!());
    assert_eq!(status, StatusCode::CREATED);
    assert!(grant.is_active);
    assert!(!grant.is_lapsed);

    let Json(scheduled) = registrations::schedule_interview_handler(
        State(fixture.state.clone()),
        Extension(interviewer),
        Path(registration_id.clone()),
        Json(ScheduleInterviewRequest {
            date: Some(Utc::now() + Duration::days(2)),
            interviewer1_id: Some(interviewer.id()),
            test_score: Some(80.0),
            interview1_score: Some(90.0),
            ..ScheduleInterviewRequest::default()
        }),
    )
    .await
    .unwrap_or_else(|_| unreachable!());

    assert_eq!(scheduled.status, "under_review");
    assert!(matches!(scheduled.final_score, Some(score) if (score - 86.0).abs() < 1e-9));

    let Json(listed) = registrations::list_registrations_handler(
        State(fixture.state.clone()),
        Extension(interviewer),
        Query(RegistrationListQuery {
            status: Some("under_review".to_owned()),
        }),
    )
    .await
    .unwrap_or_else(|_| unreachable!());
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, registration_id);
}

#[tokio::test]
async fn revoked_interviewer_loses_access() {
    let fixture = Fixture::new();
    let president = fixture.member("President", Role::President).await;
    let interviewer = fixture.member("Interviewer", Role::Member).await;

    interviewers::grant_interviewer_handler(
        State(fixture.state.clone()),
        Extension(president),
        Json(GrantInterviewerRequest {
            user_id: interviewer.id(),
            expires_at: None,
        }),
    )
    .await
    .unwrap_or_else(|_| unreachable!());

    let Json(revoked) = interviewers::revoke_interviewer_handler(
        State(fixture.state.clone()),
        Extension(president),
        Path(interviewer.id().to_string()),
    )
    .await
    .unwrap_or_else(|_| unreachable!());
    assert!(!revoked.is_active);
    assert_eq!(revoked.revoked_by, Some(president.id().to_string()));

    let Json(status) = interviewers::interviewer_status_handler(
        State(fixture.state.clone()),
        Extension(president),
        Path(interviewer.id().to_string()),
    )
    .await
    .unwrap_or_else(|_| unreachable!());
    assert!(!status.is_interviewer);

    let Json(history) = interviewers::list_interviewer_access_handler(
        State(fixture.state.clone()),
        Extension(president),
        Query(InterviewerAccessQuery::default()),
    )
    .await
    .unwrap_or_else(|_| unreachable!());
    assert_eq!(history.len(), 1);
    assert!(!history[0].is_active);
    assert!(!history[0].is_lapsed);
}

#[tokio::test]
async fn malformed_path_ids_and_statuses_are_bad_requests() {
    let fixture = Fixture::new();
    let president = fixture.member("President", Role::President).await;

    let error = registrations::get_registration_handler(
        State(fixture.state.clone()),
        Extension(president),
        Path("not-an-id".to_owned()),
    )
    .await
    .err()
    .unwrap_or_else(|| unreachable!());
    assert_eq!(status_of(error), StatusCode::BAD_REQUEST);

    fixture.open_process(president).await;
    let registration_id = fixture.submit("Grace Hopper").await;

    let error = registrations::update_registration_status_handler(
        State(fixture.state.clone()),
        Extension(president),
        Path(registration_id.clone()),
        Json(UpdateRegistrationStatusRequest {
            status: "hired".to_owned(),
        }),
    )
    .await
    .err()
    .unwrap_or_else(|| unreachable!());
    assert_eq!(status_of(error), StatusCode::BAD_REQUEST);

    let Json(approved) = registrations::update_registration_status_handler(
        State(fixture.state.clone()),
        Extension(president),
        Path(registration_id),
        Json(UpdateRegistrationStatusRequest {
            status: "approved".to_owned(),
        }),
    )
    .await
    .unwrap_or_else(|_| unreachable!());
    assert_eq!(approved.status, "approved");
}

#[tokio::test]
async fn score_weights_are_validated_and_applied() {
    let fixture = Fixture::new();
    let president = fixture.member("President", Role::President).await;

    let error = selection::update_score_weights_handler(
        State(fixture.state.clone()),
        Extension(president),
        Json(ScoreWeightsRequest {
            test_weight: 70,
            interview_weight: 40,
        }),
    )
    .await
    .err()
    .unwrap_or_else(|| unreachable!());
    assert_eq!(status_of(error), StatusCode::BAD_REQUEST);

    let Json(weights) = selection::update_score_weights_handler(
        State(fixture.state.clone()),
        Extension(president),
        Json(ScoreWeightsRequest {
            test_weight: 30,
            interview_weight: 70,
        }),
    )
    .await
    .unwrap_or_else(|_| unreachable!());
    assert_eq!((weights.test_weight, weights.interview_weight), (30, 70));

    let Json(current) =
        selection::score_weights_handler(State(fixture.state.clone()), Extension(president))
            .await
            .unwrap_or_else(|_| unreachable!());
    assert_eq!(current.test_weight, 30);
}

#[tokio::test]
async fn permission_check_reports_static_role_rights() {
    let fixture = Fixture::new();
    let president = fixture.member("President", Role::President).await;

    let Json(check) = access::check_permission_handler(
        State(fixture.state.clone()),
        Extension(president),
        Query(PermissionCheckQuery {
            resource: "candidates".to_owned(),
            action: "read".to_owned(),
        }),
    )
    .await
    .unwrap_or_else(|_| unreachable!());
    assert!(check.allowed);

    let error = access::check_permission_handler(
        State(fixture.state.clone()),
        Extension(president),
        Query(PermissionCheckQuery {
            resource: "spaceships".to_owned(),
            action: "read".to_owned(),
        }),
    )
    .await
    .err()
    .unwrap_or_else(|| unreachable!());
    assert_eq!(status_of(error), StatusCode::BAD_REQUEST);
}
