use std::sync::Arc;
use std::time::Duration;

use selecta_core::{AppError, AppResult};
use selecta_domain::{
    Actor, AuditAction, Notification, NotificationKind, NotificationRecipient, Registration,
    RegistrationId, RegistrationStatus,
};
use tracing::info;

use crate::best_effort::{dispatch_notification, record_audit_event};
use crate::clock::Clock;
use crate::keyed_lock::KeyedLocks;
use crate::selection_ports::{
    AuditEvent, AuditRepository, NotificationDispatcher, RegistrationRepository, SelectionPorts,
    UserRepository,
};
use crate::store_timeout::bounded;
use crate::{AuthorizationService, ProcessGate, ScoringService};

mod intake;
mod interviews;
mod status;


pub use intake::SubmitRegistrationInput;
pub use interviews::ScheduleInterviewInput;

/// Registration state machine: intake, interview scheduling and status
/// decisions.
#[derive(Clone)]
pub struct CandidatePipelineService {
    authorization_service: AuthorizationService,
    process_gate: ProcessGate,
    scoring_service: ScoringService,
    registration_repository: Arc<dyn RegistrationRepository>,
    user_repository: Arc<dyn UserRepository>,
    audit_repository: Arc<dyn AuditRepository>,
    notification_dispatcher: Arc<dyn NotificationDispatcher>,
    clock: Arc<dyn Clock>,
    store_timeout: Duration,
    locks: Arc<KeyedLocks<RegistrationId>>,
}

impl CandidatePipelineService {
    /// Creates a new pipeline service.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        process_gate: ProcessGate,
        scoring_service: ScoringService,
        ports: &SelectionPorts,
        clock: Arc<dyn Clock>,
        store_timeout: Duration,
    ) -> Self {
        Self {
            authorization_service,
            process_gate,
            scoring_service,
            registration_repository: ports.registrations.clone(),
            user_repository: ports.users.clone(),
            audit_repository: ports.audit.clone(),
            notification_dispatcher: ports.notifications.clone(),
            clock,
            store_timeout,
            locks: Arc::new(KeyedLocks::default()),
        }
    }

    async fn load_registration(&self, registration_id: RegistrationId) -> AppResult<Registration> {
        bounded(
            self.store_timeout,
            "load registration",
            self.registration_repository
                .find_registration(registration_id),
        )
        .await?
        .ok_or_else(|| AppError::NotFound(format!("registration '{registration_id}' not found")))
    }

    async fn store_registration(&self, registration: Registration) -> AppResult<Registration> {
        bounded(
            self.store_timeout,
            "update registration",
            self.registration_repository.update_registration(registration),
        )
        .await
    }

    async fn append_audit(
        &self,
        actor: &Actor,
        action: AuditAction,
        registration_id: RegistrationId,
        detail: String,
    ) {
        record_audit_event(
            self.audit_repository.as_ref(),
            self.store_timeout,
            AuditEvent {
                subject: actor.id().to_string(),
                action,
                resource_type: "registration".to_owned(),
                resource_id: registration_id.to_string(),
                detail: Some(detail),
            },
        )
        .await;
    }

    /// Logs the transition and tells the applicant when the new status is
    /// one they hear about.
    async fn announce_transition(&self, previous: RegistrationStatus, registration: &Registration) {
        if previous == registration.status {
            return;
        }

        info!(
            registration_id = %registration.id,
            from = previous.as_str(),
            to = registration.status.as_str(),
            "registration status changed"
        );

        if !registration.status.notifies_applicant() {
            return;
        }

        dispatch_notification(
            self.notification_dispatcher.as_ref(),
            self.store_timeout,
            Notification {
                recipient: NotificationRecipient::Applicant {
                    registration_id: registration.id,
                    email: registration.email.clone(),
                },
                title: "Registration status updated".to_owned(),
                message: registration.status.applicant_message().to_owned(),
                kind: NotificationKind::System,
                related_id: Some(registration.id.to_string()),
            },
        )
        .await;
    }
}
