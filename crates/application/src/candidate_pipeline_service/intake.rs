use selecta_core::{AppError, AppResult, NonEmptyString};
use selecta_domain::{AuditAction, EmailAddress, NewRegistration, Registration};
use tracing::info;

use crate::best_effort::record_audit_event;
use crate::selection_ports::AuditEvent;
use crate::store_timeout::bounded;

use super::CandidatePipelineService;

/// Public registration form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitRegistrationInput {
    /// Applicant full name.
    pub full_name: String,
    /// Applicant email.
    pub email: String,
    /// Optional motivation letter.
    pub motivation_letter: Option<String>,
}

impl CandidatePipelineService {
    /// Accepts a public registration while the selection process is open.
    pub async fn submit_registration(
        &self,
        input: SubmitRegistrationInput,
    ) -> AppResult<Registration> {
        if !self.process_gate.is_open().await {
            return Err(AppError::Forbidden("selection process is closed".to_owned()));
        }

        let new_registration = NewRegistration {
            full_name: NonEmptyString::new(input.full_name.trim())?,
            email: EmailAddress::new(input.email)?,
            motivation_letter: input
                .motivation_letter
                .map(|letter| letter.trim().to_owned())
                .filter(|letter| !letter.is_empty()),
        };
        let registration = Registration::submit(new_registration, self.clock.now());

        bounded(
            self.store_timeout,
            "insert registration",
            self.registration_repository
                .insert_registration(registration.clone()),
        )
        .await?;

        record_audit_event(
            self.audit_repository.as_ref(),
            self.store_timeout,
            AuditEvent {
                subject: "public".to_owned(),
                action: AuditAction::RegistrationSubmitted,
                resource_type: "registration".to_owned(),
                resource_id: registration.id.to_string(),
                detail: None,
            },
        )
        .await;

        info!(registration_id = %registration.id, "registration submitted");

        Ok(registration)
    }
}
