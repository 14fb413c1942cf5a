use selecta_core::AppResult;
use selecta_domain::{Actor, AuditAction, Registration, RegistrationId, RegistrationStatus};

use crate::selection_ports::RegistrationQuery;
use crate::store_timeout::bounded;

use super::CandidatePipelineService;

impl CandidatePipelineService {
    /// Moves a registration to any status.
    ///
    /// Decided statuses are not terminal; the committee may reverse them.
    pub async fn update_status(
        &self,
        actor: &Actor,
        registration_id: RegistrationId,
        status: RegistrationStatus,
    ) -> AppResult<Registration> {
        self.authorization_service.require_process_manager(actor)?;

        let _guard = self.locks.lock(registration_id).await;
        let mut registration = self.load_registration(registration_id).await?;
        let previous = registration.transition_to(status);
        let registration = self.store_registration(registration).await?;

        self.append_audit(
            actor,
            AuditAction::RegistrationStatusUpdated,
            registration.id,
            format!("{} -> {}", previous.as_str(), status.as_str()),
        )
        .await;

        self.announce_transition(previous, &registration).await;

        Ok(registration)
    }

    /// Lists registrations, newest first.
    pub async fn list_registrations(
        &self,
        actor: &Actor,
        query: RegistrationQuery,
    ) -> AppResult<Vec<Registration>> {
        self.authorization_service
            .require_interview_access(actor)
            .await?;

        bounded(
            self.store_timeout,
            "list registrations",
            self.registration_repository.list_registrations(query),
        )
        .await
    }

    /// Returns one registration.
    pub async fn get_registration(
        &self,
        actor: &Actor,
        registration_id: RegistrationId,
    ) -> AppResult<Registration> {
        self.authorization_service
            .require_interview_access(actor)
            .await?;

        self.load_registration(registration_id).await
    }
}
