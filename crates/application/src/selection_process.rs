use std::sync::Arc;

use chrono::{DateTime, Utc};
use selecta_core::{AppError, AppResult};
use selecta_domain::{
    Action, Actor, Member, PermissionGrant, Registration, RegistrationId, RegistrationStatus,
    Resource, ScoreWeights, UserId,
};

use crate::clock::Clock;
use crate::selection_ports::{ChangeFeed, GrantQuery, RegistrationQuery, SelectionPorts};
use crate::store_timeout::bounded;
use crate::{
    AuthorizationService, CandidatePipelineService, InterviewerAccessEntry,
    InterviewerGrantService, ProcessGate, ScheduleInterviewInput, ScoringService, ServiceConfig,
    SubmitRegistrationInput, SyncMirror,
};

/// Entry point for callers of the selection subsystem.
///
/// Every operation takes the acting identity explicitly.
#[derive(Clone)]
pub struct SelectionProcess {
    ports: SelectionPorts,
    clock: Arc<dyn Clock>,
    config: ServiceConfig,
    authorization_service: AuthorizationService,
    grant_service: InterviewerGrantService,
    pipeline_service: CandidatePipelineService,
    scoring_service: ScoringService,
    process_gate: ProcessGate,
}

impl SelectionProcess {
    /// Wires every service over the given collaborators.
    #[must_use]
    pub fn new(ports: SelectionPorts, clock: Arc<dyn Clock>, config: ServiceConfig) -> Self {
        let authorization_service = AuthorizationService::new(
            ports.grants.clone(),
            ports.audit.clone(),
            clock.clone(),
            config.store_timeout,
        );
        let process_gate = ProcessGate::new(
            authorization_service.clone(),
            ports.settings.clone(),
            ports.audit.clone(),
            clock.clone(),
            config.store_timeout,
            config.gate_staleness,
        );
        let scoring_service = ScoringService::new(
            authorization_service.clone(),
            ports.settings.clone(),
            ports.audit.clone(),
            clock.clone(),
            config.store_timeout,
        );
        let grant_service = InterviewerGrantService::new(
            authorization_service.clone(),
            ports.grants.clone(),
            ports.users.clone(),
            ports.audit.clone(),
            ports.notifications.clone(),
            clock.clone(),
            config.store_timeout,
        );
        let pipeline_service = CandidatePipelineService::new(
            authorization_service.clone(),
            process_gate.clone(),
            scoring_service.clone(),
            &ports,
            clock.clone(),
            config.store_timeout,
        );

        Self {
            ports,
            clock,
            config,
            authorization_service,
            grant_service,
            pipeline_service,
            scoring_service,
            process_gate,
        }
    }

    /// Builds a mirror that shares this process's gate.
    #[must_use]
    pub fn sync_mirror(&self, change_feed: Arc<dyn ChangeFeed>) -> SyncMirror {
        SyncMirror::new(
            &self.ports,
            change_feed,
            self.process_gate.clone(),
            self.clock.clone(),
            self.config.store_timeout,
            self.config.mirror_reload_interval,
        )
    }

    /// Returns the shared process gate.
    #[must_use]
    pub fn process_gate(&self) -> &ProcessGate {
        &self.process_gate
    }

    /// Resolves an active member into an actor.
    pub async fn resolve_actor(&self, user_id: UserId) -> AppResult<Actor> {
        let member = bounded(
            self.config.store_timeout,
            "load member",
            self.ports.users.find_member(user_id),
        )
        .await?;

        match member {
            Some(member) if member.is_active() => Ok(member.actor()),
            _ => Err(AppError::Unauthorized(
                "unknown or inactive member".to_owned(),
            )),
        }
    }

    /// Lists the member directory for interviewer selection.
    pub async fn list_members(&self, actor: &Actor) -> AppResult<Vec<Member>> {
        self.authorization_service
            .require_interview_access(actor)
            .await?;

        let mut members = bounded(
            self.config.store_timeout,
            "list members",
            self.ports.users.list_members(),
        )
        .await?;
        members.sort_by(|left, right| left.name().as_str().cmp(right.name().as_str()));
        Ok(members)
    }

    /// Returns whether the actor may perform `action` on `resource`.
    pub async fn check_permission(
        &self,
        actor: &Actor,
        resource: Resource,
        action: Action,
    ) -> AppResult<bool> {
        self.authorization_service
            .check_permission(actor, resource, action)
            .await
    }

    /// Grants or refreshes interviewer access.
    pub async fn grant_interviewer(
        &self,
        actor: &Actor,
        target_user_id: UserId,
        expires_at: Option<DateTime<Utc>>,
    ) -> AppResult<PermissionGrant> {
        self.grant_service
            .grant(actor, target_user_id, expires_at)
            .await
    }

    /// Revokes interviewer access.
    pub async fn revoke_interviewer(
        &self,
        actor: &Actor,
        target_user_id: UserId,
    ) -> AppResult<PermissionGrant> {
        self.grant_service.revoke(actor, target_user_id).await
    }

    /// Returns whether the member holds interviewer access now.
    pub async fn is_interviewer(&self, user_id: UserId) -> AppResult<bool> {
        self.grant_service.is_active(user_id).await
    }

    /// Lists interviewer grants.
    pub async fn list_interviewer_access(
        &self,
        actor: &Actor,
        query: GrantQuery,
    ) -> AppResult<Vec<InterviewerAccessEntry>> {
        self.grant_service
            .list_interviewer_access(actor, query)
            .await
    }

    /// Accepts a public registration.
    pub async fn submit_registration(
        &self,
        input: SubmitRegistrationInput,
    ) -> AppResult<Registration> {
        self.pipeline_service.submit_registration(input).await
    }

    /// Schedules an interview.
    pub async fn schedule_interview(
        &self,
        actor: &Actor,
        registration_id: RegistrationId,
        input: ScheduleInterviewInput,
    ) -> AppResult<Registration> {
        self.pipeline_service
            .schedule_interview(actor, registration_id, input)
            .await
    }

    /// Moves a registration to a new status.
    pub async fn update_registration_status(
        &self,
        actor: &Actor,
        registration_id: RegistrationId,
        status: RegistrationStatus,
    ) -> AppResult<Registration> {
        self.pipeline_service
            .update_status(actor, registration_id, status)
            .await
    }

    /// Lists registrations.
    pub async fn list_registrations(
        &self,
        actor: &Actor,
        query: RegistrationQuery,
    ) -> AppResult<Vec<Registration>> {
        self.pipeline_service.list_registrations(actor, query).await
    }

    /// Returns one registration.
    pub async fn get_registration(
        &self,
        actor: &Actor,
        registration_id: RegistrationId,
    ) -> AppResult<Registration> {
        self.pipeline_service
            .get_registration(actor, registration_id)
            .await
    }

    /// Replaces the score weights.
    pub async fn set_score_weights(
        &self,
        actor: &Actor,
        test_weight: i32,
        interview_weight: i32,
    ) -> AppResult<ScoreWeights> {
        self.scoring_service
            .set_weights(actor, test_weight, interview_weight)
            .await
    }

    /// Returns the current score weights.
    pub async fn current_score_weights(&self) -> AppResult<ScoreWeights> {
        self.scoring_service.current_weights().await
    }

    /// Computes a final score with the current weights.
    pub async fn compute_final_score(
        &self,
        test_score: Option<f64>,
        interview_scores: &[f64],
    ) -> AppResult<Option<f64>> {
        self.scoring_service
            .compute_final_score(test_score, interview_scores)
            .await
    }

    /// Flips the selection process open/closed and returns the new value.
    pub async fn toggle_process_gate(&self, actor: &Actor) -> AppResult<bool> {
        self.process_gate.toggle(actor).await
    }

    /// Returns whether public registration is open.
    pub async fn is_process_open(&self) -> bool {
        self.process_gate.is_open().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Duration;
    use selecta_core::AppError;
    use selecta_domain::{Action, Resource, Role, UserId};

    use crate::clock::Clock;
    use crate::test_support::{FakeStore, ManualClock, config, ports};

    use super::SelectionProcess;

    fn process(store: &Arc<FakeStore>, clock: &Arc<ManualClock>) -> SelectionProcess {
        SelectionProcess::new(ports(store), clock.clone(), config())
    }

    #[tokio::test]
    async fn interview_permission_follows_the_grant_lifetime() {
        let store = Arc::new(FakeStore::default());
        let clock = Arc::new(ManualClock::new());
        let process = process(&store, &clock);
        let president = store.add_member(Role::President).await;
        let member = store.add_member(Role::Member).await;

        let _ = process
            .grant_interviewer(&president, member.id(), Some(clock.now() + Duration::hours(1)))
            .await;
        assert!(
            process
                .check_permission(&member, Resource::Candidates, Action::Interview)
                .await
                .unwrap_or(false)
        );

        clock.advance(Duration::hours(2));
        assert!(
            !process
                .check_permission(&member, Resource::Candidates, Action::Interview)
                .await
                .unwrap_or(true)
        );
    }

    #[tokio::test]
    async fn toggle_reports_the_new_state() {
        let store = Arc::new(FakeStore::default());
        let clock = Arc::new(ManualClock::new());
        let process = process(&store, &clock);
        let superadmin = store.add_member(Role::Superadmin).await;

        assert!(!process.is_process_open().await);
        assert!(matches!(process.toggle_process_gate(&superadmin).await, Ok(true)));
        assert!(process.is_process_open().await);
    }

    #[tokio::test]
    async fn only_active_members_resolve_to_actors() {
        let store = Arc::new(FakeStore::default());
        let clock = Arc::new(ManualClock::new());
        let process = process(&store, &clock);
        let active = store.add_member(Role::Treasurer).await;
        let inactive = store.add_member_with_status(Role::Treasurer, false).await;

        assert!(matches!(process.resolve_actor(active.id()).await, Ok(actor) if actor == active));
        assert!(matches!(
            process.resolve_actor(inactive.id()).await,
            Err(AppError::Unauthorized(_))
        ));
        assert!(matches!(
            process.resolve_actor(UserId::new()).await,
            Err(AppError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn member_directory_is_for_interview_staff() {
        let store = Arc::new(FakeStore::default());
        let clock = Arc::new(ManualClock::new());
        let process = process(&store, &clock);
        let vice_president = store.add_member(Role::VicePresident).await;
        let member = store.add_member(Role::Member).await;

        assert!(matches!(
            process.list_members(&member).await,
            Err(AppError::Forbidden(_))
        ));
        assert_eq!(
            process
                .list_members(&vice_president)
                .await
                .unwrap_or_default()
                .len(),
            2
        );
    }
}
