use chrono::{DateTime, Utc};
use selecta_core::{AppError, AppResult};
use selecta_domain::{
    Actor, AuditAction, InterviewSchedule, Registration, RegistrationId, Score, UserId,
};

use crate::InterviewClearance;
use crate::store_timeout::bounded;

use super::CandidatePipelineService;

/// Interview scheduling request; optional fields are validated on use.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScheduleInterviewInput {
    /// Interview date and time; required.
    pub date: Option<DateTime<Utc>>,
    /// Lead interviewer; required.
    pub interviewer1_id: Option<UserId>,
    /// Optional second interviewer.
    pub interviewer2_id: Option<UserId>,
    /// Written test score.
    pub test_score: Option<f64>,
    /// First interviewer's score.
    pub interview1_score: Option<f64>,
    /// Second interviewer's score.
    pub interview2_score: Option<f64>,
    /// Committee notes.
    pub notes: Option<String>,
}

impl ScheduleInterviewInput {
    fn into_schedule(self) -> AppResult<InterviewSchedule> {
        let date = self
            .date
            .ok_or_else(|| AppError::Validation("interview date is required".to_owned()))?;
        let interviewer1_id = self
            .interviewer1_id
            .ok_or_else(|| AppError::Validation("first interviewer is required".to_owned()))?;
        if self.interviewer2_id == Some(interviewer1_id) {
            return Err(AppError::Validation(
                "second interviewer must differ from the first".to_owned(),
            ));
        }

        Ok(InterviewSchedule {
            date,
            interviewer1_id,
            interviewer2_id: self.interviewer2_id,
            test_score: self.test_score.map(Score::new).transpose()?,
            interview1_score: self.interview1_score.map(Score::new).transpose()?,
            interview2_score: self.interview2_score.map(Score::new).transpose()?,
            notes: self
                .notes
                .map(|notes| notes.trim().to_owned())
                .filter(|notes| !notes.is_empty()),
        })
    }
}

impl CandidatePipelineService {
    /// Schedules an interview and records any supplied scores.
    ///
    /// Undecided registrations move to `UnderReview`; the final score is
    /// recomputed with the current weights.
    pub async fn schedule_interview(
        &self,
        actor: &Actor,
        registration_id: RegistrationId,
        input: ScheduleInterviewInput,
    ) -> AppResult<Registration> {
        let clearance = self
            .authorization_service
            .require_interview_access(actor)
            .await?;
        let schedule = input.into_schedule()?;

        let interviewers = [Some(schedule.interviewer1_id), schedule.interviewer2_id];
        for interviewer_id in interviewers.into_iter().flatten() {
            self.require_eligible_interviewer(&clearance, interviewer_id)
                .await?;
        }

        let weights = self.scoring_service.current_weights().await?;

        let _guard = self.locks.lock(registration_id).await;
        let mut registration = self.load_registration(registration_id).await?;
        let previous = registration.schedule_interview(schedule);
        registration.recompute_final_score(weights);
        let registration = self.store_registration(registration).await?;

        self.append_audit(
            actor,
            AuditAction::InterviewScheduled,
            registration.id,
            format!(
                "interview on {} ({} -> {})",
                registration
                    .interview_date
                    .map(|date| date.to_rfc3339())
                    .unwrap_or_default(),
                previous.as_str(),
                registration.status.as_str()
            ),
        )
        .await;

        self.announce_transition(previous, &registration).await;

        Ok(registration)
    }

    /// Interviewers must be active members; a grant-cleared actor may only
    /// pick other grant holders.
    async fn require_eligible_interviewer(
        &self,
        clearance: &InterviewClearance,
        interviewer_id: UserId,
    ) -> AppResult<()> {
        let member = bounded(
            self.store_timeout,
            "load interviewer",
            self.user_repository.find_member(interviewer_id),
        )
        .await?;
        if !member.is_some_and(|member| member.is_active()) {
            return Err(AppError::Validation(format!(
                "interviewer '{interviewer_id}' is not an active member"
            )));
        }

        if matches!(clearance, InterviewClearance::Grant(_))
            && !self
                .authorization_service
                .is_interviewer(interviewer_id)
                .await?
        {
            return Err(AppError::Validation(format!(
                "interviewer '{interviewer_id}' does not hold interviewer access"
            )));
        }

        Ok(())
    }
}
