use std::str::FromStr;

use chrono::{DateTime, Utc};
use selecta_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EmailAddress, Score, ScoreWeights, UserId, compute_final_score};

/// Unique identifier for a registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RegistrationId(Uuid);

impl RegistrationId {
    /// Creates a new random registration identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a registration identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Parses a registration identifier from its transport form.
    pub fn parse(value: &str) -> AppResult<Self> {
        Uuid::parse_str(value.trim()).map(Self).map_err(|error| {
            AppError::Validation(format!("invalid registration id '{value}': {error}"))
        })
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for RegistrationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RegistrationId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Lifecycle status of a registration.
///
/// `Approved` and `Rejected` are not terminal: committee review may move a
/// registration back to any status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    /// Submitted, not yet looked at.
    Pending,
    /// Interview scheduled or review in progress.
    UnderReview,
    /// Accepted by the committee.
    Approved,
    /// Declined by the committee.
    Rejected,
}

impl RegistrationStatus {
    /// Returns a stable storage value for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::UnderReview => "under_review",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Returns all statuses.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[RegistrationStatus] = &[
            RegistrationStatus::Pending,
            RegistrationStatus::UnderReview,
            RegistrationStatus::Approved,
            RegistrationStatus::Rejected,
        ];

        ALL
    }

    /// Returns whether the committee has reached a decision.
    #[must_use]
    pub fn is_decided(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }

    /// Returns whether entering this status notifies the applicant.
    #[must_use]
    pub fn notifies_applicant(&self) -> bool {
        matches!(self, Self::UnderReview | Self::Approved | Self::Rejected)
    }

    /// Returns the applicant-facing message for this status.
    #[must_use]
    pub fn applicant_message(&self) -> &'static str {
        match self {
            Self::Pending => "Your registration is being analysed.",
            Self::UnderReview => "Your registration is under detailed review.",
            Self::Approved => "Congratulations! Your registration has been approved.",
            Self::Rejected => "Unfortunately your registration was not approved this time.",
        }
    }
}

impl FromStr for RegistrationStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|status| status.as_str() == value)
            .ok_or_else(|| {
                AppError::Validation(format!("unknown registration status value '{value}'"))
            })
    }
}

/// Public submission payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRegistration {
    /// Applicant full name.
    pub full_name: NonEmptyString,
    /// Applicant email.
    pub email: EmailAddress,
    /// Optional motivation letter.
    pub motivation_letter: Option<String>,
}

/// Interview details applied by scheduling.
#[derive(Debug, Clone, PartialEq)]
pub struct InterviewSchedule {
    /// Interview date and time.
    pub date: DateTime<Utc>,
    /// Lead interviewer.
    pub interviewer1_id: UserId,
    /// Optional second interviewer.
    pub interviewer2_id: Option<UserId>,
    /// Written test score, when recorded.
    pub test_score: Option<Score>,
    /// First interviewer's score, when recorded.
    pub interview1_score: Option<Score>,
    /// Second interviewer's score, when recorded.
    pub interview2_score: Option<Score>,
    /// Free-form committee notes.
    pub notes: Option<String>,
}

/// Applicant record progressing through the selection pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    /// Stable registration id.
    pub id: RegistrationId,
    /// Applicant full name.
    pub full_name: String,
    /// Applicant email.
    pub email: String,
    /// Optional motivation letter.
    pub motivation_letter: Option<String>,
    /// Lifecycle status.
    pub status: RegistrationStatus,
    /// Scheduled interview date.
    pub interview_date: Option<DateTime<Utc>>,
    /// Lead interviewer.
    pub interviewer1_id: Option<UserId>,
    /// Second interviewer.
    pub interviewer2_id: Option<UserId>,
    /// Written test score.
    pub test_score: Option<Score>,
    /// First interview score.
    pub interview1_score: Option<Score>,
    /// Second interview score.
    pub interview2_score: Option<Score>,
    /// Derived weighted score; `None` until enough scores exist.
    pub final_score: Option<f64>,
    /// Committee notes.
    pub notes: Option<String>,
    /// Submission timestamp.
    pub created_at: DateTime<Utc>,
    /// Optimistic concurrency token, bumped on every stored update.
    pub version: u64,
}

impl Registration {
    /// Creates a pending registration from a public submission.
    #[must_use]
    pub fn submit(input: NewRegistration, created_at: DateTime<Utc>) -> Self {
        Self {
            id: RegistrationId::new(),
            full_name: input.full_name.into(),
            email: input.email.into(),
            motivation_letter: input.motivation_letter,
            status: RegistrationStatus::Pending,
            interview_date: None,
            interviewer1_id: None,
            interviewer2_id: None,
            test_score: None,
            interview1_score: None,
            interview2_score: None,
            final_score: None,
            notes: None,
            created_at,
            version: 0,
        }
    }

    /// Returns the recorded interview scores.
    #[must_use]
    pub fn interview_scores(&self) -> Vec<f64> {
        [self.interview1_score, self.interview2_score]
            .into_iter()
            .flatten()
            .map(|score| score.value())
            .collect()
    }

    /// Recomputes the derived final score with the given weights.
    pub fn recompute_final_score(&mut self, weights: ScoreWeights) {
        self.final_score = compute_final_score(
            self.test_score.map(|score| score.value()),
            &self.interview_scores(),
            weights,
        );
    }

    /// Applies interview scheduling and returns the status before the call.
    ///
    /// Supplied scores and notes replace the stored ones; omitted ones are
    /// kept. A registration without a decision moves to `UnderReview`.
    pub fn schedule_interview(&mut self, schedule: InterviewSchedule) -> RegistrationStatus {
        let previous = self.status;

        self.interview_date = Some(schedule.date);
        self.interviewer1_id = Some(schedule.interviewer1_id);
        self.interviewer2_id = schedule.interviewer2_id;
        if schedule.test_score.is_some() {
            self.test_score = schedule.test_score;
        }
        if schedule.interview1_score.is_some() {
            self.interview1_score = schedule.interview1_score;
        }
        if schedule.interview2_score.is_some() {
            self.interview2_score = schedule.interview2_score;
        }
        if schedule.notes.is_some() {
            self.notes = schedule.notes;
        }

        if !previous.is_decided() {
            self.status = RegistrationStatus::UnderReview;
        }

        previous
    }

    /// Moves the registration to any status and returns the previous one.
    pub fn transition_to(&mut self, status: RegistrationStatus) -> RegistrationStatus {
        std::mem::replace(&mut self.status, status)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use selecta_core::NonEmptyString;

    use super::{InterviewSchedule, NewRegistration, Registration, RegistrationStatus};
    use crate::{EmailAddress, Score, ScoreWeights, UserId};

    fn pending_registration() -> Registration {
        Registration::submit(
            NewRegistration {
                full_name: NonEmptyString::new("Bruno Lima").unwrap_or_else(|_| unreachable!()),
                email: EmailAddress::new("bruno@example.org").unwrap_or_else(|_| unreachable!()),
                motivation_letter: None,
            },
            Utc::now(),
        )
    }

    fn schedule(interview1_score: Option<f64>) -> InterviewSchedule {
        InterviewSchedule {
            date: Utc::now(),
            interviewer1_id: UserId::new(),
            interviewer2_id: None,
            test_score: Some(Score::new(80.0).unwrap_or_else(|_| unreachable!())),
            interview1_score: interview1_score
                .map(|value| Score::new(value).unwrap_or_else(|_| unreachable!())),
            interview2_score: None,
            notes: Some("punctual".to_owned()),
        }
    }

    #[test]
    fn scheduling_moves_pending_to_under_review() {
        let mut registration = pending_registration();
        let previous = registration.schedule_interview(schedule(None));

        assert_eq!(previous, RegistrationStatus::Pending);
        assert_eq!(registration.status, RegistrationStatus::UnderReview);
        assert!(registration.interview_date.is_some());
        assert_eq!(registration.notes.as_deref(), Some("punctual"));
    }

    #[test]
    fn scheduling_keeps_decided_status() {
        let mut registration = pending_registration();
        registration.transition_to(RegistrationStatus::Rejected);
        registration.schedule_interview(schedule(None));

        assert_eq!(registration.status, RegistrationStatus::Rejected);
    }

    #[test]
    fn omitted_scores_are_kept() {
        let mut registration = pending_registration();
        registration.schedule_interview(schedule(Some(70.0)));
        registration.schedule_interview(schedule(None));

        assert_eq!(registration.interview_scores(), vec![70.0]);
    }

    #[test]
    fn final_score_follows_recorded_scores() {
        let mut registration = pending_registration();
        registration.schedule_interview(schedule(None));
        registration.recompute_final_score(ScoreWeights::default());
        assert_eq!(registration.final_score, None);

        registration.schedule_interview(schedule(Some(90.0)));
        registration.recompute_final_score(ScoreWeights::default());
        assert!(matches!(registration.final_score, Some(value) if (value - 86.0).abs() < 1e-9));
    }

    #[test]
    fn decided_registrations_can_be_reopened() {
        let mut registration = pending_registration();
        registration.transition_to(RegistrationStatus::Approved);
        let previous = registration.transition_to(RegistrationStatus::Pending);

        assert_eq!(previous, RegistrationStatus::Approved);
        assert_eq!(registration.status, RegistrationStatus::Pending);
    }

    #[test]
    fn only_review_and_decisions_notify_the_applicant() {
        assert!(!RegistrationStatus::Pending.notifies_applicant());
        assert!(RegistrationStatus::UnderReview.notifies_applicant());
        assert!(RegistrationStatus::Approved.notifies_applicant());
        assert!(RegistrationStatus::Rejected.notifies_applicant());
    }
}
