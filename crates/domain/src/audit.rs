use serde::{Deserialize, Serialize};

/// Stable audit actions emitted by selection use-cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Interviewer access granted or refreshed.
    InterviewerAccessGranted,
    /// Interviewer access revoked.
    InterviewerAccessRevoked,
    /// A grant was relied on to authorize an interview operation.
    InterviewerAccessUsed,
    /// Interview scheduled or scores recorded.
    InterviewScheduled,
    /// Registration status changed by the committee.
    RegistrationStatusUpdated,
    /// Public registration accepted.
    RegistrationSubmitted,
    /// Score weights changed.
    ScoreWeightsUpdated,
    /// Selection process opened or closed.
    ProcessGateToggled,
}

impl AuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InterviewerAccessGranted => "selection.interviewer_access.granted",
            Self::InterviewerAccessRevoked => "selection.interviewer_access.revoked",
            Self::InterviewerAccessUsed => "selection.interviewer_access.used",
            Self::InterviewScheduled => "selection.interview.scheduled",
            Self::RegistrationStatusUpdated => "selection.registration.status_updated",
            Self::RegistrationSubmitted => "selection.registration.submitted",
            Self::ScoreWeightsUpdated => "selection.score_weights.updated",
            Self::ProcessGateToggled => "selection.process_gate.toggled",
        }
    }
}
