use std::str::FromStr;

use chrono::{DateTime, Utc};
use selecta_application::{RegistrationQuery, ScheduleInterviewInput, SubmitRegistrationInput};
use selecta_core::AppResult;
use selecta_domain::{Registration, RegistrationStatus, UserId};
use serde::{Deserialize, Serialize};

/// Incoming payload for a public registration.
#[derive(Debug, Deserialize)]
pub struct SubmitRegistrationRequest {
    pub full_name: String,
    pub email: String,
    pub motivation_letter: Option<String>,
}

/// Incoming payload for interview scheduling and scoring.
#[derive(Debug, Default, Deserialize)]
pub struct ScheduleInterviewRequest {
    pub date: Option<DateTime<Utc>>,
    pub interviewer1_id: Option<UserId>,
    pub interviewer2_id: Option<UserId>,
    pub test_score: Option<f64>,
    pub interview1_score: Option<f64>,
    pub interview2_score: Option<f64>,
    pub notes: Option<String>,
}

/// Incoming payload for a manual status change.
#[derive(Debug, Deserialize)]
pub struct UpdateRegistrationStatusRequest {
    pub status: String,
}

/// Query string for registration listing.
#[derive(Debug, Default, Deserialize)]
pub struct RegistrationListQuery {
    pub status: Option<String>,
}

/// API representation of a registration.
#[derive(Debug, Serialize)]
pub struct RegistrationResponse {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub motivation_letter: Option<String>,
    pub status: String,
    pub interview_date: Option<String>,
    pub interviewer1_id: Option<String>,
    pub interviewer2_id: Option<String>,
    pub test_score: Option<f64>,
    pub interview1_score: Option<f64>,
    pub interview2_score: Option<f64>,
    pub final_score: Option<f64>,
    pub notes: Option<String>,
    pub created_at: String,
    pub version: u64,
}

impl From<SubmitRegistrationRequest> for SubmitRegistrationInput {
    fn from(value: SubmitRegistrationRequest) -> Self {
        Self {
            full_name: value.full_name,
            email: value.email,
            motivation_letter: value.motivation_letter,
        }
    }
}

impl From<ScheduleInterviewRequest> for ScheduleInterviewInput {
    fn from(value: ScheduleInterviewRequest) -> Self {
        Self {
            date: value.date,
            interviewer1_id: value.interviewer1_id,
            interviewer2_id: value.interviewer2_id,
            test_score: value.test_score,
            interview1_score: value.interview1_score,
            interview2_score: value.interview2_score,
            notes: value.notes,
        }
    }
}

impl UpdateRegistrationStatusRequest {
    /// Parses the requested status.
    pub fn status(&self) -> AppResult<RegistrationStatus> {
        RegistrationStatus::from_str(self.status.trim())
    }
}

impl RegistrationListQuery {
    /// Converts the query string into a repository query.
    pub fn into_query(self) -> AppResult<RegistrationQuery> {
        let status = self
            .status
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(RegistrationStatus::from_str)
            .transpose()?;

        Ok(RegistrationQuery { status })
    }
}

impl From<Registration> for RegistrationResponse {
    fn from(value: Registration) -> Self {
        Self {
            id: value.id.to_string(),
            full_name: value.full_name,
            email: value.email,
            motivation_letter: value.motivation_letter,
            status: value.status.as_str().to_owned(),
            interview_date: value.interview_date.map(|date| date.to_rfc3339()),
            interviewer1_id: value.interviewer1_id.map(|id| id.to_string()),
            interviewer2_id: value.interviewer2_id.map(|id| id.to_string()),
            test_score: value.test_score.map(|score| score.value()),
            interview1_score: value.interview1_score.map(|score| score.value()),
            interview2_score: value.interview2_score.map(|score| score.value()),
            final_score: value.final_score,
            notes: value.notes,
            created_at: value.created_at.to_rfc3339(),
            version: value.version,
        }
    }
}
