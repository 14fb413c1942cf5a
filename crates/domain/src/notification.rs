use serde::{Deserialize, Serialize};

use crate::{RegistrationId, UserId};

/// Notification categories shown in the notification center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Assigned work.
    Task,
    /// Calendar event.
    Event,
    /// Approaching deadline.
    Deadline,
    /// Account and process messages.
    System,
    /// Birthday greeting.
    Birthday,
    /// Budget request update.
    Budget,
}

impl NotificationKind {
    /// Returns a stable storage value for this kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::Event => "event",
            Self::Deadline => "deadline",
            Self::System => "system",
            Self::Birthday => "birthday",
            Self::Budget => "budget",
        }
    }
}

/// Addressee of a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotificationRecipient {
    /// A member account.
    Member {
        /// Member id.
        user_id: UserId,
    },
    /// An applicant, who has no member account yet.
    Applicant {
        /// Registration the applicant submitted.
        registration_id: RegistrationId,
        /// Contact email from the registration.
        email: String,
    },
}

/// Outbound notification handed to the dispatch collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Addressee.
    pub recipient: NotificationRecipient,
    /// Short title.
    pub title: String,
    /// Message body.
    pub message: String,
    /// Category.
    pub kind: NotificationKind,
    /// Related record id, when any.
    pub related_id: Option<String>,
}
