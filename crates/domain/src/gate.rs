use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::UserId;

/// Canonical state of the selection-process gate.
///
/// A singleton: the gate controls whether public registrations are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProcessGateState {
    /// Whether public registration intake is open.
    pub is_open: bool,
    /// Member who last changed the gate.
    pub updated_by: Option<UserId>,
    /// Time of the last change.
    pub updated_at: Option<DateTime<Utc>>,
}

impl ProcessGateState {
    /// Creates a gate state written by `updated_by` at `updated_at`.
    #[must_use]
    pub fn written(is_open: bool, updated_by: UserId, updated_at: DateTime<Utc>) -> Self {
        Self {
            is_open,
            updated_by: Some(updated_by),
            updated_at: Some(updated_at),
        }
    }
}
