//! Domain entities and invariants of the selection workflow.

#![forbid(unsafe_code)]

mod access;
mod audit;
mod gate;
mod grant;
mod notification;
mod registration;
mod role;
mod scoring;
mod user;

pub use access::{Action, Resource, ResourceAction, has_static_permission, role_resources};
pub use audit::AuditAction;
pub use gate::ProcessGateState;
pub use grant::{GrantId, GrantPermission, PermissionGrant, validate_grant_expiry};
pub use notification::{Notification, NotificationKind, NotificationRecipient};
pub use registration::{
    InterviewSchedule, NewRegistration, Registration, RegistrationId, RegistrationStatus,
};
pub use role::Role;
pub use scoring::{SCORE_MAX, SCORE_MIN, Score, ScoreWeights, compute_final_score};
pub use user::{Actor, EmailAddress, Member, UserId};
