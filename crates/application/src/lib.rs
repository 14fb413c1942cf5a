//! Application services and ports.

#![forbid(unsafe_code)]

mod authorization_service;
mod best_effort;
mod candidate_pipeline_service;
mod clock;
mod config;
mod interviewer_grant_service;
mod keyed_lock;
mod process_gate;
mod scoring_service;
mod selection_ports;
mod selection_process;
mod store_timeout;
mod sync_mirror;

#[cfg(test)]
mod test_support;

pub use authorization_service::{AuthorizationService, InterviewClearance};
pub use candidate_pipeline_service::{
    CandidatePipelineService, ScheduleInterviewInput, SubmitRegistrationInput,
};
pub use clock::{Clock, SystemClock};
pub use config::ServiceConfig;
pub use interviewer_grant_service::{InterviewerAccessEntry, InterviewerGrantService};
pub use process_gate::ProcessGate;
pub use scoring_service::ScoringService;
pub use selection_ports::{
    AuditEvent, AuditRepository, ChangeFeed, ChangeKind, ChangeNotification, GrantQuery,
    GrantRepository, GrantUpsert, NotificationDispatcher, RegistrationQuery,
    RegistrationRepository, SelectionPorts, SettingsRepository, StoreTable, UserRepository,
};
pub use selection_process::SelectionProcess;
pub use sync_mirror::{MirrorSnapshot, SyncMirror};
