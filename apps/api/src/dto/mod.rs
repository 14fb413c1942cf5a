mod common;
mod interviewers;
mod registrations;
mod selection;

pub use common::{HealthResponse, MemberResponse, PermissionCheckQuery, PermissionCheckResponse};
pub use interviewers::{
    GrantInterviewerRequest, InterviewerAccessQuery, InterviewerAccessResponse,
    InterviewerStatusResponse,
};
pub use registrations::{
    RegistrationListQuery, RegistrationResponse, ScheduleInterviewRequest,
    SubmitRegistrationRequest, UpdateRegistrationStatusRequest,
};
pub use selection::{
    FinalScoreRequest, FinalScoreResponse, ProcessStateResponse, ScoreWeightsRequest,
    ScoreWeightsResponse,
};
