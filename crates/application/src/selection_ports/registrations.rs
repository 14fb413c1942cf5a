use async_trait::async_trait;
use selecta_core::AppResult;
use selecta_domain::{Registration, RegistrationId, RegistrationStatus};

/// Query parameters for registration listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegistrationQuery {
    /// Optional status filter.
    pub status: Option<RegistrationStatus>,
}

/// Store of applicant registrations.
#[async_trait]
pub trait RegistrationRepository: Send + Sync {
    /// Stores a new registration.
    async fn insert_registration(&self, registration: Registration) -> AppResult<()>;

    /// Finds one registration.
    async fn find_registration(
        &self,
        registration_id: RegistrationId,
    ) -> AppResult<Option<Registration>>;

    /// Lists registrations, newest first.
    async fn list_registrations(&self, query: RegistrationQuery) -> AppResult<Vec<Registration>>;

    /// Replaces a registration if the stored version still equals
    /// `registration.version`, and returns it with the bumped version.
    ///
    /// Fails with `Conflict` on a version mismatch and `NotFound` when the
    /// row is missing.
    async fn update_registration(&self, registration: Registration) -> AppResult<Registration>;
}
