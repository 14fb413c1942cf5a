use async_trait::async_trait;
use selecta_core::AppResult;
use selecta_domain::{Member, UserId};

/// Read access to member accounts.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Finds one member.
    async fn find_member(&self, user_id: UserId) -> AppResult<Option<Member>>;

    /// Lists all members.
    async fn list_members(&self) -> AppResult<Vec<Member>>;
}
