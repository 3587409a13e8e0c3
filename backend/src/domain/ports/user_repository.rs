//! Port for reading user records and for non-transactional status changes.

use async_trait::async_trait;

use crate::domain::{PasswordDigest, User, UserId, UserStatus};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user store adapters.
    pub enum UserPersistenceError {
        /// Store connection could not be established.
        Connection { message: String } => "user store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user store query failed: {message}",
        /// A storage-level uniqueness constraint on the passport fired.
        PassportTaken => "passport is already registered",
        /// A storage-level uniqueness constraint on the nickname fired.
        NicknameTaken => "nickname is already in use",
    }
}

/// Account reads and status changes outside a transaction.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Look up the user whose passport and stored digest both match.
    async fn find_by_credentials(
        &self,
        passport: &str,
        digest: &PasswordDigest,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Overwrite the account status. Returns `false` when no row matched.
    async fn set_status(&self, id: UserId, status: UserStatus) -> Result<bool, UserPersistenceError>;
}
