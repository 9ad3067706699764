//! Port for user identity persistence.

use async_trait::async_trait;

use crate::domain::user::{EmailAddress, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by user repository adapters.
    pub enum UserRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "user repository query failed: {message}",
        /// The email address is already registered.
        EmailTaken { email: String } =>
            "email already registered: {email}",
    }
}

/// A user together with the stored credential hash.
///
/// Only the account service sees this; the hash must not travel further.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredentials {
    pub user: User,
    pub password_hash: String,
}

/// Field values for inserting a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserRecord {
    pub email: EmailAddress,
    pub name: String,
    pub password_hash: String,
}

/// Column-level changes for a profile update; `None` leaves the column
/// untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub name: Option<String>,
    pub password_hash: Option<String>,
}

/// Port for user identity storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user; the unique-email invariant is enforced here.
    async fn insert(&self, record: NewUserRecord) -> Result<User, UserRepositoryError>;

    /// Fetch a user and credential hash by email, for authentication.
    async fn find_credentials(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<StoredCredentials>, UserRepositoryError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserRepositoryError>;

    /// Apply profile changes, returning the updated user or `None` when no
    /// such user exists.
    async fn update(
        &self,
        id: UserId,
        changes: UserChanges,
    ) -> Result<Option<User>, UserRepositoryError>;
}
