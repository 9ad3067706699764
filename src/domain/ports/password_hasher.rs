//! Port for credential hashing.

use super::define_port_error;

define_port_error! {
    /// Errors raised by password hasher adapters.
    pub enum PasswordHasherError {
        /// Hashing or verification failed internally.
        Hashing { message: String } =>
            "password hashing failed: {message}",
    }
}

/// Port for one-way password hashing.
///
/// Implementations produce self-describing hash strings (PHC format) so the
/// verify side needs no separate parameters. Hashing is CPU-bound and
/// synchronous; callers on async paths should treat a call as cheap enough
/// not to offload (interactive parameters, single request).
#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    /// Hash a raw password for storage.
    fn hash(&self, raw: &str) -> Result<String, PasswordHasherError>;

    /// Check a raw password against a stored hash.
    ///
    /// Returns `Ok(false)` for a well-formed mismatch; `Err` only when the
    /// stored hash cannot be interpreted at all.
    fn verify(&self, raw: &str, hash: &str) -> Result<bool, PasswordHasherError>;
}
