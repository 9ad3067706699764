//! Argon2 password hashing adapter.

use argon2::{
    Argon2,
    password_hash::{
        PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString, rand_core::OsRng,
    },
};

use crate::domain::ports::{PasswordHasher, PasswordHasherError};

/// `PasswordHasher` port adapter producing Argon2id PHC strings.
///
/// Uses the crate's default parameters (Argon2id, 19 MiB, 2 iterations),
/// which are tuned for interactive logins. Each hash carries a fresh random
/// salt, so equal passwords never share a hash.
#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2PasswordHasher;

impl Argon2PasswordHasher {
    pub fn new() -> Self {
        Self
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, raw: &str) -> Result<String, PasswordHasherError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(raw.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| PasswordHasherError::hashing(err.to_string()))
    }

    fn verify(&self, raw: &str, hash: &str) -> Result<bool, PasswordHasherError> {
        let parsed =
            PasswordHash::new(hash).map_err(|err| PasswordHasherError::hashing(err.to_string()))?;
        match Argon2::default().verify_password(raw.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(err) => Err(PasswordHasherError::hashing(err.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn hash_verifies_and_rejects() {
        let hasher = Argon2PasswordHasher::new();
        let hash = hasher.hash("testpass").expect("hash");

        assert!(hash.starts_with("$argon2"));
        assert!(hasher.verify("testpass", &hash).expect("verify"));
        assert!(!hasher.verify("wrongpass", &hash).expect("verify"));
    }

    #[rstest]
    fn equal_passwords_get_distinct_hashes() {
        let hasher = Argon2PasswordHasher::new();
        let first = hasher.hash("testpass").expect("hash");
        let second = hasher.hash("testpass").expect("hash");
        assert_ne!(first, second);
    }

    #[rstest]
    fn malformed_stored_hash_is_an_error() {
        let hasher = Argon2PasswordHasher::new();
        let err = hasher
            .verify("testpass", "not-a-phc-string")
            .expect_err("malformed hash");
        assert!(matches!(err, PasswordHasherError::Hashing { .. }));
    }
}
