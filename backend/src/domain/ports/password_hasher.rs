//! Port for one-way password hashing.

use crate::domain::PasswordHash;

use super::define_port_error;

define_port_error! {
    /// Failures raised by password hashing adapters.
    pub enum PasswordHasherError {
        /// Hash computation failed.
        Hash { message: String } => "password hashing failed: {message}",
        /// Stored hash could not be parsed.
        CorruptHash { message: String } => "stored password hash is invalid: {message}",
    }
}

/// Hashes and verifies plain-text passwords.
#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    /// Hash a plain-text password with a fresh salt.
    fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHasherError>;

    /// Check a plain-text password against a stored hash.
    fn verify(&self, password: &str, hash: &PasswordHash) -> Result<bool, PasswordHasherError>;
}

/// Reversible stand-in for tests and fixtures. Never use in production.
///
/// # Examples
/// ```
/// use institute::domain::ports::{FixturePasswordHasher, PasswordHasher};
///
/// let hasher = FixturePasswordHasher;
/// let hash = hasher.hash("secret").unwrap();
/// assert!(hasher.verify("secret", &hash).unwrap());
/// assert!(!hasher.verify("other", &hash).unwrap());
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePasswordHasher;

const FIXTURE_PREFIX: &str = "fixture$";

impl PasswordHasher for FixturePasswordHasher {
    fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHasherError> {
        Ok(PasswordHash::from_phc(format!("{FIXTURE_PREFIX}{password}")))
    }

    fn verify(&self, password: &str, hash: &PasswordHash) -> Result<bool, PasswordHasherError> {
        let stored = hash
            .as_str()
            .strip_prefix(FIXTURE_PREFIX)
            .ok_or_else(|| PasswordHasherError::corrupt_hash("missing fixture prefix"))?;
        Ok(stored == password)
    }
}
