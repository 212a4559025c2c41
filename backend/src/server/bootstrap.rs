//! Startup creation of the configured administrator account.

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::info;

use crate::domain::ports::{
    AccountRepository, AccountRepositoryError, PasswordHasher, PasswordHasherError,
};
use crate::domain::{
    Account, AccountValidationError, EmailAddress, Role, validate_password_strength,
};

use super::config::BootstrapAdmin;

/// Result of ensuring the bootstrap administrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    Created,
    AlreadyPresent,
}

/// Errors returned while ensuring the bootstrap administrator.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("invalid bootstrap admin credentials: {0}")]
    Invalid(#[from] AccountValidationError),
    #[error("failed to hash bootstrap admin password: {0}")]
    Hash(#[from] PasswordHasherError),
    #[error("failed to store bootstrap admin: {0}")]
    Repository(#[from] AccountRepositoryError),
}

/// Create the administrator unless an admin with the same email exists.
pub async fn ensure_bootstrap_admin<A, H>(
    accounts: &A,
    hasher: &H,
    admin: &BootstrapAdmin,
    now: DateTime<Utc>,
) -> Result<BootstrapOutcome, BootstrapError>
where
    A: AccountRepository + ?Sized,
    H: PasswordHasher + ?Sized,
{
    let email = EmailAddress::parse(&admin.email)?;
    if accounts
        .find_by_email(email.as_ref(), Role::Admin)
        .await?
        .is_some()
    {
        info!(email = %email, "bootstrap admin already present");
        return Ok(BootstrapOutcome::AlreadyPresent);
    }
    validate_password_strength(&admin.password)?;
    let hash = hasher.hash(&admin.password)?;
    accounts
        .insert(&Account::new_admin(email.clone(), hash, now))
        .await?;
    info!(email = %email, "bootstrap admin created");
    Ok(BootstrapOutcome::Created)
}
