//! Driving port for login and session use-cases.
//!
//! Inbound adapters call this port to authenticate credentials and bearer
//! tokens without importing the hasher, signer or persistence adapters.

use async_trait::async_trait;

use crate::domain::{
    Account, AccountId, AccountStats, AdminCredentials, Error, LoginOutcome, PasswordChange,
    StudentCredentials,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Authenticate an administrator and issue a token.
    async fn admin_login(&self, credentials: &AdminCredentials) -> Result<LoginOutcome, Error>;

    /// Authenticate a student and issue a token.
    async fn student_login(&self, credentials: &StudentCredentials)
    -> Result<LoginOutcome, Error>;

    /// Verify a bearer token and reload the account it names.
    ///
    /// Fails with `unauthorized` for bad tokens or missing accounts and with
    /// `account_disabled` for deactivated accounts.
    async fn authenticate_token(&self, token: &str) -> Result<Account, Error>;

    /// Replace the caller's password after checking the current one.
    async fn change_password(&self, id: &AccountId, change: &PasswordChange) -> Result<(), Error>;

    /// Student population counters with a seven-day login window.
    async fn stats(&self) -> Result<AccountStats, Error>;
}
