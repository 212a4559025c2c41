//! Login, token authentication and password management for accounts.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use mockable::Clock;
use tracing::{debug, info};

use crate::domain::ports::{AccountRepository, AuthService, PasswordHasher, TokenIssuer};
use crate::domain::service_support::{
    map_account_repository_error, map_hasher_error, map_token_error,
};
use crate::domain::{
    Account, AccountId, AccountStats, AdminCredentials, Error, LoginOutcome, PasswordChange,
    PublicProfile, Role, StudentCredentials, StudentIdentifier,
};

/// Message for wrong identifiers or passwords.
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";
/// Message for deactivated accounts.
pub const ACCOUNT_DEACTIVATED: &str =
    "Your account has been deactivated. Please contact administration.";
/// Window used for the recent-logins counter.
pub const RECENT_LOGIN_DAYS: i64 = 7;

/// Authentication service implementing [`AuthService`].
#[derive(Clone)]
pub struct AccountAuthService<A, H, T> {
    accounts: Arc<A>,
    hasher: Arc<H>,
    tokens: Arc<T>,
    clock: Arc<dyn Clock>,
}

impl<A, H, T> AccountAuthService<A, H, T> {
    /// Create the service.
    pub fn new(accounts: Arc<A>, hasher: Arc<H>, tokens: Arc<T>, clock: Arc<dyn Clock>) -> Self {
        Self {
            accounts,
            hasher,
            tokens,
            clock,
        }
    }
}

impl<A, H, T> AccountAuthService<A, H, T>
where
    A: AccountRepository,
    H: PasswordHasher,
    T: TokenIssuer,
{
    fn ensure_active(account: &Account) -> Result<(), Error> {
        if account.is_active {
            Ok(())
        } else {
            Err(Error::account_disabled(ACCOUNT_DEACTIVATED))
        }
    }

    fn verify_password(&self, account: &Account, password: &str) -> Result<(), Error> {
        let matches = self
            .hasher
            .verify(password, &account.password_hash)
            .map_err(map_hasher_error)?;
        if matches {
            Ok(())
        } else {
            Err(Error::unauthorized(INVALID_CREDENTIALS))
        }
    }

    /// Active flag first, then password, then stamp and issue.
    async fn complete_login(
        &self,
        account: Option<Account>,
        password: &str,
    ) -> Result<LoginOutcome, Error> {
        let mut account = account.ok_or_else(|| Error::unauthorized(INVALID_CREDENTIALS))?;
        Self::ensure_active(&account)?;
        self.verify_password(&account, password)?;

        let now = self.clock.utc();
        self.accounts
            .record_login(&account.id, now)
            .await
            .map_err(map_account_repository_error)?;
        account.last_login = Some(now);

        let token = self
            .tokens
            .issue(account.id, account.role)
            .map_err(|err| map_token_error(&err))?;
        info!(account_id = %account.id, role = %account.role, "login succeeded");
        Ok(LoginOutcome {
            token: token.as_str().to_owned(),
            user: PublicProfile::from(&account),
        })
    }
}

#[async_trait]
impl<A, H, T> AuthService for AccountAuthService<A, H, T>
where
    A: AccountRepository,
    H: PasswordHasher,
    T: TokenIssuer,
{
    async fn admin_login(&self, credentials: &AdminCredentials) -> Result<LoginOutcome, Error> {
        let account = self
            .accounts
            .find_by_email(credentials.email(), Role::Admin)
            .await
            .map_err(map_account_repository_error)?;
        self.complete_login(account, credentials.password()).await
    }

    async fn student_login(
        &self,
        credentials: &StudentCredentials,
    ) -> Result<LoginOutcome, Error> {
        let account = match credentials.identifier() {
            StudentIdentifier::StudentId(student_id) => {
                self.accounts.find_by_student_id(student_id).await
            }
            StudentIdentifier::Email(email) => {
                self.accounts.find_by_email(email, Role::Student).await
            }
        }
        .map_err(map_account_repository_error)?
        .filter(|account| account.role == Role::Student);
        self.complete_login(account, credentials.password()).await
    }

    async fn authenticate_token(&self, token: &str) -> Result<Account, Error> {
        let claims = self.tokens.verify(token).map_err(|err| {
            debug!(error = %err, "bearer token rejected");
            map_token_error(&err)
        })?;
        let account = self
            .accounts
            .find_by_id(&claims.sub)
            .await
            .map_err(map_account_repository_error)?
            .filter(|account| account.role == claims.role)
            .ok_or_else(|| Error::unauthorized("User not found"))?;
        Self::ensure_active(&account)?;
        Ok(account)
    }

    async fn change_password(&self, id: &AccountId, change: &PasswordChange) -> Result<(), Error> {
        let account = self
            .accounts
            .find_by_id(id)
            .await
            .map_err(map_account_repository_error)?
            .ok_or_else(|| Error::unauthorized("User not found"))?;
        let matches = self
            .hasher
            .verify(change.current(), &account.password_hash)
            .map_err(map_hasher_error)?;
        if !matches {
            return Err(Error::unauthorized("Current password is incorrect"));
        }
        let hash = self
            .hasher
            .hash(change.new_password())
            .map_err(map_hasher_error)?;
        self.accounts
            .update_password(id, &hash, self.clock.utc())
            .await
            .map_err(map_account_repository_error)?;
        info!(account_id = %id, "password changed");
        Ok(())
    }

    async fn stats(&self) -> Result<AccountStats, Error> {
        let since = self.clock.utc() - Duration::days(RECENT_LOGIN_DAYS);
        self.accounts
            .stats(since)
            .await
            .map_err(map_account_repository_error)
    }
}

#[cfg(test)]
#[path = "account_auth_service_tests.rs"]
mod tests;
