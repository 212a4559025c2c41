//! Port abstraction for account persistence adapters and their errors.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Account, AccountId, AccountStats, Page, PageRequest, PasswordHash, Role};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by account repository adapters.
    pub enum AccountRepositoryError {
        /// Email or student ID already belongs to another account.
        Duplicate { message: String } => "account already exists: {message}",
        /// Repository connection could not be established.
        Connection { message: String } => "account repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "account repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Insert a new account.
    async fn insert(&self, account: &Account) -> Result<(), AccountRepositoryError>;

    /// Fetch an account by identifier.
    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountRepositoryError>;

    /// Fetch an account by email, scoped to `role`.
    async fn find_by_email(
        &self,
        email: &str,
        role: Role,
    ) -> Result<Option<Account>, AccountRepositoryError>;

    /// Fetch a student account by its `STU####` identifier.
    async fn find_by_student_id(
        &self,
        student_id: &str,
    ) -> Result<Option<Account>, AccountRepositoryError>;

    /// Stamp a successful login.
    async fn record_login(
        &self,
        id: &AccountId,
        at: DateTime<Utc>,
    ) -> Result<(), AccountRepositoryError>;

    /// Replace the stored password hash.
    async fn update_password(
        &self,
        id: &AccountId,
        hash: &PasswordHash,
        at: DateTime<Utc>,
    ) -> Result<(), AccountRepositoryError>;

    /// Set the active flag, returning the updated account if it exists.
    async fn set_active(
        &self,
        id: &AccountId,
        active: bool,
        at: DateTime<Utc>,
    ) -> Result<Option<Account>, AccountRepositoryError>;

    /// List student accounts, newest first, optionally filtered by a
    /// case-insensitive search over name, email and student ID.
    async fn list_students(
        &self,
        search: Option<String>,
        page: PageRequest,
    ) -> Result<Page<Account>, AccountRepositoryError>;

    /// Next unused student sequence number (highest assigned plus one).
    async fn next_student_number(&self) -> Result<u32, AccountRepositoryError>;

    /// Student counters; `recent_logins` counts logins at or after `since`.
    async fn stats(&self, since: DateTime<Utc>) -> Result<AccountStats, AccountRepositoryError>;
}
