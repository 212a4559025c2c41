//! Port abstraction for admission application persistence.
//!
//! Two adapters implement this port: the Diesel repository backed by
//! PostgreSQL and the process-local fallback store used while the database is
//! unreachable. `FailoverAdmissionRepository` chooses between them per call.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    Admission, AdmissionDecision, AdmissionFilter, AdmissionId, AdmissionStats, EmailAddress,
    Page, PageRequest,
};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by admission repository adapters.
    pub enum AdmissionRepositoryError {
        /// An application with the same email already exists.
        Duplicate { email: String } => "admission already exists for {email}",
        /// Repository connection could not be established.
        Connection { message: String } => "admission repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "admission repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AdmissionRepository: Send + Sync {
    /// Insert a new application.
    ///
    /// Returns [`AdmissionRepositoryError::Duplicate`] when the email is
    /// already taken. This is the authoritative uniqueness check.
    async fn insert(&self, admission: &Admission) -> Result<(), AdmissionRepositoryError>;

    /// Look up an application by normalised email.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Admission>, AdmissionRepositoryError>;

    /// Look up an application by identifier.
    async fn find_by_id(
        &self,
        id: &AdmissionId,
    ) -> Result<Option<Admission>, AdmissionRepositoryError>;

    /// List applications, newest first.
    async fn list(
        &self,
        filter: &AdmissionFilter,
        page: PageRequest,
    ) -> Result<Page<Admission>, AdmissionRepositoryError>;

    /// Record a decision on a pending application.
    ///
    /// Returns the updated record, or `None` when no pending application
    /// with that id exists.
    async fn update_decision(
        &self,
        id: &AdmissionId,
        decision: &AdmissionDecision,
    ) -> Result<Option<Admission>, AdmissionRepositoryError>;

    /// Remove an application. Returns `false` when nothing was deleted.
    async fn delete(&self, id: &AdmissionId) -> Result<bool, AdmissionRepositoryError>;

    /// Aggregate counters; `recent` counts submissions at or after `since`.
    async fn stats(&self, since: DateTime<Utc>)
    -> Result<AdmissionStats, AdmissionRepositoryError>;
}
