//! Admission repository choosing PostgreSQL or the fallback store per call.
//!
//! The liveness flag is read on every operation; nothing is cached between
//! requests. Reads and writes only ever touch the backend selected for that
//! call, so records written to the fallback store stay invisible once the
//! database returns.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::domain::ports::{AdmissionRepository, AdmissionRepositoryError, DatabaseLiveness};
use crate::domain::{
    Admission, AdmissionDecision, AdmissionFilter, AdmissionId, AdmissionStats, EmailAddress,
    Page, PageRequest,
};

/// Backend label recorded in logs.
const DATABASE: &str = "database";
const FALLBACK: &str = "fallback";

/// Routes each call to `primary` while the database is reachable and to
/// `fallback` otherwise.
pub struct FailoverAdmissionRepository<P, F> {
    primary: P,
    fallback: F,
    liveness: Arc<dyn DatabaseLiveness>,
}

impl<P, F> FailoverAdmissionRepository<P, F>
where
    P: AdmissionRepository,
    F: AdmissionRepository,
{
    /// Create a repository consulting `liveness` before every call.
    pub fn new(primary: P, fallback: F, liveness: Arc<dyn DatabaseLiveness>) -> Self {
        Self {
            primary,
            fallback,
            liveness,
        }
    }

    fn select(&self) -> (&'static str, &dyn AdmissionRepository) {
        if self.liveness.is_connected() {
            (DATABASE, &self.primary)
        } else {
            (FALLBACK, &self.fallback)
        }
    }
}

#[async_trait]
impl<P, F> AdmissionRepository for FailoverAdmissionRepository<P, F>
where
    P: AdmissionRepository,
    F: AdmissionRepository,
{
    async fn insert(&self, admission: &Admission) -> Result<(), AdmissionRepositoryError> {
        let (backend, repo) = self.select();
        repo.insert(admission).await?;
        info!(backend, admission_id = %admission.id, "admission stored");
        Ok(())
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Admission>, AdmissionRepositoryError> {
        let (backend, repo) = self.select();
        debug!(backend, "admission lookup by email");
        repo.find_by_email(email).await
    }

    async fn find_by_id(
        &self,
        id: &AdmissionId,
    ) -> Result<Option<Admission>, AdmissionRepositoryError> {
        let (backend, repo) = self.select();
        debug!(backend, admission_id = %id, "admission lookup by id");
        repo.find_by_id(id).await
    }

    async fn list(
        &self,
        filter: &AdmissionFilter,
        page: PageRequest,
    ) -> Result<Page<Admission>, AdmissionRepositoryError> {
        let (backend, repo) = self.select();
        debug!(backend, "admission listing");
        repo.list(filter, page).await
    }

    async fn update_decision(
        &self,
        id: &AdmissionId,
        decision: &AdmissionDecision,
    ) -> Result<Option<Admission>, AdmissionRepositoryError> {
        let (backend, repo) = self.select();
        let updated = repo.update_decision(id, decision).await?;
        if updated.is_some() {
            info!(backend, admission_id = %id, status = %decision.status, "admission decided");
        }
        Ok(updated)
    }

    async fn delete(&self, id: &AdmissionId) -> Result<bool, AdmissionRepositoryError> {
        let (backend, repo) = self.select();
        let deleted = repo.delete(id).await?;
        if deleted {
            info!(backend, admission_id = %id, "admission deleted");
        }
        Ok(deleted)
    }

    async fn stats(
        &self,
        since: DateTime<Utc>,
    ) -> Result<AdmissionStats, AdmissionRepositoryError> {
        let (backend, repo) = self.select();
        debug!(backend, "admission stats");
        repo.stats(since).await
    }
}
