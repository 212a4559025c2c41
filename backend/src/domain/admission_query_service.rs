//! Public admission lookups: status by email and aggregate counters.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use mockable::Clock;

use crate::domain::ports::{AdmissionQuery, AdmissionRepository};
use crate::domain::service_support::map_admission_repository_error;
use crate::domain::{
    AdmissionStats, AdmissionStatusView, EmailAddress, Error, RECENT_WINDOW_DAYS,
    looks_like_email,
};

/// Message returned when no application matches the email.
pub const ADMISSION_NOT_FOUND: &str = "No admission application found for this email";

/// Admission query service implementing [`AdmissionQuery`].
#[derive(Clone)]
pub struct AdmissionQueryService<R> {
    admissions: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> AdmissionQueryService<R> {
    /// Create a service over an admission repository.
    pub fn new(admissions: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { admissions, clock }
    }
}

#[async_trait]
impl<R> AdmissionQuery for AdmissionQueryService<R>
where
    R: AdmissionRepository,
{
    async fn status_by_email(&self, email: &str) -> Result<AdmissionStatusView, Error> {
        if !looks_like_email(email) {
            return Err(Error::invalid_request(
                "Please provide a valid email address",
            ));
        }
        // Stored emails always satisfy the full pattern, so anything else
        // cannot match a record.
        let Ok(email) = EmailAddress::parse(email) else {
            return Err(Error::not_found(ADMISSION_NOT_FOUND));
        };
        self.admissions
            .find_by_email(&email)
            .await
            .map_err(map_admission_repository_error)?
            .map(|admission| AdmissionStatusView::from(&admission))
            .ok_or_else(|| Error::not_found(ADMISSION_NOT_FOUND))
    }

    async fn stats(&self) -> Result<AdmissionStats, Error> {
        let since = self.clock.utc() - Duration::days(RECENT_WINDOW_DAYS);
        self.admissions
            .stats(since)
            .await
            .map_err(map_admission_repository_error)
    }
}
