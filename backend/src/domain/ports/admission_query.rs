//! Driving port for public admission lookups.

use async_trait::async_trait;

use crate::domain::{AdmissionStats, AdmissionStatusView, Error};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AdmissionQuery: Send + Sync {
    /// Status projection for the application filed under `email`.
    async fn status_by_email(&self, email: &str) -> Result<AdmissionStatusView, Error>;

    /// Counters by status plus the rolling recent count.
    async fn stats(&self) -> Result<AdmissionStats, Error>;
}
