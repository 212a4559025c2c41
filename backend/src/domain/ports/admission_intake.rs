//! Driving port for public admission submissions.

use async_trait::async_trait;

use crate::domain::{AdmissionForm, Error, SubmissionReceipt};

use super::DocumentUpload;

/// Raw submission as received by an inbound adapter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdmissionSubmission {
    pub form: AdmissionForm,
    pub uploads: Vec<DocumentUpload>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AdmissionIntake: Send + Sync {
    /// Validate, store and acknowledge a new application.
    async fn submit(&self, submission: AdmissionSubmission) -> Result<SubmissionReceipt, Error>;

    /// Succeed when no application exists for `email`.
    async fn check_email_available(&self, email: &str) -> Result<(), Error>;
}
