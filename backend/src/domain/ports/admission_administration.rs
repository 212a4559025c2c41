//! Driving port for admin review of admission applications.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Admission, AdmissionFilter, AdmissionId, Error, Page, PageRequest};

use super::IssuedCredentials;

/// Admin verdict on a pending application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DecisionAction {
    #[serde(alias = "approve")]
    Accept,
    Reject,
}

/// Request to accept or reject an application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessDecisionRequest {
    pub admission_id: AdmissionId,
    pub action: DecisionAction,
    pub rejection_reason: Option<String>,
}

/// Result of processing an application.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ProcessedAdmission {
    pub admission: Admission,
    /// Present when acceptance provisioned a student account.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student: Option<IssuedCredentials>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AdmissionAdministration: Send + Sync {
    /// Filtered, paginated listing, newest first.
    async fn list(
        &self,
        filter: AdmissionFilter,
        page: PageRequest,
    ) -> Result<Page<Admission>, Error>;

    /// Fetch one application.
    async fn get(&self, id: AdmissionId) -> Result<Admission, Error>;

    /// Accept or reject a pending application.
    async fn process(&self, request: ProcessDecisionRequest) -> Result<ProcessedAdmission, Error>;

    /// Delete an application and its stored documents.
    async fn delete(&self, id: AdmissionId) -> Result<(), Error>;
}
