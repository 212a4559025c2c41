//! Admin review of admission applications.
//!
//! Acceptance provisions a student account before the decision is stored, so
//! a provisioning failure leaves the application pending.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use crate::domain::ports::{
    AdmissionAdministration, AdmissionRepository, DecisionAction, DocumentStore,
    IssuedCredentials, ProcessDecisionRequest, ProcessedAdmission, StudentProvisioning,
};
use crate::domain::service_support::map_admission_repository_error;
use crate::domain::{
    Admission, AdmissionDecision, AdmissionFilter, AdmissionId, AdmissionStatus, Error, Page,
    PageRequest, sanitize_note,
};

/// Message returned when the application id is unknown.
pub const APPLICATION_NOT_FOUND: &str = "Admission application not found";
/// Message returned when a terminal application is processed again.
pub const ALREADY_PROCESSED: &str = "Application has already been processed";

/// Admission administration service implementing [`AdmissionAdministration`].
#[derive(Clone)]
pub struct AdmissionAdminService<R, P, D> {
    admissions: Arc<R>,
    provisioning: Arc<P>,
    documents: Arc<D>,
    clock: Arc<dyn Clock>,
}

impl<R, P, D> AdmissionAdminService<R, P, D> {
    /// Create the service.
    pub fn new(
        admissions: Arc<R>,
        provisioning: Arc<P>,
        documents: Arc<D>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            admissions,
            provisioning,
            documents,
            clock,
        }
    }
}

impl<R, P, D> AdmissionAdminService<R, P, D>
where
    R: AdmissionRepository,
    P: StudentProvisioning,
    D: DocumentStore,
{
    async fn load(&self, id: &AdmissionId) -> Result<Admission, Error> {
        self.admissions
            .find_by_id(id)
            .await
            .map_err(map_admission_repository_error)?
            .ok_or_else(|| Error::not_found(APPLICATION_NOT_FOUND))
    }

    async fn record(
        &self,
        id: &AdmissionId,
        decision: &AdmissionDecision,
    ) -> Result<Admission, Error> {
        self.admissions
            .update_decision(id, decision)
            .await
            .map_err(map_admission_repository_error)?
            .ok_or_else(|| Error::invalid_request(ALREADY_PROCESSED))
    }
}

#[async_trait]
impl<R, P, D> AdmissionAdministration for AdmissionAdminService<R, P, D>
where
    R: AdmissionRepository,
    P: StudentProvisioning,
    D: DocumentStore,
{
    async fn list(
        &self,
        filter: AdmissionFilter,
        page: PageRequest,
    ) -> Result<Page<Admission>, Error> {
        self.admissions
            .list(&filter, page)
            .await
            .map_err(map_admission_repository_error)
    }

    async fn get(&self, id: AdmissionId) -> Result<Admission, Error> {
        self.load(&id).await
    }

    async fn process(&self, request: ProcessDecisionRequest) -> Result<ProcessedAdmission, Error> {
        let admission = self.load(&request.admission_id).await?;
        if admission.status.is_terminal() {
            return Err(Error::invalid_request(ALREADY_PROCESSED));
        }
        let processed_at = self.clock.utc();

        match request.action {
            DecisionAction::Accept => {
                let student = self.provisioning.provision(&admission).await?;
                let decision = AdmissionDecision {
                    status: AdmissionStatus::Accepted,
                    processed_at,
                    student_id: Some(student.student_id.clone()),
                    rejection_reason: None,
                };
                let updated = self.record(&admission.id, &decision).await.inspect_err(|_| {
                    warn!(
                        admission_id = %admission.id,
                        student_id = %student.student_id,
                        "student provisioned but decision was not recorded"
                    );
                })?;
                info!(admission_id = %updated.id, student_id = %student.student_id, "admission accepted");
                Ok(ProcessedAdmission {
                    admission: updated,
                    student: Some(IssuedCredentials::from(&student)),
                })
            }
            DecisionAction::Reject => {
                let decision = AdmissionDecision {
                    status: AdmissionStatus::Rejected,
                    processed_at,
                    student_id: None,
                    rejection_reason: sanitize_note(request.rejection_reason.as_deref()),
                };
                let updated = self.record(&admission.id, &decision).await?;
                info!(admission_id = %updated.id, "admission rejected");
                Ok(ProcessedAdmission {
                    admission: updated,
                    student: None,
                })
            }
        }
    }

    async fn delete(&self, id: AdmissionId) -> Result<(), Error> {
        let admission = self.load(&id).await?;
        let removed = self
            .admissions
            .delete(&id)
            .await
            .map_err(map_admission_repository_error)?;
        if !removed {
            return Err(Error::not_found(APPLICATION_NOT_FOUND));
        }
        for document in &admission.details.documents {
            if let Err(err) = self.documents.remove(document).await {
                warn!(public_id = %document.public_id, error = %err, "failed to remove document");
            }
        }
        info!(admission_id = %id, "admission deleted");
        Ok(())
    }
}

#[cfg(test)]
#[path = "admission_admin_service_tests.rs"]
mod tests;
