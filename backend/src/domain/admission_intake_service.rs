//! Admission intake service: validation, document handling and storage of
//! new applications.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::ports::{
    AdmissionIntake, AdmissionRepository, AdmissionSubmission, DocumentStore, DocumentStoreError,
    DocumentUpload,
};
use crate::domain::service_support::{DUPLICATE_ADMISSION, map_admission_repository_error};
use crate::domain::{
    Admission, DocumentDescriptor, EmailAddress, Error, NewAdmission, SubmissionReceipt,
    normalise_email,
};

/// Message returned when an attachment is refused.
pub const UPLOAD_FAILED: &str = "File upload failed.";

/// Admission intake service implementing [`AdmissionIntake`].
#[derive(Clone)]
pub struct AdmissionIntakeService<R, D> {
    admissions: Arc<R>,
    documents: Arc<D>,
    clock: Arc<dyn Clock>,
    max_upload_bytes: usize,
}

impl<R, D> AdmissionIntakeService<R, D> {
    /// Create a service over an admission repository and document store.
    pub fn new(
        admissions: Arc<R>,
        documents: Arc<D>,
        clock: Arc<dyn Clock>,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            admissions,
            documents,
            clock,
            max_upload_bytes,
        }
    }
}

impl<R, D> AdmissionIntakeService<R, D>
where
    R: AdmissionRepository,
    D: DocumentStore,
{
    fn upload_rejected(error: &DocumentStoreError) -> Error {
        Error::invalid_request(UPLOAD_FAILED).with_details(json!({ "error": error.to_string() }))
    }

    fn check_uploads(&self, uploads: &[DocumentUpload]) -> Result<(), Error> {
        uploads
            .iter()
            .try_for_each(|upload| upload.validate(self.max_upload_bytes))
            .map_err(|err| Self::upload_rejected(&err))
    }

    async fn ensure_email_unused(&self, email: &EmailAddress) -> Result<(), Error> {
        let existing = self
            .admissions
            .find_by_email(email)
            .await
            .map_err(map_admission_repository_error)?;
        match existing {
            Some(_) => Err(Error::duplicate(DUPLICATE_ADMISSION)),
            None => Ok(()),
        }
    }

    /// Store attachments in order. Storage failures drop the attachment;
    /// refusals abort the submission.
    async fn store_documents(
        &self,
        uploads: Vec<DocumentUpload>,
    ) -> Result<Vec<DocumentDescriptor>, Error> {
        let mut stored = Vec::with_capacity(uploads.len());
        for upload in uploads {
            let field = upload.field.clone();
            match self.documents.store(upload).await {
                Ok(descriptor) => stored.push(descriptor),
                Err(err @ DocumentStoreError::Rejected { .. }) => {
                    self.discard_documents(&stored).await;
                    return Err(Self::upload_rejected(&err));
                }
                Err(err @ DocumentStoreError::Storage { .. }) => {
                    warn!(%field, error = %err, "continuing without attachment");
                }
            }
        }
        Ok(stored)
    }

    async fn discard_documents(&self, documents: &[DocumentDescriptor]) {
        for document in documents {
            if let Err(err) = self.documents.remove(document).await {
                warn!(public_id = %document.public_id, error = %err, "failed to discard document");
            }
        }
    }
}

#[async_trait]
impl<R, D> AdmissionIntake for AdmissionIntakeService<R, D>
where
    R: AdmissionRepository,
    D: DocumentStore,
{
    async fn submit(&self, submission: AdmissionSubmission) -> Result<SubmissionReceipt, Error> {
        let AdmissionSubmission { form, uploads } = submission;
        let mut details =
            NewAdmission::from_form(&form).map_err(|err| Error::invalid_request(err.to_string()))?;
        self.check_uploads(&uploads)?;
        self.ensure_email_unused(&details.applicant.email).await?;

        details.documents = self.store_documents(uploads).await?;
        let admission = Admission::submit(details, self.clock.utc());
        if let Err(err) = self.admissions.insert(&admission).await {
            self.discard_documents(&admission.details.documents).await;
            return Err(map_admission_repository_error(err));
        }

        info!(
            admission_id = %admission.id,
            documents = admission.details.documents.len(),
            "admission application submitted"
        );
        Ok(SubmissionReceipt::from(&admission))
    }

    async fn check_email_available(&self, email: &str) -> Result<(), Error> {
        if normalise_email(email).is_empty() {
            return Err(Error::invalid_request("Email is required for validation"));
        }
        let email = EmailAddress::parse(email)
            .map_err(|_| Error::invalid_request("Please provide a valid email address"))?;
        self.ensure_email_unused(&email).await
    }
}

#[cfg(test)]
#[path = "admission_intake_service_tests.rs"]
mod tests;
