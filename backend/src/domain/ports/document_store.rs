//! Port for storing supporting documents attached to admission forms.

use async_trait::async_trait;

use crate::domain::DocumentDescriptor;

use super::define_port_error;

/// Form field names accepted as document attachments.
pub const DOCUMENT_FIELDS: [&str; 6] = [
    "photo",
    "marksheet",
    "birthCertificate",
    "transferCertificate",
    "idProof",
    "documents",
];

/// MIME types accepted for attachments.
pub const ALLOWED_CONTENT_TYPES: [&str; 5] = [
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/webp",
    "application/pdf",
];

define_port_error! {
    /// Errors raised by document storage adapters.
    pub enum DocumentStoreError {
        /// The file itself was refused (type or size).
        Rejected { message: String } => "document rejected: {message}",
        /// Writing to the backing store failed.
        Storage { message: String } => "document storage failed: {message}",
    }
}

/// A file part received with an admission form.
#[derive(Clone, PartialEq, Eq)]
pub struct DocumentUpload {
    /// Form field the file arrived under.
    pub field: String,
    /// Client-supplied file name.
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for DocumentUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentUpload")
            .field("field", &self.field)
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Whether `field` is one of the [`DOCUMENT_FIELDS`].
pub fn is_document_field(field: &str) -> bool {
    DOCUMENT_FIELDS.contains(&field)
}

impl DocumentUpload {
    /// Check the content type and size before storage.
    ///
    /// # Examples
    /// ```
    /// use institute::domain::ports::DocumentUpload;
    ///
    /// let upload = DocumentUpload {
    ///     field: "photo".into(),
    ///     file_name: "me.png".into(),
    ///     content_type: "image/png".into(),
    ///     bytes: vec![0; 16],
    /// };
    /// assert!(upload.validate(1024).is_ok());
    /// assert!(upload.validate(8).is_err());
    /// ```
    pub fn validate(&self, max_bytes: usize) -> Result<(), DocumentStoreError> {
        let content_type = self.content_type.to_ascii_lowercase();
        if !ALLOWED_CONTENT_TYPES.contains(&content_type.as_str()) {
            return Err(DocumentStoreError::rejected(
                "Only image files (JPEG, PNG, WebP) and PDF documents are allowed",
            ));
        }
        if self.bytes.len() > max_bytes {
            return Err(DocumentStoreError::rejected(format!(
                "{} exceeds the {max_bytes} byte limit",
                self.file_name
            )));
        }
        Ok(())
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Persist an upload and describe where it lives.
    async fn store(&self, upload: DocumentUpload)
    -> Result<DocumentDescriptor, DocumentStoreError>;

    /// Remove a previously stored document. Missing documents are ignored.
    async fn remove(&self, descriptor: &DocumentDescriptor) -> Result<(), DocumentStoreError>;
}

/// Fixture store that records nothing and fabricates descriptors.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureDocumentStore;

#[async_trait]
impl DocumentStore for FixtureDocumentStore {
    async fn store(
        &self,
        upload: DocumentUpload,
    ) -> Result<DocumentDescriptor, DocumentStoreError> {
        Ok(DocumentDescriptor {
            url: format!("/uploads/{}", upload.file_name),
            public_id: upload.file_name.clone(),
            name: upload.file_name,
            kind: upload.field,
        })
    }

    async fn remove(&self, _descriptor: &DocumentDescriptor) -> Result<(), DocumentStoreError> {
        Ok(())
    }
}
