//! Filesystem storage for admission attachments.

mod local_document_store;

pub use local_document_store::{LocalDocumentStore, UPLOAD_URL_PREFIX};
