//! Document store writing uploads into a capability-scoped local directory.

use std::io;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use sha2::{Digest, Sha256};
use tracing::debug;
use uuid::Uuid;

use crate::domain::DocumentDescriptor;
use crate::domain::ports::{DocumentStore, DocumentStoreError, DocumentUpload};

/// URL prefix under which stored documents are addressed.
pub const UPLOAD_URL_PREFIX: &str = "/uploads";

/// Hex characters of the content digest kept in stored file names.
const DIGEST_PREFIX_LEN: usize = 16;

/// Stores each upload as a uniquely named file inside one directory.
///
/// File names never derive from client input beyond a sanitised extension,
/// and all access goes through a `cap_std` directory handle.
#[derive(Clone)]
pub struct LocalDocumentStore {
    dir: Arc<Dir>,
}

impl LocalDocumentStore {
    /// Open `path`, creating it and its parents when missing.
    pub fn open(path: &Path) -> io::Result<Self> {
        Dir::create_ambient_dir_all(path, ambient_authority())?;
        let dir = Dir::open_ambient_dir(path, ambient_authority())?;
        Ok(Self { dir: Arc::new(dir) })
    }
}

fn extension(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.len() <= 8)
        .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default()
}

fn stored_name(upload: &DocumentUpload) -> String {
    let digest = hex::encode(Sha256::digest(&upload.bytes));
    let prefix = digest.get(..DIGEST_PREFIX_LEN).unwrap_or(&digest);
    format!(
        "{prefix}-{}{}",
        Uuid::new_v4().simple(),
        extension(&upload.file_name)
    )
}

fn is_plain_name(name: &str) -> bool {
    !name.is_empty() && !name.starts_with('.') && !name.contains(['/', '\\'])
}

fn storage_error(err: impl std::fmt::Display) -> DocumentStoreError {
    DocumentStoreError::storage(err.to_string())
}

#[async_trait]
impl DocumentStore for LocalDocumentStore {
    async fn store(
        &self,
        upload: DocumentUpload,
    ) -> Result<DocumentDescriptor, DocumentStoreError> {
        let name = stored_name(&upload);
        let dir = Arc::clone(&self.dir);
        let target = name.clone();
        let DocumentUpload {
            field,
            file_name,
            bytes,
            ..
        } = upload;
        tokio::task::spawn_blocking(move || dir.write(&target, &bytes))
            .await
            .map_err(storage_error)?
            .map_err(storage_error)?;
        debug!(field = %field, stored = %name, "document stored");
        Ok(DocumentDescriptor {
            kind: field,
            url: format!("{UPLOAD_URL_PREFIX}/{name}"),
            public_id: name,
            name: file_name,
        })
    }

    async fn remove(&self, descriptor: &DocumentDescriptor) -> Result<(), DocumentStoreError> {
        let name = descriptor.public_id.clone();
        if !is_plain_name(&name) {
            return Err(DocumentStoreError::storage(format!(
                "refusing to remove {name}"
            )));
        }
        let dir = Arc::clone(&self.dir);
        let outcome = tokio::task::spawn_blocking(move || dir.remove_file(&name))
            .await
            .map_err(storage_error)?;
        match outcome {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(storage_error(err)),
        }
    }
}
