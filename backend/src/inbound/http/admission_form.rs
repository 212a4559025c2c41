//! Reads admission submissions from multipart, urlencoded or JSON bodies.
//!
//! File handling is best effort: file parts under unknown field names are
//! counted and discarded, and a multipart stream that breaks mid-way keeps
//! whatever was read so far. Oversized parts and requests over the overall
//! byte budget are hard failures here; content-type and configured size
//! checks belong to the intake service.

use actix_multipart::{Field, Multipart};
use actix_web::dev::UrlEncoded;
use actix_web::http::header::CONTENT_TYPE;
use actix_web::{HttpRequest, web};
use futures_util::StreamExt as _;
use serde_json::json;
use tracing::{debug, warn};

use crate::domain::ports::{AdmissionSubmission, DocumentUpload, is_document_field};
use crate::domain::{AdmissionForm, Error, UPLOAD_FAILED};

/// Upper bound on any single file part held in memory.
pub const MAX_FILE_PART_BYTES: usize = 16 * 1024 * 1024;
/// Upper bound on a text part, a urlencoded body or a JSON body.
pub const MAX_TEXT_BYTES: usize = 64 * 1024;
/// Upper bound on all multipart bytes read for one request, skipped parts
/// included.
pub const MAX_SUBMISSION_BYTES: usize = 32 * 1024 * 1024;

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";
const BODY_TOO_LARGE: &str = "Request body is too large";

/// Bytes still allowed for the current request.
struct Budget {
    remaining: usize,
}

impl Budget {
    fn charge(&mut self, len: usize) -> bool {
        match self.remaining.checked_sub(len) {
            Some(left) => {
                self.remaining = left;
                true
            }
            None => false,
        }
    }
}

/// Outcome of reading one field.
enum FieldBytes {
    Complete(Vec<u8>),
    TooLarge,
    OverBudget,
    Broken,
}

async fn drain(field: &mut Field, limit: usize, budget: &mut Budget) -> FieldBytes {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.next().await {
        match chunk {
            Ok(chunk) => {
                if !budget.charge(chunk.len()) {
                    return FieldBytes::OverBudget;
                }
                if bytes.len() + chunk.len() > limit {
                    return FieldBytes::TooLarge;
                }
                bytes.extend_from_slice(&chunk);
            }
            Err(error) => {
                warn!(%error, "multipart field ended early");
                return FieldBytes::Broken;
            }
        }
    }
    FieldBytes::Complete(bytes)
}

/// Read a field to its end, keeping nothing but the byte count.
async fn discard(field: &mut Field, budget: &mut Budget) -> FieldBytes {
    let mut skipped = 0_usize;
    while let Some(chunk) = field.next().await {
        match chunk {
            Ok(chunk) => {
                if !budget.charge(chunk.len()) {
                    return FieldBytes::OverBudget;
                }
                skipped += chunk.len();
            }
            Err(error) => {
                warn!(%error, "multipart field ended early");
                return FieldBytes::Broken;
            }
        }
    }
    debug!(skipped, "discarded multipart field");
    FieldBytes::Complete(Vec::new())
}

fn too_large(field: &str, limit: usize) -> Error {
    Error::invalid_request(UPLOAD_FAILED).with_details(json!({
        "field": field,
        "error": format!("part exceeds {limit} bytes"),
    }))
}

fn over_budget() -> Error {
    Error::invalid_request(BODY_TOO_LARGE).with_details(json!({
        "limit": MAX_SUBMISSION_BYTES,
    }))
}

/// Collect text fields and document parts from a multipart stream.
pub async fn read_multipart(multipart: Multipart) -> Result<AdmissionSubmission, Error> {
    read_multipart_within(multipart, MAX_SUBMISSION_BYTES).await
}

async fn read_multipart_within(
    mut multipart: Multipart,
    max_bytes: usize,
) -> Result<AdmissionSubmission, Error> {
    let mut budget = Budget {
        remaining: max_bytes,
    };
    let mut submission = AdmissionSubmission::default();
    while let Some(item) = multipart.next().await {
        let mut field = match item {
            Ok(field) => field,
            Err(error) => {
                warn!(%error, "multipart stream unreadable; continuing without remaining parts");
                break;
            }
        };
        let name = field.name().unwrap_or_default().to_owned();
        let file_name = field
            .content_disposition()
            .and_then(|disposition| disposition.get_filename())
            .map(str::to_owned);

        match file_name {
            Some(file_name) if is_document_field(&name) => {
                let content_type = field
                    .content_type()
                    .map(|mime| mime.essence_str().to_owned())
                    .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_owned());
                match drain(&mut field, MAX_FILE_PART_BYTES, &mut budget).await {
                    FieldBytes::Complete(bytes) if bytes.is_empty() => {
                        debug!(field = %name, "empty file part skipped");
                    }
                    FieldBytes::Complete(bytes) => submission.uploads.push(DocumentUpload {
                        field: name,
                        file_name,
                        content_type,
                        bytes,
                    }),
                    FieldBytes::TooLarge => return Err(too_large(&name, MAX_FILE_PART_BYTES)),
                    FieldBytes::OverBudget => return Err(over_budget()),
                    FieldBytes::Broken => break,
                }
            }
            Some(_) => {
                debug!(field = %name, "file under unexpected field skipped");
                match discard(&mut field, &mut budget).await {
                    FieldBytes::OverBudget => return Err(over_budget()),
                    FieldBytes::Broken => break,
                    FieldBytes::Complete(_) | FieldBytes::TooLarge => {}
                }
            }
            None => match drain(&mut field, MAX_TEXT_BYTES, &mut budget).await {
                FieldBytes::Complete(bytes) => {
                    let value = String::from_utf8_lossy(&bytes).into_owned();
                    if !submission.form.set_field(&name, value) {
                        debug!(field = %name, "unknown form field ignored");
                    }
                }
                FieldBytes::TooLarge => {
                    return Err(Error::invalid_request(format!("Field {name} is too large")));
                }
                FieldBytes::OverBudget => return Err(over_budget()),
                FieldBytes::Broken => break,
            },
        }
    }
    Ok(submission)
}

/// Parse an `application/x-www-form-urlencoded` admission form.
pub async fn read_urlencoded(
    req: &HttpRequest,
    payload: web::Payload,
) -> Result<AdmissionSubmission, Error> {
    let mut payload = payload.into_inner();
    let pairs: Vec<(String, String)> = UrlEncoded::new(req, &mut payload)
        .limit(MAX_TEXT_BYTES)
        .await
        .map_err(|err| Error::invalid_request(format!("Invalid form body: {err}")))?;
    let mut submission = AdmissionSubmission::default();
    for (name, value) in pairs {
        if !submission.form.set_field(&name, value) {
            debug!(field = %name, "unknown form field ignored");
        }
    }
    Ok(submission)
}

/// Parse a JSON admission form; JSON bodies never carry documents.
pub async fn read_json(mut payload: web::Payload) -> Result<AdmissionSubmission, Error> {
    let mut body = web::BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(|err| Error::invalid_request(err.to_string()))?;
        if body.len() + chunk.len() > MAX_TEXT_BYTES {
            return Err(Error::invalid_request(BODY_TOO_LARGE));
        }
        body.extend_from_slice(&chunk);
    }
    let form: AdmissionForm = if body.is_empty() {
        AdmissionForm::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|err| Error::invalid_request(format!("Invalid JSON body: {err}")))?
    };
    Ok(AdmissionSubmission {
        form,
        uploads: Vec::new(),
    })
}

fn has_content_type(req: &HttpRequest, expected: &str) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.to_ascii_lowercase().starts_with(expected))
}

/// Dispatch on the request content type.
pub async fn read_submission(
    req: &HttpRequest,
    payload: web::Payload,
) -> Result<AdmissionSubmission, Error> {
    if has_content_type(req, "multipart/form-data") {
        read_multipart(Multipart::new(req.headers(), payload)).await
    } else if has_content_type(req, "application/x-www-form-urlencoded") {
        read_urlencoded(req, payload).await
    } else {
        read_json(payload).await
    }
}
