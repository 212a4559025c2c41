//! HTTP adapter mapping for domain errors.
//!
//! Purpose: keep the domain error type HTTP-agnostic while allowing Actix
//! handlers to turn domain failures into the failure envelope
//! `{success:false, message, code, traceId?, details?, error?}` with a
//! consistent status code.

use std::sync::atomic::{AtomicBool, Ordering};

use actix_web::{HttpRequest, HttpResponse, ResponseError, http::StatusCode};
use serde::Serialize;
use serde_json::Value;
use tracing::error;
use utoipa::ToSchema;

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Message clients see in place of internal failure details.
pub const INTERNAL_ERROR_MESSAGE: &str = "Something went wrong!";

static EXPOSE_INTERNAL_DETAILS: AtomicBool = AtomicBool::new(false);

/// Toggle whether internal failure details reach clients in the `error`
/// field. The server enables this in development mode only.
pub fn set_expose_internal_details(enabled: bool) {
    EXPOSE_INTERNAL_DETAILS.store(enabled, Ordering::Relaxed);
}

fn expose_internal_details() -> bool {
    EXPOSE_INTERNAL_DETAILS.load(Ordering::Relaxed)
}

/// Failure envelope written for every error response.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    /// Always `false`.
    pub success: bool,
    /// Human-readable message surfaced verbatim by clients.
    #[schema(example = "Please provide a valid email address")]
    pub message: String,
    /// Machine-readable failure category.
    pub code: ErrorCode,
    /// Correlation identifier echoed in the `trace-id` header.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    /// Structured details such as field-level validation errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub details: Option<Value>,
    /// Raw internal failure detail, present in development mode only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ErrorEnvelope {
    /// Build the client payload, redacting internal failures.
    pub fn from_error(error: &Error, expose_internal: bool) -> Self {
        let redacted = redact_if_internal(error);
        let detail = (expose_internal && matches!(error.code(), ErrorCode::InternalError))
            .then(|| error.message().to_owned());
        Self {
            success: false,
            message: redacted.message().to_owned(),
            code: redacted.code(),
            trace_id: redacted.trace_id().map(str::to_owned),
            details: redacted.details().cloned(),
            error: detail,
        }
    }
}

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest | ErrorCode::Duplicate => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::AccountDisabled | ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn redact_if_internal(error: &Error) -> Error {
    if matches!(error.code(), ErrorCode::InternalError) {
        let mut redacted = Error::internal(INTERNAL_ERROR_MESSAGE);
        if let Some(id) = error.trace_id() {
            redacted = redacted.with_trace_id(id.to_owned());
        }
        redacted
    } else {
        error.clone()
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        if matches!(self.code(), ErrorCode::InternalError) {
            error!(message = %self.message(), trace_id = ?self.trace_id(), "request failed");
        }
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }

        builder.json(ErrorEnvelope::from_error(self, expose_internal_details()))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        // Do not leak implementation details to clients.
        error!(error = %err, "actix error promoted to domain error");
        Error::internal(INTERNAL_ERROR_MESSAGE)
    }
}

/// Convert extractor rejections (malformed JSON, query or path values) into
/// an `invalid_request` envelope instead of Actix's plain-text default.
pub fn extractor_error_handler<E>(err: E, _req: &HttpRequest) -> actix_web::Error
where
    E: std::fmt::Display,
{
    Error::invalid_request(err.to_string()).into()
}
