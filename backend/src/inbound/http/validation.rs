//! Shared validation helpers for inbound HTTP adapters.

use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use crate::domain::Error;

/// Message used when several field checks fail together.
pub(crate) const VALIDATION_FAILED: &str = "Validation failed";

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum ValidationCode {
    MissingField,
    InvalidEmail,
    InvalidUuid,
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub(crate) fn as_str(&self) -> &'static str {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct FieldError {
    field: &'static str,
    code: ValidationCode,
    message: String,
}

/// Accumulates per-field failures into a single `invalid_request` error
/// whose details read `{"errors":[{"field","code","message"}]}`.
#[derive(Debug, Default)]
pub(crate) struct FieldErrors {
    errors: Vec<FieldError>,
}

impl FieldErrors {
    pub(crate) fn push(
        &mut self,
        field: FieldName,
        code: ValidationCode,
        message: impl Into<String>,
    ) {
        self.errors.push(FieldError {
            field: field.as_str(),
            code,
            message: message.into(),
        });
    }

    /// `Ok(())` when nothing was recorded.
    pub(crate) fn finish(self) -> Result<(), Error> {
        if self.errors.is_empty() {
            return Ok(());
        }
        Err(Error::invalid_request(VALIDATION_FAILED).with_details(json!({
            "errors": self.errors,
        })))
    }
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    Error::invalid_request(format!("{field} must be a valid UUID")).with_details(json!({
        "field": field,
        "value": value,
        "code": ValidationCode::InvalidUuid,
    }))
}

pub(crate) fn parse_uuid(value: &str, field: FieldName) -> Result<Uuid, Error> {
    Uuid::parse_str(value).map_err(|_| invalid_uuid_error(field, value))
}
