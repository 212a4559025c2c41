//! Domain-level error type shared by services and adapters.
//!
//! Errors are transport agnostic. The HTTP adapter maps each [`ErrorCode`]
//! onto a status code and wraps the message in the response envelope.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use super::TraceId;

/// Stable machine-readable failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Input is missing or malformed.
    InvalidRequest,
    /// A uniqueness rule was violated (for example a second application for
    /// the same email address).
    Duplicate,
    /// Credentials were wrong or no valid token was supplied.
    Unauthorized,
    /// The account exists but has been deactivated.
    AccountDisabled,
    /// Authenticated but not permitted to perform the action.
    Forbidden,
    /// The requested resource does not exist.
    NotFound,
    /// A backing service (usually the database) is unreachable.
    ServiceUnavailable,
    /// Anything else.
    InternalError,
}

/// Domain error payload.
///
/// ## Invariants
/// - `message` is non-empty once trimmed.
///
/// # Examples
/// ```
/// use institute::domain::{Error, ErrorCode};
///
/// let err = Error::not_found("No admission application found for this email");
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    code: ErrorCode,
    message: String,
    trace_id: Option<String>,
    details: Option<Value>,
}

impl Error {
    /// Create an error, capturing the trace identifier in scope.
    ///
    /// Blank messages are replaced with the code's default wording so the
    /// client always receives something readable.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            default_message(code).to_owned()
        } else {
            message
        };
        Self {
            code,
            message,
            trace_id: TraceId::current().map(|id| id.to_string()),
            details: None,
        }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Correlation identifier captured at construction time.
    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    /// Supplementary structured details.
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Override the trace identifier.
    pub fn with_trace_id(mut self, id: impl Into<String>) -> Self {
        self.trace_id = Some(id.into());
        self
    }

    /// Attach structured details.
    ///
    /// # Examples
    /// ```
    /// use institute::domain::Error;
    /// use serde_json::json;
    ///
    /// let err = Error::invalid_request("bad").with_details(json!({ "field": "email" }));
    /// assert!(err.details().is_some());
    /// ```
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Convenience constructor for [`ErrorCode::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Convenience constructor for [`ErrorCode::Duplicate`].
    pub fn duplicate(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Duplicate, message)
    }

    /// Convenience constructor for [`ErrorCode::Unauthorized`].
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// Convenience constructor for [`ErrorCode::AccountDisabled`].
    pub fn account_disabled(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AccountDisabled, message)
    }

    /// Convenience constructor for [`ErrorCode::Forbidden`].
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    /// Convenience constructor for [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Convenience constructor for [`ErrorCode::ServiceUnavailable`].
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    /// Convenience constructor for [`ErrorCode::InternalError`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

fn default_message(code: ErrorCode) -> &'static str {
    match code {
        ErrorCode::InvalidRequest => "Invalid request",
        ErrorCode::Duplicate => "Resource already exists",
        ErrorCode::Unauthorized => "Invalid credentials",
        ErrorCode::AccountDisabled => "Account disabled",
        ErrorCode::Forbidden => "Access denied",
        ErrorCode::NotFound => "Not found",
        ErrorCode::ServiceUnavailable => "Service unavailable",
        ErrorCode::InternalError => "Internal server error",
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(Error::invalid_request("bad"), ErrorCode::InvalidRequest)]
    #[case(Error::duplicate("taken"), ErrorCode::Duplicate)]
    #[case(Error::unauthorized("who"), ErrorCode::Unauthorized)]
    #[case(Error::account_disabled("off"), ErrorCode::AccountDisabled)]
    #[case(Error::forbidden("no"), ErrorCode::Forbidden)]
    #[case(Error::not_found("gone"), ErrorCode::NotFound)]
    #[case(Error::service_unavailable("down"), ErrorCode::ServiceUnavailable)]
    #[case(Error::internal("boom"), ErrorCode::InternalError)]
    fn constructors_set_code(#[case] error: Error, #[case] expected: ErrorCode) {
        assert_eq!(error.code(), expected);
    }

    #[rstest]
    fn blank_message_falls_back_to_default() {
        let error = Error::not_found("   ");
        assert_eq!(error.message(), "Not found");
    }

    #[rstest]
    fn details_are_attached() {
        let error = Error::invalid_request("bad").with_details(json!({ "field": "phone" }));
        assert_eq!(error.details(), Some(&json!({ "field": "phone" })));
    }

    #[tokio::test]
    async fn captures_trace_id_in_scope() {
        let trace_id: TraceId = "00000000-0000-0000-0000-000000000000"
            .parse()
            .expect("valid uuid");
        let error = TraceId::scope(trace_id, async { Error::internal("boom") }).await;
        assert_eq!(
            error.trace_id(),
            Some("00000000-0000-0000-0000-000000000000")
        );
    }

    #[rstest]
    fn trace_id_is_absent_out_of_scope() {
        assert!(Error::internal("boom").trace_id().is_none());
    }
}
