//! Domain primitives, ports and services.
//!
//! Purpose: define strongly typed entities for admissions and accounts, the
//! ports adapters implement, and the services inbound adapters drive. Keep
//! types transport agnostic and document invariants and serialisation
//! contracts (serde) in each type's Rustdoc.
//!
//! Public surface:
//! - [`Error`] / [`ErrorCode`]: transport-agnostic failure payload.
//! - [`TraceId`]: per-request correlation identifier.
//! - Admission types ([`AdmissionForm`], [`NewAdmission`], [`Admission`],
//!   [`AdmissionStatus`], [`AdmissionStats`]).
//! - Account types ([`Account`], [`EmailAddress`], [`StudentId`],
//!   [`PublicProfile`]).
//! - Services implementing the driving ports in [`ports`].

pub mod account;
mod account_auth_service;
pub mod admission;
mod admission_admin_service;
mod admission_intake_service;
mod admission_query_service;
pub mod auth;
pub mod error;
pub mod pagination;
pub mod ports;
mod sanitize;
mod service_support;
mod student_admin_service;
mod student_provisioning_service;
mod trace_id;

pub use self::account::{
    Account, AccountId, AccountStats, AccountValidationError, BloodGroup, EmailAddress,
    MobileNumber, PASSWORD_MIN_LENGTH, PasswordHash, PublicProfile, Role, STUDENT_NAME_MAX,
    StudentId, StudentProfile, normalise_email, validate_password_strength,
};
pub use self::account_auth_service::{
    ACCOUNT_DEACTIVATED, AccountAuthService, INVALID_CREDENTIALS, RECENT_LOGIN_DAYS,
};
pub use self::admission::{
    AcademicHistory, AdditionalInfo, Admission, AdmissionDecision, AdmissionFilter,
    AdmissionForm, AdmissionId, AdmissionStats, AdmissionStatus, AdmissionStatusView,
    AdmissionValidationError, Applicant, DocumentDescriptor, Guardians,
    MISSING_REQUIRED_FIELDS, NewAdmission, RECENT_WINDOW_DAYS, SubmissionReceipt,
    looks_like_email, sanitize_note,
};
pub use self::admission_admin_service::{
    ALREADY_PROCESSED, APPLICATION_NOT_FOUND, AdmissionAdminService,
};
pub use self::admission_intake_service::{AdmissionIntakeService, UPLOAD_FAILED};
pub use self::admission_query_service::{ADMISSION_NOT_FOUND, AdmissionQueryService};
pub use self::auth::{
    AdminCredentials, LoginOutcome, LoginValidationError, PasswordChange, Principal,
    SessionToken, StudentCredentials, StudentIdentifier, TokenClaims,
};
pub use self::error::{Error, ErrorCode};
pub use self::pagination::{
    DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, Page, PageRequest, Pagination, paginate,
};
pub use self::sanitize::{sanitize_optional, sanitize_text};
pub use self::service_support::{DUPLICATE_ACCOUNT, DUPLICATE_ADMISSION};
pub use self::student_admin_service::{STUDENT_NOT_FOUND, StudentAdminService};
pub use self::student_provisioning_service::{
    AccountStudentProvisioner, profile_from_admission,
};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};

/// Convenient result alias for handlers and services.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use institute::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("Access denied"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
