//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Repository`, [`DocumentStore`], [`TokenIssuer`],
//! [`PasswordHasher`], [`DatabaseLiveness`]) are implemented by outbound
//! adapters. Driving ports ([`AdmissionIntake`], [`AdmissionQuery`],
//! [`AdmissionAdministration`], [`AuthService`], [`StudentAdministration`])
//! are implemented by domain services and called by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod account_repository;
mod admission_administration;
mod admission_intake;
mod admission_query;
mod admission_repository;
mod auth_service;
mod database_liveness;
mod document_store;
mod password_hasher;
mod student_administration;
mod student_provisioning;
mod token_issuer;

#[cfg(test)]
pub use account_repository::MockAccountRepository;
pub use account_repository::{AccountRepository, AccountRepositoryError};
#[cfg(test)]
pub use admission_administration::MockAdmissionAdministration;
pub use admission_administration::{
    AdmissionAdministration, DecisionAction, ProcessDecisionRequest, ProcessedAdmission,
};
#[cfg(test)]
pub use admission_intake::MockAdmissionIntake;
pub use admission_intake::{AdmissionIntake, AdmissionSubmission};
#[cfg(test)]
pub use admission_query::MockAdmissionQuery;
pub use admission_query::AdmissionQuery;
#[cfg(test)]
pub use admission_repository::MockAdmissionRepository;
pub use admission_repository::{AdmissionRepository, AdmissionRepositoryError};
#[cfg(test)]
pub use auth_service::MockAuthService;
pub use auth_service::AuthService;
#[cfg(test)]
pub use database_liveness::MockDatabaseLiveness;
pub use database_liveness::{DatabaseLiveness, LivenessFlag};
#[cfg(test)]
pub use document_store::MockDocumentStore;
pub use document_store::{
    ALLOWED_CONTENT_TYPES, DOCUMENT_FIELDS, DocumentStore, DocumentStoreError, DocumentUpload,
    FixtureDocumentStore, is_document_field,
};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{FixturePasswordHasher, PasswordHasher, PasswordHasherError};
#[cfg(test)]
pub use student_administration::MockStudentAdministration;
pub use student_administration::{CreatedStudent, NewStudentRequest, StudentAdministration};
#[cfg(test)]
pub use student_provisioning::MockStudentProvisioning;
pub use student_provisioning::{IssuedCredentials, ProvisionedStudent, StudentProvisioning};
#[cfg(test)]
pub use token_issuer::MockTokenIssuer;
pub use token_issuer::{TokenError, TokenIssuer};
