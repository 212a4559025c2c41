//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AdmissionAdministration, AdmissionIntake, AdmissionQuery, AuthService,
    StudentAdministration,
};

/// Dependency bundle for HTTP handlers.
///
/// Built once at startup and shared by every worker.
#[derive(Clone)]
pub struct HttpState {
    pub intake: Arc<dyn AdmissionIntake>,
    pub admissions: Arc<dyn AdmissionQuery>,
    pub admission_admin: Arc<dyn AdmissionAdministration>,
    pub auth: Arc<dyn AuthService>,
    pub students: Arc<dyn StudentAdministration>,
}
