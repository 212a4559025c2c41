//! Builders wiring repositories and adapters into the HTTP state.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    AccountRepository, AdmissionRepository, DocumentStore, PasswordHasher, TokenIssuer,
};
use crate::domain::{
    AccountAuthService, AccountStudentProvisioner, AdmissionAdminService, AdmissionIntakeService,
    AdmissionQueryService, StudentAdminService,
};
use crate::inbound::http::state::HttpState;

/// Adapters shared by every storage mode.
pub struct SharedAdapters<H, T, D> {
    pub hasher: Arc<H>,
    pub tokens: Arc<T>,
    pub documents: Arc<D>,
    pub clock: Arc<dyn Clock>,
    pub max_upload_bytes: usize,
}

/// Build the driving ports over one account store and one admission store.
pub fn build_http_state<A, R, H, T, D>(
    accounts: Arc<A>,
    admissions: Arc<R>,
    adapters: &SharedAdapters<H, T, D>,
) -> HttpState
where
    A: AccountRepository + 'static,
    R: AdmissionRepository + 'static,
    H: PasswordHasher + 'static,
    T: TokenIssuer + 'static,
    D: DocumentStore + 'static,
{
    let provisioning = Arc::new(AccountStudentProvisioner::new(
        accounts.clone(),
        adapters.hasher.clone(),
        adapters.clock.clone(),
    ));

    HttpState {
        intake: Arc::new(AdmissionIntakeService::new(
            admissions.clone(),
            adapters.documents.clone(),
            adapters.clock.clone(),
            adapters.max_upload_bytes,
        )),
        admissions: Arc::new(AdmissionQueryService::new(
            admissions.clone(),
            adapters.clock.clone(),
        )),
        admission_admin: Arc::new(AdmissionAdminService::new(
            admissions,
            provisioning,
            adapters.documents.clone(),
            adapters.clock.clone(),
        )),
        auth: Arc::new(AccountAuthService::new(
            accounts.clone(),
            adapters.hasher.clone(),
            adapters.tokens.clone(),
            adapters.clock.clone(),
        )),
        students: Arc::new(StudentAdminService::new(
            accounts,
            adapters.hasher.clone(),
            adapters.clock.clone(),
        )),
    }
}
