//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::web;

use crate::domain::ports::{
    MockAdmissionAdministration, MockAdmissionIntake, MockAdmissionQuery, MockAuthService,
    MockStudentAdministration,
};
use crate::domain::{Account, Error};

use super::state::HttpState;

/// Bearer token accepted by [`MockPorts::authenticating`].
pub const TEST_TOKEN: &str = "test-token";

/// Mock driving ports; configure expectations, then call [`Self::into_state`].
#[derive(Default)]
pub struct MockPorts {
    pub intake: MockAdmissionIntake,
    pub admissions: MockAdmissionQuery,
    pub admission_admin: MockAdmissionAdministration,
    pub auth: MockAuthService,
    pub students: MockStudentAdministration,
}

impl MockPorts {
    /// Ports whose auth mock resolves [`TEST_TOKEN`] to `account` and rejects
    /// anything else.
    pub fn authenticating(account: Account) -> Self {
        let mut ports = Self::default();
        ports
            .auth
            .expect_authenticate_token()
            .returning(move |token| {
                if token == TEST_TOKEN {
                    Ok(account.clone())
                } else {
                    Err(Error::unauthorized("Invalid token"))
                }
            });
        ports
    }

    /// Freeze the mocks into shared handler state.
    pub fn into_state(self) -> web::Data<HttpState> {
        web::Data::new(HttpState {
            intake: Arc::new(self.intake),
            admissions: Arc::new(self.admissions),
            admission_admin: Arc::new(self.admission_admin),
            auth: Arc::new(self.auth),
            students: Arc::new(self.students),
        })
    }
}

/// `Authorization` header carrying [`TEST_TOKEN`].
pub fn bearer() -> (&'static str, String) {
    ("Authorization", format!("Bearer {TEST_TOKEN}"))
}
