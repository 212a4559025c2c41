//! Port turning an accepted admission into a student account.

use std::fmt;

use async_trait::async_trait;
use serde::Serialize;
use utoipa::ToSchema;
use zeroize::Zeroizing;

use crate::domain::{AccountId, Admission, Error, StudentId};

/// Credentials of a freshly provisioned student.
///
/// The initial password is only ever available here; it is not stored in
/// recoverable form.
#[derive(Clone, PartialEq, Eq)]
pub struct ProvisionedStudent {
    pub account_id: AccountId,
    pub student_id: StudentId,
    pub email: String,
    pub initial_password: Zeroizing<String>,
}

impl fmt::Debug for ProvisionedStudent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProvisionedStudent")
            .field("account_id", &self.account_id)
            .field("student_id", &self.student_id)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Serialisable view handed back to the admin who accepted the application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssuedCredentials {
    #[schema(example = "STU0001")]
    pub student_id: String,
    pub email: String,
    pub initial_password: String,
}

impl From<&ProvisionedStudent> for IssuedCredentials {
    fn from(student: &ProvisionedStudent) -> Self {
        Self {
            student_id: student.student_id.to_string(),
            email: student.email.clone(),
            initial_password: student.initial_password.as_str().to_owned(),
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StudentProvisioning: Send + Sync {
    /// Create a student account from the applicant's details.
    ///
    /// Fails with [`crate::domain::ErrorCode::InvalidRequest`] when the
    /// application lacks data a student account requires.
    async fn provision(&self, admission: &Admission) -> Result<ProvisionedStudent, Error>;
}
