//! Driving port for admin management of student accounts.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, Page, PageRequest, PublicProfile};

/// Raw request to create a student account directly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct NewStudentRequest {
    pub email: Option<String>,
    /// Generated when absent and returned once in the response.
    pub password: Option<String>,
    pub name: Option<String>,
    pub mobile: Option<String>,
    pub blood_group: Option<String>,
    pub standard: Option<String>,
    pub date_of_birth: Option<String>,
    pub address: Option<String>,
}

/// A newly created student plus any generated password.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatedStudent {
    pub user: PublicProfile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_password: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StudentAdministration: Send + Sync {
    /// Paginated student listing, newest first.
    async fn list(
        &self,
        search: Option<String>,
        page: PageRequest,
    ) -> Result<Page<PublicProfile>, Error>;

    /// Fetch one student by `STU####` identifier.
    async fn get(&self, student_id: &str) -> Result<PublicProfile, Error>;

    /// Create a student account with the next free identifier.
    async fn create(&self, request: NewStudentRequest) -> Result<CreatedStudent, Error>;

    /// Flip the active flag.
    async fn toggle_active(&self, student_id: &str) -> Result<PublicProfile, Error>;
}
