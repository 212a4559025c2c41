//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API. It registers:
//!
//! - **Paths**: every handler of the inbound HTTP layer (admission, auth,
//!   admin, health)
//! - **Schemas**: the response envelopes and the domain payloads they carry
//! - **Security**: bearer token scheme issued by the login endpoints
//!
//! The generated specification is served by Swagger UI in debug builds.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::ports::{
    CreatedStudent, DecisionAction, IssuedCredentials, NewStudentRequest, ProcessedAdmission,
};
use crate::domain::{
    AccountStats, Admission, AdmissionStats, AdmissionStatus, AdmissionStatusView,
    DocumentDescriptor, ErrorCode, LoginOutcome, Pagination, PublicProfile, Role,
    SubmissionReceipt,
};
use crate::inbound::http::admin::{
    AdmissionDetail, AdmissionList, DashboardStats, ProcessAdmissionRequest, StudentDetail,
    StudentList,
};
use crate::inbound::http::admissions::ValidateEmailRequest;
use crate::inbound::http::auth::{
    AdminLoginRequest, ChangePasswordRequest, CurrentUser, StudentLoginRequest,
};
use crate::inbound::http::error::ErrorEnvelope;
use crate::inbound::http::health::{DatabaseStatus, ServerHealth};

/// Name of the bearer security scheme referenced by protected paths.
pub const BEARER_SCHEME: &str = "BearerToken";

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            BEARER_SCHEME,
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .description(Some(
                        "Signed token returned by the admin and student login endpoints.",
                    ))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Institute backend API",
        description = "Admission intake, account authentication and administration."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerToken" = [])),
    paths(
        crate::inbound::http::admissions::submit_admission,
        crate::inbound::http::admissions::admission_status,
        crate::inbound::http::admissions::admission_stats,
        crate::inbound::http::admissions::validate_email,
        crate::inbound::http::auth::admin_login,
        crate::inbound::http::auth::student_login,
        crate::inbound::http::auth::current_user,
        crate::inbound::http::auth::logout,
        crate::inbound::http::auth::change_password,
        crate::inbound::http::auth::auth_stats,
        crate::inbound::http::admin::list_admissions,
        crate::inbound::http::admin::process_admission,
        crate::inbound::http::admin::get_admission,
        crate::inbound::http::admin::delete_admission,
        crate::inbound::http::admin::list_students,
        crate::inbound::http::admin::create_student,
        crate::inbound::http::admin::get_student,
        crate::inbound::http::admin::toggle_student_status,
        crate::inbound::http::admin::dashboard_stats,
        crate::inbound::http::health::api_health,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorEnvelope,
        ErrorCode,
        PublicProfile,
        Role,
        LoginOutcome,
        AccountStats,
        Admission,
        AdmissionStatus,
        AdmissionStatusView,
        AdmissionStats,
        DocumentDescriptor,
        SubmissionReceipt,
        Pagination,
        DecisionAction,
        ProcessedAdmission,
        IssuedCredentials,
        NewStudentRequest,
        CreatedStudent,
        ValidateEmailRequest,
        AdminLoginRequest,
        StudentLoginRequest,
        ChangePasswordRequest,
        CurrentUser,
        ProcessAdmissionRequest,
        AdmissionList,
        AdmissionDetail,
        StudentList,
        StudentDetail,
        DashboardStats,
        ServerHealth,
        DatabaseStatus,
    )),
    tags(
        (name = "admission", description = "Public admission application intake"),
        (name = "auth", description = "Login, profile and password management"),
        (name = "admin", description = "Administrator review and student management"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
