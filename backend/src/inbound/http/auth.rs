//! Authentication endpoints.
//!
//! ```text
//! POST /api/auth/admin/login   {"email":"admin@school.test","password":"secret"}
//! POST /api/auth/student/login {"studentId":"STU0001","password":"secret"}
//! GET  /api/auth/me
//! POST /api/auth/logout
//! PUT  /api/auth/change-password {"currentPassword":"old","newPassword":"new-secret"}
//! GET  /api/auth/stats
//! ```

use actix_web::{HttpResponse, get, post, put, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use utoipa::ToSchema;

use crate::domain::{
    AccountStats, AdminCredentials, EmailAddress, Error, LoginOutcome, LoginValidationError,
    PasswordChange, PublicProfile, StudentCredentials,
};

use super::ApiResult;
use super::authentication::{AdminAccount, CurrentAccount};
use super::envelope::{Envelope, ok, ok_message};
use super::error::ErrorEnvelope;
use super::state::HttpState;
use super::validation::{FieldErrors, FieldName, ValidationCode};

const EMAIL: FieldName = FieldName::new("email");
const PASSWORD: FieldName = FieldName::new("password");

/// Login request body for `POST /api/auth/admin/login`.
#[derive(Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct AdminLoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl AdminLoginRequest {
    /// Collect every field problem before touching the auth service.
    fn validate(&self) -> Result<AdminCredentials, Error> {
        let mut errors = FieldErrors::default();
        let email = self.email.as_deref().unwrap_or_default();
        if email.trim().is_empty() {
            errors.push(EMAIL, ValidationCode::MissingField, "Email is required");
        } else if EmailAddress::parse(email).is_err() {
            errors.push(
                EMAIL,
                ValidationCode::InvalidEmail,
                "Please provide a valid email",
            );
        }
        let password = self.password.as_deref().unwrap_or_default();
        if password.is_empty() {
            errors.push(PASSWORD, ValidationCode::MissingField, "Password is required");
        }
        errors.finish()?;
        AdminCredentials::try_from_parts(email, password).map_err(map_login_validation_error)
    }
}

/// Login request body for `POST /api/auth/student/login`.
#[derive(Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct StudentLoginRequest {
    #[schema(example = "STU0001")]
    pub student_id: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl TryFrom<StudentLoginRequest> for StudentCredentials {
    type Error = LoginValidationError;

    fn try_from(value: StudentLoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(
            value.student_id.as_deref(),
            value.email.as_deref(),
            value.password.as_deref().unwrap_or_default(),
        )
    }
}

/// Body for `PUT /api/auth/change-password`.
#[derive(Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ChangePasswordRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

impl TryFrom<ChangePasswordRequest> for PasswordChange {
    type Error = LoginValidationError;

    fn try_from(value: ChangePasswordRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(
            value.current_password.as_deref(),
            value.new_password.as_deref(),
        )
    }
}

/// Payload of `GET /api/auth/me`.
#[derive(Debug, Serialize, ToSchema)]
pub struct CurrentUser {
    pub user: PublicProfile,
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    let (field, code) = match &err {
        LoginValidationError::EmptyEmail => ("email", "empty_email"),
        LoginValidationError::EmptyPassword => ("password", "empty_password"),
        LoginValidationError::MissingStudentCredentials => {
            ("credentials", "missing_credentials")
        }
        LoginValidationError::MissingPasswords => ("password", "missing_passwords"),
        LoginValidationError::NewPasswordTooShort { .. } => ("newPassword", "password_too_short"),
    };
    Error::invalid_request(err.to_string()).with_details(json!({ "field": field, "code": code }))
}

/// Administrator login.
#[utoipa::path(
    post,
    path = "/api/auth/admin/login",
    request_body = AdminLoginRequest,
    responses(
        (status = 200, description = "Token and profile", body = Envelope<LoginOutcome>),
        (status = 400, description = "Field validation failed; see details.errors", body = ErrorEnvelope),
        (status = 401, description = "Invalid credentials", body = ErrorEnvelope),
        (status = 403, description = "Account deactivated", body = ErrorEnvelope)
    ),
    tags = ["auth"],
    operation_id = "adminLogin",
    security([])
)]
#[post("/admin/login")]
pub async fn admin_login(
    state: web::Data<HttpState>,
    payload: web::Json<AdminLoginRequest>,
) -> ApiResult<HttpResponse> {
    let credentials = payload.validate()?;
    let outcome = state.auth.admin_login(&credentials).await?;
    Ok(ok("Admin login successful", outcome))
}

/// Student login by student ID or email.
#[utoipa::path(
    post,
    path = "/api/auth/student/login",
    request_body = StudentLoginRequest,
    responses(
        (status = 200, description = "Token and profile", body = Envelope<LoginOutcome>),
        (status = 400, description = "Identifier or password missing", body = ErrorEnvelope),
        (status = 401, description = "Invalid credentials", body = ErrorEnvelope),
        (status = 403, description = "Account deactivated", body = ErrorEnvelope)
    ),
    tags = ["auth"],
    operation_id = "studentLogin",
    security([])
)]
#[post("/student/login")]
pub async fn student_login(
    state: web::Data<HttpState>,
    payload: web::Json<StudentLoginRequest>,
) -> ApiResult<HttpResponse> {
    let credentials =
        StudentCredentials::try_from(payload.into_inner()).map_err(map_login_validation_error)?;
    let outcome = state.auth.student_login(&credentials).await?;
    Ok(ok("Student login successful", outcome))
}

/// Profile of the bearer.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current profile", body = Envelope<CurrentUser>),
        (status = 401, description = "Missing or invalid token", body = ErrorEnvelope),
        (status = 403, description = "Account deactivated", body = ErrorEnvelope)
    ),
    tags = ["auth"],
    operation_id = "currentUser"
)]
#[get("/me")]
pub async fn current_user(current: CurrentAccount) -> ApiResult<HttpResponse> {
    let user = PublicProfile::from(current.account());
    Ok(ok("User data retrieved successfully", CurrentUser { user }))
}

/// Acknowledge a logout; tokens are discarded client-side.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Logged out"),
        (status = 401, description = "Missing or invalid token", body = ErrorEnvelope)
    ),
    tags = ["auth"],
    operation_id = "logout"
)]
#[post("/logout")]
pub async fn logout(current: CurrentAccount) -> ApiResult<HttpResponse> {
    info!(account_id = %current.account().id, "logout acknowledged");
    Ok(ok_message("Logged out successfully"))
}

/// Replace the bearer's password after checking the current one.
#[utoipa::path(
    put,
    path = "/api/auth/change-password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed"),
        (status = 400, description = "Passwords missing or too short", body = ErrorEnvelope),
        (status = 401, description = "Current password is incorrect", body = ErrorEnvelope)
    ),
    tags = ["auth"],
    operation_id = "changePassword"
)]
#[put("/change-password")]
pub async fn change_password(
    state: web::Data<HttpState>,
    current: CurrentAccount,
    payload: web::Json<ChangePasswordRequest>,
) -> ApiResult<HttpResponse> {
    let change =
        PasswordChange::try_from(payload.into_inner()).map_err(map_login_validation_error)?;
    state
        .auth
        .change_password(&current.account().id, &change)
        .await?;
    Ok(ok_message("Password changed successfully"))
}

/// Student population counters; admins only.
#[utoipa::path(
    get,
    path = "/api/auth/stats",
    responses(
        (status = 200, description = "Counters", body = Envelope<AccountStats>),
        (status = 401, description = "Missing or invalid token", body = ErrorEnvelope),
        (status = 403, description = "Access denied", body = ErrorEnvelope)
    ),
    tags = ["auth"],
    operation_id = "authStats"
)]
#[get("/stats")]
pub async fn auth_stats(
    state: web::Data<HttpState>,
    _admin: AdminAccount,
) -> ApiResult<HttpResponse> {
    let stats = state.auth.stats().await?;
    Ok(ok("Authentication stats retrieved successfully", stats))
}

/// Register the auth routes under `/api/auth`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/auth")
            .service(admin_login)
            .service(student_login)
            .service(current_user)
            .service(logout)
            .service(change_password)
            .service(auth_stats),
    );
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
