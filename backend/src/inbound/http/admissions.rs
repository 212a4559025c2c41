//! Public admission endpoints.
//!
//! ```text
//! POST /api/admission/submit          multipart or JSON form
//! GET  /api/admission/status/{email}
//! GET  /api/admission/stats
//! POST /api/admission/validate        {"email":"ada@school.test"}
//! ```

use actix_web::{HttpRequest, HttpResponse, get, post, web};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::domain::{AdmissionForm, AdmissionStats, AdmissionStatusView, SubmissionReceipt};

use super::ApiResult;
use super::admission_form::read_submission;
use super::envelope::{Envelope, created, ok, ok_message};
use super::error::ErrorEnvelope;
use super::state::HttpState;

/// Body for `POST /api/admission/validate`.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct ValidateEmailRequest {
    pub email: Option<String>,
}

/// Submit an admission application.
///
/// Document parts are accepted under `photo`, `marksheet`,
/// `birthCertificate`, `transferCertificate`, `idProof` and `documents`.
#[utoipa::path(
    post,
    path = "/api/admission/submit",
    request_body(content = AdmissionForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Application stored", body = Envelope<SubmissionReceipt>),
        (status = 400, description = "Missing fields, duplicate email or rejected upload", body = ErrorEnvelope),
        (status = 500, description = "Internal server error", body = ErrorEnvelope)
    ),
    tags = ["admission"],
    operation_id = "submitAdmission",
    security([])
)]
#[post("/submit")]
pub async fn submit_admission(
    state: web::Data<HttpState>,
    req: HttpRequest,
    payload: web::Payload,
) -> ApiResult<HttpResponse> {
    let submission = read_submission(&req, payload).await?;
    let receipt = state.intake.submit(submission).await?;
    Ok(created(
        "Admission application submitted successfully",
        receipt,
    ))
}

/// Look up an application's status by applicant email.
///
/// `student_id` is included only once the application has been accepted.
#[utoipa::path(
    get,
    path = "/api/admission/status/{email}",
    params(("email" = String, Path, description = "Applicant email address")),
    responses(
        (status = 200, description = "Status projection", body = Envelope<AdmissionStatusView>),
        (status = 400, description = "Malformed email", body = ErrorEnvelope),
        (status = 404, description = "No application for this email", body = ErrorEnvelope)
    ),
    tags = ["admission"],
    operation_id = "admissionStatus",
    security([])
)]
#[get("/status/{email}")]
pub async fn admission_status(
    state: web::Data<HttpState>,
    email: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let view = state.admissions.status_by_email(&email).await?;
    Ok(ok("Admission status retrieved successfully", view))
}

/// Aggregate counts by status plus submissions in the last 30 days.
#[utoipa::path(
    get,
    path = "/api/admission/stats",
    responses(
        (status = 200, description = "Counts", body = Envelope<AdmissionStats>),
        (status = 503, description = "Storage unavailable", body = ErrorEnvelope)
    ),
    tags = ["admission"],
    operation_id = "admissionStats",
    security([])
)]
#[get("/stats")]
pub async fn admission_stats(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    let stats = state.admissions.stats().await?;
    Ok(ok("Admission statistics retrieved successfully", stats))
}

/// Check whether an email can still be used for a new application.
#[utoipa::path(
    post,
    path = "/api/admission/validate",
    request_body = ValidateEmailRequest,
    responses(
        (status = 200, description = "Email is available"),
        (status = 400, description = "Missing, malformed or already used", body = ErrorEnvelope)
    ),
    tags = ["admission"],
    operation_id = "validateAdmissionEmail",
    security([])
)]
#[post("/validate")]
pub async fn validate_email(
    state: web::Data<HttpState>,
    payload: web::Json<ValidateEmailRequest>,
) -> ApiResult<HttpResponse> {
    let email = payload.into_inner().email.unwrap_or_default();
    state.intake.check_email_available(&email).await?;
    Ok(ok_message("Email is available for admission"))
}

/// Register the admission routes under `/api/admission`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/admission")
            .service(submit_admission)
            .service(admission_status)
            .service(admission_stats)
            .service(validate_email),
    );
}
