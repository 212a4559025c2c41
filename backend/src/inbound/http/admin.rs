//! Administrator endpoints for reviewing admissions and managing students.
//!
//! Every handler takes [`AdminAccount`], so callers without an `admin`
//! bearer token receive 401 or 403 before any port is touched.
//!
//! ```text
//! GET    /api/admin/admissions?page=1&limit=10&status=pending&search=ada
//! GET    /api/admin/admissions/{id}
//! DELETE /api/admin/admissions/{id}
//! POST   /api/admin/admissions/process {"admissionId":"…","action":"accept"}
//! GET    /api/admin/students?page=1&limit=10&search=ada
//! POST   /api/admin/students
//! GET    /api/admin/students/{studentId}
//! PATCH  /api/admin/students/{studentId}/toggle-status
//! GET    /api/admin/dashboard/stats
//! ```

use std::str::FromStr;

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{
    CreatedStudent, DecisionAction, NewStudentRequest, ProcessDecisionRequest,
    ProcessedAdmission,
};
use crate::domain::{
    AccountStats, Admission, AdmissionFilter, AdmissionId, AdmissionStats, AdmissionStatus,
    Error, PageRequest, Pagination, PublicProfile,
};

use super::ApiResult;
use super::authentication::AdminAccount;
use super::envelope::{Envelope, created, ok, ok_message};
use super::error::ErrorEnvelope;
use super::state::HttpState;
use super::validation::{FieldName, parse_uuid};

const ADMISSION_ID: FieldName = FieldName::new("admissionId");

/// Query string for the admission listing.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(default)]
#[into_params(parameter_in = Query)]
pub struct AdmissionListQuery {
    /// 1-based page number.
    pub page: Option<u32>,
    /// Page size, capped server-side.
    pub limit: Option<u32>,
    /// `pending`, `accepted` (or `approved`), `rejected`, or `all`.
    pub status: Option<String>,
    /// Matches names, email and phone.
    pub search: Option<String>,
}

impl AdmissionListQuery {
    fn filter(&self) -> Result<AdmissionFilter, Error> {
        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") | Some("all") => None,
            Some(raw) => Some(
                AdmissionStatus::from_str(raw).map_err(|err| Error::invalid_request(err.to_string()))?,
            ),
        };
        Ok(AdmissionFilter {
            status,
            search: non_blank(self.search.as_deref()),
        })
    }
}

/// Query string for the student listing.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(default)]
#[into_params(parameter_in = Query)]
pub struct StudentListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    /// Matches name, email and student ID.
    pub search: Option<String>,
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

/// Page of applications.
#[derive(Debug, Serialize, ToSchema)]
pub struct AdmissionList {
    pub admissions: Vec<Admission>,
    pub pagination: Pagination,
}

/// Single application.
#[derive(Debug, Serialize, ToSchema)]
pub struct AdmissionDetail {
    pub admission: Admission,
}

/// Page of student profiles.
#[derive(Debug, Serialize, ToSchema)]
pub struct StudentList {
    pub students: Vec<PublicProfile>,
    pub pagination: Pagination,
}

/// Single student profile.
#[derive(Debug, Serialize, ToSchema)]
pub struct StudentDetail {
    pub student: PublicProfile,
}

/// Combined dashboard counters.
#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardStats {
    pub admissions: AdmissionStats,
    pub students: AccountStats,
}

/// Body for `POST /api/admin/admissions/process`.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ProcessAdmissionRequest {
    pub admission_id: Option<String>,
    pub action: Option<DecisionAction>,
    pub rejection_reason: Option<String>,
}

impl TryFrom<ProcessAdmissionRequest> for ProcessDecisionRequest {
    type Error = Error;

    fn try_from(value: ProcessAdmissionRequest) -> Result<Self, Self::Error> {
        let (Some(raw_id), Some(action)) = (non_blank(value.admission_id.as_deref()), value.action)
        else {
            return Err(Error::invalid_request("Admission ID and action are required"));
        };
        let admission_id = AdmissionId::from_uuid(parse_uuid(&raw_id, ADMISSION_ID)?);
        Ok(Self {
            admission_id,
            action,
            rejection_reason: value.rejection_reason,
        })
    }
}

fn admission_id(raw: &str) -> Result<AdmissionId, Error> {
    Ok(AdmissionId::from_uuid(parse_uuid(raw, FieldName::new("id"))?))
}

/// List applications, newest first.
#[utoipa::path(
    get,
    path = "/api/admin/admissions",
    params(AdmissionListQuery),
    responses(
        (status = 200, description = "Page of applications", body = Envelope<AdmissionList>),
        (status = 400, description = "Unknown status filter", body = ErrorEnvelope),
        (status = 401, description = "Missing or invalid token", body = ErrorEnvelope),
        (status = 403, description = "Not an administrator", body = ErrorEnvelope)
    ),
    tags = ["admin"],
    operation_id = "listAdmissions"
)]
#[get("/admissions")]
pub async fn list_admissions(
    state: web::Data<HttpState>,
    _admin: AdminAccount,
    query: web::Query<AdmissionListQuery>,
) -> ApiResult<HttpResponse> {
    let filter = query.filter()?;
    let page = state
        .admission_admin
        .list(filter, PageRequest::new(query.page, query.limit))
        .await?;
    let pagination = page.pagination();
    Ok(ok(
        "Admissions retrieved successfully",
        AdmissionList {
            admissions: page.items,
            pagination,
        },
    ))
}

/// Decide a pending application.
///
/// Accepting provisions a student account and returns its initial
/// credentials once; rejecting records the optional reason.
#[utoipa::path(
    post,
    path = "/api/admin/admissions/process",
    request_body = ProcessAdmissionRequest,
    responses(
        (status = 200, description = "Decision recorded", body = Envelope<ProcessedAdmission>),
        (status = 400, description = "Invalid request or already processed", body = ErrorEnvelope),
        (status = 404, description = "Application not found", body = ErrorEnvelope)
    ),
    tags = ["admin"],
    operation_id = "processAdmission"
)]
#[post("/admissions/process")]
pub async fn process_admission(
    state: web::Data<HttpState>,
    admin: AdminAccount,
    payload: web::Json<ProcessAdmissionRequest>,
) -> ApiResult<HttpResponse> {
    let request = ProcessDecisionRequest::try_from(payload.into_inner())?;
    let action = request.action;
    let processed = state.admission_admin.process(request).await?;
    info!(
        admin_id = %admin.account().id,
        admission_id = %processed.admission.id,
        ?action,
        "admission processed"
    );
    let message = match action {
        DecisionAction::Accept => "Application accepted successfully",
        DecisionAction::Reject => "Application rejected successfully",
    };
    Ok(ok(message, processed))
}

/// Fetch one application.
#[utoipa::path(
    get,
    path = "/api/admin/admissions/{id}",
    params(("id" = String, Path, description = "Application UUID")),
    responses(
        (status = 200, description = "Application", body = Envelope<AdmissionDetail>),
        (status = 404, description = "Application not found", body = ErrorEnvelope)
    ),
    tags = ["admin"],
    operation_id = "getAdmission"
)]
#[get("/admissions/{id}")]
pub async fn get_admission(
    state: web::Data<HttpState>,
    _admin: AdminAccount,
    id: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let admission = state.admission_admin.get(admission_id(&id)?).await?;
    Ok(ok(
        "Admission retrieved successfully",
        AdmissionDetail { admission },
    ))
}

/// Delete an application and its stored documents.
#[utoipa::path(
    delete,
    path = "/api/admin/admissions/{id}",
    params(("id" = String, Path, description = "Application UUID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Application not found", body = ErrorEnvelope)
    ),
    tags = ["admin"],
    operation_id = "deleteAdmission"
)]
#[delete("/admissions/{id}")]
pub async fn delete_admission(
    state: web::Data<HttpState>,
    admin: AdminAccount,
    id: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = admission_id(&id)?;
    state.admission_admin.delete(id).await?;
    info!(admin_id = %admin.account().id, admission_id = %id, "admission deleted");
    Ok(ok_message("Admission deleted successfully"))
}

/// List students, newest first.
#[utoipa::path(
    get,
    path = "/api/admin/students",
    params(StudentListQuery),
    responses(
        (status = 200, description = "Page of students", body = Envelope<StudentList>),
        (status = 403, description = "Not an administrator", body = ErrorEnvelope)
    ),
    tags = ["admin"],
    operation_id = "listStudents"
)]
#[get("/students")]
pub async fn list_students(
    state: web::Data<HttpState>,
    _admin: AdminAccount,
    query: web::Query<StudentListQuery>,
) -> ApiResult<HttpResponse> {
    let page = state
        .students
        .list(
            non_blank(query.search.as_deref()),
            PageRequest::new(query.page, query.limit),
        )
        .await?;
    let pagination = page.pagination();
    Ok(ok(
        "Students retrieved successfully",
        StudentList {
            students: page.items,
            pagination,
        },
    ))
}

/// Create a student account directly.
///
/// A password is generated and returned once when none is supplied.
#[utoipa::path(
    post,
    path = "/api/admin/students",
    request_body = NewStudentRequest,
    responses(
        (status = 201, description = "Student created", body = Envelope<CreatedStudent>),
        (status = 400, description = "Missing or invalid fields, or duplicate email", body = ErrorEnvelope)
    ),
    tags = ["admin"],
    operation_id = "createStudent"
)]
#[post("/students")]
pub async fn create_student(
    state: web::Data<HttpState>,
    admin: AdminAccount,
    payload: web::Json<NewStudentRequest>,
) -> ApiResult<HttpResponse> {
    let created_student = state.students.create(payload.into_inner()).await?;
    info!(
        admin_id = %admin.account().id,
        student_id = ?created_student.user.student_id,
        "student created"
    );
    Ok(created("Student created successfully", created_student))
}

/// Fetch one student by `STU####` identifier.
#[utoipa::path(
    get,
    path = "/api/admin/students/{studentId}",
    params(("studentId" = String, Path, description = "Student identifier, e.g. STU0001")),
    responses(
        (status = 200, description = "Student", body = Envelope<StudentDetail>),
        (status = 404, description = "Student not found", body = ErrorEnvelope)
    ),
    tags = ["admin"],
    operation_id = "getStudent"
)]
#[get("/students/{student_id}")]
pub async fn get_student(
    state: web::Data<HttpState>,
    _admin: AdminAccount,
    student_id: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let student = state.students.get(&student_id).await?;
    Ok(ok(
        "Student retrieved successfully",
        StudentDetail { student },
    ))
}

/// Flip a student's active flag.
#[utoipa::path(
    patch,
    path = "/api/admin/students/{studentId}/toggle-status",
    params(("studentId" = String, Path, description = "Student identifier, e.g. STU0001")),
    responses(
        (status = 200, description = "Updated student", body = Envelope<StudentDetail>),
        (status = 404, description = "Student not found", body = ErrorEnvelope)
    ),
    tags = ["admin"],
    operation_id = "toggleStudentStatus"
)]
#[patch("/students/{student_id}/toggle-status")]
pub async fn toggle_student_status(
    state: web::Data<HttpState>,
    admin: AdminAccount,
    student_id: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let student = state.students.toggle_active(&student_id).await?;
    info!(
        admin_id = %admin.account().id,
        student_id = %student_id,
        active = student.is_active,
        "student status toggled"
    );
    let message = if student.is_active {
        "Student activated successfully"
    } else {
        "Student deactivated successfully"
    };
    Ok(ok(message, StudentDetail { student }))
}

/// Admission and student counters for the dashboard.
#[utoipa::path(
    get,
    path = "/api/admin/dashboard/stats",
    responses(
        (status = 200, description = "Counters", body = Envelope<DashboardStats>),
        (status = 403, description = "Not an administrator", body = ErrorEnvelope)
    ),
    tags = ["admin"],
    operation_id = "dashboardStats"
)]
#[get("/dashboard/stats")]
pub async fn dashboard_stats(
    state: web::Data<HttpState>,
    _admin: AdminAccount,
) -> ApiResult<HttpResponse> {
    let (admissions, students) =
        futures_util::future::try_join(state.admissions.stats(), state.auth.stats()).await?;
    Ok(ok(
        "Dashboard statistics retrieved successfully",
        DashboardStats {
            admissions,
            students,
        },
    ))
}

/// Register the admin routes under `/api/admin`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/admin")
            .service(list_admissions)
            .service(process_admission)
            .service(get_admission)
            .service(delete_admission)
            .service(list_students)
            .service(create_student)
            .service(get_student)
            .service(toggle_student_status)
            .service(dashboard_stats),
    );
}

#[cfg(test)]
#[path = "admin_tests.rs"]
mod tests;
