//! Handler tests for the administrator endpoints.

use super::*;
use crate::domain::ports::IssuedCredentials;
use crate::domain::{Account, NewAdmission, Page};
use crate::inbound::http::test_utils::{MockPorts, bearer};
use crate::test_support::{admin_account, complete_form, fixture_timestamp, student_account};
use actix_web::http::StatusCode;
use actix_web::{App, test};
use mockall::predicate::eq;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

#[fixture]
fn admin() -> Account {
    admin_account("admin@school.test", "secret")
}

fn pending_admission(email: &str) -> Admission {
    let details = NewAdmission::from_form(&complete_form(email)).expect("valid form");
    Admission::submit(details, fixture_timestamp())
}

async fn send(ports: MockPorts, request: test::TestRequest) -> (StatusCode, Value) {
    let app = test::init_service(
        App::new()
            .app_data(ports.into_state())
            .configure(configure),
    )
    .await;
    let res = test::call_service(&app, request.insert_header(bearer()).to_request()).await;
    let status = res.status();
    let body: Value = test::read_body_json(res).await;
    (status, body)
}

#[rstest]
#[case(test::TestRequest::get().uri("/api/admin/admissions"))]
#[case(test::TestRequest::get().uri("/api/admin/students"))]
#[case(test::TestRequest::get().uri("/api/admin/dashboard/stats"))]
#[case(test::TestRequest::patch().uri("/api/admin/students/STU0001/toggle-status"))]
#[actix_web::test]
async fn students_cannot_reach_admin_routes(#[case] request: test::TestRequest) {
    let ports = MockPorts::authenticating(student_account(1, "ada@school.test", "secret"));
    let (status, body) = send(ports, request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Access denied");
}

#[rstest]
#[actix_web::test]
async fn admission_listing_applies_filter_and_pagination(admin: Account) {
    let mut ports = MockPorts::authenticating(admin);
    let admission = pending_admission("ada@school.test");
    ports
        .admission_admin
        .expect_list()
        .withf(|filter: &AdmissionFilter, page: &PageRequest| {
            filter.status == Some(AdmissionStatus::Accepted)
                && filter.search.as_deref() == Some("ada")
                && page.page() == 2
                && page.limit() == 1
        })
        .return_once(move |_, request| {
            Ok(Page {
                items: vec![admission],
                total_items: 3,
                request,
            })
        });

    let request = test::TestRequest::get()
        .uri("/api/admin/admissions?page=2&limit=1&status=approved&search=%20ada%20");
    let (status, body) = send(ports, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["admissions"].as_array().map(Vec::len), Some(1));
    assert_eq!(
        body["data"]["pagination"],
        json!({"currentPage": 2, "totalPages": 3, "totalItems": 3, "limit": 1})
    );
}

#[rstest]
#[actix_web::test]
async fn unknown_status_filter_is_rejected(admin: Account) {
    let ports = MockPorts::authenticating(admin);
    let request = test::TestRequest::get().uri("/api/admin/admissions?status=maybe");
    let (status, body) = send(ports, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_request");
}

#[rstest]
#[actix_web::test]
async fn accepting_returns_issued_credentials(admin: Account) {
    let mut ports = MockPorts::authenticating(admin);
    let mut admission = pending_admission("ada@school.test");
    let id = admission.id;
    admission.status = AdmissionStatus::Accepted;
    ports
        .admission_admin
        .expect_process()
        .with(eq(ProcessDecisionRequest {
            admission_id: id,
            action: DecisionAction::Accept,
            rejection_reason: None,
        }))
        .return_once(move |_| {
            Ok(ProcessedAdmission {
                admission,
                student: Some(IssuedCredentials {
                    student_id: "STU0001".to_owned(),
                    email: "ada@school.test".to_owned(),
                    initial_password: "Generated1".to_owned(),
                }),
            })
        });

    let request = test::TestRequest::post()
        .uri("/api/admin/admissions/process")
        .set_json(json!({"admissionId": id.to_string(), "action": "approve"}));
    let (status, body) = send(ports, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Application accepted successfully");
    assert_eq!(body["data"]["student"]["studentId"], "STU0001");
}

#[rstest]
#[case(json!({"action": "reject"}), "Admission ID and action are required")]
#[case(json!({"admissionId": "abc", "action": "reject"}), "admissionId must be a valid UUID")]
#[actix_web::test]
async fn process_validates_request(
    admin: Account,
    #[case] payload: Value,
    #[case] message: &'static str,
) {
    let ports = MockPorts::authenticating(admin);
    let request = test::TestRequest::post()
        .uri("/api/admin/admissions/process")
        .set_json(payload);
    let (status, body) = send(ports, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], message);
}

#[rstest]
#[actix_web::test]
async fn unknown_action_is_rejected_by_json_config(admin: Account) {
    let ports = MockPorts::authenticating(admin);
    let app = test::init_service(
        App::new()
            .app_data(ports.into_state())
            .app_data(
                web::JsonConfig::default()
                    .error_handler(crate::inbound::http::error::extractor_error_handler),
            )
            .configure(configure),
    )
    .await;
    let request = test::TestRequest::post()
        .uri("/api/admin/admissions/process")
        .insert_header(bearer())
        .set_json(json!({"admissionId": "x", "action": "defer"}))
        .to_request();
    let res = test::call_service(&app, request).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["code"], "invalid_request");
}

#[rstest]
#[actix_web::test]
async fn admission_detail_and_delete_parse_ids(admin: Account) {
    let mut ports = MockPorts::authenticating(admin);
    let admission = pending_admission("ada@school.test");
    let id = admission.id;
    ports
        .admission_admin
        .expect_get()
        .with(eq(id))
        .return_once(move |_| Ok(admission));
    ports
        .admission_admin
        .expect_delete()
        .with(eq(id))
        .return_once(|_| Ok(()));
    let app = test::init_service(
        App::new()
            .app_data(ports.into_state())
            .configure(configure),
    )
    .await;

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/admin/admissions/{id}"))
            .insert_header(bearer())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["data"]["admission"]["email"], "ada@school.test");

    let res = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/admin/admissions/{id}"))
            .insert_header(bearer())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["message"], "Admission deleted successfully");
}

#[rstest]
#[actix_web::test]
async fn malformed_admission_id_is_bad_request(admin: Account) {
    let ports = MockPorts::authenticating(admin);
    let (status, body) = send(
        ports,
        test::TestRequest::get().uri("/api/admin/admissions/not-a-uuid"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "id");
}

#[rstest]
#[actix_web::test]
async fn student_creation_returns_created(admin: Account) {
    let mut ports = MockPorts::authenticating(admin);
    let student = student_account(4, "grace@school.test", "secret");
    let profile = PublicProfile::from(&student);
    ports
        .students
        .expect_create()
        .withf(|request: &NewStudentRequest| request.email.as_deref() == Some("grace@school.test"))
        .return_once(move |_| {
            Ok(CreatedStudent {
                user: profile,
                initial_password: None,
            })
        });

    let request = test::TestRequest::post()
        .uri("/api/admin/students")
        .set_json(json!({
            "email": "grace@school.test",
            "password": "secret",
            "name": "Grace Hopper",
            "mobile": "9876543210",
            "bloodGroup": "O+",
            "standard": "Class 10"
        }));
    let (status, body) = send(ports, request).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["user"]["studentId"], "STU0004");
    assert!(body["data"].get("initialPassword").is_none());
}

#[rstest]
#[actix_web::test]
async fn toggling_reports_new_state(admin: Account) {
    let mut ports = MockPorts::authenticating(admin);
    let mut student = student_account(1, "ada@school.test", "secret");
    student.is_active = false;
    let profile = PublicProfile::from(&student);
    ports
        .students
        .expect_toggle_active()
        .withf(|student_id: &str| student_id == "STU0001")
        .return_once(move |_| Ok(profile));

    let request = test::TestRequest::patch().uri("/api/admin/students/STU0001/toggle-status");
    let (status, body) = send(ports, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Student deactivated successfully");
    assert_eq!(body["data"]["student"]["isActive"], false);
}

#[rstest]
#[actix_web::test]
async fn student_listing_and_lookup(admin: Account) {
    let mut ports = MockPorts::authenticating(admin);
    let profile = PublicProfile::from(&student_account(1, "ada@school.test", "secret"));
    let listed = profile.clone();
    ports
        .students
        .expect_list()
        .withf(|search: &Option<String>, _| search.is_none())
        .return_once(move |_, request| {
            Ok(Page {
                items: vec![listed],
                total_items: 1,
                request,
            })
        });
    ports
        .students
        .expect_get()
        .withf(|student_id: &str| student_id == "STU0001")
        .return_once(move |_| Ok(profile));
    let app = test::init_service(
        App::new()
            .app_data(ports.into_state())
            .configure(configure),
    )
    .await;

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/admin/students?search=%20")
            .insert_header(bearer())
            .to_request(),
    )
    .await;
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["data"]["students"][0]["studentId"], "STU0001");
    assert_eq!(body["data"]["pagination"]["totalItems"], 1);

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/admin/students/STU0001")
            .insert_header(bearer())
            .to_request(),
    )
    .await;
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["data"]["student"]["email"], "ada@school.test");
}

#[rstest]
#[actix_web::test]
async fn dashboard_combines_both_counters(admin: Account) {
    let mut ports = MockPorts::authenticating(admin);
    ports.admissions.expect_stats().return_once(|| {
        Ok(AdmissionStats {
            total: 4,
            pending: 3,
            accepted: 1,
            rejected: 0,
            recent: 4,
        })
    });
    ports.auth.expect_stats().return_once(|| {
        Ok(AccountStats {
            total_students: 1,
            active_students: 1,
            inactive_students: 0,
            recent_logins: 0,
        })
    });

    let (status, body) = send(
        ports,
        test::TestRequest::get().uri("/api/admin/dashboard/stats"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["admissions"]["total"], 4);
    assert_eq!(body["data"]["students"]["totalStudents"], 1);
}
