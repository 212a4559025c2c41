//! Tests for admission form validation and projections.

use super::*;
use chrono::Duration;
use rstest::{fixture, rstest};
use serde_json::json;

fn base_form() -> AdmissionForm {
    AdmissionForm {
        first_name: Some("A".to_owned()),
        last_name: Some("B".to_owned()),
        email: Some("a@b.com".to_owned()),
        phone: Some("1234567890".to_owned()),
        ..AdmissionForm::default()
    }
}

#[fixture]
fn minimal_form() -> AdmissionForm {
    base_form()
}

fn admission_with(status: AdmissionStatus, student_id: Option<&str>) -> Admission {
    let details = NewAdmission::from_form(&base_form()).expect("valid form");
    let mut admission = Admission::submit(details, Utc::now());
    admission.status = status;
    admission.student_id = student_id.map(|id| StudentId::parse(id).expect("student id"));
    admission
}

#[rstest]
#[case::first_name(|form: &mut AdmissionForm| form.first_name = None)]
#[case::last_name(|form: &mut AdmissionForm| form.last_name = Some("   ".to_owned()))]
#[case::email(|form: &mut AdmissionForm| form.email = None)]
#[case::phone(|form: &mut AdmissionForm| form.phone = Some(String::new()))]
#[case::markup_only(|form: &mut AdmissionForm| form.first_name = Some("<b></b>".to_owned()))]
fn missing_required_field_is_rejected(
    minimal_form: AdmissionForm,
    #[case] strip: fn(&mut AdmissionForm),
) {
    let mut form = minimal_form;
    strip(&mut form);
    assert_eq!(
        NewAdmission::from_form(&form),
        Err(AdmissionValidationError::MissingRequiredFields)
    );
}

#[rstest]
fn missing_field_message_names_requirement() {
    assert_eq!(
        AdmissionValidationError::MissingRequiredFields.to_string(),
        "Missing required fields: firstName, lastName, email, or phone"
    );
}

#[rstest]
fn free_text_is_sanitised(minimal_form: AdmissionForm) {
    let form = AdmissionForm {
        first_name: Some("  <script>x</script>Ada ".to_owned()),
        address: Some("12 <i>Main</i> Road".to_owned()),
        medical_history: Some("  ".to_owned()),
        ..minimal_form
    };
    let admission = NewAdmission::from_form(&form).expect("valid form");
    assert_eq!(admission.applicant.first_name, "xAda");
    assert_eq!(admission.applicant.address.as_deref(), Some("12 Main Road"));
    assert_eq!(admission.additional.medical_history, None);
}

#[rstest]
#[case(Some("87.5"), Some(87.5))]
#[case(Some(" 92 "), Some(92.0))]
#[case(Some("n/a"), None)]
#[case(None, None)]
fn percentage_parses_gracefully(
    minimal_form: AdmissionForm,
    #[case] raw: Option<&str>,
    #[case] expected: Option<f64>,
) {
    let form = AdmissionForm {
        previous_percentage: raw.map(str::to_owned),
        ..minimal_form
    };
    let admission = NewAdmission::from_form(&form).expect("valid form");
    assert_eq!(admission.academics.previous_percentage, expected);
}

#[rstest]
fn year_and_date_parse(minimal_form: AdmissionForm) {
    let form = AdmissionForm {
        year_of_passing: Some("2023".to_owned()),
        date_of_birth: Some("2008-04-01".to_owned()),
        ..minimal_form
    };
    let admission = NewAdmission::from_form(&form).expect("valid form");
    assert_eq!(admission.academics.year_of_passing, Some(2023));
    assert_eq!(
        admission.applicant.date_of_birth,
        NaiveDate::from_ymd_opt(2008, 4, 1)
    );
}

#[rstest]
fn invalid_email_is_rejected(minimal_form: AdmissionForm) {
    let form = AdmissionForm {
        email: Some("not-an-email".to_owned()),
        ..minimal_form
    };
    assert_eq!(
        NewAdmission::from_form(&form),
        Err(AdmissionValidationError::InvalidEmail)
    );
}

#[rstest]
#[case("applicant@college.info")]
#[case("Applicant@School.Academy")]
fn long_top_level_domains_are_accepted(minimal_form: AdmissionForm, #[case] raw: &str) {
    let form = AdmissionForm {
        email: Some(raw.to_owned()),
        ..minimal_form
    };
    let admission = NewAdmission::from_form(&form).expect("valid form");
    assert_eq!(admission.applicant.email.as_ref(), raw.to_lowercase());
}

#[rstest]
fn invalid_blood_group_is_rejected(minimal_form: AdmissionForm) {
    let form = AdmissionForm {
        blood_group: Some("Z+".to_owned()),
        ..minimal_form
    };
    assert!(matches!(
        NewAdmission::from_form(&form),
        Err(AdmissionValidationError::InvalidBloodGroup(_))
    ));
}

#[rstest]
fn json_form_accepts_numeric_values() {
    let form: AdmissionForm = serde_json::from_value(json!({
        "firstName": "A",
        "lastName": "B",
        "email": "a@b.com",
        "phone": 1_234_567_890_u64,
        "previousPercentage": 81.5,
        "yearOfPassing": 2022
    }))
    .expect("form deserialises");
    let admission = NewAdmission::from_form(&form).expect("valid form");
    assert_eq!(admission.applicant.phone, "1234567890");
    assert_eq!(admission.academics.previous_percentage, Some(81.5));
    assert_eq!(admission.academics.year_of_passing, Some(2022));
}

#[rstest]
fn set_field_maps_known_names() {
    let mut form = AdmissionForm::default();
    assert!(form.set_field("fatherName", "Charles".to_owned()));
    assert!(!form.set_field("photo", "ignored".to_owned()));
    assert_eq!(form.father_name.as_deref(), Some("Charles"));
}

#[rstest]
#[case("pending", AdmissionStatus::Pending)]
#[case("Accepted", AdmissionStatus::Accepted)]
#[case("approved", AdmissionStatus::Accepted)]
#[case("REJECTED", AdmissionStatus::Rejected)]
fn status_parses_with_alias(#[case] raw: &str, #[case] expected: AdmissionStatus) {
    assert_eq!(raw.parse::<AdmissionStatus>(), Ok(expected));
}

#[rstest]
fn approved_deserialises_as_accepted() {
    let status: AdmissionStatus = serde_json::from_value(json!("approved")).expect("status");
    assert_eq!(status, AdmissionStatus::Accepted);
    assert_eq!(
        serde_json::to_value(status).expect("serialise"),
        json!("accepted")
    );
}

#[rstest]
#[case(AdmissionStatus::Pending, false)]
#[case(AdmissionStatus::Accepted, true)]
#[case(AdmissionStatus::Rejected, false)]
fn status_view_discloses_student_id_only_when_accepted(
    #[case] status: AdmissionStatus,
    #[case] disclosed: bool,
) {
    let admission = admission_with(status, Some("STU0001"));
    let view = AdmissionStatusView::from(&admission);
    let json = serde_json::to_value(&view).expect("serialise");
    assert_eq!(json.get("student_id").is_some(), disclosed);
    assert_eq!(view.student_id.is_some(), disclosed);
}

#[rstest]
fn filter_matches_status_and_search() {
    let admission = admission_with(AdmissionStatus::Pending, None);
    let by_status = AdmissionFilter {
        status: Some(AdmissionStatus::Rejected),
        search: None,
    };
    let by_search = AdmissionFilter {
        status: None,
        search: Some("A@B".to_owned()),
    };
    assert!(!by_status.matches(&admission));
    assert!(by_search.matches(&admission));
    assert!(AdmissionFilter::default().matches(&admission));
}

#[rstest]
fn tally_counts_each_status_once() {
    let now = Utc::now();
    let rows = vec![
        (AdmissionStatus::Pending, now),
        (AdmissionStatus::Pending, now - Duration::days(1)),
        (AdmissionStatus::Pending, now - Duration::days(45)),
        (AdmissionStatus::Accepted, now),
    ];
    let stats = AdmissionStats::tally(rows, now - Duration::days(RECENT_WINDOW_DAYS));
    assert_eq!(
        stats,
        AdmissionStats {
            total: 4,
            pending: 3,
            accepted: 1,
            rejected: 0,
            recent: 3,
        }
    );
}
