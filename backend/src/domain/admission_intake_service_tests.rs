//! Tests for the admission intake service.

use std::sync::Arc;

use super::*;
use crate::domain::ports::{
    AdmissionRepositoryError, FixtureDocumentStore, MockAdmissionRepository, MockDocumentStore,
};
use crate::domain::{AdmissionForm, AdmissionStatus, ErrorCode};
use crate::test_support::{complete_form, fixed_clock, fixture_timestamp};
use rstest::rstest;

const MAX_UPLOAD: usize = 1024;

fn make_service(
    repo: MockAdmissionRepository,
) -> AdmissionIntakeService<MockAdmissionRepository, FixtureDocumentStore> {
    AdmissionIntakeService::new(
        Arc::new(repo),
        Arc::new(FixtureDocumentStore),
        fixed_clock(),
        MAX_UPLOAD,
    )
}

fn submission(form: AdmissionForm) -> AdmissionSubmission {
    AdmissionSubmission {
        form,
        uploads: Vec::new(),
    }
}

fn pdf(field: &str, len: usize) -> DocumentUpload {
    DocumentUpload {
        field: field.to_owned(),
        file_name: format!("{field}.pdf"),
        content_type: "application/pdf".to_owned(),
        bytes: vec![1; len],
    }
}

#[tokio::test]
async fn submit_persists_pending_application() {
    let mut repo = MockAdmissionRepository::new();
    repo.expect_find_by_email()
        .times(1)
        .return_once(|_| Ok(None));
    repo.expect_insert()
        .withf(|admission| {
            admission.status == AdmissionStatus::Pending
                && admission.email().as_ref() == "ada@school.test"
        })
        .times(1)
        .return_once(|_| Ok(()));

    let receipt = make_service(repo)
        .submit(submission(complete_form(" Ada@School.test ")))
        .await
        .expect("submission succeeds");
    assert_eq!(receipt.status, AdmissionStatus::Pending);
    assert_eq!(receipt.submitted_at, fixture_timestamp());
}

#[tokio::test]
async fn submit_rejects_missing_fields_without_touching_storage() {
    let mut repo = MockAdmissionRepository::new();
    repo.expect_find_by_email().never();
    repo.expect_insert().never();

    let form = AdmissionForm {
        phone: None,
        ..complete_form("ada@school.test")
    };
    let err = make_service(repo)
        .submit(submission(form))
        .await
        .expect_err("missing phone");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(
        err.message(),
        "Missing required fields: firstName, lastName, email, or phone"
    );
}

#[tokio::test]
async fn submit_rejects_existing_email_before_insert() {
    let mut repo = MockAdmissionRepository::new();
    repo.expect_find_by_email().times(1).return_once(|_| {
        let details = NewAdmission::from_form(&complete_form("ada@school.test"))
            .expect("valid form");
        Ok(Some(Admission::submit(details, fixture_timestamp())))
    });
    repo.expect_insert().never();

    let err = make_service(repo)
        .submit(submission(complete_form("ada@school.test")))
        .await
        .expect_err("duplicate");
    assert_eq!(err.code(), ErrorCode::Duplicate);
    assert!(err.message().contains("already exists"));
}

#[tokio::test]
async fn submit_maps_insert_race_to_duplicate() {
    let mut repo = MockAdmissionRepository::new();
    repo.expect_find_by_email()
        .times(1)
        .return_once(|_| Ok(None));
    repo.expect_insert()
        .times(1)
        .return_once(|_| Err(AdmissionRepositoryError::duplicate("ada@school.test")));

    let err = make_service(repo)
        .submit(submission(complete_form("ada@school.test")))
        .await
        .expect_err("duplicate");
    assert_eq!(err.code(), ErrorCode::Duplicate);
    assert_eq!(err.message(), DUPLICATE_ADMISSION);
}

#[rstest]
#[case(AdmissionRepositoryError::connection("refused"), ErrorCode::InternalError)]
#[case(AdmissionRepositoryError::query("syntax"), ErrorCode::InternalError)]
#[tokio::test]
async fn submit_surfaces_storage_failures(
    #[case] failure: AdmissionRepositoryError,
    #[case] expected: ErrorCode,
) {
    let mut repo = MockAdmissionRepository::new();
    repo.expect_find_by_email()
        .times(1)
        .return_once(|_| Ok(None));
    repo.expect_insert().times(1).return_once(move |_| Err(failure));

    let err = make_service(repo)
        .submit(submission(complete_form("ada@school.test")))
        .await
        .expect_err("storage failure");
    assert_eq!(err.code(), expected);
}

#[tokio::test]
async fn submit_attaches_documents_in_upload_order() {
    let mut repo = MockAdmissionRepository::new();
    repo.expect_find_by_email()
        .times(1)
        .return_once(|_| Ok(None));
    repo.expect_insert()
        .withf(|admission| {
            let kinds: Vec<&str> = admission
                .details
                .documents
                .iter()
                .map(|doc| doc.kind.as_str())
                .collect();
            kinds == ["photo", "marksheet"]
        })
        .times(1)
        .return_once(|_| Ok(()));

    let request = AdmissionSubmission {
        form: complete_form("ada@school.test"),
        uploads: vec![pdf("photo", 8), pdf("marksheet", 8)],
    };
    make_service(repo)
        .submit(request)
        .await
        .expect("submission succeeds");
}

#[tokio::test]
async fn submit_rejects_disallowed_file_type() {
    let mut repo = MockAdmissionRepository::new();
    repo.expect_find_by_email().never();
    repo.expect_insert().never();

    let mut upload = pdf("photo", 8);
    upload.content_type = "application/x-sh".to_owned();
    let request = AdmissionSubmission {
        form: complete_form("ada@school.test"),
        uploads: vec![upload],
    };
    let err = make_service(repo)
        .submit(request)
        .await
        .expect_err("rejected upload");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.message(), UPLOAD_FAILED);
    assert!(err.details().is_some());
}

#[tokio::test]
async fn submit_continues_when_storage_of_attachment_fails() {
    let mut repo = MockAdmissionRepository::new();
    repo.expect_find_by_email()
        .times(1)
        .return_once(|_| Ok(None));
    repo.expect_insert()
        .withf(|admission| admission.details.documents.is_empty())
        .times(1)
        .return_once(|_| Ok(()));
    let mut documents = MockDocumentStore::new();
    documents
        .expect_store()
        .times(1)
        .return_once(|_| Err(DocumentStoreError::storage("disk full")));

    let service = AdmissionIntakeService::new(
        Arc::new(repo),
        Arc::new(documents),
        fixed_clock(),
        MAX_UPLOAD,
    );
    let request = AdmissionSubmission {
        form: complete_form("ada@school.test"),
        uploads: vec![pdf("photo", 8)],
    };
    service.submit(request).await.expect("submission succeeds");
}

#[tokio::test]
async fn submit_discards_documents_when_insert_fails() {
    let mut repo = MockAdmissionRepository::new();
    repo.expect_find_by_email()
        .times(1)
        .return_once(|_| Ok(None));
    repo.expect_insert()
        .times(1)
        .return_once(|_| Err(AdmissionRepositoryError::duplicate("ada@school.test")));
    let mut documents = MockDocumentStore::new();
    documents.expect_store().times(1).return_once(|upload| {
        Ok(DocumentDescriptor {
            kind: upload.field,
            url: "/uploads/x".to_owned(),
            public_id: "x".to_owned(),
            name: upload.file_name,
        })
    });
    documents.expect_remove().times(1).return_once(|_| Ok(()));

    let service = AdmissionIntakeService::new(
        Arc::new(repo),
        Arc::new(documents),
        fixed_clock(),
        MAX_UPLOAD,
    );
    let request = AdmissionSubmission {
        form: complete_form("ada@school.test"),
        uploads: vec![pdf("photo", 8)],
    };
    service.submit(request).await.expect_err("duplicate");
}

#[rstest]
#[case("", "Email is required for validation")]
#[case("   ", "Email is required for validation")]
#[case("nobody", "Please provide a valid email address")]
#[tokio::test]
async fn check_email_rejects_bad_input(#[case] email: &str, #[case] message: &str) {
    let mut repo = MockAdmissionRepository::new();
    repo.expect_find_by_email().never();
    let err = make_service(repo)
        .check_email_available(email)
        .await
        .expect_err("invalid");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.message(), message);
}

#[tokio::test]
async fn check_email_accepts_unused_address() {
    let mut repo = MockAdmissionRepository::new();
    repo.expect_find_by_email()
        .withf(|email| email.as_ref() == "new@school.test")
        .times(1)
        .return_once(|_| Ok(None));
    make_service(repo)
        .check_email_available("New@School.test")
        .await
        .expect("available");
}
