//! Tests for the account authentication service.

use std::sync::Arc;

use super::*;
use crate::domain::ports::{
    FixturePasswordHasher, MockAccountRepository, MockTokenIssuer, TokenError,
};
use crate::domain::{ErrorCode, SessionToken, TokenClaims};
use crate::test_support::{admin_account, fixed_clock, fixture_timestamp, student_account};
use rstest::rstest;

type Service = AccountAuthService<MockAccountRepository, FixturePasswordHasher, MockTokenIssuer>;

fn make_service(accounts: MockAccountRepository, tokens: MockTokenIssuer) -> Service {
    AccountAuthService::new(
        Arc::new(accounts),
        Arc::new(FixturePasswordHasher),
        Arc::new(tokens),
        fixed_clock(),
    )
}

fn issuing_tokens() -> MockTokenIssuer {
    let mut tokens = MockTokenIssuer::new();
    tokens
        .expect_issue()
        .times(1)
        .returning(|_, _| Ok(SessionToken::new("signed.token.value")));
    tokens
}

fn student_creds(password: &str) -> StudentCredentials {
    StudentCredentials::try_from_parts(Some("STU0001"), None, password).expect("creds")
}

#[tokio::test]
async fn admin_login_issues_token_and_stamps_last_login() {
    let admin = admin_account("admin@school.test", "secret1");
    let mut accounts = MockAccountRepository::new();
    accounts
        .expect_find_by_email()
        .withf(|email, role| email == "admin@school.test" && *role == Role::Admin)
        .times(1)
        .return_once(move |_, _| Ok(Some(admin)));
    accounts
        .expect_record_login()
        .withf(|_, at| *at == fixture_timestamp())
        .times(1)
        .return_once(|_, _| Ok(()));

    let creds = AdminCredentials::try_from_parts("Admin@School.test", "secret1").expect("creds");
    let outcome = make_service(accounts, issuing_tokens())
        .admin_login(&creds)
        .await
        .expect("login succeeds");
    assert_eq!(outcome.token, "signed.token.value");
    assert_eq!(outcome.user.role, Role::Admin);
    assert_eq!(outcome.user.last_login, Some(fixture_timestamp()));
}

#[tokio::test]
async fn admin_login_rejects_unknown_email() {
    let mut accounts = MockAccountRepository::new();
    accounts
        .expect_find_by_email()
        .times(1)
        .return_once(|_, _| Ok(None));
    accounts.expect_record_login().never();
    let mut tokens = MockTokenIssuer::new();
    tokens.expect_issue().never();

    let creds = AdminCredentials::try_from_parts("ghost@school.test", "secret1").expect("creds");
    let err = make_service(accounts, tokens)
        .admin_login(&creds)
        .await
        .expect_err("unknown");
    assert_eq!(err.code(), ErrorCode::Unauthorized);
    assert_eq!(err.message(), INVALID_CREDENTIALS);
}

#[tokio::test]
async fn student_login_with_wrong_password_does_not_stamp_login() {
    let student = student_account(1, "ada@school.test", "secret1");
    let mut accounts = MockAccountRepository::new();
    accounts
        .expect_find_by_student_id()
        .withf(|id| id == "STU0001")
        .times(1)
        .return_once(move |_| Ok(Some(student)));
    accounts.expect_record_login().never();
    let mut tokens = MockTokenIssuer::new();
    tokens.expect_issue().never();

    let err = make_service(accounts, tokens)
        .student_login(&student_creds("wrong-password"))
        .await
        .expect_err("wrong password");
    assert_eq!(err.code(), ErrorCode::Unauthorized);
}

#[rstest]
#[case("secret1")]
#[case("wrong-password")]
#[tokio::test]
async fn disabled_student_is_rejected_before_password_check(#[case] password: &str) {
    let mut student = student_account(1, "ada@school.test", "secret1");
    student.is_active = false;
    let mut accounts = MockAccountRepository::new();
    accounts
        .expect_find_by_student_id()
        .times(1)
        .return_once(move |_| Ok(Some(student)));
    accounts.expect_record_login().never();
    let mut tokens = MockTokenIssuer::new();
    tokens.expect_issue().never();

    let err = make_service(accounts, tokens)
        .student_login(&student_creds(password))
        .await
        .expect_err("disabled");
    assert_eq!(err.code(), ErrorCode::AccountDisabled);
    assert_eq!(err.message(), ACCOUNT_DEACTIVATED);
}

#[tokio::test]
async fn student_login_by_email_succeeds() {
    let student = student_account(2, "ada@school.test", "secret1");
    let mut accounts = MockAccountRepository::new();
    accounts
        .expect_find_by_email()
        .withf(|email, role| email == "ada@school.test" && *role == Role::Student)
        .times(1)
        .return_once(move |_, _| Ok(Some(student)));
    accounts
        .expect_record_login()
        .times(1)
        .return_once(|_, _| Ok(()));

    let creds =
        StudentCredentials::try_from_parts(None, Some("ada@school.test"), "secret1").expect("creds");
    let outcome = make_service(accounts, issuing_tokens())
        .student_login(&creds)
        .await
        .expect("login");
    assert_eq!(outcome.user.student_id.as_deref(), Some("STU0002"));
}

fn claims_for(account: &Account) -> TokenClaims {
    TokenClaims {
        sub: account.id,
        role: account.role,
        iat: 0,
        exp: i64::MAX,
    }
}

#[tokio::test]
async fn authenticate_token_reloads_account() {
    let student = student_account(1, "ada@school.test", "secret1");
    let claims = claims_for(&student);
    let mut tokens = MockTokenIssuer::new();
    tokens
        .expect_verify()
        .times(1)
        .return_once(move |_| Ok(claims));
    let mut accounts = MockAccountRepository::new();
    let expected_id = student.id;
    accounts
        .expect_find_by_id()
        .withf(move |id| *id == expected_id)
        .times(1)
        .return_once(move |_| Ok(Some(student)));

    let account = make_service(accounts, tokens)
        .authenticate_token("token")
        .await
        .expect("authenticated");
    assert_eq!(account.id, expected_id);
}

#[rstest]
#[case(TokenError::Expired)]
#[case(TokenError::BadSignature)]
#[tokio::test]
async fn authenticate_token_rejects_bad_tokens(#[case] failure: TokenError) {
    let mut tokens = MockTokenIssuer::new();
    tokens
        .expect_verify()
        .times(1)
        .return_once(move |_| Err(failure));
    let mut accounts = MockAccountRepository::new();
    accounts.expect_find_by_id().never();

    let err = make_service(accounts, tokens)
        .authenticate_token("token")
        .await
        .expect_err("rejected");
    assert_eq!(err.code(), ErrorCode::Unauthorized);
}

#[tokio::test]
async fn authenticate_token_rejects_deactivated_student() {
    let mut student = student_account(1, "ada@school.test", "secret1");
    student.is_active = false;
    let claims = claims_for(&student);
    let mut tokens = MockTokenIssuer::new();
    tokens
        .expect_verify()
        .times(1)
        .return_once(move |_| Ok(claims));
    let mut accounts = MockAccountRepository::new();
    accounts
        .expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(student)));

    let err = make_service(accounts, tokens)
        .authenticate_token("token")
        .await
        .expect_err("disabled");
    assert_eq!(err.code(), ErrorCode::AccountDisabled);
}

#[tokio::test]
async fn change_password_requires_current_password() {
    let student = student_account(1, "ada@school.test", "secret1");
    let id = student.id;
    let mut accounts = MockAccountRepository::new();
    accounts
        .expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(student)));
    accounts.expect_update_password().never();

    let change = PasswordChange::try_from_parts(Some("nope"), Some("newsecret")).expect("change");
    let err = make_service(accounts, MockTokenIssuer::new())
        .change_password(&id, &change)
        .await
        .expect_err("wrong current password");
    assert_eq!(err.code(), ErrorCode::Unauthorized);
    assert_eq!(err.message(), "Current password is incorrect");
}

#[tokio::test]
async fn change_password_stores_new_hash() {
    let student = student_account(1, "ada@school.test", "secret1");
    let id = student.id;
    let mut accounts = MockAccountRepository::new();
    accounts
        .expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(student)));
    accounts
        .expect_update_password()
        .withf(|_, hash, _| {
            FixturePasswordHasher
                .verify("newsecret", hash)
                .unwrap_or(false)
        })
        .times(1)
        .return_once(|_, _, _| Ok(()));

    let change =
        PasswordChange::try_from_parts(Some("secret1"), Some("newsecret")).expect("change");
    make_service(accounts, MockTokenIssuer::new())
        .change_password(&id, &change)
        .await
        .expect("changed");
}

#[tokio::test]
async fn stats_use_seven_day_login_window() {
    let mut accounts = MockAccountRepository::new();
    accounts
        .expect_stats()
        .withf(|since| *since == fixture_timestamp() - Duration::days(7))
        .times(1)
        .return_once(|_| {
            Ok(AccountStats {
                total_students: 3,
                active_students: 2,
                inactive_students: 1,
                recent_logins: 1,
            })
        });
    let stats = make_service(accounts, MockTokenIssuer::new())
        .stats()
        .await
        .expect("stats");
    assert_eq!(stats.total_students, 3);
}
