//! Error translation and helpers shared by the domain services.

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::distributions::Alphanumeric;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::domain::ports::{
    AccountRepository, AccountRepositoryError, AdmissionRepositoryError, PasswordHasher,
    PasswordHasherError, TokenError,
};
use crate::domain::{
    Account, AccountValidationError, EmailAddress, Error, Role, StudentId, StudentProfile,
};

/// Message for duplicate admission applications.
pub const DUPLICATE_ADMISSION: &str = "An application with this email already exists";
/// Message for duplicate accounts.
pub const DUPLICATE_ACCOUNT: &str = "A user with this email already exists";
/// Length of generated initial passwords.
pub const GENERATED_PASSWORD_LENGTH: usize = 10;
/// Attempts made when a concurrent creation takes the same student ID.
const STUDENT_ID_ATTEMPTS: usize = 3;

pub(crate) fn map_admission_repository_error(error: AdmissionRepositoryError) -> Error {
    debug!(kind = error.kind(), %error, "admission repository failure");
    match error {
        AdmissionRepositoryError::Duplicate { .. } => Error::duplicate(DUPLICATE_ADMISSION),
        AdmissionRepositoryError::Connection { message }
        | AdmissionRepositoryError::Query { message } => {
            Error::internal(format!("admission repository error: {message}"))
        }
    }
}

pub(crate) fn map_account_repository_error(error: AccountRepositoryError) -> Error {
    debug!(kind = error.kind(), %error, "account repository failure");
    match error {
        AccountRepositoryError::Duplicate { .. } => Error::duplicate(DUPLICATE_ACCOUNT),
        AccountRepositoryError::Connection { message }
        | AccountRepositoryError::Query { message } => {
            Error::internal(format!("account repository error: {message}"))
        }
    }
}

pub(crate) fn map_hasher_error(error: PasswordHasherError) -> Error {
    Error::internal(format!("password hasher error: {error}"))
}

pub(crate) fn map_token_error(error: &TokenError) -> Error {
    match error {
        TokenError::Expired => Error::unauthorized("Token expired"),
        TokenError::Encoding { message } => {
            Error::internal(format!("token encoding failed: {message}"))
        }
        TokenError::Malformed { .. } | TokenError::BadSignature => {
            Error::unauthorized("Invalid token")
        }
    }
}

pub(crate) fn map_account_validation(error: &AccountValidationError) -> Error {
    Error::invalid_request(error.to_string())
}

/// Random alphanumeric password for accounts created on someone's behalf.
pub(crate) fn generate_password() -> Zeroizing<String> {
    Zeroizing::new(
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(GENERATED_PASSWORD_LENGTH)
            .map(char::from)
            .collect(),
    )
}

/// Create a student account with the next free `STU####` identifier.
///
/// Rejects emails already used by a student account and retries when a
/// concurrent creation claims the same identifier.
pub(crate) async fn create_student_account<A, H>(
    accounts: &A,
    hasher: &H,
    email: EmailAddress,
    password: &str,
    profile: StudentProfile,
    now: DateTime<Utc>,
) -> Result<Account, Error>
where
    A: AccountRepository + ?Sized,
    H: PasswordHasher + ?Sized,
{
    if accounts
        .find_by_email(email.as_ref(), Role::Student)
        .await
        .map_err(map_account_repository_error)?
        .is_some()
    {
        return Err(Error::duplicate(DUPLICATE_ACCOUNT));
    }
    let password_hash = hasher.hash(password).map_err(map_hasher_error)?;

    let mut last_error = None;
    for _ in 0..STUDENT_ID_ATTEMPTS {
        let number = accounts
            .next_student_number()
            .await
            .map_err(map_account_repository_error)?;
        let student_id =
            StudentId::from_number(number).map_err(|err| map_account_validation(&err))?;
        let account = Account::new_student(
            email.clone(),
            password_hash.clone(),
            student_id,
            profile.clone(),
            now,
        );
        match accounts.insert(&account).await {
            Ok(()) => return Ok(account),
            Err(AccountRepositoryError::Duplicate { message }) => {
                warn!(%message, "student account insert collided; retrying");
                last_error = Some(AccountRepositoryError::duplicate(message));
            }
            Err(other) => return Err(map_account_repository_error(other)),
        }
    }
    Err(last_error.map_or_else(
        || Error::internal("student account creation exhausted retries"),
        map_account_repository_error,
    ))
}
