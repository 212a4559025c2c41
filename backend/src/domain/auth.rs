//! Authentication primitives: login credentials, password changes and
//! session token claims.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use zeroize::Zeroizing;

use super::account::{AccountId, PASSWORD_MIN_LENGTH, PublicProfile, Role, normalise_email};

/// Domain error returned when authentication payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Admin email was missing or blank once trimmed.
    EmptyEmail,
    /// Password was blank.
    EmptyPassword,
    /// Neither a student ID nor an email was supplied, or no password.
    MissingStudentCredentials,
    /// Current or new password missing on a password change.
    MissingPasswords,
    /// New password shorter than [`PASSWORD_MIN_LENGTH`].
    NewPasswordTooShort { min: usize },
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "Email is required"),
            Self::EmptyPassword => write!(f, "Password is required"),
            Self::MissingStudentCredentials => {
                write!(f, "Student ID/Email and password are required")
            }
            Self::MissingPasswords => {
                write!(f, "Current password and new password are required")
            }
            Self::NewPasswordTooShort { min } => {
                write!(f, "New password must be at least {min} characters long")
            }
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Validated administrator credentials.
///
/// ## Invariants
/// - `email` is trimmed, lowercased and non-empty.
/// - `password` is non-empty but retains caller-provided whitespace.
///
/// # Examples
/// ```
/// use institute::domain::AdminCredentials;
///
/// let creds = AdminCredentials::try_from_parts(" Admin@School.test ", "secret").unwrap();
/// assert_eq!(creds.email(), "admin@school.test");
/// assert_eq!(creds.password(), "secret");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl AdminCredentials {
    /// Construct credentials from raw inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let email = normalise_email(email);
        if email.is_empty() {
            return Err(LoginValidationError::EmptyEmail);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Normalised email used for the lookup.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Password provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// How a student identifies themselves at login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StudentIdentifier {
    /// `STU####` identifier, matched after trimming and uppercasing.
    StudentId(String),
    /// Account email, matched after normalisation.
    Email(String),
}

/// Validated student credentials. The student ID wins when both identifiers
/// are supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentCredentials {
    identifier: StudentIdentifier,
    password: Zeroizing<String>,
}

impl StudentCredentials {
    /// Construct credentials from the optional identifiers and a password.
    ///
    /// # Examples
    /// ```
    /// use institute::domain::{StudentCredentials, StudentIdentifier};
    ///
    /// let creds = StudentCredentials::try_from_parts(Some("stu0001"), None, "secret").unwrap();
    /// assert_eq!(creds.identifier(), &StudentIdentifier::StudentId("STU0001".into()));
    /// assert!(StudentCredentials::try_from_parts(None, None, "secret").is_err());
    /// ```
    pub fn try_from_parts(
        student_id: Option<&str>,
        email: Option<&str>,
        password: &str,
    ) -> Result<Self, LoginValidationError> {
        let student_id = student_id
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_uppercase);
        let email = email.map(normalise_email).filter(|value| !value.is_empty());
        let identifier = match (student_id, email) {
            (Some(id), _) => StudentIdentifier::StudentId(id),
            (None, Some(email)) => StudentIdentifier::Email(email),
            (None, None) => return Err(LoginValidationError::MissingStudentCredentials),
        };
        if password.is_empty() {
            return Err(LoginValidationError::MissingStudentCredentials);
        }
        Ok(Self {
            identifier,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Lookup key.
    pub fn identifier(&self) -> &StudentIdentifier {
        &self.identifier
    }

    /// Password provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Validated password change request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordChange {
    current: Zeroizing<String>,
    new: Zeroizing<String>,
}

impl PasswordChange {
    /// Validate presence of both passwords and the new password's length.
    pub fn try_from_parts(
        current: Option<&str>,
        new: Option<&str>,
    ) -> Result<Self, LoginValidationError> {
        let (Some(current), Some(new)) = (
            current.filter(|value| !value.is_empty()),
            new.filter(|value| !value.is_empty()),
        ) else {
            return Err(LoginValidationError::MissingPasswords);
        };
        if new.chars().count() < PASSWORD_MIN_LENGTH {
            return Err(LoginValidationError::NewPasswordTooShort {
                min: PASSWORD_MIN_LENGTH,
            });
        }
        Ok(Self {
            current: Zeroizing::new(current.to_owned()),
            new: Zeroizing::new(new.to_owned()),
        })
    }

    /// Password the caller claims is current.
    pub fn current(&self) -> &str {
        self.current.as_str()
    }

    /// Replacement password.
    pub fn new_password(&self) -> &str {
        self.new.as_str()
    }
}

/// Claims carried inside a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: AccountId,
    pub role: Role,
    /// Issued-at, seconds since the Unix epoch.
    pub iat: i64,
    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
}

/// Authenticated caller extracted from a verified token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub account_id: AccountId,
    pub role: Role,
}

impl From<TokenClaims> for Principal {
    fn from(claims: TokenClaims) -> Self {
        Self {
            account_id: claims.sub,
            role: claims.role,
        }
    }
}

/// Signed bearer token.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wrap an encoded token.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Encoded token string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}

/// Successful login payload.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoginOutcome {
    pub token: String,
    pub user: PublicProfile,
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "pw", LoginValidationError::EmptyEmail)]
    #[case("   ", "pw", LoginValidationError::EmptyEmail)]
    #[case("admin@school.test", "", LoginValidationError::EmptyPassword)]
    fn invalid_admin_credentials(
        #[case] email: &str,
        #[case] password: &str,
        #[case] expected: LoginValidationError,
    ) {
        let err = AdminCredentials::try_from_parts(email, password)
            .expect_err("invalid inputs must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn admin_password_keeps_whitespace() {
        let creds = AdminCredentials::try_from_parts("a@b.com", " pw ").expect("valid");
        assert_eq!(creds.password(), " pw ");
    }

    #[rstest]
    #[case(Some("STU0001"), Some("s@school.test"), StudentIdentifier::StudentId("STU0001".to_owned()))]
    #[case(Some("  "), Some(" S@School.test "), StudentIdentifier::Email("s@school.test".to_owned()))]
    #[case(None, Some("s@school.test"), StudentIdentifier::Email("s@school.test".to_owned()))]
    fn student_identifier_prefers_student_id(
        #[case] student_id: Option<&str>,
        #[case] email: Option<&str>,
        #[case] expected: StudentIdentifier,
    ) {
        let creds =
            StudentCredentials::try_from_parts(student_id, email, "secret").expect("valid");
        assert_eq!(creds.identifier(), &expected);
    }

    #[rstest]
    #[case(None, None, "secret")]
    #[case(Some("STU0001"), None, "")]
    fn student_credentials_require_identifier_and_password(
        #[case] student_id: Option<&str>,
        #[case] email: Option<&str>,
        #[case] password: &str,
    ) {
        let err = StudentCredentials::try_from_parts(student_id, email, password)
            .expect_err("must fail");
        assert_eq!(err.to_string(), "Student ID/Email and password are required");
    }

    #[rstest]
    #[case(None, Some("newpass"), LoginValidationError::MissingPasswords)]
    #[case(Some("old"), Some(""), LoginValidationError::MissingPasswords)]
    #[case(Some("old"), Some("12345"), LoginValidationError::NewPasswordTooShort { min: 6 })]
    fn invalid_password_change(
        #[case] current: Option<&str>,
        #[case] new: Option<&str>,
        #[case] expected: LoginValidationError,
    ) {
        assert_eq!(PasswordChange::try_from_parts(current, new), Err(expected));
    }

    #[rstest]
    fn short_password_message_matches_client_copy() {
        let err = LoginValidationError::NewPasswordTooShort { min: 6 };
        assert_eq!(
            err.to_string(),
            "New password must be at least 6 characters long"
        );
    }

    #[rstest]
    fn session_token_debug_is_redacted() {
        let token = SessionToken::new("header.payload.signature");
        assert_eq!(format!("{token:?}"), "SessionToken(<redacted>)");
    }
}
