//! Account data model shared by administrators and students.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Maximum length of a student's display name.
pub const STUDENT_NAME_MAX: usize = 100;
/// Minimum length of a plain-text password.
pub const PASSWORD_MIN_LENGTH: usize = 6;
/// Largest number representable in the `STU####` format.
pub const STUDENT_NUMBER_MAX: u32 = 9_999;

/// Validation errors raised while building account values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountValidationError {
    InvalidId,
    EmptyEmail,
    InvalidEmail,
    InvalidStudentId,
    StudentNumberExhausted,
    InvalidMobile,
    InvalidBloodGroup(String),
    InvalidRole(String),
    EmptyName,
    NameTooLong { max: usize },
    EmptyStandard,
    PasswordTooShort { min: usize },
}

impl fmt::Display for AccountValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId => write!(f, "account id must be a valid UUID"),
            Self::EmptyEmail => write!(f, "Email is required"),
            Self::InvalidEmail => write!(f, "Please enter a valid email"),
            Self::InvalidStudentId => write!(f, "Invalid student ID format"),
            Self::StudentNumberExhausted => write!(f, "no student IDs left in the STU#### range"),
            Self::InvalidMobile => write!(f, "Please enter a valid 10-digit mobile number"),
            Self::InvalidBloodGroup(value) => write!(f, "`{value}` is not a valid blood group"),
            Self::InvalidRole(value) => write!(f, "`{value}` is not a valid role"),
            Self::EmptyName => write!(f, "Name is required"),
            Self::NameTooLong { max } => write!(f, "Name cannot exceed {max} characters"),
            Self::EmptyStandard => write!(f, "Standard is required"),
            Self::PasswordTooShort { min } => {
                write!(f, "Password must be at least {min} characters")
            }
        }
    }
}

impl std::error::Error for AccountValidationError {}

/// Stable account identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(Uuid);

impl AccountId {
    /// Parse an identifier from its string form.
    pub fn new(id: impl AsRef<str>) -> Result<Self, AccountValidationError> {
        Uuid::parse_str(id.as_ref().trim())
            .map(Self)
            .map_err(|_| AccountValidationError::InvalidId)
    }

    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Account role discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Student,
}

impl Role {
    /// Lowercase wire and storage form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Student => "student",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AccountValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "student" => Ok(Self::Student),
            other => Err(AccountValidationError::InvalidRole(other.to_owned())),
        }
    }
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9_]+([.-]?[A-Za-z0-9_]+)*@[A-Za-z0-9_]+([.-]?[A-Za-z0-9_]+)*(\.[A-Za-z0-9_]{2,})+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Normalised email address: trimmed, lowercased and pattern checked.
///
/// # Examples
/// ```
/// use institute::domain::EmailAddress;
///
/// let email = EmailAddress::parse("  Ada@Example.COM ").unwrap();
/// assert_eq!(email.as_ref(), "ada@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Normalise and validate raw input.
    pub fn parse(raw: &str) -> Result<Self, AccountValidationError> {
        let normalised = normalise_email(raw);
        if normalised.is_empty() {
            return Err(AccountValidationError::EmptyEmail);
        }
        if !email_regex().is_match(&normalised) {
            return Err(AccountValidationError::InvalidEmail);
        }
        Ok(Self(normalised))
    }
}

/// Trim and lowercase an email without validating its shape.
pub fn normalise_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = AccountValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

static STUDENT_ID_RE: OnceLock<Regex> = OnceLock::new();

fn student_id_regex() -> &'static Regex {
    STUDENT_ID_RE.get_or_init(|| {
        Regex::new(r"^STU\d{4}$")
            .unwrap_or_else(|error| panic!("student id regex failed to compile: {error}"))
    })
}

/// Student identifier in the `STU####` format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StudentId(String);

impl StudentId {
    /// Validate a raw identifier.
    pub fn parse(raw: &str) -> Result<Self, AccountValidationError> {
        let trimmed = raw.trim();
        if !student_id_regex().is_match(trimmed) {
            return Err(AccountValidationError::InvalidStudentId);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Format a sequence number as `STU####`.
    ///
    /// # Examples
    /// ```
    /// use institute::domain::StudentId;
    ///
    /// assert_eq!(StudentId::from_number(7).unwrap().as_ref(), "STU0007");
    /// assert!(StudentId::from_number(10_000).is_err());
    /// ```
    pub fn from_number(number: u32) -> Result<Self, AccountValidationError> {
        if number == 0 || number > STUDENT_NUMBER_MAX {
            return Err(AccountValidationError::StudentNumberExhausted);
        }
        Ok(Self(format!("STU{number:04}")))
    }

    /// Numeric part of the identifier.
    pub fn number(&self) -> u32 {
        self.0
            .strip_prefix("STU")
            .and_then(|digits| digits.parse().ok())
            .unwrap_or_default()
    }
}

impl AsRef<str> for StudentId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<StudentId> for String {
    fn from(value: StudentId) -> Self {
        value.0
    }
}

impl TryFrom<String> for StudentId {
    type Error = AccountValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

/// Ten-digit mobile number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MobileNumber(String);

impl MobileNumber {
    /// Validate a raw number after trimming.
    pub fn parse(raw: &str) -> Result<Self, AccountValidationError> {
        let trimmed = raw.trim();
        if trimmed.len() != 10 || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AccountValidationError::InvalidMobile);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for MobileNumber {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<MobileNumber> for String {
    fn from(value: MobileNumber) -> Self {
        value.0
    }
}

impl TryFrom<String> for MobileNumber {
    type Error = AccountValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

/// ABO/Rh blood group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum BloodGroup {
    #[serde(rename = "A+")]
    APositive,
    #[serde(rename = "A-")]
    ANegative,
    #[serde(rename = "B+")]
    BPositive,
    #[serde(rename = "B-")]
    BNegative,
    #[serde(rename = "AB+")]
    AbPositive,
    #[serde(rename = "AB-")]
    AbNegative,
    #[serde(rename = "O+")]
    OPositive,
    #[serde(rename = "O-")]
    ONegative,
}

impl BloodGroup {
    /// Canonical notation, e.g. `AB+`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::APositive => "A+",
            Self::ANegative => "A-",
            Self::BPositive => "B+",
            Self::BNegative => "B-",
            Self::AbPositive => "AB+",
            Self::AbNegative => "AB-",
            Self::OPositive => "O+",
            Self::ONegative => "O-",
        }
    }
}

impl FromStr for BloodGroup {
    type Err = AccountValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "A+" => Ok(Self::APositive),
            "A-" => Ok(Self::ANegative),
            "B+" => Ok(Self::BPositive),
            "B-" => Ok(Self::BNegative),
            "AB+" => Ok(Self::AbPositive),
            "AB-" => Ok(Self::AbNegative),
            "O+" => Ok(Self::OPositive),
            "O-" => Ok(Self::ONegative),
            _ => Err(AccountValidationError::InvalidBloodGroup(s.to_owned())),
        }
    }
}

/// Opaque Argon2 PHC string. Never serialised.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap an already-computed PHC string.
    pub fn from_phc(phc: impl Into<String>) -> Self {
        Self(phc.into())
    }

    /// PHC string for storage and verification.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

/// Check the minimum password length before hashing.
pub fn validate_password_strength(password: &str) -> Result<(), AccountValidationError> {
    if password.chars().count() < PASSWORD_MIN_LENGTH {
        return Err(AccountValidationError::PasswordTooShort {
            min: PASSWORD_MIN_LENGTH,
        });
    }
    Ok(())
}

/// Profile fields required for student accounts.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentProfile {
    pub name: String,
    pub mobile: MobileNumber,
    pub blood_group: BloodGroup,
    pub standard: String,
    pub date_of_birth: Option<NaiveDate>,
    pub address: Option<String>,
}

impl StudentProfile {
    /// Validate and build a profile.
    pub fn new(
        name: &str,
        mobile: MobileNumber,
        blood_group: BloodGroup,
        standard: &str,
    ) -> Result<Self, AccountValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AccountValidationError::EmptyName);
        }
        if name.chars().count() > STUDENT_NAME_MAX {
            return Err(AccountValidationError::NameTooLong {
                max: STUDENT_NAME_MAX,
            });
        }
        let standard = standard.trim();
        if standard.is_empty() {
            return Err(AccountValidationError::EmptyStandard);
        }
        Ok(Self {
            name: name.to_owned(),
            mobile,
            blood_group,
            standard: standard.to_owned(),
            date_of_birth: None,
            address: None,
        })
    }

    /// Attach the optional date of birth.
    pub fn with_date_of_birth(mut self, date_of_birth: Option<NaiveDate>) -> Self {
        self.date_of_birth = date_of_birth;
        self
    }

    /// Attach the optional postal address.
    pub fn with_address(mut self, address: Option<String>) -> Self {
        self.address = address;
        self
    }
}

/// Stored account.
///
/// ## Invariants
/// - `email` is unique and lowercase.
/// - `student` and `student_id` are present exactly when `role` is
///   [`Role::Student`].
/// - `password_hash` is never exposed outside persistence and the hasher.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: AccountId,
    pub email: EmailAddress,
    pub role: Role,
    pub password_hash: PasswordHash,
    pub student_id: Option<StudentId>,
    pub student: Option<StudentProfile>,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Build a new administrator account.
    pub fn new_admin(email: EmailAddress, password_hash: PasswordHash, now: DateTime<Utc>) -> Self {
        Self {
            id: AccountId::random(),
            email,
            role: Role::Admin,
            password_hash,
            student_id: None,
            student: None,
            is_active: true,
            last_login: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Build a new active student account.
    pub fn new_student(
        email: EmailAddress,
        password_hash: PasswordHash,
        student_id: StudentId,
        profile: StudentProfile,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: AccountId::random(),
            email,
            role: Role::Student,
            password_hash,
            student_id: Some(student_id),
            student: Some(profile),
            is_active: true,
            last_login: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Redacted account projection returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfile {
    #[schema(value_type = String, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: Uuid,
    #[schema(value_type = String, example = "student@example.com")]
    pub email: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "STU0001")]
    pub student_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blood_group: Option<BloodGroup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standard: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Account> for PublicProfile {
    fn from(account: &Account) -> Self {
        let student = account.student.as_ref();
        Self {
            id: *account.id.as_uuid(),
            email: account.email.to_string(),
            role: account.role,
            student_id: account.student_id.as_ref().map(ToString::to_string),
            name: student.map(|s| s.name.clone()),
            mobile: student.map(|s| s.mobile.as_ref().to_owned()),
            blood_group: student.map(|s| s.blood_group),
            standard: student.map(|s| s.standard.clone()),
            date_of_birth: student.and_then(|s| s.date_of_birth),
            address: student.and_then(|s| s.address.clone()),
            is_active: account.is_active,
            last_login: account.last_login,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

/// Student population counters for the admin dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountStats {
    pub total_students: u64,
    pub active_students: u64,
    pub inactive_students: u64,
    pub recent_logins: u64,
}
