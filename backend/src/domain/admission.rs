//! Admission application data model.
//!
//! An application moves from [`AdmissionStatus::Pending`] to one of the two
//! terminal states. Raw input arrives as an [`AdmissionForm`] and is turned
//! into a sanitised [`NewAdmission`] before any storage is touched.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use super::account::{BloodGroup, EmailAddress, StudentId};
use super::sanitize::{sanitize_optional, sanitize_text};

/// Message returned when any mandatory applicant field is absent.
pub const MISSING_REQUIRED_FIELDS: &str =
    "Missing required fields: firstName, lastName, email, or phone";

/// Window used for the "recent applications" counter.
pub const RECENT_WINDOW_DAYS: i64 = 30;

/// Validation failures for admission input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdmissionValidationError {
    MissingRequiredFields,
    InvalidEmail,
    InvalidBloodGroup(String),
    InvalidStatus(String),
    InvalidId,
}

impl fmt::Display for AdmissionValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingRequiredFields => f.write_str(MISSING_REQUIRED_FIELDS),
            Self::InvalidEmail => write!(f, "Please provide a valid email address"),
            Self::InvalidBloodGroup(value) => {
                write!(f, "`{value}` is not a valid blood group")
            }
            Self::InvalidStatus(value) => write!(f, "`{value}` is not a valid admission status"),
            Self::InvalidId => write!(f, "admission id must be a valid UUID"),
        }
    }
}

impl std::error::Error for AdmissionValidationError {}

/// Stable admission identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdmissionId(Uuid);

impl AdmissionId {
    /// Parse an identifier from its string form.
    pub fn new(id: impl AsRef<str>) -> Result<Self, AdmissionValidationError> {
        Uuid::parse_str(id.as_ref().trim())
            .map(Self)
            .map_err(|_| AdmissionValidationError::InvalidId)
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

impl fmt::Display for AdmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Review state of an application.
///
/// `approved` is accepted as an input alias of `accepted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AdmissionStatus {
    Pending,
    #[serde(alias = "approved")]
    Accepted,
    Rejected,
}

impl AdmissionStatus {
    /// Lowercase wire and storage form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }

    /// Whether no further decision may be applied.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for AdmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdmissionStatus {
    type Err = AdmissionValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "accepted" | "approved" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            _ => Err(AdmissionValidationError::InvalidStatus(s.to_owned())),
        }
    }
}

/// Accept strings, numbers and booleans as text; anything else becomes `None`.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(text)) => Some(text),
        Some(Value::Number(number)) => Some(number.to_string()),
        Some(Value::Bool(flag)) => Some(flag.to_string()),
        _ => None,
    })
}

/// Raw admission form as submitted by the client.
///
/// Every field is optional here; [`NewAdmission::from_form`] enforces the
/// required ones.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct AdmissionForm {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub blood_group: Option<String>,
    pub nationality: Option<String>,
    pub email: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub phone: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub alternate_phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub pincode: Option<String>,
    pub course: Option<String>,
    pub previous_school: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub previous_percentage: Option<String>,
    pub board_of_study: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub year_of_passing: Option<String>,
    pub father_name: Option<String>,
    pub father_occupation: Option<String>,
    pub mother_name: Option<String>,
    pub mother_occupation: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub guardian_phone: Option<String>,
    pub extracurricular: Option<String>,
    pub medical_history: Option<String>,
    pub special_requirements: Option<String>,
}

impl AdmissionForm {
    /// Assign a text field by its camelCase form name.
    ///
    /// Returns `false` when the name is not part of the form.
    pub fn set_field(&mut self, name: &str, value: String) -> bool {
        let slot = match name {
            "firstName" => &mut self.first_name,
            "lastName" => &mut self.last_name,
            "dateOfBirth" => &mut self.date_of_birth,
            "gender" => &mut self.gender,
            "bloodGroup" => &mut self.blood_group,
            "nationality" => &mut self.nationality,
            "email" => &mut self.email,
            "phone" => &mut self.phone,
            "alternatePhone" => &mut self.alternate_phone,
            "address" => &mut self.address,
            "city" => &mut self.city,
            "state" => &mut self.state,
            "pincode" => &mut self.pincode,
            "course" => &mut self.course,
            "previousSchool" => &mut self.previous_school,
            "previousPercentage" => &mut self.previous_percentage,
            "boardOfStudy" => &mut self.board_of_study,
            "yearOfPassing" => &mut self.year_of_passing,
            "fatherName" => &mut self.father_name,
            "fatherOccupation" => &mut self.father_occupation,
            "motherName" => &mut self.mother_name,
            "motherOccupation" => &mut self.mother_occupation,
            "guardianPhone" => &mut self.guardian_phone,
            "extracurricular" => &mut self.extracurricular,
            "medicalHistory" => &mut self.medical_history,
            "specialRequirements" => &mut self.special_requirements,
            _ => return false,
        };
        *slot = Some(value);
        true
    }
}

/// Reference to a stored supporting document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DocumentDescriptor {
    /// Form tag the file was attached under, e.g. `photo`.
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
    pub public_id: String,
    pub name: String,
}

/// Identity and contact details of the applicant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Applicant {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub blood_group: Option<BloodGroup>,
    pub nationality: Option<String>,
    #[schema(value_type = String, example = "applicant@example.com")]
    pub email: EmailAddress,
    pub phone: String,
    pub alternate_phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
}

impl Applicant {
    /// Full display name.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Prior schooling.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AcademicHistory {
    pub course: Option<String>,
    pub previous_school: Option<String>,
    pub previous_percentage: Option<f64>,
    pub board_of_study: Option<String>,
    pub year_of_passing: Option<i32>,
}

/// Parent and guardian details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Guardians {
    pub father_name: Option<String>,
    pub father_occupation: Option<String>,
    pub mother_name: Option<String>,
    pub mother_occupation: Option<String>,
    pub guardian_phone: Option<String>,
}

/// Free-form extra information.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalInfo {
    pub extracurricular: Option<String>,
    pub medical_history: Option<String>,
    pub special_requirements: Option<String>,
}

/// Sanitised application ready to be stored.
///
/// ## Invariants
/// - first name, last name, email and phone are present and non-blank.
/// - every free-text value has passed through [`sanitize_text`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewAdmission {
    #[serde(flatten)]
    pub applicant: Applicant,
    #[serde(flatten)]
    pub academics: AcademicHistory,
    #[serde(flatten)]
    pub guardians: Guardians,
    #[serde(flatten)]
    pub additional: AdditionalInfo,
    pub documents: Vec<DocumentDescriptor>,
}

fn trimmed(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
    let raw = raw?.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|timestamp| timestamp.date_naive())
        })
}

fn parse_number<T: FromStr>(raw: Option<&str>) -> Option<T> {
    raw.and_then(|value| value.trim().parse().ok())
}

impl NewAdmission {
    /// Validate and sanitise a raw form.
    ///
    /// # Examples
    /// ```
    /// use institute::domain::{AdmissionForm, NewAdmission};
    ///
    /// let form = AdmissionForm {
    ///     first_name: Some("A".into()),
    ///     last_name: Some("B".into()),
    ///     email: Some(" A@B.com ".into()),
    ///     phone: Some("1234567890".into()),
    ///     previous_percentage: Some("n/a".into()),
    ///     ..AdmissionForm::default()
    /// };
    /// let admission = NewAdmission::from_form(&form).unwrap();
    /// assert_eq!(admission.applicant.email.as_ref(), "a@b.com");
    /// assert_eq!(admission.academics.previous_percentage, None);
    /// ```
    pub fn from_form(form: &AdmissionForm) -> Result<Self, AdmissionValidationError> {
        let first_name = sanitize_optional(form.first_name.as_deref());
        let last_name = sanitize_optional(form.last_name.as_deref());
        let email = trimmed(form.email.as_deref());
        let phone = trimmed(form.phone.as_deref());
        let (Some(first_name), Some(last_name), Some(email), Some(phone)) =
            (first_name, last_name, email, phone)
        else {
            return Err(AdmissionValidationError::MissingRequiredFields);
        };
        let email =
            EmailAddress::parse(&email).map_err(|_| AdmissionValidationError::InvalidEmail)?;
        let blood_group = sanitize_optional(form.blood_group.as_deref())
            .map(|raw| {
                raw.parse::<BloodGroup>()
                    .map_err(|_| AdmissionValidationError::InvalidBloodGroup(raw))
            })
            .transpose()?;

        Ok(Self {
            applicant: Applicant {
                first_name,
                last_name,
                date_of_birth: parse_date(form.date_of_birth.as_deref()),
                gender: sanitize_optional(form.gender.as_deref()),
                blood_group,
                nationality: sanitize_optional(form.nationality.as_deref()),
                email,
                phone,
                alternate_phone: trimmed(form.alternate_phone.as_deref()),
                address: sanitize_optional(form.address.as_deref()),
                city: sanitize_optional(form.city.as_deref()),
                state: sanitize_optional(form.state.as_deref()),
                pincode: sanitize_optional(form.pincode.as_deref()),
            },
            academics: AcademicHistory {
                course: sanitize_optional(form.course.as_deref()),
                previous_school: sanitize_optional(form.previous_school.as_deref()),
                previous_percentage: parse_number(form.previous_percentage.as_deref()),
                board_of_study: sanitize_optional(form.board_of_study.as_deref()),
                year_of_passing: parse_number(form.year_of_passing.as_deref()),
            },
            guardians: Guardians {
                father_name: sanitize_optional(form.father_name.as_deref()),
                father_occupation: sanitize_optional(form.father_occupation.as_deref()),
                mother_name: sanitize_optional(form.mother_name.as_deref()),
                mother_occupation: sanitize_optional(form.mother_occupation.as_deref()),
                guardian_phone: trimmed(form.guardian_phone.as_deref()),
            },
            additional: AdditionalInfo {
                extracurricular: sanitize_optional(form.extracurricular.as_deref()),
                medical_history: sanitize_optional(form.medical_history.as_deref()),
                special_requirements: sanitize_optional(form.special_requirements.as_deref()),
            },
            documents: Vec::new(),
        })
    }
}

/// Stored admission application.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Admission {
    #[schema(value_type = String)]
    pub id: AdmissionId,
    #[serde(flatten)]
    pub details: NewAdmission,
    pub status: AdmissionStatus,
    pub submitted_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    #[schema(value_type = Option<String>, example = "STU0001")]
    pub student_id: Option<StudentId>,
    pub rejection_reason: Option<String>,
}

impl Admission {
    /// Create a pending application submitted at `now`.
    pub fn submit(details: NewAdmission, now: DateTime<Utc>) -> Self {
        Self {
            id: AdmissionId::random(),
            details,
            status: AdmissionStatus::Pending,
            submitted_at: now,
            processed_at: None,
            student_id: None,
            rejection_reason: None,
        }
    }

    /// Normalised applicant email.
    pub fn email(&self) -> &EmailAddress {
        &self.details.applicant.email
    }
}

/// Outcome of an admin decision, persisted on the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdmissionDecision {
    pub status: AdmissionStatus,
    pub processed_at: DateTime<Utc>,
    pub student_id: Option<StudentId>,
    pub rejection_reason: Option<String>,
}

/// Receipt returned after a successful submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    #[schema(value_type = String)]
    pub application_id: AdmissionId,
    pub submitted_at: DateTime<Utc>,
    pub status: AdmissionStatus,
}

impl From<&Admission> for SubmissionReceipt {
    fn from(admission: &Admission) -> Self {
        Self {
            application_id: admission.id,
            submitted_at: admission.submitted_at,
            status: admission.status,
        }
    }
}

/// Public status projection.
///
/// `student_id` is disclosed only for accepted applications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionStatusView {
    pub status: AdmissionStatus,
    pub submitted_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<DateTime<Utc>>,
    #[serde(rename = "student_id", skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
}

impl From<&Admission> for AdmissionStatusView {
    fn from(admission: &Admission) -> Self {
        let student_id = match admission.status {
            AdmissionStatus::Accepted => admission.student_id.as_ref().map(ToString::to_string),
            AdmissionStatus::Pending | AdmissionStatus::Rejected => None,
        };
        Self {
            status: admission.status,
            submitted_at: admission.submitted_at,
            processed_at: admission.processed_at,
            student_id,
        }
    }
}

/// Filters for the admin application listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdmissionFilter {
    pub status: Option<AdmissionStatus>,
    /// Case-insensitive match against names, email and phone.
    pub search: Option<String>,
}

impl AdmissionFilter {
    /// Whether `admission` satisfies the filter.
    pub fn matches(&self, admission: &Admission) -> bool {
        if self.status.is_some_and(|status| status != admission.status) {
            return false;
        }
        let Some(needle) = self.search.as_deref().map(str::to_lowercase) else {
            return true;
        };
        let applicant = &admission.details.applicant;
        [
            applicant.first_name.as_str(),
            applicant.last_name.as_str(),
            applicant.email.as_ref(),
            applicant.phone.as_str(),
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// Application counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct AdmissionStats {
    pub total: u64,
    pub pending: u64,
    pub accepted: u64,
    pub rejected: u64,
    /// Applications submitted since the cut-off passed to [`Self::tally`].
    pub recent: u64,
}

impl AdmissionStats {
    /// Count applications by status and submission recency.
    ///
    /// # Examples
    /// ```
    /// use chrono::{Duration, Utc};
    /// use institute::domain::{AdmissionStats, AdmissionStatus};
    ///
    /// let now = Utc::now();
    /// let rows = [
    ///     (AdmissionStatus::Pending, now),
    ///     (AdmissionStatus::Accepted, now - Duration::days(60)),
    /// ];
    /// let stats = AdmissionStats::tally(rows, now - Duration::days(30));
    /// assert_eq!((stats.total, stats.pending, stats.accepted, stats.recent), (2, 1, 1, 1));
    /// ```
    pub fn tally<I>(rows: I, since: DateTime<Utc>) -> Self
    where
        I: IntoIterator<Item = (AdmissionStatus, DateTime<Utc>)>,
    {
        rows.into_iter()
            .fold(Self::default(), |mut stats, (status, submitted_at)| {
                stats.total += 1;
                match status {
                    AdmissionStatus::Pending => stats.pending += 1,
                    AdmissionStatus::Accepted => stats.accepted += 1,
                    AdmissionStatus::Rejected => stats.rejected += 1,
                }
                if submitted_at >= since {
                    stats.recent += 1;
                }
                stats
            })
    }
}

/// Check the minimal email shape accepted by the public status lookup.
pub fn looks_like_email(raw: &str) -> bool {
    raw.contains('@')
}

/// Sanitise a free-text admin note such as a rejection reason.
pub fn sanitize_note(raw: Option<&str>) -> Option<String> {
    raw.and_then(sanitize_text)
}

#[cfg(test)]
#[path = "admission_tests.rs"]
mod tests;
