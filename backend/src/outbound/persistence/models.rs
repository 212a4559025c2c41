//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{accounts, admissions};

// ---------------------------------------------------------------------------
// Account models
// ---------------------------------------------------------------------------

/// Row struct for reading from the accounts table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = accounts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AccountRow {
    pub id: Uuid,
    pub email: String,
    pub role: String,
    pub password_hash: String,
    pub student_id: Option<String>,
    pub name: Option<String>,
    pub mobile: Option<String>,
    pub blood_group: Option<String>,
    pub standard: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub address: Option<String>,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating account records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = accounts)]
pub(crate) struct NewAccountRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub role: &'a str,
    pub password_hash: &'a str,
    pub student_id: Option<&'a str>,
    pub name: Option<&'a str>,
    pub mobile: Option<&'a str>,
    pub blood_group: Option<&'a str>,
    pub standard: Option<&'a str>,
    pub date_of_birth: Option<NaiveDate>,
    pub address: Option<&'a str>,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Admission models
// ---------------------------------------------------------------------------

/// Row struct for reading from the admissions table.
///
/// The applicant columns exist for search and the email unique index; reads
/// rebuild the applicant from `details`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = admissions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AdmissionRow {
    pub id: Uuid,
    pub status: String,
    pub details: serde_json::Value,
    pub submitted_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    pub student_id: Option<String>,
    pub rejection_reason: Option<String>,
}

/// Insertable struct for creating admission records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = admissions)]
pub(crate) struct NewAdmissionRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub phone: &'a str,
    pub status: &'a str,
    pub details: &'a serde_json::Value,
    pub submitted_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    pub student_id: Option<&'a str>,
    pub rejection_reason: Option<&'a str>,
}

/// Changeset written when an admin decides an application.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = admissions)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct AdmissionDecisionUpdate<'a> {
    pub status: &'a str,
    pub processed_at: Option<DateTime<Utc>>,
    pub student_id: Option<&'a str>,
    pub rejection_reason: Option<&'a str>,
}
