//! Shared helpers for unit tests across the crate.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use crate::domain::ports::{FixturePasswordHasher, PasswordHasher};
use crate::domain::{
    Account, AdmissionForm, BloodGroup, EmailAddress, MobileNumber, StudentId, StudentProfile,
};

/// Clock pinned to a single instant.
pub struct FixedClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

/// Timestamp used by most fixtures.
pub fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 9, 15, 0)
        .single()
        .expect("valid fixture timestamp")
}

/// Clock returning [`fixture_timestamp`].
pub fn fixed_clock() -> Arc<dyn Clock> {
    clock_at(fixture_timestamp())
}

/// Clock returning `utc_now`.
pub fn clock_at(utc_now: DateTime<Utc>) -> Arc<dyn Clock> {
    Arc::new(FixedClock { utc_now })
}

/// Form with every field a student account needs.
pub fn complete_form(email: &str) -> AdmissionForm {
    AdmissionForm {
        first_name: Some("Ada".to_owned()),
        last_name: Some("Lovelace".to_owned()),
        email: Some(email.to_owned()),
        phone: Some("9876543210".to_owned()),
        blood_group: Some("O+".to_owned()),
        course: Some("Class 10".to_owned()),
        ..AdmissionForm::default()
    }
}

/// Active student account whose password is `password` under
/// [`FixturePasswordHasher`].
pub fn student_account(number: u32, email: &str, password: &str) -> Account {
    let profile = StudentProfile::new(
        "Ada Lovelace",
        MobileNumber::parse("9876543210").expect("mobile"),
        BloodGroup::OPositive,
        "Class 10",
    )
    .expect("profile");
    Account::new_student(
        EmailAddress::parse(email).expect("email"),
        FixturePasswordHasher.hash(password).expect("hash"),
        StudentId::from_number(number).expect("student id"),
        profile,
        fixture_timestamp(),
    )
}

/// Active admin account whose password is `password` under
/// [`FixturePasswordHasher`].
pub fn admin_account(email: &str, password: &str) -> Account {
    Account::new_admin(
        EmailAddress::parse(email).expect("email"),
        FixturePasswordHasher.hash(password).expect("hash"),
        fixture_timestamp(),
    )
}
