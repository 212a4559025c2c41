//! Provisioning of student accounts from accepted applications.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{
    AccountRepository, PasswordHasher, ProvisionedStudent, StudentProvisioning,
};
use crate::domain::service_support::{create_student_account, generate_password};
use crate::domain::{Admission, Error, MobileNumber, StudentId, StudentProfile};

/// Creates student accounts through the account repository.
#[derive(Clone)]
pub struct AccountStudentProvisioner<A, H> {
    accounts: Arc<A>,
    hasher: Arc<H>,
    clock: Arc<dyn Clock>,
}

impl<A, H> AccountStudentProvisioner<A, H> {
    /// Create the provisioner.
    pub fn new(accounts: Arc<A>, hasher: Arc<H>, clock: Arc<dyn Clock>) -> Self {
        Self {
            accounts,
            hasher,
            clock,
        }
    }
}

/// Build the student profile an application implies.
///
/// The applicant's full name becomes the student name, the primary phone the
/// mobile number and the requested course the standard.
pub fn profile_from_admission(admission: &Admission) -> Result<StudentProfile, Error> {
    let applicant = &admission.details.applicant;
    let mobile = MobileNumber::parse(&applicant.phone).map_err(|_| {
        Error::invalid_request("Applicant phone must be a 10-digit mobile number")
    })?;
    let blood_group = applicant.blood_group.ok_or_else(|| {
        Error::invalid_request("Applicant blood group is required to create a student account")
    })?;
    let standard = admission.details.academics.course.as_deref().ok_or_else(|| {
        Error::invalid_request("Applicant course is required to create a student account")
    })?;
    let profile = StudentProfile::new(&applicant.full_name(), mobile, blood_group, standard)
        .map_err(|err| Error::invalid_request(err.to_string()))?;
    Ok(profile
        .with_date_of_birth(applicant.date_of_birth)
        .with_address(applicant.address.clone()))
}

#[async_trait]
impl<A, H> StudentProvisioning for AccountStudentProvisioner<A, H>
where
    A: AccountRepository,
    H: PasswordHasher,
{
    async fn provision(&self, admission: &Admission) -> Result<ProvisionedStudent, Error> {
        let profile = profile_from_admission(admission)?;
        let password = generate_password();
        let account = create_student_account(
            self.accounts.as_ref(),
            self.hasher.as_ref(),
            admission.email().clone(),
            password.as_str(),
            profile,
            self.clock.utc(),
        )
        .await?;
        let student_id: StudentId = account
            .student_id
            .clone()
            .ok_or_else(|| Error::internal("student account missing student id"))?;
        info!(account_id = %account.id, %student_id, "student account provisioned");
        Ok(ProvisionedStudent {
            account_id: account.id,
            student_id,
            email: account.email.to_string(),
            initial_password: password,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{FixturePasswordHasher, MockAccountRepository};
    use crate::domain::{AdmissionForm, ErrorCode, NewAdmission, Role};
    use crate::test_support::{complete_form, fixed_clock, fixture_timestamp};
    use rstest::rstest;

    fn admission(form: AdmissionForm) -> Admission {
        Admission::submit(
            NewAdmission::from_form(&form).expect("form"),
            fixture_timestamp(),
        )
    }

    #[rstest]
    #[case::phone(AdmissionForm { phone: Some("12345".to_owned()), ..complete_form("ada@school.test") })]
    #[case::blood_group(AdmissionForm { blood_group: None, ..complete_form("ada@school.test") })]
    #[case::course(AdmissionForm { course: None, ..complete_form("ada@school.test") })]
    fn incomplete_applications_cannot_form_profiles(#[case] form: AdmissionForm) {
        let err = profile_from_admission(&admission(form)).expect_err("incomplete");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    fn profile_uses_full_name_and_course() {
        let profile =
            profile_from_admission(&admission(complete_form("ada@school.test"))).expect("profile");
        assert_eq!(profile.name, "Ada Lovelace");
        assert_eq!(profile.standard, "Class 10");
    }

    #[tokio::test]
    async fn provision_creates_student_with_generated_password() {
        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_find_by_email()
            .withf(|email, role| email == "ada@school.test" && *role == Role::Student)
            .times(1)
            .return_once(|_, _| Ok(None));
        accounts
            .expect_next_student_number()
            .times(1)
            .return_once(|| Ok(1));
        accounts
            .expect_insert()
            .withf(|account| account.role == Role::Student)
            .times(1)
            .return_once(|_| Ok(()));

        let provisioner = AccountStudentProvisioner::new(
            Arc::new(accounts),
            Arc::new(FixturePasswordHasher),
            fixed_clock(),
        );
        let student = provisioner
            .provision(&admission(complete_form("ada@school.test")))
            .await
            .expect("provisioned");
        assert_eq!(student.student_id.as_ref(), "STU0001");
        assert_eq!(student.email, "ada@school.test");
        assert_eq!(student.initial_password.len(), 10);
    }
}
