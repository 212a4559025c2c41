//! Admin management of student accounts.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use mockable::Clock;
use tracing::info;
use zeroize::Zeroizing;

use crate::domain::ports::{
    AccountRepository, CreatedStudent, NewStudentRequest, PasswordHasher, StudentAdministration,
};
use crate::domain::service_support::{
    create_student_account, generate_password, map_account_repository_error,
    map_account_validation,
};
use crate::domain::{
    Account, BloodGroup, EmailAddress, Error, MobileNumber, Page, PageRequest, PublicProfile,
    Role, StudentProfile, sanitize_optional, validate_password_strength,
};

/// Message returned when no student matches the identifier.
pub const STUDENT_NOT_FOUND: &str = "Student not found";

/// Student administration service implementing [`StudentAdministration`].
#[derive(Clone)]
pub struct StudentAdminService<A, H> {
    accounts: Arc<A>,
    hasher: Arc<H>,
    clock: Arc<dyn Clock>,
}

impl<A, H> StudentAdminService<A, H> {
    /// Create the service.
    pub fn new(accounts: Arc<A>, hasher: Arc<H>, clock: Arc<dyn Clock>) -> Self {
        Self {
            accounts,
            hasher,
            clock,
        }
    }
}

fn required<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str, Error> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| Error::invalid_request(format!("{field} is required")))
}

fn profile_from_request(request: &NewStudentRequest) -> Result<StudentProfile, Error> {
    let name = required(request.name.as_deref(), "Name")?;
    let mobile = MobileNumber::parse(required(request.mobile.as_deref(), "Mobile")?)
        .map_err(|err| map_account_validation(&err))?;
    let blood_group: BloodGroup = required(request.blood_group.as_deref(), "Blood group")?
        .parse()
        .map_err(|err| map_account_validation(&err))?;
    let standard = required(request.standard.as_deref(), "Standard")?;
    let date_of_birth = request
        .date_of_birth
        .as_deref()
        .and_then(|raw| NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok());
    let profile = StudentProfile::new(name, mobile, blood_group, standard)
        .map_err(|err| map_account_validation(&err))?;
    Ok(profile
        .with_date_of_birth(date_of_birth)
        .with_address(sanitize_optional(request.address.as_deref())))
}

impl<A, H> StudentAdminService<A, H>
where
    A: AccountRepository,
    H: PasswordHasher,
{
    async fn load(&self, student_id: &str) -> Result<Account, Error> {
        let normalised = student_id.trim().to_uppercase();
        self.accounts
            .find_by_student_id(&normalised)
            .await
            .map_err(map_account_repository_error)?
            .filter(|account| account.role == Role::Student)
            .ok_or_else(|| Error::not_found(STUDENT_NOT_FOUND))
    }
}

#[async_trait]
impl<A, H> StudentAdministration for StudentAdminService<A, H>
where
    A: AccountRepository,
    H: PasswordHasher,
{
    async fn list(
        &self,
        search: Option<String>,
        page: PageRequest,
    ) -> Result<Page<PublicProfile>, Error> {
        let search = search
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());
        let accounts = self
            .accounts
            .list_students(search, page)
            .await
            .map_err(map_account_repository_error)?;
        Ok(accounts.map(|account| PublicProfile::from(&account)))
    }

    async fn get(&self, student_id: &str) -> Result<PublicProfile, Error> {
        self.load(student_id)
            .await
            .map(|account| PublicProfile::from(&account))
    }

    async fn create(&self, request: NewStudentRequest) -> Result<CreatedStudent, Error> {
        let email = EmailAddress::parse(required(request.email.as_deref(), "Email")?)
            .map_err(|err| map_account_validation(&err))?;
        let profile = profile_from_request(&request)?;
        let (password, generated) = match request.password.as_deref() {
            Some(password) if !password.is_empty() => {
                validate_password_strength(password)
                    .map_err(|err| map_account_validation(&err))?;
                (Zeroizing::new(password.to_owned()), false)
            }
            _ => (generate_password(), true),
        };

        let account = create_student_account(
            self.accounts.as_ref(),
            self.hasher.as_ref(),
            email,
            password.as_str(),
            profile,
            self.clock.utc(),
        )
        .await?;
        info!(account_id = %account.id, "student account created by admin");
        Ok(CreatedStudent {
            user: PublicProfile::from(&account),
            initial_password: generated.then(|| password.as_str().to_owned()),
        })
    }

    async fn toggle_active(&self, student_id: &str) -> Result<PublicProfile, Error> {
        let account = self.load(student_id).await?;
        let updated = self
            .accounts
            .set_active(&account.id, !account.is_active, self.clock.utc())
            .await
            .map_err(map_account_repository_error)?
            .ok_or_else(|| Error::not_found(STUDENT_NOT_FOUND))?;
        info!(account_id = %updated.id, active = updated.is_active, "student status toggled");
        Ok(PublicProfile::from(&updated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{FixturePasswordHasher, MockAccountRepository};
    use crate::domain::{ErrorCode, paginate};
    use crate::test_support::{fixed_clock, student_account};
    use rstest::rstest;

    type Service = StudentAdminService<MockAccountRepository, FixturePasswordHasher>;

    fn make_service(accounts: MockAccountRepository) -> Service {
        StudentAdminService::new(
            Arc::new(accounts),
            Arc::new(FixturePasswordHasher),
            fixed_clock(),
        )
    }

    fn request() -> NewStudentRequest {
        NewStudentRequest {
            email: Some("grace@school.test".to_owned()),
            password: None,
            name: Some("Grace Hopper".to_owned()),
            mobile: Some("9123456780".to_owned()),
            blood_group: Some("b+".to_owned()),
            standard: Some("12".to_owned()),
            date_of_birth: Some("2007-12-09".to_owned()),
            address: None,
        }
    }

    #[tokio::test]
    async fn create_generates_password_when_absent() {
        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_find_by_email()
            .times(1)
            .return_once(|_, _| Ok(None));
        accounts
            .expect_next_student_number()
            .times(1)
            .return_once(|| Ok(7));
        accounts.expect_insert().times(1).return_once(|_| Ok(()));

        let created = make_service(accounts)
            .create(request())
            .await
            .expect("created");
        assert_eq!(created.user.student_id.as_deref(), Some("STU0007"));
        assert_eq!(created.user.blood_group, Some(BloodGroup::BPositive));
        assert!(created.initial_password.is_some());
    }

    #[tokio::test]
    async fn create_keeps_supplied_password_private() {
        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_find_by_email()
            .times(1)
            .return_once(|_, _| Ok(None));
        accounts
            .expect_next_student_number()
            .times(1)
            .return_once(|| Ok(1));
        accounts.expect_insert().times(1).return_once(|_| Ok(()));

        let created = make_service(accounts)
            .create(NewStudentRequest {
                password: Some("chosen1".to_owned()),
                ..request()
            })
            .await
            .expect("created");
        assert!(created.initial_password.is_none());
    }

    #[rstest]
    #[case::short_password(NewStudentRequest { password: Some("123".to_owned()), ..request() })]
    #[case::bad_mobile(NewStudentRequest { mobile: Some("12".to_owned()), ..request() })]
    #[case::missing_name(NewStudentRequest { name: None, ..request() })]
    #[case::bad_blood_group(NewStudentRequest { blood_group: Some("Q".to_owned()), ..request() })]
    #[case::bad_email(NewStudentRequest { email: Some("grace".to_owned()), ..request() })]
    #[tokio::test]
    async fn create_validates_input(#[case] invalid: NewStudentRequest) {
        let mut accounts = MockAccountRepository::new();
        accounts.expect_insert().never();
        let err = make_service(accounts)
            .create(invalid)
            .await
            .expect_err("invalid");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn toggle_flips_active_flag() {
        let student = student_account(3, "ada@school.test", "secret1");
        let mut toggled = student.clone();
        toggled.is_active = false;
        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_find_by_student_id()
            .withf(|id| id == "STU0003")
            .times(1)
            .return_once(move |_| Ok(Some(student)));
        accounts
            .expect_set_active()
            .withf(|_, active, _| !*active)
            .times(1)
            .return_once(move |_, _, _| Ok(Some(toggled)));

        let profile = make_service(accounts)
            .toggle_active("stu0003")
            .await
            .expect("toggled");
        assert!(!profile.is_active);
    }

    #[tokio::test]
    async fn get_unknown_student_is_not_found() {
        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_find_by_student_id()
            .times(1)
            .return_once(|_| Ok(None));
        let err = make_service(accounts)
            .get("STU9999")
            .await
            .expect_err("missing");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn list_projects_public_profiles() {
        let students = vec![
            student_account(1, "a@school.test", "secret1"),
            student_account(2, "b@school.test", "secret1"),
        ];
        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_list_students()
            .withf(|search, _| search.as_deref() == Some("school"))
            .times(1)
            .return_once(move |_, page| Ok(paginate(students, page)));

        let page = make_service(accounts)
            .list(Some("  school ".to_owned()), PageRequest::default())
            .await
            .expect("listed");
        assert_eq!(page.total_items, 2);
        assert_eq!(page.items[1].student_id.as_deref(), Some("STU0002"));
    }
}
