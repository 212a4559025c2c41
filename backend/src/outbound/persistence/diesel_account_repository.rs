//! PostgreSQL-backed `AccountRepository` implementation using Diesel ORM.
//!
//! Student profile fields are flattened into nullable columns and rebuilt
//! through the validating domain constructors on read.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{AccountRepository, AccountRepositoryError};
use crate::domain::{
    Account, AccountId, AccountStats, BloodGroup, EmailAddress, MobileNumber, Page, PageRequest,
    PasswordHash, Role, StudentId, StudentProfile, normalise_email,
};

use super::diesel_helpers::{cast_count, cast_offset, like_pattern};
use super::error_mapping::{DieselErrorConstructors, map_basic_diesel_error, map_basic_pool_error};
use super::models::{AccountRow, NewAccountRow};
use super::pool::{DbPool, PoolError};
use super::schema::accounts;

/// Diesel-backed implementation of the account repository port.
#[derive(Clone)]
pub struct DieselAccountRepository {
    pool: DbPool,
}

impl DieselAccountRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> AccountRepositoryError {
    map_basic_pool_error(error, AccountRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> AccountRepositoryError {
    map_basic_diesel_error(
        error,
        DieselErrorConstructors {
            query: AccountRepositoryError::query,
            connection: AccountRepositoryError::connection,
            duplicate: AccountRepositoryError::duplicate,
        },
    )
}

fn corrupt(field: &str, err: impl std::fmt::Display) -> AccountRepositoryError {
    AccountRepositoryError::query(format!("stored account has invalid {field}: {err}"))
}

fn student_profile(row: &AccountRow) -> Result<StudentProfile, AccountRepositoryError> {
    let (Some(name), Some(mobile), Some(blood_group), Some(standard)) = (
        row.name.as_deref(),
        row.mobile.as_deref(),
        row.blood_group.as_deref(),
        row.standard.as_deref(),
    ) else {
        return Err(AccountRepositoryError::query(
            "student account row is missing profile columns",
        ));
    };
    let mobile = MobileNumber::parse(mobile).map_err(|err| corrupt("mobile", err))?;
    let blood_group = blood_group
        .parse::<BloodGroup>()
        .map_err(|err| corrupt("blood group", err))?;
    let profile = StudentProfile::new(name, mobile, blood_group, standard)
        .map_err(|err| corrupt("profile", err))?;
    Ok(profile
        .with_date_of_birth(row.date_of_birth)
        .with_address(row.address.clone()))
}

/// Convert a database row into a validated domain account.
fn row_to_account(row: AccountRow) -> Result<Account, AccountRepositoryError> {
    let role = row.role.parse::<Role>().map_err(|err| corrupt("role", err))?;
    let email = EmailAddress::parse(&row.email).map_err(|err| corrupt("email", err))?;
    let (student_id, student) = match role {
        Role::Admin => (None, None),
        Role::Student => {
            let student_id = row
                .student_id
                .as_deref()
                .ok_or_else(|| AccountRepositoryError::query("student row has no student id"))
                .and_then(|raw| StudentId::parse(raw).map_err(|err| corrupt("student id", err)))?;
            (Some(student_id), Some(student_profile(&row)?))
        }
    };

    Ok(Account {
        id: AccountId::from_uuid(row.id),
        email,
        role,
        password_hash: PasswordHash::from_phc(row.password_hash),
        student_id,
        student,
        is_active: row.is_active,
        last_login: row.last_login,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn new_row(account: &Account) -> NewAccountRow<'_> {
    let student = account.student.as_ref();
    NewAccountRow {
        id: *account.id.as_uuid(),
        email: account.email.as_ref(),
        role: account.role.as_str(),
        password_hash: account.password_hash.as_str(),
        student_id: account.student_id.as_ref().map(AsRef::as_ref),
        name: student.map(|s| s.name.as_str()),
        mobile: student.map(|s| s.mobile.as_ref()),
        blood_group: student.map(|s| s.blood_group.as_str()),
        standard: student.map(|s| s.standard.as_str()),
        date_of_birth: student.and_then(|s| s.date_of_birth),
        address: student.and_then(|s| s.address.as_deref()),
        is_active: account.is_active,
        last_login: account.last_login,
        created_at: account.created_at,
        updated_at: account.updated_at,
    }
}

fn students(search: Option<&str>) -> accounts::BoxedQuery<'static, Pg> {
    let mut query = accounts::table
        .filter(accounts::role.eq(Role::Student.as_str()))
        .into_boxed();
    if let Some(search) = search {
        let pattern = like_pattern(search);
        query = query.filter(
            accounts::name
                .ilike(pattern.clone())
                .or(accounts::email.ilike(pattern.clone()))
                .or(accounts::student_id.ilike(pattern)),
        );
    }
    query
}

#[async_trait]
impl AccountRepository for DieselAccountRepository {
    async fn insert(&self, account: &Account) -> Result<(), AccountRepositoryError> {
        let row = new_row(account);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(accounts::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = accounts::table
            .filter(accounts::id.eq(id.as_uuid()))
            .select(AccountRow::as_select())
            .first::<AccountRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_account).transpose()
    }

    async fn find_by_email(
        &self,
        email: &str,
        role: Role,
    ) -> Result<Option<Account>, AccountRepositoryError> {
        let email = normalise_email(email);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = accounts::table
            .filter(
                accounts::email
                    .eq(email)
                    .and(accounts::role.eq(role.as_str())),
            )
            .select(AccountRow::as_select())
            .first::<AccountRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_account).transpose()
    }

    async fn find_by_student_id(
        &self,
        student_id: &str,
    ) -> Result<Option<Account>, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = accounts::table
            .filter(accounts::student_id.eq(student_id))
            .select(AccountRow::as_select())
            .first::<AccountRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_account).transpose()
    }

    async fn record_login(
        &self,
        id: &AccountId,
        at: DateTime<Utc>,
    ) -> Result<(), AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(accounts::table.filter(accounts::id.eq(id.as_uuid())))
            .set((accounts::last_login.eq(Some(at)), accounts::updated_at.eq(at)))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update_password(
        &self,
        id: &AccountId,
        hash: &PasswordHash,
        at: DateTime<Utc>,
    ) -> Result<(), AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(accounts::table.filter(accounts::id.eq(id.as_uuid())))
            .set((
                accounts::password_hash.eq(hash.as_str()),
                accounts::updated_at.eq(at),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn set_active(
        &self,
        id: &AccountId,
        active: bool,
        at: DateTime<Utc>,
    ) -> Result<Option<Account>, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = diesel::update(accounts::table.filter(accounts::id.eq(id.as_uuid())))
            .set((accounts::is_active.eq(active), accounts::updated_at.eq(at)))
            .returning(AccountRow::as_returning())
            .get_result::<AccountRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_account).transpose()
    }

    async fn list_students(
        &self,
        search: Option<String>,
        page: PageRequest,
    ) -> Result<Page<Account>, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = students(search.as_deref())
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<AccountRow> = students(search.as_deref())
            .order((accounts::created_at.desc(), accounts::id.desc()))
            .limit(i64::from(page.limit()))
            .offset(cast_offset(page.offset()))
            .select(AccountRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let items = rows
            .into_iter()
            .map(row_to_account)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page {
            items,
            total_items: cast_count(total),
            request: page,
        })
    }

    async fn next_student_number(&self) -> Result<u32, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        // Zero-padded identifiers sort numerically as text.
        let highest: Option<String> = accounts::table
            .select(diesel::dsl::max(accounts::student_id))
            .first(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let highest = highest
            .as_deref()
            .map(StudentId::parse)
            .transpose()
            .map_err(|err| corrupt("student id", err))?
            .map_or(0, |id| id.number());
        Ok(highest + 1)
    }

    async fn stats(&self, since: DateTime<Utc>) -> Result<AccountStats, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = accounts::table
            .filter(accounts::role.eq(Role::Student.as_str()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let active: i64 = accounts::table
            .filter(
                accounts::role
                    .eq(Role::Student.as_str())
                    .and(accounts::is_active.eq(true)),
            )
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let recent: i64 = accounts::table
            .filter(
                accounts::role
                    .eq(Role::Student.as_str())
                    .and(accounts::last_login.ge(since)),
            )
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let total_students = cast_count(total);
        let active_students = cast_count(active);
        Ok(AccountStats {
            total_students,
            active_students,
            inactive_students: total_students.saturating_sub(active_students),
            recent_logins: cast_count(recent),
        })
    }
}
