//! PostgreSQL-backed `AdmissionRepository` implementation using Diesel ORM.
//!
//! The sanitised application is stored as JSONB alongside copies of the
//! columns the admin listing searches. Email uniqueness is enforced by the
//! `admissions_email_key` unique index.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl::count_star;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{AdmissionRepository, AdmissionRepositoryError};
use crate::domain::{
    Admission, AdmissionDecision, AdmissionFilter, AdmissionId, AdmissionStats, AdmissionStatus,
    EmailAddress, NewAdmission, Page, PageRequest, StudentId,
};

use super::diesel_helpers::{cast_count, cast_offset, like_pattern};
use super::error_mapping::{DieselErrorConstructors, map_basic_diesel_error, map_basic_pool_error};
use super::models::{AdmissionDecisionUpdate, AdmissionRow, NewAdmissionRow};
use super::pool::{DbPool, PoolError};
use super::schema::admissions;

/// Diesel-backed implementation of the admission repository port.
#[derive(Clone)]
pub struct DieselAdmissionRepository {
    pool: DbPool,
}

impl DieselAdmissionRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> AdmissionRepositoryError {
    map_basic_pool_error(error, AdmissionRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> AdmissionRepositoryError {
    map_basic_diesel_error(
        error,
        DieselErrorConstructors {
            query: AdmissionRepositoryError::query,
            connection: AdmissionRepositoryError::connection,
            duplicate: AdmissionRepositoryError::duplicate,
        },
    )
}

fn filtered(filter: &AdmissionFilter) -> admissions::BoxedQuery<'static, Pg> {
    let mut query = admissions::table.into_boxed();
    if let Some(status) = filter.status {
        query = query.filter(admissions::status.eq(status.as_str()));
    }
    if let Some(search) = filter.search.as_deref() {
        let pattern = like_pattern(search);
        query = query.filter(
            admissions::first_name
                .ilike(pattern.clone())
                .or(admissions::last_name.ilike(pattern.clone()))
                .or(admissions::email.ilike(pattern.clone()))
                .or(admissions::phone.ilike(pattern)),
        );
    }
    query
}

/// Convert a database row into a domain admission.
fn row_to_admission(row: AdmissionRow) -> Result<Admission, AdmissionRepositoryError> {
    let AdmissionRow {
        id,
        status,
        details,
        submitted_at,
        processed_at,
        student_id,
        rejection_reason,
    } = row;

    let details: NewAdmission = serde_json::from_value(details)
        .map_err(|err| AdmissionRepositoryError::query(format!("decode details: {err}")))?;
    let status = status
        .parse::<AdmissionStatus>()
        .map_err(|err| AdmissionRepositoryError::query(err.to_string()))?;
    let student_id = student_id
        .as_deref()
        .map(StudentId::parse)
        .transpose()
        .map_err(|err| AdmissionRepositoryError::query(err.to_string()))?;

    Ok(Admission {
        id: AdmissionId::from_uuid(id),
        details,
        status,
        submitted_at,
        processed_at,
        student_id,
        rejection_reason,
    })
}

#[async_trait]
impl AdmissionRepository for DieselAdmissionRepository {
    async fn insert(&self, admission: &Admission) -> Result<(), AdmissionRepositoryError> {
        let details = serde_json::to_value(&admission.details)
            .map_err(|err| AdmissionRepositoryError::query(format!("serialise details: {err}")))?;
        let applicant = &admission.details.applicant;
        let row = NewAdmissionRow {
            id: *admission.id.as_uuid(),
            email: applicant.email.as_ref(),
            first_name: &applicant.first_name,
            last_name: &applicant.last_name,
            phone: &applicant.phone,
            status: admission.status.as_str(),
            details: &details,
            submitted_at: admission.submitted_at,
            processed_at: admission.processed_at,
            student_id: admission.student_id.as_ref().map(AsRef::as_ref),
            rejection_reason: admission.rejection_reason.as_deref(),
        };

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(admissions::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| match map_diesel_error(err) {
                AdmissionRepositoryError::Duplicate { .. } => {
                    AdmissionRepositoryError::duplicate(applicant.email.as_ref())
                }
                other => other,
            })
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Admission>, AdmissionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = admissions::table
            .filter(admissions::email.eq(email.as_ref()))
            .select(AdmissionRow::as_select())
            .first::<AdmissionRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_admission).transpose()
    }

    async fn find_by_id(
        &self,
        id: &AdmissionId,
    ) -> Result<Option<Admission>, AdmissionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = admissions::table
            .filter(admissions::id.eq(id.as_uuid()))
            .select(AdmissionRow::as_select())
            .first::<AdmissionRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_admission).transpose()
    }

    async fn list(
        &self,
        filter: &AdmissionFilter,
        page: PageRequest,
    ) -> Result<Page<Admission>, AdmissionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = filtered(filter)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<AdmissionRow> = filtered(filter)
            .order((admissions::submitted_at.desc(), admissions::id.desc()))
            .limit(i64::from(page.limit()))
            .offset(cast_offset(page.offset()))
            .select(AdmissionRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let items = rows
            .into_iter()
            .map(row_to_admission)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page {
            items,
            total_items: cast_count(total),
            request: page,
        })
    }

    async fn update_decision(
        &self,
        id: &AdmissionId,
        decision: &AdmissionDecision,
    ) -> Result<Option<Admission>, AdmissionRepositoryError> {
        let changeset = AdmissionDecisionUpdate {
            status: decision.status.as_str(),
            processed_at: Some(decision.processed_at),
            student_id: decision.student_id.as_ref().map(AsRef::as_ref),
            rejection_reason: decision.rejection_reason.as_deref(),
        };
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = diesel::update(admissions::table)
            .filter(
                admissions::id
                    .eq(id.as_uuid())
                    .and(admissions::status.eq(AdmissionStatus::Pending.as_str())),
            )
            .set(&changeset)
            .returning(AdmissionRow::as_returning())
            .get_result::<AdmissionRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_admission).transpose()
    }

    async fn delete(&self, id: &AdmissionId) -> Result<bool, AdmissionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::delete(admissions::table.filter(admissions::id.eq(id.as_uuid())))
            .execute(&mut conn)
            .await
            .map(|deleted| deleted > 0)
            .map_err(map_diesel_error)
    }

    async fn stats(
        &self,
        since: DateTime<Utc>,
    ) -> Result<AdmissionStats, AdmissionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let by_status: Vec<(String, i64)> = admissions::table
            .group_by(admissions::status)
            .select((admissions::status, count_star()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let recent: i64 = admissions::table
            .filter(admissions::submitted_at.ge(since))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let mut stats = AdmissionStats {
            recent: cast_count(recent),
            ..AdmissionStats::default()
        };
        for (status, count) in by_status {
            let count = cast_count(count);
            stats.total += count;
            match status.parse::<AdmissionStatus>() {
                Ok(AdmissionStatus::Pending) => stats.pending += count,
                Ok(AdmissionStatus::Accepted) => stats.accepted += count,
                Ok(AdmissionStatus::Rejected) => stats.rejected += count,
                Err(err) => return Err(AdmissionRepositoryError::query(err.to_string())),
            }
        }
        Ok(stats)
    }
}
