//! Process-local admission store used while PostgreSQL is unreachable.
//!
//! Records live for the lifetime of the process and are never copied into the
//! database. Every operation runs under one mutex, so the duplicate check and
//! the insert are atomic with respect to each other.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{AdmissionRepository, AdmissionRepositoryError};
use crate::domain::{
    Admission, AdmissionDecision, AdmissionFilter, AdmissionId, AdmissionStats, AdmissionStatus,
    EmailAddress, Page, PageRequest, paginate,
};

/// Mutex-guarded, insertion-ordered admission collection.
#[derive(Debug, Default)]
pub struct FallbackAdmissionStore {
    records: Mutex<Vec<Admission>>,
}

impl FallbackAdmissionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn records(&self) -> MutexGuard<'_, Vec<Admission>> {
        // A panic mid-operation leaves the vector intact; keep serving it.
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of applications held.
    pub fn len(&self) -> usize {
        self.records().len()
    }

    /// Whether the store holds no applications.
    pub fn is_empty(&self) -> bool {
        self.records().is_empty()
    }
}

#[async_trait]
impl AdmissionRepository for FallbackAdmissionStore {
    async fn insert(&self, admission: &Admission) -> Result<(), AdmissionRepositoryError> {
        let mut records = self.records();
        if records
            .iter()
            .any(|existing| existing.email() == admission.email())
        {
            return Err(AdmissionRepositoryError::duplicate(
                admission.email().as_ref(),
            ));
        }
        records.push(admission.clone());
        Ok(())
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Admission>, AdmissionRepositoryError> {
        Ok(self
            .records()
            .iter()
            .find(|admission| admission.email() == email)
            .cloned())
    }

    async fn find_by_id(
        &self,
        id: &AdmissionId,
    ) -> Result<Option<Admission>, AdmissionRepositoryError> {
        Ok(self
            .records()
            .iter()
            .find(|admission| admission.id == *id)
            .cloned())
    }

    async fn list(
        &self,
        filter: &AdmissionFilter,
        page: PageRequest,
    ) -> Result<Page<Admission>, AdmissionRepositoryError> {
        let mut matching: Vec<Admission> = self
            .records()
            .iter()
            .filter(|admission| filter.matches(admission))
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            b.submitted_at
                .cmp(&a.submitted_at)
                .then_with(|| b.id.as_uuid().cmp(a.id.as_uuid()))
        });
        Ok(paginate(matching, page))
    }

    async fn update_decision(
        &self,
        id: &AdmissionId,
        decision: &AdmissionDecision,
    ) -> Result<Option<Admission>, AdmissionRepositoryError> {
        let mut records = self.records();
        let Some(admission) = records
            .iter_mut()
            .find(|admission| admission.id == *id && admission.status == AdmissionStatus::Pending)
        else {
            return Ok(None);
        };
        admission.status = decision.status;
        admission.processed_at = Some(decision.processed_at);
        admission.student_id = decision.student_id.clone();
        admission.rejection_reason = decision.rejection_reason.clone();
        Ok(Some(admission.clone()))
    }

    async fn delete(&self, id: &AdmissionId) -> Result<bool, AdmissionRepositoryError> {
        let mut records = self.records();
        let before = records.len();
        records.retain(|admission| admission.id != *id);
        Ok(records.len() != before)
    }

    async fn stats(
        &self,
        since: DateTime<Utc>,
    ) -> Result<AdmissionStats, AdmissionRepositoryError> {
        Ok(AdmissionStats::tally(
            self.records()
                .iter()
                .map(|admission| (admission.status, admission.submitted_at)),
            since,
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Duration;
    use rstest::{fixture, rstest};

    use super::*;
    use crate::domain::NewAdmission;
    use crate::test_support::{complete_form, fixture_timestamp};

    fn admission(email: &str, submitted_at: DateTime<Utc>) -> Admission {
        let draft = NewAdmission::from_form(&complete_form(email)).expect("form");
        Admission::submit(draft, submitted_at)
    }

    #[fixture]
    fn store() -> FallbackAdmissionStore {
        FallbackAdmissionStore::new()
    }

    fn accept(at: DateTime<Utc>) -> AdmissionDecision {
        AdmissionDecision {
            status: AdmissionStatus::Accepted,
            processed_at: at,
            student_id: None,
            rejection_reason: None,
        }
    }

    #[rstest]
    #[tokio::test]
    async fn second_insert_with_same_email_is_duplicate(store: FallbackAdmissionStore) {
        let now = fixture_timestamp();
        store
            .insert(&admission("a@b.com", now))
            .await
            .expect("first insert");
        let err = store
            .insert(&admission("a@b.com", now))
            .await
            .expect_err("duplicate");
        assert!(matches!(err, AdmissionRepositoryError::Duplicate { .. }));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn concurrent_inserts_admit_exactly_one() {
        let store = Arc::new(FallbackAdmissionStore::new());
        let now = fixture_timestamp();
        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.insert(&admission("race@b.com", now)).await })
            })
            .collect();
        let mut successes = 0;
        for task in tasks {
            if task.await.expect("task joins").is_ok() {
                successes += 1;
            }
        }
        assert_eq!(successes, 1);
        assert_eq!(store.len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn decision_applies_only_to_pending(store: FallbackAdmissionStore) {
        let now = fixture_timestamp();
        let stored = admission("a@b.com", now);
        store.insert(&stored).await.expect("insert");

        let first = store
            .update_decision(&stored.id, &accept(now))
            .await
            .expect("update");
        assert_eq!(
            first.map(|admission| admission.status),
            Some(AdmissionStatus::Accepted)
        );
        let second = store
            .update_decision(&stored.id, &accept(now))
            .await
            .expect("update");
        assert!(second.is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn stats_count_statuses_and_recent_window(store: FallbackAdmissionStore) {
        let now = fixture_timestamp();
        for (index, email) in ["p1@b.com", "p2@b.com", "p3@b.com"].iter().enumerate() {
            let submitted = now - Duration::days(i64::try_from(index).expect("small") * 20);
            store
                .insert(&admission(email, submitted))
                .await
                .expect("insert");
        }
        let accepted = admission("acc@b.com", now);
        store.insert(&accepted).await.expect("insert");
        store
            .update_decision(&accepted.id, &accept(now))
            .await
            .expect("decide");

        let stats = store.stats(now - Duration::days(30)).await.expect("stats");
        assert_eq!(
            (stats.total, stats.pending, stats.accepted, stats.rejected),
            (4, 3, 1, 0)
        );
        assert_eq!(stats.recent, 3);
    }

    #[rstest]
    #[tokio::test]
    async fn list_is_newest_first_and_filtered(store: FallbackAdmissionStore) {
        let now = fixture_timestamp();
        let older = admission("old@b.com", now - Duration::days(2));
        let newer = admission("new@b.com", now);
        store.insert(&older).await.expect("insert");
        store.insert(&newer).await.expect("insert");

        let page = store
            .list(&AdmissionFilter::default(), PageRequest::default())
            .await
            .expect("list");
        assert_eq!(page.items[0].id, newer.id);

        let filter = AdmissionFilter {
            search: Some("OLD@".to_owned()),
            ..AdmissionFilter::default()
        };
        let page = store
            .list(&filter, PageRequest::default())
            .await
            .expect("list");
        assert_eq!(page.total_items, 1);
        assert_eq!(page.items[0].id, older.id);
    }

    #[rstest]
    #[tokio::test]
    async fn delete_reports_whether_anything_was_removed(store: FallbackAdmissionStore) {
        let stored = admission("a@b.com", fixture_timestamp());
        store.insert(&stored).await.expect("insert");
        assert!(store.delete(&stored.id).await.expect("delete"));
        assert!(!store.delete(&stored.id).await.expect("delete"));
        assert!(store.is_empty());
    }
}
