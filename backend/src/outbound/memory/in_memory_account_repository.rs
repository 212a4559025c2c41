//! Account repository held in process memory.
//!
//! Backs the server when no `DATABASE_URL` is configured. Accounts are lost
//! on restart.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{AccountRepository, AccountRepositoryError};
use crate::domain::{
    Account, AccountId, AccountStats, Page, PageRequest, PasswordHash, Role, normalise_email,
    paginate,
};

/// `HashMap`-backed account store keyed by account identifier.
#[derive(Debug, Default)]
pub struct InMemoryAccountRepository {
    accounts: Mutex<HashMap<AccountId, Account>>,
}

impl InMemoryAccountRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    fn accounts(&self) -> MutexGuard<'_, HashMap<AccountId, Account>> {
        self.accounts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn update<T>(
        &self,
        id: &AccountId,
        apply: impl FnOnce(&mut Account) -> T,
    ) -> Option<T> {
        self.accounts().get_mut(id).map(apply)
    }
}

fn matches_search(account: &Account, needle: &str) -> bool {
    let name = account.student.as_ref().map(|s| s.name.as_str());
    let student_id = account.student_id.as_ref().map(AsRef::as_ref);
    [name, Some(account.email.as_ref()), student_id]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(needle))
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn insert(&self, account: &Account) -> Result<(), AccountRepositoryError> {
        let mut accounts = self.accounts();
        if accounts.values().any(|existing| existing.email == account.email) {
            return Err(AccountRepositoryError::duplicate(account.email.as_ref()));
        }
        if let Some(student_id) = account.student_id.as_ref() {
            if accounts
                .values()
                .any(|existing| existing.student_id.as_ref() == Some(student_id))
            {
                return Err(AccountRepositoryError::duplicate(student_id.as_ref()));
            }
        }
        accounts.insert(account.id, account.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountRepositoryError> {
        Ok(self.accounts().get(id).cloned())
    }

    async fn find_by_email(
        &self,
        email: &str,
        role: Role,
    ) -> Result<Option<Account>, AccountRepositoryError> {
        let email = normalise_email(email);
        Ok(self
            .accounts()
            .values()
            .find(|account| account.role == role && account.email.as_ref() == email)
            .cloned())
    }

    async fn find_by_student_id(
        &self,
        student_id: &str,
    ) -> Result<Option<Account>, AccountRepositoryError> {
        Ok(self
            .accounts()
            .values()
            .find(|account| {
                account
                    .student_id
                    .as_ref()
                    .is_some_and(|id| id.as_ref() == student_id)
            })
            .cloned())
    }

    async fn record_login(
        &self,
        id: &AccountId,
        at: DateTime<Utc>,
    ) -> Result<(), AccountRepositoryError> {
        self.update(id, |account| {
            account.last_login = Some(at);
            account.updated_at = at;
        });
        Ok(())
    }

    async fn update_password(
        &self,
        id: &AccountId,
        hash: &PasswordHash,
        at: DateTime<Utc>,
    ) -> Result<(), AccountRepositoryError> {
        self.update(id, |account| {
            account.password_hash = hash.clone();
            account.updated_at = at;
        });
        Ok(())
    }

    async fn set_active(
        &self,
        id: &AccountId,
        active: bool,
        at: DateTime<Utc>,
    ) -> Result<Option<Account>, AccountRepositoryError> {
        Ok(self.update(id, |account| {
            account.is_active = active;
            account.updated_at = at;
            account.clone()
        }))
    }

    async fn list_students(
        &self,
        search: Option<String>,
        page: PageRequest,
    ) -> Result<Page<Account>, AccountRepositoryError> {
        let needle = search.map(|value| value.to_lowercase());
        let mut students: Vec<Account> = self
            .accounts()
            .values()
            .filter(|account| account.role == Role::Student)
            .filter(|account| {
                needle
                    .as_deref()
                    .is_none_or(|needle| matches_search(account, needle))
            })
            .cloned()
            .collect();
        students.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.as_uuid().cmp(a.id.as_uuid()))
        });
        Ok(paginate(students, page))
    }

    async fn next_student_number(&self) -> Result<u32, AccountRepositoryError> {
        let highest = self
            .accounts()
            .values()
            .filter_map(|account| account.student_id.as_ref().map(|id| id.number()))
            .max()
            .unwrap_or(0);
        Ok(highest + 1)
    }

    async fn stats(&self, since: DateTime<Utc>) -> Result<AccountStats, AccountRepositoryError> {
        let accounts = self.accounts();
        let students = accounts
            .values()
            .filter(|account| account.role == Role::Student);
        let stats = students.fold(AccountStats::default(), |mut stats, account| {
            stats.total_students += 1;
            if account.is_active {
                stats.active_students += 1;
            } else {
                stats.inactive_students += 1;
            }
            if account.last_login.is_some_and(|at| at >= since) {
                stats.recent_logins += 1;
            }
            stats
        });
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use rstest::{fixture, rstest};

    use super::*;
    use crate::test_support::{admin_account, fixture_timestamp, student_account};

    #[fixture]
    fn repo() -> InMemoryAccountRepository {
        InMemoryAccountRepository::new()
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_email_is_rejected_across_roles(repo: InMemoryAccountRepository) {
        repo.insert(&admin_account("shared@school.test", "secret"))
            .await
            .expect("admin insert");
        let err = repo
            .insert(&student_account(1, "Shared@School.test", "secret"))
            .await
            .expect_err("duplicate email");
        assert!(matches!(err, AccountRepositoryError::Duplicate { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_student_id_is_rejected(repo: InMemoryAccountRepository) {
        repo.insert(&student_account(7, "one@school.test", "secret"))
            .await
            .expect("insert");
        let err = repo
            .insert(&student_account(7, "two@school.test", "secret"))
            .await
            .expect_err("duplicate student id");
        assert!(matches!(err, AccountRepositoryError::Duplicate { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn email_lookup_is_scoped_to_role(repo: InMemoryAccountRepository) {
        repo.insert(&admin_account("admin@school.test", "secret"))
            .await
            .expect("insert");
        let admin = repo
            .find_by_email(" ADMIN@school.test", Role::Admin)
            .await
            .expect("lookup");
        assert!(admin.is_some());
        let student = repo
            .find_by_email("admin@school.test", Role::Student)
            .await
            .expect("lookup");
        assert!(student.is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn next_student_number_follows_highest(repo: InMemoryAccountRepository) {
        assert_eq!(repo.next_student_number().await.expect("empty"), 1);
        repo.insert(&student_account(4, "a@school.test", "secret"))
            .await
            .expect("insert");
        repo.insert(&student_account(2, "b@school.test", "secret"))
            .await
            .expect("insert");
        assert_eq!(repo.next_student_number().await.expect("next"), 5);
    }

    #[rstest]
    #[tokio::test]
    async fn stats_split_active_and_recent(repo: InMemoryAccountRepository) {
        let now = fixture_timestamp();
        let active = student_account(1, "a@school.test", "secret");
        let inactive = student_account(2, "b@school.test", "secret");
        repo.insert(&active).await.expect("insert");
        repo.insert(&inactive).await.expect("insert");
        repo.insert(&admin_account("admin@school.test", "secret"))
            .await
            .expect("insert");
        repo.record_login(&active.id, now).await.expect("login");
        repo.set_active(&inactive.id, false, now)
            .await
            .expect("toggle");

        let stats = repo.stats(now - Duration::days(7)).await.expect("stats");
        assert_eq!(
            stats,
            AccountStats {
                total_students: 2,
                active_students: 1,
                inactive_students: 1,
                recent_logins: 1,
            }
        );
    }

    #[rstest]
    #[tokio::test]
    async fn list_students_filters_by_search(repo: InMemoryAccountRepository) {
        repo.insert(&student_account(1, "ada@school.test", "secret"))
            .await
            .expect("insert");
        repo.insert(&student_account(2, "grace@school.test", "secret"))
            .await
            .expect("insert");

        let page = repo
            .list_students(Some("STU0002".to_lowercase()), PageRequest::default())
            .await
            .expect("list");
        assert_eq!(page.total_items, 1);
        assert_eq!(page.items[0].email.as_ref(), "grace@school.test");
    }

    #[rstest]
    #[tokio::test]
    async fn set_active_on_unknown_account_is_none(repo: InMemoryAccountRepository) {
        let result = repo
            .set_active(&AccountId::random(), false, fixture_timestamp())
            .await
            .expect("toggle");
        assert!(result.is_none());
    }
}
