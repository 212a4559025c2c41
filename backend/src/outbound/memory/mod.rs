//! Process-local storage adapters.
//!
//! [`FallbackAdmissionStore`] receives admissions while PostgreSQL is
//! unreachable. [`InMemoryAccountRepository`] backs accounts when the server
//! runs without a database.

mod fallback_admission_store;
mod in_memory_account_repository;

pub use fallback_admission_store::FallbackAdmissionStore;
pub use in_memory_account_repository::InMemoryAccountRepository;
