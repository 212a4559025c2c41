//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! This module follows the hexagonal architecture pattern, providing concrete
//! implementations of domain port traits:
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM, plus the
//!   pool liveness monitor
//! - **memory**: process-local stores for fallback and database-less operation
//! - **documents**: local filesystem storage for admission attachments
//! - **security**: Argon2id password hashing and HS256 session tokens
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod documents;
mod failover_admission_repository;
pub mod memory;
pub mod persistence;
pub mod security;

pub use failover_admission_repository::FailoverAdmissionRepository;
