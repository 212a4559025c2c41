//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! This module provides concrete implementations of the admission and account
//! repository ports backed by PostgreSQL via Diesel with async support through
//! `diesel-async` and `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: Repository implementations only translate between
//!   Diesel models and domain types. No business logic resides here.
//! - **Internal models**: Diesel row structs (`models.rs`) and schema
//!   definitions (`schema.rs`) are never exposed to the domain layer.
//! - **Lazy pooling**: the pool is built without connecting; the
//!   [`PoolLivenessMonitor`] reports when the database becomes reachable.
//! - **Strongly typed errors**: unique violations map to `Duplicate`, lost
//!   connections to `Connection`, everything else to `Query`.
//!
//! # Example
//!
//! ```no_run
//! use institute::domain::ports::LivenessFlag;
//! use institute::outbound::persistence::{
//!     DbPool, DieselAdmissionRepository, PoolConfig, PoolLivenessMonitor,
//! };
//!
//! # async fn wire() {
//! let pool = DbPool::new_lazy(&PoolConfig::new("postgres://localhost/institute"));
//! let flag = LivenessFlag::new(false);
//! let _monitor = PoolLivenessMonitor::new(pool.clone(), flag.clone()).start();
//! let _admissions = DieselAdmissionRepository::new(pool);
//! # }
//! ```

mod diesel_account_repository;
mod diesel_admission_repository;
mod diesel_helpers;
mod error_mapping;
mod liveness;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_account_repository::DieselAccountRepository;
pub use diesel_admission_repository::DieselAdmissionRepository;
pub use liveness::{ConnectionProbe, DEFAULT_PROBE_INTERVAL, PoolLivenessMonitor};
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
