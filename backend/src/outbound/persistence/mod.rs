//! PostgreSQL persistence adapter using Diesel.
//!
//! Provides the [`DieselInventoryStore`] implementation of the inventory
//! store port, backed by PostgreSQL through `diesel-async` and a `bb8`
//! connection pool, plus the embedded schema migrations.
//!
//! # Architecture
//!
//! - **Thin adapter**: the store translates rows to domain types and defers
//!   every reconcile decision to the shared domain plan.
//! - **Internal rows**: `QueryableByName` row structs stay private to the
//!   adapter and never reach the domain layer.
//! - **Async-safe pooling**: connections are managed via `bb8` pools with
//!   proper async integration through `diesel-async`.
//! - **Strongly typed errors**: all database errors are mapped to
//!   `InventoryStoreError` variants.
//!
//! # Example
//!
//! ```ignore
//! use inventory_backend::outbound::persistence::{DbPool, DieselInventoryStore, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/inventory")).await?;
//! let store = DieselInventoryStore::new(pool, clock, policy);
//! ```

mod diesel_helpers;
mod diesel_inventory_store;
mod migrations;
mod pool;

pub use diesel_inventory_store::DieselInventoryStore;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
