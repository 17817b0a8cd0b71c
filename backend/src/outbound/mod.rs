//! Outbound adapters implementing the inventory store port.
//!
//! - **persistence**: PostgreSQL-backed store using Diesel, with embedded
//!   migrations and a `bb8` pool.
//! - **memory**: in-process store used without a database and in tests.
//!
//! Adapters translate between domain types and storage representations and
//! defer every reconcile decision to the domain plan.

pub mod memory;
pub mod persistence;

pub use memory::InMemoryInventoryStore;
pub use persistence::DieselInventoryStore;
