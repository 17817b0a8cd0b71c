//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod inventory_command;
mod inventory_query;
mod inventory_store;

#[cfg(test)]
pub use inventory_command::MockInventoryCommand;
pub use inventory_command::{FixtureInventoryCommand, InventoryCommand};
#[cfg(test)]
pub use inventory_query::MockInventoryQuery;
pub use inventory_query::{FixtureInventoryQuery, InventoryQuery};
#[cfg(test)]
pub use inventory_store::MockInventoryStore;
pub use inventory_store::{FixtureInventoryStore, InventoryStore, InventoryStoreError};
