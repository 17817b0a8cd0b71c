//! Embedded PostgreSQL database helpers for integration tests.
//!
//! Database reset uses `postgres` so `DROP DATABASE` runs outside any
//! transaction. Schema setup runs the service's embedded Diesel migrations so
//! test schemas never drift from production.

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::MigrationHarness;
use inventory_backend::outbound::persistence::MIGRATIONS;
use pg_embedded_setup_unpriv::TestCluster;
use postgres::{Client, NoTls};

use super::format_postgres_error;

/// Drop and recreate `db_name` on the cluster.
pub fn reset_database(cluster: &TestCluster, db_name: &str) -> Result<(), String> {
    let admin_url = cluster.connection().database_url("postgres");
    let mut client = Client::connect(&admin_url, NoTls).map_err(|err| format_postgres_error(&err))?;
    // Separate statements: DROP DATABASE refuses to run in an implicit block.
    client
        .batch_execute(&format!("DROP DATABASE IF EXISTS \"{db_name}\" WITH (FORCE)"))
        .map_err(|err| format_postgres_error(&err))?;
    client
        .batch_execute(&format!("CREATE DATABASE \"{db_name}\""))
        .map_err(|err| format_postgres_error(&err))?;
    Ok(())
}

/// Apply every pending migration to the database at `url`.
pub fn migrate_schema(url: &str) -> Result<(), String> {
    let mut conn = PgConnection::establish(url).map_err(|err| format!("connect: {err}"))?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|err| format!("migration: {err}"))?;
    Ok(())
}
