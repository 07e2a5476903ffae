//! SQL scripts applied by the store, embedded from `sql/`

/// Table and index definitions. Safe to re-run.
pub const SCHEMA: &str = include_str!("../../sql/schema.sql");

/// Default postage rates, loaded only into an empty `postage_rates` table
pub const INIT_DATA: &str = include_str!("../../sql/init_data.sql");

/// Example collection, loaded on demand
pub const SAMPLE_DATA: &str = include_str!("../../sql/sample_data.sql");
