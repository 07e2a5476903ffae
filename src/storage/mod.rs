//! Storage Layer - SQLite-backed persistence
//!
//! System of record is a single SQLite file with tables:
//! - stamps(id, name, value, currency, euro_cents, n, postage_rate_id, updated_at)
//! - postage_rates(id, name, value, max_weight, updated_at)

pub mod schema;
pub mod sqlite;

pub use sqlite::{StampStore, StoreStats};
