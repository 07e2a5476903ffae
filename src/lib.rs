//! # Stamps - Personal Stamp Collection Tracker
//!
//! Keeps a stamp collection and a table of postage rates in a single SQLite file.
//!
//! Stamps provides:
//! - Stamps with face value in their original currency (EUR or ITL)
//! - Euro-cent normalization so lira and euro issues can be summed together
//! - Postage rates keyed by name, with insert-or-replace semantics
//! - First-run seeding of default rates and on-demand sample data

pub mod currency;
pub mod stamp;
pub mod postage;
pub mod storage;
pub mod output;
pub mod config;
pub mod ui;


// Re-exports for convenient access
pub use currency::Currency;
pub use stamp::{NewStamp, Stamp};
pub use postage::PostageRate;
pub use storage::{StampStore, StoreStats};

/// Result type alias for collection operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for collection operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unsupported currency: {0} (expected EUR or ITL)")]
    UnsupportedCurrency(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(f64),

    #[error("Postage rate not found: {0}")]
    PostageRateNotFound(i64),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
