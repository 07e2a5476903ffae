//! Postage rates - named tariffs with a maximum weight

use crate::currency::format_euro_cents;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A postage tariff. `name` is the natural key used for upserts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostageRate {
    pub id: i64,
    pub name: String,
    /// Rate in euro
    pub value: f64,
    /// Heaviest item, in grams, the rate applies to
    pub max_weight: u32,
    pub updated_at: DateTime<Utc>,
}

impl PostageRate {
    pub fn euro_value(&self) -> String {
        format_euro_cents((self.value * 100.0).round() as i64)
    }

    /// Whether an item of `grams` can be sent at this rate
    pub fn covers(&self, grams: u32) -> bool {
        grams <= self.max_weight
    }
}
