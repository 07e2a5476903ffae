//! Stamp records - items in the collection

use crate::currency::{Currency, format_euro_cents};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stamp held in the collection.
///
/// `value` and `currency` are what the user entered; `euro_cents` is derived
/// from them when the row is inserted and is never edited on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stamp {
    /// Row id assigned by the store
    pub id: i64,
    /// Display label, not unique
    pub name: String,
    /// Face value in `currency`
    pub value: f64,
    pub currency: Currency,
    /// Face value normalized to euro cents
    pub euro_cents: i64,
    /// Number of copies owned (stored in column `n`)
    pub quantity: u32,
    pub postage_rate_id: Option<i64>,
    /// Name of the referenced postage rate, filled in by joined reads
    pub postage_rate_name: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl Stamp {
    /// Euro value of all copies owned
    pub fn total_euro_cents(&self) -> i64 {
        self.euro_cents * i64::from(self.quantity)
    }

    /// Face value as entered, e.g. `0.85 EUR` or `800 ITL`
    pub fn face_value(&self) -> String {
        format!("{} {}", self.value, self.currency)
    }

    pub fn euro_value(&self) -> String {
        format_euro_cents(self.euro_cents)
    }
}

/// A stamp about to be added to the collection.
#[derive(Debug, Clone, PartialEq)]
pub struct NewStamp {
    pub name: String,
    pub value: f64,
    pub currency: Currency,
    pub quantity: u32,
    pub postage_rate_id: Option<i64>,
}

impl NewStamp {
    /// Create a stamp entry with a quantity of one and no postage rate
    pub fn new(name: impl Into<String>, value: f64, currency: Currency) -> Self {
        Self {
            name: name.into(),
            value,
            currency,
            quantity: 1,
            postage_rate_id: None,
        }
    }

    /// Build from a raw currency code, rejecting anything other than EUR or ITL
    pub fn from_code(name: impl Into<String>, value: f64, currency: &str) -> Result<Self> {
        Ok(Self::new(name, value, currency.parse()?))
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn with_postage_rate(mut self, postage_rate_id: i64) -> Self {
        self.postage_rate_id = Some(postage_rate_id);
        self
    }

    /// Check the face value can be normalized
    pub fn validate(&self) -> Result<()> {
        if !self.value.is_finite() || self.value < 0.0 {
            return Err(Error::InvalidAmount(self.value));
        }
        Ok(())
    }

    pub fn euro_cents(&self) -> i64 {
        self.currency.to_euro_cents(self.value)
    }
}
