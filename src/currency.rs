//! Currencies a stamp can be denominated in, and their conversion to euro cents.
//!
//! Only two currencies exist in the collection:
//! - `EUR`: stamps issued after 2002
//! - `ITL`: Italian lira issues, converted at the fixed changeover rate

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Irrevocable lira-to-euro conversion rate fixed at the changeover.
pub const LIRA_PER_EURO: f64 = 1936.27;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Euro
    Eur,
    /// Italian lira
    Itl,
}

impl Currency {
    /// ISO 4217 code, as stored in the `currency` column
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Eur => "EUR",
            Currency::Itl => "ITL",
        }
    }

    pub fn all() -> &'static [Currency] {
        &[Currency::Eur, Currency::Itl]
    }

    /// Normalize a face value in this currency to whole euro cents.
    ///
    /// Rounds half away from zero: `0.85 EUR` is 85 cents, `100 ITL` is 5 cents.
    pub fn to_euro_cents(&self, value: f64) -> i64 {
        let euros = match self {
            Currency::Eur => value,
            Currency::Itl => value / LIRA_PER_EURO,
        };
        (euros * 100.0).round() as i64
    }
}

impl FromStr for Currency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "EUR" => Ok(Currency::Eur),
            "ITL" => Ok(Currency::Itl),
            _ => Err(Error::UnsupportedCurrency(s.to_string())),
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Render an amount of euro cents as `€12.34`.
pub fn format_euro_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}€{}.{:02}", sign, abs / 100, abs % 100)
}
