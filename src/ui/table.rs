use crate::currency::format_euro_cents;
use crate::postage::PostageRate;
use crate::stamp::Stamp;
use crate::storage::StoreStats;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct StampRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Face value")]
    face_value: String,
    #[tabled(rename = "Euro")]
    euro: String,
    #[tabled(rename = "Qty")]
    quantity: u32,
    #[tabled(rename = "Rate")]
    rate: String,
}

impl From<&Stamp> for StampRow {
    fn from(stamp: &Stamp) -> Self {
        Self {
            id: stamp.id,
            name: stamp.name.clone(),
            face_value: stamp.face_value(),
            euro: stamp.euro_value(),
            quantity: stamp.quantity,
            rate: stamp.postage_rate_name.clone().unwrap_or_else(|| "-".to_string()),
        }
    }
}

#[derive(Tabled)]
struct RateRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Rate")]
    value: String,
    #[tabled(rename = "Max weight")]
    max_weight: String,
}

impl From<&PostageRate> for RateRow {
    fn from(rate: &PostageRate) -> Self {
        Self {
            name: rate.name.clone(),
            value: rate.euro_value(),
            max_weight: format!("{} g", rate.max_weight),
        }
    }
}

#[derive(Tabled)]
struct MetricRow {
    #[tabled(rename = "Metric")]
    metric: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

pub fn stamps_table(stamps: &[Stamp]) -> String {
    if stamps.is_empty() {
        return String::new();
    }
    Table::new(stamps.iter().map(StampRow::from))
        .with(Style::rounded())
        .to_string()
}

pub fn rates_table(rates: &[PostageRate]) -> String {
    if rates.is_empty() {
        return String::new();
    }
    Table::new(rates.iter().map(RateRow::from))
        .with(Style::rounded())
        .to_string()
}

pub fn stats_table(stats: &StoreStats) -> String {
    let rows = vec![
        MetricRow { metric: "Stamps", value: stats.stamps.to_string() },
        MetricRow { metric: "Copies", value: stats.copies.to_string() },
        MetricRow { metric: "Postage rates", value: stats.postage_rates.to_string() },
        MetricRow { metric: "Total value", value: format_euro_cents(stats.total_euro_cents) },
    ];
    Table::new(rows).with(Style::rounded()).to_string()
}
