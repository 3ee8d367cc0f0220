use chrono::{DateTime, Utc};
use clap::ValueEnum;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A measured quantity of an Azure resource consumed over a time window,
/// as reported by the Partner Center utilization API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageRecord {
    pub resource_id: String,
    pub resource_name: String,
    pub category: String,
    pub subcategory: String,
    pub region: String,
    pub quantity: Decimal,
    pub unit: String,
    pub usage_start_time: DateTime<Utc>,
    pub usage_end_time: DateTime<Utc>,
    /// Fully qualified Azure resource URI (resource group + instance name).
    /// Empty when the query was made without instance details.
    pub resource_uri: String,
}

/// A priced usage record, ready for billing presentation. One per
/// [`UsageRecord`]; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    pub category: String,
    pub subcategory: String,
    pub id: String,
    pub name: String,
    pub region: String,
    pub quantity: Decimal,
    pub price: Decimal,
    pub usage_start_time: DateTime<Utc>,
    pub usage_end_time: DateTime<Utc>,
    pub resource_uri: String,
}

/// Aggregation granularity of the utilization query.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Daily,
    Hourly,
}

impl Granularity {
    /// Wire value expected by the utilization endpoint.
    pub fn as_query_value(&self) -> &'static str {
        match self {
            Granularity::Daily => "daily",
            Granularity::Hourly => "hourly",
        }
    }
}
