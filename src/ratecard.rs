//! The Azure rate card: an immutable price list mapping each billable meter
//! to its tiered unit prices.
//!
//! The wire format carries `rates` as an object keyed by tier-threshold
//! strings (`"0"`, `"100"`, ...). Parsing sorts the thresholds numerically so
//! index 0 is always the base tier, which is the only tier the reconciler
//! uses.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{Error, Result};

/// One billable meter from the rate card.
#[derive(Debug, Clone)]
pub struct Meter {
    pub id: String,
    pub name: String,
    pub category: String,
    pub subcategory: String,
    pub region: String,
    pub unit: String,
    /// Tiered unit prices, base tier first.
    pub rates: Vec<Decimal>,
}

impl Meter {
    pub fn base_rate(&self) -> Decimal {
        self.rates.first().copied().unwrap_or(Decimal::ZERO)
    }
}

/// Immutable meter-id → meter map, loaded once per run.
#[derive(Debug)]
pub struct RateCatalog {
    meters: HashMap<String, Meter>,
    pub currency: String,
    pub locale: String,
}

impl RateCatalog {
    pub fn new(meters: impl IntoIterator<Item = Meter>, currency: String, locale: String) -> Self {
        Self {
            meters: meters.into_iter().map(|m| (m.id.clone(), m)).collect(),
            currency,
            locale,
        }
    }

    /// Exact, case-sensitive lookup. Callers must pre-normalize if needed.
    pub fn get(&self, meter_id: &str) -> Option<&Meter> {
        self.meters.get(meter_id)
    }

    pub fn len(&self) -> usize {
        self.meters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meters.is_empty()
    }
}

#[derive(Deserialize)]
struct RateCardEnvelope {
    #[serde(default)]
    currency: String,
    #[serde(default)]
    locale: String,
    #[serde(default)]
    meters: Vec<MeterDto>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MeterDto {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    subcategory: String,
    #[serde(default)]
    region: String,
    #[serde(default)]
    unit: String,
    #[serde(default)]
    rates: HashMap<String, Decimal>,
}

impl MeterDto {
    fn into_meter(self) -> Meter {
        // Sort thresholds numerically; unparseable keys sink to the back so
        // a malformed tier never displaces the "0" base rate.
        let mut tiers: Vec<(Decimal, Decimal)> = Vec::with_capacity(self.rates.len());
        let mut malformed: Vec<Decimal> = Vec::new();
        for (threshold, price) in self.rates {
            match threshold.parse::<Decimal>() {
                Ok(t) => tiers.push((t, price)),
                Err(_) => malformed.push(price),
            }
        }
        tiers.sort_by(|a, b| a.0.cmp(&b.0));

        let mut rates: Vec<Decimal> = tiers.into_iter().map(|(_, p)| p).collect();
        rates.extend(malformed);

        Meter {
            id: self.id,
            name: self.name,
            category: self.category,
            subcategory: self.subcategory,
            region: self.region,
            unit: self.unit,
            rates,
        }
    }
}

/// Parse a rate-card response body into a catalog.
pub fn parse_rate_card(body: &str) -> Result<RateCatalog> {
    let envelope: RateCardEnvelope = serde_json::from_str(body)
        .map_err(|e| Error::CatalogUnavailable(format!("malformed rate card response: {e}")))?;

    Ok(RateCatalog::new(
        envelope.meters.into_iter().map(MeterDto::into_meter),
        envelope.currency,
        envelope.locale,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn parses_meters_with_sorted_tiers() {
        let body = serde_json::json!({
            "locale": "en-US",
            "currency": "USD",
            "meters": [
                {
                    "id": "meter-A",
                    "name": "Standard IO - Page Blob/Disk (GB)",
                    "category": "Storage",
                    "subcategory": "Locally Redundant",
                    "region": "eastus",
                    "unit": "GB",
                    "rates": { "100": "2.0", "0": "2.5", "1000": "1.5" }
                }
            ]
        })
        .to_string();

        let catalog = parse_rate_card(&body).unwrap();
        assert_eq!(catalog.currency, "USD");
        assert_eq!(catalog.len(), 1);

        let meter = catalog.get("meter-A").unwrap();
        assert_eq!(meter.rates, vec![dec!(2.5), dec!(2.0), dec!(1.5)]);
        assert_eq!(meter.base_rate(), dec!(2.5));
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let catalog = RateCatalog::new(
            [Meter {
                id: "Meter-A".into(),
                name: String::new(),
                category: String::new(),
                subcategory: String::new(),
                region: String::new(),
                unit: String::new(),
                rates: vec![dec!(1.0)],
            }],
            "USD".into(),
            "en-US".into(),
        );

        assert!(catalog.get("Meter-A").is_some());
        assert!(catalog.get("meter-a").is_none());
    }

    #[test]
    fn numeric_rate_values_accepted() {
        // Some rate card payloads carry rates as JSON numbers, not strings.
        let body = r#"{"currency":"USD","locale":"en-US","meters":[
            {"id":"m1","rates":{"0":0.0036}}
        ]}"#;

        let catalog = parse_rate_card(body).unwrap();
        assert_eq!(catalog.get("m1").unwrap().base_rate(), dec!(0.0036));
    }

    #[test]
    fn malformed_body_is_catalog_unavailable() {
        let err = parse_rate_card("not json").unwrap_err();
        assert!(matches!(err, Error::CatalogUnavailable(_)));
    }
}
