//! The usage-to-price reconciliation join.
//!
//! Each usage record is matched to its rate card meter by id and priced at
//! the base tier: `price = rates[0] * quantity`. Tiered pricing, included
//! quantities, and duration proration are intentionally not modeled, the
//! same simplification the reconciliation sample this mirrors calls out.
//! A record with no matching meter is a data-integrity failure, never a
//! silent skip or a zero price: a partial or mispriced bill is worse than
//! an explicit error.

use clap::ValueEnum;

use crate::error::{Error, Result};
use crate::ratecard::RateCatalog;
use crate::types::{LineItem, UsageRecord};

/// What to do when a usage record references a meter the rate card does not
/// carry.
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingMeterPolicy {
    /// Stop at the first unmatched meter.
    #[default]
    FailFast,
    /// Scan everything and report every distinct unmatched meter id at once.
    Collect,
}

/// Join usage records against the catalog into priced line items.
///
/// The join is stable: output order is input order, one line item per
/// record. An empty input yields an empty output. On any missing meter no
/// line items are returned at all.
pub fn reconcile(
    catalog: &RateCatalog,
    records: impl IntoIterator<Item = UsageRecord>,
    policy: MissingMeterPolicy,
) -> Result<Vec<LineItem>> {
    let records = records.into_iter();
    let mut items = Vec::with_capacity(records.size_hint().0);
    let mut missing: Vec<String> = Vec::new();

    for record in records {
        let Some(meter) = catalog.get(&record.resource_id) else {
            match policy {
                MissingMeterPolicy::FailFast => {
                    return Err(Error::PriceLookupFailed {
                        meter_id: record.resource_id,
                    })
                }
                MissingMeterPolicy::Collect => {
                    if !missing.contains(&record.resource_id) {
                        missing.push(record.resource_id);
                    }
                    continue;
                }
            }
        };

        items.push(LineItem {
            category: record.category,
            subcategory: record.subcategory,
            id: record.resource_id,
            name: record.resource_name,
            region: record.region,
            price: meter.base_rate() * record.quantity,
            quantity: record.quantity,
            usage_start_time: record.usage_start_time,
            usage_end_time: record.usage_end_time,
            resource_uri: record.resource_uri,
        });
    }

    if !missing.is_empty() {
        return Err(Error::MetersNotFound(missing));
    }

    Ok(items)
}
