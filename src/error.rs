//! Error taxonomy for the fetch-and-reconcile pipeline.
//!
//! Every variant is fatal for the run: there is no retry and no
//! partial-output mode. A bill that is known to be incomplete or mispriced
//! is never printed.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The client-credentials exchange was rejected. Nothing has been
    /// fetched yet when this fires.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The rate card could not be fetched; nothing downstream can price
    /// correctly without it.
    #[error("rate card unavailable: {0}")]
    CatalogUnavailable(String),

    /// A utilization page fetch failed mid-feed.
    #[error("usage fetch failed: {0}")]
    UsageFetchFailed(String),

    /// A usage record references a meter the rate card does not carry.
    /// Raised under the fail-fast policy.
    #[error("no rate card entry for meter {meter_id}")]
    PriceLookupFailed { meter_id: String },

    /// Every distinct unmatched meter id, in first-appearance order.
    /// Raised under the collect-all policy.
    #[error("no rate card entry for {} meter(s): {}", .0.len(), .0.join(", "))]
    MetersNotFound(Vec<String>),
}
