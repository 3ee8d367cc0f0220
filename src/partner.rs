//! Partner Center HTTP boundary: token exchange, the rate card endpoint,
//! and the paginated utilization endpoint.
//!
//! Every request carries `MS-CorrelationId` (one id for the whole run) and a
//! fresh `MS-RequestId`, so a support case can tie the calls together.
//! Calls are blocking with no retry; a failed call fails the run.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::feed::{UsageFeed, UsagePage, UsagePageSource};
use crate::types::{Granularity, UsageRecord};

const LOGIN_BASE: &str = "https://login.microsoftonline.com";
const API_BASE: &str = "https://api.partnercenter.microsoft.com";
const CONTINUATION_HEADER: &str = "MS-ContinuationToken";

/// Parameters of a utilization query.
#[derive(Debug, Clone)]
pub struct UsageQuery {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub granularity: Granularity,
    /// Include instance details (resource URI, tags) in each record.
    pub show_details: bool,
    /// Records per page; bounds the payload of each round-trip.
    pub page_size: u32,
}

impl UsageQuery {
    /// The sample defaults: trailing seven days, daily grain, details on,
    /// ten records per call.
    pub fn trailing_days(days: i64) -> Self {
        let end = Utc::now();
        Self {
            start: end - Duration::days(days),
            end,
            granularity: Granularity::Daily,
            show_details: true,
            page_size: 10,
        }
    }
}

/// An authenticated Partner Center client.
pub struct PartnerClient {
    agent: ureq::Agent,
    token: String,
    correlation_id: Uuid,
    api_base: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl PartnerClient {
    /// Exchange application credentials for a bearer token.
    pub fn connect(config: &crate::config::Config, correlation_id: Uuid) -> Result<Self> {
        let agent = ureq::Agent::new_with_defaults();
        let url = format!("{LOGIN_BASE}/{}/oauth2/token", config.account_id);

        let mut response = agent
            .post(&url)
            .send_form([
                ("grant_type", "client_credentials"),
                ("client_id", config.application_id.as_str()),
                ("client_secret", config.application_secret.as_str()),
                ("resource", API_BASE),
            ])
            .map_err(|e| Error::AuthenticationFailed(e.to_string()))?;

        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| Error::AuthenticationFailed(e.to_string()))?;

        let token: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| Error::AuthenticationFailed(format!("malformed token response: {e}")))?;

        Ok(Self {
            agent,
            token: token.access_token,
            correlation_id,
            api_base: API_BASE.to_string(),
        })
    }

    pub fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn get(&self, url: &str, query: &[(&str, String)], continuation: Option<&str>) -> ureq::RequestBuilder<ureq::typestate::WithoutBody> {
        let mut request = self
            .agent
            .get(url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/json")
            .header("MS-CorrelationId", self.correlation_id.to_string())
            .header("MS-RequestId", Uuid::new_v4().to_string());

        for (key, value) in query {
            request = request.query(*key, value);
        }
        if let Some(token) = continuation {
            request = request
                .header(CONTINUATION_HEADER, token)
                .query("seekOperation", "Next");
        }
        request
    }

    /// Fetch the full Azure rate card. One unpaginated call.
    pub fn rate_card(&self) -> Result<crate::ratecard::RateCatalog> {
        let url = format!("{}/v1/ratecards/azure", self.api_base);
        let body = self
            .get(&url, &[], None)
            .call()
            .and_then(|mut r| r.body_mut().read_to_string())
            .map_err(|e| Error::CatalogUnavailable(e.to_string()))?;

        crate::ratecard::parse_rate_card(&body)
    }

    /// Utilization records for one subscription, as a lazy paginated feed.
    pub fn usage<'a>(
        &'a self,
        customer_id: &str,
        subscription_id: &str,
        query: &UsageQuery,
    ) -> UsageFeed<UtilizationSource<'a>> {
        UsageFeed::new(UtilizationSource {
            client: self,
            url: format!(
                "{}/v1/customers/{customer_id}/subscriptions/{subscription_id}/utilizations/azure",
                self.api_base
            ),
            query: query.clone(),
        })
    }
}

/// HTTP-backed page source for one subscription's utilization query.
pub struct UtilizationSource<'a> {
    client: &'a PartnerClient,
    url: String,
    query: UsageQuery,
}

impl UtilizationSource<'_> {
    fn fetch(&self, continuation: Option<&str>) -> Result<UsagePage> {
        let params = [
            ("start_time", self.query.start.to_rfc3339()),
            ("end_time", self.query.end.to_rfc3339()),
            (
                "granularity",
                self.query.granularity.as_query_value().to_string(),
            ),
            ("show_details", self.query.show_details.to_string()),
            ("size", self.query.page_size.to_string()),
        ];

        let body = self
            .client
            .get(&self.url, &params, continuation)
            .call()
            .and_then(|mut r| r.body_mut().read_to_string())
            .map_err(|e| Error::UsageFetchFailed(e.to_string()))?;

        parse_usage_page(&body)
    }
}

impl UsagePageSource for UtilizationSource<'_> {
    fn first_page(&self) -> Result<UsagePage> {
        self.fetch(None)
    }

    fn next_page(&self, continuation: &str) -> Result<UsagePage> {
        self.fetch(Some(continuation))
    }
}

// Wire DTOs for the utilization resource collection.

#[derive(Deserialize)]
struct UsageCollectionDto {
    #[serde(default)]
    items: Vec<UsageRecordDto>,
    #[serde(default)]
    links: LinksDto,
}

#[derive(Deserialize, Default)]
struct LinksDto {
    next: Option<LinkDto>,
}

#[derive(Deserialize)]
struct LinkDto {
    #[serde(default)]
    headers: Vec<HeaderDto>,
}

#[derive(Deserialize)]
struct HeaderDto {
    key: String,
    value: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageRecordDto {
    usage_start_time: DateTime<Utc>,
    usage_end_time: DateTime<Utc>,
    resource: ResourceDto,
    quantity: rust_decimal::Decimal,
    #[serde(default)]
    unit: String,
    #[serde(default)]
    instance_data: Option<InstanceDataDto>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceDto {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    subcategory: String,
    #[serde(default)]
    region: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InstanceDataDto {
    #[serde(default)]
    resource_uri: String,
}

impl UsageRecordDto {
    fn into_record(self) -> UsageRecord {
        UsageRecord {
            resource_id: self.resource.id,
            resource_name: self.resource.name,
            category: self.resource.category,
            subcategory: self.resource.subcategory,
            region: self.resource.region,
            quantity: self.quantity,
            unit: self.unit,
            usage_start_time: self.usage_start_time,
            usage_end_time: self.usage_end_time,
            resource_uri: self.instance_data.map(|d| d.resource_uri).unwrap_or_default(),
        }
    }
}

/// Parse one utilization response body. The continuation token, when
/// present, rides in the `links.next` headers.
fn parse_usage_page(body: &str) -> Result<UsagePage> {
    let collection: UsageCollectionDto = serde_json::from_str(body)
        .map_err(|e| Error::UsageFetchFailed(format!("malformed utilization response: {e}")))?;

    let continuation = collection.links.next.and_then(|next| {
        next.headers
            .into_iter()
            .find(|h| h.key.eq_ignore_ascii_case(CONTINUATION_HEADER))
            .map(|h| h.value)
    });

    Ok(UsagePage {
        items: collection
            .items
            .into_iter()
            .map(UsageRecordDto::into_record)
            .collect(),
        continuation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn parses_a_page_with_continuation() {
        let body = serde_json::json!({
            "totalCount": 2,
            "items": [
                {
                    "usageStartTime": "2017-06-01T00:00:00+00:00",
                    "usageEndTime": "2017-06-02T00:00:00+00:00",
                    "resource": {
                        "id": "meter-A",
                        "name": "Standard IO - Page Blob/Disk (GB)",
                        "category": "Storage",
                        "subcategory": "Locally Redundant",
                        "region": "eastus"
                    },
                    "quantity": 3,
                    "unit": "GB",
                    "instanceData": {
                        "resourceUri": "/subscriptions/s/resourceGroups/rg/disk0"
                    }
                },
                {
                    "usageStartTime": "2017-06-01T00:00:00Z",
                    "usageEndTime": "2017-06-02T00:00:00Z",
                    "resource": { "id": "meter-B" },
                    "quantity": "0.25"
                }
            ],
            "links": {
                "next": {
                    "uri": "customers/c/subscriptions/s/utilizations/azure?size=10&seekOperation=Next",
                    "method": "GET",
                    "headers": [
                        { "key": "MS-ContinuationToken", "value": "token-123" }
                    ]
                }
            }
        })
        .to_string();

        let page = parse_usage_page(&body).unwrap();
        assert_eq!(page.continuation.as_deref(), Some("token-123"));
        assert_eq!(page.items.len(), 2);

        let first = &page.items[0];
        assert_eq!(first.resource_id, "meter-A");
        assert_eq!(first.quantity, dec!(3));
        assert_eq!(first.subcategory, "Locally Redundant");
        assert_eq!(first.resource_uri, "/subscriptions/s/resourceGroups/rg/disk0");

        // Missing optional fields default to empty.
        let second = &page.items[1];
        assert_eq!(second.quantity, dec!(0.25));
        assert!(second.resource_uri.is_empty());
        assert!(second.region.is_empty());
    }

    #[test]
    fn final_page_has_no_continuation() {
        let body = r#"{"totalCount":0,"items":[],"links":{"self":{"uri":"x"}}}"#;
        let page = parse_usage_page(body).unwrap();
        assert!(page.items.is_empty());
        assert!(page.continuation.is_none());
    }

    #[test]
    fn malformed_body_is_usage_fetch_failed() {
        let err = parse_usage_page("<html>gateway timeout</html>").unwrap_err();
        assert!(matches!(err, Error::UsageFetchFailed(_)));
    }

    #[test]
    fn trailing_days_defaults_match_the_sample() {
        let query = UsageQuery::trailing_days(7);
        assert_eq!(query.granularity, Granularity::Daily);
        assert!(query.show_details);
        assert_eq!(query.page_size, 10);
        assert_eq!((query.end - query.start).num_days(), 7);
    }
}
