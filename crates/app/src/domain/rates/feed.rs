//! Spot Feed
//!
//! Fetches gold and silver spot prices, per troy ounce in the account currency,
//! from a third-party JSON endpoint. One attempt per call; the caller owns any
//! fallback.

use std::time::Duration;

use async_trait::async_trait;
use mockall::automock;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use tokio::time::timeout;
use tracing::debug;

use super::errors::FeedError;

/// Default upstream endpoint.
pub const DEFAULT_FEED_URL: &str = "https://data-asg.goldprice.org/dbXRates/INR";

/// Default hard timeout for one fetch.
pub const DEFAULT_FEED_TIMEOUT: Duration = Duration::from_secs(5);

/// Spot prices per troy ounce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpotQuote {
    /// Gold price per troy ounce, in the feed's currency.
    pub gold_per_oz: Decimal,

    /// Silver price per troy ounce, in the feed's currency.
    pub silver_per_oz: Decimal,
}

#[automock]
#[async_trait]
pub trait SpotFeed: Send + Sync {
    /// Fetch the current gold and silver spot prices.
    async fn fetch_spot(&self) -> Result<SpotQuote, FeedError>;
}

#[derive(Debug, Deserialize)]
struct SpotResponse {
    #[serde(default)]
    items: Vec<SpotItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpotItem {
    xau_price: Option<f64>,
    xag_price: Option<f64>,
}

/// [`SpotFeed`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSpotFeed {
    client: Client,
    url: String,
    timeout: Duration,
}

impl HttpSpotFeed {
    #[must_use]
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self::with_client(Client::new(), url, timeout)
    }

    #[must_use]
    pub fn with_client(client: Client, url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            url: url.into(),
            timeout,
        }
    }
}

#[async_trait]
impl SpotFeed for HttpSpotFeed {
    async fn fetch_spot(&self) -> Result<SpotQuote, FeedError> {
        debug!(url = %self.url, "fetching spot prices");

        let request = async {
            let response = self
                .client
                .get(&self.url)
                .header(reqwest::header::USER_AGENT, "aurum/0.1")
                .send()
                .await
                .map_err(|error| FeedError::Unavailable(error.to_string()))?;

            if !response.status().is_success() {
                return Err(FeedError::Unavailable(format!(
                    "upstream answered {}",
                    response.status()
                )));
            }

            response
                .json::<SpotResponse>()
                .await
                .map_err(|error| FeedError::Malformed(error.to_string()))
        };

        let body = timeout(self.timeout, request)
            .await
            .map_err(|_elapsed| FeedError::Timeout)??;

        parse_quote(&body)
    }
}

fn parse_quote(body: &SpotResponse) -> Result<SpotQuote, FeedError> {
    let item = body
        .items
        .first()
        .ok_or_else(|| FeedError::Malformed("no items in response".to_string()))?;

    Ok(SpotQuote {
        gold_per_oz: positive_price("xauPrice", item.xau_price)?,
        silver_per_oz: positive_price("xagPrice", item.xag_price)?,
    })
}

fn positive_price(field: &str, raw: Option<f64>) -> Result<Decimal, FeedError> {
    let raw = raw.ok_or_else(|| FeedError::Malformed(format!("{field} missing")))?;

    let price = Decimal::try_from(raw)
        .map_err(|error| FeedError::Malformed(format!("{field}: {error}")))?;

    if price <= Decimal::ZERO {
        return Err(FeedError::Malformed(format!("{field} is not positive")));
    }

    Ok(price)
}
