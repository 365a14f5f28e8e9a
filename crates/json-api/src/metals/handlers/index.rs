//! Current Metal Prices Handler

use std::{collections::BTreeMap, sync::Arc};

use aurum::{metals::Metal, rates::RateTable};
use rust_decimal::Decimal;
use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};

use crate::{extensions::*, state::State};

/// Per-gram prices keyed by metal. Metals without a rate are omitted.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub(crate) struct MetalPrices {
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[salvo(schema(value_type = Option<f64>))]
    pub gold: Option<Decimal>,

    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[salvo(schema(value_type = Option<f64>))]
    pub silver: Option<Decimal>,

    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[salvo(schema(value_type = Option<f64>))]
    pub platinum: Option<Decimal>,

    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[salvo(schema(value_type = Option<f64>))]
    pub palladium: Option<Decimal>,
}

/// Metal Prices Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct MetalPricesResponse {
    /// Always true; an empty table still succeeds
    pub success: bool,

    /// Price of one gram of the pure metal
    pub prices: MetalPrices,

    /// `live` or `stored`, per metal
    pub sources: BTreeMap<String, String>,
}

impl From<RateTable> for MetalPricesResponse {
    fn from(table: RateTable) -> Self {
        let mut prices = MetalPrices::default();
        let mut sources = BTreeMap::new();

        for entry in table.iter() {
            let slot = match entry.metal {
                Metal::Gold => &mut prices.gold,
                Metal::Silver => &mut prices.silver,
                Metal::Platinum => &mut prices.platinum,
                Metal::Palladium => &mut prices.palladium,
            };

            *slot = Some(entry.price_per_gram);
            sources.insert(
                entry.metal.as_str().to_string(),
                entry.origin.as_str().to_string(),
            );
        }

        Self {
            success: true,
            prices,
            sources,
        }
    }
}

/// Current Metal Prices Handler
///
/// Returns the merged rate table: live spot prices while fresh, stored rates
/// otherwise.
#[endpoint(
    tags("metals"),
    summary = "Current Metal Prices",
    security(("identity" = []))
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<MetalPricesResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let table = state.app.rates.current_rates().await;

    Ok(Json(table.into()))
}

#[cfg(test)]
mod tests {
    use aurum::rates::{RateEntry, RateOrigin};
    use jiff::Timestamp;
    use rust_decimal_macros::dec;
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::{Value, json};
    use testresult::TestResult;

    use crate::test_helpers::{AsActor, CUSTOMER, MockApp};

    use super::*;

    fn make_service(app: MockApp) -> Service {
        app.into_service(Router::with_path("metals/prices").get(handler))
    }

    fn entry(metal: Metal, price_per_gram: Decimal, origin: RateOrigin) -> RateEntry {
        RateEntry {
            metal,
            price_per_gram,
            origin,
            fetched_at: Timestamp::UNIX_EPOCH,
        }
    }

    #[tokio::test]
    async fn test_prices_report_value_and_origin() -> TestResult {
        let mut app = MockApp::default();

        app.rates.expect_current_rates().once().return_once(|| {
            [
                entry(Metal::Gold, dec!(6000), RateOrigin::Live),
                entry(Metal::Platinum, dec!(3100.5), RateOrigin::Stored),
            ]
            .into_iter()
            .collect()
        });

        let mut res = TestClient::get("http://example.com/metals/prices")
            .as_actor(CUSTOMER)
            .send(&make_service(app))
            .await;

        let body: Value = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(
            body,
            json!({
                "success": true,
                "prices": { "gold": 6000.0, "platinum": 3100.5 },
                "sources": { "gold": "live", "platinum": "stored" },
            })
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_empty_table_still_succeeds() -> TestResult {
        let mut app = MockApp::default();

        app.rates
            .expect_current_rates()
            .once()
            .return_once(RateTable::new);

        let mut res = TestClient::get("http://example.com/metals/prices")
            .as_actor(CUSTOMER)
            .send(&make_service(app))
            .await;

        let body: Value = res.take_json().await?;

        assert_eq!(body, json!({ "success": true, "prices": {}, "sources": {} }));

        Ok(())
    }

    #[tokio::test]
    async fn test_prices_require_identity() -> TestResult {
        let mut app = MockApp::default();

        app.rates.expect_current_rates().never();

        let res = TestClient::get("http://example.com/metals/prices")
            .send(&make_service(app))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));

        Ok(())
    }
}
