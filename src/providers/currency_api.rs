use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, instrument};

use crate::core::currency::{CurrencyCode, RateSnapshot, RateSource};

/// Daily rates from the jsDelivr-hosted `currency-api` feed.
pub struct CurrencyApiProvider {
    base_url: String,
}

impl CurrencyApiProvider {
    pub fn new(base_url: &str) -> Self {
        CurrencyApiProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

// `{"date": "2025-06-15", "eur": {"usd": 1.1, ...}}`, keyed by the
// lower-case base code.
#[derive(Debug, Deserialize)]
struct CurrencyApiResponse {
    date: String,
    #[serde(flatten)]
    quotes: HashMap<String, HashMap<String, f64>>,
}

#[async_trait]
impl RateSource for CurrencyApiProvider {
    #[instrument(
        name = "CurrencyApiFetch",
        skip(self),
        fields(base = %base)
    )]
    async fn fetch_rates(&self, base: CurrencyCode) -> Result<RateSnapshot> {
        let base_key = base.as_str().to_lowercase();
        let url = format!("{}/v1/currencies/{}.json", self.base_url, base_key);
        debug!("Requesting exchange rates from {}", url);

        let client = reqwest::Client::builder().user_agent("fxpad/0.1").build()?;
        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for base currency: {}", e, base))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for base currency: {}",
                response.status(),
                base
            ));
        }

        let text = response.text().await?;
        let data: CurrencyApiResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse JSON response for {}: {}", base, e))?;

        let provider_updated_on = NaiveDate::parse_from_str(&data.date, "%Y-%m-%d")
            .with_context(|| format!("Invalid rate date: {}", data.date))?;
        let quotes = data
            .quotes
            .get(&base_key)
            .ok_or_else(|| anyhow!("No rate data found for base currency: {}", base))?;

        let mut rates = HashMap::new();
        for &currency in CurrencyCode::ALL {
            if currency == base {
                rates.insert(currency, 1.0);
                continue;
            }
            let rate = quotes
                .get(&currency.as_str().to_lowercase())
                .copied()
                .filter(|rate| rate.is_finite() && *rate > 0.0);
            match rate {
                Some(rate) => {
                    rates.insert(currency, rate);
                }
                None => debug!(%currency, "No usable rate in response"),
            }
        }

        Ok(RateSnapshot {
            base,
            rates,
            fetched_on: Utc::now().date_naive(),
            provider_updated_on,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn create_mock_server(base: &str, status: u16, body: &str) -> MockServer {
        let mock_server = MockServer::start().await;
        let request_path = format!("/v1/currencies/{base}.json");

        Mock::given(method("GET"))
            .and(path(request_path))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&mock_server)
            .await;

        mock_server
    }

    #[tokio::test]
    async fn test_successful_rates_fetch() {
        let mock_response = r#"{
            "date": "2025-06-15",
            "eur": {
                "eur": 1,
                "usd": 1.1,
                "gel": 3.0,
                "btc": 0.000012,
                "rub": 0
            }
        }"#;
        let mock_server = create_mock_server("eur", 200, mock_response).await;
        let provider = CurrencyApiProvider::new(&mock_server.uri());

        let snapshot = provider.fetch_rates(CurrencyCode::Eur).await.unwrap();

        assert_eq!(snapshot.base, CurrencyCode::Eur);
        assert_eq!(snapshot.rates.len(), 3);
        assert_eq!(snapshot.rates[&CurrencyCode::Eur], 1.0);
        assert_eq!(snapshot.rates[&CurrencyCode::Usd], 1.1);
        assert_eq!(snapshot.rates[&CurrencyCode::Gel], 3.0);
        assert!(!snapshot.rates.contains_key(&CurrencyCode::Rub));
        assert_eq!(
            snapshot.provider_updated_on,
            NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
        );
        assert_eq!(snapshot.fetched_on, Utc::now().date_naive());
        assert!(!snapshot.is_complete());
    }

    #[tokio::test]
    async fn test_base_rate_is_forced_to_one() {
        let mock_response = r#"{"date": "2025-06-15", "usd": {"eur": 0.9}}"#;
        let mock_server = create_mock_server("usd", 200, mock_response).await;
        let provider = CurrencyApiProvider::new(&format!("{}/", mock_server.uri()));

        let snapshot = provider.fetch_rates(CurrencyCode::Usd).await.unwrap();

        assert_eq!(snapshot.rates[&CurrencyCode::Usd], 1.0);
        assert_eq!(snapshot.rates[&CurrencyCode::Eur], 0.9);
    }

    #[tokio::test]
    async fn test_api_error_response() {
        let mock_server = create_mock_server("eur", 500, "").await;
        let provider = CurrencyApiProvider::new(&mock_server.uri());

        let result = provider.fetch_rates(CurrencyCode::Eur).await;
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().to_string(),
            "HTTP error: 500 Internal Server Error for base currency: EUR"
        );
    }

    #[tokio::test]
    async fn test_malformed_response() {
        let mock_server = create_mock_server("eur", 200, r#"{"eur": {"usd": 1.1}}"#).await;
        let provider = CurrencyApiProvider::new(&mock_server.uri());

        let result = provider.fetch_rates(CurrencyCode::Eur).await;
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to parse JSON response for EUR")
        );
    }

    #[tokio::test]
    async fn test_missing_base_section() {
        let mock_response = r#"{"date": "2025-06-15", "usd": {"eur": 0.9}}"#;
        let mock_server = create_mock_server("eur", 200, mock_response).await;
        let provider = CurrencyApiProvider::new(&mock_server.uri());

        let result = provider.fetch_rates(CurrencyCode::Eur).await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "No rate data found for base currency: EUR"
        );
    }

    #[tokio::test]
    async fn test_invalid_date() {
        let mock_response = r#"{"date": "15/06/2025", "eur": {"usd": 1.1}}"#;
        let mock_server = create_mock_server("eur", 200, mock_response).await;
        let provider = CurrencyApiProvider::new(&mock_server.uri());

        let result = provider.fetch_rates(CurrencyCode::Eur).await;
        assert!(result.is_err());
    }
}
