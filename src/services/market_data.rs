// ============================================================================
// SERVICE : MARKET DATA (Twelve Data)
// ============================================================================
//
// Description:
//   Client REST Twelve Data pour les cours journaliers. Un seul appel est
//   nécessaire : time_series interval=1day, outputsize=30, qui renvoie les
//   clôtures du plus récent au plus ancien.
//
// Points d'attention:
//   - Timeout borné (10s) : l'API amont ne doit jamais bloquer une requête
//   - Les clôtures arrivent en chaînes de caractères, parsées en f64
//
// ============================================================================

use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

const BASE_URL: &str = "https://api.twelvedata.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
/// 30 jours d'historique, comme l'analyse de tendance côté prévision
const HISTORY_SIZE: usize = 30;

#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("Market data request failed: {0}")]
    Request(String),

    #[error("No historical data available for this stock")]
    NoData,

    #[error("Malformed market data response: {0}")]
    Malformed(String),
}

#[derive(Debug, Deserialize)]
struct TimeSeriesResponse {
    values: Option<Vec<TimeSeriesValue>>,
}

#[derive(Debug, Deserialize)]
struct TimeSeriesValue {
    close: String,
}

#[derive(Clone)]
pub struct TwelveDataClient {
    api_key: String,
    client: reqwest::Client,
}

impl TwelveDataClient {
    pub fn new(api_key: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");

        Self { api_key, client }
    }

    /// Clôtures des 30 derniers jours, du plus récent au plus ancien
    pub async fn daily_closes(&self, ticker: &str) -> Result<Vec<f64>, MarketDataError> {
        let outputsize = HISTORY_SIZE.to_string();

        let response = self.client
            .get(format!("{}/time_series", BASE_URL))
            .query(&[
                ("symbol", ticker),
                ("interval", "1day"),
                ("outputsize", outputsize.as_str()),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| MarketDataError::Request(e.to_string()))?;

        if !response.status().is_success() {
            eprintln!("❌ Twelve Data API error: {}", response.status());
            return Err(MarketDataError::Request(format!(
                "Twelve Data API returned {}",
                response.status()
            )));
        }

        let body: TimeSeriesResponse = response
            .json()
            .await
            .map_err(|e| MarketDataError::Malformed(e.to_string()))?;

        let values = body.values.unwrap_or_default();
        if values.is_empty() {
            return Err(MarketDataError::NoData);
        }

        values
            .iter()
            .map(|v| {
                v.close
                    .parse::<f64>()
                    .map_err(|_| MarketDataError::Malformed(format!("bad close value: {}", v.close)))
            })
            .collect()
    }
}

/// Arrondi à 2 décimales pour les prix exposés en JSON
pub fn round_price(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_price() {
        assert_eq!(round_price(123.456), 123.46);
        assert_eq!(round_price(99.994), 99.99);
        assert_eq!(round_price(100.0), 100.0);
    }

    #[test]
    fn test_time_series_parsing() {
        let json = r#"{"values": [{"close": "187.44"}, {"close": "186.10"}]}"#;
        let parsed: TimeSeriesResponse = serde_json::from_str(json).unwrap();
        let values = parsed.values.unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(values[0].close, "187.44");
    }

    #[test]
    fn test_time_series_without_values() {
        // Twelve Data renvoie {"status":"error", ...} sans champ values
        let json = r#"{"status": "error", "message": "symbol not found"}"#;
        let parsed: TimeSeriesResponse = serde_json::from_str(json).unwrap();
        assert!(parsed.values.is_none());
    }
}
