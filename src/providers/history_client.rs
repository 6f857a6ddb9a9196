use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use rust_decimal::Decimal;
use serde_json::json;

use super::types::{GraphQlRequest, GraphQlResponse, HistoricalDataPayload};
use super::{PriceSource, ProviderError};

const HISTORICAL_DATA_QUERY: &str = r#"
query HistoricalData($symbol: String!, $startDate: String!, $endDate: String!) {
  historicalData(symbol: $symbol, startDate: $startDate, endDate: $endDate) {
    date
    close
  }
}
"#;

/// GraphQL client for the price-history service.
#[derive(Debug, Clone)]
pub struct HistoryClient {
    http: Client,
    endpoint: String,
}

impl HistoryClient {
    pub fn new(http: Client, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }

    /// Fetch daily rows for `[start, end]`.
    pub async fn get_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<HistoricalDataPayload, ProviderError> {
        let body = GraphQlRequest {
            query: HISTORICAL_DATA_QUERY,
            variables: json!({
                "symbol": symbol,
                "startDate": start.format("%Y-%m-%d").to_string(),
                "endDate": end.format("%Y-%m-%d").to_string(),
            }),
        };

        let resp = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let payload: GraphQlResponse<HistoricalDataPayload> = resp.json().await?;
        payload.into_data()
    }
}

#[async_trait]
impl PriceSource for HistoryClient {
    async fn fetch_close(&self, symbol: &str, date: NaiveDate) -> Result<Option<Decimal>, ProviderError> {
        let payload = self.get_history(symbol, date, date).await?;

        // The source may answer with neighbouring trading days; only an exact
        // date match counts.
        let Some(row) = payload
            .historical_data
            .iter()
            .find(|row| row.trading_date() == Some(date))
        else {
            tracing::debug!(
                symbol,
                %date,
                rows = payload.historical_data.len(),
                "No historical row for date"
            );
            return Ok(None);
        };

        row.close_price().map(Some)
    }
}
