use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde_json::json;

use super::types::{GraphQlRequest, GraphQlResponse, PredictStockPricePayload};
use super::{Predictor, ProviderError};
use crate::models::PriceForecast;

const PREDICT_QUERY: &str = r#"
query PredictStockPrice($symbol: String!, $startDate: String!, $endDate: String!) {
  predictStockPrice(symbol: $symbol, startDate: $startDate, endDate: $endDate) {
    symbol
    dataPoints
    lastClosingPrice
    predictedClosingPrice
    predictedChange
    error
  }
}
"#;

/// GraphQL client for the regression predictor service.
#[derive(Debug, Clone)]
pub struct PredictorClient {
    http: Client,
    endpoint: String,
}

impl PredictorClient {
    pub fn new(http: Client, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl Predictor for PredictorClient {
    async fn predict(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceForecast, ProviderError> {
        let body = GraphQlRequest {
            query: PREDICT_QUERY,
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

        let payload: GraphQlResponse<PredictStockPricePayload> = resp.json().await?;
        let prediction = payload
            .into_data()?
            .predict_stock_price
            .ok_or_else(|| ProviderError::Unexpected("empty prediction".into()))?;

        // The predictor reports model failures in-band.
        if let Some(err) = prediction.error.filter(|e| !e.is_empty()) {
            return Err(ProviderError::Remote(err));
        }

        let predicted_closing_price = prediction
            .predicted_closing_price
            .ok_or_else(|| ProviderError::Unexpected("prediction has no closing price".into()))?;

        tracing::debug!(
            symbol,
            predicted = %predicted_closing_price,
            change_pct = ?prediction.predicted_change,
            "Predictor forecast received"
        );

        Ok(PriceForecast {
            symbol: prediction.symbol.unwrap_or_else(|| symbol.to_string()),
            predicted_closing_price,
            last_closing_price: prediction.last_closing_price,
            data_points: prediction.data_points.unwrap_or(0),
        })
    }
}
