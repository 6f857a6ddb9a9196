pub mod history_client;
pub mod predictor_client;
pub mod types;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::PriceForecast;

pub use history_client::HistoryClient;
pub use predictor_client::PredictorClient;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("remote service error: {0}")]
    Remote(String),

    #[error("unexpected response: {0}")]
    Unexpected(String),
}

/// Forecasts a closing price from the history in `[start, end]`.
#[async_trait]
pub trait Predictor: Send + Sync {
    async fn predict(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceForecast, ProviderError>;
}

/// Realised closing prices. `Ok(None)` means the source has no row for the
/// date; transport and remote failures are `Err`.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch_close(&self, symbol: &str, date: NaiveDate) -> Result<Option<Decimal>, ProviderError>;
}
