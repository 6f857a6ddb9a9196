use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ProviderError;

#[derive(Debug, Serialize)]
pub struct GraphQlRequest<'a> {
    pub query: &'a str,
    pub variables: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    pub errors: Option<Vec<GraphQlError>>,
}

impl<T> GraphQlResponse<T> {
    /// Payload of a successful response; GraphQL `errors` become `Remote`.
    pub fn into_data(self) -> Result<T, ProviderError> {
        if let Some(errors) = self.errors.filter(|errors| !errors.is_empty()) {
            let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
            return Err(ProviderError::Remote(messages.join("; ")));
        }
        self.data
            .ok_or_else(|| ProviderError::Unexpected("response has no data".into()))
    }
}

// ---------------------------------------------------------------------------
// historicalData
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalDataPayload {
    #[serde(default)]
    pub historical_data: Vec<HistoricalRow>,
}

/// One trading day. Prices arrive as display strings such as `"1,234.56"`,
/// dates as `"Jun 5, 2024"`.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoricalRow {
    pub date: String,
    pub close: String,
}

impl HistoricalRow {
    /// Trading date of the row, `None` when the date string is unreadable.
    pub fn trading_date(&self) -> Option<NaiveDate> {
        parse_row_date(&self.date)
    }

    pub fn close_price(&self) -> Result<Decimal, ProviderError> {
        parse_price(&self.close)
    }
}

/// Accepts the display form (`Jun 5, 2024`, `Jun 05, 2024`) and ISO dates.
pub fn parse_row_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%b %d, %Y")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .ok()
}

pub fn parse_price(raw: &str) -> Result<Decimal, ProviderError> {
    let cleaned: String = raw.chars().filter(|c| *c != ',' && !c.is_whitespace()).collect();
    cleaned
        .parse::<Decimal>()
        .map_err(|e| ProviderError::Unexpected(format!("bad price {raw:?}: {e}")))
}

// ---------------------------------------------------------------------------
// predictStockPrice
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictStockPricePayload {
    pub predict_stock_price: Option<ApiPrediction>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPrediction {
    pub symbol: Option<String>,
    pub data_points: Option<u32>,
    pub last_closing_price: Option<Decimal>,
    pub predicted_closing_price: Option<Decimal>,
    pub predicted_change: Option<Decimal>,
    pub error: Option<String>,
}
