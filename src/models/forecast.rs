use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Model forecast returned by the predictor service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceForecast {
    pub symbol: String,
    pub predicted_closing_price: Decimal,
    pub last_closing_price: Option<Decimal>,
    pub data_points: u32,
}
