use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Outcome, Verdict};

/// Prices too large to compare within `Decimal` range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("price arithmetic overflowed (user {user}, model {model}, actual {actual})")]
pub struct ScoringOverflow {
    pub user: Decimal,
    pub model: Decimal,
    pub actual: Decimal,
}

/// Coin rewards and the accuracy band used to judge a prediction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringPolicy {
    /// Band around the model forecast, as a fraction of it (default 0.5%).
    pub band_pct: Decimal,
    /// User and model both inside the band.
    pub baseline_win_coins: i32,
    /// User inside the band while the model missed it.
    pub bonus_win_coins: i32,
    /// Everything else.
    pub loss_coins: i32,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            band_pct: Decimal::new(5, 3), // 0.005
            baseline_win_coins: 100,
            bonus_win_coins: 200,
            loss_coins: -10,
        }
    }
}

impl ScoringPolicy {
    /// Accuracy threshold for a given model forecast. `None` on overflow.
    pub fn threshold(&self, model_predicted: Decimal) -> Option<Decimal> {
        model_predicted.checked_mul(self.band_pct)
    }

    /// Judge a user prediction against the realised close and the model forecast.
    pub fn score(
        &self,
        user_predicted: Decimal,
        model_predicted: Decimal,
        actual: Decimal,
    ) -> Result<Verdict, ScoringOverflow> {
        let overflow = || ScoringOverflow {
            user: user_predicted,
            model: model_predicted,
            actual,
        };

        let threshold = self.threshold(model_predicted).ok_or_else(overflow)?;
        let user_miss = user_predicted.checked_sub(actual).ok_or_else(overflow)?.abs();
        let model_miss = model_predicted.checked_sub(actual).ok_or_else(overflow)?.abs();

        let verdict = match (user_miss <= threshold, model_miss <= threshold) {
            (true, true) => Verdict {
                outcome: Outcome::Won,
                coins: self.baseline_win_coins,
            },
            (true, false) => Verdict {
                outcome: Outcome::Won,
                coins: self.bonus_win_coins,
            },
            _ => Verdict {
                outcome: Outcome::Lost,
                coins: self.loss_coins,
            },
        };

        Ok(verdict)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
