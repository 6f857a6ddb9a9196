use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Duration, Months, NaiveDate, Utc};
use metrics::counter;
use rust_decimal::Decimal;

use super::calendar::MarketCalendar;
use super::reconciler;
use super::scoring::ScoringPolicy;
use crate::db::GameStore;
use crate::errors::GameError;
use crate::models::{GameId, GameIdGenerator, GameRecord, Verdict};
use crate::providers::{PriceSource, Predictor};

/// Retention and predictor window settings.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// How long game records are kept (default 7 days).
    pub game_ttl: Duration,
    /// History handed to the predictor, ending at the evaluation date.
    pub lookback_months: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            game_ttl: Duration::days(7),
            lookback_months: 24,
        }
    }
}

/// A validated submission.
#[derive(Debug, Clone)]
struct Submission<'a> {
    owner_id: &'a str,
    symbol: &'a str,
    prediction_text: &'a str,
    predicted_price: Decimal,
}

impl<'a> Submission<'a> {
    fn parse(owner_id: &'a str, symbol: &'a str, prediction_text: &'a str) -> Result<Self, GameError> {
        if owner_id.trim().is_empty() {
            return Err(GameError::InvalidInput("owner_id is required".into()));
        }
        if symbol.trim().is_empty() {
            return Err(GameError::InvalidInput("symbol is required".into()));
        }
        let predicted_price = Decimal::from_str(prediction_text.trim()).map_err(|_| {
            GameError::InvalidInput(format!("user_prediction {prediction_text:?} is not a number"))
        })?;
        if predicted_price <= Decimal::ZERO {
            return Err(GameError::InvalidInput(format!(
                "user_prediction must be a positive price, got {predicted_price}"
            )));
        }

        Ok(Self {
            owner_id,
            symbol,
            prediction_text,
            predicted_price,
        })
    }

    /// Symbol as the collaborators expect it.
    fn ticker(&self) -> String {
        self.symbol.trim().to_uppercase()
    }
}

/// Creates, evaluates and lists prediction games.
///
/// Evaluation happens only inside `submit`, when the calendar says the latest
/// close is authoritative. Reads re-derive provisional status on every call.
pub struct GameEngine {
    store: Arc<dyn GameStore>,
    predictor: Arc<dyn Predictor>,
    prices: Arc<dyn PriceSource>,
    calendar: MarketCalendar,
    policy: ScoringPolicy,
    settings: EngineSettings,
    ids: GameIdGenerator,
}

impl GameEngine {
    pub fn new(
        store: Arc<dyn GameStore>,
        predictor: Arc<dyn Predictor>,
        prices: Arc<dyn PriceSource>,
        calendar: MarketCalendar,
        policy: ScoringPolicy,
        settings: EngineSettings,
    ) -> Self {
        Self {
            store,
            predictor,
            prices,
            calendar,
            policy,
            settings,
            ids: GameIdGenerator::new(),
        }
    }

    pub fn calendar(&self) -> &MarketCalendar {
        &self.calendar
    }

    pub fn store(&self) -> &Arc<dyn GameStore> {
        &self.store
    }

    /// Record a prediction and evaluate it if the calendar allows.
    ///
    /// The provisional record is stored before any evaluation, so a failed
    /// evaluation leaves it as the stored state for this id.
    pub async fn submit(
        &self,
        owner_id: &str,
        symbol: &str,
        prediction_text: &str,
        now: DateTime<Utc>,
    ) -> Result<GameRecord, GameError> {
        let submission = Submission::parse(owner_id, symbol, prediction_text)?;

        let game = GameRecord::provisional(
            self.ids.next(now),
            submission.owner_id,
            submission.symbol,
            submission.prediction_text,
        );
        self.persist(&game).await?;
        counter!("games_submitted_total").increment(1);

        if self.calendar.is_market_open(now) || !self.calendar.can_evaluate_now(now) {
            tracing::info!(
                game_id = %game.id,
                owner = %game.owner_id,
                symbol = %game.symbol,
                "Game recorded as provisional, results not ready"
            );
            return Ok(game);
        }

        let verdict = match self.evaluate(&submission, now).await {
            Ok(v) => v,
            Err(e) => {
                counter!("game_evaluations_failed_total").increment(1);
                tracing::warn!(
                    error = %e,
                    game_id = %game.id,
                    symbol = %game.symbol,
                    "Evaluation failed, game stays provisional"
                );
                return Err(e);
            }
        };

        let scored = game.with_verdict(verdict);
        self.persist(&scored).await?;
        counter!("games_scored_total").increment(1);

        tracing::info!(
            game_id = %scored.id,
            owner = %scored.owner_id,
            symbol = %scored.symbol,
            outcome = %scored.outcome,
            coins = scored.coins_earned,
            "Game scored"
        );

        Ok(scored)
    }

    async fn evaluate(&self, submission: &Submission<'_>, now: DateTime<Utc>) -> Result<Verdict, GameError> {
        let ticker = submission.ticker();
        let evaluation_date = self.calendar.evaluation_date_for(now);
        let start_date = self.lookback_start(evaluation_date);

        tracing::debug!(
            symbol = %ticker,
            %evaluation_date,
            %start_date,
            "Evaluating game"
        );

        let forecast = self.predictor.predict(&ticker, start_date, evaluation_date).await?;

        let Some(actual) = self.prices.fetch_close(&ticker, evaluation_date).await? else {
            return Err(GameError::NoMarketData {
                symbol: ticker,
                date: evaluation_date,
            });
        };

        let verdict = self.policy.score(
            submission.predicted_price,
            forecast.predicted_closing_price,
            actual,
        )?;
        Ok(verdict)
    }

    fn lookback_start(&self, evaluation_date: NaiveDate) -> NaiveDate {
        evaluation_date
            .checked_sub_months(Months::new(self.settings.lookback_months))
            .unwrap_or(evaluation_date)
    }

    async fn persist(&self, game: &GameRecord) -> Result<(), GameError> {
        let payload = serde_json::to_string(game).map_err(anyhow::Error::from)?;
        self.store.put(game.id, payload, self.settings.game_ttl).await?;
        Ok(())
    }

    /// All live games of `owner_id`, oldest first, as they should be shown at `now`.
    pub async fn list_for(&self, owner_id: &str, now: DateTime<Utc>) -> Result<Vec<GameRecord>, GameError> {
        let entries = self.store.get_all().await?;

        let mut games: Vec<GameRecord> = entries
            .into_iter()
            .filter_map(|(id, payload)| match serde_json::from_str::<GameRecord>(&payload) {
                Ok(game) => Some(game),
                Err(e) => {
                    counter!("corrupt_game_records_total").increment(1);
                    tracing::warn!(error = %e, game_id = %id, "Skipping unreadable game record");
                    None
                }
            })
            .filter(|game| game.owner_id == owner_id)
            .collect();
        games.sort_by_key(|game| game.id);

        Ok(reconciler::present(&games, &self.calendar, now))
    }

    /// A single live game as it should be shown at `now`.
    pub async fn get(&self, id: GameId, now: DateTime<Utc>) -> Result<Option<GameRecord>, GameError> {
        let Some(payload) = self.store.get(id).await? else {
            return Ok(None);
        };

        let game: GameRecord = serde_json::from_str(&payload)
            .map_err(|e| anyhow::anyhow!("game {id} is unreadable: {e}"))?;

        Ok(Some(reconciler::present_one(&game, &self.calendar, now)))
    }
}
