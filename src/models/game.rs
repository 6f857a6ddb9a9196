use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// GameId
// ---------------------------------------------------------------------------

/// Game identifier: epoch milliseconds of the instant the game was created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(i64);

impl GameId {
    pub fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    pub fn as_millis(&self) -> i64 {
        self.0
    }

    /// Creation instant encoded in the id.
    pub fn created_at(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.0)
            .single()
            .unwrap_or_default()
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for GameId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(GameId)
    }
}

/// Issues strictly increasing ids. Two submissions in the same millisecond get
/// consecutive ids rather than colliding.
#[derive(Debug, Default)]
pub struct GameIdGenerator {
    last: AtomicI64,
}

impl GameIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self, now: DateTime<Utc>) -> GameId {
        let candidate = now.timestamp_millis();
        let prev = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(candidate.max(last + 1))
            })
            .unwrap_or_else(|last| last);
        GameId(candidate.max(prev + 1))
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Provisional,
    Won,
    Lost,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Provisional => "provisional",
            Outcome::Won => "won",
            Outcome::Lost => "lost",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of scoring a single game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub outcome: Outcome,
    pub coins: i32,
}

// ---------------------------------------------------------------------------
// GameRecord
// ---------------------------------------------------------------------------

/// A stored prediction game. Outcome and coins are fixed by the submission
/// that creates the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub id: GameId,
    pub owner_id: String,
    pub symbol: String,
    pub user_prediction: String,
    pub outcome: Outcome,
    pub coins_earned: i32,
}

impl GameRecord {
    pub fn provisional(
        id: GameId,
        owner_id: impl Into<String>,
        symbol: impl Into<String>,
        user_prediction: impl Into<String>,
    ) -> Self {
        Self {
            id,
            owner_id: owner_id.into(),
            symbol: symbol.into(),
            user_prediction: user_prediction.into(),
            outcome: Outcome::Provisional,
            coins_earned: 0,
        }
    }

    /// Scored copy of this record under the same id.
    pub fn with_verdict(&self, verdict: Verdict) -> Self {
        let coins_earned = match verdict.outcome {
            Outcome::Provisional => 0,
            _ => verdict.coins,
        };
        Self {
            outcome: verdict.outcome,
            coins_earned,
            ..self.clone()
        }
    }

    /// Copy shown as provisional regardless of the stored outcome.
    pub fn masked(&self) -> Self {
        Self {
            outcome: Outcome::Provisional,
            coins_earned: 0,
            ..self.clone()
        }
    }

    pub fn is_provisional(&self) -> bool {
        self.outcome == Outcome::Provisional
    }
}

impl fmt::Display for GameRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Game: id={} owner={} symbol={} prediction={} outcome={} coins={}",
            self.id, self.owner_id, self.symbol, self.user_prediction, self.outcome, self.coins_earned,
        )
    }
}
