use std::env;
use std::str::FromStr;

use chrono::{Duration, NaiveTime};
use chrono_tz::Tz;

use crate::game::{CalendarConfig, EngineSettings};

const DEFAULT_GRAPHQL_URL: &str = "http://localhost:8081/graphql";

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Postgres connection string. Games are kept in memory when unset.
    pub database_url: Option<String>,
    pub host: String,
    pub port: u16,

    // Collaborator services
    pub price_source_url: String,
    pub predictor_url: String,
    pub http_timeout_secs: u64,

    // Market calendar
    pub calendar: CalendarConfig,

    // Game lifecycle
    pub game_ttl_days: i64,
    pub predictor_lookback_years: u32,
    pub expiry_sweep_interval_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = CalendarConfig::default();

        let zone = match env::var("MARKET_TIMEZONE") {
            Ok(raw) => parse_zone(&raw)?,
            Err(_) => defaults.zone,
        };

        let calendar = CalendarConfig {
            zone,
            market_open: clock_var("MARKET_OPEN", defaults.market_open)?,
            market_close: clock_var("MARKET_CLOSE", defaults.market_close)?,
            results_ready: clock_var("RESULTS_READY_TIME", defaults.results_ready)?,
        };

        if calendar.market_open >= calendar.market_close {
            anyhow::bail!("MARKET_OPEN must be earlier than MARKET_CLOSE");
        }

        Ok(Self {
            database_url: env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: parsed_var("PORT", 8080)?,

            price_source_url: env::var("PRICE_SOURCE_URL")
                .unwrap_or_else(|_| DEFAULT_GRAPHQL_URL.into()),
            predictor_url: env::var("PREDICTOR_URL")
                .unwrap_or_else(|_| DEFAULT_GRAPHQL_URL.into()),
            http_timeout_secs: parsed_var("HTTP_TIMEOUT_SECS", 15)?,

            calendar,

            game_ttl_days: parsed_var("GAME_TTL_DAYS", 7)?,
            predictor_lookback_years: parsed_var("PREDICTOR_LOOKBACK_YEARS", 2)?,
            expiry_sweep_interval_secs: parsed_var("EXPIRY_SWEEP_INTERVAL_SECS", 3600)?,
        })
    }

    pub fn engine_settings(&self) -> anyhow::Result<EngineSettings> {
        let game_ttl = Duration::try_days(self.game_ttl_days)
            .filter(|ttl| *ttl > Duration::zero())
            .ok_or_else(|| anyhow::anyhow!("GAME_TTL_DAYS out of range: {}", self.game_ttl_days))?;
        let lookback_months = self.predictor_lookback_years.checked_mul(12).ok_or_else(|| {
            anyhow::anyhow!(
                "PREDICTOR_LOOKBACK_YEARS out of range: {}",
                self.predictor_lookback_years
            )
        })?;

        Ok(EngineSettings {
            game_ttl,
            lookback_months,
        })
    }
}

/// Numeric variable with a default. A set but unparseable value is an error.
fn parsed_var<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => parse_number(key, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_number<T>(key: &str, raw: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| anyhow::anyhow!("{key}: invalid value {raw:?} ({e})"))
}

fn clock_var(key: &str, default: NaiveTime) -> anyhow::Result<NaiveTime> {
    match env::var(key) {
        Ok(raw) => parse_clock(&raw).map_err(|e| anyhow::anyhow!("{key}: {e}")),
        Err(_) => Ok(default),
    }
}

/// Parse a wall-clock time such as `09:30`.
pub fn parse_clock(raw: &str) -> anyhow::Result<NaiveTime> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .map_err(|e| anyhow::anyhow!("invalid time {raw:?}, expected HH:MM ({e})"))
}

/// Parse an IANA zone name such as `America/New_York`.
pub fn parse_zone(raw: &str) -> anyhow::Result<Tz> {
    raw.trim()
        .parse::<Tz>()
        .map_err(|e| anyhow::anyhow!("invalid MARKET_TIMEZONE {raw:?}: {e}"))
}
