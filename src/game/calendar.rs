//! Exchange calendar rules that decide when a game can be evaluated.
//!
//! All checks run in the exchange's reference zone, whatever the caller's
//! location. Pure logic: `now` is always an argument, never read from the clock.

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, Utc, Weekday};
use chrono_tz::Tz;

/// Exchange zone and bell times. Immutable once the calendar is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarConfig {
    pub zone: Tz,
    pub market_open: NaiveTime,
    pub market_close: NaiveTime,
    /// Local time after which a weekday's close is authoritative.
    pub results_ready: NaiveTime,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            zone: chrono_tz::America::New_York,
            market_open: NaiveTime::from_hms_opt(9, 30, 0).unwrap_or_default(),
            market_close: NaiveTime::from_hms_opt(16, 0, 0).unwrap_or_default(),
            results_ready: NaiveTime::from_hms_opt(17, 0, 0).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MarketCalendar {
    config: CalendarConfig,
}

fn is_weekend(day: Weekday) -> bool {
    matches!(day, Weekday::Sat | Weekday::Sun)
}

impl MarketCalendar {
    pub fn new(config: CalendarConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CalendarConfig {
        &self.config
    }

    fn local(&self, now: DateTime<Utc>) -> DateTime<Tz> {
        now.with_timezone(&self.config.zone)
    }

    /// Weekday and strictly between the open and close bells.
    pub fn is_market_open(&self, now: DateTime<Utc>) -> bool {
        let local = self.local(now);
        let time = local.time();
        !is_weekend(local.weekday())
            && time > self.config.market_open
            && time < self.config.market_close
    }

    /// Weekday and strictly after the result-readiness time.
    pub fn can_evaluate_now(&self, now: DateTime<Utc>) -> bool {
        let local = self.local(now);
        !is_weekend(local.weekday()) && local.time() > self.config.results_ready
    }

    /// Calendar date of `created_at` in the exchange zone.
    pub fn origin_date(&self, created_at: DateTime<Utc>) -> NaiveDate {
        self.local(created_at).date_naive()
    }

    pub fn is_origin_on_sunday(&self, origin_date: NaiveDate) -> bool {
        origin_date.weekday() == Weekday::Sun
    }

    /// Most recent weekday whose close is authoritative at `now`.
    ///
    /// On a Sunday the game concerns Monday's close, so the following day is
    /// returned. Otherwise today counts only once results are ready, and
    /// weekends roll back to the preceding Friday.
    pub fn evaluation_date_for(&self, now: DateTime<Utc>) -> NaiveDate {
        let today = self.local(now).date_naive();

        if today.weekday() == Weekday::Sun {
            return today + Days::new(1);
        }

        let mut date = today;
        if !self.can_evaluate_now(now) {
            date = date - Days::new(1);
        }
        while is_weekend(date.weekday()) {
            date = date - Days::new(1);
        }
        date
    }

    /// For a Sunday-origin game: has the following Monday's evaluation window
    /// closed?
    pub fn sunday_grace_passed(&self, now: DateTime<Utc>, origin_date: NaiveDate) -> bool {
        let deadline = (origin_date + Days::new(1)).and_time(self.config.results_ready);
        self.local(now).naive_local() > deadline
    }
}

impl Default for MarketCalendar {
    fn default() -> Self {
        Self::new(CalendarConfig::default())
    }
}
