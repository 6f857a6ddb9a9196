use chrono::{DateTime, Utc};

use super::calendar::MarketCalendar;
use crate::models::GameRecord;

/// Read-time view of a stored game. Sunday games stay provisional until the
/// following Monday's results are ready, whatever was persisted. Never writes
/// back to the store.
pub fn present_one(game: &GameRecord, calendar: &MarketCalendar, now: DateTime<Utc>) -> GameRecord {
    let origin = calendar.origin_date(game.id.created_at());

    if calendar.is_origin_on_sunday(origin) && !calendar.sunday_grace_passed(now, origin) {
        return game.masked();
    }

    game.clone()
}

pub fn present(games: &[GameRecord], calendar: &MarketCalendar, now: DateTime<Utc>) -> Vec<GameRecord> {
    games
        .iter()
        .map(|game| present_one(game, calendar, now))
        .collect()
}
