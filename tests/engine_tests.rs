mod common;

use std::collections::HashSet;

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;

use stockgame::db::GameStore;
use stockgame::errors::GameError;
use stockgame::models::{GameId, GameRecord, Outcome, Verdict};

use common::{build_engine, dec, ny, CloseBehavior, StubPredictor, StubPriceSource};

const OWNER: &str = "player@example.com";

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn stored(store: &dyn GameStore, id: GameId) -> GameRecord {
    let payload = store.get(id).await.unwrap().expect("game should be stored");
    serde_json::from_str(&payload).unwrap()
}

// 2024-06-05 is a Wednesday, 2024-06-09 a Sunday.

#[tokio::test]
async fn test_submit_during_market_hours_stays_provisional() {
    let t = build_engine(
        StubPredictor::returning("100"),
        StubPriceSource::new(CloseBehavior::Price(dec("100.3"))),
    );

    let game = t
        .engine
        .submit(OWNER, "AAPL", "100.2", ny(2024, 6, 5, 11, 0))
        .await
        .expect("submit should succeed");

    assert_eq!(game.outcome, Outcome::Provisional);
    assert_eq!(game.coins_earned, 0);
    assert_eq!(t.predictor.call_count(), 0);
    assert_eq!(t.prices.call_count(), 0);
    assert_eq!(stored(&*t.store, game.id).await, game);
}

#[tokio::test]
async fn test_submit_before_results_ready_stays_provisional() {
    let t = build_engine(
        StubPredictor::returning("100"),
        StubPriceSource::new(CloseBehavior::Price(dec("100.3"))),
    );

    // Market closed but the close is not authoritative until 17:00.
    let game = t
        .engine
        .submit(OWNER, "AAPL", "100.2", ny(2024, 6, 5, 16, 30))
        .await
        .unwrap();

    assert!(game.is_provisional());
    assert_eq!(t.predictor.call_count(), 0);
}

#[tokio::test]
async fn test_submit_on_weekend_stays_provisional() {
    let t = build_engine(
        StubPredictor::returning("100"),
        StubPriceSource::new(CloseBehavior::Price(dec("100.3"))),
    );

    let saturday = t.engine.submit(OWNER, "AAPL", "100.2", ny(2024, 6, 8, 20, 0)).await.unwrap();
    let sunday = t.engine.submit(OWNER, "AAPL", "100.2", ny(2024, 6, 9, 20, 0)).await.unwrap();

    assert!(saturday.is_provisional());
    assert!(sunday.is_provisional());
    assert_eq!(t.prices.call_count(), 0);
}

#[tokio::test]
async fn test_submit_after_results_scores_baseline_win() {
    let t = build_engine(
        StubPredictor::returning("100"),
        StubPriceSource::new(CloseBehavior::Price(dec("100.3"))),
    );

    let game = t
        .engine
        .submit(OWNER, "aapl", "100.2", ny(2024, 6, 5, 18, 0))
        .await
        .unwrap();

    assert_eq!(game.outcome, Outcome::Won);
    assert_eq!(game.coins_earned, 100);
    assert_eq!(game.symbol, "aapl");
    assert_eq!(stored(&*t.store, game.id).await, game);

    // Two-year window ending on the evaluation date, upper-cased symbol.
    let windows = t.predictor.windows.lock().unwrap().clone();
    assert_eq!(windows, vec![("AAPL".to_string(), date(2022, 6, 5), date(2024, 6, 5))]);
    assert_eq!(*t.prices.dates.lock().unwrap(), vec![date(2024, 6, 5)]);
}

#[tokio::test]
async fn test_submit_scores_bonus_win_when_model_misses() {
    let t = build_engine(
        StubPredictor::returning("100"),
        StubPriceSource::new(CloseBehavior::Price(dec("100.7"))),
    );

    let game = t.engine.submit(OWNER, "MSFT", "100.4", ny(2024, 6, 5, 18, 0)).await.unwrap();

    assert_eq!(game.outcome, Outcome::Won);
    assert_eq!(game.coins_earned, 200);
}

#[tokio::test]
async fn test_submit_scores_loss() {
    let t = build_engine(
        StubPredictor::returning("100"),
        StubPriceSource::new(CloseBehavior::Price(dec("100.3"))),
    );

    let game = t.engine.submit(OWNER, "MSFT", "100.9", ny(2024, 6, 5, 18, 0)).await.unwrap();

    assert_eq!(game.outcome, Outcome::Lost);
    assert_eq!(game.coins_earned, -10);
}

#[tokio::test]
async fn test_no_market_data_leaves_one_provisional_record() {
    let t = build_engine(
        StubPredictor::returning("100"),
        StubPriceSource::new(CloseBehavior::Empty),
    );
    let now = ny(2024, 6, 5, 18, 0);

    let err = t.engine.submit(OWNER, "AAPL", "100.2", now).await.unwrap_err();
    match err {
        GameError::NoMarketData { symbol, date: d } => {
            assert_eq!(symbol, "AAPL");
            assert_eq!(d, date(2024, 6, 5));
        }
        other => panic!("expected NoMarketData, got {other:?}"),
    }

    let all = t.store.get_all().await.unwrap();
    assert_eq!(all.len(), 1);
    let game: GameRecord = serde_json::from_str(&all[0].1).unwrap();
    assert_eq!(game.outcome, Outcome::Provisional);
    assert_eq!(game.coins_earned, 0);
    assert_eq!(game.id.as_millis(), now.timestamp_millis());
}

#[tokio::test]
async fn test_predictor_failure_is_collaborator_error() {
    let t = build_engine(
        StubPredictor::failing(),
        StubPriceSource::new(CloseBehavior::Price(dec("100.3"))),
    );

    let err = t
        .engine
        .submit(OWNER, "AAPL", "100.2", ny(2024, 6, 5, 18, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, GameError::Collaborator(_)));

    let games = t.engine.list_for(OWNER, ny(2024, 6, 5, 18, 5)).await.unwrap();
    assert_eq!(games.len(), 1);
    assert!(games[0].is_provisional());
}

#[tokio::test]
async fn test_price_source_failure_is_not_scored_as_loss() {
    let t = build_engine(
        StubPredictor::returning("100"),
        StubPriceSource::new(CloseBehavior::Fail),
    );

    let err = t
        .engine
        .submit(OWNER, "AAPL", "100.2", ny(2024, 6, 5, 18, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, GameError::Collaborator(_)));

    let games = t.engine.list_for(OWNER, ny(2024, 6, 5, 18, 5)).await.unwrap();
    assert_eq!(games[0].outcome, Outcome::Provisional);
}

#[tokio::test]
async fn test_invalid_input_creates_nothing() {
    let t = build_engine(
        StubPredictor::returning("100"),
        StubPriceSource::new(CloseBehavior::Price(dec("100.3"))),
    );
    let now = ny(2024, 6, 5, 18, 0);

    for (owner, symbol, prediction) in [
        (OWNER, "AAPL", "up"),
        (OWNER, "AAPL", ""),
        ("", "AAPL", "100"),
        (OWNER, "  ", "100"),
    ] {
        let err = t.engine.submit(owner, symbol, prediction, now).await.unwrap_err();
        assert!(matches!(err, GameError::InvalidInput(_)), "{owner:?} {symbol:?} {prediction:?}");
    }

    assert!(t.store.is_empty().await);
    assert_eq!(t.predictor.call_count(), 0);
}

#[tokio::test]
async fn test_non_positive_prediction_is_rejected_before_storage() {
    let t = build_engine(
        StubPredictor::returning("100"),
        StubPriceSource::new(CloseBehavior::Price(dec("100.3"))),
    );
    let now = ny(2024, 6, 5, 18, 0);

    for prediction in ["-79228162514264337593543950335", "-1", "0", "0.00"] {
        let err = t.engine.submit(OWNER, "AAPL", prediction, now).await.unwrap_err();
        assert!(matches!(err, GameError::InvalidInput(_)), "{prediction:?}");
    }

    assert!(t.store.is_empty().await);
    assert_eq!(t.predictor.call_count(), 0);
}

#[tokio::test]
async fn test_out_of_range_collaborator_prices_fail_without_panicking() {
    let t = build_engine(
        StubPredictor::returning("100"),
        StubPriceSource::new(CloseBehavior::Price(Decimal::MIN)),
    );
    let now = ny(2024, 6, 5, 18, 0);

    let err = t.engine.submit(OWNER, "AAPL", "100.2", now).await.unwrap_err();
    assert!(matches!(err, GameError::Scoring(_)));

    let games = t.engine.list_for(OWNER, now).await.unwrap();
    assert_eq!(games.len(), 1);
    assert!(games[0].is_provisional());
}

#[tokio::test]
async fn test_repeated_submissions_create_independent_records() {
    let t = build_engine(
        StubPredictor::returning("100"),
        StubPriceSource::new(CloseBehavior::Price(dec("100.3"))),
    );
    let now = ny(2024, 6, 5, 11, 0);

    let first = t.engine.submit(OWNER, "AAPL", "101", now).await.unwrap();
    let second = t.engine.submit(OWNER, "AAPL", "101", now).await.unwrap();

    assert_ne!(first.id, second.id);
    assert_eq!(t.store.len().await, 2);
}

#[tokio::test]
async fn test_concurrent_submissions_get_distinct_ids() {
    let t = build_engine(
        StubPredictor::returning("100"),
        StubPriceSource::new(CloseBehavior::Price(dec("100.3"))),
    );
    let now = ny(2024, 6, 5, 11, 0);

    let mut handles = Vec::new();
    for i in 0..20 {
        let engine = t.engine.clone();
        handles.push(tokio::spawn(async move {
            engine
                .submit(&format!("owner{i}@example.com"), "AAPL", "101", now)
                .await
                .unwrap()
        }));
    }

    let mut ids = HashSet::new();
    for h in handles {
        ids.insert(h.await.unwrap().id);
    }
    assert_eq!(ids.len(), 20);
    assert_eq!(t.store.len().await, 20);
}

#[tokio::test]
async fn test_list_for_filters_owner_and_skips_corrupt_records() {
    let t = build_engine(
        StubPredictor::returning("100"),
        StubPriceSource::new(CloseBehavior::Price(dec("100.3"))),
    );
    let now = ny(2024, 6, 5, 11, 0);

    let a = t.engine.submit(OWNER, "AAPL", "190", now).await.unwrap();
    t.engine.submit("other@example.com", "TSLA", "250", now).await.unwrap();
    let b = t.engine.submit(OWNER, "MSFT", "410", now).await.unwrap();
    t.store
        .put(GameId::from_millis(1), "{not json".into(), Duration::days(7))
        .await
        .unwrap();

    let games = t.engine.list_for(OWNER, now).await.unwrap();
    let ids: Vec<GameId> = games.iter().map(|g| g.id).collect();
    assert_eq!(ids, vec![a.id, b.id]);
}

#[tokio::test]
async fn test_list_for_is_idempotent() {
    let t = build_engine(
        StubPredictor::returning("100"),
        StubPriceSource::new(CloseBehavior::Price(dec("100.3"))),
    );
    t.engine.submit(OWNER, "AAPL", "100.2", ny(2024, 6, 5, 18, 0)).await.unwrap();
    t.engine.submit(OWNER, "AAPL", "100.2", ny(2024, 6, 9, 12, 0)).await.unwrap();

    let now = ny(2024, 6, 10, 9, 0);
    let first = t.engine.list_for(OWNER, now).await.unwrap();
    let second = t.engine.list_for(OWNER, now).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
}

#[tokio::test]
async fn test_sunday_game_stored_as_scored_is_masked_until_monday_results() {
    let t = build_engine(
        StubPredictor::returning("100"),
        StubPriceSource::new(CloseBehavior::Price(dec("100.3"))),
    );

    let created = ny(2024, 6, 9, 12, 0);
    let id = GameId::from_millis(created.timestamp_millis());
    let scored = GameRecord::provisional(id, OWNER, "AAPL", "100.2")
        .with_verdict(Verdict { outcome: Outcome::Won, coins: 100 });
    t.store
        .put(id, serde_json::to_string(&scored).unwrap(), Duration::days(7))
        .await
        .unwrap();

    for now in [ny(2024, 6, 9, 18, 0), ny(2024, 6, 10, 10, 0), ny(2024, 6, 10, 16, 59)] {
        let games = t.engine.list_for(OWNER, now).await.unwrap();
        assert_eq!(games[0].outcome, Outcome::Provisional);
        assert_eq!(games[0].coins_earned, 0);

        let single = t.engine.get(id, now).await.unwrap().unwrap();
        assert!(single.is_provisional());
    }

    let after = t.engine.list_for(OWNER, ny(2024, 6, 10, 17, 30)).await.unwrap();
    assert_eq!(after[0], scored);

    // Masking never writes back.
    assert_eq!(stored(&*t.store, id).await, scored);
}

#[tokio::test]
async fn test_get_unknown_game_is_none() {
    let t = build_engine(
        StubPredictor::returning("100"),
        StubPriceSource::new(CloseBehavior::Price(dec("100.3"))),
    );
    let found = t.engine.get(GameId::from_millis(123), ny(2024, 6, 5, 11, 0)).await.unwrap();
    assert!(found.is_none());
}
