use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::America::New_York;
use rust_decimal::Decimal;

use stockgame::db::MemoryGameStore;
use stockgame::game::{EngineSettings, GameEngine, MarketCalendar, ScoringPolicy};
use stockgame::models::PriceForecast;
use stockgame::providers::{PriceSource, Predictor, ProviderError};

/// UTC instant for a New York wall-clock time.
#[allow(dead_code)]
pub fn ny(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    New_York
        .with_ymd_and_hms(y, m, d, h, min, 0)
        .single()
        .expect("unambiguous New York time")
        .with_timezone(&Utc)
}

#[allow(dead_code)]
pub fn dec(value: &str) -> Decimal {
    value.parse().expect("valid decimal")
}

/// Predictor returning a fixed forecast, or failing when `price` is `None`.
#[derive(Default)]
pub struct StubPredictor {
    pub price: Option<Decimal>,
    pub calls: AtomicUsize,
    pub windows: Mutex<Vec<(String, NaiveDate, NaiveDate)>>,
}

impl StubPredictor {
    #[allow(dead_code)]
    pub fn returning(price: &str) -> Self {
        Self {
            price: Some(dec(price)),
            ..Default::default()
        }
    }

    #[allow(dead_code)]
    pub fn failing() -> Self {
        Self::default()
    }

    #[allow(dead_code)]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Predictor for StubPredictor {
    async fn predict(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceForecast, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.windows
            .lock()
            .expect("windows lock")
            .push((symbol.to_string(), start, end));

        match self.price {
            Some(predicted_closing_price) => Ok(PriceForecast {
                symbol: symbol.to_string(),
                predicted_closing_price,
                last_closing_price: None,
                data_points: 500,
            }),
            None => Err(ProviderError::Remote("predictor offline".into())),
        }
    }
}

/// What the stub price source answers.
#[allow(dead_code)]
pub enum CloseBehavior {
    Price(Decimal),
    Empty,
    Fail,
}

pub struct StubPriceSource {
    pub behavior: CloseBehavior,
    pub calls: AtomicUsize,
    pub dates: Mutex<Vec<NaiveDate>>,
}

impl StubPriceSource {
    pub fn new(behavior: CloseBehavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
            dates: Mutex::new(Vec::new()),
        }
    }

    #[allow(dead_code)]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceSource for StubPriceSource {
    async fn fetch_close(&self, _symbol: &str, date: NaiveDate) -> Result<Option<Decimal>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.dates.lock().expect("dates lock").push(date);

        match &self.behavior {
            CloseBehavior::Price(p) => Ok(Some(*p)),
            CloseBehavior::Empty => Ok(None),
            CloseBehavior::Fail => Err(ProviderError::Unexpected("connection reset".into())),
        }
    }
}

pub struct TestEngine {
    pub engine: Arc<GameEngine>,
    pub store: Arc<MemoryGameStore>,
    pub predictor: Arc<StubPredictor>,
    pub prices: Arc<StubPriceSource>,
}

/// Engine over the in-memory store with stub collaborators.
#[allow(dead_code)]
pub fn build_engine(predictor: StubPredictor, prices: StubPriceSource) -> TestEngine {
    let store = Arc::new(MemoryGameStore::new());
    let predictor = Arc::new(predictor);
    let prices = Arc::new(prices);

    let engine = GameEngine::new(
        store.clone(),
        predictor.clone(),
        prices.clone(),
        MarketCalendar::default(),
        ScoringPolicy::default(),
        EngineSettings::default(),
    );

    TestEngine {
        engine: Arc::new(engine),
        store,
        predictor,
        prices,
    }
}
