use std::sync::Arc;
use std::time::Duration;

use stockgame::api::router::create_router;
use stockgame::config::AppConfig;
use stockgame::db::{self, GameStore, MemoryGameStore, PgGameStore};
use stockgame::game::{GameEngine, MarketCalendar, ScoringPolicy};
use stockgame::providers::{HistoryClient, PredictorClient};
use stockgame::services::expiry::run_expiry_sweeper;
use stockgame::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    let settings = config.engine_settings()?;
    let addr = format!("{}:{}", config.host, config.port);

    let store: Arc<dyn GameStore> = match &config.database_url {
        Some(url) => {
            tracing::info!("Connecting to database...");
            let pool = db::init_pool(url).await?;
            tracing::info!("Database connected");
            Arc::new(PgGameStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, games are kept in memory and lost on restart");
            Arc::new(MemoryGameStore::new())
        }
    };

    // --- Collaborators: price history + predictor ---
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.http_timeout_secs))
        .build()?;
    let prices = Arc::new(HistoryClient::new(http.clone(), config.price_source_url.clone()));
    let predictor = Arc::new(PredictorClient::new(http, config.predictor_url.clone()));

    let calendar = MarketCalendar::new(config.calendar);
    tracing::info!(
        zone = calendar.config().zone.name(),
        open = %calendar.config().market_open,
        close = %calendar.config().market_close,
        results_ready = %calendar.config().results_ready,
        "Market calendar configured"
    );

    let engine = GameEngine::new(
        store.clone(),
        predictor,
        prices,
        calendar,
        ScoringPolicy::default(),
        settings,
    );

    // --- Retention sweeper ---
    let sweep_interval = config.expiry_sweep_interval_secs;
    tokio::spawn(async move {
        run_expiry_sweeper(store, sweep_interval).await;
    });

    let metrics_handle = stockgame::metrics::init_metrics()?;

    let state = AppState {
        engine: Arc::new(engine),
        config,
        metrics_handle,
    };
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {addr}");
    axum::serve(listener, router).await?;

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let registry = tracing_subscriber::registry().with(EnvFilter::from_default_env());

    // LOG_FORMAT=json for log shippers, human-readable otherwise.
    if std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json")) {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}
