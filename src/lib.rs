pub mod api;
pub mod config;
pub mod db;
pub mod errors;
pub mod game;
pub mod metrics;
pub mod models;
pub mod providers;
pub mod services;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::game::GameEngine;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<GameEngine>,
    pub config: AppConfig,
    pub metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
}
