pub mod calendar;
pub mod engine;
pub mod reconciler;
pub mod scoring;

pub use calendar::{CalendarConfig, MarketCalendar};
pub use engine::{EngineSettings, GameEngine};
pub use scoring::{ScoringOverflow, ScoringPolicy};
