pub mod forecast;
pub mod game;

pub use forecast::PriceForecast;
pub use game::{GameId, GameIdGenerator, GameRecord, Outcome, Verdict};
