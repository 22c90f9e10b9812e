//! Domain layer - Business logic and domain models

pub mod metrics;
pub mod prompt;
pub mod scenario;
pub mod tags;

pub use metrics::{LabelTally, ScoreReport};
pub use scenario::{Locale, Scenario};
