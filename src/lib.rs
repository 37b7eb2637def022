//! Paradecast - adverse-weather probability estimates for a point and date
//!
//! This library fuses a live reanalysis observation, a precipitation
//! estimate and a climatological baseline into per-condition probabilities
//! (very hot, very cold, very windy, very wet, very uncomfortable), with
//! ranked drivers, a confidence grade and short advisory text.

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod sources;
pub mod web;

// Re-export core types for public API
pub use config::{EngineConfig, ParadecastConfig};
pub use error::ParadecastError;
pub use models::{
    Condition, ConditionProbabilities, Confidence, Driver, FusedResult, Location,
    ObservationBundle,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, ParadecastError>;
