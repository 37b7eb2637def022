//! Configuration management for the Paradecast service
//!
//! Handles loading configuration from files and environment variables,
//! and provides validation for all settings. The engine tunables the
//! original material leaves open (fusion weights, agreement tolerance,
//! curve anchors) live here with documented defaults instead of being
//! hard-coded.

use crate::engine::curves::Curve;
use crate::models::Condition;
use crate::ParadecastError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the Paradecast application
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ParadecastConfig {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Upstream source settings
    #[serde(default)]
    pub sources: SourcesConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Probability-engine tunables
    #[serde(default)]
    pub engine: EngineConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
    /// Bind address
    #[serde(default = "default_bind")]
    pub bind: String,
}

/// Upstream data-source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Base URL for the NASA POWER daily point API
    #[serde(default = "default_power_base_url")]
    pub power_base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_source_timeout")]
    pub timeout_seconds: u32,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Tunables for the probability-fusion engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Per-source blending weights
    #[serde(default)]
    pub fusion: FusionWeights,
    /// Confidence-grading parameters
    #[serde(default)]
    pub confidence: ConfidenceConfig,
    /// Threshold curve per condition
    #[serde(default)]
    pub curves: CurveSet,
    /// Probability floors for reporting
    #[serde(default)]
    pub materiality: MaterialityConfig,
    /// Probability reported when no source covers a condition at all.
    /// Deliberately above zero: absent data means unknown risk, not no risk.
    #[serde(default = "default_neutral_prior")]
    pub neutral_prior: f64,
}

/// Relative reliability weights for source blending.
///
/// The live point estimate is most trusted; the dedicated precipitation
/// source is close behind; long-run climatology is down-weighted but is
/// always blended in when available.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FusionWeights {
    #[serde(default = "default_live_weight")]
    pub live: f64,
    #[serde(default = "default_precip_weight")]
    pub precipitation: f64,
    #[serde(default = "default_climatology_weight")]
    pub climatology: f64,
}

/// Confidence-grading parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ConfidenceConfig {
    /// Two source estimates agree when they differ by less than this
    #[serde(default = "default_agreement_tolerance")]
    pub agreement_tolerance: f64,
    /// Conditions that must show multi-source agreement for a High grade
    #[serde(default = "default_min_agreeing_conditions")]
    pub min_agreeing_conditions: usize,
}

/// The named threshold curve for each condition (pluggable strategy)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CurveSet {
    /// very_hot over heat index (or raw temperature), Celsius
    #[serde(default = "default_hot_curve")]
    pub hot: Curve,
    /// very_cold over wind-chill-adjusted temperature, Celsius
    #[serde(default = "default_cold_curve")]
    pub cold: Curve,
    /// very_windy over wind speed, m/s
    #[serde(default = "default_windy_curve")]
    pub windy: Curve,
    /// very_wet over daily precipitation, mm
    #[serde(default = "default_wet_curve")]
    pub wet: Curve,
    /// heat-humidity side of very_uncomfortable, over humidex
    #[serde(default = "default_discomfort_heat_curve")]
    pub discomfort_heat: Curve,
    /// cold-wind side of very_uncomfortable, over wind chill
    #[serde(default = "default_discomfort_cold_curve")]
    pub discomfort_cold: Curve,
}

impl CurveSet {
    /// Curve for the directly curve-scored conditions. The composite
    /// very_uncomfortable condition combines the two discomfort curves
    /// instead of using a single one.
    #[must_use]
    pub fn for_condition(&self, condition: Condition) -> Option<Curve> {
        match condition {
            Condition::VeryHot => Some(self.hot),
            Condition::VeryCold => Some(self.cold),
            Condition::VeryWindy => Some(self.windy),
            Condition::VeryWet => Some(self.wet),
            Condition::VeryUncomfortable => None,
        }
    }

    fn all(&self) -> [(&'static str, Curve); 6] {
        [
            ("hot", self.hot),
            ("cold", self.cold),
            ("windy", self.windy),
            ("wet", self.wet),
            ("discomfort_heat", self.discomfort_heat),
            ("discomfort_cold", self.discomfort_cold),
        ]
    }
}

/// Probability floors controlling what gets reported
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MaterialityConfig {
    /// A condition enters `top_risks` at or above this fused probability
    #[serde(default = "default_top_risk_threshold")]
    pub top_risk_threshold: f64,
    /// Drivers are emitted for conditions at or above this fused probability
    #[serde(default = "default_driver_floor")]
    pub driver_floor: f64,
}

// Default value functions

fn default_port() -> u16 {
    8088
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_power_base_url() -> String {
    "https://power.larc.nasa.gov/api/temporal/daily/point".to_string()
}

fn default_source_timeout() -> u32 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_live_weight() -> f64 {
    1.0
}

fn default_precip_weight() -> f64 {
    0.8
}

fn default_climatology_weight() -> f64 {
    0.5
}

fn default_agreement_tolerance() -> f64 {
    0.15
}

fn default_min_agreeing_conditions() -> usize {
    3
}

fn default_neutral_prior() -> f64 {
    0.1
}

fn default_top_risk_threshold() -> f64 {
    0.3
}

fn default_driver_floor() -> f64 {
    0.05
}

fn default_hot_curve() -> Curve {
    Curve::Ramp {
        zero_at: 27.0,
        one_at: 40.0,
    }
}

fn default_cold_curve() -> Curve {
    Curve::Ramp {
        zero_at: 10.0,
        one_at: -5.0,
    }
}

fn default_windy_curve() -> Curve {
    Curve::Ramp {
        zero_at: 5.0,
        one_at: 15.0,
    }
}

fn default_wet_curve() -> Curve {
    Curve::Ramp {
        zero_at: 1.0,
        one_at: 10.0,
    }
}

fn default_discomfort_heat_curve() -> Curve {
    Curve::Ramp {
        zero_at: 30.0,
        one_at: 45.0,
    }
}

fn default_discomfort_cold_curve() -> Curve {
    Curve::Ramp {
        zero_at: 5.0,
        one_at: -15.0,
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind: default_bind(),
        }
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            power_base_url: default_power_base_url(),
            timeout_seconds: default_source_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fusion: FusionWeights::default(),
            confidence: ConfidenceConfig::default(),
            curves: CurveSet::default(),
            materiality: MaterialityConfig::default(),
            neutral_prior: default_neutral_prior(),
        }
    }
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            live: default_live_weight(),
            precipitation: default_precip_weight(),
            climatology: default_climatology_weight(),
        }
    }
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            agreement_tolerance: default_agreement_tolerance(),
            min_agreeing_conditions: default_min_agreeing_conditions(),
        }
    }
}

impl Default for CurveSet {
    fn default() -> Self {
        Self {
            hot: default_hot_curve(),
            cold: default_cold_curve(),
            windy: default_windy_curve(),
            wet: default_wet_curve(),
            discomfort_heat: default_discomfort_heat_curve(),
            discomfort_cold: default_discomfort_cold_curve(),
        }
    }
}

impl Default for MaterialityConfig {
    fn default() -> Self {
        Self {
            top_risk_threshold: default_top_risk_threshold(),
            driver_floor: default_driver_floor(),
        }
    }
}

impl ParadecastConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from a specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment overrides with PARADECAST_ prefix, e.g.
        // PARADECAST_SERVER__PORT=9000
        builder = builder.add_source(
            Environment::with_prefix("PARADECAST")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let config: ParadecastConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("paradecast").join("config.toml"))
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        self.engine.validate()?;
        Ok(())
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.sources.timeout_seconds == 0 || self.sources.timeout_seconds > 300 {
            return Err(ParadecastError::config(
                "Source timeout must be between 1 and 300 seconds",
            )
            .into());
        }
        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(ParadecastError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(ParadecastError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        if !self.sources.power_base_url.starts_with("http://")
            && !self.sources.power_base_url.starts_with("https://")
        {
            return Err(ParadecastError::config(
                "POWER base URL must be a valid HTTP or HTTPS URL",
            )
            .into());
        }

        Ok(())
    }
}

impl EngineConfig {
    /// Validate the engine tunables
    pub fn validate(&self) -> Result<()> {
        for (name, weight) in [
            ("live", self.fusion.live),
            ("precipitation", self.fusion.precipitation),
            ("climatology", self.fusion.climatology),
        ] {
            if !(weight > 0.0) || !weight.is_finite() {
                return Err(ParadecastError::config(format!(
                    "Fusion weight '{name}' must be a positive finite number"
                ))
                .into());
            }
        }

        let tolerance = self.confidence.agreement_tolerance;
        if !(tolerance > 0.0 && tolerance < 1.0) {
            return Err(ParadecastError::config(
                "Agreement tolerance must be strictly between 0 and 1",
            )
            .into());
        }

        if self.confidence.min_agreeing_conditions == 0
            || self.confidence.min_agreeing_conditions > Condition::ALL.len()
        {
            return Err(ParadecastError::config(
                "min_agreeing_conditions must be between 1 and 5",
            )
            .into());
        }

        if !(0.0..=1.0).contains(&self.neutral_prior) {
            return Err(
                ParadecastError::config("Neutral prior must lie in [0,1]").into(),
            );
        }

        for (threshold, name) in [
            (self.materiality.top_risk_threshold, "top_risk_threshold"),
            (self.materiality.driver_floor, "driver_floor"),
        ] {
            if !(0.0..=1.0).contains(&threshold) {
                return Err(ParadecastError::config(format!(
                    "Materiality threshold '{name}' must lie in [0,1]"
                ))
                .into());
            }
        }

        for (name, curve) in self.curves.all() {
            if !curve.is_valid() {
                return Err(ParadecastError::config(format!(
                    "Curve '{name}' is degenerate (anchors coincide or slope is zero)"
                ))
                .into());
            }
        }

        Ok(())
    }
}
