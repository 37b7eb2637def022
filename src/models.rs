//! Data models for adverse-weather probability estimation
//!
//! This module contains the structures that flow through the estimation
//! pipeline: the per-query input bundle, the computed comfort indices,
//! per-source condition scores and the final fused result.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Location coordinates for a query
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Location {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

/// The five adverse conditions the engine estimates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    VeryHot,
    VeryCold,
    VeryWindy,
    VeryWet,
    VeryUncomfortable,
}

impl Condition {
    /// All conditions, in canonical declaration order
    pub const ALL: [Condition; 5] = [
        Condition::VeryHot,
        Condition::VeryCold,
        Condition::VeryWindy,
        Condition::VeryWet,
        Condition::VeryUncomfortable,
    ];

    /// Snake-case name used in API responses
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Condition::VeryHot => "very_hot",
            Condition::VeryCold => "very_cold",
            Condition::VeryWindy => "very_windy",
            Condition::VeryWet => "very_wet",
            Condition::VeryUncomfortable => "very_uncomfortable",
        }
    }

    /// Tie-break priority for equally probable risks, lower is more urgent.
    /// Rain and wind disrupt outdoor events harder than temperature does.
    #[must_use]
    pub fn planning_priority(self) -> u8 {
        match self {
            Condition::VeryWet => 0,
            Condition::VeryWindy => 1,
            Condition::VeryHot => 2,
            Condition::VeryCold => 3,
            Condition::VeryUncomfortable => 4,
        }
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Provenance of a probability estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Point reanalysis (NASA POWER daily values)
    Live,
    /// Dedicated precipitation estimate (IMERG or fallback)
    PrecipitationSource,
    /// Long-run percentile bands per day-of-year
    Climatology,
}

/// Point observation from the live reanalysis source.
///
/// Values are clamped to physical ranges at construction; fields are
/// optional because upstream providers report gaps as missing data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct LiveObservation {
    /// Daytime maximum temperature in Celsius
    pub temperature_c: Option<f64>,
    /// Daily minimum temperature in Celsius (used for wind chill)
    pub temperature_min_c: Option<f64>,
    /// Relative humidity in percent (0-100)
    pub relative_humidity_pct: Option<f64>,
    /// Wind speed in m/s
    pub wind_speed_ms: Option<f64>,
    /// Daily precipitation total in mm
    pub precip_mm: Option<f64>,
}

impl LiveObservation {
    /// Build an observation with out-of-range values clamped to
    /// physical bounds. Missing values stay missing.
    #[must_use]
    pub fn new(
        temperature_c: Option<f64>,
        temperature_min_c: Option<f64>,
        relative_humidity_pct: Option<f64>,
        wind_speed_ms: Option<f64>,
        precip_mm: Option<f64>,
    ) -> Self {
        Self {
            temperature_c: temperature_c.map(clamp_temperature),
            temperature_min_c: temperature_min_c.map(clamp_temperature),
            relative_humidity_pct: relative_humidity_pct.map(|rh| rh.clamp(0.0, 100.0)),
            wind_speed_ms: wind_speed_ms.map(|w| w.max(0.0)),
            precip_mm: precip_mm.map(|p| p.max(0.0)),
        }
    }

    /// True when no variable is present at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.temperature_c.is_none()
            && self.temperature_min_c.is_none()
            && self.relative_humidity_pct.is_none()
            && self.wind_speed_ms.is_none()
            && self.precip_mm.is_none()
    }
}

fn clamp_temperature(t: f64) -> f64 {
    t.clamp(-90.0, 60.0)
}

/// Estimate from the dedicated precipitation source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrecipEstimate {
    /// Daily precipitation in mm
    pub precip_mm: f64,
    /// Probability of precipitation in percent (0-100)
    pub pop_pct: Option<f64>,
    /// Which upstream produced the estimate (e.g. "imerg-v07", "power-fallback")
    pub origin: String,
}

impl PrecipEstimate {
    #[must_use]
    pub fn new(precip_mm: f64, pop_pct: Option<f64>, origin: impl Into<String>) -> Self {
        Self {
            precip_mm: precip_mm.max(0.0),
            pop_pct: pop_pct.map(|p| p.clamp(0.0, 100.0)),
            origin: origin.into(),
        }
    }
}

/// Historical p10/p50/p90 band for one variable
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentileBand {
    pub p10: f64,
    pub p50: f64,
    pub p90: f64,
}

impl PercentileBand {
    /// Rank of `value` within the p10-p90 band, clamped to [0,1].
    /// Values at a percentile boundary resolve to the boundary rank.
    #[must_use]
    pub fn position(&self, value: f64) -> f64 {
        let span = self.p90 - self.p10;
        if span.abs() < f64::EPSILON {
            return 0.5;
        }
        ((value - self.p10) / span).clamp(0.0, 1.0)
    }
}

/// Climatological percentile bands for one location and day-of-year
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClimatologyBands {
    /// Heat index band in Celsius
    pub heat_index: PercentileBand,
    /// Wind chill band in Celsius
    pub wind_chill: PercentileBand,
    /// Wind speed band in m/s
    pub wind: PercentileBand,
    /// Daily precipitation band in mm
    pub precip: PercentileBand,
}

/// The assembled inputs for one (location, date) query.
///
/// Built once by the source collaborators and handed to the engine
/// read-only. Any upstream failure shows up here as an absent source,
/// never as an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationBundle {
    pub location: Location,
    pub date: NaiveDate,
    pub live: Option<LiveObservation>,
    pub precip: Option<PrecipEstimate>,
    pub climatology: Option<ClimatologyBands>,
}

impl ObservationBundle {
    #[must_use]
    pub fn new(location: Location, date: NaiveDate) -> Self {
        Self {
            location,
            date,
            live: None,
            precip: None,
            climatology: None,
        }
    }

    #[must_use]
    pub fn with_live(mut self, live: LiveObservation) -> Self {
        self.live = Some(live);
        self
    }

    #[must_use]
    pub fn with_precip(mut self, precip: PrecipEstimate) -> Self {
        self.precip = Some(precip);
        self
    }

    #[must_use]
    pub fn with_climatology(mut self, climatology: ClimatologyBands) -> Self {
        self.climatology = Some(climatology);
        self
    }

    /// Number of upstream sources that delivered anything at all
    #[must_use]
    pub fn source_count(&self) -> usize {
        usize::from(self.live.is_some())
            + usize::from(self.precip.is_some())
            + usize::from(self.climatology.is_some())
    }
}

/// Comfort indices derived from the live observation.
///
/// Each index is `None` when its required inputs are missing; downstream
/// scoring treats undefined distinctly from zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct DerivedIndices {
    /// Perceived temperature from heat and humidity, Celsius
    pub heat_index_c: Option<f64>,
    /// Perceived temperature from cold and wind, Celsius
    pub wind_chill_c: Option<f64>,
    /// Saturation temperature at current humidity, Celsius
    pub dew_point_c: Option<f64>,
    /// Heat-humidity discomfort scalar, Celsius-like
    pub humidex: Option<f64>,
}

/// One input variable that fed a condition score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreInput {
    pub variable: &'static str,
    pub value: f64,
    pub unit: &'static str,
}

impl ScoreInput {
    #[must_use]
    pub fn new(variable: &'static str, value: f64, unit: &'static str) -> Self {
        Self {
            variable,
            value,
            unit,
        }
    }
}

/// Per-condition, per-source probability estimate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionScore {
    pub condition: Condition,
    pub source: SourceKind,
    /// Probability of the adverse condition, in [0,1]
    pub probability: f64,
    /// The (variable, value, unit) inputs that fed this score
    pub inputs: Vec<ScoreInput>,
}

/// A named contributing factor to a fused probability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    /// Condition this driver explains
    pub condition: Condition,
    /// Variable name (e.g. "heat_index")
    pub label: String,
    /// Observed or derived value of the variable
    pub value: f64,
    /// Unit for `value`
    pub unit: String,
    /// Normalized contribution in [0,1]; drivers of one condition sum to <= 1
    pub contribution: f64,
}

/// Overall confidence grade for a result
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Confidence::Low => write!(f, "low"),
            Confidence::Medium => write!(f, "medium"),
            Confidence::High => write!(f, "high"),
        }
    }
}

/// Fused probability per condition. All five fields are always present,
/// even when underlying sources are missing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConditionProbabilities {
    pub very_hot: f64,
    pub very_cold: f64,
    pub very_windy: f64,
    pub very_wet: f64,
    pub very_uncomfortable: f64,
}

impl ConditionProbabilities {
    #[must_use]
    pub fn get(&self, condition: Condition) -> f64 {
        match condition {
            Condition::VeryHot => self.very_hot,
            Condition::VeryCold => self.very_cold,
            Condition::VeryWindy => self.very_windy,
            Condition::VeryWet => self.very_wet,
            Condition::VeryUncomfortable => self.very_uncomfortable,
        }
    }

    pub fn set(&mut self, condition: Condition, probability: f64) {
        let slot = match condition {
            Condition::VeryHot => &mut self.very_hot,
            Condition::VeryCold => &mut self.very_cold,
            Condition::VeryWindy => &mut self.very_windy,
            Condition::VeryWet => &mut self.very_wet,
            Condition::VeryUncomfortable => &mut self.very_uncomfortable,
        };
        *slot = probability;
    }
}

impl Default for ConditionProbabilities {
    fn default() -> Self {
        Self {
            very_hot: 0.0,
            very_cold: 0.0,
            very_windy: 0.0,
            very_wet: 0.0,
            very_uncomfortable: 0.0,
        }
    }
}

/// The complete output of one engine pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusedResult {
    /// Fused probability for each of the five conditions
    pub probabilities: ConditionProbabilities,
    /// Conditions above the materiality threshold, most probable first
    pub top_risks: Vec<Condition>,
    /// Ranked contributing factors, flattened across conditions
    pub drivers: Vec<Driver>,
    /// Overall confidence grade
    pub confidence: Confidence,
    /// Advisory strings keyed on the material conditions
    pub suggestions: Vec<String>,
}
