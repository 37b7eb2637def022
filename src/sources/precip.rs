//! Precipitation-estimate source
//!
//! IMERG daily precipitation is the intended upstream here; until that
//! integration lands, the estimate is derived from the live reanalysis
//! precipitation total and tagged with a fallback origin so consumers can
//! tell the provenance apart. The probability-of-precipitation figure is a
//! coarse bucketing of the daily total.

use crate::models::{LiveObservation, PrecipEstimate};

pub const FALLBACK_ORIGIN: &str = "power-fallback";

/// Derive a precipitation estimate from the live observation. `None` when
/// the observation carries no precipitation figure.
#[must_use]
pub fn from_live(live: &LiveObservation) -> Option<PrecipEstimate> {
    let precip_mm = live.precip_mm?;
    Some(PrecipEstimate::new(
        precip_mm,
        Some(pop_from_daily_total(precip_mm)),
        FALLBACK_ORIGIN,
    ))
}

/// Probability of precipitation in percent, bucketed by daily total.
#[must_use]
pub fn pop_from_daily_total(precip_mm: f64) -> f64 {
    if precip_mm <= 0.0 {
        10.0
    } else if precip_mm <= 2.0 {
        30.0
    } else if precip_mm <= 5.0 {
        50.0
    } else if precip_mm <= 15.0 {
        70.0
    } else {
        85.0
    }
}
