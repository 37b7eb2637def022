//! Derived comfort indices
//!
//! Computes heat index, wind chill, dew point and humidex from the raw
//! live observation. Every index is `None` when its required inputs are
//! missing; downstream scoring treats an undefined index distinctly from
//! zero and falls back to the raw variable where the contract allows it.

use crate::models::{DerivedIndices, LiveObservation};

/// Heat index only applies above this ambient temperature (NWS bound)
pub const HEAT_INDEX_MIN_C: f64 = 26.7;
/// Wind chill only applies at or below this ambient temperature
pub const WIND_CHILL_MAX_C: f64 = 10.0;
/// Wind chill only applies above this wind speed (4.8 km/h)
pub const WIND_CHILL_MIN_MS: f64 = 4.8 / 3.6;

impl DerivedIndices {
    /// Compute all indices available from the observation. Pure function,
    /// no side effects.
    #[must_use]
    pub fn compute(live: &LiveObservation) -> Self {
        let dew_point_c = match (thermal_mean(live), live.relative_humidity_pct) {
            (Some(t), Some(rh)) => Some(dew_point(t, rh)),
            _ => None,
        };

        let humidex = match (live.temperature_c, dew_point_c) {
            (Some(t), Some(td)) => Some(humidex(t, td)),
            _ => None,
        };

        Self {
            heat_index_c: heat_index_c(live),
            wind_chill_c: wind_chill_c(live),
            dew_point_c,
            humidex,
        }
    }
}

/// Mean of daily max and min temperature when both are present,
/// otherwise the single reported temperature.
fn thermal_mean(live: &LiveObservation) -> Option<f64> {
    match (live.temperature_c, live.temperature_min_c) {
        (Some(tmax), Some(tmin)) => Some((tmax + tmin) / 2.0),
        (Some(t), None) => Some(t),
        _ => None,
    }
}

fn heat_index_c(live: &LiveObservation) -> Option<f64> {
    let t = live.temperature_c?;
    if t < HEAT_INDEX_MIN_C {
        // Below the regression's envelope there is no heat adjustment
        return Some(t);
    }
    let rh = live.relative_humidity_pct?;
    // Rothfusz regression in Fahrenheit; floored at ambient so dry air
    // never reports a perceived temperature below the actual one.
    let t_f = t * 9.0 / 5.0 + 32.0;
    let hi_f = -42.379 + 2.049_015_23 * t_f + 10.143_331_27 * rh
        - 0.224_755_41 * t_f * rh
        - 6.837_83e-3 * t_f * t_f
        - 5.481_717e-2 * rh * rh
        + 1.228_74e-3 * t_f * t_f * rh
        + 8.528_2e-4 * t_f * rh * rh
        - 1.99e-6 * t_f * t_f * rh * rh;
    let hi_c = (hi_f - 32.0) * 5.0 / 9.0;
    Some(hi_c.max(t))
}

fn wind_chill_c(live: &LiveObservation) -> Option<f64> {
    let t = live.temperature_min_c.or(live.temperature_c)?;
    let wind = match live.wind_speed_ms {
        Some(w) => w,
        // No wind reading: no wind-driven heat loss to model
        None => return Some(t),
    };
    if t > WIND_CHILL_MAX_C || wind <= WIND_CHILL_MIN_MS {
        return Some(t);
    }
    // Environment Canada formula, wind in km/h
    let v = (wind * 3.6).powf(0.16);
    Some(13.12 + 0.6215 * t - 11.37 * v + 0.3965 * t * v)
}

/// Magnus approximation for dew point
fn dew_point(t_c: f64, rh_pct: f64) -> f64 {
    const A: f64 = 17.62;
    const B: f64 = 243.12;
    let gamma = (A * t_c) / (B + t_c) + (rh_pct.max(1e-6) / 100.0).ln();
    (B * gamma) / (A - gamma)
}

/// Environment Canada humidex from ambient temperature and dew point
fn humidex(t_c: f64, dew_point_c: f64) -> f64 {
    let e = 6.11 * (5417.753 * (1.0 / 273.16 - 1.0 / (273.15 + dew_point_c))).exp();
    t_c + 0.5555 * (e - 10.0)
}
