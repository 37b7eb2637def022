//! Approximate climatological percentile bands
//!
//! Deterministic seasonal model standing in for precomputed per-tile
//! percentile lookups: a hemisphere-shifted sinusoidal annual cycle with
//! latitude-damped thermal amplitude, latitude-boosted mean wind and a
//! crude coastal modulation of precipitation. Good enough as a long-run
//! baseline; swap for reanalysis-derived tiles to calibrate for real use.

use crate::models::{ClimatologyBands, PercentileBand};
use std::f64::consts::PI;

/// Day-of-year around which northern-hemisphere summer peaks
const SUMMER_PEAK_DOY: f64 = 200.0;

/// Percentile bands for one location and day-of-year. Pure and
/// deterministic: the same inputs always produce the same bands.
#[must_use]
pub fn percentile_bands(latitude: f64, longitude: f64, day_of_year: u32) -> ClimatologyBands {
    let abs_lat = latitude.abs();

    // Seasonal phase, flipped half a year for the southern hemisphere
    let mut offset = SUMMER_PEAK_DOY;
    if latitude < 0.0 {
        offset = (offset + 182.0) % 365.0;
    }
    let theta = 2.0 * PI * ((f64::from(day_of_year) - offset) / 365.0);
    let s = theta.sin();
    let c = theta.cos();

    // Mean annual temperature and seasonal amplitude both shrink toward
    // the poles
    let mean_t = 18.0 - 0.12 * abs_lat;
    let amp_t = (12.0 - 0.08 * abs_lat).max(6.0);
    let t50 = mean_t + amp_t * s;

    let heat_index = PercentileBand {
        p10: t50 - 4.0,
        p50: t50,
        p90: t50 + 4.0,
    };

    let wc50 = t50 - 2.0;
    let wind_chill = PercentileBand {
        p10: wc50 - 6.0,
        p50: wc50,
        p90: wc50 + 6.0,
    };

    // Mid-latitudes run windier on average, with a mild seasonal swing
    let mean_wind = 4.0 + 0.03 * abs_lat;
    let amp_wind = 1.0 + 0.01 * abs_lat;
    let wind50 = (mean_wind + 0.5 * c * amp_wind).max(0.5);
    let wind = PercentileBand {
        p10: (wind50 - 2.0).max(0.5),
        p50: wind50,
        p90: wind50 + 3.0,
    };

    // Wetter in the local warm season; longitude stands in for a
    // coast-vs-interior signal in this approximation
    let wet_season = s.max(0.0);
    let coastiness = 0.3 + 0.2 * (0.5 + 0.5 * longitude.to_radians().sin());
    let prcp50 = 1.0 + 6.0 * wet_season * coastiness;
    let precip = PercentileBand {
        p10: (prcp50 - 1.5).max(0.0),
        p50: prcp50,
        p90: prcp50 + 6.0 * (0.6 + 0.4 * wet_season),
    };

    ClimatologyBands {
        heat_index,
        wind_chill,
        wind,
        precip,
    }
}
