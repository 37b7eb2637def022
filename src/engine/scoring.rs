//! Condition scoring
//!
//! Maps raw and derived variables to per-condition probabilities through
//! the configured threshold curves, producing one independent estimate per
//! available source. Climatology bands additionally yield a percentile-rank
//! estimate for each condition, fused later alongside the live estimates.

use crate::config::EngineConfig;
use crate::models::{
    ClimatologyBands, Condition, ConditionScore, DerivedIndices, LiveObservation,
    ObservationBundle, ScoreInput, SourceKind,
};

use super::indices::{HEAT_INDEX_MIN_C, WIND_CHILL_MAX_C, WIND_CHILL_MIN_MS};

/// Variable labels used in score inputs and driver records
pub mod labels {
    pub const TEMPERATURE: &str = "temperature";
    pub const HEAT_INDEX: &str = "heat_index";
    pub const WIND_CHILL: &str = "wind_chill";
    pub const HUMIDEX: &str = "humidex";
    pub const RELATIVE_HUMIDITY: &str = "relative_humidity";
    pub const WIND_SPEED: &str = "wind_speed";
    pub const PRECIPITATION: &str = "precipitation";
    pub const PRECIPITATION_PROBABILITY: &str = "precipitation_probability";
    pub const CLIMATOLOGY: &str = "climatology";
}

/// Score every condition against every source present in the bundle.
/// Pure function; a missing source simply contributes no scores.
#[must_use]
pub fn score_all(bundle: &ObservationBundle, config: &EngineConfig) -> Vec<ConditionScore> {
    let mut scores = Vec::new();

    let indices = bundle
        .live
        .as_ref()
        .map(DerivedIndices::compute)
        .unwrap_or_default();

    if let Some(live) = &bundle.live {
        scores.extend(score_live(live, &indices, bundle, config));
    }

    if let Some(precip) = &bundle.precip {
        let curve = config.curves.wet;
        let from_amount = curve.evaluate(precip.precip_mm);
        let mut inputs = vec![ScoreInput::new(
            labels::PRECIPITATION,
            precip.precip_mm,
            "mm",
        )];
        let probability = match precip.pop_pct {
            Some(pop) => {
                inputs.push(ScoreInput::new(
                    labels::PRECIPITATION_PROBABILITY,
                    pop,
                    "%",
                ));
                from_amount.max(pop / 100.0)
            }
            None => from_amount,
        };
        scores.push(ConditionScore {
            condition: Condition::VeryWet,
            source: SourceKind::PrecipitationSource,
            probability,
            inputs,
        });
    }

    if let Some(bands) = &bundle.climatology {
        scores.extend(score_climatology(bands, &indices, bundle, config));
    }

    scores
}

/// Thermal value driving the very_hot condition: heat index when the
/// regression applied, raw temperature otherwise.
fn hot_value(
    live: &LiveObservation,
    indices: &DerivedIndices,
) -> Option<(f64, Vec<ScoreInput>)> {
    let t = live.temperature_c?;
    match (indices.heat_index_c, live.relative_humidity_pct) {
        (Some(hi), Some(rh)) if t >= HEAT_INDEX_MIN_C => Some((
            hi,
            vec![
                ScoreInput::new(labels::HEAT_INDEX, hi, "°C"),
                ScoreInput::new(labels::RELATIVE_HUMIDITY, rh, "%"),
            ],
        )),
        _ => Some((t, vec![ScoreInput::new(labels::TEMPERATURE, t, "°C")])),
    }
}

/// Thermal value driving the very_cold condition: wind chill when the
/// formula applied, ambient (minimum) temperature otherwise.
fn cold_value(
    live: &LiveObservation,
    indices: &DerivedIndices,
) -> Option<(f64, Vec<ScoreInput>)> {
    let wc = indices.wind_chill_c?;
    let base = live.temperature_min_c.or(live.temperature_c)?;
    let chilled = matches!(live.wind_speed_ms, Some(w) if w > WIND_CHILL_MIN_MS)
        && base <= WIND_CHILL_MAX_C;
    if chilled {
        let wind = live.wind_speed_ms.unwrap_or(0.0);
        Some((
            wc,
            vec![
                ScoreInput::new(labels::WIND_CHILL, wc, "°C"),
                ScoreInput::new(labels::WIND_SPEED, wind, "m/s"),
            ],
        ))
    } else {
        Some((base, vec![ScoreInput::new(labels::TEMPERATURE, base, "°C")]))
    }
}

fn score_live(
    live: &LiveObservation,
    indices: &DerivedIndices,
    bundle: &ObservationBundle,
    config: &EngineConfig,
) -> Vec<ConditionScore> {
    let mut scores = Vec::new();
    let curves = &config.curves;

    if let Some((value, inputs)) = hot_value(live, indices) {
        scores.push(ConditionScore {
            condition: Condition::VeryHot,
            source: SourceKind::Live,
            probability: curves.hot.evaluate(value),
            inputs,
        });
    }

    if let Some((value, inputs)) = cold_value(live, indices) {
        scores.push(ConditionScore {
            condition: Condition::VeryCold,
            source: SourceKind::Live,
            probability: curves.cold.evaluate(value),
            inputs,
        });
    }

    if let Some(wind) = live.wind_speed_ms {
        scores.push(ConditionScore {
            condition: Condition::VeryWindy,
            source: SourceKind::Live,
            probability: curves.windy.evaluate(wind),
            inputs: vec![ScoreInput::new(labels::WIND_SPEED, wind, "m/s")],
        });
    }

    // The dedicated precipitation source supersedes the live precipitation
    // field; the live value only scores very_wet when that source is absent.
    if bundle.precip.is_none() {
        if let Some(precip) = live.precip_mm {
            scores.push(ConditionScore {
                condition: Condition::VeryWet,
                source: SourceKind::Live,
                probability: curves.wet.evaluate(precip),
                inputs: vec![ScoreInput::new(labels::PRECIPITATION, precip, "mm")],
            });
        }
    }

    // very_uncomfortable: either extreme heat-humidity or extreme cold-wind
    // feels bad, so take the worse of the two discomfort readings.
    let mut discomfort: Option<f64> = None;
    let mut inputs = Vec::new();
    if let Some(hx) = indices.humidex {
        let p = curves.discomfort_heat.evaluate(hx);
        discomfort = Some(p);
        inputs.push(ScoreInput::new(labels::HUMIDEX, hx, "°C"));
    }
    if let Some(wc) = indices.wind_chill_c {
        let p = curves.discomfort_cold.evaluate(wc);
        discomfort = Some(discomfort.map_or(p, |d| d.max(p)));
        inputs.push(ScoreInput::new(labels::WIND_CHILL, wc, "°C"));
    }
    if let Some(probability) = discomfort {
        scores.push(ConditionScore {
            condition: Condition::VeryUncomfortable,
            source: SourceKind::Live,
            probability,
            inputs,
        });
    }

    scores
}

/// Climatology estimates: rank of the observed value within the historical
/// p10-p90 band when an observation exists, otherwise the band's median run
/// through the condition's threshold curve (a long-run prior for a typical
/// day at that location and date).
fn score_climatology(
    bands: &ClimatologyBands,
    indices: &DerivedIndices,
    bundle: &ObservationBundle,
    config: &EngineConfig,
) -> Vec<ConditionScore> {
    let mut scores = Vec::new();
    let live = bundle.live.as_ref();
    let prior = |condition: Condition| {
        let curve = config.curves.for_condition(condition);
        move |x: f64| curve.map_or(0.0, |c| c.evaluate(x))
    };

    let hot_obs = live.and_then(|l| hot_value(l, indices)).map(|(v, _)| v);
    let hot = percentile_score(
        hot_obs,
        &bands.heat_index,
        false,
        prior(Condition::VeryHot),
    );
    scores.push(clim_score(Condition::VeryHot, hot));

    let cold_obs = indices.wind_chill_c;
    let cold = percentile_score(
        cold_obs,
        &bands.wind_chill,
        true,
        prior(Condition::VeryCold),
    );
    scores.push(clim_score(Condition::VeryCold, cold));

    let wind_obs = live.and_then(|l| l.wind_speed_ms);
    let windy = percentile_score(wind_obs, &bands.wind, false, prior(Condition::VeryWindy));
    scores.push(clim_score(Condition::VeryWindy, windy));

    let precip_obs = bundle
        .precip
        .as_ref()
        .map(|p| p.precip_mm)
        .or_else(|| live.and_then(|l| l.precip_mm));
    let wet = percentile_score(precip_obs, &bands.precip, false, prior(Condition::VeryWet));
    scores.push(clim_score(Condition::VeryWet, wet));

    // Discomfort combines the heat and cold extremes, mirroring the live
    // composite.
    let uncomfortable = (hot.0.max(cold.0), hot.1.max(cold.1).min(100.0));
    scores.push(clim_score(Condition::VeryUncomfortable, uncomfortable));

    scores
}

/// Returns (probability, percentile-position-as-percent) for one band.
/// `inverted` flips the rank for conditions where low values are adverse.
fn percentile_score(
    observed: Option<f64>,
    band: &crate::models::PercentileBand,
    inverted: bool,
    prior: impl Fn(f64) -> f64,
) -> (f64, f64) {
    match observed {
        Some(value) => {
            let pos = band.position(value);
            let p = if inverted { 1.0 - pos } else { pos };
            (p, p * 100.0)
        }
        // No observation: the band's median stands in for a typical day
        None => (prior(band.p50), 50.0),
    }
}

fn clim_score(condition: Condition, (probability, position_pct): (f64, f64)) -> ConditionScore {
    ConditionScore {
        condition,
        source: SourceKind::Climatology,
        probability,
        inputs: vec![ScoreInput::new(labels::CLIMATOLOGY, position_pct, "%")],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Location, PercentileBand, PrecipEstimate};
    use chrono::NaiveDate;

    fn bundle_at(live: LiveObservation) -> ObservationBundle {
        ObservationBundle::new(
            Location {
                latitude: 48.0,
                longitude: 11.0,
            },
            NaiveDate::from_ymd_opt(2026, 7, 15).unwrap(),
        )
        .with_live(live)
    }

    fn find(scores: &[ConditionScore], condition: Condition, source: SourceKind) -> f64 {
        scores
            .iter()
            .find(|s| s.condition == condition && s.source == source)
            .map(|s| s.probability)
            .unwrap_or_else(|| panic!("no {condition} score from {source:?}"))
    }

    #[test]
    fn test_hot_scored_through_heat_index() {
        let config = EngineConfig::default();
        let bundle = bundle_at(LiveObservation::new(
            Some(38.0),
            None,
            Some(70.0),
            Some(2.0),
            Some(0.0),
        ));
        let scores = score_all(&bundle, &config);
        let hot = find(&scores, Condition::VeryHot, SourceKind::Live);
        assert_eq!(hot, 1.0); // heat index ~62 C saturates the ramp

        let hot_score = scores
            .iter()
            .find(|s| s.condition == Condition::VeryHot)
            .unwrap();
        assert!(hot_score
            .inputs
            .iter()
            .any(|i| i.variable == labels::HEAT_INDEX));
    }

    #[test]
    fn test_hot_falls_back_to_temperature_without_humidity() {
        let config = EngineConfig::default();
        let bundle = bundle_at(LiveObservation::new(Some(35.0), None, None, None, None));
        let scores = score_all(&bundle, &config);
        let hot_score = scores
            .iter()
            .find(|s| s.condition == Condition::VeryHot)
            .unwrap();
        assert!(hot_score
            .inputs
            .iter()
            .any(|i| i.variable == labels::TEMPERATURE));
        // (35 - 27) / 13
        assert!((hot_score.probability - 8.0 / 13.0).abs() < 1e-9);
    }

    #[test]
    fn test_cold_scored_through_wind_chill() {
        let config = EngineConfig::default();
        let bundle = bundle_at(LiveObservation::new(
            Some(5.0),
            None,
            Some(80.0),
            Some(12.0),
            None,
        ));
        let scores = score_all(&bundle, &config);
        let cold = find(&scores, Condition::VeryCold, SourceKind::Live);
        assert!(cold > 0.7, "cold probability was {cold}");
    }

    #[test]
    fn test_probabilities_stay_in_unit_interval() {
        let config = EngineConfig::default();
        let bundle = bundle_at(LiveObservation::new(
            Some(60.0),
            Some(-90.0),
            Some(100.0),
            Some(80.0),
            Some(500.0),
        ));
        for score in score_all(&bundle, &config) {
            assert!(
                (0.0..=1.0).contains(&score.probability),
                "{} from {:?} out of range: {}",
                score.condition,
                score.source,
                score.probability
            );
        }
    }

    #[test]
    fn test_precip_source_supersedes_live_precipitation() {
        let config = EngineConfig::default();
        let live = LiveObservation::new(Some(20.0), None, Some(50.0), Some(3.0), Some(4.0));
        let bundle = bundle_at(live).with_precip(PrecipEstimate::new(
            8.0,
            Some(70.0),
            "imerg-v07",
        ));
        let scores = score_all(&bundle, &config);
        assert!(scores
            .iter()
            .all(|s| !(s.condition == Condition::VeryWet && s.source == SourceKind::Live)));
        let wet = find(&scores, Condition::VeryWet, SourceKind::PrecipitationSource);
        // max(curve(8mm) = 7/9, pop 0.70)
        assert!((wet - 7.0 / 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_pop_dominates_small_amounts() {
        let config = EngineConfig::default();
        let bundle = ObservationBundle::new(
            Location {
                latitude: 0.0,
                longitude: 0.0,
            },
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
        )
        .with_precip(PrecipEstimate::new(1.5, Some(60.0), "power-fallback"));
        let scores = score_all(&bundle, &config);
        let wet = find(&scores, Condition::VeryWet, SourceKind::PrecipitationSource);
        assert!((wet - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_climatology_rank_when_observation_present() {
        let config = EngineConfig::default();
        let bands = ClimatologyBands {
            heat_index: PercentileBand {
                p10: 20.0,
                p50: 28.0,
                p90: 36.0,
            },
            wind_chill: PercentileBand {
                p10: 8.0,
                p50: 14.0,
                p90: 20.0,
            },
            wind: PercentileBand {
                p10: 2.0,
                p50: 5.0,
                p90: 10.0,
            },
            precip: PercentileBand {
                p10: 0.0,
                p50: 2.0,
                p90: 8.0,
            },
        };
        let bundle = bundle_at(LiveObservation::new(
            Some(25.0),
            None,
            Some(50.0),
            Some(6.0),
            Some(0.0),
        ))
        .with_climatology(bands);
        let scores = score_all(&bundle, &config);
        let windy = find(&scores, Condition::VeryWindy, SourceKind::Climatology);
        // 6 m/s ranks at (6-2)/(10-2) = 0.5 within the band
        assert!((windy - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_climatology_prior_without_live_source() {
        let config = EngineConfig::default();
        let bands = ClimatologyBands {
            heat_index: PercentileBand {
                p10: 28.0,
                p50: 33.5,
                p90: 40.0,
            },
            wind_chill: PercentileBand {
                p10: 15.0,
                p50: 20.0,
                p90: 26.0,
            },
            wind: PercentileBand {
                p10: 2.0,
                p50: 10.0,
                p90: 12.0,
            },
            precip: PercentileBand {
                p10: 0.0,
                p50: 5.5,
                p90: 12.0,
            },
        };
        let bundle = ObservationBundle::new(
            Location {
                latitude: -10.0,
                longitude: 30.0,
            },
            NaiveDate::from_ymd_opt(2026, 1, 10).unwrap(),
        )
        .with_climatology(bands);
        let scores = score_all(&bundle, &config);
        // All five conditions still get a climatology estimate
        for condition in Condition::ALL {
            assert!(scores
                .iter()
                .any(|s| s.condition == condition && s.source == SourceKind::Climatology));
        }
        // p50 heat index of 33.5 through the hot ramp: (33.5-27)/13 = 0.5
        let hot = find(&scores, Condition::VeryHot, SourceKind::Climatology);
        assert!((hot - 0.5).abs() < 1e-9);
        // p50 wind of 10 through the windy ramp: (10-5)/10 = 0.5
        let windy = find(&scores, Condition::VeryWindy, SourceKind::Climatology);
        assert!((windy - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_empty_bundle_produces_no_scores() {
        let config = EngineConfig::default();
        let bundle = ObservationBundle::new(
            Location {
                latitude: 0.0,
                longitude: 0.0,
            },
            NaiveDate::from_ymd_opt(2026, 5, 5).unwrap(),
        );
        assert!(score_all(&bundle, &config).is_empty());
    }
}
