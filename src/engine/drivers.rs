//! Driver ranking
//!
//! Decomposes each material fused probability into a short ranked list of
//! contributing variables. A variable's marginal effect is measured by
//! ablation: blank the raw variable behind it, re-run scoring and fusion,
//! and take the probability delta. Contributions are normalized so the
//! drivers of one condition sum to at most the fused probability itself.

use crate::config::EngineConfig;
use crate::models::{Condition, ConditionScore, Driver, ObservationBundle, ScoreInput};

use super::fusion::{fuse_all, FusedCondition};
use super::scoring::{labels, score_all};

/// Raw variables a driver candidate can be traced back to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ablation {
    Temperature,
    Humidity,
    WindSpeed,
    Precipitation,
    PrecipProbability,
    Climatology,
}

/// Which raw variable to blank when measuring a candidate's marginal effect
fn ablation_for(variable: &str) -> Option<Ablation> {
    match variable {
        labels::TEMPERATURE | labels::HEAT_INDEX | labels::WIND_CHILL => {
            Some(Ablation::Temperature)
        }
        labels::HUMIDEX | labels::RELATIVE_HUMIDITY => Some(Ablation::Humidity),
        labels::WIND_SPEED => Some(Ablation::WindSpeed),
        labels::PRECIPITATION => Some(Ablation::Precipitation),
        labels::PRECIPITATION_PROBABILITY => Some(Ablation::PrecipProbability),
        labels::CLIMATOLOGY => Some(Ablation::Climatology),
        _ => None,
    }
}

/// Physical directness used to break delta ties: a derived index explains
/// the condition more directly than the raw variable it was computed from,
/// and any observation beats the climatological baseline.
fn directness(variable: &str) -> u8 {
    match variable {
        labels::HEAT_INDEX | labels::WIND_CHILL | labels::HUMIDEX => 0,
        labels::WIND_SPEED | labels::PRECIPITATION | labels::PRECIPITATION_PROBABILITY => 1,
        labels::TEMPERATURE | labels::RELATIVE_HUMIDITY => 2,
        _ => 3,
    }
}

fn apply_ablation(bundle: &ObservationBundle, ablation: Ablation) -> ObservationBundle {
    let mut ablated = bundle.clone();
    match ablation {
        Ablation::Temperature => {
            if let Some(live) = &mut ablated.live {
                live.temperature_c = None;
                live.temperature_min_c = None;
            }
        }
        Ablation::Humidity => {
            if let Some(live) = &mut ablated.live {
                live.relative_humidity_pct = None;
            }
        }
        Ablation::WindSpeed => {
            if let Some(live) = &mut ablated.live {
                live.wind_speed_ms = None;
            }
        }
        Ablation::Precipitation => {
            if let Some(live) = &mut ablated.live {
                live.precip_mm = None;
            }
            ablated.precip = None;
        }
        Ablation::PrecipProbability => {
            if let Some(precip) = &mut ablated.precip {
                precip.pop_pct = None;
            }
        }
        Ablation::Climatology => {
            ablated.climatology = None;
        }
    }
    ablated
}

fn fused_probability_without(
    bundle: &ObservationBundle,
    ablation: Ablation,
    condition: Condition,
    config: &EngineConfig,
) -> f64 {
    let ablated = apply_ablation(bundle, ablation);
    let scores = score_all(&ablated, config);
    fuse_all(&scores, config)
        .into_iter()
        .find(|f| f.condition == condition)
        .map_or(0.0, |f| f.probability)
}

struct Candidate<'a> {
    input: &'a ScoreInput,
    delta: f64,
}

/// Rank drivers for every condition whose fused probability clears the
/// materiality floor. Drivers are emitted grouped by condition, most
/// probable condition first, and within a condition in descending
/// contribution order.
#[must_use]
pub fn rank_drivers(
    bundle: &ObservationBundle,
    scores: &[ConditionScore],
    fused: &[FusedCondition],
    config: &EngineConfig,
) -> Vec<Driver> {
    let mut order: Vec<&FusedCondition> = fused.iter().collect();
    order.sort_by(|a, b| {
        b.probability
            .partial_cmp(&a.probability)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| {
                a.condition
                    .planning_priority()
                    .cmp(&b.condition.planning_priority())
            })
    });

    let mut drivers = Vec::new();
    for fused_condition in order {
        if fused_condition.probability < config.materiality.driver_floor
            || fused_condition.degraded
        {
            continue;
        }
        drivers.extend(rank_condition(bundle, scores, fused_condition, config));
    }
    drivers
}

fn rank_condition(
    bundle: &ObservationBundle,
    scores: &[ConditionScore],
    fused: &FusedCondition,
    config: &EngineConfig,
) -> Vec<Driver> {
    let condition = fused.condition;

    // Candidate variables are the recorded inputs of every score that fed
    // this condition, deduplicated by variable name.
    let mut candidates: Vec<Candidate> = Vec::new();
    for score in scores.iter().filter(|s| s.condition == condition) {
        for input in &score.inputs {
            if candidates
                .iter()
                .any(|c| c.input.variable == input.variable)
            {
                continue;
            }
            // In the discomfort composite the wind-chill reading is the
            // wind's doing; blanking temperature instead would also wipe
            // the humidex side and misattribute its share.
            let ablation = match (condition, input.variable) {
                (Condition::VeryUncomfortable, labels::WIND_CHILL) => {
                    Some(Ablation::WindSpeed)
                }
                _ => ablation_for(input.variable),
            };
            let Some(ablation) = ablation else {
                continue;
            };
            let without = fused_probability_without(bundle, ablation, condition, config);
            let delta = (fused.probability - without).max(0.0);
            candidates.push(Candidate { input, delta });
        }
    }

    if candidates.is_empty() {
        return Vec::new();
    }

    candidates.sort_by(|a, b| {
        b.delta
            .partial_cmp(&a.delta)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| directness(a.input.variable).cmp(&directness(b.input.variable)))
    });
    candidates.truncate(3);

    let total_delta: f64 = candidates.iter().map(|c| c.delta).sum();
    if total_delta <= f64::EPSILON {
        // No candidate moved the estimate (e.g. every curve is saturated);
        // attribute the whole probability to the most direct variable.
        let top = &candidates[0];
        return vec![Driver {
            condition,
            label: top.input.variable.to_string(),
            value: top.input.value,
            unit: top.input.unit.to_string(),
            contribution: fused.probability,
        }];
    }

    candidates
        .iter()
        .filter(|c| c.delta > f64::EPSILON)
        .map(|c| Driver {
            condition,
            label: c.input.variable.to_string(),
            value: c.input.value,
            unit: c.input.unit.to_string(),
            contribution: (c.delta / total_delta) * fused.probability,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LiveObservation, Location};
    use chrono::NaiveDate;

    fn hot_day_bundle() -> ObservationBundle {
        ObservationBundle::new(
            Location {
                latitude: 40.0,
                longitude: -3.0,
            },
            NaiveDate::from_ymd_opt(2026, 7, 20).unwrap(),
        )
        .with_live(LiveObservation::new(
            Some(38.0),
            None,
            Some(70.0),
            Some(2.0),
            Some(0.0),
        ))
    }

    fn rank_for(bundle: &ObservationBundle, config: &EngineConfig) -> Vec<Driver> {
        let scores = score_all(bundle, config);
        let fused = fuse_all(&scores, config);
        rank_drivers(bundle, &scores, &fused, config)
    }

    #[test]
    fn test_heat_index_leads_hot_drivers() {
        let config = EngineConfig::default();
        let drivers = rank_for(&hot_day_bundle(), &config);
        let hot: Vec<&Driver> = drivers
            .iter()
            .filter(|d| d.condition == Condition::VeryHot)
            .collect();
        assert!(!hot.is_empty());
        assert_eq!(hot[0].label, labels::HEAT_INDEX);
        // Removing temperature wipes the estimate; removing humidity only
        // drops back to the raw-temperature score.
        if hot.len() > 1 {
            assert!(hot[0].contribution >= hot[1].contribution);
        }
    }

    #[test]
    fn test_contributions_sum_to_at_most_one_per_condition() {
        let config = EngineConfig::default();
        let drivers = rank_for(&hot_day_bundle(), &config);
        for condition in Condition::ALL {
            let sum: f64 = drivers
                .iter()
                .filter(|d| d.condition == condition)
                .map(|d| d.contribution)
                .sum();
            assert!(sum <= 1.0 + 1e-9, "{condition} contributions sum to {sum}");
        }
    }

    #[test]
    fn test_contributions_listed_descending() {
        let config = EngineConfig::default();
        let drivers = rank_for(&hot_day_bundle(), &config);
        for condition in Condition::ALL {
            let contributions: Vec<f64> = drivers
                .iter()
                .filter(|d| d.condition == condition)
                .map(|d| d.contribution)
                .collect();
            for pair in contributions.windows(2) {
                assert!(pair[0] >= pair[1] - 1e-12);
            }
        }
    }

    #[test]
    fn test_immaterial_conditions_get_no_drivers() {
        let config = EngineConfig::default();
        let drivers = rank_for(&hot_day_bundle(), &config);
        // very_cold is ~0 on a 38 C day, well under the driver floor
        assert!(drivers
            .iter()
            .all(|d| d.condition != Condition::VeryCold));
    }

    #[test]
    fn test_at_most_three_drivers_per_condition() {
        let config = EngineConfig::default();
        let bundle = hot_day_bundle().with_precip(crate::models::PrecipEstimate::new(
            6.0,
            Some(70.0),
            "imerg-v07",
        ));
        let drivers = rank_for(&bundle, &config);
        for condition in Condition::ALL {
            let count = drivers
                .iter()
                .filter(|d| d.condition == condition)
                .count();
            assert!(count <= 3, "{condition} has {count} drivers");
        }
    }
}
