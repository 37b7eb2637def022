//! Probability-fusion and derived-index engine
//!
//! One synchronous pass per query: derived indices -> per-source condition
//! scores -> fused probabilities -> driver ranking and confidence grading.
//! The engine is a pure function of the assembled `ObservationBundle` and
//! the engine configuration; it never fails and never touches I/O, so
//! identical inputs yield bit-identical results.

pub mod confidence;
pub mod curves;
pub mod drivers;
pub mod fusion;
pub mod indices;
pub mod scoring;
pub mod suggestions;

use crate::config::EngineConfig;
use crate::models::{Condition, ConditionProbabilities, FusedResult, ObservationBundle};

use fusion::FusedCondition;

/// Run the full estimation pipeline over an assembled bundle.
#[must_use]
pub fn evaluate(bundle: &ObservationBundle, config: &EngineConfig) -> FusedResult {
    let scores = scoring::score_all(bundle, config);
    let fused = fusion::fuse_all(&scores, config);

    let mut probabilities = ConditionProbabilities::default();
    for f in &fused {
        probabilities.set(f.condition, f.probability);
    }

    let top_risks = rank_top_risks(&fused, config);
    let drivers = drivers::rank_drivers(bundle, &scores, &fused, config);
    let confidence = confidence::grade(&fused, config);
    let suggestions = suggestions::advise(&fused, confidence, config);

    FusedResult {
        probabilities,
        top_risks,
        drivers,
        confidence,
        suggestions,
    }
}

/// Conditions above the materiality threshold, most probable first.
/// Equal probabilities fall back to the fixed planning-impact order.
fn rank_top_risks(fused: &[FusedCondition], config: &EngineConfig) -> Vec<Condition> {
    let mut risks: Vec<&FusedCondition> = fused
        .iter()
        .filter(|f| f.probability >= config.materiality.top_risk_threshold)
        .collect();
    risks.sort_by(|a, b| {
        b.probability
            .partial_cmp(&a.probability)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| {
                a.condition
                    .planning_priority()
                    .cmp(&b.condition.planning_priority())
            })
    });
    risks.iter().map(|f| f.condition).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LiveObservation, Location, SourceKind};
    use chrono::NaiveDate;

    fn bundle(live: LiveObservation) -> ObservationBundle {
        ObservationBundle::new(
            Location {
                latitude: 47.0,
                longitude: 8.0,
            },
            NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
        )
        .with_live(live)
    }

    #[test]
    fn test_all_five_probabilities_always_present_and_bounded() {
        let config = EngineConfig::default();
        let result = evaluate(
            &ObservationBundle::new(
                Location {
                    latitude: 0.0,
                    longitude: 0.0,
                },
                NaiveDate::from_ymd_opt(2026, 2, 2).unwrap(),
            ),
            &config,
        );
        for condition in Condition::ALL {
            let p = result.probabilities.get(condition);
            assert!((0.0..=1.0).contains(&p));
        }
    }

    #[test]
    fn test_top_risks_sorted_descending() {
        let config = EngineConfig::default();
        let result = evaluate(
            &bundle(LiveObservation::new(
                Some(36.0),
                None,
                Some(75.0),
                Some(11.0),
                Some(6.0),
            )),
            &config,
        );
        let probs: Vec<f64> = result
            .top_risks
            .iter()
            .map(|&c| result.probabilities.get(c))
            .collect();
        for pair in probs.windows(2) {
            assert!(pair[0] >= pair[1]);
        }
        for &c in &result.top_risks {
            assert!(result.probabilities.get(c) >= config.materiality.top_risk_threshold);
        }
    }

    #[test]
    fn test_tie_break_follows_planning_priority() {
        let config = EngineConfig::default();
        let fused: Vec<FusedCondition> = Condition::ALL
            .iter()
            .map(|&condition| FusedCondition {
                condition,
                probability: 0.8,
                estimates: vec![(SourceKind::Live, 0.8)],
                degraded: false,
            })
            .collect();
        let risks = rank_top_risks(&fused, &config);
        assert_eq!(
            risks,
            vec![
                Condition::VeryWet,
                Condition::VeryWindy,
                Condition::VeryHot,
                Condition::VeryCold,
                Condition::VeryUncomfortable,
            ]
        );
    }

    #[test]
    fn test_engine_is_idempotent() {
        let config = EngineConfig::default();
        let b = bundle(LiveObservation::new(
            Some(31.0),
            Some(19.0),
            Some(65.0),
            Some(7.5),
            Some(2.5),
        ));
        let first = evaluate(&b, &config);
        let second = evaluate(&b, &config);
        assert_eq!(first, second);
        // Bit-identical through serialization as well
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
