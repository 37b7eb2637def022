//! Source fusion
//!
//! Combines the independent per-source estimates for each condition into a
//! single probability using reliability-weighted averaging. Weights are
//! renormalized over the sources actually present, so a missing source
//! widens the influence of the others instead of dragging the estimate
//! toward zero.

use crate::config::EngineConfig;
use crate::models::{Condition, ConditionScore, SourceKind};

/// Fused estimate for one condition, with the estimates that fed it
#[derive(Debug, Clone, PartialEq)]
pub struct FusedCondition {
    pub condition: Condition,
    /// Blended probability in [0,1]
    pub probability: f64,
    /// The (source, probability) estimates that contributed
    pub estimates: Vec<(SourceKind, f64)>,
    /// True when no source covered the condition and the neutral prior
    /// was substituted
    pub degraded: bool,
}

/// Fuse all scores into one estimate per condition. Every condition is
/// present in the output even when no source covered it.
#[must_use]
pub fn fuse_all(scores: &[ConditionScore], config: &EngineConfig) -> Vec<FusedCondition> {
    Condition::ALL
        .iter()
        .map(|&condition| {
            let estimates: Vec<(SourceKind, f64)> = scores
                .iter()
                .filter(|s| s.condition == condition)
                .map(|s| (s.source, s.probability))
                .collect();
            fuse_condition(condition, estimates, config)
        })
        .collect()
}

fn fuse_condition(
    condition: Condition,
    estimates: Vec<(SourceKind, f64)>,
    config: &EngineConfig,
) -> FusedCondition {
    if estimates.is_empty() {
        // Unknown risk, not zero risk
        return FusedCondition {
            condition,
            probability: config.neutral_prior,
            estimates,
            degraded: true,
        };
    }

    // A single estimate passes through untouched; blending only happens
    // between genuinely independent sources.
    let probability = if estimates.len() == 1 {
        estimates[0].1
    } else {
        let mut weighted_sum = 0.0;
        let mut total_weight = 0.0;
        for &(source, p) in &estimates {
            let w = source_weight(source, config);
            weighted_sum += w * p;
            total_weight += w;
        }
        (weighted_sum / total_weight).clamp(0.0, 1.0)
    };

    FusedCondition {
        condition,
        probability,
        estimates,
        degraded: false,
    }
}

fn source_weight(source: SourceKind, config: &EngineConfig) -> f64 {
    match source {
        SourceKind::Live => config.fusion.live,
        SourceKind::PrecipitationSource => config.fusion.precipitation,
        SourceKind::Climatology => config.fusion.climatology,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(condition: Condition, source: SourceKind, probability: f64) -> ConditionScore {
        ConditionScore {
            condition,
            source,
            probability,
            inputs: Vec::new(),
        }
    }

    #[test]
    fn test_all_conditions_present_even_with_no_scores() {
        let config = EngineConfig::default();
        let fused = fuse_all(&[], &config);
        assert_eq!(fused.len(), 5);
        for f in &fused {
            assert!(f.degraded);
            assert_eq!(f.probability, config.neutral_prior);
        }
    }

    #[test]
    fn test_single_source_passes_through_exactly() {
        let config = EngineConfig::default();
        let scores = vec![score(Condition::VeryWet, SourceKind::Live, 0.42)];
        let fused = fuse_all(&scores, &config);
        let wet = fused
            .iter()
            .find(|f| f.condition == Condition::VeryWet)
            .unwrap();
        assert_eq!(wet.probability, 0.42);
        assert!(!wet.degraded);
    }

    #[test]
    fn test_weighted_blend_of_two_sources() {
        let config = EngineConfig::default();
        let scores = vec![
            score(Condition::VeryHot, SourceKind::Live, 0.9),
            score(Condition::VeryHot, SourceKind::Climatology, 0.3),
        ];
        let fused = fuse_all(&scores, &config);
        let hot = fused
            .iter()
            .find(|f| f.condition == Condition::VeryHot)
            .unwrap();
        // (1.0 * 0.9 + 0.5 * 0.3) / 1.5 = 0.7
        assert!((hot.probability - 0.7).abs() < 1e-9);
        assert_eq!(hot.estimates.len(), 2);
    }

    #[test]
    fn test_missing_source_renormalizes_instead_of_zeroing() {
        let config = EngineConfig::default();
        let with_clim = fuse_all(
            &[
                score(Condition::VeryWindy, SourceKind::Live, 0.8),
                score(Condition::VeryWindy, SourceKind::Climatology, 0.8),
            ],
            &config,
        );
        let without_clim = fuse_all(
            &[score(Condition::VeryWindy, SourceKind::Live, 0.8)],
            &config,
        );
        let a = with_clim
            .iter()
            .find(|f| f.condition == Condition::VeryWindy)
            .unwrap();
        let b = without_clim
            .iter()
            .find(|f| f.condition == Condition::VeryWindy)
            .unwrap();
        // Agreeing sources: dropping one must not move the estimate
        assert!((a.probability - b.probability).abs() < 1e-9);
    }

    #[test]
    fn test_three_source_blend_stays_bounded() {
        let config = EngineConfig::default();
        let scores = vec![
            score(Condition::VeryWet, SourceKind::Live, 1.0),
            score(Condition::VeryWet, SourceKind::PrecipitationSource, 1.0),
            score(Condition::VeryWet, SourceKind::Climatology, 1.0),
        ];
        let fused = fuse_all(&scores, &config);
        let wet = fused
            .iter()
            .find(|f| f.condition == Condition::VeryWet)
            .unwrap();
        assert!((wet.probability - 1.0).abs() < 1e-9);
    }
}
