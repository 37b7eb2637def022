//! Confidence grading
//!
//! Derives the overall low/medium/high label from how many independent
//! sources covered each condition and how well their estimates agree.
//! The grade is advisory metadata; it never blocks a result.

use crate::config::EngineConfig;
use crate::models::{Condition, Confidence};

use super::fusion::FusedCondition;

/// Grade the fused result.
///
/// - Low is forced whenever fewer than two sources contributed to a
///   majority of conditions (heavy single-source or climatology-only
///   reliance).
/// - High requires multi-source agreement within the configured tolerance
///   on at least `min_agreeing_conditions` conditions.
/// - Medium means every condition had at least one real source but
///   agreement or coverage fell short.
#[must_use]
pub fn grade(fused: &[FusedCondition], config: &EngineConfig) -> Confidence {
    let majority = Condition::ALL.len() / 2 + 1;

    let multi_source = fused.iter().filter(|f| f.estimates.len() >= 2).count();
    if multi_source < majority {
        return Confidence::Low;
    }

    let tolerance = config.confidence.agreement_tolerance;
    let agreeing = fused
        .iter()
        .filter(|f| has_agreement(&f.estimates, tolerance))
        .count();
    if agreeing >= config.confidence.min_agreeing_conditions {
        return Confidence::High;
    }

    if fused.iter().all(|f| !f.estimates.is_empty()) {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

/// Whether any pair of estimates from different sources falls within the
/// agreement tolerance.
fn has_agreement(estimates: &[(crate::models::SourceKind, f64)], tolerance: f64) -> bool {
    for (i, &(source_a, a)) in estimates.iter().enumerate() {
        for &(source_b, b) in &estimates[i + 1..] {
            if source_a != source_b && (a - b).abs() < tolerance {
                return true;
            }
        }
    }
    false
}
