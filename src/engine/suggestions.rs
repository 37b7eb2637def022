//! Advisory text generation
//!
//! Produces the short suggestion strings returned alongside the
//! probabilities, keyed on which conditions are material. Degraded
//! coverage is surfaced here as an explicit caveat rather than an error.

use crate::config::EngineConfig;
use crate::models::{Condition, Confidence};

use super::fusion::FusedCondition;

/// Build the advisory strings for a fused result.
#[must_use]
pub fn advise(
    fused: &[FusedCondition],
    confidence: Confidence,
    config: &EngineConfig,
) -> Vec<String> {
    let mut suggestions = Vec::new();
    let threshold = config.materiality.top_risk_threshold;

    for f in fused {
        if f.probability < threshold || f.degraded {
            continue;
        }
        let text = match f.condition {
            Condition::VeryWet => {
                "Rain risk is material - consider an earlier start or arrange cover"
            }
            Condition::VeryWindy => {
                "Strong winds expected - prefer a wind-sheltered spot or relocate the setup"
            }
            Condition::VeryHot => {
                "Heat risk - plan shade, extra water and avoid the midday hours"
            }
            Condition::VeryCold => {
                "Cold risk - plan warm layers and limit exposure time"
            }
            Condition::VeryUncomfortable => {
                "Conditions will feel oppressive - keep an indoor backup option"
            }
        };
        suggestions.push(text.to_string());
    }

    let degraded: Vec<&str> = fused
        .iter()
        .filter(|f| f.degraded)
        .map(|f| f.condition.as_str())
        .collect();
    if !degraded.is_empty() {
        suggestions.push(format!(
            "No data source covered {}; those values are neutral priors, not observations",
            degraded.join(", ")
        ));
    }

    if confidence == Confidence::Low {
        suggestions.push(
            "Estimate rests on limited source coverage; treat probabilities as indicative"
                .to_string(),
        );
    }

    suggestions
}
