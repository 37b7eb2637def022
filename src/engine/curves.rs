//! Threshold curves mapping a raw variable to a probability
//!
//! Each condition is scored through a named curve held in configuration so
//! anchors can be recalibrated against real climatological data without
//! touching fusion logic.

use serde::{Deserialize, Serialize};

/// A monotonic curve from a physical variable to a probability in [0,1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Curve {
    /// Linear interpolation between two anchors. Descending when
    /// `zero_at > one_at`. Values beyond an anchor clamp to that anchor's
    /// probability; a value exactly at an anchor resolves to the anchor.
    Ramp { zero_at: f64, one_at: f64 },
    /// Logistic curve centered on `midpoint`; negative `steepness`
    /// produces a descending curve.
    Logistic { midpoint: f64, steepness: f64 },
}

impl Curve {
    /// Evaluate the curve at `x`, clamped to [0,1].
    #[must_use]
    pub fn evaluate(&self, x: f64) -> f64 {
        match *self {
            Curve::Ramp { zero_at, one_at } => {
                let span = one_at - zero_at;
                if span.abs() < f64::EPSILON {
                    return 0.5;
                }
                ((x - zero_at) / span).clamp(0.0, 1.0)
            }
            Curve::Logistic {
                midpoint,
                steepness,
            } => {
                let p = 1.0 / (1.0 + (-steepness * (x - midpoint)).exp());
                p.clamp(0.0, 1.0)
            }
        }
    }

    /// Whether the curve is well-formed (anchors distinct, slope nonzero)
    #[must_use]
    pub fn is_valid(&self) -> bool {
        match *self {
            Curve::Ramp { zero_at, one_at } => (one_at - zero_at).abs() > f64::EPSILON,
            Curve::Logistic { steepness, .. } => steepness.abs() > f64::EPSILON,
        }
    }
}
