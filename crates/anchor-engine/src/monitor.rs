//! Drift measurement and bounded correction steps.
//!
//! Pure geometry; the engine facade owns the state and applies the results.

use anchor_core::types::geometry::Vec3;

/// Measured divergence of a live position from its baseline.
#[derive(Debug, Clone, Copy)]
pub struct DriftSample {
    pub drift_vector: Vec3,
    pub magnitude: f64,
}

/// Drift of `live` relative to `baseline`.
pub fn measure_drift(live: &Vec3, baseline: &Vec3) -> DriftSample {
    let drift_vector = live - baseline;
    DriftSample {
        drift_vector,
        magnitude: drift_vector.norm(),
    }
}

/// A single bounded nudge toward the baseline.
#[derive(Debug, Clone, Copy)]
pub struct CorrectionStep {
    /// Applied additively to the live pose.
    pub vector: Vec3,
    pub magnitude: f64,
}

/// Compute one correction step from `live` toward `baseline`.
///
/// Step size is `gain` times the remaining drift, capped at `max_step` and
/// at the remaining distance itself (never overshoots the baseline).
/// Returns `None` when there is nothing meaningful to do: the live pose sits
/// on the baseline (zero-length direction, normal case) or the step falls
/// below `epsilon` (rounding noise; recording it would spam the history).
pub fn correction_step(
    live: &Vec3,
    baseline: &Vec3,
    gain: f64,
    max_step: f64,
    epsilon: f64,
) -> Option<CorrectionStep> {
    let to_baseline = baseline - live;
    let distance = to_baseline.norm();
    if distance <= 0.0 || !distance.is_finite() {
        return None;
    }

    let magnitude = (distance * gain).min(max_step).min(distance);
    if magnitude < epsilon {
        return None;
    }

    let direction = to_baseline / distance;
    Some(CorrectionStep {
        vector: direction * magnitude,
        magnitude,
    })
}
