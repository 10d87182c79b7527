//! Stability scoring.
//!
//! Aggregates a weighted reference list into a single 0-1 confidence value,
//! and rates the surrounding environment at baseline capture time.

use anchor_core::constants::{
    BASE_SELF_STABILITY, ENV_ANCHOR_CAP, ENV_ANCHOR_WEIGHT, ENV_PLANE_CAP, ENV_PLANE_WEIGHT,
    ENV_POINT_CAP, ENV_POINT_WEIGHT, SPARSE_NETWORK_SCORE,
};
use anchor_core::types::tracking::{Feature, FeatureKind};

use crate::network::ReferenceAnchor;

/// Confidence that an anchor's position is trustworthy, in [0, 1].
///
/// The anchor itself contributes a base stability of 1.0; each reference
/// contributes `stability_contribution * weight`; the sum is averaged over
/// `N + 1` participants. A network with zero discovered references is fixed
/// at 0.5: naive division would report 1.0, and an unsupported anchor must
/// not read as certainty.
pub fn stability_score(references: &[ReferenceAnchor]) -> f64 {
    if references.is_empty() {
        return SPARSE_NETWORK_SCORE;
    }
    let sum: f64 = BASE_SELF_STABILITY
        + references
            .iter()
            .map(|r| r.stability_contribution * r.weight)
            .sum::<f64>();
    (sum / (references.len() as f64 + 1.0)).clamp(0.0, 1.0)
}

/// Rate the capture environment from what is currently observable.
///
/// Three capped, normalized factors: trackable anchors (geo/image/object,
/// cap 10, weight 0.4), planar surfaces (cap 5, weight 0.3), and generic
/// feature points (cap 500, weight 0.3).
pub fn environment_quality(features: &[Feature]) -> f64 {
    let mut anchors = 0usize;
    let mut planes = 0usize;
    let mut points = 0usize;
    for feature in features {
        match feature.kind {
            FeatureKind::Geo | FeatureKind::Image | FeatureKind::Object => anchors += 1,
            FeatureKind::Plane => planes += 1,
            FeatureKind::Generic => points += 1,
        }
    }

    let anchor_factor = (anchors as f64).min(ENV_ANCHOR_CAP) / ENV_ANCHOR_CAP;
    let plane_factor = (planes as f64).min(ENV_PLANE_CAP) / ENV_PLANE_CAP;
    let point_factor = (points as f64).min(ENV_POINT_CAP) / ENV_POINT_CAP;

    anchor_factor * ENV_ANCHOR_WEIGHT
        + plane_factor * ENV_PLANE_WEIGHT
        + point_factor * ENV_POINT_WEIGHT
}

/// Arithmetic mean of active network scores; 0.0 when none are active.
pub fn overall_score<I: IntoIterator<Item = f64>>(scores: I) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for score in scores {
        sum += score;
        count += 1;
    }
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}
