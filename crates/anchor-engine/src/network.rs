//! Weighted reference network construction.
//!
//! A stabilization network is the set of independently tracked features
//! around an anchor, each weighted by distance and kind. Networks are
//! ephemeral: fully recomputed on every refresh tick, never persisted.

use smallvec::SmallVec;

use anchor_core::constants::MIN_REFERENCE_DISTANCE_M;
use anchor_core::types::geometry::{matrix_is_well_formed, Mat4, Vec3};
use anchor_core::types::identifiers::FeatureHandle;
use anchor_core::types::tracking::{Feature, FeatureKind};
use anchor_core::PoseSource;

/// Inline capacity for reference lists; indoor scenes rarely exceed this.
pub type ReferenceList = SmallVec<[ReferenceAnchor; 8]>;

/// One weighted observation of a nearby tracked feature.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ReferenceAnchor {
    /// Opaque reference into the pose source's feature set.
    pub handle: FeatureHandle,
    /// Combined distance x kind weight, in [0, 1].
    pub weight: f64,
    /// Meters from the network center.
    pub distance: f64,
    /// How much this reference vouches for local stability, in [0, 1].
    pub stability_contribution: f64,
}

/// The per-object reference network plus its aggregate score.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct StabilizationNetwork {
    pub center_position: Vec3,
    pub reference_anchors: ReferenceList,
    pub stability_score: f64,
    /// Unix millis of the last full recompute.
    pub last_updated: u64,
    /// Query radius the network was built with, in meters.
    pub radius: f64,
}

/// Query the pose source and weigh everything observable around `center`.
pub fn build_network(pose: &dyn PoseSource, center: &Vec3, radius: f64) -> ReferenceList {
    let features = pose.nearby_features(center, radius);
    weigh_features(&features, center, radius)
}

/// Turn raw feature observations into a sorted, weighted reference list.
///
/// Features within 0.1 m of the center are excluded as self-reference noise;
/// features beyond `radius` are out of scope. Non-finite transforms are kept
/// but contribute zero pose validity. Result is sorted most-trustworthy
/// first; the sort is stable, so ties keep insertion order.
pub fn weigh_features(features: &[Feature], center: &Vec3, radius: f64) -> ReferenceList {
    let mut references = ReferenceList::new();
    if radius <= MIN_REFERENCE_DISTANCE_M {
        return references;
    }

    for feature in features {
        let position = feature_position(&feature.transform);
        if !position.iter().all(|c| c.is_finite()) {
            continue;
        }
        let distance = (position - center).norm();
        if distance <= MIN_REFERENCE_DISTANCE_M || distance > radius {
            continue;
        }

        let distance_weight = (1.0 - distance / radius).clamp(0.0, 1.0);
        let type_weight = feature.kind.type_weight();
        let pose_validity = if matrix_is_well_formed(&feature.transform) {
            1.0
        } else {
            0.0
        };

        references.push(ReferenceAnchor {
            handle: feature.handle,
            weight: distance_weight * type_weight,
            distance,
            stability_contribution: (0.5 + 0.3 * pose_validity + 0.2 * type_weight)
                .clamp(0.0, 1.0),
        });
    }

    references.sort_by(|a, b| {
        b.stability_contribution
            .partial_cmp(&a.stability_contribution)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    references
}

/// High handle bit marking synthetic features. Pose sources hand out
/// plain indices, so tagged handles can never collide with natural ones
/// when both end up in the same reference list.
pub const SYNTHETIC_HANDLE_BIT: u64 = 1 << 63;

/// Evenly spaced synthetic geo features on a horizontal circle around
/// `center`. Used to seed a network where natural features are sparse.
pub fn synthetic_ring(center: &Vec3, radius: f64, count: u32) -> Vec<Feature> {
    let mut features = Vec::with_capacity(count as usize);
    for i in 0..count {
        let angle = (i as f64) * std::f64::consts::TAU / (count.max(1) as f64);
        let position = Vec3::new(
            center.x + radius * angle.cos(),
            center.y,
            center.z + radius * angle.sin(),
        );
        features.push(Feature {
            kind: FeatureKind::Geo,
            transform: Mat4::new_translation(&position),
            handle: FeatureHandle(SYNTHETIC_HANDLE_BIT | u64::from(i)),
        });
    }
    features
}

fn feature_position(transform: &Mat4) -> Vec3 {
    Vec3::new(transform[(0, 3)], transform[(1, 3)], transform[(2, 3)])
}
