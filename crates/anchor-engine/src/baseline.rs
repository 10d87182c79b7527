//! Baseline capture.
//!
//! The baseline is the recorded "true" pose of an anchor at the moment of
//! placement; every later correction targets it.

use serde::{Deserialize, Serialize};

use anchor_core::types::geometry::{Mat4, Transform, Vec3};
use anchor_core::types::tracking::TrackingQuality;
use anchor_core::{AnchorError, PoseSource};

use crate::network::{weigh_features, ReferenceList};
use crate::scoring;

/// Immutable registration-time snapshot for one anchored object.
/// Replaced wholesale on explicit re-registration, never patched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnchorBaseline {
    pub initial_position: Vec3,
    pub initial_transform: Mat4,
    /// Unix millis at capture.
    pub established_at: u64,
    /// Reference network observed at capture time.
    pub reference_snapshot: ReferenceList,
    /// How feature-rich the surroundings were at capture, in [0, 1].
    pub environment_quality: f64,
}

/// Capture a baseline for `initial_transform`.
///
/// Fails with `NoTrackingSession` when the pose source has no session to
/// resolve against (tracking unavailable) or the given transform itself is
/// malformed; registration must not record a pose nobody can stand behind.
pub fn capture_baseline(
    pose: &dyn PoseSource,
    initial_transform: &Transform,
    radius: f64,
    now_millis: u64,
) -> Result<AnchorBaseline, AnchorError> {
    if pose.tracking_quality() == TrackingQuality::Unavailable {
        return Err(AnchorError::NoTrackingSession);
    }
    if !initial_transform.is_well_formed() {
        return Err(AnchorError::NoTrackingSession);
    }

    let position = initial_transform.position();
    let features = pose.nearby_features(&position, radius);
    let reference_snapshot = weigh_features(&features, &position, radius);
    let environment_quality = scoring::environment_quality(&features);

    Ok(AnchorBaseline {
        initial_position: position,
        initial_transform: initial_transform.matrix,
        established_at: now_millis,
        reference_snapshot,
        environment_quality,
    })
}

#[cfg(test)]
mod tests {
    use anchor_core::types::identifiers::{FeatureHandle, ObjectId};
    use anchor_core::types::tracking::{Feature, FeatureKind};

    use super::*;

    struct StubSource {
        quality: TrackingQuality,
        features: Vec<Feature>,
    }

    impl PoseSource for StubSource {
        fn current_pose(&self, _id: &ObjectId) -> Option<Transform> {
            None
        }

        fn nearby_features(&self, _center: &Vec3, _radius: f64) -> Vec<Feature> {
            self.features.clone()
        }

        fn tracking_quality(&self) -> TrackingQuality {
            self.quality
        }
    }

    #[test]
    fn captures_position_snapshot_and_quality() {
        let source = StubSource {
            quality: TrackingQuality::Normal,
            features: vec![Feature {
                kind: FeatureKind::Plane,
                transform: Mat4::new_translation(&Vec3::new(1.0, 0.0, 0.0)),
                handle: FeatureHandle(1),
            }],
        };
        let transform = Transform::from_translation(Vec3::new(0.0, 1.5, 0.0));
        let baseline = capture_baseline(&source, &transform, 3.0, 42).unwrap();

        assert_eq!(baseline.initial_position, Vec3::new(0.0, 1.5, 0.0));
        assert_eq!(baseline.established_at, 42);
        assert_eq!(baseline.reference_snapshot.len(), 1);
        assert!(baseline.environment_quality > 0.0);
    }

    #[test]
    fn fails_without_tracking_session() {
        let source = StubSource {
            quality: TrackingQuality::Unavailable,
            features: Vec::new(),
        };
        let transform = Transform::default();
        let err = capture_baseline(&source, &transform, 3.0, 0).unwrap_err();
        assert!(matches!(err, AnchorError::NoTrackingSession));
    }

    #[test]
    fn fails_on_malformed_transform() {
        let source = StubSource {
            quality: TrackingQuality::Normal,
            features: Vec::new(),
        };
        let mut transform = Transform::default();
        transform.matrix[(1, 3)] = f64::INFINITY;
        let err = capture_baseline(&source, &transform, 3.0, 0).unwrap_err();
        assert!(matches!(err, AnchorError::NoTrackingSession));
    }
}
