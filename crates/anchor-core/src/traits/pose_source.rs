//! The pose source boundary.
//!
//! The visual-inertial tracking system is a black box behind this trait.
//! Implementations are expected to be local, in-process, and low-latency;
//! nothing here may block on I/O. The engine takes the implementation as an
//! injected dependency, so tests run against a fake.

use crate::types::geometry::{Transform, Vec3};
use crate::types::identifiers::ObjectId;
use crate::types::tracking::{Feature, TrackingQuality};

/// Read-only view of the underlying tracking system.
pub trait PoseSource: Send + Sync {
    /// Live pose of an anchored object, or `None` while the tracker cannot
    /// resolve it this frame. A `None` is normal and retried next tick.
    fn current_pose(&self, id: &ObjectId) -> Option<Transform>;

    /// All currently observable features within `radius` meters of `center`.
    fn nearby_features(&self, center: &Vec3, radius: f64) -> Vec<Feature>;

    /// Coarse reliability classification of the tracking session.
    fn tracking_quality(&self) -> TrackingQuality;
}
