//! Domain types shared across the workspace.

pub mod collections;
pub mod geometry;
pub mod identifiers;
pub mod tracking;

pub use collections::{FxHashMap, FxHashSet};
pub use geometry::{Mat4, Transform, Vec3};
pub use identifiers::{FeatureHandle, ObjectId};
pub use tracking::{Feature, FeatureKind, TrackingQuality};
