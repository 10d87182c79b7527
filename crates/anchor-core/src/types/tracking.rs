//! Tracking-side domain types: quality classification and observable features.

use serde::{Deserialize, Serialize};

use super::geometry::Mat4;
use super::identifiers::FeatureHandle;

/// Coarse classification of the underlying tracking system's reliability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingQuality {
    Normal,
    Limited,
    Unavailable,
}

impl TrackingQuality {
    /// Decode a platform adapter's raw quality code.
    /// Unrecognized codes map to `Normal` (fail-safe, not fail-loud).
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            1 => Self::Limited,
            2 => Self::Unavailable,
            _ => Self::Normal,
        }
    }
}

impl Default for TrackingQuality {
    fn default() -> Self {
        Self::Normal
    }
}

/// Kind of real-world feature the pose source can track.
/// Closed set: the type-weight table below is the only dispatch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    /// Geo-referenced anchor (survey-grade, best evidence).
    Geo,
    /// Recognized planar surface.
    Plane,
    /// Recognized image marker.
    Image,
    /// Recognized 3D object.
    Object,
    /// Generic tracked feature point.
    Generic,
}

impl FeatureKind {
    /// How much a feature of this kind is trusted as stability evidence.
    pub const fn type_weight(self) -> f64 {
        match self {
            Self::Geo => 1.0,
            Self::Image => 0.9,
            Self::Plane => 0.8,
            Self::Object => 0.7,
            Self::Generic => 0.5,
        }
    }
}

/// A currently observable real-world feature, as reported by the pose source.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub kind: FeatureKind,
    pub transform: Mat4,
    pub handle: FeatureHandle,
}
