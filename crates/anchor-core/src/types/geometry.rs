//! Geometry aliases and the `Transform` pose type.
//!
//! Everything lives in the tracking system's world frame; units are meters.

use nalgebra::{Matrix4, Vector3};
use serde::{Deserialize, Serialize};

/// 3D position or direction vector.
pub type Vec3 = Vector3<f64>;
/// Homogeneous 4x4 transform matrix.
pub type Mat4 = Matrix4<f64>;

/// A rigid pose (position + orientation) as a homogeneous matrix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub matrix: Mat4,
}

impl Transform {
    pub fn from_matrix(matrix: Mat4) -> Self {
        Self { matrix }
    }

    /// Identity orientation at the given position.
    pub fn from_translation(position: Vec3) -> Self {
        Self {
            matrix: Mat4::new_translation(&position),
        }
    }

    /// Translation component of the transform.
    pub fn position(&self) -> Vec3 {
        Vec3::new(
            self.matrix[(0, 3)],
            self.matrix[(1, 3)],
            self.matrix[(2, 3)],
        )
    }

    /// Shift the translation component by `delta`, leaving orientation alone.
    pub fn translate(&mut self, delta: Vec3) {
        self.matrix[(0, 3)] += delta.x;
        self.matrix[(1, 3)] += delta.y;
        self.matrix[(2, 3)] += delta.z;
    }

    /// All sixteen components are finite.
    pub fn is_finite(&self) -> bool {
        self.matrix.iter().all(|c| c.is_finite())
    }

    /// Finite and with a valid homogeneous bottom row (0, 0, 0, 1).
    /// Poses that fail this contribute zero validity to scoring.
    pub fn is_well_formed(&self) -> bool {
        const EPS: f64 = 1e-9;
        self.is_finite()
            && self.matrix[(3, 0)].abs() < EPS
            && self.matrix[(3, 1)].abs() < EPS
            && self.matrix[(3, 2)].abs() < EPS
            && (self.matrix[(3, 3)] - 1.0).abs() < EPS
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            matrix: Mat4::identity(),
        }
    }
}

/// `true` iff a raw matrix is finite with a valid homogeneous bottom row.
pub fn matrix_is_well_formed(matrix: &Mat4) -> bool {
    Transform { matrix: *matrix }.is_well_formed()
}
