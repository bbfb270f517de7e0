//! Math type re-exports and capture-specific transform utilities.
//!
//! This module re-exports types from `glam` and provides the rigid
//! [`Transform`] used for camera, joint and anchor poses.

// Re-export glam types
pub use glam::{
    // Single precision vectors
    Vec2, Vec3, Vec3A, Vec4,
    // Double precision vectors
    DVec3,
    // Single precision matrices
    Mat3, Mat4,
    // Quaternions
    Quat,
};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Meters (device) to centimeters (engine).
pub const UNIT_SCALE: f32 = 100.0;

/// Rigid transform: translation plus rotation, scale fixed at one.
///
/// Composition follows the engine convention: `a.compose(&b)` applies `a`
/// first and then `b`, i.e. `b` acts as the parent space of `a`.
#[derive(Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Transform {
    /// Identity transform.
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    /// Create a transform from translation and rotation.
    #[inline]
    pub const fn new(translation: Vec3, rotation: Quat) -> Self {
        Self { translation, rotation }
    }

    /// Create a pure translation.
    #[inline]
    pub const fn from_translation(translation: Vec3) -> Self {
        Self { translation, rotation: Quat::IDENTITY }
    }

    /// Scale is always one for capture transforms.
    #[inline]
    pub fn scale(&self) -> Vec3 {
        Vec3::ONE
    }

    /// Inverse transform.
    pub fn inverse(&self) -> Self {
        let inv_rot = self.rotation.inverse();
        Self {
            translation: inv_rot * -self.translation,
            rotation: inv_rot,
        }
    }

    /// Apply `self`, then `parent`.
    pub fn compose(&self, parent: &Transform) -> Self {
        Self {
            translation: parent.rotation * self.translation + parent.translation,
            rotation: parent.rotation * self.rotation,
        }
    }

    /// Express `self` in the space of `parent` (`self * parent⁻¹`).
    pub fn relative_to(&self, parent: &Transform) -> Self {
        let inv_rot = parent.rotation.inverse();
        Self {
            translation: inv_rot * (self.translation - parent.translation),
            rotation: inv_rot * self.rotation,
        }
    }

    /// Transform a point.
    #[inline]
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        self.rotation * p + self.translation
    }

    /// Column-vector 4x4 matrix of this transform.
    #[inline]
    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.translation)
    }

    /// All components finite and the rotation close to unit length.
    pub fn is_valid(&self) -> bool {
        self.translation.is_finite()
            && self.rotation.is_finite()
            && (self.rotation.length_squared() - 1.0).abs() <= 1.0e-3
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Transform(t: {:?}, r: {:?})", self.translation, self.rotation)
    }
}
