//! Common types for the animation runtime

use glam::{Mat4, Quat, Vec3};

/// Joint transform relative to its parent, stored as separate TRS components
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    /// Identity transform (no translation, no rotation, unit scale)
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Create a new transform
    pub const fn new(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }

    /// Transform with only a translation component
    pub const fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    /// Transform with only a rotation component
    pub const fn from_rotation(rotation: Quat) -> Self {
        Self {
            rotation,
            ..Self::IDENTITY
        }
    }

    /// Affine matrix applying scale, then rotation, then translation
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Trait for values that can be interpolated between two keyframes
pub trait Lerp: Copy {
    /// Interpolate between self and other, `t` in [0, 1]
    fn lerp(&self, other: &Self, t: f32) -> Self;
}

impl Lerp for f32 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t
    }
}

impl Lerp for Vec3 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Vec3::lerp(*self, *other, t)
    }
}

impl Lerp for Quat {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        slerp_shortest(*self, *other, t)
    }
}

/// Spherical linear interpolation along the shorter arc
pub fn slerp_shortest(from: Quat, to: Quat, t: f32) -> Quat {
    let dot = from.dot(to);

    // If dot < 0, negate one quaternion to take shorter arc
    let (to, dot) = if dot < 0.0 { (-to, -dot) } else { (to, dot) };

    // Nearly parallel: normalized lerp is accurate and avoids dividing by sin(~0)
    if dot > 0.9995 {
        return (from + (to - from) * t).normalize();
    }

    let theta_0 = dot.acos();
    let theta = theta_0 * t;
    let sin_theta = theta.sin();
    let sin_theta_0 = theta_0.sin();

    let s0 = (theta_0 - theta).sin() / sin_theta_0;
    let s1 = sin_theta / sin_theta_0;

    from * s0 + to * s1
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_3, FRAC_PI_6};

    #[test]
    fn test_vec3_lerp() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(10.0, 20.0, 30.0);

        let mid = Lerp::lerp(&a, &b, 0.5);
        assert!((mid.x - 5.0).abs() < 0.001);
        assert!((mid.y - 10.0).abs() < 0.001);
        assert!((mid.z - 15.0).abs() < 0.001);
    }

    #[test]
    fn test_slerp_third_turn_midpoint() {
        let from = Quat::IDENTITY;
        let to = Quat::from_rotation_z(2.0 * FRAC_PI_3);

        let mid = slerp_shortest(from, to, 0.5);
        assert!(mid.abs_diff_eq(Quat::from_rotation_z(FRAC_PI_3), 1e-4));

        let quarter = slerp_shortest(from, to, 0.25);
        assert!(quarter.abs_diff_eq(Quat::from_rotation_z(FRAC_PI_6), 1e-4));
    }

    #[test]
    fn test_slerp_matches_glam() {
        let from = Quat::from_rotation_x(0.4);
        let to = Quat::from_rotation_y(1.2);

        for t in [0.0, 0.3, 0.5, 0.9, 1.0] {
            assert!(slerp_shortest(from, to, t).abs_diff_eq(from.slerp(to, t), 1e-4));
        }
    }

    #[test]
    fn test_slerp_takes_shorter_arc() {
        let from = Quat::from_rotation_y(0.1);
        // Same orientation as from_rotation_y(0.3), opposite hemisphere
        let to = -Quat::from_rotation_y(0.3);

        let mid = slerp_shortest(from, to, 0.5);
        assert!(mid.abs_diff_eq(Quat::from_rotation_y(0.2), 1e-4));
    }

    #[test]
    fn test_transform_identity_matrix() {
        assert_eq!(Transform::IDENTITY.to_matrix(), Mat4::IDENTITY);
        assert_eq!(Transform::default(), Transform::IDENTITY);
    }
}
