//! Formatting utilities

use glam::{Quat, Vec3};
use ossa_anim::Aabb;

/// Format a vector as `(x, y, z)` with three decimals
pub fn format_vec3(v: Vec3) -> String {
    format!("({:.3}, {:.3}, {:.3})", v.x, v.y, v.z)
}

/// Format a rotation as an axis and an angle in degrees
pub fn format_rotation(q: Quat) -> String {
    let (axis, angle) = q.to_axis_angle();
    if angle.abs() < 1e-6 {
        "identity".to_string()
    } else {
        format!("{:.1}° about {}", angle.to_degrees(), format_vec3(axis))
    }
}

/// Format bounds as `min .. max`
pub fn format_bounds(bounds: Option<Aabb>) -> String {
    match bounds {
        Some(aabb) => format!("{} .. {}", format_vec3(aabb.min), format_vec3(aabb.max)),
        None => "N/A".to_string(),
    }
}

/// Format a parent index, `-` for roots
pub fn format_parent(parent: Option<usize>) -> String {
    parent.map_or_else(|| "-".to_string(), |p| p.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_vec3() {
        assert_eq!(format_vec3(Vec3::new(1.0, -0.5, 0.25)), "(1.000, -0.500, 0.250)");
    }

    #[test]
    fn test_format_rotation() {
        assert_eq!(format_rotation(Quat::IDENTITY), "identity");
        assert_eq!(
            format_rotation(Quat::from_rotation_z(std::f32::consts::FRAC_PI_2)),
            "90.0° about (0.000, 0.000, 1.000)"
        );
    }

    #[test]
    fn test_format_bounds() {
        assert_eq!(format_bounds(None), "N/A");
        assert_eq!(
            format_bounds(Some(Aabb::new(Vec3::ZERO, Vec3::ONE))),
            "(0.000, 0.000, 0.000) .. (1.000, 1.000, 1.000)"
        );
    }

    #[test]
    fn test_format_parent() {
        assert_eq!(format_parent(None), "-");
        assert_eq!(format_parent(Some(3)), "3");
    }
}
