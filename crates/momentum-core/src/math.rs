//! Vector helpers with the semantics the movement code relies on
//!
//! glam's own `lerp` does not clamp and `from_rotation_arc` expects unit
//! vectors, so the movement code goes through these wrappers instead.

use glam::{Quat, Vec3};

/// Squared length below which a vector is treated as zero
pub const EPSILON_SQ: f32 = 1e-10;

/// Remove the component of `vector` along `normal`.
///
/// A degenerate normal leaves the vector unchanged.
pub fn project_on_plane(vector: Vec3, normal: Vec3) -> Vec3 {
    let len_sq = normal.length_squared();
    if len_sq < EPSILON_SQ {
        return vector;
    }
    vector - normal * (vector.dot(normal) / len_sq)
}

/// Component of `vector` along `onto` (zero if `onto` is degenerate)
pub fn project(vector: Vec3, onto: Vec3) -> Vec3 {
    let len_sq = onto.length_squared();
    if len_sq < EPSILON_SQ {
        return Vec3::ZERO;
    }
    onto * (vector.dot(onto) / len_sq)
}

/// Linear interpolation with `t` clamped to `[0, 1]`
pub fn lerp_clamped(from: Vec3, to: Vec3, t: f32) -> Vec3 {
    from.lerp(to, t.clamp(0.0, 1.0))
}

/// Shortest rotation taking the direction of `from` onto the direction of `to`.
///
/// Returns the identity when either vector is zero.
pub fn from_to_rotation(from: Vec3, to: Vec3) -> Quat {
    if from.length_squared() < EPSILON_SQ || to.length_squared() < EPSILON_SQ {
        return Quat::IDENTITY;
    }
    Quat::from_rotation_arc(from.normalize(), to.normalize())
}

/// Frame-rate independent smoothing factor `1 - e^(-rate * dt)`
pub fn exp_smoothing(rate: f32, dt: f32) -> f32 {
    1.0 - (-rate * dt).exp()
}

/// Clamp the length of `vector` to at most `max_length`
pub fn clamp_magnitude(vector: Vec3, max_length: f32) -> Vec3 {
    vector.clamp_length_max(max_length.max(0.0))
}

/// Angle in degrees between two vectors (0 if either is zero)
pub fn angle_degrees(a: Vec3, b: Vec3) -> f32 {
    if a.length_squared() < EPSILON_SQ || b.length_squared() < EPSILON_SQ {
        return 0.0;
    }
    a.angle_between(b).to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_on_plane() {
        let v = Vec3::new(3.0, 4.0, 0.0);
        let flat = project_on_plane(v, Vec3::Y);
        assert_eq!(flat, Vec3::new(3.0, 0.0, 0.0));
        assert_eq!(project_on_plane(v, Vec3::ZERO), v);
    }

    #[test]
    fn test_project() {
        let v = Vec3::new(3.0, 4.0, 0.0);
        assert_eq!(project(v, Vec3::Y * 2.0), Vec3::new(0.0, 4.0, 0.0));
        assert_eq!(project(v, Vec3::ZERO), Vec3::ZERO);
    }

    #[test]
    fn test_lerp_clamps() {
        let a = Vec3::ZERO;
        let b = Vec3::X * 10.0;
        assert_eq!(lerp_clamped(a, b, 2.0), b);
        assert_eq!(lerp_clamped(a, b, -1.0), a);
        assert!((lerp_clamped(a, b, 0.25).x - 2.5).abs() < 1e-5);
    }

    #[test]
    fn test_from_to_rotation() {
        let rotated = from_to_rotation(Vec3::X * 5.0, Vec3::Z) * (Vec3::X * 5.0);
        assert!((rotated - Vec3::Z * 5.0).length() < 1e-4);
        assert_eq!(from_to_rotation(Vec3::ZERO, Vec3::Z), Quat::IDENTITY);
    }

    #[test]
    fn test_exp_smoothing_range() {
        let f = exp_smoothing(15.0, 0.1);
        assert!(f > 0.0 && f < 1.0);
        assert_eq!(exp_smoothing(0.0, 0.1), 0.0);
    }

    #[test]
    fn test_angle_degrees() {
        assert!((angle_degrees(Vec3::X, Vec3::Y) - 90.0).abs() < 1e-3);
        assert_eq!(angle_degrees(Vec3::ZERO, Vec3::Y), 0.0);
    }
}
