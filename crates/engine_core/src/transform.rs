//! Euler-angle helpers in the game's Z-up convention.
//!
//! Angles are `(pitch, yaw, roll)` in degrees. Positive pitch looks down.

use glam::Vec3;

/// Basis vectors for a set of view angles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleVectors {
    pub forward: Vec3,
    pub right: Vec3,
    pub up: Vec3,
}

/// Forward/right/up for `angles`. At zero angles forward is +X, right is -Y and up is +Z.
pub fn angle_vectors(angles: Vec3) -> AngleVectors {
    let (sp, cp) = angles.x.to_radians().sin_cos();
    let (sy, cy) = angles.y.to_radians().sin_cos();
    let (sr, cr) = angles.z.to_radians().sin_cos();

    AngleVectors {
        forward: Vec3::new(cp * cy, cp * sy, -sp),
        right: Vec3::new(-sr * sp * cy + cr * sy, -sr * sp * sy - cr * cy, -sr * cp),
        up: Vec3::new(cr * sp * cy + sr * sy, cr * sp * sy - sr * cy, cr * cp),
    }
}

/// Just the forward vector.
pub fn angles_forward(angles: Vec3) -> Vec3 {
    angle_vectors(angles).forward
}

/// Inverse of [`angles_forward`]; roll is always zero.
pub fn vec_to_angles(dir: Vec3) -> Vec3 {
    let (pitch, yaw);
    if dir.x == 0.0 && dir.y == 0.0 {
        yaw = 0.0;
        pitch = if dir.z > 0.0 { 90.0 } else { 270.0 };
    } else {
        let mut y = dir.y.atan2(dir.x).to_degrees();
        if y < 0.0 {
            y += 360.0;
        }
        yaw = y;

        let flat = (dir.x * dir.x + dir.y * dir.y).sqrt();
        let mut p = dir.z.atan2(flat).to_degrees();
        if p < 0.0 {
            p += 360.0;
        }
        pitch = p;
    }
    Vec3::new(-pitch, yaw, 0.0)
}

/// Linear interpolation `a + (b - a) * t`.
pub fn lerp(a: f32, t: f32, b: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn zero_angles_basis() {
        let v = angle_vectors(Vec3::ZERO);
        assert!(close(v.forward, Vec3::X));
        assert!(close(v.right, -Vec3::Y));
        assert!(close(v.up, Vec3::Z));
    }

    #[test]
    fn positive_pitch_looks_down() {
        let f = angles_forward(Vec3::new(45.0, 0.0, 0.0));
        assert!(f.z < 0.0);
    }

    #[test]
    fn vec_to_angles_roundtrips_direction() {
        let dir = Vec3::new(0.3, -0.8, 0.2).normalize();
        let back = angles_forward(vec_to_angles(dir));
        assert!(close(dir, back));
    }

    #[test]
    fn vertical_directions() {
        assert!(close(angles_forward(vec_to_angles(Vec3::Z)), Vec3::Z));
        assert!(close(angles_forward(vec_to_angles(-Vec3::Z)), -Vec3::Z));
    }
}
