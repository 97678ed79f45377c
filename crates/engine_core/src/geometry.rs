//! Culling geometry: planes, frustums, boxes and sphere overlap tests.
//!
//! Plane normals point *outward*. A sphere is rejected only when it lies fully
//! in front of at least one plane, so the frustum tests can report false
//! positives near the corners but never false negatives.

use glam::{Mat4, Vec3, Vec4};

/// Half-space boundary stored as `(normal, distance)` with `dot(n, p) == distance` on the plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub distance: f32,
}

impl Plane {
    pub fn new(normal: Vec3, distance: f32) -> Self {
        Self { normal, distance }
    }

    /// Plane through three points, normal following the right-hand winding `a -> b -> c`.
    pub fn from_points(a: Vec3, b: Vec3, c: Vec3) -> Self {
        let normal = (b - a).cross(c - a).normalize_or_zero();
        Self {
            normal,
            distance: normal.dot(a),
        }
    }

    /// Build from `ax + by + cz + d >= 0` (inside) coefficients, flipping to an outward normal.
    fn from_inward_coefficients(coeffs: Vec4) -> Self {
        let len = coeffs.truncate().length();
        if len <= f32::EPSILON {
            return Self::new(Vec3::ZERO, 0.0);
        }
        Self {
            normal: -coeffs.truncate() / len,
            distance: coeffs.w / len,
        }
    }

    /// Positive in front of the plane (outside), negative behind.
    pub fn signed_distance(&self, point: Vec3) -> f32 {
        self.normal.dot(point) - self.distance
    }

    pub fn flipped(&self) -> Self {
        Self {
            normal: -self.normal,
            distance: -self.distance,
        }
    }
}

/// Six-plane view frustum: left, right, bottom, top, near, far.
#[derive(Debug, Clone, Copy)]
pub struct Frustum {
    pub planes: [Plane; 6],
}

/// Frustum with the near and far planes dropped.
#[derive(Debug, Clone, Copy)]
pub struct Pyramid {
    pub planes: [Plane; 4],
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Inverted box that any `extend` call will snap to.
    pub fn empty() -> Self {
        Self {
            min: Vec3::splat(f32::INFINITY),
            max: Vec3::splat(f32::NEG_INFINITY),
        }
    }

    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn extend(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    pub fn from_points(points: &[Vec3]) -> Self {
        let mut aabb = Self::empty();
        for &p in points {
            aabb.extend(p);
        }
        aabb
    }

    /// Clamp a point into the box. Works with infinite bounds.
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        point.max(self.min).min(self.max)
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }
}

/// Extract the six planes of a projection (or view-projection) matrix.
pub fn frustum_from_projection(m: Mat4) -> Frustum {
    let r0 = m.row(0);
    let r1 = m.row(1);
    let r2 = m.row(2);
    let r3 = m.row(3);

    Frustum {
        planes: [
            Plane::from_inward_coefficients(r3 + r0),
            Plane::from_inward_coefficients(r3 - r0),
            Plane::from_inward_coefficients(r3 + r1),
            Plane::from_inward_coefficients(r3 - r1),
            Plane::from_inward_coefficients(r3 + r2),
            Plane::from_inward_coefficients(r3 - r2),
        ],
    }
}

/// Four side planes of the volume spanned by eight corners.
///
/// Corner order is the near quad followed by the far quad, each as
/// bottom-left, bottom-right, top-right, top-left.
pub fn pyramid_from_points(corners: &[Vec3; 8]) -> Pyramid {
    let [nbl, nbr, _ntr, ntl, fbl, fbr, ftr, ftl] = *corners;
    let centroid = corners.iter().copied().sum::<Vec3>() / 8.0;

    let outward = |plane: Plane| {
        if plane.signed_distance(centroid) > 0.0 {
            plane.flipped()
        } else {
            plane
        }
    };

    // Use the far corner of each face for the third point; near quads can be tiny.
    Pyramid {
        planes: [
            outward(Plane::from_points(nbl, ftl, fbl)),
            outward(Plane::from_points(nbr, fbr, ftr)),
            outward(Plane::from_points(nbl, fbl, fbr)),
            outward(Plane::from_points(ntl, ftr, ftl)),
        ],
    }
}

/// Exact sphere/box overlap.
pub fn sphere_overlaps_aabb(center: Vec3, radius: f32, aabb: &Aabb) -> bool {
    let closest = aabb.closest_point(center);
    closest.distance_squared(center) <= radius * radius
}

pub fn sphere_fully_in_front_of_plane(center: Vec3, radius: f32, plane: &Plane) -> bool {
    plane.signed_distance(center) > radius
}

pub fn sphere_overlaps_frustum(center: Vec3, radius: f32, frustum: &Frustum) -> bool {
    !frustum
        .planes
        .iter()
        .any(|plane| sphere_fully_in_front_of_plane(center, radius, plane))
}

pub fn sphere_overlaps_pyramid(center: Vec3, radius: f32, pyramid: &Pyramid) -> bool {
    !pyramid
        .planes
        .iter()
        .any(|plane| sphere_fully_in_front_of_plane(center, radius, plane))
}

/// Closed-form inverse of a finite OpenGL-style perspective matrix
/// (`Mat4::perspective_rh_gl` layout).
///
/// Only the diagonal scale terms and the `z`/`w` coupling are read. Any other
/// projection gives a meaningless result.
pub fn invert_perspective(m: Mat4) -> Mat4 {
    let a = m.x_axis.x;
    let b = m.y_axis.y;
    let c = m.z_axis.z;
    let d = m.w_axis.z;

    Mat4::from_cols(
        Vec4::new(1.0 / a, 0.0, 0.0, 0.0),
        Vec4::new(0.0, 1.0 / b, 0.0, 0.0),
        Vec4::new(0.0, 0.0, 0.0, 1.0 / d),
        Vec4::new(0.0, 0.0, -1.0, c / d),
    )
}

/// Transform a normalized-device-coordinate point back through `inverse_projection`.
pub fn unproject(inverse_projection: Mat4, ndc: Vec3) -> Vec3 {
    let p = inverse_projection * ndc.extend(1.0);
    p.truncate() / p.w
}

#[cfg(test)]
mod tests {
    use super::*;

    fn projection() -> Mat4 {
        Mat4::perspective_rh_gl(90f32.to_radians(), 16.0 / 9.0, 4.0, 8192.0)
    }

    #[test]
    fn invert_perspective_matches_generic_inverse() {
        let p = projection();
        let closed = invert_perspective(p);
        let generic = p.inverse();
        for (a, b) in closed.to_cols_array().iter().zip(generic.to_cols_array().iter()) {
            assert!((a - b).abs() < 1e-3, "{a} vs {b}");
        }
    }

    #[test]
    fn unproject_near_and_far_depths() {
        let inv = invert_perspective(projection());
        let near = unproject(inv, Vec3::new(0.0, 0.0, -1.0));
        let far = unproject(inv, Vec3::new(0.0, 0.0, 1.0));
        assert!((near.z + 4.0).abs() < 1e-3);
        assert!((far.z + 8192.0).abs() < 4.0);
    }

    #[test]
    fn sphere_aabb_touching_and_separated() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::ONE);
        assert!(sphere_overlaps_aabb(Vec3::new(2.0, 0.5, 0.5), 1.0, &aabb));
        assert!(!sphere_overlaps_aabb(Vec3::new(2.1, 0.5, 0.5), 1.0, &aabb));
        assert!(sphere_overlaps_aabb(Vec3::splat(0.5), 0.01, &aabb));
    }

    #[test]
    fn sphere_aabb_with_infinite_extent() {
        let aabb = Aabb::new(Vec3::new(-1.0, -1.0, f32::NEG_INFINITY), Vec3::new(1.0, 1.0, 0.0));
        assert!(sphere_overlaps_aabb(Vec3::new(0.0, 0.0, -1.0e6), 0.5, &aabb));
        assert!(!sphere_overlaps_aabb(Vec3::new(0.0, 0.0, 2.0), 0.5, &aabb));
    }

    #[test]
    fn frustum_keeps_points_in_view_and_rejects_behind() {
        let frustum = frustum_from_projection(projection());
        assert!(sphere_overlaps_frustum(Vec3::new(0.0, 0.0, -100.0), 1.0, &frustum));
        assert!(!sphere_overlaps_frustum(Vec3::new(0.0, 0.0, 100.0), 1.0, &frustum));
        assert!(!sphere_overlaps_frustum(Vec3::new(0.0, 0.0, -9000.0), 1.0, &frustum));
    }

    #[test]
    fn sphere_straddling_plane_is_not_culled() {
        let plane = Plane::new(Vec3::X, 0.0);
        assert!(!sphere_fully_in_front_of_plane(Vec3::new(0.5, 0.0, 0.0), 1.0, &plane));
        assert!(sphere_fully_in_front_of_plane(Vec3::new(1.5, 0.0, 0.0), 1.0, &plane));
    }

    #[test]
    fn pyramid_planes_face_outward() {
        let corners = [
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(1.0, -1.0, -1.0),
            Vec3::new(1.0, 1.0, -1.0),
            Vec3::new(-1.0, 1.0, -1.0),
            Vec3::new(-10.0, -10.0, -10.0),
            Vec3::new(10.0, -10.0, -10.0),
            Vec3::new(10.0, 10.0, -10.0),
            Vec3::new(-10.0, 10.0, -10.0),
        ];
        let pyramid = pyramid_from_points(&corners);
        for plane in &pyramid.planes {
            assert!(plane.signed_distance(Vec3::new(0.0, 0.0, -5.0)) < 0.0);
        }
        // Deep beyond the far quad is still inside the side planes.
        assert!(sphere_overlaps_pyramid(Vec3::new(0.0, 0.0, -500.0), 1.0, &pyramid));
        assert!(!sphere_overlaps_pyramid(Vec3::new(50.0, 0.0, -5.0), 1.0, &pyramid));
    }

    #[test]
    fn aabb_from_points_encloses_all() {
        let pts = [Vec3::new(1.0, -2.0, 3.0), Vec3::new(-4.0, 5.0, 0.0)];
        let aabb = Aabb::from_points(&pts);
        assert_eq!(aabb.min, Vec3::new(-4.0, -2.0, 0.0));
        assert_eq!(aabb.max, Vec3::new(1.0, 5.0, 3.0));
        assert!(aabb.contains(Vec3::ZERO));
    }
}
