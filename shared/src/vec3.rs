/// 3D vector utilities for lane-space geometry.
/// Lane space: x is lateral (across the lane), y is up, -z points down the lane
/// towards the pins.

#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize, PartialEq, Default)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Shorthand constructor
pub fn vec3(x: f64, y: f64, z: f64) -> Vec3 {
    Vec3::new(x, y, z)
}

/// Dot product
pub fn dot(a: Vec3, b: Vec3) -> f64 {
    a.x * b.x + a.y * b.y + a.z * b.z
}

/// Vector length
pub fn length(v: Vec3) -> f64 {
    (v.x * v.x + v.y * v.y + v.z * v.z).sqrt()
}

/// Normalize vector to unit length
pub fn normalize(v: Vec3) -> Vec3 {
    let len = length(v);
    if len < 1e-10 {
        return Vec3::new(0.0, 0.0, -1.0);
    }
    Vec3::new(v.x / len, v.y / len, v.z / len)
}

/// Scale vector by scalar
pub fn scale(v: Vec3, s: f64) -> Vec3 {
    Vec3::new(v.x * s, v.y * s, v.z * s)
}

/// Add two vectors
pub fn add(a: Vec3, b: Vec3) -> Vec3 {
    Vec3::new(a.x + b.x, a.y + b.y, a.z + b.z)
}

/// Subtract vectors (a - b)
pub fn sub(a: Vec3, b: Vec3) -> Vec3 {
    Vec3::new(a.x - b.x, a.y - b.y, a.z - b.z)
}

/// Distance between two points projected onto the lane plane (ignores y).
pub fn planar_distance(a: Vec3, b: Vec3) -> f64 {
    let dx = a.x - b.x;
    let dz = a.z - b.z;
    (dx * dx + dz * dz).sqrt()
}

/// Unit quaternion, stored x/y/z/w like the renderer expects.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize, PartialEq)]
pub struct Quat {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Quat {
    pub const IDENTITY: Quat = Quat {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    /// Rotation of `angle` radians around a unit `axis`.
    pub fn from_axis_angle(axis: Vec3, angle: f64) -> Self {
        let half = angle * 0.5;
        let s = half.sin();
        Self {
            x: axis.x * s,
            y: axis.y * s,
            z: axis.z * s,
            w: half.cos(),
        }
    }
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Rigid-body transform reported by the physics collaborator.
#[derive(Debug, Clone, Copy, Default, serde::Serialize, serde::Deserialize, PartialEq)]
pub struct BodyTransform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl BodyTransform {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }
}

/// A pointer ray in lane space. `direction` need not be normalized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Intersect with the horizontal plane `y = height`.
    /// Returns None for rays parallel to the plane or pointing away from it.
    pub fn intersect_plane_y(&self, height: f64) -> Option<Vec3> {
        if self.direction.y.abs() <= 1e-5 {
            return None;
        }
        let t = (height - self.origin.y) / self.direction.y;
        if t < 0.0 {
            return None;
        }
        Some(add(self.origin, scale(self.direction, t)))
    }

    /// True if the ray passes within `radius` of `center` (in front of the origin).
    pub fn intersects_sphere(&self, center: Vec3, radius: f64) -> bool {
        let dir = normalize(self.direction);
        let to_center = sub(center, self.origin);
        let along = dot(to_center, dir);
        let dist_sq = dot(to_center, to_center);
        let radius_sq = radius * radius;
        if along < 0.0 {
            // Sphere is behind the origin; only a hit if the origin is inside it.
            return dist_sq <= radius_sq;
        }
        dist_sq - along * along <= radius_sq
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn assert_vec3_close(actual: Vec3, expected: Vec3) {
        assert!(
            (actual.x - expected.x).abs() < 1e-6
                && (actual.y - expected.y).abs() < 1e-6
                && (actual.z - expected.z).abs() < 1e-6,
            "Expected {:?} to be close to {:?}",
            actual,
            expected
        );
    }

    #[test]
    fn dot_orthogonal_is_zero() {
        assert_eq!(dot(vec3(1.0, 0.0, 0.0), vec3(0.0, 1.0, 0.0)), 0.0);
    }

    #[test]
    fn normalize_zero_vector_points_down_lane() {
        assert_vec3_close(normalize(Vec3::ZERO), vec3(0.0, 0.0, -1.0));
    }

    #[test]
    fn planar_distance_ignores_height() {
        let d = planar_distance(vec3(0.0, 5.0, 0.0), vec3(3.0, -2.0, 4.0));
        assert!((d - 5.0).abs() < 1e-9);
    }

    #[test]
    fn ray_hits_floor_plane() {
        let ray = Ray::new(vec3(0.5, 2.0, 1.0), vec3(0.0, -1.0, -1.0));
        let hit = ray.intersect_plane_y(0.0).unwrap();
        assert_vec3_close(hit, vec3(0.5, 0.0, -1.0));
    }

    #[test]
    fn ray_parallel_to_plane_misses() {
        let ray = Ray::new(vec3(0.0, 2.0, 0.0), vec3(1.0, 0.0, 0.0));
        assert!(ray.intersect_plane_y(0.0).is_none());
    }

    #[test]
    fn ray_pointing_away_from_plane_misses() {
        let ray = Ray::new(vec3(0.0, 2.0, 0.0), vec3(0.0, 1.0, 0.0));
        assert!(ray.intersect_plane_y(0.0).is_none());
    }

    #[test]
    fn ray_sphere_hit_and_miss() {
        let ray = Ray::new(vec3(0.0, 1.0, 0.0), vec3(0.0, -1.0, 0.0));
        assert!(ray.intersects_sphere(vec3(0.05, 0.1, 0.0), 0.1));
        assert!(!ray.intersects_sphere(vec3(0.5, 0.1, 0.0), 0.1));
    }

    #[test]
    fn ray_ignores_sphere_behind_origin() {
        let ray = Ray::new(vec3(0.0, 1.0, 0.0), vec3(0.0, -1.0, 0.0));
        assert!(!ray.intersects_sphere(vec3(0.0, 3.0, 0.0), 0.1));
    }

    #[test]
    fn quat_from_axis_angle_half_turn() {
        let q = Quat::from_axis_angle(vec3(1.0, 0.0, 0.0), PI);
        assert!((q.x - 1.0).abs() < 1e-9);
        assert!(q.w.abs() < 1e-9);
    }
}
