//! # Geometry Primitives
//!
//! Thin aliases over nalgebra plus the handful of ray/plane/segment tests the
//! editor needs for picking and snapping. All values are in normalized units
//! and the world is Z-up.

use nalgebra::{Rotation3, Unit, Vector3};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A unit (normalized) direction vector in 3D space.
pub type Dir3 = Unit<Vector3<f64>>;

/// A point in 2D (profile or screen) space.
pub type Point2 = nalgebra::Point2<f64>;

/// Default tolerance for near-zero denominators
pub const EPSILON: f64 = 1e-9;

/// A half-line starting at `origin`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Point3,
    pub direction: Dir3,
}

impl Ray {
    /// Build a ray; returns `None` for a zero direction.
    pub fn new(origin: Point3, direction: Vec3) -> Option<Self> {
        Unit::try_new(direction, EPSILON).map(|direction| Ray { origin, direction })
    }

    /// Ray from `origin` passing through `target`.
    pub fn through(origin: Point3, target: Point3) -> Option<Self> {
        Ray::new(origin, target - origin)
    }

    /// Vertical ray looking straight down onto `(x, y)` from high above.
    pub fn looking_down(x: f64, y: f64) -> Self {
        Ray {
            origin: Point3::new(x, y, 1000.0),
            direction: -Vec3::z_axis(),
        }
    }

    /// Point at parameter `t` along the ray.
    pub fn at(&self, t: f64) -> Point3 {
        self.origin + self.direction.into_inner() * t
    }

    /// Distance from `p` to the ray and the ray parameter of the closest point.
    pub fn distance_to_point(&self, p: &Point3) -> (f64, f64) {
        let t = (p - self.origin).dot(&self.direction).max(0.0);
        ((self.at(t) - p).norm(), t)
    }

    /// First hit parameter with a sphere, if any.
    pub fn intersect_sphere(&self, center: &Point3, radius: f64) -> Option<f64> {
        let oc = self.origin - center;
        let b = oc.dot(&self.direction);
        let c = oc.norm_squared() - radius * radius;
        let disc = b * b - c;
        if disc < 0.0 {
            return None;
        }
        let sqrt = disc.sqrt();
        let t0 = -b - sqrt;
        let t1 = -b + sqrt;
        if t0 >= 0.0 {
            Some(t0)
        } else if t1 >= 0.0 {
            Some(t1)
        } else {
            None
        }
    }

    /// Closest approach between the ray and segment `a..b`.
    ///
    /// Returns `(distance, ray_t)`.
    pub fn distance_to_segment(&self, a: &Point3, b: &Point3) -> (f64, f64) {
        let d1 = self.direction.into_inner();
        let d2 = b - a;
        let r = self.origin - a;
        let len2 = d2.norm_squared();
        if len2 < EPSILON {
            return self.distance_to_point(a);
        }
        let bdot = d1.dot(&d2);
        let c = d1.dot(&r);
        let f = d2.dot(&r);
        let denom = len2 - bdot * bdot;

        // segment parameter s in [0,1], ray parameter t >= 0
        let mut s = if denom.abs() > EPSILON {
            ((f - bdot * c) / denom).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let mut t = bdot * s - c;
        if t < 0.0 {
            t = 0.0;
            s = (f / len2).clamp(0.0, 1.0);
        }
        let on_ray = self.at(t);
        let on_seg = a + d2 * s;
        ((on_ray - on_seg).norm(), t)
    }

    /// Slab test against an oriented box centered at `center`.
    pub fn intersect_oriented_box(&self, center: &Point3, rotation: &Rotation3<f64>, half_extents: &Vec3) -> Option<f64> {
        // Move the ray into the box's local frame
        let inv = rotation.inverse();
        let o = inv * (self.origin - center);
        let d = inv * self.direction.into_inner();

        let mut t_min = f64::NEG_INFINITY;
        let mut t_max = f64::INFINITY;
        for axis in 0..3 {
            if d[axis].abs() < EPSILON {
                if o[axis].abs() > half_extents[axis] {
                    return None;
                }
                continue;
            }
            let t1 = (-half_extents[axis] - o[axis]) / d[axis];
            let t2 = (half_extents[axis] - o[axis]) / d[axis];
            t_min = t_min.max(t1.min(t2));
            t_max = t_max.min(t1.max(t2));
            if t_min > t_max {
                return None;
            }
        }
        if t_max < 0.0 {
            None
        } else {
            Some(t_min.max(0.0))
        }
    }
}

/// An infinite plane `normal · p = offset`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Dir3,
    pub offset: f64,
}

impl Plane {
    /// Plane through `point` with the given normal; `None` for a zero normal.
    pub fn from_point_normal(point: &Point3, normal: Vec3) -> Option<Self> {
        let normal = Unit::try_new(normal, EPSILON)?;
        Some(Plane {
            offset: normal.dot(&point.coords),
            normal,
        })
    }

    /// Horizontal plane at elevation `z`.
    pub fn horizontal(z: f64) -> Self {
        Plane {
            normal: Vec3::z_axis(),
            offset: z,
        }
    }

    /// Ray/plane hit; `None` when the ray is parallel or points away.
    pub fn intersect(&self, ray: &Ray) -> Option<Point3> {
        let denom = self.normal.dot(&ray.direction);
        if denom.abs() < 1e-6 {
            return None;
        }
        let t = (self.offset - self.normal.dot(&ray.origin.coords)) / denom;
        if t < 0.0 {
            return None;
        }
        Some(ray.at(t))
    }
}

/// Closest point on segment `a..b` to `q` (clamped to the segment).
pub fn project_to_segment(a: &Point3, b: &Point3, q: &Point3) -> Point3 {
    let ab = b - a;
    let aq = q - a;
    let t = (aq.dot(&ab) / ab.norm_squared().max(EPSILON)).clamp(0.0, 1.0);
    a + ab * t
}

/// Distance between two stored coordinate triples.
pub fn length3(a: [f64; 3], b: [f64; 3]) -> f64 {
    let dx = b[0] - a[0];
    let dy = b[1] - a[1];
    let dz = b[2] - a[2];
    (dx * dx + dy * dy + dz * dz).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_horizontal_plane_hit() {
        let ray = Ray::looking_down(2.0, 3.0);
        let hit = Plane::horizontal(0.0).intersect(&ray).unwrap();
        assert_relative_eq!(hit, Point3::new(2.0, 3.0, 0.0));
    }

    #[test]
    fn test_parallel_ray_misses_plane() {
        let ray = Ray::new(Point3::new(0.0, 0.0, 1.0), Vec3::new(1.0, 0.0, 0.0)).unwrap();
        assert!(Plane::horizontal(0.0).intersect(&ray).is_none());
    }

    #[test]
    fn test_plane_behind_ray_misses() {
        let ray = Ray::new(Point3::new(0.0, 0.0, 1.0), Vec3::new(0.0, 0.0, 1.0)).unwrap();
        assert!(Plane::horizontal(0.0).intersect(&ray).is_none());
    }

    #[test]
    fn test_project_to_segment_clamps() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(4.0, 0.0, 0.0);
        assert_eq!(project_to_segment(&a, &b, &Point3::new(2.0, 1.0, 0.0)), Point3::new(2.0, 0.0, 0.0));
        assert_eq!(project_to_segment(&a, &b, &Point3::new(-3.0, 1.0, 0.0)), a);
        assert_eq!(project_to_segment(&a, &b, &Point3::new(9.0, 1.0, 0.0)), b);
    }

    #[test]
    fn test_ray_sphere() {
        let ray = Ray::looking_down(1.0, 1.0);
        let t = ray.intersect_sphere(&Point3::new(1.0, 1.0, 0.0), 0.1).unwrap();
        assert_relative_eq!(ray.at(t).z, 0.1, epsilon = 1e-9);
        assert!(ray.intersect_sphere(&Point3::new(2.0, 1.0, 0.0), 0.1).is_none());
    }

    #[test]
    fn test_ray_segment_distance() {
        let ray = Ray::looking_down(1.0, 0.5);
        let (d, _) = ray.distance_to_segment(&Point3::new(0.0, 0.0, 0.0), &Point3::new(4.0, 0.0, 0.0));
        assert_relative_eq!(d, 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_ray_segment_closest_point_is_interior() {
        // ray crosses above x = 3 on a segment along +X
        let ray = Ray::looking_down(3.0, 0.2);
        let (d, t) = ray.distance_to_segment(&Point3::new(0.0, 0.0, 0.0), &Point3::new(4.0, 0.0, 0.0));
        assert_relative_eq!(d, 0.2, epsilon = 1e-9);
        assert_relative_eq!(ray.at(t).x, 3.0, epsilon = 1e-9);

        // ray starting beside the segment and pointing away: closest is its origin
        let away = Ray::new(Point3::new(2.0, 1.0, 0.0), Vec3::new(0.0, 1.0, 0.0)).unwrap();
        let (d, t) = away.distance_to_segment(&Point3::new(0.0, 0.0, 0.0), &Point3::new(4.0, 0.0, 0.0));
        assert_eq!(t, 0.0);
        assert_relative_eq!(d, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_ray_oriented_box() {
        let ray = Ray::looking_down(0.0, 0.0);
        let half = Vec3::new(0.5, 0.5, 0.5);
        let t = ray.intersect_oriented_box(&Point3::origin(), &Rotation3::identity(), &half).unwrap();
        assert_relative_eq!(ray.at(t).z, 0.5, epsilon = 1e-9);
        let miss = Ray::looking_down(2.0, 0.0);
        assert!(miss.intersect_oriented_box(&Point3::origin(), &Rotation3::identity(), &half).is_none());
    }

    #[test]
    fn test_length3() {
        assert_eq!(length3([0.0, 0.0, 0.0], [3.0, 4.0, 0.0]), 5.0);
    }
}
