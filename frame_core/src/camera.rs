//! # Orbit Camera
//!
//! Z-up perspective camera orbiting a target point. Used by the GUI to turn
//! cursor positions into pick rays and to project the scene onto the canvas,
//! and by the CLI to aim rays at world points.
//!
//! Screen positions are normalized device coordinates: x and y in `-1..=1`,
//! y up.

use crate::geometry::{Point2, Point3, Ray, Vec3};

/// Pitch stays this far from straight up/down (radians)
const PITCH_LIMIT: f64 = 1.55;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitCamera {
    pub target: Point3,
    pub distance: f64,
    /// Heading around world Z (radians)
    pub yaw: f64,
    /// Elevation above the XY plane (radians)
    pub pitch: f64,
    /// Vertical field of view (radians)
    pub fov_y: f64,
    pub near: f64,
}

impl Default for OrbitCamera {
    /// Looking at the origin from +X, -Y, +Z.
    fn default() -> Self {
        OrbitCamera::looking_at(Point3::new(35.0, -40.0, 30.0), Point3::origin())
    }
}

impl OrbitCamera {
    /// Camera at `eye` looking at `target`.
    pub fn looking_at(eye: Point3, target: Point3) -> Self {
        let d = eye - target;
        let distance = d.norm().max(1e-3);
        OrbitCamera {
            target,
            distance,
            yaw: d.y.atan2(d.x),
            pitch: (d.z / distance).clamp(-1.0, 1.0).asin(),
            fov_y: 60f64.to_radians(),
            near: 0.1,
        }
    }

    pub fn eye(&self) -> Point3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        self.target + Vec3::new(cp * cy, cp * sy, sp) * self.distance
    }

    /// (right, up, forward) of the view.
    pub fn view_axes(&self) -> (Vec3, Vec3, Vec3) {
        let forward = (self.target - self.eye()).normalize();
        let right = forward.cross(&Vec3::z()).try_normalize(1e-9).unwrap_or_else(Vec3::x);
        let up = right.cross(&forward);
        (right, up, forward)
    }

    /// Pick ray through a screen position.
    pub fn ray_through(&self, ndc: Point2, aspect: f64) -> Option<Ray> {
        let (right, up, forward) = self.view_axes();
        let half = (self.fov_y / 2.0).tan();
        let dir = forward + right * (ndc.x * half * aspect) + up * (ndc.y * half);
        Ray::new(self.eye(), dir)
    }

    /// Ray from the eye through a world point.
    pub fn ray_to(&self, world: &Point3) -> Option<Ray> {
        Ray::through(self.eye(), *world)
    }

    /// Screen position of a world point, `None` when it is behind the near plane.
    pub fn project(&self, world: &Point3, aspect: f64) -> Option<Point2> {
        let (right, up, forward) = self.view_axes();
        let rel = world - self.eye();
        let depth = rel.dot(&forward);
        if depth < self.near {
            return None;
        }
        let half = (self.fov_y / 2.0).tan();
        Some(Point2::new(
            rel.dot(&right) / (depth * half * aspect),
            rel.dot(&up) / (depth * half),
        ))
    }

    pub fn orbit(&mut self, d_yaw: f64, d_pitch: f64) {
        self.yaw += d_yaw;
        self.pitch = (self.pitch + d_pitch).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Multiply the distance; factors below 1 move closer.
    pub fn zoom(&mut self, factor: f64) {
        if factor.is_finite() && factor > 0.0 {
            self.distance = (self.distance * factor).max(self.near * 2.0);
        }
    }

    /// Slide the target in the view plane.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        let (right, up, _) = self.view_axes();
        self.target += right * dx + up * dy;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_eye() {
        let cam = OrbitCamera::default();
        assert_relative_eq!(cam.eye(), Point3::new(35.0, -40.0, 30.0), epsilon = 1e-9);
    }

    #[test]
    fn test_center_ray_hits_target() {
        let cam = OrbitCamera::default();
        let ray = cam.ray_through(Point2::origin(), 1.5).unwrap();
        let (dist, _) = ray.distance_to_point(&cam.target);
        assert!(dist < 1e-9);
    }

    #[test]
    fn test_project_inverts_ray() {
        let cam = OrbitCamera::default();
        let world = Point3::new(3.0, 2.0, 1.0);
        let ndc = cam.project(&world, 1.5).unwrap();
        let ray = cam.ray_through(ndc, 1.5).unwrap();
        let (dist, _) = ray.distance_to_point(&world);
        assert!(dist < 1e-9);
    }

    #[test]
    fn test_point_behind_camera() {
        let cam = OrbitCamera::default();
        let behind = cam.eye() + (cam.eye() - cam.target);
        assert!(cam.project(&behind, 1.0).is_none());
    }

    #[test]
    fn test_orbit_clamps_pitch() {
        let mut cam = OrbitCamera::default();
        cam.orbit(0.0, 10.0);
        assert_eq!(cam.pitch, PITCH_LIMIT);
        cam.zoom(0.5);
        cam.zoom(-1.0);
        assert!(cam.distance > 0.0);
    }
}
