use std::f32::consts::PI;
use serde::{Deserialize, Serialize};
use crate::math::{Mat4, Vec3};

/// Limits and starting pose of the orbit camera
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: Vec3,
    pub target: Vec3,
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    /// Polar angle limits measured from +Y, in radians
    pub min_polar: f32,
    pub max_polar: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 2.0, 25.0),
            target: Vec3::ZERO,
            fov_degrees: 45.0,
            min_polar: PI / 3.0,
            max_polar: PI / 1.8,
            min_distance: 10.0,
            max_distance: 40.0,
        }
    }
}

/// Orbit controller: rotate around a fixed target and zoom, no panning
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    config: CameraConfig,
    distance: f32,
    /// Angle from +Y
    polar: f32,
    /// Angle around +Y, 0 looking down -Z
    azimuth: f32,
}

impl OrbitCamera {
    pub fn new(config: CameraConfig) -> Self {
        let offset = config.position - config.target;
        let distance = offset.length().max(f32::EPSILON);
        let polar = (offset.y / distance).clamp(-1.0, 1.0).acos();
        let azimuth = offset.x.atan2(offset.z);

        let mut camera = Self {
            config,
            distance,
            polar,
            azimuth,
        };
        camera.clamp();
        camera
    }

    fn clamp(&mut self) {
        self.polar = self.polar.clamp(self.config.min_polar, self.config.max_polar);
        self.distance = self
            .distance
            .clamp(self.config.min_distance, self.config.max_distance);
    }

    /// Orbit by a pointer drag in pixels
    pub fn orbit(&mut self, delta_x: f32, delta_y: f32) {
        self.azimuth += delta_x * 0.01;
        self.polar -= delta_y * 0.01;
        self.clamp();
    }

    /// Zoom in (negative) or out (positive)
    pub fn zoom(&mut self, delta: f32) {
        self.distance += delta * 0.5;
        self.clamp();
    }

    pub fn position(&self) -> Vec3 {
        let sin_polar = self.polar.sin();
        self.config.target
            + Vec3::new(
                self.distance * sin_polar * self.azimuth.sin(),
                self.distance * self.polar.cos(),
                self.distance * sin_polar * self.azimuth.cos(),
            )
    }

    pub fn target(&self) -> Vec3 {
        self.config.target
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn polar(&self) -> f32 {
        self.polar
    }

    pub fn fov(&self) -> f32 {
        self.config.fov_degrees.to_radians()
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at(self.position(), self.config.target, Vec3::UP)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective(self.fov(), aspect, 0.1, 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starting_pose_preserved() {
        let camera = OrbitCamera::new(CameraConfig::default());
        let p = camera.position();
        assert!(p.distance(&Vec3::new(0.0, 2.0, 25.0)) < 1e-3);
    }

    #[test]
    fn test_polar_is_clamped() {
        let mut camera = OrbitCamera::new(CameraConfig::default());
        camera.orbit(0.0, 10_000.0);
        assert!((camera.polar() - PI / 3.0).abs() < 1e-6);
        camera.orbit(0.0, -10_000.0);
        assert!((camera.polar() - PI / 1.8).abs() < 1e-6);
    }

    #[test]
    fn test_distance_is_clamped() {
        let mut camera = OrbitCamera::new(CameraConfig::default());
        camera.zoom(-1000.0);
        assert_eq!(camera.distance(), 10.0);
        camera.zoom(1000.0);
        assert_eq!(camera.distance(), 40.0);
    }

    #[test]
    fn test_orbit_keeps_distance() {
        let mut camera = OrbitCamera::new(CameraConfig::default());
        let before = camera.position().length();
        camera.orbit(157.0, 0.0);
        assert!((camera.position().length() - before).abs() < 1e-3);
        assert!(camera.position().x.abs() > 1.0);
    }
}
