//! Static star backdrop
//!
//! A shell of white points far outside the tree. They never morph; the
//! particle shader adds a gentle twinkle.

use fastrand::Rng;
use serde::{Deserialize, Serialize};
use crate::math::Vec3;
use crate::sampling::sample_shell_point;

/// Floats per star: position(3) + size(1) + alpha(1) + color(3)
pub const FLOATS_PER_STAR: usize = 8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StarConfig {
    pub count: usize,
    /// Inner radius of the shell
    pub radius: f32,
    /// Shell thickness
    pub depth: f32,
    /// Size multiplier
    pub factor: f32,
}

impl Default for StarConfig {
    fn default() -> Self {
        Self {
            count: 5000,
            radius: 100.0,
            depth: 50.0,
            factor: 4.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Star {
    position: Vec3,
    size: f32,
    brightness: f32,
}

pub struct StarField {
    stars: Vec<Star>,
}

impl StarField {
    pub fn new(config: &StarConfig, rng: &mut Rng) -> Self {
        let stars = (0..config.count)
            .map(|_| Star {
                position: sample_shell_point(rng, config.radius, config.depth),
                size: (0.5 + 0.5 * rng.f32()) * config.factor,
                brightness: 0.5 + 0.5 * rng.f32(),
            })
            .collect();
        Self { stars }
    }

    /// Get particle data for GPU upload
    pub fn get_particle_data(&self) -> Vec<f32> {
        let mut data = Vec::with_capacity(self.stars.len() * FLOATS_PER_STAR);

        for s in &self.stars {
            s.position.write_to(&mut data);
            data.push(s.size);
            data.push(s.brightness);
            // Desaturated: every channel equal
            data.extend_from_slice(&[1.0, 1.0, 1.0]);
        }

        data
    }

    pub fn count(&self) -> usize {
        self.stars.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_particle_data_format() {
        let stars = StarField::new(&StarConfig { count: 40, ..Default::default() }, &mut Rng::with_seed(1));
        let data = stars.get_particle_data();
        assert_eq!(stars.count(), 40);
        assert_eq!(data.len(), 40 * FLOATS_PER_STAR);
    }

    #[test]
    fn test_stars_far_outside_tree() {
        let config = StarConfig::default();
        let stars = StarField::new(&config, &mut Rng::with_seed(2));
        for chunk in stars.get_particle_data().chunks_exact(FLOATS_PER_STAR) {
            let p = Vec3::new(chunk[0], chunk[1], chunk[2]);
            assert!(p.length() >= config.radius - 1e-2);
            assert!((2.0..=4.0).contains(&chunk[3]));
            assert!((0.5..=1.0).contains(&chunk[4]));
        }
    }
}
