//! Procedural point distributions for the two morph targets
//!
//! Every sampler is a self-contained draw from the caller's random source;
//! nothing is cached between calls. Pass a seeded `fastrand::Rng` for
//! reproducible layouts.

use std::f32::consts::TAU;
use fastrand::Rng;
use crate::math::Vec3;

/// Exponent applied to the height fraction; below 1 it biases samples
/// toward the base of the cone.
pub const TREE_HEIGHT_BIAS: f32 = 0.8;

/// Uniform-by-volume point inside a sphere of `radius` centred on the origin
pub fn sample_scatter_point(rng: &mut Rng, radius: f32) -> Vec3 {
    let theta = TAU * rng.f32();
    // acos of a uniform [-1, 1] keeps the poles from clustering
    let phi = (2.0 * rng.f32() - 1.0).acos();
    let r = rng.f32().cbrt() * radius;
    Vec3::from_spherical(r, theta, phi)
}

/// Point in a cone silhouette of total `height` and base `radius`, centred
/// vertically on the origin with the apex at `+height / 2`.
///
/// The height fraction `h` runs from 0 at the apex to 1 at the base; the
/// cone's cross-section at that height is a disk of radius `h * radius`,
/// sampled with area-uniform density.
pub fn sample_tree_point(rng: &mut Rng, height: f32, radius: f32) -> Vec3 {
    let h = rng.f32().powf(TREE_HEIGHT_BIAS);
    let y = (1.0 - h) * height - height / 2.0;

    let slice_radius = h * radius;
    let angle = rng.f32() * TAU;
    let r = rng.f32().sqrt() * slice_radius;

    Vec3::new(angle.cos() * r, y, angle.sin() * r)
}

/// Height fraction (0 at apex, 1 at base) of a point produced by
/// [`sample_tree_point`] for the same `height`.
pub fn tree_height_fraction(point: Vec3, height: f32) -> f32 {
    1.0 - (point.y + height / 2.0) / height
}

/// Deterministic spiral placement: `index` climbs from the base
/// (`index = 0`) to the apex while the radius shrinks linearly.
pub fn spiral_tree_point(height: f32, radius: f32, index: usize, total: usize) -> Vec3 {
    if total == 0 {
        return Vec3::new(0.0, -height / 2.0, 0.0);
    }
    let fraction = index as f32 / total as f32;
    let y = fraction * height - height / 2.0;
    let current_radius = (1.0 - fraction) * radius;
    let angle = index as f32 * 0.5;
    Vec3::new(angle.cos() * current_radius, y, angle.sin() * current_radius)
}

/// Point in a spherical shell `[radius, radius + depth)`, direction uniform
/// over the sphere. Used for the star backdrop.
pub fn sample_shell_point(rng: &mut Rng, radius: f32, depth: f32) -> Vec3 {
    let theta = TAU * rng.f32();
    let phi = (2.0 * rng.f32() - 1.0).acos();
    let r = radius + rng.f32() * depth;
    Vec3::from_spherical(r, theta, phi)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: usize = 20_000;

    #[test]
    fn test_scatter_points_inside_sphere() {
        let mut rng = Rng::with_seed(7);
        for radius in [0.5, 1.0, 15.0, 18.0] {
            for _ in 0..2_000 {
                let p = sample_scatter_point(&mut rng, radius);
                assert!(p.length() <= radius * 1.0001, "{:?} outside r={}", p, radius);
            }
        }
    }

    #[test]
    fn test_scatter_radius_is_volume_uniform() {
        // (|p| / R)^3 is uniform on [0, 1) when density is uniform by volume
        let mut rng = Rng::with_seed(11);
        let mut bins = [0usize; 10];
        for _ in 0..SAMPLES {
            let p = sample_scatter_point(&mut rng, 3.0);
            let u = (p.length() / 3.0).powi(3);
            bins[((u * 10.0) as usize).min(9)] += 1;
        }
        let expected = SAMPLES as f32 / 10.0;
        for (i, &count) in bins.iter().enumerate() {
            let deviation = (count as f32 - expected).abs() / expected;
            assert!(deviation < 0.1, "bin {} has {} (expected ~{})", i, count, expected);
        }
    }

    #[test]
    fn test_scatter_not_clustered_at_poles() {
        // Uniform direction means z / r is uniform on [-1, 1]
        let mut rng = Rng::with_seed(3);
        let polar = (0..SAMPLES)
            .map(|_| sample_scatter_point(&mut rng, 1.0))
            .filter(|p| p.length() > 1e-3 && (p.z / p.length()).abs() > 0.9)
            .count();
        let share = polar as f32 / SAMPLES as f32;
        assert!((share - 0.1).abs() < 0.02, "polar share {}", share);
    }

    #[test]
    fn test_tree_points_inside_cone() {
        let mut rng = Rng::with_seed(5);
        let (height, radius) = (12.0, 5.0);
        for _ in 0..SAMPLES {
            let p = sample_tree_point(&mut rng, height, radius);
            assert!(p.y >= -height / 2.0 - 1e-4 && p.y <= height / 2.0 + 1e-4);
            let h = tree_height_fraction(p, height);
            assert!(p.horizontal_length() <= radius * h + 1e-3);
        }
    }

    #[test]
    fn test_tree_biased_toward_base() {
        let mut rng = Rng::with_seed(9);
        let lower = (0..SAMPLES)
            .map(|_| sample_tree_point(&mut rng, 12.0, 5.0))
            .filter(|p| p.y < 0.0)
            .count();
        // P(h > 0.5) = 1 - 0.5^(1/0.8) ≈ 0.58
        let share = lower as f32 / SAMPLES as f32;
        assert!((share - 0.58).abs() < 0.02, "lower share {}", share);
    }

    #[test]
    fn test_tree_slice_is_area_uniform() {
        // Within a thin slice, (r / slice_radius)^2 should be uniform
        let mut rng = Rng::with_seed(21);
        let (height, radius) = (12.0, 5.0);
        let mut inner = 0usize;
        let mut total = 0usize;
        for _ in 0..(SAMPLES * 4) {
            let p = sample_tree_point(&mut rng, height, radius);
            let h = tree_height_fraction(p, height);
            if (0.7..0.8).contains(&h) {
                total += 1;
                let normalized = p.horizontal_length() / (h * radius);
                if normalized * normalized < 0.5 {
                    inner += 1;
                }
            }
        }
        assert!(total > 1_000);
        let share = inner as f32 / total as f32;
        assert!((share - 0.5).abs() < 0.05, "inner share {}", share);
    }

    #[test]
    fn test_spiral_climbs_and_narrows() {
        let base = spiral_tree_point(12.0, 5.0, 0, 100);
        assert!((base.y + 6.0).abs() < 1e-5);
        assert!((base.horizontal_length() - 5.0).abs() < 1e-4);

        let near_top = spiral_tree_point(12.0, 5.0, 99, 100);
        assert!(near_top.y > 5.8);
        assert!(near_top.horizontal_length() < 0.1);

        assert_eq!(spiral_tree_point(12.0, 5.0, 3, 0), Vec3::new(0.0, -6.0, 0.0));
    }

    #[test]
    fn test_shell_points_in_shell() {
        let mut rng = Rng::with_seed(1);
        for _ in 0..1_000 {
            let len = sample_shell_point(&mut rng, 100.0, 50.0).length();
            assert!((99.99..150.01).contains(&len));
        }
    }
}
