use fastrand::Rng;
use crate::config::SceneConfig;
use crate::math::{Mat4, Vec3};
use crate::particles::{FoliageField, OrnamentField};
use super::state::AppState;

/// Groups the foliage and every ornament layer under one slowly turning
/// transform and feeds them the current [`AppState`] each frame.
#[derive(Debug, Clone)]
pub struct SceneComposer {
    foliage: FoliageField,
    ornaments: Vec<OrnamentField>,
    /// Radians per second about +Y, independent of the morph
    rotation_speed: f32,
    offset: Vec3,
    rotation: f32,
}

impl SceneComposer {
    pub fn new(config: &SceneConfig, rng: &mut Rng) -> Self {
        // Fields start scattered and assemble toward the configured state
        let foliage = FoliageField::new(config.foliage.clone(), rng);
        let ornaments = config
            .ornaments
            .iter()
            .map(|layer| OrnamentField::new(layer.clone(), rng))
            .collect::<Vec<_>>();

        log::info!(
            "Scene composed: {} foliage points, {} ornament layers ({} instances)",
            foliage.count(),
            ornaments.len(),
            ornaments.iter().map(OrnamentField::count).sum::<usize>()
        );

        Self {
            foliage,
            ornaments,
            rotation_speed: config.rotation_speed,
            offset: config.group_offset,
            rotation: 0.0,
        }
    }

    /// Per-frame entry point: `time` is the global clock, `dt` the frame delta
    pub fn update(&mut self, time: f32, dt: f32, state: AppState) {
        self.rotation = time * self.rotation_speed;
        self.foliage.update(time, dt, state);
        for layer in &mut self.ornaments {
            layer.update(time, dt, state);
        }
    }

    /// Model matrix shared by every field
    pub fn group_matrix(&self) -> Mat4 {
        Mat4::translation(self.offset).mul(&Mat4::rotation_y(self.rotation))
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn foliage(&self) -> &FoliageField {
        &self.foliage
    }

    pub fn ornaments(&self) -> &[OrnamentField] {
        &self.ornaments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particles::OrnamentKind;

    const DT: f32 = 1.0 / 60.0;

    fn small_config(state: AppState) -> SceneConfig {
        let mut config = SceneConfig {
            state,
            ..Default::default()
        };
        config.foliage.count = 300;
        for layer in &mut config.ornaments {
            layer.count = 20;
        }
        config
    }

    #[test]
    fn test_reference_layers() {
        let composer = SceneComposer::new(&small_config(AppState::TreeShape), &mut Rng::with_seed(1));
        let kinds: Vec<OrnamentKind> = composer.ornaments().iter().map(|o| o.kind()).collect();
        assert_eq!(
            kinds,
            vec![OrnamentKind::Bauble, OrnamentKind::Bauble, OrnamentKind::Gift, OrnamentKind::Light]
        );
    }

    #[test]
    fn test_tree_assembles_on_load() {
        let mut composer = SceneComposer::new(&small_config(AppState::TreeShape), &mut Rng::with_seed(2));
        assert_eq!(composer.foliage().morph().progress(), 0.0);
        assert!(composer.ornaments().iter().all(|o| o.morph().progress() == 0.0));

        let mut time = 0.0;
        let mut last = 0.0;
        for _ in 0..90 {
            time += DT;
            composer.update(time, DT, AppState::TreeShape);
            let progress = composer.foliage().morph().progress();
            assert!(progress >= last);
            last = progress;
        }
        assert_eq!(composer.foliage().morph().progress(), 1.0);
        assert!(composer.ornaments().iter().all(|o| o.morph().progress() == 1.0));
    }

    #[test]
    fn test_state_reaches_every_field() {
        let mut composer = SceneComposer::new(&small_config(AppState::Scattered), &mut Rng::with_seed(3));
        composer.update(DT, DT, AppState::TreeShape);
        assert!(composer.foliage().morph().progress() > 0.0);
        assert!(composer.ornaments().iter().all(|o| o.morph().progress() > 0.0));
    }

    #[test]
    fn test_fields_progress_independently() {
        let mut composer = SceneComposer::new(&small_config(AppState::Scattered), &mut Rng::with_seed(4));
        let mut time = 0.0;
        for _ in 0..30 {
            time += DT;
            composer.update(time, DT, AppState::TreeShape);
        }
        // Foliage runs at 1.5/s, ornaments at 1.0/s
        assert!(composer.foliage().morph().progress() > composer.ornaments()[0].morph().progress());
    }

    #[test]
    fn test_large_step_clamps_all_fields() {
        let mut composer = SceneComposer::new(&small_config(AppState::Scattered), &mut Rng::with_seed(5));
        composer.update(10.0, 10.0, AppState::TreeShape);
        assert_eq!(composer.foliage().morph().progress(), 1.0);
        assert!(composer.ornaments().iter().all(|o| o.morph().progress() == 1.0));
    }

    #[test]
    fn test_rotation_ignores_morph_state() {
        let mut a = SceneComposer::new(&small_config(AppState::Scattered), &mut Rng::with_seed(6));
        let mut b = a.clone();
        a.update(20.0, DT, AppState::TreeShape);
        b.update(20.0, DT, AppState::Scattered);
        assert!((a.rotation() - 1.0).abs() < 1e-6);
        assert_eq!(a.rotation(), b.rotation());
    }

    #[test]
    fn test_group_matrix_applies_offset() {
        let composer = SceneComposer::new(&small_config(AppState::TreeShape), &mut Rng::with_seed(7));
        let origin = composer.group_matrix().transform_point(Vec3::ZERO);
        assert!(origin.distance(&Vec3::new(0.0, -5.0, 0.0)) < 1e-6);
    }
}
