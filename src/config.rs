//! Scene configuration loaded from YAML
//!
//! Every field has a default, so an empty document describes the reference
//! scene: 6000 foliage points, gold and red baubles, gift boxes and lights.

use serde::{Deserialize, Serialize};
use crate::error::{EngineError, Result};
use crate::interaction::CameraConfig;
use crate::math::color::theme;
use crate::math::Vec3;
use crate::particles::{FoliageConfig, OrnamentConfig, OrnamentKind, StarConfig};
use crate::render::settings::RenderSettings;
use crate::scene::AppState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// State shown on first frame
    pub state: AppState,
    /// Seed for every random layout; drawn from the host when absent
    pub seed: Option<u64>,
    /// Group rotation about +Y in radians per second
    pub rotation_speed: f32,
    pub group_offset: Vec3,
    pub foliage: FoliageConfig,
    pub ornaments: Vec<OrnamentConfig>,
    pub stars: StarConfig,
    pub camera: CameraConfig,
    pub render: RenderSettings,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            state: AppState::TreeShape,
            seed: None,
            rotation_speed: 0.05,
            group_offset: Vec3::new(0.0, -5.0, 0.0),
            foliage: FoliageConfig::default(),
            ornaments: vec![
                OrnamentConfig::new(OrnamentKind::Bauble, 150, theme::BRIGHT_GOLD),
                OrnamentConfig::new(OrnamentKind::Bauble, 80, theme::ACCENT_RED),
                OrnamentConfig::new(OrnamentKind::Gift, 40, theme::EMERALD),
                OrnamentConfig::new(OrnamentKind::Light, 300, theme::WARM_WHITE),
            ],
            stars: StarConfig::default(),
            camera: CameraConfig::default(),
            render: RenderSettings::default(),
        }
    }
}

impl SceneConfig {
    /// Parse and validate a YAML document
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: SceneConfig = if yaml.trim().is_empty() {
            SceneConfig::default()
        } else {
            serde_yaml::from_str(yaml)?
        };
        config.validate()?;
        log::info!(
            "Loaded scene config: {} foliage points, {} ornament layers",
            config.foliage.count,
            config.ornaments.len()
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let positive = |name: &str, value: f32| {
            if value > 0.0 && value.is_finite() {
                Ok(())
            } else {
                Err(EngineError::InvalidConfig(format!(
                    "{} must be positive, got {}",
                    name, value
                )))
            }
        };
        let non_negative = |name: &str, value: f32| {
            if value >= 0.0 && value.is_finite() {
                Ok(())
            } else {
                Err(EngineError::InvalidConfig(format!(
                    "{} must not be negative, got {}",
                    name, value
                )))
            }
        };

        let f = &self.foliage;
        positive("foliage.tree_height", f.tree_height)?;
        positive("foliage.tree_radius", f.tree_radius)?;
        positive("foliage.scatter_radius", f.scatter_radius)?;
        non_negative("foliage.morph.rate", f.morph.rate)?;
        non_negative("foliage.morph.tolerance", f.morph.tolerance)?;

        for (i, layer) in self.ornaments.iter().enumerate() {
            let name = |field: &str| format!("ornaments[{}].{}", i, field);
            positive(&name("tree_height"), layer.tree_height)?;
            positive(&name("tree_radius"), layer.tree_radius)?;
            positive(&name("scatter_radius"), layer.scatter_radius)?;
            non_negative(&name("morph.rate"), layer.morph.rate)?;
            non_negative(&name("morph.tolerance"), layer.morph.tolerance)?;
        }

        positive("camera.fov_degrees", self.camera.fov_degrees)?;
        if self.camera.min_distance > self.camera.max_distance {
            return Err(EngineError::InvalidConfig(
                "camera.min_distance exceeds camera.max_distance".to_string(),
            ));
        }
        if self.camera.min_polar > self.camera.max_polar {
            return Err(EngineError::InvalidConfig(
                "camera.min_polar exceeds camera.max_polar".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{Easing, MorphParams};
    use crate::math::Color;

    #[test]
    fn test_empty_document_is_reference_scene() {
        let config = SceneConfig::from_yaml("").unwrap();
        assert_eq!(config, SceneConfig::default());
        assert_eq!(config.foliage.count, 6000);
        assert_eq!(config.ornaments.len(), 4);
        assert_eq!(config.state, AppState::TreeShape);
    }

    #[test]
    fn test_partial_override() {
        let yaml = r##"
state: SCATTERED
seed: 42
foliage:
  count: 1200
  color_tip: "#FFFFFF"
  morph:
    rate: 3.0
    easing: linear
ornaments:
  - kind: LIGHT
    count: 12
    color: "#FFFDD0"
"##;
        let config = SceneConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.state, AppState::Scattered);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.foliage.count, 1200);
        assert_eq!(config.foliage.tree_height, 12.0);
        assert_eq!(config.foliage.color_tip, Color::rgb(1.0, 1.0, 1.0));
        assert_eq!(config.foliage.morph.rate, 3.0);
        assert_eq!(config.foliage.morph.easing, Easing::Linear);
        assert_eq!(config.ornaments.len(), 1);
        assert_eq!(config.ornaments[0].kind, OrnamentKind::Light);
        assert_eq!(config.ornaments[0].tree_radius, 5.2);
    }

    #[test]
    fn test_partial_foliage_morph_keeps_tolerance() {
        let config = SceneConfig::from_yaml("foliage:\n  morph:\n    rate: 3.0\n").unwrap();
        assert_eq!(config.foliage.morph.rate, 3.0);
        assert_eq!(config.foliage.morph.tolerance, 0.001);

        let config = SceneConfig::from_yaml("foliage:\n  count: 10\n").unwrap();
        assert_eq!(config.foliage.morph, MorphParams::foliage());
    }

    #[test]
    fn test_bad_colour_rejected() {
        let err = SceneConfig::from_yaml("foliage:\n  color_base: green\n").unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
        assert!(err.to_string().contains("green"));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = SceneConfig::from_yaml("foliage:\n  tree_radius: -1.0\n").unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig(_)));

        let err = SceneConfig::from_yaml("ornaments:\n  - kind: GIFT\n    morph:\n      rate: -2\n")
            .unwrap_err();
        assert!(err.to_string().contains("ornaments[0].morph.rate"));
    }

    #[test]
    fn test_unknown_kind_rejected() {
        assert!(SceneConfig::from_yaml("ornaments:\n  - kind: CANDY\n").is_err());
    }
}
