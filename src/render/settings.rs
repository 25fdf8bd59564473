use serde::{Deserialize, Serialize};
use crate::math::color::theme;
use crate::math::{Color, Vec3};

/// Light rig used by the lit ornament shader
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    pub ambient_color: Color,
    pub ambient_intensity: f32,
    /// Warm key spot light
    pub key_position: Vec3,
    pub key_color: Color,
    pub key_intensity: f32,
    /// Gold rim light from behind-left
    pub fill_position: Vec3,
    pub fill_color: Color,
    pub fill_intensity: f32,
    /// Glow inside the tree, attenuated to zero at `core_range`
    pub core_position: Vec3,
    pub core_color: Color,
    pub core_intensity: f32,
    pub core_range: f32,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            ambient_color: theme::EMERALD,
            ambient_intensity: 0.2,
            key_position: Vec3::new(10.0, 20.0, 10.0),
            key_color: theme::WARM_WHITE,
            key_intensity: 2.0,
            fill_position: Vec3::new(-10.0, 5.0, -10.0),
            fill_color: theme::GOLD,
            fill_intensity: 1.0,
            core_position: Vec3::ZERO,
            core_color: theme::EMERALD,
            core_intensity: 1.5,
            core_range: 10.0,
        }
    }
}

/// Post-processing and output settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub clear_color: Color,
    /// ACES filmic exposure for tone-mapped geometry
    pub exposure: f32,
    /// Luminance above which pixels feed the bloom
    pub bloom_threshold: f32,
    pub bloom_strength: f32,
    pub vignette_offset: f32,
    pub vignette_darkness: f32,
    pub grain_opacity: f32,
    pub lighting: LightingConfig,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            clear_color: Color::rgb(0.0, 0.0, 0.0),
            exposure: 1.2,
            bloom_threshold: 0.8,
            bloom_strength: 1.5,
            vignette_offset: 0.1,
            vignette_darkness: 1.1,
            grain_opacity: 0.02,
            lighting: LightingConfig::default(),
        }
    }
}
