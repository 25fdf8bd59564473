//! Foliage particle field
//!
//! Thousands of glowing points that make up the body of the tree. Both
//! morph targets are baked into vertex attributes once; per frame the host
//! only advances the morph progress and the vertex stage derives every
//! displayed position. [`foliage_vertex`] and [`foliage_fragment`] are the
//! CPU mirror of that stage and must stay in step with the GLSL in
//! `render::shaders`.

use fastrand::Rng;
use serde::{Deserialize, Serialize};
use crate::animation::{ease, Easing, MorphParams, MorphState};
use crate::math::color::theme;
use crate::math::{Color, Mat4, Vec3};
use crate::sampling::{sample_scatter_point, sample_tree_point};
use crate::scene::AppState;

/// Upper bound on foliage points; larger configured counts are clamped
pub const MAX_FOLIAGE_COUNT: usize = 200_000;

/// Creation-time settings for the foliage field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FoliageConfig {
    pub count: usize,
    pub tree_height: f32,
    pub tree_radius: f32,
    pub scatter_radius: f32,
    #[serde(deserialize_with = "foliage_morph")]
    pub morph: MorphParams,
    /// Colour at the rim of each point
    pub color_base: Color,
    /// Colour blended in toward the centre of each point
    pub color_tip: Color,
    /// Numerator of the perspective size falloff (`size * k / depth`)
    pub size_attenuation: f32,
    /// Amplitude of the per-point wobble before the chaos scale
    pub noise_amplitude: f32,
}

impl Default for FoliageConfig {
    fn default() -> Self {
        Self {
            count: 6000,
            tree_height: 12.0,
            tree_radius: 5.0,
            scatter_radius: 15.0,
            morph: MorphParams::foliage(),
            color_base: theme::EMERALD,
            color_tip: theme::BRIGHT_GOLD,
            size_attenuation: 300.0,
            noise_amplitude: 0.2,
        }
    }
}

fn foliage_morph<'de, D>(deserializer: D) -> Result<MorphParams, D::Error>
where
    D: serde::Deserializer<'de>,
{
    MorphParams::deserialize_over(MorphParams::foliage(), deserializer)
}

/// Index-aligned attribute arrays uploaded once at creation
#[derive(Debug, Clone, Default)]
pub struct FoliageAttributes {
    /// Placeholder position attribute (zeros); the shader ignores it
    pub positions: Vec<f32>,
    pub scatter_positions: Vec<f32>,
    pub tree_positions: Vec<f32>,
    /// Per-point random scalar in [0, 1)
    pub randoms: Vec<f32>,
    /// Per-point base size in [0.2, 1.0)
    pub sizes: Vec<f32>,
}

impl FoliageAttributes {
    pub fn len(&self) -> usize {
        self.randoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.randoms.is_empty()
    }

    pub fn scatter(&self, index: usize) -> Vec3 {
        vec3_at(&self.scatter_positions, index)
    }

    pub fn tree(&self, index: usize) -> Vec3 {
        vec3_at(&self.tree_positions, index)
    }
}

fn vec3_at(buffer: &[f32], index: usize) -> Vec3 {
    Vec3::new(buffer[index * 3], buffer[index * 3 + 1], buffer[index * 3 + 2])
}

/// Values fed to the foliage program each frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FoliageUniforms {
    pub time: f32,
    pub morph_factor: f32,
    pub easing: Easing,
    pub color_base: Color,
    pub color_tip: Color,
    pub size_attenuation: f32,
    pub noise_amplitude: f32,
}

/// Result of the vertex stage for one point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FoliageVertex {
    /// Position in the field's local space
    pub local_position: Vec3,
    /// Position after the model-view transform
    pub view_position: Vec3,
    pub alpha: f32,
    /// On-screen point diameter in pixels; 0 when behind the viewer
    pub point_size: f32,
}

/// Chaos multiplier: 1.0 scattered, 0.1 assembled
pub fn movement_scale(eased: f32) -> f32 {
    1.0 + (0.1 - 1.0) * eased
}

/// Pulsing opacity, `0.6 + 0.4 * sin(time + random * 10)`
pub fn flicker_alpha(time: f32, random: f32) -> f32 {
    0.6 + 0.4 * (time + random * 10.0).sin()
}

/// Local-space position of a point for a given morph factor
pub fn foliage_position(
    scatter: Vec3,
    tree: Vec3,
    random: f32,
    uniforms: &FoliageUniforms,
) -> Vec3 {
    let t = ease(uniforms.morph_factor, uniforms.easing);
    let time = uniforms.time;

    let noise = Vec3::new(
        (time * 2.0 + random * 10.0).sin(),
        (time * 1.5 + random * 20.0).cos(),
        (time * 1.8 + random * 5.0).sin(),
    )
    .scale(uniforms.noise_amplitude);

    scatter.lerp(&tree, t) + noise.scale(movement_scale(t))
}

/// CPU mirror of the foliage vertex shader
pub fn foliage_vertex(
    scatter: Vec3,
    tree: Vec3,
    random: f32,
    size: f32,
    uniforms: &FoliageUniforms,
    model_view: &Mat4,
) -> FoliageVertex {
    let local_position = foliage_position(scatter, tree, random, uniforms);
    let view_position = model_view.transform_point(local_position);

    let depth = -view_position.z;
    let point_size = if depth > 0.0 {
        size * (uniforms.size_attenuation / depth)
    } else {
        0.0
    };

    FoliageVertex {
        local_position,
        view_position,
        alpha: flicker_alpha(uniforms.time, random),
        point_size,
    }
}

/// CPU mirror of the foliage fragment shader.
///
/// `point_coord` is the fragment's position inside the point sprite in
/// [0, 1]². Returns `None` for fragments outside the circular footprint,
/// otherwise premultiplication-free RGBA for additive blending.
pub fn foliage_fragment(point_coord: [f32; 2], alpha: f32, uniforms: &FoliageUniforms) -> Option<[f32; 4]> {
    let dx = point_coord[0] - 0.5;
    let dy = point_coord[1] - 0.5;
    let dist = (dx * dx + dy * dy).sqrt();
    if dist > 0.5 {
        return None;
    }

    let strength = (1.0 - dist * 2.0).powf(1.5);
    let color = uniforms.color_base.mix(&uniforms.color_tip, strength * 0.5);

    Some([color.r, color.g, color.b, strength * alpha])
}

/// The foliage particle field: baked attributes plus its own morph state
#[derive(Debug, Clone)]
pub struct FoliageField {
    config: FoliageConfig,
    attributes: FoliageAttributes,
    morph: MorphState,
    time: f32,
}

impl FoliageField {
    pub fn new(mut config: FoliageConfig, rng: &mut Rng) -> Self {
        if config.count > MAX_FOLIAGE_COUNT {
            log::warn!(
                "Foliage count {} exceeds limit, clamping to {}",
                config.count,
                MAX_FOLIAGE_COUNT
            );
            config.count = MAX_FOLIAGE_COUNT;
        }

        let attributes = Self::generate(&config, rng);
        log::debug!("Generated {} foliage points", attributes.len());

        Self {
            config,
            attributes,
            morph: MorphState::default(),
            time: 0.0,
        }
    }

    fn generate(config: &FoliageConfig, rng: &mut Rng) -> FoliageAttributes {
        let count = config.count;
        let mut attrs = FoliageAttributes {
            positions: vec![0.0; count * 3],
            scatter_positions: Vec::with_capacity(count * 3),
            tree_positions: Vec::with_capacity(count * 3),
            randoms: Vec::with_capacity(count),
            sizes: Vec::with_capacity(count),
        };

        for _ in 0..count {
            sample_scatter_point(rng, config.scatter_radius).write_to(&mut attrs.scatter_positions);
            sample_tree_point(rng, config.tree_height, config.tree_radius)
                .write_to(&mut attrs.tree_positions);
            attrs.randoms.push(rng.f32());
            attrs.sizes.push(rng.f32() * 0.8 + 0.2);
        }

        attrs
    }

    /// Start already settled in `state` instead of fully scattered
    #[cfg(test)]
    pub fn with_initial_state(mut self, state: AppState) -> Self {
        self.morph = MorphState::settled(state.morph_target());
        self
    }

    /// Advance the morph toward `state`. `time` is the global clock.
    pub fn update(&mut self, time: f32, dt: f32, state: AppState) {
        self.time = time;
        self.morph = self.morph.advance(state.morph_target(), dt, &self.config.morph);
    }

    pub fn uniforms(&self) -> FoliageUniforms {
        FoliageUniforms {
            time: self.time,
            morph_factor: self.morph.progress(),
            easing: self.config.morph.easing,
            color_base: self.config.color_base,
            color_tip: self.config.color_tip,
            size_attenuation: self.config.size_attenuation,
            noise_amplitude: self.config.noise_amplitude,
        }
    }

    /// Local-space position of point `index` as the vertex stage would place it
    pub fn displayed_position(&self, index: usize) -> Vec3 {
        foliage_position(
            self.attributes.scatter(index),
            self.attributes.tree(index),
            self.attributes.randoms[index],
            &self.uniforms(),
        )
    }

    pub fn attributes(&self) -> &FoliageAttributes {
        &self.attributes
    }

    pub fn config(&self) -> &FoliageConfig {
        &self.config
    }

    pub fn morph(&self) -> MorphState {
        self.morph
    }

    pub fn count(&self) -> usize {
        self.attributes.len()
    }
}
