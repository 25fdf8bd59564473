//! Instanced ornament fields (baubles, gift boxes, fairy lights)
//!
//! Unlike the foliage, ornaments are rigid bodies with their own rotation
//! and scale, so each instance's matrix is built on the host every frame
//! and written into one shared transform buffer for a single instanced draw.

use std::f32::consts::TAU;
use fastrand::Rng;
use serde::{Deserialize, Serialize};
use crate::animation::{MorphParams, MorphState};
use crate::math::color::theme;
use crate::math::{Color, Mat4, Vec3};
use crate::sampling::{sample_scatter_point, sample_tree_point};
use crate::scene::AppState;

/// Upper bound on instances per field; larger configured counts are clamped
pub const MAX_ORNAMENT_COUNT: usize = 10_000;

/// Floats per instance in the transform buffer (one column-major mat4)
pub const FLOATS_PER_INSTANCE: usize = 16;

/// Ornament category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrnamentKind {
    Bauble,
    Gift,
    Light,
}

/// Base geometry drawn for each instance
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Sphere { radius: f32, segments: usize },
    Cube { size: f32 },
}

/// How a category is shaded
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Appearance {
    pub shape: Shape,
    pub metalness: f32,
    pub roughness: f32,
    /// Lit by the scene lights; unlit pieces output their flat colour
    pub lit: bool,
    /// Unlit emissive pieces skip tone mapping so they can drive the bloom pass
    pub tone_mapped: bool,
}

impl OrnamentKind {
    /// Factor applied to the cone sample: lights sit inside the foliage,
    /// everything else rests just outside it.
    pub fn tree_scale(self) -> f32 {
        match self {
            OrnamentKind::Light => 0.9,
            OrnamentKind::Bauble | OrnamentKind::Gift => 1.05,
        }
    }

    pub fn flickers(self) -> bool {
        self == OrnamentKind::Light
    }

    pub fn appearance(self) -> Appearance {
        match self {
            OrnamentKind::Bauble => Appearance {
                shape: Shape::Sphere { radius: 0.25, segments: 16 },
                metalness: 0.9,
                roughness: 0.1,
                lit: true,
                tone_mapped: true,
            },
            OrnamentKind::Gift => Appearance {
                shape: Shape::Cube { size: 0.4 },
                metalness: 0.3,
                roughness: 0.6,
                lit: true,
                tone_mapped: true,
            },
            OrnamentKind::Light => Appearance {
                shape: Shape::Sphere { radius: 0.08, segments: 8 },
                metalness: 0.0,
                roughness: 1.0,
                lit: false,
                tone_mapped: false,
            },
        }
    }
}

/// Creation-time settings for one ornament field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrnamentConfig {
    pub kind: OrnamentKind,
    pub count: usize,
    pub color: Color,
    pub scatter_radius: f32,
    pub tree_height: f32,
    pub tree_radius: f32,
    pub morph: MorphParams,
}

impl Default for OrnamentConfig {
    fn default() -> Self {
        Self {
            kind: OrnamentKind::Bauble,
            count: 100,
            color: theme::BRIGHT_GOLD,
            scatter_radius: 18.0,
            tree_height: 12.0,
            tree_radius: 5.2,
            morph: MorphParams::ornaments(),
        }
    }
}

impl OrnamentConfig {
    pub fn new(kind: OrnamentKind, count: usize, color: Color) -> Self {
        Self {
            kind,
            count,
            color,
            ..Default::default()
        }
    }
}

/// One ornament: both targets plus its animation parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrnamentInstance {
    pub scatter_position: Vec3,
    pub tree_position: Vec3,
    /// Base uniform scale in [0.5, 1.0)
    pub scale: f32,
    /// Radians per second on every axis, in [0, 0.02)
    pub rotation_speed: f32,
    /// Phase offset in [0, 2π) that staggers floating and flicker
    pub phase: f32,
}

impl OrnamentInstance {
    fn sample(config: &OrnamentConfig, rng: &mut Rng) -> Self {
        let scatter_position = sample_scatter_point(rng, config.scatter_radius);
        let tree_position = sample_tree_point(rng, config.tree_height, config.tree_radius)
            .scale(config.kind.tree_scale());

        Self {
            scatter_position,
            tree_position,
            scale: rng.f32() * 0.5 + 0.5,
            rotation_speed: rng.f32() * 0.02,
            phase: rng.f32() * TAU,
        }
    }
}

/// Vertical and horizontal float amplitudes for an eased morph factor.
///
/// Loose pieces drift widely (0.5, 0.3); settled ones barely bob (0.05, 0.02).
pub fn float_amplitude(eased: f32) -> (f32, f32) {
    let vertical = 0.5 + (0.05 - 0.5) * eased;
    let horizontal = 0.3 + (0.02 - 0.3) * eased;
    (vertical, horizontal)
}

/// Flicker multiplier for lights, `0.8 + 0.4 * sin(time * 10 + phase)`
pub fn light_flicker(time: f32, phase: f32) -> f32 {
    0.8 + 0.4 * (time * 10.0 + phase).sin()
}

/// Per-frame transform of one instance
pub fn instance_transform(
    instance: &OrnamentInstance,
    kind: OrnamentKind,
    time: f32,
    eased: f32,
) -> Mat4 {
    let (amp_y, amp_x) = float_amplitude(eased);

    let mut position = instance.scatter_position.lerp(&instance.tree_position, eased);
    position.y += (time + instance.phase).sin() * amp_y;
    position.x += (time * 0.5 + instance.phase).cos() * amp_x;

    let angle = time * instance.rotation_speed;
    let rotation = Vec3::splat(angle);

    let scale = if kind.flickers() {
        instance.scale * light_flicker(time, instance.phase)
    } else {
        instance.scale
    };

    Mat4::compose(position, rotation, scale)
}

/// A batch of ornaments of one kind and colour
#[derive(Debug, Clone)]
pub struct OrnamentField {
    config: OrnamentConfig,
    instances: Vec<OrnamentInstance>,
    morph: MorphState,
    transforms: Vec<f32>,
}

impl OrnamentField {
    pub fn new(mut config: OrnamentConfig, rng: &mut Rng) -> Self {
        if config.count > MAX_ORNAMENT_COUNT {
            log::warn!(
                "{:?} count {} exceeds limit, clamping to {}",
                config.kind,
                config.count,
                MAX_ORNAMENT_COUNT
            );
            config.count = MAX_ORNAMENT_COUNT;
        }

        let instances: Vec<OrnamentInstance> = (0..config.count)
            .map(|_| OrnamentInstance::sample(&config, rng))
            .collect();
        log::debug!("Generated {} {:?} ornaments", instances.len(), config.kind);

        let mut field = Self {
            transforms: vec![0.0; instances.len() * FLOATS_PER_INSTANCE],
            config,
            instances,
            morph: MorphState::default(),
        };
        field.write_transforms(0.0);
        field
    }

    /// Start already settled in `state` instead of fully scattered
    #[cfg(test)]
    pub fn with_initial_state(mut self, state: AppState) -> Self {
        self.morph = MorphState::settled(state.morph_target());
        self.write_transforms(0.0);
        self
    }

    /// Advance the morph toward `state` and rewrite every instance matrix
    pub fn update(&mut self, time: f32, dt: f32, state: AppState) {
        self.morph = self.morph.advance(state.morph_target(), dt, &self.config.morph);
        self.write_transforms(time);
    }

    fn write_transforms(&mut self, time: f32) {
        let eased = self.morph.eased(self.config.morph.easing);
        let kind = self.config.kind;

        for (instance, slot) in self
            .instances
            .iter()
            .zip(self.transforms.chunks_exact_mut(FLOATS_PER_INSTANCE))
        {
            let matrix = instance_transform(instance, kind, time, eased);
            slot.copy_from_slice(matrix.as_slice());
        }
    }

    /// Shared instance buffer, `FLOATS_PER_INSTANCE` floats per instance
    pub fn transforms(&self) -> &[f32] {
        &self.transforms
    }

    pub fn instance_matrix(&self, index: usize) -> Mat4 {
        let start = index * FLOATS_PER_INSTANCE;
        let mut data = [0.0; 16];
        data.copy_from_slice(&self.transforms[start..start + FLOATS_PER_INSTANCE]);
        Mat4 { data }
    }

    pub fn instances(&self) -> &[OrnamentInstance] {
        &self.instances
    }

    pub fn config(&self) -> &OrnamentConfig {
        &self.config
    }

    pub fn kind(&self) -> OrnamentKind {
        self.config.kind
    }

    pub fn color(&self) -> Color {
        self.config.color
    }

    pub fn morph(&self) -> MorphState {
        self.morph
    }

    pub fn count(&self) -> usize {
        self.instances.len()
    }
}
