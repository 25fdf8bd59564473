//! Easing functions for smooth morphs

use serde::{Deserialize, Serialize};

/// Easing function types
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    /// Linear interpolation
    Linear,
    /// Quadratic ease-in-out
    EaseInOutQuad,
    /// Cubic ease-in-out, used by both fields for the scatter/tree morph
    #[default]
    EaseInOutCubic,
}

impl Easing {
    /// Integer tag consumed by the foliage vertex shader's `u_easing` uniform
    pub fn shader_id(self) -> i32 {
        match self {
            Easing::Linear => 0,
            Easing::EaseInOutQuad => 1,
            Easing::EaseInOutCubic => 2,
        }
    }
}

/// `t < 0.5 ? 4t³ : 1 - (-2t + 2)³ / 2`
pub fn ease_in_out_cubic(t: f32) -> f32 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// Apply easing function to a value t in range [0, 1]
pub fn ease(t: f32, easing: Easing) -> f32 {
    let t = t.clamp(0.0, 1.0);

    match easing {
        Easing::Linear => t,
        Easing::EaseInOutQuad => {
            if t < 0.5 {
                2.0 * t * t
            } else {
                1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
            }
        }
        Easing::EaseInOutCubic => ease_in_out_cubic(t),
    }
}
