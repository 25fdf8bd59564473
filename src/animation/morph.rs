//! Scatter/tree morph progress
//!
//! Each field owns one [`MorphState`]. It is advanced by a pure step
//! function that returns the next state, so nothing hangs off the render
//! objects between frames.

use serde::{Deserialize, Deserializer, Serialize};
use super::easing::{ease, Easing};

/// Linear approach speed and settling tolerance for a morph
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MorphParams {
    /// Progress units per second
    pub rate: f32,
    /// Once within this distance of the target the value settles on it
    pub tolerance: f32,
    pub easing: Easing,
}

impl Default for MorphParams {
    fn default() -> Self {
        Self {
            rate: 1.0,
            tolerance: 0.0,
            easing: Easing::EaseInOutCubic,
        }
    }
}

impl MorphParams {
    /// Foliage settings: 1.5/s with a 0.001 settling band
    pub fn foliage() -> Self {
        Self {
            rate: 1.5,
            tolerance: 0.001,
            ..Default::default()
        }
    }

    /// Ornament settings: 1.0/s, exact approach
    pub fn ornaments() -> Self {
        Self::default()
    }

    /// Deserialize a partial document on top of `base`.
    ///
    /// Keys missing from the document keep the value from `base` rather than
    /// from [`MorphParams::default`].
    pub fn deserialize_over<'de, D>(base: Self, deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let patch = MorphPatch::deserialize(deserializer)?;
        Ok(Self {
            rate: patch.rate.unwrap_or(base.rate),
            tolerance: patch.tolerance.unwrap_or(base.tolerance),
            easing: patch.easing.unwrap_or(base.easing),
        })
    }
}

#[derive(Deserialize)]
struct MorphPatch {
    rate: Option<f32>,
    tolerance: Option<f32>,
    easing: Option<Easing>,
}

/// Interpolation progress from scattered (0.0) to assembled (1.0)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MorphState {
    progress: f32,
}

impl MorphState {
    pub fn new(progress: f32) -> Self {
        Self {
            progress: progress.clamp(0.0, 1.0),
        }
    }

    /// State already settled at `target`
    pub fn settled(target: f32) -> Self {
        Self::new(target)
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Eased progress used for position and amplitude interpolation
    pub fn eased(&self, easing: Easing) -> f32 {
        ease(self.progress, easing)
    }

    pub fn is_settled_at(&self, target: f32) -> bool {
        self.progress == target
    }

    /// Step toward `target` by at most `params.rate * dt`.
    ///
    /// Never overshoots and never leaves [0, 1]. The direction is recomputed
    /// every call, so retargeting mid-transition simply reverses the approach.
    #[must_use]
    pub fn advance(self, target: f32, dt: f32, params: &MorphParams) -> Self {
        let target = target.clamp(0.0, 1.0);
        let diff = target - self.progress;

        if diff.abs() <= params.tolerance {
            return Self { progress: target };
        }

        let step = (dt * params.rate).max(0.0);
        let progress = if diff > 0.0 {
            (self.progress + step).min(target)
        } else {
            (self.progress - step).max(target)
        };

        // Landing inside the tolerance band counts as arrival
        if (target - progress).abs() <= params.tolerance {
            Self { progress: target }
        } else {
            Self { progress }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn frames_to_reach(params: &MorphParams, from: f32, target: f32) -> usize {
        let mut state = MorphState::new(from);
        for frame in 1..=10_000 {
            state = state.advance(target, DT, params);
            if state.is_settled_at(target) {
                return frame;
            }
        }
        panic!("never reached {}", target);
    }

    #[test]
    fn test_foliage_reaches_tree_within_45_frames() {
        let frames = frames_to_reach(&MorphParams::foliage(), 0.0, 1.0);
        assert!(frames <= 45, "took {} frames", frames);
    }

    #[test]
    fn test_ornaments_reach_tree_within_67_frames() {
        let frames = frames_to_reach(&MorphParams::ornaments(), 0.0, 1.0);
        assert!(frames <= 67, "took {} frames", frames);
        let back = frames_to_reach(&MorphParams::ornaments(), 1.0, 0.0);
        assert!(back <= 67, "took {} frames", back);
    }

    #[test]
    fn test_monotonic_and_bounded() {
        let params = MorphParams::foliage();
        let mut state = MorphState::default();
        for _ in 0..100 {
            let next = state.advance(1.0, DT, &params);
            assert!(next.progress() >= state.progress());
            assert!((0.0..=1.0).contains(&next.progress()));
            state = next;
        }
        for _ in 0..100 {
            let next = state.advance(0.0, DT, &params);
            assert!(next.progress() <= state.progress());
            assert!((0.0..=1.0).contains(&next.progress()));
            state = next;
        }
        assert_eq!(state.progress(), 0.0);
    }

    #[test]
    fn test_large_delta_clamps_exactly() {
        for params in [MorphParams::foliage(), MorphParams::ornaments()] {
            let state = MorphState::default().advance(1.0, 10.0, &params);
            assert_eq!(state.progress(), 1.0);
            let state = state.advance(0.0, 25.0, &params);
            assert_eq!(state.progress(), 0.0);
        }
    }

    #[test]
    fn test_retarget_reverses_without_jump() {
        let params = MorphParams::ornaments();
        let mut state = MorphState::default();
        for _ in 0..20 {
            state = state.advance(1.0, DT, &params);
        }
        let before = state.progress();
        let after = state.advance(0.0, DT, &params).progress();
        assert!(after < before);
        assert!((before - after - DT).abs() < 1e-5);
    }

    #[test]
    fn test_settled_state_is_noop() {
        let params = MorphParams::foliage();
        let state = MorphState::settled(1.0).advance(1.0, DT, &params);
        assert_eq!(state.progress(), 1.0);
        let nudged = MorphState::new(0.9995).advance(1.0, DT, &params);
        assert_eq!(nudged.progress(), 1.0);
    }

    #[test]
    fn test_negative_delta_does_not_move_backwards() {
        let state = MorphState::new(0.4).advance(1.0, -1.0, &MorphParams::ornaments());
        assert_eq!(state.progress(), 0.4);
    }

    #[test]
    fn test_partial_document_keeps_base_values() {
        let de = serde_yaml::Deserializer::from_str("rate: 3.0\n");
        let params = MorphParams::deserialize_over(MorphParams::foliage(), de).unwrap();
        assert_eq!(params.rate, 3.0);
        assert_eq!(params.tolerance, 0.001);
        assert_eq!(params.easing, Easing::EaseInOutCubic);
    }
}
