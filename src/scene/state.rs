use std::fmt;
use serde::{Deserialize, Serialize};

/// Which of the two formations the scene is heading toward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppState {
    Scattered,
    #[default]
    TreeShape,
}

impl AppState {
    pub fn toggled(self) -> Self {
        match self {
            AppState::Scattered => AppState::TreeShape,
            AppState::TreeShape => AppState::Scattered,
        }
    }

    /// Morph target for this state: 1.0 assembled, 0.0 scattered
    pub fn morph_target(self) -> f32 {
        match self {
            AppState::Scattered => 0.0,
            AppState::TreeShape => 1.0,
        }
    }

    pub fn is_tree(self) -> bool {
        self == AppState::TreeShape
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AppState::Scattered => "SCATTERED",
            AppState::TreeShape => "TREE_SHAPE",
        }
    }

    /// Status line text, e.g. `TREE SHAPE`
    pub fn status_label(self) -> String {
        self.as_str().replace('_', " ")
    }

    /// Caption for the toggle button: names the action, not the state
    pub fn action_label(self) -> &'static str {
        match self {
            AppState::Scattered => "ASSEMBLE TREE",
            AppState::TreeShape => "SCATTER MAGIC",
        }
    }
}

impl fmt::Display for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Single source of truth for the active [`AppState`].
///
/// Written only by the UI control; every field reads it once per frame.
#[derive(Debug, Clone, Default)]
pub struct StateHolder {
    state: AppState,
}

impl StateHolder {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    pub fn get(&self) -> AppState {
        self.state
    }

    pub fn set(&mut self, state: AppState) {
        if state != self.state {
            log::info!("State changed: {} -> {}", self.state, state);
        }
        self.state = state;
    }

    /// Flip between the two states and return the new one
    pub fn toggle(&mut self) -> AppState {
        self.set(self.state.toggled());
        self.state
    }
}
