//! Scene assembly
//!
//! The state holder owns the one [`AppState`] value; the composer owns every
//! field and forwards that value to them unchanged each frame.

pub mod composer;
pub mod state;

pub use composer::SceneComposer;
pub use state::{AppState, StateHolder};
