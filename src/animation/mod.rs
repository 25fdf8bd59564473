//! Animation primitives shared by every field
//!
//! Easing curves plus the morph progress record that each field advances
//! once per frame.

mod easing;
mod morph;

pub use easing::{ease, ease_in_out_cubic, Easing};
pub use morph::{MorphParams, MorphState};
