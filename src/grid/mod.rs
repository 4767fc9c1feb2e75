//! Grid navigation for the cave portfolio.
//!
//! This module provides:
//! - `GridPos` / `Direction` - the 5×7 room coordinates
//! - `Navigator` - current room, gating flags and routing rules
//! - `TransitionSequencer` - black-screen fade sequencing
//! - `Debouncer` - generation-keyed trailing debounce for scroll and resize

pub mod debounce;
pub mod navigator;
pub mod position;
pub mod transition;

pub use debounce::Debouncer;
pub use navigator::{MoveStyle, Navigator, SnapDecision};
pub use position::{Direction, GridPos, COL_R1, ROWS, ROW_D1};
pub use transition::{
    ease_in_out, progress, FadeAnimation, TransitionSequencer, TransitionStep, TransitionTimings,
};
