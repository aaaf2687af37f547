//! # Rendering Module
//!
//! macroquad drawing of the world and the dialogue box. Nothing here mutates game state.

pub mod display;
pub mod ui;

pub use display::*;
pub use ui::*;
