//! Rendering module
//!
//! The game loop hands every snapshot to a [`Display`]. This module holds the
//! drawing policies any display needs (viewport scrolling, sprite choice,
//! background colour), a text display for terminals and tests, and on
//! wasm32 a canvas display.

#[cfg(target_arch = "wasm32")]
pub mod canvas;
pub mod sprite;
pub mod text;
pub mod viewport;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasDisplay;
pub use sprite::{Sheet, Sprite, actor_sprite, background_color, tile_sprite};
pub use text::TextDisplay;
pub use viewport::Viewport;

use crate::sim::{Level, State};

/// Heads-up data drawn alongside the level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hud {
    /// Zero-based index of the level being played
    pub level_index: usize,
    pub lives: u8,
    pub collected_coins: u32,
    pub total_coins: u32,
    pub paused: bool,
    /// Host frame time, drives walk animations
    pub time_ms: f64,
}

/// Something that can show the game
pub trait Display {
    /// A new level attempt is starting
    fn begin_level(&mut self, level: &Level);

    /// Draw one frame
    fn sync_state(&mut self, state: &State, hud: &Hud);

    /// The attempt finished or was abandoned
    fn end_level(&mut self) {}

    /// Every level has been beaten
    fn show_victory(&mut self) {}

    /// Show level `index` at `state` as a level-select thumbnail
    fn preview(&mut self, _state: &State, _index: usize) {}
}
