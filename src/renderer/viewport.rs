//! Scrolling viewport
//!
//! The view follows the player, scrolling only when the player's centre
//! leaves the middle third of the view, and never shows past the level edge.

use std::ops::Range;

use crate::sim::{Level, State};

/// Visible window into a level, in tile units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    /// Viewport at the level origin, at most `max_width` x `max_height`
    /// tiles and never larger than the level itself
    pub fn fit(level: &Level, max_width: f32, max_height: f32) -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width: max_width.min(level.width() as f32),
            height: max_height.min(level.height() as f32),
        }
    }

    /// Viewport for a pixel canvas of at most `max_px` at `scale` pixels per tile
    pub fn for_canvas(level: &Level, scale: f32, max_px: (f32, f32)) -> Self {
        Self::fit(level, max_px.0 / scale, max_px.1 / scale)
    }

    /// Scroll so the player stays within the central third
    pub fn follow(&mut self, state: &State) {
        let Some(player) = state.player() else {
            return;
        };
        let level = &state.level;
        let margin_x = self.width / 3.0;
        let margin_y = self.height / 3.0;
        let center = player.pos + player.size() * 0.5;

        if center.x < self.left + margin_x {
            self.left = (center.x - margin_x).max(0.0);
        } else if center.x > self.left + self.width - margin_x {
            self.left = (center.x + margin_x - self.width).min(level.width() as f32 - self.width);
        }

        if center.y < self.top + margin_y {
            self.top = (center.y - margin_y).max(0.0);
        } else if center.y > self.top + self.height - margin_y {
            self.top = (center.y + margin_y - self.height).min(level.height() as f32 - self.height);
        }
    }

    /// Grid columns and rows at least partly visible, clipped to the level
    pub fn visible_cells(&self, level: &Level) -> (Range<usize>, Range<usize>) {
        let clip = |start: f32, len: f32, max: usize| {
            let lo = (start.floor().max(0.0) as usize).min(max);
            let hi = ((start + len).ceil().max(0.0) as usize).min(max);
            lo..hi
        };
        (
            clip(self.left, self.width, level.width()),
            clip(self.top, self.height, level.height()),
        )
    }
}
