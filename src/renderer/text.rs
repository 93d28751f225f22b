//! Text display
//!
//! Draws the visible part of the level as one character per tile, using the
//! plan vocabulary where it fits.

use std::fmt::Write;
use std::ops::Range;

use super::viewport::Viewport;
use super::{Display, Hud};
use crate::sim::{Actor, ActorKind, Level, State, Status, Tile};

/// Display that renders frames into a string
#[derive(Debug, Clone)]
pub struct TextDisplay {
    max_width: f32,
    max_height: f32,
    viewport: Option<Viewport>,
    frame: String,
    frames_drawn: u64,
    victory: bool,
    previews: Vec<String>,
}

impl TextDisplay {
    /// Display showing at most `max_width` x `max_height` tiles
    pub fn new(max_width: f32, max_height: f32) -> Self {
        Self {
            max_width,
            max_height,
            viewport: None,
            frame: String::new(),
            frames_drawn: 0,
            victory: false,
            previews: Vec::new(),
        }
    }

    /// The most recently drawn frame
    pub fn frame(&self) -> &str {
        &self.frame
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    pub fn viewport(&self) -> Option<&Viewport> {
        self.viewport.as_ref()
    }

    /// Whether `show_victory` has been called
    pub fn victory(&self) -> bool {
        self.victory
    }

    /// Level-select thumbnails, indexed by level
    pub fn previews(&self) -> &[String] {
        &self.previews
    }
}

/// Glyph grid for the given cells, actors drawn over tiles
fn render_cells(state: &State, xs: Range<usize>, ys: Range<usize>) -> Vec<Vec<char>> {
    let level = &state.level;
    let mut grid: Vec<Vec<char>> = ys
        .clone()
        .map(|y| xs.clone().map(|x| tile_glyph(level.rows()[y][x])).collect())
        .collect();

    // Player last so it is never hidden
    let mut actors: Vec<&Actor> = state.actors().iter().collect();
    actors.sort_by_key(|a| a.is_player());
    for actor in actors {
        let center = actor.pos + actor.size() * 0.5;
        let (cx, cy) = (center.x.floor(), center.y.floor());
        if cx < xs.start as f32 || cy < ys.start as f32 {
            continue;
        }
        let (col, row) = (cx as usize - xs.start, cy as usize - ys.start);
        if let Some(cell) = grid.get_mut(row).and_then(|r| r.get_mut(col)) {
            *cell = actor_glyph(actor);
        }
    }
    grid
}

fn tile_glyph(tile: Tile) -> char {
    match tile {
        Tile::Empty => ' ',
        Tile::Wall => '#',
        Tile::Lava => '+',
    }
}

fn actor_glyph(actor: &Actor) -> char {
    match actor.kind {
        ActorKind::Player(_) => '@',
        ActorKind::Monster(_) => 'm',
        ActorKind::Lava(_) => '~',
        ActorKind::Coin(_) => '$',
    }
}

impl Display for TextDisplay {
    fn begin_level(&mut self, level: &Level) {
        self.viewport = Some(Viewport::fit(level, self.max_width, self.max_height));
        self.frame.clear();
    }

    fn sync_state(&mut self, state: &State, hud: &Hud) {
        let viewport = self
            .viewport
            .get_or_insert_with(|| Viewport::fit(&state.level, self.max_width, self.max_height));
        viewport.follow(state);
        let (xs, ys) = viewport.visible_cells(&state.level);
        let grid = render_cells(state, xs, ys);

        self.frame.clear();
        let _ = write!(
            self.frame,
            "level {}  lives {}  coins {}/{}",
            hud.level_index + 1,
            hud.lives,
            hud.collected_coins,
            hud.total_coins
        );
        match (hud.paused, state.status) {
            (true, _) => self.frame.push_str("  PAUSED"),
            (false, Status::Won) => self.frame.push_str("  WON"),
            (false, Status::Lost) => self.frame.push_str("  LOST"),
            (false, Status::Playing) => {}
        }
        for row in grid {
            self.frame.push('\n');
            self.frame.extend(row);
        }
        self.frames_drawn += 1;
    }

    fn end_level(&mut self) {
        self.viewport = None;
    }

    fn show_victory(&mut self) {
        self.victory = true;
        self.frame = String::from("You beat every level!");
    }

    fn preview(&mut self, state: &State, index: usize) {
        let level = &state.level;
        let grid = render_cells(state, 0..level.width(), 0..level.height());
        let mut thumbnail = format!("LEVEL {}", index + 1);
        for row in grid {
            thumbnail.push('\n');
            thumbnail.extend(row);
        }
        if self.previews.len() <= index {
            self.previews.resize(index + 1, String::new());
        }
        self.previews[index] = thumbnail;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn test_renders_hud_and_grid() {
        let level = Rc::new(Level::parse_seeded("#....#\n#@.$+#\n######", 0).unwrap());
        let state = State::start(Rc::clone(&level));
        let mut display = TextDisplay::new(40.0, 20.0);
        display.begin_level(&level);
        display.sync_state(
            &state,
            &Hud {
                level_index: 0,
                lives: 3,
                collected_coins: 0,
                total_coins: 1,
                paused: true,
                time_ms: 0.0,
            },
        );

        let lines: Vec<&str> = display.frame().lines().collect();
        assert_eq!(lines[0], "level 1  lives 3  coins 0/1  PAUSED");
        assert_eq!(lines[2], "#@ $+#");
        assert_eq!(lines[3], "######");
        assert_eq!(display.frames_drawn(), 1);
    }

    #[test]
    fn test_preview_shows_whole_level() {
        let level = Rc::new(Level::parse_seeded("......\n#@.$+#\n######", 0).unwrap());
        let mut display = TextDisplay::new(3.0, 2.0);
        display.preview(&State::start(level), 1);

        assert_eq!(display.previews().len(), 2);
        assert!(display.previews()[0].is_empty());
        let lines: Vec<&str> = display.previews()[1].lines().collect();
        assert_eq!(lines, vec!["LEVEL 2", "      ", "#@ $+#", "######"]);
        // Thumbnails leave the play view alone
        assert_eq!(display.frames_drawn(), 0);
        assert!(display.viewport().is_none());
    }
}
