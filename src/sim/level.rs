//! Level plans and the static tile grid
//!
//! A plan is a block of text rows. Terrain characters become tiles; actor
//! characters spawn an actor at that cell and leave empty terrain behind.

use std::error::Error;
use std::fmt;
use std::str::FromStr;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::Vector;
use super::actor::{Actor, Coin, Lava, Monster, Player};

/// Static terrain of a grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    Empty,
    Wall,
    Lava,
}

/// Integer grid coordinates. May lie outside the grid when returned from
/// [`Level::touches`], since out-of-grid cells count as walls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

/// Errors raised while parsing a level plan
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LevelError {
    /// The plan has no rows
    Empty,
    /// A row's width differs from the first row's
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    /// A character outside the plan vocabulary
    UnknownChar { ch: char, row: usize, col: usize },
    /// No `@` in the plan
    MissingPlayer,
    /// More than one `@` in the plan
    DuplicatePlayer { row: usize, col: usize },
}

impl fmt::Display for LevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "level plan is empty"),
            Self::RaggedRow {
                row,
                expected,
                found,
            } => write!(
                f,
                "row {row} has width {found}, expected {expected} like the first row"
            ),
            Self::UnknownChar { ch, row, col } => {
                write!(f, "unknown character '{ch}' at row {row}, column {col}")
            }
            Self::MissingPlayer => write!(f, "level plan has no player spawn '@'"),
            Self::DuplicatePlayer { row, col } => {
                write!(f, "second player spawn at row {row}, column {col}")
            }
        }
    }
}

impl Error for LevelError {}

/// A parsed level: the immutable tile grid plus the actors it starts with
#[derive(Debug, Clone)]
pub struct Level {
    width: usize,
    height: usize,
    rows: Vec<Vec<Tile>>,
    start_actors: Vec<Actor>,
    total_coins: u32,
    seed: u64,
}

impl Level {
    /// Parse a plan, drawing coin phases from a fresh random seed
    pub fn parse(plan: &str) -> Result<Self, LevelError> {
        Self::parse_seeded(plan, rand::random())
    }

    /// Parse a plan with a fixed seed for coin phases
    pub fn parse_seeded(plan: &str, seed: u64) -> Result<Self, LevelError> {
        let mut rng = Pcg32::seed_from_u64(seed);

        let grid: Vec<Vec<char>> = plan
            .trim()
            .lines()
            .map(|line| line.chars().filter(|c| !c.is_whitespace()).collect())
            .collect();

        let width = grid.first().map(Vec::len).ok_or(LevelError::Empty)?;
        if width == 0 {
            return Err(LevelError::Empty);
        }

        let mut rows = Vec::with_capacity(grid.len());
        let mut start_actors = Vec::new();
        let mut total_coins = 0;
        let mut player_seen = false;
        let mut next_id = 1;

        for (y, line) in grid.iter().enumerate() {
            if line.len() != width {
                return Err(LevelError::RaggedRow {
                    row: y,
                    expected: width,
                    found: line.len(),
                });
            }

            let mut row = Vec::with_capacity(width);
            for (x, &ch) in line.iter().enumerate() {
                let cell = Vector::new(x as f32, y as f32);
                let actor = match ch {
                    '.' => {
                        row.push(Tile::Empty);
                        continue;
                    }
                    '#' => {
                        row.push(Tile::Wall);
                        continue;
                    }
                    '+' => {
                        row.push(Tile::Lava);
                        continue;
                    }
                    '@' => {
                        if player_seen {
                            return Err(LevelError::DuplicatePlayer { row: y, col: x });
                        }
                        player_seen = true;
                        Player::spawn(next_id, cell)
                    }
                    'm' => Monster::spawn(next_id, cell),
                    '=' => Lava::spawn(next_id, cell, Vector::new(4.0, 0.0), false),
                    '|' => Lava::spawn(next_id, cell, Vector::new(0.0, 4.0), false),
                    'v' => Lava::spawn(next_id, cell, Vector::new(0.0, 5.0), true),
                    '$' => {
                        total_coins += 1;
                        let phase = rng.random_range(0.0..std::f32::consts::TAU);
                        Coin::spawn(next_id, cell, phase)
                    }
                    _ => return Err(LevelError::UnknownChar { ch, row: y, col: x }),
                };
                next_id += 1;
                start_actors.push(actor);
                row.push(Tile::Empty);
            }
            rows.push(row);
        }

        if !player_seen {
            return Err(LevelError::MissingPlayer);
        }

        log::debug!(
            "Parsed {}x{} level: {} actors, {} coins (seed {})",
            width,
            rows.len(),
            start_actors.len(),
            total_coins,
            seed
        );

        Ok(Self {
            width,
            height: rows.len(),
            rows,
            start_actors,
            total_coins,
            seed,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn rows(&self) -> &[Vec<Tile>] {
        &self.rows
    }

    /// Actors in plan order (row-major), as spawned
    pub fn start_actors(&self) -> &[Actor] {
        &self.start_actors
    }

    pub fn total_coins(&self) -> u32 {
        self.total_coins
    }

    /// Seed used for coin phases; `parse_seeded` with it rebuilds this level
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Tile at a grid cell. Anything outside the grid is a wall.
    pub fn tile_at(&self, x: i32, y: i32) -> Tile {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return Tile::Wall;
        }
        self.rows[y as usize][x as usize]
    }

    /// First cell of `tile` type overlapped by the box `[pos, pos + size)`,
    /// scanning rows top to bottom and cells left to right.
    pub fn touches(&self, pos: Vector, size: Vector, tile: Tile) -> Option<Cell> {
        let x_start = pos.x.floor() as i32;
        let x_end = (pos.x + size.x).ceil() as i32;
        let y_start = pos.y.floor() as i32;
        let y_end = (pos.y + size.y).ceil() as i32;

        for y in y_start..y_end {
            for x in x_start..x_end {
                if self.tile_at(x, y) == tile {
                    return Some(Cell { x, y });
                }
            }
        }
        None
    }
}

impl FromStr for Level {
    type Err = LevelError;

    fn from_str(plan: &str) -> Result<Self, Self::Err> {
        Self::parse(plan)
    }
}
