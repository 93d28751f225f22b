//! Pure simulation module
//!
//! All gameplay logic lives here. Nothing in this module renders, plays
//! audio or reads input devices:
//! - Every tick produces a fresh `State` from the previous one
//! - Side effects are reported as `GameEvent`s on the new state
//! - Coin phases come from a seeded RNG so a level can be rebuilt exactly

pub mod actor;
pub mod collision;
pub mod level;
pub mod state;
pub mod tick;

pub use actor::{Actor, ActorKind, Coin, Lava, Monster, Player};
pub use collision::{overlap, move_horizontal, move_vertical};
pub use level::{Cell, Level, LevelError, Tile};
pub use state::{GameEvent, State, Status};
pub use tick::{TickInput, tick};

/// 2D point/displacement in tile units
pub type Vector = glam::Vec2;
