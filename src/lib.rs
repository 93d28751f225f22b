//! Lava Leap - A tile-based 2D platformer
//!
//! Core modules:
//! - `sim`: Pure simulation (level parsing, actors, per-tick state transition)
//! - `game`: Progression controller (lives, retries, level advancement, level select)
//! - `renderer`: Viewport scrolling, sprite selection, text display
//! - `platform`: Key tracking and frame timing
//! - `audio`: Sound effect and theme triggers
//! - `settings`: Player preferences
//! - `levels`: Built-in level pack and JSON level packs

pub mod audio;
pub mod game;
pub mod levels;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use game::{
    CancelToken, GameOutcome, GameSession, Host, LevelSelect, LevelSession, Progress, run_game,
};
pub use settings::Settings;
pub use sim::{Level, LevelError, State, Status, Vector};

/// Game configuration constants
pub mod consts {
    /// Downward acceleration applied to players and monsters (tiles/s²)
    pub const GRAVITY: f32 = 30.0;

    /// Player horizontal speed (tiles/s)
    pub const PLAYER_WALK_SPEED: f32 = 7.0;
    /// Player jump impulse (tiles/s, applied upward)
    pub const PLAYER_JUMP_SPEED: f32 = 17.0;

    /// Monster horizontal speed
    pub const MONSTER_WALK_SPEED: f32 = 5.0;
    /// Monster jump impulse
    pub const MONSTER_JUMP_SPEED: f32 = 15.0;
    /// Max distance below a monster's top at which a landing player squashes it
    pub const SQUASH_TOLERANCE: f32 = 0.6;

    /// Coin bob frequency (radians/s)
    pub const COIN_WOBBLE_SPEED: f32 = 8.0;
    /// Coin bob amplitude (tiles)
    pub const COIN_WOBBLE_DIST: f32 = 0.07;

    /// Largest time step fed to the simulation (seconds)
    pub const MAX_FRAME_STEP: f32 = 0.1;
    /// How long a finished level keeps animating before it resolves (seconds)
    pub const ENDING_DELAY: f32 = 1.0;

    /// Lives at the start of a game and after a reset
    pub const STARTING_LIVES: u8 = 3;
    /// Lives cap when winning a level
    pub const MAX_LIVES: u8 = 7;
}
