//! Game state snapshots
//!
//! A `State` is never modified once a tick has produced it; the next tick
//! builds a new one. The `Level` is shared between all snapshots of an attempt.

use std::fmt;
use std::rc::Rc;

use super::actor::Actor;
use super::level::Level;
use super::tick::{TickInput, tick};

/// Outcome of a level attempt so far
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Playing,
    Won,
    Lost,
}

impl Status {
    pub fn is_terminal(&self) -> bool {
        *self != Status::Playing
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Status::Playing => "playing",
            Status::Won => "won",
            Status::Lost => "lost",
        })
    }
}

/// Side effects of a tick, for audio and logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// The player left the ground
    Jump,
    /// A coin was picked up
    CoinCollected,
}

/// One snapshot of a level attempt
#[derive(Debug, Clone)]
pub struct State {
    pub level: Rc<Level>,
    actors: Vec<Actor>,
    pub status: Status,
    /// Coins picked up so far this attempt
    pub collected_coins: u32,
    /// Events raised by the tick that produced this state
    pub events: Vec<GameEvent>,
}

impl State {
    /// Initial snapshot of a level attempt
    pub fn start(level: Rc<Level>) -> Self {
        let actors = level.start_actors().to_vec();
        Self {
            level,
            actors,
            status: Status::Playing,
            collected_coins: 0,
            events: Vec::new(),
        }
    }

    /// Snapshot with the same level, status and coin tally as `prev`, but new
    /// actors and no events.
    pub fn from_actors(prev: &State, actors: Vec<Actor>) -> Self {
        Self {
            level: Rc::clone(&prev.level),
            actors,
            status: prev.status,
            collected_coins: prev.collected_coins,
            events: Vec::new(),
        }
    }

    pub fn actors(&self) -> &[Actor] {
        &self.actors
    }

    /// The player actor. Always present in states built from a parsed level.
    pub fn player(&self) -> Option<&Actor> {
        self.actors.iter().find(|a| a.is_player())
    }

    /// Advance by `dt` seconds with the given keys held
    pub fn update(&self, dt: f32, input: &TickInput) -> State {
        tick(self, input, dt)
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    /// This state minus the actor with `id`. The player is never removed.
    pub fn without_actor(mut self, id: u32) -> Self {
        self.actors.retain(|a| a.id != id || a.is_player());
        self
    }
}
