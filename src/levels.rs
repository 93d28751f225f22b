//! Level packs
//!
//! A pack is an ordered list of plans. The built-in pack ships with the
//! crate; others are loaded from JSON of the form `{"levels": [plan, ...]}`.

use std::error::Error;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::sim::{Level, LevelError};

/// Levels played when no pack is given
pub const GAME_LEVELS: &[&str] = &[
    "
    ......................
    ..#................#..
    ..#..............=.#..
    ..#.........$.$....#..
    ..#.@......#####...#..
    ..#####............#..
    ......#++++++++++++#..
    ......##############..
    ......................
    ",
    "
    ..................................
    ..#..........................#....
    ..#....v.........$$$.........#....
    ..#..........................#....
    ..#.@.......|.....m.....$....#....
    ..#######################....#....
    ........................#++++#....
    ........................######....
    ",
    "
    ..............
    ..#........#..
    ..#.$...$..#..
    ..#.####...#..
    ..#........#..
    ..#.@...m..#..
    ..####++####..
    ..............
    ",
];

/// Errors loading or checking a level pack
#[derive(Debug)]
pub enum LevelPackError {
    Io(io::Error),
    Json(serde_json::Error),
    /// A plan failed to parse
    Level { index: usize, source: LevelError },
    /// A plan has no coins, so it can never be won
    NoCoins { index: usize },
    Empty,
}

impl fmt::Display for LevelPackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "level pack file: {e}"),
            Self::Json(e) => write!(f, "level pack JSON: {e}"),
            Self::Level { index, source } => write!(f, "level {}: {source}", index + 1),
            Self::NoCoins { index } => write!(f, "level {} has no coins", index + 1),
            Self::Empty => write!(f, "level pack has no levels"),
        }
    }
}

impl Error for LevelPackError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Level { source, .. } => Some(source),
            Self::NoCoins { .. } | Self::Empty => None,
        }
    }
}

impl From<io::Error> for LevelPackError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for LevelPackError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

/// Ordered list of level plans
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelPack {
    pub levels: Vec<String>,
}

impl LevelPack {
    pub fn builtin() -> Self {
        Self {
            levels: GAME_LEVELS.iter().map(|plan| plan.to_string()).collect(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, LevelPackError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a pack from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LevelPackError> {
        let json = fs::read_to_string(path.as_ref())?;
        let pack = Self::from_json(&json)?;
        log::info!(
            "Loaded {} levels from {}",
            pack.levels.len(),
            path.as_ref().display()
        );
        Ok(pack)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Parse every plan, failing on the first one that is malformed or
    /// unwinnable
    pub fn validate(&self) -> Result<Vec<Level>, LevelPackError> {
        if self.levels.is_empty() {
            return Err(LevelPackError::Empty);
        }
        self.levels
            .iter()
            .enumerate()
            .map(|(index, plan)| {
                let level =
                    Level::parse(plan).map_err(|source| LevelPackError::Level { index, source })?;
                if level.total_coins() == 0 {
                    return Err(LevelPackError::NoCoins { index });
                }
                Ok(level)
            })
            .collect()
    }
}
