//! Platform abstraction layer
//!
//! Handles the host side of the game loop:
//! - Key events mapped onto held-key snapshots
//! - Frame timestamps turned into clamped time steps

pub mod input;
pub mod time;

pub use input::{Key, KeyBindings, KeySubscription, Keyboard};
pub use time::{FixedStepFrames, FrameClock, FrameSource};
