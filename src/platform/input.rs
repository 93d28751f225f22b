//! Keyboard tracking
//!
//! The host forwards raw key events to a [`Keyboard`]. Each level session
//! subscribes and gets a [`KeySubscription`] holding that session's key
//! state; dropping the subscription detaches it from the keyboard.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};

use crate::sim::TickInput;

/// The keys the game listens to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Left,
    Right,
    Up,
    Pause,
}

/// Host key names bound to each game key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub left: Vec<String>,
    pub right: Vec<String>,
    pub up: Vec<String>,
    pub pause: Vec<String>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            left: vec!["ArrowLeft".into()],
            right: vec!["ArrowRight".into()],
            up: vec!["ArrowUp".into()],
            pause: vec!["Escape".into()],
        }
    }
}

impl KeyBindings {
    /// Game key for a host key name
    pub fn lookup(&self, name: &str) -> Option<Key> {
        let bound = |names: &[String]| names.iter().any(|n| n == name);
        if bound(&self.left) {
            Some(Key::Left)
        } else if bound(&self.right) {
            Some(Key::Right)
        } else if bound(&self.up) {
            Some(Key::Up)
        } else if bound(&self.pause) {
            Some(Key::Pause)
        } else {
            None
        }
    }
}

#[derive(Debug, Default)]
struct KeyState {
    left: bool,
    right: bool,
    up: bool,
    pause_held: bool,
    pause_toggles: u32,
}

/// Routes host key events to the active subscriptions
#[derive(Debug, Default)]
pub struct Keyboard {
    bindings: KeyBindings,
    listeners: RefCell<Vec<Weak<RefCell<KeyState>>>>,
}

impl Keyboard {
    pub fn new(bindings: KeyBindings) -> Self {
        Self {
            bindings,
            listeners: RefCell::new(Vec::new()),
        }
    }

    /// Start tracking keys. Tracking stops when the subscription is dropped.
    pub fn subscribe(&self) -> KeySubscription {
        let state = Rc::new(RefCell::new(KeyState::default()));
        self.listeners.borrow_mut().push(Rc::downgrade(&state));
        KeySubscription { state }
    }

    /// Forward a host key event. Returns true if the key is bound, in which
    /// case the host should suppress its default action.
    pub fn key_event(&self, name: &str, pressed: bool) -> bool {
        let Some(key) = self.bindings.lookup(name) else {
            return false;
        };
        self.press(key, pressed);
        true
    }

    /// Deliver a game key directly
    pub fn press(&self, key: Key, pressed: bool) {
        let mut listeners = self.listeners.borrow_mut();
        listeners.retain(|weak| match weak.upgrade() {
            Some(state) => {
                state.borrow_mut().apply(key, pressed);
                true
            }
            None => false,
        });
    }

    /// Number of live subscriptions
    pub fn listener_count(&self) -> usize {
        self.listeners
            .borrow()
            .iter()
            .filter(|w| w.strong_count() > 0)
            .count()
    }
}

impl KeyState {
    fn apply(&mut self, key: Key, pressed: bool) {
        match key {
            Key::Left => self.left = pressed,
            Key::Right => self.right = pressed,
            Key::Up => self.up = pressed,
            Key::Pause => {
                // Key repeat must not toggle again
                if pressed && !self.pause_held {
                    self.pause_toggles += 1;
                }
                self.pause_held = pressed;
            }
        }
    }
}

/// One session's view of the keyboard
#[derive(Debug)]
pub struct KeySubscription {
    state: Rc<RefCell<KeyState>>,
}

impl KeySubscription {
    /// Movement keys held right now
    pub fn snapshot(&self) -> TickInput {
        let state = self.state.borrow();
        TickInput {
            left: state.left,
            right: state.right,
            up: state.up,
        }
    }

    /// Whether pause was pressed an odd number of times since the last call
    pub fn take_pause_toggle(&self) -> bool {
        let mut state = self.state.borrow_mut();
        let toggled = state.pause_toggles % 2 == 1;
        state.pause_toggles = 0;
        toggled
    }
}
