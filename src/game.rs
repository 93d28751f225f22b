//! Game progression
//!
//! Runs level attempts one after another, turning each attempt's final
//! status into lives, retries and level advancement. Everything advances one
//! host frame at a time: [`LevelSession`] plays a single attempt,
//! [`GameSession`] strings attempts together and [`LevelSelect`] sits in
//! front of games as the level picker. [`run_game`] drives a game from a
//! [`FrameSource`] for hosts that pull frames.

use std::cell::Cell;
use std::rc::Rc;

use crate::audio::{AudioSink, SoundEffect, ThemeAction};
use crate::consts::{ENDING_DELAY, MAX_LIVES, STARTING_LIVES};
use crate::platform::{FrameClock, FrameSource, KeySubscription, Keyboard};
use crate::renderer::{Display, Hud};
use crate::sim::{Level, LevelError, State, Status, tick};

/// Shared flag that abandons a running game
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Rc<Cell<bool>>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

/// How a game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    /// Every level was beaten
    Completed,
    /// The session was torn down or the host stopped delivering frames
    Cancelled,
}

/// Level index and lives between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub level: usize,
    pub lives: u8,
}

impl Progress {
    pub fn new(start_level: usize) -> Self {
        Self {
            level: start_level,
            lives: STARTING_LIVES,
        }
    }

    /// Apply the result of an attempt.
    ///
    /// A win moves on and awards a life up to [`MAX_LIVES`]. Losing the last
    /// life restores the starting lives and steps back one level.
    pub fn record(&mut self, status: Status) {
        match status {
            Status::Won => {
                self.level += 1;
                self.lives = (self.lives + 1).min(MAX_LIVES);
            }
            Status::Lost => {
                self.lives = self.lives.saturating_sub(1);
                if self.lives == 0 {
                    self.level = self.level.saturating_sub(1);
                    self.lives = STARTING_LIVES;
                }
            }
            Status::Playing => {}
        }
    }
}

/// One attempt at a level.
///
/// Key tracking starts with the session and stops when it is dropped.
pub struct LevelSession {
    state: State,
    progress: Progress,
    keys: KeySubscription,
    clock: FrameClock,
    paused: bool,
    ending: f32,
}

impl LevelSession {
    pub fn start(
        level: Rc<Level>,
        progress: Progress,
        keyboard: &Keyboard,
        display: &mut impl Display,
    ) -> Self {
        display.begin_level(&level);
        Self {
            state: State::start(level),
            progress,
            keys: keyboard.subscribe(),
            clock: FrameClock::new(),
            paused: false,
            ending: ENDING_DELAY,
        }
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    /// Advance by the host frame at `now_ms`.
    ///
    /// Returns the final status once a finished attempt has kept animating
    /// for [`ENDING_DELAY`].
    pub fn frame(
        &mut self,
        now_ms: f64,
        display: &mut impl Display,
        audio: &mut impl AudioSink,
    ) -> Option<Status> {
        if self.keys.take_pause_toggle() {
            self.paused = !self.paused;
            self.clock.reset();
            log::debug!("Paused: {}", self.paused);
            self.draw(display, now_ms);
        }
        if self.paused {
            return None;
        }

        let Some(dt) = self.clock.frame(now_ms) else {
            self.draw(display, now_ms);
            return None;
        };
        self.state = tick(&self.state, &self.keys.snapshot(), dt);
        for event in &self.state.events {
            audio.play(SoundEffect::for_event(*event));
        }
        self.draw(display, now_ms);

        if self.state.status.is_terminal() {
            if self.ending > 0.0 {
                self.ending -= dt;
            } else {
                return Some(self.state.status);
            }
        }
        None
    }

    fn draw(&self, display: &mut impl Display, time_ms: f64) {
        let hud = Hud {
            level_index: self.progress.level,
            lives: self.progress.lives,
            collected_coins: self.state.collected_coins,
            total_coins: self.state.level.total_coins(),
            paused: self.paused,
            time_ms,
        };
        display.sync_state(&self.state, &hud);
    }
}

/// A game over an ordered list of plans.
///
/// The theme plays from [`start`](Self::start) until the game ends. Once an
/// outcome is reached every later frame reports it again.
pub struct GameSession {
    plans: Vec<String>,
    progress: Progress,
    level: Option<LevelSession>,
    cancel: CancelToken,
    outcome: Option<GameOutcome>,
}

impl GameSession {
    /// Start at `start_level` with fresh lives. The first attempt begins
    /// immediately; a plan that fails to parse stops the game with its error.
    pub fn start<P: AsRef<str>>(
        plans: &[P],
        start_level: usize,
        cancel: CancelToken,
        keyboard: &Keyboard,
        display: &mut impl Display,
        audio: &mut impl AudioSink,
    ) -> Result<Self, LevelError> {
        let mut session = Self {
            plans: plans.iter().map(|plan| plan.as_ref().to_string()).collect(),
            progress: Progress::new(start_level),
            level: None,
            cancel,
            outcome: None,
        };
        audio.theme(ThemeAction::Play);
        session.load_level(keyboard, display, audio)?;
        Ok(session)
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    /// The attempt in progress, if any
    pub fn level(&self) -> Option<&LevelSession> {
        self.level.as_ref()
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    /// Advance by the host frame at `now_ms`, moving on to the next attempt
    /// when the current one resolves. Returns the outcome once the game is
    /// over.
    pub fn frame(
        &mut self,
        now_ms: f64,
        keyboard: &Keyboard,
        display: &mut impl Display,
        audio: &mut impl AudioSink,
    ) -> Result<Option<GameOutcome>, LevelError> {
        if self.outcome.is_some() {
            return Ok(self.outcome);
        }
        // A resolution arriving after teardown is ignored
        if self.cancel.is_cancelled() {
            return Ok(Some(self.finish(GameOutcome::Cancelled, display, audio)));
        }

        let resolved = match self.level.as_mut() {
            Some(session) => session.frame(now_ms, display, audio),
            None => None,
        };
        if let Some(status) = resolved {
            self.level = None;
            display.end_level();
            log::info!("Level {} {status}", self.progress.level + 1);
            self.progress.record(status);
            self.load_level(keyboard, display, audio)?;
        }
        Ok(self.outcome)
    }

    /// Tear the game down. Returns the outcome it already had, otherwise
    /// [`GameOutcome::Cancelled`].
    pub fn abandon(&mut self, display: &mut impl Display, audio: &mut impl AudioSink) -> GameOutcome {
        match self.outcome {
            Some(outcome) => outcome,
            None => self.finish(GameOutcome::Cancelled, display, audio),
        }
    }

    fn load_level(
        &mut self,
        keyboard: &Keyboard,
        display: &mut impl Display,
        audio: &mut impl AudioSink,
    ) -> Result<(), LevelError> {
        let parsed = self
            .plans
            .get(self.progress.level)
            .map(|plan| Level::parse(plan));
        match parsed {
            None => {
                self.finish(GameOutcome::Completed, display, audio);
                Ok(())
            }
            Some(Err(e)) => {
                log::error!("Level {} failed to load: {e}", self.progress.level + 1);
                self.finish(GameOutcome::Cancelled, display, audio);
                Err(e)
            }
            Some(Ok(level)) => {
                log::info!(
                    "Starting level {} with {} lives",
                    self.progress.level + 1,
                    self.progress.lives
                );
                self.level = Some(LevelSession::start(
                    Rc::new(level),
                    self.progress,
                    keyboard,
                    display,
                ));
                Ok(())
            }
        }
    }

    fn finish(
        &mut self,
        outcome: GameOutcome,
        display: &mut impl Display,
        audio: &mut impl AudioSink,
    ) -> GameOutcome {
        if self.level.take().is_some() {
            display.end_level();
        }
        audio.theme(ThemeAction::Pause);
        if outcome == GameOutcome::Completed {
            log::info!("All {} levels complete", self.plans.len());
            display.show_victory();
        }
        self.outcome = Some(outcome);
        outcome
    }
}

/// Level picker shown before and between games.
///
/// Shows a preview of every level; choosing one starts a game there and
/// going back abandons it and shows the previews again.
pub struct LevelSelect {
    plans: Vec<String>,
    game: Option<GameSession>,
}

impl LevelSelect {
    pub fn new<P: AsRef<str>>(plans: &[P]) -> Self {
        Self {
            plans: plans.iter().map(|plan| plan.as_ref().to_string()).collect(),
            game: None,
        }
    }

    pub fn len(&self) -> usize {
        self.plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }

    pub fn game(&self) -> Option<&GameSession> {
        self.game.as_ref()
    }

    pub fn in_game(&self) -> bool {
        self.game.is_some()
    }

    /// Draw every level at its starting state
    pub fn show(&self, display: &mut impl Display) -> Result<(), LevelError> {
        for (index, plan) in self.plans.iter().enumerate() {
            let level = Level::parse(plan)?;
            display.preview(&State::start(Rc::new(level)), index);
        }
        Ok(())
    }

    /// Start a game at level `index`, abandoning any game in progress.
    /// Returns `false` if there is no such level.
    pub fn choose(
        &mut self,
        index: usize,
        keyboard: &Keyboard,
        display: &mut impl Display,
        audio: &mut impl AudioSink,
    ) -> Result<bool, LevelError> {
        if index >= self.plans.len() {
            log::warn!("No level {}", index + 1);
            return Ok(false);
        }
        if let Some(mut game) = self.game.take() {
            game.abandon(display, audio);
        }
        log::info!("Level {} selected", index + 1);
        let game = GameSession::start(
            &self.plans,
            index,
            CancelToken::new(),
            keyboard,
            display,
            audio,
        )?;
        self.game = Some(game);
        Ok(true)
    }

    /// Leave the running game, if any, and show the previews again
    pub fn back(
        &mut self,
        display: &mut impl Display,
        audio: &mut impl AudioSink,
    ) -> Result<Option<GameOutcome>, LevelError> {
        let outcome = self.game.take().map(|mut game| game.abandon(display, audio));
        self.show(display)?;
        Ok(outcome)
    }

    /// Forward a host frame to the running game. The game is dropped once
    /// it ends.
    pub fn frame(
        &mut self,
        now_ms: f64,
        keyboard: &Keyboard,
        display: &mut impl Display,
        audio: &mut impl AudioSink,
    ) -> Result<Option<GameOutcome>, LevelError> {
        let Some(game) = self.game.as_mut() else {
            return Ok(None);
        };
        let result = game.frame(now_ms, keyboard, display, audio);
        if !matches!(result, Ok(None)) {
            self.game = None;
        }
        result
    }
}

/// Everything a game talks to outside the simulation, for hosts that
/// deliver frames through a [`FrameSource`]
pub struct Host<D, A, F> {
    pub display: D,
    pub audio: A,
    pub frames: F,
    pub keyboard: Keyboard,
}

impl<D: Display, A: AudioSink, F: FrameSource> Host<D, A, F> {
    pub fn new(display: D, audio: A, frames: F, keyboard: Keyboard) -> Self {
        Self {
            display,
            audio,
            frames,
            keyboard,
        }
    }
}

/// Play `plans` in order from `start_level` until the game ends or the host
/// stops delivering frames.
pub fn run_game<P, D, A, F>(
    plans: &[P],
    host: &mut Host<D, A, F>,
    start_level: usize,
    cancel: &CancelToken,
) -> Result<GameOutcome, LevelError>
where
    P: AsRef<str>,
    D: Display,
    A: AudioSink,
    F: FrameSource,
{
    let mut session = GameSession::start(
        plans,
        start_level,
        cancel.clone(),
        &host.keyboard,
        &mut host.display,
        &mut host.audio,
    )?;

    loop {
        if let Some(outcome) = session.outcome() {
            return Ok(outcome);
        }
        if cancel.is_cancelled() {
            return Ok(session.abandon(&mut host.display, &mut host.audio));
        }
        let Some(now) = host.frames.next_frame(&host.keyboard) else {
            return Ok(session.abandon(&mut host.display, &mut host.audio));
        };
        if let Some(outcome) =
            session.frame(now, &host.keyboard, &mut host.display, &mut host.audio)?
        {
            return Ok(outcome);
        }
    }
}
