//! Frame timing
//!
//! Hosts call back once per rendered frame with a millisecond timestamp.
//! [`FrameClock`] turns consecutive timestamps into simulation steps.

use super::input::Keyboard;
use crate::consts::MAX_FRAME_STEP;

/// Source of host animation frames
pub trait FrameSource {
    /// Wait for the next frame, delivering any pending key events to
    /// `keyboard` first. Returns the frame timestamp in milliseconds, or
    /// `None` once the host stops scheduling frames.
    fn next_frame(&mut self, keyboard: &Keyboard) -> Option<f64>;
}

/// Converts frame timestamps into clamped time steps (seconds)
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last_ms: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Step since the previous frame, capped at [`MAX_FRAME_STEP`]. The first
    /// frame after creation or [`reset`](Self::reset) only records the time.
    pub fn frame(&mut self, now_ms: f64) -> Option<f32> {
        let step = self.last_ms.map(|last| {
            let secs = ((now_ms - last) / 1000.0).max(0.0) as f32;
            secs.min(MAX_FRAME_STEP)
        });
        self.last_ms = Some(now_ms);
        step
    }

    /// Forget the last timestamp so time spent paused is not replayed
    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}

type FrameScript = Box<dyn FnMut(u64, &Keyboard)>;

/// Frames at a fixed interval, driven by a script instead of a real host.
/// Used for headless runs and tests.
pub struct FixedStepFrames {
    step_ms: f64,
    frame: u64,
    limit: Option<u64>,
    script: Option<FrameScript>,
}

impl FixedStepFrames {
    pub fn new(step_ms: f64) -> Self {
        Self {
            step_ms,
            frame: 0,
            limit: None,
            script: None,
        }
    }

    /// Stop after `frames` frames
    pub fn with_limit(mut self, frames: u64) -> Self {
        self.limit = Some(frames);
        self
    }

    /// Run `script` before each frame with the frame number
    pub fn with_script(mut self, script: impl FnMut(u64, &Keyboard) + 'static) -> Self {
        self.script = Some(Box::new(script));
        self
    }

    /// Frames delivered so far
    pub fn frames(&self) -> u64 {
        self.frame
    }
}

impl FrameSource for FixedStepFrames {
    fn next_frame(&mut self, keyboard: &Keyboard) -> Option<f64> {
        if self.limit.is_some_and(|limit| self.frame >= limit) {
            return None;
        }
        if let Some(script) = self.script.as_mut() {
            script(self.frame, keyboard);
        }
        let now = self.frame as f64 * self.step_ms;
        self.frame += 1;
        Some(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Key;

    #[test]
    fn test_first_frame_has_no_step() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.frame(1000.0), None);
        let step = clock.frame(1016.0).unwrap();
        assert!((step - 0.016).abs() < 1e-6);
    }

    #[test]
    fn test_long_frames_are_clamped() {
        let mut clock = FrameClock::new();
        clock.frame(0.0);
        assert_eq!(clock.frame(5000.0), Some(MAX_FRAME_STEP));
        // Clock going backwards never yields a negative step
        assert_eq!(clock.frame(4000.0), Some(0.0));
    }

    #[test]
    fn test_reset_skips_paused_time() {
        let mut clock = FrameClock::new();
        clock.frame(0.0);
        clock.frame(16.0);
        clock.reset();
        assert_eq!(clock.frame(60_000.0), None);
        assert!(clock.frame(60_016.0).unwrap() < 0.02);
    }

    #[test]
    fn test_fixed_step_frames_run_script_and_stop() {
        let keyboard = Keyboard::default();
        let keys = keyboard.subscribe();
        let mut frames = FixedStepFrames::new(20.0)
            .with_limit(3)
            .with_script(|frame, kb| kb.press(Key::Right, frame == 1));

        assert_eq!(frames.next_frame(&keyboard), Some(0.0));
        assert!(!keys.snapshot().right);
        assert_eq!(frames.next_frame(&keyboard), Some(20.0));
        assert!(keys.snapshot().right);
        assert_eq!(frames.next_frame(&keyboard), Some(40.0));
        assert_eq!(frames.next_frame(&keyboard), None);
        assert_eq!(frames.frames(), 3);
    }
}
