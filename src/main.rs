//! Lava Leap entry point
//!
//! Natively the game runs headless: a scripted player holds right and hops
//! at intervals while the text display follows along. In the browser the
//! level select is drawn to a canvas and driven by animation frames.
//!
//! Native usage: `lava-leap [--list] [--level N] [settings.json [levels.json]]`

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent};

    use lava_leap::audio::AudioManager;
    use lava_leap::levels::LevelPack;
    use lava_leap::platform::Keyboard;
    use lava_leap::renderer::CanvasDisplay;
    use lava_leap::{LevelSelect, Settings};

    /// Key that leaves a game for the level select
    const BACK_KEY: &str = "Backspace";

    struct App {
        select: LevelSelect,
        display: CanvasDisplay,
        audio: AudioManager,
        keyboard: Keyboard,
    }

    impl App {
        /// Level select keys: a digit starts that level, [`BACK_KEY`] returns
        /// to the previews. Returns true if the key was used.
        fn menu_key(&mut self, key: &str) -> bool {
            let result = if key == BACK_KEY {
                self.select
                    .back(&mut self.display, &mut self.audio)
                    .map(|outcome| {
                        if let Some(outcome) = outcome {
                            log::info!("Back to level select ({outcome:?})");
                        }
                    })
            } else {
                let Some(level) = key.parse::<usize>().ok().filter(|n| *n >= 1) else {
                    return false;
                };
                self.select
                    .choose(level - 1, &self.keyboard, &mut self.display, &mut self.audio)
                    .map(|_| ())
            };
            if let Err(e) = result {
                log::error!("Level failed to load: {e}");
            }
            true
        }

        fn frame(&mut self, time: f64) {
            match self
                .select
                .frame(time, &self.keyboard, &mut self.display, &mut self.audio)
            {
                Ok(Some(outcome)) => log::info!("Game ended: {outcome:?}"),
                Ok(None) => {}
                Err(e) => log::error!("Game stopped: {e}"),
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Lava Leap starting...");

        let settings = Settings::default();
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            log::error!("No document");
            return;
        };
        let Some(canvas) = document
            .get_element_by_id("canvas")
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        else {
            log::error!("No canvas element");
            return;
        };
        let Some(menu) = document.get_element_by_id("levels") else {
            log::error!("No levels element");
            return;
        };
        let Some(display) = CanvasDisplay::new(
            canvas,
            menu,
            settings.scale,
            (settings.max_width, settings.max_height),
        ) else {
            log::error!("Canvas has no 2D context");
            return;
        };

        let mut app = App {
            select: LevelSelect::new(&LevelPack::builtin().levels),
            display,
            audio: AudioManager::new(&settings),
            keyboard: Keyboard::new(settings.keys.clone()),
        };
        if let Err(e) = app.select.show(&mut app.display) {
            log::error!("Level previews failed: {e}");
        }

        let app = Rc::new(RefCell::new(app));
        setup_keys(app.clone());
        request_animation_frame(app);
    }

    fn setup_keys(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        for (event_name, pressed) in [("keydown", true), ("keyup", false)] {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut app = app.borrow_mut();
                let key = event.key();
                let handled = app.keyboard.key_event(&key, pressed)
                    || (pressed && !event.repeat() && app.menu_key(&key));
                if handled {
                    event.prevent_default();
                }
            });
            let _ = window
                .add_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(app: Rc<RefCell<App>>, time: f64) {
        app.borrow_mut().frame(time);
        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

/// Command line for the headless run
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Default)]
struct Args {
    /// Print the level previews and exit
    list: bool,
    /// One-based level to start at
    level: Option<usize>,
    settings: Option<String>,
    levels: Option<String>,
}

#[cfg(not(target_arch = "wasm32"))]
impl Args {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self, String> {
        let mut parsed = Self::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--list" => parsed.list = true,
                "--level" => {
                    let value = args.next().ok_or("--level needs a level number")?;
                    let level = value
                        .parse::<usize>()
                        .ok()
                        .filter(|n| *n >= 1)
                        .ok_or_else(|| format!("bad level number: {value}"))?;
                    parsed.level = Some(level);
                }
                flag if flag.starts_with("--") => return Err(format!("unknown option: {flag}")),
                _ if parsed.settings.is_none() => parsed.settings = Some(arg),
                _ if parsed.levels.is_none() => parsed.levels = Some(arg),
                _ => return Err(format!("unexpected argument: {arg}")),
            }
        }
        Ok(parsed)
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    use lava_leap::audio::NullAudio;
    use lava_leap::levels::LevelPack;
    use lava_leap::platform::{FixedStepFrames, Key, Keyboard};
    use lava_leap::renderer::TextDisplay;
    use lava_leap::{CancelToken, Host, LevelSelect, Settings, run_game};

    /// Host frame interval (ms)
    const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Give up after two minutes of game time
    const MAX_FRAMES: u64 = 60 * 120;
    /// Frames between jumps
    const HOP_EVERY: u64 = 45;
    /// Frames the up key is held per jump
    const HOP_HOLD: u64 = 10;

    env_logger::init();
    log::info!("Lava Leap (native) starting...");

    let args = Args::parse(std::env::args().skip(1))?;
    let settings = match &args.settings {
        Some(path) => Settings::load_or_default(path),
        None => Settings::default(),
    };
    let pack = match &args.levels {
        Some(path) => LevelPack::load(path)?,
        None => LevelPack::builtin(),
    };
    let levels = pack.validate()?;
    log::info!("{} levels ready", levels.len());

    let mut display = TextDisplay::new(
        settings.max_width / settings.scale,
        settings.max_height / settings.scale,
    );

    if args.list {
        LevelSelect::new(&pack.levels).show(&mut display)?;
        println!("{}", display.previews().join("\n\n"));
        return Ok(());
    }

    let start_level = match args.level {
        Some(level) if level > levels.len() => {
            return Err(format!("no level {level}, the pack has {}", levels.len()).into());
        }
        Some(level) => level - 1,
        None => settings.start_level,
    };

    let frames = FixedStepFrames::new(FRAME_MS)
        .with_limit(MAX_FRAMES)
        .with_script(|frame, keyboard| {
            if frame == 0 {
                keyboard.press(Key::Right, true);
            }
            match frame % HOP_EVERY {
                0 => keyboard.press(Key::Up, true),
                HOP_HOLD => keyboard.press(Key::Up, false),
                _ => {}
            }
        });
    let mut host = Host::new(
        display,
        NullAudio::from_settings(&settings),
        frames,
        Keyboard::new(settings.keys.clone()),
    );

    let outcome = run_game(&pack.levels[..], &mut host, start_level, &CancelToken::new())?;
    log::info!(
        "Game ended: {outcome:?} after {} frames",
        host.frames.frames()
    );
    println!("{}", host.display.frame());
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main
}
