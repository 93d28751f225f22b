//! Canvas display
//!
//! Draws into an HTML canvas through the 2D context. Tiles and actors are
//! filled blocks coloured by their sprite, the sky follows the attempt's
//! status and the HUD is drawn as text on top. Level-select previews get
//! their own small canvases inside a menu element.

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, Element, HtmlCanvasElement};

use super::sprite::{Sheet, Sprite, actor_sprite, background_color, tile_sprite};
use super::viewport::Viewport;
use super::{Display, Hud};
use crate::sim::{Level, State, Vector};

/// Preview canvas edge (px)
const PREVIEW_PX: f32 = 200.0;
/// Pixels per tile in previews
const PREVIEW_SCALE: f32 = 25.0;
const HUD_FONT: &str = "bold 24px sans-serif";
const TITLE_FONT: &str = "bold 30px sans-serif";
const TITLE_COLOR: &str = "rgb(241, 229, 89)";
const SHADE_COLOR: &str = "rgba(0, 0, 0, 0.7)";

/// Display drawing the game into a canvas
pub struct CanvasDisplay {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    /// Holds the level-select previews
    menu: Element,
    scale: f32,
    max_px: (f32, f32),
    viewport: Option<Viewport>,
}

impl CanvasDisplay {
    /// Display for `canvas` at `scale` pixels per tile, at most `max_px`
    /// in size. Returns `None` if the canvas has no 2D context.
    pub fn new(
        canvas: HtmlCanvasElement,
        menu: Element,
        scale: f32,
        max_px: (f32, f32),
    ) -> Option<Self> {
        let ctx = context_2d(&canvas)?;
        Some(Self {
            canvas,
            ctx,
            menu,
            scale,
            max_px,
            viewport: None,
        })
    }

    fn resize(&self, width: f32, height: f32) {
        self.canvas.set_width(width as u32);
        self.canvas.set_height(height as u32);
    }

    fn draw_hud(&self, hud: &Hud) {
        let ctx = &self.ctx;
        let width = self.canvas.width() as f64;
        ctx.set_font(HUD_FONT);
        ctx.set_fill_style_str("black");
        let _ = ctx.fill_text(&format!("Lives: {}", hud.lives), 15.0, 35.0);
        let coins = format!("{} of {}", hud.collected_coins, hud.total_coins);
        let offset = ctx
            .measure_text(&coins)
            .map(|metrics| metrics.width())
            .unwrap_or(0.0);
        let _ = ctx.fill_text(&coins, width - offset - 15.0, 35.0);

        if hud.paused {
            shade(ctx, &self.canvas);
            title(ctx, &self.canvas, "PAUSED");
        }
    }
}

fn context_2d(canvas: &HtmlCanvasElement) -> Option<CanvasRenderingContext2d> {
    canvas.get_context("2d").ok()??.dyn_into().ok()
}

fn css_color([r, g, b, a]: [f32; 4]) -> String {
    let channel = |c: f32| (c * 255.0).round() as u8;
    format!("rgba({}, {}, {}, {a})", channel(r), channel(g), channel(b))
}

fn sprite_color(sprite: Sprite) -> &'static str {
    match (sprite.sheet, sprite.frame) {
        (Sheet::Background, 0) => "rgb(255, 255, 255)",
        (Sheet::Background, 1) => "rgb(255, 100, 100)",
        (Sheet::Background, _) => "rgb(241, 229, 89)",
        (Sheet::Player, _) => "rgb(64, 64, 64)",
        (Sheet::Monster, _) => "rgb(139, 28, 28)",
    }
}

/// Sky, tiles and actors of `state` as seen through `viewport`
fn draw_scene(
    ctx: &CanvasRenderingContext2d,
    state: &State,
    viewport: &Viewport,
    scale: f32,
    time_ms: f64,
) {
    ctx.set_fill_style_str(&css_color(background_color(state.status)));
    ctx.fill_rect(
        0.0,
        0.0,
        (viewport.width * scale) as f64,
        (viewport.height * scale) as f64,
    );

    let origin = Vector::new(viewport.left, viewport.top);
    let block = |pos: Vector, size: Vector, color: &str| {
        let pos = (pos - origin) * scale;
        let size = size * scale;
        ctx.set_fill_style_str(color);
        ctx.fill_rect(pos.x as f64, pos.y as f64, size.x as f64, size.y as f64);
    };

    let level = &state.level;
    let (xs, ys) = viewport.visible_cells(level);
    for y in ys {
        for x in xs.clone() {
            if let Some(sprite) = tile_sprite(level.rows()[y][x]) {
                block(
                    Vector::new(x as f32, y as f32),
                    Vector::ONE,
                    sprite_color(sprite),
                );
            }
        }
    }
    for actor in state.actors() {
        let sprite = actor_sprite(actor, time_ms);
        block(actor.pos, actor.size(), sprite_color(sprite));
    }
}

fn shade(ctx: &CanvasRenderingContext2d, canvas: &HtmlCanvasElement) {
    ctx.set_fill_style_str(SHADE_COLOR);
    ctx.fill_rect(0.0, 0.0, canvas.width() as f64, canvas.height() as f64);
}

/// Centred banner text
fn title(ctx: &CanvasRenderingContext2d, canvas: &HtmlCanvasElement, text: &str) {
    ctx.set_font(TITLE_FONT);
    ctx.set_fill_style_str(TITLE_COLOR);
    let width = ctx
        .measure_text(text)
        .map(|metrics| metrics.width())
        .unwrap_or(0.0);
    let _ = ctx.fill_text(
        text,
        (canvas.width() as f64 - width) / 2.0,
        canvas.height() as f64 / 2.0 + 15.0,
    );
}

impl Display for CanvasDisplay {
    fn begin_level(&mut self, level: &Level) {
        // Previews make way for the game
        self.menu.set_inner_html("");
        let viewport = Viewport::for_canvas(level, self.scale, self.max_px);
        self.resize(viewport.width * self.scale, viewport.height * self.scale);
        self.viewport = Some(viewport);
    }

    fn sync_state(&mut self, state: &State, hud: &Hud) {
        let (scale, max_px) = (self.scale, self.max_px);
        let viewport = self
            .viewport
            .get_or_insert_with(|| Viewport::for_canvas(&state.level, scale, max_px));
        viewport.follow(state);
        draw_scene(&self.ctx, state, viewport, scale, hud.time_ms);
        self.draw_hud(hud);
    }

    fn end_level(&mut self) {
        self.viewport = None;
        self.ctx.clear_rect(
            0.0,
            0.0,
            self.canvas.width() as f64,
            self.canvas.height() as f64,
        );
    }

    fn show_victory(&mut self) {
        shade(&self.ctx, &self.canvas);
        title(&self.ctx, &self.canvas, "You beat every level!");
    }

    fn preview(&mut self, state: &State, index: usize) {
        if index == 0 {
            self.menu.set_inner_html("");
        }
        let Some(document) = self.menu.owner_document() else {
            return;
        };
        let Some(canvas) = document
            .create_element("canvas")
            .ok()
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        else {
            return;
        };
        let Some(ctx) = context_2d(&canvas) else {
            return;
        };

        let mut viewport =
            Viewport::for_canvas(&state.level, PREVIEW_SCALE, (PREVIEW_PX, PREVIEW_PX));
        viewport.follow(state);
        canvas.set_width((viewport.width * PREVIEW_SCALE) as u32);
        canvas.set_height((viewport.height * PREVIEW_SCALE) as u32);
        draw_scene(&ctx, state, &viewport, PREVIEW_SCALE, 0.0);
        shade(&ctx, &canvas);
        title(&ctx, &canvas, &format!("LEVEL {}", index + 1));

        if self.menu.append_child(&canvas).is_err() {
            log::warn!("Could not add preview for level {}", index + 1);
        }
    }
}
