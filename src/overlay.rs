//! Everything drawn around the road: sky and clouds behind it, the hero car
//! and countdown digit over it, then the text layer on the cell buffer.

use crate::hud::Hud;
use crate::race::{Phase, World};
use crate::render::{draw_text, draw_text_centered, CellBuffer, PixelCanvas};
use crate::sprites::{HeroPose, SpriteSheet};
use crate::surface::{Image, Rect, Rgb, Surface};
use crossterm::style::Color;

const REFERENCE_HEIGHT: f32 = 500.0;
/// Hero car top edge, measured up from the bottom of a reference screen.
const HERO_LIFT: f32 = 80.0;

const SKY_TOP: Rgb = Rgb::hex(0x1e5aa8);
const SKY_HORIZON: Rgb = Rgb::hex(0x9fd3f5);
const CLOUD: Rgb = Rgb::hex(0xf4f7fb);
const CLOUD_SHADE: Rgb = Rgb::hex(0xd9e2ec);
const DIGIT: Rgb = Rgb::hex(0xf9fd00);

/// Cloud blobs on one tile of sky: `(x, y, radius)` as fractions of the
/// canvas width and height.
const CLOUDS: [(f32, f32, f32); 6] = [
    (0.08, 0.10, 0.05),
    (0.13, 0.12, 0.04),
    (0.42, 0.06, 0.035),
    (0.47, 0.08, 0.05),
    (0.74, 0.14, 0.045),
    (0.80, 0.12, 0.03),
];

fn mix(a: Rgb, b: Rgb, t: f32) -> Rgb {
    let t = t.clamp(0.0, 1.0);
    let l = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * t).round() as u8;
    Rgb::new(l(a.r, b.r), l(a.g, b.g), l(a.b, b.b))
}

/// Sky gradient with a cloud band that scrolls with `cloud_offset`
/// (reference pixels), painted behind whatever the road left empty.
pub fn backdrop(canvas: &mut PixelCanvas, cloud_offset: f32) {
    let (w, h) = (canvas.w as f32, canvas.h as f32);
    if w == 0.0 || h == 0.0 {
        return;
    }
    let shift = (cloud_offset * h / REFERENCE_HEIGHT).rem_euclid(w);
    canvas.fill_behind(|x, y| {
        let fx = (x as f32 - shift).rem_euclid(w) / w;
        let fy = y as f32 / h;
        for &(cx, cy, r) in &CLOUDS {
            let dx = (fx - cx) * w;
            let dy = (fy - cy) * h * 2.0;
            let rr = r * w;
            if dx * dx + dy * dy <= rr * rr {
                return if dy > rr * 0.4 { CLOUD_SHADE } else { CLOUD };
            }
        }
        mix(SKY_TOP, SKY_HORIZON, fy * 2.0)
    });
}

/// The player's car, fixed at the bottom center of the screen.
pub fn hero(canvas: &mut PixelCanvas, sprites: &SpriteSheet, pose: HeroPose) {
    let sprite = sprites.hero(pose);
    let Some(image) = &sprite.image else {
        return;
    };
    let k = canvas.h as f32 / REFERENCE_HEIGHT;
    let (w, h) = (sprite.width * k, sprite.height * k);
    let dest = Rect {
        x: canvas.w as f32 / 2.0 - w / 2.0,
        y: canvas.h as f32 - HERO_LIFT * k,
        w,
        h,
    };
    canvas.draw_image(image, dest);
}

fn digit_art(d: u8) -> [&'static str; 5] {
    match d {
        0 => ["###", "#.#", "#.#", "#.#", "###"],
        1 => [".#.", "##.", ".#.", ".#.", "###"],
        2 => ["###", "..#", "###", "#..", "###"],
        3 => ["###", "..#", ".##", "..#", "###"],
        4 => ["#.#", "#.#", "###", "..#", "..#"],
        5 => ["###", "#..", "###", "..#", "###"],
        6 => ["###", "#..", "###", "#.#", "###"],
        7 => ["###", "..#", ".#.", ".#.", ".#."],
        8 => ["###", "#.#", "###", "#.#", "###"],
        _ => ["###", "#.#", "###", "..#", "###"],
    }
}

/// A countdown numeral a third of the screen tall.
pub fn big_digit(canvas: &mut PixelCanvas, d: u8) {
    let image = Image::from_art(&digit_art(d), &[('#', DIGIT)]);
    let h = canvas.h as f32 / 3.0;
    let w = h * 3.0 / 5.0;
    canvas.draw_image(
        &image,
        Rect {
            x: (canvas.w as f32 - w) / 2.0,
            y: canvas.h as f32 / 6.0,
            w,
            h,
        },
    );
}

/// Pixel layers drawn after the road.
pub fn paint_scene(canvas: &mut PixelCanvas, world: &World, sprites: &SpriteSheet, pose: HeroPose) {
    backdrop(canvas, world.cloud_offset());
    match world.phase() {
        Phase::Idle => {}
        Phase::Countdown { shown, .. } => big_digit(canvas, shown),
        Phase::Racing | Phase::Finished => hero(canvas, sprites, pose),
    }
}

pub fn status_line(hud: &Hud) -> String {
    format!(
        "TIME {}  SCORE {}  LAP {}  {} km/h",
        hud.time, hud.score, hud.lap, hud.speed
    )
}

/// Text layer, drawn on the cell buffer after the braille pass.
/// `blink_on` is the current phase of the banner blink.
pub fn paint_text(buf: &mut CellBuffer, world: &World, blink_on: bool, muted: bool) {
    let hud = world.hud();
    let phase = world.phase();

    if phase != Phase::Idle {
        draw_text(buf, 1, 0, &status_line(hud), Color::White, true);
    }
    if muted {
        let x = buf.w.saturating_sub(7);
        draw_text(buf, x, 0, "[muted]", Color::Grey, false);
    }

    let countdown = matches!(phase, Phase::Countdown { .. });
    if let Some(banner) = &hud.banner {
        if !countdown && (!hud.blink || blink_on) {
            draw_text_centered(buf, buf.h / 3, banner, Color::Yellow, true);
        }
    }

    if matches!(phase, Phase::Idle | Phase::Finished) {
        highscore_panel(buf, world);
        let help = "Enter start | arrows/WASD drive | M mute | Esc reset | Q quit";
        draw_text_centered(buf, buf.h.saturating_sub(1), help, Color::White, false);
    }
}

fn highscore_panel(buf: &mut CellBuffer, world: &World) {
    let rows = world.highscores().rows();
    if rows.is_empty() {
        return;
    }
    let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0) as u16;
    let x = buf.w.saturating_sub(width + 2);
    draw_text(buf, x, 2, "BEST LAPS", Color::Yellow, true);
    for (i, row) in rows.iter().enumerate() {
        draw_text(buf, x, 3 + i as u16, row, Color::White, false);
    }
}
