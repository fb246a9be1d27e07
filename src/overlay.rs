// HUD compositor: controls legend, settings, mode title, timestamp, scan lines,
// battery and signal gauges, blended over the processed frame.

use crate::draw::{draw_hline, draw_text_5x7, put_pixel};
use crate::hud::{battery_gauge, signal_gauge, HudState};
use crate::mode::{Mode, Toggles};
use crate::types::{scale_rgb, Frame};
use crate::vision::{add_weighted, saturate};
use image::Rgb;
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const CONTROLS: [&str; 9] = [
    "CONTROLS:",
    "A/D: Change Mode",
    "W/S: Change FPS",
    "+/-: Zoom In/Out",
    "1: Toggle Vignette",
    "2: Toggle Lines",
    "3: Toggle HUD",
    "4: Toggle Noise",
    "Q: Quit",
];

const LINE_STEP: i32 = 20;
const BATTERY_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
const BATTERY_LAYER_ALPHA: f32 = 0.9;

/// Everything the HUD shows this frame. The compositor only reads it.
pub struct HudView<'a> {
    pub mode: Mode,
    pub toggles: Toggles,
    pub frame_rate: u32, // the target rate, not a measurement
    pub hud: &'a HudState,
}

pub struct OverlayCompositor {
    rng: StdRng, // flicker and scan-line rows
}

impl OverlayCompositor {
    pub fn new(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }

    pub fn render(&mut self, frame: &Frame, view: &HudView) -> Frame {
        let (w, h) = (frame.width() as i32, frame.height() as i32);
        let color = self.text_color(view.mode);
        let mut overlay = frame.clone();

        if view.toggles.hud {
            draw_lines(&mut overlay, 10, 53, CONTROLS.iter().copied(), color);
            let settings = [
                format!("FPS: {}", view.frame_rate),
                format!("Noise: {}", on_off(view.toggles.noise)),
                format!("Vignette: {}", on_off(view.toggles.vignette)),
                format!("Lines: {}", on_off(view.toggles.scan_lines)),
            ];
            draw_lines(&mut overlay, w - 150, 53, settings.iter().map(String::as_str), color);
            draw_text_5x7(&mut overlay, w - 100, 22, &format!("FPS: {}", view.frame_rate), color, 1);
            let title = format!("MODE: {}", view.mode.name().to_uppercase());
            draw_text_5x7(&mut overlay, 10, 16, &title, color, 2);
        }

        if view.mode.is_effect() {
            let stamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
            draw_text_5x7(&mut overlay, w - 200, h - 27, &stamp, color, 1);

            if view.toggles.scan_lines && h > 0 {
                for _ in 0..3 {
                    let y = self.rng.gen_range(0..h);
                    draw_hline(&mut overlay, y, color);
                }
            }

            let status = [
                format!("NOISE: {}", on_off(view.toggles.noise)),
                format!("VIGNETTE: {}", on_off(view.toggles.vignette)),
                format!("SCAN LINES: {}", on_off(view.toggles.scan_lines)),
            ];
            draw_lines(&mut overlay, w - 150, h - 87, status.iter().map(String::as_str), color);

            draw_signal(&mut overlay, 10, h - 62, view.hud, color);
            draw_battery(&mut overlay, 10, h - 30, view.hud);
        }

        let alpha = if view.mode.is_effect() { 0.85 } else { 0.9 };
        add_weighted(&overlay, alpha, frame, 1.0 - alpha)
    }

    /// Red for thermal, flickering green for night, white otherwise.
    fn text_color(&mut self, mode: Mode) -> Rgb<u8> {
        match mode {
            Mode::Thermal(_) => Rgb([255, 0, 0]),
            Mode::Night(_) => Rgb([0, self.rng.gen_range(240..=255), 0]),
            Mode::Normal => Rgb([255, 255, 255]),
        }
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag { "ON" } else { "OFF" }
}

fn draw_lines<'a>(img: &mut Frame, x: i32, mut y: i32, lines: impl Iterator<Item = &'a str>, color: Rgb<u8>) {
    for line in lines {
        draw_text_5x7(img, x, y, line, color, 1);
        y += LINE_STEP;
    }
}

/// Battery: outlined body with a tip and three segments, drawn on its own layer
/// and laid over the HUD at 90%, then the percentage beside it.
fn draw_battery(img: &mut Frame, x: i32, y: i32, hud: &HudState) {
    const BODY_W: i32 = 50;
    const BODY_H: i32 = 25;
    const TIP_W: i32 = 6;
    const TIP_H: i32 = 12;
    const PAD: i32 = 3;
    const SEG_W: i32 = 10;
    const SEG_H: i32 = BODY_H - 10;
    const SEGMENTS: i32 = 3;

    let mut layer = Frame::new(img.width(), img.height());

    // Body outline, 2px thick, and a solid tip.
    for inset in 0..2 {
        let r = Rect::at(x + inset, y + inset).of_size((BODY_W - 2 * inset + 1) as u32, (BODY_H - 2 * inset + 1) as u32);
        draw_hollow_rect_mut(&mut layer, r, BATTERY_COLOR);
    }
    let tip = Rect::at(x + BODY_W, y + (BODY_H - TIP_H) / 2).of_size(TIP_W as u32 + 1, TIP_H as u32 + 1);
    draw_filled_rect_mut(&mut layer, tip, BATTERY_COLOR);

    let spacing = (BODY_W - 2 * PAD - SEG_W * SEGMENTS) as f32 / (SEGMENTS + 1) as f32;
    let start_x = (x + PAD) as f32 + spacing;
    let seg_y = y + (BODY_H - SEG_H) / 2;

    let gauge = battery_gauge(hud.battery);
    for i in 0..SEGMENTS as usize {
        let seg_x = (start_x + i as f32 * (SEG_W as f32 + spacing)) as i32;
        let r = Rect::at(seg_x, seg_y).of_size(SEG_W as u32 + 1, SEG_H as u32 + 1);
        if gauge.pulse == Some(i) {
            draw_filled_rect_mut(&mut layer, r, scale_rgb(BATTERY_COLOR, hud.pulse_alpha));
        } else if i < gauge.active {
            draw_filled_rect_mut(&mut layer, r, BATTERY_COLOR);
        } else {
            draw_hollow_rect_mut(&mut layer, r, BATTERY_COLOR);
        }
    }

    for (dst, src) in img.pixels_mut().zip(layer.pixels()) {
        if src.0 == [0, 0, 0] {
            continue;
        }
        for c in 0..3 {
            dst[c] = saturate(dst[c] as f32 * (1.0 - BATTERY_LAYER_ALPHA) + src[c] as f32 * BATTERY_LAYER_ALPHA);
        }
    }

    let percent = format!("{}%", hud.battery as u32);
    draw_text_5x7(img, x + BODY_W + 15, y + 11, &percent, BATTERY_COLOR, 1);
}

/// Signal: four rising bars plus the percentage.
fn draw_signal(img: &mut Frame, x: i32, y: i32, hud: &HudState, color: Rgb<u8>) {
    const BAR_W: i32 = 4;
    const BAR_GAP: i32 = 2;
    const BAR_STEP_H: i32 = 5;

    let (bars, pulse) = signal_gauge(hud.signal);
    for i in 0..4usize {
        let bh = BAR_STEP_H * (i as i32 + 1);
        let bx = x + i as i32 * (BAR_W + BAR_GAP);
        let r = Rect::at(bx, y + 4 * BAR_STEP_H - bh).of_size(BAR_W as u32, bh as u32);
        if pulse == Some(i) {
            draw_filled_rect_mut(img, r, scale_rgb(color, hud.pulse_alpha));
        } else if i < bars {
            draw_filled_rect_mut(img, r, color);
        } else {
            draw_hollow_rect_mut(img, r, color);
        }
    }
    let text = format!("SIG {}%", hud.signal as u32);
    draw_text_5x7(img, x + 4 * (BAR_W + BAR_GAP) + 6, y + 4 * BAR_STEP_H - 7, &text, color, 1);
    put_pixel(img, x - 2, y + 4 * BAR_STEP_H, color); // baseline tick
}
