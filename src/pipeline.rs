// The frame loop: grab -> effect -> HUD -> present -> one key -> pace.
// Single-threaded; every cache (noise, trail) lives in the stage that owns it.

use crate::camera::FrameSource;
use crate::draw::DisplaySink;
use crate::error::Result;
use crate::hud::HudState;
use crate::input::InputEvent;
use crate::mode::{Mode, ModeController};
use crate::night::NightVision;
use crate::overlay::{HudView, OverlayCompositor};
use crate::thermal::ThermalVision;
use crate::types::Frame;
use log::{debug, info};
use std::ops::ControlFlow;
use std::time::{Duration, Instant};

/// Shortest pause per iteration, even when the frame is already late.
const MIN_WAIT: Duration = Duration::from_millis(1);

pub struct Pipeline<S, D> {
    source: S,
    display: D,
    controller: ModeController,
    night: NightVision,
    thermal: ThermalVision,
    overlay: OverlayCompositor,
    hud: HudState,
}

impl<S: FrameSource, D: DisplaySink> Pipeline<S, D> {
    pub fn new(source: S, display: D, controller: ModeController, seed: u64) -> Self {
        Self {
            source,
            display,
            controller,
            night: NightVision::new(seed),
            thermal: ThermalVision::new(seed.wrapping_add(1)),
            overlay: OverlayCompositor::new(seed.wrapping_add(2)),
            hud: HudState::new(seed.wrapping_add(3), Instant::now()),
        }
    }

    /// Run until the stream ends or a quit arrives. The source is released either way.
    pub fn run(&mut self) -> Result<()> {
        let result = self.run_loop();
        self.source.release();
        info!("pipeline stopped");
        result
    }

    fn run_loop(&mut self) -> Result<()> {
        let mut meter = FpsMeter::new(Instant::now());
        loop {
            let started = Instant::now();

            let Some(frame) = self.source.next_frame()? else {
                info!("end of stream");
                return Ok(());
            };

            let shown = self.step(&frame, started);
            self.display.present(&shown)?;
            meter.frame(Instant::now());

            if let Some(event) = self.display.poll_event() {
                if self.handle(event).is_break() {
                    info!("quit requested");
                    return Ok(());
                }
            }

            std::thread::sleep(frame_wait(started.elapsed(), self.controller.frame_rate()));
        }
    }

    /// Effect for the current mode, one HUD tick, then the overlay.
    fn step(&mut self, frame: &Frame, now: Instant) -> Frame {
        let mode = self.controller.mode();
        let toggles = self.controller.toggles();

        let processed = match mode {
            Mode::Normal => frame.clone(),
            Mode::Night(variant) => self.night.process_at(frame, variant, now),
            Mode::Thermal(palette) => {
                self.thermal.enable_noise = toggles.noise;
                self.thermal.enable_vignette = toggles.vignette;
                self.thermal.process_at(frame, palette, now)
            }
        };

        self.hud.tick(mode, now);
        let view = HudView { mode, toggles, frame_rate: self.controller.frame_rate(), hud: &self.hud };
        self.overlay.render(&processed, &view)
    }

    /// Zoom goes to the source; everything else to the mode controller.
    fn handle(&mut self, event: InputEvent) -> ControlFlow<()> {
        match event {
            InputEvent::ZoomIn => self.source.zoom().zoom_in(),
            InputEvent::ZoomOut => self.source.zoom().zoom_out(),
            _ => {}
        }
        self.controller.apply(event)
    }

    #[cfg(test)]
    fn parts(&self) -> (&S, &D, &ModeController) {
        (&self.source, &self.display, &self.controller)
    }
}

/// Sleep that pads the iteration out to 1/rate, never less than `MIN_WAIT`.
pub fn frame_wait(elapsed: Duration, frame_rate: u32) -> Duration {
    let budget = Duration::from_secs_f64(1.0 / frame_rate.max(1) as f64);
    budget.saturating_sub(elapsed).max(MIN_WAIT)
}

/// Counts presented frames and logs the measured rate once per second.
/// The HUD keeps showing the target rate.
struct FpsMeter {
    since: Instant,
    frames: u32,
}

impl FpsMeter {
    fn new(now: Instant) -> Self {
        Self { since: now, frames: 0 }
    }

    fn frame(&mut self, now: Instant) {
        self.frames += 1;
        let secs = now.duration_since(self.since).as_secs_f32();
        if secs >= 1.0 {
            debug!("measured FPS: {:.1}", self.frames as f32 / secs);
            self.frames = 0;
            self.since = now;
        }
    }
}
