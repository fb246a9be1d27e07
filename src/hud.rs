// Synthetic HUD telemetry: battery drain, wandering signal, blink pulse.
// `tick` is the only place these move, once per displayed frame.

use crate::mode::Mode;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::{Duration, Instant};

pub const SIGNAL_MIN: f32 = 25.0;
pub const SIGNAL_MAX: f32 = 100.0;
const SIGNAL_RETARGET: Duration = Duration::from_secs(3);
const SIGNAL_JUMP_CHANCE: f64 = 0.3;
const SIGNAL_WALK: f32 = 20.0;
const SIGNAL_EASE: f32 = 0.05; // fraction of the remaining gap closed per frame

pub const PULSE_MIN: f32 = 0.2;
pub const PULSE_MAX: f32 = 1.0;
const PULSE_STEP: f32 = 0.05;

const BATTERY_DRAIN: f32 = 0.01;

pub struct HudState {
    pub battery: f32,     // 0..100
    pub signal: f32,      // 25..100
    signal_target: f32,
    last_retarget: Instant,
    pub pulse_alpha: f32, // 0.2..1.0
    pulse_dir: f32,
    rng: StdRng,
}

impl HudState {
    pub fn new(seed: u64, now: Instant) -> Self {
        Self {
            battery: 100.0,
            signal: SIGNAL_MAX,
            signal_target: SIGNAL_MAX,
            last_retarget: now,
            pulse_alpha: PULSE_MAX,
            pulse_dir: -1.0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Advance every animation by one frame.
    pub fn tick(&mut self, mode: Mode, now: Instant) {
        // Blink pulse bounces between the bounds.
        self.pulse_alpha += PULSE_STEP * self.pulse_dir;
        if self.pulse_alpha >= PULSE_MAX || self.pulse_alpha <= PULSE_MIN {
            self.pulse_dir = -self.pulse_dir;
        }
        self.pulse_alpha = self.pulse_alpha.clamp(PULSE_MIN, PULSE_MAX);

        // Signal: occasional new target, eased toward every frame.
        if now.saturating_duration_since(self.last_retarget) > SIGNAL_RETARGET {
            self.signal_target = if self.rng.gen_bool(SIGNAL_JUMP_CHANCE) {
                self.rng.gen_range(SIGNAL_MIN..=SIGNAL_MAX)
            } else {
                let step = self.rng.gen_range(-SIGNAL_WALK..=SIGNAL_WALK);
                (self.signal + step).clamp(SIGNAL_MIN, SIGNAL_MAX)
            };
            self.last_retarget = now;
        }
        self.signal += (self.signal_target - self.signal) * SIGNAL_EASE;
        self.signal = self.signal.clamp(SIGNAL_MIN, SIGNAL_MAX);

        // Battery only drains while an effect is on; empty wraps to full.
        if mode.is_effect() {
            self.battery = (self.battery - BATTERY_DRAIN).max(0.0);
            if self.battery <= 0.0 {
                self.battery = 100.0;
            }
        }
    }
}

/// What the 3-compartment battery gauge shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BatteryGauge {
    pub active: usize,         // filled segments
    pub pulse: Option<usize>,  // segment drawn with the pulse alpha instead
}

pub fn battery_gauge(level: f32) -> BatteryGauge {
    let (active, pulse) = if level > 75.0 {
        (3, (level < 80.0).then_some(2))
    } else if level > 50.0 {
        (2, (level < 55.0).then_some(1))
    } else if level > 25.0 {
        (1, (level < 30.0).then_some(0))
    } else if level > 5.0 {
        (1, None)
    } else {
        (0, Some(0)) // critical
    };
    BatteryGauge { active, pulse }
}

/// Same idea for the 4-bar signal meter: each bar covers 25%, and the top bar
/// blinks for the first 5% after it lights.
pub fn signal_gauge(signal: f32) -> (usize, Option<usize>) {
    let bars = ((signal / 25.0).ceil() as usize).clamp(1, 4);
    let floor = (bars - 1) as f32 * 25.0;
    let pulse = (bars > 1 && signal - floor < 5.0).then_some(bars - 1);
    (bars, pulse)
}
