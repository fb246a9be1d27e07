// Mode/state machine: which effect is active, overlay toggles, target FPS.
// Visual: A/D cycles through the looks, 1-4 flip overlay pieces, W/S pace the loop.

use crate::input::InputEvent;
use log::info;
use std::ops::ControlFlow;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NightVariant {
    High,
    Low,
    Green,
    Blue,
}

impl NightVariant {
    /// Unknown names resolve to `Low`, whose parameters are the documented
    /// fallback (x1.8 brightness, green phosphor).
    pub fn from_name(name: &str) -> Self {
        match name {
            "high" => NightVariant::High,
            "green" => NightVariant::Green,
            "blue" => NightVariant::Blue,
            _ => NightVariant::Low,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            NightVariant::High => "high",
            NightVariant::Low => "low",
            NightVariant::Green => "green",
            NightVariant::Blue => "blue",
        }
    }

    pub fn brightness(self) -> f32 {
        match self {
            NightVariant::High => 2.5,
            NightVariant::Low => 1.8,
            NightVariant::Green | NightVariant::Blue => 2.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThermalPalette {
    HotWhite,
    HotBlack,
    Rainbow,
    Ironbow,
    Plasma,
}

impl ThermalPalette {
    /// Unknown names fall back to `HotWhite`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "hot_black" => ThermalPalette::HotBlack,
            "rainbow" => ThermalPalette::Rainbow,
            "ironbow" => ThermalPalette::Ironbow,
            "plasma" => ThermalPalette::Plasma,
            _ => ThermalPalette::HotWhite,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ThermalPalette::HotWhite => "hot_white",
            ThermalPalette::HotBlack => "hot_black",
            ThermalPalette::Rainbow => "rainbow",
            ThermalPalette::Ironbow => "ironbow",
            ThermalPalette::Plasma => "plasma",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Night(NightVariant),
    Thermal(ThermalPalette),
}

/// Cycling order for A/D.
pub const MODES: [Mode; 10] = [
    Mode::Normal,
    Mode::Night(NightVariant::High),
    Mode::Night(NightVariant::Low),
    Mode::Thermal(ThermalPalette::HotWhite),
    Mode::Thermal(ThermalPalette::HotBlack),
    Mode::Thermal(ThermalPalette::Rainbow),
    Mode::Thermal(ThermalPalette::Ironbow),
    Mode::Thermal(ThermalPalette::Plasma),
    Mode::Night(NightVariant::Green),
    Mode::Night(NightVariant::Blue),
];

impl Mode {
    /// Parse `normal`, `night_<variant>` or `thermal_<palette>`.
    pub fn from_name(name: &str) -> Option<Self> {
        if name == "normal" {
            return Some(Mode::Normal);
        }
        if let Some(v) = name.strip_prefix("night_") {
            return Some(Mode::Night(NightVariant::from_name(v)));
        }
        if let Some(p) = name.strip_prefix("thermal_") {
            return Some(Mode::Thermal(ThermalPalette::from_name(p)));
        }
        None
    }

    pub fn name(self) -> String {
        match self {
            Mode::Normal => "normal".to_string(),
            Mode::Night(v) => format!("night_{}", v.name()),
            Mode::Thermal(p) => format!("thermal_{}", p.name()),
        }
    }

    /// Everything except plain camera passthrough.
    pub fn is_effect(self) -> bool {
        self != Mode::Normal
    }
}

/// Overlay/effect switches flipped by keys 1-4.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Toggles {
    pub noise: bool,
    pub vignette: bool,
    pub scan_lines: bool,
    pub hud: bool,
}

impl Default for Toggles {
    fn default() -> Self {
        Self { noise: true, vignette: true, scan_lines: true, hud: true }
    }
}

pub const MIN_FRAME_RATE: u32 = 30;
pub const MAX_FRAME_RATE: u32 = 240;
pub const FRAME_RATE_STEP: u32 = 10;
pub const DEFAULT_FRAME_RATE: u32 = 120;

pub struct ModeController {
    index: usize,
    toggles: Toggles,
    frame_rate: u32,
}

impl Default for ModeController {
    fn default() -> Self {
        Self::new()
    }
}

impl ModeController {
    pub fn new() -> Self {
        Self { index: 0, toggles: Toggles::default(), frame_rate: DEFAULT_FRAME_RATE }
    }

    /// Start on `mode` (if it is in the cycle) at `frame_rate` (clamped).
    pub fn with_start(mode: Mode, frame_rate: u32) -> Self {
        let index = MODES.iter().position(|m| *m == mode).unwrap_or(0);
        Self {
            index,
            toggles: Toggles::default(),
            frame_rate: frame_rate.clamp(MIN_FRAME_RATE, MAX_FRAME_RATE),
        }
    }

    pub fn mode(&self) -> Mode {
        MODES[self.index]
    }

    pub fn toggles(&self) -> Toggles {
        self.toggles
    }

    pub fn frame_rate(&self) -> u32 {
        self.frame_rate
    }

    /// Apply one event. Only `Quit` breaks; zoom events belong to the frame source.
    pub fn apply(&mut self, event: InputEvent) -> ControlFlow<()> {
        match event {
            InputEvent::NextMode => self.cycle(1),
            InputEvent::PrevMode => self.cycle(MODES.len() - 1),
            InputEvent::FrameRateUp => {
                self.frame_rate = (self.frame_rate + FRAME_RATE_STEP).min(MAX_FRAME_RATE);
                info!("target frame rate {}", self.frame_rate);
            }
            InputEvent::FrameRateDown => {
                self.frame_rate = self.frame_rate.saturating_sub(FRAME_RATE_STEP).max(MIN_FRAME_RATE);
                info!("target frame rate {}", self.frame_rate);
            }
            InputEvent::ToggleVignette => flip("vignette", &mut self.toggles.vignette),
            InputEvent::ToggleScanLines => flip("scan lines", &mut self.toggles.scan_lines),
            InputEvent::ToggleHud => flip("hud", &mut self.toggles.hud),
            InputEvent::ToggleNoise => flip("noise", &mut self.toggles.noise),
            InputEvent::ZoomIn | InputEvent::ZoomOut => {}
            InputEvent::Quit => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    fn cycle(&mut self, step: usize) {
        self.index = (self.index + step) % MODES.len();
        info!("mode {}", self.mode().name());
    }
}

fn flip(what: &str, flag: &mut bool) {
    *flag = !*flag;
    info!("{what} {}", if *flag { "on" } else { "off" });
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_next_cycles_back_to_start() {
        for start in MODES {
            let mut c = ModeController::with_start(start, 60);
            for _ in 0..MODES.len() {
                let _ = c.apply(InputEvent::NextMode);
            }
            assert_eq!(c.mode(), start);
        }
    }

    #[test]
    fn test_next_visits_every_mode_once() {
        let mut c = ModeController::new();
        let mut seen = Vec::new();
        for _ in 0..MODES.len() {
            seen.push(c.mode());
            let _ = c.apply(InputEvent::NextMode);
        }
        for m in MODES {
            assert_eq!(seen.iter().filter(|s| **s == m).count(), 1);
        }
    }

    #[test]
    fn test_prev_wraps_to_last() {
        let mut c = ModeController::new();
        let _ = c.apply(InputEvent::PrevMode);
        assert_eq!(c.mode(), Mode::Night(NightVariant::Blue));
        let _ = c.apply(InputEvent::NextMode);
        assert_eq!(c.mode(), Mode::Normal);
    }

    #[test]
    fn test_frame_rate_clamps() {
        let mut c = ModeController::with_start(Mode::Normal, 230);
        let _ = c.apply(InputEvent::FrameRateUp);
        let _ = c.apply(InputEvent::FrameRateUp);
        assert_eq!(c.frame_rate(), 240);
        let mut c = ModeController::with_start(Mode::Normal, 35);
        let _ = c.apply(InputEvent::FrameRateDown);
        assert_eq!(c.frame_rate(), 30);
        assert_eq!(ModeController::with_start(Mode::Normal, 1000).frame_rate(), 240);
    }

    #[test]
    fn test_toggles_are_independent_of_mode() {
        let mut c = ModeController::new();
        let _ = c.apply(InputEvent::ToggleHud);
        let _ = c.apply(InputEvent::ToggleNoise);
        let _ = c.apply(InputEvent::NextMode);
        let t = c.toggles();
        assert!(!t.hud && !t.noise && t.vignette && t.scan_lines);
        let _ = c.apply(InputEvent::ToggleHud);
        assert!(c.toggles().hud);
    }

    #[test]
    fn test_quit_breaks_and_zoom_is_a_no_op() {
        let mut c = ModeController::new();
        assert_eq!(c.apply(InputEvent::ZoomIn), ControlFlow::Continue(()));
        assert_eq!(c.mode(), Mode::Normal);
        assert_eq!(c.apply(InputEvent::Quit), ControlFlow::Break(()));
    }

    #[test]
    fn test_names_round_trip_and_fall_back() {
        for m in MODES {
            assert_eq!(Mode::from_name(&m.name()), Some(m));
        }
        assert_eq!(Mode::from_name("night_purple"), Some(Mode::Night(NightVariant::Low)));
        assert_eq!(Mode::from_name("thermal_x"), Some(Mode::Thermal(ThermalPalette::HotWhite)));
        assert_eq!(Mode::from_name("sepia"), None);
        assert_eq!(NightVariant::from_name("nope").brightness(), 1.8);
    }
}
