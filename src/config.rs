// Startup flags. There is no config file; everything else changes live via keys.

use crate::error::{Error, Result};
use crate::mode::{DEFAULT_FRAME_RATE, MAX_FRAME_RATE, MIN_FRAME_RATE, Mode};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about = "Live camera with night-vision and thermal looks", long_about = None)]
pub struct Config {
    /// Camera index (0 = default webcam)
    #[arg(short, long, default_value_t = 0)]
    pub camera: u32,

    /// Requested capture width
    #[arg(long, default_value_t = 640)]
    pub width: u32,

    /// Requested capture height
    #[arg(long, default_value_t = 480)]
    pub height: u32,

    /// Target frame rate (clamped to 30..=240)
    #[arg(short, long, default_value_t = DEFAULT_FRAME_RATE)]
    pub fps: u32,

    /// Starting mode, e.g. normal, night_high, thermal_ironbow
    #[arg(short, long, default_value = "normal", value_parser = parse_mode)]
    pub mode: Mode,

    /// Starting zoom factor (1.0..=3.0, 0.1 steps)
    #[arg(short, long, default_value_t = 1.0)]
    pub zoom: f32,

    /// Seed for every random source (noise, flicker, telemetry)
    #[arg(long)]
    pub seed: Option<u64>,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::Config(format!("resolution {}x{} has no pixels", self.width, self.height)));
        }
        Ok(())
    }

    pub fn frame_rate(&self) -> u32 {
        self.fps.clamp(MIN_FRAME_RATE, MAX_FRAME_RATE)
    }
}

fn parse_mode(s: &str) -> std::result::Result<Mode, String> {
    Mode::from_name(s).ok_or_else(|| format!("unknown mode '{s}' (expected normal, night_<variant> or thermal_<palette>)"))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::mode::{NightVariant, ThermalPalette};

    #[test]
    fn test_defaults() {
        let c = Config::parse_from(["night-scope"]);
        assert_eq!((c.camera, c.width, c.height), (0, 640, 480));
        assert_eq!(c.frame_rate(), 120);
        assert_eq!(c.mode, Mode::Normal);
        assert_eq!(c.seed, None);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_flags() {
        let c = Config::parse_from(["night-scope", "--mode", "thermal_ironbow", "--fps", "500", "--seed", "7"]);
        assert_eq!(c.mode, Mode::Thermal(ThermalPalette::Ironbow));
        assert_eq!(c.frame_rate(), 240);
        assert_eq!(c.seed, Some(7));
        let c = Config::parse_from(["night-scope", "-m", "night_blue"]);
        assert_eq!(c.mode, Mode::Night(NightVariant::Blue));
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(Config::try_parse_from(["night-scope", "--mode", "sepia"]).is_err());
        let c = Config::parse_from(["night-scope", "--width", "0"]);
        assert!(matches!(c.validate(), Err(Error::Config(_))));
    }
}
