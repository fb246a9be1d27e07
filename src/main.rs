// What you SEE:
// • Live camera in one of ten looks: plain, four night-vision tubes, five thermal palettes.
// • A/D cycles the look, W/S changes the target FPS, +/- zooms.
// • 1 vignette, 2 scan lines, 3 HUD, 4 noise. Q (or ESC, or closing the window) quits.

mod camera;
mod clahe;
mod colormap;
mod config;
mod draw;
mod error;
mod hud;
mod input;
mod mode;
mod night;
mod noise;
mod overlay;
mod pipeline;
mod thermal;
mod types;
mod vision;

use camera::{CameraCapture, FrameSource};
use clap::Parser;
use config::Config;
use draw::Drawer;
use error::Error;
use log::info;
use mode::ModeController;
use pipeline::Pipeline;

fn main() -> Result<(), Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::parse();
    config.validate()?;

    /* --- Camera + window setup ---
       Visual: window opens sized to whatever resolution the camera settled on. */
    let mut cam = CameraCapture::new(config.camera, config.width, config.height)?;
    cam.configure(config.width, config.height)?;
    cam.set_zoom(config.zoom);
    let (w, h) = cam.resolution();
    let drawer = Drawer::new("Night Scope", w as usize, h as usize)?;

    let controller = ModeController::with_start(config.mode, config.frame_rate());
    let seed = config.seed.unwrap_or_else(rand::random);
    info!("starting in {} at {} FPS (seed {seed})", config.mode.name(), controller.frame_rate());

    /* ------------------------------ Main loop ------------------------------ */
    Pipeline::new(cam, drawer, controller, seed).run()
}
