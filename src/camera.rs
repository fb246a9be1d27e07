// Opens the default camera and hands out RGB frames, already zoomed.
// Visual expectation: when the pipeline calls `next_frame()`, you get the live
// picture, center-cropped and scaled back up if zoom is above 1.0x.

use crate::error::{Error, Result};
use crate::types::Frame;
use image::imageops::{self, FilterType};
use log::{info, warn};

// Bring in nokhwa types for camera control.
use nokhwa::{
    Camera,
    pixel_format::RgbFormat,
    utils::{CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution},
};

/// Anything that can feed frames into the pipeline.
pub trait FrameSource {
    /// Ask for a capture resolution; the device may pick something close.
    fn configure(&mut self, width: u32, height: u32) -> Result<()>;
    fn zoom(&mut self) -> &mut ZoomState;
    fn set_zoom(&mut self, factor: f32) {
        self.zoom().set(factor);
    }
    /// `Ok(None)` means the stream ended; that is a normal stop, not an error.
    fn next_frame(&mut self) -> Result<Option<Frame>>;
    fn release(&mut self);
}

pub const ZOOM_MIN: f32 = 1.0;
pub const ZOOM_MAX: f32 = 3.0;
pub const ZOOM_STEP: f32 = 0.1;
const ZOOM_STEPS_MAX: u32 = ((ZOOM_MAX - ZOOM_MIN) / ZOOM_STEP + 0.5) as u32;

/// Zoom factor kept as whole steps above 1.0x so 1.0 stays exact.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ZoomState {
    steps: u32,
}

impl ZoomState {
    pub fn factor(&self) -> f32 {
        ZOOM_MIN + self.steps as f32 * ZOOM_STEP
    }

    /// Snap to the nearest step inside [1.0, 3.0].
    pub fn set(&mut self, factor: f32) {
        let steps = ((factor - ZOOM_MIN) / ZOOM_STEP).round();
        self.steps = steps.clamp(0.0, ZOOM_STEPS_MAX as f32) as u32;
    }

    pub fn zoom_in(&mut self) {
        self.steps = (self.steps + 1).min(ZOOM_STEPS_MAX);
        info!("zoom {:.1}x", self.factor());
    }

    pub fn zoom_out(&mut self) {
        self.steps = self.steps.saturating_sub(1);
        info!("zoom {:.1}x", self.factor());
    }
}

/// Crop the centered (w/z x h/z) window and resize it back to (w x h).
/// At 1.0x the frame is returned untouched.
pub fn apply_zoom(frame: Frame, zoom: ZoomState) -> Frame {
    if zoom.steps == 0 {
        return frame;
    }
    let (w, h) = frame.dimensions();
    let (cw, ch) = crop_size(w, h, zoom.factor());
    let x1 = (w - cw) / 2;
    let y1 = (h - ch) / 2;
    let cropped = imageops::crop_imm(&frame, x1, y1, cw, ch).to_image();
    imageops::resize(&cropped, w, h, FilterType::Triangle)
}

fn crop_size(w: u32, h: u32, factor: f32) -> (u32, u32) {
    let cw = ((w as f32 / factor) as u32).clamp(1, w.max(1));
    let ch = ((h as f32 / factor) as u32).clamp(1, h.max(1));
    (cw, ch)
}

// A small wrapper around nokhwa::Camera so the pipeline loop stays clean.
pub struct CameraCapture {
    cam: Camera,
    zoom: ZoomState,
}

impl CameraCapture {
    /// Try to open camera `index` at a target resolution (falls back if not exact).
    /// On success, nothing is shown on screen yet; we just hold an open stream.
    pub fn new(index: u32, width: u32, height: u32) -> Result<Self> {
        // 1) Choose the device (0 = default webcam)
        let idx = CameraIndex::Index(index);

        let fmt = CameraFormat::new(
            Resolution::new(width, height),
            FrameFormat::YUYV, // uncompressed; cheap to convert to RGB
            30,                // target FPS
        );

        // 2) Ask for RGB frames closest to our request.
        let req = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(fmt));

        // 3) Create the camera (this might fail if no device exists).
        let mut cam = Camera::new(idx, req).map_err(|e| Error::CameraInit(format!("Create camera: {e}")))?;

        // 4) Start streaming frames from the camera.
        cam.open_stream()
            .map_err(|e| Error::CameraInit(format!("Open stream: {e}")))?;

        let actual = cam.resolution();
        info!("camera {index} streaming at {}x{}", actual.width(), actual.height());
        Ok(Self { cam, zoom: ZoomState::default() })
    }

    /// Report the actual resolution the camera is delivering.
    pub fn resolution(&self) -> (u32, u32) {
        let r = self.cam.resolution();
        (r.width(), r.height())
    }
}

impl FrameSource for CameraCapture {
    fn configure(&mut self, width: u32, height: u32) -> Result<()> {
        self.cam
            .set_resolution(Resolution::new(width, height))
            .map_err(|e| Error::CameraConfig(format!("Set resolution {width}x{height}: {e}")))?;
        let (w, h) = self.resolution();
        info!("camera resolution now {w}x{h}");
        Ok(())
    }

    fn zoom(&mut self) -> &mut ZoomState {
        &mut self.zoom
    }

    /// Grab one frame and decode it to RGB.
    /// A failed grab ends the stream; a frame that will not decode is an error.
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        // 1) Pull a frame from the camera (this blocks until a new frame is ready).
        let frame = match self.cam.frame() {
            Ok(f) => f,
            Err(e) => {
                warn!("camera stream ended: {e}");
                return Ok(None);
            }
        };

        // 2) Decode to RGB (handles various raw formats safely).
        let rgb = frame
            .decode_image::<RgbFormat>()
            .map_err(|e| Error::CameraFrame(format!("Decode RGB: {e}")))?;

        // 3) Rewrap the raw bytes as our frame type.
        let (w, h) = rgb.dimensions();
        let rgb = Frame::from_raw(w, h, rgb.into_raw())
            .ok_or_else(|| Error::CameraFrame(format!("Short buffer for {w}x{h}")))?;

        Ok(Some(apply_zoom(rgb, self.zoom)))
    }

    fn release(&mut self) {
        if let Err(e) = self.cam.stop_stream() {
            warn!("stopping camera stream: {e}");
        }
    }
}
