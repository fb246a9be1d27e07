// Core frame types shared by the camera, the effects and the window.

use image::{Rgb, RgbImage};

/// One camera frame: row-major, 3 x u8 per pixel.
/// Visual: this is the image every stage reads and writes.
pub type Frame = RgbImage;

/// Single-channel working image used inside the effects (luminance).
pub type Gray = image::GrayImage;

/// The buffer minifb wants: each entry is 0x00RRGGBB.
#[derive(Clone)]
pub struct FrameBuffer {
    pub width: usize,      // how wide the frame is on screen (pixels)
    pub height: usize,     // how tall the frame is on screen (pixels)
    pub pixels: Vec<u32>,  // each entry is 0x00RRGGBB for minifb
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, pixels: vec![0u32; width * height] }
    }

    /// Repack an RGB frame into this buffer, resizing the buffer if the frame size changed.
    pub fn fill_from(&mut self, frame: &Frame) {
        let (w, h) = frame.dimensions();
        if self.width != w as usize || self.height != h as usize {
            *self = Self::new(w as usize, h as usize);
        }
        for (dst, px) in self.pixels.iter_mut().zip(frame.pixels()) {
            *dst = pack_rgb(*px);
        }
    }
}

/// Pack RGB<u8> as 0x00RRGGBB.
#[inline]
pub fn pack_rgb(px: Rgb<u8>) -> u32 {
    ((px[0] as u32) << 16) | ((px[1] as u32) << 8) | px[2] as u32
}

/// Scale a colour by `a` in [0,1] (used for pulsing HUD pieces).
#[inline]
pub fn scale_rgb(c: Rgb<u8>, a: f32) -> Rgb<u8> {
    let s = |v: u8| (v as f32 * a).clamp(0.0, 255.0) as u8;
    Rgb([s(c[0]), s(c[1]), s(c[2])])
}
