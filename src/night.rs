// Night-vision effect: a phosphor image-intensifier tube look.
// Visual: grainy single-hue picture, brightened, with motion trails, a round
// dark-cornered tube, soft glow and faint horizontal lines.

use crate::clahe::Clahe;
use crate::mode::NightVariant;
use crate::noise::{GaussianNoise, NoiseCache, NoiseGenerator};
use crate::types::{Frame, Gray};
use crate::vision::{
    add_noise_saturating, add_weighted, center_distance, gaussian_blur, luminance, scale_saturating,
};
use image::Rgb;
use std::time::{Duration, Instant};

const NOISE_SIGMA: f32 = 15.0;
const NOISE_INTERVAL: Duration = Duration::from_millis(30);
const TRAIL_KEEP: f32 = 0.85; // weight of the current frame in the phosphor trail
const BLOOM_SIGMA: f32 = 5.0;
const SCAN_LINE_DROP: u8 = 20;

pub struct NightVision<G = GaussianNoise> {
    clahe: Clahe,
    noise: NoiseCache<G>,
    previous_frame: Option<Frame>, // last post-trail frame; None until the first call
}

impl NightVision<GaussianNoise> {
    pub fn new(seed: u64) -> Self {
        Self::with_noise(GaussianNoise::new(seed, NOISE_SIGMA).with_intensity(0.7, 1.3))
    }
}

impl<G: NoiseGenerator> NightVision<G> {
    pub fn with_noise(generator: G) -> Self {
        Self {
            clahe: Clahe::new(3.0, 8, 8),
            noise: NoiseCache::new(generator, NOISE_INTERVAL),
            previous_frame: None,
        }
    }

    pub fn process(&mut self, frame: &Frame, variant: NightVariant) -> Frame {
        self.process_at(frame, variant, Instant::now())
    }

    pub fn process_at(&mut self, frame: &Frame, variant: NightVariant, now: Instant) -> Frame {
        let (w, h) = frame.dimensions();

        // 1-4) Gain-normalized luminance, grain, brightness.
        let mut enhanced = self.clahe.apply(&luminance(frame));
        add_noise_saturating(&mut enhanced, self.noise.field(now, w, h));
        scale_saturating(&mut enhanced, variant.brightness());

        // 5) Single-hue phosphor.
        let mut tinted = channelize(&enhanced, variant);

        // 6) Phosphor trail against the previous frame.
        if let Some(prev) = self.previous_frame.as_ref().filter(|p| p.dimensions() == (w, h)) {
            tinted = add_weighted(&tinted, TRAIL_KEEP, prev, 1.0 - TRAIL_KEEP);
        }
        self.previous_frame = Some(tinted.clone());

        // 7-9) Tube vignette, bloom, scan lines.
        apply_tube_vignette(&mut tinted);
        let glow = gaussian_blur(&tinted, 0, BLOOM_SIGMA);
        let mut out = add_weighted(&tinted, 0.8, &glow, 0.2);
        darken_even_rows(&mut out);
        out
    }

    /// The trail frame the next call will blend against.
    #[cfg(test)]
    pub fn previous_frame(&self) -> Option<&Frame> {
        self.previous_frame.as_ref()
    }
}

/// Blue variant lights only the blue channel; everything else is green phosphor.
fn channelize(gray: &Gray, variant: NightVariant) -> Frame {
    let (w, h) = gray.dimensions();
    Frame::from_fn(w, h, |x, y| {
        let v = gray.get_pixel(x, y)[0];
        match variant {
            NightVariant::Blue => Rgb([0, 0, v]),
            _ => Rgb([0, v, 0]),
        }
    })
}

/// Fade toward the corners: factor = clamp(1.5 * (1 - d / d_corner), 0, 1).
fn apply_tube_vignette(frame: &mut Frame) {
    let (w, h) = frame.dimensions();
    let (cx, cy) = ((w / 2) as f32, (h / 2) as f32);
    let corner = (cx * cx + cy * cy).sqrt().max(1.0);
    for (x, y, px) in frame.enumerate_pixels_mut() {
        let f = (1.5 * (1.0 - center_distance(x, y, w, h) / corner)).clamp(0.0, 1.0);
        for c in px.0.iter_mut() {
            *c = (*c as f32 * f) as u8;
        }
    }
}

/// Rows 0, 2, 4... lose some green, never below zero.
fn darken_even_rows(frame: &mut Frame) {
    for (_, y, px) in frame.enumerate_pixels_mut() {
        if y % 2 == 0 {
            px[1] = px[1].saturating_sub(SCAN_LINE_DROP);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::noise::FlatNoise;

    fn gray_frame(w: u32, h: u32, v: u8) -> Frame {
        Frame::from_pixel(w, h, Rgb([v, v, v]))
    }

    #[test]
    fn test_output_keeps_dimensions() {
        let mut nv = NightVision::new(1);
        let out = nv.process(&gray_frame(64, 48, 90), NightVariant::High);
        assert_eq!(out.dimensions(), (64, 48));
    }

    #[test]
    fn test_first_call_has_no_trail_then_stores_one() {
        let mut nv = NightVision::with_noise(FlatNoise(0));
        assert!(nv.previous_frame().is_none());
        nv.process(&gray_frame(32, 32, 50), NightVariant::Green);
        assert_eq!(nv.previous_frame().map(|f| f.dimensions()), Some((32, 32)));
    }

    #[test]
    fn test_trail_blends_current_with_previous() {
        let a = Frame::from_fn(64, 48, |x, _| Rgb([(x * 3) as u8; 3]));
        let b = Frame::from_fn(64, 48, |_, y| Rgb([(200 - y * 2) as u8; 3]));
        let now = Instant::now();

        // Pre-trail results for each frame on their own.
        let mut solo = NightVision::with_noise(FlatNoise(0));
        solo.process_at(&b, NightVariant::High, now);
        let eb = solo.previous_frame().cloned().unwrap();

        let mut nv = NightVision::with_noise(FlatNoise(0));
        nv.process_at(&a, NightVariant::High, now);
        let ea = nv.previous_frame().cloned().unwrap();
        nv.process_at(&b, NightVariant::High, now);

        assert_eq!(nv.previous_frame(), Some(&add_weighted(&eb, 0.85, &ea, 0.15)));
    }

    #[test]
    fn test_trail_skipped_after_resize() {
        let mut nv = NightVision::with_noise(FlatNoise(0));
        nv.process(&gray_frame(32, 32, 50), NightVariant::Low);
        let out = nv.process(&gray_frame(16, 8, 50), NightVariant::Low);
        assert_eq!(out.dimensions(), (16, 8));
        assert_eq!(nv.previous_frame().map(|f| f.dimensions()), Some((16, 8)));
    }

    #[test]
    fn test_blue_variant_lights_only_blue() {
        let mut nv = NightVision::with_noise(FlatNoise(0));
        let out = nv.process(&gray_frame(40, 30, 100), NightVariant::Blue);
        assert!(out.pixels().all(|p| p[0] == 0 && p[1] == 0));
        assert!(out.get_pixel(20, 15)[2] > 0);
    }

    #[test]
    fn test_green_variant_has_scan_lines() {
        let mut nv = NightVision::with_noise(FlatNoise(0));
        let out = nv.process(&gray_frame(640, 480, 100), NightVariant::Green);
        assert!(out.pixels().all(|p| p[0] == 0 && p[2] == 0));
        // Center of a flat frame: CLAHE 100 -> 105, x2.0 -> 210.
        assert_eq!(out.get_pixel(320, 241)[1], 210);
        assert_eq!(out.get_pixel(320, 240)[1], 190);
    }

    #[test]
    fn test_corners_are_dark() {
        let mut nv = NightVision::with_noise(FlatNoise(0));
        let out = nv.process(&gray_frame(640, 480, 100), NightVariant::High);
        assert!(out.get_pixel(0, 0)[1] < 20);
        assert!(out.get_pixel(320, 241)[1] > 200);
    }

    #[test]
    fn test_noise_brightens_with_saturation() {
        let mut plain = NightVision::with_noise(FlatNoise(0));
        let mut noisy = NightVision::with_noise(FlatNoise(10));
        let f = gray_frame(64, 64, 40);
        let p = plain.process(&f, NightVariant::Low);
        let n = noisy.process(&f, NightVariant::Low);
        assert!(n.get_pixel(32, 33)[1] > p.get_pixel(32, 33)[1]);
    }
}
