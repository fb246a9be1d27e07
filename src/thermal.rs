// Thermal effect: a false-colour heat map.
// Visual: bright things glow hot (white/yellow), dark things look cold, shapes
// are slightly fattened and haloed, inside a round scope when vignette is on.

use crate::clahe::Clahe;
use crate::colormap::Colormap;
use crate::mode::ThermalPalette;
use crate::noise::{GaussianNoise, NoiseCache, NoiseGenerator};
use crate::types::Frame;
use crate::vision::{add_noise_saturating, add_weighted, center_distance, dilate_rgb, gaussian_blur, luminance};
use std::time::{Duration, Instant};

const NOISE_SIGMA: f32 = 2.0;
const NOISE_INTERVAL: Duration = Duration::from_millis(50);
const BLOOM_SIGMA: f32 = 10.0;
const SCOPE_MARGIN: f32 = 10.0; // scope radius = min(half w, half h) - margin
const SCOPE_FADE: f32 = 30.0; // width of the soft edge outside the radius

pub struct ThermalVision<G = GaussianNoise> {
    clahe: Clahe,
    noise: NoiseCache<G>,
    pub enable_noise: bool,
    pub enable_vignette: bool,
}

impl ThermalVision<GaussianNoise> {
    pub fn new(seed: u64) -> Self {
        Self::with_noise(GaussianNoise::new(seed, NOISE_SIGMA).smoothed())
    }
}

impl<G: NoiseGenerator> ThermalVision<G> {
    pub fn with_noise(generator: G) -> Self {
        Self {
            clahe: Clahe::new(4.0, 8, 8),
            noise: NoiseCache::new(generator, NOISE_INTERVAL),
            enable_noise: true,
            enable_vignette: true,
        }
    }

    pub fn process(&mut self, frame: &Frame, palette: ThermalPalette) -> Frame {
        self.process_at(frame, palette, Instant::now())
    }

    pub fn process_at(&mut self, frame: &Frame, palette: ThermalPalette, now: Instant) -> Frame {
        let (w, h) = frame.dimensions();
        let mut gray = luminance(frame);

        if self.enable_noise {
            add_noise_saturating(&mut gray, self.noise.field(now, w, h));
        }

        // Smooth first so CLAHE does not amplify the grain.
        let enhanced = self.clahe.apply(&gaussian_blur(&gray, 5, 0.0));
        let thermal = dilate_rgb(&Colormap::for_palette(palette).apply(&enhanced));

        let halo = gaussian_blur(&thermal, 0, BLOOM_SIGMA);
        let mut out = add_weighted(&thermal, 0.7, &halo, 0.3);

        if self.enable_vignette {
            apply_scope_mask(&mut out);
        }
        out
    }
}

/// Keep a centered disc, fade a 30px ring linearly to black, zero the rest.
fn apply_scope_mask(frame: &mut Frame) {
    let (w, h) = frame.dimensions();
    let radius = (w / 2).min(h / 2) as f32 - SCOPE_MARGIN;
    for (x, y, px) in frame.enumerate_pixels_mut() {
        let d = center_distance(x, y, w, h);
        if d <= radius {
            continue;
        }
        let f = if d <= radius + SCOPE_FADE { 1.0 - (d - radius) / SCOPE_FADE } else { 0.0 };
        for c in px.0.iter_mut() {
            *c = (*c as f32 * f) as u8;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::noise::FlatNoise;
    use image::Rgb;

    fn gray_frame(w: u32, h: u32, v: u8) -> Frame {
        Frame::from_pixel(w, h, Rgb([v, v, v]))
    }

    #[test]
    fn test_flat_gray_maps_to_one_palette_color() {
        let mut th = ThermalVision::new(9);
        th.enable_noise = false;
        th.enable_vignette = false;
        let out = th.process(&gray_frame(640, 480, 128), ThermalPalette::HotWhite);

        let level = Clahe::new(4.0, 8, 8).apply(&image::GrayImage::from_pixel(640, 480, image::Luma([128])));
        let expected = Colormap::for_palette(ThermalPalette::HotWhite).color(level.get_pixel(0, 0)[0]);
        assert_eq!(out.dimensions(), (640, 480));
        assert!(out.pixels().all(|p| *p == expected));
    }

    #[test]
    fn test_vignette_masks_outside_the_scope() {
        let mut th = ThermalVision::with_noise(FlatNoise(0));
        th.enable_noise = false;
        let out = th.process(&gray_frame(200, 100, 200), ThermalPalette::HotWhite);
        // radius = 50 - 10 = 40, fade to 70.
        assert_eq!(*out.get_pixel(0, 0), Rgb([0, 0, 0]));
        assert_eq!(*out.get_pixel(100 + 71, 50), Rgb([0, 0, 0]));
        let inside = *out.get_pixel(100, 50);
        assert_ne!(inside, Rgb([0, 0, 0]));
        assert_eq!(*out.get_pixel(100 + 39, 50), inside);
        let ring = out.get_pixel(100 + 55, 50);
        assert!(ring[0] < inside[0] && ring[0] > 0);
    }

    #[test]
    fn test_noise_toggle_is_honored() {
        let f = gray_frame(64, 64, 100);
        let now = Instant::now();
        let mut quiet = ThermalVision::with_noise(FlatNoise(40));
        quiet.enable_noise = false;
        quiet.enable_vignette = false;
        let mut plain = ThermalVision::with_noise(FlatNoise(0));
        plain.enable_vignette = false;
        assert_eq!(quiet.process_at(&f, ThermalPalette::Plasma, now), plain.process_at(&f, ThermalPalette::Plasma, now));
    }

    #[test]
    fn test_every_palette_keeps_dimensions() {
        let mut th = ThermalVision::new(2);
        let f = Frame::from_fn(48, 32, |x, y| Rgb([(x * 5) as u8, (y * 7) as u8, 30]));
        for name in ["hot_white", "hot_black", "rainbow", "ironbow", "plasma", "unknown"] {
            let out = th.process(&f, ThermalPalette::from_name(name));
            assert_eq!(out.dimensions(), (48, 32));
        }
    }
}
