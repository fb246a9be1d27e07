// Procedural sensor noise for the effects.
// Visual: a grainy shimmer that changes on a wall-clock schedule, so the grain
// looks the same speed at 30 FPS and at 240 FPS.

use crate::vision::{convolve_separable, gaussian_kernel};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::{Duration, Instant};

/// Produces a signed per-pixel noise field (row-major, `w * h` samples).
pub trait NoiseGenerator {
    fn generate(&mut self, w: u32, h: u32) -> Vec<i16>;
}

/// Gaussian grain with optional per-field intensity jitter and 3x3 smoothing.
pub struct GaussianNoise {
    rng: StdRng,
    sigma: f32,
    intensity: Option<(f32, f32)>, // uniform range for a per-field multiplier
    smooth: bool,                  // blur the field with a 3x3 Gaussian
}

impl GaussianNoise {
    pub fn new(seed: u64, sigma: f32) -> Self {
        Self { rng: StdRng::seed_from_u64(seed), sigma, intensity: None, smooth: false }
    }

    pub fn with_intensity(mut self, lo: f32, hi: f32) -> Self {
        self.intensity = Some((lo, hi));
        self
    }

    pub fn smoothed(mut self) -> Self {
        self.smooth = true;
        self
    }
}

impl NoiseGenerator for GaussianNoise {
    fn generate(&mut self, w: u32, h: u32) -> Vec<i16> {
        let gain = match self.intensity {
            Some((lo, hi)) => self.rng.gen_range(lo..=hi),
            None => 1.0,
        };
        let mut field: Vec<f32> = (0..(w as usize) * (h as usize))
            .map(|_| standard_normal(&mut self.rng) * self.sigma * gain)
            .collect();
        if self.smooth {
            field = convolve_separable(&field, w as usize, h as usize, 1, &gaussian_kernel(3, 0.0));
        }
        field.into_iter().map(|v| v.round().clamp(-255.0, 255.0) as i16).collect()
    }
}

/// Box-Muller: one N(0,1) sample from two uniforms.
pub fn standard_normal<R: Rng>(rng: &mut R) -> f32 {
    let u1: f32 = 1.0 - rng.r#gen::<f32>(); // (0,1], keeps ln() finite
    let u2: f32 = rng.r#gen::<f32>();
    (-2.0 * u1.ln()).sqrt() * (std::f32::consts::TAU * u2).cos()
}

/// Caches one noise field and only regenerates it once `interval` has passed.
pub struct NoiseCache<G> {
    generator: G,
    interval: Duration,
    field: Option<Vec<i16>>,
    dims: (u32, u32),
    last_update: Option<Instant>,
}

impl<G: NoiseGenerator> NoiseCache<G> {
    pub fn new(generator: G, interval: Duration) -> Self {
        Self { generator, interval, field: None, dims: (0, 0), last_update: None }
    }

    /// The field to use for a `w x h` frame at time `now`.
    /// A size change forces a fresh field so it always matches the frame.
    pub fn field(&mut self, now: Instant, w: u32, h: u32) -> &[i16] {
        let stale = match self.last_update {
            None => true,
            Some(t) => now.saturating_duration_since(t) > self.interval,
        };
        if stale || self.dims != (w, h) || self.field.is_none() {
            self.field = Some(self.generator.generate(w, h));
            self.dims = (w, h);
            self.last_update = Some(now);
        }
        self.field.as_deref().unwrap_or(&[])
    }
}

/// Same value everywhere; lets tests pin the noise.
#[cfg(test)]
pub struct FlatNoise(pub i16);

#[cfg(test)]
impl NoiseGenerator for FlatNoise {
    fn generate(&mut self, w: u32, h: u32) -> Vec<i16> {
        vec![self.0; (w as usize) * (h as usize)]
    }
}
