// False-colour lookup tables for the thermal effect.
// Visual: maps "how bright" to "how hot it looks" (black-red-yellow-white, etc).

use crate::mode::ThermalPalette;
use crate::types::{Frame, Gray};
use image::Rgb;

pub struct Colormap {
    lut: [Rgb<u8>; 256],
}

// Colour stops (position in [0,1], RGB) for the sampled perceptual ramps.
const INFERNO: [(f32, [u8; 3]); 9] = [
    (0.000, [0, 0, 4]),
    (0.125, [31, 12, 72]),
    (0.250, [85, 15, 109]),
    (0.375, [136, 34, 106]),
    (0.500, [186, 54, 85]),
    (0.625, [227, 89, 51]),
    (0.750, [249, 140, 10]),
    (0.875, [249, 201, 50]),
    (1.000, [252, 255, 164]),
];

const PLASMA: [(f32, [u8; 3]); 9] = [
    (0.000, [13, 8, 135]),
    (0.125, [75, 3, 161]),
    (0.250, [125, 3, 168]),
    (0.375, [168, 34, 150]),
    (0.500, [203, 70, 121]),
    (0.625, [229, 107, 93]),
    (0.750, [248, 148, 65]),
    (0.875, [253, 195, 40]),
    (1.000, [240, 249, 33]),
];

const RAINBOW: [(f32, [u8; 3]); 6] = [
    (0.0, [255, 0, 0]),
    (0.2, [255, 255, 0]),
    (0.4, [0, 255, 0]),
    (0.6, [0, 255, 255]),
    (0.8, [0, 0, 255]),
    (1.0, [128, 0, 255]),
];

impl Colormap {
    pub fn for_palette(palette: ThermalPalette) -> Self {
        let lut = match palette {
            ThermalPalette::HotWhite => build(hot),
            ThermalPalette::HotBlack => build(bone),
            ThermalPalette::Rainbow => build(|t| ramp(&RAINBOW, t)),
            ThermalPalette::Ironbow => build(|t| ramp(&INFERNO, t)),
            ThermalPalette::Plasma => build(|t| ramp(&PLASMA, t)),
        };
        Self { lut }
    }

    #[inline]
    pub fn color(&self, level: u8) -> Rgb<u8> {
        self.lut[level as usize]
    }

    pub fn apply(&self, gray: &Gray) -> Frame {
        let (w, h) = gray.dimensions();
        Frame::from_fn(w, h, |x, y| self.color(gray.get_pixel(x, y)[0]))
    }
}

fn build(f: impl Fn(f32) -> [f32; 3]) -> [Rgb<u8>; 256] {
    let mut lut = [Rgb([0u8; 3]); 256];
    for (i, slot) in lut.iter_mut().enumerate() {
        let c = f(i as f32 / 255.0);
        *slot = Rgb(c.map(|v| (v * 255.0).round().clamp(0.0, 255.0) as u8));
    }
    lut
}

/// Black -> red -> yellow -> white.
fn hot(t: f32) -> [f32; 3] {
    [
        (t * 8.0 / 3.0).clamp(0.0, 1.0),
        (t * 8.0 / 3.0 - 1.0).clamp(0.0, 1.0),
        (t * 4.0 - 3.0).clamp(0.0, 1.0),
    ]
}

/// Blue-tinted grayscale: 7/8 gray plus 1/8 of the channel-reversed hot ramp.
fn bone(t: f32) -> [f32; 3] {
    let [r, g, b] = hot(t);
    [(7.0 * t + b) / 8.0, (7.0 * t + g) / 8.0, (7.0 * t + r) / 8.0]
}

/// Piecewise-linear interpolation between colour stops.
fn ramp(stops: &[(f32, [u8; 3])], t: f32) -> [f32; 3] {
    let t = t.clamp(0.0, 1.0);
    for pair in stops.windows(2) {
        let (t0, c0) = pair[0];
        let (t1, c1) = pair[1];
        if t <= t1 {
            let a = if t1 > t0 { (t - t0) / (t1 - t0) } else { 0.0 };
            return [0, 1, 2].map(|i| (c0[i] as f32 * (1.0 - a) + c1[i] as f32 * a) / 255.0);
        }
    }
    let last = stops[stops.len() - 1].1;
    last.map(|v| v as f32 / 255.0)
}
