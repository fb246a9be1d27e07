// Contrast-limited adaptive histogram equalization (CLAHE).
// Visual: flattens lighting so dark rooms and bright windows both show detail,
// the way a night-vision tube's automatic gain would.

use crate::types::Gray;

pub struct Clahe {
    clip_limit: f32,
    tiles_x: u32,
    tiles_y: u32,
}

impl Clahe {
    pub fn new(clip_limit: f32, tiles_x: u32, tiles_y: u32) -> Self {
        Self { clip_limit, tiles_x: tiles_x.max(1), tiles_y: tiles_y.max(1) }
    }

    pub fn apply(&self, src: &Gray) -> Gray {
        let (w, h) = src.dimensions();
        if w == 0 || h == 0 {
            return src.clone();
        }
        // Tiles cover the image; partial tiles read mirrored pixels past the edge.
        let tile_w = w.div_ceil(self.tiles_x);
        let tile_h = h.div_ceil(self.tiles_y);
        let area = (tile_w * tile_h) as usize;
        let lut_scale = 255.0 / area as f32;
        let limit = ((self.clip_limit * area as f32 / 256.0) as usize).max(1);

        // 1) One lookup table per tile.
        let mut luts = vec![[0u8; 256]; (self.tiles_x * self.tiles_y) as usize];
        for ty in 0..self.tiles_y {
            for tx in 0..self.tiles_x {
                let mut hist = [0usize; 256];
                for y in ty * tile_h..(ty + 1) * tile_h {
                    let sy = reflect101(y, h);
                    for x in tx * tile_w..(tx + 1) * tile_w {
                        hist[src.get_pixel(reflect101(x, w), sy)[0] as usize] += 1;
                    }
                }
                clip_histogram(&mut hist, limit);

                let lut = &mut luts[(ty * self.tiles_x + tx) as usize];
                let mut sum = 0usize;
                for (i, &count) in hist.iter().enumerate() {
                    sum += count;
                    lut[i] = (sum as f32 * lut_scale).round().clamp(0.0, 255.0) as u8;
                }
            }
        }

        // 2) Bilinear blend of the four nearest tile tables per pixel.
        let inv_tw = 1.0 / tile_w as f32;
        let inv_th = 1.0 / tile_h as f32;
        Gray::from_fn(w, h, |x, y| {
            let v = src.get_pixel(x, y)[0] as usize;
            let (tx1, tx2, xa) = neighbours(x as f32 * inv_tw - 0.5, self.tiles_x);
            let (ty1, ty2, ya) = neighbours(y as f32 * inv_th - 0.5, self.tiles_y);
            let at = |tx: u32, ty: u32| luts[(ty * self.tiles_x + tx) as usize][v] as f32;

            let top = at(tx1, ty1) * (1.0 - xa) + at(tx2, ty1) * xa;
            let bottom = at(tx1, ty2) * (1.0 - xa) + at(tx2, ty2) * xa;
            let res = top * (1.0 - ya) + bottom * ya;
            image::Luma([res.round().clamp(0.0, 255.0) as u8])
        })
    }
}

/// Clip every bin at `limit` and spread the excess evenly over all bins.
fn clip_histogram(hist: &mut [usize; 256], limit: usize) {
    let mut clipped = 0usize;
    for bin in hist.iter_mut() {
        if *bin > limit {
            clipped += *bin - limit;
            *bin = limit;
        }
    }

    let batch = clipped / 256;
    let mut residual = clipped - batch * 256;
    for bin in hist.iter_mut() {
        *bin += batch;
    }
    if residual > 0 {
        let step = (256 / residual).max(1);
        let mut i = 0;
        while i < 256 && residual > 0 {
            hist[i] += 1;
            residual -= 1;
            i += step;
        }
    }
}

/// Left/right tile index and the weight of the right one.
fn neighbours(pos: f32, tiles: u32) -> (u32, u32, f32) {
    let lo = pos.floor();
    let frac = pos - lo;
    let lo = lo as i64;
    let a = lo.max(0) as u32;
    let b = (lo + 1).min(tiles as i64 - 1).max(0) as u32;
    (a, b, frac)
}

/// Mirror index past the edge without repeating the border pixel (gfedcb|abcdefgh|gfedcba).
pub(crate) fn reflect101(i: u32, len: u32) -> u32 {
    if len == 1 {
        return 0;
    }
    let period = 2 * (len - 1);
    let m = i % period;
    if m < len { m } else { period - m }
}

#[cfg(test)]
mod test {
    use super::*;
    use image::Luma;

    #[test]
    fn test_uniform_frame_maps_through_one_lut() {
        // 80x60 tiles, limit 56; hand-computed cdf at 128 is 2507 of 4800.
        let g = Gray::from_pixel(640, 480, Luma([128]));
        let out = Clahe::new(3.0, 8, 8).apply(&g);
        assert!(out.pixels().all(|p| p[0] == 133));
    }

    #[test]
    fn test_output_keeps_dimensions_for_odd_sizes() {
        let g = Gray::from_fn(37, 23, |x, y| Luma([((x * 7 + y * 3) % 256) as u8]));
        let out = Clahe::new(4.0, 8, 8).apply(&g);
        assert_eq!(out.dimensions(), (37, 23));
    }

    #[test]
    fn test_gradient_stays_monotonic_along_a_row() {
        let g = Gray::from_fn(256, 64, |x, _| Luma([x as u8]));
        let out = Clahe::new(3.0, 1, 1).apply(&g);
        for x in 1..256 {
            assert!(out.get_pixel(x, 0)[0] >= out.get_pixel(x - 1, 0)[0]);
        }
    }

    #[test]
    fn test_clip_redistributes_excess() {
        let mut hist = [0usize; 256];
        hist[10] = 1000;
        clip_histogram(&mut hist, 100);
        assert_eq!(hist.iter().sum::<usize>(), 1000);
        assert!(hist[10] <= 100 + 4 + 1);
    }

    #[test]
    fn test_reflect101() {
        assert_eq!(reflect101(0, 4), 0);
        assert_eq!(reflect101(3, 4), 3);
        assert_eq!(reflect101(4, 4), 2);
        assert_eq!(reflect101(5, 4), 1);
    }
}
