// Image-space building blocks shared by the night-vision and thermal effects.
// Everything here is a pure function of its inputs: no timers, no randomness.

use crate::clahe::reflect101;
use crate::types::{Frame, Gray};
use image::{ImageBuffer, Luma, Pixel};
use imageproc::morphology::{Mask, grayscale_dilate};

/// Convert a colour frame to single-channel luminance (BT.601 weights, rounded).
pub fn luminance(frame: &Frame) -> Gray {
    let (w, h) = frame.dimensions();
    Gray::from_fn(w, h, |x, y| {
        let [r, g, b] = frame.get_pixel(x, y).0;
        Luma([((299 * r as u32 + 587 * g as u32 + 114 * b as u32 + 500) / 1000) as u8])
    })
}

/// 1-D Gaussian kernel, normalized to sum 1.
/// `size == 0` picks the width from sigma (3 sigma each side, odd).
/// Small explicit sizes with `sigma <= 0` use the binomial tables (3 and 5 taps).
pub fn gaussian_kernel(size: usize, sigma: f32) -> Vec<f32> {
    if sigma <= 0.0 {
        match size {
            1 => return vec![1.0],
            3 => return vec![0.25, 0.5, 0.25],
            5 => return vec![0.0625, 0.25, 0.375, 0.25, 0.0625],
            _ => {}
        }
    }
    let size = if size == 0 { ((sigma * 6.0 + 1.0).round() as usize) | 1 } else { size | 1 };
    // Same fallback sigma OpenCV derives from the kernel width.
    let sigma = if sigma > 0.0 { sigma } else { 0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8 };

    let r = (size / 2) as i32;
    let s2 = 2.0 * sigma * sigma;
    let mut k: Vec<f32> = (-r..=r).map(|i| (-((i * i) as f32) / s2).exp()).collect();
    let sum: f32 = k.iter().sum();
    for w in &mut k { *w /= sum; }
    k
}

/// Separable convolution over an interleaved f32 buffer with `ch` channels.
/// Edges reflect without repeating the border sample (`dcb|abcd|cba`), so flat images stay flat.
pub fn convolve_separable(src: &[f32], w: usize, h: usize, ch: usize, kernel: &[f32]) -> Vec<f32> {
    let r = (kernel.len() / 2) as isize;
    let mut tmp = vec![0.0f32; src.len()];
    let mut dst = vec![0.0f32; src.len()];
    if w == 0 || h == 0 { return dst; }

    // Pass 1: horizontal into tmp
    for y in 0..h {
        let row = y * w;
        for x in 0..w {
            for c in 0..ch {
                let mut acc = 0.0f32;
                for (ki, kw) in kernel.iter().enumerate() {
                    let sx = mirror(x as isize + ki as isize - r, w);
                    acc += kw * src[(row + sx) * ch + c];
                }
                tmp[(row + x) * ch + c] = acc;
            }
        }
    }

    // Pass 2: vertical into dst
    for y in 0..h {
        for x in 0..w {
            for c in 0..ch {
                let mut acc = 0.0f32;
                for (ki, kw) in kernel.iter().enumerate() {
                    let sy = mirror(y as isize + ki as isize - r, h);
                    acc += kw * tmp[(sy * w + x) * ch + c];
                }
                dst[(y * w + x) * ch + c] = acc;
            }
        }
    }
    dst
}

#[inline]
fn mirror(i: isize, len: usize) -> usize {
    reflect101(i.unsigned_abs() as u32, len as u32) as usize
}

/// Gaussian blur of an 8-bit image (gray or RGB). Results are rounded, not truncated.
pub fn gaussian_blur<P>(img: &ImageBuffer<P, Vec<u8>>, size: usize, sigma: f32) -> ImageBuffer<P, Vec<u8>>
where
    P: Pixel<Subpixel = u8>,
{
    let (w, h) = img.dimensions();
    let ch = P::CHANNEL_COUNT as usize;
    let src: Vec<f32> = img.as_raw().iter().map(|&v| v as f32).collect();
    let blurred = convolve_separable(&src, w as usize, h as usize, ch, &gaussian_kernel(size, sigma));

    let mut out = img.clone();
    for (dst, v) in out.iter_mut().zip(blurred) {
        *dst = saturate(v);
    }
    out
}

/// Per-channel weighted sum `a*wa + b*wb`, rounded and saturated (OpenCV `addWeighted`).
pub fn add_weighted<P>(
    a: &ImageBuffer<P, Vec<u8>>,
    wa: f32,
    b: &ImageBuffer<P, Vec<u8>>,
    wb: f32,
) -> ImageBuffer<P, Vec<u8>>
where
    P: Pixel<Subpixel = u8>,
{
    let mut out = a.clone();
    for (dst, &vb) in out.iter_mut().zip(b.as_raw().iter()) {
        *dst = saturate(*dst as f32 * wa + vb as f32 * wb);
    }
    out
}

/// Add a signed noise field to a gray image, clamping at 0 and 255 (no wraparound).
pub fn add_noise_saturating(gray: &mut Gray, noise: &[i16]) {
    for (v, &n) in gray.iter_mut().zip(noise) {
        *v = (*v as i16 + n).clamp(0, 255) as u8;
    }
}

/// Multiply every sample by `m`, rounded and saturated.
pub fn scale_saturating(gray: &mut Gray, m: f32) {
    for v in gray.iter_mut() {
        *v = saturate(*v as f32 * m);
    }
}

/// Euclidean distance of pixel (x,y) from the integer image center (w/2, h/2).
#[inline]
pub fn center_distance(x: u32, y: u32, w: u32, h: u32) -> f32 {
    let dx = x as f32 - (w / 2) as f32;
    let dy = y as f32 - (h / 2) as f32;
    (dx * dx + dy * dy).sqrt()
}

/// 3x3 max filter, one iteration, applied to each channel independently.
pub fn dilate_rgb(frame: &Frame) -> Frame {
    let (w, h) = frame.dimensions();
    let square = Mask::square(1);
    let planes: Vec<Gray> = (0..3)
        .map(|c| grayscale_dilate(&Gray::from_fn(w, h, |x, y| Luma([frame.get_pixel(x, y)[c]])), &square))
        .collect();
    Frame::from_fn(w, h, |x, y| {
        image::Rgb([planes[0].get_pixel(x, y)[0], planes[1].get_pixel(x, y)[0], planes[2].get_pixel(x, y)[0]])
    })
}

#[inline]
pub fn saturate(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod test {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_kernel_sums_to_one() {
        for (size, sigma) in [(0, 5.0), (0, 10.0), (5, 0.0), (3, 0.0), (7, 1.5)] {
            let k = gaussian_kernel(size, sigma);
            assert_eq!(k.len() % 2, 1);
            assert!((k.iter().sum::<f32>() - 1.0).abs() < 1e-4);
        }
        assert_eq!(gaussian_kernel(0, 5.0).len(), 31);
    }

    #[test]
    fn test_blur_keeps_flat_image_flat() {
        let img = Frame::from_pixel(20, 12, Rgb([10, 128, 250]));
        assert_eq!(gaussian_blur(&img, 0, 5.0), img);
        let g = Gray::from_pixel(9, 9, Luma([77]));
        assert_eq!(gaussian_blur(&g, 5, 0.0), g);
    }

    #[test]
    fn test_blur_spreads_a_point() {
        let mut g = Gray::new(9, 9);
        g.put_pixel(4, 4, Luma([255]));
        let b = gaussian_blur(&g, 3, 0.0);
        assert_eq!(b.get_pixel(4, 4)[0], 64);
        assert_eq!(b.get_pixel(3, 4)[0], 32);
        assert_eq!(b.get_pixel(0, 0)[0], 0);
    }

    #[test]
    fn test_add_weighted_rounds_and_saturates() {
        let a = Gray::from_pixel(1, 1, Luma([200]));
        let b = Gray::from_pixel(1, 1, Luma([100]));
        assert_eq!(add_weighted(&a, 0.85, &b, 0.15).get_pixel(0, 0)[0], 185);
        assert_eq!(add_weighted(&a, 1.0, &b, 1.0).get_pixel(0, 0)[0], 255);
    }

    #[test]
    fn test_noise_add_saturates_both_ways() {
        let mut g = Gray::from_raw(3, 1, vec![250, 5, 100]).unwrap();
        add_noise_saturating(&mut g, &[20, -20, -3]);
        assert_eq!(g.as_raw(), &vec![255, 0, 97]);
    }

    #[test]
    fn test_dilate_grows_bright_pixel() {
        let mut f = Frame::new(5, 5);
        f.put_pixel(2, 2, Rgb([0, 200, 0]));
        let d = dilate_rgb(&f);
        for y in 1..=3 {
            for x in 1..=3 {
                assert_eq!(*d.get_pixel(x, y), Rgb([0, 200, 0]));
            }
        }
        assert_eq!(*d.get_pixel(0, 0), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_dilate_keeps_levels_and_takes_the_max() {
        let flat = Frame::from_pixel(6, 4, Rgb([200, 120, 40]));
        assert_eq!(dilate_rgb(&flat), flat);

        let mut f = Frame::from_pixel(5, 5, Rgb([10, 10, 10]));
        f.put_pixel(2, 2, Rgb([90, 0, 30]));
        f.put_pixel(3, 2, Rgb([20, 60, 0]));
        let d = dilate_rgb(&f);
        assert_eq!(*d.get_pixel(2, 2), Rgb([90, 60, 30]));
        assert_eq!(*d.get_pixel(0, 2), Rgb([10, 10, 10]));
    }

    #[test]
    fn test_luminance_uses_bt601_weights() {
        let f = Frame::from_fn(4, 1, |x, _| match x {
            0 => Rgb([255, 0, 0]),
            1 => Rgb([0, 255, 0]),
            2 => Rgb([0, 0, 255]),
            _ => Rgb([77, 77, 77]),
        });
        assert_eq!(luminance(&f).as_raw(), &vec![76, 150, 29, 77]);
    }

    #[test]
    fn test_blur_reflects_at_edges() {
        // Row 0 sees row 1 on both sides; a clamped border would weight row 0 twice.
        let g = Gray::from_fn(1, 3, |_, y| Luma([[0, 100, 40][y as usize]]));
        let b = gaussian_blur(&g, 3, 0.0);
        assert_eq!(b.get_pixel(0, 0)[0], 50);
        assert_eq!(b.get_pixel(0, 2)[0], 70);
    }
}
