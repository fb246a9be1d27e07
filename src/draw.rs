// Window + software drawing utilities.
// Visual effects provided here:
// 1) A window that shows the processed camera image.
// 2) Key presses turned into abstract input events.
// 3) A tiny 5x7 bitmap font (scalable) to render HUD text on top of the video.

use crate::error::{Error, Result};
use crate::input::InputEvent;
use crate::types::{Frame, FrameBuffer};
use image::Rgb;
use minifb::{Key, KeyRepeat, Window, WindowOptions};

/// Where processed frames go and where the next key comes from.
pub trait DisplaySink {
    fn present(&mut self, frame: &Frame) -> Result<()>;
    fn poll_event(&mut self) -> Option<InputEvent>;
}

pub struct Drawer {
    window: Window,      // the on-screen window you see
    screen: FrameBuffer, // reused 0x00RRGGBB buffer
}

impl Drawer {
    /// Create a window sized to the camera feed.
    /// Visual: a new empty window appears with your chosen title.
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self> {
        let window = Window::new(title, width, height, WindowOptions::default())
            .map_err(|e| Error::WindowInit(e.to_string()))?;
        Ok(Self { window, screen: FrameBuffer::new(width, height) })
    }
}

impl DisplaySink for Drawer {
    /// Push the pixels for this frame to the screen.
    /// Visual: the window immediately displays the new image (live video).
    fn present(&mut self, frame: &Frame) -> Result<()> {
        self.screen.fill_from(frame);
        self.window
            .update_with_buffer(&self.screen.pixels, self.screen.width, self.screen.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))
    }

    /// First recognized key pressed since the last present. Closing the window quits.
    fn poll_event(&mut self) -> Option<InputEvent> {
        if !self.window.is_open() {
            return Some(InputEvent::Quit);
        }
        self.window
            .get_keys_pressed(KeyRepeat::No)
            .into_iter()
            .find_map(key_to_event)
    }
}

fn key_to_event(key: Key) -> Option<InputEvent> {
    let c = match key {
        Key::Escape => return Some(InputEvent::Quit),
        Key::A => 'a',
        Key::D => 'd',
        Key::W => 'w',
        Key::S => 's',
        Key::Q => 'q',
        Key::Equal | Key::NumPadPlus => '+',
        Key::Minus | Key::NumPadMinus => '-',
        Key::Key1 | Key::NumPad1 => '1',
        Key::Key2 | Key::NumPad2 => '2',
        Key::Key3 | Key::NumPad3 => '3',
        Key::Key4 | Key::NumPad4 => '4',
        _ => return None,
    };
    InputEvent::from_char(c)
}

/* ---------- Software drawing: pixels, lines, tiny bitmap font ---------- */

/// Put a pixel on the frame if (x,y) is inside bounds.
/// Visual: the exact pixel at (x,y) changes color.
#[inline]
pub fn put_pixel(img: &mut Frame, x: i32, y: i32, color: Rgb<u8>) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as u32, y as u32);
    if x >= img.width() || y >= img.height() {
        return;
    }
    img.put_pixel(x, y, color);
}

/// Full-width 1px horizontal line.
pub fn draw_hline(img: &mut Frame, y: i32, color: Rgb<u8>) {
    for x in 0..img.width() as i32 {
        put_pixel(img, x, y, color);
    }
}

/* ---------- 5x7 bitmap font (digits, A-Z and the punctuation the HUD uses) ---------- */

/// Return a 5x7 glyph bitmap. Lowercase letters use the uppercase shapes.
/// Each u8 is a row; the low 5 bits are the pixels (bit 4 = leftmost).
fn glyph5x7(ch: char) -> Option<[u8; 7]> {
    // Helper macro to define a glyph quickly
    macro_rules! g { ($a:expr,$b:expr,$c:expr,$d:expr,$e:expr,$f:expr,$g:expr) => {
        Some([$a,$b,$c,$d,$e,$f,$g])
    }; }

    match ch.to_ascii_uppercase() {
        // Digits 0..9
        '0' => g!(0b01110,0b10001,0b10011,0b10101,0b11001,0b10001,0b01110),
        '1' => g!(0b00100,0b01100,0b00100,0b00100,0b00100,0b00100,0b01110),
        '2' => g!(0b01110,0b10001,0b00001,0b00010,0b00100,0b01000,0b11111),
        '3' => g!(0b11110,0b00001,0b00001,0b01110,0b00001,0b00001,0b11110),
        '4' => g!(0b00010,0b00110,0b01010,0b10010,0b11111,0b00010,0b00010),
        '5' => g!(0b11111,0b10000,0b11110,0b00001,0b00001,0b10001,0b01110),
        '6' => g!(0b00110,0b01000,0b10000,0b11110,0b10001,0b10001,0b01110),
        '7' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b01000,0b01000),
        '8' => g!(0b01110,0b10001,0b10001,0b01110,0b10001,0b10001,0b01110),
        '9' => g!(0b01110,0b10001,0b10001,0b01111,0b00001,0b00010,0b01100),

        'A' => g!(0b01110,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'B' => g!(0b11110,0b10001,0b10001,0b11110,0b10001,0b10001,0b11110),
        'C' => g!(0b01110,0b10001,0b10000,0b10000,0b10000,0b10001,0b01110),
        'D' => g!(0b11100,0b10010,0b10001,0b10001,0b10001,0b10010,0b11100),
        'E' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b11111),
        'F' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b10000),
        'G' => g!(0b01110,0b10001,0b10000,0b10111,0b10001,0b10001,0b01111),
        'H' => g!(0b10001,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'I' => g!(0b01110,0b00100,0b00100,0b00100,0b00100,0b00100,0b01110),
        'J' => g!(0b00111,0b00010,0b00010,0b00010,0b00010,0b10010,0b01100),
        'K' => g!(0b10001,0b10010,0b10100,0b11000,0b10100,0b10010,0b10001),
        'L' => g!(0b10000,0b10000,0b10000,0b10000,0b10000,0b10000,0b11111),
        'M' => g!(0b10001,0b11011,0b10101,0b10101,0b10001,0b10001,0b10001),
        'N' => g!(0b10001,0b10001,0b11001,0b10101,0b10011,0b10001,0b10001),
        'O' => g!(0b01110,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'P' => g!(0b11110,0b10001,0b10001,0b11110,0b10000,0b10000,0b10000),
        'Q' => g!(0b01110,0b10001,0b10001,0b10001,0b10101,0b10010,0b01101),
        'R' => g!(0b11110,0b10001,0b10001,0b11110,0b10100,0b10010,0b10001),
        'S' => g!(0b01111,0b10000,0b10000,0b01110,0b00001,0b00001,0b11110),
        'T' => g!(0b11111,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        'U' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'V' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b01010,0b00100),
        'W' => g!(0b10001,0b10001,0b10001,0b10101,0b10101,0b10101,0b01010),
        'X' => g!(0b10001,0b10001,0b01010,0b00100,0b01010,0b10001,0b10001),
        'Y' => g!(0b10001,0b10001,0b01010,0b00100,0b00100,0b00100,0b00100),
        'Z' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b10000,0b11111),

        // Punctuation
        ' ' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00000,0b00000),
        '|' => g!(0b00100,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        ':' => g!(0b00000,0b00100,0b00000,0b00000,0b00100,0b00000,0b00000),
        '.' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00100,0b00000),
        '/' => g!(0b00001,0b00001,0b00010,0b00100,0b01000,0b10000,0b10000),
        '+' => g!(0b00000,0b00100,0b00100,0b11111,0b00100,0b00100,0b00000),
        '-' => g!(0b00000,0b00000,0b00000,0b11111,0b00000,0b00000,0b00000),
        '=' => g!(0b00000,0b00000,0b11111,0b00000,0b11111,0b00000,0b00000),
        '_' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00000,0b11111),
        '%' => g!(0b11001,0b11001,0b00010,0b00100,0b01000,0b10011,0b10011),

        _ => None,
    }
}

/// Draw a single 5x7 character at (x,y), each font pixel a `scale` x `scale` block.
/// Visual: a glyph appears with a 1-pixel black shadow for contrast.
fn draw_char_5x7(img: &mut Frame, x: i32, y: i32, ch: char, color: Rgb<u8>, scale: i32) {
    let Some(rows) = glyph5x7(ch) else { return };

    // Shadow pass first, then the glyph on top.
    for (offset, c) in [(1, Rgb([0, 0, 0])), (0, color)] {
        for (ry, rowbits) in rows.iter().enumerate() {
            for rx in 0..5 {
                if (rowbits & (1 << (4 - rx))) == 0 {
                    continue;
                }
                for sy in 0..scale {
                    for sx in 0..scale {
                        let px = x + (rx * scale + sx) + offset;
                        let py = y + (ry as i32 * scale + sy) + offset;
                        put_pixel(img, px, py, c);
                    }
                }
            }
        }
    }
}

/// Draw a text string using 5x7 glyphs; (x,y) is the top-left corner.
/// Visual: a compact HUD string appears; glyphs advance by 6 * scale pixels.
pub fn draw_text_5x7(img: &mut Frame, mut x: i32, y: i32, text: &str, color: Rgb<u8>, scale: i32) {
    for ch in text.chars() {
        draw_char_5x7(img, x, y, ch, color, scale);
        x += 6 * scale; // 5 pixels glyph width + 1 pixel spacing
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

    #[test]
    fn test_every_hud_character_has_a_glyph() {
        let text = "ABCDEFGHIJKLMNOPQRSTUVWXYZ abcxyz 0123456789 :./+-=_%|";
        assert!(text.chars().all(|c| glyph5x7(c).is_some()));
        assert!(glyph5x7('#').is_none());
    }

    #[test]
    fn test_text_draws_inside_its_box() {
        let mut img = Frame::new(40, 20);
        draw_text_5x7(&mut img, 2, 2, "HI", WHITE, 1);
        let lit: Vec<(u32, u32)> = img
            .enumerate_pixels()
            .filter(|(_, _, p)| **p == WHITE)
            .map(|(x, y, _)| (x, y))
            .collect();
        assert!(!lit.is_empty());
        assert!(lit.iter().all(|&(x, y)| (2..14).contains(&x) && (2..9).contains(&y)));
    }

    #[test]
    fn test_scaled_text_is_bigger() {
        let mut small = Frame::new(80, 40);
        let mut big = Frame::new(80, 40);
        draw_text_5x7(&mut small, 0, 0, "M", WHITE, 1);
        draw_text_5x7(&mut big, 0, 0, "M", WHITE, 2);
        let count = |f: &Frame| f.pixels().filter(|p| **p == WHITE).count();
        assert_eq!(count(&big), 4 * count(&small));
    }

    #[test]
    fn test_drawing_off_screen_is_clipped() {
        let mut img = Frame::new(4, 4);
        draw_text_5x7(&mut img, -3, -3, "8", WHITE, 1);
        draw_hline(&mut img, 10, WHITE);
        draw_hline(&mut img, 1, WHITE);
        assert!((0..4).all(|x| *img.get_pixel(x, 1) == WHITE));
    }

    #[test]
    fn test_key_mapping() {
        assert_eq!(key_to_event(Key::Escape), Some(InputEvent::Quit));
        assert_eq!(key_to_event(Key::Equal), Some(InputEvent::ZoomIn));
        assert_eq!(key_to_event(Key::NumPadMinus), Some(InputEvent::ZoomOut));
        assert_eq!(key_to_event(Key::Key3), Some(InputEvent::ToggleHud));
        assert_eq!(key_to_event(Key::Z), None);
    }
}
