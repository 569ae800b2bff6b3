//! Built-in bitmap font for card labels.
//!
//! Labels only ever contain digits, `X` and spaces, so a fixed 5x7 glyph set
//! is embedded instead of loading a font file at runtime. Every glyph sits in
//! a 6x11 cell: one column of spacing on the right, two rows above the glyph
//! and two below.
//!
//! Characters outside the set are drawn as a hollow box so a bad label is
//! visible rather than silently blank.

use image::{Rgb, RgbImage};

/// Width of a glyph bitmap in pixels.
pub const GLYPH_WIDTH: u32 = 5;

/// Height of a glyph bitmap in pixels.
pub const GLYPH_HEIGHT: u32 = 7;

/// Horizontal distance between the left edges of consecutive glyphs.
pub const ADVANCE: u32 = GLYPH_WIDTH + 1;

/// Height of a line of text, including padding.
pub const LINE_HEIGHT: u32 = 11;

/// Rows between the top of the line and the top of the glyph.
const TOP_PADDING: u32 = 2;

type Glyph = [u8; GLYPH_HEIGHT as usize];

// Each row is a 5-bit mask, most significant bit on the left.
const DIGITS: [Glyph; 10] = [
    [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
    [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
    [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
    [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
    [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
    [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
    [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
    [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
    [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
    [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
];

const CROSS: Glyph = [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001];

const BLANK: Glyph = [0; GLYPH_HEIGHT as usize];

const UNKNOWN: Glyph = [0b11111, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11111];

fn glyph(c: char) -> &'static Glyph {
    match c {
        '0'..='9' => &DIGITS[c as usize - '0' as usize],
        'X' | 'x' => &CROSS,
        ' ' => &BLANK,
        _ => &UNKNOWN,
    }
}

/// Size of `text` when drawn with [`draw_text`], as `(width, height)`.
///
/// Empty text measures `(0, 0)`.
pub fn text_size(text: &str) -> (u32, u32) {
    let chars = text.chars().count() as u32;
    if chars == 0 {
        (0, 0)
    } else {
        (chars * ADVANCE, LINE_HEIGHT)
    }
}

/// Draw `text` with its top-left corner at `(left, top)`.
///
/// Pixels falling outside the image are skipped.
pub fn draw_text(image: &mut RgbImage, left: u32, top: u32, text: &str, color: Rgb<u8>) {
    let (width, height) = image.dimensions();

    for (index, c) in text.chars().enumerate() {
        let x0 = left + index as u32 * ADVANCE;
        let y0 = top + TOP_PADDING;

        for (row, bits) in glyph(c).iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                    continue;
                }
                let x = x0 + col;
                let y = y0 + row as u32;
                if x < width && y < height {
                    image.put_pixel(x, y, color);
                }
            }
        }
    }
}
