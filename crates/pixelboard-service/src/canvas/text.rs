//! Text measurement and rasterization.
//!
//! Layout code only depends on [TextMeasure], so it can be exercised with
//! any metrics source. [BlockFont] is the built-in implementation: a tiny
//! 3x5 bitmap font scaled by an integer factor.

use pixelboard_common::PixelColor;

use crate::canvas::Canvas;

/// Extent of a rendered string, in image pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextMetrics {
    /// Advance width of the whole string
    pub width: u32,
    /// Height above the baseline
    pub ascent: u32,
    /// Depth below the baseline
    pub descent: u32,
}

/// Text measurement capability.
pub trait TextMeasure {
    fn measure(&self, text: &str) -> TextMetrics;
}

/// Text measurement plus the ability to paint glyphs on a canvas.
pub trait TextRaster: TextMeasure {
    /// Draw `text` with its left edge at `x` and its baseline at `baseline`.
    fn draw(
        &self,
        canvas: &mut Canvas,
        x: i64,
        baseline: i64,
        text: &str,
        color: PixelColor,
        alpha: u8,
    );
}

const GLYPH_W: u32 = 3;
const GLYPH_H: u32 = 5;

/// 3x5 block font, every glyph cell is a `scale` x `scale` square.
///
/// Lowercase letters are drawn as uppercase, unknown characters as `?`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockFont {
    scale: u32,
}

impl BlockFont {
    pub const fn new(scale: u32) -> Self {
        let scale = if scale == 0 { 1 } else { scale };
        BlockFont { scale }
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    fn advance(&self) -> u32 {
        (GLYPH_W + 1) * self.scale
    }
}

impl TextMeasure for BlockFont {
    fn measure(&self, text: &str) -> TextMetrics {
        let chars = text.chars().count() as u32;
        TextMetrics {
            // No spacing after the last glyph
            width: (chars * self.advance()).saturating_sub(self.scale),
            ascent: GLYPH_H * self.scale,
            descent: self.scale,
        }
    }
}

impl TextRaster for BlockFont {
    fn draw(
        &self,
        canvas: &mut Canvas,
        x: i64,
        baseline: i64,
        text: &str,
        color: PixelColor,
        alpha: u8,
    ) {
        let scale = self.scale as i64;
        let top = baseline - (GLYPH_H as i64) * scale;
        let mut cursor_x = x;

        for ch in text.chars() {
            if ch != ' ' {
                for (row, bits) in glyph_rows(ch).into_iter().enumerate() {
                    for col in 0..GLYPH_W {
                        let mask = 1u8 << (GLYPH_W - 1 - col);
                        if (bits & mask) == 0 {
                            continue;
                        }
                        let px0 = cursor_x + (col as i64) * scale;
                        let py0 = top + (row as i64) * scale;
                        for dy in 0..scale {
                            for dx in 0..scale {
                                canvas.blend_pixel(px0 + dx, py0 + dy, color, alpha);
                            }
                        }
                    }
                }
            }
            cursor_x += self.advance() as i64;
        }
    }
}

fn glyph_rows(ch: char) -> [u8; GLYPH_H as usize] {
    match ch.to_ascii_uppercase() {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],

        'A' => [0b010, 0b101, 0b111, 0b101, 0b101],
        'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'J' => [0b111, 0b001, 0b001, 0b101, 0b010],
        'K' => [0b101, 0b110, 0b100, 0b110, 0b101],
        'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'M' => [0b101, 0b111, 0b111, 0b101, 0b101],
        'N' => [0b110, 0b101, 0b101, 0b101, 0b101],
        'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'R' => [0b111, 0b101, 0b110, 0b101, 0b101],
        'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'V' => [0b101, 0b101, 0b101, 0b101, 0b010],
        'W' => [0b101, 0b101, 0b111, 0b111, 0b101],
        'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'Y' => [0b101, 0b101, 0b010, 0b010, 0b010],
        'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],

        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '[' => [0b110, 0b100, 0b100, 0b100, 0b110],
        ']' => [0b011, 0b001, 0b001, 0b001, 0b011],
        '!' => [0b010, 0b010, 0b010, 0b000, 0b010],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        ' ' => [0b000; GLYPH_H as usize],

        _ => [0b111, 0b001, 0b010, 0b000, 0b010], // '?'
    }
}
