use core::fmt::Display;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Color of a pixel on the board.
///
/// Simple RGB representation. Draw logs store it packed as `0xRRGGBB`,
/// which is also its serialized form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "u32", into = "u32"))]
pub struct PixelColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl PixelColor {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        PixelColor { r, g, b }
    }
}

impl From<u32> for PixelColor {
    /// Unpack a `0xRRGGBB` value, bits above the 24th are ignored.
    fn from(rgb: u32) -> Self {
        PixelColor {
            r: (rgb >> 16) as u8,
            g: (rgb >> 8) as u8,
            b: rgb as u8,
        }
    }
}

impl From<PixelColor> for u32 {
    fn from(color: PixelColor) -> Self {
        ((color.r as u32) << 16) | ((color.g as u32) << 8) | color.b as u32
    }
}

impl Display for PixelColor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

pub mod colors {
    use super::PixelColor;

    /// Predefined colors
    pub const WHITE: PixelColor = PixelColor::new(255, 255, 255);
    pub const BLACK: PixelColor = PixelColor::new(0, 0, 0);
    pub const RED: PixelColor = PixelColor::new(255, 0, 0);
    pub const GREEN: PixelColor = PixelColor::new(0, 255, 0);
    pub const BLUE: PixelColor = PixelColor::new(0, 0, 255);
    pub const PURPLE: PixelColor = PixelColor::new(128, 0, 128);
}

/// One recorded pixel placement on a board.
///
/// Coordinates are in board space (centered on the board origin, y up).
/// `sequence` is strictly increasing per board and defines replay order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DrawEvent {
    pub sequence: u64,
    /// User who placed the pixel.
    pub author: i64,
    pub x: i64,
    pub y: i64,
    pub color: PixelColor,
}

impl DrawEvent {
    pub fn new(sequence: u64, author: i64, x: i64, y: i64, color: PixelColor) -> Self {
        DrawEvent {
            sequence,
            author,
            x,
            y,
            color,
        }
    }
}
