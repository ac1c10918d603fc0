//! Reference dots drawn at the center of every board cell.

use pixelboard_common::{PixelColor, colors};

use crate::canvas::{Canvas, alpha};
use crate::render::coords::GridTransform;

/// Dot diameter, relative to the cell size.
const DOT_DIAMETER: f64 = 0.2;

/// Role of a board cell in the reference grid, decides the dot tint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DotKind {
    /// The board origin (0, 0)
    Origin,
    /// On the Y axis (x == 0)
    YAxis,
    /// On the X axis (y == 0)
    XAxis,
    /// On a minor line, every 5th row or column
    Minor,
    Free,
}

impl DotKind {
    pub fn classify(x: i64, y: i64) -> Self {
        match (x, y) {
            (0, 0) => DotKind::Origin,
            (0, _) => DotKind::YAxis,
            (_, 0) => DotKind::XAxis,
            _ if x % 5 == 0 || y % 5 == 0 => DotKind::Minor,
            _ => DotKind::Free,
        }
    }

    /// Color and opacity of the dot.
    pub fn tint(self) -> (PixelColor, u8) {
        match self {
            DotKind::Origin => (colors::PURPLE, alpha(0.5)),
            DotKind::YAxis => (colors::RED, alpha(0.35)),
            DotKind::XAxis => (colors::BLUE, alpha(0.35)),
            DotKind::Minor => (colors::BLACK, alpha(0.15)),
            DotKind::Free => (colors::BLACK, alpha(0.05)),
        }
    }
}

/// Draw one dot per cell of the transform's grid range.
pub fn draw_dots(canvas: &mut Canvas, transform: &GridTransform) {
    let (sx, sy) = transform.cell_size();
    let radius = sx.min(sy) * DOT_DIAMETER / 2.0;

    for (x, y) in transform.range().cells() {
        let (cx, cy) = transform.cell_center(x, y);
        let (color, opacity) = DotKind::classify(x, y).tint();
        canvas.fill_disc(cx, cy, radius, color, opacity);
    }
}
