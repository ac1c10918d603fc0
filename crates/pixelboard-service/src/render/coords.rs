//! Board space <-> image space translation.
//!
//! Board space is centered on the board origin with y growing upward, image
//! space has its origin top-left with y growing downward. The cell mapping
//! is a set of pure functions, [GridTransform] only carries the scaling used
//! by the grid decoration.

use pixelboard_common::GridRange;

/// Axis-aligned rectangle in image space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: i64,
    pub y: i64,
    pub w: i64,
    pub h: i64,
}

impl Rect {
    pub fn new(x: i64, y: i64, w: i64, h: i64) -> Self {
        Rect { x, y, w, h }
    }

    pub fn right(&self) -> i64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> i64 {
        self.y + self.h
    }
}

/// Column and row of the board cell holding the board-space point (x, y).
///
/// Column is `x + ceil(W/2) - 1`, row is `-y + floor(H/2)`.
pub fn board_to_cell(range: &GridRange, x: i64, y: i64) -> (i64, i64) {
    (x - range.min_x, range.max_y - 1 - y)
}

/// Inverse of [board_to_cell].
pub fn cell_to_board(range: &GridRange, column: i64, row: i64) -> (i64, i64) {
    (column + range.min_x, range.max_y - 1 - row)
}

/// Image-space square covered by the board cell (x, y).
///
/// `origin` is the top-left corner of the board area and `scale` the edge
/// length of a cell. Returns None for points outside the board.
pub fn cell_rect(
    range: &GridRange,
    origin: (i64, i64),
    scale: i64,
    x: i64,
    y: i64,
) -> Option<Rect> {
    if !range.contains(x, y) {
        return None;
    }
    let (column, row) = board_to_cell(range, x, y);
    Some(Rect::new(
        origin.0 + column * scale,
        origin.1 + row * scale,
        scale,
        scale,
    ))
}

/// Maps the whole grid range onto a drawing rectangle.
///
/// Unlike [cell_rect], the cell size is derived from the rectangle, so
/// the grid always fills the rectangle exactly whatever its size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridTransform {
    range: GridRange,
    area: Rect,
    sx: f64,
    sy: f64,
}

impl GridTransform {
    /// Returns None when the range is degenerate.
    pub fn new(range: GridRange, area: Rect) -> Option<Self> {
        if range.is_degenerate() {
            return None;
        }
        Some(GridTransform {
            range,
            area,
            sx: area.w as f64 / range.columns() as f64,
            sy: area.h as f64 / range.rows() as f64,
        })
    }

    pub fn range(&self) -> &GridRange {
        &self.range
    }

    pub fn area(&self) -> &Rect {
        &self.area
    }

    /// Size of one cell, (width, height).
    pub fn cell_size(&self) -> (f64, f64) {
        (self.sx, self.sy)
    }

    /// Image-space x of the center of the column holding board x.
    pub fn column_center(&self, x: i64) -> f64 {
        self.area.x as f64 + ((x - self.range.min_x) as f64 + 0.5) * self.sx
    }

    /// Image-space y of the center of the row holding board y.
    pub fn row_center(&self, y: i64) -> f64 {
        self.area.y as f64 + ((self.range.max_y - 1 - y) as f64 + 0.5) * self.sy
    }

    /// Image-space center of the board cell (x, y).
    pub fn cell_center(&self, x: i64, y: i64) -> (f64, f64) {
        (self.column_center(x), self.row_center(y))
    }
}
