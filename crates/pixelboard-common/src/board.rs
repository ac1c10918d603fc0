use core::fmt::Display;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identifier of a board (the chat/peer the board belongs to).
pub type BoardId = i64;

/// Board dimensions, as configured by the board owner.
///
/// Dimensions are kept signed: a negative size can be stored upstream and
/// must be reported, not rejected at parse time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoardConfig {
    pub width: i32,
    pub height: i32,
}

impl BoardConfig {
    /// Largest number of cells a board may be created with.
    pub const MAX_AREA: i64 = 10_000;

    pub fn new(width: i32, height: i32) -> Self {
        BoardConfig { width, height }
    }

    /// Check that both dimensions are non-negative.
    pub fn is_valid(&self) -> bool {
        self.width >= 0 && self.height >= 0
    }

    /// Number of cells of the board, None for an invalid board.
    pub fn area(&self) -> Option<i64> {
        self.is_valid().then(|| self.width as i64 * self.height as i64)
    }

    /// Board-space coordinate range covered by this board.
    pub fn grid_range(&self) -> GridRange {
        GridRange::from_size(self.width as i64, self.height as i64)
    }
}

impl Display for BoardConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Half-open range of board-space coordinates of a board.
///
/// Board space is centered on the logical origin, x grows rightward and
/// y grows upward. For a board of width `W` the x range is
/// `[-ceil(W/2) + 1, floor(W/2) + 1)`, and the same goes for y with `H`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridRange {
    pub min_x: i64,
    pub max_x: i64,
    pub min_y: i64,
    pub max_y: i64,
}

impl GridRange {
    /// Compute the range of a `width` x `height` board.
    pub fn from_size(width: i64, height: i64) -> Self {
        GridRange {
            min_x: -ceil_half(width) + 1,
            max_x: floor_half(width) + 1,
            min_y: -ceil_half(height) + 1,
            max_y: floor_half(height) + 1,
        }
    }

    /// A range is degenerate when it holds no cell at all.
    pub fn is_degenerate(&self) -> bool {
        self.min_x >= self.max_x || self.min_y >= self.max_y
    }

    /// Check if the given board-space point lies on the board.
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= self.min_x && x < self.max_x && y >= self.min_y && y < self.max_y
    }

    /// Number of columns (0 when degenerate).
    pub fn columns(&self) -> i64 {
        (self.max_x - self.min_x).max(0)
    }

    /// Number of rows (0 when degenerate).
    pub fn rows(&self) -> i64 {
        (self.max_y - self.min_y).max(0)
    }

    /// Iterate over every cell of the range, row by row from the top.
    pub fn cells(&self) -> impl Iterator<Item = (i64, i64)> + '_ {
        (self.min_y..self.max_y)
            .rev()
            .flat_map(move |y| (self.min_x..self.max_x).map(move |x| (x, y)))
    }
}

fn ceil_half(n: i64) -> i64 {
    -(-n).div_euclid(2)
}

fn floor_half(n: i64) -> i64 {
    n.div_euclid(2)
}
