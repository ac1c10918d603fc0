//! Diagnostic images, rendered in place of a board that cannot be drawn.

use core::fmt::Display;

use pixelboard_common::colors;

use crate::canvas::Canvas;
use crate::canvas::text::TextRaster;

pub const DIAGNOSTIC_WIDTH: u32 = 250;
pub const DIAGNOSTIC_HEIGHT: u32 = 100;

/// Reason why a board could not be rendered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Diagnostic {
    /// No configuration is stored for the board
    SettingsNotFound,
    /// The board has a negative (or unrenderable) dimension
    InvalidBoardSize,
}

impl Diagnostic {
    pub fn message(self) -> &'static str {
        match self {
            Diagnostic::SettingsNotFound => "[!] Settings not found",
            Diagnostic::InvalidBoardSize => "[!] Invalid board size",
        }
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.message())
    }
}

/// Render the fixed-size image describing `diagnostic`.
///
/// White background, message in black, centered on a single line.
pub fn diagnostic_image<F: TextRaster + ?Sized>(diagnostic: Diagnostic, font: &F) -> Canvas {
    let mut canvas = Canvas::new(DIAGNOSTIC_WIDTH, DIAGNOSTIC_HEIGHT, colors::WHITE);
    let message = diagnostic.message();
    let metrics = font.measure(message);

    let x = (DIAGNOSTIC_WIDTH as i64 - metrics.width as i64) / 2;
    let baseline =
        (DIAGNOSTIC_HEIGHT as i64 + metrics.ascent as i64 - metrics.descent as i64) / 2;
    font.draw(&mut canvas, x, baseline, message, colors::BLACK, 255);
    canvas
}
