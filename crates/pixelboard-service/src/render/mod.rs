//! Board renderer: replays a draw log into a raster image.
//!
//! Rendering steps:
//! 1. Validate the board configuration (diagnostic image otherwise)
//! 2. Size and clear the canvas
//! 3. Optionally draw the reference grid: dots and axis labels
//! 4. Replay the draw events in log order, later events win

pub mod coords;
pub mod fallback;
pub mod grid;
pub mod labels;


use log::{debug, trace};
use pixelboard_common::{BoardConfig, BoardId, DrawEvent, colors};

use crate::canvas::Canvas;
use crate::canvas::text::{BlockFont, TextRaster};
use crate::render::coords::{GridTransform, Rect, cell_rect};
use crate::render::fallback::{Diagnostic, diagnostic_image};
use crate::store::{BoardStore, StoreError};

/// Edge length of a board cell, in image pixels.
pub const PIXEL_SCALE: u32 = 25;

/// Margin around the board when the grid is drawn, in image pixels.
pub const PADDING: u32 = 75;

/// Largest number of pixels the renderer will allocate for a board image.
///
/// Covers every board of up to [BoardConfig::MAX_AREA] cells, grid included.
pub const MAX_IMAGE_PIXELS: u64 = 50_000_000;

/// Block font scale of the axis labels.
const LABEL_FONT_SCALE: u32 = 3;

/// Block font scale of the diagnostic messages.
const MESSAGE_FONT_SCALE: u32 = 2;

/// Size of the image of a board, or the reason it cannot be rendered.
pub fn image_size(config: &BoardConfig, grid: bool) -> Result<(u32, u32), Diagnostic> {
    if !config.is_valid() {
        return Err(Diagnostic::InvalidBoardSize);
    }
    let padding = if grid { 2 * PADDING as u64 } else { 0 };
    let side = |cells: i32| cells as u64 * PIXEL_SCALE as u64 + padding;
    let (width, height) = (side(config.width), side(config.height));
    if width.saturating_mul(height) > MAX_IMAGE_PIXELS {
        return Err(Diagnostic::InvalidBoardSize);
    }
    match (u32::try_from(width), u32::try_from(height)) {
        (Ok(width), Ok(height)) => Ok((width, height)),
        _ => Err(Diagnostic::InvalidBoardSize),
    }
}

/// Stateless board renderer.
///
/// Holds only the fonts, every call produces a new canvas, so a single
/// renderer can be shared between threads.
#[derive(Clone, Debug)]
pub struct BoardRenderer<F = BlockFont> {
    label_font: F,
    message_font: F,
}

impl Default for BoardRenderer<BlockFont> {
    fn default() -> Self {
        Self::new(
            BlockFont::new(LABEL_FONT_SCALE),
            BlockFont::new(MESSAGE_FONT_SCALE),
        )
    }
}

impl<F: TextRaster> BoardRenderer<F> {
    pub fn new(label_font: F, message_font: F) -> Self {
        BoardRenderer {
            label_font,
            message_font,
        }
    }

    /// Fetch the board from `store` and render it.
    ///
    /// A missing or invalid board yields a diagnostic image, the draw log is
    /// only fetched for boards that can be rendered.
    pub fn render<S: BoardStore + ?Sized>(
        &self,
        store: &S,
        id: BoardId,
        grid: bool,
    ) -> Result<Canvas, StoreError> {
        let Some(config) = store.board_config(id)? else {
            debug!("Board {}: no settings", id);
            return Ok(self.diagnostic(Diagnostic::SettingsNotFound));
        };
        if let Err(diagnostic) = image_size(&config, grid) {
            debug!("Board {}: cannot render a {} board", id, config);
            return Ok(self.diagnostic(diagnostic));
        }

        let events = store.draw_log(id)?;
        debug!(
            "Board {}: rendering {} with {} events (grid: {})",
            id,
            config,
            events.len(),
            grid
        );
        Ok(self.render_board(Some(&config), &events, grid))
    }

    /// Render a board from its configuration and draw log.
    ///
    /// `config` is None when no configuration exists for the board.
    pub fn render_board(
        &self,
        config: Option<&BoardConfig>,
        events: &[DrawEvent],
        grid: bool,
    ) -> Canvas {
        let Some(config) = config else {
            return self.diagnostic(Diagnostic::SettingsNotFound);
        };
        let (width, height) = match image_size(config, grid) {
            Ok(size) => size,
            Err(diagnostic) => return self.diagnostic(diagnostic),
        };

        let mut canvas = Canvas::new(width, height, colors::WHITE);
        let range = config.grid_range();
        let offset = if grid { PADDING as i64 } else { 0 };
        let scale = PIXEL_SCALE as i64;

        if grid {
            let area = Rect::new(
                offset,
                offset,
                range.columns() * scale,
                range.rows() * scale,
            );
            match GridTransform::new(range, area) {
                Some(transform) => self.draw_decoration(&mut canvas, &transform),
                None => trace!("Degenerate {} board, grid skipped", config),
            }
        }

        for event in events {
            match cell_rect(&range, (offset, offset), scale, event.x, event.y) {
                Some(cell) => canvas.fill_rect(cell.x, cell.y, cell.w, cell.h, event.color),
                None => debug!(
                    "Skipping event #{} at ({}, {}): outside of the {} board",
                    event.sequence, event.x, event.y, config
                ),
            }
        }

        canvas
    }

    /// Render the image standing in for a board that cannot be drawn.
    pub fn diagnostic(&self, diagnostic: Diagnostic) -> Canvas {
        diagnostic_image(diagnostic, &self.message_font)
    }

    fn draw_decoration(&self, canvas: &mut Canvas, transform: &GridTransform) {
        grid::draw_dots(canvas, transform);
        let labels = labels::layout_labels(transform, &self.label_font);
        labels::draw_labels(canvas, &labels, &self.label_font);
    }
}
