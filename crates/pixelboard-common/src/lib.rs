//! Types shared between the pixelboard store, renderer and service.

pub mod board;
pub mod events;

pub use board::{BoardConfig, BoardId, GridRange};
pub use events::{DrawEvent, PixelColor, colors};
