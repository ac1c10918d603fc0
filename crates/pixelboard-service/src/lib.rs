//! pixelboard-service: renders collaborative pixel boards as images.

pub mod canvas;
pub mod encode;
pub mod http;
pub mod render;
pub mod store;
