//! PNG encoding of rendered canvases.

use thiserror::Error;

use crate::canvas::Canvas;

#[derive(Debug, Error)]
pub enum EncodeError {
    /// PNG cannot hold an image without pixels
    #[error("cannot encode an empty {width}x{height} image")]
    EmptyImage { width: u32, height: u32 },
    #[error("png encoding failed: {0}")]
    Png(#[from] png::EncodingError),
}

/// Encode the canvas as an 8-bit RGB PNG.
pub fn encode_png(canvas: &Canvas) -> Result<Vec<u8>, EncodeError> {
    if canvas.is_empty() {
        return Err(EncodeError::EmptyImage {
            width: canvas.width(),
            height: canvas.height(),
        });
    }

    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, canvas.width(), canvas.height());
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&canvas.to_rgb_bytes())?;
        writer.finish()?;
    }
    Ok(out)
}
