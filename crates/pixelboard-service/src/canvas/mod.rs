//! Raster canvas and its drawing primitives

pub mod text;

use pixelboard_common::PixelColor;

/// Opaque RGB raster image.
///
/// Every drawing primitive takes signed image-space coordinates and clips
/// them against the canvas, so callers never have to bound-check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Canvas {
    width: u32,
    height: u32,
    // Pixel data stored as a flat array.
    // Cell (x, y) is at index (y * width + x)
    data: Box<[PixelColor]>,
}

impl Canvas {
    /// Create a new canvas of the given size, filled with `background`.
    pub fn new(width: u32, height: u32, background: PixelColor) -> Self {
        let data = vec![background; (width as usize) * (height as usize)].into_boxed_slice();
        Self {
            width,
            height,
            data,
        }
    }

    /// Get the width of the canvas.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get the height of the canvas.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Check if the canvas has no pixel at all.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn index(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return None;
        }
        Some((y as usize) * (self.width as usize) + (x as usize))
    }

    /// Get the pixel color at the given coordinates.
    pub fn get_pixel(&self, x: i64, y: i64) -> Option<PixelColor> {
        self.index(x, y).map(|index| self.data[index])
    }

    /// Set the pixel color at the given coordinates.
    ///
    /// Returns false (and does nothing) if the coordinates are out of bounds.
    pub fn set_pixel(&mut self, x: i64, y: i64, color: PixelColor) -> bool {
        match self.index(x, y) {
            Some(index) => {
                self.data[index] = color;
                true
            }
            None => false,
        }
    }

    /// Composite `color` with the given opacity over the pixel at (x, y).
    pub fn blend_pixel(&mut self, x: i64, y: i64, color: PixelColor, alpha: u8) {
        let Some(index) = self.index(x, y) else {
            return;
        };
        self.data[index] = blend(self.data[index], color, alpha);
    }

    /// Fill a `w` x `h` rectangle whose top-left corner is (x, y).
    ///
    /// The rectangle is clipped against the canvas.
    pub fn fill_rect(&mut self, x: i64, y: i64, w: i64, h: i64, color: PixelColor) {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = x.saturating_add(w).min(self.width as i64);
        let y1 = y.saturating_add(h).min(self.height as i64);
        if x0 >= x1 || y0 >= y1 {
            return;
        }

        let stride = self.width as usize;
        for row in y0..y1 {
            let start = (row as usize) * stride;
            self.data[start + x0 as usize..start + x1 as usize].fill(color);
        }
    }

    /// Blend a filled disc of radius `radius` centered on (cx, cy).
    ///
    /// A pixel belongs to the disc when its center lies within the radius.
    pub fn fill_disc(&mut self, cx: f64, cy: f64, radius: f64, color: PixelColor, alpha: u8) {
        if radius <= 0.0 || alpha == 0 {
            return;
        }
        let x0 = (cx - radius).floor() as i64;
        let x1 = (cx + radius).ceil() as i64;
        let y0 = (cy - radius).floor() as i64;
        let y1 = (cy + radius).ceil() as i64;
        let r2 = radius * radius;

        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = x as f64 + 0.5 - cx;
                let dy = y as f64 + 0.5 - cy;
                if dx * dx + dy * dy <= r2 {
                    self.blend_pixel(x, y, color, alpha);
                }
            }
        }
    }

    /// Raw pixel data, 3 bytes per pixel, row-major.
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.data.len() * 3);
        for color in self.data.iter() {
            bytes.extend_from_slice(&[color.r, color.g, color.b]);
        }
        bytes
    }
}

/// Source-over compositing of `top` (with opacity `alpha`) on an opaque `bottom`.
fn blend(bottom: PixelColor, top: PixelColor, alpha: u8) -> PixelColor {
    match alpha {
        0 => bottom,
        255 => top,
        _ => {
            let a = alpha as u32;
            let inv = 255 - a;
            let mix = |b: u8, t: u8| ((b as u32 * inv + t as u32 * a + 127) / 255) as u8;
            PixelColor {
                r: mix(bottom.r, top.r),
                g: mix(bottom.g, top.g),
                b: mix(bottom.b, top.b),
            }
        }
    }
}

/// Convert an opacity in `[0, 1]` to an 8-bit alpha.
pub const fn alpha(opacity: f32) -> u8 {
    // `as` saturates, so out-of-range opacities end up clamped
    (opacity * 255.0 + 0.5) as u8
}
