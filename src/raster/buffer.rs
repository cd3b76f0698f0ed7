use image::{imageops, ImageBuffer, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::error::{InputError, Result};
use crate::raster::color::Color;

/// Resampling kernel used when a buffer is scaled to a new size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResampleFilter {
    Nearest,
    #[default]
    Triangle,
    CatmullRom,
    Lanczos3,
}

impl ResampleFilter {
    fn to_image_filter(self) -> imageops::FilterType {
        match self {
            ResampleFilter::Nearest => imageops::FilterType::Nearest,
            ResampleFilter::Triangle => imageops::FilterType::Triangle,
            ResampleFilter::CatmullRom => imageops::FilterType::CatmullRom,
            ResampleFilter::Lanczos3 => imageops::FilterType::Lanczos3,
        }
    }
}

/// A row-major RGBA8 raster.
///
/// This is a thin wrapper around an `image` RGBA buffer with the pixel access
/// the pipeline needs. Coordinates are signed so callers can hand in
/// positions that fall off the canvas; those are clipped, never an error.
#[derive(Clone, Debug, PartialEq)]
pub struct PixelBuffer {
    buffer: RgbaImage,
}

impl PixelBuffer {
    /// Create a fully transparent buffer
    pub fn new(width: u32, height: u32) -> Result<Self> {
        validate_dimensions(width, height)?;
        Ok(Self {
            buffer: ImageBuffer::new(width, height),
        })
    }

    /// Create a buffer filled with a single colour
    pub fn filled(width: u32, height: u32, color: Color) -> Result<Self> {
        let mut buffer = Self::new(width, height)?;
        buffer.fill(color);
        Ok(buffer)
    }

    /// Wrap raw RGBA8 bytes (`width * height * 4` of them)
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        validate_dimensions(width, height)?;
        let expected = width as usize * height as usize * 4;
        let actual = data.len();
        ImageBuffer::from_raw(width, height, data)
            .map(|buffer| Self { buffer })
            .ok_or_else(|| {
                InputError::BufferSizeMismatch {
                    width,
                    height,
                    expected,
                    actual,
                }
                .into()
            })
    }

    /// Wrap a decoded image
    pub fn from_image(buffer: RgbaImage) -> Result<Self> {
        validate_dimensions(buffer.width(), buffer.height())?;
        Ok(Self { buffer })
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.buffer.dimensions()
    }

    /// Get the underlying image buffer
    pub fn as_image(&self) -> &RgbaImage {
        &self.buffer
    }

    pub fn into_image(self) -> RgbaImage {
        self.buffer
    }

    /// Raw RGBA bytes, row-major
    pub fn as_raw(&self) -> &[u8] {
        self.buffer.as_raw()
    }

    /// Mutable raw RGBA bytes, row-major
    pub fn as_raw_mut(&mut self) -> &mut [u8] {
        &mut self.buffer
    }

    /// Bytes per row
    pub fn stride(&self) -> usize {
        self.width() as usize * 4
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width() && (y as u32) < self.height()
    }

    /// Overwrite every pixel with `color`
    pub fn fill(&mut self, color: Color) {
        let px = color.to_rgba8();
        for pixel in self.buffer.pixels_mut() {
            *pixel = Rgba(px);
        }
    }

    /// Colour at `(x, y)`; transparent outside the buffer
    pub fn get_pixel(&self, x: i32, y: i32) -> Color {
        self.get_rgba(x, y)
            .map(Color::from_rgba8)
            .unwrap_or(Color::TRANSPARENT)
    }

    /// Stored samples at `(x, y)`
    pub fn get_rgba(&self, x: i32, y: i32) -> Option<[u8; 4]> {
        if !self.contains(x, y) {
            return None;
        }
        Some(self.buffer.get_pixel(x as u32, y as u32).0)
    }

    /// Store `color` at `(x, y)` without blending
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        self.set_rgba(x, y, color.to_rgba8());
    }

    pub fn set_rgba(&mut self, x: i32, y: i32, px: [u8; 4]) {
        if self.contains(x, y) {
            self.buffer.put_pixel(x as u32, y as u32, Rgba(px));
        }
    }

    /// Store `color` over a `w`x`h` block, clipped to the buffer
    pub fn block_fill(&mut self, x: i32, y: i32, w: u32, h: u32, color: Color) {
        let px = color.to_rgba8();
        let x0 = x.max(0) as i64;
        let y0 = y.max(0) as i64;
        let x1 = (i64::from(x) + i64::from(w)).min(i64::from(self.width()));
        let y1 = (i64::from(y) + i64::from(h)).min(i64::from(self.height()));
        for row in y0..y1 {
            for col in x0..x1 {
                self.buffer.put_pixel(col as u32, row as u32, Rgba(px));
            }
        }
    }

    /// Resample `src` to `dest_w`x`dest_h` and copy it in at `(dx, dy)`.
    ///
    /// Replaces the covered pixels; anything falling outside is clipped.
    pub fn draw_buffer(&mut self, src: &PixelBuffer, dx: i32, dy: i32, dest_w: u32, dest_h: u32) {
        if dest_w == 0 || dest_h == 0 {
            return;
        }
        let scaled;
        let source = if src.dimensions() == (dest_w, dest_h) {
            src
        } else {
            scaled = src.resampled(dest_w, dest_h, ResampleFilter::Triangle);
            &scaled
        };

        for sy in 0..dest_h {
            let ty = i64::from(dy) + i64::from(sy);
            if ty < 0 || ty >= i64::from(self.height()) {
                continue;
            }
            for sx in 0..dest_w {
                let tx = i64::from(dx) + i64::from(sx);
                if tx < 0 || tx >= i64::from(self.width()) {
                    continue;
                }
                let px = *source.buffer.get_pixel(sx, sy);
                self.buffer.put_pixel(tx as u32, ty as u32, px);
            }
        }
    }

    /// A copy scaled to exactly `width`x`height`
    pub fn resampled(&self, width: u32, height: u32, filter: ResampleFilter) -> PixelBuffer {
        if self.dimensions() == (width, height) {
            return self.clone();
        }
        PixelBuffer {
            buffer: imageops::resize(&self.buffer, width, height, filter.to_image_filter()),
        }
    }

    /// Premultiplied `[0, 1]` sample at a fractional position.
    ///
    /// Pixel centres sit at `x + 0.5`; outside the buffer reads as
    /// transparent so shifted or rotated draws fade out at the edges.
    pub fn sample_bilinear(&self, x: f32, y: f32) -> [f32; 4] {
        let fx = x - 0.5;
        let fy = y - 0.5;
        let x0 = fx.floor();
        let y0 = fy.floor();
        let tx = fx - x0;
        let ty = fy - y0;
        let (x0, y0) = (x0 as i32, y0 as i32);

        let mut out = [0.0f32; 4];
        let taps = [
            (x0, y0, (1.0 - tx) * (1.0 - ty)),
            (x0 + 1, y0, tx * (1.0 - ty)),
            (x0, y0 + 1, (1.0 - tx) * ty),
            (x0 + 1, y0 + 1, tx * ty),
        ];
        for (sx, sy, w) in taps {
            if w <= 0.0 {
                continue;
            }
            if let Some(px) = self.get_rgba(sx, sy) {
                let a = f32::from(px[3]) / 255.0;
                out[0] += f32::from(px[0]) / 255.0 * a * w;
                out[1] += f32::from(px[1]) / 255.0 * a * w;
                out[2] += f32::from(px[2]) / 255.0 * a * w;
                out[3] += a * w;
            }
        }
        out
    }

    /// Store a premultiplied `[0, 1]` sample at `(x, y)`
    pub fn put_premultiplied(&mut self, x: i32, y: i32, p: [f32; 4]) {
        self.set_pixel(x, y, Color::from_premultiplied(p));
    }

    /// Mean colour of the pixels whose alpha exceeds `min_alpha` inside a rectangle
    pub fn average_color(&self, x: i32, y: i32, w: u32, h: u32, min_alpha: u8) -> Option<Color> {
        let mut sum = [0u64; 3];
        let mut count = 0u64;
        for row in y..y.saturating_add(h as i32) {
            for col in x..x.saturating_add(w as i32) {
                if let Some(px) = self.get_rgba(col, row) {
                    if px[3] > min_alpha {
                        sum[0] += u64::from(px[0]);
                        sum[1] += u64::from(px[1]);
                        sum[2] += u64::from(px[2]);
                        count += 1;
                    }
                }
            }
        }
        if count == 0 {
            return None;
        }
        Some(Color::rgb(
            (sum[0] / count) as u8,
            (sum[1] / count) as u8,
            (sum[2] / count) as u8,
        ))
    }

    /// Whether every pixel is fully opaque
    pub fn is_opaque(&self) -> bool {
        self.buffer.pixels().all(|p| p[3] == 255)
    }
}

fn validate_dimensions(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(InputError::InvalidDimensions { width, height }.into());
    }
    Ok(())
}
