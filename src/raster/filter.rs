use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{FilterError, Result};
use crate::raster::buffer::PixelBuffer;
use crate::raster::color::{hsl_to_rgb, rgb_to_hsl, unit_to_u8, Color};

/// Number of box passes used to approximate a Gaussian
const BOX_PASSES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorChannel {
    Red,
    Green,
    Blue,
}

/// A single image filter.
///
/// The colour filters follow the usual image-filter definitions: linear
/// channel transforms around a pivot for contrast/brightness, luminance
/// weighted matrices for saturate/grayscale/sepia, HSL rotation for hue.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "filter", content = "value", rename_all = "snake_case")]
pub enum Filter {
    /// Gaussian blur, standard deviation in pixels
    Blur(f32),
    Contrast(f32),
    Brightness(f32),
    Saturate(f32),
    Grayscale(f32),
    /// Hue rotation in degrees
    HueRotate(f32),
    Sepia(f32),
    /// Keep one colour channel, zero the other two
    Channel(ColorChannel),
}

impl Filter {
    pub fn name(&self) -> &'static str {
        match self {
            Filter::Blur(_) => "blur",
            Filter::Contrast(_) => "contrast",
            Filter::Brightness(_) => "brightness",
            Filter::Saturate(_) => "saturate",
            Filter::Grayscale(_) => "grayscale",
            Filter::HueRotate(_) => "hue_rotate",
            Filter::Sepia(_) => "sepia",
            Filter::Channel(_) => "channel",
        }
    }

    pub fn validate(&self) -> Result<()> {
        let reject = |value: f32, reason: &str| -> Result<()> {
            Err(FilterError::InvalidParameter {
                filter: self.name().to_string(),
                value,
                reason: reason.to_string(),
            }
            .into())
        };
        match *self {
            Filter::Blur(v) | Filter::Contrast(v) | Filter::Brightness(v) | Filter::Saturate(v) => {
                if !v.is_finite() {
                    return reject(v, "must be finite");
                }
                if v < 0.0 {
                    return reject(v, "must not be negative");
                }
            }
            Filter::Grayscale(v) | Filter::Sepia(v) => {
                if !(0.0..=1.0).contains(&v) {
                    return reject(v, "amount must lie in [0, 1]");
                }
            }
            Filter::HueRotate(v) => {
                if !v.is_finite() {
                    return reject(v, "must be finite");
                }
            }
            Filter::Channel(_) => {}
        }
        Ok(())
    }

    fn is_spatial(&self) -> bool {
        matches!(self, Filter::Blur(_))
    }

    /// Apply a per-pixel filter to unpremultiplied `[0, 1]` RGB
    fn apply_rgb(&self, rgb: [f32; 3]) -> [f32; 3] {
        let out = match *self {
            Filter::Blur(_) => rgb,
            Filter::Brightness(b) => rgb.map(|c| c * b),
            Filter::Contrast(c) => rgb.map(|v| (v - 0.5) * c + 0.5),
            Filter::Saturate(s) => mat3(
                [
                    [0.213 + 0.787 * s, 0.715 - 0.715 * s, 0.072 - 0.072 * s],
                    [0.213 - 0.213 * s, 0.715 + 0.285 * s, 0.072 - 0.072 * s],
                    [0.213 - 0.213 * s, 0.715 - 0.715 * s, 0.072 + 0.928 * s],
                ],
                rgb,
            ),
            Filter::Grayscale(amount) => {
                let g = 1.0 - amount;
                mat3(
                    [
                        [0.2126 + 0.7874 * g, 0.7152 - 0.7152 * g, 0.0722 - 0.0722 * g],
                        [0.2126 - 0.2126 * g, 0.7152 + 0.2848 * g, 0.0722 - 0.0722 * g],
                        [0.2126 - 0.2126 * g, 0.7152 - 0.7152 * g, 0.0722 + 0.9278 * g],
                    ],
                    rgb,
                )
            }
            Filter::Sepia(amount) => {
                let g = 1.0 - amount;
                mat3(
                    [
                        [0.393 + 0.607 * g, 0.769 - 0.769 * g, 0.189 - 0.189 * g],
                        [0.349 - 0.349 * g, 0.686 + 0.314 * g, 0.168 - 0.168 * g],
                        [0.272 - 0.272 * g, 0.534 - 0.534 * g, 0.131 + 0.869 * g],
                    ],
                    rgb,
                )
            }
            Filter::HueRotate(degrees) => {
                let (h, s, l) = rgb_to_hsl(rgb[0], rgb[1], rgb[2]);
                let h = (h + degrees / 360.0).rem_euclid(1.0);
                let (r, g, b) = hsl_to_rgb(h, s, l);
                [r, g, b]
            }
            Filter::Channel(channel) => match channel {
                ColorChannel::Red => [rgb[0], 0.0, 0.0],
                ColorChannel::Green => [0.0, rgb[1], 0.0],
                ColorChannel::Blue => [0.0, 0.0, rgb[2]],
            },
        };
        out.map(|c| c.clamp(0.0, 1.0))
    }
}

fn mat3(m: [[f32; 3]; 3], v: [f32; 3]) -> [f32; 3] {
    [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
        m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
    ]
}

/// An ordered list of filters applied to a copy of a source image
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterChain {
    filters: Vec<Filter>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_filters(filters: Vec<Filter>) -> Self {
        Self { filters }
    }

    pub fn with(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn blur(self, radius: f32) -> Self {
        self.with(Filter::Blur(radius))
    }

    pub fn contrast(self, factor: f32) -> Self {
        self.with(Filter::Contrast(factor))
    }

    pub fn brightness(self, factor: f32) -> Self {
        self.with(Filter::Brightness(factor))
    }

    pub fn saturate(self, factor: f32) -> Self {
        self.with(Filter::Saturate(factor))
    }

    pub fn grayscale(self, amount: f32) -> Self {
        self.with(Filter::Grayscale(amount))
    }

    pub fn hue_rotate(self, degrees: f32) -> Self {
        self.with(Filter::HueRotate(degrees))
    }

    pub fn sepia(self, amount: f32) -> Self {
        self.with(Filter::Sepia(amount))
    }

    pub fn channel(self, channel: ColorChannel) -> Self {
        self.with(Filter::Channel(channel))
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn validate(&self) -> Result<()> {
        self.filters.iter().try_for_each(Filter::validate)
    }

    /// Copy of the chain with blur radii multiplied by `factor`
    pub fn scaled(&self, factor: f32) -> FilterChain {
        let filters = self
            .filters
            .iter()
            .map(|f| match *f {
                Filter::Blur(r) => Filter::Blur(r * factor),
                other => other,
            })
            .collect();
        FilterChain { filters }
    }

    /// Run the chain over a copy of `source`; the source is never touched
    pub fn apply(&self, source: &PixelBuffer) -> Result<PixelBuffer> {
        self.validate()?;
        let mut out = source.clone();
        let mut pending: Vec<Filter> = Vec::new();
        for filter in &self.filters {
            if filter.is_spatial() {
                apply_pixel_filters(&mut out, &pending);
                pending.clear();
                if let Filter::Blur(sigma) = *filter {
                    out = gaussian_blur(&out, sigma);
                }
            } else {
                pending.push(*filter);
            }
        }
        apply_pixel_filters(&mut out, &pending);
        Ok(out)
    }

    /// Run the per-pixel filters on a single colour.
    ///
    /// Blur leaves a uniform colour field unchanged, so it is skipped.
    pub fn apply_to_color(&self, color: Color) -> Result<Color> {
        self.validate()?;
        let mut rgb = [
            f32::from(color.r) / 255.0,
            f32::from(color.g) / 255.0,
            f32::from(color.b) / 255.0,
        ];
        for filter in &self.filters {
            rgb = filter.apply_rgb(rgb);
        }
        Ok(Color::rgba(
            unit_to_u8(rgb[0]),
            unit_to_u8(rgb[1]),
            unit_to_u8(rgb[2]),
            color.alpha,
        ))
    }
}

/// Apply consecutive per-pixel filters in a single row-parallel pass
fn apply_pixel_filters(buffer: &mut PixelBuffer, filters: &[Filter]) {
    if filters.is_empty() {
        return;
    }
    buffer.as_raw_mut().par_chunks_mut(4).for_each(|px| {
        if px[3] == 0 {
            return;
        }
        let mut rgb = [
            f32::from(px[0]) / 255.0,
            f32::from(px[1]) / 255.0,
            f32::from(px[2]) / 255.0,
        ];
        for filter in filters {
            rgb = filter.apply_rgb(rgb);
        }
        px[0] = unit_to_u8(rgb[0]);
        px[1] = unit_to_u8(rgb[1]);
        px[2] = unit_to_u8(rgb[2]);
    });
}

/// Box widths whose repeated application approximates a Gaussian of `sigma`
fn box_sizes(sigma: f32, passes: usize) -> Vec<usize> {
    let n = passes as f32;
    let ideal = (12.0 * sigma * sigma / n + 1.0).sqrt();
    let mut lower = ideal.floor() as i64;
    if lower % 2 == 0 {
        lower -= 1;
    }
    let lower = lower.max(1);
    let upper = lower + 2;
    let l = lower as f32;
    let m = ((12.0 * sigma * sigma - n * l * l - 4.0 * n * l - 3.0 * n) / (-4.0 * l - 4.0)).round();
    (0..passes)
        .map(|i| if (i as f32) < m { lower as usize } else { upper as usize })
        .collect()
}

/// Gaussian blur approximated by three box passes per axis.
///
/// Works on premultiplied values so transparent pixels do not bleed black,
/// and clamps at the edges. Rows run in parallel; the vertical pass runs on
/// a transposed copy so every pass sees complete rows and tiles never seam.
pub fn gaussian_blur(source: &PixelBuffer, sigma: f32) -> PixelBuffer {
    if sigma <= 0.0 {
        return source.clone();
    }
    let (w, h) = (source.width() as usize, source.height() as usize);
    let radii: Vec<usize> = box_sizes(sigma, BOX_PASSES).into_iter().map(|s| (s - 1) / 2).collect();
    if radii.iter().all(|&r| r == 0) {
        return source.clone();
    }

    let mut plane: Vec<[f32; 4]> = source
        .as_raw()
        .par_chunks(4)
        .map(|px| Color::from_rgba8([px[0], px[1], px[2], px[3]]).premultiplied())
        .collect();

    blur_rows(&mut plane, w, &radii);
    let mut transposed = transpose(&plane, w, h);
    blur_rows(&mut transposed, h, &radii);
    let plane = transpose(&transposed, h, w);

    let mut out = source.clone();
    out.as_raw_mut()
        .par_chunks_mut(4)
        .zip(plane.par_iter())
        .for_each(|(px, p)| px.copy_from_slice(&Color::from_premultiplied(*p).to_rgba8()));
    out
}

fn blur_rows(plane: &mut [[f32; 4]], width: usize, radii: &[usize]) {
    plane.par_chunks_mut(width).for_each(|row| {
        let mut scratch = vec![[0.0f32; 4]; row.len()];
        for &radius in radii {
            if radius > 0 {
                box_blur_row(row, &mut scratch, radius);
                row.copy_from_slice(&scratch);
            }
        }
    });
}

/// Sliding-window box blur of one row with clamped edges
fn box_blur_row(row: &[[f32; 4]], out: &mut [[f32; 4]], radius: usize) {
    let n = row.len() as i64;
    let r = radius as i64;
    let at = |i: i64| row[i.clamp(0, n - 1) as usize];
    let norm = 1.0 / (2 * radius + 1) as f32;

    let mut sum = [0.0f32; 4];
    for j in -r..=r {
        let p = at(j);
        for c in 0..4 {
            sum[c] += p[c];
        }
    }
    for i in 0..n {
        out[i as usize] = sum.map(|s| s * norm);
        let add = at(i + r + 1);
        let sub = at(i - r);
        for c in 0..4 {
            sum[c] += add[c] - sub[c];
        }
    }
}

fn transpose(plane: &[[f32; 4]], width: usize, height: usize) -> Vec<[f32; 4]> {
    let mut out = vec![[0.0f32; 4]; plane.len()];
    out.par_chunks_mut(height).enumerate().for_each(|(x, column)| {
        for (y, cell) in column.iter_mut().enumerate() {
            *cell = plane[y * width + x];
        }
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StylizerError;

    #[test]
    fn test_negative_blur_is_invalid() {
        let err = FilterChain::new().blur(-1.0).validate().unwrap_err();
        assert!(matches!(err, StylizerError::Filter(FilterError::InvalidParameter { .. })));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_out_of_range_amounts_rejected() {
        assert!(FilterChain::new().grayscale(1.5).validate().is_err());
        assert!(FilterChain::new().sepia(-0.1).validate().is_err());
        assert!(FilterChain::new().contrast(f32::NAN).validate().is_err());
        assert!(FilterChain::new().contrast(5.0).brightness(0.0).validate().is_ok());
    }

    #[test]
    fn test_apply_leaves_source_untouched() {
        let source = PixelBuffer::filled(4, 4, Color::rgb(100, 150, 200)).unwrap();
        let out = FilterChain::new().brightness(0.5).apply(&source).unwrap();
        assert_eq!(source.get_pixel(0, 0), Color::rgb(100, 150, 200));
        assert_eq!(out.get_pixel(0, 0), Color::rgb(50, 75, 100));
    }

    #[test]
    fn test_contrast_pivots_around_middle_grey() {
        // contrast 3 maps v to 3v - 255 before clamping
        let c = FilterChain::new().contrast(3.0);
        assert_eq!(c.apply_to_color(Color::rgb(32, 100, 255)).unwrap(), Color::rgb(0, 45, 255));
        let zero = FilterChain::new().brightness(0.0).contrast(5.0);
        assert_eq!(zero.apply_to_color(Color::WHITE).unwrap(), Color::BLACK);
    }

    #[test]
    fn test_grayscale_equalizes_channels() {
        let out = FilterChain::new().grayscale(1.0).apply_to_color(Color::rgb(255, 0, 0)).unwrap();
        assert_eq!(out.r, out.g);
        assert_eq!(out.g, out.b);
        assert_eq!(out.r, 54);
    }

    #[test]
    fn test_identity_settings() {
        let color = Color::rgb(12, 99, 201);
        let chain = FilterChain::new().saturate(1.0).sepia(0.0).hue_rotate(0.0).grayscale(0.0);
        assert_eq!(chain.apply_to_color(color).unwrap(), color);
    }

    #[test]
    fn test_hue_rotate_red_to_green() {
        let out = FilterChain::new().hue_rotate(120.0).apply_to_color(Color::rgb(255, 0, 0)).unwrap();
        assert_eq!(out, Color::rgb(0, 255, 0));
    }

    #[test]
    fn test_channel_isolation() {
        let out = FilterChain::new()
            .channel(ColorChannel::Blue)
            .apply_to_color(Color::rgb(10, 20, 30))
            .unwrap();
        assert_eq!(out, Color::rgb(0, 0, 30));
    }

    #[test]
    fn test_blur_spreads_and_conserves_uniform_fields() {
        let uniform = PixelBuffer::filled(16, 16, Color::rgb(40, 80, 120)).unwrap();
        assert_eq!(gaussian_blur(&uniform, 3.0), uniform);

        let mut dot = PixelBuffer::filled(21, 21, Color::BLACK).unwrap();
        dot.set_pixel(10, 10, Color::WHITE);
        let blurred = gaussian_blur(&dot, 2.0);
        assert!(blurred.get_pixel(10, 10).r < 255);
        assert!(blurred.get_pixel(11, 10).r > 0);
        assert_eq!(blurred.get_pixel(0, 0).r, 0);
        assert_eq!(blurred.dimensions(), (21, 21));
    }

    #[test]
    fn test_box_sizes_grow_with_sigma() {
        assert_eq!(box_sizes(0.1, 3), vec![1, 1, 1]);
        let small: usize = box_sizes(2.0, 3).iter().sum();
        let large: usize = box_sizes(20.0, 3).iter().sum();
        assert!(large > small);
    }
}
