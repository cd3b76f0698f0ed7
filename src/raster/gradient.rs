use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StyleError};
use crate::raster::blend::{blend_pixel, BlendMode};
use crate::raster::buffer::PixelBuffer;
use crate::raster::color::Color;
use crate::raster::mask::PixelRect;

/// One colour stop; `offset` is in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    pub offset: f32,
    pub color: Color,
}

impl ColorStop {
    pub const fn new(offset: f32, color: Color) -> Self {
        Self { offset, color }
    }
}

/// Gradient geometry, expressed as fractions of the canvas.
///
/// Points are `(x / width, y / height)`; radii are fractions of the width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GradientKind {
    Linear { from: (f32, f32), to: (f32, f32) },
    /// Concentric radial ramp between an inner and outer radius
    Radial { center: (f32, f32), inner: f32, outer: f32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gradient {
    pub kind: GradientKind,
    pub stops: Vec<ColorStop>,
}

impl Gradient {
    pub fn linear(from: (f32, f32), to: (f32, f32), stops: Vec<ColorStop>) -> Self {
        Self {
            kind: GradientKind::Linear { from, to },
            stops,
        }
    }

    pub fn radial(center: (f32, f32), inner: f32, outer: f32, stops: Vec<ColorStop>) -> Self {
        Self {
            kind: GradientKind::Radial { center, inner, outer },
            stops,
        }
    }

    /// Top-to-bottom ramp
    pub fn vertical(stops: Vec<ColorStop>) -> Self {
        Self::linear((0.0, 0.0), (0.0, 1.0), stops)
    }

    /// Top-left to bottom-right ramp
    pub fn diagonal(stops: Vec<ColorStop>) -> Self {
        Self::linear((0.0, 0.0), (1.0, 1.0), stops)
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| -> Result<()> {
            Err(StyleError::InvalidOp {
                op: "gradient".to_string(),
                reason: reason.to_string(),
            }
            .into())
        };
        if self.stops.is_empty() {
            return invalid("gradient needs at least one stop");
        }
        if self.stops.iter().any(|s| !(0.0..=1.0).contains(&s.offset)) {
            return invalid("stop offsets must lie in [0, 1]");
        }
        if self.stops.windows(2).any(|w| w[1].offset < w[0].offset) {
            return invalid("stop offsets must be ascending");
        }
        Ok(())
    }

    /// Interpolated colour at ramp position `t` (premultiplied interpolation)
    pub fn color_at(&self, t: f32) -> Color {
        let (first, last) = match (self.stops.first(), self.stops.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Color::TRANSPARENT,
        };
        if t <= first.offset {
            return first.color;
        }
        if t >= last.offset {
            return last.color;
        }
        for pair in self.stops.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            if t >= a.offset && t <= b.offset {
                let span = b.offset - a.offset;
                let f = if span <= f32::EPSILON { 1.0 } else { (t - a.offset) / span };
                let pa = a.color.premultiplied();
                let pb = b.color.premultiplied();
                let mixed = [
                    pa[0] + (pb[0] - pa[0]) * f,
                    pa[1] + (pb[1] - pa[1]) * f,
                    pa[2] + (pb[2] - pa[2]) * f,
                    pa[3] + (pb[3] - pa[3]) * f,
                ];
                return Color::from_premultiplied(mixed);
            }
        }
        last.color
    }

    /// Ramp position of the pixel centred at `(px, py)`
    pub fn position(&self, px: f32, py: f32, width: f32, height: f32) -> f32 {
        match self.kind {
            GradientKind::Linear { from, to } => {
                let (ax, ay) = (from.0 * width, from.1 * height);
                let (dx, dy) = (to.0 * width - ax, to.1 * height - ay);
                let len_sq = dx * dx + dy * dy;
                if len_sq <= f32::EPSILON {
                    return 0.0;
                }
                ((px - ax) * dx + (py - ay) * dy) / len_sq
            }
            GradientKind::Radial { center, inner, outer } => {
                let d = (px - center.0 * width).hypot(py - center.1 * height);
                let (r0, r1) = (inner * width, outer * width);
                if r1 - r0 <= f32::EPSILON {
                    return if d < r1 { 0.0 } else { 1.0 };
                }
                (d - r0) / (r1 - r0)
            }
        }
    }
}

/// Paint a gradient over the buffer (or a region of it) through a blend mode
pub fn fill_gradient(
    buffer: &mut PixelBuffer,
    gradient: &Gradient,
    mode: BlendMode,
    alpha: f32,
    region: Option<PixelRect>,
) {
    if alpha <= 0.0 || gradient.stops.is_empty() {
        return;
    }
    let (w, h) = (buffer.width() as f32, buffer.height() as f32);
    let full = PixelRect::full(buffer.width(), buffer.height());
    let region = region.and_then(|r| r.intersect(&full)).unwrap_or(full);
    let stride = buffer.stride();

    buffer
        .as_raw_mut()
        .par_chunks_mut(stride)
        .enumerate()
        .filter(|(y, _)| region.contains_row(*y as u32))
        .for_each(|(y, row)| {
            let py = y as f32 + 0.5;
            for x in region.x0..region.x1 {
                let t = gradient.position(x as f32 + 0.5, py, w, h);
                let color = gradient.color_at(t);
                let coverage = alpha * color.alpha;
                if coverage <= 0.0 {
                    continue;
                }
                let i = x as usize * 4;
                let d = [row[i], row[i + 1], row[i + 2], row[i + 3]];
                let src = [color.r, color.g, color.b, 255];
                row[i..i + 4].copy_from_slice(&blend_pixel(d, src, coverage, mode));
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn black_to_white() -> Vec<ColorStop> {
        vec![ColorStop::new(0.0, Color::BLACK), ColorStop::new(1.0, Color::WHITE)]
    }

    #[test]
    fn test_color_at_clamps_and_interpolates() {
        let g = Gradient::vertical(black_to_white());
        assert_eq!(g.color_at(-1.0), Color::BLACK);
        assert_eq!(g.color_at(2.0), Color::WHITE);
        assert_eq!(g.color_at(0.5), Color::rgb(128, 128, 128));
    }

    #[test]
    fn test_transparent_stop_does_not_darken() {
        let g = Gradient::vertical(vec![
            ColorStop::new(0.0, Color::WHITE),
            ColorStop::new(1.0, Color::TRANSPARENT),
        ]);
        let mid = g.color_at(0.5);
        assert_eq!((mid.r, mid.g, mid.b), (255, 255, 255));
        assert!((mid.alpha - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_vertical_fill_is_opaque_ramp() {
        let mut buffer = PixelBuffer::new(2, 10).unwrap();
        fill_gradient(
            &mut buffer,
            &Gradient::vertical(black_to_white()),
            BlendMode::Normal,
            1.0,
            None,
        );
        assert!(buffer.is_opaque());
        assert!(buffer.get_pixel(0, 0).r < buffer.get_pixel(0, 9).r);
    }

    #[test]
    fn test_radial_position() {
        let g = Gradient::radial((0.5, 0.5), 0.0, 0.5, black_to_white());
        assert_eq!(g.position(50.0, 50.0, 100.0, 100.0), 0.0);
        assert!((g.position(100.0, 50.0, 100.0, 100.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_validate_rejects_bad_stops() {
        assert!(Gradient::vertical(Vec::new()).validate().is_err());
        let descending = Gradient::vertical(vec![
            ColorStop::new(0.8, Color::BLACK),
            ColorStop::new(0.2, Color::WHITE),
        ]);
        assert!(descending.validate().is_err());
        assert!(Gradient::vertical(black_to_white()).validate().is_ok());
    }
}
