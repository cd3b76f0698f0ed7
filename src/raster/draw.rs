//! Anti-aliased vector primitives.
//!
//! Every primitive is first rasterized into a [`CoverageMask`] covering only
//! its bounding box, then painted through a [`Paint`]. Soft shapes stand in
//! for shapes drawn under a Gaussian blur: the edge profile is a smoothstep
//! over `±2σ` and the peak is attenuated for discs narrower than the blur.

use rayon::prelude::*;

use crate::raster::blend::{blend_pixel, BlendMode};
use crate::raster::buffer::PixelBuffer;
use crate::raster::color::Color;
use crate::raster::mask::{CoverageMask, PixelRect};

/// Segments longer than this are rasterized in pieces to keep masks small
const SEGMENT_CHUNK: f32 = 32.0;

/// Masks smaller than this many pixels are painted on the calling thread
pub(crate) const PARALLEL_AREA: u32 = 64 * 64;

/// Colour, layer alpha and blend mode used to paint a primitive
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paint {
    pub color: Color,
    pub alpha: f32,
    pub blend: BlendMode,
}

impl Paint {
    pub fn new(color: Color) -> Self {
        Self {
            color,
            alpha: 1.0,
            blend: BlendMode::Normal,
        }
    }

    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_blend(mut self, blend: BlendMode) -> Self {
        self.blend = blend;
        self
    }
}

/// A filled region
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Circle { cx: f32, cy: f32, radius: f32 },
    /// Disc as it looks after a Gaussian blur of standard deviation `blur`
    SoftCircle { cx: f32, cy: f32, radius: f32, blur: f32 },
    /// Axis-aligned ellipse, optionally blurred
    Ellipse { cx: f32, cy: f32, rx: f32, ry: f32, blur: f32 },
    /// Axis-aligned rectangle with exact fractional-pixel coverage
    Rect { x: f32, y: f32, w: f32, h: f32 },
    /// Simple polygon, even-odd fill, 4x supersampled
    Polygon(Vec<(f32, f32)>),
}

impl Shape {
    fn bounds(&self) -> (f32, f32, f32, f32) {
        match self {
            Shape::Circle { cx, cy, radius } => {
                let r = radius + 1.0;
                (cx - r, cy - r, cx + r, cy + r)
            }
            Shape::SoftCircle { cx, cy, radius, blur } => {
                let r = radius + 2.0 * blur + 1.0;
                (cx - r, cy - r, cx + r, cy + r)
            }
            Shape::Ellipse { cx, cy, rx, ry, blur } => {
                let pad = 2.0 * blur + 1.0;
                (cx - rx - pad, cy - ry - pad, cx + rx + pad, cy + ry + pad)
            }
            Shape::Rect { x, y, w, h } => (*x, *y, x + w, y + h),
            Shape::Polygon(points) => points.iter().fold(
                (f32::INFINITY, f32::INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
                |(x0, y0, x1, y1), &(px, py)| (x0.min(px), y0.min(py), x1.max(px), y1.max(py)),
            ),
        }
    }

    /// Coverage of the pixel whose centre is `(px, py)`
    pub fn coverage_at(&self, px: f32, py: f32) -> f32 {
        match self {
            Shape::Circle { cx, cy, radius } => {
                let d = (px - cx).hypot(py - cy);
                (radius - d + 0.5).clamp(0.0, 1.0)
            }
            Shape::SoftCircle { cx, cy, radius, blur } => {
                soft_disc((px - cx).hypot(py - cy), *radius, *blur)
            }
            Shape::Ellipse { cx, cy, rx, ry, blur } => {
                if *rx <= 0.0 || *ry <= 0.0 {
                    return 0.0;
                }
                // stretch y so the ellipse becomes a circle of radius rx
                let d = (px - cx).hypot((py - cy) * rx / ry);
                if *blur > 0.0 {
                    soft_disc(d, *rx, *blur)
                } else {
                    (rx - d + 0.5).clamp(0.0, 1.0)
                }
            }
            Shape::Rect { x, y, w, h } => {
                let ox = overlap(px - 0.5, px + 0.5, *x, x + w);
                let oy = overlap(py - 0.5, py + 0.5, *y, y + h);
                ox * oy
            }
            Shape::Polygon(points) => {
                const OFFSETS: [(f32, f32); 4] = [(-0.125, -0.375), (0.375, -0.125), (0.125, 0.375), (-0.375, 0.125)];
                let inside = OFFSETS
                    .iter()
                    .filter(|(ox, oy)| point_in_polygon(points, px + ox, py + oy))
                    .count();
                inside as f32 / OFFSETS.len() as f32
            }
        }
    }

    /// Rasterize onto a `width`x`height` canvas; `None` when nothing lands on it
    pub fn mask(&self, width: u32, height: u32) -> Option<CoverageMask> {
        if let Shape::Polygon(points) = self {
            if points.len() < 3 {
                return None;
            }
        }
        let (x0, y0, x1, y1) = self.bounds();
        let rect = PixelRect::from_bounds(x0, y0, x1, y1, width, height)?;
        let mut mask = CoverageMask::new(rect);
        mask.rasterize(|px, py| self.coverage_at(px, py));
        Some(mask)
    }
}

/// Coverage profile of a disc of radius `radius` under a Gaussian blur `sigma`
fn soft_disc(d: f32, radius: f32, sigma: f32) -> f32 {
    if sigma <= 0.0 {
        return (radius - d + 0.5).clamp(0.0, 1.0);
    }
    let peak = 1.0 - (-(radius * radius) / (2.0 * sigma * sigma)).exp();
    peak * (1.0 - smoothstep(radius - 2.0 * sigma, radius + 2.0 * sigma, d))
}

pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if edge1 <= edge0 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

fn overlap(a0: f32, a1: f32, b0: f32, b1: f32) -> f32 {
    (a1.min(b1) - a0.max(b0)).max(0.0)
}

fn point_in_polygon(points: &[(f32, f32)], x: f32, y: f32) -> bool {
    let mut inside = false;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let (xi, yi) = points[i];
        let (xj, yj) = points[j];
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn distance_to_segment(px: f32, py: f32, a: (f32, f32), b: (f32, f32)) -> f32 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq <= f32::EPSILON {
        0.0
    } else {
        (((px - a.0) * dx + (py - a.1) * dy) / len_sq).clamp(0.0, 1.0)
    };
    (px - (a.0 + t * dx)).hypot(py - (a.1 + t * dy))
}

/// Coverage mask of a stroked polyline with round joins and caps
pub fn stroke_mask(points: &[(f32, f32)], width: f32, closed: bool, canvas_w: u32, canvas_h: u32) -> Option<CoverageMask> {
    if points.len() < 2 || width <= 0.0 {
        return None;
    }
    let mut segments: Vec<((f32, f32), (f32, f32))> = points.windows(2).map(|w| (w[0], w[1])).collect();
    if closed {
        segments.push((points[points.len() - 1], points[0]));
    }

    let half = width / 2.0;
    let pad = half + 1.0;
    let mut pieces = Vec::new();
    for (a, b) in segments {
        let len = (b.0 - a.0).hypot(b.1 - a.1);
        let steps = (len / SEGMENT_CHUNK).ceil().max(1.0) as usize;
        for s in 0..steps {
            let t0 = s as f32 / steps as f32;
            let t1 = (s + 1) as f32 / steps as f32;
            let p0 = (a.0 + (b.0 - a.0) * t0, a.1 + (b.1 - a.1) * t0);
            let p1 = (a.0 + (b.0 - a.0) * t1, a.1 + (b.1 - a.1) * t1);
            let rect = PixelRect::from_bounds(
                p0.0.min(p1.0) - pad,
                p0.1.min(p1.1) - pad,
                p0.0.max(p1.0) + pad,
                p0.1.max(p1.1) + pad,
                canvas_w,
                canvas_h,
            );
            if let Some(rect) = rect {
                pieces.push((p0, p1, rect));
            }
        }
    }

    let bounds = pieces.iter().map(|(_, _, r)| *r).reduce(|acc, r| acc.union(&r))?;
    let mut mask = CoverageMask::new(bounds);
    for (p0, p1, rect) in pieces {
        for y in rect.y0..rect.y1 {
            for x in rect.x0..rect.x1 {
                let d = distance_to_segment(x as f32 + 0.5, y as f32 + 0.5, p0, p1);
                let c = half - d + 0.5;
                if c > 0.0 {
                    mask.accumulate(x, y, c);
                }
            }
        }
    }
    Some(mask)
}

/// Paint a coverage mask onto the buffer
pub fn paint_mask(buffer: &mut PixelBuffer, mask: &CoverageMask, paint: &Paint) {
    let alpha = paint.alpha * paint.color.alpha;
    if alpha <= 0.0 {
        return;
    }
    let rect = mask.rect();
    let stride = buffer.stride();
    let src = [paint.color.r, paint.color.g, paint.color.b, 255];
    let rows = &mut buffer.as_raw_mut()[rect.y0 as usize * stride..rect.y1 as usize * stride];
    let paint_row = |(offset, row): (usize, &mut [u8])| {
        let y = rect.y0 + offset as u32;
        for x in rect.x0..rect.x1 {
            let c = mask.coverage(x, y);
            if c <= 0.0 {
                continue;
            }
            let i = x as usize * 4;
            let d = [row[i], row[i + 1], row[i + 2], row[i + 3]];
            row[i..i + 4].copy_from_slice(&blend_pixel(d, src, c * alpha, paint.blend));
        }
    };
    if rect.width() * rect.height() < PARALLEL_AREA {
        rows.chunks_mut(stride).enumerate().for_each(paint_row);
    } else {
        rows.par_chunks_mut(stride).enumerate().for_each(paint_row);
    }
}

pub fn fill_shape(buffer: &mut PixelBuffer, shape: &Shape, paint: &Paint) {
    if let Some(mask) = shape.mask(buffer.width(), buffer.height()) {
        paint_mask(buffer, &mask, paint);
    }
}

pub fn stroke_polyline(buffer: &mut PixelBuffer, points: &[(f32, f32)], width: f32, closed: bool, paint: &Paint) {
    if let Some(mask) = stroke_mask(points, width, closed, buffer.width(), buffer.height()) {
        paint_mask(buffer, &mask, paint);
    }
}

pub fn stroke_line(buffer: &mut PixelBuffer, from: (f32, f32), to: (f32, f32), width: f32, paint: &Paint) {
    stroke_polyline(buffer, &[from, to], width, false, paint);
}

/// Outline of an axis-aligned rectangle
pub fn stroke_rect(buffer: &mut PixelBuffer, x: f32, y: f32, w: f32, h: f32, width: f32, paint: &Paint) {
    let corners = [(x, y), (x + w, y), (x + w, y + h), (x, y + h)];
    stroke_polyline(buffer, &corners, width, true, paint);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_fills_centre_not_corners() {
        let mut buffer = PixelBuffer::filled(20, 20, Color::WHITE).unwrap();
        fill_shape(
            &mut buffer,
            &Shape::Circle { cx: 10.0, cy: 10.0, radius: 5.0 },
            &Paint::new(Color::BLACK),
        );
        assert_eq!(buffer.get_pixel(10, 10), Color::BLACK);
        assert_eq!(buffer.get_pixel(0, 0), Color::WHITE);
        assert_eq!(buffer.get_pixel(19, 19), Color::WHITE);
    }

    #[test]
    fn test_fractional_rect_coverage() {
        let shape = Shape::Rect { x: 0.0, y: 0.0, w: 0.5, h: 1.0 };
        assert!((shape.coverage_at(0.5, 0.5) - 0.5).abs() < 1e-6);
        assert_eq!(shape.coverage_at(1.5, 0.5), 0.0);
    }

    #[test]
    fn test_soft_circle_fades_out() {
        let shape = Shape::SoftCircle { cx: 0.0, cy: 0.0, radius: 40.0, blur: 10.0 };
        let centre = shape.coverage_at(0.0, 0.0);
        let edge = shape.coverage_at(40.0, 0.0);
        let outside = shape.coverage_at(61.0, 0.0);
        assert!(centre > 0.99);
        assert!((edge - 0.5 * centre).abs() < 0.01);
        assert_eq!(outside, 0.0);
    }

    #[test]
    fn test_polygon_triangle() {
        let tri = Shape::Polygon(vec![(0.0, 0.0), (10.0, 0.0), (0.0, 10.0)]);
        assert_eq!(tri.coverage_at(2.5, 2.5), 1.0);
        assert_eq!(tri.coverage_at(8.5, 8.5), 0.0);
        assert!(Shape::Polygon(vec![(0.0, 0.0), (1.0, 1.0)]).mask(10, 10).is_none());
    }

    #[test]
    fn test_stroke_line_covers_path_only() {
        let mut buffer = PixelBuffer::filled(100, 10, Color::WHITE).unwrap();
        stroke_line(&mut buffer, (0.0, 5.0), (100.0, 5.0), 2.0, &Paint::new(Color::BLACK));
        assert_eq!(buffer.get_pixel(50, 4), Color::BLACK);
        assert_eq!(buffer.get_pixel(50, 5), Color::BLACK);
        assert_eq!(buffer.get_pixel(50, 0), Color::WHITE);
    }

    #[test]
    fn test_paint_alpha_and_blend() {
        let mut buffer = PixelBuffer::filled(4, 4, Color::rgb(200, 200, 200)).unwrap();
        let paint = Paint::new(Color::BLACK).with_alpha(0.5).with_blend(BlendMode::Multiply);
        fill_shape(&mut buffer, &Shape::Rect { x: 0.0, y: 0.0, w: 4.0, h: 4.0 }, &paint);
        assert_eq!(buffer.get_pixel(2, 2), Color::rgb(100, 100, 100));
    }

    #[test]
    fn test_offscreen_shapes_are_ignored() {
        let mut buffer = PixelBuffer::filled(4, 4, Color::WHITE).unwrap();
        let before = buffer.clone();
        fill_shape(
            &mut buffer,
            &Shape::Circle { cx: -50.0, cy: -50.0, radius: 3.0 },
            &Paint::new(Color::BLACK),
        );
        stroke_line(&mut buffer, (10.0, 10.0), (20.0, 20.0), 2.0, &Paint::new(Color::BLACK));
        assert_eq!(buffer, before);
    }
}
