use rayon::prelude::*;

use crate::raster::buffer::PixelBuffer;

/// Half-open pixel rectangle `[x0, x1) x [y0, y1)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl PixelRect {
    pub const fn new(x0: u32, y0: u32, x1: u32, y1: u32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// The whole of a `width`x`height` canvas
    pub const fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Pixels touched by a floating-point bounding box, clipped to the canvas
    pub fn from_bounds(min_x: f32, min_y: f32, max_x: f32, max_y: f32, width: u32, height: u32) -> Option<Self> {
        if !(min_x.is_finite() && min_y.is_finite() && max_x.is_finite() && max_y.is_finite()) {
            return None;
        }
        let clamp = |v: f32, hi: u32| v.clamp(0.0, hi as f32) as u32;
        let rect = Self::new(
            clamp(min_x.floor(), width),
            clamp(min_y.floor(), height),
            clamp(max_x.ceil(), width),
            clamp(max_y.ceil(), height),
        );
        (!rect.is_empty()).then_some(rect)
    }

    pub fn width(&self) -> u32 {
        self.x1.saturating_sub(self.x0)
    }

    pub fn height(&self) -> u32 {
        self.y1.saturating_sub(self.y0)
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x0 && x < self.x1 && y >= self.y0 && y < self.y1
    }

    pub fn contains_row(&self, y: u32) -> bool {
        y >= self.y0 && y < self.y1
    }

    pub fn intersect(&self, other: &PixelRect) -> Option<PixelRect> {
        let rect = Self::new(
            self.x0.max(other.x0),
            self.y0.max(other.y0),
            self.x1.min(other.x1),
            self.y1.min(other.y1),
        );
        (!rect.is_empty()).then_some(rect)
    }

    pub fn union(&self, other: &PixelRect) -> PixelRect {
        Self::new(
            self.x0.min(other.x0),
            self.y0.min(other.y0),
            self.x1.max(other.x1),
            self.y1.max(other.y1),
        )
    }
}

/// Per-pixel coverage in `[0, 1]` over a rectangle of the canvas.
///
/// Everything outside `rect` has zero coverage. Shapes accumulate into a
/// mask with `max`, so overlapping pieces of one shape never double up.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageMask {
    rect: PixelRect,
    data: Vec<f32>,
}

impl CoverageMask {
    pub fn new(rect: PixelRect) -> Self {
        Self {
            rect,
            data: vec![0.0; rect.width() as usize * rect.height() as usize],
        }
    }

    pub fn rect(&self) -> PixelRect {
        self.rect
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        self.rect
            .contains(x, y)
            .then(|| (y - self.rect.y0) as usize * self.rect.width() as usize + (x - self.rect.x0) as usize)
    }

    pub fn coverage(&self, x: u32, y: u32) -> f32 {
        self.index(x, y).map(|i| self.data[i]).unwrap_or(0.0)
    }

    /// Raise the coverage at `(x, y)` to at least `value`
    pub fn accumulate(&mut self, x: u32, y: u32, value: f32) {
        if let Some(i) = self.index(x, y) {
            let v = value.clamp(0.0, 1.0);
            if v > self.data[i] {
                self.data[i] = v;
            }
        }
    }

    /// Fill every pixel of the mask from a coverage function of the pixel centre
    pub fn rasterize<F>(&mut self, coverage: F)
    where
        F: Fn(f32, f32) -> f32 + Sync,
    {
        let rect = self.rect;
        let w = rect.width() as usize;
        if w == 0 {
            return;
        }
        let fill_row = |(row, cells): (usize, &mut [f32])| {
            let py = (rect.y0 as usize + row) as f32 + 0.5;
            for (col, cell) in cells.iter_mut().enumerate() {
                let px = (rect.x0 as usize + col) as f32 + 0.5;
                let v = coverage(px, py).clamp(0.0, 1.0);
                if v > *cell {
                    *cell = v;
                }
            }
        };
        if self.data.len() < 64 * 64 {
            self.data.chunks_mut(w).enumerate().for_each(fill_row);
        } else {
            self.data.par_chunks_mut(w).enumerate().for_each(fill_row);
        }
    }

    /// Union with another mask (per-pixel max)
    pub fn merge(&mut self, other: &CoverageMask) {
        for y in other.rect.y0..other.rect.y1 {
            for x in other.rect.x0..other.rect.x1 {
                self.accumulate(x, y, other.coverage(x, y));
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.iter().all(|&c| c <= 0.0)
    }

    /// Keep `current` where the mask covers and restore `saved` elsewhere.
    ///
    /// Partial coverage interpolates in premultiplied space so soft clip
    /// edges do not darken.
    pub fn restrict(&self, current: &mut PixelBuffer, saved: &PixelBuffer) {
        if current.dimensions() != saved.dimensions() {
            return;
        }
        let stride = current.stride();
        let rect = self.rect;
        current
            .as_raw_mut()
            .par_chunks_mut(stride)
            .zip(saved.as_raw().par_chunks(stride))
            .enumerate()
            .for_each(|(y, (row, saved_row))| {
                let y = y as u32;
                if !rect.contains_row(y) {
                    row.copy_from_slice(saved_row);
                    return;
                }
                for x in 0..row.len() / 4 {
                    let c = self.coverage(x as u32, y);
                    let i = x * 4;
                    if c >= 1.0 {
                        continue;
                    }
                    if c <= 0.0 {
                        row[i..i + 4].copy_from_slice(&saved_row[i..i + 4]);
                        continue;
                    }
                    let lerped = lerp_premultiplied(&saved_row[i..i + 4], &row[i..i + 4], c);
                    row[i..i + 4].copy_from_slice(&lerped);
                }
            });
    }
}

fn lerp_premultiplied(from: &[u8], to: &[u8], t: f32) -> [u8; 4] {
    let fa = f32::from(from[3]) / 255.0;
    let ta = f32::from(to[3]) / 255.0;
    let a = fa + (ta - fa) * t;
    if a <= 0.0 {
        return [0, 0, 0, 0];
    }
    let mut out = [0u8; 4];
    for c in 0..3 {
        let p = f32::from(from[c]) * fa + (f32::from(to[c]) * ta - f32::from(from[c]) * fa) * t;
        out[c] = (p / a).round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (a * 255.0).round().clamp(0.0, 255.0) as u8;
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::color::Color;

    #[test]
    fn test_rect_from_bounds_clips() {
        let rect = PixelRect::from_bounds(-3.2, 2.5, 7.1, 100.0, 5, 10).unwrap();
        assert_eq!(rect, PixelRect::new(0, 2, 5, 10));
        assert!(PixelRect::from_bounds(20.0, 20.0, 30.0, 30.0, 5, 5).is_none());
        assert!(PixelRect::from_bounds(f32::NAN, 0.0, 1.0, 1.0, 5, 5).is_none());
    }

    #[test]
    fn test_intersect_and_union() {
        let a = PixelRect::new(0, 0, 4, 4);
        let b = PixelRect::new(2, 2, 6, 6);
        assert_eq!(a.intersect(&b), Some(PixelRect::new(2, 2, 4, 4)));
        assert_eq!(a.union(&b), PixelRect::new(0, 0, 6, 6));
        assert_eq!(a.intersect(&PixelRect::new(4, 4, 5, 5)), None);
    }

    #[test]
    fn test_accumulate_keeps_maximum() {
        let mut mask = CoverageMask::new(PixelRect::new(1, 1, 3, 3));
        mask.accumulate(1, 1, 0.7);
        mask.accumulate(1, 1, 0.2);
        mask.accumulate(0, 0, 1.0);
        assert_eq!(mask.coverage(1, 1), 0.7);
        assert_eq!(mask.coverage(0, 0), 0.0);
    }

    #[test]
    fn test_restrict_restores_outside_coverage() {
        let saved = PixelBuffer::filled(4, 4, Color::WHITE).unwrap();
        let mut current = PixelBuffer::filled(4, 4, Color::BLACK).unwrap();
        let mut mask = CoverageMask::new(PixelRect::new(0, 0, 2, 2));
        mask.accumulate(0, 0, 1.0);
        mask.accumulate(1, 0, 0.5);

        mask.restrict(&mut current, &saved);
        assert_eq!(current.get_pixel(0, 0), Color::BLACK);
        assert_eq!(current.get_pixel(1, 0).r, 128);
        assert_eq!(current.get_pixel(3, 3), Color::WHITE);
        assert_eq!(current.get_pixel(0, 1), Color::WHITE);
    }
}
