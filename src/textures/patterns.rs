use rand::Rng;
use tracing::trace;

use crate::{
    error::Result,
    raster::{
        draw::{fill_shape, stroke_line, stroke_polyline, stroke_rect, Paint, Shape},
        gradient::{fill_gradient, ColorStop, Gradient},
        mask::PixelRect,
        Color, PixelBuffer,
    },
    textures::{
        uniform, GeneratorId, GeneratorMetadata, StyleRng, Surface, TextureGenerator, TextureParams, COLOR,
        COUNT, LINE_WIDTH, SPACING,
    },
};

pub const DOT_SIZE: &str = "dot_size";

/// Layer alpha of the scanline pass
const SCANLINE_ALPHA: f32 = 0.08;

/// Height of the shadow strip under each horizontal fold
const FOLD_SHADOW: f32 = 20.0;

/// Evenly spaced one-pixel dark lines
pub struct Scanlines;

impl Scanlines {
    pub fn new() -> Self {
        Self
    }
}

impl TextureGenerator for Scanlines {
    fn id(&self) -> GeneratorId {
        GeneratorId::Scanlines
    }

    fn description(&self) -> &str {
        "Horizontal CRT scanlines"
    }

    fn validate_params(&self, params: &TextureParams) -> Result<()> {
        params.validate_common(self.id().as_str(), &[SPACING])
    }

    fn generate(&self, canvas: &mut PixelBuffer, params: &TextureParams, _rng: &mut StyleRng) -> Result<()> {
        let surface = Surface::of(canvas);
        let Some(spacing) = params.get_pitch_or(SPACING, 4.0) else {
            return Ok(());
        };
        let paint = Paint::new(params.get_color_or(COLOR, Color::BLACK))
            .with_alpha(SCANLINE_ALPHA * params.opacity)
            .with_blend(params.blend);
        let (w, line) = (canvas.width() as f32, surface.size(1.0));

        let mut y = 0.0;
        while y < surface.height {
            fill_shape(canvas, &Shape::Rect { x: 0.0, y: surface.size(y), w, h: line }, &paint);
            y += spacing;
        }
        Ok(())
    }

    fn metadata(&self) -> GeneratorMetadata {
        GeneratorMetadata::new(0.1, &[(SPACING, "Distance between lines in reference pixels")])
    }
}

/// Manga screen tone: single dots on a checkerboard lattice
pub struct ScreenTone;

impl ScreenTone {
    pub fn new() -> Self {
        Self
    }
}

impl TextureGenerator for ScreenTone {
    fn id(&self) -> GeneratorId {
        GeneratorId::ScreenTone
    }

    fn description(&self) -> &str {
        "Checkerboard lattice of single dots"
    }

    fn validate_params(&self, params: &TextureParams) -> Result<()> {
        params.validate_common(self.id().as_str(), &[SPACING])
    }

    fn generate(&self, canvas: &mut PixelBuffer, params: &TextureParams, _rng: &mut StyleRng) -> Result<()> {
        let surface = Surface::of(canvas);
        let Some(density) = params.get_pitch_or(SPACING, 8.0) else {
            return Ok(());
        };
        let paint = Paint::new(params.get_color_or(COLOR, Color::rgba(0, 0, 0, 0.15)))
            .with_alpha(params.opacity)
            .with_blend(params.blend);
        let dot = surface.size(1.0);

        let rows = (surface.height / density).ceil() as usize;
        let cols = (surface.width / density).ceil() as usize;
        for j in 0..rows {
            // dots where the lattice indices sum to an even number
            for i in (j % 2..cols).step_by(2) {
                let (x, y) = surface.px(i as f32 * density, j as f32 * density);
                fill_shape(canvas, &Shape::Rect { x, y, w: dot, h: dot }, &paint);
            }
        }
        Ok(())
    }
}

/// Ben-Day dot grid of pop-art printing
pub struct BenDayDots;

impl BenDayDots {
    pub fn new() -> Self {
        Self
    }
}

impl TextureGenerator for BenDayDots {
    fn id(&self) -> GeneratorId {
        GeneratorId::BenDayDots
    }

    fn description(&self) -> &str {
        "Regular grid of halftone dots"
    }

    fn validate_params(&self, params: &TextureParams) -> Result<()> {
        params.validate_common(self.id().as_str(), &[DOT_SIZE])
    }

    fn generate(&self, canvas: &mut PixelBuffer, params: &TextureParams, _rng: &mut StyleRng) -> Result<()> {
        let surface = Surface::of(canvas);
        let Some(size) = params.get_pitch_or(DOT_SIZE, 6.0) else {
            return Ok(());
        };
        let paint = Paint::new(params.get_color_or(COLOR, Color::rgba(0, 0, 0, 0.1)))
            .with_alpha(params.opacity)
            .with_blend(params.blend);
        let radius = surface.size(size / 3.0);

        let mut y = size;
        while y < surface.height {
            let mut x = size;
            while x < surface.width {
                let (cx, cy) = surface.px(x, y);
                fill_shape(canvas, &Shape::Circle { cx, cy, radius }, &paint);
                x += size * 2.0;
            }
            y += size * 2.0;
        }
        Ok(())
    }

    fn metadata(&self) -> GeneratorMetadata {
        GeneratorMetadata::new(0.3, &[(DOT_SIZE, "Dot pitch is twice this, radius a third")])
    }
}

/// Running-bond brick outlines
pub struct Bricks;

impl Bricks {
    pub fn new() -> Self {
        Self
    }
}

impl TextureGenerator for Bricks {
    fn id(&self) -> GeneratorId {
        GeneratorId::Bricks
    }

    fn description(&self) -> &str {
        "Brick courses with alternate rows offset by half a brick"
    }

    fn generate(&self, canvas: &mut PixelBuffer, params: &TextureParams, _rng: &mut StyleRng) -> Result<()> {
        const BRICK_W: f32 = 80.0;
        const BRICK_H: f32 = 40.0;

        let surface = Surface::of(canvas);
        let paint = Paint::new(params.get_color_or(COLOR, Color::rgba(0, 0, 0, 0.2)))
            .with_alpha(params.opacity)
            .with_blend(params.blend);
        let width = surface.size(params.get_f32_or(LINE_WIDTH, 2.0));

        let mut row = 0;
        while row as f32 * BRICK_H < surface.height {
            let y = row as f32 * BRICK_H;
            let offset = if row % 2 == 0 { 0.0 } else { BRICK_W / 2.0 };
            let mut x = -BRICK_W;
            while x < surface.width {
                let (bx, by) = surface.px(x + offset, y);
                stroke_rect(
                    canvas,
                    bx,
                    by,
                    surface.size(BRICK_W - 2.0),
                    surface.size(BRICK_H - 2.0),
                    width,
                    &paint,
                );
                x += BRICK_W;
            }
            row += 1;
        }
        Ok(())
    }
}

/// Cyan perspective grid, vertical lines brightest at the centre
pub struct NeonGrid;

impl NeonGrid {
    pub fn new() -> Self {
        Self
    }
}

impl TextureGenerator for NeonGrid {
    fn id(&self) -> GeneratorId {
        GeneratorId::NeonGrid
    }

    fn description(&self) -> &str {
        "Glowing grid whose verticals fade toward the edges"
    }

    fn validate_params(&self, params: &TextureParams) -> Result<()> {
        params.validate_common(self.id().as_str(), &[SPACING, LINE_WIDTH])
    }

    fn generate(&self, canvas: &mut PixelBuffer, params: &TextureParams, _rng: &mut StyleRng) -> Result<()> {
        let surface = Surface::of(canvas);
        let Some(spacing) = params.get_pitch_or(SPACING, 60.0) else {
            return Ok(());
        };
        let color = params.get_color_or(COLOR, Color::rgba(0, 255, 255, 0.08));
        let width = surface.size(params.get_f32_or(LINE_WIDTH, 1.0));
        let (w, h) = (surface.width, surface.height);
        let half = w / 2.0;

        let mut x = 0.0;
        while x <= w {
            let alpha = 0.25 * (1.0 - (x - half).abs() / half);
            let paint = Paint::new(color)
                .with_alpha(alpha * params.opacity)
                .with_blend(params.blend);
            stroke_line(canvas, surface.px(x, 0.0), surface.px(x, h), width, &paint);
            x += spacing;
        }

        let paint = Paint::new(color)
            .with_alpha(0.15 * params.opacity)
            .with_blend(params.blend);
        let mut y = 0.0;
        while y <= h {
            stroke_line(canvas, surface.px(0.0, y), surface.px(w, y), width, &paint);
            y += spacing;
        }
        Ok(())
    }
}

/// Wavy vertical grain lines
pub struct WoodGrain;

impl WoodGrain {
    pub fn new() -> Self {
        Self
    }
}

impl TextureGenerator for WoodGrain {
    fn id(&self) -> GeneratorId {
        GeneratorId::WoodGrain
    }

    fn description(&self) -> &str {
        "Meandering brown grain lines"
    }

    fn validate_params(&self, params: &TextureParams) -> Result<()> {
        params.validate_common(self.id().as_str(), &[COUNT, LINE_WIDTH])
    }

    fn generate(&self, canvas: &mut PixelBuffer, params: &TextureParams, rng: &mut StyleRng) -> Result<()> {
        let surface = Surface::of(canvas);
        let count = params.get_count_or(COUNT, 50);
        let color = params.get_color_or(COLOR, Color::rgba(100, 70, 40, 0.08));
        let width = surface.size(params.get_f32_or(LINE_WIDTH, 2.0));
        trace!("wood grain: {} lines", count);

        for _ in 0..count {
            let x = uniform(rng, 0.0, surface.width);
            let alpha = uniform(rng, 0.1, 0.3);

            let mut points = vec![surface.px(x, 0.0)];
            let mut y = 0.0;
            while y < surface.height {
                let wobble = (y * 0.02).sin() * 30.0 + rng.gen::<f32>() * 10.0;
                points.push(surface.px(x + wobble, y));
                y += 20.0;
            }

            let paint = Paint::new(color)
                .with_alpha(alpha * params.opacity)
                .with_blend(params.blend);
            stroke_polyline(canvas, &points, width, false, &paint);
        }
        Ok(())
    }
}

/// Paper fold creases with a soft shadow below each horizontal fold
///
/// Even folds are horizontal at `h / count * i`, odd folds vertical at
/// `w / count * i`.
pub struct FoldLines;

impl FoldLines {
    pub fn new() -> Self {
        Self
    }
}

impl TextureGenerator for FoldLines {
    fn id(&self) -> GeneratorId {
        GeneratorId::FoldLines
    }

    fn description(&self) -> &str {
        "Alternating fold creases with shadow strips"
    }

    fn validate_params(&self, params: &TextureParams) -> Result<()> {
        params.validate_common(self.id().as_str(), &[COUNT, LINE_WIDTH])
    }

    fn generate(&self, canvas: &mut PixelBuffer, params: &TextureParams, _rng: &mut StyleRng) -> Result<()> {
        let surface = Surface::of(canvas);
        let folds = params.get_count_or(COUNT, 12);
        if folds == 0 {
            return Ok(());
        }
        let (w, h) = (canvas.width() as f32, canvas.height() as f32);
        let crease = Paint::new(params.get_color_or(COLOR, Color::rgba(0, 0, 0, 0.1)))
            .with_alpha(params.opacity)
            .with_blend(params.blend);
        let width = surface.size(params.get_f32_or(LINE_WIDTH, 2.0));

        for i in 0..folds {
            if i % 2 == 0 {
                let y = h / folds as f32 * i as f32;
                stroke_line(canvas, (0.0, y), (w, y), width, &crease);
            } else {
                let x = w / folds as f32 * i as f32;
                stroke_line(canvas, (x, 0.0), (x, h), width, &crease);
            }
        }

        let strip = surface.size(FOLD_SHADOW);
        for i in 1..folds {
            let y = h / folds as f32 * i as f32;
            let gradient = Gradient::linear(
                (0.0, y / h),
                (0.0, (y + strip) / h),
                vec![
                    ColorStop::new(0.0, Color::rgba(0, 0, 0, 0.3)),
                    ColorStop::new(1.0, Color::rgba(0, 0, 0, 0.0)),
                ],
            );
            let region = PixelRect::from_bounds(0.0, y, w, y + strip, canvas.width(), canvas.height());
            if let Some(region) = region {
                fill_gradient(canvas, &gradient, params.blend, 0.1 * params.opacity, Some(region));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn run(generator: &dyn TextureGenerator, params: &TextureParams, size: u32) -> PixelBuffer {
        let mut canvas = PixelBuffer::filled(size, size, Color::WHITE).unwrap();
        let mut rng = StyleRng::seed_from_u64(0);
        generator.generate(&mut canvas, params, &mut rng).unwrap();
        canvas
    }

    #[test]
    fn test_scanlines_are_periodic() {
        let canvas = run(&Scanlines::new(), &TextureParams::new(), 1024);
        assert!(canvas.get_pixel(10, 0).r < 255);
        assert_eq!(canvas.get_pixel(10, 1), Color::WHITE);
        assert!(canvas.get_pixel(10, 4).r < 255);
        assert_eq!(canvas.get_pixel(10, 6), Color::WHITE);
    }

    #[test]
    fn test_screen_tone_checkerboard() {
        let canvas = run(&ScreenTone::new(), &TextureParams::new(), 1024);
        assert!(canvas.get_pixel(0, 0).r < 255);
        assert_eq!(canvas.get_pixel(8, 0), Color::WHITE);
        assert!(canvas.get_pixel(8, 8).r < 255);
        assert!(canvas.get_pixel(16, 0).r < 255);
    }

    #[test]
    fn test_ben_day_dot_positions() {
        let canvas = run(&BenDayDots::new(), &TextureParams::new(), 1024);
        assert!(canvas.get_pixel(6, 6).r < 255);
        assert!(canvas.get_pixel(18, 6).r < 255);
        assert_eq!(canvas.get_pixel(12, 12), Color::WHITE);
    }

    #[test]
    fn test_neon_grid_fades_at_edges() {
        let mut canvas = PixelBuffer::filled(1024, 1024, Color::BLACK).unwrap();
        let mut rng = StyleRng::seed_from_u64(0);
        let params = TextureParams::new().set(COLOR, Color::rgb(0, 255, 255));
        NeonGrid::new().generate(&mut canvas, &params, &mut rng).unwrap();

        // x = 480 is a grid column near the centre; x = 0 sits at the fade-out
        let centre = canvas.get_pixel(480, 30).g;
        let edge = canvas.get_pixel(0, 30).g;
        assert!(centre > edge);
    }

    #[test]
    fn test_sub_pixel_pitch_fails_validation() {
        let tiny = TextureParams::new().set(SPACING, 1e-6f32);
        assert!(Scanlines::new().validate_params(&tiny).is_err());
        assert!(ScreenTone::new().validate_params(&tiny).is_err());
        assert!(NeonGrid::new().validate_params(&tiny).is_err());
        let dots = TextureParams::new().set(DOT_SIZE, 1e-6f32);
        assert!(BenDayDots::new().validate_params(&dots).is_err());
    }

    #[test]
    fn test_sub_pixel_pitch_draws_nothing_when_called_directly() {
        let tiny = TextureParams::new().set(SPACING, 1e-6f32);
        let canvas = run(&Scanlines::new(), &tiny, 64);
        assert!(canvas.as_raw().iter().all(|&c| c == 255));
        let canvas = run(&ScreenTone::new(), &tiny, 64);
        assert!(canvas.as_raw().iter().all(|&c| c == 255));
    }

    #[test]
    fn test_fold_lines_zero_folds_is_noop() {
        let canvas = run(&FoldLines::new(), &TextureParams::new().set(COUNT, 0.0), 64);
        assert!(canvas.as_raw().iter().all(|&c| c == 255));
    }

    #[test]
    fn test_fold_lines_darken_creases() {
        let canvas = run(&FoldLines::new(), &TextureParams::new(), 1200);
        // second fold is vertical at x = 100
        assert!(canvas.get_pixel(100, 37).r < 255);
        // third fold is horizontal at y = 200, with its shadow strip below
        assert!(canvas.get_pixel(37, 200).r < 255);
        assert!(canvas.get_pixel(37, 205).r < 255);
    }
}
