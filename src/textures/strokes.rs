use std::f32::consts::TAU;

use tracing::trace;

use crate::{
    error::Result,
    raster::{
        draw::{fill_shape, stroke_line, stroke_polyline, Paint, Shape},
        Color, PixelBuffer,
    },
    textures::{
        pick, uniform, GeneratorId, GeneratorMetadata, StyleRng, Surface, TextureGenerator, TextureParams, COLOR,
        COLORS, COUNT, LINE_WIDTH,
    },
};

/// Layer alpha of a single brush stroke
const STROKE_ALPHA: f32 = 0.03;

/// Layer alpha of a swirl
const SWIRL_ALPHA: f32 = 0.15;

/// Layer alpha of a paint drip
const DRIP_ALPHA: f32 = 0.4;

const DRIP_COLORS: [Color; 3] = [Color::hex(0xff006e), Color::hex(0x00f5ff), Color::hex(0xffea00)];

/// Faint straight strokes in random directions
pub struct BrushStrokes;

impl BrushStrokes {
    pub fn new() -> Self {
        Self
    }
}

impl TextureGenerator for BrushStrokes {
    fn id(&self) -> GeneratorId {
        GeneratorId::BrushStrokes
    }

    fn description(&self) -> &str {
        "Faint random brush strokes"
    }

    fn validate_params(&self, params: &TextureParams) -> Result<()> {
        params.validate_common(self.id().as_str(), &[COUNT])
    }

    fn generate(&self, canvas: &mut PixelBuffer, params: &TextureParams, rng: &mut StyleRng) -> Result<()> {
        let surface = Surface::of(canvas);
        let count = params.get_count_or(COUNT, 150);
        let color = params.get_color_or(COLOR, Color::BLACK);
        trace!("brush strokes: {}", count);

        for _ in 0..count {
            let x = uniform(rng, 0.0, surface.width);
            let y = uniform(rng, 0.0, surface.height);
            let length = uniform(rng, 40.0, 160.0);
            let angle = uniform(rng, 0.0, TAU);
            let width = surface.size(uniform(rng, 1.0, 5.0));

            let paint = Paint::new(color)
                .with_alpha(STROKE_ALPHA * params.opacity)
                .with_blend(params.blend);
            let end = (x + angle.cos() * length, y + angle.sin() * length);
            stroke_line(canvas, surface.px(x, y), surface.px(end.0, end.1), width, &paint);
        }
        Ok(())
    }
}

/// Lobed elliptical loops in blue-violet hues
///
/// Each loop follows `r(t) = radius * (1 + 0.3 sin 3t)` squashed to half
/// height, then rotated about its centre.
pub struct Swirls;

impl Swirls {
    pub fn new() -> Self {
        Self
    }
}

impl TextureGenerator for Swirls {
    fn id(&self) -> GeneratorId {
        GeneratorId::Swirls
    }

    fn description(&self) -> &str {
        "Swirling looped strokes"
    }

    fn validate_params(&self, params: &TextureParams) -> Result<()> {
        params.validate_common(self.id().as_str(), &[COUNT])
    }

    fn generate(&self, canvas: &mut PixelBuffer, params: &TextureParams, rng: &mut StyleRng) -> Result<()> {
        let surface = Surface::of(canvas);
        let count = params.get_count_or(COUNT, 50);

        for _ in 0..count {
            let x = uniform(rng, 0.0, surface.width);
            let y = uniform(rng, 0.0, surface.height);
            let radius = uniform(rng, 50.0, 150.0);
            let rotation = uniform(rng, 0.0, TAU);
            let color = Color::from_hsl(uniform(rng, 200.0, 260.0), 0.7, 0.6);
            let width = surface.size(uniform(rng, 2.0, 10.0));

            let (sin, cos) = rotation.sin_cos();
            let mut points = Vec::with_capacity(64);
            let mut t = 0.0f32;
            while t < TAU {
                let r = radius * (1.0 + (t * 3.0).sin() * 0.3);
                let (sx, sy) = (t.cos() * r, t.sin() * r * 0.5);
                points.push(surface.px(x + sx * cos - sy * sin, y + sx * sin + sy * cos));
                t += 0.1;
            }

            let paint = Paint::new(color)
                .with_alpha(SWIRL_ALPHA * params.opacity)
                .with_blend(params.blend);
            stroke_polyline(canvas, &points, width, false, &paint);
        }
        Ok(())
    }

    fn metadata(&self) -> GeneratorMetadata {
        GeneratorMetadata::new(0.6, &[(COUNT, "Number of loops")])
    }
}

/// Manga speed lines radiating from the canvas centre to beyond its edge
pub struct SpeedLines;

impl SpeedLines {
    pub fn new() -> Self {
        Self
    }
}

impl TextureGenerator for SpeedLines {
    fn id(&self) -> GeneratorId {
        GeneratorId::SpeedLines
    }

    fn description(&self) -> &str {
        "Radial focus lines"
    }

    fn validate_params(&self, params: &TextureParams) -> Result<()> {
        params.validate_common(self.id().as_str(), &[COUNT, LINE_WIDTH])
    }

    fn generate(&self, canvas: &mut PixelBuffer, params: &TextureParams, rng: &mut StyleRng) -> Result<()> {
        let surface = Surface::of(canvas);
        let count = params.get_count_or(COUNT, 40);
        let color = params.get_color_or(COLOR, Color::rgba(0, 0, 0, 0.1));
        let width = surface.size(params.get_f32_or(LINE_WIDTH, 2.0));
        let (cx, cy) = (surface.width / 2.0, surface.height / 2.0);
        let end_radius = surface.width.max(surface.height);

        for _ in 0..count {
            let angle = uniform(rng, 0.0, TAU);
            let start_radius = uniform(rng, 50.0, 150.0);
            let alpha = uniform(rng, 0.1, 0.4);

            let (sin, cos) = angle.sin_cos();
            let paint = Paint::new(color)
                .with_alpha(alpha * params.opacity)
                .with_blend(params.blend);
            stroke_line(
                canvas,
                surface.px(cx + cos * start_radius, cy + sin * start_radius),
                surface.px(cx + cos * end_radius, cy + sin * end_radius),
                width,
                &paint,
            );
        }
        Ok(())
    }
}

/// Straight lines between random points
pub struct RandomLines;

impl RandomLines {
    pub fn new() -> Self {
        Self
    }
}

impl TextureGenerator for RandomLines {
    fn id(&self) -> GeneratorId {
        GeneratorId::RandomLines
    }

    fn description(&self) -> &str {
        "Lines joining random points"
    }

    fn validate_params(&self, params: &TextureParams) -> Result<()> {
        params.validate_common(self.id().as_str(), &[COUNT, LINE_WIDTH])
    }

    fn generate(&self, canvas: &mut PixelBuffer, params: &TextureParams, rng: &mut StyleRng) -> Result<()> {
        let surface = Surface::of(canvas);
        let count = params.get_count_or(COUNT, 30);
        let paint = Paint::new(params.get_color_or(COLOR, Color::rgba(60, 40, 20, 0.3)))
            .with_alpha(params.opacity)
            .with_blend(params.blend);
        let width = surface.size(params.get_f32_or(LINE_WIDTH, 2.0));

        for _ in 0..count {
            let from = surface.px(uniform(rng, 0.0, surface.width), uniform(rng, 0.0, surface.height));
            let to = surface.px(uniform(rng, 0.0, surface.width), uniform(rng, 0.0, surface.height));
            stroke_line(canvas, from, to, width, &paint);
        }
        Ok(())
    }
}

/// Vertical paint runs ending in a round blob
pub struct PaintDrips;

impl PaintDrips {
    pub fn new() -> Self {
        Self
    }
}

impl TextureGenerator for PaintDrips {
    fn id(&self) -> GeneratorId {
        GeneratorId::PaintDrips
    }

    fn description(&self) -> &str {
        "Dripping paint streaks"
    }

    fn validate_params(&self, params: &TextureParams) -> Result<()> {
        params.validate_common(self.id().as_str(), &[COUNT])
    }

    fn generate(&self, canvas: &mut PixelBuffer, params: &TextureParams, rng: &mut StyleRng) -> Result<()> {
        let surface = Surface::of(canvas);
        let count = params.get_count_or(COUNT, 15);
        let colors = params.get_colors(COLORS).unwrap_or(&DRIP_COLORS[..]).to_vec();

        for _ in 0..count {
            let x = uniform(rng, 0.0, surface.width);
            let start = uniform(rng, 0.0, surface.height * 0.5);
            let length = uniform(rng, 30.0, 130.0);
            let color = pick(rng, &colors).copied().unwrap_or(Color::TRANSPARENT);
            let width = uniform(rng, 2.0, 8.0);

            let paint = Paint::new(color)
                .with_alpha(DRIP_ALPHA * params.opacity)
                .with_blend(params.blend);
            let (x0, y0) = surface.px(x, start);
            let (x1, y1) = surface.px(x, start + length);
            stroke_line(canvas, (x0, y0), (x1, y1), surface.size(width), &paint);
            fill_shape(
                canvas,
                &Shape::Circle {
                    cx: x1,
                    cy: y1,
                    radius: surface.size(width),
                },
                &paint,
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_speed_lines_leave_centre_clear() {
        let mut canvas = PixelBuffer::filled(256, 256, Color::WHITE).unwrap();
        let mut rng = StyleRng::seed_from_u64(1);
        let params = TextureParams::new().set(COUNT, 400.0);
        SpeedLines::new().generate(&mut canvas, &params, &mut rng).unwrap();

        // start radius is at least 50 reference px, 12.5 px at this size
        for y in 124..132 {
            for x in 124..132 {
                assert_eq!(canvas.get_pixel(x, y), Color::WHITE);
            }
        }
        assert!(canvas.as_raw().iter().any(|&c| c < 255));
    }

    #[test]
    fn test_drips_use_palette_colours() {
        let mut canvas = PixelBuffer::filled(128, 128, Color::BLACK).unwrap();
        let mut rng = StyleRng::seed_from_u64(3);
        let params = TextureParams::new().set(COLORS, vec![Color::rgb(255, 0, 0)]);
        PaintDrips::new().generate(&mut canvas, &params, &mut rng).unwrap();
        let raw = canvas.as_raw();
        assert!(raw.chunks(4).all(|px| px[1] == 0 && px[2] == 0));
        assert!(raw.chunks(4).any(|px| px[0] > 0));
    }

    #[test]
    fn test_random_lines_count_zero_is_noop() {
        let mut canvas = PixelBuffer::filled(32, 32, Color::WHITE).unwrap();
        let before = canvas.clone();
        let mut rng = StyleRng::seed_from_u64(3);
        RandomLines::new()
            .generate(&mut canvas, &TextureParams::new().set(COUNT, 0.0), &mut rng)
            .unwrap();
        assert_eq!(canvas, before);
    }
}
