use std::f32::consts::TAU;

use crate::{
    error::Result,
    raster::{
        draw::{fill_shape, stroke_line, stroke_polyline, stroke_rect, Paint, Shape},
        Color, PixelBuffer,
    },
    textures::{
        uniform, GeneratorId, GeneratorMetadata, StyleRng, Surface, TextureGenerator, TextureParams, COLOR,
        COUNT, LINE_WIDTH,
    },
};

pub const TEETH: &str = "teeth";
pub const MARGIN: &str = "margin";
pub const SIZE: &str = "size";

/// Layer alpha of the gear pass
const GEAR_ALPHA: f32 = 0.1;

/// Seal glyph strokes in units of a quarter of the seal size, centred on
/// the seal
const SEAL_GLYPH: [&[(f32, f32)]; 6] = [
    &[(-0.8, -0.8), (-0.8, 0.8)],
    &[(-0.8, -0.8), (-0.15, -0.8)],
    &[(-0.8, 0.0), (-0.15, 0.0)],
    &[(-0.8, 0.8), (-0.15, 0.8)],
    &[(0.15, 1.0), (0.15, -0.8), (0.8, -0.8), (0.8, 0.4)],
    &[(0.8, 0.4), (0.55, 0.4)],
];

/// Toothed gear outlines scattered over the canvas
pub struct Gears;

impl Gears {
    pub fn new() -> Self {
        Self
    }
}

impl TextureGenerator for Gears {
    fn id(&self) -> GeneratorId {
        GeneratorId::Gears
    }

    fn description(&self) -> &str {
        "Outlined gears with alternating tooth radii"
    }

    fn validate_params(&self, params: &TextureParams) -> Result<()> {
        params.validate_common(self.id().as_str(), &[COUNT, TEETH, LINE_WIDTH])
    }

    fn generate(&self, canvas: &mut PixelBuffer, params: &TextureParams, rng: &mut StyleRng) -> Result<()> {
        let surface = Surface::of(canvas);
        let count = params.get_count_or(COUNT, 8);
        let teeth = params.get_count_or(TEETH, 12).max(3);
        let paint = Paint::new(params.get_color_or(COLOR, Color::rgba(255, 200, 100, 0.3)))
            .with_alpha(GEAR_ALPHA * params.opacity)
            .with_blend(params.blend);
        let width = surface.size(params.get_f32_or(LINE_WIDTH, 2.0));

        for _ in 0..count {
            let x = uniform(rng, 0.0, surface.width);
            let y = uniform(rng, 0.0, surface.height);
            let radius = uniform(rng, 40.0, 120.0);

            let vertices = teeth * 2;
            let outline: Vec<(f32, f32)> = (0..vertices)
                .map(|t| {
                    let angle = t as f32 / vertices as f32 * TAU;
                    let r = if t % 2 == 0 { radius } else { radius * 0.8 };
                    surface.px(x + angle.cos() * r, y + angle.sin() * r)
                })
                .collect();
            stroke_polyline(canvas, &outline, width, true, &paint);
        }
        Ok(())
    }

    fn metadata(&self) -> GeneratorMetadata {
        GeneratorMetadata::new(
            0.2,
            &[
                (COUNT, "Number of gears"),
                (TEETH, "Teeth per gear"),
            ],
        )
    }
}

/// Red square seal stamp in the bottom-right corner
///
/// An outlined square, a filled inner square and a white stroked glyph.
pub struct SealStamp;

impl SealStamp {
    pub fn new() -> Self {
        Self
    }
}

impl TextureGenerator for SealStamp {
    fn id(&self) -> GeneratorId {
        GeneratorId::SealStamp
    }

    fn description(&self) -> &str {
        "Artist's seal with a stylised glyph"
    }

    fn validate_params(&self, params: &TextureParams) -> Result<()> {
        params.validate_common(self.id().as_str(), &[SIZE, MARGIN])
    }

    fn generate(&self, canvas: &mut PixelBuffer, params: &TextureParams, _rng: &mut StyleRng) -> Result<()> {
        let surface = Surface::of(canvas);
        let size = params.get_f32_or(SIZE, 60.0);
        let margin = params.get_f32_or(MARGIN, 100.0);
        let (cx, cy) = (surface.width - margin, surface.height - margin);

        let ink = Paint::new(params.get_color_or(COLOR, Color::hex(0xb71c1c)))
            .with_alpha(params.opacity)
            .with_blend(params.blend);
        let (ox, oy) = surface.px(cx - size / 2.0, cy - size / 2.0);
        stroke_rect(
            canvas,
            ox,
            oy,
            surface.size(size),
            surface.size(size),
            surface.size(3.0),
            &ink,
        );
        let (ix, iy) = surface.px(cx - size / 3.0, cy - size / 3.0);
        let inner = surface.size(size / 1.5);
        fill_shape(canvas, &Shape::Rect { x: ix, y: iy, w: inner, h: inner }, &ink);

        let glyph = Paint::new(Color::WHITE)
            .with_alpha(params.opacity)
            .with_blend(params.blend);
        let unit = size / 4.0;
        for stroke in SEAL_GLYPH {
            let points: Vec<(f32, f32)> = stroke
                .iter()
                .map(|&(gx, gy)| surface.px(cx + gx * unit, cy + gy * unit))
                .collect();
            stroke_polyline(canvas, &points, surface.size(size / 12.0), false, &glyph);
        }
        Ok(())
    }

    fn metadata(&self) -> GeneratorMetadata {
        GeneratorMetadata::new(
            0.05,
            &[
                (SIZE, "Seal edge in reference pixels"),
                (MARGIN, "Distance of the seal centre from the right and bottom edges"),
            ],
        )
    }
}

/// Inset rectangle frame with a diagonal flourish in each corner
pub struct DecorativeBorder;

impl DecorativeBorder {
    pub fn new() -> Self {
        Self
    }
}

impl TextureGenerator for DecorativeBorder {
    fn id(&self) -> GeneratorId {
        GeneratorId::DecorativeBorder
    }

    fn description(&self) -> &str {
        "Inset frame with corner strokes"
    }

    fn validate_params(&self, params: &TextureParams) -> Result<()> {
        params.validate_common(self.id().as_str(), &[MARGIN, SIZE, LINE_WIDTH])
    }

    fn generate(&self, canvas: &mut PixelBuffer, params: &TextureParams, _rng: &mut StyleRng) -> Result<()> {
        let surface = Surface::of(canvas);
        let inset = params.get_f32_or(MARGIN, 40.0);
        let corner = params.get_f32_or(SIZE, 60.0);
        let paint = Paint::new(params.get_color_or(COLOR, Color::rgba(255, 255, 255, 0.3)))
            .with_alpha(params.opacity)
            .with_blend(params.blend);
        let width = surface.size(params.get_f32_or(LINE_WIDTH, 1.0));
        let (w, h) = (surface.width, surface.height);

        let (x, y) = surface.px(inset, inset);
        stroke_rect(
            canvas,
            x,
            y,
            surface.size(w - inset * 2.0),
            surface.size(h - inset * 2.0),
            width,
            &paint,
        );

        let corners = [
            (inset, inset),
            (w - inset - corner, inset),
            (inset, h - inset - corner),
            (w - inset - corner, h - inset - corner),
        ];
        for (cx, cy) in corners {
            stroke_line(
                canvas,
                surface.px(cx, cy + corner / 2.0),
                surface.px(cx + corner / 2.0, cy),
                width,
                &paint,
            );
        }
        Ok(())
    }
}
