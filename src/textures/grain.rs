use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::trace;

use crate::{
    error::Result,
    raster::{
        draw::{fill_shape, Paint, Shape},
        Color, PixelBuffer,
    },
    textures::{
        uniform, GeneratorId, GeneratorMetadata, StyleRng, Surface, TextureGenerator, TextureParams,
        COLOR, COUNT, INTENSITY, SIZE_MAX,
    },
};

/// Alpha of a single canvas fleck
const FLECK_ALPHA: f32 = 0.04;

/// Layer alpha of the chalk speck pass
const DUST_ALPHA: f32 = 0.1;

/// Per-pixel luminance noise, like the tooth of drawing paper
///
/// Each channel moves by the same random amount in
/// `[-intensity * 255 / 2, intensity * 255 / 2)`; alpha is untouched.
pub struct PaperGrain;

impl PaperGrain {
    pub fn new() -> Self {
        Self
    }
}

impl TextureGenerator for PaperGrain {
    fn id(&self) -> GeneratorId {
        GeneratorId::PaperGrain
    }

    fn description(&self) -> &str {
        "Fine random luminance noise across the whole canvas"
    }

    fn validate_params(&self, params: &TextureParams) -> Result<()> {
        params.validate_common(self.id().as_str(), &[INTENSITY])
    }

    fn generate(&self, canvas: &mut PixelBuffer, params: &TextureParams, rng: &mut StyleRng) -> Result<()> {
        let intensity = params.get_f32_or(INTENSITY, 0.03) * params.opacity;
        if intensity <= 0.0 {
            return Ok(());
        }

        // one seed per row keeps the result independent of thread scheduling
        let stride = canvas.stride();
        let seeds: Vec<u64> = (0..canvas.height()).map(|_| rng.gen()).collect();
        canvas
            .as_raw_mut()
            .par_chunks_mut(stride)
            .zip(seeds.par_iter())
            .for_each(|(row, &seed)| {
                let mut row_rng = StyleRng::seed_from_u64(seed);
                for px in row.chunks_mut(4) {
                    let noise = (row_rng.gen::<f32>() - 0.5) * intensity * 255.0;
                    for c in px.iter_mut().take(3) {
                        *c = (f32::from(*c) + noise).round().clamp(0.0, 255.0) as u8;
                    }
                }
            });
        Ok(())
    }

    fn metadata(&self) -> GeneratorMetadata {
        GeneratorMetadata::new(0.4, &[(INTENSITY, "Noise amplitude as a fraction of full scale")])
    }
}

/// Scattered black and white flecks that read as canvas weave
pub struct CanvasGrain;

impl CanvasGrain {
    pub fn new() -> Self {
        Self
    }
}

impl TextureGenerator for CanvasGrain {
    fn id(&self) -> GeneratorId {
        GeneratorId::CanvasGrain
    }

    fn description(&self) -> &str {
        "Thousands of tiny light and dark flecks"
    }

    fn validate_params(&self, params: &TextureParams) -> Result<()> {
        params.validate_common(self.id().as_str(), &[COUNT, SIZE_MAX])
    }

    fn generate(&self, canvas: &mut PixelBuffer, params: &TextureParams, rng: &mut StyleRng) -> Result<()> {
        let surface = Surface::of(canvas);
        let count = surface.count(params.get_count_or(COUNT, 8000));
        let max_size = params.get_f32_or(SIZE_MAX, 2.0);
        let opacity = FLECK_ALPHA * params.opacity;
        trace!("canvas grain: {} flecks", count);

        for _ in 0..count {
            let (x, y) = surface.px(uniform(rng, 0.0, surface.width), uniform(rng, 0.0, surface.height));
            let size = surface.size(uniform(rng, 0.0, max_size));
            let color = if rng.gen::<f32>() > 0.5 { Color::BLACK } else { Color::WHITE };
            let paint = Paint::new(color).with_alpha(opacity).with_blend(params.blend);
            fill_shape(canvas, &Shape::Rect { x, y, w: size, h: size }, &paint);
        }
        Ok(())
    }

    fn metadata(&self) -> GeneratorMetadata {
        GeneratorMetadata::new(
            0.3,
            &[
                (COUNT, "Number of flecks on a 1024 px canvas"),
                (SIZE_MAX, "Largest fleck edge in reference pixels"),
            ],
        )
    }
}

/// Single-pixel white specks left by chalk on a board
pub struct ChalkDust;

impl ChalkDust {
    pub fn new() -> Self {
        Self
    }
}

impl TextureGenerator for ChalkDust {
    fn id(&self) -> GeneratorId {
        GeneratorId::ChalkDust
    }

    fn description(&self) -> &str {
        "Faint single-pixel chalk specks"
    }

    fn validate_params(&self, params: &TextureParams) -> Result<()> {
        params.validate_common(self.id().as_str(), &[COUNT])
    }

    fn generate(&self, canvas: &mut PixelBuffer, params: &TextureParams, rng: &mut StyleRng) -> Result<()> {
        let surface = Surface::of(canvas);
        let count = surface.count(params.get_count_or(COUNT, 5000));
        let color = params.get_color_or(COLOR, Color::rgba(255, 255, 255, 0.5));
        let paint = Paint::new(color)
            .with_alpha(DUST_ALPHA * params.opacity)
            .with_blend(params.blend);
        trace!("chalk dust: {} specks", count);

        for _ in 0..count {
            let (x, y) = surface.px(uniform(rng, 0.0, surface.width), uniform(rng, 0.0, surface.height));
            fill_shape(canvas, &Shape::Rect { x, y, w: 1.0, h: 1.0 }, &paint);
        }
        Ok(())
    }
}
