use rand::Rng;
use tracing::trace;

use crate::{
    error::Result,
    raster::{
        draw::{fill_shape, paint_mask, stroke_line, Paint, Shape},
        Color, CoverageMask, PixelBuffer,
    },
    textures::{
        uniform, GeneratorId, GeneratorMetadata, StyleRng, Surface, TextureGenerator, TextureParams, BLUR,
        COLOR, COUNT, LINE_WIDTH, SIZE_MAX, SIZE_MIN,
    },
};

/// Fraction of the canvas height stars may appear in
const STAR_BAND: f32 = 0.7;

/// Layer alpha of a cloud
const CLOUD_ALPHA: f32 = 0.3;

/// Star field over the upper part of the canvas
///
/// Each star is a disc of random brightness with a white halo whose blur
/// equals the star radius.
pub struct Stars;

impl Stars {
    pub fn new() -> Self {
        Self
    }
}

impl TextureGenerator for Stars {
    fn id(&self) -> GeneratorId {
        GeneratorId::Stars
    }

    fn description(&self) -> &str {
        "Haloed stars of random size and brightness"
    }

    fn validate_params(&self, params: &TextureParams) -> Result<()> {
        params.validate_common(self.id().as_str(), &[COUNT, SIZE_MIN, SIZE_MAX])
    }

    fn generate(&self, canvas: &mut PixelBuffer, params: &TextureParams, rng: &mut StyleRng) -> Result<()> {
        let surface = Surface::of(canvas);
        let count = surface.count(params.get_count_or(COUNT, 100));
        let (min, max) = (params.get_f32_or(SIZE_MIN, 1.0), params.get_f32_or(SIZE_MAX, 4.0));
        let color = params.get_color_or(COLOR, Color::WHITE);
        trace!("stars: {}", count);

        for _ in 0..count {
            let (cx, cy) = surface.px(
                uniform(rng, 0.0, surface.width),
                uniform(rng, 0.0, surface.height * STAR_BAND),
            );
            let radius = surface.size(uniform(rng, min, max));
            let brightness: f32 = rng.gen();

            let paint = Paint::new(color)
                .with_alpha(brightness * params.opacity)
                .with_blend(params.blend);
            fill_shape(canvas, &Shape::SoftCircle { cx, cy, radius, blur: radius }, &paint);
            fill_shape(canvas, &Shape::Circle { cx, cy, radius }, &paint);
        }
        Ok(())
    }

    fn metadata(&self) -> GeneratorMetadata {
        GeneratorMetadata::new(
            0.2,
            &[
                (COUNT, "Stars on a 1024 px canvas"),
                (SIZE_MIN, "Smallest radius in reference pixels"),
                (SIZE_MAX, "Largest radius in reference pixels"),
            ],
        )
    }
}

/// Soft three-lobed clouds in the upper half of the canvas
pub struct Clouds;

impl Clouds {
    pub fn new() -> Self {
        Self
    }
}

impl TextureGenerator for Clouds {
    fn id(&self) -> GeneratorId {
        GeneratorId::Clouds
    }

    fn description(&self) -> &str {
        "Blurred white cloud banks"
    }

    fn validate_params(&self, params: &TextureParams) -> Result<()> {
        params.validate_common(self.id().as_str(), &[COUNT, BLUR])
    }

    fn generate(&self, canvas: &mut PixelBuffer, params: &TextureParams, rng: &mut StyleRng) -> Result<()> {
        let surface = Surface::of(canvas);
        let count = params.get_count_or(COUNT, 5);
        let blur = surface.size(params.get_f32_or(BLUR, 30.0));
        let paint = Paint::new(params.get_color_or(COLOR, Color::WHITE))
            .with_alpha(CLOUD_ALPHA * params.opacity)
            .with_blend(params.blend);
        let (w, h) = canvas.dimensions();

        for _ in 0..count {
            let x = uniform(rng, 0.0, surface.width);
            let y = uniform(rng, 0.0, surface.height * 0.5);
            let size = uniform(rng, 80.0, 230.0);

            // the lobes fill as one path, so overlaps must not double up
            let lobes = [
                (x, y, size),
                (x + size * 0.5, y, size * 0.8),
                (x - size * 0.3, y + size * 0.2, size * 0.6),
            ];
            let masks: Vec<CoverageMask> = lobes
                .iter()
                .filter_map(|&(lx, ly, r)| {
                    let (cx, cy) = surface.px(lx, ly);
                    Shape::SoftCircle {
                        cx,
                        cy,
                        radius: surface.size(r),
                        blur,
                    }
                    .mask(w, h)
                })
                .collect();
            let cloud = masks.iter().map(|m| m.rect()).reduce(|a, b| a.union(&b)).map(|rect| {
                let mut cloud = CoverageMask::new(rect);
                masks.iter().for_each(|m| cloud.merge(m));
                cloud
            });
            if let Some(mask) = cloud {
                paint_mask(canvas, &mask, &paint);
            }
        }
        Ok(())
    }
}

/// Slanted cyan streaks
pub struct Rain;

impl Rain {
    pub fn new() -> Self {
        Self
    }
}

impl TextureGenerator for Rain {
    fn id(&self) -> GeneratorId {
        GeneratorId::Rain
    }

    fn description(&self) -> &str {
        "Thin slanted rain streaks"
    }

    fn validate_params(&self, params: &TextureParams) -> Result<()> {
        params.validate_common(self.id().as_str(), &[COUNT, LINE_WIDTH])
    }

    fn generate(&self, canvas: &mut PixelBuffer, params: &TextureParams, rng: &mut StyleRng) -> Result<()> {
        let surface = Surface::of(canvas);
        let count = surface.count(params.get_count_or(COUNT, 150));
        let color = params.get_color_or(COLOR, Color::rgba(0, 255, 255, 0.15));
        let width = surface.size(params.get_f32_or(LINE_WIDTH, 1.0));

        for _ in 0..count {
            let x = uniform(rng, 0.0, surface.width);
            let y = uniform(rng, 0.0, surface.height);
            let length = uniform(rng, 10.0, 40.0);
            let alpha = uniform(rng, 0.1, 0.5);

            let paint = Paint::new(color)
                .with_alpha(alpha * params.opacity)
                .with_blend(params.blend);
            stroke_line(canvas, surface.px(x, y), surface.px(x - 2.0, y + length), width, &paint);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_stars_stay_in_upper_band() {
        let mut canvas = PixelBuffer::filled(200, 200, Color::BLACK).unwrap();
        let mut rng = StyleRng::seed_from_u64(5);
        let params = TextureParams::new().set(COUNT, 20000.0);
        Stars::new().generate(&mut canvas, &params, &mut rng).unwrap();

        // star centres sit above 70 %, halos reach a few pixels further
        let lit = |y: i32| (0..200).any(|x| canvas.get_pixel(x, y) != Color::BLACK);
        assert!(lit(20));
        assert!(!lit(199));
    }

    #[test]
    fn test_clouds_only_brighten_sky() {
        let sky = Color::rgb(90, 140, 220);
        let mut canvas = PixelBuffer::filled(256, 256, sky).unwrap();
        let mut rng = StyleRng::seed_from_u64(2);
        Clouds::new()
            .generate(&mut canvas, &TextureParams::new(), &mut rng)
            .unwrap();
        let raw = canvas.as_raw();
        assert!(raw.chunks(4).all(|px| px[0] >= 90 && px[1] >= 140 && px[2] >= 220));
        assert!(raw.chunks(4).any(|px| px[0] > 90));
    }

    #[test]
    fn test_rain_count_zero_draws_nothing() {
        let mut canvas = PixelBuffer::filled(64, 64, Color::BLACK).unwrap();
        let before = canvas.clone();
        let mut rng = StyleRng::seed_from_u64(2);
        Rain::new()
            .generate(&mut canvas, &TextureParams::new().set(COUNT, 0.0), &mut rng)
            .unwrap();
        assert_eq!(canvas, before);
    }
}
