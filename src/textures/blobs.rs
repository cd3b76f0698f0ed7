use crate::{
    error::Result,
    raster::{
        draw::{fill_shape, Paint, Shape},
        Color, PixelBuffer,
    },
    textures::{
        pick, uniform, GeneratorId, GeneratorMetadata, StyleRng, Surface, TextureGenerator, TextureParams, BLUR,
        COLOR, COLORS, COUNT, SIZE_MAX, SIZE_MIN,
    },
};

/// Layer alpha of a watercolour splatter
const SPLATTER_ALPHA: f32 = 0.25;

/// Layer alpha of an ink bleed
const BLEED_ALPHA: f32 = 0.15;

const SPLATTER_COLORS: [Color; 5] = [
    Color::rgba(255, 107, 107, 0.2),
    Color::rgba(78, 205, 196, 0.2),
    Color::rgba(255, 230, 109, 0.15),
    Color::rgba(199, 125, 255, 0.2),
    Color::rgba(150, 206, 180, 0.25),
];

/// Shared body of the blob generators: `count` soft discs at uniform
/// positions, each coloured by `color_for`
#[allow(clippy::too_many_arguments)]
fn scatter_discs<F>(
    canvas: &mut PixelBuffer,
    rng: &mut StyleRng,
    params: &TextureParams,
    count: usize,
    radius: (f32, f32),
    blur: f32,
    alpha: f32,
    mut color_for: F,
) where
    F: FnMut(&mut StyleRng) -> Color,
{
    let surface = Surface::of(canvas);
    let blur = surface.size(blur);
    for _ in 0..count {
        let (cx, cy) = surface.px(uniform(rng, 0.0, surface.width), uniform(rng, 0.0, surface.height));
        let r = surface.size(uniform(rng, radius.0, radius.1));
        let paint = Paint::new(color_for(rng))
            .with_alpha(alpha * params.opacity)
            .with_blend(params.blend);
        fill_shape(canvas, &Shape::SoftCircle { cx, cy, radius: r, blur }, &paint);
    }
}

/// Blurred translucent colour drops in a pastel palette
pub struct Splatters;

impl Splatters {
    pub fn new() -> Self {
        Self
    }
}

impl TextureGenerator for Splatters {
    fn id(&self) -> GeneratorId {
        GeneratorId::Splatters
    }

    fn description(&self) -> &str {
        "Soft watercolour splatters drawn from a colour list"
    }

    fn validate_params(&self, params: &TextureParams) -> Result<()> {
        params.validate_common(self.id().as_str(), &[COUNT, BLUR, SIZE_MIN, SIZE_MAX])
    }

    fn generate(&self, canvas: &mut PixelBuffer, params: &TextureParams, rng: &mut StyleRng) -> Result<()> {
        let colors = params.get_colors(COLORS).unwrap_or(&SPLATTER_COLORS[..]).to_vec();
        scatter_discs(
            canvas,
            rng,
            params,
            params.get_count_or(COUNT, 25),
            (params.get_f32_or(SIZE_MIN, 20.0), params.get_f32_or(SIZE_MAX, 80.0)),
            params.get_f32_or(BLUR, 25.0),
            SPLATTER_ALPHA,
            |rng| pick(rng, &colors).copied().unwrap_or(Color::TRANSPARENT),
        );
        Ok(())
    }

    fn metadata(&self) -> GeneratorMetadata {
        GeneratorMetadata::new(
            0.3,
            &[
                (COUNT, "Number of splatters"),
                (COLORS, "Palette the splatters are drawn from"),
                (BLUR, "Edge softness in reference pixels"),
            ],
        )
    }
}

/// Generic soft discs of one colour
///
/// Used for colour patches and smudges; the style sets colour, size range,
/// blur, opacity and blend mode.
pub struct SoftBlobs;

impl SoftBlobs {
    pub fn new() -> Self {
        Self
    }
}

impl TextureGenerator for SoftBlobs {
    fn id(&self) -> GeneratorId {
        GeneratorId::SoftBlobs
    }

    fn description(&self) -> &str {
        "Soft discs of a single colour"
    }

    fn validate_params(&self, params: &TextureParams) -> Result<()> {
        params.validate_common(self.id().as_str(), &[COUNT, BLUR, SIZE_MIN, SIZE_MAX])
    }

    fn generate(&self, canvas: &mut PixelBuffer, params: &TextureParams, rng: &mut StyleRng) -> Result<()> {
        let color = params.get_color_or(COLOR, Color::WHITE);
        scatter_discs(
            canvas,
            rng,
            params,
            params.get_count_or(COUNT, 20),
            (params.get_f32_or(SIZE_MIN, 50.0), params.get_f32_or(SIZE_MAX, 150.0)),
            params.get_f32_or(BLUR, 30.0),
            1.0,
            |_| color,
        );
        Ok(())
    }
}

/// Dark blurred pools, like ink soaking into rice paper
pub struct InkBleed;

impl InkBleed {
    pub fn new() -> Self {
        Self
    }
}

impl TextureGenerator for InkBleed {
    fn id(&self) -> GeneratorId {
        GeneratorId::InkBleed
    }

    fn description(&self) -> &str {
        "Blurred ink pools"
    }

    fn validate_params(&self, params: &TextureParams) -> Result<()> {
        params.validate_common(self.id().as_str(), &[COUNT, BLUR])
    }

    fn generate(&self, canvas: &mut PixelBuffer, params: &TextureParams, rng: &mut StyleRng) -> Result<()> {
        let color = params.get_color_or(COLOR, Color::hex(0x1a1a1a));
        scatter_discs(
            canvas,
            rng,
            params,
            params.get_count_or(COUNT, 15),
            (30.0, 110.0),
            params.get_f32_or(BLUR, 20.0),
            BLEED_ALPHA,
            |_| color,
        );
        Ok(())
    }
}
