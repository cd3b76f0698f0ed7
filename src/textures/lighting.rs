use crate::{
    error::{GeneratorError, Result},
    raster::{
        draw::{fill_shape, Paint, Shape},
        gradient::{fill_gradient, ColorStop, Gradient},
        Color, PixelBuffer,
    },
    textures::{
        GeneratorId, GeneratorMetadata, StyleRng, Surface, TextureGenerator, TextureParams, BLUR, COLOR, INNER,
        OUTER,
    },
};

pub const CENTER_X: &str = "center_x";
pub const CENTER_Y: &str = "center_y";
pub const RADIUS_X: &str = "radius_x";
pub const RADIUS_Y: &str = "radius_y";

/// Radial darkening toward the canvas edges
///
/// Transparent inside `inner`, ramping to `color` at `outer`; both radii
/// are fractions of the canvas width. `opacity` sets the edge strength.
pub struct Vignette;

impl Vignette {
    pub fn new() -> Self {
        Self
    }
}

impl TextureGenerator for Vignette {
    fn id(&self) -> GeneratorId {
        GeneratorId::Vignette
    }

    fn description(&self) -> &str {
        "Radial edge darkening"
    }

    fn validate_params(&self, params: &TextureParams) -> Result<()> {
        params.validate_common(self.id().as_str(), &[INNER, OUTER])?;
        let inner = params.get_f32_or(INNER, 0.4);
        let outer = params.get_f32_or(OUTER, 0.85);
        if outer < inner {
            return Err(GeneratorError::InvalidParameters {
                generator: self.id().to_string(),
                details: format!("outer radius {} is inside inner radius {}", outer, inner),
            }
            .into());
        }
        Ok(())
    }

    fn generate(&self, canvas: &mut PixelBuffer, params: &TextureParams, _rng: &mut StyleRng) -> Result<()> {
        let color = params.get_color_or(COLOR, Color::BLACK);
        let gradient = Gradient::radial(
            (0.5, 0.5),
            params.get_f32_or(INNER, 0.4),
            params.get_f32_or(OUTER, 0.85),
            vec![
                ColorStop::new(0.0, color.with_alpha(0.0)),
                ColorStop::new(1.0, color),
            ],
        );
        fill_gradient(canvas, &gradient, params.blend, params.opacity, None);
        Ok(())
    }

    fn metadata(&self) -> GeneratorMetadata {
        GeneratorMetadata::new(
            0.2,
            &[
                (INNER, "Radius where darkening starts, fraction of width"),
                (OUTER, "Radius of full darkening, fraction of width"),
                (COLOR, "Edge colour"),
            ],
        )
    }
}

/// Soft elliptical contact shadow
pub struct DropShadow;

impl DropShadow {
    pub fn new() -> Self {
        Self
    }
}

impl TextureGenerator for DropShadow {
    fn id(&self) -> GeneratorId {
        GeneratorId::DropShadow
    }

    fn description(&self) -> &str {
        "Blurred ellipse grounding the subject"
    }

    fn validate_params(&self, params: &TextureParams) -> Result<()> {
        params.validate_common(self.id().as_str(), &[RADIUS_X, RADIUS_Y, BLUR])
    }

    fn generate(&self, canvas: &mut PixelBuffer, params: &TextureParams, _rng: &mut StyleRng) -> Result<()> {
        let surface = Surface::of(canvas);
        let (w, h) = (canvas.width() as f32, canvas.height() as f32);
        let shape = Shape::Ellipse {
            cx: params.get_f32_or(CENTER_X, 0.5) * w,
            cy: params.get_f32_or(CENTER_Y, 0.85) * h,
            rx: params.get_f32_or(RADIUS_X, 0.3) * w,
            ry: params.get_f32_or(RADIUS_Y, 0.1) * h,
            blur: surface.size(params.get_f32_or(BLUR, 30.0)),
        };
        let paint = Paint::new(params.get_color_or(COLOR, Color::BLACK))
            .with_alpha(params.opacity)
            .with_blend(params.blend);
        fill_shape(canvas, &shape, &paint);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_vignette_darkens_corners_only() {
        let mut canvas = PixelBuffer::filled(100, 100, Color::WHITE).unwrap();
        let mut rng = StyleRng::seed_from_u64(0);
        let params = TextureParams::new().with_opacity(0.5);
        Vignette::new().generate(&mut canvas, &params, &mut rng).unwrap();

        assert_eq!(canvas.get_pixel(50, 50), Color::WHITE);
        assert!(canvas.get_pixel(0, 0).r < 200);
    }

    #[test]
    fn test_inverted_radii_rejected() {
        let params = TextureParams::new().set(INNER, 0.9).set(OUTER, 0.2);
        assert!(Vignette::new().validate_params(&params).is_err());
    }

    #[test]
    fn test_drop_shadow_sits_low() {
        let mut canvas = PixelBuffer::filled(128, 128, Color::WHITE).unwrap();
        let mut rng = StyleRng::seed_from_u64(0);
        DropShadow::new()
            .generate(&mut canvas, &TextureParams::new().with_opacity(0.2), &mut rng)
            .unwrap();
        assert!(canvas.get_pixel(64, 109).r < 255);
        assert_eq!(canvas.get_pixel(64, 10), Color::WHITE);
    }
}
