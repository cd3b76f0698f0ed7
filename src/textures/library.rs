use std::collections::HashMap;
use std::sync::OnceLock;

use tracing::trace;

use crate::{
    error::{GeneratorError, Result},
    raster::PixelBuffer,
    textures::{
        blobs::{InkBleed, SoftBlobs, Splatters},
        grain::{CanvasGrain, ChalkDust, PaperGrain},
        lighting::{DropShadow, Vignette},
        ornaments::{DecorativeBorder, Gears, SealStamp},
        patterns::{BenDayDots, Bricks, FoldLines, NeonGrid, Scanlines, ScreenTone, WoodGrain},
        sky::{Clouds, Rain, Stars},
        strokes::{BrushStrokes, PaintDrips, RandomLines, SpeedLines, Swirls},
        GeneratorId, StyleRng, TextureGenerator, TextureParams,
    },
};

/// Registry of procedural texture generators
///
/// The library is the one place style pipelines look generators up by id.
/// The built-in set is constructed once and shared for the process lifetime.
pub struct TextureLibrary {
    generators: HashMap<GeneratorId, Box<dyn TextureGenerator>>,
}

impl TextureLibrary {
    /// Create a library with all built-in generators
    pub fn new() -> Self {
        let mut library = Self {
            generators: HashMap::new(),
        };

        library.register_builtin_generators();
        library
    }

    /// Shared built-in library
    pub fn builtin() -> &'static TextureLibrary {
        static LIBRARY: OnceLock<TextureLibrary> = OnceLock::new();
        LIBRARY.get_or_init(TextureLibrary::new)
    }

    fn register_builtin_generators(&mut self) {
        // Grain and dust
        self.register(Box::new(PaperGrain::new()));
        self.register(Box::new(CanvasGrain::new()));
        self.register(Box::new(ChalkDust::new()));

        // Light falloff
        self.register(Box::new(Vignette::new()));
        self.register(Box::new(DropShadow::new()));

        // Sky
        self.register(Box::new(Stars::new()));
        self.register(Box::new(Clouds::new()));
        self.register(Box::new(Rain::new()));

        // Repeating patterns
        self.register(Box::new(Scanlines::new()));
        self.register(Box::new(ScreenTone::new()));
        self.register(Box::new(BenDayDots::new()));
        self.register(Box::new(Bricks::new()));
        self.register(Box::new(NeonGrid::new()));
        self.register(Box::new(WoodGrain::new()));
        self.register(Box::new(FoldLines::new()));

        // Strokes
        self.register(Box::new(BrushStrokes::new()));
        self.register(Box::new(Swirls::new()));
        self.register(Box::new(SpeedLines::new()));
        self.register(Box::new(RandomLines::new()));
        self.register(Box::new(PaintDrips::new()));

        // Soft blobs
        self.register(Box::new(Splatters::new()));
        self.register(Box::new(SoftBlobs::new()));
        self.register(Box::new(InkBleed::new()));

        // Ornaments
        self.register(Box::new(Gears::new()));
        self.register(Box::new(SealStamp::new()));
        self.register(Box::new(DecorativeBorder::new()));
    }

    /// Register a generator, replacing any previous one with the same id
    pub fn register(&mut self, generator: Box<dyn TextureGenerator>) {
        self.generators.insert(generator.id(), generator);
    }

    /// Get a generator by id
    pub fn get(&self, id: GeneratorId) -> Option<&dyn TextureGenerator> {
        self.generators.get(&id).map(|g| g.as_ref())
    }

    /// Validate the parameters and run a generator against the canvas
    pub fn generate(
        &self,
        id: GeneratorId,
        canvas: &mut PixelBuffer,
        params: &TextureParams,
        rng: &mut StyleRng,
    ) -> Result<()> {
        let generator = self.get(id).ok_or_else(|| GeneratorError::Failed {
            generator: id.to_string(),
            reason: "generator is not registered".to_string(),
        })?;

        generator.validate_params(params)?;
        trace!("Running texture generator {}", id);
        generator.generate(canvas, params, rng)
    }

    /// All registered ids, in declaration order
    pub fn ids(&self) -> Vec<GeneratorId> {
        GeneratorId::ALL
            .into_iter()
            .filter(|id| self.generators.contains_key(id))
            .collect()
    }

    pub fn has_generator(&self, id: GeneratorId) -> bool {
        self.generators.contains_key(&id)
    }

    /// Get the number of registered generators
    pub fn len(&self) -> usize {
        self.generators.len()
    }

    /// Check if the library is empty
    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }
}

impl Default for TextureLibrary {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::Color;
    use rand::SeedableRng;

    #[test]
    fn test_every_generator_is_registered() {
        let library = TextureLibrary::new();
        assert_eq!(library.len(), GeneratorId::ALL.len());
        for id in GeneratorId::ALL {
            let generator = library.get(id).unwrap();
            assert_eq!(generator.id(), id);
            assert!(!generator.description().is_empty());
        }
        assert_eq!(library.ids(), GeneratorId::ALL.to_vec());
    }

    #[test]
    fn test_every_generator_runs_with_defaults() {
        let library = TextureLibrary::builtin();
        for id in GeneratorId::ALL {
            let mut canvas = PixelBuffer::filled(128, 128, Color::rgb(120, 110, 100)).unwrap();
            let mut rng = StyleRng::seed_from_u64(42);
            library
                .generate(id, &mut canvas, &TextureParams::new(), &mut rng)
                .unwrap();
            assert_eq!(canvas.dimensions(), (128, 128));
            assert!(canvas.is_opaque(), "{} broke opacity", id);
        }
    }

    #[test]
    fn test_generators_are_deterministic() {
        let library = TextureLibrary::builtin();
        for id in GeneratorId::ALL {
            let render = || {
                let mut canvas = PixelBuffer::filled(96, 96, Color::rgb(60, 60, 90)).unwrap();
                let mut rng = StyleRng::seed_from_u64(9);
                library
                    .generate(id, &mut canvas, &TextureParams::new(), &mut rng)
                    .unwrap();
                canvas
            };
            assert_eq!(render(), render(), "{} is not deterministic", id);
        }
    }

    #[test]
    fn test_invalid_opacity_is_rejected_before_drawing() {
        let library = TextureLibrary::builtin();
        let mut canvas = PixelBuffer::filled(32, 32, Color::WHITE).unwrap();
        let before = canvas.clone();
        let mut rng = StyleRng::seed_from_u64(1);
        let err = library
            .generate(
                GeneratorId::Stars,
                &mut canvas,
                &TextureParams::new().with_opacity(-0.5),
                &mut rng,
            )
            .unwrap_err();
        assert!(err.is_recoverable());
        assert_eq!(canvas, before);
    }

    #[test]
    fn test_degenerate_spacing_and_count_fail_fast() {
        let library = TextureLibrary::builtin();
        let mut canvas = PixelBuffer::filled(64, 64, Color::WHITE).unwrap();
        let before = canvas.clone();
        let mut rng = StyleRng::seed_from_u64(1);

        let cases = [
            (GeneratorId::Scanlines, TextureParams::new().set(crate::textures::SPACING, 1e-6f32)),
            (GeneratorId::ScreenTone, TextureParams::new().set(crate::textures::SPACING, 1e-6f32)),
            (GeneratorId::BenDayDots, TextureParams::new().set(crate::textures::DOT_SIZE, 1e-6f32)),
            (GeneratorId::Stars, TextureParams::new().set(crate::textures::COUNT, 1e12f32)),
            (GeneratorId::WoodGrain, TextureParams::new().set(crate::textures::COUNT, 1e12f32)),
        ];
        for (id, params) in cases {
            let err = library.generate(id, &mut canvas, &params, &mut rng).unwrap_err();
            assert!(err.is_recoverable(), "{} should be skippable", id);
        }
        assert_eq!(canvas, before);
    }
}
