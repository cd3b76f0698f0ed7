//! # Procedural Texture Library
//!
//! Generators that synthesize decorative content (grain, star fields, grid
//! lines, brick courses, stamps and so on) straight onto a [`PixelBuffer`].
//! Every randomized placement draws from the run's [`StyleRng`], so a run
//! is reproducible from its seed.
//!
//! Geometry is authored for a 1024 px wide canvas and scaled to the real
//! canvas width; counts scale with canvas area so density stays constant.
//!
//! ## Usage
//!
//! ```rust
//! use rand::SeedableRng;
//! use sketch2art::raster::{Color, PixelBuffer};
//! use sketch2art::textures::{GeneratorId, StyleRng, TextureLibrary, TextureParams};
//!
//! let mut canvas = PixelBuffer::filled(256, 256, Color::WHITE).unwrap();
//! let mut rng = StyleRng::seed_from_u64(7);
//! let params = TextureParams::new().set("intensity", 0.03);
//! TextureLibrary::builtin()
//!     .generate(GeneratorId::PaperGrain, &mut canvas, &params, &mut rng)
//!     .unwrap();
//! ```
//!
//! [`PixelBuffer`]: crate::raster::PixelBuffer

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod library;
pub mod params;
pub mod traits;

// Generator implementations
mod blobs;
mod grain;
mod lighting;
mod ornaments;
mod patterns;
mod sky;
mod strokes;

pub use library::TextureLibrary;
pub use lighting::{CENTER_X, CENTER_Y, RADIUS_X, RADIUS_Y};
pub use ornaments::{MARGIN, SIZE, TEETH};
pub use patterns::DOT_SIZE;
pub use params::{ParamValue, TextureParams};
pub use traits::{GeneratorMetadata, TextureGenerator};

/// The random stream threaded through a render
pub type StyleRng = SmallRng;

/// Canvas width the catalog's pixel quantities are authored for
pub const REFERENCE_WIDTH: f32 = 1024.0;

// Shared parameter keys
pub const COUNT: &str = "count";
pub const COLOR: &str = "color";
pub const COLORS: &str = "colors";
pub const BLUR: &str = "blur";
pub const INTENSITY: &str = "intensity";
pub const SPACING: &str = "spacing";
pub const LINE_WIDTH: &str = "line_width";
pub const SIZE_MIN: &str = "size_min";
pub const SIZE_MAX: &str = "size_max";
pub const INNER: &str = "inner";
pub const OUTER: &str = "outer";

/// Identifier of a built-in generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneratorId {
    PaperGrain,
    CanvasGrain,
    ChalkDust,
    Scanlines,
    Vignette,
    Stars,
    Clouds,
    Rain,
    WoodGrain,
    Gears,
    Bricks,
    BenDayDots,
    ScreenTone,
    SpeedLines,
    InkBleed,
    SealStamp,
    PaintDrips,
    DecorativeBorder,
    Splatters,
    BrushStrokes,
    Swirls,
    NeonGrid,
    SoftBlobs,
    RandomLines,
    FoldLines,
    DropShadow,
}

impl GeneratorId {
    pub const ALL: [GeneratorId; 26] = [
        GeneratorId::PaperGrain,
        GeneratorId::CanvasGrain,
        GeneratorId::ChalkDust,
        GeneratorId::Scanlines,
        GeneratorId::Vignette,
        GeneratorId::Stars,
        GeneratorId::Clouds,
        GeneratorId::Rain,
        GeneratorId::WoodGrain,
        GeneratorId::Gears,
        GeneratorId::Bricks,
        GeneratorId::BenDayDots,
        GeneratorId::ScreenTone,
        GeneratorId::SpeedLines,
        GeneratorId::InkBleed,
        GeneratorId::SealStamp,
        GeneratorId::PaintDrips,
        GeneratorId::DecorativeBorder,
        GeneratorId::Splatters,
        GeneratorId::BrushStrokes,
        GeneratorId::Swirls,
        GeneratorId::NeonGrid,
        GeneratorId::SoftBlobs,
        GeneratorId::RandomLines,
        GeneratorId::FoldLines,
        GeneratorId::DropShadow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GeneratorId::PaperGrain => "paper_grain",
            GeneratorId::CanvasGrain => "canvas_grain",
            GeneratorId::ChalkDust => "chalk_dust",
            GeneratorId::Scanlines => "scanlines",
            GeneratorId::Vignette => "vignette",
            GeneratorId::Stars => "stars",
            GeneratorId::Clouds => "clouds",
            GeneratorId::Rain => "rain",
            GeneratorId::WoodGrain => "wood_grain",
            GeneratorId::Gears => "gears",
            GeneratorId::Bricks => "bricks",
            GeneratorId::BenDayDots => "ben_day_dots",
            GeneratorId::ScreenTone => "screen_tone",
            GeneratorId::SpeedLines => "speed_lines",
            GeneratorId::InkBleed => "ink_bleed",
            GeneratorId::SealStamp => "seal_stamp",
            GeneratorId::PaintDrips => "paint_drips",
            GeneratorId::DecorativeBorder => "decorative_border",
            GeneratorId::Splatters => "splatters",
            GeneratorId::BrushStrokes => "brush_strokes",
            GeneratorId::Swirls => "swirls",
            GeneratorId::NeonGrid => "neon_grid",
            GeneratorId::SoftBlobs => "soft_blobs",
            GeneratorId::RandomLines => "random_lines",
            GeneratorId::FoldLines => "fold_lines",
            GeneratorId::DropShadow => "drop_shadow",
        }
    }
}

impl fmt::Display for GeneratorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Uniform sample in `[lo, hi)`; never panics on an empty range
pub fn uniform(rng: &mut StyleRng, lo: f32, hi: f32) -> f32 {
    lo + rng.gen::<f32>() * (hi - lo)
}

/// Uniform sample in `[-range / 2, range / 2)`
pub fn jitter(rng: &mut StyleRng, range: f32) -> f32 {
    (rng.gen::<f32>() - 0.5) * range
}

/// Random element of a non-empty slice
pub fn pick<'a, T>(rng: &mut StyleRng, items: &'a [T]) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }
    items.get(rng.gen_range(0..items.len()))
}

/// Independent stream seeded from `rng`, for work split across threads
pub fn fork(rng: &mut StyleRng) -> StyleRng {
    StyleRng::seed_from_u64(rng.gen())
}

/// Canvas geometry in reference units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surface {
    /// Real pixels per reference pixel
    pub scale: f32,
    /// Canvas width in reference pixels
    pub width: f32,
    /// Canvas height in reference pixels
    pub height: f32,
}

impl Surface {
    pub fn of(canvas: &crate::raster::PixelBuffer) -> Self {
        let scale = canvas.width() as f32 / REFERENCE_WIDTH;
        Self {
            scale,
            width: REFERENCE_WIDTH,
            height: canvas.height() as f32 / scale,
        }
    }

    /// Reference point to canvas pixels
    pub fn px(&self, x: f32, y: f32) -> (f32, f32) {
        (x * self.scale, y * self.scale)
    }

    /// Reference length to canvas pixels
    pub fn size(&self, v: f32) -> f32 {
        v * self.scale
    }

    /// Count authored for the reference canvas, scaled by area
    pub fn count(&self, n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        let area = self.scale * self.scale * (self.height / REFERENCE_WIDTH);
        ((n as f32 * area).round() as usize).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::{Color, PixelBuffer};

    #[test]
    fn test_generator_ids_round_trip_through_names() {
        for id in GeneratorId::ALL {
            assert_eq!(parse_id(id.as_str()), id);
        }
    }

    fn parse_id(name: &str) -> GeneratorId {
        #[derive(Deserialize)]
        struct Wrapper {
            id: GeneratorId,
        }
        let wrapper: Wrapper = toml::from_str(&format!("id = \"{}\"", name)).unwrap();
        wrapper.id
    }

    #[test]
    fn test_uniform_handles_empty_range() {
        let mut rng = StyleRng::seed_from_u64(1);
        assert_eq!(uniform(&mut rng, 5.0, 5.0), 5.0);
        for _ in 0..100 {
            let v = uniform(&mut rng, 20.0, 80.0);
            assert!((20.0..80.0).contains(&v));
        }
        assert!(pick::<u8>(&mut rng, &[]).is_none());
    }

    #[test]
    fn test_surface_scaling() {
        let canvas = PixelBuffer::filled(512, 256, Color::WHITE).unwrap();
        let surface = Surface::of(&canvas);
        assert_eq!(surface.scale, 0.5);
        assert_eq!(surface.height, 512.0);
        assert_eq!(surface.px(100.0, 200.0), (50.0, 100.0));
        assert_eq!(surface.count(8000), 1000);
        assert_eq!(surface.count(0), 0);
        assert_eq!(surface.count(1), 1);
    }
}
