//! # sketch2art
//!
//! Turn a line sketch into stylized artwork with deterministic, layered image pipelines.
//!
//! Each style is an ordered list of layer ops: background fills, filtered and
//! blended draws of the sketch, colour washes, clipped fragments and procedural
//! textures (paper grain, star fields, brick courses, seal stamps and so on).
//! A render always comes out at the canonical size and is byte-for-byte
//! reproducible from its seed.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sketch2art::{list_styles, render_style, raster::{Color, PixelBuffer}};
//!
//! # fn main() -> sketch2art::Result<()> {
//! let mut sketch = PixelBuffer::new(512, 512)?;
//! sketch.block_fill(100, 240, 300, 6, Color::BLACK);
//!
//! for style in list_styles() {
//!     println!("{} {} - {}", style.icon, style.display_name, style.description);
//! }
//!
//! let art = render_style(&sketch, "watercolor", 42)?;
//! assert_eq!(art.dimensions(), (1024, 1024));
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! The library is organized into several key modules:
//!
//! - [`raster`] - Pixel buffers, blend modes, filters, quantization and drawing
//! - [`textures`] - Procedural texture generators
//! - [`styles`] - Layer op vocabulary and the built-in style catalog
//! - [`pipeline`] - The executor that runs a style against a sketch
//! - [`config`] - Configuration management

pub mod config;
pub mod error;
pub mod pipeline;
pub mod raster;
pub mod styles;
pub mod textures;

// Re-export commonly used types for convenience
pub use crate::{
    config::{Config, RenderConfig},
    error::{Result, StylizerError},
    pipeline::{PipelineExecutor, RenderOutput},
    raster::PixelBuffer,
    styles::{StyleRegistry, StyleSummary},
};

/// Render `input` in the style `style_id` at the default 1024x1024 canonical size
pub fn render_style(input: &PixelBuffer, style_id: &str, seed: u64) -> Result<PixelBuffer> {
    let executor = PipelineExecutor::new(RenderConfig::default());
    Ok(executor.run(input, style_id, seed)?.image)
}

/// Display metadata for every built-in style, grouped by category
pub fn list_styles() -> Vec<StyleSummary> {
    StyleRegistry::builtin().summaries()
}

/// Run [`render_style`] on the blocking pool.
///
/// The render is one unit of work: dropping the future discards its result,
/// and a panicked or aborted render task surfaces as [`StylizerError::Cancelled`].
pub async fn render_style_async(input: PixelBuffer, style_id: String, seed: u64) -> Result<PixelBuffer> {
    on_blocking_pool(move || render_style(&input, &style_id, seed)).await
}

async fn on_blocking_pool<T, F>(work: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|_| StylizerError::Cancelled)?
}
