//! # Style System
//!
//! A style is data: display metadata plus an ordered list of [`LayerOp`]s.
//! The catalog is closed and fixed; the [`StyleRegistry`] resolves ids to
//! definitions and lists them for display.
//!
//! ## Built-in Styles
//!
//! - **Classic**: watercolor, oil, impressionist, vangogh, sketch, pastel
//! - **Modern**: pixel, cyberpunk, neon, abstract, cubism, popart, graffiti
//! - **Anime**: miyazaki, manga, lineart
//! - **Traditional**: ink, ukiyoe
//! - **3D**: 3drender, lowpoly, origami
//! - **Fantasy**: steampunk
//! - **Minimal**: chalk, papercut
//!
//! ## Usage
//!
//! ```rust
//! use sketch2art::styles::StyleRegistry;
//!
//! let registry = StyleRegistry::builtin();
//! let ink = registry.get("ink").unwrap();
//! println!("{} {} has {} layer ops", ink.icon, ink.display_name, ink.pipeline.len());
//! ```

mod catalog;
pub mod definition;
pub mod ops;
pub mod registry;

// Re-exports for convenience
pub use definition::{Category, StyleDefinition, StyleSummary};
pub use ops::{
    ClipRegion, ClipShape, ClipTransform, DrawSource, Glow, LayerOp, Pixelate, SampledLayer, ShapeScatter,
    SourcePlacement, TriangleMesh,
};
pub use registry::StyleRegistry;
