//! # Render Pipeline
//!
//! Executes a style's layer ops, in declared order, against a canvas at the
//! canonical size. Each run owns its canvas, its fitted copy of the input
//! and a random stream seeded from the caller's seed, so runs never share
//! mutable state and the same inputs always give the same bytes.
//!
//! ## Usage
//!
//! ```rust
//! use sketch2art::config::RenderConfig;
//! use sketch2art::pipeline::PipelineExecutor;
//! use sketch2art::raster::{Color, PixelBuffer};
//!
//! let mut sketch = PixelBuffer::new(64, 64).unwrap();
//! sketch.block_fill(16, 16, 32, 4, Color::BLACK);
//!
//! let executor = PipelineExecutor::new(RenderConfig::with_size(128, 128));
//! let output = executor.run(&sketch, "sketch", 42).unwrap();
//! assert_eq!(output.image.dimensions(), (128, 128));
//! ```

pub mod context;
pub mod executor;
pub mod run;

mod layers;

pub use context::{ClipFrame, RenderContext};
pub use executor::{PipelineExecutor, RenderJob};
pub use run::{RenderOutput, RenderRun, RunState, SkippedOp};
