//! Raster primitives: the pixel buffer, blend math, filters, quantization
//! and anti-aliased drawing that the style pipelines are built from.

pub mod blend;
pub mod buffer;
pub mod color;
pub mod draw;
pub mod filter;
pub mod gradient;
pub mod mask;
pub mod quantize;

pub use blend::BlendMode;
pub use buffer::{PixelBuffer, ResampleFilter};
pub use color::Color;
pub use draw::{Paint, Shape};
pub use filter::{ColorChannel, Filter, FilterChain};
pub use gradient::{ColorStop, Gradient, GradientKind};
pub use mask::{CoverageMask, PixelRect};
pub use quantize::{ColorQuantizer, Palette};
