use std::sync::Arc;

use rand::SeedableRng;
use tracing::trace;

use crate::{
    error::Result,
    raster::{FilterChain, PixelBuffer, PixelRect},
    textures::{StyleRng, Surface, TextureLibrary},
};

/// Placement of the clip a nested op runs inside
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipFrame {
    /// Shape centre in canvas pixels
    pub center: (f32, f32),
    /// Shape rotation in radians
    pub rotation: f32,
    /// Pixels the clip can reach
    pub rect: PixelRect,
}

/// Per-run state threaded through every layer op
///
/// Owns the input fitted to the canonical size, the seeded random stream
/// and a cache of filtered copies of the input, so repeated draws with the
/// same filter chain only filter once.
pub struct RenderContext {
    source: Arc<PixelBuffer>,
    filtered: Vec<(FilterChain, Arc<PixelBuffer>)>,
    rng: StyleRng,
    surface: Surface,
    clip: Option<ClipFrame>,
    iteration: u32,
    textures: &'static TextureLibrary,
}

impl RenderContext {
    /// `source` must already be at the canvas size
    pub fn new(source: PixelBuffer, seed: u64, textures: &'static TextureLibrary) -> Self {
        let surface = Surface::of(&source);
        Self {
            source: Arc::new(source),
            filtered: Vec::new(),
            rng: StyleRng::seed_from_u64(seed),
            surface,
            clip: None,
            iteration: 0,
            textures,
        }
    }

    pub fn source(&self) -> &PixelBuffer {
        &self.source
    }

    /// The input run through `chain`, with blur radii scaled to the canvas
    pub fn filtered_source(&mut self, chain: &FilterChain) -> Result<Arc<PixelBuffer>> {
        if chain.is_empty() {
            return Ok(Arc::clone(&self.source));
        }
        if let Some((_, cached)) = self.filtered.iter().find(|(key, _)| key == chain) {
            return Ok(Arc::clone(cached));
        }

        trace!("Filtering source with {} filters", chain.filters().len());
        let filtered = Arc::new(chain.scaled(self.surface.scale).apply(&self.source)?);
        self.filtered.push((chain.clone(), Arc::clone(&filtered)));
        Ok(filtered)
    }

    pub fn rng_mut(&mut self) -> &mut StyleRng {
        &mut self.rng
    }

    pub fn surface(&self) -> Surface {
        self.surface
    }

    pub fn textures(&self) -> &'static TextureLibrary {
        self.textures
    }

    pub fn clip(&self) -> Option<ClipFrame> {
        self.clip
    }

    /// Pixels the current clip can reach, `None` outside any clip
    pub fn clip_rect(&self) -> Option<PixelRect> {
        self.clip.map(|frame| frame.rect)
    }

    /// Enter a clip, returning the frame to restore on exit
    pub fn enter_clip(&mut self, frame: ClipFrame) -> Option<ClipFrame> {
        self.clip.replace(frame)
    }

    pub fn leave_clip(&mut self, outer: Option<ClipFrame>) {
        self.clip = outer;
    }

    /// Index of the current repeat pass
    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    /// Set the repeat pass, returning the previous one
    pub fn set_iteration(&mut self, iteration: u32) -> u32 {
        std::mem::replace(&mut self.iteration, iteration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::Color;
    use rand::Rng;

    fn context(seed: u64) -> RenderContext {
        let source = PixelBuffer::filled(64, 64, Color::rgb(200, 40, 40)).unwrap();
        RenderContext::new(source, seed, TextureLibrary::builtin())
    }

    #[test]
    fn test_filtered_source_is_cached() {
        let mut ctx = context(1);
        let chain = FilterChain::new().grayscale(1.0);

        let first = ctx.filtered_source(&chain).unwrap();
        let second = ctx.filtered_source(&chain).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_ne!(first.as_raw(), ctx.source().as_raw());

        let plain = ctx.filtered_source(&FilterChain::new()).unwrap();
        assert_eq!(plain.as_raw(), ctx.source().as_raw());
    }

    #[test]
    fn test_invalid_chain_fails() {
        let mut ctx = context(1);
        assert!(ctx.filtered_source(&FilterChain::new().blur(-1.0)).is_err());
    }

    #[test]
    fn test_same_seed_same_stream() {
        let mut a = context(42);
        let mut b = context(42);
        let xs: Vec<u32> = (0..8).map(|_| a.rng_mut().gen()).collect();
        let ys: Vec<u32> = (0..8).map(|_| b.rng_mut().gen()).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn test_clip_nesting_restores_outer_frame() {
        let mut ctx = context(1);
        assert_eq!(ctx.clip_rect(), None);

        let outer = ClipFrame {
            center: (10.0, 10.0),
            rotation: 0.0,
            rect: PixelRect::new(0, 0, 20, 20),
        };
        let saved = ctx.enter_clip(outer);
        let inner = ClipFrame {
            center: (5.0, 5.0),
            rotation: 1.0,
            rect: PixelRect::new(0, 0, 10, 10),
        };
        let restore = ctx.enter_clip(inner);
        assert_eq!(ctx.clip_rect(), Some(PixelRect::new(0, 0, 10, 10)));

        ctx.leave_clip(restore);
        assert_eq!(ctx.clip(), Some(outer));
        ctx.leave_clip(saved);
        assert_eq!(ctx.clip(), None);
    }
}
