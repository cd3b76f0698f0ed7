use crate::{
    error::{Result, StyleError},
    raster::{BlendMode, Color, FilterChain, Gradient, Palette},
    textures::{GeneratorId, TextureParams},
};

/// One step of a style pipeline
///
/// Ops are plain data: every parameter a step needs travels with it, so
/// a pipeline is an ordered list that can be inspected and validated
/// without running it.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerOp {
    /// Paint a colour over the whole canvas
    FillSolid { color: Color },

    /// Paint a gradient over the whole canvas
    FillGradient {
        gradient: Gradient,
        blend: BlendMode,
        alpha: f32,
    },

    /// Draw the (filtered, placed) input sketch
    DrawSource(DrawSource),

    /// Wash a uniform tint through a blend mode
    TintOverlay {
        color: Color,
        blend: BlendMode,
        alpha: f32,
        filters: FilterChain,
    },

    /// Run a procedural texture generator
    Procedural {
        generator: GeneratorId,
        params: TextureParams,
    },

    /// Run nested ops, keeping their effect only inside a shape
    Clip { region: ClipRegion, ops: Vec<LayerOp> },

    /// Run nested ops `count` times
    Repeat { count: u32, ops: Vec<LayerOp> },

    /// Redraw the input as quantized blocks
    Pixelate(Pixelate),

    /// Geometry derived from samples of the input
    Sampled(SampledLayer),

    /// Put an opaque colour beneath everything drawn so far
    Underlay { color: Color },
}

impl LayerOp {
    pub fn fill(color: Color) -> Self {
        LayerOp::FillSolid { color }
    }

    pub fn gradient(gradient: Gradient) -> Self {
        LayerOp::FillGradient {
            gradient,
            blend: BlendMode::Normal,
            alpha: 1.0,
        }
    }

    pub fn blended_gradient(gradient: Gradient, blend: BlendMode, alpha: f32) -> Self {
        LayerOp::FillGradient { gradient, blend, alpha }
    }

    pub fn tint(color: Color, blend: BlendMode, alpha: f32) -> Self {
        LayerOp::TintOverlay {
            color,
            blend,
            alpha,
            filters: FilterChain::new(),
        }
    }

    pub fn filtered_tint(color: Color, blend: BlendMode, alpha: f32, filters: FilterChain) -> Self {
        LayerOp::TintOverlay {
            color,
            blend,
            alpha,
            filters,
        }
    }

    pub fn texture(generator: GeneratorId, params: TextureParams) -> Self {
        LayerOp::Procedural { generator, params }
    }

    pub fn clip(region: ClipRegion, ops: Vec<LayerOp>) -> Self {
        LayerOp::Clip { region, ops }
    }

    pub fn repeat(count: u32, ops: Vec<LayerOp>) -> Self {
        LayerOp::Repeat { count, ops }
    }

    /// Short name used in logs and run reports
    pub fn kind(&self) -> &'static str {
        match self {
            LayerOp::FillSolid { .. } => "fill_solid",
            LayerOp::FillGradient { .. } => "fill_gradient",
            LayerOp::DrawSource(_) => "draw_source",
            LayerOp::TintOverlay { .. } => "tint_overlay",
            LayerOp::Procedural { .. } => "procedural",
            LayerOp::Clip { .. } => "clip",
            LayerOp::Repeat { .. } => "repeat",
            LayerOp::Pixelate(_) => "pixelate",
            LayerOp::Sampled(_) => "sampled",
            LayerOp::Underlay { .. } => "underlay",
        }
    }

    /// Check the op's own parameters; nested ops are checked when they run
    pub fn validate(&self) -> Result<()> {
        match self {
            LayerOp::FillSolid { color } | LayerOp::Underlay { color } => check_color(self.kind(), color),
            LayerOp::FillGradient { gradient, alpha, .. } => {
                check_alpha(self.kind(), *alpha)?;
                gradient.validate()
            }
            LayerOp::DrawSource(draw) => draw.validate(),
            LayerOp::TintOverlay {
                color, alpha, filters, ..
            } => {
                check_color(self.kind(), color)?;
                check_alpha(self.kind(), *alpha)?;
                filters.validate()
            }
            // generator parameters are validated by the texture library
            LayerOp::Procedural { .. } => Ok(()),
            LayerOp::Clip { region, .. } => region.validate(),
            LayerOp::Repeat { .. } => Ok(()),
            LayerOp::Pixelate(pixelate) => pixelate.validate(),
            LayerOp::Sampled(layer) => layer.validate(),
        }
    }
}

impl From<DrawSource> for LayerOp {
    fn from(draw: DrawSource) -> Self {
        LayerOp::DrawSource(draw)
    }
}

impl From<Pixelate> for LayerOp {
    fn from(pixelate: Pixelate) -> Self {
        LayerOp::Pixelate(pixelate)
    }
}

impl From<SampledLayer> for LayerOp {
    fn from(layer: SampledLayer) -> Self {
        LayerOp::Sampled(layer)
    }
}

fn invalid(op: &str, reason: String) -> Result<()> {
    Err(StyleError::InvalidOp {
        op: op.to_string(),
        reason,
    }
    .into())
}

fn check_alpha(op: &str, alpha: f32) -> Result<()> {
    if !(0.0..=1.0).contains(&alpha) {
        return invalid(op, format!("alpha {} outside [0, 1]", alpha));
    }
    Ok(())
}

fn check_color(op: &str, color: &Color) -> Result<()> {
    if !(0.0..=1.0).contains(&color.alpha) {
        return invalid(op, format!("colour alpha {} outside [0, 1]", color.alpha));
    }
    Ok(())
}

fn check_range(op: &str, name: &str, range: (f32, f32)) -> Result<()> {
    if !range.0.is_finite() || !range.1.is_finite() || range.0 < 0.0 || range.1 < range.0 {
        return invalid(op, format!("{} range {:?} is not an ascending non-negative pair", name, range));
    }
    Ok(())
}

/// Where the source lands on the canvas
///
/// Offsets and ranges are in reference pixels (1024 px wide canvas).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SourcePlacement {
    /// Full canvas shifted by a fixed offset
    Offset { dx: f32, dy: f32 },
    /// Full canvas shifted by independent random offsets in `±range / 2`
    Jitter { range: f32 },
    /// Full canvas shifted along the diagonal by one random offset in `±range / 2`
    DiagonalJitter { range: f32 },
    /// Full canvas rotated about the canvas centre
    Rotated { degrees: f32 },
    /// Rotated with the enclosing clip shape about the clip's centre
    ClipFrame,
    /// Scaled into a rectangle given as canvas fractions
    Panel { x: f32, y: f32, w: f32, h: f32 },
}

impl Default for SourcePlacement {
    fn default() -> Self {
        SourcePlacement::Offset { dx: 0.0, dy: 0.0 }
    }
}

/// Recoloured, blurred halo drawn beneath the source
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glow {
    pub color: Color,
    /// Halo radius in reference pixels; the blur sigma is half of it
    pub radius: f32,
}

/// Parameters of a source draw
#[derive(Debug, Clone, PartialEq)]
pub struct DrawSource {
    pub placement: SourcePlacement,
    pub filters: FilterChain,
    pub alpha: f32,
    pub blend: BlendMode,
    pub glow: Option<Glow>,
}

impl Default for DrawSource {
    fn default() -> Self {
        Self {
            placement: SourcePlacement::default(),
            filters: FilterChain::new(),
            alpha: 1.0,
            blend: BlendMode::Normal,
            glow: None,
        }
    }
}

impl DrawSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offset(mut self, dx: f32, dy: f32) -> Self {
        self.placement = SourcePlacement::Offset { dx, dy };
        self
    }

    pub fn jitter(mut self, range: f32) -> Self {
        self.placement = SourcePlacement::Jitter { range };
        self
    }

    pub fn diagonal_jitter(mut self, range: f32) -> Self {
        self.placement = SourcePlacement::DiagonalJitter { range };
        self
    }

    pub fn rotated(mut self, degrees: f32) -> Self {
        self.placement = SourcePlacement::Rotated { degrees };
        self
    }

    pub fn in_clip_frame(mut self) -> Self {
        self.placement = SourcePlacement::ClipFrame;
        self
    }

    pub fn panel(mut self, x: f32, y: f32, w: f32, h: f32) -> Self {
        self.placement = SourcePlacement::Panel { x, y, w, h };
        self
    }

    pub fn filters(mut self, filters: FilterChain) -> Self {
        self.filters = filters;
        self
    }

    pub fn alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn blend(mut self, blend: BlendMode) -> Self {
        self.blend = blend;
        self
    }

    pub fn glow(mut self, color: Color, radius: f32) -> Self {
        self.glow = Some(Glow { color, radius });
        self
    }

    fn validate(&self) -> Result<()> {
        check_alpha("draw_source", self.alpha)?;
        self.filters.validate()?;
        match self.placement {
            SourcePlacement::Jitter { range } | SourcePlacement::DiagonalJitter { range }
                if !range.is_finite() || range < 0.0 =>
            {
                return invalid("draw_source", format!("jitter range {} must be >= 0", range));
            }
            SourcePlacement::Panel { w, h, .. } if w <= 0.0 || h <= 0.0 => {
                return invalid("draw_source", format!("panel size {}x{} must be positive", w, h));
            }
            _ => {}
        }
        if let Some(glow) = self.glow {
            if !glow.radius.is_finite() || glow.radius < 0.0 {
                return invalid("draw_source", format!("glow radius {} must be >= 0", glow.radius));
            }
        }
        Ok(())
    }
}

/// Outline of a clip region in its own frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipShape {
    Rect,
    Circle,
    /// Apex at the top centre, base along the bottom edge
    Triangle,
}

/// Position, size and rotation of a clip shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClipTransform {
    /// Centre and size as canvas fractions, rotation in radians
    Fixed {
        center: (f32, f32),
        size: (f32, f32),
        rotation: f32,
    },
    /// Centre uniform over the canvas; square size (reference pixels) and
    /// rotation (radians) uniform in the given ranges
    Scattered { size: (f32, f32), rotation: (f32, f32) },
}

/// A clip: the shape is chosen by repeat iteration, cycling through `shapes`
#[derive(Debug, Clone, PartialEq)]
pub struct ClipRegion {
    pub shapes: Vec<ClipShape>,
    pub transform: ClipTransform,
}

impl ClipRegion {
    /// Axis-aligned rectangle given as canvas fractions
    pub fn rect(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            shapes: vec![ClipShape::Rect],
            transform: ClipTransform::Fixed {
                center: (x + w / 2.0, y + h / 2.0),
                size: (w, h),
                rotation: 0.0,
            },
        }
    }

    pub fn scattered(shapes: Vec<ClipShape>, size: (f32, f32), rotation: (f32, f32)) -> Self {
        Self {
            shapes,
            transform: ClipTransform::Scattered { size, rotation },
        }
    }

    /// Shape used on the given repeat iteration
    pub fn shape_for(&self, iteration: u32) -> Option<ClipShape> {
        if self.shapes.is_empty() {
            return None;
        }
        self.shapes.get(iteration as usize % self.shapes.len()).copied()
    }

    fn validate(&self) -> Result<()> {
        if self.shapes.is_empty() {
            return invalid("clip", "clip needs at least one shape".to_string());
        }
        match self.transform {
            ClipTransform::Fixed { size, .. } if size.0 <= 0.0 || size.1 <= 0.0 => {
                invalid("clip", format!("clip size {:?} must be positive", size))
            }
            ClipTransform::Scattered { size, rotation } => {
                check_range("clip", "size", size)?;
                if !rotation.0.is_finite() || !rotation.1.is_finite() || rotation.1 < rotation.0 {
                    return invalid("clip", format!("rotation range {:?} is not ascending", rotation));
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

/// Block-quantized redraw of the input
///
/// The input is downsampled to one sample per block; blocks whose alpha
/// exceeds `alpha_threshold` are filled with the nearest palette colour
/// and given a light top edge and a dark bottom edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pixelate {
    /// Block edge in reference pixels
    pub block_size: f32,
    pub palette: Palette,
    pub alpha_threshold: u8,
}

impl Pixelate {
    pub fn new(block_size: f32, palette: Palette) -> Self {
        Self {
            block_size,
            palette,
            alpha_threshold: 30,
        }
    }

    fn validate(&self) -> Result<()> {
        if !self.block_size.is_finite() || self.block_size < 1.0 {
            return invalid("pixelate", format!("block size {} must be >= 1", self.block_size));
        }
        Ok(())
    }
}

/// Layers whose geometry comes from sampling the input
#[derive(Debug, Clone, PartialEq)]
pub enum SampledLayer {
    ShapeScatter(ShapeScatter),
    TriangleMesh(TriangleMesh),
}

impl SampledLayer {
    fn validate(&self) -> Result<()> {
        match self {
            SampledLayer::ShapeScatter(scatter) => scatter.validate(),
            SampledLayer::TriangleMesh(mesh) => mesh.validate(),
        }
    }
}

/// Jittered circles, rotated squares and triangles in colours sampled from
/// a coarse grid over the input, joined by fading lines
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeScatter {
    /// Sample grid is `grid` x `grid`
    pub grid: u32,
    pub alpha_threshold: u8,
    /// Chance that an inked cell becomes a shape
    pub keep_probability: f32,
    /// Position jitter range in reference pixels
    pub jitter: f32,
    /// Shape size range in reference pixels
    pub size: (f32, f32),
    pub alpha: f32,
    /// Shapes closer than this are joined
    pub link_distance: f32,
    pub link_alpha: f32,
    pub link_color: Color,
    pub link_width: f32,
}

impl Default for ShapeScatter {
    fn default() -> Self {
        Self {
            grid: 32,
            alpha_threshold: 50,
            keep_probability: 0.4,
            jitter: 50.0,
            size: (30.0, 130.0),
            alpha: 0.6,
            link_distance: 250.0,
            link_alpha: 0.4,
            link_color: Color::rgba(255, 255, 255, 0.2),
            link_width: 1.0,
        }
    }
}

impl ShapeScatter {
    fn validate(&self) -> Result<()> {
        if self.grid == 0 {
            return invalid("shape_scatter", "sample grid must not be empty".to_string());
        }
        if !(0.0..=1.0).contains(&self.keep_probability) {
            return invalid(
                "shape_scatter",
                format!("keep probability {} outside [0, 1]", self.keep_probability),
            );
        }
        check_range("shape_scatter", "size", self.size)?;
        check_alpha("shape_scatter", self.alpha)?;
        check_alpha("shape_scatter", self.link_alpha)
    }
}

/// Random triangles filled with colours sampled from a coarse grid
#[derive(Debug, Clone, PartialEq)]
pub struct TriangleMesh {
    pub grid: u32,
    pub count: u32,
    /// Spread of the second and third vertex around the first, reference pixels
    pub spread: f32,
    /// Substitute for a sampled channel that reads as zero
    pub fallback: u8,
    pub edge_color: Color,
    pub edge_width: f32,
}

impl Default for TriangleMesh {
    fn default() -> Self {
        Self {
            grid: 16,
            count: 80,
            spread: 150.0,
            fallback: 100,
            edge_color: Color::rgba(255, 255, 255, 0.1),
            edge_width: 1.0,
        }
    }
}

impl TriangleMesh {
    fn validate(&self) -> Result<()> {
        if self.grid == 0 {
            return invalid("triangle_mesh", "sample grid must not be empty".to_string());
        }
        if !self.spread.is_finite() || self.spread < 0.0 {
            return invalid("triangle_mesh", format!("spread {} must be >= 0", self.spread));
        }
        Ok(())
    }
}
