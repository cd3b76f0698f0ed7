use rayon::prelude::*;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::{
    config::RenderConfig,
    error::{InputError, Result, StyleError},
    pipeline::{
        context::{ClipFrame, RenderContext},
        layers,
        run::{RenderOutput, RenderRun, SkippedOp},
    },
    raster::{
        blend::{fill_blend, underlay},
        gradient::fill_gradient,
        BlendMode, PixelBuffer,
    },
    styles::{ClipRegion, LayerOp, SampledLayer, StyleDefinition, StyleRegistry},
    textures::TextureLibrary,
};

/// One independent render in a batch
#[derive(Debug, Clone, Copy)]
pub struct RenderJob<'a> {
    pub input: &'a PixelBuffer,
    pub style_id: &'a str,
    pub seed: u64,
}

/// Runs style pipelines against input sketches
///
/// A run follows a fixed sequence:
/// 1. Input validation - both dimensions must be positive
/// 2. Style resolution - the id must name a catalog entry
/// 3. Canvas allocation - always the canonical size, the input is resampled to fit
/// 4. Op execution - ops run in declared order; an op with bad parameters is
///    skipped with a warning, anything else fails the run
#[derive(Clone)]
pub struct PipelineExecutor {
    config: RenderConfig,
    registry: &'static StyleRegistry,
    textures: &'static TextureLibrary,
    /// Batch pool, shared by clones; `None` batches on rayon's global pool
    workers: Option<Arc<rayon::ThreadPool>>,
}

impl PipelineExecutor {
    pub fn new(config: RenderConfig) -> Self {
        let workers = build_workers(config.worker_threads);
        Self {
            config,
            registry: StyleRegistry::builtin(),
            textures: TextureLibrary::builtin(),
            workers,
        }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Render `input` in the style `style_id`, threading a stream seeded by `seed`
    pub fn run(&self, input: &PixelBuffer, style_id: &str, seed: u64) -> Result<RenderOutput> {
        let mut run = RenderRun::new();
        run.start()?;

        match self.execute(input, style_id, seed) {
            Ok((style, image, warnings)) => {
                run.succeed()?;
                let elapsed = run.elapsed();
                info!(
                    "✅ Rendered {} in {}ms ({} ops skipped)",
                    style.id,
                    elapsed.as_millis(),
                    warnings.len()
                );
                Ok(RenderOutput {
                    image,
                    warnings,
                    state: run.state(),
                    elapsed,
                    style_id: style.id,
                    seed,
                })
            }
            Err(e) => {
                run.fail()?;
                warn!("❌ Render of {} failed: {}", style_id, e);
                Err(e)
            }
        }
    }

    /// Render independent jobs in parallel on `worker_threads` threads.
    ///
    /// Results come back in job order; each job succeeds or fails on its own.
    pub fn run_batch(&self, jobs: &[RenderJob<'_>]) -> Vec<Result<RenderOutput>> {
        let render = || {
            jobs.par_iter()
                .map(|job| self.run(job.input, job.style_id, job.seed))
                .collect()
        };

        match &self.workers {
            Some(pool) => {
                info!("🎨 Rendering batch of {} jobs on {} threads", jobs.len(), pool.current_num_threads());
                pool.install(render)
            }
            None => {
                info!("🎨 Rendering batch of {} jobs on the global pool", jobs.len());
                render()
            }
        }
    }

    fn execute(
        &self,
        input: &PixelBuffer,
        style_id: &str,
        seed: u64,
    ) -> Result<(&'static StyleDefinition, PixelBuffer, Vec<SkippedOp>)> {
        // Step 1: input validation
        let (width, height) = input.dimensions();
        if width == 0 || height == 0 {
            return Err(InputError::InvalidDimensions { width, height }.into());
        }

        // Step 2: style resolution
        let style = self.registry.get(style_id)?;
        info!("🎬 Starting {} {} render (seed {})", style.icon, style.display_name, seed);

        // Step 3: canvas at canonical size
        let (canvas_w, canvas_h) = (self.config.canonical_width, self.config.canonical_height);
        let mut canvas = PixelBuffer::new(canvas_w, canvas_h)?;
        let source = input.resampled(canvas_w, canvas_h, self.config.resample);
        debug!("Input {}x{} fitted to {}x{}", width, height, canvas_w, canvas_h);

        // Step 4: ops in declared order
        let mut ctx = RenderContext::new(source, seed, self.textures);
        let mut skipped = Vec::new();
        self.execute_ops(&style.pipeline, &mut canvas, &mut ctx, None, &mut skipped)?;

        Ok((style, canvas, skipped))
    }

    /// Run `ops` in order, skipping the ones whose parameters are rejected.
    ///
    /// `top` is the index of the enclosing top-level op for nested bodies.
    fn execute_ops(
        &self,
        ops: &[LayerOp],
        canvas: &mut PixelBuffer,
        ctx: &mut RenderContext,
        top: Option<usize>,
        skipped: &mut Vec<SkippedOp>,
    ) -> Result<()> {
        for (i, op) in ops.iter().enumerate() {
            let index = top.unwrap_or(i);
            debug!("Layer op {} ({})", index, op.kind());

            match op.validate().and_then(|()| self.apply(op, canvas, ctx, index, skipped)) {
                Ok(()) => {}
                Err(e) if e.is_recoverable() => {
                    warn!("⚠️  Skipping layer op {} ({}): {}", index, op.kind(), e);
                    skipped.push(SkippedOp {
                        index,
                        op: op.kind(),
                        reason: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    fn apply(
        &self,
        op: &LayerOp,
        canvas: &mut PixelBuffer,
        ctx: &mut RenderContext,
        index: usize,
        skipped: &mut Vec<SkippedOp>,
    ) -> Result<()> {
        match op {
            LayerOp::FillSolid { color } => {
                fill_blend(canvas, *color, BlendMode::Normal, 1.0, ctx.clip_rect());
            }
            LayerOp::FillGradient { gradient, blend, alpha } => {
                fill_gradient(canvas, gradient, *blend, *alpha, ctx.clip_rect());
            }
            LayerOp::DrawSource(draw) => layers::draw_source(canvas, ctx, draw)?,
            LayerOp::TintOverlay {
                color,
                blend,
                alpha,
                filters,
            } => {
                let tint = filters.apply_to_color(*color)?;
                fill_blend(canvas, tint, *blend, *alpha, ctx.clip_rect());
            }
            LayerOp::Procedural { generator, params } => {
                let textures = ctx.textures();
                textures.generate(*generator, canvas, params, ctx.rng_mut())?;
            }
            LayerOp::Clip { region, ops } => self.apply_clip(region, ops, canvas, ctx, index, skipped)?,
            LayerOp::Repeat { count, ops } => {
                let outer = ctx.iteration();
                let mut result = Ok(());
                for pass in 0..*count {
                    ctx.set_iteration(pass);
                    result = self.execute_ops(ops, canvas, ctx, Some(index), skipped);
                    if result.is_err() {
                        break;
                    }
                }
                ctx.set_iteration(outer);
                result?;
            }
            LayerOp::Pixelate(pixelate) => layers::pixelate(canvas, ctx, pixelate)?,
            LayerOp::Sampled(SampledLayer::ShapeScatter(scatter)) => layers::shape_scatter(canvas, ctx, scatter),
            LayerOp::Sampled(SampledLayer::TriangleMesh(mesh)) => layers::triangle_mesh(canvas, ctx, mesh),
            LayerOp::Underlay { color } => underlay(canvas, *color),
        }
        Ok(())
    }

    /// Run `ops` and keep their effect only inside the region's shape
    fn apply_clip(
        &self,
        region: &ClipRegion,
        ops: &[LayerOp],
        canvas: &mut PixelBuffer,
        ctx: &mut RenderContext,
        index: usize,
        skipped: &mut Vec<SkippedOp>,
    ) -> Result<()> {
        let shape = region.shape_for(ctx.iteration()).ok_or_else(|| StyleError::InvalidOp {
            op: "clip".to_string(),
            reason: "clip needs at least one shape".to_string(),
        })?;

        let (width, height) = canvas.dimensions();
        let (center, size, rotation) = layers::clip_placement(ctx, region.transform, width, height);
        let Some(mask) = layers::clip_outline(shape, center, size, rotation).mask(width, height) else {
            debug!("Clip {:?} at {:?} misses the canvas", shape, center);
            return Ok(());
        };

        let saved = canvas.clone();
        let outer = ctx.enter_clip(ClipFrame {
            center,
            rotation,
            rect: mask.rect(),
        });
        let result = self.execute_ops(ops, canvas, ctx, Some(index), skipped);
        ctx.leave_clip(outer);
        result?;

        mask.restrict(canvas, &saved);
        Ok(())
    }
}

impl Default for PipelineExecutor {
    fn default() -> Self {
        Self::new(RenderConfig::default())
    }
}

/// Dedicated pool for `threads` workers, or `None` when rayon's global pool
/// already has that size or the pool cannot be started
fn build_workers(threads: usize) -> Option<Arc<rayon::ThreadPool>> {
    if threads == num_cpus::get() {
        return None;
    }
    match rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("sketch2art-render-{}", i))
        .build()
    {
        Ok(pool) => Some(Arc::new(pool)),
        Err(e) => {
            warn!("Failed to start {} render workers, using the global pool: {}", threads, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StylizerError;
    use crate::raster::{Color, FilterChain};
    use crate::styles::DrawSource;
    use crate::textures::{GeneratorId, TextureParams};

    fn executor(size: u32) -> PipelineExecutor {
        PipelineExecutor::new(RenderConfig::with_size(size, size))
    }

    fn sketch(size: u32) -> PixelBuffer {
        let mut input = PixelBuffer::new(size, size).unwrap();
        input.block_fill(size as i32 / 4, size as i32 / 4, size / 2, size / 8, Color::BLACK);
        input
    }

    fn run_ops(ops: &[LayerOp], size: u32) -> (PixelBuffer, Vec<SkippedOp>) {
        let executor = executor(size);
        let mut canvas = PixelBuffer::new(size, size).unwrap();
        let mut ctx = RenderContext::new(sketch(size), 3, TextureLibrary::builtin());
        let mut skipped = Vec::new();
        executor
            .execute_ops(ops, &mut canvas, &mut ctx, None, &mut skipped)
            .unwrap();
        (canvas, skipped)
    }

    #[test]
    fn test_output_is_canonical_size() {
        let output = executor(96).run(&sketch(40), "ink", 1).unwrap();
        assert_eq!(output.image.dimensions(), (96, 96));
        assert_eq!(output.style_id, "ink");
        assert_eq!(output.state, crate::pipeline::RunState::Succeeded);
    }

    #[test]
    fn test_unknown_style_fails() {
        let err = executor(32).run(&sketch(32), "vaporwave", 1).unwrap_err();
        assert!(matches!(err, StylizerError::Style(StyleError::UnknownStyle { .. })));
    }

    #[test]
    fn test_bad_filter_skips_only_that_op() {
        let ops = vec![
            LayerOp::fill(Color::WHITE),
            DrawSource::new().filters(FilterChain::new().blur(-3.0)).into(),
            LayerOp::texture(GeneratorId::Vignette, TextureParams::new().with_opacity(2.0)),
            DrawSource::new().into(),
        ];
        let (canvas, skipped) = run_ops(&ops, 32);

        assert_eq!(skipped.len(), 2);
        assert_eq!(skipped[0].index, 1);
        assert_eq!(skipped[0].op, "draw_source");
        assert_eq!(skipped[1].index, 2);
        assert_eq!(canvas.get_rgba(16, 9), Some([0, 0, 0, 255]));
        assert_eq!(canvas.get_rgba(1, 1), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_degenerate_texture_params_are_skipped() {
        use crate::textures::{COUNT, SPACING};

        let ops = vec![
            LayerOp::fill(Color::WHITE),
            LayerOp::texture(GeneratorId::Scanlines, TextureParams::new().set(SPACING, 1e-6f32)),
            LayerOp::texture(GeneratorId::Stars, TextureParams::new().set(COUNT, 1e12f32)),
        ];
        let (canvas, skipped) = run_ops(&ops, 32);

        assert_eq!(skipped.iter().map(|s| s.index).collect::<Vec<_>>(), vec![1, 2]);
        assert!(canvas.as_raw().iter().all(|&c| c == 255));
    }

    #[test]
    fn test_clip_keeps_effect_inside_region() {
        let ops = vec![
            LayerOp::fill(Color::WHITE),
            LayerOp::clip(ClipRegion::rect(0.5, 0.0, 0.5, 0.5), vec![LayerOp::fill(Color::BLACK)]),
        ];
        let (canvas, _) = run_ops(&ops, 32);
        assert_eq!(canvas.get_rgba(24, 8), Some([0, 0, 0, 255]));
        assert_eq!(canvas.get_rgba(8, 8), Some([255, 255, 255, 255]));
        assert_eq!(canvas.get_rgba(24, 24), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_nested_failures_report_enclosing_index() {
        let ops = vec![
            LayerOp::fill(Color::WHITE),
            LayerOp::repeat(
                3,
                vec![LayerOp::clip(
                    ClipRegion::rect(0.0, 0.0, 0.5, 0.5),
                    vec![DrawSource::new().alpha(-1.0).into()],
                )],
            ),
        ];
        let (_, skipped) = run_ops(&ops, 16);
        assert_eq!(skipped.len(), 3);
        assert!(skipped.iter().all(|s| s.index == 1 && s.op == "draw_source"));
    }

    #[test]
    fn test_clip_frame_draws_inside_scattered_clip() {
        let region = ClipRegion::scattered(vec![crate::styles::ClipShape::Circle], (400.0, 400.0), (0.0, 0.0));
        let ops = vec![
            LayerOp::fill(Color::WHITE),
            LayerOp::clip(region, vec![DrawSource::new().in_clip_frame().into()]),
        ];
        let (_, skipped) = run_ops(&ops, 32);
        assert!(skipped.is_empty());
    }

    #[test]
    fn test_same_seed_is_deterministic() {
        let exec = executor(64);
        let input = sketch(50);
        let a = exec.run(&input, "cubism", 9).unwrap();
        let b = exec.run(&input, "cubism", 9).unwrap();
        assert_eq!(a.image, b.image);

        let c = exec.run(&input, "cubism", 10).unwrap();
        assert_ne!(a.image, c.image);
    }

    #[test]
    fn test_batch_preserves_job_order() {
        let exec = PipelineExecutor::new(RenderConfig {
            worker_threads: 2,
            ..RenderConfig::with_size(32, 32)
        });
        let input = sketch(32);
        let jobs = [
            RenderJob { input: &input, style_id: "pixel", seed: 1 },
            RenderJob { input: &input, style_id: "nope", seed: 1 },
            RenderJob { input: &input, style_id: "chalk", seed: 1 },
        ];
        let results = exec.run_batch(&jobs);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().style_id, "pixel");
        assert!(results[1].is_err());
        assert_eq!(results[2].as_ref().unwrap().style_id, "chalk");
    }

    #[test]
    fn test_batch_pool_is_built_once_and_shared() {
        let threads = num_cpus::get() + 1;
        let exec = PipelineExecutor::new(RenderConfig {
            worker_threads: threads,
            ..RenderConfig::with_size(32, 32)
        });
        let pool = exec.workers.clone().unwrap();
        assert_eq!(pool.current_num_threads(), threads);
        assert!(Arc::ptr_eq(&pool, exec.clone().workers.as_ref().unwrap()));

        let input = sketch(32);
        let jobs = [RenderJob { input: &input, style_id: "pixel", seed: 2 }];
        let first = exec.run_batch(&jobs);
        let second = exec.run_batch(&jobs);
        assert_eq!(first[0].as_ref().unwrap().image, second[0].as_ref().unwrap().image);
        assert!(Arc::ptr_eq(&pool, exec.workers.as_ref().unwrap()));

        let default = PipelineExecutor::new(RenderConfig::with_size(16, 16));
        assert!(default.workers.is_none());
    }
}
