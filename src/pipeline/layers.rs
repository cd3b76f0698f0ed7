//! Rendering of the ops that need more than a single raster call

use std::borrow::Cow;
use std::f32::consts::PI;

use rand::Rng;
use rayon::prelude::*;
use tracing::trace;

use crate::{
    error::{Result, StyleError},
    pipeline::context::RenderContext,
    raster::{
        blend::composite_layer,
        draw::{fill_shape, stroke_line, stroke_polyline},
        filter::gaussian_blur,
        BlendMode, Color, ColorQuantizer, Paint, PixelBuffer, PixelRect, ResampleFilter, Shape,
    },
    styles::{ClipShape, ClipTransform, DrawSource, Pixelate, ShapeScatter, SourcePlacement, TriangleMesh},
    textures::{jitter, uniform},
};

/// Segments used when an ellipse has to become a polygon
const ELLIPSE_SEGMENTS: usize = 64;

fn invalid(op: &str, reason: impl Into<String>) -> crate::error::StylizerError {
    StyleError::InvalidOp {
        op: op.to_string(),
        reason: reason.into(),
    }
    .into()
}

/// Maps a canvas point back to the source point that lands on it
#[derive(Debug, Clone, Copy, PartialEq)]
enum SourceMap {
    Shift { dx: f32, dy: f32 },
    Rotate { center: (f32, f32), angle: f32 },
    Panel { x: f32, y: f32, sx: f32, sy: f32 },
}

impl SourceMap {
    fn is_identity(&self) -> bool {
        match *self {
            SourceMap::Shift { dx, dy } => dx == 0.0 && dy == 0.0,
            SourceMap::Rotate { angle, .. } => angle == 0.0,
            SourceMap::Panel { x, y, sx, sy } => x == 0.0 && y == 0.0 && sx == 1.0 && sy == 1.0,
        }
    }

    fn source_point(&self, px: f32, py: f32) -> (f32, f32) {
        match *self {
            SourceMap::Shift { dx, dy } => (px - dx, py - dy),
            SourceMap::Rotate { center, angle } => {
                let (x, y) = rotate((px - center.0, py - center.1), -angle);
                (x + center.0, y + center.1)
            }
            SourceMap::Panel { x, y, sx, sy } => ((px - x) / sx, (py - y) / sy),
        }
    }
}

fn rotate((x, y): (f32, f32), angle: f32) -> (f32, f32) {
    let (sin, cos) = angle.sin_cos();
    (x * cos - y * sin, x * sin + y * cos)
}

/// Resolve a placement to a source map, drawing any jitter from the run's stream
fn source_map(ctx: &mut RenderContext, placement: SourcePlacement, width: u32, height: u32) -> Result<SourceMap> {
    let surface = ctx.surface();
    let (w, h) = (width as f32, height as f32);
    let map = match placement {
        SourcePlacement::Offset { dx, dy } => SourceMap::Shift {
            dx: surface.size(dx),
            dy: surface.size(dy),
        },
        SourcePlacement::Jitter { range } => {
            let dx = jitter(ctx.rng_mut(), range);
            let dy = jitter(ctx.rng_mut(), range);
            SourceMap::Shift {
                dx: surface.size(dx),
                dy: surface.size(dy),
            }
        }
        SourcePlacement::DiagonalJitter { range } => {
            let d = surface.size(jitter(ctx.rng_mut(), range));
            SourceMap::Shift { dx: d, dy: d }
        }
        SourcePlacement::Rotated { degrees } => SourceMap::Rotate {
            center: (w / 2.0, h / 2.0),
            angle: degrees.to_radians(),
        },
        SourcePlacement::ClipFrame => {
            let frame = ctx
                .clip()
                .ok_or_else(|| invalid("draw_source", "clip-frame placement outside a clip"))?;
            SourceMap::Rotate {
                center: frame.center,
                angle: frame.rotation,
            }
        }
        SourcePlacement::Panel { x, y, w: pw, h: ph } => SourceMap::Panel {
            x: x * w,
            y: y * h,
            sx: pw,
            sy: ph,
        },
    };
    Ok(map)
}

/// Resample `source` through `map` into a same-sized layer, touching only `region`
fn place(source: &PixelBuffer, map: SourceMap, region: PixelRect) -> Result<PixelBuffer> {
    let (w, h) = source.dimensions();
    let mut layer = PixelBuffer::new(w, h)?;
    let stride = layer.stride();

    layer
        .as_raw_mut()
        .par_chunks_mut(stride)
        .enumerate()
        .filter(|(y, _)| region.contains_row(*y as u32))
        .for_each(|(y, row)| {
            let py = y as f32 + 0.5;
            for x in region.x0..region.x1 {
                let (sx, sy) = map.source_point(x as f32 + 0.5, py);
                let sample = source.sample_bilinear(sx, sy);
                if sample[3] <= 0.0 {
                    continue;
                }
                let i = x as usize * 4;
                row[i..i + 4].copy_from_slice(&Color::from_premultiplied(sample).to_rgba8());
            }
        });
    Ok(layer)
}

/// Halo of `layer`: its alpha recoloured with `color`, then blurred
fn glow_layer(layer: &PixelBuffer, color: Color, sigma: f32) -> PixelBuffer {
    let mut halo = layer.clone();
    halo.as_raw_mut().par_chunks_mut(4).for_each(|px| {
        let alpha = (f32::from(px[3]) * color.alpha.clamp(0.0, 1.0)).round() as u8;
        px.copy_from_slice(&[color.r, color.g, color.b, alpha]);
    });
    gaussian_blur(&halo, sigma)
}

/// Draw the filtered, placed input sketch
pub(super) fn draw_source(canvas: &mut PixelBuffer, ctx: &mut RenderContext, draw: &DrawSource) -> Result<()> {
    let (w, h) = canvas.dimensions();
    let map = source_map(ctx, draw.placement, w, h)?;
    let source = ctx.filtered_source(&draw.filters)?;
    let region = ctx.clip_rect();

    let layer: Cow<'_, PixelBuffer> = if map.is_identity() {
        Cow::Borrowed(source.as_ref())
    } else {
        Cow::Owned(place(&source, map, region.unwrap_or(PixelRect::full(w, h)))?)
    };

    if let Some(glow) = draw.glow {
        let sigma = ctx.surface().size(glow.radius) / 2.0;
        let halo = glow_layer(&layer, glow.color, sigma);
        composite_layer(canvas, &halo, draw.blend, draw.alpha, region);
    }
    composite_layer(canvas, &layer, draw.blend, draw.alpha, region);
    Ok(())
}

/// Centre, size and rotation of a clip shape in canvas pixels
pub(super) fn clip_placement(
    ctx: &mut RenderContext,
    transform: ClipTransform,
    width: u32,
    height: u32,
) -> ((f32, f32), (f32, f32), f32) {
    let (w, h) = (width as f32, height as f32);
    match transform {
        ClipTransform::Fixed { center, size, rotation } => {
            ((center.0 * w, center.1 * h), (size.0 * w, size.1 * h), rotation)
        }
        ClipTransform::Scattered { size, rotation } => {
            let surface = ctx.surface();
            let rng = ctx.rng_mut();
            let x = uniform(rng, 0.0, surface.width);
            let y = uniform(rng, 0.0, surface.height);
            let edge = uniform(rng, size.0, size.1);
            let angle = uniform(rng, rotation.0, rotation.1);
            let edge = surface.size(edge);
            (surface.px(x, y), (edge, edge), angle)
        }
    }
}

/// Outline of a clip shape centred on `center`
pub(super) fn clip_outline(shape: ClipShape, center: (f32, f32), size: (f32, f32), rotation: f32) -> Shape {
    let (cx, cy) = center;
    let (hw, hh) = (size.0 / 2.0, size.1 / 2.0);
    let placed = |points: Vec<(f32, f32)>| {
        Shape::Polygon(
            points
                .into_iter()
                .map(|p| {
                    let (x, y) = rotate(p, rotation);
                    (x + cx, y + cy)
                })
                .collect(),
        )
    };

    match shape {
        ClipShape::Rect if rotation == 0.0 => Shape::Rect {
            x: cx - hw,
            y: cy - hh,
            w: size.0,
            h: size.1,
        },
        ClipShape::Rect => placed(vec![(-hw, -hh), (hw, -hh), (hw, hh), (-hw, hh)]),
        ClipShape::Circle if hw == hh => Shape::Circle { cx, cy, radius: hw },
        ClipShape::Circle if rotation == 0.0 => Shape::Ellipse {
            cx,
            cy,
            rx: hw,
            ry: hh,
            blur: 0.0,
        },
        ClipShape::Circle => placed(
            (0..ELLIPSE_SEGMENTS)
                .map(|i| {
                    let t = i as f32 / ELLIPSE_SEGMENTS as f32 * 2.0 * PI;
                    (hw * t.cos(), hh * t.sin())
                })
                .collect(),
        ),
        ClipShape::Triangle => placed(vec![(0.0, -hh), (hw, hh), (-hw, hh)]),
    }
}

/// Redraw the input as palette-quantized blocks with bevelled edges
pub(super) fn pixelate(canvas: &mut PixelBuffer, ctx: &mut RenderContext, pixelate: &Pixelate) -> Result<()> {
    let surface = ctx.surface();
    let (w, h) = canvas.dimensions();
    let block = surface.size(pixelate.block_size);
    let cols = (w as f32 / block).floor() as u32;
    let rows = (h as f32 / block).floor() as u32;
    if cols == 0 || rows == 0 {
        return Err(invalid(
            "pixelate",
            format!("block of {:.1} px does not fit a {}x{} canvas", block, w, h),
        ));
    }

    let samples = ctx.source().resampled(cols, rows, ResampleFilter::Triangle);
    let quantizer = ColorQuantizer::new(pixelate.palette);
    let inner = block - surface.size(1.0);
    let edge = surface.size(2.0);
    let highlight = Paint::new(Color::WHITE).with_alpha(0.15);
    let shadow = Paint::new(Color::BLACK).with_alpha(0.2);

    let mut drawn = 0usize;
    for row in 0..rows {
        for col in 0..cols {
            let Some(px) = samples.get_rgba(col as i32, row as i32) else {
                continue;
            };
            if px[3] <= pixelate.alpha_threshold {
                continue;
            }
            let x = col as f32 * block;
            let y = row as f32 * block;
            let color = quantizer.quantize(px[0], px[1], px[2]);
            fill_shape(canvas, &Shape::Rect { x, y, w: inner, h: inner }, &Paint::new(color));
            fill_shape(canvas, &Shape::Rect { x, y, w: inner, h: edge }, &highlight);
            fill_shape(
                canvas,
                &Shape::Rect {
                    x,
                    y: y + block - surface.size(3.0),
                    w: inner,
                    h: edge,
                },
                &shadow,
            );
            drawn += 1;
        }
    }

    trace!("Pixelated {} of {} blocks", drawn, cols * rows);
    Ok(())
}

struct Scattered {
    x: f32,
    y: f32,
    size: f32,
    kind: u32,
    color: Color,
}

/// Shapes in colours sampled from the input, linked by fading lines
pub(super) fn shape_scatter(canvas: &mut PixelBuffer, ctx: &mut RenderContext, scatter: &ShapeScatter) {
    let surface = ctx.surface();
    let samples = ctx.source().resampled(scatter.grid, scatter.grid, ResampleFilter::Triangle);
    let cell_w = surface.width / scatter.grid as f32;
    let cell_h = surface.height / scatter.grid as f32;

    let mut shapes = Vec::new();
    let rng = ctx.rng_mut();
    for gy in 0..scatter.grid {
        for gx in 0..scatter.grid {
            let Some(px) = samples.get_rgba(gx as i32, gy as i32) else {
                continue;
            };
            if px[3] <= scatter.alpha_threshold {
                continue;
            }
            if rng.gen::<f32>() <= 1.0 - scatter.keep_probability {
                continue;
            }
            let x = gx as f32 * cell_w + jitter(rng, scatter.jitter);
            let y = gy as f32 * cell_h + jitter(rng, scatter.jitter);
            let size = uniform(rng, scatter.size.0, scatter.size.1);
            let kind = (rng.gen::<f32>() * 3.0) as u32;
            shapes.push(Scattered {
                x,
                y,
                size,
                kind,
                color: Color::rgb(px[0], px[1], px[2]),
            });
        }
    }

    for shape in &shapes {
        let blend = if rng.gen::<f32>() > 0.5 { BlendMode::Screen } else { BlendMode::Overlay };
        let paint = Paint::new(shape.color).with_alpha(scatter.alpha).with_blend(blend);
        let (cx, cy) = surface.px(shape.x, shape.y);
        let half = surface.size(shape.size) / 2.0;

        let outline = match shape.kind {
            0 => Shape::Circle { cx, cy, radius: half },
            1 => {
                let angle = rng.gen::<f32>() * PI;
                clip_outline(ClipShape::Rect, (cx, cy), (half * 2.0, half * 2.0), angle)
            }
            _ => clip_outline(ClipShape::Triangle, (cx, cy), (half * 2.0, half * 2.0), 0.0),
        };
        fill_shape(canvas, &outline, &paint);
    }

    let width = surface.size(scatter.link_width);
    for (i, a) in shapes.iter().enumerate() {
        for b in &shapes[i + 1..] {
            let d = (a.x - b.x).hypot(a.y - b.y);
            if d >= scatter.link_distance {
                continue;
            }
            let paint = Paint::new(scatter.link_color).with_alpha(scatter.link_alpha * (1.0 - d / scatter.link_distance));
            stroke_line(canvas, surface.px(a.x, a.y), surface.px(b.x, b.y), width, &paint);
        }
    }

    trace!("Scattered {} shapes", shapes.len());
}

/// Random triangles filled from a coarse colour sample of the input
pub(super) fn triangle_mesh(canvas: &mut PixelBuffer, ctx: &mut RenderContext, mesh: &TriangleMesh) {
    let surface = ctx.surface();
    let samples = ctx.source().resampled(mesh.grid, mesh.grid, ResampleFilter::Triangle);
    let last = mesh.grid as i32 - 1;
    let edge = Paint::new(mesh.edge_color);
    let edge_width = surface.size(mesh.edge_width);
    let rng = ctx.rng_mut();

    for _ in 0..mesh.count {
        let x1 = uniform(rng, 0.0, surface.width);
        let y1 = uniform(rng, 0.0, surface.height);
        let x2 = x1 + jitter(rng, mesh.spread);
        let y2 = y1 + jitter(rng, mesh.spread);
        let x3 = x1 + jitter(rng, mesh.spread);
        let y3 = y1 + jitter(rng, mesh.spread);

        let gx = ((x1 / surface.width * mesh.grid as f32) as i32).clamp(0, last);
        let gy = ((y1 / surface.height * mesh.grid as f32) as i32).clamp(0, last);
        let px = samples.get_rgba(gx, gy).unwrap_or([0; 4]);
        let channel = |c: u8| if c == 0 || px[3] == 0 { mesh.fallback } else { c };
        let color = Color::rgb(channel(px[0]), channel(px[1]), channel(px[2]));

        let points = vec![surface.px(x1, y1), surface.px(x2, y2), surface.px(x3, y3)];
        fill_shape(canvas, &Shape::Polygon(points.clone()), &Paint::new(color));
        stroke_polyline(canvas, &points, edge_width, true, &edge);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::textures::TextureLibrary;

    fn context(source: PixelBuffer) -> RenderContext {
        RenderContext::new(source, 7, TextureLibrary::builtin())
    }

    fn dot_source(size: u32) -> PixelBuffer {
        let mut source = PixelBuffer::new(size, size).unwrap();
        source.set_pixel(1, 1, Color::BLACK);
        source
    }

    #[test]
    fn test_shift_moves_source() {
        let source = dot_source(8);
        let layer = place(&source, SourceMap::Shift { dx: 2.0, dy: 3.0 }, PixelRect::full(8, 8)).unwrap();
        assert_eq!(layer.get_rgba(3, 4), Some([0, 0, 0, 255]));
        assert_eq!(layer.get_rgba(1, 1), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_half_turn_mirrors_about_centre() {
        let source = dot_source(8);
        let map = SourceMap::Rotate {
            center: (4.0, 4.0),
            angle: PI,
        };
        let layer = place(&source, map, PixelRect::full(8, 8)).unwrap();
        assert_eq!(layer.get_rgba(6, 6).map(|p| p[3] > 200), Some(true));
    }

    #[test]
    fn test_panel_scales_into_quadrant() {
        let source = PixelBuffer::filled(8, 8, Color::WHITE).unwrap();
        let map = SourceMap::Panel {
            x: 4.0,
            y: 0.0,
            sx: 0.5,
            sy: 0.5,
        };
        let layer = place(&source, map, PixelRect::full(8, 8)).unwrap();
        assert_eq!(layer.get_rgba(6, 1).map(|p| p[3]), Some(255));
        assert_eq!(layer.get_rgba(1, 6).map(|p| p[3]), Some(0));
    }

    #[test]
    fn test_place_only_touches_region() {
        let source = PixelBuffer::filled(8, 8, Color::WHITE).unwrap();
        let map = SourceMap::Shift { dx: 0.5, dy: 0.0 };
        let layer = place(&source, map, PixelRect::new(0, 0, 4, 4)).unwrap();
        assert!(layer.get_rgba(2, 2).unwrap()[3] > 0);
        assert_eq!(layer.get_rgba(6, 6), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_clip_frame_placement_requires_clip() {
        let mut ctx = context(dot_source(16));
        let mut canvas = PixelBuffer::filled(16, 16, Color::WHITE).unwrap();
        let err = draw_source(&mut canvas, &mut ctx, &DrawSource::new().in_clip_frame()).unwrap_err();
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_glow_spreads_beyond_source() {
        let mut source = PixelBuffer::new(32, 32).unwrap();
        source.block_fill(14, 14, 4, 4, Color::WHITE);
        let mut ctx = context(source);
        let mut canvas = PixelBuffer::filled(32, 32, Color::BLACK).unwrap();

        let draw = DrawSource::new().glow(Color::hex(0x00ffff), 400.0).blend(BlendMode::Screen);
        draw_source(&mut canvas, &mut ctx, &draw).unwrap();

        let near = canvas.get_rgba(12, 16).unwrap();
        assert!(near[2] > 0, "glow should light pixels next to the stroke");
        assert_eq!(near[0], 0, "cyan glow has no red");
    }

    #[test]
    fn test_clip_outlines() {
        assert!(matches!(
            clip_outline(ClipShape::Rect, (10.0, 10.0), (4.0, 6.0), 0.0),
            Shape::Rect { x, y, .. } if x == 8.0 && y == 7.0
        ));
        assert!(matches!(
            clip_outline(ClipShape::Circle, (10.0, 10.0), (8.0, 8.0), 0.3),
            Shape::Circle { radius, .. } if radius == 4.0
        ));
        match clip_outline(ClipShape::Triangle, (0.0, 0.0), (4.0, 4.0), 0.0) {
            Shape::Polygon(points) => assert_eq!(points, vec![(0.0, -2.0), (2.0, 2.0), (-2.0, 2.0)]),
            other => panic!("unexpected outline {:?}", other),
        }
    }

    #[test]
    fn test_pixelate_quantizes_blocks() {
        let source = PixelBuffer::filled(64, 64, Color::rgb(250, 250, 250)).unwrap();
        let mut ctx = context(source);
        let mut canvas = PixelBuffer::filled(64, 64, Color::BLACK).unwrap();

        pixelate(&mut canvas, &mut ctx, &Pixelate::new(128.0, crate::raster::Palette::Retro8)).unwrap();
        // one 8 px block per 128 reference px; its interior is palette white
        assert_eq!(canvas.get_rgba(4, 4), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_pixelate_rejects_oversized_blocks() {
        let mut ctx = context(PixelBuffer::filled(16, 16, Color::WHITE).unwrap());
        let mut canvas = PixelBuffer::filled(16, 16, Color::BLACK).unwrap();
        let err = pixelate(&mut canvas, &mut ctx, &Pixelate::new(2048.0, crate::raster::Palette::Retro8)).unwrap_err();
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_transparent_input_scatters_nothing() {
        let mut ctx = context(PixelBuffer::new(64, 64).unwrap());
        let mut canvas = PixelBuffer::filled(64, 64, Color::BLACK).unwrap();
        let before = canvas.clone();
        shape_scatter(&mut canvas, &mut ctx, &ShapeScatter::default());
        assert_eq!(canvas, before);
    }

    #[test]
    fn test_mesh_uses_fallback_on_transparent_input() {
        let mut ctx = context(PixelBuffer::new(64, 64).unwrap());
        let mut canvas = PixelBuffer::filled(64, 64, Color::BLACK).unwrap();
        triangle_mesh(&mut canvas, &mut ctx, &TriangleMesh::default());
        let grey = canvas
            .as_raw()
            .chunks(4)
            .filter(|px| px[0] == 100 && px[1] == 100 && px[2] == 100)
            .count();
        assert!(grey > 0);
    }
}
