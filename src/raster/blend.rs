use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::raster::buffer::PixelBuffer;
use crate::raster::color::{clamp_channel, Color};
use crate::raster::mask::PixelRect;

/// Source coverage above which destination-out starts removing alpha
pub const DESTINATION_OUT_THRESHOLD: f32 = 1.0 / 255.0;

/// How a source layer is combined with the pixels already on the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    #[default]
    Normal,
    Multiply,
    Screen,
    Overlay,
    /// Hue and saturation of the source, luminosity of the destination
    Color,
    /// Cuts the source silhouette out of the destination's alpha
    DestinationOut,
}

impl BlendMode {
    /// Blended value of one channel (both operands 0-255).
    ///
    /// `Color` is non-separable and `DestinationOut` never blends colour,
    /// both fall back to the source value here.
    pub fn blend_channel(self, d: f32, s: f32) -> f32 {
        match self {
            BlendMode::Normal | BlendMode::Color | BlendMode::DestinationOut => s,
            BlendMode::Multiply => d * s / 255.0,
            BlendMode::Screen => 255.0 - (255.0 - d) * (255.0 - s) / 255.0,
            BlendMode::Overlay => {
                if d < 128.0 {
                    2.0 * d * s / 255.0
                } else {
                    255.0 - 2.0 * (255.0 - d) * (255.0 - s) / 255.0
                }
            }
        }
    }

    fn blend_rgb(self, d: [f32; 3], s: [f32; 3]) -> [f32; 3] {
        match self {
            BlendMode::Color => {
                let unit = |c: [f32; 3]| [c[0] / 255.0, c[1] / 255.0, c[2] / 255.0];
                let out = set_lum(unit(s), lum(unit(d)));
                [out[0] * 255.0, out[1] * 255.0, out[2] * 255.0]
            }
            _ => [
                self.blend_channel(d[0], s[0]),
                self.blend_channel(d[1], s[1]),
                self.blend_channel(d[2], s[2]),
            ],
        }
    }
}

/// Composite one source pixel over one destination pixel.
///
/// `alpha` is the layer's coverage; it is multiplied by the source's own
/// alpha. Against an opaque destination this is exactly
/// `D * (1 - a) + blended * a`.
pub fn blend_pixel(dst: [u8; 4], src: [u8; 4], alpha: f32, mode: BlendMode) -> [u8; 4] {
    let a = alpha.clamp(0.0, 1.0) * f32::from(src[3]) / 255.0;
    if a <= 0.0 {
        return dst;
    }
    let da = f32::from(dst[3]) / 255.0;

    if mode == BlendMode::DestinationOut {
        if a <= DESTINATION_OUT_THRESHOLD {
            return dst;
        }
        let out_a = da * (1.0 - a);
        return [dst[0], dst[1], dst[2], clamp_channel(out_a * 255.0)];
    }

    let d = [f32::from(dst[0]), f32::from(dst[1]), f32::from(dst[2])];
    let s = [f32::from(src[0]), f32::from(src[1]), f32::from(src[2])];
    let blended = mode.blend_rgb(d, s);

    let out_a = a + da * (1.0 - a);
    let mut out = [0u8; 4];
    for c in 0..3 {
        // over a partially transparent destination the blend result fades
        // back toward the plain source colour
        let mixed = (1.0 - da) * s[c] + da * blended[c];
        out[c] = clamp_channel((mixed * a + d[c] * da * (1.0 - a)) / out_a);
    }
    out[3] = clamp_channel(out_a * 255.0);
    out
}

/// Blend a solid colour into one pixel with the given coverage
pub fn paint_pixel(buffer: &mut PixelBuffer, x: i32, y: i32, color: Color, coverage: f32, mode: BlendMode) {
    if coverage <= 0.0 {
        return;
    }
    if let Some(dst) = buffer.get_rgba(x, y) {
        let src = [color.r, color.g, color.b, 255];
        let out = blend_pixel(dst, src, coverage * color.alpha, mode);
        buffer.set_rgba(x, y, out);
    }
}

/// Composite a same-sized layer onto `dst`, row-parallel.
///
/// When `region` is given only pixels inside it are touched.
pub fn composite_layer(
    dst: &mut PixelBuffer,
    layer: &PixelBuffer,
    mode: BlendMode,
    alpha: f32,
    region: Option<PixelRect>,
) {
    debug_assert_eq!(dst.dimensions(), layer.dimensions());
    if alpha <= 0.0 || dst.dimensions() != layer.dimensions() {
        return;
    }
    let stride = dst.stride();
    let full = PixelRect::full(dst.width(), dst.height());
    let region = region.and_then(|r| r.intersect(&full)).unwrap_or(full);

    dst.as_raw_mut()
        .par_chunks_mut(stride)
        .zip(layer.as_raw().par_chunks(stride))
        .enumerate()
        .filter(|(y, _)| region.contains_row(*y as u32))
        .for_each(|(_, (dst_row, src_row))| {
            for x in region.x0 as usize..region.x1 as usize {
                let i = x * 4;
                let src = [src_row[i], src_row[i + 1], src_row[i + 2], src_row[i + 3]];
                if src[3] == 0 {
                    continue;
                }
                let d = [dst_row[i], dst_row[i + 1], dst_row[i + 2], dst_row[i + 3]];
                dst_row[i..i + 4].copy_from_slice(&blend_pixel(d, src, alpha, mode));
            }
        });
}

/// Wash a uniform colour over the whole buffer (or a region) through `mode`
pub fn fill_blend(dst: &mut PixelBuffer, color: Color, mode: BlendMode, alpha: f32, region: Option<PixelRect>) {
    let coverage = alpha * color.alpha;
    if coverage <= 0.0 {
        return;
    }
    let src = [color.r, color.g, color.b, 255];
    let stride = dst.stride();
    let full = PixelRect::full(dst.width(), dst.height());
    let region = region.and_then(|r| r.intersect(&full)).unwrap_or(full);

    dst.as_raw_mut()
        .par_chunks_mut(stride)
        .enumerate()
        .filter(|(y, _)| region.contains_row(*y as u32))
        .for_each(|(_, row)| {
            for x in region.x0 as usize..region.x1 as usize {
                let i = x * 4;
                let d = [row[i], row[i + 1], row[i + 2], row[i + 3]];
                row[i..i + 4].copy_from_slice(&blend_pixel(d, src, coverage, mode));
            }
        });
}

/// Put an opaque colour underneath everything already drawn
pub fn underlay(dst: &mut PixelBuffer, color: Color) {
    let base = [color.r, color.g, color.b, 255];
    dst.as_raw_mut().par_chunks_mut(4).for_each(|px| {
        if px[3] == 255 {
            return;
        }
        let src = [px[0], px[1], px[2], px[3]];
        px.copy_from_slice(&blend_pixel(base, src, 1.0, BlendMode::Normal));
    });
}

fn lum(c: [f32; 3]) -> f32 {
    0.3 * c[0] + 0.59 * c[1] + 0.11 * c[2]
}

fn clip_color(c: [f32; 3]) -> [f32; 3] {
    let l = lum(c);
    let n = c[0].min(c[1]).min(c[2]);
    let x = c[0].max(c[1]).max(c[2]);
    let mut out = c;
    if n < 0.0 && (l - n).abs() > f32::EPSILON {
        for v in &mut out {
            *v = l + (*v - l) * l / (l - n);
        }
    }
    if x > 1.0 && (x - l).abs() > f32::EPSILON {
        for v in &mut out {
            *v = l + (*v - l) * (1.0 - l) / (x - l);
        }
    }
    out
}

fn set_lum(c: [f32; 3], l: f32) -> [f32; 3] {
    let d = l - lum(c);
    clip_color([c[0] + d, c[1] + d, c[2] + d])
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPAQUE_MODES: [BlendMode; 5] = [
        BlendMode::Normal,
        BlendMode::Multiply,
        BlendMode::Screen,
        BlendMode::Overlay,
        BlendMode::Color,
    ];

    #[test]
    fn test_normal_full_alpha_yields_source() {
        for d in [[0, 0, 0, 255], [10, 200, 30, 255], [255, 255, 255, 0], [9, 9, 9, 128]] {
            let s = [120, 45, 250, 255];
            assert_eq!(blend_pixel(d, s, 1.0, BlendMode::Normal), s);
        }
    }

    #[test]
    fn test_zero_alpha_is_noop() {
        let d = [40, 80, 120, 255];
        let s = [250, 10, 5, 255];
        for mode in OPAQUE_MODES {
            assert_eq!(blend_pixel(d, s, 0.0, mode), d);
        }
        assert_eq!(blend_pixel(d, s, 0.0, BlendMode::DestinationOut), d);
    }

    #[test]
    fn test_multiply_formula() {
        let out = blend_pixel([200, 100, 50, 255], [128, 255, 0, 255], 1.0, BlendMode::Multiply);
        assert_eq!(out, [100, 100, 0, 255]);

        // half coverage: D*(1-a) + D*S/255*a
        let out = blend_pixel([200, 200, 200, 255], [0, 0, 0, 255], 0.5, BlendMode::Multiply);
        assert_eq!(out, [100, 100, 100, 255]);
    }

    #[test]
    fn test_screen_formula() {
        let out = blend_pixel([100, 0, 255, 255], [100, 255, 0, 255], 1.0, BlendMode::Screen);
        // 255 - 155*155/255 = 160.78
        assert_eq!(out, [161, 255, 255, 255]);
    }

    #[test]
    fn test_overlay_branches_on_destination() {
        // dark destination: 2*D*S/255
        let dark = blend_pixel([64, 64, 64, 255], [255, 255, 255, 255], 1.0, BlendMode::Overlay);
        assert_eq!(dark[0], 128);
        // light destination: 255 - 2*(255-D)*(255-S)/255
        let light = blend_pixel([200, 200, 200, 255], [0, 0, 0, 255], 1.0, BlendMode::Overlay);
        assert_eq!(light[0], 145);
    }

    #[test]
    fn test_source_alpha_scales_coverage() {
        let out = blend_pixel([0, 0, 0, 255], [255, 255, 255, 0], 1.0, BlendMode::Normal);
        assert_eq!(out, [0, 0, 0, 255]);
        let out = blend_pixel([0, 0, 0, 255], [255, 255, 255, 51], 1.0, BlendMode::Normal);
        assert_eq!(out, [51, 51, 51, 255]);
    }

    #[test]
    fn test_destination_out_cuts_alpha() {
        let d = [183, 28, 28, 255];
        let cut = blend_pixel(d, [255, 255, 255, 255], 1.0, BlendMode::DestinationOut);
        assert_eq!(cut, [183, 28, 28, 0]);

        let half = blend_pixel(d, [0, 0, 0, 255], 0.5, BlendMode::DestinationOut);
        assert_eq!(half[3], 128);

        let untouched = blend_pixel(d, [0, 0, 0, 0], 1.0, BlendMode::DestinationOut);
        assert_eq!(untouched, d);
    }

    #[test]
    fn test_color_mode_keeps_destination_luminosity() {
        let grey = blend_pixel([128, 128, 128, 255], [255, 0, 0, 255], 1.0, BlendMode::Color);
        let l = 0.3 * f32::from(grey[0]) + 0.59 * f32::from(grey[1]) + 0.11 * f32::from(grey[2]);
        assert!((l - 128.0).abs() <= 1.5);
        assert!(grey[0] > grey[1]);
    }

    #[test]
    fn test_fill_blend_respects_region() {
        let mut buffer = PixelBuffer::filled(4, 4, Color::WHITE).unwrap();
        fill_blend(
            &mut buffer,
            Color::BLACK,
            BlendMode::Normal,
            1.0,
            Some(PixelRect::new(0, 0, 2, 2)),
        );
        assert_eq!(buffer.get_pixel(1, 1), Color::BLACK);
        assert_eq!(buffer.get_pixel(2, 2), Color::WHITE);
    }

    #[test]
    fn test_underlay_makes_buffer_opaque() {
        let mut buffer = PixelBuffer::new(3, 3).unwrap();
        buffer.set_pixel(1, 1, Color::rgb(10, 20, 30));
        underlay(&mut buffer, Color::WHITE);
        assert!(buffer.is_opaque());
        assert_eq!(buffer.get_pixel(1, 1), Color::rgb(10, 20, 30));
        assert_eq!(buffer.get_pixel(0, 0), Color::WHITE);
    }
}
