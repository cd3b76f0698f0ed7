//! Built-in style catalog, one file per category
//!
//! Every pipeline opens with an opaque background fill, so a render is
//! fully opaque whatever the input. Pixel quantities (offsets, blur radii,
//! sizes) are authored for a 1024 px wide canvas.

use crate::{
    raster::{Color, ColorStop},
    styles::{LayerOp, StyleDefinition},
    textures::{GeneratorId, TextureParams, INTENSITY},
};

mod anime;
mod classic;
mod fantasy;
mod minimal;
mod modern;
mod three_d;
mod traditional;

/// All built-in styles, in declaration order
pub(crate) fn builtin_styles() -> Vec<StyleDefinition> {
    let mut styles = Vec::with_capacity(24);
    styles.extend(classic::styles());
    styles.extend(modern::styles());
    styles.extend(anime::styles());
    styles.extend(traditional::styles());
    styles.extend(three_d::styles());
    styles.extend(fantasy::styles());
    styles.extend(minimal::styles());
    styles
}

/// Generator with its default parameters
fn texture(id: GeneratorId) -> LayerOp {
    LayerOp::texture(id, TextureParams::new())
}

fn paper_grain(intensity: f32) -> LayerOp {
    LayerOp::texture(GeneratorId::PaperGrain, TextureParams::new().set(INTENSITY, intensity))
}

fn stops(entries: &[(f32, Color)]) -> Vec<ColorStop> {
    entries.iter().map(|&(offset, color)| ColorStop::new(offset, color)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_size_and_grouping() {
        let styles = builtin_styles();
        assert_eq!(styles.len(), 24);
        assert_eq!(styles[0].id, "watercolor");
        assert_eq!(styles[23].id, "papercut");
    }

    #[test]
    fn test_every_style_has_display_metadata() {
        for style in builtin_styles() {
            assert!(!style.display_name.is_empty(), "{}", style.id);
            assert!(!style.icon.is_empty(), "{}", style.id);
            assert!(!style.description.is_empty(), "{}", style.id);
            assert!(style.pipeline.len() >= 2, "{}", style.id);
        }
    }
}
