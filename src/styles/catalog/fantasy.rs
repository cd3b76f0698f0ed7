use crate::{
    raster::{BlendMode, Color, FilterChain, Gradient},
    styles::{
        catalog::{stops, texture},
        Category, DrawSource, LayerOp, StyleDefinition,
    },
    textures::GeneratorId,
};

pub(super) fn styles() -> Vec<StyleDefinition> {
    vec![steampunk()]
}

fn steampunk() -> StyleDefinition {
    StyleDefinition {
        id: "steampunk",
        display_name: "Steampunk",
        icon: "⚙️",
        description: "Victorian brass-and-gears machinery",
        category: Category::Fantasy,
        pipeline: vec![
            LayerOp::gradient(Gradient::diagonal(stops(&[
                (0.0, Color::hex(0x3d2914)),
                (0.5, Color::hex(0x5c3d1e)),
                (1.0, Color::hex(0x3d2914)),
            ]))),
            texture(GeneratorId::Gears),
            DrawSource::new()
                .filters(FilterChain::new().sepia(0.8).contrast(1.3).saturate(0.6))
                .alpha(0.8)
                .into(),
            // copper highlights
            LayerOp::blended_gradient(
                Gradient::diagonal(stops(&[
                    (0.0, Color::rgba(255, 140, 0, 0.5)),
                    (0.5, Color::rgba(184, 115, 51, 0.3)),
                    (1.0, Color::rgba(255, 140, 0, 0.5)),
                ])),
                BlendMode::Overlay,
                0.2,
            ),
        ],
    }
}
