use crate::{
    raster::{BlendMode, Color, FilterChain, Gradient},
    styles::{
        catalog::{paper_grain, stops, texture},
        Category, DrawSource, LayerOp, SampledLayer, StyleDefinition, TriangleMesh,
    },
    textures::{GeneratorId, TextureParams},
};

pub(super) fn styles() -> Vec<StyleDefinition> {
    vec![render_3d(), lowpoly(), origami()]
}

fn render_3d() -> StyleDefinition {
    StyleDefinition {
        id: "3drender",
        display_name: "3D Render",
        icon: "🎲",
        description: "Studio-lit 3D render",
        category: Category::ThreeD,
        pipeline: vec![
            // studio backdrop
            LayerOp::gradient(Gradient::radial(
                (0.5, 0.5),
                0.0,
                1.0,
                stops(&[
                    (0.0, Color::hex(0xe0e0e0)),
                    (0.7, Color::hex(0xc0c0c0)),
                    (1.0, Color::hex(0xa0a0a0)),
                ]),
            )),
            DrawSource::new()
                .filters(FilterChain::new().contrast(1.2).saturate(1.1))
                .into(),
            // specular highlight
            LayerOp::blended_gradient(
                Gradient::radial(
                    (0.3, 0.3),
                    0.0,
                    0.5,
                    stops(&[
                        (0.0, Color::rgba(255, 255, 255, 0.8)),
                        (1.0, Color::rgba(255, 255, 255, 0.0)),
                    ]),
                ),
                BlendMode::Overlay,
                0.3,
            ),
            LayerOp::texture(GeneratorId::DropShadow, TextureParams::new().with_opacity(0.2)),
        ],
    }
}

fn lowpoly() -> StyleDefinition {
    StyleDefinition {
        id: "lowpoly",
        display_name: "Low Poly",
        icon: "🔺",
        description: "Faceted low-polygon geometry",
        category: Category::ThreeD,
        pipeline: vec![
            LayerOp::fill(Color::hex(0x1a1a2e)),
            SampledLayer::TriangleMesh(TriangleMesh::default()).into(),
        ],
    }
}

fn origami() -> StyleDefinition {
    StyleDefinition {
        id: "origami",
        display_name: "Origami",
        icon: "📄",
        description: "Folded Japanese paper",
        category: Category::ThreeD,
        pipeline: vec![
            LayerOp::fill(Color::hex(0xf5f5f0)),
            paper_grain(0.02),
            DrawSource::new()
                .filters(FilterChain::new().contrast(1.1).saturate(0.9))
                .into(),
            texture(GeneratorId::FoldLines),
        ],
    }
}
