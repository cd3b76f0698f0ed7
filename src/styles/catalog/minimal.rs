use crate::{
    raster::{BlendMode, Color, FilterChain, Gradient},
    styles::{
        catalog::{paper_grain, stops, texture},
        Category, DrawSource, LayerOp, StyleDefinition,
    },
    textures::{GeneratorId, TextureParams, BLUR, COLOR, COUNT, SIZE_MAX, SIZE_MIN},
};

pub(super) fn styles() -> Vec<StyleDefinition> {
    vec![chalk(), papercut()]
}

fn chalk() -> StyleDefinition {
    let mut pipeline = vec![
        LayerOp::gradient(Gradient::diagonal(stops(&[
            (0.0, Color::hex(0x1a237e)),
            (0.5, Color::hex(0x0d47a1)),
            (1.0, Color::hex(0x1a237e)),
        ]))),
        texture(GeneratorId::ChalkDust),
    ];

    for i in 0..5 {
        let offset = (i as f32 - 2.0) * 3.0;
        pipeline.push(
            DrawSource::new()
                .offset(offset, offset)
                .filters(FilterChain::new().blur(1.0).contrast(1.2))
                .alpha(0.4)
                .blend(BlendMode::Screen)
                .into(),
        );
    }

    // smudges
    pipeline.push(LayerOp::texture(
        GeneratorId::SoftBlobs,
        TextureParams::new()
            .with_opacity(0.1)
            .set(COUNT, 30.0)
            .set(SIZE_MIN, 20.0)
            .set(SIZE_MAX, 70.0)
            .set(BLUR, 10.0)
            .set(COLOR, Color::rgba(255, 255, 255, 0.5)),
    ));

    StyleDefinition {
        id: "chalk",
        display_name: "Chalkboard",
        icon: "🖍️",
        description: "Chalk drawing on a blackboard",
        category: Category::Minimal,
        pipeline,
    }
}

fn papercut() -> StyleDefinition {
    StyleDefinition {
        id: "papercut",
        display_name: "Paper Cut",
        icon: "✂️",
        description: "Chinese red paper-cutting",
        category: Category::Minimal,
        pipeline: vec![
            LayerOp::fill(Color::hex(0xb71c1c)),
            paper_grain(0.04),
            // cut the silhouette out of the red sheet
            DrawSource::new()
                .filters(FilterChain::new().contrast(3.0).brightness(1.5).grayscale(1.0))
                .blend(BlendMode::DestinationOut)
                .into(),
            DrawSource::new()
                .filters(FilterChain::new().contrast(2.0).saturate(1.5))
                .alpha(0.9)
                .into(),
            texture(GeneratorId::DecorativeBorder),
            // white backing sheet shows through the cuts
            LayerOp::Underlay { color: Color::WHITE },
        ],
    }
}
