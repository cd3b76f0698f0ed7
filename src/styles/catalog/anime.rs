use crate::{
    raster::{BlendMode, Color, FilterChain, Gradient},
    styles::{
        catalog::{stops, texture},
        Category, DrawSource, LayerOp, StyleDefinition,
    },
    textures::{GeneratorId, TextureParams, COUNT, SPACING},
};

pub(super) fn styles() -> Vec<StyleDefinition> {
    vec![miyazaki(), manga(), lineart()]
}

fn miyazaki() -> StyleDefinition {
    let mut pipeline = vec![
        LayerOp::gradient(Gradient::vertical(stops(&[
            (0.0, Color::hex(0xe8f5e9)),
            (0.5, Color::hex(0xc8e6c9)),
            (1.0, Color::hex(0xa5d6a7)),
        ]))),
        LayerOp::texture(GeneratorId::Clouds, TextureParams::new().set(COUNT, 8.0)),
        DrawSource::new()
            .filters(FilterChain::new().saturate(1.3).contrast(0.9).brightness(1.1))
            .alpha(0.8)
            .into(),
    ];

    // soft sky, sun and meadow washes
    for (i, (r, g, b, alpha)) in [(144, 202, 249, 0.15), (255, 245, 157, 0.12), (200, 230, 201, 0.18)]
        .into_iter()
        .enumerate()
    {
        pipeline.push(LayerOp::filtered_tint(
            Color::rgb(r, g, b),
            BlendMode::Overlay,
            alpha,
            FilterChain::new().blur(20.0 + i as f32 * 10.0),
        ));
    }

    StyleDefinition {
        id: "miyazaki",
        display_name: "Ghibli",
        icon: "🏯",
        description: "Hand-painted studio animation look",
        category: Category::Anime,
        pipeline,
    }
}

fn manga() -> StyleDefinition {
    StyleDefinition {
        id: "manga",
        display_name: "Manga",
        icon: "💢",
        description: "Black-and-white Japanese comic",
        category: Category::Anime,
        pipeline: vec![
            LayerOp::fill(Color::WHITE),
            LayerOp::texture(GeneratorId::ScreenTone, TextureParams::new().set(SPACING, 8.0)),
            DrawSource::new()
                .filters(FilterChain::new().contrast(3.0).grayscale(1.0).brightness(1.1))
                .into(),
            texture(GeneratorId::SpeedLines),
            // inked outlines
            DrawSource::new()
                .filters(FilterChain::new().contrast(4.0).brightness(0.9))
                .alpha(0.6)
                .blend(BlendMode::Multiply)
                .into(),
        ],
    }
}

fn lineart() -> StyleDefinition {
    StyleDefinition {
        id: "lineart",
        display_name: "Line Art",
        icon: "✒️",
        description: "Clean anime line work",
        category: Category::Anime,
        pipeline: vec![
            LayerOp::fill(Color::WHITE),
            DrawSource::new()
                .filters(FilterChain::new().contrast(3.0).grayscale(1.0))
                .into(),
            DrawSource::new()
                .filters(FilterChain::new().brightness(0.0).contrast(5.0))
                .alpha(0.7)
                .blend(BlendMode::Multiply)
                .into(),
            DrawSource::new()
                .filters(FilterChain::new().contrast(4.0).brightness(0.8))
                .alpha(0.9)
                .into(),
        ],
    }
}
