use crate::{
    raster::{BlendMode, Color, FilterChain, Gradient},
    styles::{
        catalog::{paper_grain, stops, texture},
        Category, DrawSource, LayerOp, StyleDefinition,
    },
    textures::{GeneratorId, TextureParams, COLOR, COUNT},
};

pub(super) fn styles() -> Vec<StyleDefinition> {
    vec![watercolor(), oil(), impressionist(), vangogh(), sketch(), pastel()]
}

/// (colour, layer alpha, blur, jitter range)
const WATERCOLOR_WASHES: [((u8, u8, u8), f32, f32, f32); 5] = [
    ((255, 107, 107), 0.25, 8.0, 15.0),
    ((78, 205, 196), 0.2, 10.0, 10.0),
    ((255, 230, 109), 0.15, 12.0, 20.0),
    ((199, 125, 255), 0.2, 9.0, 15.0),
    ((150, 206, 180), 0.25, 11.0, 8.0),
];

fn watercolor() -> StyleDefinition {
    let mut pipeline = vec![LayerOp::fill(Color::hex(0xfafafa)), paper_grain(0.03)];

    for ((r, g, b), alpha, blur, jitter) in WATERCOLOR_WASHES {
        pipeline.push(
            DrawSource::new()
                .jitter(jitter)
                .filters(FilterChain::new().blur(blur))
                .alpha(alpha)
                .blend(BlendMode::Multiply)
                .into(),
        );
        pipeline.push(LayerOp::tint(Color::rgba(r, g, b, 0.5), BlendMode::Color, alpha));
    }

    pipeline.push(texture(GeneratorId::Splatters));
    pipeline.push(
        DrawSource::new()
            .filters(FilterChain::new().blur(1.0))
            .alpha(0.15)
            .blend(BlendMode::Overlay)
            .into(),
    );

    StyleDefinition {
        id: "watercolor",
        display_name: "Watercolor",
        icon: "🎨",
        description: "Soft, translucent watercolour washes",
        category: Category::Classic,
        pipeline,
    }
}

fn oil() -> StyleDefinition {
    let mut pipeline = vec![
        LayerOp::gradient(Gradient::diagonal(stops(&[
            (0.0, Color::hex(0xf5f0e8)),
            (0.5, Color::hex(0xebe5d9)),
            (1.0, Color::hex(0xf0ebe0)),
        ]))),
        texture(GeneratorId::CanvasGrain),
    ];

    // impasto: stacked, progressively softer passes
    for i in 0..4 {
        let i = i as f32;
        pipeline.push(
            DrawSource::new()
                .jitter(8.0)
                .filters(FilterChain::new().blur(i * 0.3).contrast(1.3).saturate(1.2))
                .alpha(0.35 - i * 0.05)
                .into(),
        );
    }

    for (r, g, b, alpha) in [
        (139, 69, 19, 0.12),
        (218, 165, 32, 0.08),
        (70, 130, 180, 0.1),
        (205, 92, 92, 0.08),
        (100, 50, 50, 0.06),
    ] {
        pipeline.push(LayerOp::tint(Color::rgb(r, g, b), BlendMode::Overlay, alpha));
    }

    pipeline.push(texture(GeneratorId::BrushStrokes));

    // varnish sheen
    pipeline.push(LayerOp::blended_gradient(
        Gradient::diagonal(stops(&[
            (0.0, Color::rgba(255, 255, 255, 0.3)),
            (0.5, Color::rgba(255, 255, 255, 0.0)),
            (1.0, Color::rgba(255, 255, 255, 0.2)),
        ])),
        BlendMode::Overlay,
        0.1,
    ));

    StyleDefinition {
        id: "oil",
        display_name: "Oil Painting",
        icon: "🖼️",
        description: "Thick, textured oil paint",
        category: Category::Classic,
        pipeline,
    }
}

fn impressionist() -> StyleDefinition {
    let mut pipeline = vec![LayerOp::fill(Color::hex(0xf8f6f3)), texture(GeneratorId::CanvasGrain)];

    // dabbed strokes
    for i in 0..5 {
        pipeline.push(
            DrawSource::new()
                .diagonal_jitter(10.0)
                .filters(FilterChain::new().blur(2.0 + i as f32).saturate(1.5))
                .alpha(0.2)
                .into(),
        );
    }

    // colour patches
    for (r, g, b, alpha) in [
        (255, 200, 150, 0.1),
        (150, 220, 255, 0.08),
        (200, 255, 200, 0.1),
        (255, 180, 200, 0.08),
    ] {
        pipeline.push(LayerOp::texture(
            GeneratorId::SoftBlobs,
            TextureParams::new()
                .with_opacity(alpha)
                .with_blend(BlendMode::Overlay)
                .set(COLOR, Color::rgb(r, g, b)),
        ));
    }

    StyleDefinition {
        id: "impressionist",
        display_name: "Impressionist",
        icon: "🌸",
        description: "Monet-style dappled light and colour",
        category: Category::Classic,
        pipeline,
    }
}

fn vangogh() -> StyleDefinition {
    let mut pipeline = vec![
        LayerOp::gradient(Gradient::diagonal(stops(&[
            (0.0, Color::hex(0x1a237e)),
            (0.3, Color::hex(0x283593)),
            (0.6, Color::hex(0x3949ab)),
            (1.0, Color::hex(0x1a237e)),
        ]))),
        LayerOp::texture(GeneratorId::Stars, TextureParams::new().set(COUNT, 150.0)),
        DrawSource::new()
            .filters(FilterChain::new().saturate(1.8).contrast(1.3))
            .alpha(0.7)
            .into(),
        texture(GeneratorId::Swirls),
    ];

    for (r, g, b, alpha) in [(255, 215, 0, 0.15), (0, 150, 136, 0.12), (63, 81, 181, 0.1)] {
        pipeline.push(LayerOp::tint(Color::rgb(r, g, b), BlendMode::Overlay, alpha));
    }

    StyleDefinition {
        id: "vangogh",
        display_name: "Van Gogh",
        icon: "🌻",
        description: "Starry-night swirls and brushwork",
        category: Category::Classic,
        pipeline,
    }
}

fn sketch() -> StyleDefinition {
    let mut pipeline = vec![LayerOp::fill(Color::hex(0xf5f5f0)), paper_grain(0.025)];

    // cross-hatching
    for step in 0..6 {
        pipeline.push(
            DrawSource::new()
                .rotated(step as f32 * 30.0)
                .filters(FilterChain::new().contrast(1.8).grayscale(1.0).brightness(1.1))
                .alpha(0.12)
                .into(),
        );
    }

    pipeline.push(
        DrawSource::new()
            .filters(FilterChain::new().contrast(2.2).grayscale(1.0).brightness(1.15))
            .alpha(0.75)
            .into(),
    );
    // pencil smudge
    pipeline.push(
        DrawSource::new()
            .offset(3.0, 3.0)
            .filters(FilterChain::new().blur(3.0))
            .alpha(0.08)
            .into(),
    );
    pipeline.push(LayerOp::texture(
        GeneratorId::Vignette,
        TextureParams::new().with_opacity(0.15),
    ));

    StyleDefinition {
        id: "sketch",
        display_name: "Pencil Sketch",
        icon: "✏️",
        description: "Fine graphite lines and cross-hatching",
        category: Category::Classic,
        pipeline,
    }
}

fn pastel() -> StyleDefinition {
    let mut pipeline = vec![LayerOp::fill(Color::hex(0xfff9f0)), paper_grain(0.03)];

    for (r, g, b, alpha) in [
        (255, 182, 193, 0.25),
        (173, 216, 230, 0.2),
        (255, 255, 224, 0.25),
        (221, 160, 221, 0.2),
        (152, 251, 152, 0.2),
    ] {
        pipeline.push(LayerOp::filtered_tint(
            Color::rgb(r, g, b),
            BlendMode::Overlay,
            alpha,
            FilterChain::new().blur(8.0),
        ));
    }

    pipeline.push(
        DrawSource::new()
            .filters(FilterChain::new().saturate(1.3).contrast(0.9).brightness(1.05))
            .alpha(0.85)
            .into(),
    );

    StyleDefinition {
        id: "pastel",
        display_name: "Pastel",
        icon: "🌈",
        description: "Soft chalk-pastel crayon",
        category: Category::Classic,
        pipeline,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watercolor_pairs_each_wash_with_a_colour_tint() {
        let style = watercolor();
        let tints = style
            .pipeline
            .iter()
            .filter(|op| matches!(op, LayerOp::TintOverlay { blend: BlendMode::Color, .. }))
            .count();
        assert_eq!(tints, WATERCOLOR_WASHES.len());
    }

    #[test]
    fn test_sketch_hatching_angles() {
        let angles: Vec<f32> = sketch()
            .pipeline
            .iter()
            .filter_map(|op| match op {
                LayerOp::DrawSource(DrawSource {
                    placement: crate::styles::SourcePlacement::Rotated { degrees },
                    ..
                }) => Some(*degrees),
                _ => None,
            })
            .collect();
        assert_eq!(angles, vec![0.0, 30.0, 60.0, 90.0, 120.0, 150.0]);
    }
}
