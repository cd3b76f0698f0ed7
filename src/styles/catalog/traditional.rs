use crate::{
    raster::{BlendMode, Color, FilterChain},
    styles::{
        catalog::{paper_grain, texture},
        Category, DrawSource, LayerOp, StyleDefinition,
    },
    textures::GeneratorId,
};

pub(super) fn styles() -> Vec<StyleDefinition> {
    vec![ink(), ukiyoe()]
}

/// (alpha, blur, jitter range)
const INK_WASHES: [(f32, f32, f32); 3] = [(0.3, 15.0, 20.0), (0.2, 25.0, 15.0), (0.15, 35.0, 30.0)];

fn ink() -> StyleDefinition {
    let mut pipeline = vec![
        LayerOp::fill(Color::hex(0xf9f6f0)),
        paper_grain(0.02),
        DrawSource::new()
            .filters(FilterChain::new().grayscale(1.0).contrast(1.5).brightness(1.2))
            .alpha(0.9)
            .into(),
    ];

    for (alpha, blur, jitter) in INK_WASHES {
        pipeline.push(
            DrawSource::new()
                .jitter(jitter)
                .filters(FilterChain::new().blur(blur))
                .alpha(alpha)
                .blend(BlendMode::Multiply)
                .into(),
        );
    }

    pipeline.push(texture(GeneratorId::InkBleed));
    pipeline.push(texture(GeneratorId::SealStamp));

    StyleDefinition {
        id: "ink",
        display_name: "Ink Wash",
        icon: "🎋",
        description: "Chinese ink painting on rice paper",
        category: Category::Traditional,
        pipeline,
    }
}

fn ukiyoe() -> StyleDefinition {
    let mut pipeline = vec![
        LayerOp::fill(Color::hex(0xf5f0e6)),
        paper_grain(0.03),
        DrawSource::new()
            .filters(FilterChain::new().contrast(1.6).saturate(1.4))
            .alpha(0.85)
            .into(),
    ];

    // flat woodblock colour areas
    for (r, g, b, alpha) in [
        (200, 50, 50, 0.2),
        (50, 100, 150, 0.15),
        (200, 180, 100, 0.18),
        (100, 150, 100, 0.15),
    ] {
        pipeline.push(LayerOp::filtered_tint(
            Color::rgb(r, g, b),
            BlendMode::Multiply,
            alpha,
            FilterChain::new().blur(40.0),
        ));
    }

    pipeline.push(texture(GeneratorId::WoodGrain));

    StyleDefinition {
        id: "ukiyoe",
        display_name: "Ukiyo-e",
        icon: "🗻",
        description: "Japanese woodblock print",
        category: Category::Traditional,
        pipeline,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ink_ends_with_seal() {
        let style = ink();
        assert!(matches!(
            style.pipeline.last(),
            Some(LayerOp::Procedural {
                generator: GeneratorId::SealStamp,
                ..
            })
        ));
    }
}
