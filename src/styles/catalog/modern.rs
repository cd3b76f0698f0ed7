use std::f32::consts::PI;

use crate::{
    raster::{BlendMode, Color, ColorChannel, FilterChain, Gradient, Palette},
    styles::{
        catalog::{stops, texture},
        Category, ClipRegion, ClipShape, DrawSource, LayerOp, Pixelate, SampledLayer, ShapeScatter,
        StyleDefinition,
    },
    textures::{GeneratorId, TextureParams, DOT_SIZE, INNER, OUTER, SPACING},
};

pub(super) fn styles() -> Vec<StyleDefinition> {
    vec![pixel(), cyberpunk(), neon(), abstract_art(), cubism(), popart(), graffiti()]
}

/// Pop-art panel divider width as a fraction of the canvas
const DIVIDER: f32 = 8.0 / 1024.0;

fn pixel() -> StyleDefinition {
    StyleDefinition {
        id: "pixel",
        display_name: "Pixel Art",
        icon: "👾",
        description: "Retro 8-bit pixels",
        category: Category::Modern,
        pipeline: vec![
            LayerOp::fill(Color::hex(0x1a1a2e)),
            Pixelate::new(12.0, Palette::Retro8).into(),
            LayerOp::texture(GeneratorId::Scanlines, TextureParams::new().set(SPACING, 12.0)),
            // CRT falloff
            LayerOp::texture(
                GeneratorId::Vignette,
                TextureParams::new().with_opacity(0.25).set(INNER, 0.56).set(OUTER, 0.7),
            ),
        ],
    }
}

/// (glow colour, diagonal offset, glow radius, alpha)
const CYBERPUNK_GLOWS: [(u32, f32, f32, f32); 4] = [
    (0x00ffff, -8.0, 60.0, 0.4),
    (0xff00ff, 8.0, 50.0, 0.35),
    (0x00ff00, -4.0, 40.0, 0.25),
    (0xffff00, 4.0, 35.0, 0.2),
];

fn cyberpunk() -> StyleDefinition {
    let mut pipeline = vec![
        LayerOp::gradient(Gradient::vertical(stops(&[
            (0.0, Color::hex(0x0a0a12)),
            (0.5, Color::hex(0x0d0d1a)),
            (1.0, Color::hex(0x0a0a0f)),
        ]))),
        DrawSource::new()
            .filters(FilterChain::new().contrast(2.5).brightness(0.7).saturate(2.0))
            .into(),
    ];

    for (color, offset, radius, alpha) in CYBERPUNK_GLOWS {
        pipeline.push(
            DrawSource::new()
                .offset(offset, offset)
                .glow(Color::hex(color), radius)
                .alpha(alpha)
                .blend(BlendMode::Screen)
                .into(),
        );
    }

    pipeline.push(texture(GeneratorId::NeonGrid));

    // chromatic aberration
    for (dx, channel) in [(-5.0, ColorChannel::Red), (5.0, ColorChannel::Blue)] {
        pipeline.push(
            DrawSource::new()
                .offset(dx, 0.0)
                .filters(FilterChain::new().channel(channel))
                .alpha(0.25)
                .blend(BlendMode::Screen)
                .into(),
        );
    }

    pipeline.push(texture(GeneratorId::Rain));

    StyleDefinition {
        id: "cyberpunk",
        display_name: "Cyberpunk",
        icon: "⚡",
        description: "Neon-lit future city",
        category: Category::Modern,
        pipeline,
    }
}

const NEON_TUBES: [u32; 5] = [0xff006e, 0x00f5ff, 0xffea00, 0x00ff88, 0xff00ff];

fn neon() -> StyleDefinition {
    let mut pipeline = vec![LayerOp::fill(Color::hex(0x050508))];

    for (i, color) in NEON_TUBES.into_iter().enumerate() {
        let offset = (i as f32 - 2.0) * 5.0;
        pipeline.push(
            DrawSource::new()
                .offset(offset, offset)
                .filters(FilterChain::new().hue_rotate(i as f32 * 72.0).saturate(3.0).contrast(1.5))
                .glow(Color::hex(color), 40.0)
                .alpha(0.35)
                .blend(BlendMode::Screen)
                .into(),
        );
    }

    pipeline.push(
        DrawSource::new()
            .filters(FilterChain::new().blur(20.0).brightness(1.5))
            .alpha(0.4)
            .blend(BlendMode::Overlay)
            .into(),
    );

    StyleDefinition {
        id: "neon",
        display_name: "Neon",
        icon: "🌃",
        description: "Glowing neon tubes",
        category: Category::Modern,
        pipeline,
    }
}

fn abstract_art() -> StyleDefinition {
    StyleDefinition {
        id: "abstract",
        display_name: "Abstract",
        icon: "🌀",
        description: "Geometric abstract composition",
        category: Category::Modern,
        pipeline: vec![
            LayerOp::fill(Color::hex(0x0a0a0a)),
            SampledLayer::ShapeScatter(ShapeScatter::default()).into(),
        ],
    }
}

fn cubism() -> StyleDefinition {
    let fragment = ClipRegion::scattered(
        vec![ClipShape::Triangle, ClipShape::Rect, ClipShape::Circle],
        (50.0, 200.0),
        (0.0, PI),
    );

    StyleDefinition {
        id: "cubism",
        display_name: "Cubism",
        icon: "🔷",
        description: "Picasso-style multi-view fragments",
        category: Category::Modern,
        pipeline: vec![
            LayerOp::fill(Color::hex(0xd4c4b0)),
            DrawSource::new()
                .filters(FilterChain::new().saturate(0.8))
                .alpha(0.5)
                .into(),
            LayerOp::repeat(
                40,
                vec![LayerOp::clip(
                    fragment,
                    vec![DrawSource::new().in_clip_frame().alpha(0.4).into()],
                )],
            ),
            texture(GeneratorId::RandomLines),
        ],
    }
}

fn popart() -> StyleDefinition {
    let mut pipeline = vec![
        LayerOp::fill(Color::hex(0xffeb3b)),
        LayerOp::texture(GeneratorId::BenDayDots, TextureParams::new().set(DOT_SIZE, 6.0)),
    ];

    for (x, y, hue) in [(0.0, 0.0, 0.0), (0.5, 0.0, 90.0), (0.0, 0.5, 180.0), (0.5, 0.5, 270.0)] {
        pipeline.push(LayerOp::clip(
            ClipRegion::rect(x, y, 0.5, 0.5),
            vec![DrawSource::new()
                .panel(x, y, 0.5, 0.5)
                .filters(FilterChain::new().hue_rotate(hue).saturate(2.5).contrast(1.8))
                .into()],
        ));
    }

    // panel dividers
    let half = DIVIDER / 2.0;
    for region in [
        ClipRegion::rect(0.5 - half, 0.0, DIVIDER, 1.0),
        ClipRegion::rect(0.0, 0.5 - half, 1.0, DIVIDER),
    ] {
        pipeline.push(LayerOp::clip(region, vec![LayerOp::fill(Color::BLACK)]));
    }

    StyleDefinition {
        id: "popart",
        display_name: "Pop Art",
        icon: "💥",
        description: "Warhol-style four-panel print",
        category: Category::Modern,
        pipeline,
    }
}

fn graffiti() -> StyleDefinition {
    let mut pipeline = vec![LayerOp::fill(Color::hex(0x5d4037)), texture(GeneratorId::Bricks)];

    // spray passes
    for _ in 0..5 {
        pipeline.push(
            DrawSource::new()
                .jitter(20.0)
                .filters(FilterChain::new().blur(3.0).contrast(1.4))
                .alpha(0.25)
                .blend(BlendMode::Screen)
                .into(),
        );
    }

    pipeline.push(texture(GeneratorId::PaintDrips));

    StyleDefinition {
        id: "graffiti",
        display_name: "Graffiti",
        icon: "🎭",
        description: "Street-art spray paint on brick",
        category: Category::Modern,
        pipeline,
    }
}
