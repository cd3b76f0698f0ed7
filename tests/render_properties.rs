use std::collections::HashSet;

use sketch2art::{
    error::{InputError, StyleError},
    list_styles, render_style,
    raster::{Color, PixelBuffer},
    RenderConfig, PipelineExecutor, StyleRegistry, StylizerError,
};

/// A small "drawing": a few strokes of different colours on a transparent layer
fn sketch(size: u32) -> PixelBuffer {
    let mut input = PixelBuffer::new(size, size).unwrap();
    let s = size as i32;
    input.block_fill(s / 8, s / 4, size * 3 / 4, size / 16 + 1, Color::BLACK);
    input.block_fill(s / 2, s / 8, size / 16 + 1, size * 3 / 4, Color::hex(0xd32f2f));
    input.block_fill(s / 4, s * 3 / 4, size / 2, size / 16 + 1, Color::hex(0x1976d2));
    input
}

fn small_executor() -> PipelineExecutor {
    PipelineExecutor::new(RenderConfig::with_size(128, 128))
}

#[test]
fn every_style_renders_at_canonical_size() {
    let executor = small_executor();
    let input = sketch(96);

    for style in list_styles() {
        let output = executor
            .run(&input, style.id, 7)
            .unwrap_or_else(|e| panic!("{} failed: {}", style.id, e));
        assert_eq!(output.image.dimensions(), (128, 128), "{}", style.id);
        assert!(output.image.is_opaque(), "{} left transparent pixels", style.id);
        assert!(output.warnings.is_empty(), "{} skipped {:?}", style.id, output.warnings);
    }
}

#[test]
fn render_is_deterministic_per_seed() {
    let executor = small_executor();
    let input = sketch(64);

    for id in ["watercolor", "abstract", "lowpoly", "cubism", "vangogh"] {
        let first = executor.run(&input, id, 1234).unwrap();
        let second = executor.run(&input, id, 1234).unwrap();
        assert_eq!(
            first.image.as_raw(),
            second.image.as_raw(),
            "{} should be byte-identical for the same seed",
            id
        );
    }
}

#[test]
fn seed_changes_randomized_styles() {
    let executor = small_executor();
    let input = sketch(64);

    let a = executor.run(&input, "vangogh", 1).unwrap();
    let b = executor.run(&input, "vangogh", 2).unwrap();
    assert_ne!(a.image.as_raw(), b.image.as_raw());
}

#[test]
fn unknown_style_is_rejected() {
    let known: HashSet<&str> = list_styles().iter().map(|s| s.id).collect();
    let input = sketch(32);

    for id in ["", "vhs", "Watercolor", "3d render", "ink "] {
        assert!(!known.contains(id));
        let err = small_executor().run(&input, id, 0).unwrap_err();
        assert!(
            matches!(err, StylizerError::Style(StyleError::UnknownStyle { .. })),
            "{:?} gave {}",
            id,
            err
        );
    }
}

#[test]
fn listing_is_stable_and_resolvable() {
    let first = list_styles();
    let second = list_styles();
    assert!(!first.is_empty());

    let ids: Vec<&str> = first.iter().map(|s| s.id).collect();
    assert_eq!(ids, second.iter().map(|s| s.id).collect::<Vec<_>>());
    assert_eq!(ids.iter().collect::<HashSet<_>>().len(), ids.len());

    for id in ids {
        assert!(StyleRegistry::builtin().get(id).is_ok());
    }
}

#[test]
fn zero_width_input_is_invalid() {
    let err = PixelBuffer::new(0, 512).unwrap_err();
    assert!(matches!(
        err,
        StylizerError::Input(InputError::InvalidDimensions { width: 0, height: 512 })
    ));

    let err = PixelBuffer::from_raw(4, 4, vec![0; 10]).unwrap_err();
    assert!(matches!(err, StylizerError::Input(InputError::BufferSizeMismatch { .. })));
}

#[test]
fn transparent_input_renders_opaque_watercolor() {
    let input = PixelBuffer::new(512, 512).unwrap();
    let output = render_style(&input, "watercolor", 42).unwrap();

    assert_eq!(output.dimensions(), (1024, 1024));
    assert!(output.is_opaque());
}

#[test]
fn input_size_does_not_change_output_size() {
    let executor = small_executor();
    for (w, h) in [(1, 1), (37, 300), (640, 480)] {
        let mut input = PixelBuffer::new(w, h).unwrap();
        input.fill(Color::BLACK);
        let output = executor.run(&input, "ink", 3).unwrap();
        assert_eq!(output.image.dimensions(), (128, 128));
    }
}
