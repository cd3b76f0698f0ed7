use serde::{Deserialize, Serialize};

use crate::raster::color::Color;

/// A fixed, ordered set of opaque colours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Palette {
    /// Eight-colour retro console palette
    #[default]
    Retro8,
}

const RETRO_8: [(u8, u8, u8); 8] = [
    (24, 24, 46),    // dark navy
    (205, 92, 92),   // muted red
    (255, 183, 77),  // amber
    (255, 241, 118), // pale yellow
    (129, 199, 132), // sage green
    (79, 195, 247),  // sky blue
    (206, 147, 216), // orchid
    (255, 255, 255), // white
];

impl Palette {
    pub fn entries(&self) -> &'static [(u8, u8, u8)] {
        match self {
            Palette::Retro8 => &RETRO_8,
        }
    }
}

/// Nearest-colour mapping onto a palette
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorQuantizer {
    palette: Palette,
}

impl ColorQuantizer {
    pub fn new(palette: Palette) -> Self {
        Self { palette }
    }

    /// Closest palette entry by Euclidean RGB distance.
    ///
    /// Ties go to the entry declared first.
    pub fn quantize(&self, r: u8, g: u8, b: u8) -> Color {
        let mut best = self.palette.entries()[0];
        let mut best_dist = u32::MAX;
        for &entry in self.palette.entries() {
            let dist = distance_sq((r, g, b), entry);
            if dist < best_dist {
                best_dist = dist;
                best = entry;
            }
        }
        Color::rgb(best.0, best.1, best.2)
    }

    pub fn quantize_color(&self, color: Color) -> Color {
        self.quantize(color.r, color.g, color.b)
    }
}

fn distance_sq(a: (u8, u8, u8), b: (u8, u8, u8)) -> u32 {
    let d = |x: u8, y: u8| {
        let v = i32::from(x) - i32::from(y);
        (v * v) as u32
    };
    d(a.0, b.0) + d(a.1, b.1) + d(a.2, b.2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_entries_are_fixed_points() {
        let q = ColorQuantizer::default();
        for &(r, g, b) in Palette::Retro8.entries() {
            assert_eq!(q.quantize(r, g, b), Color::rgb(r, g, b));
        }
    }

    #[test]
    fn test_output_is_always_a_palette_entry() {
        let q = ColorQuantizer::default();
        let entries = Palette::Retro8.entries();
        for r in (0..=255u16).step_by(17) {
            for g in (0..=255u16).step_by(51) {
                for b in (0..=255u16).step_by(85) {
                    let c = q.quantize(r as u8, g as u8, b as u8);
                    assert!(entries.contains(&(c.r, c.g, c.b)));
                    assert_eq!(q.quantize_color(c), c);
                }
            }
        }
    }

    #[test]
    fn test_nearest_neighbour() {
        let q = ColorQuantizer::default();
        assert_eq!(q.quantize(0, 0, 0), Color::rgb(24, 24, 46));
        assert_eq!(q.quantize(250, 250, 250), Color::WHITE);
        assert_eq!(q.quantize(200, 90, 90), Color::rgb(205, 92, 92));
    }

    #[test]
    fn test_ties_go_to_first_entry() {
        // (1, 174, 54) is equally far from dark navy and sage green
        let q = ColorQuantizer::default();
        assert_eq!(distance_sq((1, 174, 54), (24, 24, 46)), distance_sq((1, 174, 54), (129, 199, 132)));
        assert_eq!(q.quantize(1, 174, 54), Color::rgb(24, 24, 46));
    }
}
