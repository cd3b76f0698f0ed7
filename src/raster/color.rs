use serde::{Deserialize, Serialize};

/// An RGB colour with a fractional alpha.
///
/// Channels are plain 0-255 integers; `alpha` is a coverage factor in
/// `[0, 1]`. The same type is used for solid fills, gradient stops and the
/// tints of color-wash layers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub alpha: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0.0);

    /// Opaque colour
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, alpha: 1.0 }
    }

    /// Colour with explicit alpha
    pub const fn rgba(r: u8, g: u8, b: u8, alpha: f32) -> Self {
        Self { r, g, b, alpha }
    }

    /// Opaque colour from a packed `0xRRGGBB` literal
    pub const fn hex(rgb: u32) -> Self {
        Self::rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
    }

    /// Parse `#rrggbb` or `rrggbb`
    pub fn parse_hex(text: &str) -> Option<Self> {
        let digits = text.strip_prefix('#').unwrap_or(text);
        if digits.len() != 6 {
            return None;
        }
        u32::from_str_radix(digits, 16).ok().map(Self::hex)
    }

    /// Same colour with a different alpha
    pub const fn with_alpha(self, alpha: f32) -> Self {
        Self { alpha, ..self }
    }

    /// Build a colour from stored RGBA8 samples
    pub fn from_rgba8(px: [u8; 4]) -> Self {
        Self::rgba(px[0], px[1], px[2], f32::from(px[3]) / 255.0)
    }

    /// Stored RGBA8 representation (alpha rounded to 0-255)
    pub fn to_rgba8(self) -> [u8; 4] {
        [self.r, self.g, self.b, unit_to_u8(self.alpha)]
    }

    /// Colour from HSL (hue in degrees, saturation/lightness in `[0, 1]`)
    pub fn from_hsl(hue: f32, saturation: f32, lightness: f32) -> Self {
        let (r, g, b) = hsl_to_rgb(hue.rem_euclid(360.0) / 360.0, saturation, lightness);
        Self::rgb(unit_to_u8(r), unit_to_u8(g), unit_to_u8(b))
    }

    /// Premultiplied channels in `[0, 1]`
    pub fn premultiplied(self) -> [f32; 4] {
        let a = self.alpha.clamp(0.0, 1.0);
        [
            f32::from(self.r) / 255.0 * a,
            f32::from(self.g) / 255.0 * a,
            f32::from(self.b) / 255.0 * a,
            a,
        ]
    }

    /// Inverse of [`Color::premultiplied`]
    pub fn from_premultiplied(p: [f32; 4]) -> Self {
        let a = p[3].clamp(0.0, 1.0);
        if a <= 0.0 {
            return Self::TRANSPARENT;
        }
        Self::rgba(
            unit_to_u8(p[0] / a),
            unit_to_u8(p[1] / a),
            unit_to_u8(p[2] / a),
            a,
        )
    }
}

/// Round a `[0, 1]` value onto the 0-255 range
pub fn unit_to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Round and clamp an arbitrary channel value onto 0-255
pub fn clamp_channel(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

pub fn rgb_to_hsl(r: f32, g: f32, b: f32) -> (f32, f32, f32) {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;
    let delta = max - min;

    if delta <= f32::EPSILON {
        return (0.0, 0.0, l);
    }

    let s = if l > 0.5 {
        delta / (2.0 - max - min)
    } else {
        delta / (max + min)
    };

    let h = if max == r {
        ((g - b) / delta).rem_euclid(6.0)
    } else if max == g {
        (b - r) / delta + 2.0
    } else {
        (r - g) / delta + 4.0
    };

    (h / 6.0, s, l)
}

pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> (f32, f32, f32) {
    if s <= 0.0 {
        return (l, l, l);
    }
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    (
        hue_to_rgb(p, q, h + 1.0 / 3.0),
        hue_to_rgb(p, q, h),
        hue_to_rgb(p, q, h - 1.0 / 3.0),
    )
}

fn hue_to_rgb(p: f32, q: f32, mut t: f32) -> f32 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_constructors() {
        assert_eq!(Color::hex(0x1a1a2e), Color::rgb(0x1a, 0x1a, 0x2e));
        assert_eq!(Color::parse_hex("#b71c1c"), Some(Color::rgb(0xb7, 0x1c, 0x1c)));
        assert_eq!(Color::parse_hex("fff"), None);
        assert_eq!(Color::parse_hex("#zzzzzz"), None);
    }

    #[test]
    fn test_premultiplied_roundtrip_keeps_opaque_colour() {
        let c = Color::rgb(12, 200, 99);
        assert_eq!(Color::from_premultiplied(c.premultiplied()), c);
    }

    #[test]
    fn test_hsl_primaries() {
        assert_eq!(Color::from_hsl(0.0, 1.0, 0.5), Color::rgb(255, 0, 0));
        assert_eq!(Color::from_hsl(120.0, 1.0, 0.5), Color::rgb(0, 255, 0));
        assert_eq!(Color::from_hsl(600.0, 1.0, 0.5), Color::rgb(0, 0, 255));
    }

    #[test]
    fn test_rgb_hsl_roundtrip() {
        let (h, s, l) = rgb_to_hsl(0.8, 0.3, 0.1);
        let (r, g, b) = hsl_to_rgb(h, s, l);
        assert!((r - 0.8).abs() < 1e-4);
        assert!((g - 0.3).abs() < 1e-4);
        assert!((b - 0.1).abs() < 1e-4);
    }
}
