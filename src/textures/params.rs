use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{
    error::{GeneratorError, Result},
    raster::{BlendMode, Color},
    textures::{COUNT, DOT_SIZE, SPACING, TEETH},
};

/// Smallest lattice pitch a pattern accepts, in reference pixels
pub const MIN_PITCH: f32 = 1.0;

/// Largest count any generator accepts before area scaling
pub const MAX_COUNT: usize = 20_000;

/// Parameters for a texture generator call
///
/// Like style configs elsewhere in the crate this is a loose bag of named
/// values: each generator picks out the keys it understands and falls back
/// to its own defaults for the rest. `opacity` and `blend` are common to
/// every generator that paints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextureParams {
    /// Layer alpha applied on top of each primitive's own colour alpha
    pub opacity: f32,

    /// Blend mode the generator paints with
    pub blend: BlendMode,

    /// Generator-specific parameters
    pub parameters: HashMap<String, ParamValue>,
}

impl Default for TextureParams {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            blend: BlendMode::Normal,
            parameters: HashMap::new(),
        }
    }
}

impl TextureParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_blend(mut self, blend: BlendMode) -> Self {
        self.blend = blend;
        self
    }

    /// Set a parameter value
    pub fn set<K: Into<String>, V: Into<ParamValue>>(mut self, key: K, value: V) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    pub fn get_f32(&self, key: &str) -> Option<f32> {
        self.parameters.get(key).and_then(|v| v.as_f32())
    }

    pub fn get_f32_or(&self, key: &str, default: f32) -> f32 {
        self.get_f32(key).unwrap_or(default)
    }

    /// Counts are stored as numbers; negative values read as zero and
    /// anything above [`MAX_COUNT`] reads as the cap
    pub fn get_count_or(&self, key: &str, default: usize) -> usize {
        self.get_f32(key)
            .map(|v| v.clamp(0.0, MAX_COUNT as f32) as usize)
            .unwrap_or(default)
    }

    /// Lattice pitch, or `None` when it is below [`MIN_PITCH`]
    pub fn get_pitch_or(&self, key: &str, default: f32) -> Option<f32> {
        Some(self.get_f32_or(key, default)).filter(|v| *v >= MIN_PITCH)
    }

    pub fn get_color_or(&self, key: &str, default: Color) -> Color {
        self.parameters
            .get(key)
            .and_then(|v| v.as_color())
            .unwrap_or(default)
    }

    pub fn get_colors(&self, key: &str) -> Option<&[Color]> {
        self.parameters.get(key).and_then(|v| v.as_colors())
    }

    pub fn get_bool_or(&self, key: &str, default: bool) -> bool {
        self.parameters
            .get(key)
            .and_then(|v| v.as_bool())
            .unwrap_or(default)
    }

    /// Checks shared by every generator: opacity in `[0, 1]`, every number
    /// finite, the keys in `non_negative` not below zero, lattice pitches at
    /// least [`MIN_PITCH`] and counts at most [`MAX_COUNT`]
    pub fn validate_common(&self, generator: &str, non_negative: &[&str]) -> Result<()> {
        let invalid = |details: String| -> Result<()> {
            Err(GeneratorError::InvalidParameters {
                generator: generator.to_string(),
                details,
            }
            .into())
        };

        if !(0.0..=1.0).contains(&self.opacity) {
            return invalid(format!("opacity {} outside [0, 1]", self.opacity));
        }
        for (key, value) in &self.parameters {
            if let Some(v) = value.as_f32() {
                if !v.is_finite() {
                    return invalid(format!("{} is not finite", key));
                }
            }
        }
        for key in non_negative {
            if let Some(v) = self.get_f32(key) {
                if v < 0.0 {
                    return invalid(format!("{} = {} must not be negative", key, v));
                }
            }
        }
        for key in [SPACING, DOT_SIZE] {
            if let Some(v) = self.get_f32(key) {
                if v < MIN_PITCH {
                    return invalid(format!("{} = {} is below the minimum pitch {}", key, v, MIN_PITCH));
                }
            }
        }
        for key in [COUNT, TEETH] {
            if let Some(v) = self.get_f32(key) {
                if v > MAX_COUNT as f32 {
                    return invalid(format!("{} = {} exceeds the maximum {}", key, v, MAX_COUNT));
                }
            }
        }
        Ok(())
    }
}

/// Flexible parameter value that can hold different types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Float(f32),
    Bool(bool),
    Color(Color),
    Colors(Vec<Color>),
}

impl ParamValue {
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            ParamValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match self {
            ParamValue::Color(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_colors(&self) -> Option<&[Color]> {
        match self {
            ParamValue::Colors(c) => Some(c),
            _ => None,
        }
    }
}

impl From<f32> for ParamValue {
    fn from(value: f32) -> Self {
        ParamValue::Float(value)
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Float(value as f32)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<Color> for ParamValue {
    fn from(value: Color) -> Self {
        ParamValue::Color(value)
    }
}

impl From<Vec<Color>> for ParamValue {
    fn from(value: Vec<Color>) -> Self {
        ParamValue::Colors(value)
    }
}

impl From<&[Color]> for ParamValue {
    fn from(value: &[Color]) -> Self {
        ParamValue::Colors(value.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_getters_fall_back_to_defaults() {
        let params = TextureParams::new()
            .set("count", 25u32)
            .set("blur", 2.5)
            .set("tint", Color::WHITE);

        assert_eq!(params.get_count_or("count", 3), 25);
        assert_eq!(params.get_count_or("missing", 3), 3);
        assert_eq!(params.get_f32_or("blur", 0.0), 2.5);
        assert_eq!(params.get_color_or("tint", Color::BLACK), Color::WHITE);
        assert_eq!(params.get_color_or("blur", Color::BLACK), Color::BLACK);
        assert!(params.get_colors("tint").is_none());
    }

    #[test]
    fn test_validate_common() {
        let ok = TextureParams::new().with_opacity(0.4).set("blur", 3.0);
        assert!(ok.validate_common("soft_blobs", &["blur"]).is_ok());

        let opacity = TextureParams::new().with_opacity(1.5);
        assert!(opacity.validate_common("soft_blobs", &[]).is_err());

        let negative = TextureParams::new().set("blur", -1.0);
        let err = negative.validate_common("soft_blobs", &["blur"]).unwrap_err();
        assert!(err.is_recoverable());

        let nan = TextureParams::new().set("size", f32::NAN);
        assert!(nan.validate_common("soft_blobs", &[]).is_err());
    }

    #[test]
    fn test_degenerate_pitch_and_count_are_rejected() {
        let tiny = TextureParams::new().set(SPACING, 1e-6f32);
        let err = tiny.validate_common("scanlines", &[SPACING]).unwrap_err();
        assert!(err.is_recoverable());

        let zero_dots = TextureParams::new().set(DOT_SIZE, 0.0f32);
        assert!(zero_dots.validate_common("ben_day_dots", &[DOT_SIZE]).is_err());

        let huge = TextureParams::new().set(COUNT, 1e12f32);
        let err = huge.validate_common("stars", &[COUNT]).unwrap_err();
        assert!(err.is_recoverable());

        let ok = TextureParams::new().set(SPACING, MIN_PITCH).set(COUNT, MAX_COUNT as f32);
        assert!(ok.validate_common("scanlines", &[SPACING, COUNT]).is_ok());
    }

    #[test]
    fn test_count_and_pitch_getters_clamp() {
        let params = TextureParams::new().set(COUNT, 1e12f32).set(SPACING, 0.5f32);
        assert_eq!(params.get_count_or(COUNT, 3), MAX_COUNT);
        assert_eq!(params.get_pitch_or(SPACING, 4.0), None);
        assert_eq!(params.get_pitch_or("missing", 4.0), Some(4.0));
    }
}
