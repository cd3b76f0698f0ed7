use thiserror::Error;

/// Main error type for the sketch2art library
#[derive(Error, Debug)]
pub enum StylizerError {
    #[error("Invalid input: {0}")]
    Input(#[from] InputError),

    #[error("Style error: {0}")]
    Style(#[from] StyleError),

    #[error("Filter error: {0}")]
    Filter(#[from] FilterError),

    #[error("Texture generator error: {0}")]
    Generator(#[from] GeneratorError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image codec error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Render was cancelled before it completed")]
    Cancelled,

    #[error("Generic error: {0}")]
    Generic(String),
}

/// Errors about the raster handed to the pipeline
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    #[error("buffer dimensions must be positive, got {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("raw buffer holds {actual} bytes but {width}x{height} RGBA needs {expected}")]
    BufferSizeMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

/// Style catalog errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StyleError {
    #[error("Unknown style: {id}")]
    UnknownStyle { id: String },

    #[error("Layer op {op} is malformed: {reason}")]
    InvalidOp { op: String, reason: String },
}

/// Filter chain errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error("Invalid parameter for {filter}: {value} ({reason})")]
    InvalidParameter {
        filter: String,
        value: f32,
        reason: String,
    },
}

/// Procedural texture errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeneratorError {
    #[error("Invalid parameters for generator {generator}: {details}")]
    InvalidParameters { generator: String, details: String },

    #[error("Generator {generator} failed: {reason}")]
    Failed { generator: String, reason: String },
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path}")]
    ParseFailed { path: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Convenience type alias for Results using StylizerError
pub type Result<T> = std::result::Result<T, StylizerError>;

impl StylizerError {
    /// Create a generic error with a custom message
    pub fn generic<S: Into<String>>(message: S) -> Self {
        Self::Generic(message.into())
    }

    /// Whether the error only affects a single layer op.
    ///
    /// The executor skips the offending op for these and keeps rendering;
    /// everything else aborts the run.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Filter(_) | Self::Generator(_) | Self::Style(StyleError::InvalidOp { .. })
        )
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Style(StyleError::UnknownStyle { id }) => {
                let available = crate::styles::StyleRegistry::builtin().available_styles();
                format!(
                    "Style '{}' not found. Available styles: {}",
                    id,
                    available.join(", ")
                )
            }
            Self::Input(InputError::InvalidDimensions { width, height }) => {
                format!(
                    "The sketch is {}x{} pixels; draw something on a non-empty canvas first.",
                    width, height
                )
            }
            Self::Config(ConfigError::FileNotFound { path }) => {
                format!("Configuration file '{}' not found.", path)
            }
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_op_errors_are_recoverable() {
        let filter: StylizerError = FilterError::InvalidParameter {
            filter: "blur".to_string(),
            value: -1.0,
            reason: "radius must be >= 0".to_string(),
        }
        .into();
        assert!(filter.is_recoverable());

        let generator: StylizerError = GeneratorError::Failed {
            generator: "stars".to_string(),
            reason: "empty canvas".to_string(),
        }
        .into();
        assert!(generator.is_recoverable());
    }

    #[test]
    fn test_run_errors_are_fatal() {
        let unknown: StylizerError = StyleError::UnknownStyle {
            id: "nope".to_string(),
        }
        .into();
        assert!(!unknown.is_recoverable());

        let input: StylizerError = InputError::InvalidDimensions {
            width: 0,
            height: 10,
        }
        .into();
        assert!(!input.is_recoverable());
    }

    #[test]
    fn test_unknown_style_message_lists_catalog() {
        let err: StylizerError = StyleError::UnknownStyle {
            id: "nope".to_string(),
        }
        .into();
        let message = err.user_message();
        assert!(message.contains("'nope'"));
        assert!(message.contains("watercolor"));
    }
}
