use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};

use crate::{
    error::{ConfigError, Result},
    raster::ResampleFilter,
};

/// Largest canonical edge the renderer accepts
pub const MAX_CANONICAL_EDGE: u32 = 8192;

/// Main configuration for sketch2art
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Rendering settings
    #[serde(default)]
    pub render: RenderConfig,

    /// Where the CLI writes its images
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound { path: path.display().to_string() })?;

        let config: Config = toml::from_str(&content)
            .map_err(|_| ConfigError::ParseFailed { path: path.display().to_string() })?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::InvalidValue {
            key: "config".to_string(),
            value: e.to_string(),
        })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.render.validate()?;
        self.output.validate()?;
        Ok(())
    }
}

/// Rendering configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Output width; every render comes out at exactly this size
    pub canonical_width: u32,

    /// Output height
    pub canonical_height: u32,

    /// Kernel used to fit the input sketch to the canonical size
    pub resample: ResampleFilter,

    /// Threads used by batch renders
    pub worker_threads: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            canonical_width: 1024,
            canonical_height: 1024,
            resample: ResampleFilter::Triangle,
            worker_threads: num_cpus::get(),
        }
    }
}

impl RenderConfig {
    /// Canonical canvas of the given size, other settings default
    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            canonical_width: width,
            canonical_height: height,
            ..Self::default()
        }
    }

    fn validate(&self) -> Result<()> {
        for (key, value) in [
            ("render.canonical_width", self.canonical_width),
            ("render.canonical_height", self.canonical_height),
        ] {
            if !(1..=MAX_CANONICAL_EDGE).contains(&value) {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: value.to_string()
                }.into());
            }
        }

        if self.worker_threads == 0 {
            return Err(ConfigError::InvalidValue {
                key: "render.worker_threads".to_string(),
                value: self.worker_threads.to_string()
            }.into());
        }

        Ok(())
    }
}

/// Output file configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory rendered images are written to
    pub directory: PathBuf,

    /// File name prefix, followed by the style id and a timestamp
    pub file_prefix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            file_prefix: "sketch2art".to_string(),
        }
    }
}

impl OutputConfig {
    fn validate(&self) -> Result<()> {
        if self.file_prefix.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "output.file_prefix".to_string(),
                value: self.file_prefix.clone()
            }.into());
        }
        Ok(())
    }
}
