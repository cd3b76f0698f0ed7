use crate::{
    error::Result,
    raster::PixelBuffer,
    textures::{GeneratorId, StyleRng, TextureParams},
};

/// Core trait that all procedural texture generators implement
pub trait TextureGenerator: Send + Sync {
    /// Returns the stable identifier of this generator
    fn id(&self) -> GeneratorId;

    /// Returns a human-readable description of this generator
    fn description(&self) -> &str;

    /// Draw the texture directly onto the canvas
    ///
    /// # Arguments
    ///
    /// * `canvas` - The buffer to draw on, modified in place
    /// * `params` - Generator-specific parameters
    /// * `rng` - The run's random stream; all randomized placement draws from it
    fn generate(&self, canvas: &mut PixelBuffer, params: &TextureParams, rng: &mut StyleRng) -> Result<()>;

    /// Validate parameters before anything is drawn
    ///
    /// The default accepts any opacity in `[0, 1]` and any finite numbers.
    fn validate_params(&self, params: &TextureParams) -> Result<()> {
        params.validate_common(self.id().as_str(), &[])
    }

    /// Parameters this generator reads, for catalog display
    fn metadata(&self) -> GeneratorMetadata {
        GeneratorMetadata::default()
    }
}

/// Metadata about a generator's parameters and cost
#[derive(Debug, Clone, Default)]
pub struct GeneratorMetadata {
    /// Estimated cost on a full canvas (0.0 = negligible, 1.0 = heavy)
    pub performance_impact: f32,

    /// Optional parameters with descriptions
    pub optional_parameters: Vec<(String, String)>,
}

impl GeneratorMetadata {
    pub fn new(performance_impact: f32, parameters: &[(&str, &str)]) -> Self {
        Self {
            performance_impact,
            optional_parameters: parameters
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}
