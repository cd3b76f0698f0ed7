use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use sketch2art::{
    config::Config,
    pipeline::{PipelineExecutor, RenderJob, RenderOutput},
    raster::PixelBuffer,
    styles::StyleRegistry,
    textures::{TextureGenerator, TextureLibrary},
};

#[derive(Parser)]
#[command(
    name = "sketch2art",
    version,
    about = "Turn line sketches into stylized artwork",
    long_about = "sketch2art runs a sketch through one of 24 layered style pipelines (watercolor, cyberpunk, ukiyo-e and more). The same sketch, style and seed always give the same image."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Configuration file (optional)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Render a sketch in one style
    Render {
        /// Sketch image (PNG or JPEG)
        input: PathBuf,

        /// Style id, see `sketch2art list`
        #[arg(short, long, default_value = "watercolor")]
        style: String,

        /// Seed for every random placement
        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Output PNG path (defaults to <prefix>-<style>-<timestamp>.png in the output directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the available styles
    List,

    /// List the procedural texture generators and their parameters
    Textures,

    /// Render a sketch in every style
    RenderAll {
        /// Sketch image (PNG or JPEG)
        input: PathBuf,

        /// Directory for the rendered images
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Seed for every random placement
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },

    /// Write the effective configuration to a TOML file
    InitConfig {
        /// Destination file
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting sketch2art v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = match &cli.config {
        Some(config_path) => {
            info!("Loading configuration from {:?}", config_path);
            Config::from_file(config_path)?
        }
        None => Config::default(),
    };
    config.validate()?;

    match cli.command {
        Command::List => list_styles(),
        Command::Textures => list_textures(),
        Command::InitConfig { path } => {
            config.save_to_file(&path)?;
            info!("📝 Configuration written to {:?}", path);
        }
        Command::Render { input, style, seed, output } => {
            let sketch = load_sketch(&input)?;
            let path = output.unwrap_or_else(|| default_output_path(&config, &config.output.directory, &style));
            let executor = PipelineExecutor::new(config.render.clone());

            let rendered = tokio::task::spawn_blocking(move || executor.run(&sketch, &style, seed))
                .await
                .context("render task did not complete")?
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;

            save(&rendered, &path)?;
        }
        Command::RenderAll { input, dir, seed } => {
            let sketch = load_sketch(&input)?;
            let dir = dir.unwrap_or_else(|| config.output.directory.clone());
            std::fs::create_dir_all(&dir).with_context(|| format!("creating {:?}", dir))?;
            let executor = PipelineExecutor::new(config.render.clone());

            let results = tokio::task::spawn_blocking(move || {
                let ids = StyleRegistry::builtin().available_styles();
                let jobs: Vec<RenderJob<'_>> = ids
                    .into_iter()
                    .map(|id| RenderJob { input: &sketch, style_id: id, seed })
                    .collect();
                executor.run_batch(&jobs)
            })
            .await
            .context("render task did not complete")?;

            let mut failures = 0;
            for result in results {
                match result {
                    Ok(rendered) => {
                        let path = default_output_path(&config, &dir, rendered.style_id);
                        save(&rendered, &path)?;
                    }
                    Err(e) => {
                        failures += 1;
                        warn!("{}", e.user_message());
                    }
                }
            }
            if failures > 0 {
                anyhow::bail!("{} styles failed to render", failures);
            }
        }
    }

    Ok(())
}

fn list_styles() {
    for style in StyleRegistry::builtin().summaries() {
        println!(
            "{:<14} {} {:<16} [{}] {}",
            style.id, style.icon, style.display_name, style.category, style.description
        );
    }
}

fn list_textures() {
    let library = TextureLibrary::builtin();
    for id in library.ids() {
        let Some(generator) = library.get(id) else { continue };
        let metadata = generator.metadata();
        println!("{:<18} cost {:.1}  {}", id.as_str(), metadata.performance_impact, generator.description());
        for (key, description) in &metadata.optional_parameters {
            println!("    {:<12} {}", key, description);
        }
    }
}

fn load_sketch(path: &Path) -> Result<PixelBuffer> {
    info!("📂 Loading sketch {:?}", path);
    let image = image::open(path).with_context(|| format!("reading sketch {:?}", path))?;
    Ok(PixelBuffer::from_image(image.to_rgba8())?)
}

fn default_output_path(config: &Config, dir: &Path, style: &str) -> PathBuf {
    let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    dir.join(format!("{}-{}-{}.png", config.output.file_prefix, style, timestamp))
}

fn save(rendered: &RenderOutput, path: &Path) -> Result<()> {
    for skipped in &rendered.warnings {
        warn!("   {} op {} skipped: {}", rendered.style_id, skipped.index, skipped.op);
    }
    rendered
        .image
        .as_image()
        .save(path)
        .with_context(|| format!("writing {:?}", path))?;
    info!(
        "🎉 {} ({}ms, seed {}) saved to {:?}",
        rendered.style_id,
        rendered.elapsed.as_millis(),
        rendered.seed,
        path
    );
    Ok(())
}
