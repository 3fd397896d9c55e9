use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use ndarray::Array2;

use beamprof_core::config::ProfilerConfig;
use beamprof_core::consts::DEFAULT_COARSEN_BUCKET;
use beamprof_core::frame::BeamImage;
use beamprof_core::profile::{analyze, AxisProfile, BeamProfile};

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Input image (any format the `image` crate can read)
    pub file: PathBuf,

    /// Load a ProfilerConfig from a TOML file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Coarsen projections by bucket-averaging
    #[arg(long)]
    pub coarsen: bool,

    /// Bucket size used with --coarsen
    #[arg(long, requires = "coarsen")]
    pub bucket: Option<usize>,

    /// Override the projection scale divisor
    #[arg(long)]
    pub scale: Option<f64>,

    /// Write the full profile (projections, fits, curves) as JSON
    #[arg(long)]
    pub json: Option<PathBuf>,
}

pub fn run(args: &AnalyzeArgs) -> Result<()> {
    let mut config = load_config(args)?;
    if args.coarsen {
        config.projection.bucket_size = Some(args.bucket.unwrap_or(DEFAULT_COARSEN_BUCKET));
    }
    if let Some(scale) = args.scale {
        config.projection.scale = scale;
    }
    config.validate()?;

    let image = load_grayscale(&args.file)?;
    let image = BeamImage::new(image);

    println!(
        "Analyzing {} ({}x{})",
        args.file.display(),
        image.width(),
        image.height()
    );

    let profile = analyze(&image, &config);

    print_axis("Row (vertical)", &profile.row);
    print_axis("Column (horizontal)", &profile.column);

    if let Some(ref path) = args.json {
        write_json(&profile, path)?;
        println!("Full profile saved to {}", path.display());
    }

    Ok(())
}

fn load_config(args: &AnalyzeArgs) -> Result<ProfilerConfig> {
    match args.config {
        Some(ref path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            toml::from_str(&text)
                .with_context(|| format!("Failed to parse config {}", path.display()))
        }
        None => Ok(ProfilerConfig::default()),
    }
}

/// Decode any supported image format into a grayscale f32 array,
/// shape = (height, width).
fn load_grayscale(path: &Path) -> Result<Array2<f32>> {
    let img = image::open(path)
        .with_context(|| format!("Failed to open image {}", path.display()))?
        .to_luma32f();
    let (w, h) = img.dimensions();
    let data = Array2::from_shape_vec((h as usize, w as usize), img.into_raw())
        .context("Decoded buffer does not match image dimensions")?;
    Ok(data)
}

fn print_axis(label: &str, axis: &AxisProfile) {
    println!();
    println!("{}", style(label).bold());
    if axis.fit.is_fallback() {
        println!("  {}", style("no usable signal (fit fell back)").yellow());
        return;
    }
    println!("  Amplitude:   {:.4}", axis.fit.amplitude);
    println!("  Center:      {:.2} px", axis.fit.center);
    println!("  1/e radius:  {:.2} px", axis.fit.width);
}

fn write_json(profile: &BeamProfile, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(profile)?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write profile to {}", path.display()))?;
    Ok(())
}
