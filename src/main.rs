//! # PrintSeries CLI
//!
//! ```bash
//! # Writes part_event_series.inp next to the input
//! printseries part.gcode
//!
//! # Custom output, switch duration and a summary on stdout
//! printseries part.gcode -o heat.inp --on-off-time 0.002 --summary
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use printseries::{convert_file, init_logging, ConverterConfig, BUILD_DATE, VERSION};

/// Convert slicer G-code into an ABAQUS laser event series
#[derive(Parser, Debug)]
#[command(name = "printseries")]
#[command(about = "Convert Marlin/Cura G-code into an ABAQUS event series", long_about = None)]
#[command(version)]
struct Cli {
    /// G-code file to convert
    input: PathBuf,

    /// Output file (default: <input stem>_event_series.inp next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Converter configuration file (.toml or .json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Duration of a laser switch event in seconds
    #[arg(long, value_name = "SECONDS")]
    on_off_time: Option<f64>,

    /// Print the conversion summary as JSON on stdout
    #[arg(long)]
    summary: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn load_config(cli: &Cli) -> Result<ConverterConfig> {
    let mut config = match &cli.config {
        Some(path) => ConverterConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ConverterConfig::load_default().context("Failed to load default config")?,
    };

    if let Some(on_off_time) = cli.on_off_time {
        config = config.with_on_off_time(on_off_time);
    }
    config.validate().context("Invalid converter configuration")?;

    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    tracing::debug!("printseries {} (built {})", VERSION, BUILD_DATE);

    let config = load_config(&cli)?;
    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| config.output_path_for(&cli.input));

    let summary = convert_file(&cli.input, &output, &config)?;

    if cli.summary {
        let json = serde_json::to_string_pretty(&summary)?;
        println!("{}", json);
    }

    Ok(())
}
