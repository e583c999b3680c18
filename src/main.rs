//! Terraframe CLI - deterministic terrain erosion pipelines.
//!
//! Validates pipeline documents and runs them frame by frame, writing one
//! heightmap snapshot per completed frame.

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::{Parser, Subcommand, ValueEnum};

use terraframe::export::{
    write_heightmap_png, write_heightmap_raw, PngExportOptions, RawFormat,
};
use terraframe::pipeline::{executor::initialize_terrain, parser, validator, JobExecutor};
use terraframe::terrain::Heightmap;

/// Deterministic frame-scheduled terrain erosion engine.
#[derive(Parser)]
#[command(name = "terraframe")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and validate a pipeline document.
    Validate {
        /// Path to the pipeline JSON document.
        config: PathBuf,
    },

    /// Execute a pipeline and export per-frame snapshots.
    Run {
        /// Path to the pipeline JSON document.
        config: PathBuf,

        /// Terrain width in cells.
        #[arg(long, default_value = "512")]
        width: usize,

        /// Terrain height in cells.
        #[arg(long, default_value = "512")]
        height: usize,

        /// Output directory for snapshots.
        #[arg(short, long, default_value = "./output")]
        output: PathBuf,

        /// Base name for snapshot files.
        #[arg(short, long, default_value = "terrain")]
        name: String,

        /// Snapshot format.
        #[arg(short, long, default_value = "png")]
        format: SnapshotFormat,

        /// Droplet spawn seed for reproducible runs.
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Print a summary of a parsed pipeline document.
    Info {
        /// Path to the pipeline JSON document.
        config: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SnapshotFormat {
    /// 16-bit grayscale PNG.
    Png,
    /// 16-bit RAW little-endian.
    Raw,
    /// 32-bit float RAW.
    RawFloat,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate { config } => run_validate(&config),
        Commands::Run {
            config,
            width,
            height,
            output,
            name,
            format,
            seed,
        } => run_pipeline(&config, width, height, &output, &name, format, seed),
        Commands::Info { config } => run_info(&config),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: &PathBuf) -> Result<terraframe::PipelineConfig, Box<dyn Error>> {
    let text = std::fs::read_to_string(path)?;
    Ok(parser::parse_str(&text)?)
}

fn run_validate(path: &PathBuf) -> Result<ExitCode, Box<dyn Error>> {
    let config = load_config(path)?;
    let report = validator::validate(&config);

    for warning in &report.warnings {
        println!("warning: {warning}");
    }
    for error in &report.errors {
        println!("error: {error}");
    }

    if report.is_valid {
        println!(
            "Configuration is valid: {} frames, {} jobs",
            config.total_frames,
            config.jobs.len()
        );
        Ok(ExitCode::SUCCESS)
    } else {
        println!("Configuration is invalid");
        Ok(ExitCode::FAILURE)
    }
}

fn run_info(path: &PathBuf) -> Result<ExitCode, Box<dyn Error>> {
    let config = load_config(path)?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(ExitCode::SUCCESS)
}

fn run_pipeline(
    path: &PathBuf,
    width: usize,
    height: usize,
    output: &PathBuf,
    name: &str,
    format: SnapshotFormat,
    seed: Option<u64>,
) -> Result<ExitCode, Box<dyn Error>> {
    let config = load_config(path)?;

    let report = validator::validate(&config);
    for warning in &report.warnings {
        println!("warning: {warning}");
    }
    if !report.is_valid {
        for error in &report.errors {
            eprintln!("error: {error}");
        }
        return Ok(ExitCode::FAILURE);
    }

    std::fs::create_dir_all(output)?;

    let start = Instant::now();
    println!("Initializing {width}x{height} terrain...");
    let mut terrain = initialize_terrain(&config.step0, width, height)?;

    // One normalization range for the whole animation, taken from frame 0.
    let png_options = PngExportOptions::auto_range(&terrain);
    let raw_min = png_options.min_height;
    let raw_max = png_options.max_height;

    let write_snapshot = |frame: i32, terrain: &Heightmap| -> Result<(), Box<dyn Error>> {
        let stem = format!("{name}_f{frame:04}");
        match format {
            SnapshotFormat::Png => {
                let path = output.join(format!("{stem}.png"));
                write_heightmap_png(terrain, &path, &png_options)?;
            }
            SnapshotFormat::Raw => {
                let path = output.join(format!("{stem}.raw"));
                write_heightmap_raw(terrain, &path, RawFormat::R16LittleEndian, raw_min, raw_max)?;
            }
            SnapshotFormat::RawFloat => {
                let path = output.join(format!("{stem}.raw"));
                write_heightmap_raw(terrain, &path, RawFormat::R32Float, raw_min, raw_max)?;
            }
        }
        Ok(())
    };

    write_snapshot(0, &terrain)?;

    let executor = match seed {
        Some(seed) => JobExecutor::with_seed(seed),
        None => JobExecutor::new(),
    };

    let mut snapshot_error: Option<Box<dyn Error>> = None;
    executor.execute_with_callbacks(
        &config,
        &mut terrain,
        |frame, snapshot| {
            println!(
                "Frame {frame}/{} complete ({:.1?})",
                config.total_frames,
                start.elapsed()
            );
            if snapshot_error.is_none() {
                if let Err(e) = write_snapshot(frame, snapshot) {
                    snapshot_error = Some(e);
                }
            }
        },
        |_, name, frame| println!("  applying '{name}' to frame {frame}"),
        |_, _, _| (),
    )?;
    if let Some(e) = snapshot_error {
        return Err(e);
    }

    println!(
        "Done: {} frames in {:.1?}",
        config.total_frames,
        start.elapsed()
    );
    Ok(ExitCode::SUCCESS)
}
