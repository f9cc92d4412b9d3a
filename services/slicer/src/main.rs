//! Time-slice extractor for classic NetCDF grids.
//!
//! Decodes a CDF-1 file, assembles its lat/lon/time grid and writes one
//! time slice as a binary stream of `(lat, lon, value)` triples, or prints
//! a JSON summary of the file with `--inspect`.

mod config;
mod inspect;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, info_span, Level};
use tracing_subscriber::FmtSubscriber;

use config::{default_output_path, Overrides, SlicerConfig};
use geo_grid::GeoGrid;
use netcdf_parser::Header;

#[derive(Parser, Debug)]
#[command(name = "slicer")]
#[command(about = "Extract a time slice from a classic NetCDF grid")]
struct Args {
    /// Input classic NetCDF file
    input: PathBuf,

    /// Time step to extract
    #[arg(short, long, default_value_t = 0)]
    time_index: usize,

    /// Output path (default: <input stem>_<time index>.bin next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Multi-byte values in the input are little-endian
    #[arg(long)]
    data_little_endian: bool,

    /// Reject unexpected list tags, magic and version
    #[arg(long)]
    strict: bool,

    /// Admit a time index equal to the axis length at the bound check
    #[arg(long)]
    legacy_time_check: bool,

    /// Name of the data variable
    #[arg(long)]
    data_variable: Option<String>,

    /// Unpack values with scale_factor and add_offset
    #[arg(long)]
    apply_scale_offset: bool,

    /// Write the slice big-endian
    #[arg(long)]
    big_endian_output: bool,

    /// Print a JSON summary instead of writing a slice
    #[arg(long)]
    inspect: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            data_little_endian: self.data_little_endian,
            strict: self.strict,
            legacy_time_check: self.legacy_time_check,
            data_variable: self.data_variable.clone(),
            apply_scale_offset: self.apply_scale_offset,
            big_endian_output: self.big_endian_output,
        }
    }
}

fn init_tracing(args: &Args) -> Result<()> {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // stdout is reserved for --inspect output
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);

    if args.log_json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args)?;

    let span = info_span!("slicer", input = %args.input.display());
    let _guard = span.enter();

    let config = SlicerConfig::from_env().with_overrides(&args.overrides());
    config.validate()?;
    info!(config = ?config, "Loaded configuration");

    let header = Header::open(&args.input, &config.decode)
        .with_context(|| format!("failed to decode {}", args.input.display()))?;

    if args.inspect {
        let summary = inspect::summarize(&header, &config.grid)?;
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let grid = GeoGrid::from_header(&header, &config.grid)?;
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&args.input, args.time_index));

    grid.write_slice_to_file(&output, args.time_index, &config.slice)
        .with_context(|| format!("failed to write slice to {}", output.display()))?;

    info!(
        output = %output.display(),
        time_index = args.time_index,
        data_type = %grid.data_type,
        "Slice written"
    );

    Ok(())
}
