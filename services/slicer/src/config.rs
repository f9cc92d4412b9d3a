//! Slicer configuration.
//!
//! Environment variables provide the defaults; command-line flags override
//! them.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use geo_grid::{ByteOrder, GridConfig, SliceConfig, TimeIndexCheck};
use netcdf_parser::{DecodeConfig, Strictness};

/// Top-level slicer configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlicerConfig {
    /// How the input file is decoded
    pub decode: DecodeConfig,

    /// How the grid is assembled
    pub grid: GridConfig,

    /// How the slice is written
    pub slice: SliceConfig,
}

/// Command-line overrides.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub data_little_endian: bool,
    pub strict: bool,
    pub legacy_time_check: bool,
    pub data_variable: Option<String>,
    pub apply_scale_offset: bool,
    pub big_endian_output: bool,
}

impl SlicerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            decode: DecodeConfig::from_env(),
            grid: GridConfig::from_env(),
            slice: SliceConfig::from_env(),
        }
    }

    /// Apply command-line flags on top of the loaded configuration.
    pub fn with_overrides(mut self, overrides: &Overrides) -> Self {
        if overrides.data_little_endian {
            self.decode.data_little_endian = true;
        }
        if overrides.strict {
            self.decode.strictness = Strictness::Strict;
        }
        if overrides.legacy_time_check {
            self.slice.time_index_check = TimeIndexCheck::Legacy;
        }
        if let Some(name) = &overrides.data_variable {
            self.grid.data_variable = Some(name.clone());
        }
        if overrides.apply_scale_offset {
            self.grid.apply_scale_offset = true;
        }
        if overrides.big_endian_output {
            self.slice.byte_order = ByteOrder::Big;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if let Err(e) = self.grid.validate() {
            bail!("invalid grid configuration: {}", e);
        }
        Ok(())
    }
}

/// Default slice path: next to the input, suffixed with the time index.
pub fn default_output_path(input: &Path, time_index: usize) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "slice".to_string());
    input.with_file_name(format!("{}_{}.bin", stem, time_index))
}
