//! Geospatial grid assembly and time-slice serialization.
//!
//! A parsed classic [`Header`](netcdf_parser::Header) is classified into
//! latitude, longitude and time coordinate variables plus one data variable,
//! and assembled into a [`GeoGrid`] indexed `[time][lat][lon]`. A single time
//! slice of the grid can then be written as a compact binary stream of
//! `(lat, lon, value)` triples.
//!
//! # Example
//!
//! ```ignore
//! use geo_grid::{GeoGrid, GridConfig, SliceConfig};
//! use netcdf_parser::DecodeConfig;
//!
//! let grid = GeoGrid::open("sst.nc", &DecodeConfig::default(), &GridConfig::default())?;
//! grid.write_slice_to_file("sst_0.bin", 0, &SliceConfig::default())?;
//! ```

pub mod classify;
pub mod config;
pub mod error;
pub mod grid;
pub mod slice;
pub mod time;

pub use classify::{classify, Classification, VariableRole};
pub use config::{ByteOrder, GridConfig, SliceConfig, TimeIndexCheck};
pub use error::{GridError, GridResult};
pub use grid::{from_decimal, to_decimal, GeoGrid, GridSummary};
pub use slice::{encode_slice, slice_len, write_slice, SLICE_HEADER_LEN, TRIPLE_LEN};
pub use time::{epoch, format_timestamp, offset_to_datetime, TimeRange, TIMESTAMP_FORMAT};
