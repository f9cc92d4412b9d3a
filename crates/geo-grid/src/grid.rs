//! Assembly of a `[time][lat][lon]` grid from a parsed header.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use chrono::{DateTime, Utc};
use ndarray::Array3;
use netcdf_parser::{float_nearly_equal, DecodeConfig, Dimension, Header, Variable};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info};

use crate::classify::{classify, Classification};
use crate::config::GridConfig;
use crate::error::{GridError, GridResult};
use crate::time::{self, TimeRange};

/// A gridded field on a latitude/longitude/time lattice.
///
/// Owns all of its storage, so a clone is an independent snapshot.
#[derive(Debug, Clone)]
pub struct GeoGrid {
    /// Display name from the data variable's `long_name`.
    pub name: String,
    pub units: String,
    /// Name of the data variable.
    pub data_type: String,
    /// NaN when the file declares neither `missing_value` nor `_FillValue`.
    pub missing_value: f32,
    pub valid_min: f32,
    pub valid_max: f32,

    /// Values indexed `[time][lat][lon]`.
    pub data: Array3<f32>,
    pub latitudes: Vec<Decimal>,
    pub longitudes: Vec<Decimal>,
    /// Seconds since the Unix epoch.
    pub time_offsets: Vec<i64>,
    pub times: Vec<DateTime<Utc>>,
    /// Name of the time variable.
    pub time_name: String,
}

/// Axis lengths and positions within the data variable's dimension list.
struct Axes {
    lens: [usize; 3],
    /// `lens` multiplied out.
    cells: usize,
    positions: [usize; 3],
    strides: [usize; 3],
}

impl Axes {
    /// Flat row index of cell `[t][j][k]` in the data variable.
    fn flat_index(&self, cell: [usize; 3]) -> usize {
        (0..3)
            .map(|axis| cell[axis] * self.strides[self.positions[axis]])
            .sum()
    }
}

impl GeoGrid {
    /// Assemble a grid from a parsed header.
    pub fn from_header(header: &Header, config: &GridConfig) -> GridResult<Self> {
        let roles = classify(&header.variables, config)?;
        debug!(
            latitude = %roles.latitude.name,
            longitude = %roles.longitude.name,
            time = %roles.time.name,
            data = %roles.data.name,
            "Classified variables"
        );

        let axes = resolve_axes(header, &roles)?;
        let [nt, nlat, nlon] = axes.lens;
        let data_var = roles.data;

        ensure_rows(roles.time, nt)?;
        ensure_rows(roles.latitude, nlat)?;
        ensure_rows(roles.longitude, nlon)?;
        ensure_rows(data_var, axes.cells)?;

        let missing_value = data_var
            .missing_value
            .or(data_var.fill_value)
            .unwrap_or(f32::NAN);

        let mut cells = Vec::with_capacity(axes.cells);
        for t in 0..nt {
            for j in 0..nlat {
                for k in 0..nlon {
                    let raw = data_var.data.f32_at(axes.flat_index([t, j, k]))?;
                    let value = if config.apply_scale_offset && !is_missing(raw, missing_value) {
                        data_var.unpack(raw)
                    } else {
                        raw
                    };
                    cells.push(value);
                }
            }
        }
        let data = Array3::from_shape_vec((nt, nlat, nlon), cells).map_err(|_| {
            GridError::ShapeMismatch {
                variable: data_var.name.clone(),
                expected: axes.cells,
                actual: data_var.data.len(),
            }
        })?;

        let latitudes = decode_coordinates(roles.latitude, nlat)?;
        let longitudes = decode_coordinates(roles.longitude, nlon)?;
        let time_offsets = time::decode_offsets(roles.time, nt)?;
        let times = time_offsets
            .iter()
            .map(|&secs| time::offset_to_datetime(secs))
            .collect::<GridResult<Vec<_>>>()?;

        let grid = Self {
            name: data_var
                .attribute("long_name")
                .map(|a| a.as_text())
                .unwrap_or_default(),
            units: data_var.units.clone().unwrap_or_default(),
            data_type: data_var.name.clone(),
            missing_value,
            valid_min: data_var.valid_min.unwrap_or(f32::MIN),
            valid_max: data_var.valid_max.unwrap_or(f32::MAX),
            data,
            latitudes,
            longitudes,
            time_offsets,
            times,
            time_name: roles.time.name.clone(),
        };

        info!(
            data_type = %grid.data_type,
            times = nt,
            lats = nlat,
            lons = nlon,
            "Assembled grid"
        );

        Ok(grid)
    }

    /// Parse a classic stream and assemble its grid.
    pub fn from_reader<R: Read>(
        reader: &mut R,
        decode: &DecodeConfig,
        config: &GridConfig,
    ) -> GridResult<Self> {
        let header = Header::read(reader, decode)?;
        Self::from_header(&header, config)
    }

    /// Open a classic file from disk and assemble its grid.
    pub fn open<P: AsRef<Path>>(
        path: P,
        decode: &DecodeConfig,
        config: &GridConfig,
    ) -> GridResult<Self> {
        let mut reader = BufReader::new(File::open(path)?);
        Self::from_reader(&mut reader, decode, config)
    }

    pub fn time_len(&self) -> usize {
        self.data.dim().0
    }

    pub fn lat_len(&self) -> usize {
        self.data.dim().1
    }

    pub fn lon_len(&self) -> usize {
        self.data.dim().2
    }

    /// Value at `[time][lat][lon]`, or `None` outside the grid.
    pub fn value(&self, time: usize, lat: usize, lon: usize) -> Option<f32> {
        self.data.get((time, lat, lon)).copied()
    }

    /// A value is valid when it is not the missing sentinel and lies within
    /// `[valid_min, valid_max]`.
    pub fn is_valid_value(&self, value: f32) -> bool {
        !is_missing(value, self.missing_value) && value >= self.valid_min && value <= self.valid_max
    }

    /// Index of the time step at exactly `dt`.
    pub fn time_index_of(&self, dt: &DateTime<Utc>) -> Option<usize> {
        self.times.iter().position(|t| t == dt)
    }

    pub fn time_range(&self) -> Option<TimeRange> {
        TimeRange::spanning(&self.times)
    }

    pub fn summary(&self) -> GridSummary {
        GridSummary {
            name: self.name.clone(),
            units: self.units.clone(),
            data_type: self.data_type.clone(),
            missing_value: self.missing_value,
            valid_min: self.valid_min,
            valid_max: self.valid_max,
            shape: [self.time_len(), self.lat_len(), self.lon_len()],
            latitude_range: bounds(&self.latitudes),
            longitude_range: bounds(&self.longitudes),
            time_range: self.time_range().map(|range| {
                [
                    time::format_timestamp(&range.start),
                    time::format_timestamp(&range.end),
                ]
            }),
        }
    }
}

/// Serializable overview of a grid.
#[derive(Debug, Clone, Serialize)]
pub struct GridSummary {
    pub name: String,
    pub units: String,
    pub data_type: String,
    pub missing_value: f32,
    pub valid_min: f32,
    pub valid_max: f32,
    /// `[time, lat, lon]`.
    pub shape: [usize; 3],
    pub latitude_range: Option<[Decimal; 2]>,
    pub longitude_range: Option<[Decimal; 2]>,
    pub time_range: Option<[String; 2]>,
}

fn bounds(values: &[Decimal]) -> Option<[Decimal; 2]> {
    let min = values.iter().min()?;
    let max = values.iter().max()?;
    Some([*min, *max])
}

fn is_missing(value: f32, missing: f32) -> bool {
    float_nearly_equal(value, missing)
}

/// Exact decimal form of a stored coordinate.
pub fn to_decimal(variable: &str, value: f32) -> GridResult<Decimal> {
    let conversion = || GridError::CoordinateConversion {
        variable: variable.to_string(),
        value,
    };
    if !value.is_finite() {
        return Err(conversion());
    }
    // Display yields the shortest string that round-trips to the same f32.
    value.to_string().parse::<Decimal>().map_err(|_| conversion())
}

/// The f32 whose shortest representation is `value`.
pub fn from_decimal(value: &Decimal) -> f32 {
    value.to_string().parse::<f32>().unwrap_or(f32::NAN)
}

fn decode_coordinates(variable: &Variable, len: usize) -> GridResult<Vec<Decimal>> {
    (0..len)
        .map(|i| to_decimal(&variable.name, variable.data.f32_at(i)?))
        .collect()
}

fn ensure_rows(variable: &Variable, expected: usize) -> GridResult<()> {
    if variable.data.len() < expected {
        return Err(GridError::ShapeMismatch {
            variable: variable.name.clone(),
            expected,
            actual: variable.data.len(),
        });
    }
    Ok(())
}

fn axis_dimension<'h>(header: &'h Header, variable: &Variable) -> GridResult<(u32, &'h Dimension)> {
    let mismatch = |reason: String| GridError::DimensionMismatch {
        variable: variable.name.clone(),
        reason,
    };

    let id = match variable.dim_ids.as_slice() {
        [id] => *id,
        ids => {
            return Err(mismatch(format!(
                "coordinate variable has {} dimensions, expected 1",
                ids.len()
            )))
        }
    };
    let dim = header
        .dimension(id)
        .ok_or_else(|| mismatch(format!("dimension id {} does not exist", id)))?;
    if dim.is_record {
        return Err(GridError::UnsupportedRecordDimension(dim.name.clone()));
    }
    Ok((id, dim))
}

/// Locate each coordinate axis within the data variable's dimension list.
fn resolve_axes(header: &Header, roles: &Classification<'_>) -> GridResult<Axes> {
    let data = roles.data;
    let mismatch = |reason: String| GridError::DimensionMismatch {
        variable: data.name.clone(),
        reason,
    };

    if data.rank() != 3 {
        return Err(mismatch(format!(
            "data variable has {} dimensions, expected 3",
            data.rank()
        )));
    }

    let mut lens = [0usize; 3];
    let mut positions = [0usize; 3];
    for (axis, coordinate) in [roles.time, roles.latitude, roles.longitude]
        .into_iter()
        .enumerate()
    {
        let (id, dim) = axis_dimension(header, coordinate)?;
        let position = data.dim_ids.iter().position(|&d| d == id).ok_or_else(|| {
            mismatch(format!(
                "not dimensioned by '{}' of coordinate '{}'",
                dim.name, coordinate.name
            ))
        })?;
        lens[axis] = dim.length as usize;
        positions[axis] = position;
    }

    let mut seen = positions;
    seen.sort_unstable();
    if seen != [0, 1, 2] {
        return Err(mismatch(
            "coordinate variables share a dimension".to_string(),
        ));
    }

    let cells = lens
        .iter()
        .try_fold(1usize, |acc, &len| acc.checked_mul(len))
        .ok_or_else(|| {
            mismatch(format!(
                "grid of {} x {} x {} cells is too large",
                lens[0], lens[1], lens[2]
            ))
        })?;

    // Row-major strides over the data variable's own dimension order.
    // Every partial product is bounded by `cells`.
    let mut own = [0usize; 3];
    for axis in 0..3 {
        own[positions[axis]] = lens[axis];
    }
    let strides = [own[1] * own[2], own[2], 1];

    debug!(
        lens = ?lens,
        positions = ?positions,
        "Resolved grid axes"
    );

    Ok(Axes {
        lens,
        cells,
        positions,
        strides,
    })
}
