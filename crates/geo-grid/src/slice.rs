//! Binary serialization of one time slice.
//!
//! # Layout
//!
//! ```text
//! [missing f32][max f32][min f32][lat_count i32][lon_count i32]
//! then for each lat (outer), each lon (inner):
//! [lat f32][lon f32][value f32]
//! ```
//!
//! The whole slice is built in memory before anything reaches the writer,
//! so a failed slice never leaves partial output behind.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use bytes::{BufMut, Bytes, BytesMut};
use tracing::{debug, info};

use crate::config::{ByteOrder, SliceConfig};
use crate::error::{GridError, GridResult};
use crate::grid::{from_decimal, GeoGrid};

/// Size of the fixed slice prefix in bytes.
pub const SLICE_HEADER_LEN: usize = 20;

/// Size of one `(lat, lon, value)` triple in bytes.
pub const TRIPLE_LEN: usize = 12;

/// Total size of a serialized slice.
pub fn slice_len(lat_count: usize, lon_count: usize) -> usize {
    SLICE_HEADER_LEN + TRIPLE_LEN * lat_count * lon_count
}

fn put_f32(buf: &mut BytesMut, value: f32, order: ByteOrder) {
    match order {
        ByteOrder::Little => buf.put_f32_le(value),
        ByteOrder::Big => buf.put_f32(value),
    }
}

fn put_i32(buf: &mut BytesMut, value: i32, order: ByteOrder) {
    match order {
        ByteOrder::Little => buf.put_i32_le(value),
        ByteOrder::Big => buf.put_i32(value),
    }
}

/// Serialize time slice `time_index` of `grid`.
pub fn encode_slice(grid: &GeoGrid, time_index: usize, config: &SliceConfig) -> GridResult<Bytes> {
    let len = grid.time_len();
    if !config.time_index_check.admits(time_index, len) {
        return Err(GridError::InvalidTimeIndex {
            name: grid.time_name.clone(),
            index: time_index,
            len,
        });
    }

    let (nlat, nlon) = (grid.lat_len(), grid.lon_len());
    let order = config.byte_order;
    let mut buf = BytesMut::with_capacity(slice_len(nlat, nlon));

    put_f32(&mut buf, grid.missing_value, order);
    put_f32(&mut buf, grid.valid_max, order);
    put_f32(&mut buf, grid.valid_min, order);
    put_i32(&mut buf, nlat as i32, order);
    put_i32(&mut buf, nlon as i32, order);

    let lats: Vec<f32> = grid.latitudes.iter().map(from_decimal).collect();
    let lons: Vec<f32> = grid.longitudes.iter().map(from_decimal).collect();

    for (j, &lat) in lats.iter().enumerate() {
        for (k, &lon) in lons.iter().enumerate() {
            let value = grid
                .value(time_index, j, k)
                .ok_or(GridError::SliceOutOfBounds {
                    time: time_index,
                    lat: j,
                    lon: k,
                })?;
            put_f32(&mut buf, lat, order);
            put_f32(&mut buf, lon, order);
            put_f32(&mut buf, value, order);
        }
    }

    debug!(time_index, bytes = buf.len(), "Encoded slice");
    Ok(buf.freeze())
}

/// Serialize time slice `time_index` of `grid` into `writer`.
///
/// Nothing is written when the slice cannot be built.
pub fn write_slice<W: Write>(
    grid: &GeoGrid,
    time_index: usize,
    writer: &mut W,
    config: &SliceConfig,
) -> GridResult<()> {
    let bytes = encode_slice(grid, time_index, config)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

impl GeoGrid {
    /// Serialized time slice as an owned buffer.
    pub fn to_binary(&self, time_index: usize, config: &SliceConfig) -> GridResult<Vec<u8>> {
        Ok(encode_slice(self, time_index, config)?.to_vec())
    }

    pub fn write_slice<W: Write>(
        &self,
        time_index: usize,
        writer: &mut W,
        config: &SliceConfig,
    ) -> GridResult<()> {
        write_slice(self, time_index, writer, config)
    }

    /// Write time slice `time_index` to `path`.
    ///
    /// The file is only created once the slice has been built.
    pub fn write_slice_to_file<P: AsRef<Path>>(
        &self,
        path: P,
        time_index: usize,
        config: &SliceConfig,
    ) -> GridResult<()> {
        let bytes = encode_slice(self, time_index, config)?;
        let mut writer = BufWriter::new(File::create(path.as_ref())?);
        writer.write_all(&bytes)?;
        writer.flush()?;

        info!(
            path = %path.as_ref().display(),
            time_index,
            bytes = bytes.len(),
            "Wrote slice"
        );
        Ok(())
    }
}
