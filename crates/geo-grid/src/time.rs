//! Time axis handling.
//!
//! Time coordinates are integer second offsets from the Unix epoch.

use chrono::{DateTime, TimeZone, Utc};
use netcdf_parser::Variable;
use serde::{Deserialize, Serialize};

use crate::error::{GridError, GridResult};

/// Display format for timestamps in summaries and logs.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d %H:%M:%S";

/// Reference instant for time offsets.
pub fn epoch() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

/// Convert a second offset from the epoch into a UTC timestamp.
pub fn offset_to_datetime(seconds: i64) -> GridResult<DateTime<Utc>> {
    Utc.timestamp_opt(seconds, 0)
        .single()
        .ok_or_else(|| GridError::InvalidTimestamp(seconds.to_string()))
}

pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.format(TIMESTAMP_FORMAT).to_string()
}

/// Decode every row of a time variable as whole seconds.
///
/// Integer types are taken as is; floating types are converted by value and
/// truncated toward zero, not reinterpreted bit for bit as a 4-byte integer.
/// A row holding `3600.9` is 3600 seconds.
pub(crate) fn decode_offsets(variable: &Variable, len: usize) -> GridResult<Vec<i64>> {
    (0..len)
        .map(|i| {
            let value = variable.data.value_at(i)?;
            value
                .as_i64()
                .ok_or_else(|| GridError::InvalidTimestamp(format!("{}", value.as_f32())))
        })
        .collect()
}

/// Inclusive span covered by a time axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Range spanning the earliest and latest of `times`.
    pub fn spanning(times: &[DateTime<Utc>]) -> Option<Self> {
        let start = times.iter().min()?;
        let end = times.iter().max()?;
        Some(Self::new(*start, *end))
    }

    pub fn contains(&self, dt: &DateTime<Utc>) -> bool {
        dt >= &self.start && dt <= &self.end
    }
}
