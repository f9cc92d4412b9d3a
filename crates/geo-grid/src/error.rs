//! Error types for grid assembly and slice serialization.

use netcdf_parser::CdfError;
use thiserror::Error;

use crate::classify::VariableRole;

/// Result type alias for grid operations.
pub type GridResult<T> = Result<T, GridError>;

/// Errors that can occur while assembling or serializing a grid.
#[derive(Error, Debug)]
pub enum GridError {
    /// The underlying classic file could not be decoded.
    #[error(transparent)]
    Parse(#[from] CdfError),

    /// No variable carries the given coordinate role.
    #[error("no {0} variable found")]
    MissingCoordinate(VariableRole),

    /// More than one variable carries the given coordinate role.
    #[error("more than one {role} variable: {names:?}")]
    DuplicateCoordinate { role: VariableRole, names: Vec<String> },

    /// Every variable is a coordinate variable.
    #[error("no data variable found")]
    NoDataVariable,

    /// Several variables are candidates for the data variable.
    #[error("ambiguous data variable, candidates: {0:?}")]
    AmbiguousDataVariable(Vec<String>),

    /// The explicitly requested data variable does not exist.
    #[error("data variable '{0}' not found")]
    MissingDataVariable(String),

    /// Coordinate and data dimensions do not line up.
    #[error("dimension mismatch for '{variable}': {reason}")]
    DimensionMismatch { variable: String, reason: String },

    /// An axis is the unlimited record dimension.
    #[error("axis '{0}' is a record dimension, which is not supported")]
    UnsupportedRecordDimension(String),

    /// A variable holds fewer rows than its shape requires.
    #[error("variable '{variable}' holds {actual} values but its shape needs {expected}")]
    ShapeMismatch {
        variable: String,
        expected: usize,
        actual: usize,
    },

    /// A coordinate could not be represented as a decimal.
    #[error("coordinate {value} in '{variable}' cannot be represented as a decimal")]
    CoordinateConversion { variable: String, value: f32 },

    /// A time offset does not map to a representable timestamp.
    #[error("time offset {0} is out of range")]
    InvalidTimestamp(String),

    /// The requested time slice is past the end of the time axis.
    #[error("time index {index} is out of range for '{name}' with {len} steps")]
    InvalidTimeIndex {
        name: String,
        index: usize,
        len: usize,
    },

    /// A cell access fell outside the grid while building a slice.
    #[error("slice access [{time}][{lat}][{lon}] is outside the grid")]
    SliceOutOfBounds { time: usize, lat: usize, lon: usize },

    /// I/O error while writing a slice.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
