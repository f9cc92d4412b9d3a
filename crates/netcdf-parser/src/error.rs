//! Error types for classic NetCDF parsing operations.

use thiserror::Error;

/// Result type for NetCDF parser operations.
pub type CdfResult<T> = Result<T, CdfError>;

/// Error types for NetCDF parsing.
#[derive(Error, Debug)]
pub enum CdfError {
    /// Stream ended before a primitive read completed
    #[error("Truncated input: needed {needed} more bytes at offset {offset}")]
    TruncatedInput { offset: u64, needed: u64 },

    /// Stream position does not match a variable's declared data offset
    #[error(
        "The variable {variable} begins at {expected} but the stream is at {actual}, \
         probably because the file is malformed"
    )]
    StructuralMismatch {
        variable: String,
        expected: u64,
        actual: u64,
    },

    /// Type code outside the classic enumeration
    #[error("Invalid data type code: {0}")]
    InvalidDataType(u32),

    /// List tag does not match the expected constant (strict mode only)
    #[error("Invalid {section} tag: expected {expected:#x}, found {found:#x}")]
    InvalidTag {
        section: &'static str,
        expected: u32,
        found: u32,
    },

    /// Magic bytes are not "CDF" (strict mode only)
    #[error("Invalid magic bytes: {0:?}")]
    InvalidMagic(String),

    /// Version byte other than 1 (strict mode only)
    #[error("Unsupported format version: {0}")]
    UnsupportedVersion(u8),

    /// Variable references a dimension id missing from the dimension list
    #[error("Variable {variable} references unknown dimension id {dimid}")]
    UnknownDimension { variable: String, dimid: u32 },

    /// Raw row shorter than its type's width
    #[error("Row of {found} bytes cannot hold a {expected}-byte element")]
    RowWidth { expected: usize, found: usize },

    /// Element access past the end of a value block
    #[error("Index {index} out of range for {len} values")]
    IndexOutOfRange { index: usize, len: usize },

    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
