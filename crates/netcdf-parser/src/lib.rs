//! Decoder for the NetCDF classic (CDF-1) binary format.
//!
//! This crate reads a classic file in one forward pass into a [`Header`]:
//! the dimension list, the global attributes, and every variable together
//! with its raw data block. Element decoding is deferred to the
//! [`RawValues`] accessors.
//!
//! # Implementation Notes
//!
//! Before each variable's data block is read the stream position must equal
//! the variable's declared `begin` offset. The format carries no checksum,
//! so this is the check that turns a corrupt or unsupported layout into an
//! error instead of silently misread data.
//!
//! Byte order is taken from an explicit [`DecodeConfig`]; values are
//! reversed only when the data and host orders disagree.

pub mod attribute;
pub mod codec;
pub mod config;
pub mod dimension;
pub mod error;
pub mod header;
pub mod types;
pub mod variable;

pub use attribute::Attribute;
pub use codec::{bytes_to_f32_array, float_nearly_equal, padding_len, CdfReader, RawValues};
pub use config::{DecodeConfig, Strictness};
pub use dimension::Dimension;
pub use error::{CdfError, CdfResult};
pub use header::Header;
pub use types::{NcType, Value};
pub use variable::Variable;
