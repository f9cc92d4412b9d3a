//! External data types of the classic format and decoded scalar values.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CdfError, CdfResult};

/// Element type of an attribute or variable.
///
/// Discriminants are the on-disk type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NcType {
    Byte = 1,
    Char = 2,
    Short = 3,
    Int = 4,
    Float = 5,
    Double = 6,
}

impl NcType {
    /// Map an on-disk type code to a type.
    pub fn from_code(code: u32) -> CdfResult<Self> {
        match code {
            1 => Ok(NcType::Byte),
            2 => Ok(NcType::Char),
            3 => Ok(NcType::Short),
            4 => Ok(NcType::Int),
            5 => Ok(NcType::Float),
            6 => Ok(NcType::Double),
            other => Err(CdfError::InvalidDataType(other)),
        }
    }

    /// On-disk type code.
    pub fn code(self) -> u32 {
        self as u32
    }

    /// Width of one element in bytes.
    pub fn width(self) -> usize {
        match self {
            NcType::Byte | NcType::Char => 1,
            NcType::Short => 2,
            NcType::Int | NcType::Float => 4,
            NcType::Double => 8,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            NcType::Byte => "NC_BYTE",
            NcType::Char => "NC_CHAR",
            NcType::Short => "NC_SHORT",
            NcType::Int => "NC_INT",
            NcType::Float => "NC_FLOAT",
            NcType::Double => "NC_DOUBLE",
        }
    }
}

impl fmt::Display for NcType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single decoded element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Byte(u8),
    Char(u8),
    Short(i16),
    Int(i32),
    Float(f32),
    Double(f64),
}

impl Value {
    /// Promote any numeric element to `f32`.
    ///
    /// Bytes and chars are widened from their unsigned code, doubles are
    /// narrowed with the usual rounding.
    pub fn as_f32(self) -> f32 {
        match self {
            Value::Byte(v) | Value::Char(v) => v as f32,
            Value::Short(v) => v as f32,
            Value::Int(v) => v as f32,
            Value::Float(v) => v,
            Value::Double(v) => v as f32,
        }
    }

    /// Integer view of the element. Floating values are truncated toward
    /// zero; non-finite floats have no integer view.
    pub fn as_i64(self) -> Option<i64> {
        match self {
            Value::Byte(v) | Value::Char(v) => Some(v as i64),
            Value::Short(v) => Some(v as i64),
            Value::Int(v) => Some(v as i64),
            Value::Float(v) => v.is_finite().then(|| v.trunc() as i64),
            Value::Double(v) => v.is_finite().then(|| v.trunc() as i64),
        }
    }

    pub fn nc_type(self) -> NcType {
        match self {
            Value::Byte(_) => NcType::Byte,
            Value::Char(_) => NcType::Char,
            Value::Short(_) => NcType::Short,
            Value::Int(_) => NcType::Int,
            Value::Float(_) => NcType::Float,
            Value::Double(_) => NcType::Double,
        }
    }
}
