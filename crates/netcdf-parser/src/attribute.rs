use std::fmt;

use crate::codec::RawValues;
use crate::types::NcType;

/// A named, typed metadata value attached to the file or to one variable.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub values: RawValues,
}

impl Attribute {
    pub fn new(name: impl Into<String>, values: RawValues) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn nc_type(&self) -> NcType {
        self.values.nc_type()
    }

    /// Character content of the attribute.
    pub fn as_text(&self) -> String {
        self.values.as_text()
    }

    /// First element promoted to `f32`, if there is one.
    pub fn first_f32(&self) -> Option<f32> {
        self.values.f32_at(0).ok()
    }
}

/// Find an attribute by name in a list.
pub fn find<'a>(attributes: &'a [Attribute], name: &str) -> Option<&'a Attribute> {
    attributes.iter().find(|a| a.name == name)
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Attribute:[\"{}\"|{}|", self.name, self.nc_type())?;
        if self.nc_type() == NcType::Char {
            write!(f, "\"{}\"]", self.as_text())
        } else {
            write!(f, "{}]", self.values.len())
        }
    }
}
