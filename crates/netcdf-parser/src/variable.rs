use std::fmt;

use crate::attribute::{self, Attribute};
use crate::codec::RawValues;
use crate::types::NcType;

/// A named, typed array addressed by one or more dimensions.
///
/// The well-known scalar attributes are extracted when the variable is
/// constructed; `data` is attached once the data section has been read.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    /// Indices into the header's dimension list, slowest-varying first.
    pub dim_ids: Vec<u32>,
    pub attributes: Vec<Attribute>,
    pub nc_type: NcType,
    /// Bytes allocated to the variable in the data section.
    pub vsize: u32,
    /// Number of rows, `vsize / width`.
    pub length: u32,
    /// Absolute byte offset of the variable's data.
    pub begin: u32,
    pub data: RawValues,

    pub units: Option<String>,
    pub missing_value: Option<f32>,
    pub fill_value: Option<f32>,
    pub valid_min: Option<f32>,
    pub valid_max: Option<f32>,
    pub scale_factor: Option<f32>,
    pub add_offset: Option<f32>,
}

impl Variable {
    pub fn new(
        name: impl Into<String>,
        dim_ids: Vec<u32>,
        attributes: Vec<Attribute>,
        nc_type: NcType,
        vsize: u32,
        begin: u32,
    ) -> Self {
        let scalar = |key: &str| attribute::find(&attributes, key).and_then(Attribute::first_f32);

        let units = attribute::find(&attributes, "units").map(Attribute::as_text);
        let missing_value = scalar("missing_value");
        let fill_value = scalar("_FillValue");
        let valid_min = scalar("valid_min");
        let valid_max = scalar("valid_max");
        let scale_factor = scalar("scale_factor");
        let add_offset = scalar("add_offset");

        Self {
            name: name.into(),
            dim_ids,
            length: vsize / nc_type.width() as u32,
            nc_type,
            vsize,
            begin,
            data: RawValues::empty(nc_type),
            units,
            missing_value,
            fill_value,
            valid_min,
            valid_max,
            scale_factor,
            add_offset,
            attributes,
        }
    }

    pub(crate) fn with_data(mut self, data: RawValues) -> Self {
        self.data = data;
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        attribute::find(&self.attributes, name)
    }

    /// Number of dimensions.
    pub fn rank(&self) -> usize {
        self.dim_ids.len()
    }

    /// Apply `scale_factor` and `add_offset` to a packed value.
    pub fn unpack(&self, packed: f32) -> f32 {
        packed * self.scale_factor.unwrap_or(1.0) + self.add_offset.unwrap_or(0.0)
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Variable:[\"{}\"|{}|{}bytes|{}]",
            self.name, self.nc_type, self.vsize, self.begin
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn float_attr(name: &str, value: f32) -> Attribute {
        Attribute::new(
            name,
            RawValues::new(NcType::Float, Bytes::copy_from_slice(&value.to_ne_bytes()), false),
        )
    }

    fn short_attr(name: &str, value: i16) -> Attribute {
        Attribute::new(
            name,
            RawValues::new(NcType::Short, Bytes::copy_from_slice(&value.to_ne_bytes()), false),
        )
    }

    #[test]
    fn test_derived_fields() {
        let attrs = vec![
            Attribute::new(
                "units",
                RawValues::new(NcType::Char, Bytes::from_static(b"K"), false),
            ),
            float_attr("missing_value", -999.0),
            short_attr("valid_min", -40),
            float_attr("valid_max", 60.0),
            float_attr("scale_factor", 0.01),
        ];
        let var = Variable::new("temp", vec![0, 1, 2], attrs, NcType::Short, 24, 400);

        assert_eq!(var.length, 12);
        assert_eq!(var.units.as_deref(), Some("K"));
        assert_eq!(var.missing_value, Some(-999.0));
        assert_eq!(var.valid_min, Some(-40.0));
        assert_eq!(var.valid_max, Some(60.0));
        assert_eq!(var.scale_factor, Some(0.01));
        assert_eq!(var.add_offset, None);
        assert_eq!(var.fill_value, None);
        assert!(var.data.is_empty());
        assert_eq!(var.rank(), 3);
    }

    #[test]
    fn test_unpack() {
        let attrs = vec![float_attr("scale_factor", 0.5), float_attr("add_offset", 10.0)];
        let var = Variable::new("v", vec![0], attrs, NcType::Short, 8, 0);
        assert_eq!(var.unpack(4.0), 12.0);

        let plain = Variable::new("v", vec![0], Vec::new(), NcType::Float, 8, 0);
        assert_eq!(plain.unpack(4.0), 4.0);
    }

    #[test]
    fn test_display() {
        let var = Variable::new("lat", vec![1], Vec::new(), NcType::Double, 16, 256);
        assert_eq!(var.to_string(), "Variable:[\"lat\"|NC_DOUBLE|16bytes|256]");
    }
}
