//! Test data generators for synthetic classic NetCDF files.
//!
//! [`CdfBuilder`] lays out a complete CDF-1 byte stream, computing every
//! variable's `vsize` and `begin` offset, with knobs for the corruptions the
//! parser has to detect (shifted offsets, wrong list tags, bad magic).

use bytes::{BufMut, BytesMut};

const NC_DIMENSION: u32 = 0x0A;
const NC_VARIABLE: u32 = 0x0B;
const NC_ATTRIBUTE: u32 = 0x0C;

fn padding(len: usize) -> usize {
    (4 - len % 4) % 4
}

/// Typed values for an attribute or variable.
#[derive(Debug, Clone, PartialEq)]
pub enum Values {
    Byte(Vec<u8>),
    Char(Vec<u8>),
    Short(Vec<i16>),
    Int(Vec<i32>),
    Float(Vec<f32>),
    Double(Vec<f64>),
}

impl Values {
    pub fn text(s: &str) -> Self {
        Values::Char(s.as_bytes().to_vec())
    }

    /// On-disk type code.
    pub fn type_code(&self) -> u32 {
        match self {
            Values::Byte(_) => 1,
            Values::Char(_) => 2,
            Values::Short(_) => 3,
            Values::Int(_) => 4,
            Values::Float(_) => 5,
            Values::Double(_) => 6,
        }
    }

    pub fn width(&self) -> usize {
        match self {
            Values::Byte(_) | Values::Char(_) => 1,
            Values::Short(_) => 2,
            Values::Int(_) | Values::Float(_) => 4,
            Values::Double(_) => 8,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Values::Byte(v) | Values::Char(v) => v.len(),
            Values::Short(v) => v.len(),
            Values::Int(v) => v.len(),
            Values::Float(v) => v.len(),
            Values::Double(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Payload size in bytes, without padding.
    pub fn byte_len(&self) -> usize {
        self.len() * self.width()
    }

    fn put(&self, buf: &mut BytesMut, little_endian: bool) {
        match self {
            Values::Byte(v) | Values::Char(v) => buf.put_slice(v),
            Values::Short(v) => v.iter().for_each(|&x| {
                if little_endian {
                    buf.put_i16_le(x)
                } else {
                    buf.put_i16(x)
                }
            }),
            Values::Int(v) => v.iter().for_each(|&x| {
                if little_endian {
                    buf.put_i32_le(x)
                } else {
                    buf.put_i32(x)
                }
            }),
            Values::Float(v) => v.iter().for_each(|&x| {
                if little_endian {
                    buf.put_f32_le(x)
                } else {
                    buf.put_f32(x)
                }
            }),
            Values::Double(v) => v.iter().for_each(|&x| {
                if little_endian {
                    buf.put_f64_le(x)
                } else {
                    buf.put_f64(x)
                }
            }),
        }
    }
}

/// A variable to be written by [`CdfBuilder`].
#[derive(Debug, Clone)]
pub struct VariableSpec {
    pub name: String,
    pub dim_ids: Vec<u32>,
    pub attributes: Vec<(String, Values)>,
    pub values: Values,
}

impl VariableSpec {
    pub fn new(name: &str, dim_ids: &[u32], values: Values) -> Self {
        Self {
            name: name.to_string(),
            dim_ids: dim_ids.to_vec(),
            attributes: Vec::new(),
            values,
        }
    }

    pub fn with_attribute(mut self, name: &str, values: Values) -> Self {
        self.attributes.push((name.to_string(), values));
        self
    }

    /// Declared size: the payload rounded up to a 4-byte boundary.
    pub fn vsize(&self) -> usize {
        let len = self.values.byte_len();
        len + padding(len)
    }
}

/// Build a classic NetCDF byte stream.
#[derive(Debug, Clone)]
pub struct CdfBuilder {
    little_endian: bool,
    magic: [u8; 3],
    version: u8,
    num_recs: u32,
    tags: Option<[u32; 3]>,
    dimensions: Vec<(String, u32)>,
    attributes: Vec<(String, Values)>,
    variables: Vec<VariableSpec>,
    begin_shifts: Vec<(usize, i64)>,
}

impl Default for CdfBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CdfBuilder {
    pub fn new() -> Self {
        Self {
            little_endian: false,
            magic: *b"CDF",
            version: 1,
            num_recs: 0,
            tags: None,
            dimensions: Vec::new(),
            attributes: Vec::new(),
            variables: Vec::new(),
            begin_shifts: Vec::new(),
        }
    }

    /// Write every multi-byte field little-endian.
    pub fn little_endian(mut self, little_endian: bool) -> Self {
        self.little_endian = little_endian;
        self
    }

    pub fn with_magic(mut self, magic: &[u8; 3], version: u8) -> Self {
        self.magic = *magic;
        self.version = version;
        self
    }

    pub fn with_num_recs(mut self, num_recs: u32) -> Self {
        self.num_recs = num_recs;
        self
    }

    /// Override the dimension, attribute and variable list tags.
    ///
    /// The given tags are written verbatim, including for empty lists that
    /// would otherwise be written as ABSENT (tag 0, count 0).
    pub fn with_tags(mut self, dimension: u32, attribute: u32, variable: u32) -> Self {
        self.tags = Some([dimension, attribute, variable]);
        self
    }

    fn tag(&self, slot: usize, empty: bool) -> u32 {
        match self.tags {
            Some(tags) => tags[slot],
            None if empty => 0,
            None => [NC_DIMENSION, NC_ATTRIBUTE, NC_VARIABLE][slot],
        }
    }

    pub fn dimension(mut self, name: &str, length: u32) -> Self {
        self.dimensions.push((name.to_string(), length));
        self
    }

    pub fn attribute(mut self, name: &str, values: Values) -> Self {
        self.attributes.push((name.to_string(), values));
        self
    }

    pub fn variable(mut self, spec: VariableSpec) -> Self {
        self.variables.push(spec);
        self
    }

    /// Declare variable `index` to begin `delta` bytes away from where its
    /// data is actually written.
    pub fn shift_begin(mut self, index: usize, delta: i64) -> Self {
        self.begin_shifts.push((index, delta));
        self
    }

    /// Offsets at which each variable's data is actually written.
    pub fn data_offsets(&self) -> Vec<u32> {
        let mut offset = self.encode_header(&vec![0; self.variables.len()]).len();
        self.variables
            .iter()
            .map(|var| {
                let begin = offset as u32;
                offset += var.vsize();
                begin
            })
            .collect()
    }

    pub fn build(&self) -> Vec<u8> {
        let mut begins = self.data_offsets();
        for &(index, delta) in &self.begin_shifts {
            if let Some(begin) = begins.get_mut(index) {
                *begin = (*begin as i64 + delta) as u32;
            }
        }

        let mut buf = self.encode_header(&begins);
        for var in &self.variables {
            var.values.put(&mut buf, self.little_endian);
            buf.put_bytes(0, var.vsize() - var.values.byte_len());
        }
        buf.to_vec()
    }

    fn put_u32(&self, buf: &mut BytesMut, value: u32) {
        if self.little_endian {
            buf.put_u32_le(value)
        } else {
            buf.put_u32(value)
        }
    }

    fn put_name(&self, buf: &mut BytesMut, name: &str) {
        self.put_u32(buf, name.len() as u32);
        buf.put_slice(name.as_bytes());
        buf.put_bytes(0, padding(name.len()));
    }

    fn put_attributes(&self, buf: &mut BytesMut, attributes: &[(String, Values)]) {
        self.put_u32(buf, self.tag(1, attributes.is_empty()));
        self.put_u32(buf, attributes.len() as u32);
        for (name, values) in attributes {
            self.put_name(buf, name);
            self.put_u32(buf, values.type_code());
            self.put_u32(buf, values.len() as u32);
            values.put(buf, self.little_endian);
            buf.put_bytes(0, padding(values.byte_len()));
        }
    }

    fn encode_header(&self, begins: &[u32]) -> BytesMut {
        let mut buf = BytesMut::new();
        buf.put_slice(&self.magic);
        buf.put_u8(self.version);
        self.put_u32(&mut buf, self.num_recs);

        self.put_u32(&mut buf, self.tag(0, self.dimensions.is_empty()));
        self.put_u32(&mut buf, self.dimensions.len() as u32);
        for (name, length) in &self.dimensions {
            self.put_name(&mut buf, name);
            self.put_u32(&mut buf, *length);
        }

        self.put_attributes(&mut buf, &self.attributes);

        self.put_u32(&mut buf, self.tag(2, self.variables.is_empty()));
        self.put_u32(&mut buf, self.variables.len() as u32);
        for (var, begin) in self.variables.iter().zip(begins) {
            self.put_name(&mut buf, &var.name);
            self.put_u32(&mut buf, var.dim_ids.len() as u32);
            for &id in &var.dim_ids {
                self.put_u32(&mut buf, id);
            }
            self.put_attributes(&mut buf, &var.attributes);
            self.put_u32(&mut buf, var.values.type_code());
            self.put_u32(&mut buf, var.vsize() as u32);
            self.put_u32(&mut buf, *begin);
        }
        buf
    }
}

/// Creates flat `[time][lat][lon]` values with a predictable pattern.
///
/// Each cell value is `t * 10000 + j * 100 + k`, so a decoded grid can be
/// checked cell by cell.
pub fn create_cube_values(times: usize, lats: usize, lons: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(times * lats * lons);
    for t in 0..times {
        for j in 0..lats {
            for k in 0..lons {
                data.push((t * 10000 + j * 100 + k) as f32);
            }
        }
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_layout() {
        let bytes = CdfBuilder::new().build();
        // magic + numrecs + three ABSENT lists
        assert_eq!(bytes.len(), 4 + 4 + 3 * 8);
        assert_eq!(&bytes[0..4], b"CDF\x01");
        assert!(bytes[4..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_begin_offsets_follow_header() {
        let builder = CdfBuilder::new()
            .dimension("x", 3)
            .variable(VariableSpec::new("a", &[0], Values::Short(vec![1, 2, 3])))
            .variable(VariableSpec::new("b", &[0], Values::Float(vec![1.0, 2.0, 3.0])));
        let offsets = builder.data_offsets();
        let bytes = builder.build();

        assert_eq!(offsets.len(), 2);
        // 6 bytes of shorts are padded to 8
        assert_eq!(offsets[1] - offsets[0], 8);
        assert_eq!(bytes.len(), offsets[1] as usize + 12);
        assert_eq!(&bytes[offsets[0] as usize..offsets[0] as usize + 2], &[0x00, 0x01]);
    }

    #[test]
    fn test_little_endian_fields() {
        let bytes = CdfBuilder::new().little_endian(true).with_num_recs(5).build();
        assert_eq!(&bytes[4..8], &[5, 0, 0, 0]);
    }

    #[test]
    fn test_shift_begin_changes_declared_offset_only() {
        let builder = CdfBuilder::new()
            .dimension("x", 1)
            .variable(VariableSpec::new("a", &[0], Values::Int(vec![7])));
        let normal = builder.build();
        let shifted = builder.clone().shift_begin(0, 4).build();
        assert_eq!(normal.len(), shifted.len());
        assert_ne!(normal, shifted);
    }

    #[test]
    fn test_create_cube_values() {
        let values = create_cube_values(2, 3, 4);
        assert_eq!(values.len(), 24);
        assert_eq!(values[0], 0.0);
        assert_eq!(values[1], 1.0);
        assert_eq!(values[4], 100.0);
        assert_eq!(values[12], 10000.0);
    }
}
