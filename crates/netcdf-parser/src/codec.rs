//! Primitive codec for the classic format.
//!
//! Every field in the format is a fixed-width big-endian (by default)
//! integer, a length-prefixed name, or a block of fixed-width value rows.
//! Names and attribute value blocks are zero-padded to a 4-byte boundary.

use std::io::{ErrorKind, Read};

use bytes::Bytes;

use crate::config::DecodeConfig;
use crate::error::{CdfError, CdfResult};
use crate::types::{NcType, Value};

/// Number of padding bytes that follow `consumed` bytes of payload.
///
/// `4 - consumed % 4`, except that an already aligned payload has no
/// padding at all.
pub fn padding_len(consumed: u64) -> u64 {
    let remainder = 4 - consumed % 4;
    if remainder == 4 {
        0
    } else {
        remainder
    }
}

// ===== Value decoding =====

fn ordered<const N: usize>(row: &[u8], swap: bool) -> CdfResult<[u8; N]> {
    if row.len() < N {
        return Err(CdfError::RowWidth {
            expected: N,
            found: row.len(),
        });
    }
    let mut buf = [0u8; N];
    buf.copy_from_slice(&row[..N]);
    if swap {
        buf.reverse();
    }
    Ok(buf)
}

/// Decode one raw row as an element of type `ty`.
///
/// Multi-byte rows are reversed first when `swap` is set, then read in the
/// host's native order.
pub fn decode_value(row: &[u8], ty: NcType, swap: bool) -> CdfResult<Value> {
    Ok(match ty {
        NcType::Byte => Value::Byte(ordered::<1>(row, false)?[0]),
        NcType::Char => Value::Char(ordered::<1>(row, false)?[0]),
        NcType::Short => Value::Short(i16::from_ne_bytes(ordered(row, swap)?)),
        NcType::Int => Value::Int(i32::from_ne_bytes(ordered(row, swap)?)),
        NcType::Float => Value::Float(f32::from_ne_bytes(ordered(row, swap)?)),
        NcType::Double => Value::Double(f64::from_ne_bytes(ordered(row, swap)?)),
    })
}

/// Decode one raw row of type `ty` and promote it to `f32`.
pub fn decode_f32(row: &[u8], ty: NcType, swap: bool) -> CdfResult<f32> {
    decode_value(row, ty, swap).map(Value::as_f32)
}

/// Decode a packed string of 4-byte floats.
///
/// Trailing bytes that do not form a whole float are ignored.
pub fn bytes_to_f32_array(bytes: &[u8], config: &DecodeConfig) -> Vec<f32> {
    let swap = config.needs_swap();
    bytes
        .chunks_exact(4)
        .map(|chunk| {
            let mut buf = [0u8; 4];
            buf.copy_from_slice(chunk);
            if swap {
                buf.reverse();
            }
            f32::from_ne_bytes(buf)
        })
        .collect()
}

/// Tolerant float equality.
///
/// Bit-identical and `==` values are equal. Near zero the relative error is
/// meaningless, so an absolute bound of `EPSILON * MIN_POSITIVE` is used;
/// everywhere else the relative difference must be below `EPSILON`.
pub fn float_nearly_equal(a: f32, b: f32) -> bool {
    if a == b || a.to_bits() == b.to_bits() {
        return true;
    }

    let diff = (a - b).abs();
    if a == 0.0 || b == 0.0 || diff < f32::MIN_POSITIVE {
        diff < f32::EPSILON * f32::MIN_POSITIVE
    } else {
        diff / (a.abs() + b.abs()) < f32::EPSILON
    }
}

// ===== Raw value blocks =====

/// A block of undecoded fixed-width rows of one element type.
///
/// Decoding is deferred to the `*_at` accessors; the byte order correction
/// captured at read time travels with the block.
#[derive(Debug, Clone, PartialEq)]
pub struct RawValues {
    nc_type: NcType,
    swap: bool,
    data: Bytes,
}

impl RawValues {
    pub fn new(nc_type: NcType, data: Bytes, swap: bool) -> Self {
        Self {
            nc_type,
            swap,
            data,
        }
    }

    /// A block with no rows.
    pub fn empty(nc_type: NcType) -> Self {
        Self::new(nc_type, Bytes::new(), false)
    }

    pub fn nc_type(&self) -> NcType {
        self.nc_type
    }

    /// Element width in bytes.
    pub fn width(&self) -> usize {
        self.nc_type.width()
    }

    /// Number of whole rows.
    pub fn len(&self) -> usize {
        self.data.len() / self.width()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Raw bytes of every row, in file order.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Raw bytes of row `index`.
    pub fn row(&self, index: usize) -> Option<&[u8]> {
        let width = self.width();
        let start = index.checked_mul(width)?;
        self.data.get(start..start.checked_add(width)?)
    }

    /// Decode row `index`.
    pub fn value_at(&self, index: usize) -> CdfResult<Value> {
        let row = self.row(index).ok_or(CdfError::IndexOutOfRange {
            index,
            len: self.len(),
        })?;
        decode_value(row, self.nc_type, self.swap)
    }

    /// Decode row `index` and promote it to `f32`.
    pub fn f32_at(&self, index: usize) -> CdfResult<f32> {
        self.value_at(index).map(Value::as_f32)
    }

    /// Decode every row.
    pub fn values(&self) -> CdfResult<Vec<Value>> {
        (0..self.len()).map(|i| self.value_at(i)).collect()
    }

    /// Interpret the rows as single-byte characters.
    ///
    /// Trailing NUL bytes are dropped.
    pub fn as_text(&self) -> String {
        let end = self
            .data
            .iter()
            .rposition(|&b| b != 0)
            .map_or(0, |pos| pos + 1);
        self.data[..end].iter().map(|&b| b as char).collect()
    }
}

// ===== Stream reader =====

/// Forward-only reader over a byte stream that tracks the stream position.
///
/// The position starts at zero, so it equals the absolute file offset when
/// the stream is positioned at the start of the file.
pub struct CdfReader<R> {
    inner: R,
    position: u64,
    swap: bool,
}

impl<R: Read> CdfReader<R> {
    pub fn new(inner: R, config: &DecodeConfig) -> Self {
        Self {
            inner,
            position: 0,
            swap: config.needs_swap(),
        }
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> u64 {
        self.position
    }

    fn read_array<const N: usize>(&mut self) -> CdfResult<[u8; N]> {
        let mut buf = [0u8; N];
        let mut filled = 0;
        while filled < N {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => {
                    return Err(CdfError::TruncatedInput {
                        offset: self.position + filled as u64,
                        needed: (N - filled) as u64,
                    })
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        self.position += N as u64;
        Ok(buf)
    }

    /// Read exactly `len` bytes.
    ///
    /// The buffer grows as data arrives, so a corrupt length fails with
    /// `TruncatedInput` instead of a huge up-front allocation.
    pub fn read_bytes(&mut self, len: u64) -> CdfResult<Bytes> {
        let mut buf = Vec::new();
        let read = (&mut self.inner).take(len).read_to_end(&mut buf)? as u64;
        self.position += read;
        if read < len {
            return Err(CdfError::TruncatedInput {
                offset: self.position,
                needed: len - read,
            });
        }
        Ok(Bytes::from(buf))
    }

    pub fn read_u8(&mut self) -> CdfResult<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    /// Read a 4-byte non-negative integer.
    pub fn read_non_neg(&mut self) -> CdfResult<u32> {
        let mut bytes = self.read_array::<4>()?;
        if self.swap {
            bytes.reverse();
        }
        Ok(u32::from_ne_bytes(bytes))
    }

    /// Read a 4-byte signed integer.
    pub fn read_int4(&mut self) -> CdfResult<i32> {
        let mut bytes = self.read_array::<4>()?;
        if self.swap {
            bytes.reverse();
        }
        Ok(i32::from_ne_bytes(bytes))
    }

    /// Skip the padding that follows `consumed` payload bytes.
    pub fn skip_padding(&mut self, consumed: u64) -> CdfResult<()> {
        let pad = padding_len(consumed);
        if pad > 0 {
            self.read_bytes(pad)?;
        }
        Ok(())
    }

    /// Read a name field: 4-byte length, the bytes, zero padding.
    pub fn read_name(&mut self) -> CdfResult<String> {
        let len = self.read_non_neg()? as u64;
        let bytes = self.read_bytes(len)?;
        self.skip_padding(len)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Read `count` rows of type `ty`.
    ///
    /// With `pad` set the stream is then advanced to the next 4-byte
    /// boundary. Top-level variable data is read without it, since the
    /// declared size already includes the padding.
    pub fn read_values(&mut self, ty: NcType, count: u32, pad: bool) -> CdfResult<RawValues> {
        let total = count as u64 * ty.width() as u64;
        let data = self.read_bytes(total)?;
        if pad {
            self.skip_padding(total)?;
        }
        Ok(RawValues::new(ty, data, self.swap))
    }
}
