//! Sequential header and data parsing.
//!
//! The file is read in a single forward pass:
//!
//! ```text
//! magic  "CDF" + version byte
//! numrecs         4 bytes (0xFFFFFFFF while streaming)
//! dim_list        NC_DIMENSION tag, count, { name, length }*
//! gatt_list       NC_ATTRIBUTE tag, count, { name, type, nelems, values }*
//! var_list        NC_VARIABLE tag, count, { name, ndims, dimids, vatt_list, type, vsize, begin }*
//! data            vsize bytes per variable, each starting at its begin offset
//! ```

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use tracing::{debug, info};

use crate::attribute::{self, Attribute};
use crate::codec::CdfReader;
use crate::config::DecodeConfig;
use crate::dimension::Dimension;
use crate::error::{CdfError, CdfResult};
use crate::types::NcType;
use crate::variable::Variable;

/// Tag preceding the dimension list.
pub const NC_DIMENSION: u32 = 0x0A;
/// Tag preceding the variable list.
pub const NC_VARIABLE: u32 = 0x0B;
/// Tag preceding an attribute list.
pub const NC_ATTRIBUTE: u32 = 0x0C;
/// Record count written while a file is still being streamed.
pub const STREAMING: u32 = 0xFFFF_FFFF;

/// Magic prefix of a classic file.
pub const MAGIC: &str = "CDF";

/// A fully parsed classic file: schema plus the raw data of every variable.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub magic: String,
    pub version: u8,
    pub num_recs: u32,
    pub dimensions: Vec<Dimension>,
    pub attributes: Vec<Attribute>,
    pub variables: Vec<Variable>,
}

impl Header {
    /// Parse a header and all variable data from `reader`.
    ///
    /// The reader must be positioned at the start of the file. It is only
    /// borrowed; closing it stays with the caller. Any failure aborts the
    /// whole parse.
    pub fn read<R: Read>(reader: &mut R, config: &DecodeConfig) -> CdfResult<Self> {
        let mut reader = CdfReader::new(reader, config);

        let magic_bytes = reader.read_bytes(3)?;
        let magic: String = magic_bytes.iter().map(|&b| b as char).collect();
        let version = reader.read_u8()?;

        if config.is_strict() {
            if magic != MAGIC {
                return Err(CdfError::InvalidMagic(magic));
            }
            if version != 1 {
                return Err(CdfError::UnsupportedVersion(version));
            }
        }

        let num_recs = reader.read_non_neg()?;
        if num_recs == STREAMING {
            debug!("Record count marks a streaming file");
        }

        let dimensions = read_dimensions(&mut reader, config)?;
        let attributes = read_attributes(&mut reader, config)?;
        let descriptors = read_variables(&mut reader, config, &dimensions)?;

        let mut variables = Vec::with_capacity(descriptors.len());
        for var in descriptors {
            let actual = reader.position();
            if actual != var.begin as u64 {
                return Err(CdfError::StructuralMismatch {
                    variable: var.name,
                    expected: var.begin as u64,
                    actual,
                });
            }
            let data = reader.read_values(var.nc_type, var.length, false)?;
            debug!(variable = %var.name, rows = data.len(), "Read variable data");
            variables.push(var.with_data(data));
        }

        info!(
            magic = %magic,
            version = version,
            dimensions = dimensions.len(),
            attributes = attributes.len(),
            variables = variables.len(),
            bytes = reader.position(),
            "Parsed classic NetCDF header"
        );

        Ok(Self {
            magic,
            version,
            num_recs,
            dimensions,
            attributes,
            variables,
        })
    }

    /// Parse an in-memory file.
    pub fn from_bytes(data: &[u8], config: &DecodeConfig) -> CdfResult<Self> {
        let mut cursor = data;
        Self::read(&mut cursor, config)
    }

    /// Open and parse a file on disk.
    pub fn open<P: AsRef<Path>>(path: P, config: &DecodeConfig) -> CdfResult<Self> {
        let mut reader = BufReader::new(File::open(path)?);
        Self::read(&mut reader, config)
    }

    /// True if the record count is the streaming marker.
    pub fn is_streaming(&self) -> bool {
        self.num_recs == STREAMING
    }

    pub fn dimension(&self, id: u32) -> Option<&Dimension> {
        self.dimensions.get(id as usize)
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.name == name)
    }

    /// Global attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        attribute::find(&self.attributes, name)
    }

    /// Dimension lengths of a variable, in its declared order.
    pub fn shape(&self, variable: &Variable) -> Vec<u32> {
        variable
            .dim_ids
            .iter()
            .filter_map(|&id| self.dimension(id).map(|d| d.length))
            .collect()
    }
}

// ===== List parsing =====

/// Read a list tag and count, returning how many items follow.
fn read_list_prefix<R: Read>(
    reader: &mut CdfReader<R>,
    config: &DecodeConfig,
    section: &'static str,
    expected: u32,
) -> CdfResult<u32> {
    let tag = reader.read_non_neg()?;
    let count = reader.read_non_neg()?;

    if tag == expected {
        return Ok(count);
    }

    let absent = tag == 0 && count == 0;
    if config.is_strict() && !absent {
        return Err(CdfError::InvalidTag {
            section,
            expected,
            found: tag,
        });
    }

    if !absent {
        debug!(section, tag, count, "Unexpected list tag, treating list as empty");
    }
    Ok(0)
}

fn read_dimensions<R: Read>(
    reader: &mut CdfReader<R>,
    config: &DecodeConfig,
) -> CdfResult<Vec<Dimension>> {
    let count = read_list_prefix(reader, config, "dimension", NC_DIMENSION)?;

    let mut dimensions = Vec::new();
    for _ in 0..count {
        let name = reader.read_name()?;
        let length = reader.read_non_neg()?;
        let dim = Dimension::new(name, length);
        debug!(%dim, "Parsed dimension");
        dimensions.push(dim);
    }
    Ok(dimensions)
}

/// Attribute list shared by the global and per-variable sections.
fn read_attributes<R: Read>(
    reader: &mut CdfReader<R>,
    config: &DecodeConfig,
) -> CdfResult<Vec<Attribute>> {
    let count = read_list_prefix(reader, config, "attribute", NC_ATTRIBUTE)?;

    let mut attributes = Vec::new();
    for _ in 0..count {
        let name = reader.read_name()?;
        let nc_type = NcType::from_code(reader.read_non_neg()?)?;
        let nelems = reader.read_non_neg()?;
        let values = reader.read_values(nc_type, nelems, true)?;
        let attr = Attribute::new(name, values);
        debug!(%attr, "Parsed attribute");
        attributes.push(attr);
    }
    Ok(attributes)
}

fn read_variables<R: Read>(
    reader: &mut CdfReader<R>,
    config: &DecodeConfig,
    dimensions: &[Dimension],
) -> CdfResult<Vec<Variable>> {
    let count = read_list_prefix(reader, config, "variable", NC_VARIABLE)?;

    let mut variables = Vec::new();
    for _ in 0..count {
        let name = reader.read_name()?;

        let ndims = reader.read_non_neg()?;
        let mut dim_ids = Vec::new();
        for _ in 0..ndims {
            let dimid = reader.read_non_neg()?;
            if dimid as usize >= dimensions.len() {
                return Err(CdfError::UnknownDimension {
                    variable: name,
                    dimid,
                });
            }
            dim_ids.push(dimid);
        }

        let attributes = read_attributes(reader, config)?;
        let nc_type = NcType::from_code(reader.read_non_neg()?)?;
        let vsize = reader.read_non_neg()?;
        let begin = reader.read_non_neg()?;

        let var = Variable::new(name, dim_ids, attributes, nc_type, vsize, begin);
        debug!(%var, "Parsed variable");
        variables.push(var);
    }
    Ok(variables)
}
