//! JSON summary of a classic file and its grid.

use serde::Serialize;

use geo_grid::{GeoGrid, GridConfig, GridSummary};
use netcdf_parser::{Header, NcType};

#[derive(Debug, Serialize)]
pub struct FileSummary {
    pub format: String,
    pub num_recs: u32,
    pub dimensions: Vec<DimensionSummary>,
    pub attributes: Vec<AttributeSummary>,
    pub variables: Vec<VariableSummary>,
    pub grid: GridSummary,
}

#[derive(Debug, Serialize)]
pub struct DimensionSummary {
    pub name: String,
    pub length: u32,
    pub is_record: bool,
}

#[derive(Debug, Serialize)]
pub struct AttributeSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub nc_type: &'static str,
    /// Text attributes only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VariableSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub nc_type: &'static str,
    pub dimensions: Vec<String>,
    pub vsize: u32,
    pub begin: u32,
}

/// Summarize `header` and the grid assembled from it.
pub fn summarize(header: &Header, config: &GridConfig) -> geo_grid::GridResult<FileSummary> {
    let grid = GeoGrid::from_header(header, config)?;

    Ok(FileSummary {
        format: format!("{}{}", header.magic, header.version),
        num_recs: header.num_recs,
        dimensions: header
            .dimensions
            .iter()
            .map(|d| DimensionSummary {
                name: d.name.clone(),
                length: d.length,
                is_record: d.is_record,
            })
            .collect(),
        attributes: header
            .attributes
            .iter()
            .map(|a| AttributeSummary {
                name: a.name.clone(),
                nc_type: a.nc_type().name(),
                text: (a.nc_type() == NcType::Char).then(|| a.as_text()),
            })
            .collect(),
        variables: header
            .variables
            .iter()
            .map(|v| VariableSummary {
                name: v.name.clone(),
                nc_type: v.nc_type.name(),
                dimensions: v
                    .dim_ids
                    .iter()
                    .filter_map(|&id| header.dimension(id).map(|d| d.name.clone()))
                    .collect(),
                vsize: v.vsize,
                begin: v.begin,
            })
            .collect(),
        grid: grid.summary(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use netcdf_parser::DecodeConfig;
    use test_utils::{scenario, scenario_bytes};

    #[test]
    fn test_summarize_scenario() {
        let header = Header::from_bytes(&scenario_bytes(), &DecodeConfig::default()).unwrap();
        let summary = summarize(&header, &GridConfig::default()).unwrap();

        assert_eq!(summary.format, "CDF1");
        assert_eq!(summary.dimensions.len(), 3);
        assert_eq!(summary.attributes[0].text.as_deref(), Some("synthetic grid"));
        assert_eq!(summary.variables[3].name, scenario::DATA_NAME);
        assert_eq!(summary.variables[3].dimensions, vec!["time", "lat", "lon"]);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["variables"][1]["type"], "NC_FLOAT");
        assert_eq!(json["grid"]["shape"], serde_json::json!([1, 2, 2]));
    }
}
