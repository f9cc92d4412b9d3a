//! Common test fixtures for the decoder and grid tests.

use crate::generators::{CdfBuilder, Values, VariableSpec};

/// The reference 1 x 2 x 2 grid used across the test suite.
pub mod scenario {
    pub const LATITUDES: [f32; 2] = [10.0, 20.0];
    pub const LONGITUDES: [f32; 2] = [30.0, 40.0];
    pub const TIMES: [i32; 1] = [0];
    /// `[time][lat][lon]` flattened.
    pub const VALUES: [f32; 4] = [1.0, 2.0, 3.0, 4.0];
    pub const MISSING: f32 = -999.0;
    pub const VALID_MIN: f32 = 0.0;
    pub const VALID_MAX: f32 = 10.0;
    pub const DATA_NAME: &str = "temperature";
    pub const LONG_NAME: &str = "Air Temperature";
    pub const UNITS: &str = "degC";
}

/// Standard metadata attributes for a data variable.
pub fn with_data_attributes(spec: VariableSpec, missing: f32, min: f32, max: f32) -> VariableSpec {
    spec.with_attribute("long_name", Values::text(scenario::LONG_NAME))
        .with_attribute("units", Values::text(scenario::UNITS))
        .with_attribute("missing_value", Values::Float(vec![missing]))
        .with_attribute("valid_min", Values::Float(vec![min]))
        .with_attribute("valid_max", Values::Float(vec![max]))
}

/// A complete grid file in the canonical layout.
///
/// Dimensions are `time` (id 0), `lat` (id 1), `lon` (id 2); variables are
/// written in the order time, lat, lon, data, with the data variable
/// dimensioned `[time, lat, lon]`.
pub fn grid_builder(
    data_name: &str,
    times: &[i32],
    lats: &[f32],
    lons: &[f32],
    values: &[f32],
) -> CdfBuilder {
    let data = VariableSpec::new(data_name, &[0, 1, 2], Values::Float(values.to_vec()));

    CdfBuilder::new()
        .dimension("time", times.len() as u32)
        .dimension("lat", lats.len() as u32)
        .dimension("lon", lons.len() as u32)
        .attribute("title", Values::text("synthetic grid"))
        .variable(
            VariableSpec::new("time", &[0], Values::Int(times.to_vec()))
                .with_attribute("units", Values::text("seconds since 1970-01-01 00:00:00")),
        )
        .variable(
            VariableSpec::new("lat", &[1], Values::Float(lats.to_vec()))
                .with_attribute("units", Values::text("degrees_north")),
        )
        .variable(
            VariableSpec::new("lon", &[2], Values::Float(lons.to_vec()))
                .with_attribute("units", Values::text("degrees_east")),
        )
        .variable(with_data_attributes(
            data,
            scenario::MISSING,
            scenario::VALID_MIN,
            scenario::VALID_MAX,
        ))
}

/// Builder for the reference scenario grid.
pub fn scenario_builder() -> CdfBuilder {
    grid_builder(
        scenario::DATA_NAME,
        &scenario::TIMES,
        &scenario::LATITUDES,
        &scenario::LONGITUDES,
        &scenario::VALUES,
    )
}

/// The reference scenario grid as a big-endian classic file.
pub fn scenario_bytes() -> Vec<u8> {
    scenario_builder().build()
}
