//! Grid assembly tests against synthetic classic files.

use chrono::{TimeZone, Utc};
use geo_grid::{GeoGrid, GridConfig, GridError, VariableRole};
use netcdf_parser::{DecodeConfig, Header};
use rust_decimal::Decimal;
use test_utils::{
    assert_approx_eq, create_cube_values, grid_builder, scenario, scenario_builder,
    scenario_bytes, CdfBuilder, Values, VariableSpec,
};

fn assemble(bytes: &[u8]) -> Result<GeoGrid, GridError> {
    assemble_with(bytes, &GridConfig::default())
}

fn assemble_with(bytes: &[u8], config: &GridConfig) -> Result<GeoGrid, GridError> {
    let header = Header::from_bytes(bytes, &DecodeConfig::default())?;
    GeoGrid::from_header(&header, config)
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

// ============================================================================
// Reference grid
// ============================================================================

#[test]
fn test_scenario_grid() {
    let grid = assemble(&scenario_bytes()).unwrap();

    assert_eq!(grid.data[[0, 0, 0]], 1.0);
    assert_eq!(grid.data[[0, 0, 1]], 2.0);
    assert_eq!(grid.data[[0, 1, 0]], 3.0);
    assert_eq!(grid.data[[0, 1, 1]], 4.0);

    assert_eq!(grid.times[0], Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap());
    assert_eq!(grid.time_offsets, vec![0]);
    assert_eq!(grid.latitudes, vec![dec("10"), dec("20")]);
    assert_eq!(grid.longitudes, vec![dec("30"), dec("40")]);

    assert_eq!(grid.name, scenario::LONG_NAME);
    assert_eq!(grid.units, scenario::UNITS);
    assert_eq!(grid.data_type, scenario::DATA_NAME);
    assert_eq!(grid.missing_value, scenario::MISSING);
    assert_eq!(grid.valid_min, scenario::VALID_MIN);
    assert_eq!(grid.valid_max, scenario::VALID_MAX);

    assert!(grid.is_valid_value(1.0));
    assert!(!grid.is_valid_value(-999.0));
}

#[test]
fn test_cube_values_land_in_their_cells() {
    let (nt, nlat, nlon) = (3, 4, 5);
    let bytes = grid_builder(
        "sst",
        &[0, 3600, 7200],
        &[-10.5, 0.0, 10.5, 21.0],
        &[100.0, 100.25, 100.5, 100.75, 101.0],
        &create_cube_values(nt, nlat, nlon),
    )
    .build();
    let grid = assemble(&bytes).unwrap();

    assert_eq!(grid.data.dim(), (nt, nlat, nlon));
    for t in 0..nt {
        for j in 0..nlat {
            for k in 0..nlon {
                assert_eq!(grid.value(t, j, k), Some((t * 10000 + j * 100 + k) as f32));
            }
        }
    }
    assert_eq!(grid.latitudes[0], dec("-10.5"));
    assert_eq!(grid.longitudes[1], dec("100.25"));
    assert_eq!(
        grid.times[2],
        Utc.with_ymd_and_hms(1970, 1, 1, 2, 0, 0).unwrap()
    );
}

#[test]
fn test_little_endian_file() {
    let bytes = scenario_builder().little_endian(true).build();
    let decode = DecodeConfig {
        data_little_endian: true,
        ..DecodeConfig::default()
    };
    let grid = GeoGrid::from_reader(&mut bytes.as_slice(), &decode, &GridConfig::default()).unwrap();
    assert_eq!(grid.value(0, 1, 1), Some(4.0));
    assert_eq!(grid.latitudes[1], dec("20"));
}

#[test]
fn test_open_from_disk() {
    let dir = test_utils::temp_test_dir();
    let path = test_utils::write_test_file(&dir, "grid.nc", &scenario_bytes());
    let grid = GeoGrid::open(&path, &DecodeConfig::default(), &GridConfig::default()).unwrap();
    assert_eq!(grid.lat_len(), 2);
}

#[test]
fn test_parse_errors_are_wrapped() {
    let bytes = scenario_builder().shift_begin(3, 4).build();
    assert!(matches!(assemble(&bytes), Err(GridError::Parse(_))));
}

// ============================================================================
// Classification
// ============================================================================

fn named_layout(order: &[&str]) -> Vec<u8> {
    let mut builder = CdfBuilder::new()
        .dimension("time", 1)
        .dimension("lat", 2)
        .dimension("lng", 2);
    for name in order {
        let spec = match *name {
            "time" => VariableSpec::new("time", &[0], Values::Int(vec![60])),
            "lat" => VariableSpec::new("lat", &[1], Values::Float(vec![1.0, 2.0])),
            "lng" => VariableSpec::new("lng", &[2], Values::Float(vec![3.0, 4.0])),
            other => VariableSpec::new(other, &[0, 1, 2], Values::Float(vec![5.0, 6.0, 7.0, 8.0])),
        };
        builder = builder.variable(spec);
    }
    builder.build()
}

#[test]
fn test_data_variable_independent_of_position() {
    for position in 0..4 {
        let mut order = vec!["lat", "lng", "time"];
        order.insert(position, "wind_speed");
        let grid = assemble(&named_layout(&order)).unwrap();
        assert_eq!(grid.data_type, "wind_speed", "position {}", position);
        assert_eq!(grid.value(0, 1, 0), Some(7.0));
        assert_eq!(grid.time_offsets, vec![60]);
    }
}

#[test]
fn test_missing_coordinate() {
    let bytes = CdfBuilder::new()
        .dimension("lat", 1)
        .dimension("lon", 1)
        .variable(VariableSpec::new("lat", &[0], Values::Float(vec![1.0])))
        .variable(VariableSpec::new("lon", &[1], Values::Float(vec![1.0])))
        .variable(VariableSpec::new("sst", &[0, 1], Values::Float(vec![1.0])))
        .build();
    assert!(matches!(
        assemble(&bytes),
        Err(GridError::MissingCoordinate(VariableRole::Time))
    ));
}

#[test]
fn test_ambiguous_and_explicit_data_variable() {
    let bytes = scenario_builder()
        .variable(VariableSpec::new("sst", &[0, 1, 2], Values::Float(vec![9.0; 4])))
        .build();

    match assemble(&bytes) {
        Err(GridError::AmbiguousDataVariable(names)) => {
            assert_eq!(names, vec![scenario::DATA_NAME.to_string(), "sst".to_string()])
        }
        other => panic!("expected AmbiguousDataVariable, got {:?}", other.map(|g| g.data_type)),
    }

    let config = GridConfig {
        data_variable: Some("sst".to_string()),
        ..GridConfig::default()
    };
    let grid = assemble_with(&bytes, &config).unwrap();
    assert_eq!(grid.data_type, "sst");
    assert_eq!(grid.value(0, 1, 1), Some(9.0));
    // sst carries no metadata
    assert!(grid.missing_value.is_nan());
    assert_eq!(grid.valid_min, f32::MIN);
    assert_eq!(grid.valid_max, f32::MAX);
    assert_eq!(grid.name, "");
}

#[test]
fn test_duplicate_coordinate() {
    let bytes = scenario_builder()
        .variable(VariableSpec::new("latitude", &[1], Values::Float(vec![1.0, 2.0])))
        .build();
    assert!(matches!(
        assemble(&bytes),
        Err(GridError::DuplicateCoordinate {
            role: VariableRole::Latitude,
            ..
        })
    ));
}

// ============================================================================
// Layout
// ============================================================================

#[test]
fn test_non_canonical_dimension_order() {
    let (nt, nlat, nlon) = (2usize, 3usize, 4usize);

    // data dimensioned [lon, time, lat]
    let mut values = Vec::new();
    for k in 0..nlon {
        for t in 0..nt {
            for j in 0..nlat {
                values.push((t * 10000 + j * 100 + k) as f32);
            }
        }
    }

    let bytes = CdfBuilder::new()
        .dimension("time", nt as u32)
        .dimension("lat", nlat as u32)
        .dimension("lon", nlon as u32)
        .variable(VariableSpec::new("lon", &[2], Values::Float(vec![0.0, 1.0, 2.0, 3.0])))
        .variable(VariableSpec::new("field", &[2, 0, 1], Values::Float(values)))
        .variable(VariableSpec::new("time", &[0], Values::Int(vec![0, 60])))
        .variable(VariableSpec::new("lat", &[1], Values::Float(vec![0.0, 1.0, 2.0])))
        .build();
    let grid = assemble(&bytes).unwrap();

    assert_eq!(grid.data.dim(), (nt, nlat, nlon));
    for t in 0..nt {
        for j in 0..nlat {
            for k in 0..nlon {
                assert_eq!(grid.data[[t, j, k]], (t * 10000 + j * 100 + k) as f32);
            }
        }
    }
}

#[test]
fn test_coordinate_with_two_dimensions() {
    let bytes = CdfBuilder::new()
        .dimension("time", 1)
        .dimension("lat", 1)
        .dimension("lon", 1)
        .variable(VariableSpec::new("time", &[0], Values::Int(vec![0])))
        .variable(VariableSpec::new("lat", &[1, 2], Values::Float(vec![1.0])))
        .variable(VariableSpec::new("lon", &[2], Values::Float(vec![1.0])))
        .variable(VariableSpec::new("v", &[0, 1, 2], Values::Float(vec![1.0])))
        .build();
    assert!(matches!(
        assemble(&bytes),
        Err(GridError::DimensionMismatch { ref variable, .. }) if variable == "lat"
    ));
}

#[test]
fn test_data_variable_with_wrong_rank() {
    let bytes = CdfBuilder::new()
        .dimension("time", 1)
        .dimension("lat", 2)
        .dimension("lon", 1)
        .variable(VariableSpec::new("time", &[0], Values::Int(vec![0])))
        .variable(VariableSpec::new("lat", &[1], Values::Float(vec![1.0, 2.0])))
        .variable(VariableSpec::new("lon", &[2], Values::Float(vec![1.0])))
        .variable(VariableSpec::new("v", &[1, 2], Values::Float(vec![1.0, 2.0])))
        .build();
    assert!(matches!(
        assemble(&bytes),
        Err(GridError::DimensionMismatch { ref variable, .. }) if variable == "v"
    ));
}

#[test]
fn test_record_dimension_is_unsupported() {
    let bytes = CdfBuilder::new()
        .dimension("time", 0)
        .dimension("lat", 1)
        .dimension("lon", 1)
        .variable(VariableSpec::new("time", &[0], Values::Int(vec![])))
        .variable(VariableSpec::new("lat", &[1], Values::Float(vec![1.0])))
        .variable(VariableSpec::new("lon", &[2], Values::Float(vec![1.0])))
        .variable(VariableSpec::new("v", &[0, 1, 2], Values::Float(vec![])))
        .build();
    assert!(matches!(
        assemble(&bytes),
        Err(GridError::UnsupportedRecordDimension(ref name)) if name == "time"
    ));
}

#[test]
fn test_oversized_axes_are_rejected() {
    // axis lengths whose product does not fit in 64 bits
    let bytes = CdfBuilder::new()
        .dimension("time", 1 << 22)
        .dimension("lat", 1 << 21)
        .dimension("lng", 1 << 21)
        .variable(VariableSpec::new("time", &[0], Values::Byte(vec![0])))
        .variable(VariableSpec::new("lat", &[1], Values::Byte(vec![0])))
        .variable(VariableSpec::new("lng", &[2], Values::Byte(vec![0])))
        .variable(VariableSpec::new("v", &[0, 1, 2], Values::Float(vec![1.0])))
        .build();
    Header::from_bytes(&bytes, &DecodeConfig::default()).unwrap();

    match assemble(&bytes) {
        Err(GridError::DimensionMismatch { variable, reason }) => {
            assert_eq!(variable, "v");
            assert!(reason.contains("too large"), "{}", reason);
        }
        other => panic!("expected DimensionMismatch, got {:?}", other.map(|g| g.data_type)),
    }
}

#[test]
fn test_too_few_data_values() {
    let bytes = grid_builder("v", &[0], &[1.0, 2.0], &[1.0, 2.0], &[1.0, 2.0]).build();
    match assemble(&bytes) {
        Err(GridError::ShapeMismatch {
            variable,
            expected,
            actual,
        }) => {
            assert_eq!(variable, "v");
            assert_eq!(expected, 4);
            assert_eq!(actual, 2);
        }
        other => panic!("expected ShapeMismatch, got {:?}", other.map(|g| g.data_type)),
    }
}

// ============================================================================
// Values and metadata
// ============================================================================

fn packed_file() -> Vec<u8> {
    CdfBuilder::new()
        .dimension("time", 1)
        .dimension("lat", 2)
        .dimension("lon", 2)
        .variable(VariableSpec::new("time", &[0], Values::Int(vec![0])))
        .variable(VariableSpec::new("lat", &[1], Values::Float(vec![1.0, 2.0])))
        .variable(VariableSpec::new("lon", &[2], Values::Float(vec![1.0, 2.0])))
        .variable(
            VariableSpec::new("packed", &[0, 1, 2], Values::Short(vec![2, 4, -1, 6]))
                .with_attribute("scale_factor", Values::Float(vec![0.5]))
                .with_attribute("add_offset", Values::Float(vec![10.0]))
                .with_attribute("missing_value", Values::Short(vec![-1])),
        )
        .build()
}

#[test]
fn test_scale_offset_applied_on_request() {
    let raw = assemble(&packed_file()).unwrap();
    assert_eq!(raw.data.iter().copied().collect::<Vec<_>>(), vec![2.0, 4.0, -1.0, 6.0]);

    let config = GridConfig {
        apply_scale_offset: true,
        ..GridConfig::default()
    };
    let unpacked = assemble_with(&packed_file(), &config).unwrap();
    assert_approx_eq!(unpacked.data[[0, 0, 0]], 11.0, 1e-6);
    assert_approx_eq!(unpacked.data[[0, 0, 1]], 12.0, 1e-6);
    // missing cells keep the sentinel
    assert_eq!(unpacked.data[[0, 1, 0]], -1.0);
    assert_approx_eq!(unpacked.data[[0, 1, 1]], 13.0, 1e-6);
    assert!(!unpacked.is_valid_value(-1.0));
}

#[test]
fn test_fill_value_used_when_missing_value_absent() {
    let bytes = CdfBuilder::new()
        .dimension("time", 1)
        .dimension("lat", 1)
        .dimension("lon", 1)
        .variable(VariableSpec::new("time", &[0], Values::Int(vec![0])))
        .variable(VariableSpec::new("lat", &[1], Values::Float(vec![1.0])))
        .variable(VariableSpec::new("lon", &[2], Values::Float(vec![1.0])))
        .variable(
            VariableSpec::new("v", &[0, 1, 2], Values::Float(vec![5.0]))
                .with_attribute("_FillValue", Values::Float(vec![-32767.0])),
        )
        .build();
    let grid = assemble(&bytes).unwrap();
    assert_eq!(grid.missing_value, -32767.0);
    assert!(!grid.is_valid_value(-32767.0));
    assert!(grid.is_valid_value(5.0));
}

#[test]
fn test_time_axis_types() {
    let build = |time: Values| {
        CdfBuilder::new()
            .dimension("time", 2)
            .dimension("lat", 1)
            .dimension("lon", 1)
            .variable(VariableSpec::new("time", &[0], time))
            .variable(VariableSpec::new("lat", &[1], Values::Float(vec![1.0])))
            .variable(VariableSpec::new("lon", &[2], Values::Float(vec![1.0])))
            .variable(VariableSpec::new("v", &[0, 1, 2], Values::Float(vec![1.0, 2.0])))
            .build()
    };

    let short = assemble(&build(Values::Short(vec![30, -30]))).unwrap();
    assert_eq!(short.time_offsets, vec![30, -30]);

    let double = assemble(&build(Values::Double(vec![3600.9, -0.5]))).unwrap();
    assert_eq!(double.time_offsets, vec![3600, 0]);
    assert_eq!(
        double.times[0],
        Utc.with_ymd_and_hms(1970, 1, 1, 1, 0, 0).unwrap()
    );

    let nan = assemble(&build(Values::Float(vec![0.0, f32::NAN])));
    assert!(matches!(nan, Err(GridError::InvalidTimestamp(_))));
}

#[test]
fn test_clone_is_independent() {
    let original = assemble(&scenario_bytes()).unwrap();
    let mut copy = original.clone();

    copy.data[[0, 0, 0]] = 99.0;
    copy.latitudes[0] = Decimal::ZERO;
    copy.longitudes[1] = Decimal::ONE;
    copy.time_offsets[0] = 42;
    copy.times.clear();
    copy.units.push('!');

    assert_eq!(original.data[[0, 0, 0]], 1.0);
    assert_eq!(original.latitudes[0], dec("10"));
    assert_eq!(original.longitudes, vec![dec("30"), dec("40")]);
    assert_eq!(original.time_offsets, vec![0]);
    assert_eq!(original.times.len(), 1);
    assert_eq!(original.units, scenario::UNITS);
}

#[test]
fn test_summary_serializes() {
    let grid = assemble(&scenario_bytes()).unwrap();
    let json = serde_json::to_value(grid.summary()).unwrap();
    assert_eq!(json["shape"], serde_json::json!([1, 2, 2]));
    assert_eq!(json["data_type"], scenario::DATA_NAME);
    assert_eq!(json["time_range"][0], "19700101 00:00:00");
}
