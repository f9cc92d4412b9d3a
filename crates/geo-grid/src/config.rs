//! Configuration for grid assembly and slice serialization.

use serde::{Deserialize, Serialize};

/// Configuration for assembling a [`GeoGrid`](crate::GeoGrid).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Name of the data variable. When unset the single unclassified
    /// variable is used.
    pub data_variable: Option<String>,

    /// Unpack values with `scale_factor` and `add_offset`.
    pub apply_scale_offset: bool,
}

impl GridConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("GRID_DATA_VARIABLE") {
            if !val.is_empty() {
                config.data_variable = Some(val);
            }
        }

        if let Ok(val) = std::env::var("GRID_APPLY_SCALE_OFFSET") {
            config.apply_scale_offset = val.to_lowercase() == "true" || val == "1";
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(name) = &self.data_variable {
            if name.trim().is_empty() {
                return Err("data_variable must not be blank".to_string());
            }
        }
        Ok(())
    }
}

/// Byte order of the serialized slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ByteOrder {
    /// The layout a `Float32Array` consumer reads on common hosts.
    #[default]
    Little,
    Big,
}

impl ByteOrder {
    fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "big" | "be" | "big_endian" => ByteOrder::Big,
            _ => ByteOrder::Little,
        }
    }
}

/// Upper-bound check applied to the requested time index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeIndexCheck {
    /// `index >= len` is rejected.
    #[default]
    Strict,
    /// `index > len` is rejected; `index == len` passes the check and fails
    /// on the first cell access instead.
    Legacy,
}

impl TimeIndexCheck {
    fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "legacy" => TimeIndexCheck::Legacy,
            _ => TimeIndexCheck::Strict,
        }
    }

    /// Whether `index` passes the check against an axis of `len` steps.
    pub fn admits(self, index: usize, len: usize) -> bool {
        match self {
            TimeIndexCheck::Strict => index < len,
            TimeIndexCheck::Legacy => index <= len,
        }
    }
}

/// Configuration for serializing a time slice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliceConfig {
    pub byte_order: ByteOrder,
    pub time_index_check: TimeIndexCheck,
}

impl SliceConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("SLICE_BYTE_ORDER") {
            config.byte_order = ByteOrder::from_str(&val);
        }

        if let Ok(val) = std::env::var("SLICE_TIME_CHECK") {
            config.time_index_check = TimeIndexCheck::from_str(&val);
        }

        config
    }
}
