//! Decode configuration.
//!
//! Passed explicitly into every parse instead of living in process-wide
//! state, so two parses with different byte orders never interfere.

use serde::{Deserialize, Serialize};

/// How list tags and the magic/version prefix are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Strictness {
    /// A list with an unexpected tag is treated as empty. Magic and version
    /// are recorded but not checked.
    #[default]
    Lenient,
    /// Magic must be `CDF`, version must be 1, and every list tag must be
    /// the expected constant or ABSENT (tag 0, count 0).
    Strict,
}

impl Strictness {
    fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "strict" | "true" | "1" => Strictness::Strict,
            _ => Strictness::Lenient,
        }
    }
}

/// Configuration for decoding a classic byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeConfig {
    /// Multi-byte values in the input are little-endian.
    pub data_little_endian: bool,

    /// The host decoding the values is little-endian.
    pub host_little_endian: bool,

    /// Tag and prefix validation.
    pub strictness: Strictness,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            data_little_endian: false,
            host_little_endian: cfg!(target_endian = "little"),
            strictness: Strictness::Lenient,
        }
    }
}

impl DecodeConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("CDF_DATA_LITTLE_ENDIAN") {
            config.data_little_endian = val.to_lowercase() == "true" || val == "1";
        }

        if let Ok(val) = std::env::var("CDF_STRICT") {
            config.strictness = Strictness::from_str(&val);
        }

        config
    }

    /// Bytes of multi-byte values are reversed iff the data and host
    /// orders disagree.
    pub fn needs_swap(&self) -> bool {
        self.data_little_endian != self.host_little_endian
    }

    pub fn is_strict(&self) -> bool {
        self.strictness == Strictness::Strict
    }
}
