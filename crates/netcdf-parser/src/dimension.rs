use std::fmt;

/// A named axis length. Length 0 marks the record (unlimited) dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dimension {
    pub name: String,
    pub length: u32,
    pub is_record: bool,
}

impl Dimension {
    pub fn new(name: impl Into<String>, length: u32) -> Self {
        Self {
            name: name.into(),
            length,
            is_record: length == 0,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Dimension:[\"{}\"|{}|{}]",
            self.name, self.length, self.is_record
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_length_is_record() {
        assert!(Dimension::new("time", 0).is_record);
        assert!(!Dimension::new("lat", 180).is_record);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            Dimension::new("lon", 360).to_string(),
            "Dimension:[\"lon\"|360|false]"
        );
    }
}
