use crate::address_space::{EuInformation, Range};
use crate::constants::defaults;

/// UNECE Rec. 20 common code packed into the `unitId` integer
///
/// Returns -1 for codes that cannot be packed.
pub fn unece_unit_id(code: &str) -> i32 {
    if code.is_empty() || code.len() > 3 || !code.is_ascii() {
        return -1;
    }
    code.bytes().fold(0, |id, b| (id << 8) | i32::from(b))
}

impl EuInformation {
    pub fn cefact(code: &str, display_name: &str, description: &str) -> Self {
        EuInformation {
            namespace_uri: defaults::EU_NAMESPACE_URI.to_string(),
            unit_id: unece_unit_id(code),
            display_name: display_name.to_string(),
            description: description.to_string(),
        }
    }

    /// Unit without a UNECE code
    pub fn unitless(display_name: &str, description: &str) -> Self {
        Self::cefact("", display_name, description)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AnalogItemSpec {
    pub name: &'static str,
    pub engineering_units: EuInformation,
    pub eu_range: Option<Range>,
    pub instrument_range: Option<Range>,
}

impl AnalogItemSpec {
    pub fn new(name: &'static str, engineering_units: EuInformation) -> Self {
        AnalogItemSpec {
            name,
            engineering_units,
            eu_range: None,
            instrument_range: None,
        }
    }

    pub fn with_eu_range(mut self, low: f64, high: f64) -> Self {
        self.eu_range = Some(Range::new(low, high));
        self
    }

    pub fn with_instrument_range(mut self, low: f64, high: f64) -> Self {
        self.instrument_range = Some(Range::new(low, high));
        self
    }
}

/// Feed description populated under feeding sensors
#[derive(Clone, Debug, PartialEq)]
pub struct FeedTypeSpec {
    pub items: Vec<AnalogItemSpec>,
}

impl FeedTypeSpec {
    pub fn standard() -> Self {
        FeedTypeSpec {
            items: vec![
                AnalogItemSpec::new(
                    "PelletSize",
                    EuInformation::cefact("MMT", "mm", "Millimeter"),
                ),
                AnalogItemSpec::new("MassPerPellet", EuInformation::cefact("GRM", "g", "Gram")),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unece_unit_id() {
        assert_eq!(unece_unit_id("CEL"), 4408652);
        assert_eq!(unece_unit_id("P1"), 20529);
        assert_eq!(unece_unit_id(""), -1);
        assert_eq!(unece_unit_id("TOOLONG"), -1);
    }
}
