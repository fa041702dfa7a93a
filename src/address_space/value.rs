/// Typed value held by a variable node
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    /// Never written
    #[default]
    Empty,
    Float(f64),
    String(String),
    LocalizedText(String),
    Range(Range),
    EngineeringUnits(EuInformation),
}

impl Value {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::LocalizedText(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Range {
    pub low: f64,
    pub high: f64,
}

impl Range {
    pub const fn new(low: f64, high: f64) -> Self {
        Range { low, high }
    }
}

/// Engineering unit description attached to analog items
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EuInformation {
    pub namespace_uri: String,
    pub unit_id: i32,
    pub display_name: String,
    pub description: String,
}
