//! Attribute catalogue descriptors.
//!
//! The archive advertises which product attributes are filterable through
//! its `Attributes(<collection>)` endpoint: a JSON array of name/type
//! pairs. The value type decides which typed attribute segment a filter
//! targets and whether its value takes quote delimiters.

use serde::{Deserialize, Serialize};

/// One filterable attribute advertised by the catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDescriptor {
    /// Attribute name, unique within the collection.
    #[serde(rename = "Name")]
    pub name: String,

    /// Advertised value type.
    #[serde(rename = "ValueType")]
    pub value_type: ValueType,
}

impl AttributeDescriptor {
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
        }
    }
}

/// Value types the catalogue advertises for filterable attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueType {
    String,
    Integer,
    Double,
    DateTimeOffset,
    Boolean,
    /// Any type the catalogue may add that this client does not encode.
    #[serde(other)]
    Unsupported,
}

impl ValueType {
    /// Typed attribute segment token, e.g. `StringAttribute`.
    pub fn attribute_token(&self) -> Option<&'static str> {
        match self {
            ValueType::String => Some("StringAttribute"),
            ValueType::Integer => Some("IntegerAttribute"),
            ValueType::Double => Some("DoubleAttribute"),
            ValueType::DateTimeOffset => Some("DateTimeOffsetAttribute"),
            ValueType::Boolean => Some("BooleanAttribute"),
            ValueType::Unsupported => None,
        }
    }

    /// Whether filter values of this type are wrapped in quote delimiters.
    pub fn is_quoted(&self) -> bool {
        matches!(self, ValueType::String)
    }
}

/// Look up a descriptor by exact name.
pub fn find_descriptor<'a>(
    descriptors: &'a [AttributeDescriptor],
    name: &str,
) -> Option<&'a AttributeDescriptor> {
    descriptors.iter().find(|d| d.name == name)
}
