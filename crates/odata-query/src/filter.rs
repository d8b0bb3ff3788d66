//! Filter fragment construction.
//!
//! Fragments are percent-encoded the moment they are built: every space
//! becomes `%20` and every quote delimiter `%27`. The archive matches the
//! attribute template byte for byte, so the shapes here are wire format,
//! not display format.

use std::fmt;
use std::str::FromStr;

use crate::archive;
use crate::attributes::{find_descriptor, AttributeDescriptor};
use crate::errors::QueryError;

/// A fully encoded boolean predicate ready to join into `$filter`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterFragment(String);

impl FilterFragment {
    /// Encode a raw predicate for the wire.
    fn encode(raw: &str) -> Self {
        FilterFragment(raw.replace(' ', "%20").replace('\'', "%27"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FilterFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Comparison operators the archive accepts in attribute filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompareOp {
    #[default]
    Eq,
    Le,
    Ge,
    Lt,
    Gt,
}

impl CompareOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompareOp::Eq => "eq",
            CompareOp::Le => "le",
            CompareOp::Ge => "ge",
            CompareOp::Lt => "lt",
            CompareOp::Gt => "gt",
        }
    }
}

impl FromStr for CompareOp {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "eq" => Ok(CompareOp::Eq),
            "le" => Ok(CompareOp::Le),
            "ge" => Ok(CompareOp::Ge),
            "lt" => Ok(CompareOp::Lt),
            "gt" => Ok(CompareOp::Gt),
            _ => Err(QueryError::InvalidOperator(s.trim().to_string())),
        }
    }
}

/// A filter value as supplied by the caller.
///
/// Quoting is decided by the catalogue's value type for the attribute, not
/// by the variant, so a numeric value passed as text still goes out bare.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Number(f64),
    Flag(bool),
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::Text(s) => f.write_str(s),
            FilterValue::Number(n) => write!(f, "{}", n),
            FilterValue::Flag(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        FilterValue::Text(s.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        FilterValue::Text(s)
    }
}

impl From<f64> for FilterValue {
    fn from(n: f64) -> Self {
        FilterValue::Number(n)
    }
}

impl From<i64> for FilterValue {
    fn from(n: i64) -> Self {
        FilterValue::Number(n as f64)
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        FilterValue::Flag(b)
    }
}

/// Build the typed attribute predicate for one name/value/operator triple.
///
/// The name must exist in the attribute catalogue; its advertised value
/// type picks the typed segment and decides quoting. Unknown names fail
/// before any request is made.
pub fn attribute_filter(
    descriptors: &[AttributeDescriptor],
    name: &str,
    value: &FilterValue,
    op: CompareOp,
) -> Result<FilterFragment, QueryError> {
    let descriptor = find_descriptor(descriptors, name)
        .ok_or_else(|| QueryError::InvalidAttributeName(name.to_string()))?;

    let token = descriptor
        .value_type
        .attribute_token()
        .ok_or_else(|| QueryError::UnsupportedValueType(name.to_string()))?;

    let rendered = if descriptor.value_type.is_quoted() {
        format!("'{}'", value)
    } else {
        value.to_string()
    };

    let raw = format!(
        "Attributes/{ns}.{token}/any(att:att/Name eq '{name}' and att/{ns}.{token}/Value {op} {value})",
        ns = archive::ODATA_NAMESPACE,
        token = token,
        name = name,
        op = op.as_str(),
        value = rendered,
    );

    Ok(FilterFragment::encode(&raw))
}

/// Fixed mission predicate present in every query.
pub fn collection_filter() -> FilterFragment {
    FilterFragment::encode(&format!(
        "Collection/Name eq '{}'",
        archive::COLLECTION_NAME
    ))
}

/// Acquisition-start window predicate over canonical instants.
pub fn date_range_filter(start: &str, end: &str) -> FilterFragment {
    FilterFragment::encode(&format!(
        "ContentDate/Start ge {} and ContentDate/Start le {}",
        start, end
    ))
}

/// Spatial predicate around an already encoded WKT polygon.
pub fn intersects_filter(encoded_wkt: &str) -> FilterFragment {
    FilterFragment::encode(&format!(
        "{}.Intersects(area=geography'SRID={};{}')",
        archive::ODATA_NAMESPACE,
        archive::SRID,
        encoded_wkt
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::ValueType;

    fn descriptors() -> Vec<AttributeDescriptor> {
        vec![
            AttributeDescriptor::new("productType", ValueType::String),
            AttributeDescriptor::new("orbitDirection", ValueType::String),
            AttributeDescriptor::new("cloudCover", ValueType::Double),
            AttributeDescriptor::new("orbitNumber", ValueType::Integer),
            AttributeDescriptor::new("beginningDateTime", ValueType::DateTimeOffset),
            AttributeDescriptor::new("coastalCover", ValueType::Boolean),
            AttributeDescriptor::new("footprint", ValueType::Unsupported),
        ]
    }

    #[test]
    fn test_string_attribute_template() {
        let fragment = attribute_filter(
            &descriptors(),
            "orbitDirection",
            &FilterValue::from("DESCENDING"),
            CompareOp::Eq,
        )
        .unwrap();

        assert_eq!(
            fragment.as_str(),
            "Attributes/OData.CSC.StringAttribute/any(att:att/Name%20eq%20%27orbitDirection%27%20and%20att/OData.CSC.StringAttribute/Value%20eq%20%27DESCENDING%27)"
        );
    }

    #[test]
    fn test_double_attribute_is_unquoted() {
        let fragment = attribute_filter(
            &descriptors(),
            "cloudCover",
            &FilterValue::from(20.0),
            CompareOp::Le,
        )
        .unwrap();

        assert_eq!(
            fragment.as_str(),
            "Attributes/OData.CSC.DoubleAttribute/any(att:att/Name%20eq%20%27cloudCover%27%20and%20att/OData.CSC.DoubleAttribute/Value%20le%2020)"
        );
    }

    #[test]
    fn test_numeric_text_stays_bare_for_numeric_attribute() {
        let fragment = attribute_filter(
            &descriptors(),
            "orbitNumber",
            &FilterValue::from("12345"),
            CompareOp::Ge,
        )
        .unwrap();

        assert_eq!(
            fragment.as_str(),
            "Attributes/OData.CSC.IntegerAttribute/any(att:att/Name%20eq%20%27orbitNumber%27%20and%20att/OData.CSC.IntegerAttribute/Value%20ge%2012345)"
        );
    }

    #[test]
    fn test_datetime_attribute_is_unquoted() {
        let fragment = attribute_filter(
            &descriptors(),
            "beginningDateTime",
            &FilterValue::from("2024-09-01T00:00:00.000Z"),
            CompareOp::Ge,
        )
        .unwrap();

        assert_eq!(
            fragment.as_str(),
            "Attributes/OData.CSC.DateTimeOffsetAttribute/any(att:att/Name%20eq%20%27beginningDateTime%27%20and%20att/OData.CSC.DateTimeOffsetAttribute/Value%20ge%202024-09-01T00:00:00.000Z)"
        );
    }

    #[test]
    fn test_boolean_attribute_renders_lowercase() {
        let fragment = attribute_filter(
            &descriptors(),
            "coastalCover",
            &FilterValue::from(true),
            CompareOp::Eq,
        )
        .unwrap();

        assert_eq!(
            fragment.as_str(),
            "Attributes/OData.CSC.BooleanAttribute/any(att:att/Name%20eq%20%27coastalCover%27%20and%20att/OData.CSC.BooleanAttribute/Value%20eq%20true)"
        );
    }

    #[test]
    fn test_unknown_attribute_name_fails_with_name() {
        let err = attribute_filter(
            &descriptors(),
            "notAnAttribute",
            &FilterValue::from(1.0),
            CompareOp::Eq,
        )
        .unwrap_err();

        assert_eq!(
            err,
            QueryError::InvalidAttributeName("notAnAttribute".to_string())
        );
        assert!(err.to_string().contains("notAnAttribute"));
    }

    #[test]
    fn test_unsupported_value_type_fails() {
        let err = attribute_filter(
            &descriptors(),
            "footprint",
            &FilterValue::from("anything"),
            CompareOp::Eq,
        )
        .unwrap_err();

        assert_eq!(
            err,
            QueryError::UnsupportedValueType("footprint".to_string())
        );
    }

    #[test]
    fn test_operator_parsing() {
        assert_eq!("eq".parse::<CompareOp>().unwrap(), CompareOp::Eq);
        assert_eq!("LE".parse::<CompareOp>().unwrap(), CompareOp::Le);
        assert_eq!(" gt ".parse::<CompareOp>().unwrap(), CompareOp::Gt);

        let err = "like".parse::<CompareOp>().unwrap_err();
        assert_eq!(err, QueryError::InvalidOperator("like".to_string()));
    }

    #[test]
    fn test_collection_filter() {
        assert_eq!(
            collection_filter().as_str(),
            "Collection/Name%20eq%20%27SENTINEL-3%27"
        );
    }

    #[test]
    fn test_date_range_filter() {
        let fragment = date_range_filter("2024-09-01T00:00:00.000Z", "2024-09-30T00:00:00.000Z");
        assert_eq!(
            fragment.as_str(),
            "ContentDate/Start%20ge%202024-09-01T00:00:00.000Z%20and%20ContentDate/Start%20le%202024-09-30T00:00:00.000Z"
        );
    }

    #[test]
    fn test_intersects_filter() {
        let fragment = intersects_filter(
            "POLYGON%20((-10%20-10,%2010%20-10,%2010%2010,%20-10%2010,%20-10%20-10))",
        );
        assert_eq!(
            fragment.as_str(),
            "OData.CSC.Intersects(area=geography%27SRID=4326;POLYGON%20((-10%20-10,%2010%20-10,%2010%2010,%20-10%2010,%20-10%20-10))%27)"
        );
    }
}
