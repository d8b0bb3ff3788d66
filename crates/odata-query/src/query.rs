//! Search query assembly.
//!
//! Combines the fixed catalogue predicates with caller-supplied attribute
//! filters, an optional acquisition window, and an optional search area
//! into one complete, fully encoded query URL.

use chrono::{DateTime, TimeZone, Utc};

use crate::archive;
use crate::attributes::AttributeDescriptor;
use crate::errors::QueryError;
use crate::filter::{
    attribute_filter, collection_filter, date_range_filter, intersects_filter, CompareOp,
    FilterValue,
};
use crate::geometry::{normalize_polygon, AreaOfInterest};
use crate::time::normalize_datetime;

/// Caller-supplied search parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchCriteria {
    /// Requested result volume; also decides whether pagination runs.
    pub max_results: u32,

    /// Optional search area.
    pub area: Option<AreaOfInterest>,

    /// Optional acquisition window start, loosely formatted.
    pub start: Option<String>,

    /// Optional acquisition window end, loosely formatted.
    pub end: Option<String>,

    /// Attribute filters in application order. Any `productType` entry is
    /// discarded; the archive's ocean product type is always injected.
    pub attribute_filters: Vec<(String, FilterValue)>,
}

impl SearchCriteria {
    pub fn new(max_results: u32) -> Self {
        Self {
            max_results,
            area: None,
            start: None,
            end: None,
            attribute_filters: Vec::new(),
        }
    }

    /// Per-request page size, at least one and at most the archive's hard
    /// cap.
    pub fn page_size(&self) -> u32 {
        self.max_results.clamp(1, archive::PAGE_SIZE_LIMIT)
    }

    /// Whether continuation links should be followed.
    pub fn iterate_pages(&self) -> bool {
        self.max_results > archive::PAGE_SIZE_LIMIT
    }
}

/// Assemble the complete catalogue search URL for the given criteria.
///
/// Predicates join with an encoded ` and ` in fixed order: collection,
/// injected product type, caller attributes in caller order, optional
/// acquisition window, optional spatial intersects. Absent options simply
/// do not appear; no conjunction dangles.
pub fn build_search_query(
    base_url: &str,
    criteria: &SearchCriteria,
    descriptors: &[AttributeDescriptor],
) -> Result<String, QueryError> {
    let mut fragments = vec![
        collection_filter(),
        attribute_filter(
            descriptors,
            "productType",
            &FilterValue::from(archive::PRODUCT_TYPE),
            CompareOp::Eq,
        )?,
    ];

    for (name, value) in &criteria.attribute_filters {
        if name == "productType" {
            continue;
        }
        fragments.push(attribute_filter(descriptors, name, value, CompareOp::Eq)?);
    }

    if criteria.start.is_some() || criteria.end.is_some() {
        let start = normalize_datetime(criteria.start.as_deref(), epoch_floor());
        let end = normalize_datetime(criteria.end.as_deref(), Utc::now());
        fragments.push(date_range_filter(&start, &end));
    }

    if let Some(area) = &criteria.area {
        fragments.push(intersects_filter(&normalize_polygon(area)));
    }

    let filter = fragments
        .iter()
        .map(|f| f.as_str())
        .collect::<Vec<_>>()
        .join("%20and%20");

    Ok(format!(
        "{}/Products?$orderby=ContentDate/Start%20asc&$top={}&$filter={}",
        base_url.trim_end_matches('/'),
        criteria.page_size(),
        filter
    ))
}

/// Window floor used when an end bound is given without a start.
fn epoch_floor() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(1900, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}
