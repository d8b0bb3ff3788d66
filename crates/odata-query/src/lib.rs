//! OData catalogue query construction for the Copernicus product archive.
//!
//! This crate builds complete, percent-encoded search queries against the
//! Data Space catalogue for Sentinel-3 ocean products. It covers attribute
//! descriptors and their value types, timestamp normalization, search-area
//! normalization with a whole-world fallback, typed filter fragments, and
//! final query assembly. It performs no I/O; the `catalogue-client` crate
//! executes the queries built here.
//!
//! # Example
//!
//! ```rust
//! use odata_query::{build_search_query, AttributeDescriptor, SearchCriteria, ValueType};
//!
//! let descriptors = vec![AttributeDescriptor::new("productType", ValueType::String)];
//! let criteria = SearchCriteria::new(20);
//!
//! let url = build_search_query("https://catalogue.example/odata/v1", &criteria, &descriptors)?;
//! assert!(url.contains("$top=20"));
//! # Ok::<(), odata_query::QueryError>(())
//! ```

pub mod attributes;
pub mod time;
pub mod geometry;
pub mod filter;
pub mod query;
pub mod errors;

// Re-export commonly used types
pub use attributes::{find_descriptor, AttributeDescriptor, ValueType};
pub use errors::QueryError;
pub use filter::{attribute_filter, CompareOp, FilterFragment, FilterValue};
pub use geometry::{normalize_polygon, AreaOfInterest};
pub use query::{build_search_query, SearchCriteria};
pub use time::normalize_datetime;

/// Fixed archive constants baked into every query.
pub mod archive {
    /// Mission collection scoping every search.
    pub const COLLECTION_NAME: &str = "SENTINEL-3";
    /// OLCI Level-2 water full-resolution product type.
    pub const PRODUCT_TYPE: &str = "OL_2_WFR___";
    /// Vendor namespace prefixing typed attribute segments.
    pub const ODATA_NAMESPACE: &str = "OData.CSC";
    /// Hard server-side cap on the per-request page size.
    pub const PAGE_SIZE_LIMIT: u32 = 1000;
    /// Floor instant for windows with no explicit start.
    pub const EPOCH_FLOOR: &str = "1900-01-01T00:00:00.000Z";
    /// Spatial reference identifier for intersects filters.
    pub const SRID: &str = "4326";
}
