//! Wire types for catalogue search responses.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Acquisition window of a product, the archive's sort key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentDate {
    #[serde(rename = "Start")]
    pub start: String,

    #[serde(rename = "End")]
    pub end: String,
}

/// One catalogue product entry.
///
/// Only the fields the client itself needs are typed. Everything else the
/// archive sends rides along in `extra`, untouched, so callers can inspect
/// archive-specific fields without this crate chasing the server schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRecord {
    #[serde(rename = "Id")]
    pub id: String,

    #[serde(rename = "Name")]
    pub name: String,

    #[serde(rename = "S3Path", default, skip_serializing_if = "Option::is_none")]
    pub s3_path: Option<String>,

    #[serde(rename = "ContentDate", default, skip_serializing_if = "Option::is_none")]
    pub content_date: Option<ContentDate>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One page of a paged catalogue response.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductsPage {
    /// Products on this page, in server order.
    #[serde(rename = "value")]
    pub value: Vec<ProductRecord>,

    /// Continuation link for the next page. Opaque; followed verbatim.
    #[serde(rename = "@odata.nextLink")]
    pub next_link: Option<String>,
}

/// Outcome of a full catalogue search.
#[derive(Debug, Clone)]
pub enum SearchResults {
    /// At least one product matched. Pages are concatenated in arrival
    /// order, which preserves the server-side sort.
    Found(Vec<ProductRecord>),
    /// The first page came back empty.
    NoMatches,
}

impl SearchResults {
    /// True when the search matched nothing.
    pub fn is_empty(&self) -> bool {
        matches!(self, SearchResults::NoMatches)
    }

    /// Matched products, empty for [`SearchResults::NoMatches`].
    pub fn products(&self) -> &[ProductRecord] {
        match self {
            SearchResults::Found(products) => products,
            SearchResults::NoMatches => &[],
        }
    }

    pub fn len(&self) -> usize {
        self.products().len()
    }
}
