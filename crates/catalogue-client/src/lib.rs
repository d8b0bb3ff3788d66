//! Async client for a Copernicus-style product archive.
//!
//! Talks to the three endpoints the archive exposes: the catalogue (OData
//! attribute listing and paged product search), the identity service
//! (password-grant token exchange), and the download service (product
//! payloads). Query construction lives in the `odata-query` crate; this
//! crate owns everything that touches the network.
//!
//! # Example
//!
//! ```no_run
//! use catalogue_client::{CatalogueClient, SearchResults};
//! use odata_query::SearchCriteria;
//!
//! # async fn run() -> Result<(), catalogue_client::CatalogueError> {
//! let client = CatalogueClient::with_defaults()?;
//!
//! let mut criteria = SearchCriteria::new(20);
//! criteria.start = Some("2022-07-01".to_string());
//! criteria.end = Some("2022-07-02".to_string());
//!
//! match client.fetch_all(&criteria).await? {
//!     SearchResults::Found(products) => {
//!         for product in &products {
//!             println!("{}", product.name);
//!         }
//!     }
//!     SearchResults::NoMatches => println!("nothing matched"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod attributes;
pub mod auth;
pub mod client;
pub mod download;
pub mod error;
pub mod products;
pub mod search;

pub use attributes::{reset_attribute_cache, SharedDescriptors};
pub use auth::AccessToken;
pub use client::{CatalogueClient, ClientConfig};
pub use error::CatalogueError;
pub use products::{ContentDate, ProductRecord, ProductsPage, SearchResults};
