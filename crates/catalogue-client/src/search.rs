//! Paginated product retrieval.
//!
//! One request per page, strictly sequential: a continuation link is only
//! meaningful relative to the response that carried it, so pages are never
//! fetched concurrently or out of order. Failures propagate immediately
//! without retry; callers own retry policy.

use odata_query::{build_search_query, SearchCriteria};
use tracing::{debug, info};

use crate::client::CatalogueClient;
use crate::error::CatalogueError;
use crate::products::{ProductsPage, SearchResults};

impl CatalogueClient {
    /// Run a catalogue search and collect every matching product.
    ///
    /// Builds the filter expression from `criteria` against the cached
    /// attribute catalogue, fetches the first page, and follows
    /// continuation links when the caller asked for more than one page's
    /// worth of results. An empty first page yields
    /// [`SearchResults::NoMatches`] with no follow-up request, even if the
    /// server attached a continuation link to it.
    pub async fn fetch_all(
        &self,
        criteria: &SearchCriteria,
    ) -> Result<SearchResults, CatalogueError> {
        let descriptors = self.attributes().await?;
        let url = build_search_query(&self.config.catalogue_url, criteria, &descriptors)?;
        let iterate_pages = criteria.iterate_pages();

        debug!(url = %url, iterate_pages, "Issuing catalogue search");

        let first = self.fetch_page(&url).await?;
        if first.value.is_empty() {
            info!("Catalogue search matched nothing");
            return Ok(SearchResults::NoMatches);
        }

        let mut products = first.value;
        let mut next_link = first.next_link;

        if iterate_pages {
            while let Some(link) = next_link {
                debug!(url = %link, collected = products.len(), "Following continuation link");
                let page = self.fetch_page(&link).await?;
                products.extend(page.value);
                next_link = page.next_link;
            }
        }

        info!(count = products.len(), "Catalogue search complete");
        Ok(SearchResults::Found(products))
    }

    /// Fetch and parse a single result page.
    async fn fetch_page(&self, url: &str) -> Result<ProductsPage, CatalogueError> {
        let response = self.http.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogueError::UnexpectedStatus {
                status,
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        let page: ProductsPage = serde_json::from_str(&body)?;
        Ok(page)
    }
}
