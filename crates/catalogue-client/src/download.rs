//! Product payload download.
//!
//! One GET per product against the download endpoint, streamed straight
//! to disk so payloads never sit in memory whole. No retry.

use std::path::{Path, PathBuf};

use futures::StreamExt;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::auth::AccessToken;
use crate::client::CatalogueClient;
use crate::error::CatalogueError;
use crate::products::ProductRecord;

impl CatalogueClient {
    /// Download one product payload into `output_dir`.
    ///
    /// The archive serves payloads as zip archives; the file is named
    /// after the product. Returns the path of the written file.
    pub async fn download_product(
        &self,
        product: &ProductRecord,
        token: &AccessToken,
        output_dir: &Path,
    ) -> Result<PathBuf, CatalogueError> {
        fs::create_dir_all(output_dir).await?;

        let url = format!(
            "{}/Products({})/$value",
            self.config.download_url.trim_end_matches('/'),
            product.id
        );
        let path = output_dir.join(format!("{}.zip", product.name));

        debug!(url = %url, path = %path.display(), "Starting product download");

        let response = self
            .http
            .get(&url)
            .bearer_auth(token.secret())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogueError::Download(format!("{url} returned {status}")));
        }

        let mut file = File::create(&path).await?;
        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }

        file.flush().await?;

        info!(
            product = %product.name,
            bytes = written,
            path = %path.display(),
            "Product downloaded"
        );
        Ok(path)
    }
}
