//! Access token exchange with the archive identity endpoint.
//!
//! Catalogue searches are anonymous; only payload downloads need a token.
//! The archive uses the OAuth password grant with a fixed public client
//! id. Tokens are short-lived and this client does not refresh them; a
//! run that outlives its token fails the affected download and stops.

use serde::Deserialize;
use tracing::debug;

use crate::client::CatalogueClient;
use crate::error::CatalogueError;

/// OAuth client id the archive assigns to public clients.
const CLIENT_ID: &str = "cdse-public";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// A bearer token for download requests.
///
/// Deliberately opaque; `Debug` does not print the secret.
#[derive(Clone)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(..)")
    }
}

impl CatalogueClient {
    /// Exchange archive credentials for an access token.
    pub async fn fetch_token(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AccessToken, CatalogueError> {
        debug!(url = %self.config.token_url, "Requesting access token");

        let params = [
            ("grant_type", "password"),
            ("username", username),
            ("password", password),
            ("client_id", CLIENT_ID),
        ];

        let response = self
            .http
            .post(&self.config.token_url)
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogueError::Auth(format!(
                "identity endpoint returned {status}"
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| CatalogueError::Auth(e.to_string()))?;

        Ok(AccessToken(token.access_token))
    }
}
