//! HTTP fetcher for the configd REST API.

use super::ConfigFetcher;
use crate::core::{ClientIdentity, ConfigSnapshot};
use crate::error::{ClientError, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use reqwest::header::{HeaderMap, HeaderValue};
use std::time::Duration;

/// Header carrying the source identity.
pub const SOURCE_HEADER: &str = "X-Configd-Source";

/// Header carrying the instance identity.
pub const INSTANCE_HEADER: &str = "X-Configd-Instance";

/// Header carrying the configuration password, sent only when one is set.
pub const PASSWORD_HEADER: &str = "X-Configd-Password";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(crate::core::DEFAULT_TIMEOUT_SECS);

/// Fetches configurations from `{base_url}/schemas/{schema_id}/configs/{config_id}`.
///
/// Identity headers are attached to every request. The password header is
/// omitted entirely when the identity has no password.
///
/// # Examples
///
/// ```rust,no_run
/// use configd_client::core::ClientIdentity;
/// use configd_client::sources::HttpFetcher;
/// use std::time::Duration;
///
/// # fn example() -> configd_client::error::Result<()> {
/// let identity = ClientIdentity::new("http://localhost:8080", "billing", "billing-1", None)?;
/// let fetcher = HttpFetcher::new(&identity, Duration::from_secs(5))?;
/// assert_eq!(
///     fetcher.config_url("custom-schema", "dev"),
///     "http://localhost:8080/schemas/custom-schema/configs/dev"
/// );
/// # Ok(())
/// # }
/// ```
pub struct HttpFetcher {
    base_url: String,
    base: Url,
    client: Client,
}

impl HttpFetcher {
    /// Build a fetcher for the given identity.
    ///
    /// No request is made until the first fetch.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The base URL cannot be parsed or cannot carry a path
    /// - An identity value cannot be encoded as a header
    /// - The HTTP client cannot be constructed
    pub fn new(identity: &ClientIdentity, timeout: Duration) -> Result<Self> {
        let base = Url::parse(identity.url()).map_err(|e| ClientError::InvalidUrl {
            url: identity.url().to_string(),
            reason: e.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl {
                url: identity.url().to_string(),
                reason: "url cannot carry a path".to_string(),
            });
        }

        let mut headers = HeaderMap::new();
        headers.insert(SOURCE_HEADER, header_value(SOURCE_HEADER, identity.source())?);
        headers.insert(
            INSTANCE_HEADER,
            header_value(INSTANCE_HEADER, identity.instance())?,
        );
        if let Some(password) = identity.password() {
            let mut value = header_value(PASSWORD_HEADER, password)?;
            value.set_sensitive(true);
            headers.insert(PASSWORD_HEADER, value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Transport {
                url: identity.url().to_string(),
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            base_url: identity.url().trim_end_matches('/').to_string(),
            base,
            client,
        })
    }

    /// The URL a fetch for `(schema_id, config_id)` requests.
    ///
    /// Each id is percent-encoded as a single path segment.
    pub fn config_url(&self, schema_id: &str, config_id: &str) -> String {
        let mut url = self.base.clone();
        // `new` rejects cannot-be-a-base URLs, so segments are always available.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["schemas", schema_id, "configs", config_id]);
        }
        url.into()
    }
}

#[async_trait]
impl ConfigFetcher for HttpFetcher {
    async fn fetch(&self, schema_id: &str, config_id: &str) -> Result<ConfigSnapshot> {
        let url = self.config_url(schema_id, config_id);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ClientError::Transport {
                url: url.clone(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| ClientError::Transport {
            url: url.clone(),
            message: e.to_string(),
        })?;

        Ok(serde_json::from_slice(&body)?)
    }

    fn name(&self) -> String {
        format!("http:{}", self.base_url)
    }
}

fn header_value(name: &'static str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| ClientError::InvalidHeader {
        name,
        reason: e.to_string(),
    })
}
