use std::sync::Arc;
use std::time::Duration;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use tokio::time::timeout;
use tracing::{debug, warn};
use url::Url;

use crate::config::ProviderSection;

use super::error::{FetchError, FetchResult};
use super::models::{ProviderEnvelope, ProviderReply, VideoRecord};
use super::transport::{HttpTransport, ProviderTransport};

/// Characters left as-is by JavaScript's `encodeURIComponent`.
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Resolves a post link into a [`VideoRecord`] through the provider API.
///
/// The client holds no mutable state: every call owns its own timeout, so
/// concurrent fetches never observe each other.
pub struct FetchClient {
    transport: Arc<dyn ProviderTransport>,
    base_url: Url,
    timeout: Duration,
}

impl FetchClient {
    pub fn new(transport: Arc<dyn ProviderTransport>, base_url: Url, timeout: Duration) -> Self {
        Self {
            transport,
            base_url,
            timeout,
        }
    }

    pub fn from_config(section: &ProviderSection) -> FetchResult<Self> {
        let base_url = Url::parse(&section.base_url)
            .map_err(|err| FetchError::Setup(format!("invalid provider url: {err}")))?;
        let transport = HttpTransport::from_config(section)?;
        Ok(Self::new(Arc::new(transport), base_url, section.timeout()))
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Appends `url=<link>` to the provider endpoint, keeping any existing query.
    pub fn build_request_url(&self, link: &str) -> Url {
        let encoded = utf8_percent_encode(link, QUERY_COMPONENT).to_string();
        let mut url = self.base_url.clone();
        let query = match url.query().filter(|query| !query.is_empty()) {
            Some(existing) => format!("{existing}&url={encoded}"),
            None => format!("url={encoded}"),
        };
        url.set_query(Some(&query));
        url
    }

    pub async fn fetch(&self, link: &str) -> FetchResult<VideoRecord> {
        let link = link.trim();
        if link.is_empty() {
            return Err(FetchError::EmptyInput);
        }

        let url = self.build_request_url(link);
        debug!(target: "fetch", %url, "requesting provider");

        // Dropping the pending request on expiry is what aborts it.
        let response = match timeout(self.timeout, self.transport.get(&url)).await {
            Ok(result) => result.map_err(|err| {
                warn!(target: "fetch", kind = err.kind(), "transport failed: {err}");
                err
            })?,
            Err(_) => {
                warn!(target: "fetch", "provider timed out after {:?}", self.timeout);
                return Err(FetchError::Timeout {
                    after: self.timeout,
                });
            }
        };

        if !response.is_success() {
            warn!(target: "fetch", status = response.status, "provider returned error status");
            return Err(FetchError::Transport {
                status: response.status,
            });
        }

        let envelope: ProviderEnvelope = serde_json::from_slice(&response.body).map_err(|err| {
            warn!(target: "fetch", "unparsable provider body: {err}");
            FetchError::malformed(err.to_string())
        })?;

        match envelope.into_reply()? {
            ProviderReply::Success(record) => {
                debug!(target: "fetch", id = %record.id, slideshow = record.is_slideshow(), "fetched record");
                Ok(record)
            }
            ProviderReply::Invalid { message } => {
                warn!(target: "fetch", "provider rejected link: {message}");
                Err(FetchError::InvalidOrPrivate)
            }
            ProviderReply::Failed { code, message } => {
                warn!(target: "fetch", code, "provider failure: {message}");
                Err(FetchError::provider(code, message))
            }
        }
    }
}
