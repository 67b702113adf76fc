use async_trait::async_trait;
use bytes::Bytes;
use url::Url;

use crate::config::ProviderSection;

use super::error::{FetchError, FetchResult};

#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Bytes,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// One HTTP GET against the provider.
///
/// Implementations must not retry; dropping the returned future aborts the request.
#[async_trait]
pub trait ProviderTransport: Send + Sync {
    async fn get(&self, url: &Url) -> FetchResult<TransportResponse>;
}

pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub fn from_config(section: &ProviderSection) -> FetchResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(agent) = section.user_agent.as_deref() {
            builder = builder.user_agent(agent);
        }
        let client = builder
            .build()
            .map_err(|err| FetchError::Setup(err.to_string()))?;
        Ok(Self::new(client))
    }
}

#[async_trait]
impl ProviderTransport for HttpTransport {
    async fn get(&self, url: &Url) -> FetchResult<TransportResponse> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        Ok(TransportResponse { status, body })
    }
}
