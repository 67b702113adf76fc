pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::FetchClient;
pub use error::{FetchError, FetchResult, PROVIDER_FALLBACK_MESSAGE};
pub use models::{
    AudioInfo, AuthorProfile, EngagementStats, ProviderEnvelope, ProviderReply, VideoRecord,
    STATUS_INVALID, STATUS_OK,
};
pub use transport::{HttpTransport, ProviderTransport, TransportResponse};
