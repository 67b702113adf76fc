pub mod config;
pub mod dashboard;
pub mod display;
pub mod download;
pub mod error;
pub mod fetch;
pub mod insights;

pub use config::{
    load_or_default, load_tiksave_config, DownloadSection, InsightsSection, ProviderSection,
    TiksaveConfig,
};
pub use dashboard::DashboardState;
pub use display::{
    compact_count, display_date, download_links, engagement_rate, format_engagement, MediaKind,
    MediaLink,
};
pub use download::{DownloadError, DownloadedFile, MediaDownloader, MediaSelection};
pub use error::{ConfigError, Result};
pub use fetch::{
    FetchClient, FetchError, FetchResult, HttpTransport, ProviderEnvelope, ProviderReply,
    ProviderTransport, TransportResponse, VideoRecord,
};
pub use insights::{build_prompt, GeminiBackend, Insights, InsightsBackend, InsightsClient};
