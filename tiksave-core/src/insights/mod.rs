pub mod gemini;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::config::InsightsSection;
use crate::fetch::VideoRecord;

pub use gemini::GeminiBackend;

#[derive(Debug, Error)]
pub enum InsightsError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("model returned no analysis")]
    EmptyResponse,
}

/// Caption and hashtag suggestions for a fetched post.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Insights {
    #[serde(rename = "suggestedCaptions")]
    pub captions: Vec<String>,
    #[serde(rename = "suggestedHashtags")]
    pub hashtags: Vec<String>,
    #[serde(rename = "viralAnalysis")]
    pub analysis: String,
    #[serde(rename = "bestTimeToPost")]
    pub best_posting_time: String,
}

impl Insights {
    /// Returned without touching the network when no API key is configured.
    pub fn missing_key() -> Self {
        Self {
            captions: vec!["API Key Missing".into(), "Check configuration".into()],
            hashtags: vec!["#error".into(), "#setup".into()],
            analysis: "Please configure your API_KEY to enable AI insights.".into(),
            best_posting_time: "N/A".into(),
        }
    }

    /// Returned when the model call fails for any reason.
    pub fn unavailable() -> Self {
        Self {
            captions: vec![
                "Check this out!".into(),
                "TikTok Viral".into(),
                "Trending now".into(),
            ],
            hashtags: vec!["#fyp".into(), "#tiktok".into(), "#viral".into()],
            analysis: "Could not generate analysis at this time. Please try again later.".into(),
            best_posting_time: "Evenings usually work best!".into(),
        }
    }
}

#[async_trait]
pub trait InsightsBackend: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<Insights, InsightsError>;
}

pub fn build_prompt(record: &VideoRecord) -> String {
    let kind = if record.is_slideshow() {
        "Photo Slideshow"
    } else {
        "Video"
    };
    format!(
        "Analyze this TikTok video's metadata and provide viral insights.\n\
         Title/Caption: {caption}\n\
         Author: {name} (@{handle})\n\
         Stats: {likes} likes, {comments} comments, {shares} shares.\n\
         Duration: {duration}s\n\
         Music: {music} by {music_author}\n\
         Type: {kind}\n\
         \n\
         Please provide:\n\
         1. 3 highly engaging \"viral\" caption alternatives (short, punchy).\n\
         2. A list of 10 trending hashtags specific to this content's niche.\n\
         3. A brief analysis of why this content works or how to improve it.\n\
         4. Best time to post a similar video (generic advice based on niche).\n",
        caption = record.caption,
        name = record.author.display_name,
        handle = record.author.handle,
        likes = record.stats.like_count,
        comments = record.stats.comment_count,
        shares = record.stats.share_count,
        duration = record.duration_seconds,
        music = record.audio_info.title,
        music_author = record.audio_info.author,
    )
}

/// Never fails: every error path resolves to a static [`Insights`] value.
pub struct InsightsClient {
    backend: Option<Arc<dyn InsightsBackend>>,
    deadline: Duration,
}

impl InsightsClient {
    pub fn new(backend: Arc<dyn InsightsBackend>, deadline: Duration) -> Self {
        Self {
            backend: Some(backend),
            deadline,
        }
    }

    /// A client with no credential; `summarize` returns [`Insights::missing_key`].
    pub fn without_credentials() -> Self {
        Self {
            backend: None,
            deadline: Duration::ZERO,
        }
    }

    pub fn from_config(section: &InsightsSection) -> Self {
        match section.resolve_api_key() {
            Some(key) => {
                let backend = GeminiBackend::new(&section.endpoint, &section.model, key);
                Self::new(Arc::new(backend), section.timeout())
            }
            None => Self::without_credentials(),
        }
    }

    pub fn has_credentials(&self) -> bool {
        self.backend.is_some()
    }

    pub async fn summarize(&self, record: &VideoRecord) -> Insights {
        let Some(backend) = &self.backend else {
            warn!(target: "insights", "api key is missing, returning placeholder insights");
            return Insights::missing_key();
        };

        let prompt = build_prompt(record);
        debug!(target: "insights", id = %record.id, "requesting insights");
        match timeout(self.deadline, backend.generate(&prompt)).await {
            Ok(Ok(insights)) => insights,
            Ok(Err(err)) => {
                warn!(target: "insights", "backend error: {err}");
                Insights::unavailable()
            }
            Err(_) => {
                warn!(target: "insights", "timeout after {:?}", self.deadline);
                Insights::unavailable()
            }
        }
    }
}
