use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{Insights, InsightsBackend, InsightsError};

/// Generative Language `generateContent` backend with a JSON response schema.
pub struct GeminiBackend {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl GeminiBackend {
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>, api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            model: model.into(),
            api_key,
        }
    }

    pub fn request_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }

    pub fn request_body(prompt: &str) -> Value {
        json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": prompt }]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": {
                    "type": "OBJECT",
                    "properties": {
                        "suggestedCaptions": {
                            "type": "ARRAY",
                            "items": { "type": "STRING" },
                            "description": "List of 3 engaging captions."
                        },
                        "suggestedHashtags": {
                            "type": "ARRAY",
                            "items": { "type": "STRING" },
                            "description": "List of 10 trending hashtags."
                        },
                        "viralAnalysis": {
                            "type": "STRING",
                            "description": "Short analysis of viral potential."
                        },
                        "bestTimeToPost": {
                            "type": "STRING",
                            "description": "Best time to post recommendation."
                        }
                    },
                    "required": [
                        "suggestedCaptions",
                        "suggestedHashtags",
                        "viralAnalysis",
                        "bestTimeToPost"
                    ]
                }
            }
        })
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// Pulls the first text part out of a `generateContent` response and decodes it.
pub fn parse_response(body: &str) -> Result<Insights, InsightsError> {
    let response: GenerateResponse = serde_json::from_str(body)?;
    let text = response
        .candidates
        .into_iter()
        .filter_map(|candidate| candidate.content)
        .flat_map(|content| content.parts)
        .filter_map(|part| part.text)
        .find(|text| !text.trim().is_empty())
        .ok_or(InsightsError::EmptyResponse)?;
    Ok(serde_json::from_str(text.trim())?)
}

#[async_trait]
impl InsightsBackend for GeminiBackend {
    async fn generate(&self, prompt: &str) -> Result<Insights, InsightsError> {
        let response = self
            .client
            .post(self.request_url())
            .header("x-goog-api-key", self.api_key.as_str())
            .json(&Self::request_body(prompt))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(InsightsError::Status(response.status().as_u16()));
        }
        let body = response.text().await?;
        parse_response(&body)
    }
}
