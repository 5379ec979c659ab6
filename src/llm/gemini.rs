//! Gemini `generateContent` backend

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use super::{NarrativeBackend, NarrativeError, NarrativeOutcome};
use crate::config::NarrativeConfig;

/// Instruction sent with every request.
const SYSTEM_INSTRUCTION: &str = "You are a specialized clinical assistant for Diabetic Peripheral \
Neuropathy (DPN) monitoring. Provide a concise, single-paragraph risk assessment (under 40 words) \
and a recommended action for the clinician based ONLY on the data provided.";

#[derive(Clone)]
pub struct GeminiBackend {
    http: reqwest::Client,
    url: String,
    api_key: String,
}

impl GeminiBackend {
    pub fn new(cfg: &NarrativeConfig, api_key: String) -> Result<Self, NarrativeError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            url: format!(
                "{}/models/{}:generateContent",
                cfg.endpoint.trim_end_matches('/'),
                cfg.model
            ),
            api_key,
        })
    }

    async fn request(&self, prompt: &str) -> Result<String, NarrativeError> {
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "systemInstruction": { "parts": [{ "text": SYSTEM_INSTRUCTION }] },
        });

        let resp = self
            .http
            .post(&self.url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(NarrativeError::Status(resp.status()));
        }

        let parsed: GenerateContentResponse = resp.json().await?;
        parsed.first_text().ok_or(NarrativeError::EmptyCandidate)
    }
}

#[async_trait]
impl NarrativeBackend for GeminiBackend {
    async fn generate(&self, prompt: &str) -> NarrativeOutcome {
        match self.request(prompt).await {
            Ok(text) => NarrativeOutcome::Success(text),
            Err(e) => {
                tracing::warn!(error = %e, "Narrative request failed");
                e.outcome()
            }
        }
    }

    fn backend_name(&self) -> &'static str {
        "gemini"
    }
}

// Only the fields we read.
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
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

impl GenerateContentResponse {
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
            .filter(|t| !t.trim().is_empty())
    }
}
