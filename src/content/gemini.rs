//! Gemini-backed content generator and answer oracle
//!
//! Talks to the `generateContent` REST endpoint. `ureq` is blocking, so
//! every request runs on a `spawn_blocking` thread.

use std::time::Duration;

use anyhow::{Context, anyhow};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use super::prompts::{challenge_prompt, judge_prompt, riddle_prompt};
use super::{AnswerOracle, ContentGenerator};
use crate::config::GeneratorSettings;
use crate::domain::{Difficulty, PuzzleContent, PuzzleKind, TopicId};
use crate::error::{ProgressionError, Result};
use crate::progression::Verdict;

/// Markdown code fence wrapped around a JSON reply
static CODE_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```(?:json|JSON)?\s*(.*?)\s*```").expect("valid fence regex")
});

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// Client for the Gemini API
#[derive(Clone)]
pub struct GeminiClient {
    base_url: String,
    model: String,
    api_key: Option<String>,
    agent: ureq::Agent,
}

impl GeminiClient {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(10))
            .timeout_read(timeout)
            .build();

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key,
            agent,
        }
    }

    /// Build from settings, reading the API key from the configured env var
    pub fn from_settings(settings: &GeneratorSettings) -> Self {
        let api_key = std::env::var(&settings.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty());
        if api_key.is_none() {
            warn!(
                "{} is not set; puzzle generation and judging will fail",
                settings.api_key_env
            );
        }
        Self::new(
            settings.base_url.clone(),
            settings.model.clone(),
            api_key,
            Duration::from_secs(settings.timeout_secs),
        )
    }

    /// Send one prompt and return the first text part of the reply
    fn generate_text(&self, prompt: &str) -> anyhow::Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow!("no Gemini API key configured"))?;
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let response: GenerateResponse = self
            .agent
            .post(&url)
            .query("key", api_key)
            .send_json(json!({
                "contents": [{ "parts": [{ "text": prompt }] }]
            }))
            .context("Failed to reach Gemini")?
            .into_json()
            .context("Failed to parse Gemini response")?;

        first_text(response).ok_or_else(|| anyhow!("Gemini reply contained no text"))
    }

    async fn complete(&self, prompt: String) -> anyhow::Result<String> {
        let client = self.clone();
        tokio::task::spawn_blocking(move || client.generate_text(&prompt))
            .await
            .context("Gemini request task failed")?
    }
}

fn first_text(response: GenerateResponse) -> Option<String> {
    response
        .candidates
        .into_iter()
        .filter_map(|c| c.content)
        .flat_map(|c| c.parts)
        .find_map(|p| p.text)
}

/// Pull the JSON object out of a model reply
pub(crate) fn extract_json(text: &str) -> &str {
    if let Some(inner) = CODE_FENCE.captures(text).and_then(|c| c.get(1)) {
        return inner.as_str();
    }
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => text.trim(),
    }
}

/// Anything other than a bare "correct" counts as incorrect
pub(crate) fn parse_verdict(text: &str) -> Verdict {
    let word = text
        .trim()
        .trim_matches(|c: char| c == '"' || c == '\'' || c == '.' || c.is_whitespace())
        .to_lowercase();
    if word == "correct" {
        Verdict::Correct
    } else {
        Verdict::Incorrect
    }
}

#[async_trait]
impl ContentGenerator for GeminiClient {
    async fn generate_puzzle(
        &self,
        kind: PuzzleKind,
        tier: Difficulty,
        topic: Option<TopicId>,
    ) -> Result<PuzzleContent> {
        let (prompt, primary) = match kind {
            PuzzleKind::Riddle => {
                let topic = topic.unwrap_or_else(TopicId::random);
                (riddle_prompt(tier, topic), Some(topic))
            }
            PuzzleKind::Challenge => (challenge_prompt(tier, topic), topic),
        };
        debug!(%kind, %tier, ?primary, "Requesting puzzle from Gemini");

        let text = self.complete(prompt).await.map_err(|e| {
            warn!("Puzzle generation failed: {:#}", e);
            ProgressionError::ContentUnavailable(format!("{:#}", e))
        })?;

        PuzzleContent::from_generator_json(kind, extract_json(&text), primary)
    }
}

#[async_trait]
impl AnswerOracle for GeminiClient {
    async fn judge(
        &self,
        question: &str,
        reference_solution: &str,
        answer: &str,
    ) -> Result<Verdict> {
        let prompt = judge_prompt(question, reference_solution, answer);
        let text = self.complete(prompt).await.map_err(|e| {
            warn!("Answer judging failed: {:#}", e);
            ProgressionError::OracleUnavailable(format!("{:#}", e))
        })?;
        Ok(parse_verdict(&text))
    }
}
