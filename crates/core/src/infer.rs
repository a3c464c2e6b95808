use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use crate::format::format_timestamp;
use crate::provider::Provider;
use crate::types::{Chapter, ChapterCandidate, Layout};

const CHAPTERS_SYSTEM_PROMPT: &str =
    "Return strict JSON only with the requested number of chapters.";
const TITLES_SYSTEM_PROMPT: &str =
    "Generate YouTube titles optimized for educational content engagement and SEO.";
const TAGS_SYSTEM_PROMPT: &str = "Generate YouTube hashtags optimized for SEO discovery.";

const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 2000;

#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("inference call timed out")]
    Timeout,

    #[error("API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("no JSON object found in model response")]
    NoJson,

    #[error("failed to parse chapters payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unexpected response shape: {reason}")]
    MalformedResponse { reason: String },

    #[error("model returned an empty result")]
    Empty,

    #[error("inference disabled: no API key configured")]
    Disabled,
}

/// Strategy interface for proposing chapter candidates.
///
/// Implementations either return candidates or a typed failure; the pipeline
/// treats any failure as the signal to switch to the deterministic
/// partitioner. A count mismatch is not a failure here, the snapper enforces
/// the requested count downstream.
#[async_trait]
pub trait ChapterInference: Send + Sync {
    async fn propose(
        &self,
        sample: &str,
        layout: Layout,
    ) -> Result<Vec<ChapterCandidate>, InferenceError>;
}

/// Chapter inference over an OpenAI-compatible chat-completions endpoint.
pub struct ChatCompletionsInference {
    client: reqwest::Client,
    provider: Provider,
    api_key: String,
    max_output_tokens: u32,
}

impl ChatCompletionsInference {
    pub fn new(provider: Provider, api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            provider,
            api_key,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
        }
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }

    async fn chat(
        &self,
        system: &str,
        user: &str,
        max_tokens: u32,
        temperature: f64,
    ) -> Result<String, InferenceError> {
        let config = self.provider.config();
        let response = self
            .client
            .post(config.api_url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&serde_json::json!({
                "model": config.model,
                "messages": [
                    {
                        "role": "system",
                        "content": system,
                    },
                    {
                        "role": "user",
                        "content": user,
                    },
                ],
                "max_tokens": max_tokens,
                "temperature": temperature,
            }))
            .send()
            .await?
            .json::<serde_json::Value>()
            .await?;

        let content = response["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| InferenceError::MalformedResponse {
                reason: format!("missing message content: {:?}", response),
            })?;
        Ok(content.to_string())
    }

    /// Suggest up to five upload titles for the video. Best-effort; callers
    /// fall back to canned titles on failure.
    pub async fn suggest_titles(
        &self,
        sample: &str,
        chapters: &[Chapter],
    ) -> Result<Vec<String>, InferenceError> {
        let prompt = titles_prompt(sample, &render_chapter_lines(chapters));
        let content = self.chat(TITLES_SYSTEM_PROMPT, &prompt, 400, 0.3).await?;

        let titles: Vec<String> = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#') && line.len() > 10)
            .map(strip_leading_number)
            .take(5)
            .collect();
        if titles.is_empty() {
            return Err(InferenceError::Empty);
        }
        Ok(titles)
    }

    /// Suggest a space-separated hashtag line for the video. Best-effort.
    pub async fn suggest_tags(
        &self,
        sample: &str,
        chapters: &[Chapter],
    ) -> Result<String, InferenceError> {
        let prompt = tags_prompt(sample, &render_chapter_lines(chapters));
        let content = self.chat(TAGS_SYSTEM_PROMPT, &prompt, 300, 0.1).await?;

        let tags = content.trim().to_string();
        if tags.is_empty() {
            return Err(InferenceError::Empty);
        }
        Ok(tags)
    }
}

#[async_trait]
impl ChapterInference for ChatCompletionsInference {
    async fn propose(
        &self,
        sample: &str,
        layout: Layout,
    ) -> Result<Vec<ChapterCandidate>, InferenceError> {
        let prompt = match layout {
            Layout::Flat { count } => flat_prompt(sample, count),
            Layout::Structured { questions } => structured_prompt(sample, questions),
        };
        let content = self
            .chat(CHAPTERS_SYSTEM_PROMPT, &prompt, self.max_output_tokens, 0.1)
            .await?;

        let payload = extract_json(&content).ok_or(InferenceError::NoJson)?;
        let parsed: ChaptersPayload = serde_json::from_str(payload)?;
        if parsed.chapters.is_empty() {
            return Err(InferenceError::Empty);
        }

        let requested = layout.total();
        if parsed.chapters.len() != requested {
            warn!(
                requested,
                returned = parsed.chapters.len(),
                "model returned a different chapter count than requested"
            );
        }
        Ok(parsed.chapters)
    }
}

/// Placeholder strategy for runs with no API key configured; every call
/// reports the inference step as unavailable so the pipeline takes the
/// deterministic path.
pub struct DisabledInference;

#[async_trait]
impl ChapterInference for DisabledInference {
    async fn propose(
        &self,
        _sample: &str,
        _layout: Layout,
    ) -> Result<Vec<ChapterCandidate>, InferenceError> {
        Err(InferenceError::Disabled)
    }
}

#[derive(Debug, Deserialize)]
struct ChaptersPayload {
    chapters: Vec<ChapterCandidate>,
}

/// Cut the substring between the first `{` and the last `}`. Models wrap the
/// payload in prose often enough that only this slice is handed to serde.
fn extract_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end >= start).then(|| &text[start..=end])
}

fn render_chapter_lines(chapters: &[Chapter]) -> String {
    chapters
        .iter()
        .map(|ch| format!("{} {}", format_timestamp(ch.time), ch.title))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Drop a `1. `-style ordinal the model may prepend to a suggestion line.
fn strip_leading_number(line: &str) -> String {
    line.strip_prefix(|c: char| c.is_ascii_digit())
        .and_then(|rest| rest.strip_prefix('.'))
        .map(str::trim)
        .unwrap_or(line)
        .to_string()
}

fn flat_prompt(sample: &str, count: usize) -> String {
    format!(
        r#"Analyze this video transcript and create exactly {count} chapters.
Rules:
- Each chapter marks the moment a NEW topic is first introduced
- Timestamps must correspond to when topics are first mentioned, never arbitrary even spacing
- Titles must be 4 words or less
- Output strict JSON only: {{"chapters":[{{"timestamp":"HH:MM:SS","title":"..."}}, ...]}}
- Start with 00:00:00 Introduction

TRANSCRIPT SAMPLE:
{sample}"#
    )
}

fn structured_prompt(sample: &str, questions: usize) -> String {
    let total = questions + 2;
    format!(
        r#"Create YouTube chapters for a video with {questions} questions plus introduction and closing.
Output EXACTLY {total} chapters with this structure:
- 1 Introduction chapter
- {questions} question chapters, each anchored where that topic is first raised (use topic names, not "Q1")
- 1 Closing remarks chapter
Output strict JSON: {{"chapters":[{{"timestamp":"HH:MM:SS","title":"..."}}, ...]}}
Titles must be concise, 4 words or less.
Base timestamps on genuine topic changes in the transcript, never arbitrary even spacing.

TRANSCRIPT SAMPLE:
{sample}"#
    )
}

fn titles_prompt(sample: &str, chapters_text: &str) -> String {
    format!(
        r#"Analyze this video content and generate 5 high-performing YouTube titles optimized for maximum views and SEO.

CHAPTERS:
{chapters_text}

TRANSCRIPT SAMPLE:
{sample}

Create titles that:
1. List the main topics covered, separated by commas
2. Include at least 5 specific topics from the chapters
3. Keep total length under 100 characters
4. Make topics sound comprehensive and high-yield

Output exactly 5 titles, one per line:"#
    )
}

fn tags_prompt(sample: &str, chapters_text: &str) -> String {
    format!(
        r#"Analyze this video content and generate 15-20 optimized YouTube tags for maximum SEO discovery.

CHAPTERS:
{chapters_text}

TRANSCRIPT SAMPLE:
{sample}

Generate hashtags that are:
1. Highly relevant to the content
2. A mix of broad and specific terms
3. Optimized for search discovery

Output format: #tag1 #tag2 #tag3 (space-separated hashtags)"#
    )
}
