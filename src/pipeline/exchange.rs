//! Model exchange: the chat-completions wire format and one round trip.
//!
//! This module is intentionally thin — prompt text lives in
//! [`crate::prompts`] and orchestration of the two round trips lives in
//! [`crate::analyze`], so the wire types and error mapping here can change
//! without touching either.
//!
//! The provider is a black box: we serialize a request, post it with a
//! bearer token, and consume exactly three things from the reply — the
//! message content, the opaque `reasoning_details` value, and the optional
//! `usage` token counts. Nothing is retried here; a failed round trip
//! surfaces once, tagged with its [`Stage`].

use crate::config::AnalysisConfig;
use crate::error::{InsightError, Stage};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// One message in the conversation, as the chat-completions API expects it.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
    /// Replayed verbatim on the assistant message of the refine call; never
    /// parsed, only carried.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning_details: Option<Value>,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system",
            content: content.into(),
            reasoning_details: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: content.into(),
            reasoning_details: None,
        }
    }

    pub fn assistant(content: impl Into<String>, reasoning_details: Option<Value>) -> Self {
        Self {
            role: "assistant",
            content: content.into(),
            reasoning_details,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    /// Present (enabled) only on the draft round trip.
    #[serde(skip_serializing_if = "Option::is_none")]
    reasoning: Option<ReasoningFlag>,
    max_output_tokens: usize,
}

#[derive(Debug, Serialize)]
struct ReasoningFlag {
    enabled: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ResponseMessage,
}

/// The slice of the provider reply the pipeline consumes.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub reasoning_details: Option<Value>,
}

/// Token accounting from the provider; absent fields count as zero.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
}

/// Result of one round trip.
#[derive(Debug)]
pub struct RoundTrip {
    pub message: ResponseMessage,
    pub usage: Usage,
}

/// Execute one round trip against the configured endpoint.
///
/// # Errors
/// - [`InsightError::Transport`] — request failed or the body was not the
///   expected shape.
/// - [`InsightError::Status`] — non-success HTTP status.
/// - [`InsightError::EmptyResponse`] — a success reply with no choices.
pub async fn send(
    client: &reqwest::Client,
    config: &AnalysisConfig,
    api_key: &str,
    messages: &[ChatMessage],
    stage: Stage,
) -> Result<RoundTrip, InsightError> {
    let request = ChatRequest {
        model: &config.model,
        messages,
        reasoning: (stage == Stage::Draft).then_some(ReasoningFlag { enabled: true }),
        max_output_tokens: config.max_output_tokens,
    };

    debug!("{stage} round trip: {} messages", messages.len());

    let response = client
        .post(&config.api_url)
        .bearer_auth(api_key)
        .json(&request)
        .send()
        .await
        .map_err(|e| InsightError::Transport {
            stage,
            reason: e.to_string(),
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(InsightError::Status {
            stage,
            status: status.as_u16(),
        });
    }

    let body: ChatResponse = response.json().await.map_err(|e| InsightError::Transport {
        stage,
        reason: format!("malformed response body: {e}"),
    })?;

    let choice = body
        .choices
        .into_iter()
        .next()
        .ok_or(InsightError::EmptyResponse { stage })?;

    Ok(RoundTrip {
        message: choice.message,
        usage: body.usage.unwrap_or_default(),
    })
}

/// Normalize the opaque reasoning trace to a displayable string.
///
/// A string passes through unchanged; any other non-null value is
/// pretty-printed; null or absent yields no trace. The trace is displayed,
/// never parsed.
pub fn normalize_reasoning(details: Option<&Value>) -> Option<String> {
    match details {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => Some(
            serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
        ),
    }
}
