//! Top-level analysis entry point.
//!
//! One call to [`analyze`] runs the full request-scoped pipeline:
//! precondition checks, bundle assembly (with budget clamping), the two
//! model round trips, and response coercion. Every request constructs its
//! own bundle and record from scratch — there is no shared mutable state,
//! no automatic retry, and no rollback; a request that fails at the second
//! round trip simply reports that failure and the caller may resubmit.
//!
//! Concurrent submission is the caller's concern: the library does not
//! deduplicate or merge overlapping requests (a UI gates on an in-flight
//! flag; the CLI is single-shot).

use crate::config::AnalysisConfig;
use crate::error::{InsightError, Stage};
use crate::insight::{AnalysisOutput, AnalysisStats};
use crate::pipeline::bundle::{ContextBundle, Source};
use crate::pipeline::coerce;
use crate::pipeline::exchange::{self, ChatMessage};
use crate::prompts;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Environment variable consulted when no explicit API key is configured.
pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";

/// Analyze one source: bundle it, run the two-round-trip exchange, and
/// coerce the reply into a typed [`crate::insight::Insight`].
///
/// # Errors
/// Any [`InsightError`] variant except `CorruptDocument` (extraction happens
/// before this call, via [`crate::pipeline::extract::extract_insights`]).
/// Precondition failures (`MissingSource`, `MissingCredential`) are raised
/// before any network activity.
pub async fn analyze(
    source: &Source,
    config: &AnalysisConfig,
) -> Result<AnalysisOutput, InsightError> {
    let total_start = Instant::now();

    // ── Preconditions: credential and source, before any network I/O ────
    let api_key = resolve_api_key(config)?;
    let bundle = ContextBundle::from_source(source, config)?;
    info!("analyzing {}", source.describe());

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.api_timeout_secs))
        .build()
        .map_err(|e| InsightError::Internal(format!("HTTP client: {e}")))?;

    let system_prompt = config
        .system_prompt
        .as_deref()
        .unwrap_or(prompts::DEFAULT_SYSTEM_PROMPT);

    let mut messages = vec![
        ChatMessage::system(system_prompt),
        ChatMessage::user(prompts::bundle_message(&bundle)?),
    ];

    // ── Round trip 1: reasoning-enabled draft ───────────────────────────
    let draft_start = Instant::now();
    let draft = exchange::send(&client, config, &api_key, &messages, Stage::Draft).await?;
    let draft_ms = draft_start.elapsed().as_millis() as u64;

    let reasoning = exchange::normalize_reasoning(draft.message.reasoning_details.as_ref());
    debug!(
        "draft done in {draft_ms}ms, reasoning trace: {}",
        if reasoning.is_some() { "present" } else { "absent" }
    );

    // ── Round trip 2: same conversation + strict-JSON instruction ───────
    messages.push(ChatMessage::assistant(
        draft.message.content.clone().unwrap_or_default(),
        draft.message.reasoning_details.clone(),
    ));
    messages.push(ChatMessage::user(prompts::REFINE_INSTRUCTION));

    let refine_start = Instant::now();
    let refine = exchange::send(&client, config, &api_key, &messages, Stage::Refine).await?;
    let refine_ms = refine_start.elapsed().as_millis() as u64;

    let content = refine
        .message
        .content
        .filter(|c| !c.trim().is_empty())
        .ok_or(InsightError::EmptyResponse {
            stage: Stage::Refine,
        })?;

    // ── Coerce the reply into the typed record ──────────────────────────
    let insight = coerce::coerce(&content)?;

    let stats = AnalysisStats {
        draft_ms,
        refine_ms,
        total_ms: total_start.elapsed().as_millis() as u64,
        prompt_tokens: draft.usage.prompt_tokens + refine.usage.prompt_tokens,
        completion_tokens: draft.usage.completion_tokens + refine.usage.completion_tokens,
    };

    info!(
        "analysis complete in {}ms ({} prompt / {} completion tokens)",
        stats.total_ms, stats.prompt_tokens, stats.completion_tokens
    );

    Ok(AnalysisOutput {
        insight,
        reasoning,
        stats,
    })
}

/// Resolve the API key: explicit config value first, then the environment.
///
/// Blank values count as absent so an empty `OPENROUTER_API_KEY=` export
/// does not masquerade as a credential.
fn resolve_api_key(config: &AnalysisConfig) -> Result<String, InsightError> {
    if let Some(key) = config.api_key.as_deref() {
        if !key.trim().is_empty() {
            return Ok(key.to_string());
        }
    }
    match std::env::var(API_KEY_ENV) {
        Ok(key) if !key.trim().is_empty() => Ok(key),
        _ => Err(InsightError::MissingCredential),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_api_key_wins() {
        let config = AnalysisConfig::builder().api_key("sk-explicit").build().unwrap();
        assert_eq!(resolve_api_key(&config).unwrap(), "sk-explicit");
    }

    #[test]
    fn blank_explicit_key_is_absent() {
        // Blank config key + (presumably) no env var in the test environment.
        let config = AnalysisConfig::builder().api_key("   ").build().unwrap();
        if std::env::var(API_KEY_ENV).is_err() {
            assert!(matches!(
                resolve_api_key(&config),
                Err(InsightError::MissingCredential)
            ));
        }
    }

    #[tokio::test]
    async fn missing_source_raised_before_any_request() {
        // An unreachable api_url proves no network is attempted: the source
        // precondition must fail first.
        let config = AnalysisConfig::builder()
            .api_key("sk-test")
            .api_url("http://127.0.0.1:1/v1/chat/completions")
            .build()
            .unwrap();
        let err = analyze(&Source::Notes("   ".into()), &config)
            .await
            .unwrap_err();
        assert!(matches!(err, InsightError::MissingSource));
    }

    #[tokio::test]
    async fn transport_error_names_draft_stage() {
        // Nothing listens on port 1; the draft round trip must fail with a
        // transport error tagged as such.
        let config = AnalysisConfig::builder()
            .api_key("sk-test")
            .api_url("http://127.0.0.1:1/v1/chat/completions")
            .api_timeout_secs(2)
            .build()
            .unwrap();
        let err = analyze(&Source::Notes("some notes".into()), &config)
            .await
            .unwrap_err();
        match err {
            InsightError::Transport { stage, .. } => assert_eq!(stage, Stage::Draft),
            other => panic!("expected Transport, got {other}"),
        }
    }
}
