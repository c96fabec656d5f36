//! Prompt text for the two-round-trip exchange.
//!
//! Centralising every prompt here keeps a single source of truth for the
//! JSON schema the model is asked to emit, and lets unit tests inspect the
//! prompts without a live model. Callers can override the system prompt via
//! [`crate::config::AnalysisConfig::system_prompt`]; the constants here are
//! used only when no override is provided.

use crate::error::InsightError;
use crate::pipeline::bundle::ContextBundle;

/// Default system instruction for the draft round trip.
///
/// The field names given here are the ones the coercer resolves first; the
/// alias table in [`crate::pipeline::coerce`] covers the spellings models
/// drift into anyway.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are InsightHub, a terse research editor. \
Read the source and reply with JSON shaped as \
{summary, key_phrases[], quotes[], related[{title,type,url,note}], \
knowledge_card:{title,bullets[],source_hint}, primary_view}. \
Maximum facts, minimum filler.";

/// Instruction appended as the final user message of the refine round trip.
pub const REFINE_INSTRUCTION: &str =
    "Rewrite your previous reply as strict JSON for InsightHub. No text outside the JSON.";

/// Build the user message carrying the serialized context bundle.
pub fn bundle_message(bundle: &ContextBundle) -> Result<String, InsightError> {
    let json = serde_json::to_string(bundle)
        .map_err(|e| InsightError::Internal(format!("bundle serialization: {e}")))?;
    Ok(format!("Document: {json}"))
}
