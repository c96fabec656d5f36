//! Error types for the insighthub library.
//!
//! Every failure a caller can see is a variant of [`InsightError`] — a single
//! human-readable status per failed analysis, surfaced once and recoverable by
//! resubmission. Nothing here is retried automatically.
//!
//! Two classes of failure never appear in this enum at all: per-page text
//! extraction errors and outline/metadata lookup errors. Those are swallowed
//! inside [`crate::pipeline::extract`] (logged at WARN) because one malformed
//! page must degrade output quality, not abort the document.

use std::fmt;
use thiserror::Error;

/// Which of the two model round trips an error belongs to.
///
/// The exchange always runs the same two calls in order: a draft call with
/// reasoning enabled, then a refine call asking for strict JSON. Transport
/// errors name the stage so a user can tell "the provider is down" apart from
/// "the provider rejected the follow-up".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// First round trip: reasoning-enabled draft.
    Draft,
    /// Second round trip: strict-JSON refinement.
    Refine,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Draft => write!(f, "draft"),
            Stage::Refine => write!(f, "refine"),
        }
    }
}

/// All errors returned by the insighthub library.
#[derive(Debug, Error)]
pub enum InsightError {
    // ── Precondition errors ───────────────────────────────────────────────
    /// No populated source at submission time. Checked before any network
    /// activity.
    #[error("No source to analyze. Provide a PDF, a URL, or some notes.")]
    MissingSource,

    /// No API key resolvable from config or environment. Checked before any
    /// request is sent.
    #[error("No API key configured.\nSet OPENROUTER_API_KEY or pass a key explicitly.")]
    MissingCredential,

    // ── Model exchange errors ─────────────────────────────────────────────
    /// The HTTP request for one of the round trips failed outright
    /// (connection refused, timeout, malformed response body).
    #[error("Model call failed during the {stage} round trip: {reason}")]
    Transport { stage: Stage, reason: String },

    /// A round trip completed but the provider answered with a non-success
    /// HTTP status.
    #[error("Model returned HTTP {status} during the {stage} round trip")]
    Status { stage: Stage, status: u16 },

    /// A round trip succeeded but carried no usable message.
    #[error("Model returned an empty reply during the {stage} round trip")]
    EmptyResponse { stage: Stage },

    /// The response coercer could not recover any JSON object from the
    /// model's final reply.
    #[error("Model returned invalid JSON: {0}")]
    Decode(String),

    // ── Document errors ───────────────────────────────────────────────────
    /// pdfium could not open the document at all (corrupt or not a PDF).
    /// Per-page failures are NOT reported here; they are swallowed.
    #[error("Could not parse the PDF: {detail}\nTry a different file.")]
    CorruptDocument { detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_names_the_stage() {
        let e = InsightError::Transport {
            stage: Stage::Draft,
            reason: "connection reset".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("draft"), "got: {msg}");
        assert!(msg.contains("connection reset"));
    }

    #[test]
    fn status_distinguishes_refine_call() {
        let e = InsightError::Status {
            stage: Stage::Refine,
            status: 429,
        };
        let msg = e.to_string();
        assert!(msg.contains("refine"));
        assert!(msg.contains("429"));
    }

    #[test]
    fn missing_credential_mentions_env_var() {
        let msg = InsightError::MissingCredential.to_string();
        assert!(msg.contains("OPENROUTER_API_KEY"));
    }

    #[test]
    fn corrupt_document_carries_detail() {
        let e = InsightError::CorruptDocument {
            detail: "bad xref".into(),
        };
        assert!(e.to_string().contains("bad xref"));
    }
}
