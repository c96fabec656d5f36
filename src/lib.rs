//! # insighthub
//!
//! Turn a PDF, a URL, or raw notes into a strictly-typed insight record via
//! a reasoning LLM.
//!
//! ## Why this crate?
//!
//! Generative models are excellent summarizers and terrible JSON emitters.
//! Asked for structured output they wrap it in code fences, pad it with
//! prose, rename fields, or drop whole substructures. This crate owns the
//! two hard problems on either side of the model call: a deterministic
//! **middle-out budget clamp** that fits arbitrarily large source text under
//! a hard character cap while preserving both ends of the document, and a
//! **tolerant coercion pipeline** that recovers a well-typed [`Insight`]
//! from a reply that is only probabilistically well-formed, degrading
//! field-by-field instead of failing wholesale.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF / URL / notes
//!  │
//!  ├─ 1. Extract  page text, outline, metadata via pdfium (PDF mode only)
//!  ├─ 2. Bundle   collapse the active source into one context bundle
//!  ├─ 3. Budget   middle-out clamp oversized text (60/40 head/tail split)
//!  ├─ 4. Exchange two chat-completion round trips (draft with reasoning,
//!  │              then strict-JSON refine)
//!  └─ 5. Coerce   fence/brace/raw JSON recovery → typed Insight record
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use insighthub::{analyze, AnalysisConfig, Source};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // API key from OPENROUTER_API_KEY unless set explicitly
//!     let config = AnalysisConfig::default();
//!     let output = analyze(&Source::Notes("…pasted article…".into()), &config).await?;
//!     println!("{}", output.insight.summary);
//!     if let Some(trace) = output.reasoning {
//!         eprintln!("reasoning: {trace}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `insighthub` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! insighthub = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod analyze;
pub mod config;
pub mod error;
pub mod insight;
pub mod pipeline;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use analyze::{analyze, API_KEY_ENV};
pub use config::{AnalysisConfig, AnalysisConfigBuilder, DEFAULT_API_URL, DEFAULT_MODEL};
pub use error::{InsightError, Stage};
pub use insight::{
    AnalysisOutput, AnalysisStats, Insight, KnowledgeCard, PdfInsights, PdfMetadata, RelatedItem,
};
pub use pipeline::budget::{middle_out, ELISION_MARKER};
pub use pipeline::bundle::{ContextBundle, Source};
pub use pipeline::coerce::coerce;
pub use pipeline::extract::{extract_insights, PAGE_LIMIT};
