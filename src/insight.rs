//! Output types: the canonical [`Insight`] record and its collaborators.
//!
//! An `Insight` is created once per completed analysis and replaces the prior
//! one in full — there is no partial merge across requests. Its `Default`
//! impl doubles as the per-field fallback table used by the response coercer:
//! every field the model omits or mangles degrades to the value here.

use serde::{Deserialize, Serialize};

/// Placeholder summary shown before (or instead of) a model-produced one.
pub const DEFAULT_SUMMARY: &str =
    "Add a source and InsightHub will assemble a short summary, key points, and a knowledge card.";

/// Placeholder primary view paragraph.
pub const DEFAULT_PRIMARY_VIEW: &str =
    "Add a PDF, a link, or notes. The opening paragraph will appear here after analysis.";

const DEFAULT_CARD_TITLE: &str = "The card appears after analysis";
const DEFAULT_CARD_SOURCE_HINT: &str = "No source selected";

/// The strictly-typed result of one analysis.
///
/// Immutable once constructed. Field-by-field defaulting rules live in
/// [`crate::pipeline::coerce`]; the `Default` impl below supplies the
/// fallback values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    /// Short prose summary of the source.
    pub summary: String,
    /// Ordered key phrases; empty when the model produced none.
    pub key_phrases: Vec<String>,
    /// Ordered verbatim quotes; empty when the model produced none.
    pub quotes: Vec<String>,
    /// Related materials; entries lacking a title or type are dropped.
    pub related: Vec<RelatedItem>,
    /// Compact knowledge card for the side panel.
    pub knowledge_card: KnowledgeCard,
    /// The paragraph shown in the primary view tab.
    pub primary_view: String,
}

impl Default for Insight {
    fn default() -> Self {
        Self {
            summary: DEFAULT_SUMMARY.to_string(),
            key_phrases: Vec::new(),
            quotes: Vec::new(),
            related: Vec::new(),
            knowledge_card: KnowledgeCard::default(),
            primary_view: DEFAULT_PRIMARY_VIEW.to_string(),
        }
    }
}

/// A pointer to related material suggested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedItem {
    pub title: String,
    /// Kind of material ("paper", "video", …). Serialized as `type`, the
    /// field name the model is prompted to emit.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// The side-panel knowledge card. Each field defaults independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeCard {
    pub title: String,
    pub bullets: Vec<String>,
    pub source_hint: String,
}

impl Default for KnowledgeCard {
    fn default() -> Self {
        Self {
            title: DEFAULT_CARD_TITLE.to_string(),
            bullets: vec!["—".to_string(), "—".to_string(), "—".to_string()],
            source_hint: DEFAULT_CARD_SOURCE_HINT.to_string(),
        }
    }
}

/// Everything extracted from one PDF: bounded page text, outline, metadata.
///
/// Created once per successful extraction and replaced wholesale when a new
/// file is selected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdfInsights {
    /// Per-page texts joined with a blank line, in page order. Extraction is
    /// capped at [`crate::pipeline::extract::PAGE_LIMIT`] pages; pages that
    /// produced no text contribute nothing (no placeholder).
    pub text: String,
    /// Up to 20 outline (bookmark) titles, best-effort.
    pub outline: Vec<String>,
    /// Descriptive metadata, best-effort.
    pub metadata: PdfMetadata,
    /// Total pages in the document, even when extraction was capped.
    pub page_count: usize,
    /// Raw byte size of the input.
    pub bytes: u64,
}

/// Descriptive PDF metadata. Fields absent from both the document info
/// dictionary and the embedded XMP packet stay unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PdfMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
}

impl PdfMetadata {
    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.subject.is_none()
            && self.keywords.is_none()
    }
}

/// The complete result of [`crate::analyze`]: the typed record, the opaque
/// reasoning trace from the draft round trip, and run statistics.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisOutput {
    pub insight: Insight,
    /// Displayable reasoning trace: a string reply passes through unchanged,
    /// any other non-null value is pretty-printed, null/absent yields `None`.
    pub reasoning: Option<String>,
    pub stats: AnalysisStats,
}

/// Timing and token statistics for one analysis.
///
/// Token counts are summed over both round trips and come from the provider's
/// `usage` block; a provider that omits usage contributes zero.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct AnalysisStats {
    pub draft_ms: u64,
    pub refine_ms: u64,
    pub total_ms: u64,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}
