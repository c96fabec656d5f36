//! Bundle assembly: collapse the active source into one context bundle.
//!
//! A pure mapping with no failure modes of its own beyond the blank-source
//! precondition. Exactly one of the three source fields ends up populated;
//! everything irrelevant to the active mode is omitted entirely — absent
//! means semantically absent, never an empty-string placeholder (the serde
//! `skip_serializing_if` attributes enforce this on the wire).

use crate::config::AnalysisConfig;
use crate::error::InsightError;
use crate::insight::{PdfInsights, PdfMetadata};
use crate::pipeline::budget::middle_out;
use serde::Serialize;

/// The active analysis source, selected by the caller.
#[derive(Debug, Clone)]
pub enum Source {
    /// An extracted PDF document plus its display name.
    Document { name: String, insights: PdfInsights },
    /// A remote reference; passed to the model as-is, never fetched locally.
    Url(String),
    /// Free-form user notes.
    Notes(String),
}

impl Source {
    /// One-line description for logs and status output.
    pub fn describe(&self) -> String {
        match self {
            Source::Document { name, insights } => {
                format!("pdf '{}' ({} pages)", name, insights.page_count)
            }
            Source::Url(url) => format!("url {url}"),
            Source::Notes(notes) => format!("notes ({} chars)", notes.trim().chars().count()),
        }
    }
}

/// Size-bounded description of the analysis source, serialized into the user
/// message of the first round trip. Constructed fresh per request.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ContextBundle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_info: Option<PdfInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_metadata: Option<PdfMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_outline: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_text: Option<String>,
}

/// File-level facts about the document source.
#[derive(Debug, Clone, Serialize)]
pub struct PdfInfo {
    pub name: String,
    pub pages: usize,
    pub bytes: u64,
}

impl ContextBundle {
    /// Assemble the bundle for the active source, clamping free text to the
    /// notes budget and extracted document text to the (larger) context
    /// budget.
    ///
    /// # Errors
    /// [`InsightError::MissingSource`] when the active source carries no
    /// usable text — this is the precondition gate before any network
    /// activity.
    pub fn from_source(
        source: &Source,
        config: &AnalysisConfig,
    ) -> Result<Self, InsightError> {
        match source {
            Source::Url(url) => {
                let url = url.trim();
                if url.is_empty() {
                    return Err(InsightError::MissingSource);
                }
                Ok(Self {
                    url: Some(url.to_string()),
                    ..Self::default()
                })
            }
            Source::Notes(notes) => {
                if notes.trim().is_empty() {
                    return Err(InsightError::MissingSource);
                }
                Ok(Self {
                    notes: Some(middle_out(notes, config.notes_budget)),
                    ..Self::default()
                })
            }
            Source::Document { name, insights } => {
                if insights.text.is_empty() {
                    return Err(InsightError::MissingSource);
                }
                Ok(Self {
                    pdf_info: Some(PdfInfo {
                        name: name.clone(),
                        pages: insights.page_count,
                        bytes: insights.bytes,
                    }),
                    pdf_metadata: Some(insights.metadata.clone()),
                    pdf_outline: Some(insights.outline.clone()),
                    pdf_text: Some(middle_out(&insights.text, config.context_budget)),
                    ..Self::default()
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::budget::ELISION_MARKER;

    fn sample_insights(text: &str) -> PdfInsights {
        PdfInsights {
            text: text.to_string(),
            outline: vec!["Intro".into(), "Results".into()],
            metadata: PdfMetadata {
                title: Some("Paper".into()),
                ..PdfMetadata::default()
            },
            page_count: 12,
            bytes: 4096,
        }
    }

    #[test]
    fn url_mode_populates_only_url() {
        let config = AnalysisConfig::default();
        let bundle =
            ContextBundle::from_source(&Source::Url("https://example.org/x".into()), &config)
                .unwrap();
        assert_eq!(bundle.url.as_deref(), Some("https://example.org/x"));
        assert!(bundle.notes.is_none());
        assert!(bundle.pdf_text.is_none());
        assert!(bundle.pdf_info.is_none());
    }

    #[test]
    fn notes_mode_clamps_to_notes_budget() {
        let config = AnalysisConfig::builder().notes_budget(40).build().unwrap();
        let notes = "n".repeat(500);
        let bundle = ContextBundle::from_source(&Source::Notes(notes), &config).unwrap();
        let clamped = bundle.notes.unwrap();
        assert!(clamped.contains(ELISION_MARKER));
        assert!(clamped.chars().count() < 500);
        assert!(bundle.url.is_none());
    }

    #[test]
    fn document_mode_populates_pdf_fields() {
        let config = AnalysisConfig::default();
        let source = Source::Document {
            name: "paper.pdf".into(),
            insights: sample_insights("body text"),
        };
        let bundle = ContextBundle::from_source(&source, &config).unwrap();
        assert_eq!(bundle.pdf_text.as_deref(), Some("body text"));
        assert_eq!(bundle.pdf_outline.as_deref(), Some(&["Intro".to_string(), "Results".to_string()][..]));
        let info = bundle.pdf_info.unwrap();
        assert_eq!(info.pages, 12);
        assert_eq!(info.bytes, 4096);
        assert!(bundle.url.is_none());
        assert!(bundle.notes.is_none());
    }

    #[test]
    fn document_text_clamped_to_context_budget() {
        let config = AnalysisConfig::builder().context_budget(60).build().unwrap();
        let source = Source::Document {
            name: "big.pdf".into(),
            insights: sample_insights(&"t".repeat(2000)),
        };
        let bundle = ContextBundle::from_source(&source, &config).unwrap();
        assert!(bundle.pdf_text.unwrap().contains(ELISION_MARKER));
    }

    #[test]
    fn blank_sources_are_precondition_failures() {
        let config = AnalysisConfig::default();
        assert!(matches!(
            ContextBundle::from_source(&Source::Url("   ".into()), &config),
            Err(InsightError::MissingSource)
        ));
        assert!(matches!(
            ContextBundle::from_source(&Source::Notes("\n\t".into()), &config),
            Err(InsightError::MissingSource)
        ));
        let empty_doc = Source::Document {
            name: "empty.pdf".into(),
            insights: sample_insights(""),
        };
        assert!(matches!(
            ContextBundle::from_source(&empty_doc, &config),
            Err(InsightError::MissingSource)
        ));
    }

    #[test]
    fn absent_fields_are_omitted_from_json() {
        let config = AnalysisConfig::default();
        let bundle =
            ContextBundle::from_source(&Source::Notes("some notes".into()), &config).unwrap();
        let json = serde_json::to_string(&bundle).unwrap();
        assert!(json.contains("\"notes\""));
        assert!(!json.contains("\"url\""));
        assert!(!json.contains("\"pdf_text\""));
    }
}
