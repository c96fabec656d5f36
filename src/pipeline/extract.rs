//! PDF extraction: page text, outline, and metadata via pdfium.
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async contexts.
//! `tokio::task::spawn_blocking` moves the work onto the blocking thread
//! pool so Tokio worker threads never stall on CPU-bound parsing.
//!
//! ## Partial-failure policy
//!
//! A failure extracting an individual page is swallowed: that page
//! contributes no text and extraction continues. One malformed page must not
//! abort the whole document. The same applies to the outline and to
//! metadata lookups — both are best-effort. The only fatal case is a
//! document pdfium cannot open at all.
//!
//! ## Two metadata sources
//!
//! pdfium exposes the document info dictionary directly. Descriptive XMP
//! metadata (the second place PDF producers record title/author/subject/
//! keywords) is not surfaced by pdfium, so we scan the raw bytes for the XMP
//! packet's Dublin Core elements. The info dictionary wins field-by-field;
//! XMP fills the gaps.

use crate::error::InsightError;
use crate::insight::{PdfInsights, PdfMetadata};
use once_cell::sync::Lazy;
use pdfium_render::prelude::*;
use regex::Regex;
use tracing::{debug, warn};

/// Pages processed per document; total page count is still reported.
pub const PAGE_LIMIT: usize = 8;

/// Outline entries retained.
pub const OUTLINE_LIMIT: usize = 20;

/// Extract bounded text, outline, and metadata from raw PDF bytes.
///
/// # Errors
/// [`InsightError::CorruptDocument`] when pdfium cannot open the bytes at
/// all. Per-page and outline/metadata failures degrade output instead.
pub async fn extract_insights(bytes: Vec<u8>) -> Result<PdfInsights, InsightError> {
    tokio::task::spawn_blocking(move || extract_blocking(&bytes))
        .await
        .map_err(|e| InsightError::Internal(format!("extraction task panicked: {e}")))?
}

/// Blocking implementation of the extraction.
fn extract_blocking(bytes: &[u8]) -> Result<PdfInsights, InsightError> {
    let pdfium = Pdfium::default();

    let document = pdfium
        .load_pdf_from_byte_slice(bytes, None)
        .map_err(|e| InsightError::CorruptDocument {
            detail: format!("{e:?}"),
        })?;

    let pages = document.pages();
    let page_count = pages.len() as usize;
    debug!("PDF opened: {} pages, {} bytes", page_count, bytes.len());

    let limit = pages_to_read(page_count);
    let page_texts = (0..limit).map(|idx| {
        read_page_text(&pages, idx as u16).inspect_err(|e| {
            warn!("page {}: text extraction failed, skipping: {e:?}", idx + 1);
        })
    });
    let text = join_pages(page_texts);

    let outline = read_outline(&document);
    let metadata = merge_metadata(info_metadata(&document), xmp_metadata(bytes));

    Ok(PdfInsights {
        text,
        outline,
        metadata,
        page_count,
        bytes: bytes.len() as u64,
    })
}

/// Number of pages actually processed for a document of `total` pages.
fn pages_to_read(total: usize) -> usize {
    total.min(PAGE_LIMIT)
}

/// One page's text: fragments flattened to single spaces, trimmed.
fn read_page_text(pages: &PdfPages<'_>, index: u16) -> Result<String, PdfiumError> {
    let page = pages.get(index)?;
    let text = page.text()?;
    Ok(collapse_whitespace(&text.all()))
}

/// Fold per-page results into the joined document text.
///
/// Failed pages and pages that produced no text contribute nothing — no
/// placeholder — and the remaining pages keep their order, joined by a blank
/// line.
fn join_pages<E>(pages: impl IntoIterator<Item = Result<String, E>>) -> String {
    pages
        .into_iter()
        .filter_map(Result::ok)
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Best-effort outline titles, capped. Failure yields an empty outline.
fn read_outline(document: &PdfDocument<'_>) -> Vec<String> {
    document
        .bookmarks()
        .iter()
        .filter_map(|bookmark| bookmark.title())
        .filter(|title| !title.trim().is_empty())
        .take(OUTLINE_LIMIT)
        .collect()
}

/// Metadata from the document info dictionary.
fn info_metadata(document: &PdfDocument<'_>) -> PdfMetadata {
    let tags = document.metadata();
    let get = |tag: PdfDocumentMetadataTagType| -> Option<String> {
        tags.get(tag)
            .map(|t| t.value().to_string())
            .filter(|v| !v.trim().is_empty())
    };

    PdfMetadata {
        title: get(PdfDocumentMetadataTagType::Title),
        author: get(PdfDocumentMetadataTagType::Author),
        subject: get(PdfDocumentMetadataTagType::Subject),
        keywords: get(PdfDocumentMetadataTagType::Keywords),
    }
}

/// Field-by-field preference: info dictionary first, XMP fills the gaps.
fn merge_metadata(primary: PdfMetadata, secondary: PdfMetadata) -> PdfMetadata {
    PdfMetadata {
        title: primary.title.or(secondary.title),
        author: primary.author.or(secondary.author),
        subject: primary.subject.or(secondary.subject),
        keywords: primary.keywords.or(secondary.keywords),
    }
}

// ── XMP packet scan ──────────────────────────────────────────────────────

static RE_XMP_TITLE: Lazy<Regex> = Lazy::new(|| xmp_element_regex("dc:title"));
static RE_XMP_CREATOR: Lazy<Regex> = Lazy::new(|| xmp_element_regex("dc:creator"));
static RE_XMP_DESCRIPTION: Lazy<Regex> = Lazy::new(|| xmp_element_regex("dc:description"));
static RE_XMP_KEYWORDS: Lazy<Regex> = Lazy::new(|| xmp_element_regex("pdf:Keywords"));
static RE_XMP_LI: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<rdf:li[^>]*>(.*?)</rdf:li>").expect("rdf:li regex"));
static RE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("tag regex"));

fn xmp_element_regex(element: &str) -> Regex {
    Regex::new(&format!(
        r"(?s)<{0}[^>]*>(.*?)</{0}>",
        regex::escape(element)
    ))
    .expect("xmp element regex")
}

/// Best-effort scan of the raw bytes for XMP descriptive metadata.
///
/// XMP packets are plain XML embedded in an uncompressed metadata stream, so
/// a lossy UTF-8 view plus element regexes recovers the common cases without
/// a full XML parser. Anything unparseable simply stays unset.
fn xmp_metadata(bytes: &[u8]) -> PdfMetadata {
    let haystack = String::from_utf8_lossy(bytes);
    PdfMetadata {
        title: xmp_value(&RE_XMP_TITLE, &haystack),
        author: xmp_value(&RE_XMP_CREATOR, &haystack),
        subject: xmp_value(&RE_XMP_DESCRIPTION, &haystack),
        keywords: xmp_value(&RE_XMP_KEYWORDS, &haystack),
    }
}

/// Inner text of an XMP element, unwrapping an `rdf:Alt`/`rdf:Seq` container
/// down to its first `rdf:li` when present.
fn xmp_value(element: &Regex, haystack: &str) -> Option<String> {
    let inner = element.captures(haystack)?.get(1)?.as_str();
    let leaf = RE_XMP_LI
        .captures(inner)
        .and_then(|caps| caps.get(1))
        .map_or(inner, |m| m.as_str());
    let value = RE_TAG.replace_all(leaf, " ");
    let value = collapse_whitespace(&value);
    (!value.is_empty()).then_some(value)
}

static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));

/// Collapse whitespace runs to single spaces and trim.
fn collapse_whitespace(input: &str) -> String {
    RE_WHITESPACE.replace_all(input, " ").trim().to_string()
}
