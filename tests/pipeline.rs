//! Offline integration tests: cross-stage flows through the public API.
//!
//! No network and no pdfium here — the model exchange and the native PDF
//! parse are exercised only at their boundaries (bundle in, coercion out),
//! which is where the correctness-critical behavior lives.

use insighthub::{
    coerce, middle_out, AnalysisConfig, ContextBundle, Insight, InsightError, PdfInsights,
    PdfMetadata, Source, ELISION_MARKER,
};

fn extracted_doc(text: &str, page_count: usize) -> PdfInsights {
    PdfInsights {
        text: text.to_string(),
        outline: vec!["Abstract".into(), "Conclusion".into()],
        metadata: PdfMetadata {
            title: Some("A Paper".into()),
            author: Some("J. Roe".into()),
            subject: None,
            keywords: None,
        },
        page_count,
        bytes: text.len() as u64,
    }
}

// ── Source → bundle → wire shape ─────────────────────────────────────────

#[test]
fn document_flows_into_a_clamped_single_source_bundle() {
    let config = AnalysisConfig::builder().context_budget(100).build().unwrap();
    let text = format!("{} {} {}", "intro".repeat(40), "middle".repeat(40), "end".repeat(40));
    let source = Source::Document {
        name: "paper.pdf".into(),
        insights: extracted_doc(&text, 20),
    };

    let bundle = ContextBundle::from_source(&source, &config).unwrap();
    let json = serde_json::to_value(&bundle).unwrap();

    // Exactly one text-bearing source field, plus the document side-channel
    // fields; nothing irrelevant serialized.
    assert!(json.get("url").is_none());
    assert!(json.get("notes").is_none());
    assert_eq!(json["pdf_info"]["pages"], 20);
    assert_eq!(json["pdf_outline"].as_array().unwrap().len(), 2);

    let clamped = json["pdf_text"].as_str().unwrap();
    assert!(clamped.contains(ELISION_MARKER));
    assert!(clamped.chars().count() <= 100 + ELISION_MARKER.chars().count());
    assert!(clamped.starts_with("intro"));
    assert!(clamped.ends_with("end"));
}

#[test]
fn notes_budget_is_tighter_than_document_budget() {
    let config = AnalysisConfig::default();
    assert!(config.notes_budget < config.context_budget);

    let long = "x".repeat(config.context_budget);
    let as_notes = ContextBundle::from_source(&Source::Notes(long.clone()), &config)
        .unwrap()
        .notes
        .unwrap();
    let as_doc = ContextBundle::from_source(
        &Source::Document {
            name: "d.pdf".into(),
            insights: extracted_doc(&long, 1),
        },
        &config,
    )
    .unwrap()
    .pdf_text
    .unwrap();

    // Same input: clamped as notes, untouched as document text.
    assert!(as_notes.contains(ELISION_MARKER));
    assert_eq!(as_doc, long);
}

// ── Budget clamp properties over arbitrary sizes ─────────────────────────

#[test]
fn clamp_is_identity_then_bounded_across_the_threshold() {
    let limit = 64;
    for len in [0, 1, 63, 64, 65, 128, 4096] {
        let s = "abcdefgh".chars().cycle().take(len).collect::<String>();
        let out = middle_out(&s, limit);
        if len <= limit {
            assert_eq!(out, s, "identity violated at len {len}");
        } else {
            let head = limit * 6 / 10;
            let tail = limit - head;
            assert_eq!(
                out.chars().count(),
                head + ELISION_MARKER.chars().count() + tail,
                "bound violated at len {len}"
            );
        }
    }
}

// ── Model reply → typed record ───────────────────────────────────────────

#[test]
fn prose_wrapped_reply_coerces_with_defaults() {
    let insight = coerce("Here you go:\n{\"summary\":\"x\"}\nThanks").unwrap();
    assert_eq!(insight.summary, "x");
    let fallback = Insight::default();
    assert_eq!(insight.key_phrases, fallback.key_phrases);
    assert_eq!(insight.knowledge_card, fallback.knowledge_card);
    assert_eq!(insight.primary_view, fallback.primary_view);
}

#[test]
fn fenced_reply_with_aliases_coerces_fully() {
    let payload = r#"Sure! Here is the JSON:
```json
{
  "summary": "a",
  "key_phrases": ["p1", "p2"],
  "knowledge_card": {"source_hint": "h"},
  "primaryView": "front paragraph",
  "related": [
    {"title": "T", "type": "paper"},
    {"url": "https://nowhere.example"}
  ]
}
```"#;
    let insight = coerce(payload).unwrap();
    assert_eq!(insight.summary, "a");
    assert_eq!(insight.key_phrases, vec!["p1", "p2"]);
    assert_eq!(insight.knowledge_card.source_hint, "h");
    assert_eq!(insight.primary_view, "front paragraph");
    assert_eq!(insight.related.len(), 1, "entry without title+type dropped");
}

#[test]
fn garbage_reply_is_the_single_total_failure() {
    assert!(matches!(
        coerce("not json at all, no braces"),
        Err(InsightError::Decode(_))
    ));
}

#[test]
fn coerced_record_serializes_with_wire_field_names() {
    let insight = coerce(r#"{"related":[{"title":"T","type":"video"}]}"#).unwrap();
    let json = serde_json::to_value(&insight).unwrap();
    assert_eq!(json["related"][0]["type"], "video");
    assert!(json["related"][0].get("kind").is_none());
}
