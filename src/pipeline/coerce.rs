//! Response coercion: recover a typed [`Insight`] from untrusted model output.
//!
//! The model is a best-effort producer. Its "JSON" reply arrives wrapped in
//! code fences, padded with prose, using alternate field spellings, or with
//! whole substructures missing. This module must never render garbage or
//! panic on any of that — it always yields a structurally valid `Insight`,
//! degrading field-by-field to the defaults in [`crate::insight`]. The single
//! total-failure case is a payload from which no JSON object can be recovered
//! at all, which fails with [`InsightError::Decode`].
//!
//! ## Recovery order
//!
//! Candidate extraction runs an ordered chain of independent strategies,
//! first success wins:
//!
//! 1. fenced code block (optionally tagged `json`)
//! 2. first `{` … last `}` span of the trimmed payload
//! 3. the trimmed payload itself
//!
//! The parsed value is then reduced to one object: an array yields its first
//! non-null object element, a bare object yields itself, anything else counts
//! as "no object found".
//!
//! ## Field mapping
//!
//! Every accessor below is total. Alias resolution is an explicit ordered
//! key list per field (first present, non-null key wins), not nested
//! conditionals, so adding a spelling the model invents is a one-line change.

use crate::error::InsightError;
use crate::insight::{Insight, KnowledgeCard, RelatedItem};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

static RE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)```(?:json)?\s*(.*?)```").expect("fence regex"));

/// Coerce a raw model reply into an [`Insight`].
///
/// # Errors
/// [`InsightError::Decode`] when no plausible JSON object can be recovered.
pub fn coerce(payload: &str) -> Result<Insight, InsightError> {
    let object = extract_candidate(payload)
        .and_then(|candidate| serde_json::from_str::<Value>(&candidate).ok())
        .and_then(select_object)
        .ok_or_else(|| InsightError::Decode("no JSON object found in reply".into()))?;

    Ok(map_insight(&object))
}

/// Pull the most plausible JSON text out of the payload.
fn extract_candidate(payload: &str) -> Option<String> {
    let trimmed = payload.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(caps) = RE_FENCE.captures(trimmed) {
        return Some(caps[1].trim().to_string());
    }

    if let (Some(first), Some(last)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if last > first {
            return Some(trimmed[first..=last].to_string());
        }
    }

    Some(trimmed.to_string())
}

/// Reduce a parsed value to a single candidate object.
///
/// Arrays yield their first non-null object element ("first plausible object
/// wins" — a model that returns several candidates gets no smarter
/// selection). Scalars, null, and empty arrays yield nothing.
fn select_object(parsed: Value) -> Option<Map<String, Value>> {
    match parsed {
        Value::Object(map) => Some(map),
        Value::Array(items) => items.into_iter().find_map(|item| match item {
            Value::Object(map) => Some(map),
            _ => None,
        }),
        _ => None,
    }
}

/// Map the recovered object field-by-field, defaulting independently.
fn map_insight(object: &Map<String, Value>) -> Insight {
    let fallback = Insight::default();

    Insight {
        summary: as_string(object.get("summary"), &fallback.summary),
        key_phrases: first_non_empty_string_array(&[
            object.get("key_phrases"),
            object.get("keyPhrases"),
        ]),
        quotes: as_string_array(object.get("quotes")),
        related: as_related(pick(object, &["related"])),
        knowledge_card: as_knowledge_card(pick(object, &["knowledge_card", "knowledgeCard"])),
        primary_view: as_string(
            pick(object, &["primary_view", "primaryView"]),
            &fallback.primary_view,
        ),
    }
}

/// First present, non-null value among `keys`, in priority order.
fn pick<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find(|value| !value.is_null())
}

/// `value` if it is a string with non-whitespace content, else `fallback`.
fn as_string(value: Option<&Value>, fallback: &str) -> String {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        _ => fallback.to_string(),
    }
}

/// String elements of an array value; empty for anything else.
fn as_string_array(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

/// First candidate that coerces to a non-empty string array, else empty.
fn first_non_empty_string_array(candidates: &[Option<&Value>]) -> Vec<String> {
    candidates
        .iter()
        .map(|candidate| as_string_array(*candidate))
        .find(|array| !array.is_empty())
        .unwrap_or_default()
}

/// Related entries: each must carry both a string `title` and a string
/// `type`; entries missing either are dropped, not defaulted.
fn as_related(value: Option<&Value>) -> Vec<RelatedItem> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|entry| {
            let object = entry.as_object()?;
            let title = object.get("title")?.as_str()?;
            let kind = object.get("type")?.as_str()?;
            Some(RelatedItem {
                title: title.to_string(),
                kind: kind.to_string(),
                url: object.get("url").and_then(Value::as_str).map(str::to_string),
                note: object
                    .get("note")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            })
        })
        .collect()
}

/// Knowledge card with each sub-field independently defaulted. A non-object
/// value degrades to the full default card.
fn as_knowledge_card(value: Option<&Value>) -> KnowledgeCard {
    let fallback = KnowledgeCard::default();
    let Some(Value::Object(card)) = value else {
        return fallback;
    };

    let bullets = match card.get("bullets") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => fallback.bullets,
    };

    KnowledgeCard {
        title: as_string(
            pick(card, &["title", "Title", "name", "heading"]),
            &fallback.title,
        ),
        bullets,
        source_hint: as_string(
            pick(card, &["source_hint", "sourceHint"]),
            &fallback.source_hint,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insight::{DEFAULT_PRIMARY_VIEW, DEFAULT_SUMMARY};
    use serde_json::json;

    #[test]
    fn json_embedded_in_prose() {
        let payload = "Here you go:\n{\"summary\":\"x\"}\nThanks";
        let insight = coerce(payload).unwrap();
        assert_eq!(insight.summary, "x");
        assert!(insight.key_phrases.is_empty());
        assert!(insight.quotes.is_empty());
        assert!(insight.related.is_empty());
        assert_eq!(insight.primary_view, DEFAULT_PRIMARY_VIEW);
    }

    #[test]
    fn fenced_json_extraction() {
        let payload = "```json\n{\"summary\":\"a\",\"key_phrases\":[\"p1\",\"p2\"]}\n```";
        let insight = coerce(payload).unwrap();
        assert_eq!(insight.summary, "a");
        assert_eq!(insight.key_phrases, vec!["p1", "p2"]);
    }

    #[test]
    fn fence_without_language_tag() {
        let payload = "```\n{\"summary\":\"b\"}\n```";
        assert_eq!(coerce(payload).unwrap().summary, "b");
    }

    #[test]
    fn fence_wins_over_surrounding_braces() {
        let payload = "{not json} ```json\n{\"summary\":\"inner\"}\n``` {also not}";
        assert_eq!(coerce(payload).unwrap().summary, "inner");
    }

    #[test]
    fn camel_case_key_phrases_alias() {
        let payload = r#"{"keyPhrases":["only","camel"]}"#;
        let insight = coerce(payload).unwrap();
        assert_eq!(insight.key_phrases, vec!["only", "camel"]);
    }

    #[test]
    fn snake_case_key_phrases_wins_when_non_empty() {
        let payload = r#"{"key_phrases":["snake"],"keyPhrases":["camel"]}"#;
        assert_eq!(coerce(payload).unwrap().key_phrases, vec!["snake"]);
    }

    #[test]
    fn empty_snake_array_falls_through_to_camel() {
        let payload = r#"{"key_phrases":[],"keyPhrases":["camel"]}"#;
        assert_eq!(coerce(payload).unwrap().key_phrases, vec!["camel"]);
    }

    #[test]
    fn knowledge_card_alias_and_sub_defaults() {
        let payload = r#"{"knowledge_card":{"source_hint":"h"}}"#;
        let insight = coerce(payload).unwrap();
        assert_eq!(insight.knowledge_card.source_hint, "h");
        // Missing sub-fields default independently.
        assert_eq!(
            insight.knowledge_card.title,
            KnowledgeCard::default().title
        );
        assert_eq!(
            insight.knowledge_card.bullets,
            KnowledgeCard::default().bullets
        );
    }

    #[test]
    fn knowledge_card_title_spellings() {
        for key in ["title", "Title", "name", "heading"] {
            let payload = format!(r#"{{"knowledge_card":{{"{key}":"T"}}}}"#);
            assert_eq!(coerce(&payload).unwrap().knowledge_card.title, "T");
        }
    }

    #[test]
    fn related_filtering_drops_incomplete_entries() {
        let payload = r#"{"related":[
            {"title":"Good","type":"paper","url":"https://example.org"},
            {"note":"missing title and type"}
        ]}"#;
        let insight = coerce(payload).unwrap();
        assert_eq!(insight.related.len(), 1);
        assert_eq!(insight.related[0].title, "Good");
        assert_eq!(insight.related[0].kind, "paper");
        assert_eq!(insight.related[0].url.as_deref(), Some("https://example.org"));
        assert_eq!(insight.related[0].note, None);
    }

    #[test]
    fn related_entry_with_only_title_is_dropped() {
        let payload = r#"{"related":[{"title":"No type"}]}"#;
        assert!(coerce(payload).unwrap().related.is_empty());
    }

    #[test]
    fn total_failure_on_braceless_prose() {
        let err = coerce("not json at all, no braces").unwrap_err();
        assert!(matches!(err, InsightError::Decode(_)));
    }

    #[test]
    fn total_failure_on_empty_payload() {
        assert!(matches!(coerce("   "), Err(InsightError::Decode(_))));
    }

    #[test]
    fn total_failure_on_scalar_json() {
        assert!(coerce("42").is_err());
        assert!(coerce("\"just a string\"").is_err());
        assert!(coerce("null").is_err());
        assert!(coerce("[]").is_err());
    }

    #[test]
    fn fenced_array_reply_uses_first_object_element() {
        // A bare unfenced array is sliced by the brace-span strategy before
        // the array branch can see it; the branch is reached via a fence.
        let payload = "```json\n[null, 3, {\"summary\":\"from array\"}, {\"summary\":\"second\"}]\n```";
        assert_eq!(coerce(payload).unwrap().summary, "from array");
    }

    #[test]
    fn bare_array_reply_fails_decode() {
        // Without a fence the first-{ to last-} slice of an array of objects
        // is not valid JSON; this degrades to the total-failure case.
        let payload = r#"[null, 3, {"summary":"from array"}, {"summary":"second"}]"#;
        assert!(matches!(coerce(payload), Err(InsightError::Decode(_))));
    }

    #[test]
    fn whitespace_only_summary_falls_back() {
        let payload = r#"{"summary":"   "}"#;
        assert_eq!(coerce(payload).unwrap().summary, DEFAULT_SUMMARY);
    }

    #[test]
    fn wrongly_typed_fields_degrade_independently() {
        let payload = r#"{"summary":7,"quotes":"not an array","key_phrases":[1,2,"three"],"related":{"title":"not an array"}}"#;
        let insight = coerce(payload).unwrap();
        assert_eq!(insight.summary, DEFAULT_SUMMARY);
        assert!(insight.quotes.is_empty());
        assert_eq!(insight.key_phrases, vec!["three"]);
        assert!(insight.related.is_empty());
    }

    #[test]
    fn null_alias_key_falls_through() {
        // knowledge_card present but null: the camelCase spelling must win.
        let payload = r#"{"knowledge_card":null,"knowledgeCard":{"source_hint":"camel"}}"#;
        assert_eq!(
            coerce(payload).unwrap().knowledge_card.source_hint,
            "camel"
        );
    }

    #[test]
    fn full_payload_round() {
        let payload = json!({
            "summary": "s",
            "key_phrases": ["k"],
            "quotes": ["q"],
            "related": [{"title": "t", "type": "paper", "note": "n"}],
            "knowledge_card": {"title": "c", "bullets": ["b1", "b2"], "source_hint": "hint"},
            "primary_view": "p"
        })
        .to_string();
        let insight = coerce(&payload).unwrap();
        assert_eq!(insight.summary, "s");
        assert_eq!(insight.quotes, vec!["q"]);
        assert_eq!(insight.knowledge_card.bullets, vec!["b1", "b2"]);
        assert_eq!(insight.primary_view, "p");
    }
}
