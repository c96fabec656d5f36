//! Budget clamp: middle-out truncation of oversized context text.
//!
//! ## Why middle-out?
//!
//! Model context windows are asymmetric in value. The leading material of a
//! document (title, abstract, introduction) and the trailing material
//! (conclusion, references) carry disproportionate information compared to
//! the middle. A flat head-only truncation destroys conclusions; middle-out
//! keeps a larger prefix and a smaller suffix joined by an explicit elision
//! marker, so the model always sees both ends and knows something was cut.
//!
//! The split is 60/40 in favour of the head. Budgets are measured in
//! characters, not bytes, so multi-byte input never splits a code point.

/// The literal line inserted where text was elided.
pub const ELISION_MARKER: &str = "\n…middle-out…\n";

/// Clamp `input` to at most `limit` characters using middle-out truncation.
///
/// Identity for input already within the limit — the marker is never added
/// to short input. Otherwise the result is the first `floor(limit * 0.6)`
/// characters, the elision marker, and the last `limit - head` characters.
///
/// Pure and total: `limit == 0` degenerates to a marker-only result, never
/// an underflow.
pub fn middle_out(input: &str, limit: usize) -> String {
    let total = input.chars().count();
    if total <= limit {
        return input.to_string();
    }

    let head = limit * 6 / 10;
    let tail = limit - head;

    let prefix: String = input.chars().take(head).collect();
    let suffix: String = input.chars().skip(total - tail).collect();

    format!("{prefix}{ELISION_MARKER}{suffix}")
}
