//! Pipeline stages for source-to-insight analysis.
//!
//! Each submodule implements exactly one transformation step. Keeping the
//! stages separate makes each independently testable and lets us swap an
//! implementation (e.g. a different extraction backend) without touching the
//! others.
//!
//! ## Data Flow
//!
//! ```text
//! extract ──▶ bundle ──▶ budget ──▶ exchange ──▶ coerce
//! (pdfium)   (source     (middle-   (two chat    (tolerant
//!             fields)     out)       round trips)  JSON → Insight)
//! ```
//!
//! 1. [`extract`]  — page text, outline, and metadata from PDF bytes; runs in
//!    `spawn_blocking` because pdfium is not async-safe
//! 2. [`bundle`]   — collapse the active source into one context bundle
//! 3. [`budget`]   — middle-out clamp oversized text to its character budget
//! 4. [`exchange`] — drive one chat-completions round trip; the only stage
//!    with network I/O
//! 5. [`coerce`]   — recover a typed [`crate::insight::Insight`] from the
//!    model's semi-structured reply

pub mod budget;
pub mod bundle;
pub mod coerce;
pub mod exchange;
pub mod extract;
