//! Pipeline stages for PDF restyling.
//!
//! Each submodule implements exactly one transformation step. Everything
//! between [`extract`] and [`layout`] is pure and works on plain values, so it
//! can be tested without pdfium.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ encoding ──▶ whitespace ──▶ aggregate ──▶ reflow ──▶ layout ──▶ render
//! (path/bytes) (pdfium)  (UTF-8)      (spaces)      (markers)    (words)    (pages)    (pdfium)
//! ```
//!
//! 1. [`input`]      — validate a path or in-memory buffer and open it
//! 2. [`extract`]    — per-page plain text; empty pages skipped, broken pages
//!    reported
//! 3. [`encoding`]   — repair text that is not valid UTF-8
//! 4. [`whitespace`] — collapse all whitespace to single spaces
//! 5. [`aggregate`]  — join pages behind page markers into one buffer
//! 6. [`reflow`]     — paragraphs, lines and bold-lead words
//! 7. [`layout`]     — line fitting and page breaks into a [`layout::LayoutPlan`]
//! 8. [`render`]     — write the plan with embedded fonts and serialise

pub mod aggregate;
pub mod encoding;
pub mod extract;
pub mod input;
pub mod layout;
pub mod reflow;
pub mod render;
pub mod whitespace;
