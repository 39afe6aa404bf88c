//! Whitespace normalisation.
//!
//! Extracted PDF text is full of tabs, hard line breaks at the end of every
//! visual line, non-breaking spaces and runs of padding. All of it collapses
//! to single ASCII spaces so the reflow stage sees one clean line per page.

use serde::{Deserialize, Serialize};

/// Replace every Unicode whitespace character with an ASCII space, collapse
/// runs of spaces, and trim both ends.
///
/// Total and idempotent: `normalize_spaces(&normalize_spaces(s)) == normalize_spaces(s)`.
pub fn normalize_spaces(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for word in text.split(char::is_whitespace).filter(|w| !w.is_empty()) {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

/// A page's text after encoding repair and whitespace normalisation.
///
/// Every character is either non-whitespace or a lone ASCII space; the text
/// never starts or ends with a space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedPageText {
    pub page_num: usize,
    text: String,
}

impl NormalizedPageText {
    pub fn new(page_num: usize, text: &str) -> Self {
        Self {
            page_num,
            text: normalize_spaces(text),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}
