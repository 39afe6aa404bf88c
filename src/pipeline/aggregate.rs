//! Page aggregation: join normalised pages into one marked-up text buffer.
//!
//! The buffer is a plain value owned by a single run. Each page becomes one
//! block:
//!
//! ```text
//! Page -> 3
//! <normalised text of page 3>
//! <blank line>
//! ```
//!
//! so every page is its own paragraph when the buffer is reflowed.

use crate::config::PageMarker;
use crate::pipeline::whitespace::NormalizedPageText;
use tracing::warn;

/// Ordered, page-marked text of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregatedBuffer {
    text: String,
    pages: Vec<usize>,
}

impl AggregatedBuffer {
    /// A fresh, empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one page block.
    ///
    /// Pages must arrive in strictly ascending order; a page that does not is
    /// ignored so the buffer order always matches page order.
    pub fn push_page(&mut self, page: &NormalizedPageText, marker: &PageMarker) {
        if let Some(&last) = self.pages.last() {
            if page.page_num <= last {
                warn!(
                    "Ignoring page {} appended after page {}",
                    page.page_num, last
                );
                return;
            }
        }
        self.text.push_str(&marker.render(page.page_num));
        self.text.push('\n');
        self.text.push_str(page.text());
        self.text.push_str("\n\n");
        self.pages.push(page.page_num);
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }

    /// Page numbers present in the buffer, ascending.
    pub fn pages(&self) -> &[usize] {
        &self.pages
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

/// Build a buffer from pages already in ascending order.
pub fn aggregate<'a>(
    pages: impl IntoIterator<Item = &'a NormalizedPageText>,
    marker: &PageMarker,
) -> AggregatedBuffer {
    let mut buffer = AggregatedBuffer::new();
    for page in pages {
        buffer.push_page(page, marker);
    }
    buffer
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(n: usize, t: &str) -> NormalizedPageText {
        NormalizedPageText::new(n, t)
    }

    #[test]
    fn blocks_are_marked_and_separated() {
        let pages = [page(1, "alpha beta"), page(3, "gamma")];
        let buf = aggregate(&pages, &PageMarker::Arrow);
        assert_eq!(buf.as_str(), "Page -> 1\nalpha beta\n\nPage -> 3\ngamma\n\n");
        assert_eq!(buf.pages(), &[1, 3]);
    }

    #[test]
    fn custom_marker() {
        let buf = aggregate(&[page(2, "x")], &PageMarker::Custom("--- page".into()));
        assert_eq!(buf.as_str(), "--- page 2\nx\n\n");
    }

    #[test]
    fn out_of_order_page_is_ignored() {
        let mut buf = AggregatedBuffer::new();
        buf.push_page(&page(2, "two"), &PageMarker::Arrow);
        buf.push_page(&page(1, "one"), &PageMarker::Arrow);
        buf.push_page(&page(2, "again"), &PageMarker::Arrow);
        assert_eq!(buf.pages(), &[2]);
        assert!(!buf.as_str().contains("one"));
    }

    #[test]
    fn new_buffer_is_empty() {
        let buf = AggregatedBuffer::new();
        assert!(buf.is_empty());
        assert_eq!(buf.as_str(), "");
    }

    #[test]
    fn empty_page_still_gets_a_block() {
        let buf = aggregate(&[page(1, "   ")], &PageMarker::Arrow);
        assert_eq!(buf.as_str(), "Page -> 1\n\n\n");
    }
}
