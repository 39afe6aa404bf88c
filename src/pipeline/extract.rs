//! Page text extraction.
//!
//! [`PageSource`] is the seam between the pipeline and the document parser:
//! the pipeline only needs a page count and per-page plain text. The
//! production implementation, [`PdfiumPageSource`], wraps a pdfium document;
//! tests drive the pipeline with in-memory sources.

use crate::error::PageError;
use crate::output::DocumentMetadata;
use pdfium_render::prelude::*;
use tracing::{debug, warn};

/// Unprocessed text of one page. May be empty or not valid UTF-8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPageText {
    /// 1-indexed page number.
    pub page_num: usize,
    pub bytes: Vec<u8>,
}

/// Read-only access to the pages of a parsed document.
pub trait PageSource {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Plain text of page `page_num` (1-indexed).
    ///
    /// Returns `Ok(None)` for a page with no content at all, and `Err` with a
    /// description when the page exists but its text cannot be extracted.
    fn page_text(&self, page_num: usize) -> Result<Option<Vec<u8>>, String>;
}

/// Extract the text of the given pages in ascending order.
///
/// Structurally empty pages produce no entry. A page whose extraction fails
/// produces an `Err` entry and is logged; the remaining pages are still read.
pub fn extract_pages(
    source: &dyn PageSource,
    page_numbers: &[usize],
) -> Vec<Result<RawPageText, PageError>> {
    let mut pages = page_numbers.to_vec();
    pages.sort_unstable();
    pages.dedup();

    let total = source.page_count();
    let mut results = Vec::with_capacity(pages.len());

    for page_num in pages {
        if page_num == 0 || page_num > total {
            warn!("Skipping page {} (out of range, total={})", page_num, total);
            continue;
        }

        match source.page_text(page_num) {
            Ok(None) => {
                debug!("Page {} has no content, skipping", page_num);
            }
            Ok(Some(bytes)) => {
                debug!("Page {}: extracted {} bytes", page_num, bytes.len());
                results.push(Ok(RawPageText { page_num, bytes }));
            }
            Err(detail) => {
                warn!("Error on page {}: {}", page_num, detail);
                results.push(Err(PageError::Extraction {
                    page: page_num,
                    detail,
                }));
            }
        }
    }

    results
}

/// [`PageSource`] backed by a pdfium document.
pub struct PdfiumPageSource<'a> {
    document: PdfDocument<'a>,
}

impl<'a> PdfiumPageSource<'a> {
    pub fn new(document: PdfDocument<'a>) -> Self {
        Self { document }
    }

    pub fn document(&self) -> &PdfDocument<'a> {
        &self.document
    }

    /// Information dictionary entries, page count and version.
    pub fn metadata(&self) -> DocumentMetadata {
        let metadata = self.document.metadata();

        let get_meta = |tag: PdfDocumentMetadataTagType| -> Option<String> {
            metadata.get(tag).and_then(|t| {
                let v = t.value().trim().to_string();
                if v.is_empty() {
                    None
                } else {
                    Some(v)
                }
            })
        };

        DocumentMetadata {
            title: get_meta(PdfDocumentMetadataTagType::Title),
            author: get_meta(PdfDocumentMetadataTagType::Author),
            subject: get_meta(PdfDocumentMetadataTagType::Subject),
            creator: get_meta(PdfDocumentMetadataTagType::Creator),
            producer: get_meta(PdfDocumentMetadataTagType::Producer),
            creation_date: get_meta(PdfDocumentMetadataTagType::CreationDate),
            modification_date: get_meta(PdfDocumentMetadataTagType::ModificationDate),
            page_count: self.page_count(),
            pdf_version: format!("{:?}", self.document.version()),
        }
    }
}

impl PageSource for PdfiumPageSource<'_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn page_text(&self, page_num: usize) -> Result<Option<Vec<u8>>, String> {
        let page = self
            .document
            .pages()
            .get((page_num - 1) as u16)
            .map_err(|e| format!("{:?}", e))?;

        if page.objects().is_empty() {
            return Ok(None);
        }

        let text = page.text().map_err(|e| format!("{:?}", e))?;
        Ok(Some(text.all().into_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Pages are `Some(text)`, `None` (empty page) or `Err` (broken page).
    struct FakeSource(Vec<Result<Option<&'static str>, &'static str>>);

    impl PageSource for FakeSource {
        fn page_count(&self) -> usize {
            self.0.len()
        }

        fn page_text(&self, page_num: usize) -> Result<Option<Vec<u8>>, String> {
            match &self.0[page_num - 1] {
                Ok(Some(t)) => Ok(Some(t.as_bytes().to_vec())),
                Ok(None) => Ok(None),
                Err(e) => Err(e.to_string()),
            }
        }
    }

    #[test]
    fn failed_page_is_reported_and_others_survive() {
        let src = FakeSource(vec![Ok(Some("one")), Err("bad xref"), Ok(Some("three"))]);
        let out = extract_pages(&src, &[1, 2, 3]);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].as_ref().unwrap().page_num, 1);
        assert_eq!(
            out[1].as_ref().unwrap_err(),
            &PageError::Extraction {
                page: 2,
                detail: "bad xref".into()
            }
        );
        assert_eq!(out[2].as_ref().unwrap().bytes, b"three");
    }

    #[test]
    fn empty_pages_are_absent() {
        let src = FakeSource(vec![Ok(None), Ok(Some("two")), Ok(None)]);
        let out = extract_pages(&src, &[1, 2, 3]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].as_ref().unwrap().page_num, 2);
    }

    #[test]
    fn pages_come_out_ascending_and_in_range() {
        let src = FakeSource(vec![Ok(Some("a")), Ok(Some("b")), Ok(Some("c"))]);
        let out = extract_pages(&src, &[3, 1, 3, 0, 9]);
        let nums: Vec<usize> = out.iter().map(|r| r.as_ref().unwrap().page_num).collect();
        assert_eq!(nums, vec![1, 3]);
    }
}
