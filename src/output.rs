//! Result types returned by the conversion entry points.

use crate::error::{PageError, WordError};
use serde::{Deserialize, Serialize};

/// MIME type of the restyled document.
pub const PDF_MIME_TYPE: &str = "application/pdf";

/// File name offered to clients downloading the restyled document.
pub const DEFAULT_OUTPUT_FILENAME: &str = "book.pdf";

/// Multipart form field carrying an uploaded PDF.
pub const UPLOAD_FIELD_NAME: &str = "pdfFile";

/// Everything a conversion run produced.
///
/// Serialises to a JSON report; the PDF bytes themselves are left out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutput {
    /// The restyled document.
    #[serde(skip)]
    pub pdf: Vec<u8>,
    /// The page-marked text the document was laid out from.
    pub text: String,
    pub metadata: DocumentMetadata,
    pub stats: ConversionStats,
    /// Pages left out because their text could not be extracted or decoded.
    pub skipped_pages: Vec<PageError>,
    /// Words left out because their first character could not be decoded.
    pub dropped_words: Vec<WordError>,
}

impl ConversionOutput {
    /// Value for a `Content-Length` header.
    pub fn content_length(&self) -> usize {
        self.pdf.len()
    }

    /// Value for a `Content-Disposition` header.
    pub fn content_disposition(&self) -> String {
        content_disposition(DEFAULT_OUTPUT_FILENAME)
    }
}

/// `attachment; filename="<name>"`, with quotes and backslashes escaped.
pub fn content_disposition(filename: &str) -> String {
    let escaped = filename.replace('\\', "\\\\").replace('"', "\\\"");
    format!("attachment; filename=\"{}\"", escaped)
}

/// Page-marked text of a document, without a restyled rendition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedText {
    pub text: String,
    pub metadata: DocumentMetadata,
    pub skipped_pages: Vec<PageError>,
}

/// Counters and timings for one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Pages in the source document.
    pub total_pages: usize,
    /// Pages picked by the page selection.
    pub selected_pages: usize,
    /// Pages whose text made it into the output.
    pub converted_pages: usize,
    /// Selected pages with no content at all.
    pub empty_pages: usize,
    /// Selected pages that failed extraction or decoding.
    pub failed_pages: usize,
    pub words_rendered: usize,
    pub words_dropped: usize,
    /// Pages of the restyled document.
    pub output_pages: usize,
    pub output_bytes: usize,
    pub extract_duration_ms: u64,
    pub render_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// Information about the source document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub creation_date: Option<String>,
    pub modification_date: Option<String>,
    pub page_count: usize,
    pub pdf_version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(pdf: Vec<u8>) -> ConversionOutput {
        ConversionOutput {
            pdf,
            text: "Page -> 1\nhi\n\n".into(),
            metadata: DocumentMetadata::default(),
            stats: ConversionStats::default(),
            skipped_pages: vec![PageError::Encoding {
                page: 2,
                detail: "bad".into(),
            }],
            dropped_words: vec![],
        }
    }

    #[test]
    fn transport_headers() {
        let out = output(b"%PDF-1.7 fake".to_vec());
        assert_eq!(out.content_length(), 13);
        assert_eq!(out.content_disposition(), "attachment; filename=\"book.pdf\"");
        assert_eq!(PDF_MIME_TYPE, "application/pdf");
        assert_eq!(UPLOAD_FIELD_NAME, "pdfFile");
    }

    #[test]
    fn disposition_escapes_quotes() {
        assert_eq!(
            content_disposition("my \"book\".pdf"),
            "attachment; filename=\"my \\\"book\\\".pdf\""
        );
    }

    #[test]
    fn json_report_omits_pdf_bytes() {
        let out = output(vec![0u8; 1024]);
        let json = serde_json::to_value(&out).unwrap();
        assert!(json.get("pdf").is_none());
        assert_eq!(json["skipped_pages"][0]["Encoding"]["page"], 2);
        assert_eq!(json["text"], "Page -> 1\nhi\n\n");
    }
}
