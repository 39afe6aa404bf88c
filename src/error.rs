//! Error types for the bionic-pdf library.
//!
//! Three error types reflect three failure scopes:
//!
//! * [`BionicPdfError`] — **Fatal**: the run cannot produce a document at all
//!   (input unreadable or not a PDF, fonts missing, output cannot be
//!   finalised). Returned as `Err(BionicPdfError)` from the `convert*`
//!   functions.
//!
//! * [`PageError`] — **Non-fatal**: one page's text could not be extracted or
//!   decoded. The page is left out of the output and the error is reported in
//!   [`crate::output::ConversionOutput::skipped_pages`].
//!
//! * [`WordError`] — **Non-fatal**: one word could not be styled. The word is
//!   dropped and the error is reported in
//!   [`crate::output::ConversionOutput::dropped_words`].

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the bionic-pdf library.
#[derive(Debug, Error)]
pub enum BionicPdfError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input does not start with the `%PDF` signature.
    #[error("Input '{source_name}' is not a valid PDF\nFirst bytes: {magic:?}")]
    NotAPdf { source_name: String, magic: Vec<u8> },

    /// The input exceeds the configured size cap.
    #[error("Input '{source_name}' is {size} bytes, above the {limit}-byte limit")]
    InputTooLarge {
        source_name: String,
        size: u64,
        limit: u64,
    },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{source_name}' could not be opened: {detail}")]
    CorruptPdf { source_name: String, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{source_name}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { source_name: String },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{source_name}'")]
    WrongPassword { source_name: String },

    /// The page selection matched no page of the document.
    #[error("Page {page} is out of range (document has {total} pages)")]
    PageOutOfRange { page: usize, total: usize },

    // ── Font errors ───────────────────────────────────────────────────────
    /// A font file could not be read.
    #[error("Font file '{path}' is unavailable: {source}")]
    FontUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A font file was read but is not a usable TrueType/OpenType face.
    #[error("Font file '{path}' is not a valid TrueType font: {detail}")]
    FontInvalid { path: PathBuf, detail: String },

    // ── Output errors ─────────────────────────────────────────────────────
    /// The restyled document could not be built or serialised.
    #[error("Failed to render output document: {detail}")]
    RenderFailed { detail: String },

    /// Could not create or write the output PDF file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Place libpdfium next to the executable, install it system-wide,\n\
or set PDFIUM_LIB_PATH=/path/to/libpdfium.\n\
Pre-built libraries: https://github.com/bblanchon/pdfium-binaries/releases\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single page.
///
/// The page is skipped; every other page is still converted.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum PageError {
    /// The page's text could not be extracted.
    #[error("Page {page}: text extraction failed: {detail}")]
    Extraction { page: usize, detail: String },

    /// The page's text could not be decoded into UTF-8.
    #[error("Page {page}: could not decode text: {detail}")]
    Encoding { page: usize, detail: String },
}

impl PageError {
    /// 1-indexed page number the error refers to.
    pub fn page(&self) -> usize {
        match self {
            PageError::Extraction { page, .. } | PageError::Encoding { page, .. } => *page,
        }
    }
}

/// A non-fatal error for a single word; the word is dropped from the output.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum WordError {
    /// The word starts with bytes that did not decode to a character.
    #[error("Word {token:?} has an undecodable first character")]
    UndecodableLead { token: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_too_large_display() {
        let e = BionicPdfError::InputTooLarge {
            source_name: "upload.pdf".into(),
            size: 20_000_000,
            limit: 10_485_760,
        };
        let msg = e.to_string();
        assert!(msg.contains("upload.pdf"), "got: {msg}");
        assert!(msg.contains("10485760"), "got: {msg}");
    }

    #[test]
    fn page_error_reports_page_number() {
        let e = PageError::Extraction {
            page: 2,
            detail: "broken content stream".into(),
        };
        assert_eq!(e.page(), 2);
        assert!(e.to_string().starts_with("Page 2:"));

        let e = PageError::Encoding {
            page: 7,
            detail: "malformed sequence".into(),
        };
        assert_eq!(e.page(), 7);
    }

    #[test]
    fn word_error_quotes_token() {
        let e = WordError::UndecodableLead {
            token: "\u{FFFD}bc".into(),
        };
        assert!(e.to_string().contains("\"\u{FFFD}bc\""));
    }

    #[test]
    fn page_error_serialises() {
        let e = PageError::Encoding {
            page: 3,
            detail: "x".into(),
        };
        let json = serde_json::to_string(&e).unwrap();
        let back: PageError = serde_json::from_str(&json).unwrap();
        assert_eq!(back, e);
    }
}
