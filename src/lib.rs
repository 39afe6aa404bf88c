//! # bionic-pdf
//!
//! Restyle PDF documents for "bionic reading": the text of every page is
//! extracted, cleaned up and reflowed into a fresh A4 document in which the
//! first character of each word is set bold and the rest regular.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input      validate a path or in-memory upload (size cap, %PDF)
//!  ├─ 2. Extract    plain text per page via pdfium; broken pages skipped
//!  ├─ 3. Encoding   repair non-UTF-8 text (ISO-8859-1 fallback)
//!  ├─ 4. Spaces     collapse all whitespace to single spaces
//!  ├─ 5. Aggregate  "Page -> N" marker + text block per page
//!  ├─ 6. Reflow     paragraphs → lines → bold-lead words
//!  ├─ 7. Layout     line fitting and page breaks
//!  └─ 8. Render     embedded TrueType faces, serialised PDF bytes
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bionic_pdf::{convert, ConversionConfig, FontPaths, FontSet, PdfInput};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Load the typeface once; share it between runs.
//!     let fonts = Arc::new(FontSet::load(&FontPaths::default())?);
//!     let config = ConversionConfig::default();
//!     let output = convert(PdfInput::from_path("document.pdf"), fonts, &config).await?;
//!     std::fs::write("book.pdf", &output.pdf)?;
//!     eprintln!("{} pages skipped", output.skipped_pages.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `bionic-pdf` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! bionic-pdf = { version = "0.1", default-features = false }
//! ```
//!
//! ## Native library
//!
//! pdfium is loaded at run time. See [`engine::bind_pdfium`] for the lookup
//! order.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod engine;
pub mod error;
pub mod fonts;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    ConversionConfig, ConversionConfigBuilder, FallbackEncoding, LayoutMetrics, PageMarker,
    PageSelection,
};
pub use convert::{
    convert, convert_from_bytes, convert_sync, convert_to_file, extract_text, inspect,
};
pub use error::{BionicPdfError, PageError, WordError};
pub use fonts::{Face, FontFace, FontPaths, FontSet, TextMeasure};
pub use output::{
    ConversionOutput, ConversionStats, DocumentMetadata, ExtractedText, DEFAULT_OUTPUT_FILENAME,
    PDF_MIME_TYPE, UPLOAD_FIELD_NAME,
};
pub use pipeline::input::PdfInput;
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
