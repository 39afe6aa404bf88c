//! Configuration types for a restyling run.
//!
//! All run behaviour is controlled through [`ConversionConfig`], built via its
//! [`ConversionConfigBuilder`]. Fonts are not part of the config: they are
//! loaded once at start-up into a [`crate::fonts::FontSet`] and passed next to
//! the config, so a config stays cheap to clone per run.

use crate::error::BionicPdfError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default cap on the size of an input document: 10 MiB.
pub const DEFAULT_MAX_INPUT_BYTES: u64 = 10 << 20;

/// Configuration for one PDF restyling run.
///
/// # Example
/// ```rust
/// use bionic_pdf::{ConversionConfig, PageSelection};
///
/// let config = ConversionConfig::builder()
///     .pages(PageSelection::Range(1, 10))
///     .font_size_pt(11.0)
///     .build()
///     .unwrap();
/// assert_eq!(config.layout.font_size_pt, 11.0);
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Pages of the source document to read. Default: all.
    pub pages: PageSelection,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// How page text that is not valid UTF-8 is decoded. Default: ISO-8859-1.
    pub fallback_encoding: FallbackEncoding,

    /// Header written before each page's text. Default: `Page -> N`.
    pub page_marker: PageMarker,

    /// Page geometry and type metrics of the output document.
    pub layout: LayoutMetrics,

    /// Largest accepted input document in bytes. Default: 10 MiB.
    pub max_input_bytes: u64,

    /// Optional receiver for per-page progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            pages: PageSelection::default(),
            password: None,
            fallback_encoding: FallbackEncoding::default(),
            page_marker: PageMarker::default(),
            layout: LayoutMetrics::default(),
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("pages", &self.pages)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("fallback_encoding", &self.fallback_encoding)
            .field("page_marker", &self.page_marker)
            .field("layout", &self.layout)
            .field("max_input_bytes", &self.max_input_bytes)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn pages(mut self, selection: PageSelection) -> Self {
        self.config.pages = selection;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn fallback_encoding(mut self, encoding: FallbackEncoding) -> Self {
        self.config.fallback_encoding = encoding;
        self
    }

    pub fn page_marker(mut self, marker: PageMarker) -> Self {
        self.config.page_marker = marker;
        self
    }

    pub fn layout(mut self, layout: LayoutMetrics) -> Self {
        self.config.layout = layout;
        self
    }

    pub fn font_size_pt(mut self, pt: f32) -> Self {
        self.config.layout.font_size_pt = pt.clamp(4.0, 72.0);
        self
    }

    pub fn line_height_mm(mut self, mm: f32) -> Self {
        self.config.layout.line_height_mm = mm;
        self
    }

    pub fn paragraph_gap_mm(mut self, mm: f32) -> Self {
        self.config.layout.paragraph_gap_mm = mm;
        self
    }

    pub fn margin_mm(mut self, mm: f32) -> Self {
        self.config.layout.margin_mm = mm.max(0.0);
        self
    }

    pub fn max_input_bytes(mut self, bytes: u64) -> Self {
        self.config.max_input_bytes = bytes;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, BionicPdfError> {
        let c = &self.config;
        c.layout.validate()?;
        if c.max_input_bytes == 0 {
            return Err(BionicPdfError::InvalidConfig(
                "max_input_bytes must be ≥ 1".into(),
            ));
        }
        if let FallbackEncoding::Labeled(label) = &c.fallback_encoding {
            if encoding_rs::Encoding::for_label(label.as_bytes()).is_none() {
                return Err(BionicPdfError::InvalidConfig(format!(
                    "unknown fallback encoding '{label}'"
                )));
            }
        }
        Ok(self.config)
    }
}

// ── Layout ───────────────────────────────────────────────────────────────

/// Page geometry and type metrics of the output document, in millimetres
/// (font size in points).
///
/// The default is portrait A4 with 20 mm margins on all four sides, 12 pt
/// type, 5 mm lines and a 10 mm gap after each paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutMetrics {
    pub page_width_mm: f32,
    pub page_height_mm: f32,
    /// Applied to the top, bottom, left and right edge.
    pub margin_mm: f32,
    pub line_height_mm: f32,
    /// Extra advance after the last line of a paragraph.
    pub paragraph_gap_mm: f32,
    pub font_size_pt: f32,
}

impl Default for LayoutMetrics {
    fn default() -> Self {
        Self {
            page_width_mm: 210.0,
            page_height_mm: 297.0,
            margin_mm: 20.0,
            line_height_mm: 5.0,
            paragraph_gap_mm: 10.0,
            font_size_pt: 12.0,
        }
    }
}

impl LayoutMetrics {
    /// Left edge of the text column.
    pub fn left(&self) -> f32 {
        self.margin_mm
    }

    /// Right edge of the text column.
    pub fn right(&self) -> f32 {
        self.page_width_mm - self.margin_mm
    }

    /// Top of the first line on a page.
    pub fn top(&self) -> f32 {
        self.margin_mm
    }

    /// A line whose bottom would pass this offset starts a new page.
    pub fn bottom(&self) -> f32 {
        self.page_height_mm - self.margin_mm
    }

    fn validate(&self) -> Result<(), BionicPdfError> {
        let fields = [
            ("page width", self.page_width_mm),
            ("page height", self.page_height_mm),
            ("margin", self.margin_mm),
            ("line height", self.line_height_mm),
            ("paragraph gap", self.paragraph_gap_mm),
            ("font size", self.font_size_pt),
        ];
        if let Some((name, value)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(BionicPdfError::InvalidConfig(format!(
                "{name} must be a finite number (got {value})"
            )));
        }
        if self.font_size_pt <= 0.0 {
            return Err(BionicPdfError::InvalidConfig(
                "font size must be > 0".into(),
            ));
        }
        if self.right() - self.left() <= 0.0 {
            return Err(BionicPdfError::InvalidConfig(format!(
                "margins of {} mm leave no room on a {} mm wide page",
                self.margin_mm, self.page_width_mm
            )));
        }
        if self.line_height_mm <= 0.0 {
            return Err(BionicPdfError::InvalidConfig(
                "line height must be > 0".into(),
            ));
        }
        if self.paragraph_gap_mm < 0.0 {
            return Err(BionicPdfError::InvalidConfig(
                "paragraph gap must be ≥ 0".into(),
            ));
        }
        if self.bottom() - self.top() < self.line_height_mm {
            return Err(BionicPdfError::InvalidConfig(format!(
                "a {} mm line does not fit between the margins",
                self.line_height_mm
            )));
        }
        Ok(())
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Specifies which pages of the PDF to read.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub enum PageSelection {
    /// All pages (default).
    #[default]
    All,
    /// A single page (1-indexed).
    Single(usize),
    /// A contiguous range of pages (1-indexed, inclusive).
    Range(usize, usize),
    /// Specific pages (1-indexed, deduplicated).
    Set(Vec<usize>),
}

impl PageSelection {
    /// Expand the selection into a sorted, deduplicated list of 1-indexed page numbers.
    pub fn to_page_numbers(&self, total_pages: usize) -> Vec<usize> {
        let mut pages: Vec<usize> = match self {
            PageSelection::All => (1..=total_pages).collect(),
            PageSelection::Single(p) => {
                if *p >= 1 && *p <= total_pages {
                    vec![*p]
                } else {
                    vec![]
                }
            }
            PageSelection::Range(start, end) => {
                let s = (*start).max(1);
                let e = (*end).min(total_pages);
                (s..=e).collect()
            }
            PageSelection::Set(pages) => pages
                .iter()
                .copied()
                .filter(|&p| p >= 1 && p <= total_pages)
                .collect(),
        };
        pages.sort_unstable();
        pages.dedup();
        pages
    }
}

/// Header line written before each page's text in the aggregated buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageMarker {
    /// `Page -> N` (default).
    #[default]
    Arrow,
    /// `<prefix> N`.
    Custom(String),
}

impl PageMarker {
    /// Render the header for the given page number (1-indexed).
    pub fn render(&self, page_num: usize) -> String {
        match self {
            PageMarker::Arrow => format!("Page -> {page_num}"),
            PageMarker::Custom(prefix) => format!("{prefix} {page_num}"),
        }
    }
}

/// Decoder applied to page text that is not valid UTF-8.
///
/// The fallback is an assumption, not a detection: text in any other legacy
/// encoding is decoded as if it were the configured one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FallbackEncoding {
    /// ISO-8859-1: byte `b` becomes `U+00bb`. Never fails. (default)
    #[default]
    Latin1,
    /// Any WHATWG encoding label understood by `encoding_rs`, e.g.
    /// `windows-1252` or `shift_jis`. Malformed input is an error.
    Labeled(String),
}

impl FallbackEncoding {
    /// Parse a user-supplied label.
    ///
    /// `latin1`, `iso-8859-1` and friends select the exact ISO-8859-1
    /// mapping; WHATWG would otherwise alias them to windows-1252.
    pub fn from_label(label: &str) -> Result<Self, BionicPdfError> {
        let norm = label.trim().to_ascii_lowercase();
        if matches!(
            norm.as_str(),
            "latin1" | "latin-1" | "l1" | "iso-8859-1" | "iso8859-1" | "iso_8859-1"
        ) {
            return Ok(FallbackEncoding::Latin1);
        }
        match encoding_rs::Encoding::for_label(norm.as_bytes()) {
            Some(enc) => Ok(FallbackEncoding::Labeled(enc.name().to_string())),
            None => Err(BionicPdfError::InvalidConfig(format!(
                "unknown fallback encoding '{label}'"
            ))),
        }
    }
}
