//! Conversion entry points.
//!
//! A run is synchronous from start to finish: open the document, read the
//! selected pages into one [`AggregatedBuffer`], lay the buffer out and write
//! the restyled document. The async entry points move the whole run onto a
//! `spawn_blocking` thread since pdfium calls are blocking and CPU-bound.
//!
//! Fonts are loaded once by the caller into a [`FontSet`] and shared between
//! runs through an `Arc`; every other value is owned by the run.

use crate::config::{ConversionConfig, LayoutMetrics, PageSelection};
use crate::engine;
use crate::error::{BionicPdfError, PageError, WordError};
use crate::fonts::{FontSet, TextMeasure};
use crate::output::{ConversionOutput, ConversionStats, DocumentMetadata, ExtractedText};
use crate::pipeline::aggregate::AggregatedBuffer;
use crate::pipeline::encoding::decode_page;
use crate::pipeline::extract::{extract_pages, PageSource, PdfiumPageSource};
use crate::pipeline::input::PdfInput;
use crate::pipeline::layout::{layout, LayoutPlan, PageBreakPolicy};
use crate::pipeline::reflow::reflow;
use crate::pipeline::render;
use crate::pipeline::whitespace::NormalizedPageText;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Restyle a PDF.
///
/// # Returns
/// `Ok(ConversionOutput)` whenever a document could be produced, even if some
/// pages or words were left out (see `skipped_pages` and `dropped_words`).
///
/// # Errors
/// Returns `Err(BionicPdfError)` only for fatal errors:
/// - input missing, unreadable, too large or not a PDF
/// - the document cannot be parsed or needs a password
/// - the page selection matches no page
/// - the output document cannot be built or serialised
pub async fn convert(
    input: PdfInput,
    fonts: Arc<FontSet>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, BionicPdfError> {
    let config = config.clone();
    tokio::task::spawn_blocking(move || convert_sync(input, &fonts, &config))
        .await
        .map_err(|e| BionicPdfError::Internal(format!("Conversion task panicked: {}", e)))?
}

/// Restyle an in-memory PDF, e.g. an upload.
pub async fn convert_from_bytes(
    bytes: Vec<u8>,
    fonts: Arc<FontSet>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, BionicPdfError> {
    convert(PdfInput::from_bytes(bytes), fonts, config).await
}

/// Restyle a PDF and write the result to `output_path`.
///
/// The file is written to a temporary file in the destination directory and
/// renamed into place, so `output_path` never holds a partial document.
pub async fn convert_to_file(
    input: PdfInput,
    output_path: impl AsRef<Path>,
    fonts: Arc<FontSet>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, BionicPdfError> {
    let config = config.clone();
    let path = output_path.as_ref().to_path_buf();
    tokio::task::spawn_blocking(move || -> Result<ConversionOutput, BionicPdfError> {
        let output = run_conversion(input, &fonts, &config)?;
        write_atomic(&path, &output.pdf)?;
        info!("Wrote {} ({} bytes)", path.display(), output.pdf.len());
        notify_complete(&config, &output.stats);
        Ok(output)
    })
    .await
    .map_err(|e| BionicPdfError::Internal(format!("Conversion task panicked: {}", e)))?
}

/// Blocking form of [`convert`]. Must not be called from an async worker.
pub fn convert_sync(
    input: PdfInput,
    fonts: &FontSet,
    config: &ConversionConfig,
) -> Result<ConversionOutput, BionicPdfError> {
    let output = run_conversion(input, fonts, config)?;
    notify_complete(config, &output.stats);
    Ok(output)
}

/// Report a finished run. Fires only once the result has been delivered.
fn notify_complete(config: &ConversionConfig, stats: &ConversionStats) {
    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_complete(stats.selected_pages, stats.converted_pages);
    }
}

/// One conversion without the completion event.
fn run_conversion(
    input: PdfInput,
    fonts: &FontSet,
    config: &ConversionConfig,
) -> Result<ConversionOutput, BionicPdfError> {
    let total_start = Instant::now();
    info!("Starting conversion: {}", input.source_name());

    let pdfium = engine::bind_pdfium()?;
    let document = input.open(&pdfium, config.password.as_deref(), config.max_input_bytes)?;
    let source = PdfiumPageSource::new(document);
    let metadata = source.metadata();
    info!("PDF has {} pages", metadata.page_count);

    let page_numbers = select_pages(&config.pages, metadata.page_count)?;

    let extract_start = Instant::now();
    let assembled = assemble_text(&source, &page_numbers, config);
    let extract_duration_ms = extract_start.elapsed().as_millis() as u64;
    drop(source);

    let render_start = Instant::now();
    let planned = plan_text(assembled.buffer.as_str(), fonts, &config.layout);
    let pdf = render::render_plan(&pdfium, &planned.plan, fonts)?;
    let render_duration_ms = render_start.elapsed().as_millis() as u64;

    let converted = assembled.buffer.pages().len();
    let stats = ConversionStats {
        total_pages: metadata.page_count,
        selected_pages: page_numbers.len(),
        converted_pages: converted,
        empty_pages: assembled.empty_pages,
        failed_pages: assembled.skipped_pages.len(),
        words_rendered: planned.words,
        words_dropped: planned.dropped_words.len(),
        output_pages: planned.plan.page_count(),
        output_bytes: pdf.len(),
        extract_duration_ms,
        render_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Conversion complete: {}/{} pages, {} words, {} output pages, {}ms total",
        converted,
        page_numbers.len(),
        stats.words_rendered,
        stats.output_pages,
        stats.total_duration_ms
    );

    Ok(ConversionOutput {
        pdf,
        text: assembled.buffer.into_string(),
        metadata,
        stats,
        skipped_pages: assembled.skipped_pages,
        dropped_words: planned.dropped_words,
    })
}

/// Read and normalise the selected pages without producing a document.
///
/// Needs no fonts.
pub async fn extract_text(
    input: PdfInput,
    config: &ConversionConfig,
) -> Result<ExtractedText, BionicPdfError> {
    let config = config.clone();
    tokio::task::spawn_blocking(move || -> Result<ExtractedText, BionicPdfError> {
        let pdfium = engine::bind_pdfium()?;
        let document =
            input.open(&pdfium, config.password.as_deref(), config.max_input_bytes)?;
        let source = PdfiumPageSource::new(document);
        let metadata = source.metadata();
        let page_numbers = select_pages(&config.pages, metadata.page_count)?;
        let assembled = assemble_text(&source, &page_numbers, &config);
        if let Some(ref cb) = config.progress_callback {
            cb.on_conversion_complete(page_numbers.len(), assembled.buffer.pages().len());
        }
        Ok(ExtractedText {
            text: assembled.buffer.into_string(),
            metadata,
            skipped_pages: assembled.skipped_pages,
        })
    })
    .await
    .map_err(|e| BionicPdfError::Internal(format!("Extraction task panicked: {}", e)))?
}

/// Extract PDF metadata without converting content.
pub async fn inspect(
    input: PdfInput,
    config: &ConversionConfig,
) -> Result<DocumentMetadata, BionicPdfError> {
    let password = config.password.clone();
    let max_bytes = config.max_input_bytes;
    tokio::task::spawn_blocking(move || -> Result<DocumentMetadata, BionicPdfError> {
        let pdfium = engine::bind_pdfium()?;
        let document = input.open(&pdfium, password.as_deref(), max_bytes)?;
        let metadata = PdfiumPageSource::new(document).metadata();
        Ok(metadata)
    })
    .await
    .map_err(|e| BionicPdfError::Internal(format!("Metadata task panicked: {}", e)))?
}

// ── Run stages ───────────────────────────────────────────────────────────

/// Text of one run, ready for layout.
#[derive(Debug, Clone, Default)]
pub struct AssembledText {
    pub buffer: AggregatedBuffer,
    /// Pages that failed extraction or decoding, ascending.
    pub skipped_pages: Vec<PageError>,
    /// Selected pages with no content.
    pub empty_pages: usize,
}

/// Extract, decode, normalise and aggregate `page_numbers` of `source`.
///
/// A page that fails at any step is reported in `skipped_pages` and left out
/// of the buffer; the remaining pages are unaffected.
pub fn assemble_text(
    source: &dyn PageSource,
    page_numbers: &[usize],
    config: &ConversionConfig,
) -> AssembledText {
    let total = page_numbers.len();
    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_start(total);
    }

    let mut out = AssembledText::default();
    let mut seen = 0;

    for result in extract_pages(source, page_numbers) {
        seen += 1;
        let page = result
            .and_then(|raw| decode_page(raw, &config.fallback_encoding))
            .map(|(page_num, text)| NormalizedPageText::new(page_num, &text));

        match page {
            Ok(page) => {
                if let Some(ref cb) = config.progress_callback {
                    cb.on_page_extracted(page.page_num, total, page.text().len());
                }
                out.buffer.push_page(&page, &config.page_marker);
            }
            Err(e) => {
                debug!("Skipping page {}: {}", e.page(), e);
                if let Some(ref cb) = config.progress_callback {
                    cb.on_page_skipped(e.page(), total, &e.to_string());
                }
                out.skipped_pages.push(e);
            }
        }
    }

    let in_range = page_numbers
        .iter()
        .filter(|&&p| p >= 1 && p <= source.page_count())
        .count();
    out.empty_pages = in_range.saturating_sub(seen);
    out
}

/// Layout of one buffer plus what reflow had to leave out.
#[derive(Debug, Clone)]
pub struct PlannedText {
    pub plan: LayoutPlan,
    /// Words placed on the output pages.
    pub words: usize,
    pub dropped_words: Vec<WordError>,
}

/// Reflow `text` and lay it out on pages of `metrics`.
pub fn plan_text<M: TextMeasure + ?Sized>(
    text: &str,
    measure: &M,
    metrics: &LayoutMetrics,
) -> PlannedText {
    let reflowed = reflow(text);
    let plan = layout(&reflowed, measure, metrics, PageBreakPolicy::default());
    debug!(
        "Laid out {} paragraphs, {} words on {} pages",
        reflowed.paragraphs.len(),
        reflowed.word_count(),
        plan.page_count()
    );
    PlannedText {
        plan,
        words: reflowed.word_count(),
        dropped_words: reflowed.dropped,
    }
}

/// Turn a page selection into page numbers, rejecting one that matches nothing.
///
/// Selecting every page of an empty document is not an error.
pub fn select_pages(
    selection: &PageSelection,
    total_pages: usize,
) -> Result<Vec<usize>, BionicPdfError> {
    let pages = selection.to_page_numbers(total_pages);
    if pages.is_empty() && !matches!(selection, PageSelection::All) {
        let page = match selection {
            PageSelection::Single(p) | PageSelection::Range(p, _) => *p,
            PageSelection::Set(set) => set.iter().copied().min().unwrap_or(0),
            PageSelection::All => 0,
        };
        return Err(BionicPdfError::PageOutOfRange {
            page,
            total: total_pages,
        });
    }
    debug!("Selected {} of {} pages", pages.len(), total_pages);
    Ok(pages)
}

/// Write `bytes` to `path` through a temporary file in the same directory.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), BionicPdfError> {
    let write_failed = |source: std::io::Error| BionicPdfError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(write_failed)?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(write_failed)?;
    tmp.write_all(bytes).map_err(write_failed)?;
    tmp.as_file().sync_all().map_err(write_failed)?;
    tmp.persist(path).map_err(|e| write_failed(e.error))?;
    Ok(())
}
