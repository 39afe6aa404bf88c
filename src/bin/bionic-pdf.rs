//! CLI binary for bionic-pdf.
//!
//! A thin shim over the library crate that loads the fonts, maps CLI flags
//! to `ConversionConfig` and prints results.

use anyhow::{Context, Result};
use bionic_pdf::{
    convert_to_file, extract_text, inspect, ConversionConfig, ConversionProgressCallback,
    FallbackEncoding, FontPaths, FontSet, PageMarker, PageSelection, PdfInput, ProgressCallback,
    DEFAULT_OUTPUT_FILENAME,
};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a live bar plus one log line per skipped page.
struct CliProgressCallback {
    bar: ProgressBar,
    skipped: AtomicUsize,
}

impl CliProgressCallback {
    /// The bar length is set by `on_conversion_start` once the page count is known.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            skipped: AtomicUsize::new(0),
        })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Reading");
    }

    /// Stop the bar in place after a fatal error.
    fn abandon(&self) {
        self.bar.abandon_with_message(red("failed"));
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_conversion_start(&self, total_pages: usize) {
        self.activate_bar(total_pages);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Reading {total_pages} pages…"))
        ));
    }

    fn on_page_extracted(&self, page_num: usize, _total: usize, text_len: usize) {
        self.bar
            .set_message(format!("page {page_num} {}", dim(&format!("{text_len} bytes"))));
        self.bar.inc(1);
    }

    fn on_page_skipped(&self, page_num: usize, total: usize, error: &str) {
        self.skipped.fetch_add(1, Ordering::SeqCst);

        let msg: String = if error.chars().count() > 80 {
            error.chars().take(79).chain(['\u{2026}']).collect()
        } else {
            error.to_string()
        };

        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            red("✗"),
            page_num,
            total,
            red(&msg),
        ));
        self.bar.inc(1);
    }

    fn on_conversion_complete(&self, total_pages: usize, success_count: usize) {
        self.bar.finish_and_clear();
        let skipped = self.skipped.load(Ordering::SeqCst);

        if skipped == 0 {
            eprintln!(
                "{} {} pages restyled",
                green("✔"),
                bold(&success_count.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} pages restyled  ({} skipped)",
                if success_count == 0 {
                    red("✘")
                } else {
                    cyan("⚠")
                },
                bold(&success_count.to_string()),
                total_pages,
                red(&skipped.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Restyle into ./book.pdf
  bionic-pdf document.pdf

  # Choose the output file and the typeface
  bionic-pdf document.pdf -o restyled.pdf \
      --regular-font /usr/share/fonts/georgia.ttf --bold-font /usr/share/fonts/georgiab.ttf

  # Only some pages, smaller type
  bionic-pdf --pages 3-15 --font-size 10 paper.pdf

  # Legacy text that is neither UTF-8 nor Latin-1
  bionic-pdf --encoding windows-1252 old.pdf

  # Print the page-marked text instead of writing a PDF
  bionic-pdf --text-only document.pdf

  # Inspect PDF metadata
  bionic-pdf --inspect-only document.pdf

  # JSON run report (stats, skipped pages, dropped words)
  bionic-pdf --json document.pdf > report.json

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH         Path to libpdfium (otherwise ./ and the system path are searched)
  BIONIC_PDF_*            Default for the matching flag, e.g. BIONIC_PDF_REGULAR_FONT
  RUST_LOG                Log filter, overrides -v / -q
"#;

/// Restyle PDF documents for bionic reading.
#[derive(Parser, Debug)]
#[command(
    name = "bionic-pdf",
    version,
    about = "Restyle a PDF so the first letter of every word is bold",
    long_about = "Extract the text of a PDF, clean up its encoding and whitespace, and reflow it \
into a new A4 document where the first character of each word is set in bold.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path.
    input: PathBuf,

    /// Write the restyled PDF to this file.
    #[arg(short, long, env = "BIONIC_PDF_OUTPUT", default_value = DEFAULT_OUTPUT_FILENAME)]
    output: PathBuf,

    /// TrueType file for the regular face.
    #[arg(long, env = "BIONIC_PDF_REGULAR_FONT", default_value = "./georgia.ttf")]
    regular_font: PathBuf,

    /// TrueType file for the bold face.
    #[arg(long, env = "BIONIC_PDF_BOLD_FONT", default_value = "./georgiab.ttf")]
    bold_font: PathBuf,

    /// Page selection: all, 5, 3-15, or 1,3,5,7.
    #[arg(long, env = "BIONIC_PDF_PAGES", default_value = "all")]
    pages: String,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "BIONIC_PDF_PASSWORD")]
    password: Option<String>,

    /// Encoding assumed for page text that is not UTF-8 (latin1 or any WHATWG label).
    #[arg(long, env = "BIONIC_PDF_ENCODING", default_value = "latin1")]
    encoding: String,

    /// Page marker prefix; the page number is appended after a space.
    #[arg(long, env = "BIONIC_PDF_MARKER")]
    marker: Option<String>,

    /// Font size in points (4–72).
    #[arg(long, env = "BIONIC_PDF_FONT_SIZE", default_value_t = 12.0)]
    font_size: f32,

    /// Reject inputs larger than this many MiB.
    #[arg(long, env = "BIONIC_PDF_MAX_INPUT_MB", default_value_t = 10,
          value_parser = clap::value_parser!(u64).range(1..=4096))]
    max_input_mb: u64,

    /// Print the page-marked text instead of writing a PDF. No fonts needed.
    #[arg(long)]
    text_only: bool,

    /// Print PDF metadata only, no conversion.
    #[arg(long)]
    inspect_only: bool,

    /// Print a JSON report to stdout.
    #[arg(long, env = "BIONIC_PDF_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "BIONIC_PDF_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "BIONIC_PDF_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "BIONIC_PDF_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO logs while it is shown.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.inspect_only;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let input = PdfInput::from_path(&cli.input);

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let config = build_config(&cli, None)?;
        let meta = inspect(input, &config)
            .await
            .context("Failed to inspect PDF")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&meta).context("Failed to serialize metadata")?
            );
        } else {
            println!("File:         {}", cli.input.display());
            if let Some(ref t) = meta.title {
                println!("Title:        {}", t);
            }
            if let Some(ref a) = meta.author {
                println!("Author:       {}", a);
            }
            if let Some(ref s) = meta.subject {
                println!("Subject:      {}", s);
            }
            println!("Pages:        {}", meta.page_count);
            println!("PDF Version:  {}", meta.pdf_version);
            if let Some(ref p) = meta.producer {
                println!("Producer:     {}", p);
            }
            if let Some(ref c) = meta.creator {
                println!("Creator:      {}", c);
            }
        }
        return Ok(());
    }

    let cli_progress = show_progress.then(CliProgressCallback::new_dynamic);
    let progress_cb: Option<ProgressCallback> = cli_progress
        .clone()
        .map(|cb| cb as Arc<dyn ConversionProgressCallback>);
    let abandon = || {
        if let Some(ref cb) = cli_progress {
            cb.abandon();
        }
    };

    let config = build_config(&cli, progress_cb).inspect_err(|_| abandon())?;

    // ── Text-only mode ───────────────────────────────────────────────────
    if cli.text_only {
        let extracted = extract_text(input, &config)
            .await
            .inspect_err(|_| abandon())
            .context("Text extraction failed")?;

        if cli.json {
            let json =
                serde_json::to_string_pretty(&extracted).context("Failed to serialise output")?;
            println!("{json}");
        } else {
            io::stdout()
                .lock()
                .write_all(extracted.text.as_bytes())
                .context("Failed to write to stdout")?;
        }
        return Ok(());
    }

    // ── Restyle ──────────────────────────────────────────────────────────
    let fonts = FontSet::load(&FontPaths {
        regular: cli.regular_font.clone(),
        bold: cli.bold_font.clone(),
    })
    .inspect_err(|_| abandon())
    .context("Failed to load fonts")?;

    let output = convert_to_file(input, &cli.output, Arc::new(fonts), &config)
        .await
        .inspect_err(|_| abandon())
        .context("Conversion failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else if !cli.quiet {
        let stats = &output.stats;
        eprintln!(
            "{}  {}/{} pages  {} words  {} output pages  {}ms  →  {}",
            if stats.failed_pages == 0 {
                green("✔")
            } else {
                cyan("⚠")
            },
            stats.converted_pages,
            stats.selected_pages,
            stats.words_rendered,
            stats.output_pages,
            stats.total_duration_ms,
            bold(&cli.output.display().to_string()),
        );
        if stats.words_dropped > 0 {
            eprintln!(
                "   {}",
                dim(&format!("{} undecodable words dropped", stats.words_dropped))
            );
        }
    }

    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let pages = parse_pages(&cli.pages)?;
    let encoding = FallbackEncoding::from_label(&cli.encoding)
        .with_context(|| format!("Unsupported encoding '{}'", cli.encoding))?;

    let mut builder = ConversionConfig::builder()
        .pages(pages)
        .fallback_encoding(encoding)
        .font_size_pt(cli.font_size)
        .max_input_bytes(cli.max_input_mb << 20);

    if let Some(ref prefix) = cli.marker {
        builder = builder.page_marker(PageMarker::Custom(prefix.clone()));
    }
    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Parse `--pages` string into `PageSelection`.
fn parse_pages(s: &str) -> Result<PageSelection> {
    let s = s.trim().to_lowercase();

    if s == "all" {
        return Ok(PageSelection::All);
    }

    // Range: "3-15"
    if let Some((start, end)) = s.split_once('-') {
        let start: usize = start
            .trim()
            .parse()
            .context("Invalid start page in range")?;
        let end: usize = end.trim().parse().context("Invalid end page in range")?;

        if start < 1 {
            anyhow::bail!("Pages are 1-indexed, minimum is 1 (got {})", start);
        }
        if start > end {
            anyhow::bail!(
                "Invalid page range '{}-{}': start must be <= end",
                start,
                end
            );
        }

        return Ok(PageSelection::Range(start, end));
    }

    // Set: "1,3,5,7"
    if s.contains(',') {
        let pages: Vec<usize> = s
            .split(',')
            .map(|p| {
                p.trim()
                    .parse::<usize>()
                    .with_context(|| format!("Invalid page number: '{}'", p.trim()))
            })
            .collect::<Result<Vec<_>>>()?;

        if pages.contains(&0) {
            anyhow::bail!("Pages are 1-indexed, minimum is 1 (got 0)");
        }

        return Ok(PageSelection::Set(pages));
    }

    // Single page: "5"
    let page: usize = s.parse().context("Invalid page number")?;
    if page < 1 {
        anyhow::bail!("Pages are 1-indexed, minimum is 1 (got {})", page);
    }

    Ok(PageSelection::Single(page))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_flag_forms() {
        assert!(matches!(parse_pages("all").unwrap(), PageSelection::All));
        assert!(matches!(parse_pages(" 7 ").unwrap(), PageSelection::Single(7)));
        assert!(matches!(parse_pages("3-15").unwrap(), PageSelection::Range(3, 15)));
        match parse_pages("1,3,5").unwrap() {
            PageSelection::Set(p) => assert_eq!(p, vec![1, 3, 5]),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn pages_flag_rejects_bad_input() {
        assert!(parse_pages("0").is_err());
        assert!(parse_pages("5-2").is_err());
        assert!(parse_pages("1,x").is_err());
        assert!(parse_pages("0,2").is_err());
    }

    #[test]
    fn cli_defaults() {
        let cli = Cli::try_parse_from(["bionic-pdf", "in.pdf"]).unwrap();
        assert_eq!(cli.output, PathBuf::from("book.pdf"));
        assert_eq!(cli.encoding, "latin1");
        let config = build_config(&cli, None).unwrap();
        assert_eq!(config.max_input_bytes, 10 << 20);
        assert_eq!(config.layout.font_size_pt, 12.0);
    }

    #[test]
    fn non_finite_font_size_is_rejected() {
        let cli = Cli::try_parse_from(["bionic-pdf", "in.pdf", "--font-size", "NaN"]).unwrap();
        assert!(cli.font_size.is_nan());
        assert!(build_config(&cli, None).is_err());
    }
}
