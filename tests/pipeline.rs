//! Integration tests for the text and layout stages.
//!
//! Pages come from in-memory sources and text is measured with a fixed-pitch
//! stand-in, so these tests need neither pdfium nor font files.

use bionic_pdf::convert::{assemble_text, plan_text};
use bionic_pdf::pipeline::extract::PageSource;
use bionic_pdf::{ConversionConfig, Face, LayoutMetrics, PageSelection, TextMeasure};

// ── Test helpers ─────────────────────────────────────────────────────────────

/// A document whose pages are given up front.
struct MemoryDocument {
    pages: Vec<Result<Option<Vec<u8>>, String>>,
}

impl MemoryDocument {
    fn new() -> Self {
        Self { pages: Vec::new() }
    }

    fn text(mut self, t: &str) -> Self {
        self.pages.push(Ok(Some(t.as_bytes().to_vec())));
        self
    }

    fn bytes(mut self, b: &[u8]) -> Self {
        self.pages.push(Ok(Some(b.to_vec())));
        self
    }

    fn empty(mut self) -> Self {
        self.pages.push(Ok(None));
        self
    }

    fn broken(mut self, why: &str) -> Self {
        self.pages.push(Err(why.to_string()));
        self
    }

    fn all_pages(&self) -> Vec<usize> {
        PageSelection::All.to_page_numbers(self.pages.len())
    }
}

impl PageSource for MemoryDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_text(&self, page_num: usize) -> Result<Option<Vec<u8>>, String> {
        self.pages[page_num - 1].clone()
    }
}

/// 2 mm per character, bold and regular alike.
struct FixedPitch;

impl TextMeasure for FixedPitch {
    fn text_width_mm(&self, text: &str, _face: Face, _size_pt: f32) -> f32 {
        text.chars().count() as f32 * 2.0
    }
}

fn run_text(doc: &MemoryDocument) -> String {
    assemble_text(doc, &doc.all_pages(), &ConversionConfig::default())
        .buffer
        .into_string()
}

// ── Aggregation ──────────────────────────────────────────────────────────────

#[test]
fn pages_are_marked_in_order() {
    let doc = MemoryDocument::new()
        .text("The quick\nbrown fox.")
        .text("  jumps\tover  ")
        .text("the lazy dog");
    assert_eq!(
        run_text(&doc),
        "Page -> 1\nThe quick brown fox.\n\n\
         Page -> 2\njumps over\n\n\
         Page -> 3\nthe lazy dog\n\n"
    );
}

#[test]
fn failing_middle_page_is_absent() {
    let doc = MemoryDocument::new()
        .text("first")
        .broken("invalid content stream")
        .text("third");
    let assembled = assemble_text(&doc, &doc.all_pages(), &ConversionConfig::default());
    assert_eq!(assembled.buffer.pages(), &[1, 3]);
    assert!(!assembled.buffer.as_str().contains("Page -> 2"));
    assert_eq!(assembled.skipped_pages.len(), 1);
    assert_eq!(assembled.skipped_pages[0].page(), 2);
}

#[test]
fn empty_pages_leave_no_block() {
    let doc = MemoryDocument::new().empty().text("only").empty();
    let assembled = assemble_text(&doc, &doc.all_pages(), &ConversionConfig::default());
    assert_eq!(assembled.buffer.as_str(), "Page -> 2\nonly\n\n");
    assert_eq!(assembled.empty_pages, 2);
    assert!(assembled.skipped_pages.is_empty());
}

#[test]
fn latin1_page_is_repaired() {
    let doc = MemoryDocument::new().bytes(b"na\xefve r\xe9sum\xe9");
    assert_eq!(run_text(&doc), "Page -> 1\nnaïve résumé\n\n");
}

#[test]
fn page_selection_limits_the_buffer() {
    let doc = MemoryDocument::new().text("a").text("b").text("c").text("d");
    let pages = PageSelection::Set(vec![4, 2]).to_page_numbers(doc.page_count());
    let assembled = assemble_text(&doc, &pages, &ConversionConfig::default());
    assert_eq!(assembled.buffer.as_str(), "Page -> 2\nb\n\nPage -> 4\nd\n\n");
}

// ── Reflow and layout ────────────────────────────────────────────────────────

#[test]
fn every_word_gets_a_bold_lead() {
    let doc = MemoryDocument::new().text("héllo wörld");
    let text = run_text(&doc);
    let planned = plan_text(&text, &FixedPitch, &LayoutMetrics::default());

    let styled: Vec<(String, Face)> = planned
        .plan
        .runs()
        .map(|r| (r.text.clone(), r.face))
        .collect();
    let expect = |t: &str, f: Face| (t.to_string(), f);
    assert_eq!(
        styled,
        vec![
            // "Page -> 1"
            expect("P", Face::Bold),
            expect("age", Face::Regular),
            expect(" ", Face::Regular),
            expect("-", Face::Bold),
            expect(">", Face::Regular),
            expect(" ", Face::Regular),
            expect("1", Face::Bold),
            // "héllo wörld"
            expect("h", Face::Bold),
            expect("éllo", Face::Regular),
            expect(" ", Face::Regular),
            expect("w", Face::Bold),
            expect("örld", Face::Regular),
        ]
    );
    assert_eq!(planned.words, 5);
}

#[test]
fn pages_are_separated_by_a_paragraph_gap() {
    let doc = MemoryDocument::new().text("one").text("two");
    let text = run_text(&doc);
    let planned = plan_text(&text, &FixedPitch, &LayoutMetrics::default());

    let top_of = |t: &str| {
        planned
            .plan
            .runs()
            .find(|r| r.text == t)
            .map(|r| r.line_top_mm)
            .unwrap()
    };
    // marker line, text line, then 5 + 10 mm to the next marker
    assert_eq!(top_of("ne") - top_of("age"), 5.0);
    let second_marker = planned
        .plan
        .runs()
        .filter(|r| r.text == "age")
        .nth(1)
        .unwrap()
        .line_top_mm;
    assert_eq!(second_marker - top_of("ne"), 15.0);
    assert_eq!(top_of("wo") - second_marker, 5.0);
}

#[test]
fn undecodable_words_are_dropped_and_reported() {
    let doc = MemoryDocument::new().text("good \u{FFFD}bad fine");
    let text = run_text(&doc);
    let planned = plan_text(&text, &FixedPitch, &LayoutMetrics::default());
    assert_eq!(planned.dropped_words.len(), 1);
    assert!(planned.plan.runs().all(|r| !r.text.contains("bad")));
    assert!(planned.plan.runs().any(|r| r.text == "ine"));
    // the dropped word leaves a single space between its neighbours
    let line: String = planned
        .plan
        .runs()
        .skip_while(|r| r.text != "g")
        .map(|r| r.text.as_str())
        .collect();
    assert_eq!(line, "good fine");
}

#[test]
fn long_documents_paginate_within_the_margins() {
    let mut doc = MemoryDocument::new();
    for i in 0..40 {
        doc = doc.text(&format!("page {i} {}", "lorem ipsum dolor sit amet ".repeat(12)));
    }
    let text = run_text(&doc);
    let metrics = LayoutMetrics::default();
    let planned = plan_text(&text, &FixedPitch, &metrics);

    assert!(planned.plan.page_count() > 1);
    for page in &planned.plan.pages {
        // every page opens on a word's bold lead or a broken regular remainder
        assert_ne!(page.runs[0].text, " ");
        for run in &page.runs {
            assert!(run.x_mm >= metrics.left());
            assert!(run.x_mm + run.width_mm <= metrics.right() + 1e-3);
            assert!(run.line_top_mm >= metrics.top());
            assert!(run.line_top_mm + metrics.line_height_mm <= metrics.bottom() + 1e-3);
        }
    }
}

#[test]
fn empty_document_renders_one_blank_page() {
    let doc = MemoryDocument::new();
    let text = run_text(&doc);
    assert!(text.is_empty());
    let planned = plan_text(&text, &FixedPitch, &LayoutMetrics::default());
    assert_eq!(planned.plan.page_count(), 1);
    assert_eq!(planned.plan.runs().count(), 0);
}

// ── Isolation between runs ───────────────────────────────────────────────────

#[test]
fn concurrent_runs_do_not_share_text() {
    let make = |word: &'static str| {
        std::thread::spawn(move || {
            let mut doc = MemoryDocument::new();
            for _ in 0..200 {
                doc = doc.text(&format!("{word} {word} {word}"));
            }
            let text = run_text(&doc);
            let planned = plan_text(&text, &FixedPitch, &LayoutMetrics::default());
            (text, planned)
        })
    };

    let a = make("alpha");
    let b = make("omega");
    let (text_a, plan_a) = a.join().unwrap();
    let (text_b, plan_b) = b.join().unwrap();

    assert!(!text_a.contains("omega"));
    assert!(!text_b.contains("alpha"));
    assert_eq!(text_a.matches("Page -> ").count(), 200);
    assert_eq!(text_b.matches("Page -> ").count(), 200);
    assert!(plan_a.plan.runs().all(|r| r.text != "mega"));
    assert!(plan_b.plan.runs().all(|r| r.text != "lpha"));
}
