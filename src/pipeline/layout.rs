//! Line fitting and pagination.
//!
//! Turns tokenised paragraphs into a [`LayoutPlan`]: a pure description of
//! output pages and the positioned text runs on each. Nothing here touches
//! pdfium; [`crate::pipeline::render`] emits the plan.
//!
//! The pen works like a typewriter carriage in page coordinates measured in
//! millimetres from the top-left corner:
//!
//! * each word is set as a bold first character followed by its regular
//!   remainder, with one regular space between words,
//! * a word that does not fit the rest of the line moves to the next line,
//!   a word wider than the whole column is broken between characters,
//! * every line advances the pen by the line height, every paragraph adds
//!   the paragraph gap,
//! * before text is placed on a line that would cross the bottom margin, a
//!   new page starts and [`PageBreakPolicy`] decides where the pen goes.
//!
//! Every [`PlacedRun`] carries its own face, so no font state survives a page
//! break: the first run of a page is in the face its text calls for, and
//! continuations of a broken remainder stay regular.
//!
//! Text is measured one character at a time while it is placed, so a token
//! of any length costs a single pass.

use crate::config::LayoutMetrics;
use crate::fonts::{Face, TextMeasure, MM_PER_PT};
use crate::pipeline::reflow::{Reflow, Word};
use serde::{Deserialize, Serialize};

const EPSILON: f32 = 1e-3;

/// Pen position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cursor {
    pub x_mm: f32,
    /// Top of the current line.
    pub y_mm: f32,
}

/// Where the pen starts on every new output page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageBreakPolicy;

impl PageBreakPolicy {
    /// Pen state at the top-left of the text area of a fresh page.
    pub fn cursor_on_new_page(&self, metrics: &LayoutMetrics) -> Cursor {
        Cursor {
            x_mm: metrics.left(),
            y_mm: metrics.top(),
        }
    }
}

/// A run of text in one face at a fixed position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedRun {
    pub text: String,
    pub face: Face,
    pub x_mm: f32,
    /// Top of the line the run sits on.
    pub line_top_mm: f32,
    /// Baseline, measured from the top of the page.
    pub baseline_mm: f32,
    pub width_mm: f32,
}

/// One output page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    pub runs: Vec<PlacedRun>,
}

/// Complete description of the output document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutPlan {
    pub metrics: LayoutMetrics,
    pub pages: Vec<PageLayout>,
}

impl LayoutPlan {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn runs(&self) -> impl Iterator<Item = &PlacedRun> {
        self.pages.iter().flat_map(|p| &p.runs)
    }
}

/// Lay out a tokenised buffer. Always yields at least one page.
pub fn layout<M: TextMeasure + ?Sized>(
    reflow: &Reflow<'_>,
    measure: &M,
    metrics: &LayoutMetrics,
    policy: PageBreakPolicy,
) -> LayoutPlan {
    let mut composer = Composer::new(measure, *metrics, policy);

    for paragraph in &reflow.paragraphs {
        for line in &paragraph.lines {
            for (i, word) in line.words.iter().enumerate() {
                if i > 0 {
                    composer.write_space();
                }
                composer.write_word(word);
            }
            composer.line_feed(metrics.line_height_mm);
        }
        composer.line_feed(metrics.paragraph_gap_mm);
    }

    LayoutPlan {
        metrics: *metrics,
        pages: composer.pages,
    }
}

struct Composer<'m, M: TextMeasure + ?Sized> {
    measure: &'m M,
    metrics: LayoutMetrics,
    policy: PageBreakPolicy,
    pages: Vec<PageLayout>,
    cursor: Cursor,
}

impl<'m, M: TextMeasure + ?Sized> Composer<'m, M> {
    fn new(measure: &'m M, metrics: LayoutMetrics, policy: PageBreakPolicy) -> Self {
        Self {
            measure,
            metrics,
            policy,
            pages: vec![PageLayout::default()],
            cursor: policy.cursor_on_new_page(&metrics),
        }
    }

    fn width(&self, text: &str, face: Face) -> f32 {
        self.measure
            .text_width_mm(text, face, self.metrics.font_size_pt)
    }

    fn char_width(&self, ch: char, face: Face) -> f32 {
        self.measure
            .char_width_mm(ch, face, self.metrics.font_size_pt)
    }

    fn at_line_start(&self) -> bool {
        self.cursor.x_mm <= self.metrics.left() + EPSILON
    }

    fn line_feed(&mut self, height: f32) {
        self.cursor.x_mm = self.metrics.left();
        self.cursor.y_mm += height;
    }

    fn break_page(&mut self) {
        self.cursor = self.policy.cursor_on_new_page(&self.metrics);
        self.pages.push(PageLayout::default());
    }

    fn ensure_room(&mut self) {
        if self.cursor.y_mm + self.metrics.line_height_mm > self.metrics.bottom() + EPSILON {
            self.break_page();
        }
    }

    fn write_word(&mut self, word: &Word<'_>) {
        let mut buf = [0u8; 4];
        let first = word.first_str(&mut buf);
        let width = self.char_width(word.first, Face::Bold) + self.width(word.rest, Face::Regular);
        if !self.at_line_start() && self.cursor.x_mm + width > self.metrics.right() + EPSILON {
            self.line_feed(self.metrics.line_height_mm);
        }
        self.place(first, Face::Bold);
        if !word.rest.is_empty() {
            self.place(word.rest, Face::Regular);
        }
    }

    /// A regular space, or a line feed when the space would overflow.
    fn write_space(&mut self) {
        let width = self.char_width(' ', Face::Regular);
        if self.cursor.x_mm + width > self.metrics.right() + EPSILON {
            self.line_feed(self.metrics.line_height_mm);
        } else {
            self.emit(" ", Face::Regular, width);
        }
    }

    fn place(&mut self, text: &str, face: Face) {
        let mut rest = text;
        while !rest.is_empty() {
            self.ensure_room();
            let avail = self.metrics.right() - self.cursor.x_mm;
            let (mut split, mut width) = self.fitting_prefix(rest, face, avail);
            if split == rest.len() {
                self.emit(rest, face, width);
                return;
            }

            if split == 0 {
                if !self.at_line_start() {
                    self.line_feed(self.metrics.line_height_mm);
                    continue;
                }
                // Not even one character fits an empty line; set it anyway.
                let Some(ch) = rest.chars().next() else {
                    return;
                };
                split = ch.len_utf8();
                width = self.char_width(ch, face);
            }
            self.emit(&rest[..split], face, width);
            rest = &rest[split..];
            self.line_feed(self.metrics.line_height_mm);
        }
    }

    /// Byte length and width of the longest prefix of `text` no wider than
    /// `avail`. Stops at the first character that overflows.
    fn fitting_prefix(&self, text: &str, face: Face, avail: f32) -> (usize, f32) {
        let mut used = 0.0;
        for (i, ch) in text.char_indices() {
            let w = self.char_width(ch, face);
            if used + w > avail + EPSILON {
                return (i, used);
            }
            used += w;
        }
        (text.len(), used)
    }

    fn emit(&mut self, text: &str, face: Face, width: f32) {
        let font_mm = self.metrics.font_size_pt * MM_PER_PT;
        let run = PlacedRun {
            text: text.to_string(),
            face,
            x_mm: self.cursor.x_mm,
            line_top_mm: self.cursor.y_mm,
            // Vertically centred in the line box.
            baseline_mm: self.cursor.y_mm + 0.5 * self.metrics.line_height_mm + 0.3 * font_mm,
            width_mm: width,
        };
        if let Some(page) = self.pages.last_mut() {
            page.runs.push(run);
        }
        self.cursor.x_mm += width;
    }
}
