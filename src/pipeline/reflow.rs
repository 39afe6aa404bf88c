//! Reflow tokenisation: buffer → paragraphs → lines → styled words.
//!
//! Paragraphs are separated by a blank line (`"\n\n"`), lines by a single
//! `'\n'`, words by whitespace. Every word is split into its first character,
//! set bold, and the remainder, set regular.

use crate::error::WordError;
use tracing::warn;

/// A word split for styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Word<'a> {
    /// First character, set in the bold face.
    pub first: char,
    /// Everything after the first character, set in the regular face.
    pub rest: &'a str,
}

impl Word<'_> {
    /// The bold part, encoded into `buf`.
    pub fn first_str<'b>(&self, buf: &'b mut [u8; 4]) -> &'b str {
        self.first.encode_utf8(buf)
    }
}

/// A non-blank line; may hold no words if every word was dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Line<'a> {
    pub words: Vec<Word<'a>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Paragraph<'a> {
    pub lines: Vec<Line<'a>>,
}

/// Tokenised buffer plus the words that could not be styled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reflow<'a> {
    pub paragraphs: Vec<Paragraph<'a>>,
    pub dropped: Vec<WordError>,
}

impl Reflow<'_> {
    pub fn word_count(&self) -> usize {
        self.paragraphs
            .iter()
            .flat_map(|p| &p.lines)
            .map(|l| l.words.len())
            .sum()
    }
}

/// Split a whitespace-free token into bold lead and regular remainder.
///
/// A token that starts with U+FFFD has lost its first character to an
/// upstream decoding failure; it is rejected rather than styled.
pub fn split_word(token: &str) -> Result<Word<'_>, WordError> {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) if first != char::REPLACEMENT_CHARACTER => Ok(Word {
            first,
            rest: chars.as_str(),
        }),
        _ => Err(WordError::UndecodableLead {
            token: token.to_string(),
        }),
    }
}

/// Tokenise an aggregated buffer.
///
/// Blank lines vanish. Paragraphs left with no lines at all are dropped, so
/// the trailing separator of the last page adds no spacing.
pub fn reflow(buffer: &str) -> Reflow<'_> {
    let mut out = Reflow::default();

    for raw_paragraph in buffer.split("\n\n") {
        let mut paragraph = Paragraph::default();

        for raw_line in raw_paragraph.trim().split('\n') {
            if raw_line.trim().is_empty() {
                continue;
            }

            let mut line = Line::default();
            for token in raw_line.split_whitespace() {
                match split_word(token) {
                    Ok(word) => line.words.push(word),
                    Err(e) => {
                        warn!("{}", e);
                        out.dropped.push(e);
                    }
                }
            }
            paragraph.lines.push(line);
        }

        if !paragraph.lines.is_empty() {
            out.paragraphs.push(paragraph);
        }
    }

    out
}
