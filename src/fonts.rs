//! Font loading and text measurement.
//!
//! The two faces of the output document are loaded exactly once, at start-up,
//! into an immutable [`FontSet`]. A missing or unparsable font file is a
//! start-up failure, never a per-run one. The set is shared between runs via
//! `Arc<FontSet>`; each run embeds the raw font bytes into its own output
//! document.

use crate::error::BionicPdfError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::info;

/// Millimetres per typographic point.
pub const MM_PER_PT: f32 = 25.4 / 72.0;

/// One of the two weights used in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Face {
    Regular,
    Bold,
}

/// Measures set text for line fitting.
pub trait TextMeasure {
    /// Advance width of `text` set in `face` at `size_pt`, in millimetres.
    fn text_width_mm(&self, text: &str, face: Face, size_pt: f32) -> f32;

    /// Advance width of a single character, in millimetres.
    fn char_width_mm(&self, ch: char, face: Face, size_pt: f32) -> f32 {
        let mut buf = [0u8; 4];
        self.text_width_mm(ch.encode_utf8(&mut buf), face, size_pt)
    }
}

/// Locations of the regular and bold font files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontPaths {
    pub regular: PathBuf,
    pub bold: PathBuf,
}

impl Default for FontPaths {
    fn default() -> Self {
        Self {
            regular: PathBuf::from("./georgia.ttf"),
            bold: PathBuf::from("./georgiab.ttf"),
        }
    }
}

/// A parsed TrueType/OpenType face kept as raw bytes.
///
/// Horizontal advances of every Unicode-mapped glyph are read once when the
/// face is loaded; measuring never re-parses the font program.
#[derive(Debug, Clone)]
pub struct FontFace {
    name: String,
    data: Vec<u8>,
    units_per_em: u16,
    /// Used for characters the face has no glyph for.
    missing_advance: u16,
    advances: HashMap<char, u16>,
}

impl FontFace {
    /// Validate `data` as a font and capture the metrics needed for layout.
    pub fn from_bytes(data: Vec<u8>, name: impl Into<String>) -> Result<Self, String> {
        let face = ttf_parser::Face::parse(&data, 0).map_err(|e| e.to_string())?;
        let units_per_em = face.units_per_em().max(1);
        let missing_advance = face
            .glyph_hor_advance(ttf_parser::GlyphId(0))
            .filter(|&a| a > 0)
            .unwrap_or(units_per_em / 2);
        let advances = unicode_advances(&face);

        Ok(Self {
            name: name.into(),
            data,
            units_per_em,
            missing_advance,
            advances,
        })
    }

    fn load(path: &Path) -> Result<Self, BionicPdfError> {
        let data = std::fs::read(path).map_err(|source| BionicPdfError::FontUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "font".to_string());
        Self::from_bytes(data, name).map_err(|detail| BionicPdfError::FontInvalid {
            path: path.to_path_buf(),
            detail,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw font program, as embedded into output documents.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    fn advance(&self, ch: char) -> u16 {
        self.advances
            .get(&ch)
            .copied()
            .unwrap_or(self.missing_advance)
    }

    /// Advance width of `text` in font units.
    fn advance_units(&self, text: &str) -> u64 {
        text.chars().map(|ch| u64::from(self.advance(ch))).sum()
    }

    fn units_to_mm(&self, units: f32, size_pt: f32) -> f32 {
        units / self.units_per_em as f32 * size_pt * MM_PER_PT
    }

    /// Advance width of `text` at `size_pt`, in millimetres.
    pub fn text_width_mm(&self, text: &str, size_pt: f32) -> f32 {
        self.units_to_mm(self.advance_units(text) as f32, size_pt)
    }

    /// Advance width of `ch` at `size_pt`, in millimetres.
    pub fn char_width_mm(&self, ch: char, size_pt: f32) -> f32 {
        self.units_to_mm(f32::from(self.advance(ch)), size_pt)
    }
}

/// Advances of every character mapped by a Unicode `cmap` subtable.
fn unicode_advances(face: &ttf_parser::Face<'_>) -> HashMap<char, u16> {
    let mut advances = HashMap::new();
    let Some(cmap) = face.tables().cmap else {
        return advances;
    };
    for subtable in cmap.subtables {
        if !subtable.is_unicode() {
            continue;
        }
        subtable.codepoints(|cp| {
            let Some(ch) = char::from_u32(cp) else {
                return;
            };
            if let Some(advance) = subtable
                .glyph_index(cp)
                .and_then(|gid| face.glyph_hor_advance(gid))
            {
                advances.entry(ch).or_insert(advance);
            }
        });
    }
    advances
}

/// The regular and bold faces of the output typeface.
#[derive(Debug, Clone)]
pub struct FontSet {
    regular: FontFace,
    bold: FontFace,
}

impl FontSet {
    /// Load both faces from disk. Intended to run once at start-up.
    pub fn load(paths: &FontPaths) -> Result<Self, BionicPdfError> {
        let regular = FontFace::load(&paths.regular)?;
        let bold = FontFace::load(&paths.bold)?;
        info!(
            "Loaded fonts: regular={} ({} bytes), bold={} ({} bytes)",
            regular.name,
            regular.data.len(),
            bold.name,
            bold.data.len()
        );
        Ok(Self { regular, bold })
    }

    /// Build a set from already-loaded faces, e.g. fonts compiled into the binary.
    pub fn from_faces(regular: FontFace, bold: FontFace) -> Self {
        Self { regular, bold }
    }

    pub fn face(&self, face: Face) -> &FontFace {
        match face {
            Face::Regular => &self.regular,
            Face::Bold => &self.bold,
        }
    }
}

impl TextMeasure for FontSet {
    fn text_width_mm(&self, text: &str, face: Face, size_pt: f32) -> f32 {
        self.face(face).text_width_mm(text, size_pt)
    }

    fn char_width_mm(&self, ch: char, face: Face, size_pt: f32) -> f32 {
        self.face(face).char_width_mm(ch, size_pt)
    }
}
