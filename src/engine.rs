//! Binding to the pdfium shared library.
//!
//! pdfium is both the parser for incoming documents and the writer for the
//! restyled output. The library is looked up in this order:
//!
//! 1. the file named by `PDFIUM_LIB_PATH`,
//! 2. the platform library name in the current directory,
//! 3. the platform library name next to the executable,
//! 4. the system library search path.

use crate::error::BionicPdfError;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable naming an explicit pdfium library file.
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Bind to pdfium, trying each location in turn.
pub fn bind_pdfium() -> Result<Pdfium, BionicPdfError> {
    if let Ok(path) = std::env::var(PDFIUM_LIB_PATH_ENV) {
        let path = PathBuf::from(path);
        if path.is_file() {
            return Pdfium::bind_to_library(&path)
                .map(Pdfium::new)
                .map_err(|e| {
                    BionicPdfError::PdfiumBindingFailed(format!(
                        "{} ({}={})",
                        e,
                        PDFIUM_LIB_PATH_ENV,
                        path.display()
                    ))
                });
        }
        warn!(
            "{} '{}' does not exist; searching default locations",
            PDFIUM_LIB_PATH_ENV,
            path.display()
        );
    }

    for candidate in candidate_paths() {
        if let Ok(bindings) = Pdfium::bind_to_library(&candidate) {
            debug!("Bound pdfium from {}", candidate.display());
            return Ok(Pdfium::new(bindings));
        }
    }

    Pdfium::bind_to_system_library()
        .map(Pdfium::new)
        .map_err(|e| {
            BionicPdfError::PdfiumBindingFailed(format!(
                "{} (looked for {})",
                e,
                Pdfium::pdfium_platform_library_name().to_string_lossy()
            ))
        })
}

fn candidate_paths() -> Vec<PathBuf> {
    let mut candidates = vec![Pdfium::pdfium_platform_library_name_at_path(Path::new(
        "./",
    ))];
    if let Some(dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        candidates.push(Pdfium::pdfium_platform_library_name_at_path(&dir));
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_directory_is_searched_first() {
        let candidates = candidate_paths();
        assert!(!candidates.is_empty());
        let first = candidates[0].to_string_lossy().to_string();
        let name = Pdfium::pdfium_platform_library_name()
            .to_string_lossy()
            .to_string();
        assert!(first.ends_with(&name), "got {first}");
    }
}
