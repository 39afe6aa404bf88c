//! Input resolution: validate a user-supplied path or byte buffer and open it.
//!
//! Every check that does not need pdfium happens here first (existence,
//! permissions, size cap, `%PDF` signature) so callers get a meaningful error
//! rather than a parser failure.

use crate::error::BionicPdfError;
use pdfium_render::prelude::*;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

const PDF_MAGIC: &[u8; 4] = b"%PDF";

/// A PDF to be converted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PdfInput {
    /// A document on the local file system.
    File(PathBuf),
    /// A document already in memory, e.g. an upload.
    Memory { name: String, bytes: Vec<u8> },
}

impl PdfInput {
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        PdfInput::File(path.as_ref().to_path_buf())
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        PdfInput::Memory {
            name: "<memory>".to_string(),
            bytes,
        }
    }

    /// Name used in logs and error messages.
    pub fn source_name(&self) -> String {
        match self {
            PdfInput::File(path) => path.display().to_string(),
            PdfInput::Memory { name, .. } => name.clone(),
        }
    }

    /// Check the input can be handed to the parser.
    pub fn validate(&self, max_bytes: u64) -> Result<(), BionicPdfError> {
        match self {
            PdfInput::File(path) => validate_file(path, max_bytes),
            PdfInput::Memory { name, bytes } => {
                check_size(name, bytes.len() as u64, max_bytes)?;
                check_magic(name, bytes)
            }
        }
    }

    /// Validate and parse the input.
    ///
    /// The returned document borrows both the bindings and the password.
    pub fn open<'a>(
        self,
        pdfium: &'a Pdfium,
        password: Option<&'a str>,
        max_bytes: u64,
    ) -> Result<PdfDocument<'a>, BionicPdfError> {
        self.validate(max_bytes)?;
        let source_name = self.source_name();
        let loaded = match self {
            PdfInput::File(path) => pdfium.load_pdf_from_file(&path, password),
            PdfInput::Memory { bytes, .. } => pdfium.load_pdf_from_byte_vec(bytes, password),
        };
        loaded.map_err(|e| classify_load_error(source_name, password.is_some(), e))
    }
}

fn validate_file(path: &Path, max_bytes: u64) -> Result<(), BionicPdfError> {
    if !path.exists() {
        return Err(BionicPdfError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let mut file = match std::fs::File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(BionicPdfError::PermissionDenied {
                path: path.to_path_buf(),
            });
        }
        Err(_) => {
            return Err(BionicPdfError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
    };

    let name = path.display().to_string();
    let size = file
        .metadata()
        .map_err(|e| BionicPdfError::Internal(format!("stat {}: {}", name, e)))?
        .len();
    check_size(&name, size, max_bytes)?;

    let mut head = Vec::with_capacity(PDF_MAGIC.len());
    file.by_ref()
        .take(PDF_MAGIC.len() as u64)
        .read_to_end(&mut head)
        .map_err(|e| BionicPdfError::Internal(format!("read {}: {}", name, e)))?;
    check_magic(&name, &head)?;

    debug!("Resolved local PDF: {} ({} bytes)", name, size);
    Ok(())
}

fn check_size(name: &str, size: u64, limit: u64) -> Result<(), BionicPdfError> {
    if size > limit {
        return Err(BionicPdfError::InputTooLarge {
            source_name: name.to_string(),
            size,
            limit,
        });
    }
    Ok(())
}

fn check_magic(name: &str, bytes: &[u8]) -> Result<(), BionicPdfError> {
    if !bytes.starts_with(PDF_MAGIC) {
        return Err(BionicPdfError::NotAPdf {
            source_name: name.to_string(),
            magic: bytes.iter().take(PDF_MAGIC.len()).copied().collect(),
        });
    }
    Ok(())
}

fn classify_load_error(source_name: String, had_password: bool, e: PdfiumError) -> BionicPdfError {
    let detail = format!("{:?}", e);
    if detail.contains("Password") || detail.contains("password") {
        if had_password {
            BionicPdfError::WrongPassword { source_name }
        } else {
            BionicPdfError::PasswordRequired { source_name }
        }
    } else {
        BionicPdfError::CorruptPdf {
            source_name,
            detail,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_is_not_found() {
        let input = PdfInput::from_path("/definitely/not/here.pdf");
        assert!(matches!(
            input.validate(1024),
            Err(BionicPdfError::FileNotFound { .. })
        ));
    }

    #[test]
    fn wrong_magic_is_rejected() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"GIF89a not a pdf").unwrap();
        match PdfInput::from_path(f.path()).validate(1024) {
            Err(BionicPdfError::NotAPdf { magic, .. }) => assert_eq!(magic, b"GIF8"),
            other => panic!("expected NotAPdf, got {other:?}"),
        }
    }

    #[test]
    fn short_file_is_not_a_pdf() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"%P").unwrap();
        assert!(matches!(
            PdfInput::from_path(f.path()).validate(1024),
            Err(BionicPdfError::NotAPdf { .. })
        ));
    }

    #[test]
    fn oversize_file_is_rejected_before_parsing() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"%PDF-1.4\n").unwrap();
        f.write_all(&[b' '; 100]).unwrap();
        match PdfInput::from_path(f.path()).validate(64) {
            Err(BionicPdfError::InputTooLarge { size, limit, .. }) => {
                assert_eq!(size, 109);
                assert_eq!(limit, 64);
            }
            other => panic!("expected InputTooLarge, got {other:?}"),
        }
    }

    #[test]
    fn valid_header_passes() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"%PDF-1.7\n%%EOF\n").unwrap();
        assert!(PdfInput::from_path(f.path()).validate(1024).is_ok());
    }

    #[test]
    fn memory_input_checks() {
        assert!(PdfInput::from_bytes(b"%PDF-1.7".to_vec()).validate(8).is_ok());
        assert!(matches!(
            PdfInput::from_bytes(b"%PDF-1.7".to_vec()).validate(7),
            Err(BionicPdfError::InputTooLarge { .. })
        ));
        assert!(matches!(
            PdfInput::from_bytes(Vec::new()).validate(8),
            Err(BionicPdfError::NotAPdf { .. })
        ));
        assert_eq!(PdfInput::from_bytes(vec![]).source_name(), "<memory>");
    }
}
