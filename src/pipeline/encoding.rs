//! Encoding repair: coerce a page's raw text bytes into UTF-8.
//!
//! Text that is already valid UTF-8 passes through untouched, without a copy.
//! Anything else is assumed to be in the configured single-byte fallback
//! encoding, ISO-8859-1 unless overridden. This is a heuristic: a page in some
//! other legacy encoding is decoded as Latin-1 rather than rejected.

use crate::config::FallbackEncoding;
use crate::error::PageError;
use crate::pipeline::extract::RawPageText;
use tracing::debug;

/// Decode `bytes` into a `String`.
///
/// # Errors
/// Returns a description of the failure when a labelled fallback decoder
/// meets a malformed sequence. The ISO-8859-1 fallback never fails.
pub fn to_utf8(bytes: Vec<u8>, fallback: &FallbackEncoding) -> Result<String, String> {
    let bytes = match String::from_utf8(bytes) {
        Ok(text) => return Ok(text),
        Err(e) => e.into_bytes(),
    };

    match fallback {
        FallbackEncoding::Latin1 => Ok(bytes.iter().map(|&b| b as char).collect()),
        FallbackEncoding::Labeled(label) => {
            let encoding = encoding_rs::Encoding::for_label(label.as_bytes())
                .ok_or_else(|| format!("unknown encoding '{label}'"))?;
            encoding
                .decode_without_bom_handling_and_without_replacement(&bytes)
                .map(|text| text.into_owned())
                .ok_or_else(|| format!("malformed {} byte sequence", encoding.name()))
        }
    }
}

/// Decode one page, tagging a failure with its page number.
pub fn decode_page(raw: RawPageText, fallback: &FallbackEncoding) -> Result<(usize, String), PageError> {
    let page = raw.page_num;
    let len = raw.bytes.len();
    let text = to_utf8(raw.bytes, fallback).map_err(|detail| PageError::Encoding { page, detail })?;
    debug!("Page {}: decoded {} bytes → {} chars", page, len, text.chars().count());
    Ok((page, text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn valid_utf8_is_unchanged() {
        let input = "Grüße, 世界 — ok".as_bytes().to_vec();
        let ptr = input.as_ptr();
        let out = to_utf8(input, &FallbackEncoding::Latin1).unwrap();
        assert_eq!(out, "Grüße, 世界 — ok");
        // Same allocation: no re-encode happened.
        assert_eq!(out.as_ptr(), ptr);
    }

    #[test]
    fn latin1_bytes_are_recovered() {
        // "café déjà" in ISO-8859-1: é = 0xE9, à = 0xE0
        let input = b"caf\xE9 d\xE9j\xE0".to_vec();
        assert!(std::str::from_utf8(&input).is_err());
        let out = to_utf8(input, &FallbackEncoding::Latin1).unwrap();
        assert_eq!(out, "café déjà");
    }

    #[test]
    fn latin1_maps_c1_range_to_code_points() {
        // 0x80 is a C1 control in ISO-8859-1 (not € as in windows-1252).
        let out = to_utf8(vec![0x80, 0xFF], &FallbackEncoding::Latin1).unwrap();
        assert_eq!(out, "\u{80}\u{FF}");
    }

    #[test]
    fn labeled_windows_1252_decodes_euro() {
        let out = to_utf8(
            vec![0x80, b'5'],
            &FallbackEncoding::Labeled("windows-1252".into()),
        )
        .unwrap();
        assert_eq!(out, "€5");
    }

    #[test]
    fn labeled_decoder_reports_malformed_input() {
        // 0x82 0x20 is not a valid Shift_JIS sequence and not UTF-8 either.
        let err = to_utf8(
            vec![0x82, 0x20],
            &FallbackEncoding::Labeled("shift_jis".into()),
        )
        .unwrap_err();
        assert!(err.contains("Shift_JIS"), "got: {err}");
    }

    #[test]
    fn decode_page_tags_page_number() {
        let raw = RawPageText {
            page_num: 4,
            bytes: vec![0x82, 0x20],
        };
        let err = decode_page(raw, &FallbackEncoding::Labeled("shift_jis".into())).unwrap_err();
        assert_eq!(err.page(), 4);
        assert!(matches!(err, PageError::Encoding { .. }));
    }

    proptest! {
        #[test]
        fn utf8_input_is_a_no_op(s in "\\PC*") {
            let out = to_utf8(s.clone().into_bytes(), &FallbackEncoding::Latin1).unwrap();
            prop_assert_eq!(out, s);
        }

        #[test]
        fn latin1_output_has_one_char_per_byte(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
            prop_assume!(std::str::from_utf8(&bytes).is_err());
            let out = to_utf8(bytes.clone(), &FallbackEncoding::Latin1).unwrap();
            let chars: Vec<u32> = out.chars().map(|c| c as u32).collect();
            let expected: Vec<u32> = bytes.iter().map(|&b| b as u32).collect();
            prop_assert_eq!(chars, expected);
        }
    }
}
