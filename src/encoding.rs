//! Encoding detection and transcoding using chardetng and `encoding_rs`.

use std::borrow::Cow;
use std::path::Path;

use chardetng::EncodingDetector;
use simdutf8::basic::from_utf8;

use crate::error::Result;

/// Check if the given bytes are valid UTF-8.
///
/// Uses SIMD-accelerated validation for performance.
pub fn is_utf8(data: &[u8]) -> bool {
    from_utf8(data).is_ok()
}

/// Check if the data starts with a UTF-8 BOM (Byte Order Mark).
///
/// The UTF-8 BOM is the byte sequence: EF BB BF
pub fn has_utf8_bom(data: &[u8]) -> bool {
    data.starts_with(&[0xEF, 0xBB, 0xBF])
}

/// Skip the UTF-8 BOM if present and return the remaining data.
pub fn skip_bom(data: &[u8]) -> &[u8] {
    if has_utf8_bom(data) { &data[3..] } else { data }
}

/// Detect the encoding of data and transcode to UTF-8 if necessary.
///
/// UTF-16 byte order marks are honoured first; otherwise chardetng guesses
/// among the legacy single- and multi-byte encodings (Windows-125x,
/// ISO-8859, GBK, Shift_JIS, ...).
///
/// Returns (`transcoded_data`, `was_transcoded`). If `was_transcoded` is false,
/// the original data is returned as-is (it was already valid UTF-8).
pub fn detect_and_transcode(data: &[u8]) -> (Cow<'_, [u8]>, bool) {
    if data.starts_with(&[0xFF, 0xFE]) {
        let (decoded, _, _) = encoding_rs::UTF_16LE.decode(data);
        return (Cow::Owned(decoded.into_owned().into_bytes()), true);
    }
    if data.starts_with(&[0xFE, 0xFF]) {
        let (decoded, _, _) = encoding_rs::UTF_16BE.decode(data);
        return (Cow::Owned(decoded.into_owned().into_bytes()), true);
    }

    if is_utf8(data) {
        return (Cow::Borrowed(data), false);
    }

    let mut detector = EncodingDetector::new();
    detector.feed(data, true);
    let encoding = detector.guess(None, true);

    // Detected as UTF-8 despite invalid bytes; the lossy decode below copes.
    if encoding == encoding_rs::UTF_8 {
        return (Cow::Borrowed(data), false);
    }

    let (decoded, _, _) = encoding.decode(data);
    (Cow::Owned(decoded.into_owned().into_bytes()), true)
}

/// Decode raw file bytes into text: strip a UTF-8 BOM, transcode legacy
/// encodings, and replace any remaining invalid sequences.
pub fn decode_text(data: &[u8]) -> String {
    let (bytes, was_transcoded) = detect_and_transcode(skip_bom(data));
    if was_transcoded {
        tracing::debug!(bytes = data.len(), "transcoded input to UTF-8");
    }
    match from_utf8(&bytes) {
        Ok(text) => text.to_string(),
        Err(_) => String::from_utf8_lossy(&bytes).into_owned(),
    }
}

/// Read a file into UTF-8 text.
pub fn read_text_file<P: AsRef<Path>>(path: P) -> Result<String> {
    let data = std::fs::read(path.as_ref())?;
    Ok(decode_text(&data))
}
