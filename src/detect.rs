//! PDF format detection.
//!
//! Cheap header check used to reject non-PDF input before handing the file
//! to the loader, and by batch mode to skip files a glob matched by accident.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";
/// Version string length, e.g. "1.7".
const VERSION_LEN: usize = 3;

/// Detect the PDF version from the first bytes of a file.
///
/// Returns `Err(Error::UnknownFormat)` when the header is not a PDF header.
pub fn detect_version_from_path<P: AsRef<Path>>(path: P) -> Result<String> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut header = [0u8; 16];
    let n = reader.read(&mut header)?;
    detect_version_from_bytes(&header[..n])
}

/// Detect the PDF version from a byte slice.
pub fn detect_version_from_bytes(data: &[u8]) -> Result<String> {
    if data.len() < PDF_MAGIC.len() + VERSION_LEN || !data.starts_with(PDF_MAGIC) {
        return Err(Error::UnknownFormat);
    }

    let version_bytes = &data[PDF_MAGIC.len()..PDF_MAGIC.len() + VERSION_LEN];
    let version = String::from_utf8_lossy(version_bytes).to_string();

    let chars: Vec<char> = version.chars().collect();
    if chars[0].is_ascii_digit() && chars[1] == '.' && chars[2].is_ascii_digit() {
        Ok(version)
    } else {
        Err(Error::UnknownFormat)
    }
}

/// Check if a file looks like a PDF.
pub fn is_pdf<P: AsRef<Path>>(path: P) -> bool {
    detect_version_from_path(path).is_ok()
}

/// Check if bytes look like a PDF header.
pub fn is_pdf_bytes(data: &[u8]) -> bool {
    detect_version_from_bytes(data).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_valid_pdf() {
        let data = b"%PDF-1.7\n%\xe2\xe3\xcf\xd3";
        assert_eq!(detect_version_from_bytes(data).unwrap(), "1.7");
    }

    #[test]
    fn test_detect_pdf_2_0() {
        assert_eq!(detect_version_from_bytes(b"%PDF-2.0\n%x").unwrap(), "2.0");
    }

    #[test]
    fn test_detect_invalid_format() {
        let result = detect_version_from_bytes(b"<!DOCTYPE html>");
        assert!(matches!(result, Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_detect_too_short() {
        let result = detect_version_from_bytes(b"%PDF");
        assert!(matches!(result, Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_detect_garbage_version() {
        let result = detect_version_from_bytes(b"%PDF-abc\n");
        assert!(matches!(result, Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_is_pdf_bytes() {
        assert!(is_pdf_bytes(b"%PDF-1.4\ntest"));
        assert!(!is_pdf_bytes(b"Not a PDF file"));
        assert!(!is_pdf_bytes(b""));
    }
}
