//! Document Loader: turns a PDF file into the source [`Document`] model.
//!
//! Backed by lopdf. Text comes out as per-page lines; embedded images come
//! out with their dictionary dimensions only — pixel decode is deferred
//! until an image survives filtering and is persisted.

use std::path::Path;

use lopdf::{Document as LopdfDocument, Object};

use crate::detect::detect_version_from_path;
use crate::error::{Error, Result};
use crate::model::{Document, ImageEncoding, Page, PageImage};

/// Load a PDF file into the source document model.
///
/// Fails with [`Error::UnreadableDocument`] when the file is missing, not a
/// PDF, or structurally corrupt. Per-page text or image failures degrade to
/// log entries; the page is still produced.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Document> {
    let path = path.as_ref();
    let id = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    detect_version_from_path(path).map_err(|e| unreadable(path, e))?;

    let doc = LopdfDocument::load(path)
        .map_err(|e| unreadable(path, Error::from(e)))?;

    if doc.is_encrypted() {
        return Err(unreadable(path, Error::Encrypted));
    }

    let mut pages = Vec::new();
    for (page_num, page_id) in doc.get_pages() {
        let text = match doc.extract_text(&[page_num]) {
            Ok(text) => text,
            Err(e) => {
                log::warn!("Failed to extract text from page {}: {}", page_num, e);
                String::new()
            }
        };
        let mut page = Page::from_text(page_num, &text);

        for image in extract_page_images(&doc, page_id, page_num) {
            page.add_image(image);
        }

        pages.push(page);
    }

    Ok(Document::new(id, pages))
}

fn unreadable(path: &Path, cause: Error) -> Error {
    Error::UnreadableDocument {
        path: path.display().to_string(),
        reason: cause.to_string(),
    }
}

/// Extract the image XObjects referenced by a page's resource dictionary.
///
/// Images that cannot be read are logged and skipped; the page survives.
fn extract_page_images(
    doc: &LopdfDocument,
    page_id: lopdf::ObjectId,
    page_num: u32,
) -> Vec<PageImage> {
    let mut images = Vec::new();

    let page_dict = match doc.get_dictionary(page_id) {
        Ok(d) => d,
        Err(_) => return images,
    };

    let res_dict = match page_dict.get(b"Resources") {
        Ok(Object::Reference(r)) => doc.get_dictionary(*r).ok(),
        Ok(Object::Dictionary(d)) => Some(d),
        _ => None,
    };
    let Some(res_dict) = res_dict else {
        return images;
    };

    let xobj_dict = match res_dict.get(b"XObject") {
        Ok(Object::Reference(r)) => doc.get_dictionary(*r).ok(),
        Ok(Object::Dictionary(d)) => Some(d),
        _ => None,
    };
    let Some(xobj_dict) = xobj_dict else {
        return images;
    };

    let mut index = 0;
    for (name, obj) in xobj_dict.iter() {
        let Ok(obj_ref) = obj.as_reference() else {
            continue;
        };
        match extract_image_xobject(doc, obj_ref, index + 1) {
            Ok(Some(image)) => {
                index += 1;
                images.push(image);
            }
            Ok(None) => {} // not an image XObject (e.g. a Form)
            Err(e) => {
                log::warn!(
                    "Failed to extract image {} from page {}: {}",
                    String::from_utf8_lossy(name),
                    page_num,
                    e
                );
            }
        }
    }

    images
}

/// Read one XObject stream; returns `Ok(None)` for non-image XObjects.
fn extract_image_xobject(
    doc: &LopdfDocument,
    obj_ref: lopdf::ObjectId,
    index: usize,
) -> Result<Option<PageImage>> {
    let object = doc
        .get_object(obj_ref)
        .map_err(|e| Error::ImageExtract(e.to_string()))?;

    let Object::Stream(stream) = object else {
        return Ok(None);
    };
    let dict = &stream.dict;

    match dict.get(b"Subtype").ok().and_then(|s| s.as_name_str().ok()) {
        Some("Image") => {}
        _ => return Ok(None),
    }

    let width = dict
        .get(b"Width")
        .ok()
        .and_then(|w| w.as_i64().ok())
        .ok_or_else(|| Error::ImageExtract("image has no Width".into()))? as u32;
    let height = dict
        .get(b"Height")
        .ok()
        .and_then(|h| h.as_i64().ok())
        .ok_or_else(|| Error::ImageExtract("image has no Height".into()))? as u32;

    let bits = dict
        .get(b"BitsPerComponent")
        .ok()
        .and_then(|b| b.as_i64().ok())
        .unwrap_or(8) as u8;

    // Filter may be a single name or an array of names.
    let filter = match dict.get(b"Filter") {
        Ok(Object::Name(n)) => String::from_utf8_lossy(n).to_string(),
        Ok(Object::Array(arr)) => arr
            .first()
            .and_then(|o| o.as_name_str().ok())
            .unwrap_or("")
            .to_string(),
        _ => String::new(),
    };

    let color_space = match dict.get(b"ColorSpace") {
        Ok(Object::Name(n)) => String::from_utf8_lossy(n).to_string(),
        Ok(Object::Array(arr)) => arr
            .first()
            .and_then(|o| o.as_name_str().ok())
            .unwrap_or("DeviceRGB")
            .to_string(),
        _ => "DeviceRGB".to_string(),
    };

    let (encoding, data) = match filter.as_str() {
        "DCTDecode" => (ImageEncoding::Jpeg, stream.content.clone()),
        "FlateDecode" | "LZWDecode" | "" => {
            let decoded = stream
                .decompressed_content()
                .map_err(|e| Error::ImageExtract(format!("stream decode failed: {}", e)))?;
            (
                ImageEncoding::Raw {
                    color_space,
                    bits_per_component: bits,
                },
                decoded,
            )
        }
        other => {
            return Err(Error::ImageExtract(format!(
                "unsupported image filter {}",
                other
            )));
        }
    };

    Ok(Some(PageImage {
        data,
        width,
        height,
        encoding,
        index,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_missing_file() {
        let err = load("definitely/not/here.pdf").unwrap_err();
        assert!(matches!(err, Error::UnreadableDocument { .. }));
        assert!(err.is_fatal_input());
    }

    #[test]
    fn test_load_non_pdf_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"just some text, not a pdf").unwrap();

        let err = load(file.path()).unwrap_err();
        assert!(matches!(err, Error::UnreadableDocument { .. }));
    }

    #[test]
    fn test_load_truncated_pdf() {
        // Valid magic, nothing else: lopdf must reject it, and the error
        // must surface as the fatal-input variant.
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"%PDF-1.7\n").unwrap();

        let err = load(file.path()).unwrap_err();
        assert!(err.is_fatal_input());
    }
}
