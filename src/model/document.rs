//! Source-document types produced by the loader.

/// A loaded source document: identifier plus ordered pages.
///
/// Produced once by the loader and never mutated by the pipeline.
#[derive(Debug, Clone)]
pub struct Document {
    /// Document identifier: the source file name. Correction families are
    /// matched against this, case-insensitively.
    pub id: String,

    /// Pages in document order.
    pub pages: Vec<Page>,
}

impl Document {
    /// Create a document from an identifier and pages.
    pub fn new(id: impl Into<String>, pages: Vec<Page>) -> Self {
        Self {
            id: id.into(),
            pages,
        }
    }

    /// Number of pages.
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Get a page by number (1-indexed).
    pub fn get_page(&self, page_num: u32) -> Option<&Page> {
        if page_num == 0 {
            return None;
        }
        self.pages.get((page_num - 1) as usize)
    }

    /// Whether the document has no pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

/// One page of the source: text lines plus embedded raster images.
#[derive(Debug, Clone)]
pub struct Page {
    /// Page number (1-indexed).
    pub number: u32,

    /// Extracted text, pre-split into trimmed lines.
    pub lines: Vec<String>,

    /// Embedded raster images, in extraction order.
    pub images: Vec<PageImage>,
}

impl Page {
    /// Create a page from its number and raw text.
    ///
    /// The text is split on newlines; surrounding whitespace is trimmed per
    /// line but empty lines are kept so lookahead windows stay faithful to
    /// the page layout.
    pub fn from_text(number: u32, text: &str) -> Self {
        let lines = text
            .trim()
            .split('\n')
            .map(|l| l.trim().to_string())
            .collect();
        Self {
            number,
            lines,
            images: Vec::new(),
        }
    }

    /// Create a page from pre-split lines.
    pub fn from_lines(number: u32, lines: Vec<String>) -> Self {
        Self {
            number,
            lines,
            images: Vec::new(),
        }
    }

    /// Attach an extracted image.
    pub fn add_image(&mut self, image: PageImage) {
        self.images.push(image);
    }
}

/// Source encoding of an embedded image's byte content.
///
/// Pixel decode is deferred until an image survives filtering and is
/// persisted; dimensions come from the PDF stream dictionary so filtering
/// never needs the pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageEncoding {
    /// DCTDecode stream: the bytes are a complete JPEG file.
    Jpeg,
    /// Decompressed raw samples with the given color space name
    /// (e.g. "DeviceRGB", "DeviceGray") and bits per component.
    Raw {
        /// PDF color space name.
        color_space: String,
        /// Bits per component.
        bits_per_component: u8,
    },
}

/// An embedded raster image extracted from a page.
#[derive(Debug, Clone)]
pub struct PageImage {
    /// Encoded byte content (JPEG stream or raw samples).
    pub data: Vec<u8>,

    /// Pixel width from the XObject dictionary.
    pub width: u32,

    /// Pixel height from the XObject dictionary.
    pub height: u32,

    /// How `data` is encoded.
    pub encoding: ImageEncoding,

    /// 1-based position among the page's images; part of the persisted
    /// filename so re-runs are reproducible.
    pub index: usize,
}

impl PageImage {
    /// Width/height aspect ratio, or 0.0 for a degenerate height.
    pub fn aspect_ratio(&self) -> f64 {
        if self.height == 0 {
            0.0
        } else {
            f64::from(self.width) / f64::from(self.height)
        }
    }
}
