//! Extraction-level types
//!
//! A [`Fragment`] is the unit of text handed from the extractor to the
//! segmenter: one line of the PDF text layer with its source position.

/// Bounding box of a fragment on its page, in PDF points.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BoundingBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

/// One positioned line of extracted text.
///
/// The text-layer backend does not report glyph geometry or font runs, so
/// `bbox`, `font_size` and `bold` stay `None` unless a richer backend fills
/// them in; the segmenter must not rely on their presence.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Fragment {
    /// Text content of the line.
    pub text: String,
    /// Page number (1-indexed).
    pub page: usize,
    /// Line number within the page (1-indexed).
    pub line: usize,
    /// Position on the page, when the backend provides it.
    pub bbox: Option<BoundingBox>,
    /// Dominant font size in points, when known.
    pub font_size: Option<f32>,
    /// Whether the line is set in a bold face, when known.
    pub bold: Option<bool>,
}

impl Fragment {
    /// Fragment carrying text and position only, no layout metadata.
    pub fn plain(text: impl Into<String>, page: usize, line: usize) -> Self {
        Self {
            text: text.into(),
            page,
            line,
            bbox: None,
            font_size: None,
            bold: None,
        }
    }
}
