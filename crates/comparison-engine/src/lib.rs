//! Building-code comparison engine
//!
//! Provides PDF text extraction, section segmentation, cross-document
//! section matching, text diffing, and report aggregation for comparing a
//! base building code against supplemental jurisdiction codes.

pub mod aggregate;
pub mod config;
pub mod diff;
pub mod extract;
pub mod matcher;
pub mod report;
pub mod segment;

// Re-export main entry points
pub use aggregate::{compare_documents, parse_document, run_comparison, SupplementalInput};
pub use config::{EngineConfig, ExtractionConfig, MatchingConfig};
pub use diff::diff_correspondence;
pub use extract::PdfExtractor;
pub use matcher::match_documents;
pub use report::{ConsoleReporter, CsvInventory, JsonReporter};
pub use segment::SectionSegmenter;

use thiserror::Error;

/// Errors that can occur while reading an input document.
///
/// All variants describe a per-document failure: fatal when the document is
/// the base, a report-level failure entry when it is a supplemental.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("unreadable document {path}: {reason}")]
    Unreadable { path: String, reason: String },

    #[error("document {path} is password-protected")]
    PasswordProtected { path: String },

    #[error("no extractable text layer in {path} (scanned image without OCR?)")]
    NoTextLayer { path: String },

    #[error("extraction of {path} timed out after {seconds}s")]
    ExtractionTimeout { path: String, seconds: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
