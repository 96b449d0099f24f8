//! PDF text extraction
//!
//! Converts a PDF file into an ordered sequence of [`Fragment`]s: one per
//! text line, tagged with page and line position. The document structure is
//! probed with lopdf first (encryption, parseability), then the text layer
//! is pulled with pdf-extract. Reading order is the backend's best effort:
//! top-to-bottom within a page, pages in order, columns joined column-first.
//!
//! Extraction never mutates the input file.

use std::path::Path;
use std::sync::mpsc;
use std::thread;

use code_model::Fragment;
use pdf_extract::extract_text_from_mem;

use crate::config::ExtractionConfig;
use crate::EngineError;

/// Main PDF extraction interface.
pub struct PdfExtractor;

impl PdfExtractor {
    /// Extract positioned text fragments from a PDF file.
    ///
    /// # Errors
    ///
    /// - [`EngineError::PasswordProtected`] - the PDF is encrypted and no
    ///   password was supplied
    /// - [`EngineError::Unreadable`] - the PDF is corrupt or malformed
    /// - [`EngineError::NoTextLayer`] - the text layer is empty or nearly
    ///   so (scanned image without OCR)
    /// - [`EngineError::Io`] - the file cannot be read
    pub fn extract(path: &Path, config: &ExtractionConfig) -> Result<Vec<Fragment>, EngineError> {
        let bytes = std::fs::read(path)?;
        Self::extract_from_bytes(&bytes, path, config)
    }

    /// Extract fragments from in-memory PDF bytes.
    ///
    /// `path` is used for error reporting only.
    pub fn extract_from_bytes(
        bytes: &[u8],
        path: &Path,
        config: &ExtractionConfig,
    ) -> Result<Vec<Fragment>, EngineError> {
        Self::probe_structure(bytes, path)?;

        let raw_text = extract_text_from_mem(bytes).map_err(|e| {
            let message = e.to_string();
            if message.to_lowercase().contains("encrypt") || message.to_lowercase().contains("password")
            {
                EngineError::PasswordProtected {
                    path: path.display().to_string(),
                }
            } else {
                EngineError::Unreadable {
                    path: path.display().to_string(),
                    reason: message,
                }
            }
        })?;

        let non_whitespace = raw_text.chars().filter(|c| !c.is_whitespace()).count();
        if non_whitespace < config.min_text_chars {
            return Err(EngineError::NoTextLayer {
                path: path.display().to_string(),
            });
        }

        Ok(Self::fragments_from_text(&raw_text))
    }

    /// Extract with a wall-clock bound. Runs extraction on a worker thread;
    /// on expiry the document fails with [`EngineError::ExtractionTimeout`]
    /// and the worker is abandoned (the run itself is unaffected).
    pub fn extract_with_timeout(
        path: &Path,
        config: &ExtractionConfig,
    ) -> Result<Vec<Fragment>, EngineError> {
        let timeout = config.timeout();
        if timeout.is_zero() {
            return Self::extract(path, config);
        }

        let (tx, rx) = mpsc::channel();
        let owned_path = path.to_path_buf();
        let owned_config = config.clone();
        thread::spawn(move || {
            let result = Self::extract(&owned_path, &owned_config);
            // The receiver is gone if the deadline already passed.
            let _ = tx.send(result);
        });

        match rx.recv_timeout(timeout) {
            Ok(result) => result,
            Err(mpsc::RecvTimeoutError::Timeout) => Err(EngineError::ExtractionTimeout {
                path: path.display().to_string(),
                seconds: config.timeout_secs,
            }),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(EngineError::Unreadable {
                path: path.display().to_string(),
                reason: "extraction worker terminated unexpectedly".to_string(),
            }),
        }
    }

    /// Parse the PDF object structure with lopdf to reject encrypted or
    /// corrupt files before text extraction.
    fn probe_structure(bytes: &[u8], path: &Path) -> Result<(), EngineError> {
        let document = lopdf::Document::load_mem(bytes).map_err(|e| EngineError::Unreadable {
            path: path.display().to_string(),
            reason: format!("failed to parse PDF structure: {}", e),
        })?;

        if document.trailer.get(b"Encrypt").is_ok() {
            return Err(EngineError::PasswordProtected {
                path: path.display().to_string(),
            });
        }

        if document.get_pages().is_empty() {
            return Err(EngineError::Unreadable {
                path: path.display().to_string(),
                reason: "document contains no pages".to_string(),
            });
        }

        Ok(())
    }

    /// Split raw extracted text into fragments.
    ///
    /// Pages are separated by form feed characters; text without form feeds
    /// is treated as a single page. Blank lines are dropped, line numbers
    /// count physical lines so positions stay traceable to the source.
    fn fragments_from_text(text: &str) -> Vec<Fragment> {
        let mut fragments = Vec::new();
        for (page_idx, page_text) in text.split('\x0C').enumerate() {
            for (line_idx, line) in page_text.lines().enumerate() {
                if line.trim().is_empty() {
                    continue;
                }
                fragments.push(Fragment::plain(line.trim_end(), page_idx + 1, line_idx + 1));
            }
        }
        fragments
    }
}
