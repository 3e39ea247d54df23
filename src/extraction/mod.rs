//! Text extraction with OCR fallback.
//!
//! Uploaded documents go through two extractors in order:
//!
//! 1. A structured extractor that decodes the PDF text layer (`pdf-extract`).
//! 2. An OCR extractor (`pdftoppm` + `tesseract`) used only when the first one fails or returns
//!    nothing usable. Scanned PDFs without a text layer take this branch routinely.
//!
//! Only exhaustion of both paths is an error. Text counts as usable when it contains at least one
//! non-whitespace character; usable text is returned untrimmed.

mod ocr;
mod pdf;

pub use ocr::TesseractOcr;
pub use pdf::PdfTextExtractor;

use crate::config::Config;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised by an individual extractor.
#[derive(Debug, Error)]
pub enum ExtractorError {
    /// The document bytes could not be decoded.
    #[error("failed to decode document: {0}")]
    Decode(String),
    /// An external tool could not be run or exited unsuccessfully.
    #[error("{tool} failed: {message}")]
    Tool {
        /// Name of the external binary.
        tool: String,
        /// Exit status or stderr excerpt.
        message: String,
    },
    /// Scratch files could not be written or read.
    #[error("I/O error during extraction: {0}")]
    Io(#[from] std::io::Error),
}

/// Terminal extraction failures surfaced to callers.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The structured extractor produced nothing and OCR itself failed.
    #[error("OCR failed: {0}")]
    Ocr(#[source] ExtractorError),
    /// Both extractors ran but neither produced usable text.
    #[error("no text could be extracted from the document")]
    NoText,
}

/// Which extractor produced the returned text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    /// Decoded from the embedded PDF text layer.
    Structured,
    /// Recognized from rendered page images.
    Ocr,
}

/// Successful extraction result.
#[derive(Debug, Clone)]
pub struct Extraction {
    /// Extracted text, untrimmed.
    pub text: String,
    /// Extractor that produced `text`.
    pub method: ExtractionMethod,
}

/// A single strategy for turning document bytes into text.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Extract text from the supplied document bytes.
    async fn extract_text(&self, bytes: &[u8]) -> Result<String, ExtractorError>;
}

/// Readers accept a PDF header anywhere in the first 1024 bytes.
const PDF_HEADER_WINDOW: usize = 1024;

/// Whether `bytes` carry a `%PDF-` header within the leading window readers tolerate.
pub fn is_pdf(bytes: &[u8]) -> bool {
    bytes[..bytes.len().min(PDF_HEADER_WINDOW)]
        .windows(5)
        .any(|window| window == b"%PDF-")
}

/// Whether extracted text is worth summarizing.
pub fn is_usable(text: &str) -> bool {
    text.chars().any(|c| !c.is_whitespace())
}

/// Runs the structured extractor first and falls back to OCR.
#[derive(Clone)]
pub struct ExtractionCoordinator {
    structured: Arc<dyn TextExtractor>,
    ocr: Arc<dyn TextExtractor>,
}

impl ExtractionCoordinator {
    /// Build a coordinator from explicit extractors.
    pub fn new(structured: Arc<dyn TextExtractor>, ocr: Arc<dyn TextExtractor>) -> Self {
        Self { structured, ocr }
    }

    /// Build the production pipeline: `pdf-extract` first, then `pdftoppm` + `tesseract`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Arc::new(PdfTextExtractor::new()),
            Arc::new(TesseractOcr::new(
                config.tesseract_bin.clone(),
                config.pdftoppm_bin.clone(),
                config.ocr_language.clone(),
            )),
        )
    }

    /// Extract text from `bytes`, falling back to OCR when the structured path yields nothing.
    pub async fn extract(&self, bytes: &[u8]) -> Result<Extraction, ExtractionError> {
        match self.structured.extract_text(bytes).await {
            Ok(text) if is_usable(&text) => {
                tracing::info!(
                    extractor = self.structured.name(),
                    characters = text.chars().count(),
                    "Extracted text layer"
                );
                return Ok(Extraction {
                    text,
                    method: ExtractionMethod::Structured,
                });
            }
            Ok(text) => {
                tracing::info!(
                    extractor = self.structured.name(),
                    length = text.len(),
                    "Text layer empty; attempting OCR"
                );
            }
            Err(error) => {
                tracing::warn!(
                    extractor = self.structured.name(),
                    error = %error,
                    "Structured extraction failed; attempting OCR"
                );
            }
        }

        let text = self.ocr.extract_text(bytes).await.map_err(|error| {
            tracing::error!(extractor = self.ocr.name(), error = %error, "OCR failed");
            ExtractionError::Ocr(error)
        })?;

        if !is_usable(&text) {
            tracing::warn!(extractor = self.ocr.name(), "OCR produced no text");
            return Err(ExtractionError::NoText);
        }

        tracing::info!(
            extractor = self.ocr.name(),
            characters = text.chars().count(),
            "OCR extraction complete"
        );
        Ok(Extraction {
            text,
            method: ExtractionMethod::Ocr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedExtractor {
        result: fn() -> Result<String, ExtractorError>,
        calls: AtomicUsize,
    }

    impl FixedExtractor {
        fn new(result: fn() -> Result<String, ExtractorError>) -> Arc<Self> {
            Arc::new(Self {
                result,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TextExtractor for FixedExtractor {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn extract_text(&self, _bytes: &[u8]) -> Result<String, ExtractorError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.result)()
        }
    }

    fn decode_error() -> Result<String, ExtractorError> {
        Err(ExtractorError::Decode("not a pdf".into()))
    }

    #[tokio::test]
    async fn structured_text_skips_ocr() {
        let structured = FixedExtractor::new(|| Ok("Lease agreement".into()));
        let ocr = FixedExtractor::new(|| Ok("ocr text".into()));
        let coordinator = ExtractionCoordinator::new(structured.clone(), ocr.clone());

        let extraction = coordinator.extract(b"%PDF").await.expect("text");

        assert_eq!(extraction.text, "Lease agreement");
        assert_eq!(extraction.method, ExtractionMethod::Structured);
        assert_eq!(ocr.calls(), 0);
    }

    #[tokio::test]
    async fn empty_text_layer_falls_back_to_ocr() {
        let structured = FixedExtractor::new(|| Ok(String::new()));
        let ocr = FixedExtractor::new(|| Ok("Scanned clause".into()));
        let coordinator = ExtractionCoordinator::new(structured.clone(), ocr.clone());

        let extraction = coordinator.extract(b"%PDF").await.expect("text");

        assert_eq!(extraction.text, "Scanned clause");
        assert_eq!(extraction.method, ExtractionMethod::Ocr);
        assert_eq!(structured.calls(), 1);
        assert_eq!(ocr.calls(), 1);
    }

    #[tokio::test]
    async fn whitespace_only_text_layer_counts_as_empty() {
        let structured = FixedExtractor::new(|| Ok(" \n\t\n ".into()));
        let ocr = FixedExtractor::new(|| Ok("Recognized".into()));
        let coordinator = ExtractionCoordinator::new(structured, ocr.clone());

        let extraction = coordinator.extract(b"%PDF").await.expect("text");

        assert_eq!(extraction.method, ExtractionMethod::Ocr);
        assert_eq!(ocr.calls(), 1);
    }

    #[tokio::test]
    async fn structured_failure_is_bypassed() {
        let structured = FixedExtractor::new(decode_error);
        let ocr = FixedExtractor::new(|| Ok("  padded text  ".into()));
        let coordinator = ExtractionCoordinator::new(structured, ocr);

        let extraction = coordinator.extract(b"garbage").await.expect("text");

        assert_eq!(extraction.text, "  padded text  ");
    }

    #[tokio::test]
    async fn both_paths_empty_is_exhausted() {
        let structured = FixedExtractor::new(|| Ok(String::new()));
        let ocr = FixedExtractor::new(|| Ok("   ".into()));
        let coordinator = ExtractionCoordinator::new(structured, ocr);

        let error = coordinator.extract(b"%PDF").await.expect_err("exhausted");

        assert!(matches!(error, ExtractionError::NoText));
    }

    #[tokio::test]
    async fn ocr_failure_is_fatal() {
        let structured = FixedExtractor::new(decode_error);
        let ocr = FixedExtractor::new(|| {
            Err(ExtractorError::Tool {
                tool: "tesseract".into(),
                message: "not installed".into(),
            })
        });
        let coordinator = ExtractionCoordinator::new(structured, ocr);

        let error = coordinator.extract(b"%PDF").await.expect_err("ocr failure");

        assert!(matches!(
            error,
            ExtractionError::Ocr(ExtractorError::Tool { .. })
        ));
    }

    #[test]
    fn pdf_header_may_follow_leading_bytes() {
        assert!(is_pdf(b"%PDF-1.7\n"));
        let mut prefixed = vec![0u8; 512];
        prefixed.extend_from_slice(b"%PDF-1.4\n");
        assert!(is_pdf(&prefixed));

        let mut too_late = vec![b' '; PDF_HEADER_WINDOW];
        too_late.extend_from_slice(b"%PDF-1.4");
        assert!(!is_pdf(&too_late));
        assert!(!is_pdf(b"\x89PNG\r\n"));
        assert!(!is_pdf(b"%PD"));
    }

    #[test]
    fn usability_requires_visible_characters() {
        assert!(!is_usable(""));
        assert!(!is_usable("\n \u{00a0}\t"));
        assert!(is_usable(" a "));
    }
}
