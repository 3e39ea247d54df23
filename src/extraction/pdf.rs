use super::{ExtractorError, TextExtractor, is_pdf};
use async_trait::async_trait;

/// Decodes the embedded PDF text layer with `pdf-extract`.
///
/// Decoding runs on the blocking pool; malformed documents can make the decoder panic, which is
/// reported as a decode error instead of tearing down the request.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    /// Create the extractor.
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TextExtractor for PdfTextExtractor {
    fn name(&self) -> &'static str {
        "pdf-extract"
    }

    async fn extract_text(&self, bytes: &[u8]) -> Result<String, ExtractorError> {
        if !is_pdf(bytes) {
            return Err(ExtractorError::Decode("missing %PDF header".into()));
        }

        let owned = bytes.to_vec();
        tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&owned))
            .await
            .map_err(|error| ExtractorError::Decode(format!("decoder aborted: {error}")))?
            .map_err(|error| ExtractorError::Decode(error.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rejects_non_pdf_bytes() {
        let error = PdfTextExtractor::new()
            .extract_text(b"PK\x03\x04 not a pdf")
            .await
            .expect_err("non-pdf input");
        assert!(matches!(error, ExtractorError::Decode(_)));
    }

    #[tokio::test]
    async fn header_after_leading_bytes_reaches_the_decoder() {
        let mut bytes = b"\r\n\r\n".to_vec();
        bytes.extend_from_slice(b"%PDF-1.7\n%truncated");
        let error = PdfTextExtractor::new()
            .extract_text(&bytes)
            .await
            .expect_err("truncated input");
        match error {
            ExtractorError::Decode(message) => assert!(!message.contains("missing %PDF header")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn truncated_pdf_is_a_decode_error() {
        let error = PdfTextExtractor::new()
            .extract_text(b"%PDF-1.7\n%truncated")
            .await
            .expect_err("truncated input");
        assert!(matches!(error, ExtractorError::Decode(_)));
    }
}
