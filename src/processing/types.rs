//! Core data types and error definitions for the processing pipeline.

use crate::{
    extraction::{ExtractionError, ExtractionMethod},
    generation::GenerationError,
    processing::sections::SummarySections,
};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Errors produced while splitting text into chunks.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChunkingError {
    /// Caller requested an impossible chunk width.
    #[error("chunk size must be greater than zero")]
    InvalidChunkSize,
}

/// Errors emitted by the document processing pipeline.
#[derive(Debug, Error)]
pub enum ProcessingError {
    /// Neither the text layer nor OCR produced usable text.
    #[error("Failed to extract text: {0}")]
    Extraction(#[from] ExtractionError),
    /// The text-generation service errored or timed out.
    #[error("Text generation failed: {0}")]
    Generation(#[from] GenerationError),
    /// Chunking step was misconfigured.
    #[error("Failed to chunk document: {0}")]
    Chunking(#[from] ChunkingError),
    /// A question arrived before any document was processed.
    #[error("No document has been processed yet")]
    NoActiveDocument,
    /// A question was empty or whitespace only.
    #[error("No question provided")]
    EmptyQuestion,
    /// A question referenced a document that is not (or no longer) stored.
    #[error("Document {0} was not found")]
    DocumentNotFound(Uuid),
}

/// Ordered concatenation of per-chunk summaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSummary {
    /// Chunk summaries joined by a blank line, in chunk order.
    pub text: String,
    /// Number of chunks that were summarized.
    pub chunk_count: usize,
}

/// Result of [`crate::processing::ProcessingService::submit_document`].
#[derive(Debug, Clone, Serialize)]
pub struct SubmitOutcome {
    /// Identifier to pass back when asking questions about this document.
    pub document_id: Uuid,
    /// Aggregated summary text as returned by the generation service.
    pub summary: String,
    /// Summary split into the four fixed sections.
    pub sections: SummarySections,
    /// Number of chunks summarized.
    pub chunk_count: usize,
    /// Extractor that produced the document text.
    pub extraction_method: ExtractionMethod,
    /// Length of the extracted text in characters.
    pub characters: usize,
}

/// Answer to a question about a stored document.
#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    /// Raw answer text from the generation service.
    pub answer: String,
    /// Document the answer is grounded in.
    pub document_id: Uuid,
}

impl ProcessingError {
    /// Stable machine-readable classification used at external boundaries.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Extraction(_) => "extraction_exhausted",
            Self::Generation(_) => "generation_failed",
            Self::Chunking(_) => "internal_error",
            Self::NoActiveDocument => "no_active_document",
            Self::EmptyQuestion => "empty_question",
            Self::DocumentNotFound(_) => "document_not_found",
        }
    }

    /// User-facing message that never includes generation output or provider details.
    pub fn public_message(&self) -> String {
        match self {
            Self::Extraction(_) => "Could not extract text from the document.".into(),
            Self::Generation(_) => {
                "The text-generation service failed. Please try again later.".into()
            }
            Self::Chunking(_) => "The document could not be processed.".into(),
            Self::NoActiveDocument => "Please upload a document first.".into(),
            Self::EmptyQuestion => "No question provided.".into(),
            Self::DocumentNotFound(id) => format!("Document {id} was not found."),
        }
    }
}
