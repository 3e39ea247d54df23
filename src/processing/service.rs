//! Processing service coordinating extraction, summarization, and question answering.

use crate::{
    config::Config,
    extraction::ExtractionCoordinator,
    generation::{GenerationClient, GenerationError, get_generation_client},
    metrics::{MetricsSnapshot, PipelineMetrics},
    processing::{
        qa,
        sections::parse_sections,
        summarize::{SummaryOptions, summarize},
        types::{Answer, ProcessingError, SubmitOutcome},
    },
    store::{DocumentStore, NewDocument, StoredDocument},
};
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

/// Coordinates the full pipeline: extraction with OCR fallback, context storage, chunked
/// summarization, and grounded question answering.
///
/// Construct the service once near process start and share it through an `Arc`.
pub struct ProcessingService {
    client: Arc<dyn GenerationClient>,
    extractor: ExtractionCoordinator,
    store: DocumentStore,
    metrics: PipelineMetrics,
    options: SummaryOptions,
}

/// Abstraction over the processing pipeline used by external surfaces (HTTP, CLI).
#[async_trait]
pub trait ProcessingApi: Send + Sync {
    /// Extract, store, and summarize an uploaded document.
    async fn submit_document(
        &self,
        file_name: Option<String>,
        bytes: Vec<u8>,
    ) -> Result<SubmitOutcome, ProcessingError>;

    /// Answer a question about `document_id`, or about the active document when `None`.
    async fn ask(
        &self,
        question: &str,
        document_id: Option<Uuid>,
    ) -> Result<Answer, ProcessingError>;

    /// Stored documents, newest first.
    fn documents(&self) -> Vec<Arc<StoredDocument>>;

    /// Retrieve the current metrics snapshot for diagnostics.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

impl ProcessingService {
    /// Build the production service from configuration.
    pub fn from_config(config: &Config) -> Result<Self, GenerationError> {
        let client = get_generation_client(config)?;
        Ok(Self::with_components(
            client,
            ExtractionCoordinator::from_config(config),
            config.document_store_capacity,
            SummaryOptions {
                chunk_size: config.chunk_size,
                concurrency: config.summary_concurrency,
            },
        ))
    }

    /// Build a service from explicit collaborators.
    pub fn with_components(
        client: Arc<dyn GenerationClient>,
        extractor: ExtractionCoordinator,
        store_capacity: usize,
        options: SummaryOptions,
    ) -> Self {
        Self {
            client,
            extractor,
            store: DocumentStore::new(store_capacity),
            metrics: PipelineMetrics::new(),
            options,
        }
    }

    /// Extract text, store it as the active context, then summarize it.
    ///
    /// The context is stored before summarization starts; a failed summary leaves it in place.
    /// The uploaded bytes are dropped as soon as extraction finishes.
    pub async fn submit_document(
        &self,
        file_name: Option<String>,
        bytes: Vec<u8>,
    ) -> Result<SubmitOutcome, ProcessingError> {
        tracing::info!(
            file_name = file_name.as_deref().unwrap_or("<unnamed>"),
            bytes = bytes.len(),
            "Processing document"
        );

        let extraction = match self.extractor.extract(&bytes).await {
            Ok(extraction) => extraction,
            Err(error) => {
                self.metrics.record_failure();
                return Err(error.into());
            }
        };
        let document = NewDocument::new(&bytes, extraction.text, file_name, extraction.method);
        drop(bytes);
        let stored = self.store.set_context(document);

        let summary = match summarize(self.client.as_ref(), &stored.text, self.options).await {
            Ok(summary) => summary,
            Err(error) => {
                self.metrics.record_failure();
                tracing::error!(document_id = %stored.id, error = %error, "Summarization failed");
                return Err(error);
            }
        };

        self.metrics
            .record_document(summary.chunk_count as u64, stored.extraction_method);
        tracing::info!(
            document_id = %stored.id,
            method = ?stored.extraction_method,
            characters = stored.characters,
            chunks = summary.chunk_count,
            "Document summarized"
        );

        Ok(SubmitOutcome {
            document_id: stored.id,
            sections: parse_sections(&summary.text),
            summary: summary.text,
            chunk_count: summary.chunk_count,
            extraction_method: stored.extraction_method,
            characters: stored.characters,
        })
    }

    /// Answer a question about a specific document or the active one.
    pub async fn ask(
        &self,
        question: &str,
        document_id: Option<Uuid>,
    ) -> Result<Answer, ProcessingError> {
        let result = self.answer_for(question, document_id).await;
        match &result {
            Ok(answer) => {
                self.metrics.record_question();
                tracing::info!(document_id = %answer.document_id, "Question answered");
            }
            Err(error) => {
                self.metrics.record_failure();
                tracing::warn!(error = %error, "Question rejected");
            }
        }
        result
    }

    async fn answer_for(
        &self,
        question: &str,
        document_id: Option<Uuid>,
    ) -> Result<Answer, ProcessingError> {
        let document = match document_id {
            Some(id) => self
                .store
                .get(id)
                .ok_or(ProcessingError::DocumentNotFound(id))?,
            None => self
                .store
                .get_context()
                .ok_or(ProcessingError::NoActiveDocument)?,
        };
        let answer = qa::answer(self.client.as_ref(), question, Some(&document.text)).await?;

        Ok(Answer {
            answer,
            document_id: document.id,
        })
    }

    /// Stored documents, newest first.
    pub fn documents(&self) -> Vec<Arc<StoredDocument>> {
        self.store.list()
    }

    /// Return the current pipeline metrics snapshot.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

#[async_trait]
impl ProcessingApi for ProcessingService {
    async fn submit_document(
        &self,
        file_name: Option<String>,
        bytes: Vec<u8>,
    ) -> Result<SubmitOutcome, ProcessingError> {
        ProcessingService::submit_document(self, file_name, bytes).await
    }

    async fn ask(
        &self,
        question: &str,
        document_id: Option<Uuid>,
    ) -> Result<Answer, ProcessingError> {
        ProcessingService::ask(self, question, document_id).await
    }

    fn documents(&self) -> Vec<Arc<StoredDocument>> {
        ProcessingService::documents(self)
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        ProcessingService::metrics_snapshot(self)
    }
}
