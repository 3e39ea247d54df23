use crate::extraction::ExtractionMethod;
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing pipeline activity.
#[derive(Default)]
pub struct PipelineMetrics {
    documents_processed: AtomicU64,
    chunks_summarized: AtomicU64,
    ocr_fallbacks: AtomicU64,
    questions_answered: AtomicU64,
    failures: AtomicU64,
}

impl PipelineMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a summarized document and the number of chunks produced for it.
    pub fn record_document(&self, chunk_count: u64, method: ExtractionMethod) {
        self.documents_processed.fetch_add(1, Ordering::Relaxed);
        self.chunks_summarized
            .fetch_add(chunk_count, Ordering::Relaxed);
        if method == ExtractionMethod::Ocr {
            self.ocr_fallbacks.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record an answered question.
    pub fn record_question(&self) {
        self.questions_answered.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a request that ended in an error.
    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            documents_processed: self.documents_processed.load(Ordering::Relaxed),
            chunks_summarized: self.chunks_summarized.load(Ordering::Relaxed),
            ocr_fallbacks: self.ocr_fallbacks.load(Ordering::Relaxed),
            questions_answered: self.questions_answered.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of pipeline counters used for reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Documents summarized since startup.
    pub documents_processed: u64,
    /// Chunks sent for summarization across all documents.
    pub chunks_summarized: u64,
    /// Documents whose text came from OCR.
    pub ocr_fallbacks: u64,
    /// Questions answered since startup.
    pub questions_answered: u64,
    /// Uploads or questions that ended in an error.
    pub failures: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_documents_and_chunks() {
        let metrics = PipelineMetrics::new();
        metrics.record_document(2, ExtractionMethod::Structured);
        metrics.record_document(3, ExtractionMethod::Ocr);
        metrics.record_question();
        metrics.record_failure();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.documents_processed, 2);
        assert_eq!(snapshot.chunks_summarized, 5);
        assert_eq!(snapshot.ocr_fallbacks, 1);
        assert_eq!(snapshot.questions_answered, 1);
        assert_eq!(snapshot.failures, 1);
    }

    #[test]
    fn snapshot_starts_at_zero() {
        assert_eq!(PipelineMetrics::new().snapshot(), MetricsSnapshot::default());
    }
}
