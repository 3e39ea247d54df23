//! End-to-end pipeline tests with stub extractors and a scripted generation client.

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use plainly::{
    extraction::{ExtractionCoordinator, ExtractionMethod, ExtractorError, TextExtractor},
    generation::{GenerationClient, GenerationError},
    processing::{ProcessingError, ProcessingService, SectionKind, SummaryOptions},
};

/// Treats the uploaded bytes as the text layer.
struct Utf8Extractor;

#[async_trait]
impl TextExtractor for Utf8Extractor {
    fn name(&self) -> &'static str {
        "utf8"
    }

    async fn extract_text(&self, bytes: &[u8]) -> Result<String, ExtractorError> {
        String::from_utf8(bytes.to_vec()).map_err(|err| ExtractorError::Decode(err.to_string()))
    }
}

/// Returns fixed text and counts invocations.
struct FixedOcr {
    text: &'static str,
    calls: AtomicUsize,
}

impl FixedOcr {
    fn new(text: &'static str) -> Arc<Self> {
        Arc::new(Self {
            text,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl TextExtractor for FixedOcr {
    fn name(&self) -> &'static str {
        "fixed-ocr"
    }

    async fn extract_text(&self, _bytes: &[u8]) -> Result<String, ExtractorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.text.to_string())
    }
}

/// Answers summary prompts with the four section headers and chat prompts with the document
/// text it was given, so tests can tell which context was used.
#[derive(Default)]
struct ScriptedModel {
    fail_summaries: bool,
    calls: AtomicUsize,
}

#[async_trait]
impl GenerationClient for ScriptedModel {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if prompt.ends_with("Concise Answer:") {
            let context = between(prompt, "\"\"\"\n", "\n\"\"\"");
            return Ok(format!("Based on the document: {context}"));
        }
        if self.fail_summaries {
            return Err(GenerationError::Unavailable("model offline".into()));
        }
        let chunk = prompt
            .rsplit("Text to simplify:\n\n")
            .next()
            .unwrap_or_default();
        Ok(format!(
            "📌 **Simple Summary**\n{chunk}\n\n✅ **Key Points**\n- Payment is due.\n\n⚖️ **Risks & Obligations**\n- Late fees may apply.\n\n💡 **Practical Guidance**\n- Note the due date."
        ))
    }
}

fn between<'a>(text: &'a str, start: &str, end: &str) -> &'a str {
    let after = text.split_once(start).map(|(_, rest)| rest).unwrap_or("");
    after.split_once(end).map(|(inner, _)| inner).unwrap_or(after)
}

fn service_with(model: Arc<ScriptedModel>, ocr: Arc<FixedOcr>, chunk_size: usize) -> ProcessingService {
    ProcessingService::with_components(
        model,
        ExtractionCoordinator::new(Arc::new(Utf8Extractor), ocr),
        8,
        SummaryOptions {
            chunk_size,
            concurrency: 2,
        },
    )
}

fn service() -> ProcessingService {
    service_with(
        Arc::new(ScriptedModel::default()),
        FixedOcr::new("scanned text"),
        2000,
    )
}

#[tokio::test]
async fn upload_then_question_uses_uploaded_text() {
    let service = service();

    let outcome = service
        .submit_document(Some("invoice.pdf".into()), b"Invoice due in 30 days.".to_vec())
        .await
        .expect("document summarized");

    for kind in SectionKind::ALL {
        assert!(
            outcome.summary.contains(&kind.header()),
            "missing {kind:?} header"
        );
    }
    assert_eq!(outcome.chunk_count, 1);
    assert_eq!(outcome.extraction_method, ExtractionMethod::Structured);
    assert_eq!(outcome.sections.summary, "Invoice due in 30 days.");
    assert_eq!(outcome.sections.key_points, vec!["Payment is due."]);

    let answer = service
        .ask("When is it due?", None)
        .await
        .expect("question answered");
    assert!(!answer.answer.trim().is_empty());
    assert!(answer.answer.contains("Invoice due in 30 days."));
    assert_eq!(answer.document_id, outcome.document_id);
}

#[tokio::test]
async fn long_documents_are_summarized_per_chunk_in_order() {
    let model = Arc::new(ScriptedModel::default());
    let service = service_with(model.clone(), FixedOcr::new("unused"), 10);

    let outcome = service
        .submit_document(None, b"aaaaaaaaaabbbbbbbbbbcc".to_vec())
        .await
        .expect("document summarized");

    assert_eq!(outcome.chunk_count, 3);
    assert_eq!(model.calls.load(Ordering::SeqCst), 3);
    let first = outcome.summary.find("aaaaaaaaaa").expect("first chunk");
    let second = outcome.summary.find("bbbbbbbbbb").expect("second chunk");
    let third = outcome.summary.rfind("\ncc\n").expect("third chunk");
    assert!(first < second && second < third);
    assert_eq!(outcome.summary.matches("📌 **Simple Summary**").count(), 3);
}

#[tokio::test]
async fn empty_text_layer_falls_back_to_ocr() {
    let ocr = FixedOcr::new("Scanned lease text.");
    let service = service_with(Arc::new(ScriptedModel::default()), ocr.clone(), 2000);

    let outcome = service
        .submit_document(Some("scan.pdf".into()), b"   \n ".to_vec())
        .await
        .expect("document summarized");

    assert_eq!(ocr.calls.load(Ordering::SeqCst), 1);
    assert_eq!(outcome.extraction_method, ExtractionMethod::Ocr);
    assert_eq!(outcome.sections.summary, "Scanned lease text.");
    assert_eq!(service.metrics_snapshot().ocr_fallbacks, 1);
}

#[tokio::test]
async fn exhausted_extraction_stores_nothing() {
    let model = Arc::new(ScriptedModel::default());
    let service = service_with(model.clone(), FixedOcr::new(" "), 2000);

    let error = service
        .submit_document(None, Vec::new())
        .await
        .expect_err("no text anywhere");

    assert!(matches!(error, ProcessingError::Extraction(_)));
    assert_eq!(error.code(), "extraction_exhausted");
    assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    assert!(service.documents().is_empty());
    assert!(matches!(
        service.ask("Anything?", None).await,
        Err(ProcessingError::NoActiveDocument)
    ));
}

#[tokio::test]
async fn question_before_upload_is_rejected_without_generation() {
    let model = Arc::new(ScriptedModel::default());
    let service = service_with(model.clone(), FixedOcr::new("unused"), 2000);

    let error = service
        .ask("What is this?", None)
        .await
        .expect_err("no document yet");

    assert!(matches!(error, ProcessingError::NoActiveDocument));
    assert_eq!(model.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn blank_question_is_rejected() {
    let service = service();
    service
        .submit_document(None, b"Lease term is 12 months.".to_vec())
        .await
        .expect("document summarized");

    let error = service.ask("   ", None).await.expect_err("blank question");
    assert!(matches!(error, ProcessingError::EmptyQuestion));
    assert_eq!(service.metrics_snapshot().failures, 1);
}

#[tokio::test]
async fn latest_upload_wins_for_questions_without_document_id() {
    let service = service();
    let first = service
        .submit_document(Some("a.pdf".into()), b"textA".to_vec())
        .await
        .expect("first upload");
    let second = service
        .submit_document(Some("b.pdf".into()), b"textB".to_vec())
        .await
        .expect("second upload");

    let answer = service.ask("What does it say?", None).await.expect("answer");
    assert!(answer.answer.contains("textB"));
    assert_eq!(answer.document_id, second.document_id);

    let pinned = service
        .ask("What does it say?", Some(first.document_id))
        .await
        .expect("answer for first document");
    assert!(pinned.answer.contains("textA"));
    assert!(!pinned.answer.contains("textB"));
}

#[tokio::test]
async fn concurrent_uploads_keep_their_own_document_ids() {
    let service = Arc::new(service());

    let uploads = ["textA", "textB", "textC"].map(|text| {
        let service = service.clone();
        tokio::spawn(async move {
            let outcome = service
                .submit_document(None, text.as_bytes().to_vec())
                .await
                .expect("upload");
            (text, outcome.document_id)
        })
    });

    for handle in uploads {
        let (text, id) = handle.await.expect("task");
        let answer = service.ask("Summarize", Some(id)).await.expect("answer");
        assert!(answer.answer.contains(text), "{id} answered from wrong text");
    }
    assert_eq!(service.documents().len(), 3);
}

#[tokio::test]
async fn unknown_document_id_is_not_found() {
    let service = service();
    service
        .submit_document(None, b"textA".to_vec())
        .await
        .expect("upload");

    let missing = uuid::Uuid::new_v4();
    let error = service
        .ask("Hello?", Some(missing))
        .await
        .expect_err("unknown id");
    assert!(matches!(error, ProcessingError::DocumentNotFound(id) if id == missing));
}

#[tokio::test]
async fn failed_summary_keeps_document_context() {
    let model = Arc::new(ScriptedModel {
        fail_summaries: true,
        ..ScriptedModel::default()
    });
    let service = service_with(model, FixedOcr::new("unused"), 2000);

    let error = service
        .submit_document(None, b"Deposit is refundable.".to_vec())
        .await
        .expect_err("summary fails");
    assert!(matches!(error, ProcessingError::Generation(_)));
    assert_eq!(error.code(), "generation_failed");

    let answer = service
        .ask("Is the deposit refundable?", None)
        .await
        .expect("context still available");
    assert!(answer.answer.contains("Deposit is refundable."));
}

#[tokio::test]
async fn metrics_track_documents_chunks_and_questions() {
    let model = Arc::new(ScriptedModel::default());
    let service = service_with(model, FixedOcr::new("unused"), 5);

    service
        .submit_document(None, b"0123456789".to_vec())
        .await
        .expect("upload");
    service.ask("Question?", None).await.expect("answer");

    let snapshot = service.metrics_snapshot();
    assert_eq!(snapshot.documents_processed, 1);
    assert_eq!(snapshot.chunks_summarized, 2);
    assert_eq!(snapshot.questions_answered, 1);
    assert_eq!(snapshot.failures, 0);
    assert_eq!(snapshot.ocr_fallbacks, 0);
}
