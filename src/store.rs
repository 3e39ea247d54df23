//! In-memory document context store.
//!
//! Each successful extraction is stored under a fresh [`Uuid`] and becomes the *active*
//! document. Callers that hold a document id read that exact document; callers without one get
//! whatever was stored last. The active slot is last-write-wins: an overlapping upload replaces
//! it even while another request is answering a question, so id-less questions can be answered
//! against a different document than the one the caller uploaded.
//!
//! The store is bounded; once full, the oldest document is evicted. Nothing is persisted.

use crate::extraction::ExtractionMethod;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::VecDeque;
use std::sync::{Arc, PoisonError, RwLock};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use uuid::Uuid;

/// A document's extracted text plus descriptive metadata.
#[derive(Debug, Clone, Serialize)]
pub struct StoredDocument {
    /// Identifier returned from the upload.
    pub id: Uuid,
    /// Original file name, when the client supplied one.
    pub file_name: Option<String>,
    /// Full extracted text used as question-answering context.
    #[serde(skip)]
    pub text: String,
    /// Hex SHA-256 of the uploaded bytes.
    pub sha256: String,
    /// Extractor that produced `text`.
    pub extraction_method: ExtractionMethod,
    /// Length of `text` in characters.
    pub characters: usize,
    /// RFC 3339 timestamp of when the document was stored.
    pub created_at: String,
}

/// Input to [`DocumentStore::set_context`].
#[derive(Debug, Clone)]
pub struct NewDocument {
    /// Extracted text.
    pub text: String,
    /// Original file name, if any.
    pub file_name: Option<String>,
    /// Hex SHA-256 of the uploaded bytes.
    pub sha256: String,
    /// Extractor that produced `text`.
    pub extraction_method: ExtractionMethod,
}

impl NewDocument {
    /// Describe a document from its raw bytes and extracted text.
    pub fn new(
        bytes: &[u8],
        text: String,
        file_name: Option<String>,
        extraction_method: ExtractionMethod,
    ) -> Self {
        Self {
            text,
            file_name,
            sha256: fingerprint(bytes),
            extraction_method,
        }
    }
}

/// Bounded, process-wide holder of document contexts.
pub struct DocumentStore {
    capacity: usize,
    // Oldest first; the back entry is the active document.
    documents: RwLock<VecDeque<Arc<StoredDocument>>>,
}

impl DocumentStore {
    /// Create an empty store holding at most `capacity` documents (minimum one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            documents: RwLock::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Store a document and make it the active context, replacing the previous active one.
    pub fn set_context(&self, document: NewDocument) -> Arc<StoredDocument> {
        let stored = Arc::new(StoredDocument {
            id: Uuid::new_v4(),
            characters: document.text.chars().count(),
            file_name: document.file_name,
            text: document.text,
            sha256: document.sha256,
            extraction_method: document.extraction_method,
            created_at: now_rfc3339(),
        });

        let mut documents = self
            .documents
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        while documents.len() >= self.capacity {
            if let Some(evicted) = documents.pop_front() {
                tracing::debug!(document_id = %evicted.id, "Evicted oldest document context");
            }
        }
        documents.push_back(stored.clone());
        tracing::debug!(
            document_id = %stored.id,
            stored = documents.len(),
            "Document context replaced"
        );
        stored
    }

    /// The active (most recently stored) document, if any.
    pub fn get_context(&self) -> Option<Arc<StoredDocument>> {
        self.documents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .back()
            .cloned()
    }

    /// Look up a specific document by id.
    pub fn get(&self, id: Uuid) -> Option<Arc<StoredDocument>> {
        self.documents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|document| document.id == id)
            .cloned()
    }

    /// Stored documents, newest first.
    pub fn list(&self) -> Vec<Arc<StoredDocument>> {
        self.documents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .rev()
            .cloned()
            .collect()
    }
}

/// Hex-encoded SHA-256 digest of `bytes`.
pub fn fingerprint(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

fn now_rfc3339() -> String {
    let now = OffsetDateTime::now_utc();
    now.format(&Rfc3339)
        .unwrap_or_else(|_| now.unix_timestamp().to_string())
}
