//! HTTP surface for Plainly.
//!
//! This module exposes a compact Axum router:
//!
//! - `GET /`, `GET /health` – Liveness probes.
//! - `POST /upload` – Multipart upload (field `file`). Extracts the document text, stores it as
//!   the active context, and returns the plain-language summary with its four sections.
//! - `POST /chat` – Answer `{ "question", "document_id"? }` against the given document, or the
//!   most recently uploaded one when no id is supplied.
//! - `GET /documents` – Metadata for the stored document contexts, newest first.
//! - `GET /metrics` – Pipeline counters.
//! - `GET /commands` – Machine-readable command catalog for quick discovery by tools/hosts.
//!
//! Errors are returned as `{ "error": { "code", "message" } }` with a status that reflects the
//! failure class. Messages never echo generation output or provider responses.

use crate::processing::{Answer, ProcessingApi, ProcessingError, SubmitOutcome};
use crate::store::StoredDocument;
use axum::{
    Json, Router,
    extract::{
        DefaultBodyLimit, Multipart, State,
        multipart::{MultipartError, MultipartRejection},
        rejection::JsonRejection,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

/// Multipart field carrying the uploaded document.
const UPLOAD_FIELD: &str = "file";

/// Build the HTTP router exposing the upload and chat API surface.
///
/// `upload_max_bytes` caps request bodies; larger uploads are rejected before reaching the
/// pipeline.
pub fn create_router<S>(service: Arc<S>, upload_max_bytes: usize) -> Router
where
    S: ProcessingApi + 'static,
{
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/upload", post(upload_document::<S>))
        .route("/chat", post(chat::<S>))
        .route("/documents", get(list_documents::<S>))
        .route("/metrics", get(get_metrics::<S>))
        .route("/commands", get(get_commands))
        .layer(DefaultBodyLimit::max(upload_max_bytes))
        .layer(CorsLayer::permissive())
        .with_state(service)
}

async fn root() -> &'static str {
    "Plainly is running."
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Accept a multipart upload, then extract, store, and summarize it.
///
/// Only the first `file` field is used; other fields are ignored.
async fn upload_document<S>(
    State(service): State<Arc<S>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<SubmitOutcome>, AppError>
where
    S: ProcessingApi,
{
    let mut multipart = multipart?;
    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let bytes = field.bytes().await?;
        upload = Some((file_name, bytes));
        break;
    }

    let (file_name, bytes) = upload.ok_or(AppError::NoFile)?;
    if bytes.is_empty() {
        return Err(AppError::NoFile);
    }

    let outcome = service.submit_document(file_name, bytes.to_vec()).await?;
    tracing::info!(
        document_id = %outcome.document_id,
        chunks = outcome.chunk_count,
        method = ?outcome.extraction_method,
        "Upload request completed"
    );
    Ok(Json(outcome))
}

/// Request body for the `POST /chat` endpoint.
#[derive(Deserialize)]
struct ChatRequest {
    /// Question about the document. Missing and blank questions are rejected.
    #[serde(default)]
    question: Option<String>,
    /// Document to ask about; defaults to the most recently uploaded one.
    #[serde(default)]
    document_id: Option<Uuid>,
}

/// Answer a question using a stored document as context.
async fn chat<S>(
    State(service): State<Arc<S>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<Answer>, AppError>
where
    S: ProcessingApi,
{
    let Json(request) = payload?;
    let question = request.question.unwrap_or_default();
    let answer = service.ask(&question, request.document_id).await?;
    Ok(Json(answer))
}

/// Response body for `GET /documents`.
#[derive(Serialize)]
struct DocumentsResponse {
    documents: Vec<Arc<StoredDocument>>,
}

/// List stored document metadata, newest first.
async fn list_documents<S>(State(service): State<Arc<S>>) -> Json<DocumentsResponse>
where
    S: ProcessingApi,
{
    Json(DocumentsResponse {
        documents: service.documents(),
    })
}

/// Return the current pipeline counters.
async fn get_metrics<S>(State(service): State<Arc<S>>) -> Json<crate::metrics::MetricsSnapshot>
where
    S: ProcessingApi,
{
    Json(service.metrics_snapshot())
}

/// Descriptor for a single command in the discovery catalog.
#[derive(Serialize)]
struct CommandDescriptor {
    name: &'static str,
    method: &'static str,
    path: &'static str,
    description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_example: Option<serde_json::Value>,
}

/// Response body for `GET /commands`.
#[derive(Serialize)]
struct CommandsResponse {
    commands: Vec<CommandDescriptor>,
}

/// Enumerate supported HTTP commands for discovery/UX in hosts and tools.
async fn get_commands() -> Json<CommandsResponse> {
    Json(CommandsResponse {
        commands: vec![
            CommandDescriptor {
                name: "upload",
                method: "POST",
                path: "/upload",
                description: "Upload a PDF as multipart field `file`. The text is extracted (OCR when the PDF has no text layer), stored as the active document, and summarized in plain language. Response returns { \"document_id\", \"summary\", \"sections\", \"chunk_count\", \"extraction_method\" }.",
                request_example: None,
            },
            CommandDescriptor {
                name: "chat",
                method: "POST",
                path: "/chat",
                description: "Ask a question about an uploaded document. Omit `document_id` to use the most recent upload.",
                request_example: Some(json!({
                    "question": "When is the payment due?",
                    "document_id": "3f1c5a52-8a4e-4b8e-9d57-2f0e6f8f2a10"
                })),
            },
            CommandDescriptor {
                name: "documents",
                method: "GET",
                path: "/documents",
                description: "List stored documents (metadata only), newest first.",
                request_example: None,
            },
            CommandDescriptor {
                name: "metrics",
                method: "GET",
                path: "/metrics",
                description: "Return pipeline counters useful for observability dashboards.",
                request_example: None,
            },
        ],
    })
}

enum AppError {
    Processing(ProcessingError),
    /// Malformed request body, reported with the extractor's status.
    BadRequest {
        status: StatusCode,
        code: &'static str,
        message: String,
    },
    NoFile,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::Processing(error) => {
                let status = match &error {
                    ProcessingError::Extraction(_) => StatusCode::UNPROCESSABLE_ENTITY,
                    ProcessingError::Generation(_) => StatusCode::BAD_GATEWAY,
                    ProcessingError::Chunking(_) => StatusCode::INTERNAL_SERVER_ERROR,
                    ProcessingError::NoActiveDocument | ProcessingError::EmptyQuestion => {
                        StatusCode::BAD_REQUEST
                    }
                    ProcessingError::DocumentNotFound(_) => StatusCode::NOT_FOUND,
                };
                if status.is_server_error() {
                    tracing::error!(error = %error, "Request failed");
                }
                (status, error.code(), error.public_message())
            }
            AppError::BadRequest {
                status,
                code,
                message,
            } => (status, code, message),
            AppError::NoFile => (
                StatusCode::BAD_REQUEST,
                "no_file",
                "No file uploaded.".to_string(),
            ),
        };
        (
            status,
            Json(json!({ "error": { "code": code, "message": message } })),
        )
            .into_response()
    }
}

impl From<ProcessingError> for AppError {
    fn from(inner: ProcessingError) -> Self {
        Self::Processing(inner)
    }
}

impl From<MultipartError> for AppError {
    fn from(inner: MultipartError) -> Self {
        Self::BadRequest {
            status: inner.status(),
            code: "invalid_upload",
            message: inner.body_text(),
        }
    }
}

impl From<MultipartRejection> for AppError {
    fn from(inner: MultipartRejection) -> Self {
        Self::BadRequest {
            status: inner.status(),
            code: "invalid_upload",
            message: inner.body_text(),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(inner: JsonRejection) -> Self {
        Self::BadRequest {
            status: inner.status(),
            code: "invalid_request",
            message: inner.body_text(),
        }
    }
}
