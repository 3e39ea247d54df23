//! Document processing pipeline: chunking, summarization, sections, and question answering.

pub mod chunking;
pub mod prompts;
pub mod qa;
pub mod sections;
mod service;
pub mod summarize;
pub mod types;

pub use sections::{SectionKind, SummarySections, parse_sections};
pub use service::{ProcessingApi, ProcessingService};
pub use summarize::SummaryOptions;
pub use types::{Answer, ChunkingError, DocumentSummary, ProcessingError, SubmitOutcome};
