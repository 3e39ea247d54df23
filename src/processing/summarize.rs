//! Per-chunk summarization and aggregation.

use crate::generation::GenerationClient;
use crate::processing::{
    chunking::chunk_text,
    prompts::render_summary_prompt,
    types::{DocumentSummary, ProcessingError},
};
use futures_util::{StreamExt, TryStreamExt, stream};

/// Separator placed between chunk summaries.
pub const SUMMARY_SEPARATOR: &str = "\n\n";

/// Chunking and fan-out settings for summarization.
#[derive(Debug, Clone, Copy)]
pub struct SummaryOptions {
    /// Characters per chunk.
    pub chunk_size: usize,
    /// Maximum chunk summaries in flight; `1` summarizes strictly in sequence.
    pub concurrency: usize,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            chunk_size: crate::config::DEFAULT_CHUNK_SIZE,
            concurrency: 1,
        }
    }
}

/// Summarize `text` chunk by chunk and join the results in chunk order.
///
/// Any failed chunk fails the whole document; partial summaries are never returned.
pub async fn summarize(
    client: &dyn GenerationClient,
    text: &str,
    options: SummaryOptions,
) -> Result<DocumentSummary, ProcessingError> {
    let chunks = chunk_text(text, options.chunk_size)?;
    let total = chunks.len();
    tracing::debug!(
        chunks = total,
        chunk_size = options.chunk_size,
        concurrency = options.concurrency,
        "Summarizing document"
    );

    let prompts: Vec<(usize, String)> = chunks
        .into_iter()
        .map(|chunk| (chunk.index, render_summary_prompt(chunk.text)))
        .collect();

    // `buffered` yields results in input order regardless of completion order.
    let summaries: Vec<String> = stream::iter(prompts)
        .map(|(index, prompt)| async move {
            tracing::info!(chunk = index + 1, total, "Summarizing chunk");
            client.generate(&prompt).await.map_err(|error| {
                tracing::error!(chunk = index + 1, error = %error, "Chunk summary failed");
                ProcessingError::from(error)
            })
        })
        .buffered(options.concurrency.max(1))
        .try_collect()
        .await?;

    Ok(DocumentSummary {
        text: summaries.join(SUMMARY_SEPARATOR),
        chunk_count: total,
    })
}
