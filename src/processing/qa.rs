//! Single-shot question answering grounded in a document's text.
//!
//! Every question is answered independently against the full document text; no conversation
//! history is carried between questions, which keeps prompt size bounded.

use crate::extraction::is_usable;
use crate::generation::GenerationClient;
use crate::processing::{prompts::render_chat_prompt, types::ProcessingError};

/// Answer `question` using `context` as the only source of truth.
///
/// Fails with [`ProcessingError::NoActiveDocument`] when no context is available and with
/// [`ProcessingError::EmptyQuestion`] before contacting the generation service when the question
/// is blank. The generated text is returned unmodified.
pub async fn answer(
    client: &dyn GenerationClient,
    question: &str,
    context: Option<&str>,
) -> Result<String, ProcessingError> {
    let context = context
        .filter(|text| is_usable(text))
        .ok_or(ProcessingError::NoActiveDocument)?;
    if question.trim().is_empty() {
        return Err(ProcessingError::EmptyQuestion);
    }

    tracing::info!(
        context_characters = context.chars().count(),
        question_characters = question.chars().count(),
        "Answering question"
    );
    let prompt = render_chat_prompt(context, question);
    Ok(client.generate(&prompt).await?)
}
