//! Prompt assembly for grounded synthesis

use crate::vector::ScoredChunk;

/// Pins the model to the retrieved context; anything else is a bug
pub const SYSTEM_PROMPT: &str = "You answer questions for a travel marketplace using ONLY the \
provided context chunks. Cite the chunk tags (like [S1]) for every claim you make. If the \
context does not contain the answer, say you don't know. Never invent numbers, prices, or \
policies that are not in the context.";

/// Stable citation tag for chunk `index` (0-based)
pub fn citation_tag(index: usize) -> String {
    format!("[S{}]", index + 1)
}

/// Query plus tagged chunks, highest score first
pub fn build_user_prompt(query: &str, chunks: &[ScoredChunk]) -> String {
    let mut prompt = String::with_capacity(query.len() + chunks.iter().map(|c| c.text.len() + 32).sum::<usize>());

    prompt.push_str("Question: ");
    prompt.push_str(query);
    prompt.push_str("\n\nContext:\n");

    for (index, chunk) in chunks.iter().enumerate() {
        prompt.push_str(&citation_tag(index));
        prompt.push_str(" (source: ");
        prompt.push_str(&chunk.source_id);
        prompt.push_str(")\n");
        prompt.push_str(&chunk.text);
        prompt.push_str("\n\n");
    }

    prompt
}
