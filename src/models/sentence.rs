use serde::{Deserialize, Serialize};

/// One transcript sentence after segmentation
///
/// Indices are 0-based positions in the retained sentence sequence and are
/// stable for the lifetime of a batch; all downstream context-window lookups
/// key off them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sentence {
    /// Position in the segmented transcript
    pub index: usize,
    /// Cleaned sentence text, original casing preserved
    pub text: String,
    /// Speaker label when the transcript carries `Name:` prefixes
    pub speaker: Option<String>,
}

/// The span of sentences around a task's origin used for entity, deadline,
/// and dependency lookups: the origin sentence plus its immediate neighbors.
/// The origin comes first so "nearest expression" scans favor it.
pub fn context_window(sentences: &[Sentence], origin_index: usize) -> Vec<&Sentence> {
    let mut window = Vec::with_capacity(3);
    if let Some(origin) = sentences.get(origin_index) {
        window.push(origin);
    }
    if origin_index > 0 {
        if let Some(prev) = sentences.get(origin_index - 1) {
            window.push(prev);
        }
    }
    if let Some(next) = sentences.get(origin_index + 1) {
        window.push(next);
    }
    window
}

/// Concatenated text of a task's context window, origin sentence first
pub fn context_text(sentences: &[Sentence], origin_index: usize) -> String {
    context_window(sentences, origin_index)
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
