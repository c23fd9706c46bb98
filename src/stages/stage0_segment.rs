use tracing::debug;

use crate::models::Sentence;
use crate::rules::SegmenterRules;
use crate::text::normalize;

/// Split a raw transcript into ordered, indexed sentences
///
/// This stage:
/// 1. Normalizes quotes and whitespace
/// 2. Splits on sentence-end punctuation
/// 3. Peels `Name:` speaker prefixes into the speaker field, carrying the
///    last seen speaker forward across unprefixed sentences
/// 4. Drops pure filler utterances ("okay", "mm hmm", ...)
///
/// Never fails; an empty transcript yields an empty sequence.
pub fn segment(transcript: &str, rules: &SegmenterRules) -> Vec<Sentence> {
    let cleaned = basic_cleanup(transcript);
    if cleaned.is_empty() {
        return Vec::new();
    }

    let mut sentences = Vec::new();
    let mut current_speaker: Option<String> = None;

    for raw in split_sentences(&cleaned) {
        let (speaker, text) = split_speaker_prefix(&raw);
        if let Some(name) = speaker {
            current_speaker = Some(name);
        }
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        if is_disposable(text, rules) {
            debug!("Dropping filler utterance: {:?}", text);
            continue;
        }
        sentences.push(Sentence {
            index: sentences.len(),
            text: text.to_string(),
            speaker: current_speaker.clone(),
        });
    }

    sentences
}

/// Normalize quotes and collapse whitespace
fn basic_cleanup(text: &str) -> String {
    let text = text
        .replace(['\u{201c}', '\u{201d}'], "\"")
        .replace('\u{2019}', "'");
    let collapsed: String = text
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    collapsed
}

/// Split on `.`, `?`, `!` runs treated as sentence boundaries
fn split_sentences(text: &str) -> Vec<String> {
    text.split(['.', '?', '!'])
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Peel a leading `Name:` speaker label if one is present
///
/// Accepts one or two capitalized words before the colon so "Sarah:" and
/// "Sarah Lee:" both work, while "http://example" and clock times do not.
fn split_speaker_prefix(sentence: &str) -> (Option<String>, String) {
    let Some((head, rest)) = sentence.split_once(':') else {
        return (None, sentence.to_string());
    };
    let head = head.trim();
    let words: Vec<&str> = head.split_whitespace().collect();
    if words.is_empty() || words.len() > 2 {
        return (None, sentence.to_string());
    }
    let looks_like_name = words.iter().all(|w| {
        let mut chars = w.chars();
        matches!(chars.next(), Some(c) if c.is_uppercase()) && chars.all(|c| c.is_alphabetic())
    });
    if looks_like_name {
        (Some(head.to_string()), rest.trim().to_string())
    } else {
        (None, sentence.to_string())
    }
}

/// Bare acknowledgments and similar throwaway utterances
fn is_disposable(text: &str, rules: &SegmenterRules) -> bool {
    let norm: String = normalize(text)
        .chars()
        .map(|c| if c.is_alphanumeric() || c == ' ' { c } else { ' ' })
        .collect();
    let norm = normalize(&norm);
    rules
        .disposable_utterances
        .iter()
        .any(|phrase| normalize(phrase) == norm)
}
