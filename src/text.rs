/// Common stop words skipped when extracting matchable keywords
const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "from", "as", "is", "was", "are", "were", "be", "been", "being", "have", "has", "had", "do",
    "does", "did", "will", "would", "should", "could", "may", "might", "must", "can", "this",
    "that", "these", "those", "it", "its", "we", "you", "they", "he", "she",
];

/// Normalize text for matching: lowercase, collapse whitespace, trim
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_was_space = true;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !last_was_space {
                out.push(' ');
                last_was_space = true;
            }
        } else {
            for lower in ch.to_lowercase() {
                out.push(lower);
            }
            last_was_space = false;
        }
    }
    while out.ends_with(' ') {
        out.pop();
    }
    out
}

/// Split normalized text into word tokens, stripping punctuation
pub fn tokenize(text: &str) -> Vec<String> {
    normalize(text)
        .split(|c: char| !c.is_alphanumeric() && c != '\'')
        .filter(|t| !t.is_empty())
        .map(|t| t.trim_matches('\'').to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Keywords worth matching on: tokens of at least `min_len` chars that are
/// not stop words
pub fn keywords(text: &str, min_len: usize) -> Vec<String> {
    tokenize(text)
        .into_iter()
        .filter(|t| t.len() >= min_len && !STOP_WORDS.contains(&t.as_str()))
        .collect()
}

/// Check whether `phrase` occurs in `text` on word boundaries. Both sides are
/// normalized first, so multi-word phrases match across arbitrary whitespace.
pub fn contains_phrase(text: &str, phrase: &str) -> bool {
    let text_norm = normalize(text);
    let phrase_norm = normalize(phrase);
    if phrase_norm.is_empty() {
        return false;
    }
    let padded_text = format!(" {} ", strip_punctuation(&text_norm));
    let padded_phrase = format!(" {} ", strip_punctuation(&phrase_norm));
    padded_text.contains(&padded_phrase)
}

/// Replace punctuation with spaces and re-collapse, so phrase containment is
/// not defeated by commas or sentence-internal symbols
fn strip_punctuation(text: &str) -> String {
    let replaced: String = text
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '\'' || c == ' ' {
                c
            } else {
                ' '
            }
        })
        .collect();
    normalize(&replaced)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  Fix   the\tBug  "), "fix the bug");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_tokenize_strips_punctuation() {
        assert_eq!(
            tokenize("Fix the login-bug, now!"),
            vec!["fix", "the", "login", "bug", "now"]
        );
    }

    #[test]
    fn test_keywords_filters_stop_words() {
        let kws = keywords("we need to fix the login bug", 3);
        assert_eq!(kws, vec!["need", "fix", "login", "bug"]);
    }

    #[test]
    fn test_contains_phrase_word_boundaries() {
        assert!(contains_phrase("We need to fix this", "need to"));
        assert!(contains_phrase("done by Friday, right?", "by friday"));
        // "down" must not match inside "markdown"
        assert!(!contains_phrase("update the markdown docs", "down"));
        assert!(!contains_phrase("she shouldered the work", "should"));
    }
}
