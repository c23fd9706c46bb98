use tracing::debug;

use crate::models::{Sentence, Task};
use crate::rules::ExtractorRules;
use crate::text::{contains_phrase, normalize};

/// Extract action-item tasks from segmented sentences
///
/// Detection is a layered heuristic: leading imperative verbs, modal
/// obligation markers, and direct-address openers, with a reject list for
/// recap phrasing. Descriptions are canonicalized by stripping
/// conversational lead-ins, and vague referents ("it", "this", "that") are
/// resolved against the preceding sentences where possible.
///
/// Ids are assigned in transcript order starting at 1. A sentence with no
/// actionable content simply produces no task.
pub fn extract_tasks(sentences: &[Sentence], rules: &ExtractorRules) -> Vec<Task> {
    let mut tasks: Vec<Task> = Vec::new();

    for sentence in sentences {
        if !is_action_sentence(&sentence.text, rules) {
            continue;
        }

        let description = strip_conversational_prefixes(&sentence.text, rules);
        if description.is_empty() {
            continue;
        }
        let description =
            resolve_vague_reference(&description, sentence.index, sentences, &tasks, rules);

        debug!(
            "Extracted task {} from sentence {}: {:?}",
            tasks.len() + 1,
            sentence.index,
            description
        );
        tasks.push(Task::new(tasks.len() as u32 + 1, description, sentence.index));
    }

    tasks
}

/// Heuristic check whether a sentence sounds like an action item
fn is_action_sentence(text: &str, rules: &ExtractorRules) -> bool {
    let norm = normalize(text);
    if norm.is_empty() {
        return false;
    }

    let words: Vec<&str> = norm.split(' ').collect();
    if words.len() < rules.min_words {
        return false;
    }

    // Recap/summary phrasing is never a task
    if rules
        .non_task_hints
        .iter()
        .any(|hint| contains_phrase(&norm, hint))
    {
        return false;
    }

    // Leading imperative verb, allowing a conversational lead-in before it
    let stripped = normalize(&strip_conversational_prefixes(text, rules));
    for verb in &rules.action_verbs {
        let verb_norm = normalize(verb);
        if stripped.starts_with(&format!("{} ", verb_norm)) {
            return true;
        }
    }

    // Modal obligation markers anywhere
    if rules
        .modal_phrases
        .iter()
        .any(|phrase| contains_phrase(&norm, phrase))
    {
        return true;
    }

    // Direct address: "can you ...", "please ...", "let's ..."
    rules
        .address_prefixes
        .iter()
        .any(|prefix| stripped.starts_with(&format!("{} ", normalize(prefix))))
}

/// Strip conversational lead-ins ("so i think", "okay so", "well") from the
/// front of the sentence, repeating until none apply
fn strip_conversational_prefixes(text: &str, rules: &ExtractorRules) -> String {
    let mut result = text.trim().trim_start_matches(',').trim().to_string();
    loop {
        let lower = normalize(&result);
        let mut stripped = false;
        for prefix in &rules.conversational_prefixes {
            let prefix_norm = normalize(prefix);
            if lower.starts_with(&format!("{} ", prefix_norm)) {
                result = result[prefix.len()..].trim_start_matches(',').trim().to_string();
                stripped = true;
                break;
            }
        }
        if !stripped {
            return result;
        }
    }
}

const VAGUE_REFERENTS: &[&str] = &["it", "this", "that"];

/// Resolve a vague referent against the preceding context
///
/// Scans up to `reference_window` preceding sentences, nearest first, for a
/// noun phrase; falls back to the most recent task description. "it/this/
/// that" are neuter, so candidate phrases are thing-like chunks ("the login
/// bug"), never bare names. An unresolvable pronoun is left in place rather
/// than guessed.
fn resolve_vague_reference(
    description: &str,
    origin_index: usize,
    sentences: &[Sentence],
    prior_tasks: &[Task],
    rules: &ExtractorRules,
) -> String {
    let words: Vec<&str> = description.split_whitespace().collect();
    let Some(pronoun_pos) = words.iter().position(|w| {
        let w = normalize(w);
        VAGUE_REFERENTS.contains(&w.as_str())
    }) else {
        return description.to_string();
    };

    // "this is", "that was" style openers are statements about the referent,
    // not places to splice a noun phrase into
    if pronoun_pos + 1 < words.len() {
        let following = normalize(words[pronoun_pos + 1]);
        if matches!(following.as_str(), "is" | "was" | "will" | "would") {
            return description.to_string();
        }
    }
    // "this bug", "that fix": the pronoun is a determiner, already specific
    if pronoun_pos + 1 < words.len() && normalize(words[pronoun_pos]) != "it" {
        let following = normalize(words[pronoun_pos + 1]);
        if following.chars().all(|c| c.is_alphabetic()) && !following.is_empty() {
            return description.to_string();
        }
    }

    let start = origin_index.saturating_sub(rules.reference_window);
    let referent = sentences[start..origin_index]
        .iter()
        .rev()
        .find_map(|s| find_noun_phrase(&s.text))
        .or_else(|| {
            prior_tasks
                .last()
                .and_then(|t| find_noun_phrase(&t.description))
        });

    match referent {
        Some(phrase) => {
            let mut replaced: Vec<String> = words.iter().map(|w| w.to_string()).collect();
            replaced[pronoun_pos] = phrase;
            replaced.join(" ")
        }
        None => description.to_string(),
    }
}

/// Find the last determiner-led noun chunk in a sentence, e.g.
/// "the login bug" out of "John needs to fix the login bug by tomorrow"
fn find_noun_phrase(text: &str) -> Option<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    let determiner_pos = words.iter().rposition(|w| {
        let w = normalize(w);
        matches!(w.as_str(), "the" | "a" | "an")
    })?;

    let mut phrase: Vec<&str> = vec![words[determiner_pos]];
    for word in words.iter().skip(determiner_pos + 1).take(3) {
        let norm = normalize(word);
        // stop at prepositions and clause boundaries
        if matches!(
            norm.as_str(),
            "by" | "before" | "after" | "until" | "on" | "in" | "at" | "for" | "to" | "and"
                | "or" | "so" | "because" | "once" | "when"
        ) {
            break;
        }
        let bare = norm.trim_matches(|c: char| !c.is_alphanumeric());
        if bare.is_empty() {
            break;
        }
        phrase.push(word);
        // clause punctuation ends the chunk after this word
        if norm.len() != bare.len() {
            break;
        }
    }

    if phrase.len() < 2 {
        return None;
    }
    Some(
        phrase
            .iter()
            .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
            .collect::<Vec<_>>()
            .join(" "),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentences(texts: &[&str]) -> Vec<Sentence> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| Sentence {
                index: i,
                text: t.to_string(),
                speaker: None,
            })
            .collect()
    }

    #[test]
    fn test_modal_and_imperative_sentences_become_tasks() {
        let rules = ExtractorRules::default();
        let s = sentences(&[
            "John needs to fix the login bug by tomorrow",
            "Fix the flaky deploy script",
            "The weather was nice yesterday",
        ]);
        let tasks = extract_tasks(&s, &rules);
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].id, 1);
        assert_eq!(tasks[0].origin_sentence_index, 0);
        assert_eq!(tasks[1].id, 2);
        assert_eq!(tasks[1].origin_sentence_index, 1);
    }

    #[test]
    fn test_recap_sentences_are_rejected() {
        let rules = ExtractorRules::default();
        let s = sentences(&["We discussed the need to update the roadmap last week"]);
        assert!(extract_tasks(&s, &rules).is_empty());
    }

    #[test]
    fn test_short_sentences_are_rejected() {
        let rules = ExtractorRules::default();
        let s = sentences(&["Fix it"]);
        assert!(extract_tasks(&s, &rules).is_empty());
    }

    #[test]
    fn test_conversational_prefix_is_stripped() {
        let rules = ExtractorRules::default();
        let s = sentences(&["Okay so we need to update the API docs"]);
        let tasks = extract_tasks(&s, &rules);
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].description, "we need to update the API docs");
    }

    #[test]
    fn test_direct_address_is_a_task() {
        let rules = ExtractorRules::default();
        let s = sentences(&["Can you review the pull request"]);
        let tasks = extract_tasks(&s, &rules);
        assert_eq!(tasks.len(), 1);
    }

    #[test]
    fn test_vague_referent_resolved_from_previous_sentence() {
        let rules = ExtractorRules::default();
        let s = sentences(&[
            "John needs to fix the login bug by tomorrow",
            "Sarah should review it once John is done",
        ]);
        let tasks = extract_tasks(&s, &rules);
        assert_eq!(tasks.len(), 2);
        assert_eq!(
            tasks[1].description,
            "Sarah should review the login bug once John is done"
        );
    }

    #[test]
    fn test_unresolvable_pronoun_is_left_alone() {
        let rules = ExtractorRules::default();
        let s = sentences(&["Sarah should review it tomorrow morning"]);
        let tasks = extract_tasks(&s, &rules);
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].description, "Sarah should review it tomorrow morning");
    }

    #[test]
    fn test_this_as_determiner_is_not_replaced() {
        let rules = ExtractorRules::default();
        let s = sentences(&[
            "John needs to fix the login bug by tomorrow",
            "We should document this change carefully",
        ]);
        let tasks = extract_tasks(&s, &rules);
        assert_eq!(tasks[1].description, "We should document this change carefully");
    }
}
