use regex::Regex;
use tracing::debug;

use crate::models::{Entity, EntityKind, Roster, Sentence, Task, context_window};
use crate::rules::EntityRules;
use crate::text::{contains_phrase, normalize};

/// Time expression patterns, most specific first so longer phrases claim
/// their span before the bare words inside them
const TIME_PATTERNS: &[&str] = &[
    r"\bday after tomorrow\b",
    r"\bin \d+ (?:days?|weeks?)\b",
    r"\bend of (?:the )?(?:day|week|month)\b",
    r"\b(?:this|next) (?:week|month|quarter|monday|tuesday|wednesday|thursday|friday|saturday|sunday)\b",
    r"\beo[dwm]\b",
    r"\b(?:today|tonight|tomorrow)\b",
    r"\b(?:monday|tuesday|wednesday|thursday|friday|saturday|sunday)\b",
    r"\b\d{1,2}[/-]\d{1,2}[/-]\d{2,4}\b",
    r"\b(?:january|february|march|april|may|june|july|august|september|october|november|december) \d{1,2}(?:st|nd|rd|th)?(?:,? \d{4})?\b",
    r"\b\d{1,2}(?:st|nd|rd|th)? (?:january|february|march|april|may|june|july|august|september|october|november|december)(?:,? \d{4})?\b",
];

/// Recognize person, technical-term, and time entities for each task's
/// context window and return enriched task copies
///
/// Recognition never raises: an unmatched category just leaves the
/// corresponding set empty.
pub fn recognize_entities(
    tasks: &[Task],
    sentences: &[Sentence],
    roster: &Roster,
    rules: &EntityRules,
) -> Vec<Task> {
    let time_patterns = compile_time_patterns();

    tasks
        .iter()
        .map(|task| {
            let entities = entities_for_window(
                sentences,
                task.origin_sentence_index,
                roster,
                rules,
                &time_patterns,
            );

            let mut enriched = task.clone();
            for entity in &entities {
                match entity.kind {
                    EntityKind::Person => push_unique(&mut enriched.mentioned_people, &entity.text),
                    EntityKind::TechnicalTerm => {
                        push_unique(&mut enriched.technical_terms, &entity.text)
                    }
                    EntityKind::TimeExpression => {
                        push_unique(&mut enriched.time_expressions, &entity.text)
                    }
                }
            }
            debug!(
                "Task {}: {} people, {} terms, {} time expressions",
                enriched.id,
                enriched.mentioned_people.len(),
                enriched.technical_terms.len(),
                enriched.time_expressions.len()
            );
            enriched
        })
        .collect()
}

/// All entities in a task's context window, origin sentence scanned first so
/// downstream "nearest expression" picks favor it
pub fn entities_for_window(
    sentences: &[Sentence],
    origin_index: usize,
    roster: &Roster,
    rules: &EntityRules,
    time_patterns: &[Regex],
) -> Vec<Entity> {
    let mut entities = Vec::new();
    for sentence in context_window(sentences, origin_index) {
        entities.extend(person_entities(sentence, roster, rules));
        entities.extend(technical_entities(sentence, rules));
        entities.extend(time_entities(sentence, time_patterns));
    }
    entities
}

pub fn compile_time_patterns() -> Vec<Regex> {
    // literal patterns; an invalid one is skipped rather than failing the stage
    TIME_PATTERNS
        .iter()
        .filter_map(|p| Regex::new(p).ok())
        .collect()
}

/// Roster names first, then a generic capitalized-name fallback
fn person_entities(sentence: &Sentence, roster: &Roster, rules: &EntityRules) -> Vec<Entity> {
    let mut entities = Vec::new();

    for member in &roster.members {
        if contains_phrase(&sentence.text, &member.name) {
            entities.push(Entity::new(
                EntityKind::Person,
                member.name.clone(),
                sentence.index,
            ));
        }
    }

    // Generic fallback: capitalized words that are not sentence-initial and
    // not known non-names
    let words: Vec<&str> = sentence.text.split_whitespace().collect();
    for (pos, word) in words.iter().enumerate() {
        if pos == 0 {
            continue;
        }
        let trimmed = word.trim_matches(|c: char| !c.is_alphanumeric());
        let mut chars = trimmed.chars();
        let capitalized = matches!(chars.next(), Some(c) if c.is_uppercase())
            && chars.clone().all(|c| c.is_lowercase())
            && trimmed.len() > 1;
        if !capitalized {
            continue;
        }
        let norm = normalize(trimmed);
        if rules.common_capitalized_words.iter().any(|w| normalize(w) == norm) {
            continue;
        }
        if entities
            .iter()
            .any(|e: &Entity| normalize(&e.text) == norm)
        {
            continue;
        }
        entities.push(Entity::new(EntityKind::Person, trimmed.to_string(), sentence.index));
    }

    entities
}

/// Known technical phrases plus a jargon-shaped-token heuristic
fn technical_entities(sentence: &Sentence, rules: &EntityRules) -> Vec<Entity> {
    let mut entities: Vec<Entity> = Vec::new();

    for phrase in &rules.tech_phrases {
        if contains_phrase(&sentence.text, phrase) {
            push_unique_entity(
                &mut entities,
                Entity::new(EntityKind::TechnicalTerm, phrase.clone(), sentence.index),
            );
        }
    }

    // Jargon heuristic: ALL-CAPS tokens (API, SQL), dotted identifiers
    // (Node.js), and mixed-case identifiers (GitHub)
    for word in sentence.text.split_whitespace() {
        let trimmed = word.trim_matches(|c: char| !c.is_alphanumeric() && c != '.');
        let trimmed = trimmed.trim_matches('.');
        if trimmed.len() < 2 {
            continue;
        }
        let all_caps = trimmed.chars().all(|c| c.is_uppercase() || c.is_numeric())
            && trimmed.chars().any(|c| c.is_uppercase());
        let dotted = trimmed.contains('.')
            && trimmed.chars().all(|c| c.is_alphanumeric() || c == '.');
        let mixed_case = trimmed.chars().next().is_some_and(|c| c.is_uppercase())
            && trimmed.chars().skip(1).any(|c| c.is_uppercase())
            && trimmed.chars().any(|c| c.is_lowercase());
        if all_caps || dotted || mixed_case {
            push_unique_entity(
                &mut entities,
                Entity::new(EntityKind::TechnicalTerm, trimmed.to_string(), sentence.index),
            );
        }
    }

    entities
}

/// Regex-detected time expressions, deduplicated with earlier (more
/// specific) patterns claiming their span first
fn time_entities(sentence: &Sentence, patterns: &[Regex]) -> Vec<Entity> {
    let norm = normalize(&sentence.text);
    let mut entities: Vec<Entity> = Vec::new();
    let mut claimed: Vec<(usize, usize)> = Vec::new();

    for pattern in patterns {
        for m in pattern.find_iter(&norm) {
            let overlaps = claimed
                .iter()
                .any(|&(start, end)| m.start() < end && m.end() > start);
            if overlaps {
                continue;
            }
            claimed.push((m.start(), m.end()));
            push_unique_entity(
                &mut entities,
                Entity::new(EntityKind::TimeExpression, m.as_str().to_string(), sentence.index),
            );
        }
    }

    entities
}

fn push_unique(values: &mut Vec<String>, value: &str) {
    if !values.iter().any(|v| normalize(v) == normalize(value)) {
        values.push(value.to_string());
    }
}

fn push_unique_entity(entities: &mut Vec<Entity>, entity: Entity) {
    if !entities
        .iter()
        .any(|e| e.kind == entity.kind && normalize(&e.text) == normalize(&entity.text))
    {
        entities.push(entity);
    }
}
