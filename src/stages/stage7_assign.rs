use std::collections::HashMap;

use regex::Regex;
use tracing::{debug, info};

use crate::models::{Roster, Sentence, Task};
use crate::rules::RoleRules;
use crate::text::{contains_phrase, keywords, normalize};

/// Reasoning recorded when the roster snapshot has no members
pub const NO_TEAM_REASONING: &str = "no team members available";

/// Confidence bands for the lower cascade rules
#[derive(Debug, Clone)]
pub struct AssignConfig {
    /// Fixed confidence for role matches, below any skill match
    pub role_confidence: f64,
    /// Fixed confidence for the workload-balanced fallback
    pub fallback_confidence: f64,
}

impl Default for AssignConfig {
    fn default() -> Self {
        Self {
            role_confidence: 0.5,
            fallback_confidence: 0.25,
        }
    }
}

/// Outcome of one cascade evaluation
#[derive(Debug, Clone)]
pub struct CascadeOutcome {
    pub assignee: String,
    pub confidence: f64,
    pub reasoning: String,
}

/// Assign every task via the rule cascade, in task-id order
///
/// First match wins: explicit mention, then skill match, then role match,
/// then workload-balanced fallback. Workload counts only assignments made in
/// this batch, so earlier tasks influence later tie-breaks. An empty roster
/// leaves every task unassigned with an explanatory reasoning; that is not
/// an error.
pub fn assign_tasks(
    tasks: &[Task],
    sentences: &[Sentence],
    roster: &Roster,
    rules: &RoleRules,
    config: &AssignConfig,
) -> Vec<Task> {
    if roster.is_empty() {
        info!("Empty roster: leaving {} tasks unassigned", tasks.len());
        return tasks
            .iter()
            .map(|task| {
                let mut enriched = task.clone();
                enriched.assignment_reasoning = NO_TEAM_REASONING.to_string();
                enriched
            })
            .collect();
    }

    let mut workload: HashMap<String, usize> =
        roster.members.iter().map(|m| (m.name.clone(), 0)).collect();

    tasks
        .iter()
        .map(|task| {
            let mut enriched = task.clone();
            let origin_text = sentences
                .get(task.origin_sentence_index)
                .map(|s| s.text.as_str());

            if let Some(outcome) = run_cascade(task, origin_text, roster, &workload, rules, config)
            {
                debug!(
                    "Task {} -> {} ({:.2}): {}",
                    task.id, outcome.assignee, outcome.confidence, outcome.reasoning
                );
                *workload.entry(outcome.assignee.clone()).or_insert(0) += 1;
                enriched.assigned_to = Some(outcome.assignee);
                enriched.assignment_confidence = Some(outcome.confidence);
                enriched.assignment_reasoning = outcome.reasoning;
            }
            enriched
        })
        .collect()
}

/// The four-rule cascade. Returns `None` only for an empty roster.
pub fn run_cascade(
    task: &Task,
    origin_text: Option<&str>,
    roster: &Roster,
    workload: &HashMap<String, usize>,
    rules: &RoleRules,
    config: &AssignConfig,
) -> Option<CascadeOutcome> {
    if roster.is_empty() {
        return None;
    }

    if let Some(outcome) = explicit_mention(task, origin_text, roster) {
        return Some(outcome);
    }
    if let Some(outcome) = skill_match(task, roster, workload) {
        return Some(outcome);
    }
    if let Some(outcome) = role_match(task, roster, workload, rules, config) {
        return Some(outcome);
    }
    Some(workload_fallback(roster, workload, config))
}

/// Actor patterns: who a sentence says will do the work
const ACTOR_PATTERNS: &[&str] = &[
    r"\b(\w+) (?:will|should|shall|must|can|could) ",
    r"\b(\w+) needs? to ",
    r"\b(\w+) is going to ",
    r"\b(?:assign|give|hand) (?:this |it |that |the task )?to (\w+)\b",
    r"\blet (\w+) (?:handle|take|do|own|drive|fix)",
    r"^(\w+),? (?:please|can you|could you)\b",
];

/// Rule 1: a roster member named as the addressee/actor in the task context
fn explicit_mention(task: &Task, origin_text: Option<&str>, roster: &Roster) -> Option<CascadeOutcome> {
    let candidates: Vec<&str> = task
        .mentioned_people
        .iter()
        .filter(|name| roster.contains(name))
        .map(|name| name.as_str())
        .collect();
    if candidates.is_empty() {
        return None;
    }

    let chosen = origin_text
        .and_then(|text| actor_in_text(text, &candidates))
        .or_else(|| {
            // no actor phrasing: prefer a candidate named in the origin
            // sentence itself over one only in a neighbor
            origin_text.and_then(|text| {
                candidates
                    .iter()
                    .find(|name| contains_phrase(text, name))
                    .copied()
            })
        })
        .unwrap_or(candidates[0]);

    let member = roster.get(chosen)?;
    Some(CascadeOutcome {
        assignee: member.name.clone(),
        confidence: 1.0,
        reasoning: "explicitly mentioned in conversation".to_string(),
    })
}

/// The first roster candidate an actor pattern names, in pattern order
fn actor_in_text<'a>(text: &str, candidates: &[&'a str]) -> Option<&'a str> {
    let norm = normalize(text);
    for pattern in ACTOR_PATTERNS {
        let Ok(re) = Regex::new(pattern) else {
            continue;
        };
        for caps in re.captures_iter(&norm) {
            let actor = &caps[1];
            if let Some(name) = candidates.iter().find(|c| normalize(c) == actor) {
                return Some(*name);
            }
        }
    }
    None
}

/// Rule 2: largest overlap between required skills and member skills.
/// Disqualified when the task requires no skills or nobody covers any.
fn skill_match(
    task: &Task,
    roster: &Roster,
    workload: &HashMap<String, usize>,
) -> Option<CascadeOutcome> {
    if task.required_skills.is_empty() {
        return None;
    }

    let mut best: Option<(usize, Vec<&str>, &crate::models::TeamMember)> = None;
    for member in &roster.members {
        let matched: Vec<&str> = task
            .required_skills
            .iter()
            .filter(|required| {
                member.skills.iter().any(|have| skills_overlap(required, have))
            })
            .map(|s| s.as_str())
            .collect();
        let count = matched.len();
        if count == 0 {
            continue;
        }
        let better = match &best {
            None => true,
            Some((best_count, _, best_member)) => {
                count > *best_count
                    || (count == *best_count
                        && member_load(workload, &member.name)
                            < member_load(workload, &best_member.name))
            }
        };
        if better {
            best = Some((count, matched, member));
        }
    }

    let (count, matched, member) = best?;
    Some(CascadeOutcome {
        assignee: member.name.clone(),
        confidence: count as f64 / task.required_skills.len() as f64,
        reasoning: format!("skill match: {} covers {}", member.name, matched.join(", ")),
    })
}

/// Loose equivalence between a required skill and a member skill
fn skills_overlap(required: &str, have: &str) -> bool {
    let required = normalize(required);
    let have = normalize(have);
    required == have || required.contains(&have) || have.contains(&required)
}

/// Rule 3: task vocabulary matched against member role strings
fn role_match(
    task: &Task,
    roster: &Roster,
    workload: &HashMap<String, usize>,
    rules: &RoleRules,
    config: &AssignConfig,
) -> Option<CascadeOutcome> {
    let mut vocabulary: Vec<String> = keywords(&task.description, 3);
    for skill in &task.required_skills {
        vocabulary.push(normalize(skill));
    }
    for term in &task.technical_terms {
        vocabulary.push(normalize(term));
    }

    let mut best: Option<(usize, &crate::models::TeamMember)> = None;
    for member in &roster.members {
        let score = role_score(&member.role, &vocabulary, rules);
        if score == 0 {
            continue;
        }
        let better = match &best {
            None => true,
            Some((best_score, best_member)) => {
                score > *best_score
                    || (score == *best_score
                        && member_load(workload, &member.name)
                            < member_load(workload, &best_member.name))
            }
        };
        if better {
            best = Some((score, member));
        }
    }

    let (_, member) = best?;
    Some(CascadeOutcome {
        assignee: member.name.clone(),
        confidence: config.role_confidence,
        reasoning: format!("role match: {} is {}", member.name, member.role),
    })
}

/// Count distinct vocabulary terms a role answers for, via the role
/// vocabulary table plus direct containment
fn role_score(role: &str, vocabulary: &[String], rules: &RoleRules) -> usize {
    let role_norm = normalize(role);
    let mut matched: Vec<&str> = Vec::new();

    for rule in &rules.vocabulary {
        if !contains_phrase(&role_norm, &rule.role_keyword) {
            continue;
        }
        for term in vocabulary {
            let term_norm = normalize(term);
            if rule.terms.iter().any(|t| normalize(t) == term_norm)
                && !matched.contains(&term.as_str())
            {
                matched.push(term);
            }
        }
    }

    for term in vocabulary {
        if contains_phrase(&role_norm, term) && !matched.contains(&term.as_str()) {
            matched.push(term);
        }
    }

    matched.len()
}

/// Rule 4: whoever has the fewest tasks so far, roster order breaking ties
fn workload_fallback(
    roster: &Roster,
    workload: &HashMap<String, usize>,
    config: &AssignConfig,
) -> CascadeOutcome {
    let mut chosen = &roster.members[0];
    for member in &roster.members[1..] {
        if member_load(workload, &member.name) < member_load(workload, &chosen.name) {
            chosen = member;
        }
    }
    CascadeOutcome {
        assignee: chosen.name.clone(),
        confidence: config.fallback_confidence,
        reasoning: format!(
            "workload balancing fallback: {} has the fewest tasks in this batch",
            chosen.name
        ),
    }
}

fn member_load(workload: &HashMap<String, usize>, name: &str) -> usize {
    workload.get(name).copied().unwrap_or(0)
}
