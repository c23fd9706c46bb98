use chrono::{DateTime, Utc};
use tracing::debug;

use crate::models::{Priority, Sentence, Task, context_text};
use crate::rules::PriorityRules;
use crate::text::contains_phrase;

/// Score each task into one of the four priority tiers
///
/// A pure function of (context text, resolved deadline, anchor): the ordered
/// keyword table votes and the highest matched tier wins, medium is the
/// default, and a deadline on the anchor's day or the next one boosts the
/// tier by exactly one step, capped at critical.
pub fn classify_priorities(
    tasks: &[Task],
    sentences: &[Sentence],
    anchor: DateTime<Utc>,
    rules: &PriorityRules,
) -> Vec<Task> {
    tasks
        .iter()
        .map(|task| {
            let mut enriched = task.clone();
            let window = context_text(sentences, task.origin_sentence_index);

            let keyword_tier = rules
                .tiers
                .iter()
                .filter(|rule| contains_phrase(&window, &rule.phrase))
                .map(|rule| rule.tier)
                .max();
            let mut tier = keyword_tier.unwrap_or(Priority::Medium);

            if deadline_is_imminent(task.deadline, anchor) {
                tier = tier.boosted();
            }

            debug!("Task {}: priority {}", task.id, tier.as_str());
            enriched.priority = Some(tier);
            enriched
        })
        .collect()
}

/// True when the deadline falls on the anchor's calendar day or the next one
fn deadline_is_imminent(deadline: Option<DateTime<Utc>>, anchor: DateTime<Utc>) -> bool {
    deadline.is_some_and(|d| {
        let days = (d.date_naive() - anchor.date_naive()).num_days();
        days <= 1
    })
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn anchor() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()
    }

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
    fn test_urgency_keyword_wins_over_importance() {
        let s = sentences(&["This is urgent and also important"]);
        let tasks = vec![Task::new(1, "do the thing", 0)];
        let classified = classify_priorities(&tasks, &s, anchor(), &PriorityRules::default());
        assert_eq!(classified[0].priority, Some(Priority::Critical));
    }

    #[test]
    fn test_default_is_medium() {
        let s = sentences(&["Update the dependency list"]);
        let tasks = vec![Task::new(1, "Update the dependency list", 0)];
        let classified = classify_priorities(&tasks, &s, anchor(), &PriorityRules::default());
        assert_eq!(classified[0].priority, Some(Priority::Medium));
    }

    #[test]
    fn test_hedging_yields_low() {
        let s = sentences(&["Clean up the old branches whenever, no rush"]);
        let tasks = vec![Task::new(1, "Clean up the old branches", 0)];
        let classified = classify_priorities(&tasks, &s, anchor(), &PriorityRules::default());
        assert_eq!(classified[0].priority, Some(Priority::Low));
    }

    #[test]
    fn test_keyword_in_neighbor_sentence_counts() {
        let s = sentences(&[
            "John needs to fix the login bug by tomorrow",
            "This is critical",
        ]);
        let tasks = vec![Task::new(1, "fix the login bug", 0)];
        let classified = classify_priorities(&tasks, &s, anchor(), &PriorityRules::default());
        assert_eq!(classified[0].priority, Some(Priority::Critical));
    }

    #[test]
    fn test_imminent_deadline_boosts_one_step() {
        let s = sentences(&["Ship the patch by tomorrow"]);
        let mut task = Task::new(1, "Ship the patch", 0);
        task.deadline = Some(Utc.with_ymd_and_hms(2024, 1, 2, 23, 59, 59).unwrap());
        let classified = classify_priorities(&[task], &s, anchor(), &PriorityRules::default());
        // medium base + boost
        assert_eq!(classified[0].priority, Some(Priority::High));
    }

    #[test]
    fn test_boost_never_exceeds_critical() {
        let s = sentences(&["This outage is blocking everyone, fix by tomorrow"]);
        let mut task = Task::new(1, "fix the outage", 0);
        task.deadline = Some(Utc.with_ymd_and_hms(2024, 1, 1, 23, 59, 59).unwrap());
        let classified = classify_priorities(&[task], &s, anchor(), &PriorityRules::default());
        assert_eq!(classified[0].priority, Some(Priority::Critical));
    }

    #[test]
    fn test_distant_deadline_does_not_boost() {
        let s = sentences(&["Ship the patch by next friday"]);
        let mut task = Task::new(1, "Ship the patch", 0);
        task.deadline = Some(Utc.with_ymd_and_hms(2024, 1, 12, 23, 59, 59).unwrap());
        let classified = classify_priorities(&[task], &s, anchor(), &PriorityRules::default());
        assert_eq!(classified[0].priority, Some(Priority::Medium));
    }
}
