use tracing::debug;

use crate::models::Task;
use crate::rules::SkillRules;
use crate::text::contains_phrase;

/// Infer required skills from task vocabulary and recognized technical terms
///
/// Best-effort membership in the ordered phrase-to-skill table; an empty
/// result is normal and never blocks assignment, it just removes the skill
/// rule from that task's cascade.
pub fn match_skills(tasks: &[Task], rules: &SkillRules) -> Vec<Task> {
    tasks
        .iter()
        .map(|task| {
            let mut enriched = task.clone();
            let haystack = format!(
                "{} {}",
                task.description,
                task.technical_terms.join(" ")
            );

            for rule in &rules.table {
                if contains_phrase(&haystack, &rule.phrase)
                    && !enriched.required_skills.contains(&rule.skill)
                {
                    enriched.required_skills.push(rule.skill.clone());
                }
            }

            debug!(
                "Task {}: required skills {:?}",
                enriched.id, enriched.required_skills
            );
            enriched
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_description_keywords_map_to_skills() {
        let task = Task::new(1, "fix the login bug in the React frontend", 0);
        let matched = match_skills(&[task], &SkillRules::default());
        assert!(matched[0].required_skills.contains(&"Authentication".to_string()));
        assert!(matched[0].required_skills.contains(&"React".to_string()));
        assert!(matched[0].required_skills.contains(&"Frontend".to_string()));
    }

    #[test]
    fn test_technical_terms_contribute() {
        let mut task = Task::new(1, "tighten up the slow paths", 0);
        task.technical_terms = vec!["database migration".to_string()];
        let matched = match_skills(&[task], &SkillRules::default());
        assert!(matched[0].required_skills.contains(&"Databases".to_string()));
    }

    #[test]
    fn test_no_match_yields_empty_set() {
        let task = Task::new(1, "order pizza for the retro", 0);
        let matched = match_skills(&[task], &SkillRules::default());
        assert!(matched[0].required_skills.is_empty());
    }

    #[test]
    fn test_skills_are_deduplicated() {
        let task = Task::new(1, "write tests for the test suite and testing harness", 0);
        let matched = match_skills(&[task], &SkillRules::default());
        let testing = matched[0]
            .required_skills
            .iter()
            .filter(|s| *s == "Testing")
            .count();
        assert_eq!(testing, 1);
    }
}
