//! Heuristic rule tables.
//!
//! Every lexicon and phrase table the pipeline matches against lives here as
//! data, not code. The built-in defaults cover typical engineering meetings;
//! a JSON file with the same shape can replace any subset of them via
//! [`RuleSet::from_file`]. Tables that map a pattern to a tag are ordered:
//! earlier rows win when several rows would tag the same text.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::models::Priority;

/// All rule tables for one pipeline run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSet {
    pub segmenter: SegmenterRules,
    pub extractor: ExtractorRules,
    pub entities: EntityRules,
    pub deadlines: DeadlineRules,
    pub priorities: PriorityRules,
    pub dependencies: DependencyRules,
    pub skills: SkillRules,
    pub roles: RoleRules,
}

impl RuleSet {
    /// Load a rule table file. Fields absent from the file keep their
    /// built-in defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read rules file: {:?}", path))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse rules file: {:?}", path))
    }
}

/// Disposable utterances dropped during segmentation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmenterRules {
    /// A sentence whose normalized text equals one of these is pure filler
    pub disposable_utterances: Vec<String>,
}

impl Default for SegmenterRules {
    fn default() -> Self {
        Self {
            disposable_utterances: strings(&[
                "okay", "ok", "yeah", "yes", "yep", "no", "nope", "right", "sure", "cool",
                "alright", "uh huh", "mm hmm", "mhm", "hmm", "got it", "sounds good", "makes sense",
                "thanks", "thank you", "exactly", "totally", "fair enough",
            ]),
        }
    }
}

/// Action-item detection and description cleanup
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorRules {
    /// Imperative verbs that open an action item
    pub action_verbs: Vec<String>,
    /// Modal obligation markers anywhere in the sentence
    pub modal_phrases: Vec<String>,
    /// Direct-address openers ("can you ...", "let's ...")
    pub address_prefixes: Vec<String>,
    /// Phrases that mark a sentence as summary/recap, never a task
    pub non_task_hints: Vec<String>,
    /// Conversational lead-ins stripped from the description
    pub conversational_prefixes: Vec<String>,
    /// Sentences shorter than this many words are never tasks
    pub min_words: usize,
    /// How many preceding sentences to scan for a vague referent
    pub reference_window: usize,
}

impl Default for ExtractorRules {
    fn default() -> Self {
        Self {
            action_verbs: strings(&[
                "fix", "update", "design", "implement", "create", "write", "test", "refactor",
                "review", "deploy", "configure", "set up", "setup", "optimize", "add", "remove",
                "check", "investigate", "analyze", "resolve", "handle", "migrate", "document",
            ]),
            modal_phrases: strings(&[
                "need to", "needs to", "should", "must", "will", "have to", "has to", "we'll",
                "plan to", "make sure to", "ensure that", "going to",
            ]),
            address_prefixes: strings(&[
                "can you", "could you", "will you", "please", "let's", "lets",
            ]),
            non_task_hints: strings(&[
                "we discussed",
                "we talked about",
                "we already",
                "as we know",
                "remember that",
                "last time",
            ]),
            conversational_prefixes: strings(&[
                "so i think", "i think", "okay so", "ok so", "so", "well", "basically",
                "actually", "you know", "um", "uh",
            ]),
            min_words: 3,
            reference_window: 3,
        }
    }
}

/// Entity recognition tables
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityRules {
    /// Technical phrases recognized verbatim
    pub tech_phrases: Vec<String>,
    /// Capitalized words that are never person names (days, months, openers)
    pub common_capitalized_words: Vec<String>,
}

impl Default for EntityRules {
    fn default() -> Self {
        Self {
            tech_phrases: strings(&[
                "login bug", "login issue", "home page", "landing page", "dashboard",
                "api response", "api endpoint", "database migration", "null pointer",
                "timeout error", "performance issue", "unit tests", "code review",
                "pull request", "staging environment", "production environment",
            ]),
            common_capitalized_words: strings(&[
                "monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday",
                "january", "february", "march", "april", "may", "june", "july", "august",
                "september", "october", "november", "december", "i", "the", "this", "that",
                "then", "also", "but", "and", "so", "okay", "ok", "well", "first", "next",
                "once", "after", "before", "everyone", "team",
            ]),
        }
    }
}

/// Deadline cue gate
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeadlineRules {
    /// A time expression only becomes a deadline when one of these cues is
    /// present in the task's context window
    pub cue_keywords: Vec<String>,
}

impl Default for DeadlineRules {
    fn default() -> Self {
        Self {
            cue_keywords: strings(&["by", "due", "deadline", "before", "until"]),
        }
    }
}

/// One row of the ordered priority table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriorityRule {
    pub phrase: String,
    pub tier: Priority,
}

/// Keyword-to-tier mapping; the highest matched tier wins
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PriorityRules {
    pub tiers: Vec<PriorityRule>,
}

impl Default for PriorityRules {
    fn default() -> Self {
        let critical = [
            "critical", "urgent", "emergency", "asap", "as soon as possible", "immediately",
            "right away", "blocking", "blocker", "p0", "production down", "site down", "outage",
            "security issue", "data loss",
        ];
        let high = [
            "important", "should", "high priority", "soon", "quickly", "p1", "must have",
            "required", "essential", "release blocker", "before release", "time sensitive",
        ];
        let low = [
            "whenever", "no rush", "low priority", "eventually", "later", "backlog", "optional",
            "nice to have", "if time permits", "when we have time", "future enhancement",
        ];
        let mut tiers = Vec::new();
        for phrase in critical {
            tiers.push(PriorityRule {
                phrase: phrase.to_string(),
                tier: Priority::Critical,
            });
        }
        for phrase in high {
            tiers.push(PriorityRule {
                phrase: phrase.to_string(),
                tier: Priority::High,
            });
        }
        for phrase in low {
            tiers.push(PriorityRule {
                phrase: phrase.to_string(),
                tier: Priority::Low,
            });
        }
        Self { tiers }
    }
}

/// Dependency phrasing cues and reference matching
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DependencyRules {
    /// Phrases that introduce a reference to a prerequisite task
    pub cue_phrases: Vec<String>,
    /// Minimum shared keywords for a reference to match a task description
    pub min_keyword_overlap: usize,
}

impl Default for DependencyRules {
    fn default() -> Self {
        Self {
            cue_phrases: strings(&[
                "depends on", "dependent on", "after", "once", "blocked by", "waiting for",
                "waiting on", "following", "requires",
            ]),
            min_keyword_overlap: 1,
        }
    }
}

/// One row of the ordered skill table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillRule {
    pub phrase: String,
    pub skill: String,
}

/// Phrase-to-skill-tag mapping, matched against task text and technical terms
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillRules {
    pub table: Vec<SkillRule>,
}

impl Default for SkillRules {
    fn default() -> Self {
        let rows: &[(&str, &str)] = &[
            ("react", "React"),
            ("react component", "React"),
            ("javascript", "JavaScript"),
            ("frontend", "Frontend"),
            ("user interface", "Frontend"),
            ("ui bug", "Frontend"),
            ("layout issue", "Frontend"),
            ("backend", "Backend"),
            ("server side", "Backend"),
            ("business logic", "Backend"),
            ("node", "Node.js"),
            ("node.js", "Node.js"),
            ("database", "Databases"),
            ("sql", "Databases"),
            ("query", "Databases"),
            ("migration", "Databases"),
            ("api", "API design"),
            ("endpoint", "API design"),
            ("rest", "API design"),
            ("login", "Authentication"),
            ("auth", "Authentication"),
            ("authentication", "Authentication"),
            ("test", "Testing"),
            ("testing", "Testing"),
            ("test case", "Testing"),
            ("qa", "Testing"),
            ("review", "Code review"),
            ("automation", "Automation"),
            ("selenium", "Automation"),
            ("cypress", "Automation"),
            ("deploy", "Deployment"),
            ("deployment", "Deployment"),
            ("ci", "Deployment"),
            ("ux", "UI/UX"),
            ("wireframe", "UI/UX"),
            ("figma", "UI/UX"),
            ("design file", "UI/UX"),
            ("documentation", "Documentation"),
        ];
        Self {
            table: rows
                .iter()
                .map(|(phrase, skill)| SkillRule {
                    phrase: phrase.to_string(),
                    skill: skill.to_string(),
                })
                .collect(),
        }
    }
}

/// One row of the role vocabulary: a keyword found in a member's role string
/// and the task vocabulary it answers for
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleRule {
    pub role_keyword: String,
    pub terms: Vec<String>,
}

/// Fuzzy role matching vocabulary for the assignment cascade
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleRules {
    pub vocabulary: Vec<RoleRule>,
}

impl Default for RoleRules {
    fn default() -> Self {
        let rows: &[(&str, &[&str])] = &[
            (
                "frontend",
                &["react", "javascript", "frontend", "ui", "layout", "css"],
            ),
            (
                "backend",
                &["backend", "api", "database", "server", "node", "endpoint"],
            ),
            ("qa", &["test", "testing", "qa", "review", "automation", "bug"]),
            ("designer", &["ux", "design", "figma", "wireframe", "ui"]),
            (
                "developer",
                &["fix", "implement", "code", "bug", "api", "frontend", "backend"],
            ),
            (
                "engineer",
                &["fix", "implement", "code", "bug", "api", "deploy", "infrastructure"],
            ),
            ("devops", &["deploy", "deployment", "ci", "infrastructure", "pipeline"]),
        ];
        Self {
            vocabulary: rows
                .iter()
                .map(|(role_keyword, terms)| RoleRule {
                    role_keyword: role_keyword.to_string(),
                    terms: terms.iter().map(|t| t.to_string()).collect(),
                })
                .collect(),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_default_tables_are_populated() {
        let rules = RuleSet::default();
        assert!(!rules.extractor.action_verbs.is_empty());
        assert!(!rules.priorities.tiers.is_empty());
        assert!(!rules.skills.table.is_empty());
        assert_eq!(rules.extractor.reference_window, 3);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"deadlines": {{"cue_keywords": ["by"]}}}}"#
        )
        .unwrap();

        let rules = RuleSet::from_file(file.path()).unwrap();
        assert_eq!(rules.deadlines.cue_keywords, vec!["by"]);
        // untouched sections fall back to the built-ins
        assert!(!rules.extractor.action_verbs.is_empty());
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(RuleSet::from_file(file.path()).is_err());
    }
}
