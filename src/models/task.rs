use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Priority tiers, ordered so that `Ord` agrees with urgency
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    /// One step more urgent, capped at critical
    pub fn boosted(self) -> Priority {
        match self {
            Priority::Low => Priority::Medium,
            Priority::Medium => Priority::High,
            Priority::High | Priority::Critical => Priority::Critical,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Critical => "critical",
        }
    }
}

/// An extracted action item, enriched stage by stage
///
/// Ids are unique per batch, assigned in extraction order starting at 1.
/// Every optional field stays `None` until its owning stage runs; stages
/// return enriched copies rather than mutating in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: u32,
    pub description: String,
    pub origin_sentence_index: usize,
    /// Absolute deadline, resolved against the processing anchor
    pub deadline: Option<DateTime<Utc>>,
    pub priority: Option<Priority>,
    pub required_skills: Vec<String>,
    pub technical_terms: Vec<String>,
    /// Roster/person names detected in the context window
    pub mentioned_people: Vec<String>,
    /// Raw time expressions detected in the context window, nearest first
    pub time_expressions: Vec<String>,
    /// Ids of tasks that must complete before this one, ascending
    pub dependencies: Vec<u32>,
    pub assigned_to: Option<String>,
    pub assignment_confidence: Option<f64>,
    pub assignment_reasoning: String,
}

impl Task {
    pub fn new(id: u32, description: impl Into<String>, origin_sentence_index: usize) -> Self {
        Self {
            id,
            description: description.into(),
            origin_sentence_index,
            deadline: None,
            priority: None,
            required_skills: Vec::new(),
            technical_terms: Vec::new(),
            mentioned_people: Vec::new(),
            time_expressions: Vec::new(),
            dependencies: Vec::new(),
            assigned_to: None,
            assignment_confidence: None,
            assignment_reasoning: String::new(),
        }
    }
}
