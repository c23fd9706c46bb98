use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::models::{Roster, Task};
use crate::rules::RoleRules;
use crate::stages::stage7_assign::{AssignConfig, NO_TEAM_REASONING, run_cascade};

/// Configuration for assignment validation
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// Assignments below this confidence get a recomputed suggestion
    pub confidence_threshold: f64,
    /// Confidence bands for the recomputation cascade
    pub cascade: AssignConfig,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.5,
            cascade: AssignConfig::default(),
        }
    }
}

/// A recomputed suggestion for one flagged assignment. The original task is
/// never mutated; the suggestion sits alongside it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentSuggestion {
    pub task_id: u32,
    pub current_assignee: Option<String>,
    pub suggested_assignee: Option<String>,
    pub suggested_confidence: Option<f64>,
    pub suggested_reasoning: String,
}

/// Re-check a finalized batch against a (possibly updated) roster snapshot
///
/// An assignment is flagged when its assignee is no longer on the roster or
/// its confidence sits below the threshold. Flagged tasks get a fresh run of
/// the assignment cascade; kept assignments count toward workload so the
/// recomputation balances against the batch as it stands.
pub fn validate_assignments(
    tasks: &[Task],
    roster: &Roster,
    rules: &RoleRules,
    config: &ValidatorConfig,
) -> Vec<AssignmentSuggestion> {
    let mut workload: HashMap<String, usize> =
        roster.members.iter().map(|m| (m.name.clone(), 0)).collect();

    // kept assignments participate in the workload balance
    for task in tasks {
        if let Some(assignee) = &task.assigned_to {
            if !needs_review(task, roster, config) {
                if let Some(member) = roster.get(assignee) {
                    *workload.entry(member.name.clone()).or_insert(0) += 1;
                }
            }
        }
    }

    let mut suggestions = Vec::new();
    for task in tasks {
        let Some(current) = &task.assigned_to else {
            continue;
        };
        if !needs_review(task, roster, config) {
            continue;
        }

        let suggestion = match run_cascade(task, None, roster, &workload, rules, &config.cascade) {
            Some(outcome) => {
                *workload.entry(outcome.assignee.clone()).or_insert(0) += 1;
                AssignmentSuggestion {
                    task_id: task.id,
                    current_assignee: Some(current.clone()),
                    suggested_assignee: Some(outcome.assignee),
                    suggested_confidence: Some(outcome.confidence),
                    suggested_reasoning: outcome.reasoning,
                }
            }
            None => AssignmentSuggestion {
                task_id: task.id,
                current_assignee: Some(current.clone()),
                suggested_assignee: None,
                suggested_confidence: None,
                suggested_reasoning: NO_TEAM_REASONING.to_string(),
            },
        };
        debug!(
            "Task {}: {:?} -> {:?}",
            task.id, suggestion.current_assignee, suggestion.suggested_assignee
        );
        suggestions.push(suggestion);
    }

    info!(
        "Validation: {} of {} tasks flagged",
        suggestions.len(),
        tasks.len()
    );
    suggestions
}

/// Whether an assignment no longer stands on its own
fn needs_review(task: &Task, roster: &Roster, config: &ValidatorConfig) -> bool {
    let Some(assignee) = &task.assigned_to else {
        return false;
    };
    if !roster.contains(assignee) {
        return true;
    }
    task.assignment_confidence
        .is_some_and(|c| c < config.confidence_threshold)
}
