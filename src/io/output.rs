use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{DependencyGraph, Diagnostic, Priority, Task};
use crate::pipeline::PipelineResult;

/// Wire shape of one task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: u32,
    pub description: String,
    pub origin_sentence_index: usize,
    pub deadline: Option<DateTime<Utc>>,
    pub priority: Option<Priority>,
    pub assigned_to: Option<String>,
    pub assignment_confidence: Option<f64>,
    pub assignment_reasoning: String,
    pub required_skills: Vec<String>,
    pub technical_terms: Vec<String>,
    pub mentioned_people: Vec<String>,
    pub dependencies: Vec<u32>,
}

impl TaskRecord {
    fn from_task(task: &Task) -> Self {
        Self {
            id: task.id,
            description: task.description.clone(),
            origin_sentence_index: task.origin_sentence_index,
            deadline: task.deadline,
            priority: task.priority,
            assigned_to: task.assigned_to.clone(),
            assignment_confidence: task.assignment_confidence,
            assignment_reasoning: task.assignment_reasoning.clone(),
            required_skills: task.required_skills.clone(),
            technical_terms: task.technical_terms.clone(),
            mentioned_people: task.mentioned_people.clone(),
            dependencies: task.dependencies.clone(),
        }
    }

    /// Rehydrate for offline validation
    pub fn into_task(self) -> Task {
        let mut task = Task::new(self.id, self.description, self.origin_sentence_index);
        task.deadline = self.deadline;
        task.priority = self.priority;
        task.assigned_to = self.assigned_to;
        task.assignment_confidence = self.assignment_confidence;
        task.assignment_reasoning = self.assignment_reasoning;
        task.required_skills = self.required_skills;
        task.technical_terms = self.technical_terms;
        task.mentioned_people = self.mentioned_people;
        task.dependencies = self.dependencies;
        task
    }
}

/// Wire shape of one dependency edge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub from_task_id: u32,
    pub to_task_id: u32,
}

/// Wire shape of the dependency graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphRecord {
    pub edges: Vec<EdgeRecord>,
    pub has_cycles: bool,
    pub execution_order: Option<Vec<u32>>,
}

impl GraphRecord {
    fn from_graph(graph: &DependencyGraph) -> Self {
        Self {
            edges: graph
                .edges
                .iter()
                .map(|e| EdgeRecord {
                    from_task_id: e.from_task_id,
                    to_task_id: e.to_task_id,
                })
                .collect(),
            has_cycles: graph.has_cycles,
            execution_order: graph.execution_order.clone(),
        }
    }
}

/// Serializable batch envelope: the deterministic payload (tasks + graph)
/// plus run metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchOutput {
    /// Random id for this run; not part of the deterministic payload
    pub batch_id: String,
    /// The processing-time anchor deadlines were resolved against
    pub anchor: DateTime<Utc>,
    pub tasks: Vec<TaskRecord>,
    pub graph: GraphRecord,
    pub diagnostics: Vec<Diagnostic>,
}

impl BatchOutput {
    pub fn from_result(result: &PipelineResult, anchor: DateTime<Utc>) -> Self {
        Self {
            batch_id: uuid::Uuid::new_v4().to_string(),
            anchor,
            tasks: result.tasks.iter().map(TaskRecord::from_task).collect(),
            graph: GraphRecord::from_graph(&result.graph),
            diagnostics: result.diagnostics.clone(),
        }
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create file: {:?}", path))?;
        serde_json::to_writer_pretty(file, self).context("Failed to write JSON")?;
        Ok(())
    }

    pub fn read_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read batch file: {:?}", path))?;
        serde_json::from_str(&content).with_context(|| format!("Failed to parse batch file: {:?}", path))
    }
}

/// Human-readable task report
pub struct TaskReport<'a> {
    result: &'a PipelineResult,
}

impl<'a> TaskReport<'a> {
    pub fn new(result: &'a PipelineResult) -> Self {
        Self { result }
    }

    /// Format the batch as readable text
    pub fn format(&self) -> String {
        let mut output = String::new();

        for task in &self.result.tasks {
            output.push_str(&format!("Task {}: {}\n", task.id, task.description));
            if let Some(deadline) = task.deadline {
                output.push_str(&format!("  deadline: {}\n", deadline.format("%Y-%m-%d")));
            }
            if let Some(priority) = task.priority {
                output.push_str(&format!("  priority: {}\n", priority.as_str()));
            }
            if !task.required_skills.is_empty() {
                output.push_str(&format!("  skills: {}\n", task.required_skills.join(", ")));
            }
            if !task.dependencies.is_empty() {
                let deps: Vec<String> =
                    task.dependencies.iter().map(|d| format!("#{}", d)).collect();
                output.push_str(&format!("  depends on: {}\n", deps.join(", ")));
            }
            match (&task.assigned_to, task.assignment_confidence) {
                (Some(name), Some(confidence)) => {
                    output.push_str(&format!(
                        "  assigned to: {} ({:.0}%) - {}\n",
                        name,
                        confidence * 100.0,
                        task.assignment_reasoning
                    ));
                }
                _ => {
                    output.push_str(&format!("  unassigned - {}\n", task.assignment_reasoning));
                }
            }
            output.push('\n');
        }

        match &self.result.graph.execution_order {
            Some(order) if !order.is_empty() => {
                let steps: Vec<String> = order.iter().map(|id| format!("#{}", id)).collect();
                output.push_str(&format!("Execution order: {}\n", steps.join(" -> ")));
            }
            Some(_) => {}
            None => {
                output.push_str("Execution order: unresolved (dependency cycle detected)\n");
            }
        }

        output
    }

    pub fn write_file(&self, path: &Path) -> Result<()> {
        let mut file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create file: {:?}", path))?;
        write!(file, "{}", self.format())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::models::Roster;
    use crate::pipeline::run_pipeline;
    use crate::rules::RuleSet;

    fn result() -> PipelineResult {
        run_pipeline(
            "John needs to fix the login bug by tomorrow. Sarah should review it after John is done.",
            &Roster::default(),
            Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
            &RuleSet::default(),
        )
    }

    #[test]
    fn test_batch_output_round_trips() {
        let result = result();
        let anchor = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        let output = BatchOutput::from_result(&result, anchor);

        let file = tempfile::NamedTempFile::new().unwrap();
        output.write_json(file.path()).unwrap();
        let restored = BatchOutput::read_json(file.path()).unwrap();

        assert_eq!(restored.tasks.len(), output.tasks.len());
        assert_eq!(restored.graph.has_cycles, output.graph.has_cycles);
        assert_eq!(restored.anchor, anchor);

        let task = restored.tasks[0].clone().into_task();
        assert_eq!(task.id, 1);
        assert_eq!(task.deadline, result.tasks[0].deadline);
    }

    #[test]
    fn test_report_mentions_order_and_assignments() {
        let result = result();
        let report = TaskReport::new(&result).format();
        assert!(report.contains("Task 1:"));
        assert!(report.contains("deadline: 2024-01-02"));
        assert!(report.contains("no team members available"));
        assert!(report.contains("Execution order: #1 -> #2"));
    }
}
