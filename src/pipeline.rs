use chrono::{DateTime, Utc};
use tracing::info;

use crate::models::{DependencyGraph, Diagnostic, Roster, Sentence, Task};
use crate::rules::RuleSet;
use crate::stages::{
    AssignConfig, assign_tasks, build_dependency_graph, classify_priorities, extract_tasks,
    match_skills, recognize_entities, resolve_deadlines, segment,
};

/// Everything one pipeline invocation produced
///
/// Intermediate state (the sentence sequence, per-stage diagnostics) is kept
/// so any stage's input can be reconstructed when debugging a batch.
#[derive(Debug)]
pub struct PipelineResult {
    pub sentences: Vec<Sentence>,
    pub tasks: Vec<Task>,
    pub graph: DependencyGraph,
    pub diagnostics: Vec<Diagnostic>,
}

/// Run the whole enrichment pipeline over one transcript
///
/// Strictly sequential: each stage consumes the previous stage's output and
/// returns an enriched copy. Given the same (transcript, roster snapshot,
/// anchor) the result is byte-for-byte deterministic. The roster is
/// snapshotted by the caller; nothing here reads shared state.
pub fn run_pipeline(
    transcript: &str,
    roster: &Roster,
    processing_time: DateTime<Utc>,
    rules: &RuleSet,
) -> PipelineResult {
    let sentences = segment(transcript, &rules.segmenter);
    info!("Segmented {} sentences", sentences.len());

    let tasks = extract_tasks(&sentences, &rules.extractor);
    info!("Extracted {} tasks", tasks.len());

    let tasks = recognize_entities(&tasks, &sentences, roster, &rules.entities);

    let deadline_result = resolve_deadlines(&tasks, &sentences, processing_time, &rules.deadlines);
    let diagnostics = deadline_result.diagnostics;
    let tasks = deadline_result.tasks;

    let tasks = classify_priorities(&tasks, &sentences, processing_time, &rules.priorities);

    let dependency_result = build_dependency_graph(&tasks, &sentences, &rules.dependencies);
    let graph = dependency_result.graph;
    let tasks = dependency_result.tasks;

    let tasks = match_skills(&tasks, &rules.skills);

    let tasks = assign_tasks(
        &tasks,
        &sentences,
        roster,
        &rules.roles,
        &AssignConfig::default(),
    );
    info!(
        "Assigned {} of {} tasks",
        tasks.iter().filter(|t| t.assigned_to.is_some()).count(),
        tasks.len()
    );

    PipelineResult {
        sentences,
        tasks,
        graph,
        diagnostics,
    }
}
