pub mod io;
pub mod models;
pub mod pipeline;
pub mod rules;
pub mod stages;
pub mod text;

pub use io::{BatchOutput, RosterError, TaskReport, load_roster_file, read_transcript};
pub use models::{
    DependencyEdge, DependencyGraph, Diagnostic, Entity, EntityKind, Priority, Roster, Sentence,
    Task, TeamMember,
};
pub use pipeline::{PipelineResult, run_pipeline};
pub use rules::RuleSet;
pub use stages::{
    AssignConfig, AssignmentSuggestion, ValidatorConfig, assign_tasks, build_dependency_graph,
    classify_priorities, extract_tasks, match_skills, recognize_entities, resolve_deadlines,
    segment, validate_assignments,
};
