use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap, HashMap};

use regex::Regex;
use tracing::{debug, info};

use crate::models::{DependencyEdge, DependencyGraph, Sentence, Task, context_window};
use crate::rules::DependencyRules;
use crate::text::{contains_phrase, keywords, normalize};

/// Result of dependency graph construction
#[derive(Debug)]
pub struct DependencyResult {
    pub tasks: Vec<Task>,
    pub graph: DependencyGraph,
}

/// Detect inter-task dependencies and build the execution graph
///
/// Each task's context window is scanned for dependency phrasing; the
/// referenced task resolves to an explicit "task N" mention or the nearest
/// preceding task whose description shares keywords with the reference. An
/// edge A -> B means A must complete before B. Cycles flip `has_cycles` and
/// leave `execution_order` empty; no partial order is ever produced.
pub fn build_dependency_graph(
    tasks: &[Task],
    sentences: &[Sentence],
    rules: &DependencyRules,
) -> DependencyResult {
    let mut edges: Vec<DependencyEdge> = Vec::new();

    for task in tasks {
        for dep_id in find_dependencies(task, tasks, sentences, rules) {
            let edge = DependencyEdge {
                from_task_id: dep_id,
                to_task_id: task.id,
            };
            if !edges.contains(&edge) {
                debug!("Dependency edge {} -> {}", edge.from_task_id, edge.to_task_id);
                edges.push(edge);
            }
        }
    }

    let graph = assemble_graph(tasks, edges);
    info!(
        "Dependency graph: {} edges, cycles={}",
        graph.edges.len(),
        graph.has_cycles
    );

    let tasks = tasks
        .iter()
        .map(|task| {
            let mut enriched = task.clone();
            enriched.dependencies = graph.dependencies_of(task.id);
            enriched
        })
        .collect();

    DependencyResult { tasks, graph }
}

/// Ids of tasks the given task depends on, resolved from its context window
fn find_dependencies(
    task: &Task,
    all_tasks: &[Task],
    sentences: &[Sentence],
    rules: &DependencyRules,
) -> Vec<u32> {
    let mut dependencies = Vec::new();

    for sentence in context_window(sentences, task.origin_sentence_index) {
        let norm = normalize(&sentence.text);
        for cue in &rules.cue_phrases {
            let cue_norm = normalize(cue);
            for reference in references_after_cue(&norm, &cue_norm) {
                if let Some(dep_id) = resolve_reference(&reference, task, all_tasks, rules) {
                    if dep_id != task.id && !dependencies.contains(&dep_id) {
                        dependencies.push(dep_id);
                    }
                }
            }
        }
        // "first X, then Y": the part after "then" depends on the part
        // after "first"
        if let (Some(first_pos), Some(_)) = (norm.find("first "), norm.find(" then ")) {
            let reference = norm[first_pos + "first ".len()..]
                .split(" then ")
                .next()
                .unwrap_or("")
                .to_string();
            if let Some(dep_id) = resolve_reference(&reference, task, all_tasks, rules) {
                if dep_id != task.id && !dependencies.contains(&dep_id) {
                    dependencies.push(dep_id);
                }
            }
        }
    }

    dependencies
}

/// Text segments that follow a cue phrase, clipped at clause punctuation
fn references_after_cue(sentence_norm: &str, cue_norm: &str) -> Vec<String> {
    let padded = format!("{} ", cue_norm);
    let mut references = Vec::new();
    let mut search_from = 0;
    while let Some(pos) = sentence_norm[search_from..].find(&padded) {
        let abs = search_from + pos;
        // cue must start on a word boundary
        let boundary_ok = abs == 0
            || sentence_norm[..abs]
                .chars()
                .next_back()
                .is_some_and(|c| !c.is_alphanumeric());
        if boundary_ok {
            let rest = &sentence_norm[abs + padded.len()..];
            let clipped: String = rest
                .split([',', ';'])
                .next()
                .unwrap_or("")
                .trim()
                .to_string();
            if !clipped.is_empty() {
                references.push(clipped);
            }
        }
        search_from = abs + padded.len();
    }
    references
}

/// Resolve a reference to a task id: explicit "task N" first, then nearest
/// preceding task with sufficient keyword overlap
fn resolve_reference(
    reference: &str,
    current: &Task,
    all_tasks: &[Task],
    rules: &DependencyRules,
) -> Option<u32> {
    if let Some(caps) = Regex::new(r"\btask (\d+)\b")
        .ok()
        .and_then(|re| re.captures(reference))
    {
        let id: u32 = caps[1].parse().ok()?;
        if all_tasks.iter().any(|t| t.id == id) {
            return Some(id);
        }
    }

    // temporal and status words say when, not which task
    const NOISE: &[&str] = &[
        "tomorrow", "today", "tonight", "yesterday", "week", "month", "quarter", "morning",
        "afternoon", "evening", "monday", "tuesday", "wednesday", "thursday", "friday",
        "saturday", "sunday", "done", "finished", "finishes", "complete", "completed",
        "completes", "ready", "lands", "merged",
    ];
    let reference_keywords: Vec<String> = keywords(reference, 3)
        .into_iter()
        .filter(|kw| !NOISE.contains(&kw.as_str()))
        .collect();
    if reference_keywords.is_empty() {
        return None;
    }

    // nearest preceding task wins, not the best-overlapping one
    all_tasks
        .iter()
        .filter(|t| t.id < current.id)
        .rev()
        .find(|t| {
            let overlap = reference_keywords
                .iter()
                .filter(|kw| contains_phrase(&t.description, kw))
                .count();
            overlap >= rules.min_keyword_overlap
        })
        .map(|t| t.id)
}

/// Build the graph structure and compute cycle status and execution order
fn assemble_graph(tasks: &[Task], edges: Vec<DependencyEdge>) -> DependencyGraph {
    let task_ids: Vec<u32> = tasks.iter().map(|t| t.id).collect();

    let mut adjacency: BTreeMap<u32, Vec<u32>> = BTreeMap::new();
    for edge in &edges {
        adjacency.entry(edge.from_task_id).or_default().push(edge.to_task_id);
    }
    for targets in adjacency.values_mut() {
        targets.sort_unstable();
        targets.dedup();
    }

    let has_cycles = detect_cycle(&task_ids, &adjacency);
    let execution_order = if has_cycles {
        None
    } else {
        Some(topological_order(&task_ids, &edges, &adjacency))
    };

    DependencyGraph {
        edges,
        adjacency,
        has_cycles,
        execution_order,
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// Depth-first cycle detection with three-color marking; a back edge to an
/// in-progress node is a cycle
fn detect_cycle(task_ids: &[u32], adjacency: &BTreeMap<u32, Vec<u32>>) -> bool {
    let mut marks: HashMap<u32, Mark> = task_ids.iter().map(|&id| (id, Mark::Unvisited)).collect();

    fn visit(node: u32, adjacency: &BTreeMap<u32, Vec<u32>>, marks: &mut HashMap<u32, Mark>) -> bool {
        marks.insert(node, Mark::InProgress);
        for &next in adjacency.get(&node).map(Vec::as_slice).unwrap_or(&[]) {
            match marks.get(&next).copied().unwrap_or(Mark::Done) {
                Mark::InProgress => return true,
                Mark::Unvisited => {
                    if visit(next, adjacency, marks) {
                        return true;
                    }
                }
                Mark::Done => {}
            }
        }
        marks.insert(node, Mark::Done);
        false
    }

    for &id in task_ids {
        if marks.get(&id).copied() == Some(Mark::Unvisited) && visit(id, adjacency, &mut marks) {
            return true;
        }
    }
    false
}

/// Kahn's algorithm over all batch tasks with a deterministic tie-break:
/// among ready nodes, the lowest task id is emitted first
fn topological_order(
    task_ids: &[u32],
    edges: &[DependencyEdge],
    adjacency: &BTreeMap<u32, Vec<u32>>,
) -> Vec<u32> {
    let mut in_degree: BTreeMap<u32, usize> = task_ids.iter().map(|&id| (id, 0)).collect();
    for edge in edges {
        if let Some(degree) = in_degree.get_mut(&edge.to_task_id) {
            *degree += 1;
        }
    }

    let mut ready: BinaryHeap<Reverse<u32>> = in_degree
        .iter()
        .filter(|&(_, &degree)| degree == 0)
        .map(|(&id, _)| Reverse(id))
        .collect();
    let mut order = Vec::with_capacity(task_ids.len());

    while let Some(Reverse(id)) = ready.pop() {
        order.push(id);
        for &next in adjacency.get(&id).map(Vec::as_slice).unwrap_or(&[]) {
            if let Some(degree) = in_degree.get_mut(&next) {
                *degree -= 1;
                if *degree == 0 {
                    ready.push(Reverse(next));
                }
            }
        }
    }

    order
}

#[cfg(test)]
mod tests {
    use super::*;

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

    fn task(id: u32, description: &str, origin: usize) -> Task {
        Task::new(id, description, origin)
    }

    #[test]
    fn test_overlap_reference_builds_edge() {
        let s = sentences(&[
            "John needs to fix the login bug by tomorrow",
            "Sarah should review the login bug after John is done",
        ]);
        let tasks = vec![
            task(1, "John needs to fix the login bug by tomorrow", 0),
            task(2, "Sarah should review the login bug after John is done", 1),
        ];
        let result = build_dependency_graph(&tasks, &s, &DependencyRules::default());

        assert_eq!(
            result.graph.edges,
            vec![DependencyEdge {
                from_task_id: 1,
                to_task_id: 2,
            }]
        );
        assert!(!result.graph.has_cycles);
        assert_eq!(result.graph.execution_order, Some(vec![1, 2]));
        assert_eq!(result.tasks[1].dependencies, vec![1]);
        assert!(result.tasks[0].dependencies.is_empty());
    }

    #[test]
    fn test_explicit_task_number_reference() {
        let s = sentences(&[
            "Create the database schema for accounts",
            "Deploy the service once task 1 is finished",
        ]);
        let tasks = vec![
            task(1, "Create the database schema for accounts", 0),
            task(2, "Deploy the service once task 1 is finished", 1),
        ];
        let result = build_dependency_graph(&tasks, &s, &DependencyRules::default());
        assert_eq!(result.tasks[1].dependencies, vec![1]);
    }

    #[test]
    fn test_no_cue_no_edges() {
        let s = sentences(&[
            "Create the database schema for accounts",
            "Deploy the service to staging",
        ]);
        let tasks = vec![
            task(1, "Create the database schema for accounts", 0),
            task(2, "Deploy the service to staging", 1),
        ];
        let result = build_dependency_graph(&tasks, &s, &DependencyRules::default());
        assert!(result.graph.edges.is_empty());
        assert_eq!(result.graph.execution_order, Some(vec![1, 2]));
    }

    #[test]
    fn test_cycle_sets_flag_and_clears_order() {
        // hand-assembled cycle; the builder must refuse a partial order
        let tasks = vec![task(1, "write the design doc", 0), task(2, "review the design doc", 1)];
        let edges = vec![
            DependencyEdge {
                from_task_id: 1,
                to_task_id: 2,
            },
            DependencyEdge {
                from_task_id: 2,
                to_task_id: 1,
            },
        ];
        let graph = assemble_graph(&tasks, edges);
        assert!(graph.has_cycles);
        assert_eq!(graph.execution_order, None);
    }

    #[test]
    fn test_ready_tie_break_prefers_lowest_id() {
        let tasks = vec![
            task(1, "a", 0),
            task(2, "b", 1),
            task(3, "c", 2),
            task(4, "d", 3),
        ];
        // 3 -> 1: task 1 is blocked, 2/3/4 are ready; lowest ready id first
        let edges = vec![DependencyEdge {
            from_task_id: 3,
            to_task_id: 1,
        }];
        let graph = assemble_graph(&tasks, edges);
        assert_eq!(graph.execution_order, Some(vec![2, 3, 1, 4]));
    }

    #[test]
    fn test_self_reference_is_dropped() {
        let s = sentences(&["Restart the indexer after the indexer run completes"]);
        let tasks = vec![task(1, "Restart the indexer after the indexer run completes", 0)];
        let result = build_dependency_graph(&tasks, &s, &DependencyRules::default());
        assert!(result.graph.edges.is_empty());
        assert!(!result.graph.has_cycles);
    }

    #[test]
    fn test_execution_order_respects_all_predecessors() {
        let tasks = vec![task(1, "a", 0), task(2, "b", 1), task(3, "c", 2)];
        let edges = vec![
            DependencyEdge {
                from_task_id: 2,
                to_task_id: 3,
            },
            DependencyEdge {
                from_task_id: 1,
                to_task_id: 2,
            },
        ];
        let graph = assemble_graph(&tasks, edges);
        let order = graph.execution_order.unwrap();
        let pos = |id: u32| order.iter().position(|&x| x == id).unwrap();
        assert!(pos(1) < pos(2));
        assert!(pos(2) < pos(3));
    }
}
