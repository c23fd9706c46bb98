use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A directed dependency edge: `from_task_id` must complete before
/// `to_task_id` can start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub from_task_id: u32,
    pub to_task_id: u32,
}

/// The dependency graph over one task batch
///
/// Adjacency is id-based (prerequisite id -> dependent ids) so the graph can
/// be stored and read without object references. `execution_order` is
/// populated exactly when the graph is acyclic; a cyclic graph never gets a
/// partial order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyGraph {
    pub edges: Vec<DependencyEdge>,
    pub adjacency: BTreeMap<u32, Vec<u32>>,
    pub has_cycles: bool,
    pub execution_order: Option<Vec<u32>>,
}

impl DependencyGraph {
    /// A graph with no edges over the given task ids
    pub fn empty(task_ids: impl IntoIterator<Item = u32>) -> Self {
        let order: Vec<u32> = task_ids.into_iter().collect();
        Self {
            edges: Vec::new(),
            adjacency: BTreeMap::new(),
            has_cycles: false,
            execution_order: Some(order),
        }
    }

    /// Ids this task depends on (its prerequisites), ascending
    pub fn dependencies_of(&self, task_id: u32) -> Vec<u32> {
        let mut deps: Vec<u32> = self
            .edges
            .iter()
            .filter(|e| e.to_task_id == task_id)
            .map(|e| e.from_task_id)
            .collect();
        deps.sort_unstable();
        deps.dedup();
        deps
    }

    /// Ids that depend on this task, ascending
    pub fn dependents_of(&self, task_id: u32) -> Vec<u32> {
        self.adjacency.get(&task_id).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_graph_orders_all_ids() {
        let graph = DependencyGraph::empty([1, 2, 3]);
        assert!(!graph.has_cycles);
        assert_eq!(graph.execution_order, Some(vec![1, 2, 3]));
        assert!(graph.dependencies_of(2).is_empty());
    }

    #[test]
    fn test_dependencies_of_reads_incoming_edges() {
        let graph = DependencyGraph {
            edges: vec![
                DependencyEdge {
                    from_task_id: 1,
                    to_task_id: 3,
                },
                DependencyEdge {
                    from_task_id: 2,
                    to_task_id: 3,
                },
            ],
            adjacency: BTreeMap::from([(1, vec![3]), (2, vec![3])]),
            has_cycles: false,
            execution_order: Some(vec![1, 2, 3]),
        };
        assert_eq!(graph.dependencies_of(3), vec![1, 2]);
        assert_eq!(graph.dependents_of(1), vec![3]);
    }
}
