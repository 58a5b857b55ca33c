//! Static DAG task model: adjacency, predecessor cache, and WCETs.
//!
//! Node ids are dense and 1-based. Node `1` is the source and node `N` is the
//! sink. All per-node data is stored in vectors indexed by `id - 1`.

use rustc_hash::FxHashMap;
use std::collections::{HashMap, VecDeque};
use std::hash::BuildHasher;
use thiserror::Error;

/// Sub-job identifier (1-based, dense).
pub type NodeId = u32;

/// Simulated time and execution-time unit.
pub type Time = u64;

/// Malformed task graph. Raised at build time, before any simulation starts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Task graph has no nodes")]
    Empty,
    #[error("Unknown node {0} referenced in task graph")]
    UnknownNode(NodeId),
    #[error("Cycle detected in task graph")]
    Cycle,
    #[error("No path from source {from} to sink {to}")]
    NoSourceSinkPath { from: NodeId, to: NodeId },
    #[error("Node {0} is unreachable from the source")]
    UnreachableFromSource(NodeId),
    #[error("Node {0} cannot reach the sink")]
    CannotReachSink(NodeId),
    #[error("Total WCET of the task graph exceeds the time range")]
    WeightOverflow,
}

/// How much structure is enforced when building a [`DagTask`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ValidationMode {
    /// Every node must lie on some source-to-sink path.
    #[default]
    Strict,
    /// Only references, acyclicity, and the source-to-sink path are checked.
    Lenient,
}

/// Immutable DAG task.
#[derive(Clone, Debug)]
pub struct DagTask {
    succ: Vec<Vec<NodeId>>,
    pre: Vec<Vec<NodeId>>,
    wcet: Vec<Time>,
    topo: Vec<NodeId>,
}

impl DagTask {
    /// Build from an adjacency map (node -> successors) and a weight vector.
    ///
    /// The number of nodes is the length of `wcets`. Nodes missing from
    /// `graph` have no successors. Successor order is preserved and drives
    /// every tie-break downstream; repeated edges are collapsed.
    pub fn new<S: BuildHasher>(
        graph: &HashMap<NodeId, Vec<NodeId>, S>,
        wcets: Vec<Time>,
        mode: ValidationMode,
    ) -> Result<Self, GraphError> {
        let n = wcets.len();
        if n == 0 {
            return Err(GraphError::Empty);
        }
        // Every path weight and makespan is bounded by the volume
        wcets
            .iter()
            .try_fold(0, |acc: Time, &c| acc.checked_add(c))
            .ok_or(GraphError::WeightOverflow)?;

        let mut succ: Vec<Vec<NodeId>> = vec![Vec::new(); n];
        let mut pre: Vec<Vec<NodeId>> = vec![Vec::new(); n];

        // Visit keys in ascending order so predecessor lists are deterministic
        let mut keys: Vec<NodeId> = graph.keys().copied().collect();
        keys.sort_unstable();

        for from in keys {
            if !in_range(from, n) {
                return Err(GraphError::UnknownNode(from));
            }
            for &to in &graph[&from] {
                if !in_range(to, n) {
                    return Err(GraphError::UnknownNode(to));
                }
                let out = &mut succ[idx(from)];
                if out.contains(&to) {
                    continue;
                }
                out.push(to);
                pre[idx(to)].push(from);
            }
        }

        let topo = topological_order(&succ, &pre)?;

        let task = Self {
            succ,
            pre,
            wcet: wcets,
            topo,
        };
        task.validate(mode)?;
        Ok(task)
    }

    /// Build from an explicit edge list.
    pub fn from_edges(
        edges: &[(NodeId, NodeId)],
        wcets: Vec<Time>,
        mode: ValidationMode,
    ) -> Result<Self, GraphError> {
        let mut graph: FxHashMap<NodeId, Vec<NodeId>> = FxHashMap::default();
        for &(from, to) in edges {
            graph.entry(from).or_default().push(to);
        }
        Self::new(&graph, wcets, mode)
    }

    fn validate(&self, mode: ValidationMode) -> Result<(), GraphError> {
        let (source, sink) = (self.source(), self.sink());
        let from_source = self.reachable(source, Direction::Forward);
        if !from_source[idx(sink)] {
            return Err(GraphError::NoSourceSinkPath {
                from: source,
                to: sink,
            });
        }

        if mode == ValidationMode::Lenient {
            return Ok(());
        }

        if let Some(node) = self.nodes().find(|&v| !from_source[idx(v)]) {
            return Err(GraphError::UnreachableFromSource(node));
        }
        let to_sink = self.reachable(sink, Direction::Backward);
        if let Some(node) = self.nodes().find(|&v| !to_sink[idx(v)]) {
            return Err(GraphError::CannotReachSink(node));
        }
        Ok(())
    }

    fn reachable(&self, start: NodeId, direction: Direction) -> Vec<bool> {
        let mut seen = vec![false; self.len()];
        let mut queue = VecDeque::from([start]);
        seen[idx(start)] = true;
        while let Some(v) = queue.pop_front() {
            let next = match direction {
                Direction::Forward => self.successors(v),
                Direction::Backward => self.predecessors(v),
            };
            for &w in next {
                if !seen[idx(w)] {
                    seen[idx(w)] = true;
                    queue.push_back(w);
                }
            }
        }
        seen
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.wcet.len()
    }

    /// Always false for a successfully built task.
    pub fn is_empty(&self) -> bool {
        self.wcet.is_empty()
    }

    pub fn source(&self) -> NodeId {
        1
    }

    pub fn sink(&self) -> NodeId {
        self.wcet.len() as NodeId
    }

    /// All node ids in ascending order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        (1..=self.wcet.len()).map(|v| v as NodeId)
    }

    pub fn contains(&self, node: NodeId) -> bool {
        in_range(node, self.len())
    }

    #[inline]
    pub fn successors(&self, node: NodeId) -> &[NodeId] {
        &self.succ[idx(node)]
    }

    #[inline]
    pub fn predecessors(&self, node: NodeId) -> &[NodeId] {
        &self.pre[idx(node)]
    }

    #[inline]
    pub fn wcet(&self, node: NodeId) -> Time {
        self.wcet[idx(node)]
    }

    /// Weight vector, addressed by `id - 1`.
    pub fn wcets(&self) -> &[Time] {
        &self.wcet
    }

    /// Topological order (Kahn's algorithm, ready nodes taken by ascending id
    /// first, then in successor order).
    pub fn topological_order(&self) -> &[NodeId] {
        &self.topo
    }

    /// Sum of all WCETs; fits in [`Time`] for every built task.
    pub fn volume(&self) -> Time {
        self.wcet.iter().sum()
    }
}

#[derive(Clone, Copy)]
enum Direction {
    Forward,
    Backward,
}

#[inline]
fn idx(node: NodeId) -> usize {
    node as usize - 1
}

#[inline]
fn in_range(node: NodeId, n: usize) -> bool {
    node >= 1 && node as usize <= n
}

fn topological_order(
    succ: &[Vec<NodeId>],
    pre: &[Vec<NodeId>],
) -> Result<Vec<NodeId>, GraphError> {
    let mut in_degree: Vec<usize> = pre.iter().map(Vec::len).collect();
    let mut queue: VecDeque<NodeId> = in_degree
        .iter()
        .enumerate()
        .filter(|(_, &d)| d == 0)
        .map(|(i, _)| i as NodeId + 1)
        .collect();

    let mut order = Vec::with_capacity(succ.len());
    while let Some(v) = queue.pop_front() {
        order.push(v);
        for &w in &succ[idx(v)] {
            let degree = &mut in_degree[idx(w)];
            *degree -= 1;
            if *degree == 0 {
                queue.push_back(w);
            }
        }
    }

    if order.len() != succ.len() {
        return Err(GraphError::Cycle);
    }
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diamond() -> DagTask {
        DagTask::from_edges(
            &[(1, 2), (1, 3), (2, 4), (3, 4)],
            vec![1, 5, 1, 1],
            ValidationMode::Strict,
        )
        .unwrap()
    }

    #[test]
    fn test_predecessors_are_derived() {
        let dag = diamond();
        assert_eq!(dag.successors(1), &[2, 3]);
        assert_eq!(dag.predecessors(4), &[2, 3]);
        assert!(dag.predecessors(1).is_empty());
        assert_eq!(dag.wcet(2), 5);
        assert_eq!(dag.source(), 1);
        assert_eq!(dag.sink(), 4);
        assert_eq!(dag.volume(), 8);
    }

    #[test]
    fn test_topological_order_respects_edges() {
        let dag = diamond();
        let order = dag.topological_order();
        let pos = |v: NodeId| order.iter().position(|&x| x == v).unwrap();
        for v in dag.nodes() {
            for &w in dag.successors(v) {
                assert!(pos(v) < pos(w));
            }
        }
    }

    #[test]
    fn test_duplicate_edges_collapsed() {
        let dag = DagTask::from_edges(
            &[(1, 2), (1, 2), (2, 3)],
            vec![1, 1, 1],
            ValidationMode::Strict,
        )
        .unwrap();
        assert_eq!(dag.successors(1), &[2]);
        assert_eq!(dag.predecessors(2), &[1]);
    }

    #[test]
    fn test_unknown_node_rejected() {
        let result =
            DagTask::from_edges(&[(1, 2), (2, 7)], vec![1, 1, 1], ValidationMode::Strict);
        assert_eq!(result.unwrap_err(), GraphError::UnknownNode(7));

        let result = DagTask::from_edges(&[(0, 1)], vec![1], ValidationMode::Lenient);
        assert_eq!(result.unwrap_err(), GraphError::UnknownNode(0));
    }

    #[test]
    fn test_cycle_rejected() {
        let result = DagTask::from_edges(
            &[(1, 2), (2, 3), (3, 2), (3, 4)],
            vec![1, 1, 1, 1],
            ValidationMode::Lenient,
        );
        assert_eq!(result.unwrap_err(), GraphError::Cycle);
    }

    #[test]
    fn test_missing_source_sink_path() {
        let result = DagTask::from_edges(&[(1, 2)], vec![1, 1, 1], ValidationMode::Lenient);
        assert_eq!(
            result.unwrap_err(),
            GraphError::NoSourceSinkPath { from: 1, to: 3 }
        );
    }

    #[test]
    fn test_isolated_node_strict_vs_lenient() {
        // Node 3 has no edges at all
        let edges = [(1, 2), (2, 4)];
        let strict = DagTask::from_edges(&edges, vec![1, 1, 1, 1], ValidationMode::Strict);
        assert_eq!(strict.unwrap_err(), GraphError::UnreachableFromSource(3));

        let lenient = DagTask::from_edges(&edges, vec![1, 1, 1, 1], ValidationMode::Lenient);
        assert!(lenient.is_ok());
    }

    #[test]
    fn test_dead_end_node_rejected() {
        // Node 3 is reachable from the source but never reaches the sink
        let result = DagTask::from_edges(
            &[(1, 2), (1, 3), (2, 4)],
            vec![1, 1, 1, 1],
            ValidationMode::Strict,
        );
        assert_eq!(result.unwrap_err(), GraphError::CannotReachSink(3));
    }

    #[test]
    fn test_empty_and_out_of_range() {
        assert_eq!(
            DagTask::from_edges(&[], vec![], ValidationMode::Strict).unwrap_err(),
            GraphError::Empty
        );
        assert_eq!(
            DagTask::from_edges(&[(1, 3)], vec![1, 1], ValidationMode::Strict).unwrap_err(),
            GraphError::UnknownNode(3)
        );
    }

    #[test]
    fn test_total_weight_must_fit_time_range() {
        assert_eq!(
            DagTask::from_edges(&[(1, 2)], vec![Time::MAX, 1], ValidationMode::Strict)
                .unwrap_err(),
            GraphError::WeightOverflow
        );
        let dag =
            DagTask::from_edges(&[(1, 2)], vec![Time::MAX - 1, 1], ValidationMode::Strict).unwrap();
        assert_eq!(dag.volume(), Time::MAX);
    }

    #[test]
    fn test_single_node_task() {
        let dag = DagTask::from_edges(&[], vec![4], ValidationMode::Strict).unwrap();
        assert_eq!(dag.source(), dag.sink());
        assert_eq!(dag.topological_order(), &[1]);
    }
}
