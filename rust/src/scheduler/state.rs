//! Waiting / Ready / Finished queues for one simulation run.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::eligibility::UNASSIGNED;
use crate::graph::{DagTask, NodeId};

/// Per-node queue membership. A dispatched node has left Ready and is not
/// Finished yet; the core tracks it.
#[derive(Clone, Debug)]
pub struct JobQueues {
    waiting: FxHashSet<NodeId>,
    ready: FxHashSet<NodeId>,
    finished: FxHashSet<NodeId>,
    total: usize,
}

impl JobQueues {
    /// Every node starts Waiting.
    pub fn new(dag: &DagTask) -> Self {
        Self {
            waiting: dag.nodes().collect(),
            ready: FxHashSet::default(),
            finished: FxHashSet::default(),
            total: dag.len(),
        }
    }

    /// Move every Waiting node whose predecessors are all Finished into Ready.
    ///
    /// Returns the promoted nodes in ascending order.
    pub fn promote_ready(&mut self, dag: &DagTask) -> Vec<NodeId> {
        let mut promoted: Vec<NodeId> = self
            .waiting
            .iter()
            .copied()
            .filter(|&v| dag.predecessors(v).iter().all(|p| self.finished.contains(p)))
            .collect();
        promoted.sort_unstable();
        for v in &promoted {
            self.waiting.remove(v);
            self.ready.insert(*v);
        }
        promoted
    }

    /// Remove and return the Ready node with the highest priority; equal
    /// priorities go to the lowest node id. Missing entries count as
    /// unassigned.
    pub fn dispatch(&mut self, priorities: &FxHashMap<NodeId, i32>) -> Option<NodeId> {
        let prio = |v: NodeId| priorities.get(&v).copied().unwrap_or(UNASSIGNED);
        let chosen = self
            .ready
            .iter()
            .copied()
            .min_by_key(|&v| (std::cmp::Reverse(prio(v)), v))?;
        self.ready.remove(&chosen);
        Some(chosen)
    }

    pub fn finish(&mut self, node: NodeId) {
        self.finished.insert(node);
    }

    pub fn all_finished(&self) -> bool {
        self.finished.len() == self.total
    }

    pub fn is_waiting(&self, node: NodeId) -> bool {
        self.waiting.contains(&node)
    }

    pub fn is_ready(&self, node: NodeId) -> bool {
        self.ready.contains(&node)
    }

    pub fn is_finished(&self, node: NodeId) -> bool {
        self.finished.contains(&node)
    }

    pub fn finished_count(&self) -> usize {
        self.finished.len()
    }
}
