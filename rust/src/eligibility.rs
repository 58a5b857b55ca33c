//! Eligibility Ordering: static priority assignment for a DAG task.
//!
//! Critical-path nodes are ranked highest, then providers (nearest to the
//! critical path first), then consumers (nearest first). Priorities are handed
//! out in increasing order starting at [`FIRST_PRIORITY`] from the lowest-ranked
//! node, so every assigned priority is distinct and a larger value wins.

use rustc_hash::FxHashMap;
use std::cmp::Reverse;
use std::time::{Duration, Instant};

use crate::critical_path::{
    hops_from_critical, hops_to_critical, longest_path, Classifier, CriticalPath, PathTieBreak,
    ProximityClassifier,
};
use crate::graph::{DagTask, GraphError, NodeId};

/// Priority of a node that no rule reached.
pub const UNASSIGNED: i32 = -1;

/// Lowest priority handed out to a ranked node.
pub const FIRST_PRIORITY: i32 = 2;

/// Output of the ordering pass, including per-run instrumentation.
#[derive(Clone, Debug)]
pub struct EligibilityOrdering {
    /// Priority per node; larger is more eligible.
    pub priorities: FxHashMap<NodeId, i32>,
    pub critical_path: CriticalPath,
    pub providers: Vec<NodeId>,
    pub consumers: Vec<NodeId>,
    /// Nodes left at [`UNASSIGNED`], ascending.
    pub unassigned: Vec<NodeId>,
    /// Time spent classifying providers and consumers.
    pub classification_time: Duration,
    /// Time spent ranking and numbering.
    pub ordering_time: Duration,
}

impl EligibilityOrdering {
    pub fn priority(&self, node: NodeId) -> i32 {
        self.priorities.get(&node).copied().unwrap_or(UNASSIGNED)
    }

    pub fn is_complete(&self) -> bool {
        self.unassigned.is_empty()
    }
}

/// Assign priorities using the default [`ProximityClassifier`].
pub fn assign_priorities(
    dag: &DagTask,
    tie_break: PathTieBreak,
) -> Result<EligibilityOrdering, GraphError> {
    assign_priorities_with(dag, &ProximityClassifier, tie_break)
}

/// Assign priorities with a caller-supplied provider/consumer rule.
///
/// Pure: the same task and rule always produce the same map.
pub fn assign_priorities_with(
    dag: &DagTask,
    classifier: &dyn Classifier,
    tie_break: PathTieBreak,
) -> Result<EligibilityOrdering, GraphError> {
    // I. critical path and VN
    let critical_path = longest_path(dag, dag.source(), dag.sink(), tie_break)?;
    let non_critical = critical_path.non_critical(dag);

    // II. everything starts unassigned
    let mut priorities: FxHashMap<NodeId, i32> = dag.nodes().map(|v| (v, UNASSIGNED)).collect();

    // III. providers and consumers
    let begin = Instant::now();
    let classification = classifier.classify(dag, &critical_path.nodes, &non_critical);
    let classification_time = begin.elapsed();

    // IV. rank and number
    let begin = Instant::now();
    let ranking = rank(dag, &critical_path, &classification.providers, &classification.consumers);
    let mut next = FIRST_PRIORITY;
    for &v in ranking.iter().rev() {
        if let Some(p) = priorities.get_mut(&v) {
            *p = next;
            next += 1;
        }
    }
    let ordering_time = begin.elapsed();

    let mut unassigned: Vec<NodeId> = priorities
        .iter()
        .filter(|(_, &p)| p < FIRST_PRIORITY)
        .map(|(&v, _)| v)
        .collect();
    unassigned.sort_unstable();

    Ok(EligibilityOrdering {
        priorities,
        critical_path,
        providers: classification.providers,
        consumers: classification.consumers,
        unassigned,
        classification_time,
        ordering_time,
    })
}

/// Nodes from most to least eligible. Each node appears at most once; nodes a
/// classifier placed on both sides keep their provider rank.
fn rank(
    dag: &DagTask,
    critical_path: &CriticalPath,
    providers: &[NodeId],
    consumers: &[NodeId],
) -> Vec<NodeId> {
    let down = hops_to_critical(dag, &critical_path.nodes);
    let up = hops_from_critical(dag, &critical_path.nodes);
    let hops = |dist: &[Option<u32>], v: NodeId| dist[v as usize - 1].unwrap_or(u32::MAX);

    let mut ranking: Vec<NodeId> = critical_path.nodes.clone();
    let mut seen = critical_path.mask(dag);

    let mut by_distance = |group: &[NodeId], dist: &[Option<u32>]| {
        let mut group: Vec<NodeId> = group
            .iter()
            .copied()
            .filter(|&v| dag.contains(v) && !seen[v as usize - 1])
            .collect();
        group.sort_by_key(|&v| (hops(dist, v), Reverse(dag.wcet(v)), v));
        group.dedup();
        for &v in &group {
            seen[v as usize - 1] = true;
        }
        group
    };

    let providers = by_distance(providers, &down);
    ranking.extend(providers);
    let consumers = by_distance(consumers, &up);
    ranking.extend(consumers);
    ranking
}
