//! Provider/consumer classification of non-critical nodes.
//!
//! A provider feeds the critical path; a consumer is fed by it. The partition
//! rule is a replaceable policy behind [`Classifier`], the eligibility ordering
//! only relies on the output contract: providers and consumers are disjoint
//! subsets of the non-critical nodes.

use std::collections::VecDeque;

use crate::graph::{DagTask, NodeId};

/// Partition of the non-critical nodes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Classification {
    pub providers: Vec<NodeId>,
    pub consumers: Vec<NodeId>,
    /// Nodes the rule could not place (only possible for leniently built tasks).
    pub unclassified: Vec<NodeId>,
}

/// Pluggable provider/consumer partition rule.
pub trait Classifier {
    fn classify(
        &self,
        dag: &DagTask,
        critical_path: &[NodeId],
        non_critical: &[NodeId],
    ) -> Classification;
}

/// Default rule: a node belongs to the side of the critical path it is
/// closer to, measured in edges through non-critical nodes only.
///
/// With `down` the hop count from the node forward to the nearest critical
/// node and `up` the hop count from the nearest critical node forward to it,
/// the node is a provider when `down <= up` and a consumer otherwise.
///
/// This is stricter than "reaches the critical path": a node that does reach
/// a critical node, but sits closer to the one feeding it, is a consumer.
/// Callers wanting the reachability-only partition supply their own
/// [`Classifier`].
#[derive(Clone, Copy, Debug, Default)]
pub struct ProximityClassifier;

impl Classifier for ProximityClassifier {
    fn classify(
        &self,
        dag: &DagTask,
        critical_path: &[NodeId],
        non_critical: &[NodeId],
    ) -> Classification {
        let down = hops_to_critical(dag, critical_path);
        let up = hops_from_critical(dag, critical_path);

        let mut result = Classification::default();
        for &v in non_critical {
            let i = v as usize - 1;
            match (down[i], up[i]) {
                (Some(d), Some(u)) if d <= u => result.providers.push(v),
                (Some(_), Some(_)) => result.consumers.push(v),
                (Some(_), None) => result.providers.push(v),
                (None, Some(_)) => result.consumers.push(v),
                (None, None) => result.unclassified.push(v),
            }
        }
        result
    }
}

/// Fewest edges from each node forward to a critical node, walking through
/// non-critical nodes only. Critical nodes themselves report `Some(0)`.
pub fn hops_to_critical(dag: &DagTask, critical_path: &[NodeId]) -> Vec<Option<u32>> {
    bfs_from_critical(dag, critical_path, |v| dag.predecessors(v))
}

/// Fewest edges from a critical node forward to each node, walking through
/// non-critical nodes only. Critical nodes themselves report `Some(0)`.
pub fn hops_from_critical(dag: &DagTask, critical_path: &[NodeId]) -> Vec<Option<u32>> {
    bfs_from_critical(dag, critical_path, |v| dag.successors(v))
}

fn bfs_from_critical<'a>(
    dag: &'a DagTask,
    critical_path: &[NodeId],
    neighbours: impl Fn(NodeId) -> &'a [NodeId],
) -> Vec<Option<u32>> {
    let mut dist: Vec<Option<u32>> = vec![None; dag.len()];
    let mut queue: VecDeque<NodeId> = VecDeque::new();
    for &c in critical_path {
        dist[c as usize - 1] = Some(0);
        queue.push_back(c);
    }

    while let Some(v) = queue.pop_front() {
        let d = dist[v as usize - 1].unwrap_or(0);
        for &w in neighbours(v) {
            let slot = &mut dist[w as usize - 1];
            if slot.is_none() {
                *slot = Some(d + 1);
                queue.push_back(w);
            }
        }
    }
    dist
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ValidationMode;

    fn classify(edges: &[(NodeId, NodeId)], n: usize, critical: &[NodeId]) -> Classification {
        let dag = DagTask::from_edges(edges, vec![1; n], ValidationMode::Lenient).unwrap();
        let non_critical: Vec<NodeId> = dag.nodes().filter(|v| !critical.contains(v)).collect();
        ProximityClassifier.classify(&dag, critical, &non_critical)
    }

    #[test]
    fn test_diamond_side_branch_is_provider() {
        let c = classify(&[(1, 2), (1, 3), (2, 4), (3, 4)], 4, &[1, 2, 4]);
        assert_eq!(c.providers, vec![3]);
        assert!(c.consumers.is_empty());
        assert!(c.unclassified.is_empty());
    }

    #[test]
    fn test_long_branch_splits_by_proximity() {
        // 1 -> 2 -> 6 is critical; 1 -> 3 -> 4 -> 5 -> 6 is a side chain
        let c = classify(
            &[(1, 2), (2, 6), (1, 3), (3, 4), (4, 5), (5, 6)],
            6,
            &[1, 2, 6],
        );
        // 3: up 1, down 3 -> consumer; 4: up 2, down 2 -> provider; 5: provider
        assert_eq!(c.consumers, vec![3]);
        assert_eq!(c.providers, vec![4, 5]);

        // 3 does reach the critical path, proximity still makes it a consumer
        let d = DagTask::from_edges(
            &[(1, 2), (2, 6), (1, 3), (3, 4), (4, 5), (5, 6)],
            vec![1; 6],
            ValidationMode::Strict,
        )
        .unwrap();
        assert_eq!(hops_to_critical(&d, &[1, 2, 6])[2], Some(3));
    }

    #[test]
    fn test_partition_is_disjoint_and_complete() {
        let edges = [
            (1, 2),
            (2, 3),
            (3, 8),
            (1, 4),
            (4, 5),
            (5, 3),
            (2, 6),
            (6, 7),
            (7, 8),
        ];
        let critical = [1, 2, 3, 8];
        let c = classify(&edges, 8, &critical);
        let mut all: Vec<NodeId> = critical.to_vec();
        all.extend(&c.providers);
        all.extend(&c.consumers);
        all.sort_unstable();
        assert_eq!(all, (1..=8).collect::<Vec<_>>());
        assert!(c.providers.iter().all(|p| !c.consumers.contains(p)));
    }

    #[test]
    fn test_isolated_node_unclassified() {
        let c = classify(&[(1, 2), (2, 4)], 4, &[1, 2, 4]);
        assert_eq!(c.unclassified, vec![3]);
    }

    #[test]
    fn test_hop_distances() {
        let dag = DagTask::from_edges(
            &[(1, 2), (2, 6), (1, 3), (3, 4), (4, 5), (5, 6)],
            vec![1; 6],
            ValidationMode::Strict,
        )
        .unwrap();
        let down = hops_to_critical(&dag, &[1, 2, 6]);
        let up = hops_from_critical(&dag, &[1, 2, 6]);
        assert_eq!(down, vec![Some(0), Some(0), Some(3), Some(2), Some(1), Some(0)]);
        assert_eq!(up, vec![Some(0), Some(0), Some(1), Some(2), Some(3), Some(0)]);
    }
}
