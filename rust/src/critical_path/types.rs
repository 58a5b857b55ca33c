//! Types for critical path analysis.

use crate::graph::{DagTask, NodeId, Time};

/// Which maximum-weight path wins when several share the maximum.
///
/// Both variants are defined in terms of depth-first enumeration of
/// source-to-sink paths, visiting successors in adjacency order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PathTieBreak {
    /// First maximum path in enumeration order.
    #[default]
    First,
    /// Last maximum path in enumeration order (legacy experiment scripts).
    Last,
}

impl PathTieBreak {
    /// Parse the names accepted by the configuration layer.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "first" => Some(Self::First),
            "last" => Some(Self::Last),
            _ => None,
        }
    }
}

/// The maximum-weight source-to-sink path (λ).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CriticalPath {
    /// Total WCET along the path, both endpoints included.
    pub length: Time,
    /// Node ids from source to sink.
    pub nodes: Vec<NodeId>,
}

impl CriticalPath {
    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains(&node)
    }

    /// Membership mask indexed by `id - 1`.
    pub fn mask(&self, dag: &DagTask) -> Vec<bool> {
        let mut mask = vec![false; dag.len()];
        for &v in &self.nodes {
            mask[v as usize - 1] = true;
        }
        mask
    }

    /// Non-critical nodes (VN) in ascending id order.
    pub fn non_critical(&self, dag: &DagTask) -> Vec<NodeId> {
        let mask = self.mask(dag);
        dag.nodes().filter(|&v| !mask[v as usize - 1]).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ValidationMode;

    #[test]
    fn test_tie_break_names() {
        assert_eq!(PathTieBreak::from_name("first"), Some(PathTieBreak::First));
        assert_eq!(PathTieBreak::from_name("last"), Some(PathTieBreak::Last));
        assert_eq!(PathTieBreak::from_name("middle"), None);
        assert_eq!(PathTieBreak::default(), PathTieBreak::First);
    }

    #[test]
    fn test_non_critical_nodes() {
        let dag = DagTask::from_edges(
            &[(1, 2), (1, 3), (2, 4), (3, 4)],
            vec![1, 5, 1, 1],
            ValidationMode::Strict,
        )
        .unwrap();
        let path = CriticalPath {
            length: 7,
            nodes: vec![1, 2, 4],
        };
        assert_eq!(path.non_critical(&dag), vec![3]);
        assert!(path.contains(2));
        assert!(!path.contains(3));
    }
}
