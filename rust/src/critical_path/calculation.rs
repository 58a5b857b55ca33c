//! Longest weighted path between two nodes of a DAG task.
//!
//! [`longest_path`] is a dynamic program over the reverse topological order,
//! O(N + E). It selects the same path that exhaustive depth-first enumeration
//! ([`all_paths`]) followed by a max scan would select, for either
//! [`PathTieBreak`]: at every node the chosen successor is the first (or last)
//! one, in adjacency order, whose best tail attains the maximum.

use crate::graph::{DagTask, GraphError, NodeId, Time};

use super::types::{CriticalPath, PathTieBreak};

/// Compute the maximum-weight path from `source` to `sink`.
///
/// Path weight is the sum of node WCETs including both endpoints.
///
/// # Errors
/// * `GraphError::UnknownNode` if either endpoint is not in the task
/// * `GraphError::NoSourceSinkPath` if `sink` is unreachable from `source`
pub fn longest_path(
    dag: &DagTask,
    source: NodeId,
    sink: NodeId,
    tie_break: PathTieBreak,
) -> Result<CriticalPath, GraphError> {
    for node in [source, sink] {
        if !dag.contains(node) {
            return Err(GraphError::UnknownNode(node));
        }
    }

    let n = dag.len();
    // best[v] = heaviest v -> sink tail, next[v] = successor taken on that tail
    let mut best: Vec<Option<Time>> = vec![None; n];
    let mut next: Vec<Option<NodeId>> = vec![None; n];

    for &v in dag.topological_order().iter().rev() {
        let i = v as usize - 1;
        if v == sink {
            best[i] = Some(dag.wcet(v));
            continue;
        }

        let mut chosen: Option<(NodeId, Time)> = None;
        for &s in dag.successors(v) {
            let Some(tail) = best[s as usize - 1] else {
                continue;
            };
            let better = match (chosen, tie_break) {
                (None, _) => true,
                (Some((_, cur)), PathTieBreak::First) => tail > cur,
                (Some((_, cur)), PathTieBreak::Last) => tail >= cur,
            };
            if better {
                chosen = Some((s, tail));
            }
        }

        if let Some((s, tail)) = chosen {
            best[i] = Some(dag.wcet(v) + tail);
            next[i] = Some(s);
        }
    }

    let length = best[source as usize - 1].ok_or(GraphError::NoSourceSinkPath {
        from: source,
        to: sink,
    })?;

    let mut nodes = vec![source];
    let mut cur = source;
    while cur != sink {
        match next[cur as usize - 1] {
            Some(s) => {
                nodes.push(s);
                cur = s;
            }
            None => break,
        }
    }

    Ok(CriticalPath { length, nodes })
}

/// Enumerate every simple path from `source` to `sink` in depth-first order.
///
/// Exponential in the worst case; intended for the small task graphs this
/// tool targets and as a cross-check for [`longest_path`].
pub fn all_paths(dag: &DagTask, source: NodeId, sink: NodeId) -> Vec<Vec<NodeId>> {
    let mut paths = Vec::new();
    if !dag.contains(source) || !dag.contains(sink) {
        return paths;
    }
    let mut current = Vec::new();
    extend_paths(dag, source, sink, &mut current, &mut paths);
    paths
}

fn extend_paths(
    dag: &DagTask,
    vertex: NodeId,
    sink: NodeId,
    current: &mut Vec<NodeId>,
    paths: &mut Vec<Vec<NodeId>>,
) {
    current.push(vertex);
    if vertex == sink {
        paths.push(current.clone());
    } else {
        for &next in dag.successors(vertex) {
            if !current.contains(&next) {
                extend_paths(dag, next, sink, current, paths);
            }
        }
    }
    current.pop();
}

/// Sum of WCETs along a path, saturating at [`Time::MAX`].
///
/// Simple paths never saturate, since a built task's volume fits in [`Time`].
pub fn path_weight(dag: &DagTask, path: &[NodeId]) -> Time {
    path.iter()
        .fold(0, |acc: Time, &v| acc.saturating_add(dag.wcet(v)))
}

/// Reference selection over [`all_paths`]: scan in enumeration order and keep
/// the first (or last) path with maximum weight.
pub fn longest_path_exhaustive(
    dag: &DagTask,
    source: NodeId,
    sink: NodeId,
    tie_break: PathTieBreak,
) -> Option<CriticalPath> {
    let mut winner: Option<CriticalPath> = None;
    for path in all_paths(dag, source, sink) {
        let length = path_weight(dag, &path);
        let take = match (&winner, tie_break) {
            (None, _) => true,
            (Some(w), PathTieBreak::First) => length > w.length,
            (Some(w), PathTieBreak::Last) => length >= w.length,
        };
        if take {
            winner = Some(CriticalPath {
                length,
                nodes: path,
            });
        }
    }
    winner
}
