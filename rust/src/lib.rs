//! Eligibility Ordering evaluation for single-core DAG task scheduling.
//!
//! Given a DAG task with per-node WCETs this crate computes the critical path,
//! derives a static priority order biased toward nodes feeding the critical
//! path, and simulates a greedy non-preemptive single-core execution to obtain
//! the makespan. The same entry points are exposed to Python experiment
//! scripts through PyO3.

// Allow clippy warning triggered by PyO3 macro expansion
#![allow(clippy::useless_conversion)]

use pyo3::prelude::*;
use std::collections::HashMap;

pub mod config;
pub mod critical_path;
pub mod eligibility;
pub mod graph;
pub mod logging;
mod models;
pub mod scheduler;

pub use config::{SimulationConfig, StepPolicy, DEFAULT_T_MAX};
pub use critical_path::{
    longest_path, Classifier, CriticalPath, PathTieBreak, ProximityClassifier,
};
pub use eligibility::{
    assign_priorities, assign_priorities_with, EligibilityOrdering, UNASSIGNED,
};
pub use graph::{DagTask, GraphError, NodeId, Time, ValidationMode};
pub use models::{RunOutcome, ScheduledJob, SimulationResult};
pub use scheduler::{ListScheduler, SchedulerError};

/// Build a task from a Python adjacency dict and weight list.
fn build_task(
    graph: &HashMap<NodeId, Vec<NodeId>>,
    wcets: Vec<Time>,
    mode: ValidationMode,
) -> PyResult<DagTask> {
    DagTask::new(graph, wcets, mode)
        .map_err(|e| pyo3::exceptions::PyValueError::new_err(e.to_string()))
}

fn parse_tie_break(name: &str) -> PyResult<PathTieBreak> {
    PathTieBreak::from_name(name).ok_or_else(|| {
        pyo3::exceptions::PyValueError::new_err(format!("Unknown path tie-break: {}", name))
    })
}

/// Compute the critical path of a DAG task.
///
/// # Arguments
/// * `graph` - Dict mapping node id (1-based) to its successor ids
/// * `wcets` - WCET per node, `wcets[v - 1]` belongs to node `v`
/// * `tie_break` - "first" or "last" maximum path in DFS enumeration order
///
/// # Returns
/// * (length, path) from node 1 to node N
///
/// # Raises
/// * ValueError if the graph is malformed
#[pyfunction]
#[pyo3(name = "longest_path", signature = (graph, wcets, tie_break="first"))]
fn py_longest_path(
    graph: HashMap<NodeId, Vec<NodeId>>,
    wcets: Vec<Time>,
    tie_break: &str,
) -> PyResult<(Time, Vec<NodeId>)> {
    let tie_break = parse_tie_break(tie_break)?;
    let dag = build_task(&graph, wcets, ValidationMode::Lenient)?;
    match longest_path(&dag, dag.source(), dag.sink(), tie_break) {
        Ok(path) => Ok((path.length, path.nodes)),
        Err(e) => Err(pyo3::exceptions::PyValueError::new_err(e.to_string())),
    }
}

/// Compute Eligibility Ordering priorities.
///
/// # Returns
/// * Dict mapping node id to priority (larger wins, -1 when unassigned)
///
/// # Raises
/// * ValueError if the graph is malformed
#[pyfunction]
#[pyo3(signature = (graph, wcets, lenient=false, tie_break="first"))]
fn eligibility_ordering(
    graph: HashMap<NodeId, Vec<NodeId>>,
    wcets: Vec<Time>,
    lenient: bool,
    tie_break: &str,
) -> PyResult<HashMap<NodeId, i32>> {
    let tie_break = parse_tie_break(tie_break)?;
    let mode = if lenient {
        ValidationMode::Lenient
    } else {
        ValidationMode::Strict
    };
    let dag = build_task(&graph, wcets, mode)?;
    match assign_priorities(&dag, tie_break) {
        Ok(ordering) => Ok(ordering.priorities.into_iter().collect()),
        Err(e) => Err(pyo3::exceptions::PyValueError::new_err(e.to_string())),
    }
}

/// Simulate single-core execution under Eligibility Ordering.
///
/// # Arguments
/// * `graph` - Dict mapping node id (1-based) to its successor ids
/// * `wcets` - WCET per node
/// * `config` - Simulation configuration (defaults if omitted)
///
/// # Returns
/// * SimulationResult; `makespan` is None when the run overran `t_max`
///
/// # Raises
/// * ValueError on malformed graphs, invalid configuration, or incomplete
///   priorities in strict mode
#[pyfunction]
#[pyo3(signature = (graph, wcets, config=None))]
fn schedule(
    py: Python<'_>,
    graph: HashMap<NodeId, Vec<NodeId>>,
    wcets: Vec<Time>,
    config: Option<SimulationConfig>,
) -> PyResult<SimulationResult> {
    let config = config.unwrap_or_default();
    let dag = build_task(&graph, wcets, config.validation_mode())?;
    // Runs share no state, so other Python threads may proceed meanwhile
    py.allow_threads(|| run_simulation(&dag, &config))
        .map_err(|e| pyo3::exceptions::PyValueError::new_err(e.to_string()))
}

/// Run one simulation with the default classifier.
pub fn run_simulation(
    dag: &DagTask,
    config: &SimulationConfig,
) -> Result<SimulationResult, SchedulerError> {
    ListScheduler::new(dag, config)?.run()
}

/// The eo_sched.rust Python module.
#[pymodule]
fn rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Data types
    m.add_class::<SimulationConfig>()?;
    m.add_class::<SimulationResult>()?;
    m.add_class::<ScheduledJob>()?;

    // Algorithms
    m.add_function(wrap_pyfunction!(py_longest_path, m)?)?;
    m.add_function(wrap_pyfunction!(eligibility_ordering, m)?)?;
    m.add_function(wrap_pyfunction!(schedule, m)?)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adjacency(edges: &[(NodeId, NodeId)]) -> HashMap<NodeId, Vec<NodeId>> {
        let mut graph: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
        for &(from, to) in edges {
            graph.entry(from).or_default().push(to);
        }
        graph
    }

    fn quiet() -> SimulationConfig {
        SimulationConfig {
            trace_sink: "silent".to_string(),
            ..SimulationConfig::default()
        }
    }

    #[test]
    fn test_chain_end_to_end() {
        let graph = adjacency(&[(1, 2), (2, 3)]);
        let dag = DagTask::new(&graph, vec![2, 3, 1], ValidationMode::Strict).unwrap();
        let result = run_simulation(&dag, &quiet()).unwrap();
        assert_eq!(result.critical_path, vec![1, 2, 3]);
        assert_eq!(result.critical_path_length, 6);
        assert_eq!(result.makespan(), Some(6));
    }

    #[test]
    fn test_diamond_end_to_end() {
        let graph = adjacency(&[(1, 2), (1, 3), (2, 4), (3, 4)]);
        let dag = DagTask::new(&graph, vec![1, 5, 1, 1], ValidationMode::Strict).unwrap();
        let result = run_simulation(&dag, &quiet()).unwrap();
        assert_eq!(result.critical_path, vec![1, 2, 4]);
        assert_eq!(result.critical_path_length, 7);
        assert_eq!(result.providers, vec![3]);
        assert_eq!(result.makespan(), Some(8));
        let order = result.dispatch_order();
        let pos = |v: NodeId| order.iter().position(|&x| x == v).unwrap();
        assert!(pos(2) < pos(3));
    }

    #[test]
    fn test_isolated_node_fails_at_load_time() {
        // Node 3 is unreachable from the source
        let graph = adjacency(&[(1, 2), (2, 4)]);
        let err = DagTask::new(&graph, vec![1, 1, 1, 1], ValidationMode::Strict).unwrap_err();
        assert_eq!(err, GraphError::UnreachableFromSource(3));
        assert!(SchedulerError::from(err)
            .to_string()
            .starts_with("Invalid task graph"));
    }

    #[test]
    fn test_termination_below_t_max() {
        // Wide fork-join with strictly positive weights
        let mut edges = Vec::new();
        for v in 2..20 {
            edges.push((1, v));
            edges.push((v, 20));
        }
        let graph = adjacency(&edges);
        let wcets: Vec<Time> = (1..=20).map(|v| 1 + (v % 4) as Time).collect();
        let dag = DagTask::new(&graph, wcets, ValidationMode::Strict).unwrap();
        let result = run_simulation(&dag, &quiet()).unwrap();
        assert_eq!(result.outcome, RunOutcome::Completed);
        assert!(result.final_time < DEFAULT_T_MAX);
        assert_eq!(result.makespan(), Some(dag.volume()));
        assert!(result.priorities.values().all(|&p| p >= 2));
    }
}
