//! Result types for simulation runs.

use pyo3::prelude::*;
use std::collections::HashMap;

use crate::graph::{NodeId, Time};

// Note: We use std HashMap here for PyO3 interface compatibility

/// How a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every node finished before `t_max`.
    Completed,
    /// Simulated time reached `t_max` with nodes still unfinished.
    Overrun,
}

impl RunOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Overrun => "overrun",
        }
    }
}

/// A job that ran on the core.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScheduledJob {
    #[pyo3(get)]
    pub node: NodeId,
    #[pyo3(get)]
    pub start: Time,
    #[pyo3(get)]
    pub finish: Time,
}

#[pymethods]
impl ScheduledJob {
    fn __repr__(&self) -> String {
        format!(
            "ScheduledJob(node={}, start={}, finish={})",
            self.node, self.start, self.finish
        )
    }
}

/// Result of one simulation run.
#[pyclass]
#[derive(Clone, Debug)]
pub struct SimulationResult {
    pub outcome: RunOutcome,
    /// Simulated time when the loop stopped.
    #[pyo3(get)]
    pub final_time: Time,
    /// Jobs in dispatch order.
    #[pyo3(get)]
    pub schedule: Vec<ScheduledJob>,
    #[pyo3(get)]
    pub priorities: HashMap<NodeId, i32>,
    #[pyo3(get)]
    pub critical_path: Vec<NodeId>,
    #[pyo3(get)]
    pub critical_path_length: Time,
    #[pyo3(get)]
    pub providers: Vec<NodeId>,
    #[pyo3(get)]
    pub consumers: Vec<NodeId>,
    /// Nodes scheduled without an assigned priority (lenient mode only).
    #[pyo3(get)]
    pub unassigned: Vec<NodeId>,
    #[pyo3(get)]
    pub classification_secs: f64,
    #[pyo3(get)]
    pub ordering_secs: f64,
    /// Captured trace lines when the memory sink is used.
    #[pyo3(get)]
    pub trace: Vec<String>,
}

#[pymethods]
impl SimulationResult {
    /// Total completion time, `None` on overrun.
    #[getter]
    pub fn makespan(&self) -> Option<Time> {
        match self.outcome {
            RunOutcome::Completed => Some(self.final_time),
            RunOutcome::Overrun => None,
        }
    }

    #[getter(outcome)]
    fn outcome_name(&self) -> &'static str {
        self.outcome.as_str()
    }

    /// Nodes in the order they were dispatched.
    pub fn dispatch_order(&self) -> Vec<NodeId> {
        self.schedule.iter().map(|job| job.node).collect()
    }

    fn __repr__(&self) -> String {
        format!(
            "SimulationResult(outcome={}, final_time={}, jobs={}, critical_path_length={})",
            self.outcome.as_str(),
            self.final_time,
            self.schedule.len(),
            self.critical_path_length
        )
    }
}
