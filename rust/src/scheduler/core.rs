//! Greedy non-preemptive list scheduler for one DAG task on one core.

use thiserror::Error;

use crate::config::{ExecutionModel, RunSettings, SimulationConfig, StepPolicy};
use crate::critical_path::{Classifier, ProximityClassifier};
use crate::eligibility::{assign_priorities_with, EligibilityOrdering};
use crate::graph::{DagTask, GraphError, NodeId, Time, ValidationMode};
use crate::logging::Tracer;
use crate::models::{RunOutcome, ScheduledJob, SimulationResult};
use crate::{trace_debug, trace_error, trace_info, trace_warning};

use super::processor::{CoreError, Job, ProcessorCore};
use super::state::JobQueues;

/// Errors that can occur before or during a run.
#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("Invalid task graph: {0}")]
    Graph(#[from] GraphError),
    #[error("Unknown scheduling algorithm: {0}")]
    UnknownAlgorithm(String),
    #[error("Unsupported execution model: {0}")]
    UnsupportedExecutionModel(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Priorities not assigned for nodes: {0:?}")]
    IncompletePriorityAssignment(Vec<NodeId>),
    #[error("Core fault: {0}")]
    Core(#[from] CoreError),
}

/// Discrete-event list scheduler driven by Eligibility Ordering priorities.
pub struct ListScheduler<'a> {
    dag: &'a DagTask,
    settings: RunSettings,
    classifier: Box<dyn Classifier + 'a>,
    tracer: Tracer,
}

impl<'a> ListScheduler<'a> {
    /// Create a scheduler; every configuration option is validated here.
    pub fn new(dag: &'a DagTask, config: &SimulationConfig) -> Result<Self, SchedulerError> {
        let settings = config.settings()?;
        let tracer = config.tracer()?;
        Ok(Self {
            dag,
            settings,
            classifier: Box::new(ProximityClassifier),
            tracer,
        })
    }

    /// Replace the provider/consumer rule.
    pub fn with_classifier(mut self, classifier: impl Classifier + 'a) -> Self {
        self.classifier = Box::new(classifier);
        self
    }

    /// Replace the trace sink.
    pub fn with_tracer(mut self, tracer: Tracer) -> Self {
        self.tracer = tracer;
        self
    }

    /// Compute priorities and simulate until every node finishes or `t_max`.
    ///
    /// Overrun is reported through [`SimulationResult::makespan`] returning
    /// `None`, not as an error.
    pub fn run(&mut self) -> Result<SimulationResult, SchedulerError> {
        let ordering =
            assign_priorities_with(self.dag, self.classifier.as_ref(), self.settings.tie_break)?;

        if !ordering.is_complete() {
            if self.settings.validation == ValidationMode::Strict {
                return Err(SchedulerError::IncompletePriorityAssignment(
                    ordering.unassigned,
                ));
            }
            trace_warning!(
                self.tracer,
                0,
                "Priorities not assigned for nodes {:?}, scheduling them last",
                ordering.unassigned
            );
        }

        self.simulate(ordering)
    }

    fn execution_time(&self, node: NodeId) -> Time {
        match self.settings.execution_model {
            ExecutionModel::Wcet => self.dag.wcet(node),
        }
    }

    fn simulate(
        &mut self,
        ordering: EligibilityOrdering,
    ) -> Result<SimulationResult, SchedulerError> {
        let t_max = self.settings.t_max;
        let mut t: Time = 0;
        let mut core = ProcessorCore::new(1);
        let mut queues = JobQueues::new(self.dag);
        let mut schedule: Vec<ScheduledJob> = Vec::with_capacity(self.dag.len());
        let mut started_at: Time = 0;

        trace_debug!(
            self.tracer,
            t,
            "Algorithm = eligibility, Exe_Model = {:?}, #Cores = 1",
            self.settings.execution_model
        );
        trace_info!(
            self.tracer,
            t,
            "Critical path {:?} (length {})",
            ordering.critical_path.nodes,
            ordering.critical_path.length
        );

        while t < t_max && !queues.all_finished() {
            trace_debug!(self.tracer, t, "Scheduling point reached!");

            // Dependency resolution only; priorities play no part here
            for node in queues.promote_ready(self.dag) {
                trace_debug!(self.tracer, t, "Job {} ready", node);
            }

            if core.is_idle() {
                if let Some(node) = queues.dispatch(&ordering.priorities) {
                    core.assign(Job::new(node, self.execution_time(node)))?;
                    started_at = t;
                    trace_debug!(
                        self.tracer,
                        t,
                        "Job {} assigned to Core {} (priority {})",
                        node,
                        core.id(),
                        ordering.priority(node)
                    );
                }
            }

            // Next scheduling point, never past t_max
            let step = match (core.workload(), self.settings.step) {
                (Some(remaining), StepPolicy::Unit) => remaining.min(1),
                (Some(remaining), StepPolicy::NextEvent) => remaining,
                (None, _) => 1,
            }
            .min(t_max - t);

            t += step;
            if core.is_idle() {
                continue;
            }
            let (node, finished) = core.execute(step)?;
            if finished {
                queues.finish(node);
                schedule.push(ScheduledJob {
                    node,
                    start: started_at,
                    finish: t,
                });
                trace_debug!(self.tracer, t, "Job {} finished on Core {}", node, core.id());
            }
        }

        let outcome = if queues.all_finished() {
            trace_debug!(self.tracer, t, "Finished: Makespan is {}", t);
            RunOutcome::Completed
        } else {
            trace_error!(
                self.tracer,
                t,
                "Simulation Overrun! {} of {} nodes finished",
                queues.finished_count(),
                self.dag.len()
            );
            RunOutcome::Overrun
        };

        Ok(SimulationResult {
            outcome,
            final_time: t,
            schedule,
            priorities: ordering.priorities.iter().map(|(&k, &v)| (k, v)).collect(),
            critical_path: ordering.critical_path.nodes,
            critical_path_length: ordering.critical_path.length,
            providers: ordering.providers,
            consumers: ordering.consumers,
            unassigned: ordering.unassigned,
            classification_secs: ordering.classification_time.as_secs_f64(),
            ordering_secs: ordering.ordering_time.as_secs_f64(),
            trace: self.tracer.take_lines(),
        })
    }
}
