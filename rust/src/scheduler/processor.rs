//! Single-core execution unit.

use thiserror::Error;

use crate::graph::{NodeId, Time};

/// Cost of preempting a running job. Reserved; not applied.
pub const PREEMPTION_COST: Time = 0;

/// Cost of migrating a job between cores. Reserved; not applied.
pub const MIGRATION_COST: Time = 0;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Core {core} is busy with job {running}, cannot assign job {rejected}")]
    Busy {
        core: usize,
        running: NodeId,
        rejected: NodeId,
    },
    #[error("Core {0} is idle, nothing to execute")]
    Idle(usize),
}

/// A node being executed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Job {
    pub node: NodeId,
    pub remaining: Time,
}

impl Job {
    pub fn new(node: NodeId, execution_time: Time) -> Self {
        Self {
            node,
            remaining: execution_time,
        }
    }
}

/// Non-preemptive core holding at most one job.
#[derive(Debug)]
pub struct ProcessorCore {
    id: usize,
    current: Option<Job>,
}

impl ProcessorCore {
    pub fn new(id: usize) -> Self {
        Self { id, current: None }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn is_idle(&self) -> bool {
        self.current.is_none()
    }

    /// Node of the running job, if any.
    pub fn running(&self) -> Option<NodeId> {
        self.current.as_ref().map(|job| job.node)
    }

    pub fn assign(&mut self, job: Job) -> Result<(), CoreError> {
        if let Some(running) = &self.current {
            return Err(CoreError::Busy {
                core: self.id,
                running: running.node,
                rejected: job.node,
            });
        }
        self.current = Some(job);
        Ok(())
    }

    /// Remaining execution time of the running job.
    pub fn workload(&self) -> Option<Time> {
        self.current.as_ref().map(|job| job.remaining)
    }

    /// Run the current job for `quantum` time units.
    ///
    /// Returns the job's node and whether it completed. A completed job
    /// leaves the core idle.
    pub fn execute(&mut self, quantum: Time) -> Result<(NodeId, bool), CoreError> {
        let job = self.current.as_mut().ok_or(CoreError::Idle(self.id))?;
        job.remaining = job.remaining.saturating_sub(quantum);
        let node = job.node;
        let finished = job.remaining == 0;
        if finished {
            self.current = None;
        }
        Ok((node, finished))
    }
}
