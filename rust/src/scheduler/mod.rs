//! Single-core list scheduler driven by Eligibility Ordering.
//!
//! Discrete-event simulation of one DAG task on one non-preemptive core:
//! nodes move Waiting -> Ready -> Finished, and an idle core takes the Ready
//! node with the highest priority.

mod core;
mod processor;
mod state;

pub use self::core::{ListScheduler, SchedulerError};
pub use processor::{CoreError, Job, ProcessorCore, MIGRATION_COST, PREEMPTION_COST};
pub use state::JobQueues;
