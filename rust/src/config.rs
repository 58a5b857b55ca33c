//! Configuration types for the simulation.

use pyo3::prelude::*;

use crate::critical_path::PathTieBreak;
use crate::graph::{Time, ValidationMode};
use crate::logging::{TraceLevel, TraceSink, Tracer};
use crate::scheduler::SchedulerError;

/// Safety bound on simulated time.
pub const DEFAULT_T_MAX: Time = 1_000_000;

/// Execution-time model names recognised by the experiment scripts. Only
/// `WCET` is simulated.
pub const EXECUTION_MODELS: [&str; 6] = [
    "WCET",
    "HALF_RANDOM",
    "HALF_RANDOM_NORM",
    "FULL_RANDOM",
    "FULL_RANDOM_NORM",
    "BCET",
];

/// Configuration for one simulation run.
#[pyclass]
#[derive(Clone, Debug)]
pub struct SimulationConfig {
    /// Dispatch policy: "eligibility"
    #[pyo3(get, set)]
    pub algorithm: String,
    /// Execution-time model: "WCET"
    #[pyo3(get, set)]
    pub execution_model: String,
    /// Simulated time after which the run is reported as an overrun
    #[pyo3(get, set)]
    pub t_max: Time,
    /// Time advance per scheduling point: "unit" or "next_event"
    #[pyo3(get, set)]
    pub step: String,
    /// Critical path tie-break: "first" or "last"
    #[pyo3(get, set)]
    pub path_tie_break: String,
    /// Accept loosely connected graphs and incomplete priority maps
    #[pyo3(get, set)]
    pub lenient: bool,
    /// Verbosity level: 0=errors, 1=warnings, 2=info, 3=debug
    #[pyo3(get, set)]
    pub verbosity: u8,
    /// Trace destination: "stderr", "stdout", "memory", "file", or "silent"
    #[pyo3(get, set)]
    pub trace_sink: String,
    /// Trace file path, required when trace_sink is "file"
    #[pyo3(get, set)]
    pub trace_file: Option<String>,
}

#[pymethods]
impl SimulationConfig {
    #[new]
    #[pyo3(signature = (
        algorithm="eligibility".to_string(),
        execution_model="WCET".to_string(),
        t_max=DEFAULT_T_MAX,
        step="unit".to_string(),
        path_tie_break="first".to_string(),
        lenient=false,
        verbosity=0,
        trace_sink="stderr".to_string(),
        trace_file=None
    ))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        algorithm: String,
        execution_model: String,
        t_max: Time,
        step: String,
        path_tie_break: String,
        lenient: bool,
        verbosity: u8,
        trace_sink: String,
        trace_file: Option<String>,
    ) -> Self {
        Self {
            algorithm,
            execution_model,
            t_max,
            step,
            path_tie_break,
            lenient,
            verbosity,
            trace_sink,
            trace_file,
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "SimulationConfig(algorithm={:?}, execution_model={:?}, t_max={}, step={:?}, lenient={})",
            self.algorithm, self.execution_model, self.t_max, self.step, self.lenient
        )
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            algorithm: "eligibility".to_string(),
            execution_model: "WCET".to_string(),
            t_max: DEFAULT_T_MAX,
            step: "unit".to_string(),
            path_tie_break: "first".to_string(),
            lenient: false,
            verbosity: 0,
            trace_sink: "stderr".to_string(),
            trace_file: None,
        }
    }
}

/// How far simulated time moves per scheduling point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepPolicy {
    /// At most one time unit.
    Unit,
    /// Straight to the running job's completion.
    NextEvent,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutionModel {
    Wcet,
}

/// Validated form of [`SimulationConfig`].
#[derive(Clone, Copy, Debug)]
pub struct RunSettings {
    pub execution_model: ExecutionModel,
    pub t_max: Time,
    pub step: StepPolicy,
    pub tie_break: PathTieBreak,
    pub validation: ValidationMode,
}

impl SimulationConfig {
    /// Validate every string option up front.
    pub fn settings(&self) -> Result<RunSettings, SchedulerError> {
        if self.algorithm != "eligibility" {
            return Err(SchedulerError::UnknownAlgorithm(self.algorithm.clone()));
        }

        let execution_model = match self.execution_model.as_str() {
            "WCET" => ExecutionModel::Wcet,
            other => return Err(SchedulerError::UnsupportedExecutionModel(other.to_string())),
        };

        let step = match self.step.as_str() {
            "unit" => StepPolicy::Unit,
            "next_event" => StepPolicy::NextEvent,
            other => {
                return Err(SchedulerError::InvalidConfig(format!(
                    "unknown step policy: {}",
                    other
                )))
            }
        };

        let tie_break = PathTieBreak::from_name(&self.path_tie_break).ok_or_else(|| {
            SchedulerError::InvalidConfig(format!(
                "unknown path tie-break: {}",
                self.path_tie_break
            ))
        })?;

        if self.t_max == 0 {
            return Err(SchedulerError::InvalidConfig(
                "t_max must be positive".to_string(),
            ));
        }

        Ok(RunSettings {
            execution_model,
            t_max: self.t_max,
            step,
            tie_break,
            validation: self.validation_mode(),
        })
    }

    pub fn validation_mode(&self) -> ValidationMode {
        if self.lenient {
            ValidationMode::Lenient
        } else {
            ValidationMode::Strict
        }
    }

    /// Build the tracer described by `trace_sink`, `trace_file`, and `verbosity`.
    pub fn tracer(&self) -> Result<Tracer, SchedulerError> {
        let threshold = TraceLevel::from_verbosity(self.verbosity);
        let sink = match self.trace_sink.as_str() {
            "silent" => TraceSink::Silent,
            "stderr" => TraceSink::Stderr,
            "stdout" => TraceSink::Stdout,
            "memory" => TraceSink::Memory(Vec::new()),
            "file" => {
                let path = self.trace_file.as_deref().ok_or_else(|| {
                    SchedulerError::InvalidConfig(
                        "trace_sink=\"file\" requires trace_file".to_string(),
                    )
                })?;
                return Tracer::file(threshold, path).map_err(|e| {
                    SchedulerError::InvalidConfig(format!(
                        "cannot open trace file {}: {}",
                        path, e
                    ))
                });
            }
            other => {
                return Err(SchedulerError::InvalidConfig(format!(
                    "unknown trace sink: {}",
                    other
                )))
            }
        };
        Ok(Tracer::new(threshold, sink))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = SimulationConfig::default().settings().unwrap();
        assert_eq!(settings.execution_model, ExecutionModel::Wcet);
        assert_eq!(settings.t_max, DEFAULT_T_MAX);
        assert_eq!(settings.step, StepPolicy::Unit);
        assert_eq!(settings.tie_break, PathTieBreak::First);
        assert_eq!(settings.validation, ValidationMode::Strict);
    }

    #[test]
    fn test_rejects_unknown_algorithm() {
        let config = SimulationConfig {
            algorithm: "random".to_string(),
            ..SimulationConfig::default()
        };
        assert!(matches!(
            config.settings(),
            Err(SchedulerError::UnknownAlgorithm(a)) if a == "random"
        ));
    }

    #[test]
    fn test_rejects_randomized_execution_models() {
        for model in EXECUTION_MODELS.iter().filter(|m| **m != "WCET") {
            let config = SimulationConfig {
                execution_model: model.to_string(),
                ..SimulationConfig::default()
            };
            assert!(matches!(
                config.settings(),
                Err(SchedulerError::UnsupportedExecutionModel(_))
            ));
        }
    }

    #[test]
    fn test_rejects_bad_options() {
        let bad_step = SimulationConfig {
            step: "half".to_string(),
            ..SimulationConfig::default()
        };
        assert!(matches!(
            bad_step.settings(),
            Err(SchedulerError::InvalidConfig(_))
        ));

        let bad_tie = SimulationConfig {
            path_tie_break: "random".to_string(),
            ..SimulationConfig::default()
        };
        assert!(matches!(
            bad_tie.settings(),
            Err(SchedulerError::InvalidConfig(_))
        ));

        let zero = SimulationConfig {
            t_max: 0,
            ..SimulationConfig::default()
        };
        assert!(matches!(zero.settings(), Err(SchedulerError::InvalidConfig(_))));
    }

    #[test]
    fn test_lenient_flag_selects_mode() {
        let config = SimulationConfig {
            lenient: true,
            ..SimulationConfig::default()
        };
        assert_eq!(config.validation_mode(), ValidationMode::Lenient);
    }

    #[test]
    fn test_file_sink_requires_path() {
        let config = SimulationConfig {
            trace_sink: "file".to_string(),
            ..SimulationConfig::default()
        };
        assert!(matches!(config.tracer(), Err(SchedulerError::InvalidConfig(_))));

        let config = SimulationConfig {
            trace_sink: "memory".to_string(),
            verbosity: 3,
            ..SimulationConfig::default()
        };
        assert!(config.tracer().unwrap().enabled(TraceLevel::Debug));
    }
}
