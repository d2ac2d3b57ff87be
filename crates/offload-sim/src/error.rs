//! Error types.

use thiserror::Error;

use crate::task::TaskId;

/// Errors detected while building or validating a simulation configuration.
///
/// These are never recovered from: a simulation with an invalid configuration does not start.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid cloudlet thresholds: N = {capacity}, S = {threshold} (expected N > 0 and S <= N)")]
    InvalidThresholds { capacity: usize, threshold: usize },
    #[error("invalid time window: start = {start}, stop = {stop} (expected 0 <= start < stop)")]
    InvalidTimeWindow { start: f64, stop: f64 },
    #[error("invalid {name} = {value}")]
    InvalidRate { name: &'static str, value: f64 },
    #[error("invalid mean setup time {0} (expected a finite non-negative value)")]
    InvalidSetupTime(f64),
    #[error("seed {0} has more than 9 decimal digits")]
    InvalidSeed(u64),
    #[error("sampling period {0} must be positive")]
    InvalidSamplingPeriod(f64),
    #[error("batch size must be positive")]
    InvalidBatchSize,
    #[error("confidence level {0} is outside of (0, 1)")]
    InvalidConfidenceLevel(f64),
    #[error("unknown {kind} policy: {name}")]
    UnknownPolicy { kind: &'static str, name: String },
    #[error("can't read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("can't parse YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Invariant violations detected while the simulation is running.
///
/// Any of these aborts the run: they signal a logic fault, not a recoverable condition.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    #[error("{population}: capacity {capacity} reached, can't add task {task}")]
    CapacityExceeded {
        population: &'static str,
        capacity: usize,
        task: TaskId,
    },
    #[error("{population}: task {task} is already present")]
    DuplicateTask { population: &'static str, task: TaskId },
    #[error("{population}: task {task} is not present")]
    MissingTask { population: &'static str, task: TaskId },
    #[error("task {task}: completion {completion} is not after arrival {arrival}")]
    InvalidCompletion { task: TaskId, arrival: f64, completion: f64 },
    #[error("task {0} has not arrived")]
    NotArrived(TaskId),
    #[error("task {0} has neither arrival nor completion time")]
    UndefinedTime(TaskId),
    #[error("interrupted task {0} carries no remaining work")]
    MissingProgress(TaskId),
    #[error("clock can't move backwards from {from} to {to}")]
    ClockBackwards { from: f64, to: f64 },
    #[error("no next event while populations are not empty")]
    NoNextEvent,
    #[error("no class 2 task to preempt")]
    NoVictim,
    #[error("{0} does not support preemption")]
    PreemptionUnsupported(&'static str),
    #[error("invalid exponential mean {0}")]
    InvalidMean(f64),
    #[error("invalid replication config: {0}")]
    Config(String),
    #[error("replication {0} did not report its results")]
    LostReplication(usize),
}
