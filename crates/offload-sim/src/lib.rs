//! Discrete-event simulator of a mobile offloading system.
//!
//! Mobile devices generate two classes of tasks which are admitted to a capacity-bounded cloudlet or diverted
//! to an unbounded remote cloud. The simulation kernel is single-threaded and fully deterministic for a given
//! seed, while [`experiment::Experiment`] runs independent replications in parallel.

pub mod access_control;
pub mod batch_means;
pub mod clock;
pub mod cloud;
pub mod cloudlet;
pub mod collector;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod experiment;
pub mod interrupt;
pub mod log;
pub mod metrics;
pub mod mobile_set;
pub mod node;
pub mod random;
pub mod simulation;
pub mod state;
pub mod stats;
pub mod task;

pub use colored;
pub use config::SimulationConfig;
pub use error::{ConfigError, SimulationError};
pub use simulation::OffloadSimulation;
pub use task::{Task, TaskClass, TaskId};
