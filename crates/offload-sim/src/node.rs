//! Execution node interface shared by the cloudlet and the cloud.

use serde::Serialize;

use crate::error::SimulationError;
use crate::random::VariateSource;
use crate::task::{Task, TaskClass};

/// Outcome of admitting a task by evicting a running one.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Preemption {
    /// Displaced copy of the evicted task, ready to be sent to the cloud.
    pub victim: Task,
    /// Arrival of the evicted task on the cloudlet.
    pub original_arrival: f64,
}

pub trait ExecutionNode {
    fn name(&self) -> &'static str;

    /// Admits a task.
    fn receive(&mut self, task: Task) -> Result<(), SimulationError>;

    /// Admits a task by evicting a running task of the given class.
    fn receive_with_preemption(&mut self, _task: Task, _class: TaskClass) -> Result<Preemption, SimulationError> {
        Err(SimulationError::PreemptionUnsupported(self.name()))
    }

    /// Computes the completion time of an admitted task and returns the updated task.
    fn execute(&mut self, task: &Task, source: &mut dyn VariateSource) -> Result<Task, SimulationError>;

    /// Collects the results of a completed task, removing it from the node.
    fn result(&mut self, task: &Task) -> Result<Task, SimulationError>;
}
