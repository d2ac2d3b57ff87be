//! Routing of admitted tasks to execution nodes.

use crate::access_control::Action;
use crate::error::SimulationError;
use crate::node::{ExecutionNode, Preemption};
use crate::task::{Task, TaskClass};

/// Where a dispatched task ended up.
#[derive(Clone, Copy, Debug)]
pub enum Dispatch {
    Cloudlet,
    Cloud,
    /// The task was admitted to the cloudlet and the evicted task was sent to the cloud.
    CloudletWithPreemption(Preemption),
}

/// Maps admission decisions to execution nodes.
#[derive(Default)]
pub struct TaskDispatcher {}

impl TaskDispatcher {
    pub fn new() -> Self {
        Self {}
    }

    pub fn dispatch(
        &self,
        task: Task,
        action: Action,
        cloudlet: &mut dyn ExecutionNode,
        cloud: &mut dyn ExecutionNode,
    ) -> Result<Dispatch, SimulationError> {
        match action {
            Action::SendCloudlet => {
                cloudlet.receive(task)?;
                Ok(Dispatch::Cloudlet)
            }
            Action::SendCloud => {
                cloud.receive(task)?;
                Ok(Dispatch::Cloud)
            }
            Action::SendCloudletWithClass2Preemption => {
                let preemption = cloudlet.receive_with_preemption(task, TaskClass::Class2)?;
                self.dispatch(preemption.victim, Action::SendCloud, cloudlet, cloud)?;
                Ok(Dispatch::CloudletWithPreemption(preemption))
            }
        }
    }
}
