//! Cloud: remote execution layer with unbounded capacity.

use crate::config::SimulationConfig;
use crate::error::SimulationError;
use crate::log_trace;
use crate::node::ExecutionNode;
use crate::random::{Stream, VariateSource};
use crate::state::{CloudState, PopulationState};
use crate::task::{instant_after, Task, TaskClass};

pub struct Cloud {
    state: CloudState,
    service_rates: [f64; 2],
    mean_setup_time: f64,
}

impl Cloud {
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            state: CloudState::default(),
            service_rates: TaskClass::ALL.map(|class| config.cloud_service_rate(class)),
            mean_setup_time: config.mean_setup_time,
        }
    }

    pub fn state(&self) -> &CloudState {
        &self.state
    }

    fn service_rate(&self, class: TaskClass) -> f64 {
        self.service_rates[class.index()]
    }
}

impl ExecutionNode for Cloud {
    fn name(&self) -> &'static str {
        "cloud"
    }

    fn receive(&mut self, task: Task) -> Result<(), SimulationError> {
        self.state.add(task)
    }

    fn execute(&mut self, task: &Task, source: &mut dyn VariateSource) -> Result<Task, SimulationError> {
        let arrival = task.arrival().ok_or(SimulationError::NotArrived(task.id()))?;
        if task.is_interrupted() {
            // completion holds the remaining work, see Task
            let remaining_work = task.completion().ok_or(SimulationError::MissingProgress(task.id()))?;
            let residual = remaining_work / self.service_rate(task.class());
            let setup = source.exponential(Stream::CloudSetup, self.mean_setup_time)?;
            log_trace!(
                arrival,
                self.name(),
                "resuming task {}: setup {:.3}, residual service time {:.3}",
                task.id(),
                setup,
                residual
            );
            self.state.set_completion(task, instant_after(arrival, setup + residual))
        } else {
            let mean = 1. / self.service_rate(task.class());
            let service = source.exponential(Stream::cloud_service(task.class()), mean)?;
            self.state.set_completion(task, instant_after(arrival, service))
        }
    }

    fn result(&mut self, task: &Task) -> Result<Task, SimulationError> {
        self.state.remove(task).ok_or(SimulationError::MissingTask {
            population: self.name(),
            task: task.id(),
        })
    }
}
