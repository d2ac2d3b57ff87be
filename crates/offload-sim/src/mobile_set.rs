//! Mobile devices: the source of offload requests.

use crate::config::SimulationConfig;
use crate::error::SimulationError;
use crate::random::{Stream, VariateSource};
use crate::state::{MobileSetState, PopulationState};
use crate::task::{Task, TaskClass, TaskId};
use crate::{log_trace, log_warn};

/// Generates tasks of both classes as two independent Poisson processes and keeps them until dispatch.
pub struct MobileSet {
    state: MobileSetState,
    arrival_rates: [f64; 2],
    next_id: TaskId,
}

impl MobileSet {
    pub fn new(config: &SimulationConfig) -> Self {
        for class in TaskClass::ALL {
            if config.arrival_rate(class) == 0. {
                log_warn!(config.start, "mobile_set", "arrivals of {} are disabled", class);
            }
        }
        Self {
            state: MobileSetState::default(),
            arrival_rates: [config.arrival_rate_class1, config.arrival_rate_class2],
            next_id: 0,
        }
    }

    pub fn state(&self) -> &MobileSetState {
        &self.state
    }

    /// Generates the next task of the class arriving after `offset`.
    /// Returns `None` if arrivals of this class are disabled.
    pub fn generate(
        &mut self,
        class: TaskClass,
        offset: f64,
        source: &mut dyn VariateSource,
    ) -> Result<Option<Task>, SimulationError> {
        let rate = self.arrival_rates[class.index()];
        if rate == 0. {
            return Ok(None);
        }
        let interarrival = source.exponential(Stream::arrival(class), 1. / rate)?;
        let task = self.insert(class, offset + interarrival)?;
        log_trace!(offset, "mobile_set", "generated {}", task);
        Ok(Some(task))
    }

    /// Adds a task arriving at the given instant, bypassing the arrival process.
    pub fn insert(&mut self, class: TaskClass, arrival: f64) -> Result<Task, SimulationError> {
        let task = Task::new(self.next_id, class, arrival);
        self.next_id += 1;
        self.state.add(task)?;
        Ok(task)
    }

    /// Removes a dispatched task.
    pub fn receive(&mut self, task: &Task) -> Result<Task, SimulationError> {
        self.state.remove(task).ok_or(SimulationError::MissingTask {
            population: self.state.name(),
            task: task.id(),
        })
    }

    /// Drops a task which will never be processed.
    pub fn discard(&mut self, task: &Task) -> Option<Task> {
        self.state.remove(task)
    }
}
