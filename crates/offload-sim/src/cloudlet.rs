//! Cloudlet: local execution layer with bounded capacity.

use crate::config::SimulationConfig;
use crate::error::SimulationError;
use crate::interrupt::{victim_selector_resolver, VictimSelector};
use crate::log_debug;
use crate::node::{ExecutionNode, Preemption};
use crate::random::{Stream, VariateSource};
use crate::state::{CloudletState, PopulationState};
use crate::task::{instant_after, Task, TaskClass};

pub struct Cloudlet {
    state: CloudletState,
    service_rates: [f64; 2],
    victim_selector: Box<dyn VictimSelector>,
}

impl Cloudlet {
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            state: CloudletState::new(config.cloudlet_capacity, config.class2_threshold),
            service_rates: TaskClass::ALL.map(|class| config.cloudlet_service_rate(class)),
            victim_selector: victim_selector_resolver(config.victim_selection),
        }
    }

    pub fn state(&self) -> &CloudletState {
        &self.state
    }

    pub fn set_victim_selector(&mut self, victim_selector: Box<dyn VictimSelector>) {
        self.victim_selector = victim_selector;
    }

    fn service_rate(&self, class: TaskClass) -> f64 {
        self.service_rates[class.index()]
    }
}

impl ExecutionNode for Cloudlet {
    fn name(&self) -> &'static str {
        "cloudlet"
    }

    fn receive(&mut self, task: Task) -> Result<(), SimulationError> {
        self.state.add(task)
    }

    fn receive_with_preemption(&mut self, task: Task, class: TaskClass) -> Result<Preemption, SimulationError> {
        let now = task.arrival().ok_or(SimulationError::NotArrived(task.id()))?;
        let victim = self.victim_selector.select(now, self.state.tasks(class))?;
        let victim = self.state.remove(&victim).ok_or(SimulationError::MissingTask {
            population: self.name(),
            task: victim.id(),
        })?;
        self.state.add(task)?;

        let original_arrival = victim.arrival().ok_or(SimulationError::NotArrived(victim.id()))?;
        let completion = victim
            .completion()
            .ok_or(SimulationError::MissingProgress(victim.id()))?;
        let residual = completion - now;
        let displaced = Task::displaced(&victim, now, residual * self.service_rate(class));
        log_debug!(
            now,
            self.name(),
            "task {} preempts task {} with residual service time {:.3}",
            task.id(),
            victim.id(),
            residual
        );
        Ok(Preemption {
            victim: displaced,
            original_arrival,
        })
    }

    fn execute(&mut self, task: &Task, source: &mut dyn VariateSource) -> Result<Task, SimulationError> {
        let arrival = task.arrival().ok_or(SimulationError::NotArrived(task.id()))?;
        let mean = 1. / self.service_rate(task.class());
        let service = source.exponential(Stream::cloudlet_service(task.class()), mean)?;
        self.state.set_completion(task, instant_after(arrival, service))
    }

    fn result(&mut self, task: &Task) -> Result<Task, SimulationError> {
        self.state.remove(task).ok_or(SimulationError::MissingTask {
            population: self.name(),
            task: task.id(),
        })
    }
}
