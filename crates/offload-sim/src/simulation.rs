//! Event-driven simulation of the offloading system.

use indexmap::IndexMap;
use serde_json::json;

use crate::access_control::{access_control_resolver, AccessControl, Occupancy};
use crate::batch_means::BatchMeansStatistics;
use crate::clock::Clock;
use crate::cloud::Cloud;
use crate::cloudlet::Cloudlet;
use crate::config::SimulationConfig;
use crate::dispatcher::{Dispatch, TaskDispatcher};
use crate::error::{ConfigError, SimulationError};
use crate::event::EventType;
use crate::experiment::SimulationCallbacks;
use crate::interrupt::VictimSelector;
use crate::metrics::Report;
use crate::mobile_set::MobileSet;
use crate::node::ExecutionNode;
use crate::random::{MultiStreamRng, VariateSource};
use crate::state::PopulationState;
use crate::stats::{Layer, Statistics, StatisticsCollector};
use crate::task::{Task, TaskClass};
use crate::{log_debug, log_error, log_info, log_trace};

/// Simulation of mobile devices offloading tasks to a cloudlet and a cloud.
///
/// Each [`step`](Self::step) selects the next event across the three populations and handles it:
///
/// - when all populations are empty, the simulation alternates between `START`, which seeds one task of each
///   class, and `STOP`, which ends the run;
/// - otherwise the most imminent task decides the event: an arrival in the mobile set is an `OFFLOAD_REQUEST`,
///   a completion on the cloudlet or the cloud is a `CLOUDLET_COMPLETION` or a `CLOUD_COMPLETION`.
///
/// Population areas are integrated over the interval preceding each timed event, before the event changes
/// the populations. Arrivals after the stop instant are discarded, so every run eventually stops.
pub struct OffloadSimulation {
    config: SimulationConfig,
    source: Box<dyn VariateSource>,
    access_control: Box<dyn AccessControl>,
    dispatcher: TaskDispatcher,
    mobile_set: MobileSet,
    cloudlet: Cloudlet,
    cloud: Cloud,
    clock: Clock,
    event_type: EventType,
    collector: Box<dyn StatisticsCollector>,
    timed_events: u64,
    finished: bool,
}

impl OffloadSimulation {
    /// Creates a simulation drawing random variates from a [`MultiStreamRng`] seeded with `config.seed`.
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let source = MultiStreamRng::new(config.seed)?;
        log_debug!(config.start, "simulation", "random streams seeded with {}", source.seed());
        Ok(Self::build(config, Box::new(source)))
    }

    /// Creates a simulation drawing random variates from the given source.
    pub fn with_random_source(config: SimulationConfig, source: Box<dyn VariateSource>) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config, source))
    }

    fn build(config: SimulationConfig, source: Box<dyn VariateSource>) -> Self {
        let collector: Box<dyn StatisticsCollector> = if config.batch_means {
            Box::new(BatchMeansStatistics::new(config.batch_size, config.confidence_level))
        } else {
            Box::new(Statistics::new())
        };
        Self {
            access_control: access_control_resolver(config.access_control),
            dispatcher: TaskDispatcher::new(),
            mobile_set: MobileSet::new(&config),
            cloudlet: Cloudlet::new(&config),
            cloud: Cloud::new(&config),
            clock: Clock::new(config.start),
            event_type: EventType::Stop,
            collector,
            timed_events: 0,
            finished: false,
            source,
            config,
        }
    }

    /// Replaces the admission policy.
    pub fn set_access_control(&mut self, access_control: Box<dyn AccessControl>) {
        self.access_control = access_control;
    }

    /// Replaces the preemption victim selection policy.
    pub fn set_victim_selector(&mut self, victim_selector: Box<dyn VictimSelector>) {
        self.cloudlet.set_victim_selector(victim_selector);
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Returns the current simulated instant.
    pub fn current_time(&self) -> f64 {
        self.clock.next_instant()
    }

    /// Returns the type of the last handled event.
    pub fn event_type(&self) -> EventType {
        self.event_type
    }

    pub fn mobile_set(&self) -> &MobileSet {
        &self.mobile_set
    }

    pub fn cloudlet(&self) -> &Cloudlet {
        &self.cloudlet
    }

    pub fn cloud(&self) -> &Cloud {
        &self.cloud
    }

    /// Accumulators of the current observation period (the current batch with batch means).
    pub fn statistics(&self) -> &Statistics {
        self.collector.statistics()
    }

    /// Number of handled events which advanced simulated time.
    pub fn timed_events(&self) -> u64 {
        self.timed_events
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Adds an offload request of the given class arriving at `arrival`.
    pub fn inject_offload_request(&mut self, class: TaskClass, arrival: f64) -> Result<Task, SimulationError> {
        if !(arrival >= self.clock.next_instant()) {
            return Err(SimulationError::ClockBackwards {
                from: self.clock.next_instant(),
                to: arrival,
            });
        }
        self.mobile_set.insert(class, arrival)
    }

    /// Performs a single step. Returns false once the simulation has stopped.
    pub fn step(&mut self) -> Result<bool, SimulationError> {
        if self.finished {
            return Ok(false);
        }
        self.discard_late_arrivals();
        self.event_type = self.next_event_type()?;

        let timed = self.event_type.is_timed();
        if timed {
            self.integrate_areas();
        }
        match self.event_type {
            EventType::Start => self.on_start()?,
            EventType::OffloadRequest => self.on_offload_request()?,
            EventType::CloudletCompletion => self.on_completion(Layer::Cloudlet)?,
            EventType::CloudCompletion => self.on_completion(Layer::Cloud)?,
            EventType::Stop => {
                self.finished = true;
                log_info!(
                    self.clock.next_instant(),
                    "simulation",
                    "stopped after {} timed events",
                    self.timed_events
                );
            }
            EventType::Null => {}
        }
        if timed {
            let batches = self.collector.batches();
            self.collector.update_time(self.clock.delta());
            self.timed_events += 1;
            if self.collector.batches() > batches {
                log_debug!(
                    self.clock.next_instant(),
                    "simulation",
                    "closed batch {}",
                    self.collector.batches()
                );
            }
        }
        Ok(!self.finished)
    }

    /// Performs up to `step_count` steps. Returns false once the simulation has stopped.
    pub fn steps(&mut self, step_count: u64) -> Result<bool, SimulationError> {
        for _ in 0..step_count {
            if !self.step()? {
                return Ok(false);
            }
        }
        Ok(!self.finished)
    }

    /// Runs the simulation until it stops.
    pub fn run(&mut self) -> Result<(), SimulationError> {
        log_info!(self.config.start, "simulation", "started: {}", json!(&self.config));
        loop {
            match self.step() {
                Ok(true) => {}
                Ok(false) => return Ok(()),
                Err(e) => {
                    log_error!(self.clock.next_instant(), "simulation", "run aborted: {}", e);
                    return Err(e);
                }
            }
        }
    }

    /// Runs the simulation until it stops or the callbacks request to stop,
    /// returns the results produced by the callbacks.
    pub fn run_with_callbacks(
        &mut self,
        callbacks: &mut dyn SimulationCallbacks,
    ) -> Result<IndexMap<String, String>, SimulationError> {
        callbacks.on_simulation_start(self);
        while self.step()? {
            if !callbacks.on_step(self) {
                break;
            }
        }
        Ok(callbacks.on_simulation_finish(self))
    }

    /// Returns the final statistics. With batch means only the closed batches are reported.
    pub fn report(&self) -> Report {
        self.collector.report()
    }

    fn populations_empty(&self) -> bool {
        self.mobile_set.state().is_empty() && self.cloudlet.state().is_empty() && self.cloud.state().is_empty()
    }

    fn discard_late_arrivals(&mut self) {
        while let Some(task) = self.mobile_set.state().next_event() {
            if !task.arrival().map_or(false, |arrival| arrival > self.config.stop) {
                break;
            }
            self.mobile_set.discard(&task);
            log_trace!(self.clock.next_instant(), "simulation", "discarded late arrival {}", task);
        }
    }

    fn next_event_type(&mut self) -> Result<EventType, SimulationError> {
        if self.populations_empty() {
            return Ok(if self.event_type == EventType::Stop {
                EventType::Start
            } else {
                EventType::Stop
            });
        }
        let candidates = [
            self.mobile_set.state().next_event(),
            self.cloudlet.state().next_event(),
            self.cloud.state().next_event(),
        ];
        let event_type = match self.clock.update_min(&candidates)? {
            Some(0) => EventType::OffloadRequest,
            Some(1) => EventType::CloudletCompletion,
            Some(2) => EventType::CloudCompletion,
            _ => return Err(SimulationError::NoNextEvent),
        };
        log_debug!(
            self.clock.next_instant(),
            "simulation",
            "{} {}",
            event_type,
            json!(self.clock.next_task())
        );
        Ok(event_type)
    }

    fn integrate_areas(&mut self) {
        let delta = self.clock.delta();
        let stats = self.collector.statistics_mut();
        for class in TaskClass::ALL {
            stats.update_area(Layer::Cloudlet, class, delta, self.cloudlet.state().len(class));
            stats.update_area(Layer::Cloud, class, delta, self.cloud.state().len(class));
        }
    }

    fn current_task(&self) -> Result<Task, SimulationError> {
        self.clock.next_task().copied().ok_or(SimulationError::NoNextEvent)
    }

    fn on_start(&mut self) -> Result<(), SimulationError> {
        for class in TaskClass::ALL {
            self.mobile_set
                .generate(class, self.config.start, self.source.as_mut())?;
        }
        log_info!(
            self.config.start,
            "simulation",
            "arrival processes started with {} tasks",
            self.mobile_set.state().total_len()
        );
        Ok(())
    }

    fn on_offload_request(&mut self) -> Result<(), SimulationError> {
        let now = self.clock.next_instant();
        let task = self.current_task()?;
        let task = self.mobile_set.receive(&task)?;
        let action = self
            .access_control
            .decide(&Occupancy::of(self.cloudlet.state()), task.class());
        log_debug!(now, "simulation", "task {} ({}): {}", task.id(), task.class(), action);

        match self
            .dispatcher
            .dispatch(task, action, &mut self.cloudlet, &mut self.cloud)?
        {
            Dispatch::Cloudlet => {
                self.cloudlet.execute(&task, self.source.as_mut())?;
            }
            Dispatch::Cloud => {
                self.cloud.execute(&task, self.source.as_mut())?;
            }
            Dispatch::CloudletWithPreemption(preemption) => {
                self.cloudlet.execute(&task, self.source.as_mut())?;
                let victim = self.cloud.execute(&preemption.victim, self.source.as_mut())?;
                let completion = victim
                    .completion()
                    .ok_or(SimulationError::MissingProgress(victim.id()))?;
                self.collector.statistics_mut().record_interruption(
                    now - preemption.original_arrival,
                    completion - preemption.original_arrival,
                );
            }
        }

        self.mobile_set.generate(task.class(), now, self.source.as_mut())?;
        Ok(())
    }

    fn on_completion(&mut self, layer: Layer) -> Result<(), SimulationError> {
        let task = self.current_task()?;
        let task = match layer {
            Layer::Cloudlet => self.cloudlet.result(&task)?,
            Layer::Cloud => self.cloud.result(&task)?,
        };
        self.collector
            .statistics_mut()
            .record_completion(layer, task.class());
        Ok(())
    }
}
