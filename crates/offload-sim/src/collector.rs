//! Callbacks observing a running simulation.

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::ConfigError;
use crate::experiment::SimulationCallbacks;
use crate::log_info;
use crate::simulation::OffloadSimulation;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Sample {
    pub time: f64,
    pub system_response_time: f64,
    pub system_throughput: f64,
}

/// Samples system response time and throughput every `period` units of simulated time.
///
/// Values are taken from the accumulators of the current observation period,
/// so with batch means they describe the batch in progress.
#[derive(Clone, Debug)]
pub struct WithinRunCollector {
    period: f64,
    next_sample: f64,
    samples: Vec<Sample>,
}

impl WithinRunCollector {
    pub fn new(period: f64) -> Result<Self, ConfigError> {
        if !(period > 0.) || !period.is_finite() {
            return Err(ConfigError::InvalidSamplingPeriod(period));
        }
        Ok(Self {
            period,
            next_sample: period,
            samples: Vec::new(),
        })
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }
}

impl SimulationCallbacks for WithinRunCollector {
    fn on_simulation_start(&mut self, sim: &mut OffloadSimulation) {
        self.samples.clear();
        self.next_sample = sim.config().start + self.period;
    }

    fn on_step(&mut self, sim: &mut OffloadSimulation) -> bool {
        while sim.current_time() >= self.next_sample {
            let metrics = sim.statistics().metrics();
            self.samples.push(Sample {
                time: self.next_sample,
                system_response_time: metrics.system_response_time,
                system_throughput: metrics.system_throughput,
            });
            self.next_sample += self.period;
        }
        true
    }

    fn on_simulation_finish(&mut self, _sim: &mut OffloadSimulation) -> IndexMap<String, String> {
        let mut results = IndexMap::new();
        results.insert("samples".to_string(), self.samples.len().to_string());
        if let Ok(json) = serde_json::to_string(&self.samples) {
            results.insert("within_run_samples".to_string(), json);
        }
        results
    }
}

/// Logs the share of the simulated time window covered so far.
#[derive(Clone, Debug)]
pub struct ProgressLogger {
    step: f64,
    next: f64,
}

impl ProgressLogger {
    /// Creates a logger reporting every `step` percent.
    pub fn new(step: f64) -> Self {
        let step = step.clamp(1., 100.);
        Self { step, next: step }
    }
}

impl Default for ProgressLogger {
    fn default() -> Self {
        Self::new(10.)
    }
}

impl SimulationCallbacks for ProgressLogger {
    fn on_simulation_start(&mut self, _sim: &mut OffloadSimulation) {
        self.next = self.step;
    }

    fn on_step(&mut self, sim: &mut OffloadSimulation) -> bool {
        let config = sim.config();
        let progress = 100. * (sim.current_time() - config.start) / (config.stop - config.start);
        if progress >= self.next && self.next <= 100. {
            log_info!(sim.current_time(), "progress", "{:.0}%", progress.min(100.));
            while self.next <= progress {
                self.next += self.step;
            }
        }
        true
    }
}
