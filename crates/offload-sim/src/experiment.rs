//! Tools for running experiments with multiple independent replications.

use std::sync::mpsc::channel;

use dyn_clone::{clone_trait_object, DynClone};
use indexmap::{IndexMap, IndexSet};
use itertools::izip;
use rand::prelude::*;
use rand_pcg::Pcg64;
use serde::Serialize;
use threadpool::ThreadPool;

use crate::config::SimulationConfig;
use crate::error::SimulationError;
use crate::log_info;
use crate::metrics::{Estimate, Metrics, Report};
use crate::random::MultiStreamRng;
use crate::simulation::OffloadSimulation;

/// Trait for implementing custom callbacks for simulation runs.
pub trait SimulationCallbacks: DynClone + Send {
    /// Runs before starting a simulation run.
    fn on_simulation_start(&mut self, _sim: &mut OffloadSimulation) {}

    /// Runs on each step of a simulation run, returns false if the simulation must be stopped.
    fn on_step(&mut self, _sim: &mut OffloadSimulation) -> bool {
        true
    }

    /// Runs upon the completion of a simulation run, returns results of this run.
    fn on_simulation_finish(&mut self, _sim: &mut OffloadSimulation) -> IndexMap<String, String> {
        IndexMap::new()
    }
}

clone_trait_object!(SimulationCallbacks);

/// Results of a single replication.
#[derive(Clone, Debug, Serialize)]
pub struct RunResult {
    pub id: usize,
    pub seed: u64,
    pub report: Report,
    pub callback_results: IndexMap<String, String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ExperimentResults {
    /// Per-replication results in run order.
    pub runs: Vec<RunResult>,
    /// Across-replication estimate of every metric.
    pub summary: Metrics<Estimate>,
}

/// Runs independent replications of one configuration, each with its own seed.
pub struct Experiment {
    pub config: SimulationConfig,
    pub replications: usize,
    pub callbacks: Option<Box<dyn SimulationCallbacks>>,
}

impl Experiment {
    /// Smallest seed assigned to a replication.
    pub const MIN_SEED: u64 = 700_000;

    pub fn new(config: SimulationConfig, replications: usize) -> Self {
        Self {
            config,
            replications,
            callbacks: None,
        }
    }

    pub fn with_callbacks(mut self, callbacks: Box<dyn SimulationCallbacks>) -> Self {
        self.callbacks = Some(callbacks);
        self
    }

    /// Returns distinct replication seeds derived from the configured seed.
    pub fn seeds(&self) -> Vec<u64> {
        let mut rng = Pcg64::seed_from_u64(self.config.seed);
        let mut seeds = IndexSet::with_capacity(self.replications);
        while seeds.len() < self.replications {
            seeds.insert(rng.gen_range(Self::MIN_SEED..=MultiStreamRng::MAX_SEED));
        }
        seeds.into_iter().collect()
    }

    /// Runs the experiment using the specified number of threads.
    pub fn run(&self, num_threads: usize) -> Result<ExperimentResults, SimulationError> {
        let pool = ThreadPool::new(num_threads.max(1));
        let (tx, rx) = channel();
        for (id, seed) in izip!(0..self.replications, self.seeds()) {
            let tx = tx.clone();
            let config = SimulationConfig {
                seed,
                ..self.config.clone()
            };
            let callbacks = self.callbacks.clone();
            pool.execute(move || {
                let result = run_replication(id, config, callbacks);
                tx.send((id, result)).unwrap();
            });
        }
        drop(tx);

        let mut results: Vec<_> = rx.iter().collect();
        results.sort_by_key(|x| x.0);
        let mut runs = Vec::with_capacity(self.replications);
        for (expected_id, (id, result)) in results.into_iter().enumerate() {
            if id != expected_id {
                return Err(SimulationError::LostReplication(expected_id));
            }
            runs.push(result?);
        }
        if runs.len() < self.replications {
            return Err(SimulationError::LostReplication(runs.len()));
        }

        let mut samples = Metrics::<Vec<f64>>::default();
        for run in &runs {
            samples.push(&run.report.metrics.map(|e| e.mean));
        }
        let summary = samples.map(|s| Estimate::from_samples(s, self.config.confidence_level));
        Ok(ExperimentResults { runs, summary })
    }
}

fn run_replication(
    id: usize,
    config: SimulationConfig,
    callbacks: Option<Box<dyn SimulationCallbacks>>,
) -> Result<RunResult, SimulationError> {
    let seed = config.seed;
    let mut sim = OffloadSimulation::new(config).map_err(|e| SimulationError::Config(e.to_string()))?;
    let callback_results = match callbacks {
        Some(mut callbacks) => sim.run_with_callbacks(callbacks.as_mut())?,
        None => {
            sim.run()?;
            IndexMap::new()
        }
    };
    log_info!(
        sim.current_time(),
        "experiment",
        "replication {} with seed {} finished",
        id,
        seed
    );
    Ok(RunResult {
        id,
        seed,
        report: sim.report(),
        callback_results,
    })
}
