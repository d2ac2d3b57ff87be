//! Time-integrated statistics accumulators.

use serde::Serialize;

use crate::metrics::{Estimate, Metrics, Report};
use crate::task::TaskClass;

/// Execution layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Layer {
    Cloudlet,
    Cloud,
}

impl Layer {
    pub const ALL: [Layer; 2] = [Layer::Cloudlet, Layer::Cloud];

    pub fn index(&self) -> usize {
        match self {
            Layer::Cloudlet => 0,
            Layer::Cloud => 1,
        }
    }
}

fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0. {
        0.
    } else {
        numerator / denominator
    }
}

/// Running accumulators per layer and class.
///
/// Areas are integrals of the population over time, so `area / completions` is the mean response time
/// and `area / time` the mean population.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Statistics {
    time: f64,
    areas: [[f64; 2]; 2],
    completions: [[u64; 2]; 2],
    interrupted: u64,
    interrupted_response_time: f64,
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_area(&mut self, layer: Layer, class: TaskClass, delta: f64, population: usize) {
        self.areas[layer.index()][class.index()] += delta * population as f64;
    }

    pub fn update_time(&mut self, delta: f64) {
        self.time += delta;
    }

    pub fn record_completion(&mut self, layer: Layer, class: TaskClass) {
        self.completions[layer.index()][class.index()] += 1;
    }

    /// Records a class 2 task evicted from the cloudlet.
    ///
    /// `cloudlet_area` is the time the task has spent on the cloudlet, which no longer counts towards
    /// the cloudlet area, and `response_time` is the time from its cloudlet arrival to its cloud completion.
    pub fn record_interruption(&mut self, cloudlet_area: f64, response_time: f64) {
        self.interrupted += 1;
        self.areas[Layer::Cloudlet.index()][TaskClass::Class2.index()] -= cloudlet_area;
        self.interrupted_response_time += response_time;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn area(&self, layer: Layer, class: TaskClass) -> f64 {
        self.areas[layer.index()][class.index()]
    }

    pub fn completions(&self, layer: Layer, class: TaskClass) -> u64 {
        self.completions[layer.index()][class.index()]
    }

    pub fn interrupted(&self) -> u64 {
        self.interrupted
    }

    pub fn system_completions(&self) -> u64 {
        self.completions.iter().flatten().sum()
    }

    fn layer_area(&self, layer: Layer) -> f64 {
        self.areas[layer.index()].iter().sum()
    }

    fn class_area(&self, class: TaskClass) -> f64 {
        Layer::ALL.iter().map(|l| self.area(*l, class)).sum()
    }

    fn layer_completions(&self, layer: Layer) -> u64 {
        self.completions[layer.index()].iter().sum()
    }

    fn class_completions(&self, class: TaskClass) -> u64 {
        Layer::ALL.iter().map(|l| self.completions(*l, class)).sum()
    }

    /// Computes derived metrics. Ratios with a zero denominator are reported as zero.
    pub fn metrics(&self) -> Metrics<f64> {
        use Layer::*;
        use TaskClass::*;

        let system_area = self.layer_area(Cloudlet) + self.layer_area(Cloud);
        let system_completions = self.system_completions() as f64;
        let response = |layer, class| safe_div(self.area(layer, class), self.completions(layer, class) as f64);
        let throughput = |completions: u64| safe_div(completions as f64, self.time);
        let population = |area: f64| safe_div(area, self.time);

        Metrics {
            system_response_time: safe_div(system_area, system_completions),
            system_class1_response_time: safe_div(self.class_area(Class1), self.class_completions(Class1) as f64),
            system_class2_response_time: safe_div(self.class_area(Class2), self.class_completions(Class2) as f64),
            cloudlet_response_time: safe_div(
                self.layer_area(Cloudlet),
                self.layer_completions(Cloudlet) as f64,
            ),
            cloudlet_class1_response_time: response(Cloudlet, Class1),
            cloudlet_class2_response_time: response(Cloudlet, Class2),
            cloud_response_time: safe_div(self.layer_area(Cloud), self.layer_completions(Cloud) as f64),
            cloud_class1_response_time: response(Cloud, Class1),
            cloud_class2_response_time: response(Cloud, Class2),

            system_throughput: throughput(self.system_completions()),
            system_class1_throughput: throughput(self.class_completions(Class1)),
            system_class2_throughput: throughput(self.class_completions(Class2)),
            cloudlet_throughput: throughput(self.layer_completions(Cloudlet)),
            cloudlet_class1_throughput: throughput(self.completions(Cloudlet, Class1)),
            cloudlet_class2_throughput: throughput(self.completions(Cloudlet, Class2)),
            cloud_throughput: throughput(self.layer_completions(Cloud)),
            cloud_class1_throughput: throughput(self.completions(Cloud, Class1)),
            cloud_class2_throughput: throughput(self.completions(Cloud, Class2)),

            system_population: population(system_area),
            system_class1_population: population(self.class_area(Class1)),
            system_class2_population: population(self.class_area(Class2)),
            cloudlet_population: population(self.layer_area(Cloudlet)),
            cloudlet_class1_population: population(self.area(Cloudlet, Class1)),
            cloudlet_class2_population: population(self.area(Cloudlet, Class2)),
            cloud_population: population(self.layer_area(Cloud)),
            cloud_class1_population: population(self.area(Cloud, Class1)),
            cloud_class2_population: population(self.area(Cloud, Class2)),

            class2_interrupted_response_time: safe_div(self.interrupted_response_time, self.interrupted as f64),
            class2_interrupted_fraction: safe_div(self.interrupted as f64, self.class_completions(Class2) as f64),
        }
    }
}

/// Statistics engine driven by the simulation.
pub trait StatisticsCollector {
    /// Accumulators of the current observation period.
    fn statistics(&self) -> &Statistics;

    fn statistics_mut(&mut self) -> &mut Statistics;

    /// Advances elapsed time after a timed event.
    fn update_time(&mut self, delta: f64);

    /// Number of closed batches.
    fn batches(&self) -> usize {
        0
    }

    fn report(&self) -> Report;
}

/// Plain engine: one observation period spanning the whole run.
impl StatisticsCollector for Statistics {
    fn statistics(&self) -> &Statistics {
        self
    }

    fn statistics_mut(&mut self) -> &mut Statistics {
        self
    }

    fn update_time(&mut self, delta: f64) {
        self.time += delta;
    }

    fn report(&self) -> Report {
        Report {
            batch_means: None,
            elapsed_time: self.time,
            completions: self.system_completions(),
            metrics: self.metrics().map(|x| Estimate::point(*x)),
        }
    }
}
