//! Derived performance metrics, interval estimates and reports.

use std::fmt::{Display, Formatter};

use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};

macro_rules! define_metrics {
    ($($name:ident),+ $(,)?) => {
        /// Performance metrics of the offloading system, one value of type `T` per metric.
        #[derive(Clone, Debug, Default, PartialEq, Serialize)]
        pub struct Metrics<T> {
            $(pub $name: T,)+
        }

        impl<T> Metrics<T> {
            pub const NAMES: &'static [&'static str] = &[$(stringify!($name)),+];

            pub fn map<U, F: FnMut(&T) -> U>(&self, mut f: F) -> Metrics<U> {
                Metrics {
                    $($name: f(&self.$name),)+
                }
            }

            /// Iterates over `(name, value)` pairs in declaration order.
            pub fn iter(&self) -> impl Iterator<Item = (&'static str, &T)> {
                [$((stringify!($name), &self.$name)),+].into_iter()
            }
        }

        impl Metrics<Vec<f64>> {
            /// Appends one sample of every metric.
            pub fn push(&mut self, sample: &Metrics<f64>) {
                $(self.$name.push(sample.$name);)+
            }
        }
    };
}

define_metrics!(
    system_response_time,
    system_class1_response_time,
    system_class2_response_time,
    cloudlet_response_time,
    cloudlet_class1_response_time,
    cloudlet_class2_response_time,
    cloud_response_time,
    cloud_class1_response_time,
    cloud_class2_response_time,
    system_throughput,
    system_class1_throughput,
    system_class2_throughput,
    cloudlet_throughput,
    cloudlet_class1_throughput,
    cloudlet_class2_throughput,
    cloud_throughput,
    cloud_class1_throughput,
    cloud_class2_throughput,
    system_population,
    system_class1_population,
    system_class2_population,
    cloudlet_population,
    cloudlet_class1_population,
    cloudlet_class2_population,
    cloud_population,
    cloud_class1_population,
    cloud_class2_population,
    class2_interrupted_response_time,
    class2_interrupted_fraction,
);

/// One-pass (Welford) mean and standard deviation.
#[derive(Clone, Debug, Default)]
pub struct Welford {
    count: u64,
    mean: f64,
    sum: f64,
}

impl Welford {
    pub fn add(&mut self, x: f64) {
        self.count += 1;
        let n = self.count as f64;
        let d = x - self.mean;
        self.sum += d * d * (n - 1.) / n;
        self.mean += d / n;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Population standard deviation of the added values.
    pub fn std_dev(&self) -> f64 {
        if self.count == 0 {
            0.
        } else {
            (self.sum / self.count as f64).sqrt()
        }
    }
}

/// Two-sided Student's t critical value for the given confidence level.
pub fn student_t_critical_value(degrees_of_freedom: u64, confidence_level: f64) -> Option<f64> {
    let dist = StudentsT::new(0., 1., degrees_of_freedom as f64).ok()?;
    Some(dist.inverse_cdf(1. - (1. - confidence_level) / 2.))
}

/// Point estimate with an optional confidence interval half-width.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Estimate {
    pub mean: f64,
    pub half_width: Option<f64>,
}

impl Estimate {
    pub fn point(mean: f64) -> Self {
        Self { mean, half_width: None }
    }

    /// Estimates the mean of independent samples. The half-width requires at least two samples.
    pub fn from_samples(samples: &[f64], confidence_level: f64) -> Self {
        let mut acc = Welford::default();
        for x in samples {
            acc.add(*x);
        }
        if acc.count() < 2 {
            return Self::point(acc.mean());
        }
        let n = acc.count();
        let half_width = student_t_critical_value(n - 1, confidence_level)
            .map(|t| t * acc.std_dev() / ((n - 1) as f64).sqrt());
        Self {
            mean: acc.mean(),
            half_width,
        }
    }
}

impl Display for Estimate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.half_width {
            Some(w) => write!(f, "{:.6} +/- {:.6}", self.mean, w),
            None => write!(f, "{:.6}", self.mean),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BatchMeansInfo {
    pub batch_size: u64,
    pub batches: usize,
    pub confidence_level: f64,
}

/// Final statistics of a simulation run.
#[derive(Clone, Debug, Serialize)]
pub struct Report {
    /// Present if the run used the batch means method.
    pub batch_means: Option<BatchMeansInfo>,
    pub elapsed_time: f64,
    pub completions: u64,
    pub metrics: Metrics<Estimate>,
}

impl Display for Report {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "elapsed time: {:.3}", self.elapsed_time)?;
        writeln!(f, "completions: {}", self.completions)?;
        if let Some(info) = &self.batch_means {
            writeln!(
                f,
                "batch means: {} batches of {} events, confidence level {}",
                info.batches, info.batch_size, info.confidence_level
            )?;
        }
        for (name, estimate) in self.metrics.iter() {
            writeln!(f, "  - {}: {}", name, estimate)?;
        }
        Ok(())
    }
}
