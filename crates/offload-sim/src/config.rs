//! Simulation configuration.

use serde::{Deserialize, Serialize};

use crate::access_control::AccessControlPolicy;
use crate::error::ConfigError;
use crate::interrupt::VictimSelectionPolicy;
use crate::random::MultiStreamRng;
use crate::task::TaskClass;

/// Holds raw simulation config parsed from YAML file.
#[derive(Debug, Default, PartialEq, Serialize, Deserialize, Clone)]
pub struct RawSimulationConfig {
    pub cloudlet_capacity: Option<usize>,
    pub class2_threshold: Option<usize>,
    pub start: Option<f64>,
    pub stop: Option<f64>,
    pub arrival_rate_class1: Option<f64>,
    pub arrival_rate_class2: Option<f64>,
    pub cloudlet_service_rate_class1: Option<f64>,
    pub cloudlet_service_rate_class2: Option<f64>,
    pub cloud_service_rate_class1: Option<f64>,
    pub cloud_service_rate_class2: Option<f64>,
    pub mean_setup_time: Option<f64>,
    pub access_control: Option<String>,
    pub victim_selection: Option<String>,
    pub seed: Option<u64>,
    pub batch_means: Option<bool>,
    pub batch_size: Option<u64>,
    pub confidence_level: Option<f64>,
}

/// Represents simulation configuration.
///
/// Every simulation validates its configuration on construction, see [`SimulationConfig::validate`].
#[derive(Debug, PartialEq, Serialize, Clone)]
pub struct SimulationConfig {
    /// Cloudlet capacity `N`.
    pub cloudlet_capacity: usize,
    /// Class 2 admission threshold `S`, at most `N`.
    pub class2_threshold: usize,
    /// Simulated instant at which the arrival processes start.
    pub start: f64,
    /// Arrivals after this instant are discarded.
    pub stop: f64,
    /// Class 1 arrival rate. Zero disables class 1 arrivals.
    pub arrival_rate_class1: f64,
    /// Class 2 arrival rate. Zero disables class 2 arrivals.
    pub arrival_rate_class2: f64,
    pub cloudlet_service_rate_class1: f64,
    pub cloudlet_service_rate_class2: f64,
    pub cloud_service_rate_class1: f64,
    pub cloud_service_rate_class2: f64,
    /// Mean of the exponential setup delay paid by a preempted task on the cloud.
    pub mean_setup_time: f64,
    pub access_control: AccessControlPolicy,
    pub victim_selection: VictimSelectionPolicy,
    /// Random seed, at most 9 decimal digits.
    pub seed: u64,
    /// Whether to compute batch means with confidence intervals instead of plain run averages.
    pub batch_means: bool,
    /// Number of timed events per batch.
    pub batch_size: u64,
    /// Confidence level of the reported intervals.
    pub confidence_level: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            cloudlet_capacity: 20,
            class2_threshold: 20,
            start: 0.,
            stop: 100000.,
            arrival_rate_class1: 6.,
            arrival_rate_class2: 6.25,
            cloudlet_service_rate_class1: 0.45,
            cloudlet_service_rate_class2: 0.27,
            cloud_service_rate_class1: 0.25,
            cloud_service_rate_class2: 0.22,
            mean_setup_time: 0.8,
            access_control: AccessControlPolicy::Algorithm1,
            victim_selection: VictimSelectionPolicy::MinArrivalTime,
            seed: 123456789,
            batch_means: true,
            batch_size: 10000,
            confidence_level: 0.95,
        }
    }
}

impl SimulationConfig {
    /// Creates simulation config by reading parameter values from YAML file
    /// (uses default values if some parameters are absent).
    pub fn from_file(file_name: &str) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(file_name).map_err(|source| ConfigError::Io {
            path: file_name.to_string(),
            source,
        })?;
        Self::from_yaml_str(&data)
    }

    pub fn from_yaml_str(data: &str) -> Result<Self, ConfigError> {
        let raw: RawSimulationConfig = serde_yaml::from_str(data)?;
        Self::from_raw(raw)
    }

    /// Fills absent parameters with defaults and validates the result.
    pub fn from_raw(raw: RawSimulationConfig) -> Result<Self, ConfigError> {
        let default = Self::default();
        let cloudlet_capacity = raw.cloudlet_capacity.unwrap_or(default.cloudlet_capacity);
        let config = Self {
            cloudlet_capacity,
            class2_threshold: raw.class2_threshold.unwrap_or(cloudlet_capacity),
            start: raw.start.unwrap_or(default.start),
            stop: raw.stop.unwrap_or(default.stop),
            arrival_rate_class1: raw.arrival_rate_class1.unwrap_or(default.arrival_rate_class1),
            arrival_rate_class2: raw.arrival_rate_class2.unwrap_or(default.arrival_rate_class2),
            cloudlet_service_rate_class1: raw
                .cloudlet_service_rate_class1
                .unwrap_or(default.cloudlet_service_rate_class1),
            cloudlet_service_rate_class2: raw
                .cloudlet_service_rate_class2
                .unwrap_or(default.cloudlet_service_rate_class2),
            cloud_service_rate_class1: raw
                .cloud_service_rate_class1
                .unwrap_or(default.cloud_service_rate_class1),
            cloud_service_rate_class2: raw
                .cloud_service_rate_class2
                .unwrap_or(default.cloud_service_rate_class2),
            mean_setup_time: raw.mean_setup_time.unwrap_or(default.mean_setup_time),
            access_control: match raw.access_control {
                Some(name) => name.parse()?,
                None => default.access_control,
            },
            victim_selection: match raw.victim_selection {
                Some(name) => name.parse()?,
                None => default.victim_selection,
            },
            seed: raw.seed.unwrap_or(default.seed),
            batch_means: raw.batch_means.unwrap_or(default.batch_means),
            batch_size: raw.batch_size.unwrap_or(default.batch_size),
            confidence_level: raw.confidence_level.unwrap_or(default.confidence_level),
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks every parameter, returning the first violated constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cloudlet_capacity == 0 || self.class2_threshold > self.cloudlet_capacity {
            return Err(ConfigError::InvalidThresholds {
                capacity: self.cloudlet_capacity,
                threshold: self.class2_threshold,
            });
        }
        if !(self.start >= 0.) || !self.stop.is_finite() || !(self.start < self.stop) {
            return Err(ConfigError::InvalidTimeWindow {
                start: self.start,
                stop: self.stop,
            });
        }
        for (name, value) in [
            ("arrival_rate_class1", self.arrival_rate_class1),
            ("arrival_rate_class2", self.arrival_rate_class2),
        ] {
            if !value.is_finite() || value < 0. {
                return Err(ConfigError::InvalidRate { name, value });
            }
        }
        for (name, value) in [
            ("cloudlet_service_rate_class1", self.cloudlet_service_rate_class1),
            ("cloudlet_service_rate_class2", self.cloudlet_service_rate_class2),
            ("cloud_service_rate_class1", self.cloud_service_rate_class1),
            ("cloud_service_rate_class2", self.cloud_service_rate_class2),
        ] {
            if !value.is_finite() || value <= 0. {
                return Err(ConfigError::InvalidRate { name, value });
            }
        }
        if !self.mean_setup_time.is_finite() || self.mean_setup_time < 0. {
            return Err(ConfigError::InvalidSetupTime(self.mean_setup_time));
        }
        if self.seed > MultiStreamRng::MAX_SEED {
            return Err(ConfigError::InvalidSeed(self.seed));
        }
        if self.batch_size == 0 {
            return Err(ConfigError::InvalidBatchSize);
        }
        if !(self.confidence_level > 0. && self.confidence_level < 1.) {
            return Err(ConfigError::InvalidConfidenceLevel(self.confidence_level));
        }
        Ok(())
    }

    pub fn arrival_rate(&self, class: TaskClass) -> f64 {
        match class {
            TaskClass::Class1 => self.arrival_rate_class1,
            TaskClass::Class2 => self.arrival_rate_class2,
        }
    }

    pub fn cloudlet_service_rate(&self, class: TaskClass) -> f64 {
        match class {
            TaskClass::Class1 => self.cloudlet_service_rate_class1,
            TaskClass::Class2 => self.cloudlet_service_rate_class2,
        }
    }

    pub fn cloud_service_rate(&self, class: TaskClass) -> f64 {
        match class {
            TaskClass::Class1 => self.cloud_service_rate_class1,
            TaskClass::Class2 => self.cloud_service_rate_class2,
        }
    }
}
