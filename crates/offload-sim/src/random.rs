//! Seeded multi-stream random variates.

use rand::prelude::*;
use rand_pcg::Pcg64;

use crate::error::{ConfigError, SimulationError};
use crate::task::TaskClass;

/// Independent random streams, one per sampling purpose.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stream {
    MobileClass1 = 0,
    MobileClass2 = 1,
    CloudletClass1 = 2,
    CloudletClass2 = 3,
    CloudClass1 = 4,
    CloudClass2 = 5,
    CloudSetup = 6,
}

impl Stream {
    pub const COUNT: usize = 7;

    pub const ALL: [Stream; Stream::COUNT] = [
        Stream::MobileClass1,
        Stream::MobileClass2,
        Stream::CloudletClass1,
        Stream::CloudletClass2,
        Stream::CloudClass1,
        Stream::CloudClass2,
        Stream::CloudSetup,
    ];

    pub fn arrival(class: TaskClass) -> Self {
        match class {
            TaskClass::Class1 => Stream::MobileClass1,
            TaskClass::Class2 => Stream::MobileClass2,
        }
    }

    pub fn cloudlet_service(class: TaskClass) -> Self {
        match class {
            TaskClass::Class1 => Stream::CloudletClass1,
            TaskClass::Class2 => Stream::CloudletClass2,
        }
    }

    pub fn cloud_service(class: TaskClass) -> Self {
        match class {
            TaskClass::Class1 => Stream::CloudClass1,
            TaskClass::Class2 => Stream::CloudClass2,
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }
}

/// Source of exponential variates addressed by stream.
pub trait VariateSource {
    /// Draws an exponentially distributed value with the given mean from the selected stream.
    fn exponential(&mut self, stream: Stream, mean: f64) -> Result<f64, SimulationError>;
}

/// Default variate source: one PCG generator per stream.
///
/// All generators share the state derived from the seed and differ in the PCG stream selector,
/// so drawing from one stream never advances another.
pub struct MultiStreamRng {
    seed: u64,
    streams: Vec<Pcg64>,
}

impl MultiStreamRng {
    pub const MAX_SEED: u64 = 999_999_999;

    pub fn new(seed: u64) -> Result<Self, ConfigError> {
        if seed > Self::MAX_SEED {
            return Err(ConfigError::InvalidSeed(seed));
        }
        let streams = Stream::ALL
            .iter()
            .map(|stream| Pcg64::new(seed as u128, stream.index() as u128))
            .collect();
        Ok(Self { seed, streams })
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Returns a uniform variate from [0, 1) drawn from the selected stream.
    pub fn uniform(&mut self, stream: Stream) -> f64 {
        self.streams[stream.index()].gen_range(0.0..1.0)
    }
}

impl VariateSource for MultiStreamRng {
    fn exponential(&mut self, stream: Stream, mean: f64) -> Result<f64, SimulationError> {
        if !mean.is_finite() || mean < 0. {
            return Err(SimulationError::InvalidMean(mean));
        }
        let u = self.uniform(stream);
        Ok(-mean * (1. - u).ln())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_long_seed() {
        assert!(MultiStreamRng::new(MultiStreamRng::MAX_SEED).is_ok());
        assert!(matches!(
            MultiStreamRng::new(1_000_000_000),
            Err(ConfigError::InvalidSeed(1_000_000_000))
        ));
    }

    #[test]
    fn keeps_seed() {
        assert_eq!(MultiStreamRng::new(42).unwrap().seed(), 42);
    }

    #[test]
    fn rejects_invalid_mean() {
        let mut rng = MultiStreamRng::new(1).unwrap();
        assert!(rng.exponential(Stream::CloudSetup, -1.).is_err());
        assert!(rng.exponential(Stream::CloudSetup, f64::INFINITY).is_err());
        assert_eq!(rng.exponential(Stream::CloudSetup, 0.).unwrap(), 0.);
    }

    #[test]
    fn streams_are_independent() {
        let mut a = MultiStreamRng::new(123456789).unwrap();
        let mut b = MultiStreamRng::new(123456789).unwrap();
        let first: Vec<f64> = (0..5).map(|_| a.uniform(Stream::CloudletClass1)).collect();
        for _ in 0..100 {
            b.uniform(Stream::MobileClass2);
            b.uniform(Stream::CloudSetup);
        }
        let second: Vec<f64> = (0..5).map(|_| b.uniform(Stream::CloudletClass1)).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn streams_differ() {
        let mut rng = MultiStreamRng::new(42).unwrap();
        let x = rng.uniform(Stream::MobileClass1);
        let mut rng = MultiStreamRng::new(42).unwrap();
        let y = rng.uniform(Stream::MobileClass2);
        assert_ne!(x, y);
    }

    #[test]
    fn exponential_mean_is_close() {
        let mut rng = MultiStreamRng::new(2024).unwrap();
        let n = 100_000;
        let sum: f64 = (0..n)
            .map(|_| rng.exponential(Stream::MobileClass1, 2.).unwrap())
            .sum();
        let mean = sum / n as f64;
        assert!((mean - 2.).abs() < 0.05);
    }
}
