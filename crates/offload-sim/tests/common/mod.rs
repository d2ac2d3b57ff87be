#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::io::Write;

use env_logger::Builder;
use offload_sim::random::{Stream, VariateSource};
use offload_sim::SimulationError;

/// Installs a logger for the test binary, honouring `RUST_LOG`.
pub fn init_logger() {
    let _ = Builder::from_default_env()
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .is_test(true)
        .try_init();
}

pub fn assert_float_eq(x: f64, y: f64, eps: f64) {
    assert!(x > y - eps && x < y + eps, "{} != {}", x, y);
}

/// Variate source returning scripted values per stream and the distribution mean once a stream runs out.
#[derive(Default)]
pub struct ScriptedSource {
    values: HashMap<Stream, VecDeque<f64>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, stream: Stream, values: &[f64]) -> Self {
        self.values.entry(stream).or_default().extend(values.iter().copied());
        self
    }
}

impl VariateSource for ScriptedSource {
    fn exponential(&mut self, stream: Stream, mean: f64) -> Result<f64, SimulationError> {
        Ok(self
            .values
            .get_mut(&stream)
            .and_then(|values| values.pop_front())
            .unwrap_or(mean))
    }
}
