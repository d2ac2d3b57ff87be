//! Batch means statistics engine.

use crate::metrics::{BatchMeansInfo, Estimate, Metrics, Report};
use crate::stats::{Statistics, StatisticsCollector};

/// Splits a single long run into batches of a fixed number of timed events.
///
/// Each batch starts from zeroed accumulators and contributes one sample of every metric.
/// Events after the last full batch are not reported.
pub struct BatchMeansStatistics {
    current: Statistics,
    batch_size: u64,
    confidence_level: f64,
    batch_events: u64,
    batches: Metrics<Vec<f64>>,
    batch_count: usize,
    closed_time: f64,
    closed_completions: u64,
}

impl BatchMeansStatistics {
    pub fn new(batch_size: u64, confidence_level: f64) -> Self {
        Self {
            current: Statistics::new(),
            batch_size,
            confidence_level,
            batch_events: 0,
            batches: Metrics::default(),
            batch_count: 0,
            closed_time: 0.,
            closed_completions: 0,
        }
    }

    /// Samples collected so far, one per closed batch.
    pub fn samples(&self) -> &Metrics<Vec<f64>> {
        &self.batches
    }

    fn close_batch(&mut self) {
        self.batches.push(&self.current.metrics());
        self.batch_count += 1;
        self.closed_time += self.current.time();
        self.closed_completions += self.current.system_completions();
        self.current.reset();
        self.batch_events = 0;
    }
}

impl StatisticsCollector for BatchMeansStatistics {
    fn statistics(&self) -> &Statistics {
        &self.current
    }

    fn statistics_mut(&mut self) -> &mut Statistics {
        &mut self.current
    }

    fn update_time(&mut self, delta: f64) {
        self.current.update_time(delta);
        self.batch_events += 1;
        if self.batch_events == self.batch_size {
            self.close_batch();
        }
    }

    fn batches(&self) -> usize {
        self.batch_count
    }

    fn report(&self) -> Report {
        Report {
            batch_means: Some(BatchMeansInfo {
                batch_size: self.batch_size,
                batches: self.batch_count,
                confidence_level: self.confidence_level,
            }),
            elapsed_time: self.closed_time,
            completions: self.closed_completions,
            metrics: self
                .batches
                .map(|samples| Estimate::from_samples(samples, self.confidence_level)),
        }
    }
}
