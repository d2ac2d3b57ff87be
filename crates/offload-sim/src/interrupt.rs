//! Preemption victim selection.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::Serialize;

use crate::error::{ConfigError, SimulationError};
use crate::task::Task;

/// Chooses which running class 2 task is evicted from the cloudlet.
pub trait VictimSelector {
    /// Selects a victim among `candidates` at instant `now`. Fails if there is no arrived candidate.
    fn select(&self, now: f64, candidates: &[Task]) -> Result<Task, SimulationError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VictimSelectionPolicy {
    MinArrivalTime,
    MaxArrivalTime,
    MinCompletionTime,
    MaxCompletionTime,
}

impl VictimSelectionPolicy {
    fn key(&self, task: &Task) -> f64 {
        match self {
            Self::MinArrivalTime | Self::MaxArrivalTime => task.arrival().unwrap_or(f64::NAN),
            Self::MinCompletionTime | Self::MaxCompletionTime => task.completion().unwrap_or(f64::NAN),
        }
    }

    fn prefers_max(&self) -> bool {
        matches!(self, Self::MaxArrivalTime | Self::MaxCompletionTime)
    }
}

impl VictimSelector for VictimSelectionPolicy {
    fn select(&self, now: f64, candidates: &[Task]) -> Result<Task, SimulationError> {
        let mut best: Option<(f64, &Task)> = None;
        for task in candidates.iter().filter(|t| t.arrival().map_or(false, |a| a <= now)) {
            let key = self.key(task);
            if key.is_nan() {
                continue;
            }
            let better = match best {
                None => true,
                Some((best_key, _)) if self.prefers_max() => key > best_key,
                Some((best_key, _)) => key < best_key,
            };
            if better {
                best = Some((key, task));
            }
        }
        best.map(|(_, task)| *task).ok_or(SimulationError::NoVictim)
    }
}

impl FromStr for VictimSelectionPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "MIN_ARRIVAL_TIME" => Ok(Self::MinArrivalTime),
            "MAX_ARRIVAL_TIME" => Ok(Self::MaxArrivalTime),
            "MIN_COMPLETION_TIME" => Ok(Self::MinCompletionTime),
            "MAX_COMPLETION_TIME" => Ok(Self::MaxCompletionTime),
            _ => Err(ConfigError::UnknownPolicy {
                kind: "victim selection",
                name: s.to_string(),
            }),
        }
    }
}

impl Display for VictimSelectionPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::MinArrivalTime => "MIN_ARRIVAL_TIME",
            Self::MaxArrivalTime => "MAX_ARRIVAL_TIME",
            Self::MinCompletionTime => "MIN_COMPLETION_TIME",
            Self::MaxCompletionTime => "MAX_COMPLETION_TIME",
        };
        write!(f, "{}", name)
    }
}

pub fn victim_selector_resolver(policy: VictimSelectionPolicy) -> Box<dyn VictimSelector> {
    Box::new(policy)
}
