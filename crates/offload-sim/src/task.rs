//! Offloadable tasks.

use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};

use serde::Serialize;

/// Unique task identifier.
pub type TaskId = u64;

/// Task class. Class 1 tasks may preempt class 2 tasks on the cloudlet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskClass {
    Class1,
    Class2,
}

impl TaskClass {
    pub const ALL: [TaskClass; 2] = [TaskClass::Class1, TaskClass::Class2];

    pub fn index(&self) -> usize {
        match self {
            TaskClass::Class1 => 0,
            TaskClass::Class2 => 1,
        }
    }
}

impl Display for TaskClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskClass::Class1 => write!(f, "CLASS1"),
            TaskClass::Class2 => write!(f, "CLASS2"),
        }
    }
}

/// A unit of work moving through the mobile set, the cloudlet and the cloud.
///
/// Equality and hashing use the identifier only, timestamps are ignored.
///
/// The `completion` field normally holds an instant. For an interrupted task (evicted from the cloudlet and not
/// yet executed by the cloud) it instead holds the remaining amount of work, expressed as the residual cloudlet
/// service time multiplied by the cloudlet class 2 service rate. The cloud converts it back to time using its own
/// service rate and then stores a regular completion instant again.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Task {
    id: TaskId,
    class: TaskClass,
    arrival: Option<f64>,
    completion: Option<f64>,
    interrupted: bool,
}

impl Task {
    /// Creates a task which arrives at the given instant.
    pub fn new(id: TaskId, class: TaskClass, arrival: f64) -> Self {
        Self {
            id,
            class,
            arrival: Some(arrival),
            completion: None,
            interrupted: false,
        }
    }

    /// Creates the task left behind by a preemption: it keeps the identity and class of the evicted task,
    /// arrives at the eviction instant and carries the remaining work in the completion field.
    pub fn displaced(evicted: &Task, now: f64, remaining_work: f64) -> Self {
        Self {
            id: evicted.id,
            class: evicted.class,
            arrival: Some(now),
            completion: Some(remaining_work),
            interrupted: true,
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn class(&self) -> TaskClass {
        self.class
    }

    pub fn arrival(&self) -> Option<f64> {
        self.arrival
    }

    pub fn completion(&self) -> Option<f64> {
        self.completion
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupted
    }

    pub fn is_arrived(&self) -> bool {
        self.arrival.is_some()
    }

    /// Returns the instant at which the task produces its next event:
    /// the completion time if defined, otherwise the arrival time.
    pub fn event_time(&self) -> Option<f64> {
        self.completion.or(self.arrival)
    }

    /// Stores a completion instant. This ends the interrupted phase, if any.
    pub(crate) fn complete_at(&mut self, instant: f64) {
        self.completion = Some(instant);
        self.interrupted = false;
    }
}

/// Returns `start + duration`, or the next representable instant when the sum rounds back to `start`.
///
/// A completion must come strictly after the arrival, which plain addition can't guarantee
/// once the arrival is large compared to the drawn duration.
pub(crate) fn instant_after(start: f64, duration: f64) -> f64 {
    let end = start + duration;
    if end <= start && duration >= 0. && start >= 0. && start.is_finite() {
        f64::from_bits(start.to_bits() + 1)
    } else {
        end
    }
}

impl PartialEq for Task {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Task {}

impl Hash for Task {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Display for Task {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", serde_json::json!(self))
    }
}
