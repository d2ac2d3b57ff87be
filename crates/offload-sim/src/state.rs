//! Population states: class-partitioned task containers.

use serde::Serialize;

use crate::error::SimulationError;
use crate::task::{Task, TaskClass, TaskId};

/// Tasks of a population, one ordered collection per class.
#[derive(Clone, Debug, Default, Serialize)]
pub struct TaskSet {
    class1: Vec<Task>,
    class2: Vec<Task>,
}

impl TaskSet {
    pub fn tasks(&self, class: TaskClass) -> &[Task] {
        match class {
            TaskClass::Class1 => &self.class1,
            TaskClass::Class2 => &self.class2,
        }
    }

    fn tasks_mut(&mut self, class: TaskClass) -> &mut Vec<Task> {
        match class {
            TaskClass::Class1 => &mut self.class1,
            TaskClass::Class2 => &mut self.class2,
        }
    }

    /// Iterates over all tasks, class 1 first.
    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.class1.iter().chain(self.class2.iter())
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.iter().find(|t| t.id() == id)
    }

    pub fn contains(&self, task: &Task) -> bool {
        self.get(task.id()).is_some()
    }

    pub fn len(&self, class: TaskClass) -> usize {
        self.tasks(class).len()
    }

    pub fn total_len(&self) -> usize {
        self.class1.len() + self.class2.len()
    }

    pub fn is_empty(&self) -> bool {
        self.class1.is_empty() && self.class2.is_empty()
    }

    fn insert(&mut self, task: Task) {
        self.tasks_mut(task.class()).push(task);
    }

    fn remove(&mut self, task: &Task) -> Option<Task> {
        let tasks = self.tasks_mut(task.class());
        let pos = tasks.iter().position(|t| t == task)?;
        Some(tasks.remove(pos))
    }

    fn find_mut(&mut self, task: &Task) -> Option<&mut Task> {
        self.tasks_mut(task.class()).iter_mut().find(|t| *t == task)
    }

    /// Returns the most imminent arrived task: the one with minimal completion time if any task has
    /// a completion time, otherwise the one with minimal arrival time.
    /// Equal instants resolve to the first task scanned, class 1 before class 2.
    pub fn next_event(&self) -> Option<Task> {
        let arrived = || self.iter().filter(|t| t.is_arrived());
        arrived()
            .filter_map(|t| t.completion().map(|c| (c, t)))
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .or_else(|| {
                arrived()
                    .filter_map(|t| t.arrival().map(|a| (a, t)))
                    .min_by(|a, b| a.0.total_cmp(&b.0))
            })
            .map(|(_, t)| *t)
    }
}

/// Common operations of the mobile set, cloudlet and cloud states.
pub trait PopulationState {
    /// Population name used in logs and errors.
    fn name(&self) -> &'static str;

    fn task_set(&self) -> &TaskSet;

    fn task_set_mut(&mut self) -> &mut TaskSet;

    /// Adds a task. Fails if a task with the same identity is already present.
    fn add(&mut self, task: Task) -> Result<(), SimulationError> {
        if self.task_set().contains(&task) {
            return Err(SimulationError::DuplicateTask {
                population: self.name(),
                task: task.id(),
            });
        }
        self.task_set_mut().insert(task);
        Ok(())
    }

    /// Removes a task, returning the stored copy. Does nothing if the task is absent.
    fn remove(&mut self, task: &Task) -> Option<Task> {
        self.task_set_mut().remove(task)
    }

    /// Sets the completion instant of a present task and returns the updated copy.
    fn set_completion(&mut self, task: &Task, instant: f64) -> Result<Task, SimulationError> {
        let population = self.name();
        let stored = self
            .task_set_mut()
            .find_mut(task)
            .ok_or(SimulationError::MissingTask {
                population,
                task: task.id(),
            })?;
        let arrival = stored.arrival().ok_or(SimulationError::NotArrived(task.id()))?;
        if !(instant > arrival) {
            return Err(SimulationError::InvalidCompletion {
                task: task.id(),
                arrival,
                completion: instant,
            });
        }
        stored.complete_at(instant);
        Ok(*stored)
    }

    fn next_event(&self) -> Option<Task> {
        self.task_set().next_event()
    }

    fn tasks(&self, class: TaskClass) -> &[Task] {
        self.task_set().tasks(class)
    }

    fn len(&self, class: TaskClass) -> usize {
        self.task_set().len(class)
    }

    fn total_len(&self) -> usize {
        self.task_set().total_len()
    }

    fn is_empty(&self) -> bool {
        self.task_set().is_empty()
    }
}

// MOBILE SET //////////////////////////////////////////////////////////////////////////////////////

/// Tasks generated by mobile devices which have not been dispatched yet.
#[derive(Clone, Debug, Default, Serialize)]
pub struct MobileSetState {
    tasks: TaskSet,
}

impl PopulationState for MobileSetState {
    fn name(&self) -> &'static str {
        "mobile_set"
    }

    fn task_set(&self) -> &TaskSet {
        &self.tasks
    }

    fn task_set_mut(&mut self) -> &mut TaskSet {
        &mut self.tasks
    }
}

// CLOUDLET ////////////////////////////////////////////////////////////////////////////////////////

/// Tasks executing on the cloudlet, bounded by capacity `N`.
#[derive(Clone, Debug, Serialize)]
pub struct CloudletState {
    tasks: TaskSet,
    capacity: usize,
    class2_threshold: usize,
}

impl CloudletState {
    pub fn new(capacity: usize, class2_threshold: usize) -> Self {
        Self {
            tasks: TaskSet::default(),
            capacity,
            class2_threshold,
        }
    }

    /// Total capacity `N`.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Class 2 admission threshold `S`.
    pub fn class2_threshold(&self) -> usize {
        self.class2_threshold
    }

    pub fn is_full(&self) -> bool {
        self.tasks.total_len() >= self.capacity
    }
}

impl PopulationState for CloudletState {
    fn name(&self) -> &'static str {
        "cloudlet"
    }

    fn task_set(&self) -> &TaskSet {
        &self.tasks
    }

    fn task_set_mut(&mut self) -> &mut TaskSet {
        &mut self.tasks
    }

    fn add(&mut self, task: Task) -> Result<(), SimulationError> {
        if self.tasks.contains(&task) {
            return Err(SimulationError::DuplicateTask {
                population: self.name(),
                task: task.id(),
            });
        }
        if self.is_full() {
            return Err(SimulationError::CapacityExceeded {
                population: self.name(),
                capacity: self.capacity,
                task: task.id(),
            });
        }
        self.tasks.insert(task);
        Ok(())
    }
}

// CLOUD ///////////////////////////////////////////////////////////////////////////////////////////

/// Tasks executing on the cloud, unbounded.
#[derive(Clone, Debug, Default, Serialize)]
pub struct CloudState {
    tasks: TaskSet,
}

impl PopulationState for CloudState {
    fn name(&self) -> &'static str {
        "cloud"
    }

    fn task_set(&self) -> &TaskSet {
        &self.tasks
    }

    fn task_set_mut(&mut self) -> &mut TaskSet {
        &mut self.tasks
    }
}
