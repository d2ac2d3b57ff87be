//! Simulation clock.

use serde::Serialize;

use crate::error::SimulationError;
use crate::task::Task;

/// Holds the previous and the next event instants along with the tasks that produced them.
///
/// The next instant never decreases.
#[derive(Clone, Debug, Serialize)]
pub struct Clock {
    previous_instant: f64,
    next_instant: f64,
    previous_task: Option<Task>,
    next_task: Option<Task>,
}

impl Clock {
    pub fn new(start: f64) -> Self {
        Self {
            previous_instant: start,
            next_instant: start,
            previous_task: None,
            next_task: None,
        }
    }

    pub fn previous_instant(&self) -> f64 {
        self.previous_instant
    }

    pub fn next_instant(&self) -> f64 {
        self.next_instant
    }

    pub fn previous_task(&self) -> Option<&Task> {
        self.previous_task.as_ref()
    }

    pub fn next_task(&self) -> Option<&Task> {
        self.next_task.as_ref()
    }

    /// Length of the last interval.
    pub fn delta(&self) -> f64 {
        self.next_instant - self.previous_instant
    }

    /// Advances the clock to the event time of the task.
    pub fn update(&mut self, task: Task) -> Result<(), SimulationError> {
        let instant = task.event_time().ok_or(SimulationError::UndefinedTime(task.id()))?;
        if instant < self.next_instant {
            return Err(SimulationError::ClockBackwards {
                from: self.next_instant,
                to: instant,
            });
        }
        self.previous_instant = self.next_instant;
        self.next_instant = instant;
        self.previous_task = self.next_task.replace(task);
        Ok(())
    }

    /// Advances the clock to the earliest of the defined candidates and returns its position.
    /// Equal event times resolve to the earlier position. Does nothing if no candidate is defined.
    pub fn update_min(&mut self, candidates: &[Option<Task>]) -> Result<Option<usize>, SimulationError> {
        let mut best: Option<(usize, f64, Task)> = None;
        for (i, task) in candidates.iter().enumerate() {
            if let Some(task) = task {
                let instant = task.event_time().ok_or(SimulationError::UndefinedTime(task.id()))?;
                if best.map_or(true, |(_, best_instant, _)| instant < best_instant) {
                    best = Some((i, instant, *task));
                }
            }
        }
        match best {
            Some((i, _, task)) => {
                self.update(task)?;
                Ok(Some(i))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskClass;

    #[test]
    fn picks_earliest_candidate() {
        let mut clock = Clock::new(0.);
        let mut completed = Task::new(1, TaskClass::Class2, 0.5);
        completed.complete_at(2.);
        let candidates = [Some(Task::new(0, TaskClass::Class1, 3.)), Some(completed), None];
        assert_eq!(clock.update_min(&candidates).unwrap(), Some(1));
        assert_eq!(clock.next_instant(), 2.);
        assert_eq!(clock.previous_instant(), 0.);
        assert_eq!(clock.next_task().map(|t| t.id()), Some(1));
    }

    #[test]
    fn ties_resolve_to_first_candidate() {
        let mut clock = Clock::new(0.);
        let candidates = [Some(Task::new(4, TaskClass::Class2, 1.)), Some(Task::new(5, TaskClass::Class1, 1.))];
        assert_eq!(clock.update_min(&candidates).unwrap(), Some(0));
    }

    #[test]
    fn no_candidates_is_noop() {
        let mut clock = Clock::new(2.);
        assert_eq!(clock.update_min(&[None, None, None]).unwrap(), None);
        assert_eq!(clock.next_instant(), 2.);
        assert!(clock.next_task().is_none());
    }

    #[test]
    fn refuses_to_go_backwards() {
        let mut clock = Clock::new(0.);
        clock.update(Task::new(0, TaskClass::Class1, 5.)).unwrap();
        let err = clock.update(Task::new(1, TaskClass::Class1, 4.)).unwrap_err();
        assert_eq!(err, SimulationError::ClockBackwards { from: 5., to: 4. });
    }
}
