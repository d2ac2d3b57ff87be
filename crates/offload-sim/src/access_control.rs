//! Admission control policies.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::Serialize;

use crate::error::ConfigError;
use crate::state::{CloudletState, PopulationState};
use crate::task::TaskClass;

/// Routing decision for an arriving task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    SendCloudlet,
    SendCloud,
    SendCloudletWithClass2Preemption,
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::SendCloudlet => write!(f, "SEND_CLOUDLET"),
            Action::SendCloud => write!(f, "SEND_CLOUD"),
            Action::SendCloudletWithClass2Preemption => write!(f, "SEND_CLOUDLET_WITH_CLASS2_PREEMPTION"),
        }
    }
}

/// Cloudlet occupancy as seen by an admission policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Occupancy {
    pub class1: usize,
    pub class2: usize,
    /// Total capacity `N`.
    pub capacity: usize,
    /// Class 2 admission threshold `S`.
    pub threshold: usize,
}

impl Occupancy {
    pub fn of(state: &CloudletState) -> Self {
        Self {
            class1: state.len(TaskClass::Class1),
            class2: state.len(TaskClass::Class2),
            capacity: state.capacity(),
            threshold: state.class2_threshold(),
        }
    }

    pub fn total(&self) -> usize {
        self.class1 + self.class2
    }
}

/// Decides where an arriving task is routed.
///
/// Implementations must never return [`Action::SendCloudlet`] for a full cloudlet, and may return
/// [`Action::SendCloudletWithClass2Preemption`] only while a class 2 task is present on it.
pub trait AccessControl {
    fn decide(&self, occupancy: &Occupancy, class: TaskClass) -> Action;
}

/// Class-agnostic policy: the task goes to the cloud only when the cloudlet is full.
pub struct Algorithm1;

impl AccessControl for Algorithm1 {
    fn decide(&self, occupancy: &Occupancy, _class: TaskClass) -> Action {
        if occupancy.total() >= occupancy.capacity {
            Action::SendCloud
        } else {
            Action::SendCloudlet
        }
    }
}

/// Class-aware policy with threshold `S`: class 2 tasks are admitted only below the threshold,
/// class 1 tasks above it preempt a class 2 task if one is running.
pub struct Algorithm2;

impl AccessControl for Algorithm2 {
    fn decide(&self, occupancy: &Occupancy, class: TaskClass) -> Action {
        match class {
            TaskClass::Class1 => {
                if occupancy.class1 >= occupancy.capacity {
                    Action::SendCloud
                } else if occupancy.total() < occupancy.threshold {
                    Action::SendCloudlet
                } else if occupancy.class2 > 0 {
                    Action::SendCloudletWithClass2Preemption
                } else {
                    Action::SendCloudlet
                }
            }
            TaskClass::Class2 => {
                if occupancy.total() >= occupancy.threshold {
                    Action::SendCloud
                } else {
                    Action::SendCloudlet
                }
            }
        }
    }
}

/// Names of the built-in admission policies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum AccessControlPolicy {
    #[serde(rename = "ALGORITHM1")]
    Algorithm1,
    #[serde(rename = "ALGORITHM2")]
    Algorithm2,
}

impl FromStr for AccessControlPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ALGORITHM1" => Ok(Self::Algorithm1),
            "ALGORITHM2" => Ok(Self::Algorithm2),
            _ => Err(ConfigError::UnknownPolicy {
                kind: "access control",
                name: s.to_string(),
            }),
        }
    }
}

impl Display for AccessControlPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Algorithm1 => write!(f, "ALGORITHM1"),
            Self::Algorithm2 => write!(f, "ALGORITHM2"),
        }
    }
}

pub fn access_control_resolver(policy: AccessControlPolicy) -> Box<dyn AccessControl> {
    match policy {
        AccessControlPolicy::Algorithm1 => Box::new(Algorithm1),
        AccessControlPolicy::Algorithm2 => Box::new(Algorithm2),
    }
}
