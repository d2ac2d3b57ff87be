//! Event types of the simulation state machine.

use std::fmt::{Display, Formatter};

use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    Null,
    Start,
    OffloadRequest,
    CloudletCompletion,
    CloudCompletion,
    Stop,
}

impl EventType {
    /// Whether the event advances simulated time.
    pub fn is_timed(&self) -> bool {
        matches!(
            self,
            EventType::OffloadRequest | EventType::CloudletCompletion | EventType::CloudCompletion
        )
    }
}

impl Display for EventType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EventType::Null => "NULL",
            EventType::Start => "START",
            EventType::OffloadRequest => "OFFLOAD_REQUEST",
            EventType::CloudletCompletion => "CLOUDLET_COMPLETION",
            EventType::CloudCompletion => "CLOUD_COMPLETION",
            EventType::Stop => "STOP",
        };
        write!(f, "{}", name)
    }
}
