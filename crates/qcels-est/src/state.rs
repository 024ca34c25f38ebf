use serde::{Deserialize, Serialize};

/// Progress of a multi-level run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "level", rename_all = "kebab-case")]
pub enum DriverState {
    /// Level 0: unconstrained fit from the prior.
    Preprocessing,
    /// Levels `1..=L`: fit inside the window left by the previous level.
    Refining(usize),
    /// All levels fitted.
    Done,
}

impl DriverState {
    /// Moves to the next level, or to `Done` after `final_level`.
    pub fn advance(self, final_level: usize) -> Self {
        match self {
            DriverState::Preprocessing if final_level == 0 => DriverState::Done,
            DriverState::Preprocessing => DriverState::Refining(1),
            DriverState::Refining(level) if level < final_level => DriverState::Refining(level + 1),
            DriverState::Refining(_) | DriverState::Done => DriverState::Done,
        }
    }

    /// Level processed in this state, if any.
    pub fn level(&self) -> Option<usize> {
        match self {
            DriverState::Preprocessing => Some(0),
            DriverState::Refining(level) => Some(*level),
            DriverState::Done => None,
        }
    }

    /// True once every level has been fitted.
    pub fn is_done(&self) -> bool {
        matches!(self, DriverState::Done)
    }
}
