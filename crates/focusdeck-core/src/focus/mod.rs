//! Focus mode: one task at a time, with periodic "still working?" alerts.
//!
//! [`FocusTimer`] is the state machine (`Idle -> Running -> Idle`). It has
//! no thread of its own; [`FocusDriver`] calls it every few seconds and on
//! every hidden -> visible transition.

mod driver;
mod timer;

pub use driver::{AlertSink, DriverExit, FocusDriver, FocusHost, Wake, CHECK_INTERVAL};
pub use timer::{AlertInterval, AlertResponse, FocusSession, FocusState, FocusTimer, TaskResolver};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The user stopped it, from the banner or an alert.
    User,
    Completed,
    Deleted,
    Archived,
    /// The owning project was deleted.
    GroupRemoved,
    /// The task could not be found on a check.
    TaskMissing,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StopReason::User => "stopped by user",
            StopReason::Completed => "task completed",
            StopReason::Deleted => "task deleted",
            StopReason::Archived => "task archived",
            StopReason::GroupRemoved => "project removed",
            StopReason::TaskMissing => "task no longer exists",
        };
        f.write_str(s)
    }
}
