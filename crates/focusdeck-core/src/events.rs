use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::focus::StopReason;
use crate::task::TaskId;

/// Every state change worth telling the user about produces an Event.
/// The CLI prints them; alert sinks present `FocusAlert`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    FocusStarted {
        task_id: TaskId,
        alert_interval_min: u32,
        website_url: Option<String>,
        at: DateTime<Utc>,
    },
    /// A persisted session was picked up again; the next alert is a full
    /// interval away.
    FocusResumed {
        task_id: TaskId,
        started_at: DateTime<Utc>,
        next_alert_at: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    /// "Still working on this?"
    FocusAlert {
        task_id: TaskId,
        title: String,
        website_url: Option<String>,
        focused_for_min: i64,
        at: DateTime<Utc>,
    },
    FocusStopped {
        task_id: TaskId,
        reason: StopReason,
        at: DateTime<Utc>,
    },
    ZonesMigrated {
        changed: usize,
        at: DateTime<Utc>,
    },
    TasksArchived {
        count: usize,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        focusing: bool,
        task_id: Option<TaskId>,
        title: Option<String>,
        alert_interval_min: Option<u32>,
        website_url: Option<String>,
        elapsed_ms: u64,
        next_alert_in_ms: Option<u64>,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn is_alert(&self) -> bool {
        matches!(self, Event::FocusAlert { .. })
    }
}
