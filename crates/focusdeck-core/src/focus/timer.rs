//! Focus timer state machine.
//!
//! Wall-clock based with no internal thread. The caller passes `now` into
//! every command and is responsible for calling `tick()` periodically.
//!
//! ## State Transitions
//!
//! ```text
//! Idle --start--> Running --stop / task gone--> Idle
//!                  |  ^
//!                  +--+ tick: alert when interval elapsed
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut timer = FocusTimer::new();
//! timer.start(task_id, AlertInterval::new(10)?, None, clock.now())?;
//! // every ~10 s, and whenever the window becomes visible:
//! if let Some(event) = timer.tick(clock.now(), &board) { sink.deliver(&event) }
//! ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info, warn};

use super::StopReason;
use crate::board::TaskBoard;
use crate::error::{FocusError, ValidationError};
use crate::events::Event;
use crate::task::TaskId;

/// Minutes between alerts, 1 through 15.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct AlertInterval(u32);

impl AlertInterval {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 15;

    pub fn new(minutes: u32) -> Result<Self, ValidationError> {
        if (Self::MIN..=Self::MAX).contains(&minutes) {
            Ok(Self(minutes))
        } else {
            Err(ValidationError::AlertInterval {
                min: Self::MIN,
                max: Self::MAX,
                got: minutes,
            })
        }
    }

    pub fn minutes(self) -> u32 {
        self.0
    }

    pub fn duration(self) -> Duration {
        Duration::minutes(i64::from(self.0))
    }
}

impl Default for AlertInterval {
    fn default() -> Self {
        Self(10)
    }
}

impl TryFrom<u32> for AlertInterval {
    type Error = ValidationError;

    fn try_from(minutes: u32) -> Result<Self, Self::Error> {
        Self::new(minutes)
    }
}

impl From<AlertInterval> for u32 {
    fn from(i: AlertInterval) -> u32 {
        i.0
    }
}

/// A running focus session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocusSession {
    pub task_id: TaskId,
    pub alert_interval: AlertInterval,
    #[serde(default)]
    pub website_url: Option<String>,
    pub start_time: DateTime<Utc>,
    /// Never moves backwards.
    pub last_alert_time: DateTime<Utc>,
}

impl FocusSession {
    pub fn next_alert_at(&self) -> DateTime<Utc> {
        self.last_alert_time + self.alert_interval.duration()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum FocusState {
    #[default]
    Idle,
    Running(FocusSession),
}

/// Answer to a "still working?" alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertResponse {
    StillWorking,
    Stop,
}

/// Looks up the title of a task by id, if it still exists.
pub trait TaskResolver {
    fn resolve_title(&self, id: TaskId) -> Option<&str>;
}

impl TaskResolver for TaskBoard {
    fn resolve_title(&self, id: TaskId) -> Option<&str> {
        self.task(id).map(|t| t.title.as_str())
    }
}

/// Owns the single process-wide focus state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FocusTimer {
    #[serde(default, deserialize_with = "lenient_state")]
    state: FocusState,
}

impl FocusTimer {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &FocusState {
        &self.state
    }

    pub fn session(&self) -> Option<&FocusSession> {
        match &self.state {
            FocusState::Running(s) => Some(s),
            FocusState::Idle => None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.session().is_some()
    }

    pub fn active_task(&self) -> Option<TaskId> {
        self.session().map(|s| s.task_id)
    }

    pub fn is_focused(&self, task_id: TaskId) -> bool {
        self.active_task() == Some(task_id)
    }

    pub fn next_alert_at(&self) -> Option<DateTime<Utc>> {
        self.session().map(FocusSession::next_alert_at)
    }

    /// Time since the session started; zero when idle.
    pub fn elapsed(&self, now: DateTime<Utc>) -> Duration {
        self.session()
            .map(|s| (now - s.start_time).max(Duration::zero()))
            .unwrap_or_else(Duration::zero)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self, now: DateTime<Utc>, tasks: &impl TaskResolver) -> Event {
        let session = self.session();
        Event::StateSnapshot {
            focusing: session.is_some(),
            task_id: session.map(|s| s.task_id),
            title: session
                .and_then(|s| tasks.resolve_title(s.task_id))
                .map(str::to_string),
            alert_interval_min: session.map(|s| s.alert_interval.minutes()),
            website_url: session.and_then(|s| s.website_url.clone()),
            elapsed_ms: duration_ms(self.elapsed(now)),
            next_alert_in_ms: session.map(|s| duration_ms(s.next_alert_at() - now)),
            at: now,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin focusing. The first alert comes a full interval from `now`.
    pub fn start(
        &mut self,
        task_id: TaskId,
        interval: AlertInterval,
        website_url: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Event, FocusError> {
        if let Some(active) = self.active_task() {
            return Err(FocusError::AlreadyFocusing(active));
        }
        self.state = FocusState::Running(FocusSession {
            task_id,
            alert_interval: interval,
            website_url: website_url.clone(),
            start_time: now,
            last_alert_time: now,
        });
        info!(task = %task_id, interval_min = interval.minutes(), "focus started");
        Ok(Event::FocusStarted {
            task_id,
            alert_interval_min: interval.minutes(),
            website_url,
            at: now,
        })
    }

    /// Pick up a persisted session after a reload.
    ///
    /// Keeps `start_time` but grants a fresh interval before the next alert
    /// instead of trusting time that passed while nothing was watching.
    pub fn resume(&mut self, now: DateTime<Utc>, tasks: &impl TaskResolver) -> Option<Event> {
        let task_id = self.active_task()?;
        if tasks.resolve_title(task_id).is_none() {
            warn!(task = %task_id, "focused task vanished while away, clearing focus");
            return self.stop(StopReason::TaskMissing, now);
        }
        let FocusState::Running(session) = &mut self.state else {
            return None;
        };
        session.last_alert_time = session.last_alert_time.max(now);
        debug!(task = %task_id, next = %session.next_alert_at(), "focus resumed");
        Some(Event::FocusResumed {
            task_id,
            started_at: session.start_time,
            next_alert_at: session.next_alert_at(),
            at: now,
        })
    }

    /// Periodic check. Safe to call repeatedly and from several triggers:
    /// `last_alert_time` is advanced before the alert is returned, so a
    /// second call inside the same interval yields nothing.
    pub fn tick(&mut self, now: DateTime<Utc>, tasks: &impl TaskResolver) -> Option<Event> {
        let task_id = self.active_task()?;
        let Some(title) = tasks.resolve_title(task_id) else {
            warn!(task = %task_id, "focused task no longer resolves, clearing focus");
            return self.stop(StopReason::TaskMissing, now);
        };
        let FocusState::Running(session) = &mut self.state else {
            return None;
        };
        if now - session.last_alert_time < session.alert_interval.duration() {
            return None;
        }
        session.last_alert_time = now;
        debug!(task = %task_id, "focus alert");
        Some(Event::FocusAlert {
            task_id,
            title: title.to_string(),
            website_url: session.website_url.clone(),
            focused_for_min: (now - session.start_time).num_minutes(),
            at: now,
        })
    }

    /// Clear a session whose task no longer resolves. Never fires an alert,
    /// so read-only callers can use it without consuming one.
    pub fn validate(&mut self, now: DateTime<Utc>, tasks: &impl TaskResolver) -> Option<Event> {
        let task_id = self.active_task()?;
        if tasks.resolve_title(task_id).is_some() {
            return None;
        }
        warn!(task = %task_id, "focused task no longer resolves, clearing focus");
        self.stop(StopReason::TaskMissing, now)
    }

    /// The window went from hidden to visible: catch up on throttled ticks.
    pub fn on_visible(&mut self, now: DateTime<Utc>, tasks: &impl TaskResolver) -> Option<Event> {
        self.tick(now, tasks)
    }

    pub fn respond(&mut self, response: AlertResponse, now: DateTime<Utc>) -> Option<Event> {
        match response {
            AlertResponse::StillWorking => None,
            AlertResponse::Stop => self.stop(StopReason::User, now),
        }
    }

    /// Change the interval of the running session, restarting the countdown.
    pub fn change_interval(&mut self, interval: AlertInterval, now: DateTime<Utc>) -> Result<(), FocusError> {
        let FocusState::Running(session) = &mut self.state else {
            return Err(FocusError::NotFocusing);
        };
        session.alert_interval = interval;
        session.last_alert_time = session.last_alert_time.max(now);
        Ok(())
    }

    /// Return to Idle. `None` when already idle.
    pub fn stop(&mut self, reason: StopReason, now: DateTime<Utc>) -> Option<Event> {
        let FocusState::Running(session) = std::mem::take(&mut self.state) else {
            return None;
        };
        info!(task = %session.task_id, %reason, "focus stopped");
        Some(Event::FocusStopped {
            task_id: session.task_id,
            reason,
            at: now,
        })
    }

    /// Stop only if `task_id` is the one being focused on.
    pub fn stop_if_focused(&mut self, task_id: TaskId, reason: StopReason, now: DateTime<Utc>) -> Option<Event> {
        if self.is_focused(task_id) {
            self.stop(reason, now)
        } else {
            None
        }
    }
}

/// A stored session that no longer validates (bad interval, missing
/// fields) loads as Idle instead of failing the whole document.
fn lenient_state<'de, D>(deserializer: D) -> Result<FocusState, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(raw).unwrap_or_else(|e| {
        warn!(error = %e, "discarding unreadable focus state");
        FocusState::Idle
    }))
}

fn duration_ms(d: Duration) -> u64 {
    d.num_milliseconds().max(0) as u64
}
