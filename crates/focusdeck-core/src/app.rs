//! The persisted application document and the operations that span
//! more than one part of it.
//!
//! Board edits that finish or remove the focused task stop focus in the
//! same call, so a stored document never points focus at a task that is
//! gone or done.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::archive::Archive;
use crate::board::TaskBoard;
use crate::error::{ArchiveError, BoardError, FocusError, ValidationError};
use crate::events::Event;
use crate::focus::{AlertInterval, FocusTimer, StopReason};
use crate::notes::Notes;
use crate::task::{GroupId, TaskId};
use crate::zone::{self, DayWindow, ZoneLists};

/// How many recently used focus URLs are remembered.
pub const SAVED_URL_LIMIT: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    #[serde(default)]
    pub board: TaskBoard,
    #[serde(default)]
    pub archive: Archive,
    #[serde(default)]
    pub notes: Notes,
    #[serde(default)]
    pub focus: FocusTimer,
    /// Oldest first.
    #[serde(default)]
    pub saved_urls: Vec<String>,
    #[serde(default)]
    pub zones_migrated: bool,
}

/// Accept `example.com` as well as `https://example.com`.
pub fn normalize_url(raw: &str) -> Result<Option<String>, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let candidate = if raw.starts_with("http://") || raw.starts_with("https://") {
        raw.to_string()
    } else {
        format!("https://{raw}")
    };
    match Url::parse(&candidate) {
        Ok(url) if url.host_str().is_some() => Ok(Some(candidate)),
        _ => Err(ValidationError::InvalidUrl(raw.to_string())),
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn zone_lists(&self, window: &DayWindow, show_completed: bool) -> ZoneLists {
        zone::zone_lists(&self.board, window, show_completed)
    }

    pub fn focus_snapshot(&self, now: DateTime<Utc>) -> Event {
        self.focus.snapshot(now, &self.board)
    }

    // ── Tasks ────────────────────────────────────────────────────────

    /// Mark a task done, optionally recording how long it took.
    pub fn complete_task(
        &mut self,
        id: TaskId,
        actual_minutes: Option<u32>,
        now: DateTime<Utc>,
    ) -> Result<Vec<Event>, BoardError> {
        let task = self.board.task_mut(id).ok_or(BoardError::TaskNotFound(id))?;
        task.completed = true;
        if let Some(minutes) = actual_minutes.filter(|m| *m > 0) {
            task.actual_minutes = Some(minutes);
        }
        Ok(self.focus.stop_if_focused(id, StopReason::Completed, now).into_iter().collect())
    }

    pub fn toggle_task(&mut self, id: TaskId, now: DateTime<Utc>) -> Result<Vec<Event>, BoardError> {
        let completed = self.board.toggle_completed(id)?;
        if !completed {
            return Ok(Vec::new());
        }
        Ok(self.focus.stop_if_focused(id, StopReason::Completed, now).into_iter().collect())
    }

    pub fn delete_task(&mut self, id: TaskId, now: DateTime<Utc>) -> Result<Vec<Event>, BoardError> {
        self.board.delete_task(id)?;
        Ok(self.focus.stop_if_focused(id, StopReason::Deleted, now).into_iter().collect())
    }

    pub fn delete_group(&mut self, id: GroupId, now: DateTime<Utc>) -> Result<Vec<Event>, BoardError> {
        let (_, group) = self.board.remove_group(id)?;
        Ok(self.stop_if_any(group.tasks.iter().map(|t| t.id), StopReason::GroupRemoved, now))
    }

    // ── Archive ──────────────────────────────────────────────────────

    pub fn archive_completed(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        let ids = self.archive.archive_completed(&mut self.board, now);
        self.archived_events(ids, now)
    }

    pub fn archive_group(&mut self, id: GroupId, now: DateTime<Utc>) -> Result<Vec<Event>, BoardError> {
        let ids = self.archive.archive_group(&mut self.board, id, now)?;
        Ok(self.archived_events(ids, now))
    }

    pub fn restore_archived(&mut self, index: usize) -> Result<TaskId, ArchiveError> {
        self.archive.restore(&mut self.board, index)
    }

    fn archived_events(&mut self, ids: Vec<TaskId>, now: DateTime<Utc>) -> Vec<Event> {
        let mut events = self.stop_if_any(ids.iter().copied(), StopReason::Archived, now);
        if !ids.is_empty() {
            events.push(Event::TasksArchived {
                count: ids.len(),
                at: now,
            });
        }
        events
    }

    fn stop_if_any(
        &mut self,
        mut ids: impl Iterator<Item = TaskId>,
        reason: StopReason,
        now: DateTime<Utc>,
    ) -> Vec<Event> {
        match self.focus.active_task() {
            Some(active) if ids.any(|id| id == active) => {
                self.focus.stop(reason, now).into_iter().collect()
            }
            _ => Vec::new(),
        }
    }

    // ── Focus ────────────────────────────────────────────────────────

    /// Start focusing on an existing task. `url` may omit its scheme.
    pub fn start_focus(
        &mut self,
        task_id: TaskId,
        interval: AlertInterval,
        url: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Event, FocusError> {
        if self.board.task(task_id).is_none() {
            return Err(FocusError::UnknownTask(task_id));
        }
        let url = match url {
            Some(raw) => normalize_url(raw)?,
            None => None,
        };
        let event = self.focus.start(task_id, interval, url.clone(), now)?;
        if let Some(url) = url {
            self.remember_url(url);
        }
        Ok(event)
    }

    pub fn stop_focus(&mut self, now: DateTime<Utc>) -> Option<Event> {
        self.focus.stop(StopReason::User, now)
    }

    pub fn focus_tick(&mut self, now: DateTime<Utc>) -> Option<Event> {
        self.focus.tick(now, &self.board)
    }

    /// Self-heal check for read-only callers; never fires an alert.
    pub fn validate_focus(&mut self, now: DateTime<Utc>) -> Option<Event> {
        self.focus.validate(now, &self.board)
    }

    pub fn resume_focus(&mut self, now: DateTime<Utc>) -> Option<Event> {
        self.focus.resume(now, &self.board)
    }

    fn remember_url(&mut self, url: String) {
        if self.saved_urls.contains(&url) {
            return;
        }
        self.saved_urls.push(url);
        if self.saved_urls.len() > SAVED_URL_LIMIT {
            let excess = self.saved_urls.len() - SAVED_URL_LIMIT;
            self.saved_urls.drain(..excess);
        }
    }

    // ── Zones ────────────────────────────────────────────────────────

    /// One-time pass giving every unzoned task a zone.
    pub fn migrate_zones_once(&mut self, window: &DayWindow, now: DateTime<Utc>) -> Option<Event> {
        if self.zones_migrated {
            return None;
        }
        let changed = zone::migrate_zones(&mut self.board, window);
        self.zones_migrated = true;
        debug!(changed, "zone migration complete");
        Some(Event::ZonesMigrated { changed, at: now })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{Section, Task, Zone};
    use chrono::{Duration, NaiveDate, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 9, 0, 0).unwrap()
    }

    fn state_with_task() -> (AppState, GroupId, TaskId) {
        let mut state = AppState::new();
        let g = state.board.add_group(Section::Today, "Work").unwrap();
        let t = state.board.add_task(g, Task::new("write")).unwrap();
        (state, g, t)
    }

    fn focused() -> (AppState, GroupId, TaskId) {
        let (mut state, g, t) = state_with_task();
        state
            .start_focus(t, AlertInterval::default(), None, now())
            .unwrap();
        (state, g, t)
    }

    fn stopped_with(events: &[Event]) -> Option<StopReason> {
        events.iter().find_map(|e| match e {
            Event::FocusStopped { reason, .. } => Some(*reason),
            _ => None,
        })
    }

    #[test]
    fn url_normalization() {
        assert_eq!(normalize_url("  "), Ok(None));
        assert_eq!(
            normalize_url("example.com/docs"),
            Ok(Some("https://example.com/docs".into()))
        );
        assert_eq!(
            normalize_url("http://localhost:3000"),
            Ok(Some("http://localhost:3000".into()))
        );
        assert!(matches!(
            normalize_url("exa mple.com"),
            Err(ValidationError::InvalidUrl(_))
        ));
    }

    #[test]
    fn start_focus_rejects_unknown_task_and_bad_url() {
        let (mut state, _, t) = state_with_task();
        let ghost = TaskId::new();
        assert_eq!(
            state.start_focus(ghost, AlertInterval::default(), None, now()),
            Err(FocusError::UnknownTask(ghost))
        );
        assert!(matches!(
            state.start_focus(t, AlertInterval::default(), Some("bad url"), now()),
            Err(FocusError::Validation(ValidationError::InvalidUrl(_)))
        ));
        assert!(!state.focus.is_running());
    }

    #[test]
    fn saved_urls_keep_the_ten_most_recent() {
        let (mut state, g, _) = state_with_task();
        for i in 0..12 {
            let t = state.board.add_task(g, Task::new(format!("t{i}"))).unwrap();
            let url = format!("site{i}.com");
            state
                .start_focus(t, AlertInterval::default(), Some(&url), now())
                .unwrap();
            state.stop_focus(now());
        }
        let t = state.board.add_task(g, Task::new("again")).unwrap();
        state
            .start_focus(t, AlertInterval::default(), Some("site11.com"), now())
            .unwrap();

        assert_eq!(state.saved_urls.len(), SAVED_URL_LIMIT);
        assert_eq!(state.saved_urls[0], "https://site2.com");
        assert_eq!(state.saved_urls[9], "https://site11.com");
    }

    #[test]
    fn completing_focused_task_stops_focus() {
        let (mut state, _, t) = focused();
        let events = state.complete_task(t, Some(25), now()).unwrap();
        assert_eq!(stopped_with(&events), Some(StopReason::Completed));
        assert_eq!(state.board.task(t).unwrap().actual_minutes, Some(25));
        assert!(!state.focus.is_running());
    }

    #[test]
    fn untoggling_does_not_stop_other_focus() {
        let (mut state, g, t) = focused();
        let other = state.board.add_task(g, Task::new("other")).unwrap();
        state.board.set_completed(other, true).unwrap();
        assert!(state.toggle_task(other, now()).unwrap().is_empty());
        assert!(state.toggle_task(other, now()).unwrap().is_empty());
        assert_eq!(state.focus.active_task(), Some(t));
    }

    #[test]
    fn deleting_task_or_group_stops_focus() {
        let (mut state, _, t) = focused();
        let events = state.delete_task(t, now()).unwrap();
        assert_eq!(stopped_with(&events), Some(StopReason::Deleted));

        let (mut state, g, _) = focused();
        let events = state.delete_group(g, now()).unwrap();
        assert_eq!(stopped_with(&events), Some(StopReason::GroupRemoved));
        assert!(state.board.today.is_empty());
    }

    #[test]
    fn archiving_focused_task_stops_focus() {
        let (mut state, _, t) = focused();
        state.board.set_completed(t, true).unwrap();
        let events = state.archive_completed(now());
        assert_eq!(stopped_with(&events), Some(StopReason::Archived));
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::TasksArchived { count: 1, .. })));

        let (mut state, g, _) = focused();
        let events = state.archive_group(g, now()).unwrap();
        assert_eq!(stopped_with(&events), Some(StopReason::Archived));
        assert_eq!(state.archive.len(), 2);
    }

    #[test]
    fn tick_and_resume_go_through_the_board() {
        let (mut state, _, t) = focused();
        assert!(state.focus_tick(now() + Duration::minutes(9)).is_none());
        assert!(state.focus_tick(now() + Duration::minutes(10)).is_some());

        let resumed = state.resume_focus(now() + Duration::hours(2)).unwrap();
        assert!(matches!(resumed, Event::FocusResumed { task_id, .. } if task_id == t));
    }

    #[test]
    fn zone_migration_runs_once() {
        let (mut state, g, t) = state_with_task();
        let today = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        let window = DayWindow::new(today);
        let late = state
            .board
            .add_task(g, Task::new("late").blocking())
            .unwrap();

        let event = state.migrate_zones_once(&window, now());
        assert!(matches!(event, Some(Event::ZonesMigrated { changed: 2, .. })));
        assert_eq!(state.board.task(t).unwrap().zone, Zone::Inbox);
        assert_eq!(state.board.task(late).unwrap().zone, Zone::Critical);

        state.board.task_mut(t).unwrap().zone = Zone::Unset;
        assert!(state.migrate_zones_once(&window, now()).is_none());
        assert_eq!(state.board.task(t).unwrap().zone, Zone::Unset);
    }

    #[test]
    fn document_round_trips_through_json() {
        let (mut state, _, _) = focused();
        state.notes.add("remember", &["ideas".into()], now());
        let json = serde_json::to_string(&state).unwrap();
        let back: AppState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);

        let empty: AppState = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, AppState::new());
    }
}
