//! Zone triage: which of critical / focus / inbox a task shows up in.
//!
//! Two separate concerns live here:
//!
//! - **Display membership** ([`classify_for_display`], [`zone_lists`]):
//!   a task can qualify for critical without `zone == critical`, and the
//!   focus list is an overlay on top of whatever zone the task has.
//! - **Assignment** ([`assign_zone`], [`migrate_zones`]): writes a zone
//!   onto tasks that have none. A recognized zone is never overwritten.
//!
//! All date checks use calendar days; time of day never matters.

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use tracing::{debug, info};

use crate::board::{TaskBoard, TaskEntry};
use crate::task::{Section, Task, TaskId, Zone};

/// External deadlines this many days out (inclusive) make a task critical.
pub const CRITICAL_DEADLINE_DAYS: i64 = 3;

/// The focus list renders at most this many tasks.
pub const FOCUS_DISPLAY_LIMIT: usize = 7;

/// "Today" and "tomorrow" as calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub today: NaiveDate,
    pub tomorrow: NaiveDate,
}

impl DayWindow {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            tomorrow: today + Duration::days(1),
        }
    }

    fn is_today_or_tomorrow(&self, day: NaiveDate) -> bool {
        day == self.today || day == self.tomorrow
    }
}

/// Whether `deadline` falls between today and `days` days from now,
/// inclusive. Past deadlines do not count.
pub fn deadline_within_days(deadline: NaiveDate, today: NaiveDate, days: i64) -> bool {
    let diff = (deadline - today).num_days();
    (0..=days).contains(&diff)
}

/// The critical rule without the explicit-zone term.
pub fn meets_critical_criteria(task: &Task, window: &DayWindow) -> bool {
    if task.is_blocking {
        return true;
    }
    if task
        .external_deadline
        .is_some_and(|d| deadline_within_days(d, window.today, CRITICAL_DEADLINE_DAYS))
    {
        return true;
    }
    task.due_date.is_some_and(|d| window.is_today_or_tomorrow(d)) && task.is_blocking
}

/// Critical list membership.
pub fn is_critical(task: &Task, window: &DayWindow) -> bool {
    task.zone == Zone::Critical || meets_critical_criteria(task, window)
}

/// Which lists a task belongs to. Not exclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ZoneMembership {
    pub critical: bool,
    pub focus: bool,
    pub inbox: bool,
}

impl ZoneMembership {
    pub fn none() -> Self {
        Self::default()
    }
}

pub fn classify_for_display(task: &Task, window: &DayWindow, show_completed: bool) -> ZoneMembership {
    if task.completed && !show_completed {
        return ZoneMembership::none();
    }
    // Unrecognized strings count as unset here.
    let unzoned = !task.zone.is_recognized();
    ZoneMembership {
        critical: is_critical(task, window),
        focus: task.is_in_focus,
        inbox: task.zone == Zone::Inbox
            || (unzoned && !task.is_in_focus && !meets_critical_criteria(task, window)),
    }
}

/// A task reference in a rendered zone list.
#[derive(Debug, Clone, Serialize)]
pub struct ZoneItem {
    pub task_id: TaskId,
    pub title: String,
    pub section: Section,
    pub group_name: String,
    pub completed: bool,
}

impl From<&TaskEntry<'_>> for ZoneItem {
    fn from(e: &TaskEntry<'_>) -> Self {
        Self {
            task_id: e.task.id,
            title: e.task.title.clone(),
            section: e.section,
            group_name: e.group.group_name.clone(),
            completed: e.task.completed,
        }
    }
}

/// The three zone lists in traversal order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ZoneLists {
    pub critical: Vec<ZoneItem>,
    /// Truncated to [`FOCUS_DISPLAY_LIMIT`].
    pub focus: Vec<ZoneItem>,
    /// Qualifying focus tasks before truncation.
    pub focus_total: usize,
    pub inbox: Vec<ZoneItem>,
}

pub fn zone_lists(board: &TaskBoard, window: &DayWindow, show_completed: bool) -> ZoneLists {
    let mut lists = ZoneLists::default();
    for entry in board.iter_tasks() {
        let m = classify_for_display(entry.task, window, show_completed);
        if m.critical {
            lists.critical.push(ZoneItem::from(&entry));
        }
        if m.focus {
            lists.focus_total += 1;
            if lists.focus.len() < FOCUS_DISPLAY_LIMIT {
                lists.focus.push(ZoneItem::from(&entry));
            }
        }
        if m.inbox {
            lists.inbox.push(ZoneItem::from(&entry));
        }
    }
    lists
}

/// Give an unzoned task a zone. Returns whether it wrote one.
///
/// Priority: critical criteria, then the focus flag, then inbox.
pub fn assign_zone(task: &mut Task, window: &DayWindow) -> bool {
    if task.zone.is_recognized() {
        return false;
    }
    let zone = if meets_critical_criteria(task, window) {
        Zone::Critical
    } else if task.is_in_focus {
        Zone::Focus
    } else {
        Zone::Inbox
    };
    debug!(task = %task.id, from = %task.zone, to = %zone, "assigned zone");
    task.zone = zone;
    true
}

/// Run [`assign_zone`] over every task with no zone at all. Unrecognized
/// zone strings are left as stored. Returns how many tasks changed.
pub fn migrate_zones(board: &mut TaskBoard, window: &DayWindow) -> usize {
    let changed = board
        .tasks_mut()
        .filter(|task| task.zone.is_unset())
        .map(|task| assign_zone(task, window))
        .filter(|changed| *changed)
        .count();
    if changed > 0 {
        info!(changed, "migrated tasks to zones");
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Section;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn window() -> DayWindow {
        DayWindow::new(day(2026, 3, 10))
    }

    #[test]
    fn deadline_window_is_inclusive_and_ignores_past() {
        let today = day(2026, 3, 10);
        assert!(deadline_within_days(today, today, 3));
        assert!(deadline_within_days(day(2026, 3, 13), today, 3));
        assert!(!deadline_within_days(day(2026, 3, 14), today, 3));
        assert!(!deadline_within_days(day(2026, 3, 9), today, 3));
    }

    #[test]
    fn blocking_is_always_critical() {
        let task = Task::new("x").blocking().with_zone(Zone::Inbox);
        assert!(classify_for_display(&task, &window(), true).critical);
    }

    #[test]
    fn due_tomorrow_and_blocking_is_critical() {
        let task = Task::new("x").due(day(2026, 3, 11)).blocking();
        assert!(is_critical(&task, &window()));
    }

    #[test]
    fn due_tomorrow_alone_is_not_critical() {
        let task = Task::new("x").due(day(2026, 3, 11));
        let m = classify_for_display(&task, &window(), true);
        assert!(!m.critical);
        assert!(m.inbox);
    }

    #[test]
    fn external_deadline_edges() {
        let near = Task::new("x").external_deadline(day(2026, 3, 12));
        let far = Task::new("x").external_deadline(day(2026, 3, 14));
        let past = Task::new("x").external_deadline(day(2026, 3, 1));
        assert!(is_critical(&near, &window()));
        assert!(!is_critical(&far, &window()));
        assert!(!is_critical(&past, &window()));
    }

    #[test]
    fn explicit_inbox_stays_in_inbox_while_in_focus() {
        let task = Task::new("x").with_zone(Zone::Inbox).in_focus();
        let m = classify_for_display(&task, &window(), true);
        assert!(m.inbox && m.focus);
        assert!(!m.critical);
    }

    #[test]
    fn unzoned_focus_task_is_not_inbox() {
        let task = Task::new("x").in_focus();
        let m = classify_for_display(&task, &window(), true);
        assert_eq!(
            m,
            ZoneMembership {
                critical: false,
                focus: true,
                inbox: false
            }
        );
    }

    #[test]
    fn unrecognized_zone_is_treated_as_unset_for_display() {
        let task = Task::new("x").with_zone(Zone::Unrecognized("someday".into()));
        assert!(classify_for_display(&task, &window(), true).inbox);
    }

    #[test]
    fn completed_tasks_hidden_unless_shown() {
        let mut task = Task::new("x").blocking().in_focus();
        task.completed = true;
        assert_eq!(classify_for_display(&task, &window(), false), ZoneMembership::none());
        let shown = classify_for_display(&task, &window(), true);
        assert!(shown.critical && shown.focus);
    }

    #[test]
    fn assign_zone_priority_and_stickiness() {
        let w = window();
        let mut crit = Task::new("a").blocking().in_focus();
        let mut foc = Task::new("b").in_focus();
        let mut inbox = Task::new("c");
        assert!(assign_zone(&mut crit, &w));
        assert!(assign_zone(&mut foc, &w));
        assert!(assign_zone(&mut inbox, &w));
        assert_eq!(crit.zone, Zone::Critical);
        assert_eq!(foc.zone, Zone::Focus);
        assert_eq!(inbox.zone, Zone::Inbox);

        inbox.is_blocking = true;
        assert!(!assign_zone(&mut inbox, &w));
        assert_eq!(inbox.zone, Zone::Inbox);
    }

    #[test]
    fn assign_zone_overwrites_unrecognized() {
        let mut task = Task::new("x").with_zone(Zone::Unrecognized("later".into()));
        assert!(assign_zone(&mut task, &window()));
        assert_eq!(task.zone, Zone::Inbox);
    }

    #[test]
    fn focus_list_is_capped_but_counted() {
        let mut board = TaskBoard::new();
        let g = board.add_group(Section::Longterm, "Many").unwrap();
        let first = board.add_group(Section::Today, "First").unwrap();
        for i in 0..9 {
            board.add_task(g, Task::new(format!("lt{i}")).in_focus()).unwrap();
        }
        board.add_task(first, Task::new("today").in_focus()).unwrap();

        let lists = zone_lists(&board, &window(), true);
        assert_eq!(lists.focus.len(), FOCUS_DISPLAY_LIMIT);
        assert_eq!(lists.focus_total, 10);
        assert_eq!(lists.focus[0].title, "today");
        assert_eq!(board.iter_tasks().filter(|e| e.task.is_in_focus).count(), 10);
    }

    #[test]
    fn migration_is_idempotent() {
        let mut board = TaskBoard::new();
        let g = board.add_group(Section::Today, "P").unwrap();
        board.add_task(g, Task::new("a")).unwrap();
        board.add_task(g, Task::new("b").blocking()).unwrap();
        board.add_task(g, Task::new("c").with_zone(Zone::Focus)).unwrap();

        assert_eq!(migrate_zones(&mut board, &window()), 2);
        let snapshot = board.clone();
        assert_eq!(migrate_zones(&mut board, &window()), 0);
        assert_eq!(board, snapshot);
    }

    #[test]
    fn migration_keeps_unrecognized_zone_strings() {
        let mut board = TaskBoard::new();
        let g = board.add_group(Section::Today, "P").unwrap();
        let kept = board
            .add_task(g, Task::new("later").with_zone(Zone::Unrecognized("someday".into())))
            .unwrap();
        let fresh = board.add_task(g, Task::new("new")).unwrap();

        assert_eq!(migrate_zones(&mut board, &window()), 1);
        assert_eq!(board.task(kept).unwrap().zone, Zone::Unrecognized("someday".into()));
        assert_eq!(board.task(fresh).unwrap().zone, Zone::Inbox);
    }
}
