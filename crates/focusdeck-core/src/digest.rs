//! Daily digest and board statistics.

use chrono::NaiveDate;
use serde::Serialize;

use crate::board::{TaskBoard, TaskEntry};
use crate::task::{EmotionalWeight, Section, Task, TaskId, TaskStatus};
use crate::zone::DayWindow;

#[derive(Debug, Clone, Serialize)]
pub struct DigestItem {
    pub task_id: TaskId,
    pub title: String,
    pub group_name: String,
    pub due_date: Option<NaiveDate>,
}

impl From<&TaskEntry<'_>> for DigestItem {
    fn from(e: &TaskEntry<'_>) -> Self {
        Self {
            task_id: e.task.id,
            title: e.task.title.clone(),
            group_name: e.group.group_name.clone(),
            due_date: e.task.due_date,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DigestSummary {
    pub total_active: usize,
    pub due_tomorrow: usize,
    pub overdue: usize,
    pub needs_attention: usize,
    pub rest: usize,
}

/// Incomplete tasks sorted into buckets. Every active task lands in
/// exactly one of them.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DailyDigest {
    pub due_tomorrow: Vec<DigestItem>,
    pub overdue: Vec<DigestItem>,
    pub needs_attention: Vec<DigestItem>,
    pub rest_today: Vec<DigestItem>,
    pub rest_longterm: Vec<DigestItem>,
    pub summary: DigestSummary,
}

fn needs_attention(task: &Task) -> bool {
    task.status == Some(TaskStatus::InProgress)
        || task.emotional_weight == Some(EmotionalWeight::Heavy)
        || task.has_tag("urgent")
}

pub fn daily_digest(board: &TaskBoard, window: &DayWindow) -> DailyDigest {
    let mut digest = DailyDigest::default();
    for entry in board.iter_tasks().filter(|e| !e.task.completed) {
        let item = DigestItem::from(&entry);
        let due = entry.task.due_date;
        if due == Some(window.tomorrow) {
            digest.due_tomorrow.push(item);
        } else if due.is_some_and(|d| d < window.today) {
            digest.overdue.push(item);
        } else if needs_attention(entry.task) {
            digest.needs_attention.push(item);
        } else {
            match entry.section {
                Section::Today => digest.rest_today.push(item),
                Section::Longterm => digest.rest_longterm.push(item),
            }
        }
    }
    digest.summary = DigestSummary {
        total_active: digest.due_tomorrow.len()
            + digest.overdue.len()
            + digest.needs_attention.len()
            + digest.rest_today.len()
            + digest.rest_longterm.len(),
        due_tomorrow: digest.due_tomorrow.len(),
        overdue: digest.overdue.len(),
        needs_attention: digest.needs_attention.len(),
        rest: digest.rest_today.len() + digest.rest_longterm.len(),
    };
    digest
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardStats {
    pub total: usize,
    pub completed: usize,
    pub completed_today: usize,
    /// Rounded percent, 0 on an empty board.
    pub completion_rate: u32,
    pub active_projects: usize,
    pub today_progress: u32,
    pub longterm_progress: u32,
}

fn percent(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    ((part as f64 / whole as f64) * 100.0).round() as u32
}

pub fn board_stats(board: &TaskBoard) -> BoardStats {
    let count = |section: Section| {
        board
            .section(section)
            .iter()
            .flat_map(|g| &g.tasks)
            .fold((0, 0), |(total, done), t| (total + 1, done + usize::from(t.completed)))
    };
    let (today_total, today_done) = count(Section::Today);
    let (long_total, long_done) = count(Section::Longterm);
    let total = today_total + long_total;
    let completed = today_done + long_done;

    BoardStats {
        total,
        completed,
        completed_today: today_done,
        completion_rate: percent(completed, total),
        active_projects: board.longterm.len(),
        today_progress: percent(today_done, today_total),
        longterm_progress: percent(long_done, long_total),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 4, day).unwrap()
    }

    #[test]
    fn buckets_are_exclusive() {
        let mut board = TaskBoard::new();
        let g = board.add_group(Section::Today, "Work").unwrap();
        let l = board.add_group(Section::Longterm, "Life").unwrap();

        let mut heavy_due = Task::new("heavy and due").due(d(11));
        heavy_due.emotional_weight = Some(EmotionalWeight::Heavy);
        board.add_task(g, heavy_due).unwrap();
        board.add_task(g, Task::new("late").due(d(2))).unwrap();
        let mut urgent = Task::new("urgent");
        urgent.tags.push("Urgent".into());
        board.add_task(g, urgent).unwrap();
        board.add_task(g, Task::new("plain today").due(d(10))).unwrap();
        board.add_task(l, Task::new("plain later")).unwrap();
        let done = board.add_task(l, Task::new("done").due(d(1))).unwrap();
        board.set_completed(done, true).unwrap();

        let digest = daily_digest(&board, &DayWindow::new(d(10)));
        assert_eq!(digest.due_tomorrow[0].title, "heavy and due");
        assert_eq!(digest.overdue[0].title, "late");
        assert_eq!(digest.needs_attention.len(), 1);
        assert_eq!(digest.rest_today[0].title, "plain today");
        assert_eq!(digest.rest_longterm[0].title, "plain later");
        assert_eq!(digest.summary.total_active, 5);
        assert_eq!(digest.summary.rest, 2);
    }

    #[test]
    fn stats_round_percentages() {
        let mut board = TaskBoard::new();
        assert_eq!(board_stats(&board).completion_rate, 0);

        let g = board.add_group(Section::Today, "A").unwrap();
        let l = board.add_group(Section::Longterm, "B").unwrap();
        board.add_group(Section::Longterm, "C").unwrap();
        let a = board.add_task(g, Task::new("a")).unwrap();
        board.add_task(g, Task::new("b")).unwrap();
        board.add_task(g, Task::new("c")).unwrap();
        let d = board.add_task(l, Task::new("d")).unwrap();
        board.set_completed(a, true).unwrap();
        board.set_completed(d, true).unwrap();

        let stats = board_stats(&board);
        assert_eq!(
            stats,
            BoardStats {
                total: 4,
                completed: 2,
                completed_today: 1,
                completion_rate: 50,
                active_projects: 2,
                today_progress: 33,
                longterm_progress: 100,
            }
        );
    }
}
