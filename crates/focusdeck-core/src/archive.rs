//! Archive of finished tasks and retired projects.
//!
//! Archiving moves tasks out of the board into a flat list. Restoring puts
//! a task back into its original project as a fresh, incomplete task.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::board::TaskBoard;
use crate::error::{ArchiveError, BoardError};
use crate::task::{Group, GroupId, Section, Task, TaskId};

/// A task that was archived, with where it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchivedTask {
    #[serde(flatten)]
    pub task: Task,
    pub archived_at: DateTime<Utc>,
    pub original_project: String,
    pub original_section: Section,
    /// Archived as part of a whole project rather than on its own.
    #[serde(default)]
    pub project_archived: bool,
}

/// Marker left when a whole project is archived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchivedProject {
    pub group_name: String,
    pub original_section: Section,
    pub task_count: usize,
    pub completed_count: usize,
    pub archived_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ArchiveEntry {
    Task(ArchivedTask),
    Project(ArchivedProject),
}

impl ArchiveEntry {
    pub fn archived_at(&self) -> DateTime<Utc> {
        match self {
            ArchiveEntry::Task(t) => t.archived_at,
            ArchiveEntry::Project(p) => p.archived_at,
        }
    }

    pub fn title(&self) -> String {
        match self {
            ArchiveEntry::Task(t) => t.task.title.clone(),
            ArchiveEntry::Project(p) => format!("[Project: {}]", p.group_name),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Archive {
    entries: Vec<ArchiveEntry>,
}

impl Archive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Archive every completed task. Groups this call empties are removed;
    /// groups that were already empty stay. Returns the archived task ids.
    pub fn archive_completed(&mut self, board: &mut TaskBoard, now: DateTime<Utc>) -> Vec<TaskId> {
        let mut archived = Vec::new();
        for section in Section::ALL {
            let groups = board.section_mut(section);
            let mut emptied = Vec::new();
            for group in groups.iter_mut() {
                let (done, open): (Vec<Task>, Vec<Task>) =
                    std::mem::take(&mut group.tasks).into_iter().partition(|t| t.completed);
                group.tasks = open;
                if !done.is_empty() && group.tasks.is_empty() {
                    emptied.push(group.id);
                }
                for task in done {
                    archived.push(task.id);
                    self.entries.push(ArchiveEntry::Task(ArchivedTask {
                        task,
                        archived_at: now,
                        original_project: group.group_name.clone(),
                        original_section: section,
                        project_archived: false,
                    }));
                }
            }
            groups.retain(|g| !emptied.contains(&g.id));
        }
        if !archived.is_empty() {
            info!(count = archived.len(), "archived completed tasks");
        }
        archived
    }

    /// Archive a whole project. Returns the ids of the tasks it held.
    pub fn archive_group(
        &mut self,
        board: &mut TaskBoard,
        id: GroupId,
        now: DateTime<Utc>,
    ) -> Result<Vec<TaskId>, BoardError> {
        let (section, group) = board.remove_group(id)?;
        let Group {
            group_name, tasks, ..
        } = group;
        let task_count = tasks.len();
        let completed_count = tasks.iter().filter(|t| t.completed).count();
        let ids = tasks.iter().map(|t| t.id).collect();

        self.entries.extend(tasks.into_iter().map(|task| {
            ArchiveEntry::Task(ArchivedTask {
                task,
                archived_at: now,
                original_project: group_name.clone(),
                original_section: section,
                project_archived: true,
            })
        }));
        if task_count > 0 {
            self.entries.push(ArchiveEntry::Project(ArchivedProject {
                group_name: group_name.clone(),
                original_section: section,
                task_count,
                completed_count,
                archived_at: now,
            }));
        }
        info!(project = %group_name, task_count, "archived project");
        Ok(ids)
    }

    /// Put an archived task back on the board, incomplete, keeping only its
    /// title, due date and subtasks.
    pub fn restore(&mut self, board: &mut TaskBoard, index: usize) -> Result<TaskId, ArchiveError> {
        match self.entries.get(index) {
            None => return Err(ArchiveError::NotFound(index)),
            Some(ArchiveEntry::Project(_)) => return Err(ArchiveError::NotRestorable(index)),
            Some(ArchiveEntry::Task(_)) => {}
        }
        let ArchiveEntry::Task(archived) = self.entries.remove(index) else {
            return Err(ArchiveError::NotRestorable(index));
        };

        let mut restored = Task::new(archived.task.title);
        restored.due_date = archived.task.due_date;
        restored.subtasks = archived.task.subtasks;
        let id = restored.id;

        let groups = board.section_mut(archived.original_section);
        match groups
            .iter_mut()
            .find(|g| g.group_name == archived.original_project)
        {
            Some(group) => group.tasks.push(restored),
            None => {
                let mut group = Group::new(archived.original_project);
                group.tasks.push(restored);
                groups.push(group);
            }
        }
        Ok(id)
    }

    /// Drop everything. Returns how many entries were removed.
    pub fn clear(&mut self) -> usize {
        let n = self.entries.len();
        self.entries.clear();
        n
    }
}
