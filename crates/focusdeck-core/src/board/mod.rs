//! The task board: sections of groups of tasks.
//!
//! This is the task store the classifier and focus timer read from. All
//! addressing is by [`TaskId`] / [`GroupId`]; positions are resolved on
//! demand so reordering never invalidates a reference.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{BoardError, ValidationError};
use crate::task::{Group, GroupId, Section, Subtask, Task, TaskId, TaskStatus, Zone};

/// Group that receives tasks moved between sections or added without a project.
pub const QUICK_TASKS_GROUP: &str = "Quick Tasks";

/// Where a task currently sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskLocation {
    pub section: Section,
    pub group_index: usize,
    pub task_index: usize,
}

/// A task together with its position, yielded in traversal order.
#[derive(Debug, Clone, Copy)]
pub struct TaskEntry<'a> {
    pub section: Section,
    pub group_index: usize,
    pub task_index: usize,
    pub group: &'a Group,
    pub task: &'a Task,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TaskBoard {
    #[serde(default)]
    pub today: Vec<Group>,
    #[serde(default)]
    pub longterm: Vec<Group>,
}

impl TaskBoard {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn section(&self, section: Section) -> &[Group] {
        match section {
            Section::Today => &self.today,
            Section::Longterm => &self.longterm,
        }
    }

    pub fn section_mut(&mut self, section: Section) -> &mut Vec<Group> {
        match section {
            Section::Today => &mut self.today,
            Section::Longterm => &mut self.longterm,
        }
    }

    /// All groups, today's first.
    pub fn groups(&self) -> impl Iterator<Item = (Section, usize, &Group)> {
        Section::ALL.into_iter().flat_map(move |section| {
            self.section(section)
                .iter()
                .enumerate()
                .map(move |(i, g)| (section, i, g))
        })
    }

    /// Every task: section today before longterm, then group and task order.
    pub fn iter_tasks(&self) -> impl Iterator<Item = TaskEntry<'_>> {
        self.groups().flat_map(|(section, group_index, group)| {
            group
                .tasks
                .iter()
                .enumerate()
                .map(move |(task_index, task)| TaskEntry {
                    section,
                    group_index,
                    task_index,
                    group,
                    task,
                })
        })
    }

    pub fn tasks_mut(&mut self) -> impl Iterator<Item = &mut Task> {
        self.today
            .iter_mut()
            .chain(self.longterm.iter_mut())
            .flat_map(|g| g.tasks.iter_mut())
    }

    pub fn task_count(&self) -> usize {
        self.groups().map(|(_, _, g)| g.tasks.len()).sum()
    }

    pub fn find_task(&self, id: TaskId) -> Option<TaskLocation> {
        self.iter_tasks().find(|e| e.task.id == id).map(|e| TaskLocation {
            section: e.section,
            group_index: e.group_index,
            task_index: e.task_index,
        })
    }

    pub fn find_group(&self, id: GroupId) -> Option<(Section, usize)> {
        self.groups()
            .find(|(_, _, g)| g.id == id)
            .map(|(section, i, _)| (section, i))
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.iter_tasks().find(|e| e.task.id == id).map(|e| e.task)
    }

    pub fn task_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        self.tasks_mut().find(|t| t.id == id)
    }

    pub fn group(&self, id: GroupId) -> Option<&Group> {
        self.groups().find(|(_, _, g)| g.id == id).map(|(_, _, g)| g)
    }

    pub fn group_mut(&mut self, id: GroupId) -> Option<&mut Group> {
        let (section, index) = self.find_group(id)?;
        self.section_mut(section).get_mut(index)
    }

    /// The group owning a task.
    pub fn group_of(&self, id: TaskId) -> Option<&Group> {
        self.iter_tasks().find(|e| e.task.id == id).map(|e| e.group)
    }

    /// Resolve a user-typed id prefix to exactly one task.
    pub fn resolve_task(&self, prefix: &str) -> Result<TaskId, BoardError> {
        let mut hits = self
            .iter_tasks()
            .filter(|e| e.task.id.matches_prefix(prefix))
            .map(|e| e.task.id);
        match (hits.next(), hits.next()) {
            (Some(id), None) => Ok(id),
            (Some(_), Some(_)) => Err(BoardError::Ambiguous(prefix.to_string())),
            (None, _) => Err(BoardError::NoMatch(prefix.to_string())),
        }
    }

    /// Resolve an id prefix or exact (case-insensitive) name to one group.
    pub fn resolve_group(&self, needle: &str) -> Result<GroupId, BoardError> {
        let by_name: Vec<GroupId> = self
            .groups()
            .filter(|(_, _, g)| g.group_name.eq_ignore_ascii_case(needle.trim()))
            .map(|(_, _, g)| g.id)
            .collect();
        let hits = if by_name.is_empty() {
            self.groups()
                .filter(|(_, _, g)| g.id.matches_prefix(needle))
                .map(|(_, _, g)| g.id)
                .collect()
        } else {
            by_name
        };
        match hits.as_slice() {
            [id] => Ok(*id),
            [] => Err(BoardError::NoMatch(needle.to_string())),
            _ => Err(BoardError::Ambiguous(needle.to_string())),
        }
    }

    // ── Groups ───────────────────────────────────────────────────────

    pub fn add_group(&mut self, section: Section, name: &str) -> Result<GroupId, BoardError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::Empty("project name").into());
        }
        let group = Group::new(name);
        let id = group.id;
        self.section_mut(section).push(group);
        Ok(id)
    }

    pub fn rename_group(&mut self, id: GroupId, name: &str) -> Result<(), BoardError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::Empty("project name").into());
        }
        let group = self.group_mut(id).ok_or(BoardError::GroupNotFound(id))?;
        group.group_name = name.to_string();
        Ok(())
    }

    /// Remove a group and everything in it.
    pub fn remove_group(&mut self, id: GroupId) -> Result<(Section, Group), BoardError> {
        let (section, index) = self.find_group(id).ok_or(BoardError::GroupNotFound(id))?;
        Ok((section, self.section_mut(section).remove(index)))
    }

    /// Move a whole group to the end of the other section.
    pub fn move_group(&mut self, id: GroupId) -> Result<Section, BoardError> {
        let (from, group) = self.remove_group(id)?;
        let to = from.other();
        self.section_mut(to).push(group);
        debug!(group = %id, %from, %to, "moved project");
        Ok(to)
    }

    /// Drag-and-drop reorder of a group within its section.
    pub fn reorder_group(&mut self, id: GroupId, new_index: usize) -> Result<(), BoardError> {
        let (section, index) = self.find_group(id).ok_or(BoardError::GroupNotFound(id))?;
        let groups = self.section_mut(section);
        let group = groups.remove(index);
        let target = new_index.min(groups.len());
        groups.insert(target, group);
        Ok(())
    }

    // ── Tasks ────────────────────────────────────────────────────────

    pub fn add_task(&mut self, group: GroupId, task: Task) -> Result<TaskId, BoardError> {
        if task.title.trim().is_empty() {
            return Err(ValidationError::Empty("task title").into());
        }
        let g = self.group_mut(group).ok_or(BoardError::GroupNotFound(group))?;
        let id = task.id;
        g.tasks.push(task);
        Ok(id)
    }

    /// Append to the section's quick-tasks group, creating it at the front.
    pub fn add_quick_task(&mut self, section: Section, task: Task) -> Result<TaskId, BoardError> {
        if task.title.trim().is_empty() {
            return Err(ValidationError::Empty("task title").into());
        }
        let id = task.id;
        self.quick_group(section).tasks.push(task);
        Ok(id)
    }

    fn quick_group(&mut self, section: Section) -> &mut Group {
        let groups = self.section_mut(section);
        let index = match groups.iter().position(|g| g.group_name == QUICK_TASKS_GROUP) {
            Some(i) => i,
            None => {
                groups.insert(0, Group::new(QUICK_TASKS_GROUP));
                0
            }
        };
        &mut groups[index]
    }

    /// Detach a task. The owning group is removed when left empty.
    pub fn take_task(&mut self, id: TaskId) -> Result<(TaskLocation, Task), BoardError> {
        let loc = self.find_task(id).ok_or(BoardError::TaskNotFound(id))?;
        let groups = self.section_mut(loc.section);
        let task = groups[loc.group_index].tasks.remove(loc.task_index);
        if groups[loc.group_index].tasks.is_empty() {
            let removed = groups.remove(loc.group_index);
            debug!(group = %removed.id, name = %removed.group_name, "removed emptied project");
        }
        Ok((loc, task))
    }

    pub fn delete_task(&mut self, id: TaskId) -> Result<Task, BoardError> {
        self.take_task(id).map(|(_, task)| task)
    }

    pub fn set_completed(&mut self, id: TaskId, completed: bool) -> Result<(), BoardError> {
        self.task_mut(id).ok_or(BoardError::TaskNotFound(id))?.completed = completed;
        Ok(())
    }

    /// Flip completion; returns the new value.
    pub fn toggle_completed(&mut self, id: TaskId) -> Result<bool, BoardError> {
        let task = self.task_mut(id).ok_or(BoardError::TaskNotFound(id))?;
        task.completed = !task.completed;
        Ok(task.completed)
    }

    pub fn cycle_status(&mut self, id: TaskId) -> Result<TaskStatus, BoardError> {
        let task = self.task_mut(id).ok_or(BoardError::TaskNotFound(id))?;
        let next = task.status.unwrap_or_default().next();
        task.status = Some(next);
        Ok(next)
    }

    pub fn add_subtask(&mut self, id: TaskId, title: &str) -> Result<usize, BoardError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ValidationError::Empty("subtask title").into());
        }
        let task = self.task_mut(id).ok_or(BoardError::TaskNotFound(id))?;
        task.add_subtask(Subtask::new(title));
        Ok(task.subtasks().len() - 1)
    }

    pub fn toggle_subtask(&mut self, id: TaskId, index: usize) -> Result<bool, BoardError> {
        let task = self.task_mut(id).ok_or(BoardError::TaskNotFound(id))?;
        let sub = task
            .subtasks
            .as_mut()
            .and_then(|s| s.get_mut(index))
            .ok_or(BoardError::SubtaskNotFound { task: id, index })?;
        sub.completed = !sub.completed;
        Ok(sub.completed)
    }

    pub fn delete_subtask(&mut self, id: TaskId, index: usize) -> Result<Subtask, BoardError> {
        let task = self.task_mut(id).ok_or(BoardError::TaskNotFound(id))?;
        task.remove_subtask(index)
            .ok_or(BoardError::SubtaskNotFound { task: id, index })
    }

    /// Move a task to the quick-tasks group of the other section.
    pub fn move_task_to_section(&mut self, id: TaskId) -> Result<Section, BoardError> {
        let (loc, task) = self.take_task(id)?;
        let to = loc.section.other();
        self.quick_group(to).tasks.push(task);
        Ok(to)
    }

    /// Drop a task into another group, at `index` or at the end.
    pub fn move_task_to_group(
        &mut self,
        id: TaskId,
        group: GroupId,
        index: Option<usize>,
    ) -> Result<(), BoardError> {
        if self.group(group).is_none() {
            return Err(BoardError::GroupNotFound(group));
        }
        if self.group_of(id).map(|g| g.id) == Some(group) {
            return self.reorder_task(id, index.unwrap_or(usize::MAX));
        }
        let (_, task) = self.take_task(id)?;
        let target = self.group_mut(group).ok_or(BoardError::GroupNotFound(group))?;
        let at = index.unwrap_or(target.tasks.len()).min(target.tasks.len());
        target.tasks.insert(at, task);
        Ok(())
    }

    /// Drag-and-drop reorder of a task within its group.
    pub fn reorder_task(&mut self, id: TaskId, new_index: usize) -> Result<(), BoardError> {
        let loc = self.find_task(id).ok_or(BoardError::TaskNotFound(id))?;
        let tasks = &mut self.section_mut(loc.section)[loc.group_index].tasks;
        let task = tasks.remove(loc.task_index);
        let target = new_index.min(tasks.len());
        tasks.insert(target, task);
        Ok(())
    }

    /// Explicitly place a task in a zone. Critical also marks it blocking.
    pub fn move_task_to_zone(&mut self, id: TaskId, zone: Zone) -> Result<(), BoardError> {
        let task = self.task_mut(id).ok_or(BoardError::TaskNotFound(id))?;
        if zone == Zone::Critical {
            task.is_blocking = true;
        }
        task.zone = zone;
        Ok(())
    }

    /// Flip the today's-focus overlay flag; returns the new value.
    pub fn toggle_in_focus(&mut self, id: TaskId) -> Result<bool, BoardError> {
        let task = self.task_mut(id).ok_or(BoardError::TaskNotFound(id))?;
        task.is_in_focus = !task.is_in_focus;
        Ok(task.is_in_focus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_with(tasks: &[&str]) -> (TaskBoard, GroupId, Vec<TaskId>) {
        let mut board = TaskBoard::new();
        let g = board.add_group(Section::Today, "Deck").unwrap();
        let ids = tasks
            .iter()
            .map(|t| board.add_task(g, Task::new(*t)).unwrap())
            .collect();
        (board, g, ids)
    }

    #[test]
    fn traversal_puts_today_before_longterm() {
        let mut board = TaskBoard::new();
        let lt = board.add_group(Section::Longterm, "Later").unwrap();
        let td = board.add_group(Section::Today, "Now").unwrap();
        board.add_task(lt, Task::new("b")).unwrap();
        board.add_task(td, Task::new("a")).unwrap();

        let titles: Vec<_> = board.iter_tasks().map(|e| e.task.title.as_str()).collect();
        assert_eq!(titles, ["a", "b"]);
    }

    #[test]
    fn deleting_last_task_removes_group() {
        let (mut board, g, ids) = board_with(&["only"]);
        board.delete_task(ids[0]).unwrap();
        assert!(board.group(g).is_none());
        assert_eq!(board.task_count(), 0);
    }

    #[test]
    fn deleting_one_of_many_keeps_group() {
        let (mut board, g, ids) = board_with(&["a", "b"]);
        board.delete_task(ids[0]).unwrap();
        assert_eq!(board.group(g).unwrap().tasks.len(), 1);
        assert_eq!(
            board.delete_task(ids[0]),
            Err(BoardError::TaskNotFound(ids[0]))
        );
    }

    #[test]
    fn moving_to_other_section_uses_quick_tasks_at_front() {
        let (mut board, _, ids) = board_with(&["a"]);
        board.add_group(Section::Longterm, "Existing").unwrap();

        assert_eq!(board.move_task_to_section(ids[0]).unwrap(), Section::Longterm);
        assert!(board.today.is_empty());
        assert_eq!(board.longterm[0].group_name, QUICK_TASKS_GROUP);
        assert_eq!(board.find_task(ids[0]).unwrap().section, Section::Longterm);
    }

    #[test]
    fn move_to_critical_zone_sets_blocking() {
        let (mut board, _, ids) = board_with(&["a"]);
        board.move_task_to_zone(ids[0], Zone::Critical).unwrap();
        let task = board.task(ids[0]).unwrap();
        assert_eq!(task.zone, Zone::Critical);
        assert!(task.is_blocking);

        board.move_task_to_zone(ids[0], Zone::Inbox).unwrap();
        assert!(board.task(ids[0]).unwrap().is_blocking);
    }

    #[test]
    fn reorder_keeps_identity() {
        let (mut board, _, ids) = board_with(&["a", "b", "c"]);
        board.reorder_task(ids[2], 0).unwrap();
        let order: Vec<_> = board.iter_tasks().map(|e| e.task.id).collect();
        assert_eq!(order, [ids[2], ids[0], ids[1]]);
        assert_eq!(board.find_task(ids[0]).unwrap().task_index, 1);
    }

    #[test]
    fn move_task_between_groups_removes_emptied_source() {
        let (mut board, src, ids) = board_with(&["a"]);
        let dst = board.add_group(Section::Longterm, "Other").unwrap();
        board.add_task(dst, Task::new("x")).unwrap();

        board.move_task_to_group(ids[0], dst, Some(0)).unwrap();
        assert!(board.group(src).is_none());
        assert_eq!(board.group(dst).unwrap().tasks[0].id, ids[0]);
    }

    #[test]
    fn subtask_lifecycle() {
        let (mut board, _, ids) = board_with(&["a"]);
        assert_eq!(board.add_subtask(ids[0], "one").unwrap(), 0);
        assert!(board.toggle_subtask(ids[0], 0).unwrap());
        assert!(board.toggle_subtask(ids[0], 3).is_err());
        board.delete_subtask(ids[0], 0).unwrap();
        assert!(board.task(ids[0]).unwrap().subtasks.is_none());
    }

    #[test]
    fn resolve_group_prefers_exact_name() {
        let mut board = TaskBoard::new();
        let g = board.add_group(Section::Today, "Alloy Folder").unwrap();
        assert_eq!(board.resolve_group("alloy folder").unwrap(), g);
        assert!(matches!(
            board.resolve_group("nothing"),
            Err(BoardError::NoMatch(_))
        ));
    }

    #[test]
    fn empty_names_are_rejected() {
        let mut board = TaskBoard::new();
        assert!(board.add_group(Section::Today, "  ").is_err());
        let g = board.add_group(Section::Today, "P").unwrap();
        assert!(board.add_task(g, Task::new("")).is_err());
    }

    #[test]
    fn move_group_appends_to_other_section() {
        let mut board = TaskBoard::new();
        board.add_group(Section::Longterm, "First").unwrap();
        let g = board.add_group(Section::Today, "Mover").unwrap();
        assert_eq!(board.move_group(g).unwrap(), Section::Longterm);
        assert_eq!(board.longterm.last().unwrap().id, g);
        assert!(board.today.is_empty());
    }
}
