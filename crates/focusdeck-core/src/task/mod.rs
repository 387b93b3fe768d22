//! Task data model.
//!
//! Tasks live inside groups (projects), groups live inside one of two
//! sections. Every task and group carries a stable UUID so the zone
//! classifier and focus timer can refer to them across reorders.

pub(crate) mod ids;
mod zone;

pub use ids::{GroupId, TaskId};
pub use zone::Zone;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Top-level section a group belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Today,
    Longterm,
}

impl Section {
    /// Traversal order used by every zone list.
    pub const ALL: [Section; 2] = [Section::Today, Section::Longterm];

    pub fn other(self) -> Section {
        match self {
            Section::Today => Section::Longterm,
            Section::Longterm => Section::Today,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Section::Today => "today",
            Section::Longterm => "longterm",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "today" => Ok(Section::Today),
            "longterm" | "long-term" | "ongoing" => Ok(Section::Longterm),
            other => Err(format!("unknown section '{other}' (expected today or longterm)")),
        }
    }
}

/// Workflow status, cycled by the status button.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    #[default]
    NotStarted,
    Planning,
    InProgress,
    Completed,
}

impl TaskStatus {
    /// not-started -> planning -> in-progress -> completed -> not-started
    pub fn next(self) -> TaskStatus {
        match self {
            TaskStatus::NotStarted => TaskStatus::Planning,
            TaskStatus::Planning => TaskStatus::InProgress,
            TaskStatus::InProgress => TaskStatus::Completed,
            TaskStatus::Completed => TaskStatus::NotStarted,
        }
    }
}

/// How draining a task feels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmotionalWeight {
    Light,
    Moderate,
    Heavy,
}

/// A checklist item owned by a task.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Subtask {
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

impl Subtask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            completed: false,
        }
    }
}

/// A single task.
///
/// Field names follow the stored JSON document (`camelCase`). Optional
/// dates that fail to parse are read as absent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(default)]
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Zone::is_unset")]
    pub zone: Zone,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_blocking: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_in_focus: bool,
    #[serde(
        default,
        deserialize_with = "lenient_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub external_deadline: Option<NaiveDate>,
    #[serde(
        default,
        deserialize_with = "lenient_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// `None` rather than an empty list once the last subtask is removed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtasks: Option<Vec<Subtask>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotional_weight: Option<EmotionalWeight>,
}

impl Task {
    /// Create an incomplete, unzoned task.
    pub fn new(title: impl Into<String>) -> Self {
        Task {
            id: TaskId::new(),
            title: title.into(),
            completed: false,
            zone: Zone::Unset,
            is_blocking: false,
            is_in_focus: false,
            external_deadline: None,
            due_date: None,
            estimated_minutes: None,
            actual_minutes: None,
            status: None,
            tags: Vec::new(),
            notes: None,
            subtasks: None,
            emotional_weight: None,
        }
    }

    pub fn with_zone(mut self, zone: Zone) -> Self {
        self.zone = zone;
        self
    }

    pub fn blocking(mut self) -> Self {
        self.is_blocking = true;
        self
    }

    pub fn in_focus(mut self) -> Self {
        self.is_in_focus = true;
        self
    }

    pub fn due(mut self, date: NaiveDate) -> Self {
        self.due_date = Some(date);
        self
    }

    pub fn external_deadline(mut self, date: NaiveDate) -> Self {
        self.external_deadline = Some(date);
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    pub fn subtasks(&self) -> &[Subtask] {
        self.subtasks.as_deref().unwrap_or(&[])
    }

    pub fn add_subtask(&mut self, subtask: Subtask) {
        self.subtasks.get_or_insert_with(Vec::new).push(subtask);
    }

    /// Remove a subtask, dropping the collection when it becomes empty.
    pub fn remove_subtask(&mut self, index: usize) -> Option<Subtask> {
        let list = self.subtasks.as_mut()?;
        if index >= list.len() {
            return None;
        }
        let removed = list.remove(index);
        if list.is_empty() {
            self.subtasks = None;
        }
        Some(removed)
    }
}

/// A named project holding tasks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    #[serde(default)]
    pub id: GroupId,
    pub group_name: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: GroupId::new(),
            group_name: name.into(),
            tasks: Vec::new(),
        }
    }

    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.completed).count()
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// Parse an optional `YYYY-MM-DD` (or RFC 3339 timestamp) leniently.
fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(|v| v.as_str()).and_then(parse_day))
}

pub(crate) fn parse_day(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok().or_else(|| {
        chrono::DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.date_naive())
    })
}
