//! Task management commands for CLI.

use clap::Subcommand;
use focusdeck_core::dates::{extract_due_date, parse_natural_date};
use focusdeck_core::task::{EmotionalWeight, Section, Task, Zone};
use serde::Serialize;

use super::{print_events, print_json, CmdResult, Workspace};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Create a new task
    Add {
        /// Task title. A trailing "by friday" / "due tomorrow" sets the due date.
        title: String,
        /// Project name or id prefix (default: the section's Quick Tasks)
        #[arg(long)]
        project: Option<String>,
        /// Section for quick tasks: today or longterm
        #[arg(long, default_value = "today")]
        section: Section,
        /// Due date: YYYY-MM-DD or a phrase like "next friday"
        #[arg(long)]
        due: Option<String>,
        /// External (hard) deadline
        #[arg(long)]
        deadline: Option<String>,
        /// Mark as blocking others
        #[arg(long)]
        blocking: bool,
        /// Put on today's focus list
        #[arg(long)]
        focus: bool,
        /// Explicit zone: critical, focus or inbox
        #[arg(long)]
        zone: Option<Zone>,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
        /// Estimated minutes
        #[arg(long)]
        estimate: Option<u32>,
    },
    /// List tasks
    List {
        /// Only this section
        #[arg(long)]
        section: Option<Section>,
        /// Include completed tasks
        #[arg(long)]
        all: bool,
    },
    /// Show one task
    Show {
        /// Task id prefix
        id: String,
    },
    /// Edit task fields
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        /// Due date phrase; "none" clears it
        #[arg(long)]
        due: Option<String>,
        /// Deadline phrase; "none" clears it
        #[arg(long)]
        deadline: Option<String>,
        /// Comma-separated tags (replaces existing)
        #[arg(long)]
        tags: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long)]
        estimate: Option<u32>,
        /// light, moderate or heavy
        #[arg(long)]
        weight: Option<String>,
        #[arg(long)]
        blocking: Option<bool>,
    },
    /// Mark a task done
    Done {
        id: String,
        /// Minutes it actually took
        #[arg(long)]
        actual: Option<u32>,
    },
    /// Flip a task between done and not done
    Toggle { id: String },
    /// Advance the workflow status
    Status { id: String },
    /// Delete a task
    Delete { id: String },
    /// Move a task to another project, or to the other section
    Move {
        id: String,
        /// Target project name or id prefix
        #[arg(long, conflicts_with = "other_section")]
        project: Option<String>,
        /// Position inside the target project
        #[arg(long)]
        index: Option<usize>,
        /// Move to the other section's Quick Tasks
        #[arg(long)]
        other_section: bool,
    },
    /// Reorder a task within its project
    Reorder { id: String, index: usize },
    /// Place a task in a zone
    Zone { id: String, zone: Zone },
    /// Flip today's-focus flag
    FocusFlag { id: String },
    /// Subtask management
    Subtask {
        #[command(subcommand)]
        action: SubtaskAction,
    },
}

#[derive(Subcommand)]
pub enum SubtaskAction {
    Add { id: String, title: String },
    Toggle { id: String, index: usize },
    Delete { id: String, index: usize },
}

#[derive(Serialize)]
struct TaskRow<'a> {
    section: Section,
    project: &'a str,
    #[serde(flatten)]
    task: &'a Task,
}

fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_weight(raw: &str) -> Result<EmotionalWeight, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "light" => Ok(EmotionalWeight::Light),
        "moderate" => Ok(EmotionalWeight::Moderate),
        "heavy" => Ok(EmotionalWeight::Heavy),
        other => Err(format!("unknown weight '{other}' (expected light, moderate or heavy)")),
    }
}

pub fn run(action: TaskAction) -> CmdResult {
    let mut ws = Workspace::open()?;
    let today = ws.window.today;
    let date = |raw: &str| parse_natural_date(raw, today).ok_or(format!("cannot understand date '{raw}'"));

    match action {
        TaskAction::Add {
            title,
            project,
            section,
            due,
            deadline,
            blocking,
            focus,
            zone,
            tags,
            estimate,
        } => {
            let (title, due) = match due {
                Some(raw) => (title, Some(date(&raw)?)),
                None => extract_due_date(&title, today),
            };
            let mut task = Task::new(title);
            task.due_date = due;
            task.external_deadline = deadline.as_deref().map(date).transpose()?;
            task.is_blocking = blocking;
            task.is_in_focus = focus;
            task.tags = tags.as_deref().map(split_tags).unwrap_or_default();
            task.estimated_minutes = estimate;
            if let Some(zone) = zone {
                task.zone = zone;
            } else if ws.state.zones_migrated {
                focusdeck_core::zone::assign_zone(&mut task, &ws.window);
            }

            let id = match project {
                Some(p) => {
                    let group = ws.state.board.resolve_group(&p)?;
                    ws.state.board.add_task(group, task)?
                }
                None => ws.state.board.add_quick_task(section, task)?,
            };
            ws.save()?;
            println!("Task created: {id}");
            if let Some(task) = ws.state.board.task(id) {
                print_json(task)?;
            }
        }
        TaskAction::List { section, all } => {
            let rows: Vec<TaskRow> = ws
                .state
                .board
                .iter_tasks()
                .filter(|e| section.map_or(true, |s| s == e.section))
                .filter(|e| all || !e.task.completed)
                .map(|e| TaskRow {
                    section: e.section,
                    project: &e.group.group_name,
                    task: e.task,
                })
                .collect();
            print_json(&rows)?;
        }
        TaskAction::Show { id } => {
            let id = ws.state.board.resolve_task(&id)?;
            if let Some(task) = ws.state.board.task(id) {
                print_json(task)?;
            }
        }
        TaskAction::Edit {
            id,
            title,
            due,
            deadline,
            tags,
            notes,
            estimate,
            weight,
            blocking,
        } => {
            let id = ws.state.board.resolve_task(&id)?;
            let due = match due.as_deref() {
                Some("none") => Some(None),
                Some(raw) => Some(Some(date(raw)?)),
                None => None,
            };
            let deadline = match deadline.as_deref() {
                Some("none") => Some(None),
                Some(raw) => Some(Some(date(raw)?)),
                None => None,
            };
            let weight = weight.as_deref().map(parse_weight).transpose()?;

            let task = ws
                .state
                .board
                .task_mut(id)
                .ok_or(format!("Task not found: {id}"))?;
            if let Some(t) = title.filter(|t| !t.trim().is_empty()) {
                task.title = t.trim().to_string();
            }
            if let Some(d) = due {
                task.due_date = d;
            }
            if let Some(d) = deadline {
                task.external_deadline = d;
            }
            if let Some(t) = tags {
                task.tags = split_tags(&t);
            }
            if let Some(n) = notes {
                task.notes = Some(n).filter(|n| !n.trim().is_empty());
            }
            if let Some(e) = estimate {
                task.estimated_minutes = Some(e);
            }
            if let Some(w) = weight {
                task.emotional_weight = Some(w);
            }
            if let Some(b) = blocking {
                task.is_blocking = b;
            }
            ws.save()?;
            println!("Task updated:");
            if let Some(task) = ws.state.board.task(id) {
                print_json(task)?;
            }
        }
        TaskAction::Done { id, actual } => {
            let id = ws.state.board.resolve_task(&id)?;
            let events = ws.state.complete_task(id, actual, ws.now)?;
            ws.save()?;
            println!("Task completed: {id}");
            print_events(&events)?;
        }
        TaskAction::Toggle { id } => {
            let id = ws.state.board.resolve_task(&id)?;
            let events = ws.state.toggle_task(id, ws.now)?;
            ws.save()?;
            let done = ws.state.board.task(id).is_some_and(|t| t.completed);
            println!("Task {id} is now {}", if done { "done" } else { "not done" });
            print_events(&events)?;
        }
        TaskAction::Status { id } => {
            let id = ws.state.board.resolve_task(&id)?;
            let status = ws.state.board.cycle_status(id)?;
            ws.save()?;
            println!("{}", serde_json::to_string(&status)?);
        }
        TaskAction::Delete { id } => {
            let id = ws.state.board.resolve_task(&id)?;
            let events = ws.state.delete_task(id, ws.now)?;
            ws.save()?;
            println!("Task deleted: {id}");
            print_events(&events)?;
        }
        TaskAction::Move {
            id,
            project,
            index,
            other_section,
        } => {
            let id = ws.state.board.resolve_task(&id)?;
            if other_section {
                let to = ws.state.board.move_task_to_section(id)?;
                println!("Task moved to {to}");
            } else {
                let project = project.ok_or("either --project or --other-section is required")?;
                let group = ws.state.board.resolve_group(&project)?;
                ws.state.board.move_task_to_group(id, group, index)?;
                println!("Task moved to {project}");
            }
            ws.save()?;
        }
        TaskAction::Reorder { id, index } => {
            let id = ws.state.board.resolve_task(&id)?;
            ws.state.board.reorder_task(id, index)?;
            ws.save()?;
            println!("ok");
        }
        TaskAction::Zone { id, zone } => {
            let id = ws.state.board.resolve_task(&id)?;
            ws.state.board.move_task_to_zone(id, zone.clone())?;
            ws.save()?;
            println!("Task {id} moved to {zone}");
        }
        TaskAction::FocusFlag { id } => {
            let id = ws.state.board.resolve_task(&id)?;
            let on = ws.state.board.toggle_in_focus(id)?;
            ws.save()?;
            println!("Today's focus: {}", if on { "on" } else { "off" });
        }
        TaskAction::Subtask { action } => {
            match action {
                SubtaskAction::Add { id, title } => {
                    let id = ws.state.board.resolve_task(&id)?;
                    let index = ws.state.board.add_subtask(id, &title)?;
                    println!("Subtask added at {index}");
                }
                SubtaskAction::Toggle { id, index } => {
                    let id = ws.state.board.resolve_task(&id)?;
                    let done = ws.state.board.toggle_subtask(id, index)?;
                    println!("Subtask {index} is now {}", if done { "done" } else { "not done" });
                }
                SubtaskAction::Delete { id, index } => {
                    let id = ws.state.board.resolve_task(&id)?;
                    let removed = ws.state.board.delete_subtask(id, index)?;
                    println!("Subtask deleted: {}", removed.title);
                }
            }
            ws.save()?;
        }
    }
    Ok(())
}
