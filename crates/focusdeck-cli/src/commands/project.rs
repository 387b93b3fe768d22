//! Project (group) management commands for CLI.

use clap::Subcommand;
use focusdeck_core::task::Section;
use serde::Serialize;

use super::{print_events, print_json, CmdResult, Workspace};

#[derive(Subcommand)]
pub enum ProjectAction {
    /// Create a new project
    Add {
        name: String,
        /// today or longterm
        #[arg(long, default_value = "today")]
        section: Section,
    },
    /// List projects with progress
    List,
    /// Rename a project
    Rename {
        /// Project name or id prefix
        project: String,
        name: String,
    },
    /// Delete a project and its tasks
    Delete { project: String },
    /// Move a project to the other section
    Move { project: String },
    /// Change a project's position within its section
    Reorder { project: String, index: usize },
}

#[derive(Serialize)]
struct ProjectRow<'a> {
    id: String,
    name: &'a str,
    section: Section,
    tasks: usize,
    completed: usize,
}

pub fn run(action: ProjectAction) -> CmdResult {
    let mut ws = Workspace::open()?;

    match action {
        ProjectAction::Add { name, section } => {
            let id = ws.state.board.add_group(section, &name)?;
            ws.save()?;
            println!("Project created: {id}");
        }
        ProjectAction::List => {
            let rows: Vec<ProjectRow> = ws
                .state
                .board
                .groups()
                .map(|(section, _, g)| ProjectRow {
                    id: g.id.short(),
                    name: &g.group_name,
                    section,
                    tasks: g.tasks.len(),
                    completed: g.completed_count(),
                })
                .collect();
            print_json(&rows)?;
        }
        ProjectAction::Rename { project, name } => {
            let id = ws.state.board.resolve_group(&project)?;
            ws.state.board.rename_group(id, &name)?;
            ws.save()?;
            println!("Project renamed: {}", name.trim());
        }
        ProjectAction::Delete { project } => {
            let id = ws.state.board.resolve_group(&project)?;
            let events = ws.state.delete_group(id, ws.now)?;
            ws.save()?;
            println!("Project deleted: {project}");
            print_events(&events)?;
        }
        ProjectAction::Move { project } => {
            let id = ws.state.board.resolve_group(&project)?;
            let to = ws.state.board.move_group(id)?;
            ws.save()?;
            println!("Project moved to {to}");
        }
        ProjectAction::Reorder { project, index } => {
            let id = ws.state.board.resolve_group(&project)?;
            ws.state.board.reorder_group(id, index)?;
            ws.save()?;
            println!("ok");
        }
    }
    Ok(())
}
