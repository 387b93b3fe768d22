//! Archive commands for CLI.

use chrono::{DateTime, Utc};
use clap::Subcommand;
use focusdeck_core::archive::ArchiveEntry;
use serde::Serialize;

use super::{print_events, print_json, CmdResult, Workspace};

#[derive(Subcommand)]
pub enum ArchiveAction {
    /// Archive every completed task
    Completed,
    /// Archive a whole project
    Project {
        /// Project name or id prefix
        project: String,
    },
    /// List archived entries, newest last
    List,
    /// Put an archived task back on the board
    Restore {
        /// Position shown by `archive list`
        index: usize,
    },
    /// Empty the archive
    Clear,
}

#[derive(Serialize)]
struct ArchiveRow<'a> {
    index: usize,
    title: String,
    project: bool,
    archived_at: DateTime<Utc>,
    entry: &'a ArchiveEntry,
}

pub fn run(action: ArchiveAction) -> CmdResult {
    let mut ws = Workspace::open()?;

    match action {
        ArchiveAction::Completed => {
            let events = ws.state.archive_completed(ws.now);
            ws.save()?;
            if events.is_empty() {
                println!("No completed tasks to archive");
            }
            print_events(&events)?;
        }
        ArchiveAction::Project { project } => {
            let id = ws.state.board.resolve_group(&project)?;
            let events = ws.state.archive_group(id, ws.now)?;
            ws.save()?;
            println!("Project archived: {project}");
            print_events(&events)?;
        }
        ArchiveAction::List => {
            let rows: Vec<ArchiveRow> = ws
                .state
                .archive
                .entries()
                .iter()
                .enumerate()
                .map(|(index, entry)| ArchiveRow {
                    index,
                    title: entry.title(),
                    project: matches!(entry, ArchiveEntry::Project(_)),
                    archived_at: entry.archived_at(),
                    entry,
                })
                .collect();
            print_json(&rows)?;
        }
        ArchiveAction::Restore { index } => {
            let id = ws.state.restore_archived(index)?;
            ws.save()?;
            println!("Task restored: {id}");
        }
        ArchiveAction::Clear => {
            let removed = ws.state.archive.clear();
            ws.save()?;
            println!("Removed {removed} archived entries");
        }
    }
    Ok(())
}
