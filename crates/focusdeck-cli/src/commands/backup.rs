//! Snapshot (backup) commands for CLI.

use clap::Subcommand;

use super::{print_json, CmdResult, Workspace};

#[derive(Subcommand)]
pub enum BackupAction {
    /// List stored snapshots, newest first
    List,
    /// Replace the current document with a snapshot
    Restore {
        /// Snapshot id from `backup list`
        id: i64,
    },
}

pub fn run(action: BackupAction) -> CmdResult {
    let ws = Workspace::open()?;

    match action {
        BackupAction::List => {
            print_json(&ws.db.list_snapshots()?)?;
        }
        BackupAction::Restore { id } => {
            let state = ws.db.restore_snapshot(id, ws.now)?;
            println!(
                "Restored snapshot {id} ({} tasks, {} archived, {} notes)",
                state.board.task_count(),
                state.archive.len(),
                state.notes.len()
            );
        }
    }
    Ok(())
}
