//! Zone view commands for CLI.

use clap::Subcommand;
use focusdeck_core::zone::{classify_for_display, FOCUS_DISPLAY_LIMIT};

use super::{print_json, CmdResult, Workspace};

#[derive(Subcommand)]
pub enum ZoneAction {
    /// Print the Critical, Focus and Inbox lists
    Show {
        /// Override display.show_completed
        #[arg(long)]
        show_completed: Option<bool>,
    },
    /// Which lists one task appears in
    Classify {
        /// Task id prefix
        id: String,
    },
}

pub fn run(action: ZoneAction) -> CmdResult {
    let ws = Workspace::open()?;

    match action {
        ZoneAction::Show { show_completed } => {
            let show = show_completed.unwrap_or(ws.config.display.show_completed);
            let lists = ws.state.zone_lists(&ws.window, show);
            print_json(&lists)?;
            if lists.focus_total > FOCUS_DISPLAY_LIMIT {
                eprintln!(
                    "{} more focus tasks not shown",
                    lists.focus_total - FOCUS_DISPLAY_LIMIT
                );
            }
        }
        ZoneAction::Classify { id } => {
            let id = ws.state.board.resolve_task(&id)?;
            let task = ws.state.board.task(id).ok_or(format!("Task not found: {id}"))?;
            let membership = classify_for_display(task, &ws.window, true);
            print_json(&membership)?;
        }
    }
    Ok(())
}
