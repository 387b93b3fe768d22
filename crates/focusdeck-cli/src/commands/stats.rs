use focusdeck_core::digest::board_stats;

use super::{print_json, CmdResult, Workspace};

pub fn run() -> CmdResult {
    let ws = Workspace::open()?;
    print_json(&board_stats(&ws.state.board))
}
