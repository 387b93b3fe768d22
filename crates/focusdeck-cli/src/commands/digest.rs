use focusdeck_core::digest::daily_digest;

use super::{print_json, CmdResult, Workspace};

pub fn run() -> CmdResult {
    let ws = Workspace::open()?;
    let digest = daily_digest(&ws.state.board, &ws.window);
    print_json(&digest)?;
    if digest.summary.total_active == 0 {
        eprintln!("Nothing on the board. Enjoy the day.");
    }
    Ok(())
}
