//! Focus mode commands for CLI.

use chrono::{DateTime, Utc};
use clap::Subcommand;
use focusdeck_core::clock::SystemClock;
use focusdeck_core::error::Result as CoreResult;
use focusdeck_core::focus::{AlertInterval, AlertResponse, DriverExit, FocusDriver, FocusHost, Wake};
use focusdeck_core::{Database, Event};
use tokio::sync::mpsc;

use super::{print_json, CmdResult, Workspace};

#[derive(Subcommand)]
pub enum FocusAction {
    /// Start focusing on a task
    Start {
        /// Task id prefix
        id: String,
        /// Minutes between "still working?" alerts (1-15)
        #[arg(long)]
        interval: Option<u32>,
        /// Website to keep open while focusing
        #[arg(long)]
        url: Option<String>,
    },
    /// Stop focusing
    Stop,
    /// Print the current focus state as JSON
    Status,
    /// Answer the last alert with "still working"
    Ack,
    /// Change the alert interval of the running session
    Interval { minutes: u32 },
    /// Stay in the foreground and deliver alerts until focus ends
    Watch,
}

/// Works on the stored document on every check so commands run from other
/// terminals (stop, done, delete) are picked up and never overwritten.
struct StoredFocus<'a> {
    db: &'a Database,
    focusing: bool,
}

impl FocusHost for StoredFocus<'_> {
    fn check(&mut self, now: DateTime<Utc>) -> CoreResult<Option<Event>> {
        let mut focusing = false;
        let event = self.db.update_state(now, |state| {
            let event = state.focus_tick(now);
            focusing = state.focus.is_running();
            event
        })?;
        self.focusing = focusing;
        Ok(event)
    }

    fn is_focusing(&self) -> bool {
        self.focusing
    }
}

fn deliver(event: &Event) {
    if let Ok(json) = serde_json::to_string(event) {
        println!("{json}");
    }
    match event {
        Event::FocusAlert {
            title,
            focused_for_min,
            website_url,
            ..
        } => {
            eprintln!("\x07Still working on \"{title}\"? ({focused_for_min} min so far)");
            if let Some(url) = website_url {
                eprintln!("  {url}");
            }
            eprintln!("  `focusdeck focus stop` to end the session");
        }
        Event::FocusStopped { reason, .. } => eprintln!("Focus ended: {reason}"),
        _ => {}
    }
}

pub fn run(action: FocusAction) -> CmdResult {
    let mut ws = Workspace::open()?;

    match action {
        FocusAction::Start { id, interval, url } => {
            let id = ws.state.board.resolve_task(&id)?;
            let interval = match interval {
                Some(minutes) => AlertInterval::new(minutes)?,
                None => ws.config.default_interval(),
            };
            let event = ws.state.start_focus(id, interval, url.as_deref(), ws.now)?;
            ws.save()?;
            print_json(&event)?;
        }
        FocusAction::Stop => {
            match ws.state.stop_focus(ws.now) {
                Some(event) => {
                    ws.save()?;
                    print_json(&event)?;
                }
                None => println!("Not focusing"),
            }
        }
        FocusAction::Status => {
            // Alerts belong to `focus watch`; only clear a vanished task here.
            if let Some(event) = ws.state.validate_focus(ws.now) {
                ws.save()?;
                print_json(&event)?;
            }
            print_json(&ws.state.focus_snapshot(ws.now))?;
        }
        FocusAction::Ack => {
            ws.state.focus.respond(AlertResponse::StillWorking, ws.now);
            print_json(&ws.state.focus_snapshot(ws.now))?;
        }
        FocusAction::Interval { minutes } => {
            let interval = AlertInterval::new(minutes)?;
            ws.state.focus.change_interval(interval, ws.now)?;
            ws.save()?;
            print_json(&ws.state.focus_snapshot(ws.now))?;
        }
        FocusAction::Watch => {
            if let Some(event) = ws.state.resume_focus(ws.now) {
                ws.save()?;
                deliver(&event);
            }
            if !ws.state.focus.is_running() {
                println!("Not focusing");
                return Ok(());
            }

            let driver = FocusDriver::new(SystemClock).with_check_interval(ws.config.check_interval());
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            let exit = runtime.block_on(async {
                let (tx, rx) = mpsc::channel(4);
                tokio::spawn(async move {
                    if tokio::signal::ctrl_c().await.is_ok() {
                        let _ = tx.send(Wake::Shutdown).await;
                    }
                });
                let mut host = StoredFocus {
                    db: &ws.db,
                    focusing: true,
                };
                let mut sink = deliver;
                driver.run(&mut host, &mut sink, rx).await
            })?;
            if exit == DriverExit::Shutdown {
                eprintln!("Stopped watching; focus is still running");
            }
        }
    }
    Ok(())
}
