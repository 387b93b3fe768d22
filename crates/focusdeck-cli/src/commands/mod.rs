pub mod archive;
pub mod backup;
pub mod config;
pub mod digest;
pub mod focus;
pub mod note;
pub mod project;
pub mod stats;
pub mod task;
pub mod zone;

use chrono::{DateTime, Utc};
use focusdeck_core::clock::{Clock, SystemClock};
use focusdeck_core::{AppState, Config, Database, DayWindow, Event};
use serde::Serialize;

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Config, database and the loaded document for one command.
pub struct Workspace {
    pub config: Config,
    pub db: Database,
    pub state: AppState,
    pub now: DateTime<Utc>,
    pub window: DayWindow,
}

impl Workspace {
    /// Load everything. Runs the one-time zone migration on first use.
    pub fn open() -> Result<Self, Box<dyn std::error::Error>> {
        let config = Config::load()?;
        let db = Database::open()?.with_backup_limit(config.storage.backup_limit as usize);
        let state = db.load_state()?;
        let clock = SystemClock;
        let mut ws = Self {
            config,
            db,
            state,
            now: clock.now(),
            window: DayWindow::new(clock.today()),
        };
        if let Some(event) = ws.state.migrate_zones_once(&ws.window, ws.now) {
            tracing::info!(?event, "first run zone migration");
            ws.save()?;
        }
        Ok(ws)
    }

    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.db.save_state(&self.state, self.now)?;
        Ok(())
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Events go to stdout as JSON, one document each.
pub fn print_events(events: &[Event]) -> CmdResult {
    for event in events {
        print_json(event)?;
    }
    Ok(())
}
