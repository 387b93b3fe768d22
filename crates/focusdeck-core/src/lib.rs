//! # Focusdeck Core Library
//!
//! This library provides the core logic for the focusdeck task manager.
//! It follows a CLI-first philosophy: every operation is available through
//! the standalone `focusdeck` binary, which is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Task board**: two sections of projects holding tasks, addressed by
//!   stable ids
//! - **Zones**: a pure classifier sorting tasks into Critical, Focus and
//!   Inbox lists, plus a one-time migration that writes zones to unzoned
//!   tasks
//! - **Focus mode**: a wall-clock state machine that requires the caller to
//!   periodically invoke `tick()`; [`FocusDriver`] does so on a tokio
//!   interval
//! - **Storage**: the whole [`AppState`] as one SQLite document with a ring
//!   of snapshots, and TOML configuration
//!
//! ## Key Components
//!
//! - [`AppState`]: the persisted document and cross-cutting operations
//! - [`FocusTimer`]: focus state machine
//! - [`Database`]: document persistence
//! - [`Config`]: application configuration

pub mod app;
pub mod archive;
pub mod board;
pub mod clock;
pub mod dates;
pub mod digest;
pub mod error;
pub mod events;
pub mod focus;
pub mod notes;
pub mod storage;
pub mod task;
pub mod zone;

pub use app::AppState;
pub use archive::{Archive, ArchiveEntry};
pub use board::TaskBoard;
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ArchiveError, BoardError, ConfigError, CoreError, FocusError, StorageError, ValidationError};
pub use events::Event;
pub use focus::{AlertInterval, FocusDriver, FocusTimer, StopReason};
pub use notes::{Note, NoteId, Notes};
pub use storage::{Config, Database};
pub use task::{Group, GroupId, Section, Task, TaskId, Zone};
pub use zone::{DayWindow, ZoneLists};
