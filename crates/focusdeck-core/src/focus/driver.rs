//! Periodic driver for the focus timer.
//!
//! Checks every [`CHECK_INTERVAL`] rather than once per alert interval so
//! a throttled or suspended process catches up within seconds of waking.
//! A [`Wake::Visible`] message forces an immediate check.

use std::time::Duration as StdDuration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, trace};

use crate::clock::Clock;
use crate::error::Result;
use crate::events::Event;

/// How often the driver looks at the timer.
pub const CHECK_INTERVAL: StdDuration = StdDuration::from_secs(10);

/// Messages that nudge a running driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
    /// The UI went from hidden to visible.
    Visible,
    Shutdown,
}

/// Why [`FocusDriver::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverExit {
    /// Focus ended (stopped, completed, or self-healed).
    Idle,
    Shutdown,
}

/// Whatever owns the focus state between checks.
///
/// `check` runs one timer tick and persists any change; it is the
/// `save()` callback boundary.
pub trait FocusHost {
    fn check(&mut self, now: DateTime<Utc>) -> Result<Option<Event>>;
    fn is_focusing(&self) -> bool;
}

/// Receives alert and stop events. Presentation is up to the implementor.
pub trait AlertSink {
    fn deliver(&mut self, event: &Event);
}

impl<F: FnMut(&Event)> AlertSink for F {
    fn deliver(&mut self, event: &Event) {
        self(event)
    }
}

pub struct FocusDriver<C> {
    clock: C,
    check_every: StdDuration,
}

impl<C: Clock> FocusDriver<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            check_every: CHECK_INTERVAL,
        }
    }

    pub fn with_check_interval(mut self, every: StdDuration) -> Self {
        self.check_every = every.max(StdDuration::from_millis(100));
        self
    }

    /// Drive `host` until focus ends or a shutdown arrives.
    ///
    /// A closed `wake` channel just disables visibility checks.
    pub async fn run<H, S>(
        &self,
        host: &mut H,
        sink: &mut S,
        mut wake: mpsc::Receiver<Wake>,
    ) -> Result<DriverExit>
    where
        H: FocusHost,
        S: AlertSink,
    {
        let mut ticker = time::interval(self.check_every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut wake_open = true;

        loop {
            if !host.is_focusing() {
                return Ok(DriverExit::Idle);
            }

            tokio::select! {
                _ = ticker.tick() => trace!("focus check"),
                msg = wake.recv(), if wake_open => match msg {
                    Some(Wake::Visible) => debug!("became visible, checking for missed alerts"),
                    Some(Wake::Shutdown) => return Ok(DriverExit::Shutdown),
                    None => {
                        wake_open = false;
                        continue;
                    }
                },
            }

            if let Some(event) = host.check(self.clock.now())? {
                sink.deliver(&event);
            }
        }
    }
}
