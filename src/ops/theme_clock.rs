use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use chrono::{Local, NaiveDateTime, Timelike};

use crate::ops::subscribers::{SubscriptionId, Subscribers};

/// Error type for clock sampling
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClockError {
    #[error("system clock unavailable: {0}")]
    Unavailable(String),
    #[error("could not start clock timer: {0}")]
    Timer(String),
}

/// Something that can tell the local wall-clock time
pub trait TimeSource: Send + Sync {
    fn now(&self) -> Result<NaiveDateTime, ClockError>;
}

/// The host's clock, in the local time zone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn now(&self) -> Result<NaiveDateTime, ClockError> {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| ClockError::Unavailable(e.to_string()))?;
        Ok(Local::now().naive_local())
    }
}

/// A clock stuck at one instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl TimeSource for FixedClock {
    fn now(&self) -> Result<NaiveDateTime, ClockError> {
        Ok(self.0)
    }
}

// ---------------------------------------------------------------------------
// Day / night
// ---------------------------------------------------------------------------

/// Night runs from 18:00 up to (not including) 06:00.
pub fn is_night(hour: u32) -> bool {
    hour >= 18 || hour < 6
}

/// Exact complement of `is_night`
pub fn is_daytime(hour: u32) -> bool {
    !is_night(hour)
}

/// One reading of the clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockSample {
    pub at: NaiveDateTime,
    pub is_night: bool,
}

impl ClockSample {
    pub fn at(at: NaiveDateTime) -> Self {
        ClockSample {
            at,
            is_night: is_night(at.hour()),
        }
    }

    pub fn is_daytime(&self) -> bool {
        !self.is_night
    }

    pub fn greeting(&self) -> &'static str {
        if self.is_night {
            "Have a good night"
        } else {
            "Have a nice day"
        }
    }

    pub fn time_label(&self) -> String {
        format_time(&self.at)
    }

    pub fn date_label(&self) -> String {
        format_date(&self.at)
    }
}

/// `06:05:09 PM`
pub fn format_time(ts: &NaiveDateTime) -> String {
    ts.format("%I:%M:%S %p").to_string()
}

/// `Wednesday, May 14, 2025`
pub fn format_date(ts: &NaiveDateTime) -> String {
    ts.format("%A, %B %-d, %Y").to_string()
}

// ---------------------------------------------------------------------------
// ThemeClock
// ---------------------------------------------------------------------------

type TickResult = Result<ClockSample, ClockError>;

/// Background timer feeding samples back to the owner
struct Ticker {
    stop_tx: mpsc::Sender<()>,
    rx: mpsc::Receiver<TickResult>,
    handle: JoinHandle<()>,
}

/// Samples the clock on a fixed cadence and publishes day/night.
///
/// The timer runs on its own thread but only produces samples; they are
/// applied and subscribers are called when the owner calls `poll`, so every
/// callback runs on the owner's thread. After `stop` returns no callback
/// fires until `start` is called again. Dropping the clock stops it.
pub struct ThemeClock {
    source: Arc<dyn TimeSource>,
    interval: Duration,
    latest: Option<ClockSample>,
    failure: Option<ClockError>,
    ticker: Option<Ticker>,
    subscribers: Subscribers<ClockSample>,
}

impl ThemeClock {
    pub fn new(source: Arc<dyn TimeSource>, interval: Duration) -> Self {
        ThemeClock {
            source,
            interval,
            latest: None,
            failure: None,
            ticker: None,
            subscribers: Subscribers::default(),
        }
    }

    /// A clock over the system time
    pub fn system(interval: Duration) -> Self {
        Self::new(Arc::new(SystemClock), interval)
    }

    /// Take one sample right away and begin the recurring cycle. Starting a
    /// running clock does nothing.
    pub fn start(&mut self) -> Result<(), ClockError> {
        if self.ticker.is_some() {
            return Ok(());
        }
        self.sample_now()?;

        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let (tx, rx) = mpsc::channel::<TickResult>();
        let source = Arc::clone(&self.source);
        let interval = self.interval;

        let handle = thread::Builder::new()
            .name("theme-clock".to_string())
            .spawn(move || {
                loop {
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {
                            let tick = source.now().map(ClockSample::at);
                            let failed = tick.is_err();
                            if tx.send(tick).is_err() || failed {
                                break;
                            }
                        }
                        // Stop requested or owner gone
                        _ => break,
                    }
                }
            })
            .map_err(|e| ClockError::Timer(e.to_string()))?;

        self.ticker = Some(Ticker {
            stop_tx,
            rx,
            handle,
        });
        log::debug!("theme clock started, every {:?}", self.interval);
        Ok(())
    }

    /// Cancel the cycle. Samples produced but not yet polled are discarded.
    pub fn stop(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            let _ = ticker.stop_tx.send(());
            drop(ticker.rx);
            let _ = ticker.handle.join();
            log::debug!("theme clock stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.ticker.is_some()
    }

    /// Apply pending samples, notifying subscribers for each. Returns how
    /// many were applied. A clock failure stops the clock.
    pub fn poll(&mut self) -> usize {
        let mut pending = Vec::new();
        if let Some(ticker) = &self.ticker {
            while let Ok(tick) = ticker.rx.try_recv() {
                pending.push(tick);
            }
        }

        let mut applied = 0;
        for tick in pending {
            match tick {
                Ok(sample) => {
                    self.apply(sample);
                    applied += 1;
                }
                Err(e) => {
                    self.fail(e);
                    break;
                }
            }
        }
        applied
    }

    /// Read the clock synchronously and publish the sample.
    pub fn sample_now(&mut self) -> Result<ClockSample, ClockError> {
        match self.source.now() {
            Ok(at) => {
                let sample = ClockSample::at(at);
                self.apply(sample);
                Ok(sample)
            }
            Err(e) => {
                self.fail(e.clone());
                Err(e)
            }
        }
    }

    pub fn latest(&self) -> Option<&ClockSample> {
        self.latest.as_ref()
    }

    /// Set once the clock could not be read; the clock stays stopped.
    pub fn failure(&self) -> Option<&ClockError> {
        self.failure.as_ref()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&ClockSample) + 'static) -> SubscriptionId {
        self.subscribers.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    fn apply(&mut self, sample: ClockSample) {
        let flipped = self
            .latest
            .is_some_and(|prev| prev.is_night != sample.is_night);
        if flipped {
            log::info!(
                "theme switched to {}",
                if sample.is_night { "night" } else { "day" }
            );
        }
        self.latest = Some(sample);
        self.failure = None;
        self.subscribers.notify(&sample);
    }

    fn fail(&mut self, e: ClockError) {
        log::error!("{}", e);
        self.failure = Some(e);
        self.stop();
    }
}

impl Drop for ThemeClock {
    fn drop(&mut self) {
        self.stop();
    }
}
