use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};

use crate::update::UpdateInfo;

/// Everything the controller reacts to, delivered through one queue
#[derive(Clone, Debug, PartialEq)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize(u16, u16),
    /// Time elapsed since the previous tick while the timer was armed
    Tick(Duration),
    UpdateChecked(Option<UpdateInfo>),
}

/// Source of terminal events (keyboard, resize, background results)
pub trait EventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError>;
}

/// Production event source: a reader thread forwarding crossterm events
pub struct CrosstermEventSource {
    tx: Sender<AppEvent>,
    rx: Receiver<AppEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        let reader = tx.clone();

        std::thread::spawn(move || loop {
            let forwarded = match event::read() {
                // key release events only show up on some platforms
                Ok(CtEvent::Key(key)) if key.kind != KeyEventKind::Release => {
                    reader.send(AppEvent::Key(key))
                }
                Ok(CtEvent::Resize(w, h)) => reader.send(AppEvent::Resize(w, h)),
                Ok(_) => Ok(()),
                Err(err) => {
                    tracing::error!("terminal event reader stopped: {err}");
                    break;
                }
            };
            if forwarded.is_err() {
                break;
            }
        });

        Self { tx, rx }
    }

    /// Handle for background tasks that report back into the loop
    pub fn sender(&self) -> Sender<AppEvent> {
        self.tx.clone()
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Channel-backed event source for tests
pub struct TestEventSource {
    rx: Receiver<AppEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<AppEvent>) -> Self {
        Self { rx }
    }
}

impl EventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Advances the application one event at a time, producing a tick when the
/// interval passes without input.
pub struct Runner<E: EventSource, T: Ticker> {
    event_source: E,
    ticker: T,
    last_tick: Instant,
}

impl<E: EventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
            last_tick: Instant::now(),
        }
    }

    /// Wait for the next event. `armed` says whether the game clock is
    /// running; while disarmed the tick anchor follows the wall clock, so
    /// time spent disarmed is never replayed.
    pub fn step(&mut self, armed: bool) -> AppEvent {
        if !armed {
            self.last_tick = Instant::now();
        }
        let interval = self.ticker.interval();
        let wait = interval.saturating_sub(self.last_tick.elapsed());

        match self.event_source.recv_timeout(wait) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                let now = Instant::now();
                let elapsed = now - self.last_tick;
                self.last_tick = now;
                AppEvent::Tick(if armed { elapsed } else { Duration::ZERO })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};
    use std::sync::mpsc;

    #[test]
    fn step_returns_tick_on_timeout() {
        let (_tx, rx) = mpsc::channel();
        let mut runner = Runner::new(
            TestEventSource::new(rx),
            FixedTicker::new(Duration::from_millis(5)),
        );

        match runner.step(true) {
            AppEvent::Tick(elapsed) => assert!(elapsed >= Duration::from_millis(5)),
            other => panic!("expected Tick on timeout, got {other:?}"),
        }
    }

    #[test]
    fn disarmed_ticks_carry_no_time() {
        let (_tx, rx) = mpsc::channel();
        let mut runner = Runner::new(
            TestEventSource::new(rx),
            FixedTicker::new(Duration::from_millis(2)),
        );

        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(runner.step(false), AppEvent::Tick(Duration::ZERO));
    }

    #[test]
    fn rearming_does_not_catch_up() {
        let (_tx, rx) = mpsc::channel();
        let mut runner = Runner::new(
            TestEventSource::new(rx),
            FixedTicker::new(Duration::from_millis(5)),
        );

        runner.step(false);
        std::thread::sleep(Duration::from_millis(200));
        runner.step(false);
        match runner.step(true) {
            AppEvent::Tick(elapsed) => assert!(elapsed < Duration::from_millis(150)),
            other => panic!("expected Tick, got {other:?}"),
        }
    }

    #[test]
    fn step_passes_through_events() {
        let (tx, rx) = mpsc::channel();
        let key = KeyEvent::new(KeyCode::Char('7'), KeyModifiers::NONE);
        tx.send(AppEvent::Resize(80, 24)).unwrap();
        tx.send(AppEvent::Key(key)).unwrap();
        let mut runner = Runner::new(
            TestEventSource::new(rx),
            FixedTicker::new(Duration::from_millis(10)),
        );

        assert_eq!(runner.step(true), AppEvent::Resize(80, 24));
        assert_eq!(runner.step(true), AppEvent::Key(key));
    }
}
