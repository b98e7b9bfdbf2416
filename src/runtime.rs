use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, warn};

use crate::session::TypingKey;

/// Identifies the timer that produced a tick
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TickId(u64);

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    Tick(TickId),
}

/// Source of terminal events (keyboard, resize, ticks)
pub trait EventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError>;

    /// Handle for producers that feed the same queue, e.g. metrics timers.
    fn sender(&self) -> Sender<AppEvent>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    tx: Sender<AppEvent>,
    rx: Receiver<AppEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        let reader_tx = tx.clone();

        thread::spawn(move || loop {
            let sent = match event::read() {
                Ok(CtEvent::Key(key)) => reader_tx.send(AppEvent::Key(key)),
                Ok(CtEvent::Resize(_, _)) => reader_tx.send(AppEvent::Resize),
                Ok(_) => Ok(()),
                Err(e) => {
                    warn!(error = %e, "terminal event reader stopped");
                    break;
                }
            };
            if sent.is_err() {
                break;
            }
        });

        Self { tx, rx }
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

    fn sender(&self) -> Sender<AppEvent> {
        self.tx.clone()
    }
}

/// Test event source fed through a channel
pub struct TestEventSource {
    tx: Sender<AppEvent>,
    rx: Receiver<AppEvent>,
}

impl TestEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }
}

impl Default for TestEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    fn sender(&self) -> Sender<AppEvent> {
        self.tx.clone()
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

static NEXT_TICK_ID: AtomicU64 = AtomicU64::new(1);

/// Handle to a running periodic tick. Stopping (or dropping) the handle
/// cancels the producer; ticks already queued still carry the old id and can
/// be told apart with [`MetricsTimer::is_current`].
#[derive(Debug)]
pub struct MetricsTimer {
    id: TickId,
    cancelled: Arc<AtomicBool>,
}

impl MetricsTimer {
    pub fn start(tx: Sender<AppEvent>, interval: Duration) -> Self {
        let id = TickId(NEXT_TICK_ID.fetch_add(1, Ordering::Relaxed));
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);

        thread::spawn(move || loop {
            thread::sleep(interval);
            if flag.load(Ordering::Acquire) {
                break;
            }
            if tx.send(AppEvent::Tick(id)).is_err() {
                break;
            }
        });

        debug!(
            ?id,
            interval_ms = interval.as_millis() as u64,
            "metrics timer started"
        );
        Self { id, cancelled }
    }

    pub fn id(&self) -> TickId {
        self.id
    }

    pub fn is_current(&self, id: TickId) -> bool {
        self.id == id && !self.is_stopped()
    }

    pub fn is_stopped(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    pub fn stop(&self) {
        if !self.cancelled.swap(true, Ordering::AcqRel) {
            debug!(id = ?self.id, "metrics timer stopped");
        }
    }
}

impl Drop for MetricsTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Runner that advances the application one event at a time
pub struct Runner<E: EventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: EventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    pub fn sender(&self) -> Sender<AppEvent> {
        self.event_source.sender()
    }

    /// Blocks up to the ticker interval; `None` means nothing arrived.
    pub fn step(&self) -> Option<AppEvent> {
        match self.event_source.recv_timeout(self.ticker.interval()) {
            Ok(ev) => Some(ev),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}

/// Maps a terminal key press onto the keys the session understands
pub fn typing_key(key: &KeyEvent) -> TypingKey {
    if key
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
    {
        return TypingKey::Other;
    }
    match key.code {
        KeyCode::Char(c) => TypingKey::Char(c),
        KeyCode::Enter => TypingKey::Enter,
        KeyCode::Backspace => TypingKey::Backspace,
        KeyCode::Tab | KeyCode::BackTab => TypingKey::Tab,
        _ => TypingKey::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn step_returns_none_on_timeout() {
        let es = TestEventSource::new();
        let ticker = FixedTicker::new(Duration::from_millis(1));
        let runner = Runner::new(es, ticker);

        assert!(runner.step().is_none());
    }

    #[test]
    fn step_passes_through_events() {
        let es = TestEventSource::new();
        es.sender().send(AppEvent::Resize).unwrap();
        let ticker = FixedTicker::new(Duration::from_millis(10));
        let runner = Runner::new(es, ticker);

        assert_matches!(runner.step(), Some(AppEvent::Resize));
    }

    #[test]
    fn metrics_timer_ticks_with_its_id() {
        let (tx, rx) = mpsc::channel();
        let timer = MetricsTimer::start(tx, Duration::from_millis(5));

        let ev = rx.recv_timeout(Duration::from_secs(2)).unwrap();

        assert_matches!(ev, AppEvent::Tick(id) if id == timer.id());
        assert!(timer.is_current(timer.id()));
    }

    #[test]
    fn stopped_timer_goes_quiet_and_is_not_current() {
        let (tx, rx) = mpsc::channel();
        let timer = MetricsTimer::start(tx, Duration::from_millis(5));
        let id = timer.id();
        timer.stop();
        timer.stop();

        assert!(timer.is_stopped());
        assert!(!timer.is_current(id));

        // drain anything sent before the flag was observed
        thread::sleep(Duration::from_millis(30));
        while rx.try_recv().is_ok() {}
        thread::sleep(Duration::from_millis(30));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn timers_get_distinct_ids() {
        let (tx, _rx) = mpsc::channel();
        let a = MetricsTimer::start(tx.clone(), Duration::from_millis(50));
        let b = MetricsTimer::start(tx, Duration::from_millis(50));

        assert_ne!(a.id(), b.id());
        assert!(!b.is_current(a.id()));
    }

    #[test]
    fn typing_key_mapping() {
        let plain = |code| KeyEvent::new(code, KeyModifiers::NONE);

        assert_eq!(typing_key(&plain(KeyCode::Char('a'))), TypingKey::Char('a'));
        assert_eq!(
            typing_key(&KeyEvent::new(KeyCode::Char('A'), KeyModifiers::SHIFT)),
            TypingKey::Char('A')
        );
        assert_eq!(typing_key(&plain(KeyCode::Enter)), TypingKey::Enter);
        assert_eq!(typing_key(&plain(KeyCode::Backspace)), TypingKey::Backspace);
        assert_eq!(typing_key(&plain(KeyCode::Tab)), TypingKey::Tab);
        assert_eq!(typing_key(&plain(KeyCode::Left)), TypingKey::Other);
        assert_eq!(
            typing_key(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            TypingKey::Other
        );
    }
}
