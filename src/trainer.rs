use std::sync::mpsc::Sender;
use std::time::Duration;

use tracing::warn;

use crate::clock::Clock;
use crate::language::WordSource;
use crate::metrics::Metrics;
use crate::runtime::{AppEvent, MetricsTimer, TickId};
use crate::session::{Session, SessionError, Transition, TypingKey};

struct TickSink {
    tx: Sender<AppEvent>,
    interval: Duration,
}

/// Drives a [`Session`] for the UI: owns the word source, the clock, the
/// current [`Metrics`] and the periodic metrics timer.
///
/// The timer runs exactly while the session is active. Every transition out
/// of the active state stops it before anything else happens, and ticks from
/// a stopped timer are ignored by [`Trainer::on_tick`].
pub struct Trainer {
    session: Session,
    metrics: Metrics,
    source: Box<dyn WordSource>,
    clock: Box<dyn Clock>,
    timer: Option<MetricsTimer>,
    ticks: Option<TickSink>,
}

impl Trainer {
    pub fn new(
        mut source: Box<dyn WordSource>,
        clock: Box<dyn Clock>,
        number_of_words: usize,
    ) -> Result<Self, SessionError> {
        let session = Session::new(source.generate_words(number_of_words), number_of_words)?;
        Ok(Self {
            session,
            metrics: Metrics::default(),
            source,
            clock,
            timer: None,
            ticks: None,
        })
    }

    /// Periodic recomputation is only scheduled once a tick queue is attached.
    pub fn with_ticks(mut self, tx: Sender<AppEvent>, interval: Duration) -> Self {
        self.ticks = Some(TickSink { tx, interval });
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn timer_id(&self) -> Option<TickId> {
        self.timer.as_ref().map(MetricsTimer::id)
    }

    pub fn start(&mut self) -> Transition {
        let transition = self.session.start(self.clock.now());
        self.apply(transition)
    }

    pub fn pause(&mut self) -> Transition {
        let transition = self.session.pause(self.clock.now());
        self.apply(transition)
    }

    /// Pause button: pauses an active session, resumes a paused one.
    pub fn toggle_pause(&mut self) -> Transition {
        if self.session.is_active() {
            self.pause()
        } else if self.session.is_paused() {
            self.start()
        } else {
            Transition::Unchanged
        }
    }

    /// Fetches a fresh word list. If the source breaks its contract the
    /// current session is kept as it was.
    pub fn reset(&mut self) -> Result<Transition, SessionError> {
        let words = self.source.generate_words(self.session.word_count());
        match self.session.reset(words) {
            Ok(transition) => Ok(self.apply(transition)),
            Err(e) => {
                warn!(
                    error = %e,
                    "word source returned an unusable list; keeping current words"
                );
                Err(e)
            }
        }
    }

    pub fn on_key_down(&mut self, key: TypingKey) -> Transition {
        let transition = self.session.on_key_down(key, self.clock.now());
        self.apply(transition)
    }

    pub fn on_input_change(&mut self, buffer: &str) -> Transition {
        let transition = self.session.on_input_change(buffer, self.clock.now());
        self.apply(transition)
    }

    /// Applies a key press the way a text field would: the key-down hook runs
    /// first, then the edited buffer is fed as an input change.
    pub fn type_key(&mut self, key: TypingKey) -> Transition {
        let started = self.on_key_down(key);

        let mut buffer = self.session.current_input().to_string();
        match key {
            TypingKey::Char(c) if !c.is_control() => buffer.push(c),
            TypingKey::Backspace => {
                buffer.pop();
            }
            _ => return started,
        }

        match self.on_input_change(&buffer) {
            Transition::Unchanged | Transition::Updated if started == Transition::Started => {
                Transition::Started
            }
            other => other,
        }
    }

    /// Returns whether the tick was accepted. Ticks from a replaced or
    /// stopped timer are no-ops.
    pub fn on_tick(&mut self, id: TickId) -> bool {
        let current = self
            .timer
            .as_ref()
            .is_some_and(|timer| timer.is_current(id));
        if !current || !self.session.is_active() {
            return false;
        }
        self.refresh_metrics();
        true
    }

    pub fn refresh_metrics(&mut self) {
        self.metrics = Metrics::compute(
            self.session.elapsed(self.clock.now()),
            self.session.words(),
            self.session.current_word_index(),
        );
    }

    fn apply(&mut self, transition: Transition) -> Transition {
        match transition {
            Transition::Started => {
                self.arm_timer();
                self.refresh_metrics();
            }
            Transition::Paused | Transition::Completed => {
                self.disarm_timer();
                self.refresh_metrics();
            }
            Transition::Committed => self.refresh_metrics(),
            Transition::Reset => {
                self.disarm_timer();
                self.metrics = Metrics::default();
            }
            Transition::Updated | Transition::Unchanged => {}
        }
        transition
    }

    fn arm_timer(&mut self) {
        self.disarm_timer();
        if let Some(sink) = &self.ticks {
            self.timer = Some(MetricsTimer::start(sink.tx.clone(), sink.interval));
        }
    }

    fn disarm_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.stop();
        }
    }
}
