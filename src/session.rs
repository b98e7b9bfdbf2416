use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, info};

/// Keystroke that commits the current word
pub const SEPARATOR: char = ' ';

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CharMark {
    Pending,
    Correct,
    Incorrect,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WordState {
    Pending,
    Current,
    Correct,
    Incorrect,
}

/// Typing progress on a single target word
#[derive(Clone, Debug, PartialEq)]
pub struct WordStatus {
    pub word: String,
    pub state: WordState,
    /// One mark per character of `word`
    pub chars: Vec<CharMark>,
    /// Sticky for the lifetime of this word once any mismatch was seen
    pub has_errors: bool,
    /// Characters typed past the end of `word`
    pub excess: String,
    /// Trimmed submission, set once the word is committed
    pub user_input: Option<String>,
}

impl WordStatus {
    pub fn new(word: String, state: WordState) -> Self {
        let chars = vec![CharMark::Pending; word.chars().count()];
        Self {
            word,
            state,
            chars,
            has_errors: false,
            excess: String::new(),
            user_input: None,
        }
    }

    pub fn is_committed(&self) -> bool {
        matches!(self.state, WordState::Correct | WordState::Incorrect)
    }

    /// Number of characters in the target word
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    fn mark_pending(&mut self) {
        self.chars.fill(CharMark::Pending);
        self.excess.clear();
    }

    /// Re-marks every position against `typed`. Positions past the end of
    /// `typed` go back to pending, overflow lands in `excess`.
    fn apply_input(&mut self, typed: &str) {
        let mut typed_chars = typed.chars();

        for (mark, expected) in self.chars.iter_mut().zip(self.word.chars()) {
            *mark = match typed_chars.next() {
                Some(c) if c == expected => CharMark::Correct,
                Some(_) => {
                    self.has_errors = true;
                    CharMark::Incorrect
                }
                None => CharMark::Pending,
            };
        }

        self.excess = typed_chars.collect();
        if !self.excess.is_empty() {
            self.has_errors = true;
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    Inactive,
    Active,
    Paused,
    Complete,
}

/// Key presses the session cares about, decoupled from the terminal backend
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypingKey {
    Char(char),
    Enter,
    Backspace,
    Tab,
    Other,
}

impl TypingKey {
    /// Whether pressing this key on a fresh session starts the clock
    pub fn triggers_start(&self) -> bool {
        match self {
            TypingKey::Char(c) => !c.is_control(),
            TypingKey::Enter | TypingKey::Backspace => true,
            TypingKey::Tab | TypingKey::Other => false,
        }
    }
}

/// What a session operation changed, so the owner can react (timers, metrics)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    Unchanged,
    Updated,
    Started,
    Paused,
    Committed,
    Completed,
    Reset,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("word list is empty")]
    NoWords,
    #[error("word source returned {actual} words, expected {expected}")]
    WrongWordCount { expected: usize, actual: usize },
    #[error("word {index} is empty")]
    EmptyWord { index: usize },
    #[error("word {index} contains a separator")]
    SeparatorInWord { index: usize },
}

fn validate_words(words: &[String], expected: usize) -> Result<(), SessionError> {
    if expected == 0 {
        return Err(SessionError::NoWords);
    }
    if words.len() != expected {
        return Err(SessionError::WrongWordCount {
            expected,
            actual: words.len(),
        });
    }
    for (index, word) in words.iter().enumerate() {
        if word.is_empty() {
            return Err(SessionError::EmptyWord { index });
        }
        if word.contains(char::is_whitespace) {
            return Err(SessionError::SeparatorInWord { index });
        }
    }
    Ok(())
}

fn build_statuses(words: Vec<String>) -> Vec<WordStatus> {
    words
        .into_iter()
        .enumerate()
        .map(|(i, word)| {
            let state = if i == 0 {
                WordState::Current
            } else {
                WordState::Pending
            };
            WordStatus::new(word, state)
        })
        .collect()
}

/// Input-tracking state machine for one pass over a word list.
///
/// All mutation goes through [`Session::on_input_change`] and
/// [`Session::on_key_down`] plus the `start`/`pause`/`reset` lifecycle calls.
/// Timestamps are passed in by the caller so the machine itself never reads a
/// clock.
#[derive(Debug, Clone)]
pub struct Session {
    words: Vec<WordStatus>,
    current_word_index: usize,
    current_input: String,
    current_char_index: usize,
    lifecycle: Lifecycle,
    elapsed_before_resume: Duration,
    resumed_at: Option<Instant>,
}

impl Session {
    /// Builds a fresh session, requiring exactly `expected` non-empty words.
    pub fn new(words: Vec<String>, expected: usize) -> Result<Self, SessionError> {
        validate_words(&words, expected)?;
        Ok(Self {
            words: build_statuses(words),
            current_word_index: 0,
            current_input: String::new(),
            current_char_index: 0,
            lifecycle: Lifecycle::Inactive,
            elapsed_before_resume: Duration::ZERO,
            resumed_at: None,
        })
    }

    pub fn words(&self) -> &[WordStatus] {
        &self.words
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    pub fn current_word_index(&self) -> usize {
        self.current_word_index
    }

    pub fn current_input(&self) -> &str {
        &self.current_input
    }

    pub fn current_char_index(&self) -> usize {
        self.current_char_index
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_active(&self) -> bool {
        self.lifecycle == Lifecycle::Active
    }

    pub fn is_paused(&self) -> bool {
        self.lifecycle == Lifecycle::Paused
    }

    pub fn is_complete(&self) -> bool {
        self.current_word_index == self.words.len()
    }

    pub fn has_started(&self) -> bool {
        self.lifecycle != Lifecycle::Inactive
    }

    /// Active typing time; paused intervals are not counted.
    pub fn elapsed(&self, now: Instant) -> Duration {
        let running = self
            .resumed_at
            .map(|at| now.saturating_duration_since(at))
            .unwrap_or_default();
        self.elapsed_before_resume + running
    }

    pub fn start(&mut self, now: Instant) -> Transition {
        match self.lifecycle {
            Lifecycle::Inactive | Lifecycle::Paused => {
                self.lifecycle = Lifecycle::Active;
                self.resumed_at = Some(now);
                debug!(word = self.current_word_index, "session started");
                Transition::Started
            }
            Lifecycle::Active | Lifecycle::Complete => Transition::Unchanged,
        }
    }

    pub fn pause(&mut self, now: Instant) -> Transition {
        if self.lifecycle != Lifecycle::Active {
            return Transition::Unchanged;
        }
        self.stop_clock(now);
        self.lifecycle = Lifecycle::Paused;
        debug!(word = self.current_word_index, "session paused");
        Transition::Paused
    }

    /// Replaces the word list wholesale. The new list must have the same
    /// length as the current one; on error the session is left untouched.
    pub fn reset(&mut self, words: Vec<String>) -> Result<Transition, SessionError> {
        *self = Self::new(words, self.words.len())?;
        info!(words = self.words.len(), "session reset");
        Ok(Transition::Reset)
    }

    pub fn on_key_down(&mut self, key: TypingKey, now: Instant) -> Transition {
        if self.lifecycle == Lifecycle::Inactive
            && self.current_word_index == 0
            && key.triggers_start()
        {
            return self.start(now);
        }
        Transition::Unchanged
    }

    /// Feeds the full uncommitted buffer for the current word. Ignored unless
    /// the session is active.
    pub fn on_input_change(&mut self, buffer: &str, now: Instant) -> Transition {
        if self.lifecycle != Lifecycle::Active {
            return Transition::Unchanged;
        }

        if buffer.ends_with(SEPARATOR) {
            self.commit(buffer.trim(), now)
        } else {
            self.track(buffer);
            Transition::Updated
        }
    }

    fn track(&mut self, buffer: &str) {
        if let Some(word) = self.words.get_mut(self.current_word_index) {
            word.apply_input(buffer);
        }
        self.current_input = buffer.to_owned();
        self.current_char_index = buffer.chars().count();
    }

    fn commit(&mut self, submitted: &str, now: Instant) -> Transition {
        if submitted.is_empty() {
            // stray separators never produce an empty word
            self.clear_input();
            return Transition::Unchanged;
        }

        let index = self.current_word_index;
        let Some(current) = self.words.get(index) else {
            return Transition::Unchanged;
        };

        let mut committed = current.clone();
        committed.apply_input(submitted);
        committed.state = if submitted == committed.word && !committed.has_errors {
            WordState::Correct
        } else {
            WordState::Incorrect
        };
        committed.user_input = Some(submitted.to_owned());
        debug!(
            word = index,
            correct = committed.state == WordState::Correct,
            "word committed"
        );

        self.words[index] = committed;
        self.current_word_index = index + 1;
        self.clear_input();

        if let Some(next) = self.words.get_mut(self.current_word_index) {
            next.state = WordState::Current;
            next.mark_pending();
            Transition::Committed
        } else {
            self.stop_clock(now);
            self.lifecycle = Lifecycle::Complete;
            info!(
                words = self.words.len(),
                elapsed_ms = self.elapsed_before_resume.as_millis() as u64,
                "session complete"
            );
            Transition::Completed
        }
    }

    fn clear_input(&mut self) {
        self.current_input.clear();
        self.current_char_index = 0;
    }

    fn stop_clock(&mut self, now: Instant) {
        if let Some(at) = self.resumed_at.take() {
            self.elapsed_before_resume += now.saturating_duration_since(at);
        }
    }
}
