use std::time::Duration;

use crate::session::{WordState, WordStatus};

/// Characters per "word" for wpm purposes
pub const CHARS_PER_WORD: f64 = 5.0;

/// Live typing statistics, always derived from a session snapshot
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Metrics {
    pub wpm: u32,
    pub accuracy: u32,
    pub time_elapsed_secs: u64,
    pub correct_chars: usize,
    pub total_chars: usize,
    /// Percentage of words committed
    pub progress: u32,
}

impl Default for Metrics {
    fn default() -> Self {
        Self {
            wpm: 0,
            accuracy: 100,
            time_elapsed_secs: 0,
            correct_chars: 0,
            total_chars: 0,
            progress: 0,
        }
    }
}

impl Metrics {
    /// Only words before `current_word_index` count; each contributes its
    /// length plus one for the separator keystroke.
    pub fn compute(elapsed: Duration, words: &[WordStatus], current_word_index: usize) -> Self {
        let committed = &words[..current_word_index.min(words.len())];

        let (correct_chars, total_chars) =
            committed
                .iter()
                .fold((0usize, 0usize), |(correct, total), word| {
                    let keystrokes = word.len() + 1;
                    if word.state == WordState::Correct {
                        (correct + keystrokes, total + keystrokes)
                    } else {
                        (correct, total + keystrokes)
                    }
                });

        let elapsed_secs = elapsed.as_secs_f64();

        Self {
            wpm: wpm(correct_chars, elapsed_secs),
            accuracy: accuracy(correct_chars, total_chars),
            time_elapsed_secs: (elapsed.as_millis() as f64 / 1000.0).round() as u64,
            correct_chars,
            total_chars,
            progress: progress(committed.len(), words.len()),
        }
    }
}

/// Net words per minute from correct keystrokes
pub fn wpm(correct_chars: usize, elapsed_secs: f64) -> u32 {
    if elapsed_secs <= 0.0 {
        return 0;
    }
    let minutes = elapsed_secs / 60.0;
    ((correct_chars as f64 / CHARS_PER_WORD) / minutes).round() as u32
}

/// Percentage of keystrokes in correct words; perfect before anything is committed
pub fn accuracy(correct_chars: usize, total_chars: usize) -> u32 {
    if total_chars == 0 {
        return 100;
    }
    ((correct_chars as f64 / total_chars as f64) * 100.0).round() as u32
}

pub fn progress(committed: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((committed as f64 / total as f64) * 100.0).round() as u32
}
