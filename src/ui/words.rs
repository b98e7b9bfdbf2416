use ratatui::{
    style::{Color, Modifier, Style},
    text::Span,
};
use unicode_width::UnicodeWidthStr;
use wordrush::session::{CharMark, Session, WordState, WordStatus};

fn bold_style() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

pub fn correct_style() -> Style {
    bold_style().fg(Color::Green)
}

pub fn incorrect_style() -> Style {
    bold_style().fg(Color::Red)
}

pub fn pending_style() -> Style {
    bold_style().add_modifier(Modifier::DIM)
}

pub fn cursor_style() -> Style {
    pending_style().add_modifier(Modifier::UNDERLINED)
}

/// Target characters left untyped in a committed word
fn missed_style() -> Style {
    incorrect_style().add_modifier(Modifier::DIM)
}

fn excess_style() -> Style {
    incorrect_style().add_modifier(Modifier::CROSSED_OUT)
}

/// Display width of the whole prompt including separators
pub fn prompt_width(session: &Session) -> usize {
    session
        .words()
        .iter()
        .map(|w| w.word.width() + w.excess.width() + 1)
        .sum::<usize>()
        .saturating_sub(1)
}

/// Styled spans for every word, with the cursor on the next character to type
pub fn word_spans(session: &Session) -> Vec<Span<'static>> {
    let words = session.words();
    let mut spans = Vec::with_capacity(words.len() * 2);

    for (idx, status) in words.iter().enumerate() {
        let cursor = (idx == session.current_word_index()).then(|| session.current_char_index());
        push_word(&mut spans, status, cursor);

        if idx + 1 < words.len() {
            let typed_past_end = cursor.is_some_and(|c| c >= status.len());
            let style = if typed_past_end {
                cursor_style()
            } else {
                Style::default()
            };
            spans.push(Span::styled(" ", style));
        }
    }

    spans
}

fn push_word(spans: &mut Vec<Span<'static>>, status: &WordStatus, cursor: Option<usize>) {
    match status.state {
        WordState::Pending => spans.push(Span::styled(status.word.clone(), pending_style())),
        WordState::Correct => spans.push(Span::styled(status.word.clone(), correct_style())),
        WordState::Current | WordState::Incorrect => {
            for (i, (c, mark)) in status.word.chars().zip(&status.chars).enumerate() {
                let style = match mark {
                    CharMark::Correct => correct_style(),
                    CharMark::Incorrect => incorrect_style(),
                    CharMark::Pending if cursor == Some(i) => cursor_style(),
                    CharMark::Pending if status.is_committed() => missed_style(),
                    CharMark::Pending => pending_style(),
                };
                spans.push(Span::styled(c.to_string(), style));
            }
            if !status.excess.is_empty() {
                spans.push(Span::styled(status.excess.clone(), excess_style()));
            }
        }
    }
}
