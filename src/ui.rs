pub mod words;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Gauge, Paragraph, Widget, Wrap},
};
use wordrush::session::{Lifecycle, WordState};

use crate::App;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let session = self.trainer.session();

        if session.is_complete() {
            render_results(self, area, buf);
            return;
        }

        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_bold_style = bold_style.add_modifier(Modifier::DIM);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);

        let max_chars_per_line = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1);
        let prompt_width = words::prompt_width(session);
        let prompt_occupied_lines = if prompt_width <= max_chars_per_line as usize {
            1
        } else {
            ((prompt_width as f64 / max_chars_per_line as f64).ceil() + 1.0) as u16
        };

        let padding = area.height.saturating_sub(prompt_occupied_lines + 4) / 2;
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .constraints([
                Constraint::Length(padding),
                Constraint::Length(1), // stats
                Constraint::Length(1), // progress
                Constraint::Length(1),
                Constraint::Length(prompt_occupied_lines),
                Constraint::Min(0),
                Constraint::Length(1), // legend
            ])
            .split(area);

        let metrics = self.trainer.metrics();
        let stats = Paragraph::new(Span::styled(
            format!(
                "{} wpm   {}% acc   {}s   {}/{} words",
                metrics.wpm,
                metrics.accuracy,
                metrics.time_elapsed_secs,
                session.current_word_index(),
                session.word_count()
            ),
            dim_bold_style,
        ))
        .alignment(Alignment::Center);
        stats.render(chunks[1], buf);

        let progress = Gauge::default()
            .gauge_style(Style::default().fg(Color::Magenta))
            .label(format!("{}%", metrics.progress))
            .ratio(f64::from(metrics.progress.min(100)) / 100.0);
        progress.render(chunks[2], buf);

        if session.lifecycle() == Lifecycle::Paused {
            let paused = Paragraph::new(Span::styled(
                "PAUSED - press (tab) to continue typing",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD | Modifier::ITALIC),
            ))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
            paused.render(chunks[4], buf);
        } else {
            let prompt = Paragraph::new(Line::from(words::word_spans(session)))
                .alignment(if prompt_occupied_lines == 1 {
                    // when the prompt is small enough to fit on one line
                    // centering the text gives a nice zen feeling
                    Alignment::Center
                } else {
                    Alignment::Left
                })
                .wrap(Wrap { trim: true });
            prompt.render(chunks[4], buf);
        }

        let legend = if session.has_started() {
            "(tab) pause / (→) new words / (esc)ape"
        } else {
            "start typing to begin / (→) new words / (esc)ape"
        };
        Paragraph::new(Span::styled(legend, italic_style)).render(chunks[6], buf);
    }
}

fn render_results(app: &App, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);
    let session = app.trainer.session();
    let metrics = app.trainer.metrics();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(1), // stats
            Constraint::Length(1), // word tally
            Constraint::Min(1),
            Constraint::Length(1), // legend
        ])
        .split(area);

    let stats = Paragraph::new(Span::styled(
        format!(
            "{} wpm   {}% acc   {}s",
            metrics.wpm, metrics.accuracy, metrics.time_elapsed_secs
        ),
        bold_style,
    ))
    .alignment(Alignment::Center);
    stats.render(chunks[1], buf);

    let correct_words = session
        .words()
        .iter()
        .filter(|w| w.state == WordState::Correct)
        .count();
    let tally = Paragraph::new(Span::styled(
        format!(
            "{correct_words}/{} words correct   {}/{} chars",
            session.word_count(),
            metrics.correct_chars,
            metrics.total_chars
        ),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center);
    tally.render(chunks[2], buf);

    Paragraph::new(Span::styled("(n)ew / (esc)ape", italic_style)).render(chunks[4], buf);
}
