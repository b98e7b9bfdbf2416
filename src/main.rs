pub mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    sync::mpsc::Sender,
};
use tracing::{info, warn};
use wordrush::{
    app_dirs::AppDirs,
    clock::SystemClock,
    config::{Config, ConfigStore, FileConfigStore},
    language::{FixedWordSource, RandomWordSource, SupportedLanguage, WordSource},
    logging,
    runtime::{self, AppEvent, CrosstermEventSource, EventSource, FixedTicker, Runner, Ticker},
    trainer::Trainer,
};

/// terminal typing trainer with live per-character feedback
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal typing trainer: type the words shown, watch every character light up, and follow your wpm and accuracy live."
)]
pub struct Cli {
    /// number of words to use in test
    #[clap(short = 'w', long)]
    number_of_words: Option<usize>,

    /// custom prompt to use
    #[clap(short = 'p', long)]
    prompt: Option<String>,

    /// language to pull words from
    #[clap(short = 'l', long, value_enum)]
    supported_language: Option<SupportedLanguage>,

    /// milliseconds between live stat refreshes (10 to 100)
    #[clap(long)]
    tick_rate_ms: Option<u64>,

    /// log verbosity written to the log file (error, warn, info, debug, trace)
    #[clap(long)]
    log_level: Option<String>,

    /// store the effective settings as the new defaults
    #[clap(long)]
    save_config: bool,
}

/// Settings in effect for this run: config file values overridden by flags
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeSettings {
    pub number_of_words: usize,
    pub prompt: Option<String>,
    pub supported_language: SupportedLanguage,
    pub tick_rate_ms: u64,
    pub log_level: String,
}

impl RuntimeSettings {
    pub fn resolve(cli: &Cli, config: &Config) -> Self {
        Self {
            number_of_words: cli.number_of_words.unwrap_or(config.number_of_words),
            prompt: cli.prompt.clone(),
            supported_language: cli.supported_language.unwrap_or_else(|| {
                SupportedLanguage::from_config_name(&config.supported_language)
            }),
            tick_rate_ms: cli.tick_rate_ms.unwrap_or(config.tick_rate_ms),
            log_level: cli
                .log_level
                .clone()
                .unwrap_or_else(|| config.log_level.clone()),
        }
    }

    pub fn to_config(&self) -> Config {
        Config {
            number_of_words: self.number_of_words,
            supported_language: self.supported_language.to_string(),
            tick_rate_ms: self.tick_rate_ms,
            log_level: self.log_level.clone(),
        }
    }
}

pub struct App {
    pub trainer: Trainer,
    pub settings: RuntimeSettings,
}

impl App {
    pub fn new(
        settings: RuntimeSettings,
        ticks: Option<Sender<AppEvent>>,
    ) -> Result<Self, Box<dyn Error>> {
        let (source, number_of_words): (Box<dyn WordSource>, usize) = match &settings.prompt {
            Some(prompt) => {
                let source = FixedWordSource::new(prompt);
                if source.is_empty() {
                    return Err("custom prompt has no words".into());
                }
                let count = source.len();
                (Box::new(source), count)
            }
            None => {
                let language = settings.supported_language.as_lang()?;
                (
                    Box::new(RandomWordSource::new(language)),
                    settings.number_of_words,
                )
            }
        };

        let mut trainer = Trainer::new(source, Box::new(SystemClock), number_of_words)?;
        if let Some(tx) = ticks {
            trainer = trainer.with_ticks(tx, settings.to_config().tick_interval());
        }

        Ok(Self { trainer, settings })
    }

    fn new_words(&mut self) {
        if let Err(e) = self.trainer.reset() {
            warn!(error = %e, "reset rejected");
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopControl {
    Continue,
    Quit,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let store = FileConfigStore::new();
    let settings = RuntimeSettings::resolve(&cli, &store.load());
    let config = settings.to_config();

    let log_path = AppDirs::log_path();
    if let Err(e) = logging::init_file_logging(&log_path, config.level()) {
        eprintln!("logging disabled for {}: {}", log_path.display(), e);
    }

    if cli.save_config {
        store.save(&config)?;
        info!(path = %store.path().display(), "saved config");
    }

    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(config.tick_interval()),
    );
    let mut app = App::new(settings, Some(runner.sender()))?;
    info!(
        words = app.trainer.session().word_count(),
        "starting trainer"
    );

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend, E: EventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, T>,
) -> Result<(), Box<dyn Error>> {
    loop {
        terminal.draw(|f| ui(app, f))?;

        match runner.step() {
            Some(AppEvent::Key(key)) => {
                if handle_key(app, key) == LoopControl::Quit {
                    break;
                }
            }
            Some(AppEvent::Tick(id)) => {
                app.trainer.on_tick(id);
            }
            Some(AppEvent::Resize) | None => {}
        }
    }

    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) -> LoopControl {
    if key.kind != KeyEventKind::Press {
        return LoopControl::Continue;
    }

    match key.code {
        KeyCode::Esc => return LoopControl::Quit,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            return LoopControl::Quit
        }
        KeyCode::Right => app.new_words(),
        KeyCode::Tab => {
            app.trainer.toggle_pause();
        }
        KeyCode::Char('n') | KeyCode::Enter if app.trainer.session().is_complete() => {
            app.new_words()
        }
        _ if app.trainer.session().is_complete() => {}
        _ => {
            app.trainer.type_key(runtime::typing_key(&key));
        }
    }

    LoopControl::Continue
}

fn ui(app: &App, f: &mut Frame) {
    f.render_widget(app, f.area());
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use wordrush::session::{Lifecycle, WordState};

    pub(crate) fn test_settings(prompt: Option<&str>) -> RuntimeSettings {
        RuntimeSettings {
            number_of_words: 5,
            prompt: prompt.map(str::to_string),
            supported_language: SupportedLanguage::English,
            tick_rate_ms: 100,
            log_level: "info".to_string(),
        }
    }

    pub(crate) fn test_app(prompt: &str) -> App {
        App::new(test_settings(Some(prompt)), None).unwrap()
    }

    fn press(app: &mut App, code: KeyCode) -> LoopControl {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_str(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["wordrush"]);

        assert_eq!(cli.number_of_words, None);
        assert_eq!(cli.prompt, None);
        assert_eq!(cli.supported_language, None);
        assert!(!cli.save_config);
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::parse_from([
            "wordrush",
            "-w",
            "40",
            "-l",
            "english-short",
            "--tick-rate-ms",
            "50",
            "--log-level",
            "debug",
        ]);

        assert_eq!(cli.number_of_words, Some(40));
        assert_eq!(
            cli.supported_language,
            Some(SupportedLanguage::EnglishShort)
        );
        assert_eq!(cli.tick_rate_ms, Some(50));
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_settings_prefer_cli_over_config() {
        let cli = Cli::parse_from(["wordrush", "-w", "12"]);
        let config = Config {
            number_of_words: 30,
            supported_language: "english_short".into(),
            tick_rate_ms: 60,
            log_level: "warn".into(),
        };

        let settings = RuntimeSettings::resolve(&cli, &config);

        assert_eq!(settings.number_of_words, 12);
        assert_eq!(settings.supported_language, SupportedLanguage::EnglishShort);
        assert_eq!(settings.tick_rate_ms, 60);
        assert_eq!(settings.log_level, "warn");
        assert_eq!(settings.to_config().number_of_words, 12);
        assert_eq!(settings.to_config().supported_language, "english_short");
    }

    #[test]
    fn test_app_new_with_words() {
        let app = App::new(test_settings(None), None).unwrap();

        assert_eq!(app.trainer.session().word_count(), 5);
        assert_eq!(app.trainer.session().lifecycle(), Lifecycle::Inactive);
    }

    #[test]
    fn test_app_new_with_custom_prompt() {
        let app = test_app("one two three");

        let words: Vec<&str> = app
            .trainer
            .session()
            .words()
            .iter()
            .map(|w| w.word.as_str())
            .collect();
        assert_eq!(words, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_app_rejects_blank_prompt() {
        assert!(App::new(test_settings(Some("   ")), None).is_err());
    }

    #[test]
    fn test_typing_session_through_keys() {
        let mut app = test_app("hi yo");

        type_str(&mut app, "hi yo ");

        let session = app.trainer.session();
        assert!(session.is_complete());
        assert!(session
            .words()
            .iter()
            .all(|w| w.state == WordState::Correct));
        assert_eq!(app.trainer.metrics().accuracy, 100);
    }

    #[test]
    fn test_keys_ignored_after_completion() {
        let mut app = test_app("hi");
        type_str(&mut app, "hi ");

        type_str(&mut app, "x");

        assert!(app.trainer.session().is_complete());
        assert_eq!(app.trainer.session().current_input(), "");
    }

    #[test]
    fn test_tab_toggles_pause() {
        let mut app = test_app("hello world");
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.trainer.session().lifecycle(), Lifecycle::Inactive);

        type_str(&mut app, "he");
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.trainer.session().lifecycle(), Lifecycle::Paused);

        type_str(&mut app, "l");
        assert_eq!(app.trainer.session().current_input(), "he");

        press(&mut app, KeyCode::Tab);
        assert_eq!(app.trainer.session().lifecycle(), Lifecycle::Active);
    }

    #[test]
    fn test_new_words_resets_session() {
        let mut app = test_app("hi yo");
        type_str(&mut app, "hi ");

        press(&mut app, KeyCode::Right);

        let session = app.trainer.session();
        assert_eq!(session.lifecycle(), Lifecycle::Inactive);
        assert_eq!(session.current_word_index(), 0);
    }

    #[test]
    fn test_n_starts_new_round_after_completion() {
        let mut app = test_app("hi");
        type_str(&mut app, "hi ");

        press(&mut app, KeyCode::Char('n'));

        assert!(!app.trainer.session().is_complete());
        assert_eq!(app.trainer.session().lifecycle(), Lifecycle::Inactive);
    }

    #[test]
    fn test_quit_keys() {
        let mut app = test_app("hi");
        assert_eq!(press(&mut app, KeyCode::Esc), LoopControl::Quit);
        assert_eq!(
            handle_key(
                &mut app,
                KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)
            ),
            LoopControl::Quit
        );
        assert_eq!(press(&mut app, KeyCode::Char('h')), LoopControl::Continue);
    }

    #[test]
    fn test_ui_function_renders() {
        use ratatui::{backend::TestBackend, Terminal};

        let app = test_app("test words");
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();

        terminal.draw(|f| ui(&app, f)).unwrap();

        let buffer = terminal.backend().buffer();
        let content: String = buffer.content.iter().map(|c| c.symbol()).collect();
        assert!(content.contains("test words"));
    }
}
