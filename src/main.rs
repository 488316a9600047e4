use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
};

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    cursor, execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tracing::{info, warn};

use tapdrill::{
    app::{App, Control},
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    error::SourceError,
    logging,
    recorder::SqliteRecorder,
    runtime::{CrosstermEventSource, DrillEvent, EventSource, FixedTicker, Runner, Ticker},
    session::TypingSession,
    style::CaretStyle,
    text_source::{
        bundled_word_lists, FileText, SentenceText, StaticText, TextSource, WordListText,
    },
};

/// terminal typing drills with live speed and accuracy
#[derive(Parser, Debug, Clone)]
#[clap(version, about)]
pub struct Cli {
    /// number of words to draw from the word list per text
    #[clap(short = 'w', long)]
    number_of_words: Option<usize>,

    /// type this exact text
    #[clap(short = 'p', long)]
    prompt: Option<String>,

    /// type the contents of a text file
    #[clap(short = 'f', long)]
    file: Option<PathBuf>,

    /// JSON word list to draw words from
    #[clap(long)]
    word_list: Option<PathBuf>,

    /// bundled word list to draw words from
    #[clap(short = 'l', long)]
    list: Option<String>,

    /// number of generated sentences to type instead of words
    #[clap(short = 's', long)]
    sentences: Option<usize>,

    /// user that finished sessions are saved for
    #[clap(short = 'u', long)]
    user: Option<String>,

    /// caret decoration
    #[clap(long, value_enum)]
    caret: Option<CaretStyle>,

    /// timer period in milliseconds
    #[clap(long)]
    tick_ms: Option<u64>,

    /// do not save finished sessions
    #[clap(long)]
    no_record: bool,

    /// persist the effective settings as the new defaults
    #[clap(long)]
    save_config: bool,

    /// print saved sessions for the user and exit
    #[clap(long)]
    history: bool,
}

impl Cli {
    /// Flags override the stored config for this run
    fn apply(&self, mut config: Config) -> Config {
        if let Some(n) = self.number_of_words {
            config.number_of_words = n;
        }
        if let Some(path) = &self.word_list {
            config.word_list = Some(path.clone());
        }
        if let Some(name) = &self.list {
            config.bundled_list = name.clone();
            config.word_list = None;
        }
        if let Some(user) = &self.user {
            config.username = Some(user.clone());
        }
        if let Some(caret) = self.caret {
            config.style.caret = caret;
        }
        if let Some(ms) = self.tick_ms {
            config.tick_rate_ms = ms;
        }
        if self.no_record {
            config.record_sessions = false;
        }
        config
    }
}

fn build_source(cli: &Cli, config: &Config) -> Result<Box<dyn TextSource>, SourceError> {
    if let Some(prompt) = &cli.prompt {
        return Ok(Box::new(StaticText::new(prompt.clone())));
    }
    if let Some(path) = &cli.file {
        return Ok(Box::new(FileText::new(path)));
    }
    if let Some(count) = cli.sentences {
        return Ok(Box::new(SentenceText::new(count)));
    }
    match &config.word_list {
        Some(path) => Ok(Box::new(WordListText::from_file(
            path,
            config.number_of_words,
        )?)),
        None => Ok(Box::new(WordListText::bundled(
            &config.bundled_list,
            config.number_of_words,
        )?)),
    }
}

fn build_engine(config: &Config) -> TypingSession {
    let mut engine = TypingSession::new(config.session_config());
    let Some(user) = &config.username else {
        return engine;
    };
    engine.bind_user(user.clone());

    if !config.record_sessions {
        return engine;
    }
    let Some(db_path) = AppDirs::db_path() else {
        warn!("no state directory, sessions will not be saved");
        return engine;
    };
    match SqliteRecorder::open(&db_path) {
        Ok(recorder) => engine.set_recorder(Some(Box::new(recorder))),
        Err(err) => warn!(%err, path = %db_path.display(), "cannot open session database"),
    }
    engine
}

fn print_history(config: &Config) -> Result<(), Box<dyn Error>> {
    let Some(user) = &config.username else {
        Cli::command()
            .error(ErrorKind::MissingRequiredArgument, "--history needs --user")
            .exit();
    };
    let Some(db_path) = AppDirs::db_path() else {
        return Err("no state directory".into());
    };
    let recorder = SqliteRecorder::open(db_path)?;
    for record in recorder.sessions_for_user(user)? {
        println!(
            "{}  {:>7.2} wpm  {:>6.2}% acc",
            record.recorded_at.format("%Y-%m-%d %H:%M"),
            record.wpm,
            record.accuracy
        );
    }
    if let Some(best) = recorder.best_wpm(user)? {
        println!("best: {best:.2} wpm");
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let log_path = logging::init();

    let store = FileConfigStore::new();
    let config = cli.apply(store.load());
    if cli.save_config {
        store.save(&config)?;
        info!(path = %store.path().display(), "config saved");
    }
    if cli.history {
        return print_history(&config);
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let source = match build_source(&cli, &config) {
        Ok(source) => source,
        Err(err @ SourceError::UnknownWordList { .. }) => Cli::command()
            .error(
                ErrorKind::InvalidValue,
                format!("{err} (bundled: {})", bundled_word_lists().join(", ")),
            )
            .exit(),
        Err(err) => Cli::command().error(ErrorKind::InvalidValue, err).exit(),
    };
    info!(source = %source.describe(), log = ?log_path, "starting");
    let mut app = App::new(build_engine(&config), source, config.style.clone());

    let guard = TerminalGuard::enter()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;

    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(config.session_config().tick_period),
    );
    let result = run_app(&mut terminal, &mut app, runner);

    drop(guard);
    terminal.show_cursor()?;

    result
}

/// Raw mode plus the alternate screen, undone on drop so an error or a panic
/// in the loop still hands back a usable terminal.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        let guard = Self;
        execute!(io::stdout(), EnterAlternateScreen)?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(err) = disable_raw_mode() {
            warn!(%err, "failed to leave raw mode");
        }
        if let Err(err) = execute!(io::stdout(), LeaveAlternateScreen, cursor::Show) {
            warn!(%err, "failed to leave the alternate screen");
        }
    }
}

fn run_app<B: Backend, E: EventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    mut runner: Runner<E, T>,
) -> Result<(), Box<dyn Error>> {
    terminal.draw(|f| f.render_widget(&*app, f.area()))?;

    loop {
        match runner.step() {
            DrillEvent::Tick => {
                // Idle ticks change nothing on screen
                if !app.on_tick() {
                    continue;
                }
            }
            DrillEvent::Resize => {}
            DrillEvent::Closed => {
                warn!("terminal input closed");
                break;
            }
            DrillEvent::Key(key) => {
                if app.on_key(key) == Control::Quit {
                    break;
                }
            }
        }
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;
    }

    Ok(())
}
