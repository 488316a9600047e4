use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, warn};

use crate::session::{CompletionReport, KeyOutcome, Phase, TypingSession};
use crate::style::StyleProfile;
use crate::text_source::TextSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Typing,
    Results,
    Disabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// Glue between the UI event stream, the text source and the engine.
pub struct App {
    pub engine: TypingSession,
    pub style: StyleProfile,
    pub state: AppState,
    pub last_report: Option<CompletionReport>,
    /// One-line message shown under the prompt, e.g. a text source error
    pub notice: Option<String>,
    source: Box<dyn TextSource>,
}

impl App {
    pub fn new(engine: TypingSession, source: Box<dyn TextSource>, style: StyleProfile) -> Self {
        let mut app = Self {
            engine,
            style,
            state: AppState::Disabled,
            last_report: None,
            notice: None,
            source,
        };
        app.load_next();
        app
    }

    pub fn source_label(&self) -> String {
        self.source.describe()
    }

    /// Ask the source for a new text and start over with it
    pub fn load_next(&mut self) {
        match self.source.next_text() {
            Ok(text) => {
                self.notice = None;
                self.load(&text);
            }
            Err(err) => {
                warn!(%err, "text source failed");
                self.notice = Some(err.to_string());
                self.disable();
            }
        }
    }

    /// Start the current text again from scratch
    pub fn restart(&mut self) {
        if self.state == AppState::Disabled {
            return;
        }
        let text = self.engine.target_text();
        self.load(&text);
    }

    pub fn disable(&mut self) {
        self.engine.disable_typing();
        self.last_report = None;
        self.state = AppState::Disabled;
    }

    fn load(&mut self, text: &str) {
        self.engine.load_target(text);
        self.last_report = None;
        self.state = AppState::Typing;
        // An empty text has nothing to type and is never recorded
        if self.engine.phase() == Phase::Complete {
            debug!("empty text loaded");
            self.state = AppState::Results;
        }
    }

    /// Returns whether the clock moved
    pub fn on_tick(&mut self) -> bool {
        self.engine.tick().is_some()
    }

    pub fn on_key(&mut self, key: KeyEvent) -> Control {
        // AltGr arrives as Ctrl+Alt on Windows and must still type characters
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL)
            && !key.modifiers.contains(KeyModifiers::ALT);
        match key.code {
            KeyCode::Esc => return Control::Quit,
            KeyCode::Char('c') if ctrl => return Control::Quit,
            KeyCode::Char('d') if ctrl => self.disable(),
            KeyCode::Tab | KeyCode::Right => self.load_next(),
            KeyCode::Left => self.restart(),
            KeyCode::Backspace => {
                if self.engine.handle_backspace() != KeyOutcome::Ignored
                    && self.state == AppState::Results
                {
                    self.last_report = None;
                    self.state = AppState::Typing;
                }
            }
            KeyCode::Char(c) if !ctrl => match self.state {
                AppState::Typing => self.type_char(c),
                AppState::Results => match c {
                    'r' => self.restart(),
                    'n' => self.load_next(),
                    _ => {}
                },
                AppState::Disabled => {}
            },
            _ => {}
        }
        Control::Continue
    }

    fn type_char(&mut self, c: char) {
        if let KeyOutcome::Completed(report) = self.engine.handle_character(c) {
            self.last_report = Some(report);
            self.state = AppState::Results;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceError;
    use crate::session::RecordStatus;
    use crate::text_source::StaticText;

    struct Rotating {
        texts: Vec<&'static str>,
        next: usize,
    }

    impl TextSource for Rotating {
        fn next_text(&mut self) -> Result<String, SourceError> {
            let text = self.texts[self.next % self.texts.len()];
            self.next += 1;
            Ok(text.to_string())
        }

        fn describe(&self) -> String {
            "rotating".into()
        }
    }

    struct Broken;

    impl TextSource for Broken {
        fn next_text(&mut self) -> Result<String, SourceError> {
            Err(SourceError::EmptyWordList)
        }

        fn describe(&self) -> String {
            "broken".into()
        }
    }

    fn app_with(text: &str) -> App {
        App::new(
            TypingSession::default(),
            Box::new(StaticText::new(text)),
            StyleProfile::default(),
        )
    }

    fn press(app: &mut App, code: KeyCode) -> Control {
        app.on_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn starts_typing_first_text() {
        let app = app_with("hello");
        assert_eq!(app.state, AppState::Typing);
        assert_eq!(app.engine.target_text(), "hello");
        assert_eq!(app.engine.phase(), Phase::Ready);
    }

    #[test]
    fn finishing_shows_results() {
        let mut app = app_with("hi");
        type_str(&mut app, "hi");
        assert_eq!(app.state, AppState::Results);
        let report = app.last_report.as_ref().unwrap();
        assert_eq!(report.metrics.accuracy, 100.0);
        assert_eq!(report.recording, RecordStatus::NoUserBound);
    }

    #[test]
    fn backspace_from_results_reopens() {
        let mut app = app_with("hi");
        type_str(&mut app, "hx");
        assert_eq!(app.state, AppState::Results);
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.state, AppState::Typing);
        assert!(app.last_report.is_none());
        press(&mut app, KeyCode::Char('i'));
        assert_eq!(app.state, AppState::Results);
        assert_eq!(app.last_report.as_ref().unwrap().metrics.accuracy, 100.0);
    }

    #[test]
    fn results_shortcuts() {
        let mut app = App::new(
            TypingSession::default(),
            Box::new(Rotating {
                texts: vec!["ab", "cd"],
                next: 0,
            }),
            StyleProfile::default(),
        );
        type_str(&mut app, "ab");
        press(&mut app, KeyCode::Char('r'));
        assert_eq!(app.state, AppState::Typing);
        assert_eq!(app.engine.target_text(), "ab");

        type_str(&mut app, "ab");
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.engine.target_text(), "cd");
    }

    #[test]
    fn tab_loads_new_text_mid_session() {
        let mut app = App::new(
            TypingSession::default(),
            Box::new(Rotating {
                texts: vec!["one", "two"],
                next: 0,
            }),
            StyleProfile::default(),
        );
        type_str(&mut app, "on");
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.engine.target_text(), "two");
        assert_eq!(app.engine.cursor(), 0);
    }

    #[test]
    fn ctrl_d_disables_typing() {
        let mut app = app_with("abc");
        type_str(&mut app, "a");
        app.on_key(KeyEvent::new(KeyCode::Char('d'), KeyModifiers::CONTROL));
        assert_eq!(app.state, AppState::Disabled);
        assert_eq!(app.engine.phase(), Phase::Idle);
        type_str(&mut app, "bc");
        assert_eq!(app.engine.phase(), Phase::Idle);

        press(&mut app, KeyCode::Tab);
        assert_eq!(app.state, AppState::Typing);
    }

    #[test]
    fn source_failure_disables_with_notice() {
        let app = App::new(
            TypingSession::default(),
            Box::new(Broken),
            StyleProfile::default(),
        );
        assert_eq!(app.state, AppState::Disabled);
        assert_eq!(app.notice.as_deref(), Some("word list contains no words"));
    }

    #[test]
    fn empty_text_goes_straight_to_results() {
        let app = app_with("");
        assert_eq!(app.state, AppState::Results);
        assert!(app.last_report.is_none());
        assert_eq!(app.engine.metrics().accuracy, 100.0);
    }

    #[test]
    fn multi_line_file_can_be_finished() {
        use crate::text_source::FileText;
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "ab\ncd\n").unwrap();
        let mut app = App::new(
            TypingSession::default(),
            Box::new(FileText::new(file.path())),
            StyleProfile::default(),
        );
        assert_eq!(app.engine.target_text(), "ab cd");

        type_str(&mut app, "ab cd");
        assert_eq!(app.engine.phase(), Phase::Complete);
        assert_eq!(app.state, AppState::Results);
        assert_eq!(app.last_report.as_ref().unwrap().metrics.accuracy, 100.0);
    }

    #[test]
    fn altgr_characters_are_typed() {
        let mut app = app_with("a@{");
        let altgr = KeyModifiers::CONTROL | KeyModifiers::ALT;
        press(&mut app, KeyCode::Char('a'));
        app.on_key(KeyEvent::new(KeyCode::Char('@'), altgr));
        assert_eq!(app.engine.cursor(), 2);
        assert_eq!(app.engine.error_count(), 0);

        // a Ctrl+Alt+c from AltGr is a character, not a quit
        let mut app = app_with("c");
        assert_eq!(
            app.on_key(KeyEvent::new(KeyCode::Char('c'), altgr)),
            Control::Continue
        );
        assert_eq!(app.state, AppState::Results);
    }

    #[test]
    fn quit_keys() {
        let mut app = app_with("abc");
        assert_eq!(press(&mut app, KeyCode::Esc), Control::Quit);
        assert_eq!(
            app.on_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Control::Quit
        );
        assert_eq!(press(&mut app, KeyCode::Char('c')), Control::Continue);
    }
}
