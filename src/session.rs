use std::fmt;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::diff::{self, Glyph};
use crate::metrics::{self, Metrics, Snapshot, WpmSample, CHARS_PER_WORD};
use crate::recorder::SessionRecorder;
use crate::style::StyleProfile;

pub const DEFAULT_TICK_RATE_MS: u64 = 200;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionConfig {
    /// Period of the external timer; each tick advances the clock by this much.
    pub tick_period: Duration,
    pub chars_per_word: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_period: Duration::from_millis(DEFAULT_TICK_RATE_MS),
            chars_per_word: CHARS_PER_WORD,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Phase {
    Idle,
    Ready,
    Active,
    Complete,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecordStatus {
    Recorded,
    NoUserBound,
    NoRecorder,
    /// The recorder already ran for this text; a reopened session never records twice.
    AlreadyRecorded,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionReport {
    pub metrics: Metrics,
    pub recording: RecordStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub enum KeyOutcome {
    Ignored,
    Accepted,
    Completed(CompletionReport),
}

/// Per-text state. Positions below `cursor` are typed, the rest are `None`.
#[derive(Debug, Clone, Default)]
struct Session {
    target: Vec<char>,
    typed: Vec<Option<char>>,
    error_flags: Vec<bool>,
    cursor: usize,
    error_count: usize,
    typed_count: usize,
    elapsed_ticks: u64,
    running: bool,
    samples: Vec<WpmSample>,
    recorded: bool,
}

impl Session {
    fn new(text: &str) -> Self {
        let target: Vec<char> = text.chars().collect();
        let len = target.len();
        Self {
            target,
            typed: vec![None; len],
            error_flags: vec![false; len],
            ..Self::default()
        }
    }

    fn is_fully_typed(&self) -> bool {
        self.cursor == self.target.len()
    }

    fn start_timer(&mut self) {
        if !self.running {
            self.elapsed_ticks = 0;
            self.samples.clear();
            self.running = true;
        }
    }

    // Full rescan of the typed prefix, so the count fed to the wpm formula
    // always equals the cursor.
    fn recount_typed(&mut self) {
        self.typed_count = self.typed[..self.cursor]
            .iter()
            .filter(|slot| slot.is_some())
            .count();
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            typed_count: self.typed_count,
            error_count: self.error_count,
            target_len: self.target.len(),
            elapsed_ticks: self.elapsed_ticks,
        }
    }
}

/// The typing engine: one live session at a time, driven by keystrokes and
/// an external periodic tick.
pub struct TypingSession {
    config: SessionConfig,
    session: Option<Session>,
    live: Metrics,
    user: Option<String>,
    recorder: Option<Box<dyn SessionRecorder>>,
}

impl fmt::Debug for TypingSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypingSession")
            .field("config", &self.config)
            .field("session", &self.session)
            .field("live", &self.live)
            .field("user", &self.user)
            .field("recorder", &self.recorder.is_some())
            .finish()
    }
}

impl Default for TypingSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl TypingSession {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            session: None,
            live: Metrics::default(),
            user: None,
            recorder: None,
        }
    }

    pub fn with_recorder(mut self, recorder: Box<dyn SessionRecorder>) -> Self {
        self.recorder = Some(recorder);
        self
    }

    pub fn set_recorder(&mut self, recorder: Option<Box<dyn SessionRecorder>>) {
        self.recorder = recorder;
    }

    pub fn bind_user(&mut self, username: impl Into<String>) {
        self.user = Some(username.into());
    }

    pub fn unbind_user(&mut self) {
        self.user = None;
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Replace the current session with a fresh one for `text`. Whatever was
    /// in progress is dropped without being recorded.
    pub fn load_target(&mut self, text: &str) {
        self.session = Some(Session::new(text));
        self.live = Metrics::default();
        debug!(len = self.target().len(), "target loaded");
    }

    pub fn disable_typing(&mut self) {
        if self.session.take().is_some() {
            self.live = Metrics::default();
            debug!("typing disabled");
        }
    }

    pub fn phase(&self) -> Phase {
        match &self.session {
            None => Phase::Idle,
            Some(s) if s.is_fully_typed() => Phase::Complete,
            Some(s) if s.running => Phase::Active,
            Some(_) => Phase::Ready,
        }
    }

    pub fn handle_character(&mut self, ch: char) -> KeyOutcome {
        let Some(session) = self.session.as_mut() else {
            return KeyOutcome::Ignored;
        };
        if session.is_fully_typed() {
            return KeyOutcome::Ignored;
        }

        if session.cursor == 0 && !session.running {
            session.start_timer();
            debug!("timer started");
        }

        let idx = session.cursor;
        let is_error = ch != session.target[idx];
        session.typed[idx] = Some(ch);
        session.error_flags[idx] = is_error;
        if is_error {
            session.error_count += 1;
        }
        session.cursor += 1;
        session.recount_typed();

        if !session.is_fully_typed() {
            return KeyOutcome::Accepted;
        }

        session.running = false;
        KeyOutcome::Completed(self.complete())
    }

    pub fn handle_backspace(&mut self) -> KeyOutcome {
        let Some(session) = self.session.as_mut() else {
            return KeyOutcome::Ignored;
        };
        if session.cursor == 0 {
            return KeyOutcome::Ignored;
        }

        let reopening = session.is_fully_typed();
        session.cursor -= 1;
        let idx = session.cursor;
        if session.error_flags[idx] {
            session.error_count -= 1;
        }
        session.typed[idx] = None;
        session.error_flags[idx] = false;
        session.recount_typed();

        if reopening && !session.target.is_empty() {
            session.running = true;
            debug!("completed session reopened");
        }
        KeyOutcome::Accepted
    }

    /// Advance the clock by one tick. Returns the fresh live metrics, or
    /// `None` when the timer is not running.
    pub fn tick(&mut self) -> Option<&Metrics> {
        let session = self.session.as_mut().filter(|s| s.running)?;
        session.elapsed_ticks += 1;

        let mut live = Metrics::compute(
            session.snapshot(),
            self.config.tick_period,
            self.config.chars_per_word,
            &[],
        );
        session
            .samples
            .push(WpmSample::new(live.elapsed_secs, live.net_wpm));
        live.consistency = metrics::consistency(&session.samples);
        self.live = live;
        Some(&self.live)
    }

    /// Metrics as of now, computed from the session counters.
    pub fn metrics(&self) -> Metrics {
        match &self.session {
            Some(s) => Metrics::compute(
                s.snapshot(),
                self.config.tick_period,
                self.config.chars_per_word,
                &s.samples,
            ),
            None => Metrics::default(),
        }
    }

    /// Metrics from the most recent tick or completion.
    pub fn live_metrics(&self) -> &Metrics {
        &self.live
    }

    pub fn render(&self, style: &StyleProfile) -> Vec<Glyph> {
        match &self.session {
            Some(s) => diff::project(&s.target, &s.typed, &s.error_flags, s.cursor, style),
            None => Vec::new(),
        }
    }

    fn complete(&mut self) -> CompletionReport {
        let metrics = self.metrics();
        self.live = metrics.clone();
        let recording = self.report(&metrics);
        info!(
            raw_wpm = metrics.raw_wpm,
            net_wpm = metrics.net_wpm,
            accuracy = metrics.accuracy,
            ?recording,
            "session complete"
        );
        CompletionReport { metrics, recording }
    }

    fn report(&mut self, metrics: &Metrics) -> RecordStatus {
        let Some(session) = self.session.as_mut() else {
            return RecordStatus::NoUserBound;
        };
        if session.recorded {
            return RecordStatus::AlreadyRecorded;
        }
        let Some(user) = self.user.as_deref() else {
            return RecordStatus::NoUserBound;
        };
        let Some(recorder) = self.recorder.as_mut() else {
            return RecordStatus::NoRecorder;
        };

        session.recorded = true;
        match recorder.record(user, metrics.net_wpm, metrics.accuracy) {
            Ok(()) => RecordStatus::Recorded,
            Err(err) => {
                warn!(%err, user, "failed to record session");
                RecordStatus::Failed(err.to_string())
            }
        }
    }

    pub fn target(&self) -> &[char] {
        self.session
            .as_ref()
            .map(|s| s.target.as_slice())
            .unwrap_or_default()
    }

    pub fn target_text(&self) -> String {
        self.target().iter().collect()
    }

    pub fn typed(&self) -> &[Option<char>] {
        self.session
            .as_ref()
            .map(|s| s.typed.as_slice())
            .unwrap_or_default()
    }

    pub fn error_flags(&self) -> &[bool] {
        self.session
            .as_ref()
            .map(|s| s.error_flags.as_slice())
            .unwrap_or_default()
    }

    pub fn cursor(&self) -> usize {
        self.session.as_ref().map_or(0, |s| s.cursor)
    }

    pub fn error_count(&self) -> usize {
        self.session.as_ref().map_or(0, |s| s.error_count)
    }

    pub fn typed_count(&self) -> usize {
        self.session.as_ref().map_or(0, |s| s.typed_count)
    }

    pub fn elapsed_ticks(&self) -> u64 {
        self.session.as_ref().map_or(0, |s| s.elapsed_ticks)
    }

    pub fn is_running(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.running)
    }

    pub fn samples(&self) -> &[WpmSample] {
        self.session
            .as_ref()
            .map(|s| s.samples.as_slice())
            .unwrap_or_default()
    }
}
