//! Main TUI application state machine.
//!
//! Handles:
//! - Screen navigation
//! - Input event handling, including dropped (pasted) file paths
//! - Background analysis and preview decoding

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use percent_encoding::percent_decode_str;
use crossterm::{
    event::{
        self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEventKind,
        KeyModifiers,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};

use crate::adapters::HttpAnalysisApi;
use crate::application::{
    AnalysisService, AnalysisStage, LesionTypeSelector, ResultsRegion, ScrollTarget,
    UploadAndAnalyzeFlow,
};
use crate::config::Config;
use crate::domain::{IntakeSource, LesionType};
use crate::ports::AnalysisApi;
use crate::DermadetectError;

use super::ui::{
    about::render_about,
    analyze::{render_analyze, AnalyzeFormState, AnalyzeView, Slot},
    render_alert, render_disclaimer, render_header,
};
use super::worker::{
    AnalysisPoll, AnalysisProgress, AnalysisWorker, AnalysisWorkerHandle, PreviewDecoder,
};

/// Current screen/view in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Analyze,
    About,
}

/// Main application state
pub struct App<A = HttpAnalysisApi>
where
    A: AnalysisApi + 'static,
{
    /// Current screen
    screen: Screen,

    /// Whether the app should quit
    should_quit: bool,

    /// Upload-then-predict sequence shared with workers
    service: Arc<AnalysisService<A>>,

    flow: UploadAndAnalyzeFlow,

    form: AnalyzeFormState,

    /// Lesion type browser; `None` when the catalog is empty
    selector: Option<LesionTypeSelector>,

    /// Pending analysis worker (if running)
    pending_worker: Option<AnalysisWorkerHandle>,

    previews: PreviewDecoder,

    /// Current analysis stage (for the loading skeleton)
    stage: Option<AnalysisStage>,

    /// Keyboard focus is on the results pane
    results_focused: bool,
}

impl App<HttpAnalysisApi> {
    /// Create a new application instance talking to the configured service.
    ///
    /// For more control, use `with_dependencies()`.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self> {
        let api = HttpAnalysisApi::new(&config.api)
            .with_context(|| format!("Failed to set up client for {}", config.api.base_url))?;
        let service = Arc::new(AnalysisService::new(Arc::new(api), config.pacing));
        Ok(Self::with_dependencies(service))
    }
}

impl<A> App<A>
where
    A: AnalysisApi + 'static,
{
    /// Create application with an injected analysis service.
    pub fn with_dependencies(service: Arc<AnalysisService<A>>) -> Self {
        Self {
            screen: Screen::Analyze,
            should_quit: false,
            service,
            flow: UploadAndAnalyzeFlow::new(),
            form: AnalyzeFormState::default(),
            selector: LesionTypeSelector::for_catalog(&LesionType::ALL),
            pending_worker: None,
            previews: PreviewDecoder::default(),
            stage: None,
            results_focused: false,
        }
    }

    /// Run the main application loop.
    ///
    /// # Errors
    /// Returns error if terminal operations fail.
    pub fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        // Main loop
        let result = self.main_loop(&mut terminal);

        // Restore terminal
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableBracketedPaste
        )?;
        terminal.show_cursor()?;

        result
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            let now = Instant::now();

            // Poll background workers
            self.poll_previews();
            self.poll_worker(now);

            // Confidence bar animation
            self.flow.tick(now);

            terminal.draw(|f| {
                let area = f.area();
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([
                        Constraint::Length(2),
                        Constraint::Min(0),
                        Constraint::Length(2),
                    ])
                    .split(area);

                render_header(f, chunks[0], self.screen == Screen::About);

                match self.screen {
                    Screen::Analyze => {
                        let view = AnalyzeView {
                            flow: &self.flow,
                            form: &self.form,
                            stage: self.stage,
                            results_focused: self.results_focused,
                            now,
                        };
                        render_analyze(f, chunks[1], &view);
                    }
                    Screen::About => render_about(f, chunks[1], self.selector.as_ref()),
                }

                render_disclaimer(f, chunks[2]);

                if let Some(alert) = self.flow.alert() {
                    render_alert(f, area, alert);
                }
            })?;

            // Handle input (short poll to stay responsive)
            if event::poll(Duration::from_millis(50))? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        self.handle_key(key.code, key.modifiers);
                    }
                    Event::Paste(text) => self.handle_paste(&text),
                    _ => {}
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn poll_previews(&mut self) {
        while let Some((generation, result)) = self.previews.try_recv() {
            self.flow.apply_preview(generation, result);
        }
    }

    /// Poll the analysis worker for progress updates.
    fn poll_worker(&mut self, now: Instant) {
        loop {
            let Some(worker) = self.pending_worker.as_ref() else {
                return;
            };
            let attempt = worker.attempt;

            let outcome = match worker.poll() {
                AnalysisPoll::Pending => return,
                AnalysisPoll::Progress(AnalysisProgress::Stage(stage)) => {
                    self.stage = Some(stage);
                    continue;
                }
                AnalysisPoll::Progress(AnalysisProgress::Finished(outcome)) => outcome,
                AnalysisPoll::Lost => Err(DermadetectError::Io(io::Error::other(
                    "analysis worker exited without a result",
                ))),
            };

            self.pending_worker = None;
            self.stage = None;
            self.flow.finish_submission(attempt, outcome, now);
            if matches!(self.flow.results(), ResultsRegion::Hidden) {
                self.results_focused = false;
            }
            return;
        }
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        let ctrl = modifiers.contains(KeyModifiers::CONTROL);

        // Global quit handling
        if ctrl && key == KeyCode::Char('q') {
            self.should_quit = true;
            return;
        }

        // An open alert swallows input until dismissed.
        if self.flow.alert().is_some() {
            if matches!(key, KeyCode::Enter | KeyCode::Esc) {
                self.flow.take_alert();
            }
            return;
        }

        match key {
            KeyCode::F(1) => {
                self.screen = Screen::Analyze;
                return;
            }
            KeyCode::F(2) => {
                self.screen = Screen::About;
                return;
            }
            _ => {}
        }

        match self.screen {
            Screen::Analyze if ctrl => self.handle_analyze_shortcut(key),
            Screen::Analyze => self.handle_analyze_key(key),
            Screen::About => self.handle_about_key(key),
        }
    }

    fn handle_analyze_shortcut(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('s') => self.submit(),
            KeyCode::Char('x') => self.flow.remove_file(),
            KeyCode::Char('e') => self.form.load_sample_data(),
            KeyCode::Char('r') => {
                if !matches!(self.flow.results(), ResultsRegion::Hidden) {
                    self.results_focused = !self.results_focused;
                }
            }
            _ => {}
        }
    }

    fn handle_analyze_key(&mut self, key: KeyCode) {
        if self.results_focused {
            if matches!(key, KeyCode::Esc | KeyCode::Tab) {
                self.results_focused = false;
            }
            return;
        }

        let slot = self.form.slot();
        match key {
            KeyCode::Down | KeyCode::Tab => self.form.next(),
            KeyCode::Up | KeyCode::BackTab => self.form.prev(),
            KeyCode::Left => self.form.cycle(-1),
            KeyCode::Right => self.form.cycle(1),
            KeyCode::Enter => match slot {
                Slot::Path => self.browse(),
                Slot::Symptom(i) => self.form.toggle_symptom(i),
                Slot::Field(_) => self.form.next(),
                Slot::Submit => self.submit(),
            },
            KeyCode::Char(c) => match slot {
                Slot::Path => self.flow.file_input_mut().push(c),
                _ => self.form.input_char(c),
            },
            KeyCode::Backspace => match slot {
                Slot::Path => {
                    self.flow.file_input_mut().pop();
                }
                _ => self.form.delete_char(),
            },
            _ => {}
        }
    }

    fn handle_about_key(&mut self, key: KeyCode) {
        let Some(selector) = self.selector.as_mut() else {
            return;
        };

        match key {
            KeyCode::Left | KeyCode::Up => selector.step(-1),
            KeyCode::Right | KeyCode::Down | KeyCode::Tab => selector.step(1),
            KeyCode::Char(c) => {
                let picked = c
                    .to_digit(10)
                    .and_then(|d| (d as usize).checked_sub(1))
                    .and_then(|i| LesionType::ALL.get(i));
                if let Some(lesion) = picked {
                    selector.select(lesion.key());
                }
            }
            _ => {}
        }

        if let Some(panel) = selector.take_scroll_request() {
            tracing::debug!(%panel, "Detail panel revealed");
        }
    }

    /// Take the typed path through the browse route.
    fn browse(&mut self) {
        let typed = self.flow.file_input().trim().to_string();
        if typed.is_empty() {
            return;
        }
        self.intake(PathBuf::from(typed), IntakeSource::Browse);
    }

    /// Terminals deliver a file dropped onto them as pasted text.
    ///
    /// A drop replaces any open alert. Other pasted text goes to the focused
    /// input.
    fn handle_paste(&mut self, text: &str) {
        if self.screen != Screen::Analyze {
            return;
        }

        if let Some(path) = dropped_path(text) {
            self.flow.take_alert();
            self.intake(path, IntakeSource::Drop);
            return;
        }

        if self.flow.alert().is_some() || self.results_focused {
            return;
        }
        match self.form.slot() {
            Slot::Path => self.flow.file_input_mut().push_str(text.trim()),
            _ => self.form.paste(text),
        }
    }

    fn intake(&mut self, path: PathBuf, source: IntakeSource) {
        // Rejections raise an alert on the flow.
        if let Ok(ticket) = self.flow.intake_path(&path, source) {
            self.previews.spawn(ticket);
        }
    }

    fn submit(&mut self) {
        let fields = self.form.clinical_fields();
        let symptoms = self.form.checked_symptoms();

        let Some(submission) = self.flow.begin_submission(fields, symptoms) else {
            return;
        };

        self.stage = Some(AnalysisStage::Uploading);
        self.pending_worker = Some(AnalysisWorker::spawn(self.service.clone(), submission));

        if let Some(ScrollTarget::Results) = self.flow.take_scroll_request() {
            self.results_focused = true;
        }
    }
}

/// Interpret pasted text as a single dropped file path.
///
/// Accepts plain, quoted, and `file://` forms. A `file://` URI is always
/// returned (percent-decoded) so a missing target is reported on intake;
/// other text is returned only if it names an existing file.
fn dropped_path(text: &str) -> Option<PathBuf> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.contains('\n') {
        return None;
    }

    let unquoted = trimmed
        .strip_prefix('\'')
        .and_then(|t| t.strip_suffix('\''))
        .or_else(|| trimmed.strip_prefix('"').and_then(|t| t.strip_suffix('"')))
        .unwrap_or(trimmed);

    if let Some(rest) = unquoted.strip_prefix("file://") {
        let rest = rest.strip_prefix("localhost").unwrap_or(rest);
        let decoded = percent_decode_str(rest).decode_utf8_lossy();
        return Some(PathBuf::from(decoded.into_owned()));
    }

    let path = PathBuf::from(unquoted.replace("\\ ", " "));
    path.is_file().then_some(path)
}
