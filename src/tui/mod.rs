//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the thread,
//! and translates mouse and keyboard events into core::Action values.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Effects
//!
//! `update()` returns an `Effect`; the `Viewer` carries it out:
//!
//! - `SpawnLoad`: fetch on a tokio task, report back over the action channel
//! - `ScrollToBottom`: pin the message list to the bottom on the next frame
//! - `CopyToClipboard`: write synchronously, then report success or failure
//!
//! ## Redraw Strategy
//!
//! The event loop only redraws when something changed: an input event, a
//! background action, a scroll-metrics change discovered after the last draw,
//! or an active "copied" indicator that needs its expiry checked. While the
//! load is pending or the indicator is up, the loop polls every ~80ms,
//! otherwise it sleeps up to 500ms.

mod clipboard;
mod component;
mod components;
mod event;
mod ui;

pub use clipboard::{Clipboard, ClipboardError, SystemClipboard};

use log::{debug, info, warn};
use std::io::stdout;
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use chrono::Local;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use ratatui::layout::Rect;

use crate::core::action::{Action, Effect, update};
use crate::core::config::ResolvedConfig;
use crate::core::state::{ScrollMetrics, ViewState};
use crate::source::{HttpMessageSource, MessageSource, load};
use crate::tui::component::EventHandler;
use crate::tui::components::MessageListState;
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};
use crate::tui::ui::Hit;

const ACTIVE_POLL: Duration = Duration::from_millis(80);
const IDLE_POLL: Duration = Duration::from_millis(500);

/// TUI-specific presentation state (not part of core logic)
pub struct TuiState {
    // Persistent component states
    pub message_list: MessageListState,
    /// Where the jump button was drawn in the last frame, for hit testing
    pub jump_button_area: Option<Rect>,
    /// Scroll geometry last reported to the core
    pub last_metrics: Option<ScrollMetrics>,
    pub source_name: String,
    pub time_format: String,
}

impl TuiState {
    pub fn new(source_name: String, time_format: String) -> Self {
        Self {
            message_list: MessageListState::new(),
            jump_button_area: None,
            last_metrics: None,
            source_name,
            time_format,
        }
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        execute!(stdout(), EnableMouseCapture)?;
        info!("Terminal modes enabled (mouse capture)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(stdout(), DisableMouseCapture);
    }
}

/// Short label for the title bar: `host:port` when the URL parses.
fn source_label(url: &str) -> String {
    match reqwest::Url::parse(url) {
        Ok(parsed) => match (parsed.host_str(), parsed.port()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_string(),
            _ => url.to_string(),
        },
        Err(_) => url.to_string(),
    }
}

/// Core state plus everything needed to carry out its effects.
struct Viewer {
    state: ViewState,
    tui: TuiState,
    source: Arc<dyn MessageSource>,
    clipboard: Box<dyn Clipboard>,
    tx: mpsc::Sender<Action>,
}

impl Viewer {
    fn new(
        source: Arc<dyn MessageSource>,
        clipboard: Box<dyn Clipboard>,
        tx: mpsc::Sender<Action>,
        tui: TuiState,
    ) -> Self {
        Self {
            state: ViewState::new(),
            tui,
            source,
            clipboard,
            tx,
        }
    }

    /// Runs the reducer and applies its effect. Returns true when the viewer should exit.
    fn dispatch(&mut self, action: Action) -> bool {
        let effect = update(&mut self.state, action);
        match effect {
            Effect::None => false,
            Effect::Quit => true,
            Effect::SpawnLoad => {
                spawn_load(self.source.clone(), self.tx.clone());
                false
            }
            Effect::ScrollToBottom => {
                self.tui.message_list.stick_to_bottom = true;
                false
            }
            Effect::CopyToClipboard {
                message_id,
                content,
            } => {
                let outcome = match self.clipboard.write_text(&content) {
                    Ok(()) => Action::CopySucceeded {
                        message_id,
                        at: Instant::now(),
                    },
                    Err(e) => Action::CopyFailed(e.to_string()),
                };
                self.dispatch(outcome)
            }
        }
    }

    /// Routes one terminal event. `frame_area` is the area of the last drawn frame.
    fn handle_event(&mut self, event: TuiEvent, frame_area: Rect) -> bool {
        match event {
            TuiEvent::Resize => false,
            TuiEvent::Quit | TuiEvent::ForceQuit => self.dispatch(Action::Quit),
            TuiEvent::Escape => self.dispatch(Action::ClearSelection),
            TuiEvent::Copy => self.dispatch(Action::CopySelected),
            TuiEvent::ScrollUp
            | TuiEvent::ScrollDown
            | TuiEvent::ScrollPageUp
            | TuiEvent::ScrollPageDown
            | TuiEvent::JumpToBottom => {
                if self.state.messages().is_some() {
                    self.tui.message_list.handle_event(&event);
                }
                false
            }
            TuiEvent::MouseClick(col, row) => {
                match ui::hit_test(col, row, frame_area, &self.state, &self.tui) {
                    Hit::JumpButton => self.dispatch(Action::JumpToBottom),
                    Hit::Message {
                        on_copy_line: true, ..
                    } => self.dispatch(Action::CopySelected),
                    Hit::Message { id, .. } => self.dispatch(Action::ToggleSelection(id)),
                    Hit::Nothing => false,
                }
            }
        }
    }

    /// Reports scroll geometry from the last frame to the core.
    /// Returns true if the jump button visibility changed and a redraw is due.
    fn sync_scroll(&mut self) -> bool {
        if self.state.messages().is_none() {
            return false;
        }
        let metrics = self.tui.message_list.metrics();
        if self.tui.last_metrics == Some(metrics) {
            return false;
        }
        self.tui.last_metrics = Some(metrics);

        let was_visible = self.state.show_jump_to_bottom();
        self.dispatch(Action::Scrolled(metrics));
        was_visible != self.state.show_jump_to_bottom()
    }

    /// Whether the loop should keep polling quickly.
    fn is_active(&self) -> bool {
        self.state.is_loading() || self.state.copy_feedback.is_some()
    }
}

fn spawn_load(source: Arc<dyn MessageSource>, tx: mpsc::Sender<Action>) {
    info!("Spawning message load from {} source", source.name());
    tokio::spawn(async move {
        let action = match load(source.as_ref(), Local::now).await {
            Ok(grouped) => Action::LoadSucceeded(grouped),
            Err(e) => Action::LoadFailed(e.to_string()),
        };
        if tx.send(action).is_err() {
            warn!("Failed to send load result: receiver dropped");
        }
    });
}

pub fn run(config: ResolvedConfig) -> std::io::Result<()> {
    let source: Arc<dyn MessageSource> =
        Arc::new(HttpMessageSource::new(config.source_url.clone()));
    let tui = TuiState::new(source_label(&config.source_url), config.time_format.clone());

    // Channel for actions from background tasks
    let (tx, rx) = mpsc::channel();
    let mut viewer = Viewer::new(source, Box::new(SystemClipboard::new()), tx, tui);

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new().inspect_err(|e| {
        warn!("Failed to enable mouse capture: {}", e);
    });

    viewer.dispatch(Action::Mount);
    let mut needs_redraw = true; // Force first frame

    loop {
        // Only draw when something changed
        if needs_redraw {
            terminal.draw(|f| ui::draw_ui(f, &viewer.state, &mut viewer.tui))?;
            // Jump button visibility depends on the geometry we just drew
            needs_redraw = viewer.sync_scroll();
        }

        let timeout = if viewer.is_active() {
            ACTIVE_POLL
        } else {
            IDLE_POLL
        };
        let first_event = poll_event_timeout(timeout);
        let frame_area = terminal.get_frame().area();

        // Process first event + drain ALL pending events before next draw
        let mut should_quit = false;
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            needs_redraw = true;
            if viewer.handle_event(event, frame_area) {
                should_quit = true;
                break;
            }
        }

        // Handle background task actions (load results)
        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            if viewer.dispatch(action) {
                should_quit = true;
            }
        }

        if should_quit {
            break;
        }

        if viewer.state.copy_feedback.is_some() {
            viewer.dispatch(Action::Tick(Instant::now()));
            needs_redraw |= viewer.state.copy_feedback.is_none();
        }
    }

    debug!("Event loop exited");
    ratatui::restore();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::COPY_FEEDBACK_WINDOW;
    use crate::source::FetchError;
    use crate::test_support::{StaticSource, raw, ready_state};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Records every write; optionally refuses them.
    struct RecordingClipboard {
        writes: Rc<RefCell<Vec<String>>>,
        fail: bool,
    }

    impl Clipboard for RecordingClipboard {
        fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
            if self.fail {
                return Err(ClipboardError::Unavailable);
            }
            self.writes.borrow_mut().push(text.to_string());
            Ok(())
        }
    }

    fn viewer_with(
        source: StaticSource,
        fail_clipboard: bool,
    ) -> (Viewer, mpsc::Receiver<Action>, Rc<RefCell<Vec<String>>>) {
        let writes = Rc::new(RefCell::new(Vec::new()));
        let clipboard = RecordingClipboard {
            writes: writes.clone(),
            fail: fail_clipboard,
        };
        let (tx, rx) = mpsc::channel();
        let viewer = Viewer::new(
            Arc::new(source),
            Box::new(clipboard),
            tx,
            TuiState::new("test".into(), "%H:%M".into()),
        );
        (viewer, rx, writes)
    }

    fn draw(terminal: &mut Terminal<TestBackend>, viewer: &mut Viewer) {
        terminal
            .draw(|f| ui::draw_ui(f, &viewer.state, &mut viewer.tui))
            .unwrap();
        viewer.sync_scroll();
    }

    #[test]
    fn test_source_label() {
        assert_eq!(source_label("http://localhost:3000/api/messages"), "localhost:3000");
        assert_eq!(source_label("https://relay.example/api"), "relay.example");
        assert_eq!(source_label("not a url"), "not a url");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn mount_loads_and_pins_to_bottom() {
        let source = StaticSource::records(vec![
            raw("2024-01-05T10:00:00Z", "hi", false),
            raw("2024-01-05T10:05:00Z", "hello!", true),
        ]);
        let (mut viewer, rx, _) = viewer_with(source, false);

        assert!(!viewer.dispatch(Action::Mount));
        let action = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(matches!(action, Action::LoadSucceeded(_)));

        viewer.dispatch(action);
        assert_eq!(viewer.state.messages().unwrap().message_count(), 2);
        assert!(viewer.tui.message_list.stick_to_bottom);

        // A second mount doesn't fetch again.
        viewer.dispatch(Action::Mount);
        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn failed_load_reports_error_message() {
        let source = StaticSource::failing(FetchError::Api {
            status: 503,
            message: "upstream down".into(),
        });
        let (mut viewer, rx, _) = viewer_with(source, false);

        viewer.dispatch(Action::Mount);
        let action = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        viewer.dispatch(action);

        let error = viewer.state.error().unwrap();
        assert!(error.contains("503"));
        assert!(error.contains("upstream down"));
        assert!(!viewer.tui.message_list.stick_to_bottom);
    }

    #[test]
    fn click_select_copy_and_expire() {
        let area = Rect::new(0, 0, 80, 24);
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        let (mut viewer, _rx, writes) = viewer_with(StaticSource::records(vec![]), false);
        viewer.state = ready_state();
        draw(&mut terminal, &mut viewer);

        // Second row of the thread: "are you there?", a right-aligned user bubble.
        viewer.handle_event(TuiEvent::MouseClick(78, 4), area);
        let selected = viewer.state.selected_message().unwrap().clone();
        assert_eq!(selected.content, "are you there?");
        draw(&mut terminal, &mut viewer);

        viewer.handle_event(TuiEvent::Copy, area);
        assert_eq!(writes.borrow().as_slice(), ["are you there?"]);
        assert!(viewer.state.is_copied(&selected.id));

        let until = viewer.state.copy_feedback.as_ref().unwrap().until;
        viewer.dispatch(Action::Tick(until - COPY_FEEDBACK_WINDOW / 2));
        assert!(viewer.state.is_copied(&selected.id));
        viewer.dispatch(Action::Tick(until));
        assert!(!viewer.state.is_copied(&selected.id));

        // Clicking the same bubble again deselects it.
        viewer.handle_event(TuiEvent::MouseClick(78, 4), area);
        assert!(viewer.state.selected_id.is_none());
    }

    #[test]
    fn clicking_copy_line_copies() {
        let area = Rect::new(0, 0, 80, 24);
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        let (mut viewer, _rx, writes) = viewer_with(StaticSource::records(vec![]), false);
        viewer.state = ready_state();
        draw(&mut terminal, &mut viewer);

        viewer.handle_event(TuiEvent::MouseClick(78, 4), area);
        draw(&mut terminal, &mut viewer);

        // Header (2) + bubble top border, content, timestamp → copy line at content y 5
        viewer.handle_event(TuiEvent::MouseClick(78, 1 + 5), area);
        assert_eq!(writes.borrow().as_slice(), ["are you there?"]);
        assert!(viewer.state.selected_id.is_some());
    }

    #[test]
    fn clipboard_failure_shows_no_indicator() {
        let (mut viewer, _rx, writes) = viewer_with(StaticSource::records(vec![]), true);
        viewer.state = ready_state();
        let id = viewer.state.messages().unwrap().flatten()[0].id.clone();
        viewer.dispatch(Action::ToggleSelection(id));

        viewer.handle_event(TuiEvent::Copy, Rect::new(0, 0, 80, 24));
        assert!(writes.borrow().is_empty());
        assert!(viewer.state.copy_feedback.is_none());
    }

    #[test]
    fn escape_clears_and_quit_exits() {
        let (mut viewer, _rx, _) = viewer_with(StaticSource::records(vec![]), false);
        viewer.state = ready_state();
        let id = viewer.state.messages().unwrap().flatten()[0].id.clone();
        viewer.dispatch(Action::ToggleSelection(id));

        let area = Rect::new(0, 0, 80, 24);
        assert!(!viewer.handle_event(TuiEvent::Escape, area));
        assert!(viewer.state.selected_id.is_none());
        assert!(viewer.handle_event(TuiEvent::Quit, area));
        assert!(viewer.handle_event(TuiEvent::ForceQuit, area));
    }

    #[test]
    fn scroll_keys_are_ignored_until_ready() {
        let (mut viewer, _rx, _) = viewer_with(StaticSource::records(vec![]), false);
        viewer.handle_event(TuiEvent::JumpToBottom, Rect::new(0, 0, 80, 24));
        assert!(!viewer.tui.message_list.stick_to_bottom);
    }
}
