use crossterm::event::{
    self, Event, KeyCode, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind,
};
use log::warn;

/// TUI-specific input events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TuiEvent {
    Quit,
    ForceQuit,
    Escape,
    ScrollUp,
    ScrollDown,
    ScrollPageUp,
    ScrollPageDown,
    JumpToBottom, // End / G
    Copy,         // c / y
    MouseClick(u16, u16),
    Resize,
}

/// Poll for an event without blocking (returns immediately)
pub fn poll_event_immediate() -> Option<TuiEvent> {
    poll_event_timeout(std::time::Duration::ZERO)
}

/// Poll for an event, waiting up to `timeout`.
pub fn poll_event_timeout(timeout: std::time::Duration) -> Option<TuiEvent> {
    match event::poll(timeout) {
        Ok(true) => match event::read() {
            Ok(event) => translate(event),
            Err(e) => {
                warn!("Failed to read terminal event: {}", e);
                None
            }
        },
        Ok(false) => None,
        Err(e) => {
            warn!("Failed to poll terminal events: {}", e);
            None
        }
    }
}

/// Maps a raw crossterm event to a viewer event.
fn translate(event: Event) -> Option<TuiEvent> {
    match event {
        Event::Key(key_event) => {
            if key_event.kind == KeyEventKind::Release {
                return None;
            }
            log::debug!("Key event: {:?} with modifiers {:?}", key_event.code, key_event.modifiers);
            match (key_event.modifiers, key_event.code) {
                (KeyModifiers::CONTROL, KeyCode::Char('c')) => Some(TuiEvent::ForceQuit),
                (_, KeyCode::Char('q')) => Some(TuiEvent::Quit),
                (_, KeyCode::Char('c') | KeyCode::Char('y')) => Some(TuiEvent::Copy),
                (_, KeyCode::Char('G') | KeyCode::End) => Some(TuiEvent::JumpToBottom),
                (_, KeyCode::Char('k') | KeyCode::Up) => Some(TuiEvent::ScrollUp),
                (_, KeyCode::Char('j') | KeyCode::Down) => Some(TuiEvent::ScrollDown),
                (_, KeyCode::PageUp) => Some(TuiEvent::ScrollPageUp),
                (_, KeyCode::PageDown | KeyCode::Char(' ')) => Some(TuiEvent::ScrollPageDown),
                (_, KeyCode::Esc) => Some(TuiEvent::Escape),
                _ => None,
            }
        }
        Event::Mouse(mouse_event) => match mouse_event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                Some(TuiEvent::MouseClick(mouse_event.column, mouse_event.row))
            }
            MouseEventKind::ScrollUp => Some(TuiEvent::ScrollUp),
            MouseEventKind::ScrollDown => Some(TuiEvent::ScrollDown),
            _ => None,
        },
        Event::Resize(_, _) => Some(TuiEvent::Resize),
        _ => None,
    }
}
