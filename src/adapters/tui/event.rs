use color_eyre::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use std::time::Duration;

/// Terminal events translated into application terms. Characters are passed
/// through untouched; the app decides whether they are text or actions based
/// on what currently has focus.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    Quit,
    Refresh,

    Tab,
    BackTab,
    Enter,
    Esc,

    Up,
    Down,
    Left,
    Right,
    PageUp,
    PageDown,

    Character(char),
    Backspace,

    Tick,
}

pub struct EventHandler {
    should_quit: bool,
}

impl EventHandler {
    pub fn new() -> Self {
        Self { should_quit: false }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub async fn next_event(&mut self) -> Result<AppEvent> {
        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key_event) => Ok(self.handle_key_event(key_event)),
                _ => Ok(AppEvent::Tick),
            }
        } else {
            Ok(AppEvent::Tick)
        }
    }

    fn handle_key_event(&mut self, key_event: KeyEvent) -> AppEvent {
        match key_event {
            // Global quit with Ctrl+C
            KeyEvent {
                code: KeyCode::Char('c'),
                modifiers: KeyModifiers::CONTROL,
                ..
            } => {
                self.should_quit = true;
                AppEvent::Quit
            }

            KeyEvent {
                code: KeyCode::F(5),
                ..
            } => AppEvent::Refresh,

            KeyEvent {
                code: KeyCode::Tab,
                modifiers: KeyModifiers::NONE,
                ..
            } => AppEvent::Tab,

            KeyEvent {
                code: KeyCode::BackTab,
                ..
            } => AppEvent::BackTab,

            KeyEvent {
                code: KeyCode::Enter,
                ..
            } => AppEvent::Enter,

            KeyEvent {
                code: KeyCode::Esc, ..
            } => AppEvent::Esc,

            KeyEvent {
                code: KeyCode::Up, ..
            } => AppEvent::Up,

            KeyEvent {
                code: KeyCode::Down,
                ..
            } => AppEvent::Down,

            KeyEvent {
                code: KeyCode::Left,
                ..
            } => AppEvent::Left,

            KeyEvent {
                code: KeyCode::Right,
                ..
            } => AppEvent::Right,

            KeyEvent {
                code: KeyCode::PageUp,
                ..
            } => AppEvent::PageUp,

            KeyEvent {
                code: KeyCode::PageDown,
                ..
            } => AppEvent::PageDown,

            KeyEvent {
                code: KeyCode::Char(c),
                modifiers: KeyModifiers::NONE,
                ..
            } => AppEvent::Character(c),

            KeyEvent {
                code: KeyCode::Char(c),
                modifiers: KeyModifiers::SHIFT,
                ..
            } => AppEvent::Character(c.to_uppercase().next().unwrap_or(c)),

            KeyEvent {
                code: KeyCode::Backspace,
                ..
            } => AppEvent::Backspace,

            _ => AppEvent::Tick,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn ctrl_c_always_quits() {
        let mut handler = EventHandler::new();
        let event = handler.handle_key_event(key(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(event, AppEvent::Quit);
        assert!(handler.should_quit());
    }

    #[test]
    fn plain_characters_pass_through() {
        let mut handler = EventHandler::new();
        assert_eq!(
            handler.handle_key_event(key(KeyCode::Char('x'), KeyModifiers::NONE)),
            AppEvent::Character('x')
        );
        assert!(!handler.should_quit());
    }
}
