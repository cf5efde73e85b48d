use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::message::Message;

/// Terminal input the event loop cares about.
#[derive(Debug, Clone)]
pub enum Event {
    Key(KeyEvent),
    Resize(u16, u16),
}

impl Event {
    /// Ctrl-C quits from anywhere, before the reducer sees it.
    pub fn is_quit(&self) -> bool {
        matches!(
            self,
            Event::Key(KeyEvent {
                code: KeyCode::Char('c'),
                modifiers: KeyModifiers::CONTROL,
                ..
            })
        )
    }
}

impl From<Event> for Message {
    fn from(event: Event) -> Self {
        match event {
            Event::Key(key) => Message::Key(key),
            Event::Resize(width, height) => Message::Resized { width, height },
        }
    }
}
