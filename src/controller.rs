use std::time::Duration;

use ratatui::crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use ratatui::layout::Position;
use tracing::trace;

use crate::domain::{Message, RosterConfig, RosterError};
use crate::model::Model;
use crate::tooltip::hit_test;
use crate::ui::HitMap;

pub struct Controller {
    event_poll_time: u64,
}

impl Controller {
    pub fn new(cfg: &RosterConfig) -> Self {
        Self {
            event_poll_time: cfg.event_poll_time,
        }
    }

    pub fn handle_event(
        &self,
        model: &Model,
        hits: &HitMap,
    ) -> Result<Option<Message>, RosterError> {
        if event::poll(Duration::from_millis(self.event_poll_time))? {
            return Ok(self.map_event(model, hits, event::read()?));
        }
        Ok(None)
    }

    pub fn map_event(&self, model: &Model, hits: &HitMap, ev: Event) -> Option<Message> {
        match ev {
            // crossterm also emits key release and repeat events on Windows.
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                self.handle_key(model, key)
            }
            Event::Mouse(mouse) => self.handle_mouse(hits, mouse),
            _ => None,
        }
    }

    fn handle_key(&self, model: &Model, key: KeyEvent) -> Option<Message> {
        let message = match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => Some(Message::Quit),
            (KeyCode::Char('r'), KeyModifiers::CONTROL) => Some(Message::Reset),
            _ if model.raw_keyevents() => Some(Message::RawKey(key)),
            (KeyCode::Char('q'), _) => Some(Message::Quit),
            (KeyCode::Char('?'), _) => Some(Message::Help),
            (KeyCode::Char('/'), _) => Some(Message::FocusSearch),
            (KeyCode::Char('r'), _) => Some(Message::Reset),
            (KeyCode::Esc, _) => Some(Message::Exit),
            _ => None,
        };
        trace!("Mapped: {key:?} => {message:?}");
        message
    }

    // One handler for the whole screen; thumbnails are found by hit-testing the
    // pointer against the geometry of the last draw.
    fn handle_mouse(&self, hits: &HitMap, mouse: MouseEvent) -> Option<Message> {
        let pos = Position::new(mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Moved | MouseEventKind::Drag(_) => Some(Message::Hover(hit_test(
                &hits.thumbnails,
                mouse.column,
                mouse.row,
            ))),
            MouseEventKind::Down(MouseButton::Left) if hits.reset.contains(pos) => {
                Some(Message::Reset)
            }
            MouseEventKind::Down(MouseButton::Left) if hits.search.contains(pos) => {
                Some(Message::FocusSearch)
            }
            _ => None,
        }
    }
}
