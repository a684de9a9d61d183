use ratatui::crossterm::event::{self, KeyCode, KeyModifiers};
use tracing::trace;

/// Single line editor behind the search box.
#[derive(Default)]
pub struct Inputter {
    current_input: String,
    curser_pos: usize,
    finished: bool,
}

#[derive(Default, Clone, Debug, PartialEq)]
pub struct InputResult {
    pub input: String,
    pub finished: bool,
    pub changed: bool,
    pub curser_pos: usize,
}

impl Inputter {
    pub fn read(&mut self, key: event::KeyEvent) -> InputResult {
        self.finished = false;
        let before = self.current_input.clone();
        match (key.code, key.modifiers) {
            (KeyCode::Enter, _) | (KeyCode::Esc, _) => self.finished = true,
            (KeyCode::Backspace, _) => self.backspace(),
            (KeyCode::Delete, _) => self.delete(),
            (KeyCode::Left, _) => self.curser_pos = self.curser_pos.saturating_sub(1),
            (KeyCode::Right, _) => self.right(),
            (KeyCode::Home, _) => self.curser_pos = 0,
            (KeyCode::End, _) => self.curser_pos = self.current_input.chars().count(),
            (kc, km) => self.key(kc, km),
        }
        let mut result = self.get();
        result.changed = result.input != before;
        if result.changed {
            trace!("Search input is now \"{}\"", result.input);
        }
        result
    }

    pub fn get(&self) -> InputResult {
        InputResult {
            finished: self.finished,
            changed: false,
            input: self.current_input.clone(),
            curser_pos: self.curser_pos,
        }
    }

    pub fn clear(&mut self) {
        self.finished = false;
        self.current_input.clear();
        self.curser_pos = 0;
    }

    fn backspace(&mut self) {
        if self.curser_pos > 0 {
            self.curser_pos -= 1;
            let idx = self.getbytepos();
            self.current_input.remove(idx);
        }
    }

    fn delete(&mut self) {
        if self.curser_pos < self.current_input.chars().count() {
            let idx = self.getbytepos();
            self.current_input.remove(idx);
        }
    }

    fn right(&mut self) {
        if self.curser_pos < self.current_input.chars().count() {
            self.curser_pos += 1;
        }
    }

    fn key(&mut self, code: KeyCode, modifier: KeyModifiers) {
        if modifier.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
            return;
        }
        if let Some(chr) = code.as_char() {
            self.current_input.insert(self.getbytepos(), chr);
            self.curser_pos += 1;
        }
    }

    fn getbytepos(&self) -> usize {
        self.current_input
            .char_indices()
            .nth(self.curser_pos)
            .map(|(byte_idx, _)| byte_idx)
            .unwrap_or(self.current_input.len())
    }
}
