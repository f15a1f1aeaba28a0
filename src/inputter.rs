use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Line editor state behind the modal prompt. Collects keystrokes until the
/// user confirms with Enter or cancels with Esc.
#[derive(Default)]
pub struct Inputter {
    input: String,
    cursor: usize, // char position, not bytes
    finished: bool,
    canceled: bool,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct InputResult {
    pub input: String,
    pub finished: bool,
    pub canceled: bool,
    pub cursor: usize,
}

impl Inputter {
    pub fn read(&mut self, key: KeyEvent) -> InputResult {
        match key.code {
            KeyCode::Enter => self.enter(),
            KeyCode::Esc => self.escape(),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = (self.cursor + 1).min(self.char_count()),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.char_count(),
            code => self.key(code, key.modifiers),
        }
        self.get()
    }

    pub fn get(&self) -> InputResult {
        InputResult {
            input: self.input.clone(),
            finished: self.finished,
            canceled: self.canceled,
            cursor: self.cursor,
        }
    }

    pub fn clear(&mut self) {
        self.input.clear();
        self.cursor = 0;
        self.finished = false;
        self.canceled = false;
    }

    /// Reopen the prompt after a rejected confirmation (a failed integer
    /// parse). The entered text and cursor stay as they were.
    pub fn resume(&mut self) {
        self.finished = false;
    }

    fn enter(&mut self) {
        self.finished = true;
    }

    fn escape(&mut self) {
        self.input.clear();
        self.cursor = 0;
        self.canceled = true;
        self.finished = true;
    }

    fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let pos = self.byte_pos(self.cursor);
            self.input.remove(pos);
        }
    }

    fn delete(&mut self) {
        if self.cursor < self.char_count() {
            let pos = self.byte_pos(self.cursor);
            self.input.remove(pos);
        }
    }

    fn key(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        // Chords are commands, not input
        if modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
            return;
        }
        if let Some(chr) = code.as_char() {
            let pos = self.byte_pos(self.cursor);
            self.input.insert(pos, chr);
            self.cursor += 1;
        }
    }

    fn char_count(&self) -> usize {
        self.input.chars().count()
    }

    fn byte_pos(&self, char_pos: usize) -> usize {
        self.input
            .char_indices()
            .nth(char_pos)
            .map(|(byte_idx, _)| byte_idx)
            .unwrap_or(self.input.len())
    }
}
