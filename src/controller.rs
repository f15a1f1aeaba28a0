use std::time::Duration;

use ratatui::crossterm::event::{self, Event, KeyCode, KeyModifiers};
use tracing::trace;

use crate::domain::{Message, TweakConfig, TweakError};
use crate::model::{Model, Modus};

pub struct Controller {
    event_poll_time: u64,
}

impl Controller {
    pub fn new(cfg: &TweakConfig) -> Self {
        Self {
            event_poll_time: cfg.event_poll_time,
        }
    }

    pub fn handle_event(&self, model: &Model) -> Result<Option<Message>, TweakError> {
        if event::poll(Duration::from_millis(self.event_poll_time))? {
            match event::read()? {
                Event::Key(key) if key.kind == event::KeyEventKind::Press => {
                    // An open prompt owns the keyboard
                    if model.raw_keyevents() {
                        return Ok(Some(Message::RawKey(key)));
                    }
                    return Ok(self.handle_key(key, model.modus()));
                }
                Event::Resize(width, height) => {
                    return Ok(Some(Message::Resize(width as usize, height as usize)));
                }
                _ => {}
            }
        }
        Ok(None)
    }

    fn handle_key(&self, key: event::KeyEvent, modus: Modus) -> Option<Message> {
        let message = match modus {
            Modus::TABLE => Self::table_key(key),
            Modus::POPUP => Self::popup_key(key),
            Modus::PROMPT => None,
        };
        trace!("Mapped: {key:?} => {message:?}");
        message
    }

    fn table_key(key: event::KeyEvent) -> Option<Message> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let shift = key.modifiers.contains(KeyModifiers::SHIFT);
        match key.code {
            KeyCode::Char(c) => match (c.to_ascii_lowercase(), ctrl, shift) {
                ('n', true, false) => Some(Message::NewTable),
                ('o', true, false) => Some(Message::OpenFile),
                ('s', true, false) => Some(Message::SaveFile),
                ('s', true, true) => Some(Message::SaveFileAs),
                ('q', true, false) => Some(Message::Quit),
                ('f', true, false) => Some(Message::AddField),
                ('f', true, true) => Some(Message::DeleteField),
                ('r', true, false) => Some(Message::AddRow),
                ('r', true, true) => Some(Message::DeleteRow),
                ('c', true, true) => Some(Message::AddCellValue),
                ('d', true, true) => Some(Message::DeleteCellValue),
                _ => None,
            },
            KeyCode::Up => Some(Message::MoveUp),
            KeyCode::Down => Some(Message::MoveDown),
            KeyCode::PageUp => Some(Message::MovePageUp),
            KeyCode::PageDown => Some(Message::MovePageDown),
            KeyCode::Home => Some(Message::MoveBeginning),
            KeyCode::End => Some(Message::MoveEnd),
            KeyCode::Left => Some(Message::MoveLeft),
            KeyCode::Right => Some(Message::MoveRight),
            KeyCode::F(1) => Some(Message::Help),
            _ => None,
        }
    }

    fn popup_key(key: event::KeyEvent) -> Option<Message> {
        match key.code {
            KeyCode::Enter | KeyCode::Esc => Some(Message::Exit),
            KeyCode::Char(c)
                if c.to_ascii_lowercase() == 'q'
                    && key.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                Some(Message::Quit)
            }
            _ => None,
        }
    }
}
