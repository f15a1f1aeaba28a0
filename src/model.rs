use std::cmp;
use std::path::{Path, PathBuf};

use ratatui::crossterm::event::KeyEvent;
use tracing::{debug, info, trace, warn};

use crate::command::{self, Answer, Applied, Command, PendingCommand, PromptKind};
use crate::domain::{EditError, HELP_TEXT, Message, TweakConfig, TweakError};
use crate::inputter::Inputter;
use crate::table::{Column, Table};
use crate::ui::{COLUMN_WIDTH_MARGIN, SCROLLBAR_WIDTH, STATUSLINE_HEIGHT, TABLE_HEADER_HEIGHT};

#[derive(Debug, PartialEq)]
pub enum Status {
    READY,
    QUITTING,
}

/// Which surface currently receives input. A prompt or popup blocks
/// everything behind it until it is resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Modus {
    TABLE,
    PROMPT,
    POPUP,
}

/// One column as handed to the UI for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnView {
    pub name: String,
    pub width: usize,
    pub data: Vec<String>,
}

impl ColumnView {
    fn empty() -> Self {
        ColumnView {
            name: String::new(),
            width: 0,
            data: Vec::new(),
        }
    }
}

/// The modal prompt as handed to the UI.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptView {
    pub title: String,
    pub label: String,
    pub input: String,
    pub cursor: usize,
}

/// A blocking message popup as handed to the UI.
#[derive(Debug, Clone, PartialEq)]
pub struct PopupView {
    pub title: String,
    pub message: String,
}

#[derive(Debug, Default, Clone)]
pub struct UILayout {
    pub width: usize,
    pub height: usize,
    pub table_width: usize,
    pub table_height: usize,
    pub index_width: usize,
    pub index_height: usize,
    pub statusline_width: usize,
    pub statusline_height: usize,
}

impl UILayout {
    pub fn from_values(index_width: usize, ui_width: usize, ui_height: usize) -> Self {
        let table_width = ui_width.saturating_sub(SCROLLBAR_WIDTH + index_width);
        let table_height = ui_height.saturating_sub(STATUSLINE_HEIGHT + TABLE_HEADER_HEIGHT);

        let layout = UILayout {
            width: ui_width,
            height: ui_height,
            table_width,
            table_height,
            index_width,
            index_height: table_height,
            statusline_width: ui_width,
            statusline_height: STATUSLINE_HEIGHT,
        };
        trace!("Build UILayout: {:?}", layout);
        layout
    }
}

/// Everything the UI needs for one frame, rebuilt in full after every
/// change. The index panel and the grid are sliced from the same row
/// offset, which is what keeps the two in sync.
pub struct UIData {
    pub name: String,
    pub table: Vec<ColumnView>,
    pub index: ColumnView,
    pub nrows: usize,
    pub ncols: usize,
    pub offset_row: usize,
    pub prompt: Option<PromptView>,
    pub popup: Option<PopupView>,
    pub layout: UILayout,
    pub status_message: String,
}

impl UIData {
    pub fn empty() -> Self {
        UIData {
            name: String::new(),
            table: Vec::new(),
            index: ColumnView::empty(),
            nrows: 0,
            ncols: 0,
            offset_row: 0,
            prompt: None,
            popup: None,
            layout: UILayout::default(),
            status_message: String::new(),
        }
    }
}

pub struct Model {
    config: TweakConfig,
    pub status: Status,
    modus: Modus,
    previous_modus: Modus,
    table: Table,
    filepath: Option<PathBuf>,
    pending: Option<PendingCommand>,
    input: Inputter,
    popup: Option<PopupView>,
    offset_row: usize,
    offset_column: usize,
    width: usize,
    height: usize,
    uilayout: UILayout,
    uidata: UIData,
    status_message: String,
}

impl Model {
    pub fn init(config: &TweakConfig, ui_width: usize, ui_height: usize) -> Self {
        let mut model = Self {
            config: config.clone(),
            status: Status::READY,
            modus: Modus::TABLE,
            previous_modus: Modus::TABLE,
            table: Table::empty(),
            filepath: None,
            pending: None,
            input: Inputter::default(),
            popup: None,
            offset_row: 0,
            offset_column: 0,
            width: ui_width,
            height: ui_height,
            uilayout: UILayout::from_values(0, ui_width, ui_height),
            uidata: UIData::empty(),
            status_message: "Started tweak!".to_string(),
        };
        model.refresh_view();
        model
    }

    pub fn get_uidata(&self) -> &UIData {
        &self.uidata
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn filepath(&self) -> Option<&Path> {
        self.filepath.as_deref()
    }

    pub fn modus(&self) -> Modus {
        self.modus
    }

    /// While a prompt is open every key goes to the line editor.
    pub fn raw_keyevents(&self) -> bool {
        self.modus == Modus::PROMPT
    }

    /// Open a file passed on the command line. A failure is a popup, not a
    /// fatal error; the editor starts with an empty table instead.
    pub fn open_path(&mut self, path: &Path) {
        match Table::load_csv(path) {
            Ok(table) => {
                self.table = table;
                self.filepath = Some(path.to_path_buf());
                self.set_status_message(format!("Loaded {}", path.display()));
            }
            Err(e) => self.show_error(e),
        }
        self.refresh_view();
    }

    pub fn update(&mut self, message: Message) -> Result<(), TweakError> {
        match self.modus {
            Modus::TABLE => match message {
                Message::Quit => self.quit(),
                Message::NewTable => self.new_table(),
                Message::OpenFile => self.begin_command(Command::OpenFile),
                Message::SaveFile => self.save_file(),
                Message::SaveFileAs => self.begin_command(Command::SaveFileAs),
                Message::AddField => self.begin_command(Command::AddField),
                Message::DeleteField => self.begin_command(Command::DeleteField),
                Message::AddRow => self.begin_command(Command::AddRow),
                Message::DeleteRow => self.begin_command(Command::DeleteRow),
                Message::AddCellValue => self.begin_command(Command::AddCellValue),
                Message::DeleteCellValue => self.begin_command(Command::DeleteCellValue),
                Message::MoveUp => self.scroll_up(1),
                Message::MoveDown => self.scroll_down(1),
                Message::MovePageUp => self.scroll_up(self.uilayout.table_height),
                Message::MovePageDown => self.scroll_down(self.uilayout.table_height),
                Message::MoveBeginning => self.offset_row = 0,
                Message::MoveEnd => self.scroll_down(self.table.nrows()),
                Message::MoveLeft => self.offset_column = self.offset_column.saturating_sub(1),
                Message::MoveRight => self.scroll_right(),
                Message::Help => self.show_help(),
                Message::Resize(width, height) => self.ui_resize(width, height),
                _ => (),
            },
            Modus::PROMPT => match message {
                Message::RawKey(key) => self.prompt_input(key),
                Message::Resize(width, height) => self.ui_resize(width, height),
                _ => (),
            },
            Modus::POPUP => match message {
                Message::Quit => self.quit(),
                Message::Exit => self.close_popup(),
                Message::Resize(width, height) => self.ui_resize(width, height),
                _ => (),
            },
        }

        self.refresh_view();
        Ok(())
    }

    pub fn quit(&mut self) {
        self.status = Status::QUITTING;
    }

    fn new_table(&mut self) {
        self.table = Table::empty();
        self.filepath = None;
        self.offset_row = 0;
        self.offset_column = 0;
        self.set_status_message("New table");
    }

    // ---------------------- Command / prompt handling ---------------------- //

    fn begin_command(&mut self, command: Command) {
        debug!("Begin command {:?}", command);
        self.pending = Some(PendingCommand::new(command, &self.table));
        self.advance_pending();
    }

    fn advance_pending(&mut self) {
        let has_prompt = self
            .pending
            .as_ref()
            .is_some_and(|p| p.next_prompt().is_some());
        if has_prompt {
            self.modus = Modus::PROMPT;
            self.input.clear();
        } else if self.pending.is_some() {
            self.finish_pending();
        }
    }

    fn prompt_input(&mut self, key: KeyEvent) {
        let result = self.input.read(key);
        if result.finished {
            if result.canceled {
                self.cancel_prompt();
            } else {
                self.confirm_prompt(result.input);
            }
        }
    }

    fn confirm_prompt(&mut self, text: String) {
        let Some(mut pending) = self.pending.take() else {
            self.modus = Modus::TABLE;
            return;
        };
        let Some(spec) = pending.next_prompt().cloned() else {
            self.pending = Some(pending);
            self.finish_pending();
            return;
        };

        let answer = match spec.kind {
            PromptKind::Integer => match text.trim().parse::<i64>() {
                Ok(n) => Answer::Int(n),
                Err(_) => {
                    // The prompt stays open; only the error popup is modal
                    trace!("Rejected integer input {text:?}");
                    self.pending = Some(pending);
                    self.input.resume();
                    self.show_error(EditError::InvalidIntegerInput);
                    return;
                }
            },
            PromptKind::Text => Answer::Text(text),
        };
        pending.push_answer(answer);

        // Multi-step commands abort before the next parameter is requested
        if let Err(e) = pending.check(&self.table) {
            self.modus = Modus::TABLE;
            self.show_error(e);
            return;
        }

        self.pending = Some(pending);
        if self.pending.as_ref().is_some_and(|p| p.is_complete()) {
            self.finish_pending();
        } else {
            self.input.clear();
        }
    }

    fn cancel_prompt(&mut self) {
        let Some(mut pending) = self.pending.take() else {
            self.modus = Modus::TABLE;
            return;
        };
        if pending.cancel_skips() {
            pending.push_answer(Answer::Cancelled);
            self.pending = Some(pending);
            if self.pending.as_ref().is_some_and(|p| p.is_complete()) {
                self.finish_pending();
            } else {
                self.input.clear();
            }
        } else {
            trace!("Prompt canceled, dropping {:?}", pending.command);
            self.modus = Modus::TABLE;
        }
    }

    fn finish_pending(&mut self) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        self.modus = Modus::TABLE;
        match pending.command {
            Command::OpenFile => self.finish_open(&pending),
            Command::SaveFileAs => self.finish_save_as(&pending),
            _ => match command::apply(&pending, &mut self.table, &self.config) {
                Ok(Applied::Mutated(message)) => self.set_status_message(message),
                Ok(Applied::Skipped(Some(message))) => self.set_status_message(message),
                Ok(Applied::Skipped(None)) => (),
                Err(e) => self.show_error(e),
            },
        }
    }

    fn finish_open(&mut self, pending: &PendingCommand) {
        let Some(raw) = pending.path_answer() else {
            return;
        };
        if raw.is_empty() {
            return;
        }
        let path = match shellexpand::full(raw) {
            Ok(expanded) => PathBuf::from(expanded.as_ref()),
            Err(e) => {
                self.show_error(EditError::FileRead(e.to_string()));
                return;
            }
        };
        match Table::load_csv(&path) {
            Ok(table) => {
                self.set_status_message(format!("Loaded {}", path.display()));
                self.table = table;
                self.filepath = Some(path);
                self.offset_row = 0;
                self.offset_column = 0;
            }
            Err(e) => self.show_error(e),
        }
    }

    fn finish_save_as(&mut self, pending: &PendingCommand) {
        let Some(raw) = pending.path_answer() else {
            return;
        };
        if raw.is_empty() {
            return;
        }
        match shellexpand::full(raw) {
            Ok(expanded) => {
                self.filepath = Some(PathBuf::from(expanded.as_ref()));
                self.save_file();
            }
            Err(e) => self.show_error(EditError::FileWrite(e.to_string())),
        }
    }

    fn save_file(&mut self) {
        match self.filepath.clone() {
            Some(path) => match self.table.save_csv(&path) {
                Ok(()) => {
                    info!("Saved table to {}", path.display());
                    self.show_popup("Save File", "File saved successfully!".to_string());
                }
                Err(e) => self.show_error(e),
            },
            None => self.begin_command(Command::SaveFileAs),
        }
    }

    // ------------------------- Popup handling ------------------------- //

    fn show_popup(&mut self, title: &str, message: String) {
        self.previous_modus = self.modus;
        self.modus = Modus::POPUP;
        self.popup = Some(PopupView {
            title: title.to_string(),
            message,
        });
    }

    fn show_error(&mut self, error: EditError) {
        warn!("{error:?}");
        let title = match &error {
            EditError::DuplicateColumn(_) => "Field Exists",
            _ => "Error",
        };
        self.show_popup(title, error.to_string());
    }

    fn show_help(&mut self) {
        self.show_popup("Help", HELP_TEXT.to_string());
    }

    fn close_popup(&mut self) {
        trace!("Close popup ...");
        self.modus = self.previous_modus;
        self.previous_modus = Modus::POPUP;
        self.popup = None;
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
    }

    // --------------------------- Scrolling --------------------------- //

    fn max_offset_row(&self) -> usize {
        self.table.nrows().saturating_sub(self.uilayout.table_height)
    }

    fn scroll_up(&mut self, size: usize) {
        self.offset_row = self.offset_row.saturating_sub(size);
    }

    fn scroll_down(&mut self, size: usize) {
        self.offset_row = cmp::min(self.offset_row + size, self.max_offset_row());
    }

    fn scroll_right(&mut self) {
        self.offset_column = cmp::min(
            self.offset_column + 1,
            self.table.ncols().saturating_sub(1),
        );
    }

    fn ui_resize(&mut self, width: usize, height: usize) {
        trace!(
            "UI was resized! w:{}->{}, h:{}->{}",
            self.width, width, self.height, height
        );
        self.width = width;
        self.height = height;
    }

    // ------------------------- View building ------------------------- //

    /// Full rebuild of everything the UI shows: normalize the table,
    /// recompute the layout, slice the visible rows out of every fitting
    /// column and regenerate the row-number index over the same slice.
    fn refresh_view(&mut self) {
        self.table.normalize();

        let nrows = self.table.nrows();
        let index_width = cmp::max(4, nrows.to_string().len() + 1);
        self.uilayout = UILayout::from_values(index_width, self.width, self.height);

        // A mutation may have shrunk the table under the current view
        self.offset_row = cmp::min(self.offset_row, self.max_offset_row());
        self.offset_column = cmp::min(
            self.offset_column,
            self.table.ncols().saturating_sub(1),
        );

        let rbegin = self.offset_row;
        let rend = cmp::min(rbegin + self.uilayout.table_height, nrows);

        // Columns that fit the current width; the last one may be partial
        let mut views: Vec<ColumnView> = Vec::new();
        let mut visible_width = 0;
        for column in self.table.columns().iter().skip(self.offset_column) {
            if visible_width >= self.uilayout.table_width {
                break;
            }
            let full = Self::column_render_width(column, self.config.max_column_width);
            let width = cmp::min(full, self.uilayout.table_width - visible_width);
            let data = column.data[rbegin..rend]
                .iter()
                .map(|v| v.clone().unwrap_or_default())
                .collect();
            views.push(ColumnView {
                name: Self::visible_name(&column.name, width),
                width,
                data,
            });
            visible_width += width + 1;
        }

        let index = ColumnView {
            name: "Row".to_string(),
            width: index_width,
            data: (rbegin..rend).map(|idx| (idx + 1).to_string()).collect(),
        };

        let prompt = self
            .pending
            .as_ref()
            .and_then(|p| p.next_prompt())
            .map(|spec| {
                let input = self.input.get();
                PromptView {
                    title: spec.title.clone(),
                    label: spec.label.clone(),
                    input: input.input,
                    cursor: input.cursor,
                }
            });

        let name = self
            .filepath
            .as_ref()
            .and_then(|p| p.file_name())
            .and_then(|s| s.to_str())
            .unwrap_or("untitled")
            .to_string();

        self.uidata = UIData {
            name,
            table: views,
            index,
            nrows,
            ncols: self.table.ncols(),
            offset_row: rbegin,
            prompt,
            popup: self.popup.clone(),
            layout: self.uilayout.clone(),
            status_message: self.status_message.clone(),
        };
    }

    fn column_render_width(column: &Column, max_column_width: usize) -> usize {
        let data_width = column
            .data
            .iter()
            .map(|v| v.as_deref().map(|s| s.chars().count()).unwrap_or(0))
            .max()
            .unwrap_or(0);
        let width = cmp::max(column.name.chars().count(), data_width) + COLUMN_WIDTH_MARGIN;
        cmp::min(width, max_column_width)
    }

    fn visible_name(name: &str, width: usize) -> String {
        if width < 3 {
            return String::new();
        }
        if name.chars().count() > width {
            let mut reduced: String = name.chars().take(width - 3).collect();
            reduced.push_str("...");
            reduced
        } else {
            name.to_string()
        }
    }
}
