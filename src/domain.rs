use std::fmt;
use std::io::Error;

use ratatui::crossterm::event::KeyEvent;

/// Fatal errors that end the run loop. Everything recoverable is an
/// [`EditError`] and surfaces as a popup instead.
#[derive(Debug)]
pub enum TweakError {
    IoError(Error),
}

impl From<Error> for TweakError {
    fn from(err: Error) -> Self {
        TweakError::IoError(err)
    }
}

/// Command-level errors. Each one is shown to the user as a blocking popup
/// and leaves the table in its last valid state.
#[derive(Debug, Clone, PartialEq)]
pub enum EditError {
    DuplicateColumn(String),
    ColumnNotFound(String),
    IndexOutOfRange,
    InvalidIntegerInput,
    FileRead(String),
    FileWrite(String),
}

impl fmt::Display for EditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditError::DuplicateColumn(name) => {
                write!(f, "The field \"{name}\" already exists.")
            }
            EditError::ColumnNotFound(name) => write!(f, "Field \"{name}\" not found."),
            EditError::IndexOutOfRange => write!(f, "Invalid row number."),
            EditError::InvalidIntegerInput => write!(f, "Please enter a valid integer."),
            EditError::FileRead(msg) => write!(f, "Failed to load file: {msg}"),
            EditError::FileWrite(msg) => write!(f, "Failed to save file: {msg}"),
        }
    }
}

impl std::error::Error for EditError {}

/// One user intent, produced by the controller and consumed by the model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Message {
    Quit,
    NewTable,
    OpenFile,
    SaveFile,
    SaveFileAs,
    AddField,
    DeleteField,
    AddRow,
    DeleteRow,
    AddCellValue,
    DeleteCellValue,
    MoveUp,
    MoveDown,
    MovePageUp,
    MovePageDown,
    MoveBeginning,
    MoveEnd,
    MoveLeft,
    MoveRight,
    Help,
    Exit,
    Resize(usize, usize),
    RawKey(KeyEvent),
}

#[derive(Debug, Clone)]
pub struct TweakConfig {
    pub event_poll_time: u64,
    pub max_column_width: usize,
    /// When a row is appended with answers for only some columns, fill the
    /// remaining columns with empty strings instead of leaving them missing.
    /// Either way they render as empty; the difference is only visible until
    /// the next normalization pass.
    pub fill_missing_with_empty: bool,
}

impl Default for TweakConfig {
    fn default() -> Self {
        Self {
            event_poll_time: 100,
            max_column_width: 40,
            fill_missing_with_empty: false,
        }
    }
}

pub const HELP_TEXT: &str = "\
Open a csv file or simply start adding fields to create a new one.

 Ctrl+N        New file
 Ctrl+O        Open...
 Ctrl+S        Save
 Ctrl+Shift+S  Save As...
 Ctrl+Q        Quit

 Ctrl+F        Add field
 Ctrl+Shift+F  Delete field
 Ctrl+R        Add row
 Ctrl+Shift+R  Delete row
 Ctrl+Shift+C  Add cell value
 Ctrl+Shift+D  Delete cell value

 Arrows, PgUp/PgDn and Home/End scroll the table.
 F1 shows this help.

tweak - a simple csv editor. Happy tweaking.";
