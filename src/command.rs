use tracing::debug;

use crate::domain::{EditError, TweakConfig};
use crate::table::Table;

/// What kind of value a prompt collects.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PromptKind {
    Text,
    Integer,
}

/// One modal request shown to the user.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptSpec {
    pub title: String,
    pub label: String,
    pub kind: PromptKind,
}

fn text(title: &str, label: &str) -> PromptSpec {
    PromptSpec {
        title: title.to_string(),
        label: label.to_string(),
        kind: PromptKind::Text,
    }
}

fn integer(title: &str, label: &str) -> PromptSpec {
    PromptSpec {
        title: title.to_string(),
        label: label.to_string(),
        kind: PromptKind::Integer,
    }
}

/// The commands that collect their parameters through modal prompts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    OpenFile,
    SaveFileAs,
    AddField,
    DeleteField,
    AddRow,
    DeleteRow,
    AddCellValue,
    DeleteCellValue,
}

/// A resolved prompt: the entered value, or nothing on cancel.
#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    Text(String),
    Int(i64),
    Cancelled,
}

/// A command in flight: the prompts it still has to show and the answers
/// collected so far. The prompt plan is fixed when the command starts, so
/// Add Row snapshots the column list of that moment.
#[derive(Debug)]
pub struct PendingCommand {
    pub command: Command,
    prompts: Vec<PromptSpec>,
    row_columns: Vec<String>,
    answers: Vec<Answer>,
}

impl PendingCommand {
    pub fn new(command: Command, table: &Table) -> Self {
        let mut row_columns = Vec::new();
        let prompts = match command {
            Command::OpenFile => vec![text("Open", "Enter path to csv file:")],
            Command::SaveFileAs => vec![text("Save As", "Enter path to save to:")],
            Command::AddField => vec![text("Add Field", "Enter new field name:")],
            Command::DeleteField => vec![text("Delete Field", "Enter field name:")],
            Command::AddRow => {
                row_columns = table.column_names();
                row_columns
                    .iter()
                    .map(|c| text(&format!("Column '{c}'"), "Enter row value:"))
                    .collect()
            }
            Command::DeleteRow => vec![integer("Delete Row", "Enter row number:")],
            Command::AddCellValue => vec![
                text("Add Cell Value", "Enter column name:"),
                integer("Add Cell Value", "Enter row number:"),
                text("Add Cell Value", "Enter value:"),
            ],
            Command::DeleteCellValue => vec![
                text("Delete Cell Value", "Enter column name:"),
                integer("Delete Cell Value", "Enter row number:"),
            ],
        };
        Self {
            command,
            prompts,
            row_columns,
            answers: Vec::new(),
        }
    }

    /// The prompt that still has to be answered, if any.
    pub fn next_prompt(&self) -> Option<&PromptSpec> {
        self.prompts.get(self.answers.len())
    }

    pub fn push_answer(&mut self, answer: Answer) {
        self.answers.push(answer);
    }

    pub fn is_complete(&self) -> bool {
        self.answers.len() == self.prompts.len()
    }

    /// Whether a cancelled prompt skips only the current parameter. Add Row
    /// treats each column prompt independently; for every other command a
    /// cancel aborts the whole thing.
    pub fn cancel_skips(&self) -> bool {
        matches!(self.command, Command::AddRow)
    }

    /// Validate the answers collected so far. Called after every answer, so
    /// the cell commands abort before requesting further parameters.
    pub fn check(&self, table: &Table) -> Result<(), EditError> {
        match self.command {
            Command::AddCellValue | Command::DeleteCellValue => {
                if let Some(Answer::Text(name)) = self.answers.first()
                    && !table.has_column(name)
                {
                    return Err(EditError::ColumnNotFound(name.clone()));
                }
                if let Some(Answer::Int(n)) = self.answers.get(1) {
                    row_index(*n, table)?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// The path entered for Open/Save As.
    pub fn path_answer(&self) -> Option<&str> {
        self.text_answer(0)
    }

    fn text_answer(&self, idx: usize) -> Option<&str> {
        match self.answers.get(idx) {
            Some(Answer::Text(s)) => Some(s),
            _ => None,
        }
    }

    fn int_answer(&self, idx: usize) -> Option<i64> {
        match self.answers.get(idx) {
            Some(Answer::Int(n)) => Some(*n),
            _ => None,
        }
    }
}

/// Outcome of a completed command.
#[derive(Debug, PartialEq)]
pub enum Applied {
    /// The table changed; the string goes to the status line.
    Mutated(String),
    /// Nothing changed, optionally with a status line explanation.
    Skipped(Option<String>),
}

/// Convert a 1-based user row number into a 0-based table index.
fn row_index(n: i64, table: &Table) -> Result<usize, EditError> {
    if n < 1 || n > table.nrows() as i64 {
        return Err(EditError::IndexOutOfRange);
    }
    Ok((n - 1) as usize)
}

/// Apply a fully answered edit command to the table. Validation happens
/// before the mutation, so on error the table is untouched. The file
/// commands are not handled here; the model owns the file association.
pub fn apply(
    pending: &PendingCommand,
    table: &mut Table,
    config: &TweakConfig,
) -> Result<Applied, EditError> {
    debug!("Applying {:?}", pending.command);
    match pending.command {
        Command::AddField => {
            let Some(name) = pending.text_answer(0) else {
                return Ok(Applied::Skipped(None));
            };
            if name.is_empty() {
                return Ok(Applied::Skipped(None));
            }
            table.add_column(name)?;
            Ok(Applied::Mutated(format!("Added field \"{name}\"")))
        }
        Command::DeleteField => {
            let Some(name) = pending.text_answer(0) else {
                return Ok(Applied::Skipped(None));
            };
            table.delete_column(name)?;
            Ok(Applied::Mutated(format!("Deleted field \"{name}\"")))
        }
        Command::AddRow => {
            let values: Vec<(String, String)> = pending
                .row_columns
                .iter()
                .enumerate()
                .filter_map(|(idx, column)| {
                    pending
                        .text_answer(idx)
                        .map(|v| (column.clone(), v.to_string()))
                })
                .collect();
            if values.is_empty() {
                return Ok(Applied::Skipped(Some(
                    "No values provided. Row not added.".to_string(),
                )));
            }
            table.append_row(&values, config.fill_missing_with_empty);
            Ok(Applied::Mutated(format!("Added row {}", table.nrows())))
        }
        Command::DeleteRow => {
            let Some(n) = pending.int_answer(0) else {
                return Ok(Applied::Skipped(None));
            };
            let idx = row_index(n, table)?;
            table.delete_row_at(idx)?;
            Ok(Applied::Mutated(format!("Deleted row {n}")))
        }
        Command::AddCellValue => {
            let (Some(column), Some(n), Some(value)) = (
                pending.text_answer(0),
                pending.int_answer(1),
                pending.text_answer(2),
            ) else {
                return Ok(Applied::Skipped(None));
            };
            let idx = row_index(n, table)?;
            table.set_cell(idx, column, value)?;
            Ok(Applied::Mutated(format!("Set \"{column}\" in row {n}")))
        }
        Command::DeleteCellValue => {
            let (Some(column), Some(n)) = (pending.text_answer(0), pending.int_answer(1)) else {
                return Ok(Applied::Skipped(None));
            };
            let idx = row_index(n, table)?;
            table.clear_cell(idx, column)?;
            Ok(Applied::Mutated(format!("Cleared \"{column}\" in row {n}")))
        }
        // The path prompts resolve in the model.
        Command::OpenFile | Command::SaveFileAs => Ok(Applied::Skipped(None)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        let mut table = Table::empty();
        table.add_column("name").unwrap();
        table.add_column("age").unwrap();
        table.append_row(
            &[
                ("name".to_string(), "Ann".to_string()),
                ("age".to_string(), "30".to_string()),
            ],
            false,
        );
        table
    }

    fn scripted(command: Command, table: &Table, answers: Vec<Answer>) -> PendingCommand {
        let mut pending = PendingCommand::new(command, table);
        for answer in answers {
            pending.push_answer(answer);
        }
        pending
    }

    #[test]
    fn add_field_applies() {
        let mut table = sample();
        let pending = scripted(
            Command::AddField,
            &table,
            vec![Answer::Text("city".to_string())],
        );
        let applied = apply(&pending, &mut table, &TweakConfig::default()).unwrap();
        assert!(matches!(applied, Applied::Mutated(_)));
        assert!(table.has_column("city"));
    }

    #[test]
    fn add_field_with_empty_name_is_a_noop() {
        let mut table = sample();
        let pending = scripted(Command::AddField, &table, vec![Answer::Text(String::new())]);
        let applied = apply(&pending, &mut table, &TweakConfig::default()).unwrap();
        assert_eq!(applied, Applied::Skipped(None));
        assert_eq!(table.ncols(), 2);
    }

    #[test]
    fn add_field_duplicate_leaves_table_unchanged() {
        let mut table = sample();
        let pending = scripted(
            Command::AddField,
            &table,
            vec![Answer::Text("name".to_string())],
        );
        let err = apply(&pending, &mut table, &TweakConfig::default()).unwrap_err();
        assert_eq!(err, EditError::DuplicateColumn("name".to_string()));
        assert_eq!(table.ncols(), 2);
    }

    #[test]
    fn delete_row_converts_one_based_numbers() {
        let mut table = sample();
        table.append_row(
            &[
                ("name".to_string(), "Bob".to_string()),
                ("age".to_string(), "41".to_string()),
            ],
            false,
        );
        let pending = scripted(Command::DeleteRow, &table, vec![Answer::Int(1)]);
        apply(&pending, &mut table, &TweakConfig::default()).unwrap();
        assert_eq!(table.nrows(), 1);
        assert_eq!(table.cell(0, "name").unwrap(), "Bob");
    }

    #[test]
    fn delete_row_rejects_out_of_range_numbers() {
        let mut table = sample();
        for n in [0, 2, -3] {
            let pending = scripted(Command::DeleteRow, &table, vec![Answer::Int(n)]);
            let err = apply(&pending, &mut table, &TweakConfig::default()).unwrap_err();
            assert_eq!(err, EditError::IndexOutOfRange);
        }
        assert_eq!(table.nrows(), 1);
    }

    #[test]
    fn add_row_prompts_follow_column_order() {
        let table = sample();
        let pending = PendingCommand::new(Command::AddRow, &table);
        assert_eq!(pending.prompts.len(), 2);
        assert_eq!(pending.prompts[0].title, "Column 'name'");
        assert_eq!(pending.prompts[1].title, "Column 'age'");
    }

    #[test]
    fn add_row_includes_only_answered_columns() {
        let mut table = sample();
        let pending = scripted(
            Command::AddRow,
            &table,
            vec![Answer::Cancelled, Answer::Text("55".to_string())],
        );
        let applied = apply(&pending, &mut table, &TweakConfig::default()).unwrap();
        assert!(matches!(applied, Applied::Mutated(_)));
        assert_eq!(table.nrows(), 2);
        assert_eq!(table.columns()[0].data[1], None);
        assert_eq!(table.cell(1, "age").unwrap(), "55");
    }

    #[test]
    fn add_row_with_no_answers_adds_nothing() {
        let mut table = sample();
        let pending = scripted(
            Command::AddRow,
            &table,
            vec![Answer::Cancelled, Answer::Cancelled],
        );
        let applied = apply(&pending, &mut table, &TweakConfig::default()).unwrap();
        assert!(matches!(applied, Applied::Skipped(Some(_))));
        assert_eq!(table.nrows(), 1);
    }

    #[test]
    fn cell_command_checks_column_before_asking_for_a_row() {
        let table = sample();
        let pending = scripted(
            Command::AddCellValue,
            &table,
            vec![Answer::Text("city".to_string())],
        );
        assert_eq!(
            pending.check(&table).unwrap_err(),
            EditError::ColumnNotFound("city".to_string())
        );

        let pending = scripted(
            Command::AddCellValue,
            &table,
            vec![Answer::Text("age".to_string())],
        );
        assert!(pending.check(&table).is_ok());
    }

    #[test]
    fn cell_command_checks_row_before_asking_for_a_value() {
        let table = sample();
        let pending = scripted(
            Command::AddCellValue,
            &table,
            vec![Answer::Text("age".to_string()), Answer::Int(2)],
        );
        assert_eq!(pending.check(&table).unwrap_err(), EditError::IndexOutOfRange);
    }

    #[test]
    fn add_cell_value_sets_the_cell() {
        let mut table = sample();
        let pending = scripted(
            Command::AddCellValue,
            &table,
            vec![
                Answer::Text("age".to_string()),
                Answer::Int(1),
                Answer::Text("31".to_string()),
            ],
        );
        apply(&pending, &mut table, &TweakConfig::default()).unwrap();
        assert_eq!(table.cell(0, "age").unwrap(), "31");
    }

    #[test]
    fn delete_cell_value_clears_without_removing() {
        let mut table = sample();
        let pending = scripted(
            Command::DeleteCellValue,
            &table,
            vec![Answer::Text("age".to_string()), Answer::Int(1)],
        );
        apply(&pending, &mut table, &TweakConfig::default()).unwrap();
        assert_eq!(table.cell(0, "age").unwrap(), "");
        assert_eq!(table.nrows(), 1);
    }
}
