use std::fs::File;
use std::path::Path;

use polars::prelude::*;
use tracing::{debug, info};

use crate::domain::EditError;

/// A single named column of text cells. `None` marks a missing value that
/// has not been normalized to an empty string yet.
#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub data: Vec<Option<String>>,
}

/// The in-memory table being edited: ordered named columns, positionally
/// indexed rows, every cell text. Every row has an entry in every column,
/// so all columns stay the same length across mutations.
#[derive(Debug, Default)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
        }
    }

    pub fn ncols(&self) -> usize {
        self.columns.len()
    }

    pub fn nrows(&self) -> usize {
        self.columns.first().map(|c| c.data.len()).unwrap_or(0)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    fn position(&self, name: &str) -> Result<usize, EditError> {
        self.columns
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| EditError::ColumnNotFound(name.to_string()))
    }

    /// Append a column, backfilling every existing row with an empty string.
    pub fn add_column(&mut self, name: &str) -> Result<(), EditError> {
        if self.has_column(name) {
            return Err(EditError::DuplicateColumn(name.to_string()));
        }
        let data = vec![Some(String::new()); self.nrows()];
        self.columns.push(Column {
            name: name.to_string(),
            data,
        });
        debug!("Added column \"{name}\"");
        Ok(())
    }

    /// Remove a column from the order and from every row.
    pub fn delete_column(&mut self, name: &str) -> Result<(), EditError> {
        let idx = self.position(name)?;
        self.columns.remove(idx);
        debug!("Deleted column \"{name}\"");
        Ok(())
    }

    /// Append a row at the end. `values` holds the answered columns; the
    /// rest are left missing, or filled with empty strings when
    /// `fill_missing_with_empty` is set. Values for unknown columns are
    /// ignored.
    pub fn append_row(&mut self, values: &[(String, String)], fill_missing_with_empty: bool) {
        for column in self.columns.iter_mut() {
            let value = values
                .iter()
                .find(|(name, _)| *name == column.name)
                .map(|(_, v)| v.clone());
            match value {
                Some(v) => column.data.push(Some(v)),
                None if fill_missing_with_empty => column.data.push(Some(String::new())),
                None => column.data.push(None),
            }
        }
    }

    /// Remove the row at `index`; later rows shift up by one position.
    pub fn delete_row_at(&mut self, index: usize) -> Result<(), EditError> {
        if index >= self.nrows() {
            return Err(EditError::IndexOutOfRange);
        }
        for column in self.columns.iter_mut() {
            column.data.remove(index);
        }
        debug!("Deleted row {index}");
        Ok(())
    }

    /// Overwrite a single cell.
    pub fn set_cell(&mut self, row: usize, column: &str, value: &str) -> Result<(), EditError> {
        let idx = self.position(column)?;
        if row >= self.nrows() {
            return Err(EditError::IndexOutOfRange);
        }
        self.columns[idx].data[row] = Some(value.to_string());
        Ok(())
    }

    /// Set a single cell to the empty string. The cell stays part of the
    /// row, it is never removed.
    pub fn clear_cell(&mut self, row: usize, column: &str) -> Result<(), EditError> {
        self.set_cell(row, column, "")
    }

    /// Read a single cell, with missing values reading as empty.
    pub fn cell(&self, row: usize, column: &str) -> Result<String, EditError> {
        let idx = self.position(column)?;
        if row >= self.nrows() {
            return Err(EditError::IndexOutOfRange);
        }
        Ok(self.columns[idx].data[row].clone().unwrap_or_default())
    }

    /// Replace every missing value with an empty string. Idempotent; runs
    /// before every render and before every save.
    pub fn normalize(&mut self) {
        for column in self.columns.iter_mut() {
            for cell in column.data.iter_mut() {
                if cell.is_none() {
                    *cell = Some(String::new());
                }
            }
        }
    }

    /// Load a csv file into a fresh table. Every cell is read as text;
    /// missing and blank cells end up empty after the next normalization.
    pub fn load_csv(path: &Path) -> Result<Self, EditError> {
        let frame = LazyCsvReader::new(PlPath::Local(path.into()))
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .finish()
            .and_then(|lf| lf.collect())
            .map_err(|e| EditError::FileRead(e.to_string()))?;

        let mut columns = Vec::with_capacity(frame.width());
        for name in frame.get_column_names() {
            let column = Self::load_column(&frame, name.as_str())
                .map_err(|e| EditError::FileRead(e.to_string()))?;
            columns.push(column);
        }
        info!("Loaded {} columns from {}", columns.len(), path.display());
        Ok(Self { columns })
    }

    fn load_column(df: &DataFrame, name: &str) -> Result<Column, PolarsError> {
        let col = df.column(name)?.cast(&DataType::String)?;
        let series = col.str()?;
        let mut data = Vec::with_capacity(series.len());
        for value in series.into_iter() {
            data.push(value.map(|s| s.to_string()));
        }
        Ok(Column {
            name: name.to_string(),
            data,
        })
    }

    /// Write the table to a csv file: header row from the declared column
    /// order, no index column.
    pub fn save_csv(&mut self, path: &Path) -> Result<(), EditError> {
        self.normalize();
        let series: Vec<polars::prelude::Column> = self
            .columns
            .iter()
            .map(|c| {
                let values: Vec<String> = c
                    .data
                    .iter()
                    .map(|v| v.clone().unwrap_or_default())
                    .collect();
                Series::new(c.name.as_str().into(), values).into_column()
            })
            .collect();
        let mut frame =
            DataFrame::new(series).map_err(|e| EditError::FileWrite(e.to_string()))?;

        let file = File::create(path).map_err(|e| EditError::FileWrite(e.to_string()))?;
        CsvWriter::new(file)
            .include_header(true)
            .finish(&mut frame)
            .map_err(|e| EditError::FileWrite(e.to_string()))?;
        info!("Saved {} rows to {}", self.nrows(), path.display());
        Ok(())
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
        table.append_row(
            &[
                ("name".to_string(), "Bob".to_string()),
                ("age".to_string(), "41".to_string()),
            ],
            false,
        );
        table
    }

    #[test]
    fn add_column_backfills_existing_rows() {
        let mut table = sample();
        table.add_column("city").unwrap();
        assert_eq!(table.ncols(), 3);
        assert_eq!(table.cell(0, "city").unwrap(), "");
        assert_eq!(table.cell(1, "city").unwrap(), "");
    }

    #[test]
    fn add_column_rejects_duplicates() {
        let mut table = sample();
        let err = table.add_column("name").unwrap_err();
        assert_eq!(err, EditError::DuplicateColumn("name".to_string()));
        assert_eq!(table.ncols(), 2);
    }

    #[test]
    fn delete_column_keeps_other_values() {
        let mut table = sample();
        table.delete_column("name").unwrap();
        assert_eq!(table.column_names(), vec!["age"]);
        assert_eq!(table.nrows(), 2);
        assert_eq!(table.cell(0, "age").unwrap(), "30");
        assert_eq!(table.cell(1, "age").unwrap(), "41");
    }

    #[test]
    fn delete_missing_column_fails() {
        let mut table = sample();
        let err = table.delete_column("city").unwrap_err();
        assert_eq!(err, EditError::ColumnNotFound("city".to_string()));
    }

    #[test]
    fn append_row_scenario() {
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
        assert_eq!(table.nrows(), 1);
        assert_eq!(table.ncols(), 2);
        assert_eq!(table.cell(0, "name").unwrap(), "Ann");
        assert_eq!(table.cell(0, "age").unwrap(), "30");
    }

    #[test]
    fn append_row_leaves_unanswered_columns_missing() {
        let mut table = sample();
        table.append_row(&[("name".to_string(), "Cid".to_string())], false);
        assert_eq!(table.nrows(), 3);
        assert_eq!(table.columns()[1].data[2], None);
        // reads as empty either way
        assert_eq!(table.cell(2, "age").unwrap(), "");
    }

    #[test]
    fn append_row_can_fill_unanswered_columns() {
        let mut table = sample();
        table.append_row(&[("name".to_string(), "Cid".to_string())], true);
        assert_eq!(table.columns()[1].data[2], Some(String::new()));
    }

    #[test]
    fn delete_row_shifts_later_rows_up() {
        let mut table = sample();
        table.delete_row_at(0).unwrap();
        assert_eq!(table.nrows(), 1);
        assert_eq!(table.cell(0, "name").unwrap(), "Bob");
    }

    #[test]
    fn delete_row_out_of_range_changes_nothing() {
        let mut table = sample();
        let err = table.delete_row_at(2).unwrap_err();
        assert_eq!(err, EditError::IndexOutOfRange);
        assert_eq!(table.nrows(), 2);
        assert_eq!(table.cell(0, "name").unwrap(), "Ann");
    }

    #[test]
    fn set_and_clear_cell() {
        let mut table = sample();
        table.set_cell(0, "age", "31").unwrap();
        assert_eq!(table.cell(0, "age").unwrap(), "31");
        table.clear_cell(0, "age").unwrap();
        assert_eq!(table.cell(0, "age").unwrap(), "");
        assert_eq!(table.nrows(), 2);
    }

    #[test]
    fn set_cell_validates_before_mutating() {
        let mut table = sample();
        assert_eq!(
            table.set_cell(0, "city", "x").unwrap_err(),
            EditError::ColumnNotFound("city".to_string())
        );
        assert_eq!(table.set_cell(2, "age", "x").unwrap_err(), EditError::IndexOutOfRange);
        assert_eq!(table.cell(0, "age").unwrap(), "30");
    }

    #[test]
    fn normalize_is_idempotent() {
        let mut table = sample();
        table.append_row(&[], false);
        table.normalize();
        let first: Vec<Vec<Option<String>>> =
            table.columns().iter().map(|c| c.data.clone()).collect();
        table.normalize();
        let second: Vec<Vec<Option<String>>> =
            table.columns().iter().map(|c| c.data.clone()).collect();
        assert_eq!(first, second);
        assert_eq!(table.cell(2, "name").unwrap(), "");
    }
}
