//! Tables, rows, and the column-major row-block decode.

use std::io::Cursor;
use std::ops::Index;
use std::sync::Arc;

use msi_fmt::{Column, StringPool, Value};

use crate::{Error, Result, RowError};

/// One decoded table row: a mapping from column name to cell value.
///
/// Rows share their column list and their string cells, so cloning is
/// cheap and iteration allocates nothing.
#[derive(Debug, Clone)]
pub struct Row {
    columns: Arc<[Column]>,
    values: Vec<Value>,
}

impl Row {
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Cell lookup by column name.
    pub fn get(&self, column: &str) -> Option<&Value> {
        let position = self.columns.iter().position(|c| c.name() == column)?;
        Some(&self.values[position])
    }

    /// Text of a string cell; `None` when the cell is null, absent, or
    /// not a string column.
    pub fn text(&self, column: &str) -> Option<&str> {
        self.get(column).and_then(Value::as_str)
    }

    /// Value of an integer cell; `None` when null, absent, or not an
    /// integer column.
    pub fn integer(&self, column: &str) -> Option<i32> {
        self.get(column).and_then(Value::as_int)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Index<usize> for Row {
    type Output = Value;

    fn index(&self, index: usize) -> &Value {
        &self.values[index]
    }
}

#[derive(Debug)]
enum RowState {
    Unloaded,
    Loaded(Vec<Row>),
    /// First materialisation failed; replayed on later accesses.
    Failed(Error),
}

/// A table of the package database.
///
/// Rows are materialised on first access through
/// [`Package::get`](crate::Package::get) and frozen afterwards; a table
/// is never left half-loaded.
#[derive(Debug)]
pub struct Table {
    name: String,
    columns: Arc<[Column]>,
    state: RowState,
}

impl Table {
    pub(crate) fn new(name: impl Into<String>, columns: Vec<Column>) -> Table {
        Table {
            name: name.into(),
            columns: columns.into(),
            state: RowState::Unloaded,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    /// Runs `f` against one column definition, rebuilding the shared
    /// column list. Returns `None` when the column does not exist.
    pub(crate) fn with_column_mut<R>(
        &mut self,
        name: &str,
        f: impl FnOnce(&mut Column) -> R,
    ) -> Option<R> {
        let mut columns = self.columns.to_vec();
        let column = columns.iter_mut().find(|c| c.name() == name)?;
        let result = f(column);
        self.columns = columns.into();
        Some(result)
    }

    /// Indices of the primary-key columns, in schema order.
    pub fn key_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_primary_key())
            .map(|(index, _)| index)
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state, RowState::Loaded(_))
    }

    /// The materialised rows, in stream order. Empty until the table has
    /// been loaded via [`Package::get`](crate::Package::get).
    pub fn rows(&self) -> &[Row] {
        match &self.state {
            RowState::Loaded(rows) => rows,
            _ => &[],
        }
    }

    pub(crate) fn failure(&self) -> Option<&Error> {
        match &self.state {
            RowState::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub(crate) fn set_loaded(&mut self, rows: Vec<Row>) {
        self.state = RowState::Loaded(rows);
    }

    pub(crate) fn set_failed(&mut self, err: Error) {
        self.state = RowState::Failed(err);
    }

    /// Decodes this table's row block.
    ///
    /// Rows are stored column-major: every column-1 cell first, then
    /// every column-2 cell, and so on. The row count is the stream
    /// length divided by the row stride; a remainder means the stream
    /// is malformed.
    pub(crate) fn decode(&self, bytes: &[u8], pool: &StringPool) -> Result<Vec<Row>> {
        let long_string_refs = pool.long_string_refs();
        let stride: u64 = self
            .columns
            .iter()
            .map(|column| column.width(long_string_refs))
            .sum();
        let length = bytes.len() as u64;
        if stride == 0 || length % stride != 0 {
            return Err(RowError::MalformedTable {
                table: self.name.clone(),
                length,
                stride,
            }
            .into());
        }
        let row_count = (length / stride) as usize;

        let mut reader = Cursor::new(bytes);
        let mut cells_by_column: Vec<Vec<Value>> = Vec::with_capacity(self.columns.len());
        for column in self.columns.iter() {
            let mut cells = Vec::with_capacity(row_count);
            for _ in 0..row_count {
                let value = column.read_value(&mut reader, pool).map_err(Error::from)?;
                if value.is_null() && !column.is_nullable() {
                    log::warn!(
                        "table {:?}: null cell in non-nullable column {:?}",
                        self.name,
                        column.name()
                    );
                }
                cells.push(value);
            }
            cells_by_column.push(cells);
        }

        let mut rows = Vec::with_capacity(row_count);
        for row in 0..row_count {
            let values = cells_by_column
                .iter_mut()
                .map(|cells| std::mem::replace(&mut cells[row], Value::Null))
                .collect();
            rows.push(Row {
                columns: Arc::clone(&self.columns),
                values,
            });
        }
        Ok(rows)
    }
}

impl<'a> IntoIterator for &'a Table {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows().iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use msi_fmt::{int16_to_raw, int32_to_raw};

    fn test_pool(strings: &[&str]) -> StringPool {
        let mut pool = 1252u32.to_le_bytes().to_vec();
        let mut data = Vec::new();
        for text in strings {
            pool.extend_from_slice(&(text.len() as u16).to_le_bytes());
            pool.extend_from_slice(&1u16.to_le_bytes());
            data.extend_from_slice(text.as_bytes());
        }
        StringPool::read(&pool, &data).unwrap()
    }

    fn media_table() -> Table {
        Table::new(
            "Media",
            vec![
                Column::int16("DiskId").key(),
                Column::int32("LastSequence"),
                Column::string("Cabinet", 255).nullable(),
            ],
        )
    }

    #[test]
    fn column_major_blocks_decode_row_major() {
        let pool = test_pool(&["#cab1.cab", "#cab2.cab"]);
        let table = media_table();

        // Column-major: both DiskIds, both LastSequences, both Cabinets.
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&int16_to_raw(Some(1)).to_le_bytes());
        bytes.extend_from_slice(&int16_to_raw(Some(2)).to_le_bytes());
        bytes.extend_from_slice(&int32_to_raw(Some(10)).to_le_bytes());
        bytes.extend_from_slice(&int32_to_raw(Some(25)).to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes());
        bytes.extend_from_slice(&2u16.to_le_bytes());

        let rows = table.decode(&bytes, &pool).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].integer("DiskId"), Some(1));
        assert_eq!(rows[0].integer("LastSequence"), Some(10));
        assert_eq!(rows[0].text("Cabinet"), Some("#cab1.cab"));
        assert_eq!(rows[1].integer("DiskId"), Some(2));
        assert_eq!(rows[1].text("Cabinet"), Some("#cab2.cab"));
        assert_eq!(rows[1][2], Value::Str("#cab2.cab".into()));
        assert_eq!(rows[0].get("NoSuchColumn"), None);
    }

    #[test]
    fn ragged_stream_is_malformed() {
        let pool = test_pool(&[]);
        let table = media_table();
        // Stride is 2 + 4 + 2 = 8; 11 bytes cannot hold whole rows.
        let err = table.decode(&[0u8; 11], &pool).unwrap_err();
        assert!(matches!(
            err,
            Error::Row(RowError::MalformedTable {
                length: 11,
                stride: 8,
                ..
            })
        ));
    }

    #[test]
    fn empty_stream_decodes_to_no_rows() {
        let pool = test_pool(&[]);
        let table = media_table();
        assert!(table.decode(&[], &pool).unwrap().is_empty());
    }

    #[test]
    fn nullable_cells_surface_as_null() {
        let pool = test_pool(&[]);
        let table = media_table();
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&int16_to_raw(Some(1)).to_le_bytes());
        bytes.extend_from_slice(&int32_to_raw(Some(10)).to_le_bytes());
        bytes.extend_from_slice(&0u16.to_le_bytes());
        let rows = table.decode(&bytes, &pool).unwrap();
        assert!(rows[0].get("Cabinet").unwrap().is_null());
        assert_eq!(rows[0].text("Cabinet"), None);
    }

    #[test]
    fn key_indices_follow_schema_order() {
        let table = Table::new(
            "_Columns",
            vec![
                Column::string("Table", 64).key(),
                Column::int16("Number").key(),
                Column::string("Name", 64),
                Column::int16("Type"),
            ],
        );
        assert_eq!(table.key_indices().collect::<Vec<_>>(), vec![0, 1]);
    }
}
