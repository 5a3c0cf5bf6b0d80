//! Schema bootstrap from the self-describing meta-tables.
//!
//! `_Tables` and `_Columns` describe every user table — and each other.
//! Their own schemas are the two fixed points known up front; everything
//! else is discovered at open time. `_Validation`, when present, layers
//! nullability, ranges, foreign keys and category tags onto the
//! discovered columns.

use std::collections::BTreeMap;
use std::fmt;

use msi_fmt::{Column, ColumnValidation};

use crate::{Result, Row, SchemaError, Table};

pub const TABLES_TABLE: &str = "_Tables";
pub const COLUMNS_TABLE: &str = "_Columns";
pub const VALIDATION_TABLE: &str = "_Validation";

/// `_Tables` has the single key column `Name`.
pub(crate) fn tables_columns() -> Vec<Column> {
    vec![Column::string("Name", 64).key()]
}

/// `_Columns` keys on (`Table`, `Number`) and carries the name and
/// type-bits word of every column of every table.
pub(crate) fn columns_columns() -> Vec<Column> {
    vec![
        Column::string("Table", 64).key(),
        Column::int16("Number").key(),
        Column::string("Name", 64),
        Column::int16("Type"),
    ]
}

pub(crate) fn validation_columns() -> Vec<Column> {
    vec![
        Column::string("Table", 32).key(),
        Column::string("Column", 32).key(),
        Column::string("Nullable", 4),
        Column::int32("MinValue").nullable(),
        Column::int32("MaxValue").nullable(),
        Column::string("KeyTable", 255).nullable(),
        Column::int16("KeyColumn").nullable(),
        Column::string("Category", 32).nullable(),
        Column::string("Set", 255).nullable(),
        Column::string("Description", 255).nullable(),
    ]
}

/// A recoverable bootstrap finding, collected on the package and also
/// logged at `warn` level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// `_Columns` describes a table `_Tables` does not list.
    OrphanColumns { table: String },
    /// `_Validation` constrains a table missing from the catalog.
    ValidationForUnknownTable { table: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::OrphanColumns { table } => {
                write!(f, "`_Columns` describes unlisted table {table:?}")
            }
            Diagnostic::ValidationForUnknownTable { table } => {
                write!(f, "`_Validation` references unknown table {table:?}")
            }
        }
    }
}

fn required_text(row: &Row, table: &str, column: &str) -> Result<String> {
    row.text(column)
        .map(str::to_string)
        .ok_or_else(|| {
            SchemaError::MalformedBootstrapRow {
                table: table.to_string(),
                column: column.to_string(),
            }
            .into()
        })
}

fn required_int(row: &Row, table: &str, column: &str) -> Result<i32> {
    row.integer(column).ok_or_else(|| {
        SchemaError::MalformedBootstrapRow {
            table: table.to_string(),
            column: column.to_string(),
        }
        .into()
    })
}

/// Builds the user-table catalog from decoded `_Tables` and `_Columns`
/// rows.
///
/// Column lists are ordered by the 1-based `Number` cell, which must be
/// dense per table. Tables described only in `_Columns` are skipped
/// with a diagnostic; tables listed without any columns are an error.
pub(crate) fn build_catalog(
    table_rows: &[Row],
    column_rows: &[Row],
) -> Result<(BTreeMap<String, Table>, Vec<Diagnostic>)> {
    let mut names = Vec::with_capacity(table_rows.len());
    for row in table_rows {
        names.push(required_text(row, TABLES_TABLE, "Name")?);
    }

    let mut columns_by_table: BTreeMap<String, Vec<(i32, Column)>> = BTreeMap::new();
    for row in column_rows {
        let table = required_text(row, COLUMNS_TABLE, "Table")?;
        let number = required_int(row, COLUMNS_TABLE, "Number")?;
        let name = required_text(row, COLUMNS_TABLE, "Name")?;
        let type_bits = required_int(row, COLUMNS_TABLE, "Type")? as u16;
        columns_by_table
            .entry(table)
            .or_default()
            .push((number, Column::from_type_bits(name, type_bits)));
    }

    let mut diagnostics = Vec::new();
    for table in columns_by_table.keys() {
        if !names.iter().any(|name| name == table) {
            diagnostics.push(Diagnostic::OrphanColumns {
                table: table.clone(),
            });
        }
    }

    let mut catalog = BTreeMap::new();
    for name in names {
        let Some(mut numbered) = columns_by_table.remove(&name) else {
            return Err(SchemaError::TableWithoutColumns { table: name }.into());
        };
        numbered.sort_by_key(|(number, _)| *number);
        let dense = numbered
            .iter()
            .enumerate()
            .all(|(index, (number, _))| *number == index as i32 + 1);
        if !dense {
            return Err(SchemaError::NonDenseColumnNumbers { table: name }.into());
        }
        let columns = numbered.into_iter().map(|(_, column)| column).collect();
        catalog.insert(name.clone(), Table::new(name, columns));
    }

    Ok((catalog, diagnostics))
}

/// Applies decoded `_Validation` rows to the catalog.
///
/// Rows naming an unknown table are collected as diagnostics; rows
/// naming a missing column of a known table are a hard error.
pub(crate) fn apply_validation(
    catalog: &mut BTreeMap<String, Table>,
    validation_rows: &[Row],
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<()> {
    for row in validation_rows {
        let table_name = required_text(row, VALIDATION_TABLE, "Table")?;
        let column_name = required_text(row, VALIDATION_TABLE, "Column")?;
        let Some(table) = catalog.get_mut(&table_name) else {
            log::warn!("`_Validation` references unknown table {table_name:?}");
            diagnostics.push(Diagnostic::ValidationForUnknownTable { table: table_name });
            continue;
        };

        let foreign_key = match (row.text("KeyTable"), row.integer("KeyColumn")) {
            (Some(key_table), Some(key_column)) => Some((key_table.to_string(), key_column)),
            _ => None,
        };
        let validation = ColumnValidation {
            nullable: row.text("Nullable") == Some("Y"),
            min_value: row.integer("MinValue"),
            max_value: row.integer("MaxValue"),
            foreign_key,
            category: row.text("Category").and_then(|c| c.parse().ok()),
            enum_values: row
                .text("Set")
                .map(|set| set.split(';').map(str::to_string).collect()),
            description: row.text("Description").map(str::to_string),
        };

        table
            .with_column_mut(&column_name, |column| column.apply_validation(validation))
            .ok_or_else(|| SchemaError::MissingColumn {
                table: table_name,
                column: column_name,
            })?;
    }
    Ok(())
}
