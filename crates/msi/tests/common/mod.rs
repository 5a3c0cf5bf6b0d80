//! In-memory package builder shared by the integration tests.
//!
//! Synthesises a genuine compound file — root class-ID, summary stream,
//! string pool, `_Tables`/`_Columns`/`_Validation`, and column-major
//! table streams — so the tests exercise the same path a real package
//! takes.

// Each test binary uses its own slice of the builder.
#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{Cursor, Write};

use msi::streamname;
use msi::{PackageKind, int16_to_raw, int32_to_raw};
use uuid::Uuid;

/// A cell as the tests specify it; must match the column kind by
/// position.
#[derive(Clone)]
pub enum Cell {
    I2(Option<i32>),
    I4(Option<i32>),
    Str(Option<&'static str>),
}

pub struct TestColumn {
    pub name: &'static str,
    pub type_bits: u16,
}

impl TestColumn {
    pub fn string(name: &'static str, max_chars: u8) -> TestColumn {
        TestColumn {
            name,
            type_bits: 0x1000 | 0x0400 | max_chars as u16,
        }
    }

    pub fn key_string(name: &'static str, max_chars: u8) -> TestColumn {
        TestColumn {
            name,
            type_bits: 0x8000 | 0x1000 | 0x0400 | max_chars as u16,
        }
    }

    pub fn nullable_string(name: &'static str, max_chars: u8) -> TestColumn {
        TestColumn {
            name,
            type_bits: 0x4000 | 0x1000 | 0x0400 | max_chars as u16,
        }
    }

    pub fn int16(name: &'static str) -> TestColumn {
        TestColumn {
            name,
            type_bits: 0x0002,
        }
    }

    pub fn key_int16(name: &'static str) -> TestColumn {
        TestColumn {
            name,
            type_bits: 0x8000 | 0x0002,
        }
    }

    pub fn int32(name: &'static str) -> TestColumn {
        TestColumn {
            name,
            type_bits: 0x0400 | 0x0004,
        }
    }
}

pub struct TestTable {
    pub name: &'static str,
    pub columns: Vec<TestColumn>,
    pub rows: Vec<Vec<Cell>>,
}

/// A `_Validation` row in shorthand form.
pub struct ValidationRow {
    pub table: &'static str,
    pub column: &'static str,
    pub nullable: bool,
    pub category: Option<&'static str>,
}

pub struct PackageBuilder {
    clsid: Uuid,
    summary_bytes: Vec<u8>,
    tables: Vec<TestTable>,
    raw_streams: Vec<(&'static str, Vec<u8>)>,
    extra_column_rows: Vec<(&'static str, i32, &'static str, u16)>,
    validation_rows: Vec<ValidationRow>,
    binary_streams: Vec<(&'static str, Vec<u8>)>,
}

impl PackageBuilder {
    pub fn new() -> PackageBuilder {
        PackageBuilder {
            clsid: PackageKind::Installer.clsid(),
            summary_bytes: b"\xfe\xff\x00\x00test summary property set".to_vec(),
            tables: Vec::new(),
            raw_streams: Vec::new(),
            extra_column_rows: Vec::new(),
            validation_rows: Vec::new(),
            binary_streams: Vec::new(),
        }
    }

    pub fn clsid(mut self, clsid: Uuid) -> PackageBuilder {
        self.clsid = clsid;
        self
    }

    pub fn table(mut self, table: TestTable) -> PackageBuilder {
        self.tables.push(table);
        self
    }

    /// Registers a table in the schema but writes raw bytes as its
    /// row stream.
    pub fn raw_table_stream(mut self, table: TestTable, bytes: Vec<u8>) -> PackageBuilder {
        self.raw_streams.push((table.name, bytes));
        self.tables.push(TestTable { rows: Vec::new(), ..table });
        self
    }

    /// Injects a `_Columns` row for a table `_Tables` does not list.
    pub fn extra_column_row(
        mut self,
        table: &'static str,
        number: i32,
        name: &'static str,
        type_bits: u16,
    ) -> PackageBuilder {
        self.extra_column_rows.push((table, number, name, type_bits));
        self
    }

    pub fn validation_row(mut self, row: ValidationRow) -> PackageBuilder {
        self.validation_rows.push(row);
        self
    }

    /// Adds a non-table stream (binary data, embedded cabinet).
    pub fn binary_stream(mut self, name: &'static str, bytes: Vec<u8>) -> PackageBuilder {
        self.binary_streams.push((name, bytes));
        self
    }

    pub fn build(self) -> Cursor<Vec<u8>> {
        let mut pool = PoolBuilder::new();
        for table in &self.tables {
            pool.intern(table.name);
            for column in &table.columns {
                pool.intern(column.name);
            }
            for row in &table.rows {
                for cell in row {
                    if let Cell::Str(Some(text)) = cell {
                        pool.intern(text);
                    }
                }
            }
        }
        for (table, _, name, _) in &self.extra_column_rows {
            pool.intern(table);
            pool.intern(name);
        }
        for row in &self.validation_rows {
            pool.intern(row.table);
            pool.intern(row.column);
            pool.intern(if row.nullable { "Y" } else { "N" });
            if let Some(category) = row.category {
                pool.intern(category);
            }
        }

        let mut comp = cfb::CompoundFile::create(Cursor::new(Vec::new())).unwrap();
        comp.set_storage_clsid("/", self.clsid).unwrap();

        write_stream(&mut comp, "\u{5}SummaryInformation", &self.summary_bytes);

        // _Tables: one string column listing every user table.
        let mut tables_bytes = Vec::new();
        for table in &self.tables {
            tables_bytes.extend_from_slice(&pool.reference(table.name).to_le_bytes());
        }
        write_table_stream(&mut comp, "_Tables", &tables_bytes);

        // _Columns, column-major over (Table, Number, Name, Type).
        let mut column_rows: Vec<(&str, i32, &str, u16)> = Vec::new();
        for table in &self.tables {
            for (index, column) in table.columns.iter().enumerate() {
                column_rows.push((table.name, index as i32 + 1, column.name, column.type_bits));
            }
        }
        column_rows.extend(
            self.extra_column_rows
                .iter()
                .map(|(table, number, name, bits)| (*table, *number, *name, *bits)),
        );
        let mut columns_bytes = Vec::new();
        for (table, _, _, _) in &column_rows {
            columns_bytes.extend_from_slice(&pool.reference(table).to_le_bytes());
        }
        for (_, number, _, _) in &column_rows {
            columns_bytes.extend_from_slice(&int16_to_raw(Some(*number)).to_le_bytes());
        }
        for (_, _, name, _) in &column_rows {
            columns_bytes.extend_from_slice(&pool.reference(name).to_le_bytes());
        }
        for (_, _, _, bits) in &column_rows {
            columns_bytes.extend_from_slice(&int16_to_raw(Some((*bits as i16).into())).to_le_bytes());
        }
        write_table_stream(&mut comp, "_Columns", &columns_bytes);

        write_table_stream(&mut comp, "_Validation", &self.validation_bytes(&pool));

        for table in &self.tables {
            let raw = self
                .raw_streams
                .iter()
                .find(|(name, _)| *name == table.name)
                .map(|(_, bytes)| bytes.clone());
            let bytes = raw.unwrap_or_else(|| encode_rows(table, &pool));
            write_table_stream(&mut comp, table.name, &bytes);
        }

        for (name, bytes) in &self.binary_streams {
            let encoded = streamname::encode(name, false).unwrap();
            write_stream(&mut comp, &encoded, bytes);
        }

        let (pool_bytes, data_bytes) = pool.finish();
        write_table_stream(&mut comp, "_StringPool", &pool_bytes);
        write_table_stream(&mut comp, "_StringData", &data_bytes);

        comp.flush().unwrap();
        let mut cursor = comp.into_inner();
        cursor.set_position(0);
        cursor
    }

    fn validation_bytes(&self, pool: &PoolBuilder) -> Vec<u8> {
        // Column-major over the fixed ten-column `_Validation` schema.
        let mut bytes = Vec::new();
        for row in &self.validation_rows {
            bytes.extend_from_slice(&pool.reference(row.table).to_le_bytes());
        }
        for row in &self.validation_rows {
            bytes.extend_from_slice(&pool.reference(row.column).to_le_bytes());
        }
        for row in &self.validation_rows {
            let nullable = if row.nullable { "Y" } else { "N" };
            bytes.extend_from_slice(&pool.reference(nullable).to_le_bytes());
        }
        for _ in &self.validation_rows {
            bytes.extend_from_slice(&int32_to_raw(None).to_le_bytes()); // MinValue
        }
        for _ in &self.validation_rows {
            bytes.extend_from_slice(&int32_to_raw(None).to_le_bytes()); // MaxValue
        }
        for _ in &self.validation_rows {
            bytes.extend_from_slice(&0u16.to_le_bytes()); // KeyTable
        }
        for _ in &self.validation_rows {
            bytes.extend_from_slice(&int16_to_raw(None).to_le_bytes()); // KeyColumn
        }
        for row in &self.validation_rows {
            let reference = row.category.map(|c| pool.reference(c)).unwrap_or(0);
            bytes.extend_from_slice(&reference.to_le_bytes());
        }
        for _ in &self.validation_rows {
            bytes.extend_from_slice(&0u16.to_le_bytes()); // Set
        }
        for _ in &self.validation_rows {
            bytes.extend_from_slice(&0u16.to_le_bytes()); // Description
        }
        bytes
    }
}

fn encode_rows(table: &TestTable, pool: &PoolBuilder) -> Vec<u8> {
    let mut bytes = Vec::new();
    for (index, column) in table.columns.iter().enumerate() {
        let is_string = column.type_bits & 0x1000 != 0;
        let is_wide = column.type_bits & 0x0400 != 0;
        for row in &table.rows {
            match &row[index] {
                Cell::Str(text) => {
                    assert!(is_string, "string cell in non-string column {}", column.name);
                    let reference = text.map(|t| pool.reference(t)).unwrap_or(0);
                    bytes.extend_from_slice(&reference.to_le_bytes());
                }
                Cell::I2(value) => {
                    assert!(!is_string && !is_wide, "i2 cell in non-i2 column {}", column.name);
                    bytes.extend_from_slice(&int16_to_raw(*value).to_le_bytes());
                }
                Cell::I4(value) => {
                    assert!(!is_string && is_wide, "i4 cell in non-i4 column {}", column.name);
                    bytes.extend_from_slice(&int32_to_raw(*value).to_le_bytes());
                }
            }
        }
    }
    bytes
}

struct PoolBuilder {
    strings: Vec<&'static str>,
    references: HashMap<&'static str, u16>,
}

impl PoolBuilder {
    fn new() -> PoolBuilder {
        PoolBuilder {
            strings: Vec::new(),
            references: HashMap::new(),
        }
    }

    fn intern(&mut self, text: &'static str) {
        if !self.references.contains_key(text) {
            self.strings.push(text);
            self.references.insert(text, self.strings.len() as u16);
        }
    }

    fn reference(&self, text: &str) -> u16 {
        self.references[text]
    }

    fn finish(&self) -> (Vec<u8>, Vec<u8>) {
        let mut pool = 1252u32.to_le_bytes().to_vec();
        let mut data = Vec::new();
        for text in &self.strings {
            pool.extend_from_slice(&(text.len() as u16).to_le_bytes());
            pool.extend_from_slice(&1u16.to_le_bytes());
            data.extend_from_slice(text.as_bytes());
        }
        (pool, data)
    }
}

fn write_stream(comp: &mut cfb::CompoundFile<Cursor<Vec<u8>>>, encoded: &str, bytes: &[u8]) {
    let mut stream = comp.create_stream(format!("/{encoded}")).unwrap();
    stream.write_all(bytes).unwrap();
    stream.flush().unwrap();
}

fn write_table_stream(comp: &mut cfb::CompoundFile<Cursor<Vec<u8>>>, name: &str, bytes: &[u8]) {
    let encoded = streamname::encode(name, true).unwrap();
    write_stream(comp, &encoded, bytes);
}

/// Directory / Component / File / Media fixtures shared by the overlay
/// tests.
pub fn directory_table(rows: &[(&'static str, Option<&'static str>, &'static str)]) -> TestTable {
    TestTable {
        name: "Directory",
        columns: vec![
            TestColumn::key_string("Directory", 72),
            TestColumn::nullable_string("Directory_Parent", 72),
            TestColumn::string("DefaultDir", 255),
        ],
        rows: rows
            .iter()
            .map(|(id, parent, default_dir)| {
                vec![Cell::Str(Some(id)), Cell::Str(*parent), Cell::Str(Some(default_dir))]
            })
            .collect(),
    }
}

pub fn component_table(rows: &[(&'static str, &'static str)]) -> TestTable {
    TestTable {
        name: "Component",
        columns: vec![
            TestColumn::key_string("Component", 72),
            TestColumn::nullable_string("ComponentId", 38),
            TestColumn::string("Directory_", 72),
            TestColumn::int16("Attributes"),
            TestColumn::nullable_string("Condition", 255),
            TestColumn::nullable_string("KeyPath", 72),
        ],
        rows: rows
            .iter()
            .map(|(id, directory)| {
                vec![
                    Cell::Str(Some(id)),
                    Cell::Str(None),
                    Cell::Str(Some(directory)),
                    Cell::I2(Some(0)),
                    Cell::Str(None),
                    Cell::Str(None),
                ]
            })
            .collect(),
    }
}

pub fn file_table(rows: &[(&'static str, &'static str, &'static str, i32, i32)]) -> TestTable {
    TestTable {
        name: "File",
        columns: vec![
            TestColumn::key_string("File", 72),
            TestColumn::string("Component_", 72),
            TestColumn::string("FileName", 255),
            TestColumn::int32("FileSize"),
            TestColumn::nullable_string("Version", 72),
            TestColumn::nullable_string("Language", 20),
            TestColumn::int16("Attributes"),
            TestColumn::int32("Sequence"),
        ],
        rows: rows
            .iter()
            .map(|(id, component, name, size, sequence)| {
                vec![
                    Cell::Str(Some(id)),
                    Cell::Str(Some(component)),
                    Cell::Str(Some(name)),
                    Cell::I4(Some(*size)),
                    Cell::Str(None),
                    Cell::Str(Some("1033")),
                    Cell::I2(Some(0)),
                    Cell::I4(Some(*sequence)),
                ]
            })
            .collect(),
    }
}

pub fn media_table(rows: &[(i32, i32, Option<&'static str>)]) -> TestTable {
    TestTable {
        name: "Media",
        columns: vec![
            TestColumn::key_int16("DiskId"),
            TestColumn::int32("LastSequence"),
            TestColumn::nullable_string("DiskPrompt", 64),
            TestColumn::nullable_string("Cabinet", 255),
            TestColumn::nullable_string("VolumeLabel", 32),
            TestColumn::nullable_string("Source", 72),
        ],
        rows: rows
            .iter()
            .map(|(disk_id, last_sequence, cabinet)| {
                vec![
                    Cell::I2(Some(*disk_id)),
                    Cell::I4(Some(*last_sequence)),
                    Cell::Str(None),
                    Cell::Str(*cabinet),
                    Cell::Str(None),
                    Cell::Str(None),
                ]
            })
            .collect(),
    }
}
