//! Column definitions and the 16-bit type-bits word.
//!
//! Each row of `_Columns` carries a `Type` word describing one column of
//! one table. The word is kept bit-exact with the documented Windows
//! Installer encoding:
//!
//! | bits     | meaning                                             |
//! |----------|-----------------------------------------------------|
//! | `0x8000` | part of the table's primary key                     |
//! | `0x4000` | nullable                                            |
//! | `0x2000` | localizable (string kinds only)                     |
//! | `0x1000` | string kind; low 8 bits are the character limit     |
//! | `0x0400` | 32-bit integer (when the string bit is clear)       |
//!
//! Integer storage is biased (see [`crate::int16_from_raw`]); string
//! storage is a pool reference whose width comes from the pool header,
//! not from the type word.

use std::fmt;
use std::io::{Read, Seek};
use std::str::FromStr;

use binrw::BinReaderExt;

use crate::{PoolError, StringPool, StringRef, Value, int16_from_raw, int32_from_raw};

pub const COL_PRIMARY_KEY_BIT: u16 = 0x8000;
pub const COL_NULLABLE_BIT: u16 = 0x4000;
pub const COL_LOCALIZABLE_BIT: u16 = 0x2000;
pub const COL_STRING_BIT: u16 = 0x1000;
pub const COL_WIDE_BIT: u16 = 0x0400;
const COL_CHAR_COUNT_MASK: u16 = 0x00FF;

/// The storage kind of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// 16-bit integer, biased by 0x8000 on disk.
    Int16,
    /// 32-bit integer, biased by 0x8000_0000 on disk.
    Int32,
    /// String-pool reference. `max_chars` is the declared character
    /// limit (informational; 0 means unbounded).
    Str { max_chars: u8 },
    /// String-pool reference whose text names a binary stream inside
    /// the package (Binary/Icon data columns).
    Stream,
}

impl ColumnKind {
    /// Storage width in bytes within a row block.
    pub fn width(self, long_string_refs: bool) -> u64 {
        match self {
            ColumnKind::Int16 => 2,
            ColumnKind::Int32 => 4,
            ColumnKind::Str { .. } | ColumnKind::Stream => StringRef::width(long_string_refs),
        }
    }

    pub fn is_string(self) -> bool {
        matches!(self, ColumnKind::Str { .. } | ColumnKind::Stream)
    }
}

/// Data categories a `_Validation` row can attach to a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Text,
    UpperCase,
    LowerCase,
    Integer,
    DoubleInteger,
    TimeDate,
    Identifier,
    Property,
    Filename,
    WildCardFilename,
    Path,
    Paths,
    AnyPath,
    DefaultDir,
    RegPath,
    Formatted,
    FormattedSddlText,
    Template,
    Condition,
    Guid,
    Version,
    Language,
    Binary,
    CustomSource,
    Cabinet,
    Shortcut,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Text => "Text",
            Category::UpperCase => "UpperCase",
            Category::LowerCase => "LowerCase",
            Category::Integer => "Integer",
            Category::DoubleInteger => "DoubleInteger",
            Category::TimeDate => "TimeDate",
            Category::Identifier => "Identifier",
            Category::Property => "Property",
            Category::Filename => "Filename",
            Category::WildCardFilename => "WildCardFilename",
            Category::Path => "Path",
            Category::Paths => "Paths",
            Category::AnyPath => "AnyPath",
            Category::DefaultDir => "DefaultDir",
            Category::RegPath => "RegPath",
            Category::Formatted => "Formatted",
            Category::FormattedSddlText => "FormattedSDDLText",
            Category::Template => "Template",
            Category::Condition => "Condition",
            Category::Guid => "GUID",
            Category::Version => "Version",
            Category::Language => "Language",
            Category::Binary => "Binary",
            Category::CustomSource => "CustomSource",
            Category::Cabinet => "Cabinet",
            Category::Shortcut => "Shortcut",
        }
    }

    const ALL: [Category; 26] = [
        Category::Text,
        Category::UpperCase,
        Category::LowerCase,
        Category::Integer,
        Category::DoubleInteger,
        Category::TimeDate,
        Category::Identifier,
        Category::Property,
        Category::Filename,
        Category::WildCardFilename,
        Category::Path,
        Category::Paths,
        Category::AnyPath,
        Category::DefaultDir,
        Category::RegPath,
        Category::Formatted,
        Category::FormattedSddlText,
        Category::Template,
        Category::Condition,
        Category::Guid,
        Category::Version,
        Category::Language,
        Category::Binary,
        Category::CustomSource,
        Category::Cabinet,
        Category::Shortcut,
    ];
}

impl FromStr for Category {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or(())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Constraints attached to a column by its `_Validation` row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnValidation {
    pub nullable: bool,
    pub min_value: Option<i32>,
    pub max_value: Option<i32>,
    /// Referenced table and 1-based column number this column is a
    /// foreign key into.
    pub foreign_key: Option<(String, i32)>,
    pub category: Option<Category>,
    /// Permitted values, from the semicolon-separated `Set` cell.
    pub enum_values: Option<Vec<String>>,
    pub description: Option<String>,
}

/// One column of a table schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    kind: ColumnKind,
    primary_key: bool,
    nullable: bool,
    localizable: bool,
    validation: Option<ColumnValidation>,
}

impl Column {
    /// Decodes a `_Columns.Type` word into a column definition.
    pub fn from_type_bits(name: impl Into<String>, bits: u16) -> Column {
        let kind = if bits & COL_STRING_BIT != 0 {
            ColumnKind::Str {
                max_chars: (bits & COL_CHAR_COUNT_MASK) as u8,
            }
        } else if bits & COL_WIDE_BIT != 0 {
            ColumnKind::Int32
        } else {
            ColumnKind::Int16
        };
        Column {
            name: name.into(),
            kind,
            primary_key: bits & COL_PRIMARY_KEY_BIT != 0,
            nullable: bits & COL_NULLABLE_BIT != 0,
            localizable: kind.is_string() && bits & COL_LOCALIZABLE_BIT != 0,
            validation: None,
        }
    }

    /// A 16-bit integer column.
    pub fn int16(name: impl Into<String>) -> Column {
        Column::new(name, ColumnKind::Int16)
    }

    /// A 32-bit integer column.
    pub fn int32(name: impl Into<String>) -> Column {
        Column::new(name, ColumnKind::Int32)
    }

    /// A string column with the given declared character limit.
    pub fn string(name: impl Into<String>, max_chars: u8) -> Column {
        Column::new(name, ColumnKind::Str { max_chars })
    }

    fn new(name: impl Into<String>, kind: ColumnKind) -> Column {
        Column {
            name: name.into(),
            kind,
            primary_key: false,
            nullable: false,
            localizable: false,
            validation: None,
        }
    }

    /// Marks this column as part of the primary key (builder form).
    pub fn key(mut self) -> Column {
        self.primary_key = true;
        self
    }

    /// Marks this column nullable (builder form).
    pub fn nullable(mut self) -> Column {
        self.nullable = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ColumnKind {
        self.kind
    }

    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn is_localizable(&self) -> bool {
        self.localizable
    }

    pub fn validation(&self) -> Option<&ColumnValidation> {
        self.validation.as_ref()
    }

    /// Attaches `_Validation` metadata. A `Binary` category converts a
    /// plain string column into a stream-reference column, since the
    /// type-bits word does not distinguish the two.
    pub fn apply_validation(&mut self, validation: ColumnValidation) {
        if validation.nullable {
            self.nullable = true;
        }
        if validation.category == Some(Category::Binary) {
            if let ColumnKind::Str { .. } = self.kind {
                self.kind = ColumnKind::Stream;
            }
        }
        self.validation = Some(validation);
    }

    /// Storage width of one cell of this column.
    pub fn width(&self, long_string_refs: bool) -> u64 {
        self.kind.width(long_string_refs)
    }

    /// Reads one cell of this column from a row block.
    ///
    /// A raw zero decodes to [`Value::Null`] whatever the column's
    /// nullability; callers surface the non-nullable case as a schema
    /// warning rather than an error.
    pub fn read_value<R: Read + Seek>(
        &self,
        reader: &mut R,
        pool: &StringPool,
    ) -> Result<Value, PoolError> {
        match self.kind {
            ColumnKind::Int16 => {
                let raw: u16 = reader.read_le()?;
                Ok(int16_from_raw(raw).map_or(Value::Null, Value::Int))
            }
            ColumnKind::Int32 => {
                let raw: u32 = reader.read_le()?;
                Ok(int32_from_raw(raw).map_or(Value::Null, Value::Int))
            }
            ColumnKind::Str { .. } => {
                let reference: StringRef = reader.read_le_args((pool.long_string_refs(),))?;
                if reference.0 == 0 {
                    Ok(Value::Null)
                } else {
                    Ok(Value::Str(pool.get(reference.0)?))
                }
            }
            ColumnKind::Stream => {
                let reference: StringRef = reader.read_le_args((pool.long_string_refs(),))?;
                if reference.0 == 0 {
                    Ok(Value::Null)
                } else {
                    Ok(Value::Stream(pool.get(reference.0)?))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn type_bits_decode_kinds_and_flags() {
        let column = Column::from_type_bits("Name", 0x8000 | 0x1000 | 0x0400 | 64);
        assert_eq!(column.kind(), ColumnKind::Str { max_chars: 64 });
        assert!(column.is_primary_key());
        assert!(!column.is_nullable());
        assert!(!column.is_localizable());

        let column = Column::from_type_bits("Description", 0x4000 | 0x2000 | 0x1000 | 0x0400);
        assert_eq!(column.kind(), ColumnKind::Str { max_chars: 0 });
        assert!(column.is_nullable());
        assert!(column.is_localizable());

        let column = Column::from_type_bits("Sequence", 0x0400 | 4);
        assert_eq!(column.kind(), ColumnKind::Int32);

        let column = Column::from_type_bits("Number", 0x8000 | 2);
        assert_eq!(column.kind(), ColumnKind::Int16);
        assert!(column.is_primary_key());

        // The localizable bit is meaningless on integers.
        let column = Column::from_type_bits("Attributes", 0x2000 | 2);
        assert!(!column.is_localizable());
    }

    #[test]
    fn widths_follow_kind_and_pool_flag() {
        assert_eq!(ColumnKind::Int16.width(false), 2);
        assert_eq!(ColumnKind::Int32.width(true), 4);
        assert_eq!(ColumnKind::Str { max_chars: 0 }.width(false), 2);
        assert_eq!(ColumnKind::Str { max_chars: 0 }.width(true), 3);
        assert_eq!(ColumnKind::Stream.width(true), 3);
    }

    #[test]
    fn binary_category_upgrades_string_to_stream() {
        let mut column = Column::from_type_bits("Data", 0x1000 | 0x0400);
        column.apply_validation(ColumnValidation {
            nullable: true,
            category: Some(Category::Binary),
            ..Default::default()
        });
        assert_eq!(column.kind(), ColumnKind::Stream);
        assert!(column.is_nullable());
        assert_eq!(
            column.validation().and_then(|v| v.category),
            Some(Category::Binary)
        );
    }

    #[test]
    fn cells_decode_with_bias_and_pool_lookup() {
        let pool = {
            let mut pool_bytes = 1252u32.to_le_bytes().to_vec();
            pool_bytes.extend_from_slice(&4u16.to_le_bytes());
            pool_bytes.extend_from_slice(&1u16.to_le_bytes());
            StringPool::read(&pool_bytes, b"Fred").unwrap()
        };

        let int16 = Column::int16("A");
        let mut cursor = Cursor::new(0x8005u16.to_le_bytes());
        assert_eq!(int16.read_value(&mut cursor, &pool).unwrap(), Value::Int(5));
        let mut cursor = Cursor::new(0u16.to_le_bytes());
        assert_eq!(int16.read_value(&mut cursor, &pool).unwrap(), Value::Null);

        let int32 = Column::int32("B");
        let mut cursor = Cursor::new(0x8000_00FFu32.to_le_bytes());
        assert_eq!(int32.read_value(&mut cursor, &pool).unwrap(), Value::Int(255));

        let string = Column::string("C", 8);
        let mut cursor = Cursor::new(1u16.to_le_bytes());
        assert_eq!(
            string.read_value(&mut cursor, &pool).unwrap(),
            Value::Str("Fred".into())
        );
        let mut cursor = Cursor::new(9u16.to_le_bytes());
        assert!(matches!(
            string.read_value(&mut cursor, &pool),
            Err(PoolError::IndexOutOfRange { index: 9, .. })
        ));
    }

    #[test]
    fn category_names_round_trip() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>(), Ok(category));
        }
        assert!("Bogus".parse::<Category>().is_err());
    }
}
