//! Error types of the package layer.
//!
//! Every error here is `Clone` (I/O sources are wrapped in [`Arc`]) so a
//! table's first-load failure can be cached and replayed on later
//! accesses instead of re-reading a stream that is known to be bad.

use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use msi_fmt::{CodecError, PoolError};

/// Result type of the package layer.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[source] Arc<std::io::Error>),

    /// The container's root class-ID is not one of the installer kinds.
    #[error("not a Windows Installer package (root CLSID {0})")]
    NotAPackage(Uuid),

    /// A stream the format requires is absent from the container.
    #[error("required stream {0:?} is missing")]
    MissingStream(String),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Row(#[from] RowError),

    #[error(transparent)]
    Overlay(#[from] OverlayError),

    /// Container access after [`close`](crate::Package::close).
    #[error("package is closed")]
    PackageClosed,
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(Arc::new(err))
    }
}

/// Malformed `_Tables`/`_Columns`/`_Validation` content.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// `_Columns.Number` for a table is not dense starting at 1.
    #[error("table {table:?} has non-dense column numbers")]
    NonDenseColumnNumbers { table: String },

    /// `_Tables` lists a table `_Columns` does not describe.
    #[error("table {table:?} is listed in `_Tables` but has no `_Columns` rows")]
    TableWithoutColumns { table: String },

    /// `_Validation` constrains a column the table does not have.
    #[error("column {column:?} not found in table {table:?}")]
    MissingColumn { table: String, column: String },

    /// A bootstrap-table row is missing a required cell.
    #[error("malformed {table:?} row: null {column:?} cell")]
    MalformedBootstrapRow { table: String, column: String },
}

/// Malformed table row block.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    #[error(
        "table {table:?} stream length {length} is not a multiple of its {stride}-byte row stride"
    )]
    MalformedTable {
        table: String,
        length: u64,
        stride: u64,
    },
}

/// Failures while linking the relational overlay.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OverlayError {
    #[error("directory tree has {0} roots, expected exactly one")]
    MultipleRoots(usize),

    #[error("directory {0:?} is part of a parent cycle")]
    CyclicDirectoryGraph(String),

    #[error("component {component:?} references unknown directory {directory:?}")]
    MissingDirectory { component: String, directory: String },

    #[error("file {file:?} references unknown component {component:?}")]
    MissingComponent { file: String, component: String },

    /// The file's sequence lies beyond every media's `LastSequence`.
    #[error("file {file:?} (sequence {sequence}) has no media")]
    FileWithoutMedia { file: String, sequence: i32 },

    /// An entity row is missing a cell its table requires.
    #[error("{table} row is missing required cell {column:?}")]
    MissingCell {
        table: &'static str,
        column: &'static str,
    },
}
