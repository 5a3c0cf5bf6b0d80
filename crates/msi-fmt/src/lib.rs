//! On-disk format primitives for Windows Installer databases.
//!
//! A Windows Installer package (MSI/MSM/MSP/MST) is an OLE compound
//! document whose streams encode a small relational database. This crate
//! implements the format layer of that database, independent of any
//! particular container backend:
//!
//! * [`streamname`] — the codec between table/stream identifiers and the
//!   restricted 31-code-unit names permitted inside the compound file.
//! * [`StringPool`] — the `_StringPool`/`_StringData` pair holding every
//!   string-valued cell, indexed from 1 with 0 as the null sentinel.
//! * [`CodePage`] — the ANSI/UTF-8 codepage identifier governing pool
//!   text decoding.
//! * [`Column`] — the 16-bit column type-bits word, cell widths, and the
//!   cell codec yielding [`Value`]s.

#![forbid(unsafe_code)]

mod codepage;
mod column;
mod error;
pub mod streamname;
mod stringpool;
mod value;

pub use codepage::CodePage;
pub use column::{Category, Column, ColumnKind, ColumnValidation};
pub use error::{CodecError, PoolError};
pub use stringpool::{LONG_STRING_REFS_BIT, StringPool, StringRef};
pub use value::{Value, int16_from_raw, int16_to_raw, int32_from_raw, int32_to_raw};
