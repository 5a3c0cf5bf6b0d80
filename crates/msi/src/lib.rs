//! Read-only access to Windows Installer package databases.
//!
//! A package is an OLE compound document carrying a small relational
//! database: a deduplicated string pool, two self-describing schema
//! tables, and one column-major row stream per table. [`Package`] opens
//! a container, bootstraps the schema, and materialises tables lazily;
//! [`Msi`] links the installer tables into a navigable installation
//! tree of directories, components and files.
//!
//! ```no_run
//! let mut package = msi::Package::open_path("product.msi")?;
//! for table in package.tables() {
//!     println!("{}", table.name());
//! }
//! let overlay = msi::Msi::build(&mut package)?;
//! println!("root directory: {}", overlay.directory(overlay.root()).name());
//! # Ok::<(), msi::Error>(())
//! ```

#![forbid(unsafe_code)]

mod custom_action;
mod error;
mod overlay;
mod package;
mod schema;
mod summary;
mod table;

pub use custom_action::CustomActionType;
pub use error::{Error, OverlayError, Result, RowError, SchemaError};
pub use overlay::{
    Component, ComponentAttributes, ComponentId, Directory, DirectoryId, File, FileAttributes,
    FileId, Icon, IconId, InstallMode, Media, MediaId, Msi, Registry, RegistryId, RegistryRoot,
    RemoveFile, RemoveFileId, Shortcut, ShortcutId,
};
pub use package::{
    Package, PackageKind, STRING_DATA_TABLE, STRING_POOL_TABLE, SUMMARY_INFO_STREAM,
};
pub use schema::{COLUMNS_TABLE, Diagnostic, TABLES_TABLE, VALIDATION_TABLE};
pub use summary::Summary;
pub use table::{Row, Table};

pub use msi_fmt::*;
