//! The package orchestrator.
//!
//! [`Package`] owns the OLE container, the string pool and the table
//! catalog. Opening a package validates the root class-ID, loads the
//! summary stream and the string pool, and bootstraps the schema from
//! `_Tables`/`_Columns`/`_Validation`; table rows are materialised on
//! first access and cached, successes and failures alike.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::{Read, Seek};
use std::path::Path;

use cfb::CompoundFile;
use uuid::{Uuid, uuid};

use msi_fmt::{StringPool, streamname};

use crate::schema::{self, COLUMNS_TABLE, Diagnostic, TABLES_TABLE, VALIDATION_TABLE};
use crate::{Error, Result, Summary, Table};

/// Root-storage class-ID of installation databases and merge modules.
const CLSID_INSTALLER: Uuid = uuid!("000c1084-0000-0000-c000-000000000046");
/// Root-storage class-ID of patch packages.
const CLSID_PATCH: Uuid = uuid!("000c1086-0000-0000-c000-000000000046");
/// Root-storage class-ID of transforms.
const CLSID_TRANSFORM: Uuid = uuid!("000c1082-0000-0000-c000-000000000046");

/// Fixed (unencoded) name of the summary-information stream.
pub const SUMMARY_INFO_STREAM: &str = "\u{5}SummaryInformation";
/// Display name of the string-pool descriptor stream.
pub const STRING_POOL_TABLE: &str = "_StringPool";
/// Display name of the string-pool data stream.
pub const STRING_DATA_TABLE: &str = "_StringData";

/// The kind of installer artefact a container claims to be, derived
/// from its root class-ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageKind {
    /// Installation database (MSI) or merge module (MSM); the two
    /// share a class-ID.
    Installer,
    /// Patch package (MSP).
    Patch,
    /// Database transform (MST).
    Transform,
}

impl PackageKind {
    fn from_clsid(clsid: &Uuid) -> Option<PackageKind> {
        if *clsid == CLSID_INSTALLER {
            Some(PackageKind::Installer)
        } else if *clsid == CLSID_PATCH {
            Some(PackageKind::Patch)
        } else if *clsid == CLSID_TRANSFORM {
            Some(PackageKind::Transform)
        } else {
            None
        }
    }

    /// The root-storage class-ID for this kind.
    pub fn clsid(self) -> Uuid {
        match self {
            PackageKind::Installer => CLSID_INSTALLER,
            PackageKind::Patch => CLSID_PATCH,
            PackageKind::Transform => CLSID_TRANSFORM,
        }
    }
}

impl fmt::Display for PackageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackageKind::Installer => write!(f, "installer"),
            PackageKind::Patch => write!(f, "patch"),
            PackageKind::Transform => write!(f, "transform"),
        }
    }
}

/// An open Windows Installer package.
///
/// The package is an owner-exclusive handle: table materialisation
/// moves the container cursor, so loading requires `&mut self`, while
/// already-materialised tables are frozen and read through `&self`.
#[derive(Debug)]
pub struct Package<F> {
    comp: Option<CompoundFile<F>>,
    summary: Summary,
    pool: StringPool,
    tables: BTreeMap<String, Table>,
    diagnostics: Vec<Diagnostic>,
}

impl Package<fs::File> {
    /// Opens a package file from disk.
    pub fn open_path<P: AsRef<Path>>(path: P) -> Result<Package<fs::File>> {
        Package::open(fs::File::open(path)?)
    }
}

impl<F: Read + Seek> Package<F> {
    /// Opens a package over any seekable byte source.
    ///
    /// Fails with [`Error::NotAPackage`] when the root class-ID is not
    /// an installer kind, and with pool/schema errors when the database
    /// streams are malformed.
    pub fn open(inner: F) -> Result<Package<F>> {
        let mut comp = CompoundFile::open(inner)?;
        let root_clsid = *comp.root_entry().clsid();
        let kind =
            PackageKind::from_clsid(&root_clsid).ok_or(Error::NotAPackage(root_clsid))?;

        // The summary stream's reserved name is stored verbatim, outside
        // the table-name codec.
        let summary_bytes = read_raw(&mut comp, SUMMARY_INFO_STREAM)?;
        let summary = Summary::new(root_clsid, kind, summary_bytes);

        let pool_bytes = read_table_stream(&mut comp, STRING_POOL_TABLE)?;
        let data_bytes = read_table_stream(&mut comp, STRING_DATA_TABLE)?;
        let pool = StringPool::read(&pool_bytes, &data_bytes)?;

        // The two fixed points of the self-describing schema.
        let mut tables_table = Table::new(TABLES_TABLE, schema::tables_columns());
        let table_rows =
            tables_table.decode(&read_table_stream(&mut comp, TABLES_TABLE)?, &pool)?;
        let mut columns_table = Table::new(COLUMNS_TABLE, schema::columns_columns());
        let column_rows =
            columns_table.decode(&read_table_stream(&mut comp, COLUMNS_TABLE)?, &pool)?;

        let (mut tables, mut diagnostics) = schema::build_catalog(&table_rows, &column_rows)?;
        tables_table.set_loaded(table_rows);
        columns_table.set_loaded(column_rows);
        tables.insert(TABLES_TABLE.to_string(), tables_table);
        tables.insert(COLUMNS_TABLE.to_string(), columns_table);

        let validation_name = streamname::encode(VALIDATION_TABLE, true)?;
        if comp.is_stream(root_path(&validation_name)) {
            let mut validation_table = Table::new(VALIDATION_TABLE, schema::validation_columns());
            let validation_rows =
                validation_table.decode(&read_raw(&mut comp, &validation_name)?, &pool)?;
            tables.insert(VALIDATION_TABLE.to_string(), validation_table);
            schema::apply_validation(&mut tables, &validation_rows, &mut diagnostics)?;
            if let Some(table) = tables.get_mut(VALIDATION_TABLE) {
                table.set_loaded(validation_rows);
            }
        }

        for diagnostic in &diagnostics {
            log::warn!("{diagnostic}");
        }
        log::debug!(
            "opened {kind} package: {} tables, {} pool entries (codepage {})",
            tables.len(),
            pool.len(),
            pool.codepage().id()
        );

        Ok(Package {
            comp: Some(comp),
            summary,
            pool,
            tables,
            diagnostics,
        })
    }

    /// Returns a catalog table, materialising its rows on first access.
    ///
    /// Returns `Ok(None)` for names the catalog does not know. A failed
    /// materialisation is cached; repeated access replays the error
    /// without touching the container again.
    pub fn get(&mut self, name: &str) -> Result<Option<&Table>> {
        let Some(table) = self.tables.get(name) else {
            return Ok(None);
        };
        if let Some(err) = table.failure() {
            return Err(err.clone());
        }
        if !table.is_loaded() {
            let comp = self.comp.as_mut().ok_or(Error::PackageClosed)?;
            let bytes = read_table_stream(comp, name)?;
            if let Some(table) = self.tables.get_mut(name) {
                match table.decode(&bytes, &self.pool) {
                    Ok(rows) => table.set_loaded(rows),
                    Err(err) => {
                        table.set_failed(err.clone());
                        return Err(err);
                    }
                }
            }
        }
        Ok(self.tables.get(name))
    }

    /// Iterates the table catalog (loaded or not) in name order.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    /// The shared, immutable string pool.
    pub fn string_pool(&self) -> &StringPool {
        &self.pool
    }

    /// Bootstrap findings that did not prevent the package from opening.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Lists the container's root streams as decoded
    /// `(display name, is_table)` pairs.
    pub fn streams(&self) -> Result<Vec<(String, bool)>> {
        let comp = self.comp.as_ref().ok_or(Error::PackageClosed)?;
        let mut entries = Vec::new();
        for entry in comp.read_storage("/")? {
            if entry.is_stream() {
                entries.push(streamname::decode(entry.name()));
            }
        }
        Ok(entries)
    }

    /// Whether a non-table stream with this display name exists.
    pub fn has_stream(&self, name: &str) -> Result<bool> {
        let comp = self.comp.as_ref().ok_or(Error::PackageClosed)?;
        Ok(comp.is_stream(root_path(&streamname::encode(name, false)?)))
    }

    /// Reads a non-table stream (binary data, embedded cabinet) by its
    /// display name.
    pub fn read_stream(&mut self, name: &str) -> Result<Vec<u8>> {
        let comp = self.comp.as_mut().ok_or(Error::PackageClosed)?;
        read_raw(comp, &streamname::encode(name, false)?)
    }

    /// Releases the container. The catalog and summary stay readable;
    /// stream access and further materialisation fail with
    /// [`Error::PackageClosed`].
    pub fn close(&mut self) {
        self.comp = None;
    }

    pub fn is_closed(&self) -> bool {
        self.comp.is_none()
    }
}

fn root_path(encoded: &str) -> String {
    format!("/{encoded}")
}

fn read_raw<F: Read + Seek>(comp: &mut CompoundFile<F>, encoded: &str) -> Result<Vec<u8>> {
    let path = root_path(encoded);
    if !comp.is_stream(&path) {
        return Err(Error::MissingStream(streamname::decode(encoded).0));
    }
    let mut bytes = Vec::new();
    comp.open_stream(&path)?.read_to_end(&mut bytes)?;
    Ok(bytes)
}

fn read_table_stream<F: Read + Seek>(comp: &mut CompoundFile<F>, name: &str) -> Result<Vec<u8>> {
    read_raw(comp, &streamname::encode(name, true)?)
}
