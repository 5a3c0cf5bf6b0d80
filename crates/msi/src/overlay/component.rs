//! Component-table entities.
//!
//! [Component table](<https://learn.microsoft.com/en-us/windows/win32/msi/component-table>)

use modular_bitfield::prelude::*;

use crate::{OverlayError, Row};

use super::{DirectoryId, FileId, required_int, required_text};

/// The Component `Attributes` word.
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentAttributes {
    /// Install from source rather than locally.
    pub source_only: bool,
    /// Local or source at the installer's choice.
    pub optional: bool,
    /// The key path is a Registry-table key rather than a file.
    pub registry_key_path: bool,
    /// Reference-count the key file as a shared DLL.
    pub shared_dll_ref_count: bool,
    /// Never remove on uninstall.
    pub permanent: bool,
    /// The key path is an ODBC data source.
    pub odbc_data_source: bool,
    /// Reinstall when any of the component's conditions transition.
    pub transitive: bool,
    /// Never overwrite an existing keyed resource.
    pub never_overwrite: bool,
    /// 64-bit component.
    pub sixty_four_bit: bool,
    pub disable_registry_reflection: bool,
    /// Remove when a patch superseding it is uninstalled.
    pub uninstall_on_supersedence: bool,
    /// Shared component patching semantics.
    pub shared: bool,
    #[skip]
    __: B4,
}

impl ComponentAttributes {
    pub fn from_raw(raw: i32) -> ComponentAttributes {
        ComponentAttributes::from_bytes((raw as u16).to_le_bytes())
    }
}

/// The unit of installation: a bundle of files, registry entries and
/// shortcuts installed under one directory.
#[derive(Debug, Clone)]
pub struct Component {
    id: String,
    guid: Option<String>,
    directory_id: String,
    attributes: ComponentAttributes,
    condition: Option<String>,
    key_path: Option<String>,
    pub(super) directory: Option<DirectoryId>,
    pub(super) files: Vec<FileId>,
}

impl Component {
    pub(super) fn from_row(row: &Row) -> Result<Component, OverlayError> {
        Ok(Component {
            id: required_text(row, "Component", "Component")?,
            guid: row.text("ComponentId").map(str::to_string),
            directory_id: required_text(row, "Component", "Directory_")?,
            attributes: ComponentAttributes::from_raw(required_int(row, "Component", "Attributes")?),
            condition: row.text("Condition").map(str::to_string),
            key_path: row.text("KeyPath").map(str::to_string),
            directory: None,
            files: Vec::new(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The component GUID, when the component is registered.
    pub fn guid(&self) -> Option<&str> {
        self.guid.as_deref()
    }

    /// Raw directory key as stored in the row, before linking.
    pub fn directory_id(&self) -> &str {
        &self.directory_id
    }

    /// The owning directory. Always linked once the overlay is built;
    /// a dangling key fails the build.
    pub fn directory(&self) -> Option<DirectoryId> {
        self.directory
    }

    pub fn attributes(&self) -> ComponentAttributes {
        self.attributes
    }

    pub fn condition(&self) -> Option<&str> {
        self.condition.as_deref()
    }

    /// Key file or registry key that stands in for the component.
    pub fn key_path(&self) -> Option<&str> {
        self.key_path.as_deref()
    }

    pub fn files(&self) -> &[FileId] {
        &self.files
    }
}
