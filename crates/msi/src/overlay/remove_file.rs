//! RemoveFile-table entities.
//!
//! [RemoveFile table](<https://learn.microsoft.com/en-us/windows/win32/msi/removefile-table>)

use crate::{OverlayError, Row};

use super::{ComponentId, DirectoryId, required_int, required_text};

/// When a RemoveFile row takes effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallMode {
    /// 1: on component installation.
    OnInstall,
    /// 2: on component removal.
    OnRemove,
    /// 3: on both.
    OnBoth,
}

impl InstallMode {
    pub fn from_raw(raw: i32) -> Option<InstallMode> {
        match raw {
            1 => Some(InstallMode::OnInstall),
            2 => Some(InstallMode::OnRemove),
            3 => Some(InstallMode::OnBoth),
            _ => None,
        }
    }
}

/// A file (or empty folder) removal performed alongside a component.
#[derive(Debug, Clone)]
pub struct RemoveFile {
    id: String,
    component_id: String,
    file_name: Option<String>,
    dir_property: String,
    install_mode: Option<InstallMode>,
    pub(super) component: Option<ComponentId>,
    pub(super) directory: Option<DirectoryId>,
}

impl RemoveFile {
    pub(super) fn from_row(row: &Row) -> Result<RemoveFile, OverlayError> {
        Ok(RemoveFile {
            id: required_text(row, "RemoveFile", "FileKey")?,
            component_id: required_text(row, "RemoveFile", "Component_")?,
            file_name: row.text("FileName").map(str::to_string),
            dir_property: required_text(row, "RemoveFile", "DirProperty")?,
            install_mode: InstallMode::from_raw(required_int(row, "RemoveFile", "InstallMode")?),
            component: None,
            directory: None,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Raw component key as stored in the row.
    pub fn component_id(&self) -> &str {
        &self.component_id
    }

    pub fn component(&self) -> Option<ComponentId> {
        self.component
    }

    /// Name (possibly wildcarded) of the file to remove; `None` removes
    /// an empty folder.
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// The property naming the target location. When it matches a
    /// Directory-table key directly, [`Self::directory`] links to it.
    pub fn dir_property(&self) -> &str {
        &self.dir_property
    }

    pub fn directory(&self) -> Option<DirectoryId> {
        self.directory
    }

    /// The documented mode, when the row's `InstallMode` cell is valid.
    pub fn install_mode(&self) -> Option<InstallMode> {
        self.install_mode
    }
}
