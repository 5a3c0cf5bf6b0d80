//! Shortcut-table entities.
//!
//! [Shortcut table](<https://learn.microsoft.com/en-us/windows/win32/msi/shortcut-table>)

use crate::{OverlayError, Row};

use super::{ComponentId, DirectoryId, IconId, long_name, required_text};

/// A shortcut created in some directory, activating its component's
/// key path (or a formatted target).
#[derive(Debug, Clone)]
pub struct Shortcut {
    id: String,
    directory_id: String,
    name: String,
    component_id: String,
    target: String,
    arguments: Option<String>,
    description: Option<String>,
    icon_id: Option<String>,
    pub(super) directory: Option<DirectoryId>,
    pub(super) component: Option<ComponentId>,
    pub(super) icon: Option<IconId>,
}

impl Shortcut {
    pub(super) fn from_row(row: &Row) -> Result<Shortcut, OverlayError> {
        Ok(Shortcut {
            id: required_text(row, "Shortcut", "Shortcut")?,
            directory_id: required_text(row, "Shortcut", "Directory_")?,
            name: required_text(row, "Shortcut", "Name")?,
            component_id: required_text(row, "Shortcut", "Component_")?,
            target: required_text(row, "Shortcut", "Target")?,
            arguments: row.text("Arguments").map(str::to_string),
            description: row.text("Description").map(str::to_string),
            icon_id: row.text("Icon_").map(str::to_string),
            directory: None,
            component: None,
            icon: None,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Raw directory key as stored in the row.
    pub fn directory_id(&self) -> &str {
        &self.directory_id
    }

    pub fn directory(&self) -> Option<DirectoryId> {
        self.directory
    }

    /// The raw `Name` cell, possibly a `short|long` pair.
    pub fn raw_name(&self) -> &str {
        &self.name
    }

    /// Display name: the long half of the `Name` pair.
    pub fn name(&self) -> &str {
        long_name(&self.name)
    }

    /// Raw component key as stored in the row.
    pub fn component_id(&self) -> &str {
        &self.component_id
    }

    pub fn component(&self) -> Option<ComponentId> {
        self.component
    }

    /// Feature name or formatted target string.
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn arguments(&self) -> Option<&str> {
        self.arguments.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Raw icon key as stored in the row.
    pub fn icon_id(&self) -> Option<&str> {
        self.icon_id.as_deref()
    }

    pub fn icon(&self) -> Option<IconId> {
        self.icon
    }
}
