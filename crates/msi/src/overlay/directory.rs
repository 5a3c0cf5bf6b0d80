//! Directory-table entities.
//!
//! [Directory table](<https://learn.microsoft.com/en-us/windows/win32/msi/directory-table>)

use crate::{OverlayError, Row};

use super::{ComponentId, DirectoryId, long_name, required_text};

/// A node of the installation directory tree.
///
/// The tree is formed by parent pointers; exactly one entry is the root
/// (null or self-referential parent). Children and component lists are
/// back-edges populated during linking.
#[derive(Debug, Clone)]
pub struct Directory {
    id: String,
    parent_id: Option<String>,
    default_dir: String,
    pub(super) parent: Option<DirectoryId>,
    pub(super) children: Vec<DirectoryId>,
    pub(super) components: Vec<ComponentId>,
}

impl Directory {
    pub(super) fn from_row(row: &Row) -> Result<Directory, OverlayError> {
        Ok(Directory {
            id: required_text(row, "Directory", "Directory")?,
            parent_id: row.text("Directory_Parent").map(str::to_string),
            default_dir: required_text(row, "Directory", "DefaultDir")?,
            parent: None,
            children: Vec::new(),
            components: Vec::new(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Raw parent key as stored in the row, before linking.
    pub fn parent_id(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }

    pub fn parent(&self) -> Option<DirectoryId> {
        self.parent
    }

    pub fn children(&self) -> &[DirectoryId] {
        &self.children
    }

    pub fn components(&self) -> &[ComponentId] {
        &self.components
    }

    /// The raw `DefaultDir` cell, possibly a `short|long` pair.
    pub fn default_dir(&self) -> &str {
        &self.default_dir
    }

    /// Target name: the long half of the `DefaultDir` pair.
    pub fn name(&self) -> &str {
        long_name(&self.default_dir)
    }
}
