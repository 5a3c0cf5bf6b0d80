//! Registry-table entities.
//!
//! [Registry table](<https://learn.microsoft.com/en-us/windows/win32/msi/registry-table>)

use crate::{OverlayError, Row};

use super::{ComponentId, required_int, required_text};

/// Predefined registry root of a Registry-table row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryRoot {
    /// -1: HKCU for per-user installs, HKLM for per-machine ones.
    UserOrMachine,
    /// 0: HKEY_CLASSES_ROOT.
    ClassesRoot,
    /// 1: HKEY_CURRENT_USER.
    CurrentUser,
    /// 2: HKEY_LOCAL_MACHINE.
    LocalMachine,
    /// 3: HKEY_USERS.
    Users,
}

impl RegistryRoot {
    pub fn from_raw(raw: i32) -> Option<RegistryRoot> {
        match raw {
            -1 => Some(RegistryRoot::UserOrMachine),
            0 => Some(RegistryRoot::ClassesRoot),
            1 => Some(RegistryRoot::CurrentUser),
            2 => Some(RegistryRoot::LocalMachine),
            3 => Some(RegistryRoot::Users),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RegistryRoot::UserOrMachine => "HKCU/HKLM",
            RegistryRoot::ClassesRoot => "HKCR",
            RegistryRoot::CurrentUser => "HKCU",
            RegistryRoot::LocalMachine => "HKLM",
            RegistryRoot::Users => "HKU",
        }
    }
}

/// One registry value written on behalf of a component.
#[derive(Debug, Clone)]
pub struct Registry {
    id: String,
    root: Option<RegistryRoot>,
    key: String,
    name: Option<String>,
    value: Option<String>,
    component_id: String,
    pub(super) component: Option<ComponentId>,
}

impl Registry {
    pub(super) fn from_row(row: &Row) -> Result<Registry, OverlayError> {
        Ok(Registry {
            id: required_text(row, "Registry", "Registry")?,
            root: RegistryRoot::from_raw(required_int(row, "Registry", "Root")?),
            key: required_text(row, "Registry", "Key")?,
            name: row.text("Name").map(str::to_string),
            value: row.text("Value").map(str::to_string),
            component_id: required_text(row, "Registry", "Component_")?,
            component: None,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The predefined root, when the row's `Root` cell is one of the
    /// documented values.
    pub fn root(&self) -> Option<RegistryRoot> {
        self.root
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Value name; `None` writes the key's default value.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Raw component key as stored in the row.
    pub fn component_id(&self) -> &str {
        &self.component_id
    }

    pub fn component(&self) -> Option<ComponentId> {
        self.component
    }
}
