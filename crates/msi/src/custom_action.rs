//! Typed view of the CustomAction table's `Type` bitmask.
//!
//! [CustomAction table](<https://learn.microsoft.com/en-us/windows/win32/msi/customaction-table>)

use modular_bitfield::prelude::*;

/// The `Type` word of a CustomAction row: a combination of source
/// kind, execution-scheduling and return-code-policy bits.
///
/// For example, type 1126 (= 2 + 4 + 32 + 64 + 1024) is an executable
/// launched from a directory-resolved path whose command line is
/// literal text, ignoring its exit status, deferred to the
/// installation script.
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CustomActionType {
    /// DLL entry point from the Binary table.
    pub dll: bool,
    /// Executable payload.
    pub exe: bool,
    /// The target is literal text: a command line, script source, or
    /// property value.
    pub text_data: bool,
    #[skip]
    __: B1,
    /// JScript source rather than VBScript.
    pub jscript: bool,
    /// The source is a Directory-table key.
    pub directory_source: bool,
    /// Ignore the action's exit status and continue.
    pub continue_on_error: bool,
    /// Run asynchronously.
    pub async_exec: bool,
    /// Scheduled in the rollback script.
    pub rollback: bool,
    /// Run without impersonation (commit semantics when combined with
    /// the in-script and rollback bits).
    pub no_impersonate: bool,
    /// Deferred to the installation script rather than executed
    /// immediately.
    pub in_script: bool,
    #[skip]
    __: B5,
}

impl CustomActionType {
    /// Builds the view from a CustomAction `Type` cell value.
    pub fn from_raw(raw: i32) -> CustomActionType {
        CustomActionType::from_bytes((raw as u16).to_le_bytes())
    }

    /// The raw bitmask value.
    pub fn raw(self) -> u16 {
        u16::from_le_bytes(self.into_bytes())
    }
}
