//! Icon-table entities.
//!
//! [Icon table](<https://learn.microsoft.com/en-us/windows/win32/msi/icon-table>)

use crate::{OverlayError, Row, Value};

use super::required_text;

/// One named icon whose bytes live in a binary stream of the package.
#[derive(Debug, Clone)]
pub struct Icon {
    id: String,
    data_stream: Option<String>,
}

impl Icon {
    pub(super) fn from_row(row: &Row) -> Result<Icon, OverlayError> {
        let data_stream = match row.get("Data") {
            Some(Value::Stream(name) | Value::Str(name)) if !name.is_empty() => {
                Some(name.to_string())
            }
            _ => None,
        };
        Ok(Icon {
            id: required_text(row, "Icon", "Name")?,
            data_stream,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name of the stream holding the icon bytes. Falls back to
    /// the conventional `Icon.<name>` form when the data cell names no
    /// stream itself.
    pub fn stream_name(&self) -> String {
        match &self.data_stream {
            Some(name) => name.clone(),
            None => format!("Icon.{}", self.id),
        }
    }
}
