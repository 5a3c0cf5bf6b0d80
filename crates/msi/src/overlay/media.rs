//! Media-table entities.
//!
//! [Media table](<https://learn.microsoft.com/en-us/windows/win32/msi/media-table>)

use crate::{OverlayError, Row};

use super::required_int;

/// One source disk: a range of file sequence numbers and the cabinet
/// (if any) that carries their payloads.
#[derive(Debug, Clone)]
pub struct Media {
    disk_id: i32,
    last_sequence: i32,
    disk_prompt: Option<String>,
    cabinet: Option<String>,
    volume_label: Option<String>,
    source: Option<String>,
}

impl Media {
    pub(super) fn from_row(row: &Row) -> Result<Media, OverlayError> {
        Ok(Media {
            disk_id: required_int(row, "Media", "DiskId")?,
            last_sequence: required_int(row, "Media", "LastSequence")?,
            disk_prompt: row.text("DiskPrompt").map(str::to_string),
            cabinet: row.text("Cabinet").map(str::to_string),
            volume_label: row.text("VolumeLabel").map(str::to_string),
            source: row.text("Source").map(str::to_string),
        })
    }

    pub fn disk_id(&self) -> i32 {
        self.disk_id
    }

    /// Highest file sequence number carried by this disk.
    pub fn last_sequence(&self) -> i32 {
        self.last_sequence
    }

    pub fn disk_prompt(&self) -> Option<&str> {
        self.disk_prompt.as_deref()
    }

    /// Cabinet name; a leading `#` marks a stream embedded in the
    /// package rather than a file beside it.
    pub fn cabinet(&self) -> Option<&str> {
        self.cabinet.as_deref()
    }

    pub fn volume_label(&self) -> Option<&str> {
        self.volume_label.as_deref()
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// True when the cabinet is stored as a stream inside the package.
    pub fn has_embedded_cabinet(&self) -> bool {
        self.cabinet_stream_name().is_some()
    }

    /// Stream name of an embedded cabinet (leading `#` stripped).
    pub fn cabinet_stream_name(&self) -> Option<&str> {
        self.cabinet.as_deref()?.strip_prefix('#')
    }
}
