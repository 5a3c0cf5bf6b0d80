//! File-table entities.
//!
//! [File table](<https://learn.microsoft.com/en-us/windows/win32/msi/file-table>)

use modular_bitfield::prelude::*;

use crate::{OverlayError, Row};

use super::{ComponentId, MediaId, long_name, required_int, required_text};

/// The File `Attributes` word.
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileAttributes {
    pub read_only: bool,
    pub hidden: bool,
    pub system: bool,
    #[skip]
    __: B6,
    /// The installation fails unless this file installs successfully.
    pub vital: bool,
    /// The file carries a checksum for repair validation.
    pub checksum: bool,
    #[skip]
    __: B1,
    /// Added by a patch; never from the original media.
    pub patch_added: bool,
    /// Stored uncompressed regardless of the package default.
    pub non_compressed: bool,
    /// Stored compressed regardless of the package default.
    pub compressed: bool,
    #[skip]
    __: B1,
}

impl FileAttributes {
    pub fn from_raw(raw: i32) -> FileAttributes {
        FileAttributes::from_bytes((raw as u16).to_le_bytes())
    }
}

/// One installed file, owned by exactly one component and sourced from
/// at most one media.
#[derive(Debug, Clone)]
pub struct File {
    id: String,
    component_id: String,
    file_name: String,
    size: i32,
    version: Option<String>,
    languages: Vec<String>,
    attributes: FileAttributes,
    sequence: i32,
    pub(super) component: Option<ComponentId>,
    pub(super) media: Option<MediaId>,
}

impl File {
    pub(super) fn from_row(row: &Row) -> Result<File, OverlayError> {
        let languages = row
            .text("Language")
            .map(|languages| {
                languages
                    .split(',')
                    .map(str::trim)
                    .filter(|language| !language.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        Ok(File {
            id: required_text(row, "File", "File")?,
            component_id: required_text(row, "File", "Component_")?,
            file_name: required_text(row, "File", "FileName")?,
            size: required_int(row, "File", "FileSize")?,
            version: row.text("Version").map(str::to_string),
            languages,
            attributes: FileAttributes::from_raw(row.integer("Attributes").unwrap_or(0)),
            sequence: required_int(row, "File", "Sequence")?,
            component: None,
            media: None,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Raw component key as stored in the row, before linking.
    pub fn component_id(&self) -> &str {
        &self.component_id
    }

    /// The owning component. Always linked once the overlay is built;
    /// a dangling key fails the build.
    pub fn component(&self) -> Option<ComponentId> {
        self.component
    }

    /// The raw `FileName` cell, possibly a `short|long` pair.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Target name: the long half of the `FileName` pair.
    pub fn name(&self) -> &str {
        long_name(&self.file_name)
    }

    /// Uncompressed size in bytes.
    pub fn size(&self) -> i32 {
        self.size
    }

    /// Version string of a versioned file, or a companion-file key.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Language identifiers, comma-separated in the row.
    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    pub fn attributes(&self) -> FileAttributes {
        self.attributes
    }

    /// Position of the file's payload within the media sequence.
    pub fn sequence(&self) -> i32 {
        self.sequence
    }

    /// The media carrying this file's payload; `None` for unpacked
    /// layouts without media rows.
    pub fn media(&self) -> Option<MediaId> {
        self.media
    }
}
