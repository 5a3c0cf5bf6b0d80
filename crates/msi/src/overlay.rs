//! The relational overlay over a package's installer tables.
//!
//! Entities are parsed into per-table arenas and addressed by opaque
//! index handles; cross-references are resolved in dependency order
//! (directories, components, then everything else) once all maps are
//! built, so the graph needs no shared ownership and back-edges
//! (children, component files) are plain index lists.

mod component;
mod directory;
mod file;
mod icon;
mod media;
mod registry;
mod remove_file;
mod shortcut;

pub use component::{Component, ComponentAttributes};
pub use directory::Directory;
pub use file::{File, FileAttributes};
pub use icon::Icon;
pub use media::Media;
pub use registry::{Registry, RegistryRoot};
pub use remove_file::{InstallMode, RemoveFile};
pub use shortcut::Shortcut;

use std::collections::HashMap;
use std::io::{Read, Seek};
use std::path::PathBuf;

use crate::{OverlayError, Package, Result, Row};

macro_rules! entity_ids {
    ($($(#[$doc:meta])* $name:ident),+ $(,)?) => {
        $(
            $(#[$doc])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
            pub struct $name(pub(crate) usize);
        )+
    };
}

entity_ids! {
    /// Handle into [`Msi::directories`].
    DirectoryId,
    /// Handle into [`Msi::components`].
    ComponentId,
    /// Handle into [`Msi::files`].
    FileId,
    /// Handle into [`Msi::medias`].
    MediaId,
    /// Handle into [`Msi::registry_keys`].
    RegistryId,
    /// Handle into [`Msi::remove_files`].
    RemoveFileId,
    /// Handle into [`Msi::shortcuts`].
    ShortcutId,
    /// Handle into [`Msi::icons`].
    IconId,
}

pub(crate) fn required_text(
    row: &Row,
    table: &'static str,
    column: &'static str,
) -> std::result::Result<String, OverlayError> {
    row.text(column)
        .map(str::to_string)
        .ok_or(OverlayError::MissingCell { table, column })
}

pub(crate) fn required_int(
    row: &Row,
    table: &'static str,
    column: &'static str,
) -> std::result::Result<i32, OverlayError> {
    row.integer(column)
        .ok_or(OverlayError::MissingCell { table, column })
}

/// Splits a `short|long` filename pair, yielding the long half.
pub(crate) fn long_name(name: &str) -> &str {
    match name.split_once('|') {
        Some((_, long)) => long,
        None => name,
    }
}

/// The linked installation tree of one package.
///
/// Built by [`Msi::build`]; all lookups are index accesses into frozen
/// arenas.
#[derive(Debug)]
pub struct Msi {
    directories: Vec<Directory>,
    components: Vec<Component>,
    files: Vec<File>,
    medias: Vec<Media>,
    registry_keys: Vec<Registry>,
    remove_files: Vec<RemoveFile>,
    shortcuts: Vec<Shortcut>,
    icons: Vec<Icon>,
    root: DirectoryId,
}

impl Msi {
    /// Builds the overlay, loading the entity tables the package has.
    ///
    /// Required links (component→directory, file→component, and
    /// file→media while media exist) are fatal when unresolvable;
    /// optional links are logged and left empty.
    pub fn build<F: Read + Seek>(package: &mut Package<F>) -> Result<Msi> {
        let directory_rows = entity_rows(package, "Directory")?;
        let component_rows = entity_rows(package, "Component")?;
        let file_rows = entity_rows(package, "File")?;
        let media_rows = entity_rows(package, "Media")?;
        let registry_rows = entity_rows(package, "Registry")?;
        let remove_file_rows = entity_rows(package, "RemoveFile")?;
        let shortcut_rows = entity_rows(package, "Shortcut")?;
        let icon_rows = entity_rows(package, "Icon")?;

        // Phase one: per-table arenas with raw foreign keys.
        let mut directories = parsed(&directory_rows, Directory::from_row)?;
        let mut components = parsed(&component_rows, Component::from_row)?;
        let mut files = parsed(&file_rows, File::from_row)?;
        let medias = parsed(&media_rows, Media::from_row)?;
        let mut registry_keys = parsed(&registry_rows, Registry::from_row)?;
        let mut remove_files = parsed(&remove_file_rows, RemoveFile::from_row)?;
        let mut shortcuts = parsed(&shortcut_rows, Shortcut::from_row)?;
        let icons = parsed(&icon_rows, Icon::from_row)?;

        // Phase two: resolve in dependency order.
        let directory_index: HashMap<String, DirectoryId> = index_of(&directories, Directory::id, DirectoryId);
        link_directories(&mut directories, &directory_index)?;
        let root = find_root(&directories)?;

        let component_index: HashMap<String, ComponentId> = index_of(&components, Component::id, ComponentId);
        for index in 0..components.len() {
            let directory = *directory_index
                .get(components[index].directory_id())
                .ok_or_else(|| OverlayError::MissingDirectory {
                    component: components[index].id().to_string(),
                    directory: components[index].directory_id().to_string(),
                })?;
            components[index].directory = Some(directory);
            directories[directory.0].components.push(ComponentId(index));
        }

        // Media ordered by LastSequence for the lower-bound lookup.
        let mut media_order: Vec<(i32, MediaId)> = medias
            .iter()
            .enumerate()
            .map(|(index, media)| (media.last_sequence(), MediaId(index)))
            .collect();
        media_order.sort_by_key(|(last_sequence, _)| *last_sequence);

        for index in 0..files.len() {
            let component = *component_index
                .get(files[index].component_id())
                .ok_or_else(|| OverlayError::MissingComponent {
                    file: files[index].id().to_string(),
                    component: files[index].component_id().to_string(),
                })?;
            files[index].component = Some(component);
            components[component.0].files.push(FileId(index));

            files[index].media = resolve_media(&files[index], &media_order)?;
        }

        let icon_index: HashMap<String, IconId> = index_of(&icons, Icon::id, IconId);
        for entry in &mut registry_keys {
            entry.component = optional_link(
                &component_index,
                entry.component_id(),
                "Registry",
                entry.id(),
            );
        }
        for remove in &mut remove_files {
            remove.component = optional_link(
                &component_index,
                remove.component_id(),
                "RemoveFile",
                remove.id(),
            );
            // DirProperty may name a directory directly, or a property
            // resolved at install time; only the former links.
            remove.directory = directory_index.get(remove.dir_property()).copied();
        }
        for shortcut in &mut shortcuts {
            shortcut.directory = optional_link(
                &directory_index,
                shortcut.directory_id(),
                "Shortcut",
                shortcut.id(),
            );
            shortcut.component = optional_link(
                &component_index,
                shortcut.component_id(),
                "Shortcut",
                shortcut.id(),
            );
            shortcut.icon = match shortcut.icon_id() {
                None => None,
                Some(icon) => optional_link(&icon_index, icon, "Shortcut", shortcut.id()),
            };
        }

        Ok(Msi {
            directories,
            components,
            files,
            medias,
            registry_keys,
            remove_files,
            shortcuts,
            icons,
            root,
        })
    }

    /// The single root of the directory tree.
    pub fn root(&self) -> DirectoryId {
        self.root
    }

    pub fn directory(&self, id: DirectoryId) -> &Directory {
        &self.directories[id.0]
    }

    pub fn component(&self, id: ComponentId) -> &Component {
        &self.components[id.0]
    }

    pub fn file(&self, id: FileId) -> &File {
        &self.files[id.0]
    }

    pub fn media(&self, id: MediaId) -> &Media {
        &self.medias[id.0]
    }

    pub fn icon(&self, id: IconId) -> &Icon {
        &self.icons[id.0]
    }

    pub fn directories(&self) -> &[Directory] {
        &self.directories
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn files(&self) -> &[File] {
        &self.files
    }

    pub fn medias(&self) -> &[Media] {
        &self.medias
    }

    pub fn registry_keys(&self) -> &[Registry] {
        &self.registry_keys
    }

    pub fn remove_files(&self) -> &[RemoveFile] {
        &self.remove_files
    }

    pub fn shortcuts(&self) -> &[Shortcut] {
        &self.shortcuts
    }

    pub fn icons(&self) -> &[Icon] {
        &self.icons
    }

    /// Joins a directory's chain of long names from the root.
    pub fn directory_path(&self, id: DirectoryId) -> PathBuf {
        let mut names = Vec::new();
        let mut current = Some(id);
        while let Some(directory) = current {
            let directory = self.directory(directory);
            names.push(directory.name());
            current = directory.parent();
        }
        names.iter().rev().collect()
    }
}

fn entity_rows<F: Read + Seek>(package: &mut Package<F>, name: &str) -> Result<Vec<Row>> {
    Ok(package
        .get(name)?
        .map(|table| table.rows().to_vec())
        .unwrap_or_default())
}

fn parsed<T>(
    rows: &[Row],
    from_row: impl Fn(&Row) -> std::result::Result<T, OverlayError>,
) -> Result<Vec<T>> {
    rows.iter()
        .map(|row| from_row(row).map_err(Into::into))
        .collect()
}

fn index_of<T, I: Copy>(
    entities: &[T],
    id: impl Fn(&T) -> &str,
    make: impl Fn(usize) -> I,
) -> HashMap<String, I> {
    entities
        .iter()
        .enumerate()
        .map(|(index, entity)| (id(entity).to_string(), make(index)))
        .collect()
}

fn optional_link<I: Copy>(
    index: &HashMap<String, I>,
    key: &str,
    table: &str,
    entity: &str,
) -> Option<I> {
    let link = index.get(key).copied();
    if link.is_none() {
        log::warn!("{table} entry {entity:?} references unknown key {key:?}");
    }
    link
}

fn link_directories(
    directories: &mut [Directory],
    directory_index: &HashMap<String, DirectoryId>,
) -> Result<()> {
    for index in 0..directories.len() {
        let parent = match directories[index].parent_id() {
            // A null or self-referential parent marks a root.
            None => None,
            Some(parent) if parent == directories[index].id() => None,
            Some(parent) => match directory_index.get(parent) {
                Some(parent) => Some(*parent),
                None => {
                    log::warn!(
                        "directory {:?} references unknown parent {parent:?}; treating as root",
                        directories[index].id()
                    );
                    None
                }
            },
        };
        directories[index].parent = parent;
        if let Some(parent) = parent {
            directories[parent.0].children.push(DirectoryId(index));
        }
    }

    // A parent chain longer than the arena can only mean a cycle.
    for start in 0..directories.len() {
        let mut current = start;
        let mut steps = 0;
        while let Some(parent) = directories[current].parent() {
            current = parent.0;
            steps += 1;
            if steps > directories.len() {
                return Err(OverlayError::CyclicDirectoryGraph(
                    directories[start].id().to_string(),
                )
                .into());
            }
        }
    }
    Ok(())
}

fn find_root(directories: &[Directory]) -> Result<DirectoryId> {
    let roots: Vec<DirectoryId> = directories
        .iter()
        .enumerate()
        .filter(|(_, directory)| directory.parent().is_none())
        .map(|(index, _)| DirectoryId(index))
        .collect();
    match roots.as_slice() {
        [root] => Ok(*root),
        _ => Err(OverlayError::MultipleRoots(roots.len()).into()),
    }
}

/// Media resolution: the media with the smallest `LastSequence` not
/// below the file's sequence. A package with no media rows at all is an
/// unpacked layout and yields no link; an over-sequenced file among
/// existing media is an error.
fn resolve_media(file: &File, media_order: &[(i32, MediaId)]) -> Result<Option<MediaId>> {
    if media_order.is_empty() {
        return Ok(None);
    }
    let position = media_order.partition_point(|(last_sequence, _)| *last_sequence < file.sequence());
    match media_order.get(position) {
        Some((_, media)) => Ok(Some(*media)),
        None => Err(OverlayError::FileWithoutMedia {
            file: file.id().to_string(),
            sequence: file.sequence(),
        }
        .into()),
    }
}
