//! The `extract` subcommand: unpack embedded cabinet payloads.
//!
//! The overlay identifies which cabinet stream carries each file;
//! cabinet members are keyed by File-table id, and target paths come
//! from the linked directory tree.

use std::collections::HashMap;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use msi::{Msi, Package};

pub fn extract(
    package: &mut Package<fs::File>,
    target: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let overlay = Msi::build(package)?;

    let mut paths: HashMap<String, PathBuf> = HashMap::new();
    for file in overlay.files() {
        let directory = file
            .component()
            .and_then(|component| overlay.component(component).directory());
        let Some(directory) = directory else { continue };
        let mut path = overlay.directory_path(directory);
        path.push(file.name());
        paths.insert(file.id().to_string(), path);
    }

    let mut extracted = 0usize;
    for media in overlay.medias() {
        let Some(stream_name) = media.cabinet_stream_name() else {
            if let Some(cabinet) = media.cabinet() {
                log::warn!(
                    "media {} cabinet {cabinet:?} is external; skipping",
                    media.disk_id()
                );
            }
            continue;
        };

        let bytes = package.read_stream(stream_name)?;
        let mut cabinet = cab::Cabinet::new(Cursor::new(bytes))?;
        let mut members: Vec<String> = Vec::new();
        for folder in cabinet.folder_entries() {
            for entry in folder.file_entries() {
                members.push(entry.name().to_string());
            }
        }

        for member in members {
            let relative = paths
                .get(&member)
                .cloned()
                .unwrap_or_else(|| PathBuf::from(&member));
            let path = target.join(relative);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut reader = cabinet.read_file(&member)?;
            let mut writer = fs::File::create(&path)?;
            std::io::copy(&mut reader, &mut writer)?;
            log::info!("extracted {}", path.display());
            extracted += 1;
        }
    }

    println!("Extracted {extracted} file(s) to {}", target.display());
    Ok(())
}
