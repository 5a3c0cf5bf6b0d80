//! The `dump` subcommand: pretty-print the installation tree and media.

use msi::{DirectoryId, Msi};

pub fn print(overlay: &Msi) {
    print_directory(overlay, overlay.root(), 0);
    for media in overlay.medias() {
        println!("Media: {}", media.disk_id());
        println!("  Last Sequence: {}", media.last_sequence());
        if let Some(prompt) = media.disk_prompt() {
            println!("  Disk Prompt: {prompt}");
        }
        if let Some(cabinet) = media.cabinet() {
            println!("  Cabinet: {cabinet}");
        }
        if let Some(label) = media.volume_label() {
            println!("  Volume Label: {label}");
        }
        if let Some(source) = media.source() {
            println!("  Source: {source}");
        }
    }
}

fn print_directory(overlay: &Msi, id: DirectoryId, indent: usize) {
    let directory = overlay.directory(id);
    println!("{:indent$}{}/", "", directory.name());
    let indent = indent + 2;
    for component in directory.components() {
        for file in overlay.component(*component).files() {
            let file = overlay.file(*file);
            println!(
                "{:indent$}{} ({})",
                "",
                file.name(),
                humanize_size(file.size())
            );
        }
    }
    for child in directory.children() {
        print_directory(overlay, *child, indent);
    }
}

fn humanize_size(size: i32) -> String {
    const KIB: f64 = 1024.0;
    let size = f64::from(size.max(0));
    if size < KIB {
        format!("{size:.0} B")
    } else if size < KIB * KIB {
        format!("{:.2} KiB", size / KIB)
    } else if size < KIB * KIB * KIB {
        format!("{:.2} MiB", size / (KIB * KIB))
    } else {
        format!("{:.2} GiB", size / (KIB * KIB * KIB))
    }
}
