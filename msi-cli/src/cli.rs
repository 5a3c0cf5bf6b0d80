//! Command-line definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Inspect and unpack Windows Installer packages.
#[derive(Parser)]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the tables and streams inside a package.
    Tables { file: PathBuf },

    /// Print the installation tree and media of a package.
    Dump { file: PathBuf },

    /// Check that a package opens and its tables link cleanly.
    Test { file: PathBuf },

    /// Unpack embedded cabinet payloads into a directory.
    Extract {
        file: PathBuf,
        /// Target directory; defaults to the current one.
        dir: Option<PathBuf>,
    },
}
