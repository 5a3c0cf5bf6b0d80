mod cli;
mod dump;
mod extract;

use std::path::PathBuf;

use clap::Parser;

use cli::{Cli, Commands};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    if let Err(err) = run(&cli) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    match &cli.command {
        Commands::Tables { file } => {
            let package = msi::Package::open_path(file)?;
            let mut streams = package.streams()?;
            streams.sort();
            for (name, is_table) in streams {
                if is_table {
                    println!("Table: {name}");
                } else {
                    println!("Stream: {name:?}");
                }
            }
            Ok(())
        }
        Commands::Dump { file } => {
            let mut package = msi::Package::open_path(file)?;
            let overlay = msi::Msi::build(&mut package)?;
            dump::print(&overlay);
            Ok(())
        }
        Commands::Test { file } => {
            let mut package = msi::Package::open_path(file)?;
            match msi::Msi::build(&mut package) {
                Ok(_) => {
                    println!("Valid .msi file: {}", file.display());
                    Ok(())
                }
                Err(err) => {
                    println!("Invalid .msi file: {}", file.display());
                    Err(err.into())
                }
            }
        }
        Commands::Extract { file, dir } => {
            let mut package = msi::Package::open_path(file)?;
            let target = dir.clone().unwrap_or_else(|| PathBuf::from("."));
            extract::extract(&mut package, &target)
        }
    }
}
