use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use semver::Version;

use quill_cli::update::index::ReleaseIndex;
use quill_cli::update::{self, UpdateOutcome};
use quill_cli::Paths;

#[derive(Parser, Debug)]
#[command(name = "quill")]
#[command(about = "Manage a quill installation", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Update quill to the latest (or a pinned) version
    SelfUpdate {
        /// The version to update to (defaults to anything newer)
        version: Option<String>,

        /// Allow installing prereleases
        #[arg(long)]
        preview: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::SelfUpdate { version, preview } => run_self_update(version, preview),
    }
}

fn run_self_update(version: Option<String>, preview: bool) -> Result<()> {
    let requested = version
        .map(|v| {
            Version::parse(v.trim_start_matches('v'))
                .with_context(|| format!("'{}' is not a valid version", v))
        })
        .transpose()?;

    let paths = Paths::from_env()?;
    let index = ReleaseIndex::default();

    match update::self_update(&paths, &index, requested, preview)? {
        UpdateOutcome::NoReleaseFound => {
            println!("No release found for the specified version");
        }
        UpdateOutcome::NoNewRelease => {
            println!("No new release found");
        }
        UpdateOutcome::AlreadyCurrent(version) => {
            println!(
                "{} You are using the latest version ({})",
                "✓".green(),
                version
            );
        }
        UpdateOutcome::Updated(version) => {
            println!();
            println!(
                "{} quill ({}) is installed now. Great!",
                "✓".green(),
                version.to_string().green()
            );
        }
    }

    Ok(())
}
