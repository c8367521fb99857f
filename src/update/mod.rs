pub mod backup;
pub mod download;
pub mod extract;
pub mod index;
pub mod interpreter;
pub mod launcher;
pub mod select;

#[cfg(test)]
pub(crate) mod mock;

use std::env;
use std::path::Path;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use semver::Version;

use crate::error::UpdateError;
use crate::paths::Paths;
use index::{Release, ReleaseIndex, VersionConstraint};

/// Version of the running binary.
pub const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// How a self-update invocation ended. The three no-op outcomes carry
/// distinct user-facing messages, so they stay distinct here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The index had nothing matching the requested constraint.
    NoReleaseFound,
    /// Candidates existed but every one was a prerelease and preview was off.
    NoNewRelease,
    /// The selected release is the version already running.
    AlreadyCurrent(Version),
    /// The installation now holds this version.
    Updated(Version),
}

/// Update the running quill installation in place.
///
/// Sequence: installation guard, release selection, download, checksum
/// verification, backup, extraction, launcher regeneration. Every failure
/// raised between the backup phase beginning and committing restores the
/// previous installation before propagating.
pub fn self_update(
    paths: &Paths,
    release_index: &ReleaseIndex,
    requested: Option<Version>,
    preview: bool,
) -> Result<UpdateOutcome, UpdateError> {
    let exe = env::current_exe().map_err(|e| {
        UpdateError::Configuration(format!("could not determine the running executable: {}", e))
    })?;
    ensure_recommended_installation(&exe, &paths.home)?;

    let current = Version::parse(CURRENT_VERSION)
        .map_err(|e| UpdateError::Configuration(format!("invalid build version: {}", e)))?;

    update_to_constraint(paths, release_index, requested, preview, &current)
}

/// The running executable must live under the managed home directory;
/// anything else (system package, cargo install, source checkout) cannot be
/// swapped out by this updater.
pub fn ensure_recommended_installation(exe: &Path, home: &Path) -> Result<(), UpdateError> {
    if exe.starts_with(home) {
        return Ok(());
    }

    Err(UpdateError::Configuration(
        "quill was not installed with the recommended installer, \
         so it cannot be updated automatically"
            .to_string(),
    ))
}

fn update_to_constraint(
    paths: &Paths,
    release_index: &ReleaseIndex,
    requested: Option<Version>,
    preview: bool,
    current: &Version,
) -> Result<UpdateOutcome, UpdateError> {
    let constraint = match requested {
        Some(version) => VersionConstraint::Exact(version),
        None => VersionConstraint::AtLeast(current.clone()),
    };

    println!(
        "{} {}",
        "Checking for updates...".cyan(),
        format!("({})", constraint).dimmed()
    );
    let candidates = release_index.find(&constraint)?;
    if candidates.is_empty() {
        return Ok(UpdateOutcome::NoReleaseFound);
    }

    let release = match select::select_release(candidates, preview) {
        Some(release) => release,
        None => return Ok(UpdateOutcome::NoNewRelease),
    };

    if release.version == *current {
        return Ok(UpdateOutcome::AlreadyCurrent(release.version));
    }

    println!(
        "{} Updating quill: {} → {}",
        "↑".yellow(),
        current.to_string().dimmed(),
        release.version.to_string().green()
    );

    install_release(paths, &release)?;

    Ok(UpdateOutcome::Updated(release.version))
}

fn install_release(paths: &Paths, release: &Release) -> Result<(), UpdateError> {
    println!("Downloading {}...", release.archive_name());

    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes}")
            .unwrap()
            .progress_chars("#>-"),
    );

    let downloaded = download::download(release, &mut |received, total| {
        if let Some(total) = total {
            bar.set_length(total);
        }
        bar.set_position(received);
    })?;
    bar.finish_and_clear();

    download::verify_checksum(&downloaded, &release.archive_name())?;

    println!("{}", "Installing...".cyan());
    apply(paths, &downloaded)?;

    let interpreter = interpreter::resolve();
    launcher::write_launchers(paths, &interpreter)?;

    Ok(())
}

/// Swap the library directory to the new payload under backup protection.
///
/// Extraction is the only irreversible step; it runs strictly after the
/// snapshot exists. A rollback failure is reported but never masks the
/// error that triggered it.
fn apply(paths: &Paths, downloaded: &download::Download) -> Result<(), UpdateError> {
    let lib = paths.lib();
    let snapshot = backup::begin(&lib, &paths.lib_backup())?;

    match extract::install_archive(&downloaded.archive, &lib) {
        Ok(()) => snapshot.commit(),
        Err(err) => {
            if let Err(restore_err) = snapshot.rollback() {
                eprintln!(
                    "{} failed to restore the previous installation: {}",
                    "warning:".yellow(),
                    restore_err
                );
            }
            Err(err)
        }
    }
}
