use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tempfile::TempDir;

use crate::error::UpdateError;
use crate::update::index::{Release, USER_AGENT};

const BLOCK_SIZE: usize = 8192;

/// A downloaded release archive, alive only while the update is in flight.
///
/// The temporary directory is owned by this struct; dropping it removes the
/// archive on every exit path, including error propagation.
#[derive(Debug)]
pub struct Download {
    _dir: TempDir,
    pub archive: PathBuf,
    /// Digest published in the checksum sidecar, trimmed.
    pub expected: String,
    /// Lowercase hex digest accumulated while streaming the archive.
    pub actual: String,
}

/// Fetch the checksum sidecar and the release archive.
///
/// The archive body is streamed in fixed-size chunks into a scoped temp
/// directory while a SHA-256 digest accumulates; `progress` is called with
/// (bytes received, total if known) after each chunk and must not block.
pub fn download(
    release: &Release,
    progress: &mut dyn FnMut(u64, Option<u64>),
) -> Result<Download, UpdateError> {
    let client = reqwest::blocking::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| UpdateError::Network {
            url: release.archive_url.clone(),
            reason: e.to_string(),
        })?;

    let sidecar = fetch(
        &client,
        &release.checksum_url,
        &format!("{}.sha256sum", release.archive_name()),
    )?;
    let expected = sidecar
        .text()
        .map_err(|e| UpdateError::Network {
            url: release.checksum_url.clone(),
            reason: e.to_string(),
        })?
        .trim()
        .to_string();

    let mut response = fetch(&client, &release.archive_url, &release.archive_name())?;
    let total = response.content_length();

    let dir = TempDir::with_prefix("quill-updater-")
        .map_err(|e| UpdateError::filesystem(std::env::temp_dir(), e))?;
    let archive = dir.path().join(release.archive_name());

    let actual = stream_archive(
        &mut response,
        total,
        &release.archive_url,
        &archive,
        progress,
    )?;

    Ok(Download {
        _dir: dir,
        archive,
        expected,
        actual,
    })
}

/// Stream a response body into `archive` chunk by chunk, returning the hex
/// digest of everything written.
///
/// `total` is absent when the response carried no length header; progress
/// then degrades to byte-count-only.
fn stream_archive(
    reader: &mut dyn Read,
    total: Option<u64>,
    url: &str,
    archive: &Path,
    progress: &mut dyn FnMut(u64, Option<u64>),
) -> Result<String, UpdateError> {
    let mut file = File::create(archive).map_err(|e| UpdateError::filesystem(archive, e))?;
    let mut sha = Sha256::new();
    let mut received: u64 = 0;
    let mut buffer = [0u8; BLOCK_SIZE];

    loop {
        let read = reader.read(&mut buffer).map_err(|e| UpdateError::Network {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        if read == 0 {
            break;
        }

        file.write_all(&buffer[..read])
            .map_err(|e| UpdateError::filesystem(archive, e))?;
        sha.update(&buffer[..read]);
        received += read as u64;
        progress(received, total);
    }

    Ok(hex::encode(sha.finalize()))
}

fn fetch(
    client: &reqwest::blocking::Client,
    url: &str,
    asset: &str,
) -> Result<reqwest::blocking::Response, UpdateError> {
    let response = client.get(url).send().map_err(|e| UpdateError::Network {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    if response.status() == reqwest::StatusCode::NOT_FOUND {
        return Err(UpdateError::NotFound {
            asset: asset.to_string(),
        });
    }

    if !response.status().is_success() {
        return Err(UpdateError::Network {
            url: url.to_string(),
            reason: response.status().to_string(),
        });
    }

    Ok(response)
}

/// Confirm the streamed archive matches its published digest.
///
/// Case-sensitive comparison of the hex strings; must run before any
/// extraction or mutation of the live install.
pub fn verify_checksum(download: &Download, asset: &str) -> Result<(), UpdateError> {
    if download.expected != download.actual {
        return Err(UpdateError::Integrity {
            asset: asset.to_string(),
            expected: download.expected.clone(),
            actual: download.actual.clone(),
        });
    }

    Ok(())
}
