use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors raised while locating, fetching or installing a quill release.
///
/// Variants up to and including `Integrity` occur before the live
/// installation is touched; `Extraction` and `Filesystem` may occur after
/// the backup phase has begun and are answered with a rollback by the
/// caller.
#[derive(Debug, Error)]
pub enum UpdateError {
    /// Self-update is not possible for this kind of installation.
    #[error("{0}")]
    Configuration(String),

    /// The release index could not be queried at all.
    #[error("failed to query the release index: {0}")]
    Lookup(String),

    /// A release asset (archive or checksum sidecar) is missing.
    #[error("could not find {asset} on the release server")]
    NotFound { asset: String },

    /// Any other transport or HTTP failure.
    #[error("request for {url} failed: {reason}")]
    Network { url: String, reason: String },

    /// The downloaded archive does not match its published digest.
    #[error("hashes for {asset} do not match: {expected} != {actual}")]
    Integrity {
        asset: String,
        expected: String,
        actual: String,
    },

    /// The archive could not be unpacked into the library directory.
    #[error("failed to extract {archive}: {source}")]
    Extraction {
        archive: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A copy, delete or write on the installation tree failed.
    #[error("filesystem operation failed on {path}: {source}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl UpdateError {
    pub fn filesystem(path: impl AsRef<Path>, source: io::Error) -> Self {
        UpdateError::Filesystem {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn extraction(archive: impl AsRef<Path>, source: io::Error) -> Self {
        UpdateError::Extraction {
            archive: archive.as_ref().to_path_buf(),
            source,
        }
    }
}
