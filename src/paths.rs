use std::env;
use std::path::PathBuf;

use crate::error::UpdateError;

/// Environment variable overriding the managed installation root.
pub const HOME_ENV: &str = "QUILL_HOME";

/// Filesystem layout of a managed quill installation.
///
/// Resolved once at startup and passed explicitly to every component that
/// touches the installation tree.
#[derive(Debug, Clone)]
pub struct Paths {
    pub home: PathBuf,
}

impl Paths {
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Paths { home: home.into() }
    }

    /// Resolve the installation root from `QUILL_HOME`, falling back to
    /// `~/.quill`.
    pub fn from_env() -> Result<Self, UpdateError> {
        if let Some(home) = env::var_os(HOME_ENV) {
            return Ok(Paths::new(PathBuf::from(home)));
        }

        let user_home = dirs::home_dir().ok_or_else(|| {
            UpdateError::Configuration(
                "could not determine the user home directory".to_string(),
            )
        })?;

        Ok(Paths::new(user_home.join(".quill")))
    }

    /// Generated launchers live here.
    pub fn bin(&self) -> PathBuf {
        self.home.join("bin")
    }

    /// The installed payload.
    pub fn lib(&self) -> PathBuf {
        self.home.join("lib")
    }

    /// Transient snapshot of `lib/` while an update is in flight.
    pub fn lib_backup(&self) -> PathBuf {
        self.home.join("lib-backup")
    }

    pub fn launcher(&self) -> PathBuf {
        self.bin().join("quill")
    }
}
