use std::fmt;

use semver::Version;
use serde::Deserialize;

use crate::error::UpdateError;

const INDEX_URL: &str = "https://api.github.com/repos/quill-tools/quill/releases";
const DOWNLOAD_BASE: &str = "https://github.com/quill-tools/quill/releases/download";

pub(crate) const USER_AGENT: &str = concat!("quill-cli/", env!("CARGO_PKG_VERSION"));

/// A versioned, platform-specific downloadable artifact of quill itself.
#[derive(Debug, Clone)]
pub struct Release {
    pub version: Version,
    pub platform: &'static str,
    pub archive_url: String,
    pub checksum_url: String,
    pub prerelease: bool,
}

impl Release {
    /// `quill-<version>-<platform>`, the stem both sibling assets share.
    pub fn asset_name(&self) -> String {
        format!("quill-{}-{}", self.version, self.platform)
    }

    pub fn archive_name(&self) -> String {
        format!("{}.tar.gz", self.asset_name())
    }
}

/// Version constraint a candidate release must satisfy.
#[derive(Debug, Clone)]
pub enum VersionConstraint {
    /// Default when no version was requested: anything at or above the
    /// running version.
    AtLeast(Version),
    /// An explicitly pinned version.
    Exact(Version),
}

impl VersionConstraint {
    pub fn matches(&self, candidate: &Version) -> bool {
        match self {
            VersionConstraint::AtLeast(min) => candidate >= min,
            VersionConstraint::Exact(pinned) => candidate == pinned,
        }
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionConstraint::AtLeast(min) => write!(f, ">={}", min),
            VersionConstraint::Exact(pinned) => write!(f, "=={}", pinned),
        }
    }
}

#[derive(Debug, Deserialize)]
struct IndexEntry {
    tag_name: String,
    #[serde(default)]
    prerelease: bool,
}

/// Queries the release host for candidate releases of quill.
#[derive(Debug, Clone)]
pub struct ReleaseIndex {
    index_url: String,
    download_base: String,
}

impl Default for ReleaseIndex {
    fn default() -> Self {
        ReleaseIndex::new(INDEX_URL, DOWNLOAD_BASE)
    }
}

impl ReleaseIndex {
    pub fn new(index_url: impl Into<String>, download_base: impl Into<String>) -> Self {
        ReleaseIndex {
            index_url: index_url.into(),
            download_base: download_base.into(),
        }
    }

    /// Return every published release satisfying `constraint`, in discovery
    /// order (callers sort). An unreachable index is an error; an empty
    /// result is not.
    pub fn find(&self, constraint: &VersionConstraint) -> Result<Vec<Release>, UpdateError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| UpdateError::Lookup(e.to_string()))?;

        let response = client
            .get(&self.index_url)
            .header("Accept", "application/vnd.github+json")
            .send()
            .map_err(|e| UpdateError::Lookup(e.to_string()))?;

        if !response.status().is_success() {
            return Err(UpdateError::Lookup(format!(
                "release index returned {}",
                response.status()
            )));
        }

        let entries: Vec<IndexEntry> = response
            .json()
            .map_err(|e| UpdateError::Lookup(format!("invalid index response: {}", e)))?;

        let releases = entries
            .iter()
            .filter_map(|entry| self.release_from_entry(entry))
            .filter(|release| constraint.matches(&release.version))
            .collect();

        Ok(releases)
    }

    /// Entries with tags that are not versions are skipped, not errors.
    fn release_from_entry(&self, entry: &IndexEntry) -> Option<Release> {
        let version = Version::parse(entry.tag_name.trim_start_matches('v')).ok()?;
        let prerelease = entry.prerelease || !version.pre.is_empty();
        let platform = platform();
        let asset = format!("quill-{}-{}.tar.gz", version, platform);

        Some(Release {
            archive_url: format!("{}/{}/{}", self.download_base, version, asset),
            checksum_url: format!("{}/{}/{}.sha256sum", self.download_base, version, asset),
            version,
            platform,
            prerelease,
        })
    }
}

/// Platform identifier embedded in release asset names.
pub fn platform() -> &'static str {
    #[cfg(target_os = "linux")]
    return "linux";

    #[cfg(target_os = "macos")]
    return "darwin";

    #[cfg(target_os = "windows")]
    return "win32";

    #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
    return "unknown";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::update::mock::MockHost;

    fn version(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn test_constraint_at_least() {
        let constraint = VersionConstraint::AtLeast(version("1.0.0"));
        assert!(constraint.matches(&version("1.0.0")));
        assert!(constraint.matches(&version("1.2.0")));
        assert!(constraint.matches(&version("1.1.0-rc1")));
        assert!(!constraint.matches(&version("0.9.9")));
    }

    #[test]
    fn test_constraint_exact() {
        let constraint = VersionConstraint::Exact(version("1.2.0"));
        assert!(constraint.matches(&version("1.2.0")));
        assert!(!constraint.matches(&version("1.2.1")));
    }

    #[test]
    fn test_constraint_display() {
        assert_eq!(
            VersionConstraint::AtLeast(version("1.0.0")).to_string(),
            ">=1.0.0"
        );
        assert_eq!(
            VersionConstraint::Exact(version("1.2.0")).to_string(),
            "==1.2.0"
        );
    }

    #[test]
    fn test_release_asset_urls() {
        let index = ReleaseIndex::new("http://index.invalid", "http://host.invalid/dl");
        let entry = IndexEntry {
            tag_name: "v1.2.0".to_string(),
            prerelease: false,
        };
        let release = index.release_from_entry(&entry).unwrap();

        assert_eq!(release.version, version("1.2.0"));
        assert!(!release.prerelease);
        let asset = format!("quill-1.2.0-{}.tar.gz", platform());
        assert_eq!(
            release.archive_url,
            format!("http://host.invalid/dl/1.2.0/{}", asset)
        );
        assert_eq!(
            release.checksum_url,
            format!("http://host.invalid/dl/1.2.0/{}.sha256sum", asset)
        );
    }

    #[test]
    fn test_prerelease_from_version_segment() {
        let index = ReleaseIndex::default();
        let entry = IndexEntry {
            tag_name: "1.1.0-rc1".to_string(),
            prerelease: false,
        };
        assert!(index.release_from_entry(&entry).unwrap().prerelease);
    }

    #[test]
    fn test_find_filters_by_constraint() {
        let body = r#"[
            {"tag_name": "v1.2.0", "prerelease": false},
            {"tag_name": "v1.1.0-rc1", "prerelease": true},
            {"tag_name": "v1.0.0", "prerelease": false},
            {"tag_name": "v0.9.0", "prerelease": false},
            {"tag_name": "nightly", "prerelease": true}
        ]"#;
        let host = MockHost::start();
        host.mock_get("/releases", 200, body.as_bytes().to_vec());
        let index = ReleaseIndex::new(host.url("/releases"), "http://host.invalid/dl");

        let releases = index
            .find(&VersionConstraint::AtLeast(version("1.0.0")))
            .unwrap();

        let versions: Vec<String> = releases.iter().map(|r| r.version.to_string()).collect();
        assert_eq!(versions, vec!["1.2.0", "1.1.0-rc1", "1.0.0"]);
    }

    #[test]
    fn test_find_empty_is_not_an_error() {
        let host = MockHost::start();
        host.mock_get("/releases", 200, b"[]".to_vec());
        let index = ReleaseIndex::new(host.url("/releases"), "http://host.invalid/dl");
        let releases = index
            .find(&VersionConstraint::AtLeast(version("1.0.0")))
            .unwrap();
        assert!(releases.is_empty());
    }

    #[test]
    fn test_find_unreachable_index_is_lookup_error() {
        let index = ReleaseIndex::new("http://127.0.0.1:1/releases", "http://host.invalid/dl");
        let err = index
            .find(&VersionConstraint::AtLeast(version("1.0.0")))
            .unwrap_err();
        assert!(matches!(err, UpdateError::Lookup(_)));
    }
}
