//! Submission inputs and outputs

use crate::WorkflowState;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Everything needed to submit one package
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SigningRequest {
    /// Package on disk
    pub source: PathBuf,
    /// Logical file name sent with the upload and used for the artifact
    pub file_name: String,
    /// Add-on identity (gecko id) on the signing service
    pub addon_id: String,
    pub version: String,
    /// Directory that receives the signed artifact
    pub download_dir: PathBuf,
}

impl SigningRequest {
    #[must_use]
    pub fn new(
        source: impl Into<PathBuf>,
        file_name: impl Into<String>,
        addon_id: impl Into<String>,
        version: impl Into<String>,
        download_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source: source.into(),
            file_name: file_name.into(),
            addon_id: addon_id.into(),
            version: version.into(),
            download_dir: download_dir.into(),
        }
    }

    /// Build a request whose file name is taken from the source path.
    ///
    /// Returns `None` when the path has no UTF-8 file name.
    #[must_use]
    pub fn from_source(
        source: impl Into<PathBuf>,
        addon_id: impl Into<String>,
        version: impl Into<String>,
        download_dir: impl Into<PathBuf>,
    ) -> Option<Self> {
        let source = source.into();
        let file_name = source.file_name()?.to_str()?.to_string();
        Some(Self::new(source, file_name, addon_id, version, download_dir))
    }

    /// Where the signed artifact will be written.
    #[must_use]
    pub fn destination(&self) -> PathBuf {
        self.download_dir.join(&self.file_name)
    }

    /// Resource path of this version relative to the service base URL.
    #[must_use]
    pub fn version_path(&self) -> String {
        format!("addons/{}/versions/{}/", self.addon_id, self.version)
    }
}

/// Signed package written to disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalArtifact {
    pub path: PathBuf,
    pub size: u64,
    /// SHA-256 of the written bytes, lowercase hex
    pub sha256: String,
}

impl LocalArtifact {
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Outcome of a completed workflow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SigningReport {
    pub guid: String,
    pub state: WorkflowState,
    pub artifact: LocalArtifact,
    /// Number of status polls performed
    pub polls: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_joins_download_dir() {
        let request = SigningRequest::from_source(
            "/build/my-addon.xpi",
            "addon@example.org",
            "1.2.0",
            "/tmp/out",
        )
        .unwrap();
        assert_eq!(request.file_name, "my-addon.xpi");
        assert_eq!(request.destination(), PathBuf::from("/tmp/out/my-addon.xpi"));
        assert_eq!(
            request.version_path(),
            "addons/addon@example.org/versions/1.2.0/"
        );
    }

    #[test]
    fn test_trailing_separator_is_equivalent() {
        let with = SigningRequest::new("a.xpi", "a.xpi", "id", "1", "/tmp/out/");
        let without = SigningRequest::new("a.xpi", "a.xpi", "id", "1", "/tmp/out");
        assert_eq!(with.destination(), without.destination());
    }
}
