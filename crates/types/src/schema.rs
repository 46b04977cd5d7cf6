//! Response bodies returned by the signing service
//!
//! The service is lenient about which fields it fills in and frequently
//! sends `null` for fields it has not computed yet, so everything except the
//! identifiers the workflow depends on is defaulted.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Index of the file entry that gets downloaded. Multi-file submissions are
/// not supported; the service lists the signed package first.
pub const FIRST_FILE: usize = 0;

/// Acknowledgement of an accepted upload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    pub guid: String,
    /// Status URL to poll
    pub url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub active: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub automated_signing: bool,
    /// Provisional file list; usually empty until processing finishes
    #[serde(default, deserialize_with = "null_as_default")]
    pub files: Vec<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub passed_review: bool,
    #[serde(default)]
    pub pk: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub processed: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub reviewed: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub valid: bool,
    #[serde(default)]
    pub validation_results: Option<Value>,
    #[serde(default)]
    pub validation_url: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

/// Result of a single status poll
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusSnapshot {
    #[serde(default, deserialize_with = "null_as_default")]
    pub guid: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub active: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub automated_signing: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub files: Vec<FileEntry>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub passed_review: bool,
    #[serde(default)]
    pub pk: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub processed: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub reviewed: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub valid: bool,
    #[serde(default)]
    pub validation_results: Option<ValidationResults>,
    #[serde(default)]
    pub validation_url: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

impl StatusSnapshot {
    /// The file entry selected for download, if it has a usable URL.
    #[must_use]
    pub fn first_file(&self) -> Option<&FileEntry> {
        self.files
            .get(FIRST_FILE)
            .filter(|file| !file.download_url.is_empty())
    }

    /// Whether the snapshot can drive a download.
    #[must_use]
    pub fn is_actionable(&self) -> bool {
        self.valid && self.first_file().is_some()
    }

    #[must_use]
    pub fn error_count(&self) -> u32 {
        self.validation_results.as_ref().map_or(0, |r| r.errors)
    }

    #[must_use]
    pub fn warning_count(&self) -> u32 {
        self.validation_results.as_ref().map_or(0, |r| r.warnings)
    }

    #[must_use]
    pub fn notice_count(&self) -> u32 {
        self.validation_results.as_ref().map_or(0, |r| r.notices)
    }
}

/// A file produced by the signing service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileEntry {
    #[serde(default, deserialize_with = "null_as_default")]
    pub download_url: String,
    /// Content hash in `<algorithm>:<hex>` form
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub signed: bool,
}

impl FileEntry {
    /// Hex digest when the service advertises a SHA-256 hash.
    #[must_use]
    pub fn sha256(&self) -> Option<&str> {
        self.hash
            .as_deref()
            .and_then(|hash| hash.strip_prefix("sha256:"))
            .filter(|digest| !digest.is_empty())
    }
}

/// Validation summary attached to a status snapshot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationResults {
    #[serde(deserialize_with = "null_as_default")]
    pub success: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub errors: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub warnings: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub notices: u32,
    pub compatibility_summary: Option<CompatibilitySummary>,
    #[serde(deserialize_with = "null_as_default")]
    pub messages: Vec<Value>,
    pub metadata: Option<ValidationMetadata>,
    pub ending_tier: Option<u32>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompatibilitySummary {
    pub errors: u32,
    pub warnings: u32,
    pub notices: u32,
}

/// Manifest facts the validator extracted from the package
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationMetadata {
    #[serde(deserialize_with = "null_as_default")]
    pub listed: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub is_webextension: bool,
    pub id: Option<String>,
    pub name: Option<String>,
    pub version: Option<String>,
    #[serde(rename = "manifestVersion")]
    pub manifest_version: Option<u32>,
    #[serde(rename = "type")]
    pub kind: Option<u32>,
    #[serde(rename = "totalScannedFileSize")]
    pub total_scanned_file_size: Option<u64>,
    #[serde(rename = "emptyFiles", deserialize_with = "null_as_default")]
    pub empty_files: Vec<Value>,
    #[serde(rename = "unknownMinifiedFiles", deserialize_with = "null_as_default")]
    pub unknown_minified_files: Vec<String>,
    pub identified_files: Option<Value>,
    #[serde(rename = "jsLibs")]
    pub js_libs: Option<Value>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
