//! Streaming a response body to disk with SHA-256 verification

use futures::StreamExt;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use xpisign_errors::{Error, NetworkError};

use crate::transport::BodyStream;

/// Result of a download operation
#[derive(Debug, Clone)]
pub struct DownloadResult {
    pub path: PathBuf,
    pub size: u64,
    /// Lowercase hex SHA-256 of the bytes written
    pub sha256: String,
    /// Whether an expected hash was supplied and matched
    pub verified: bool,
}

/// Write `body` to `dest`, creating or truncating it
///
/// A failure part way through leaves the partially written file behind.
/// A checksum mismatch removes it.
///
/// # Errors
///
/// Returns `Io` if the file cannot be created or written or the body breaks
/// off mid-copy, or `ChecksumMismatch` if `expected_sha256` is given and
/// differs from the written bytes.
pub async fn stream_to_file(
    mut body: BodyStream,
    dest: &Path,
    expected_sha256: Option<&str>,
) -> Result<DownloadResult, Error> {
    let mut file = File::create(dest)
        .await
        .map_err(|e| Error::io_with_path(&e, dest))?;
    let mut hasher = Sha256::new();
    let mut size = 0u64;

    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(|e| {
            Error::io_with_path(&std::io::Error::other(format!("stream copy: {e}")), dest)
        })?;
        hasher.update(&chunk);
        file.write_all(&chunk)
            .await
            .map_err(|e| Error::io_with_path(&e, dest))?;
        size += chunk.len() as u64;
    }

    file.flush()
        .await
        .map_err(|e| Error::io_with_path(&e, dest))?;
    drop(file);

    let sha256 = hex::encode(hasher.finalize());

    if let Some(expected) = expected_sha256 {
        if !expected.eq_ignore_ascii_case(&sha256) {
            let _ = tokio::fs::remove_file(dest).await;
            return Err(NetworkError::ChecksumMismatch {
                expected: expected.to_ascii_lowercase(),
                actual: sha256,
            }
            .into());
        }
    }

    Ok(DownloadResult {
        path: dest.to_path_buf(),
        size,
        sha256,
        verified: expected_sha256.is_some(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use futures::stream;
    use tempfile::tempdir;

    // sha256("SIGNED-CONTENT")
    fn signed_content_hash() -> String {
        hex::encode(Sha256::digest(b"SIGNED-CONTENT"))
    }

    fn body(chunks: &[&'static [u8]]) -> BodyStream {
        stream::iter(
            chunks
                .iter()
                .copied()
                .map(|c| Ok(Bytes::from_static(c)))
                .collect::<Vec<_>>(),
        )
        .boxed()
    }

    #[tokio::test]
    async fn test_stream_writes_all_chunks() {
        let temp = tempdir().unwrap();
        let dest = temp.path().join("signed.xpi");
        let expected = signed_content_hash();

        let result = stream_to_file(body(&[b"SIGNED-", b"CONTENT"]), &dest, Some(&expected))
            .await
            .unwrap();

        assert_eq!(result.size, 14);
        assert_eq!(result.sha256, expected);
        assert!(result.verified);
        assert_eq!(std::fs::read(&dest).unwrap(), b"SIGNED-CONTENT");
    }

    #[tokio::test]
    async fn test_existing_file_is_truncated() {
        let temp = tempdir().unwrap();
        let dest = temp.path().join("signed.xpi");
        std::fs::write(&dest, b"a much longer stale artifact").unwrap();

        let result = stream_to_file(body(&[b"new"]), &dest, None).await.unwrap();
        assert!(!result.verified);
        assert_eq!(std::fs::read(&dest).unwrap(), b"new");
    }

    #[tokio::test]
    async fn test_mismatch_removes_file() {
        let temp = tempdir().unwrap();
        let dest = temp.path().join("signed.xpi");
        let wrong = "0".repeat(64);

        let err = stream_to_file(body(&[b"SIGNED-CONTENT"]), &dest, Some(&wrong))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Network(NetworkError::ChecksumMismatch { .. })
        ));
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_mid_stream_failure_keeps_partial_file() {
        let temp = tempdir().unwrap();
        let dest = temp.path().join("signed.xpi");
        let failing = stream::iter(vec![
            Ok(Bytes::from_static(b"SIGNED-")),
            Err(NetworkError::DownloadFailed("connection reset".into())),
        ])
        .boxed();

        let err = stream_to_file(failing, &dest, None).await.unwrap_err();
        assert!(err.is_io());
        assert!(err.to_string().contains("connection reset"));
        assert_eq!(std::fs::read(&dest).unwrap(), b"SIGNED-");
    }

    #[tokio::test]
    async fn test_missing_directory_is_io_error() {
        let temp = tempdir().unwrap();
        let dest = temp.path().join("missing").join("signed.xpi");

        let err = stream_to_file(body(&[b"x"]), &dest, None).await.unwrap_err();
        assert!(err.is_io());
    }
}
