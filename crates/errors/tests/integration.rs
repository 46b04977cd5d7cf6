//! Integration tests for error types

#[cfg(test)]
mod tests {
    use xpisign_errors::*;

    #[test]
    fn test_error_conversion() {
        let net_err = NetworkError::Timeout {
            url: "https://addons.example.org".into(),
        };
        let err: Error = net_err.into();
        assert!(matches!(err, Error::Network(_)));

        let err: Error = SubmissionError::NoFilesAvailable { guid: "g".into() }.into();
        assert!(matches!(err, Error::Submission(_)));
    }

    #[test]
    fn test_decode_and_network_are_distinct() {
        let decode: Error = DecodeError::InvalidJson {
            stage: "status".into(),
            message: "expected value at line 1 column 1".into(),
        }
        .into();
        let network: Error = NetworkError::HttpError {
            status: 502,
            message: "Bad Gateway".into(),
        }
        .into();

        assert_eq!(decode.user_code(), Some("decode.invalid_json"));
        assert_eq!(network.user_code(), Some("network.http_error"));
        assert!(network.is_retryable());
        assert!(!decode.is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = SubmissionError::ValidationFailed {
            guid: "abc".into(),
            processed: true,
            errors: 2,
            warnings: 1,
        };
        assert_eq!(
            err.to_string(),
            "validation failed for abc: 2 errors, 1 warnings"
        );

        let pending = SubmissionError::ValidationFailed {
            guid: "abc".into(),
            processed: false,
            errors: 0,
            warnings: 0,
        };
        assert!(pending.to_string().ends_with("(still processing)"));
        assert!(pending.is_retryable());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = Error::io_with_path(&io_err, "/tmp/missing.xpi");
        match &err {
            Error::Io { kind, path, .. } => {
                assert_eq!(*kind, std::io::ErrorKind::NotFound);
                assert_eq!(path.as_deref(), Some(std::path::Path::new("/tmp/missing.xpi")));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.is_io());
        assert!(err.user_hint().is_some());
    }

    #[test]
    fn test_signing_error_hint() {
        let err: Error = SigningError::EmptySecret.into();
        assert_eq!(err.user_code(), Some("signing.empty_secret"));
        assert!(err.user_hint().unwrap().contains("XPISIGN_JWT_SECRET"));
    }
}
