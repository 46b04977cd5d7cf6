//! JSON decoding of service responses

use serde::de::DeserializeOwned;
use std::fmt;
use xpisign_errors::{DecodeError, Error};
use xpisign_net::HttpResponse;

/// Which response is being decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Submit,
    Status,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Submit => "submit",
            Self::Status => "status",
        })
    }
}

/// Check the status, read the body and parse it as `T`
///
/// # Errors
///
/// Non-2xx statuses become `Network(HttpError)`; a body that does not parse
/// as `T` becomes `Decode(InvalidJson)` tagged with `stage`.
pub async fn decode_json<T: DeserializeOwned>(
    response: HttpResponse,
    stage: Stage,
) -> Result<T, Error> {
    let body = response.error_for_status().await?.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| {
        DecodeError::InvalidJson {
            stage: stage.to_string(),
            message: e.to_string(),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use xpisign_errors::NetworkError;
    use xpisign_types::SubmissionReceipt;

    #[tokio::test]
    async fn test_decodes_receipt() {
        let response = HttpResponse::from_bytes(
            201,
            r#"{"guid":"g1","url":"https://x/status/g1","processed":false}"#,
        );
        let receipt: SubmissionReceipt = decode_json(response, Stage::Submit).await.unwrap();
        assert_eq!(receipt.guid, "g1");
        assert!(!receipt.processed);
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let response = HttpResponse::from_bytes(200, "<html>oops</html>");
        let err = decode_json::<SubmissionReceipt>(response, Stage::Status)
            .await
            .unwrap_err();
        match err {
            Error::Decode(DecodeError::InvalidJson { stage, .. }) => assert_eq!(stage, "status"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_error_status_wins_over_body() {
        let response = HttpResponse::from_bytes(409, r#"{"error":"Version already exists."}"#);
        let err = decode_json::<SubmissionReceipt>(response, Stage::Submit)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Network(NetworkError::HttpError { status: 409, .. })
        ));
    }
}
