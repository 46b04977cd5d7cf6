//! The seam between the signing workflow and the HTTP stack

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::stream::{self, BoxStream, StreamExt};
use std::fmt;
use xpisign_errors::{Error, NetworkError};

/// Longest response body quoted in an `HttpError` message
const MAX_ERROR_BODY: usize = 512;

/// A single file sent as one part of a multipart form
#[derive(Debug, Clone)]
pub struct MultipartUpload {
    pub field_name: String,
    pub file_name: String,
    pub contents: Vec<u8>,
}

impl MultipartUpload {
    #[must_use]
    pub fn new(
        field_name: impl Into<String>,
        file_name: impl Into<String>,
        contents: Vec<u8>,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            file_name: file_name.into(),
            contents,
        }
    }
}

/// Response body as a stream of chunks
pub type BodyStream = BoxStream<'static, Result<Bytes, NetworkError>>;

/// Status code plus a body that has not been read yet
pub struct HttpResponse {
    pub status: u16,
    pub body: BodyStream,
}

impl fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

impl HttpResponse {
    /// Build a response whose body is already in memory
    #[must_use]
    pub fn from_bytes(status: u16, body: impl Into<Bytes>) -> Self {
        let body: Bytes = body.into();
        Self {
            status,
            body: stream::once(async move { Ok(body) }).boxed(),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Collect the whole body into memory
    ///
    /// # Errors
    ///
    /// Returns an error if reading any chunk of the body fails.
    pub async fn bytes(mut self) -> Result<Bytes, Error> {
        let mut buf = BytesMut::new();
        while let Some(chunk) = self.body.next().await {
            buf.extend_from_slice(&chunk?);
        }
        Ok(buf.freeze())
    }

    /// Pass 2xx responses through, turn anything else into `HttpError`
    ///
    /// # Errors
    ///
    /// Returns `NetworkError::HttpError` carrying the status and the start of
    /// the response body when the status is not 2xx.
    pub async fn error_for_status(self) -> Result<Self, Error> {
        if self.is_success() {
            return Ok(self);
        }

        let status = self.status;
        let reason = reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("unexpected status");
        // The body is only used to enrich the message
        let body = self.bytes().await.unwrap_or_default();
        let body = String::from_utf8_lossy(&body[..body.len().min(MAX_ERROR_BODY)]);
        let body = body.trim();

        let message = if body.is_empty() {
            reason.to_string()
        } else {
            format!("{reason}: {body}")
        };
        Err(NetworkError::HttpError { status, message }.into())
    }
}

/// Authenticated HTTP operations needed by the signing workflow
///
/// `authorization` is the complete `Authorization` header value.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `upload` as a multipart form with a PUT request
    async fn put_multipart(
        &self,
        url: &str,
        authorization: &str,
        upload: MultipartUpload,
    ) -> Result<HttpResponse, Error>;

    /// Plain GET request
    async fn get(&self, url: &str, authorization: &str) -> Result<HttpResponse, Error>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn put_multipart(
        &self,
        url: &str,
        authorization: &str,
        upload: MultipartUpload,
    ) -> Result<HttpResponse, Error> {
        (**self).put_multipart(url, authorization, upload).await
    }

    async fn get(&self, url: &str, authorization: &str) -> Result<HttpResponse, Error> {
        (**self).get(url, authorization).await
    }
}
