//! reqwest-backed transport

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::AUTHORIZATION;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use std::time::Duration;
use xpisign_config::NetworkConfig;
use xpisign_errors::{Error, NetworkError};

use crate::parse_url;
use crate::transport::{HttpResponse, MultipartUpload, Transport};

/// Network client configuration
#[derive(Debug, Clone)]
pub struct NetConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub user_agent: String,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(300), // packages can be large
            connect_timeout: Duration::from_secs(30),
            user_agent: default_user_agent(),
        }
    }
}

impl From<&NetworkConfig> for NetConfig {
    fn from(config: &NetworkConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.timeout),
            connect_timeout: Duration::from_secs(config.connect_timeout),
            user_agent: config
                .user_agent
                .clone()
                .unwrap_or_else(default_user_agent),
        }
    }
}

fn default_user_agent() -> String {
    format!("xpisign/{}", env!("CARGO_PKG_VERSION"))
}

/// HTTP client wrapper
///
/// Requests are sent once. Failures are mapped onto `NetworkError` and
/// returned to the caller, nothing is retried here.
#[derive(Clone, Debug)]
pub struct NetClient {
    client: Client,
}

impl NetClient {
    /// Create a new network client
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying reqwest client fails to initialize.
    pub fn new(config: &NetConfig) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| NetworkError::TlsError(e.to_string()))?;

        Ok(Self { client })
    }

    /// Create with default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created with default settings.
    pub fn with_defaults() -> Result<Self, Error> {
        Self::new(&NetConfig::default())
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<HttpResponse, Error> {
        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status().as_u16();
        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| NetworkError::DownloadFailed(e.to_string())))
            .boxed();

        Ok(HttpResponse { status, body })
    }
}

#[async_trait]
impl Transport for NetClient {
    async fn put_multipart(
        &self,
        url: &str,
        authorization: &str,
        upload: MultipartUpload,
    ) -> Result<HttpResponse, Error> {
        let url = parse_url(url)?;
        let part = Part::bytes(upload.contents).file_name(upload.file_name);
        let form = Form::new().part(upload.field_name, part);

        self.send(
            self.client
                .put(url)
                .header(AUTHORIZATION, authorization)
                .multipart(form),
        )
        .await
    }

    async fn get(&self, url: &str, authorization: &str) -> Result<HttpResponse, Error> {
        let url = parse_url(url)?;
        self.send(self.client.get(url).header(AUTHORIZATION, authorization))
            .await
    }
}

fn map_reqwest_error(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        NetworkError::Timeout {
            url: e
                .url()
                .map(std::string::ToString::to_string)
                .unwrap_or_default(),
        }
        .into()
    } else if e.is_connect() {
        NetworkError::ConnectionRefused(e.to_string()).into()
    } else {
        NetworkError::RequestFailed(e.to_string()).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_network_section() {
        let section = NetworkConfig {
            timeout: 10,
            connect_timeout: 2,
            user_agent: Some("custom/1.0".into()),
        };
        let config = NetConfig::from(&section);
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.connect_timeout, Duration::from_secs(2));
        assert_eq!(config.user_agent, "custom/1.0");

        let config = NetConfig::from(&NetworkConfig::default());
        assert!(config.user_agent.starts_with("xpisign/"));
    }
}
