#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Network operations for xpisign
//!
//! This crate owns the HTTP side of the signing workflow: the [`Transport`]
//! trait the workflow talks to, the reqwest-backed [`NetClient`] that
//! implements it, and streaming of downloaded artifacts to disk.

mod client;
mod download;
mod transport;

pub use client::{NetClient, NetConfig};
pub use download::{stream_to_file, DownloadResult};
pub use transport::{BodyStream, HttpResponse, MultipartUpload, Transport};

use xpisign_errors::{Error, NetworkError};
use url::Url;

/// Parse and validate a URL
///
/// # Errors
///
/// Returns an error if the URL string is malformed or invalid according to RFC 3986.
pub fn parse_url(url: &str) -> Result<Url, Error> {
    Url::parse(url).map_err(|e| NetworkError::InvalidUrl(e.to_string()).into())
}

/// Join a relative API path onto a base URL
///
/// A missing trailing slash on `base` is tolerated so that
/// `https://host/api/v4` and `https://host/api/v4/` behave the same.
///
/// # Errors
///
/// Returns an error if `base` is not a valid URL or the join fails.
pub fn join_url(base: &str, path: &str) -> Result<Url, Error> {
    let mut base = parse_url(base)?;
    if !base.path().ends_with('/') {
        let with_slash = format!("{}/", base.path());
        base.set_path(&with_slash);
    }
    base.join(path.trim_start_matches('/'))
        .map_err(|e| NetworkError::InvalidUrl(e.to_string()).into())
}
