#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Add-on signing workflow
//!
//! Uploads a package to the signing service, polls the returned status URL
//! until the service has processed it, and downloads the signed file.
//!
//! ```text
//! SigningRequest ──submit──▶ SubmissionReceipt ──poll──▶ StatusSnapshot ──download──▶ LocalArtifact
//! ```

mod client;
mod decode;
mod poll;
mod state;

pub use client::{Session, SigningClient, SigningClientBuilder, UPLOAD_FIELD};
pub use decode::{decode_json, Stage};
pub use poll::PollPolicy;
pub use state::StateTracker;
