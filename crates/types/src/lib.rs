#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions for xpisign
//!
//! This crate holds the wire schema of the signing service, the request
//! describing one submission, and the workflow state machine.

pub mod request;
pub mod schema;
pub mod state;

pub use request::{LocalArtifact, SigningReport, SigningRequest};
pub use schema::{
    CompatibilitySummary, FileEntry, StatusSnapshot, SubmissionReceipt, ValidationMetadata,
    ValidationResults, FIRST_FILE,
};
pub use state::WorkflowState;

use serde::{Deserialize, Serialize};

/// Color output control
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    /// Always use colors
    Always,
    /// Use colors when outputting to a terminal
    #[default]
    Auto,
    /// Never use colors
    Never,
}
