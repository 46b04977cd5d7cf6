//! Rendering of command results

use console::style;
use serde_json::json;
use xpisign_signing::Credential;
use xpisign_types::SigningReport;

use crate::error::CliError;

/// Prints final results to stdout, as text or JSON
pub struct OutputRenderer {
    json_output: bool,
    colors_enabled: bool,
}

impl OutputRenderer {
    pub fn new(json_output: bool, colors_enabled: bool) -> Self {
        Self {
            json_output,
            colors_enabled,
        }
    }

    pub fn render_report(&self, report: &SigningReport) -> Result<(), CliError> {
        if self.json_output {
            return print_json(&serde_json::to_value(report).map_err(output_error)?);
        }

        println!(
            "{} {}",
            style("✔").green().force_styling(self.colors_enabled),
            report.artifact.path.display()
        );
        println!("  upload   {}", report.guid);
        println!("  size     {} bytes", report.artifact.size);
        println!("  sha256   {}", report.artifact.sha256);
        println!("  polls    {}", report.polls);
        Ok(())
    }

    pub fn render_credential(&self, credential: &Credential) -> Result<(), CliError> {
        if self.json_output {
            return print_json(&json!({
                "authorization": credential.authorization(),
                "issued_at": credential.issued_at(),
                "expires_at": credential.expires_at(),
            }));
        }

        println!("Authorization: {}", credential.authorization());
        Ok(())
    }
}

fn print_json(value: &serde_json::Value) -> Result<(), CliError> {
    let text = serde_json::to_string_pretty(value).map_err(output_error)?;
    println!("{text}");
    Ok(())
}

fn output_error(e: serde_json::Error) -> CliError {
    CliError::Output(e.to_string())
}
