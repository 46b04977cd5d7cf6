//! Command line interface definition

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use xpisign_types::ColorChoice;

/// xpisign - submit browser extension packages for signing
#[derive(Parser)]
#[command(name = "xpisign")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Submit browser extension packages for signing")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(Parser)]
pub struct GlobalArgs {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging to the xpisign log directory
    #[arg(long, global = true)]
    pub debug: bool,

    /// Color output control
    #[arg(long, global = true, value_enum)]
    pub color: Option<ColorChoice>,

    /// Use alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Upload a package, wait for validation and download the signed file
    Sign(SignArgs),

    /// Print a freshly minted authorization credential
    Token {
        #[command(flatten)]
        credentials: CredentialArgs,
    },
}

#[derive(Args)]
pub struct SignArgs {
    /// Package to submit
    #[arg(long, value_name = "PATH")]
    pub xpi: PathBuf,

    /// Add-on identity (gecko id)
    #[arg(long, value_name = "ID")]
    pub addon_id: String,

    /// Version being signed
    #[arg(long = "version", value_name = "VERSION")]
    pub addon_version: String,

    /// Directory that receives the signed package
    #[arg(long, value_name = "DIR")]
    pub download_dir: PathBuf,

    /// File name for upload and artifact (defaults to the package's name)
    #[arg(long, value_name = "NAME")]
    pub file_name: Option<String>,

    #[command(flatten)]
    pub credentials: CredentialArgs,

    /// Signing service API root
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Maximum number of status requests
    #[arg(long, value_name = "N")]
    pub poll_attempts: Option<u32>,

    /// Seconds to wait before the first status request
    #[arg(long, value_name = "SECS")]
    pub poll_delay: Option<u64>,

    /// Skip checking the downloaded file against the advertised hash
    #[arg(long)]
    pub no_verify_hash: bool,
}

/// API key pair overrides
#[derive(Args)]
pub struct CredentialArgs {
    /// JWT issuer (API key)
    #[arg(long, value_name = "KEY")]
    pub issuer: Option<String>,

    /// JWT secret (API secret)
    #[arg(long, value_name = "SECRET")]
    pub secret: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_sign() {
        let cli = Cli::try_parse_from([
            "xpisign",
            "--json",
            "sign",
            "--xpi",
            "dist/addon.xpi",
            "--addon-id",
            "addon@example.org",
            "--version",
            "1.2.3",
            "--download-dir",
            "out/",
            "--poll-attempts",
            "4",
            "--no-verify-hash",
        ])
        .unwrap();

        assert!(cli.global.json);
        let Commands::Sign(args) = cli.command else {
            panic!("expected sign command");
        };
        assert_eq!(args.addon_version, "1.2.3");
        assert_eq!(args.poll_attempts, Some(4));
        assert!(args.no_verify_hash);
        assert!(args.file_name.is_none());
        assert!(args.credentials.issuer.is_none());
    }

    #[test]
    fn test_sign_requires_identity() {
        let result = Cli::try_parse_from([
            "xpisign",
            "sign",
            "--xpi",
            "addon.xpi",
            "--download-dir",
            "out",
        ]);
        assert!(result.is_err());
    }
}
