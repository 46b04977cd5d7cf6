//! xpisign - submit browser extension packages for signing
//!
//! Uploads a package to the add-ons signing service, waits for validation
//! and downloads the signed file.

mod cli;
mod display;
mod error;
mod events;
mod logging;

use crate::cli::{Cli, Commands, CredentialArgs, SignArgs};
use crate::display::OutputRenderer;
use crate::error::CliError;
use crate::events::EventHandler;
use clap::Parser;
use std::future::Future;
use std::process;
use tokio::select;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use xpisign_config::Config;
use xpisign_events::EventReceiver;
use xpisign_net::{NetClient, NetConfig};
use xpisign_signing::TokenIssuer;
use xpisign_submission::SigningClient;
use xpisign_types::{ColorChoice, SigningReport, SigningRequest};

#[tokio::main]
async fn main() {
    // Parse command line arguments first to check for JSON mode
    let cli = Cli::parse();
    let json_mode = cli.global.json;

    init_tracing(json_mode, cli.global.debug);

    if let Err(e) = run(cli).await {
        error!("Application error: {}", e);
        if !json_mode {
            eprintln!("Error: {e}");
        }
        process::exit(1);
    }
}

/// Main application logic
async fn run(cli: Cli) -> Result<(), CliError> {
    info!("Starting xpisign v{}", env!("CARGO_PKG_VERSION"));

    // 1. Start with file config (or defaults)
    let mut config = Config::load_or_default(cli.global.config.as_deref()).await?;

    // 2. Merge environment variables
    config.merge_env()?;

    // 3. Apply CLI flags (highest precedence)
    apply_cli_config(&mut config, &cli.command);
    config.validate()?;

    let colors_enabled = match cli.global.color.unwrap_or_default() {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => console::Term::stdout().features().colors_supported(),
    };
    let renderer = OutputRenderer::new(cli.global.json, colors_enabled);

    match cli.command {
        Commands::Sign(args) => {
            let mut event_handler =
                EventHandler::new(colors_enabled, cli.global.json, cli.global.debug);
            let report = sign(&args, &config, &mut event_handler).await?;
            renderer.render_report(&report)?;
        }
        Commands::Token { .. } => {
            let (issuer, secret) = config.credentials()?;
            let credential = TokenIssuer::new(issuer, secret)?.issue()?;
            renderer.render_credential(&credential)?;
        }
    }

    info!("Command completed successfully");
    Ok(())
}

/// Run the signing workflow for one package
async fn sign(
    args: &SignArgs,
    config: &Config,
    event_handler: &mut EventHandler,
) -> Result<SigningReport, CliError> {
    let request = build_request(args)?;
    let (issuer, secret) = config.credentials()?;
    let issuer = TokenIssuer::new(issuer, secret)?;
    let net = NetClient::new(&NetConfig::from(&config.network))?;

    let (event_sender, event_receiver) = xpisign_events::channel();
    let cancel = CancellationToken::new();
    let client = SigningClient::builder(net, issuer)
        .with_config(config)
        .with_event_sender(event_sender)
        .with_cancellation_token(cancel.clone())
        .build()?;

    let report = execute_with_events(
        client.register(&request),
        event_receiver,
        event_handler,
        &cancel,
    )
    .await?;
    Ok(report)
}

fn build_request(args: &SignArgs) -> Result<SigningRequest, CliError> {
    match &args.file_name {
        Some(name) if !is_plain_file_name(name) => Err(CliError::InvalidArguments(format!(
            "--file-name must be a bare file name, got {name}"
        ))),
        Some(name) => Ok(SigningRequest::new(
            &args.xpi,
            name,
            &args.addon_id,
            &args.addon_version,
            &args.download_dir,
        )),
        None => SigningRequest::from_source(
            &args.xpi,
            &args.addon_id,
            &args.addon_version,
            &args.download_dir,
        )
        .ok_or_else(|| {
            CliError::InvalidArguments(format!(
                "cannot derive a file name from {}, pass --file-name",
                args.xpi.display()
            ))
        }),
    }
}

/// True when `name` has no directory components
fn is_plain_file_name(name: &str) -> bool {
    std::path::Path::new(name)
        .file_name()
        .is_some_and(|file_name| file_name == name)
}

/// Drive `operation` while draining events and watching for Ctrl-C
async fn execute_with_events<F, T>(
    operation: F,
    mut event_receiver: EventReceiver,
    event_handler: &mut EventHandler,
    cancel: &CancellationToken,
) -> Result<T, CliError>
where
    F: Future<Output = Result<T, xpisign_errors::Error>>,
{
    let mut operation = Box::pin(operation);
    let mut interrupted = false;

    loop {
        select! {
            // Operation completed
            result = &mut operation => {
                // Drain any remaining events
                while let Ok(event) = event_receiver.try_recv() {
                    event_handler.handle_event(event);
                }
                return result.map_err(CliError::from);
            }

            // Event received
            event = event_receiver.recv() => {
                match event {
                    Some(event) => event_handler.handle_event(event),
                    None => { /* Channel closed: keep waiting for the operation to finish */ }
                }
            }

            _ = tokio::signal::ctrl_c(), if !interrupted => {
                warn!("Interrupted, cancelling");
                interrupted = true;
                cancel.cancel();
            }
        }
    }
}

/// Initialize tracing/logging
fn init_tracing(json_mode: bool, debug_enabled_flag: bool) {
    // Check if debug logging is enabled
    let debug_enabled = std::env::var("RUST_LOG").is_ok() || debug_enabled_flag;

    if debug_enabled {
        // Debug mode: structured JSON logs to file
        let log_dir = Config::logs_dir();
        if let Err(e) = std::fs::create_dir_all(&log_dir) {
            if !json_mode {
                eprintln!("Warning: Failed to create log directory: {e}");
            }
        }

        let log_file = log_dir.join(format!(
            "xpisign-{}.log",
            chrono::Utc::now().format("%Y%m%d-%H%M%S")
        ));

        match std::fs::File::create(&log_file) {
            Ok(file) => {
                tracing_subscriber::fmt()
                    .json()
                    .with_writer(file)
                    .with_env_filter(
                        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(
                            |_| tracing_subscriber::EnvFilter::new("info,xpisign=debug"),
                        ),
                    )
                    .init();

                if !json_mode {
                    eprintln!("Debug logging enabled: {}", log_file.display());
                }
                return;
            }
            Err(e) => {
                if !json_mode {
                    eprintln!("Warning: Failed to create log file: {e}");
                }
            }
        }
    }

    if json_mode {
        // JSON mode: suppress all console output to avoid contaminating JSON
        tracing_subscriber::fmt()
            .with_writer(std::io::sink)
            .with_env_filter("off")
            .init();
    } else {
        // Normal mode: minimal logging to stderr
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .init();
    }
}

/// Apply CLI configuration overrides (highest precedence)
fn apply_cli_config(config: &mut Config, command: &Commands) {
    let credentials = match command {
        Commands::Sign(args) => {
            if let Some(base_url) = &args.base_url {
                config.service.base_url.clone_from(base_url);
            }
            if let Some(attempts) = args.poll_attempts {
                config.poll.max_attempts = attempts;
            }
            if let Some(delay) = args.poll_delay {
                config.poll.initial_delay_secs = delay;
            }
            if args.no_verify_hash {
                config.download.verify_hash = false;
            }
            &args.credentials
        }
        Commands::Token { credentials } => credentials,
    };

    let CredentialArgs { issuer, secret } = credentials;
    if let Some(issuer) = issuer {
        config.credentials.issuer = Some(issuer.clone());
    }
    if let Some(secret) = secret {
        config.credentials.secret = Some(secret.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_flags_override_config() {
        let cli = Cli::try_parse_from([
            "xpisign",
            "sign",
            "--xpi",
            "addon.xpi",
            "--addon-id",
            "addon@example.org",
            "--version",
            "1.0",
            "--download-dir",
            "out",
            "--issuer",
            "user:1:2",
            "--secret",
            "shh",
            "--poll-delay",
            "5",
            "--poll-attempts",
            "3",
            "--no-verify-hash",
        ])
        .unwrap();

        let mut config = Config::default();
        apply_cli_config(&mut config, &cli.command);

        assert_eq!(config.poll.initial_delay_secs, 5);
        assert_eq!(config.poll.max_attempts, 3);
        assert!(!config.download.verify_hash);
        assert_eq!(config.credentials().unwrap(), ("user:1:2", "shh"));
    }

    #[test]
    fn test_request_uses_package_name_by_default() {
        let cli = Cli::try_parse_from([
            "xpisign",
            "sign",
            "--xpi",
            "dist/addon-1.0.xpi",
            "--addon-id",
            "addon@example.org",
            "--version",
            "1.0",
            "--download-dir",
            "out",
        ])
        .unwrap();
        let Commands::Sign(args) = cli.command else {
            panic!("expected sign command");
        };

        let request = build_request(&args).unwrap();
        assert_eq!(request.file_name, "addon-1.0.xpi");
        assert_eq!(
            request.destination(),
            std::path::Path::new("out").join("addon-1.0.xpi")
        );
    }

    #[test]
    fn test_file_name_must_stay_in_download_dir() {
        for name in ["../escape.xpi", "/tmp/abs.xpi", "nested/addon.xpi", ".."] {
            let cli = Cli::try_parse_from([
                "xpisign",
                "sign",
                "--xpi",
                "addon.xpi",
                "--addon-id",
                "addon@example.org",
                "--version",
                "1.0",
                "--download-dir",
                "out",
                "--file-name",
                name,
            ])
            .unwrap();
            let Commands::Sign(args) = cli.command else {
                panic!("expected sign command");
            };

            assert!(
                matches!(build_request(&args), Err(CliError::InvalidArguments(_))),
                "{name} was accepted"
            );
        }

        assert!(is_plain_file_name("addon-signed.xpi"));
    }
}
