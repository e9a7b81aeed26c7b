//! # Issue Hook CLI
//!
//! Command-line interface for checking webhook deliveries against a receiver
//! configuration.
//!
//! This module provides CLI commands for:
//! - Running a captured delivery through the receiver pipeline
//! - Signing a body the way the sending side does
//! - Validating and printing the effective configuration
//!
//! Receiver settings are layered from an optional `issue-hook.{yaml,toml,json}`
//! file in the working directory, an explicit `--config` file and
//! `ISSUE_HOOK__*` environment variables, in that order.

use clap::{Parser, Subcommand};
use issue_hook_core::signature::{self, SignatureAlgorithm};
use issue_hook_core::{
    Payload, RawRequest, Receiver, ReceiverConfig, SignatureError, DELIVERY_HEADER, EVENT_HEADER,
};
use serde::Serialize;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Base name of the configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_NAME: &str = "issue-hook";

/// Prefix of the environment variables that override configuration keys.
pub const ENV_PREFIX: &str = "ISSUE_HOOK";

// ============================================================================
// CLI Structure
// ============================================================================

/// Issue Hook CLI - Verify and inspect GitHub issue webhooks
#[derive(Parser, Debug)]
#[command(name = "issue-hook")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Verify and inspect GitHub issue webhooks")]
#[command(
    long_about = "Runs webhook deliveries through signature verification and event filtering, \
                  and prints the normalized issue context"
)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "ISSUE_HOOK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Logging level
    #[arg(short, long, default_value = "warn")]
    pub log_level: String,

    /// Enable JSON logging
    #[arg(long)]
    pub json_logs: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a delivery through the receiver and print its context
    Parse {
        /// File holding the request body (stdin when absent or `-`)
        file: Option<PathBuf>,

        /// Value of the event header
        #[arg(short, long)]
        event: Option<String>,

        /// Value of the signature header
        #[arg(short, long, conflicts_with = "sign")]
        signature: Option<String>,

        /// Sign the body with the configured secret instead of passing a signature
        #[arg(long)]
        sign: bool,

        /// Value of the delivery header
        #[arg(short, long)]
        delivery: Option<String>,

        /// Print only the value at this dotted path of the body
        #[arg(long, value_name = "PATH")]
        get: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: OutputFormat,
    },

    /// Print the signature header value for a body
    Sign {
        /// File holding the request body (stdin when absent or `-`)
        file: Option<PathBuf>,

        /// Digest to sign with (defaults to the configured algorithm)
        #[arg(short, long, value_enum)]
        algorithm: Option<Algorithm>,
    },

    /// Validate the configuration
    Config {
        /// Print the effective configuration
        #[arg(long)]
        show: bool,

        /// Format used with --show
        #[arg(short, long, value_enum, default_value = "yaml")]
        format: ConfigFormat,
    },
}

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// YAML output
    Yaml,
}

/// Configuration format options
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum ConfigFormat {
    /// YAML format
    Yaml,
    /// JSON format
    Json,
    /// TOML format
    Toml,
}

/// Signature digests selectable on the command line
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Algorithm {
    Sha1,
    Sha256,
}

impl From<Algorithm> for SignatureAlgorithm {
    fn from(algorithm: Algorithm) -> Self {
        match algorithm {
            Algorithm::Sha1 => SignatureAlgorithm::Sha1,
            Algorithm::Sha256 => SignatureAlgorithm::Sha256,
        }
    }
}

// ============================================================================
// CLI Error Types
// ============================================================================

/// CLI-specific errors
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Webhook rejected: {0}")]
    Rejected(#[from] issue_hook_core::Error),

    #[error("Signing failed: {0}")]
    Signature(#[from] SignatureError),

    #[error("No secret token configured")]
    MissingSecret,

    #[error("No value at path '{path}'")]
    FieldNotFound { path: String },

    #[error("Invalid argument: {arg} - {message}")]
    InvalidArgument { arg: String, message: String },

    #[error("Failed to render output: {message}")]
    Output { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Configuration(_) => 1,
            Self::Rejected(_) => 2,
            Self::Signature(_) | Self::MissingSecret => 3,
            Self::FieldNotFound { .. } => 4,
            Self::InvalidArgument { .. } => 4,
            Self::Io(_) => 5,
            Self::Output { .. } => 6,
        }
    }
}

/// Configuration-related errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] issue_hook_core::ConfigError),
}

// ============================================================================
// Main Entry Point
// ============================================================================

/// Main CLI entry point
pub fn run_cli() -> Result<(), CliError> {
    let cli = Cli::parse();

    initialize_logging(&cli)?;

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    execute(&cli, stdin.lock(), &mut stdout.lock())
}

/// Run the selected command, reading bodies from `input` and writing results
/// to `output`.
pub fn execute<R: Read, W: Write>(cli: &Cli, input: R, output: &mut W) -> Result<(), CliError> {
    let config = load_configuration(cli.config.as_deref())?;

    match &cli.command {
        Commands::Parse {
            file,
            event,
            signature,
            sign,
            delivery,
            get,
            format,
        } => {
            let body = read_body(file.as_deref(), input)?;
            let signature = if *sign {
                Some(sign_body(&config, &body, None)?)
            } else {
                signature.clone()
            };
            let request = build_request(
                &config,
                body,
                event.as_deref(),
                signature.as_deref(),
                delivery.as_deref(),
            );
            execute_parse_command(config, request, get.as_deref(), *format, output)
        }
        Commands::Sign { file, algorithm } => {
            let body = read_body(file.as_deref(), input)?;
            let header = sign_body(&config, &body, algorithm.map(Into::into))?;
            writeln!(output, "{}", header)?;
            Ok(())
        }
        Commands::Config { show, format } => {
            execute_config_command(&config, *show, *format, output)
        }
    }
}

// ============================================================================
// Setup
// ============================================================================

/// Initialize logging based on CLI arguments
///
/// `RUST_LOG` takes precedence over `--log-level`. Logs go to stderr so that
/// command output on stdout stays machine readable.
pub fn initialize_logging(cli: &Cli) -> Result<(), CliError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .map_err(|e| CliError::InvalidArgument {
            arg: "log-level".to_string(),
            message: e.to_string(),
        })?;

    let registry = tracing_subscriber::registry().with(filter);
    let result = if cli.json_logs {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };

    result.map_err(|e| CliError::InvalidArgument {
        arg: "log-level".to_string(),
        message: e.to_string(),
    })
}

/// Load receiver settings from files and the environment.
///
/// Sources (later sources override earlier ones):
///  1. `issue-hook.{yaml,toml,json}` in the working directory, if present
///  2. `path`, which must exist when given
///  3. Environment variables prefixed `ISSUE_HOOK__`, e.g.
///     `ISSUE_HOOK__SECRET_TOKEN`. `ISSUE_HOOK__ACCEPT_EVENTS` takes a
///     comma separated list.
pub fn load_configuration(path: Option<&Path>) -> Result<ReceiverConfig, ConfigError> {
    let mut builder = config::Config::builder()
        .add_source(config::File::with_name(DEFAULT_CONFIG_NAME).required(false));

    if let Some(path) = path {
        info!(path = %path.display(), "Loading configuration from explicit path");
        builder = builder.add_source(config::File::from(path).required(true));
    }

    let settings = builder
        .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()?;

    let receiver_config: ReceiverConfig = settings.try_deserialize()?;
    receiver_config.validate()?;

    debug!(
        accept_origin = receiver_config.accept_origin.as_deref().unwrap_or_default(),
        discard_sender = receiver_config.discard_sender.as_deref().unwrap_or_default(),
        algorithm = %receiver_config.signature_algorithm,
        "Configuration loaded"
    );

    Ok(receiver_config)
}

// ============================================================================
// Command Implementations
// ============================================================================

fn read_body<R: Read>(file: Option<&Path>, mut input: R) -> Result<Vec<u8>, CliError> {
    match file {
        Some(path) if path != Path::new("-") => Ok(fs::read(path)?),
        _ => {
            let mut body = Vec::new();
            input.read_to_end(&mut body)?;
            Ok(body)
        }
    }
}

fn sign_body(
    config: &ReceiverConfig,
    body: &[u8],
    algorithm: Option<SignatureAlgorithm>,
) -> Result<String, CliError> {
    let secret = config
        .secret_token
        .as_ref()
        .ok_or(CliError::MissingSecret)?;
    let algorithm = algorithm.unwrap_or(config.signature_algorithm);

    Ok(signature::sign(secret.expose(), body, algorithm)?)
}

fn build_request(
    config: &ReceiverConfig,
    body: Vec<u8>,
    event: Option<&str>,
    signature: Option<&str>,
    delivery: Option<&str>,
) -> RawRequest {
    let headers = [
        (config.signature_algorithm.header_name(), signature),
        (EVENT_HEADER, event),
        (DELIVERY_HEADER, delivery),
    ];

    headers
        .into_iter()
        .filter_map(|(name, value)| value.map(|value| (name, value)))
        .fold(RawRequest::new(body), |request, (name, value)| {
            request.with_header(name, value)
        })
}

/// Execute parse command
fn execute_parse_command<W: Write>(
    config: ReceiverConfig,
    mut request: RawRequest,
    path: Option<&str>,
    format: OutputFormat,
    output: &mut W,
) -> Result<(), CliError> {
    let receiver = Receiver::new(config);
    let payload: Payload = receiver.parse_request(&mut request)?;

    match path {
        Some(path) => {
            let value = payload.get(path).ok_or_else(|| CliError::FieldNotFound {
                path: path.to_string(),
            })?;
            match value.as_str() {
                Some(text) => writeln!(output, "{}", text)?,
                None => write!(output, "{}", render(value, format)?)?,
            }
        }
        None => write!(output, "{}", render(payload.context(), format)?)?,
    }

    Ok(())
}

/// Execute config command
fn execute_config_command<W: Write>(
    config: &ReceiverConfig,
    show: bool,
    format: ConfigFormat,
    output: &mut W,
) -> Result<(), CliError> {
    if !show {
        writeln!(output, "Configuration is valid")?;
        return Ok(());
    }

    let rendered = match format {
        ConfigFormat::Yaml => render(config, OutputFormat::Yaml)?,
        ConfigFormat::Json => render(config, OutputFormat::Json)?,
        ConfigFormat::Toml => toml::to_string(config).map_err(|e| CliError::Output {
            message: e.to_string(),
        })?,
    };
    write!(output, "{}", rendered)?;
    Ok(())
}

fn render<T: Serialize + ?Sized>(value: &T, format: OutputFormat) -> Result<String, CliError> {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)
            .map(|mut json| {
                json.push('\n');
                json
            })
            .map_err(|e| e.to_string()),
        OutputFormat::Yaml => serde_yaml::to_string(value).map_err(|e| e.to_string()),
    };

    rendered.map_err(|message| CliError::Output { message })
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
