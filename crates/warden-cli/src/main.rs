//! MCP Warden CLI - Command-line interface for the tool integrity gateway

use anyhow::{bail, Context};
use clap::Parser;
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use warden_core::{Gateway, GatewayConfig};
use warden_firewall::{detect_hidden_unicode, sanitize_description};
use warden_registry::{schema_fingerprint, stamp_tool, tool_checksum, Tool};
use warden_validate::{validate_call_arguments, ToolDescription};

const ENC_KEY_VAR: &str = "WARDEN_ENC_KEY";
const SIGN_KEY_VAR: &str = "WARDEN_SIGN_KEY";

#[derive(Parser)]
#[command(name = "warden")]
#[command(about = "MCP Warden - Tool integrity gateway for Model Context Protocol")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Report hidden Unicode in a description
    Scan {
        /// Text to scan
        text: Option<String>,
        /// Read the text from a file instead
        #[arg(short, long, conflicts_with = "text")]
        file: Option<PathBuf>,
        /// Print the text with flagged characters removed
        #[arg(long)]
        sanitize: bool,
    },
    /// Print the fingerprint of a JSON Schema file
    Fingerprint { schema: PathBuf },
    /// Print the checksum of a tool definition file
    Checksum { tool: PathBuf },
    /// Attach a fresh checksum and fingerprint to a tool definition
    Stamp {
        tool: PathBuf,
        /// Write the stamped tool here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a tool definition file (single object or array)
    Validate { tools: PathBuf },
    /// Validate call arguments against a list of tool descriptions
    CheckCall {
        descriptions: PathBuf,
        function_name: String,
        arguments: String,
    },
    /// Encrypt and sign a JSON file (keys from WARDEN_ENC_KEY / WARDEN_SIGN_KEY)
    Seal { input: PathBuf },
    /// Verify and decrypt a sealed payload
    Open { input: PathBuf },
    /// Pull the remote catalog into the local snapshot
    Sync,
    /// List and re-verify the tools in the local snapshot
    List,
    /// Print the effective configuration
    Config,
}

#[derive(Serialize)]
struct ListEntry {
    name: String,
    checksum: String,
    verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = GatewayConfig::load(cli.config.as_deref())?;
    debug!(path = ?cli.config, "Configuration loaded");

    match cli.command {
        Commands::Scan {
            text,
            file,
            sanitize,
        } => {
            let text = match (text, file) {
                (Some(text), _) => text,
                (None, Some(path)) => std::fs::read_to_string(&path)
                    .with_context(|| format!("reading {}", path.display()))?,
                (None, None) => bail!("provide TEXT or --file"),
            };
            if sanitize {
                println!("{}", sanitize_description(&text)?);
                return Ok(ExitCode::SUCCESS);
            }
            let hits = detect_hidden_unicode(&text);
            println!("{}", serde_json::to_string_pretty(&hits)?);
            if !hits.is_empty() {
                eprintln!("ALERT: {} hidden characters detected", hits.len());
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Fingerprint { schema } => {
            let schema: Value = read_json(&schema)?;
            println!("{}", schema_fingerprint(&schema));
        }
        Commands::Checksum { tool } => {
            let tool: Tool = read_json(&tool)?;
            println!("{}", tool_checksum(&tool)?);
        }
        Commands::Stamp { tool, output } => {
            let mut tool: Tool = read_json(&tool)?;
            stamp_tool(&mut tool)?;
            let rendered = serde_json::to_string_pretty(&tool)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, rendered)
                        .with_context(|| format!("writing {}", path.display()))?;
                    info!("Stamped '{}' written to {}", tool.name, path.display());
                }
                None => println!("{rendered}"),
            }
        }
        Commands::Validate { tools } => {
            let gateway = Gateway::new(config);
            let document: Value = read_json(&tools)?;
            let all_valid = if document.is_array() {
                let batch: Vec<Tool> = serde_json::from_value(document)?;
                let records = gateway.validate_tools(batch).await;
                println!("{}", serde_json::to_string_pretty(&records)?);
                records.iter().all(|r| r.valid)
            } else {
                let tool: Tool = serde_json::from_value(document)?;
                let record = gateway.validate_tool(&tool);
                println!("{}", serde_json::to_string_pretty(&record)?);
                record.valid
            };
            if !all_valid {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::CheckCall {
            descriptions,
            function_name,
            arguments,
        } => {
            let descriptions: Vec<ToolDescription> = read_json(&descriptions)?;
            let outcome =
                validate_call_arguments(&function_name, arguments.as_bytes(), &descriptions);
            println!("{}", serde_json::to_string_pretty(&outcome.report())?);
            if !outcome.is_succeeded() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Seal { input } => {
            let (enc_key, sign_key) = envelope_keys()?;
            let data: Value = read_json(&input)?;
            let sealed = warden_envelope::secure(&data, &enc_key, &sign_key)?;
            println!("{}", String::from_utf8(sealed)?);
        }
        Commands::Open { input } => {
            let (enc_key, sign_key) = envelope_keys()?;
            let sealed = std::fs::read(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let opened: Value =
                warden_envelope::validate_and_open(&sealed, &enc_key, &sign_key)?;
            println!("{}", serde_json::to_string_pretty(&opened)?);
        }
        Commands::Sync => {
            let gateway = Gateway::new(config);
            let count = gateway.sync_catalog().await?;
            let store = gateway.open_snapshot()?;
            gateway.save_snapshot(&store)?;
            store.flush()?;
            println!("Synchronized {count} tools");
        }
        Commands::List => {
            let gateway = Gateway::new(config);
            let store = gateway.open_snapshot()?;
            gateway.load_snapshot(&store)?;

            let entries: Vec<ListEntry> = gateway
                .list_tools()
                .tools
                .into_iter()
                .map(|tool| {
                    let verdict = gateway.find_tool(&tool.name);
                    ListEntry {
                        name: tool.name,
                        checksum: tool.security_metadata.checksum,
                        verified: verdict.is_ok(),
                        error: verdict.err().map(|e| {
                            use std::error::Error as _;
                            match e.source() {
                                Some(source) => format!("{e}: {source}"),
                                None => e.to_string(),
                            }
                        }),
                    }
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        Commands::Config => {
            let mut shown = config;
            if shown.catalog.api_key.is_some() {
                shown.catalog.api_key = Some("********".into());
            }
            println!("{}", serde_json::to_string_pretty(&shown)?);
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&raw).with_context(|| format!("parsing {}", path.display()))
}

fn envelope_keys() -> anyhow::Result<(Vec<u8>, Vec<u8>)> {
    let key = |var: &str| -> anyhow::Result<Vec<u8>> {
        let raw = std::env::var(var).with_context(|| format!("{var} is not set"))?;
        hex::decode(raw.trim()).with_context(|| format!("{var} must be hex"))
    };
    Ok((key(ENC_KEY_VAR)?, key(SIGN_KEY_VAR)?))
}
